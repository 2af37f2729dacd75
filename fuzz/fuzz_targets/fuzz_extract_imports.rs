#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Import scanning sees raw file bytes - this should never panic
    let _ = cascade::extract_imports(data);
});
