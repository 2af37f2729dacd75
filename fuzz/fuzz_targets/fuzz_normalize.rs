#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let once = cascade::paths::normalize(Path::new(s));
        assert_eq!(cascade::paths::normalize(&once), once);
    }
});
