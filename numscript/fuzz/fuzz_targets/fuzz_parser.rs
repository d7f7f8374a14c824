#![no_main]

use libfuzzer_sys::fuzz_target;
use numscript::{parse_numscript, validate_numscript};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parsed = parse_numscript(s);
        for failure in &parsed.failures {
            assert!(failure.span.start <= s.len());
            assert!(failure.location.end <= s.len());
        }
        let _ = validate_numscript(s);
    }
});
