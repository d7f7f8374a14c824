#![no_main]

use libfuzzer_sys::fuzz_target;
use numscript::{parse_metadata_from_numscript, parse_postings_from_numscript};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_postings_from_numscript(s);
        let _ = parse_metadata_from_numscript(s);
    }
});
