#![no_main]

use libfuzzer_sys::fuzz_target;
use numscript::{parse_asset, parse_monetary};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_asset(s);
        let _ = parse_monetary(s);
        let _ = parse_monetary(&format!("[USD/2 {}]", s));
    }
});
