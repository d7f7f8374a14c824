#![no_main]

use libfuzzer_sys::fuzz_target;
use numscript::{Executor, Ledger, Variables};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut ledger = Ledger::new();
        let before = ledger.get_transaction_count();
        if Executor::new()
            .execute(s, &Variables::new(), &mut ledger)
            .is_err()
        {
            assert_eq!(ledger.get_transaction_count(), before);
        }
    }
});
