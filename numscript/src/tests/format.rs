use crate::format_amount;
use num_bigint::BigInt;

fn fmt(amount: i64, asset: &str) -> String {
    format_amount(&BigInt::from(amount), asset)
}

#[test]
fn test_fiat_symbols() {
    assert_eq!(fmt(10000, "USD/2"), "$100.00");
    assert_eq!(fmt(5450000, "BRL/2"), "R$54500.00");
    assert_eq!(fmt(1500, "JPY"), "¥1500");
    assert_eq!(fmt(1999, "GBP/2"), "£19.99");
}

#[test]
fn test_negative_amount_puts_sign_first() {
    assert_eq!(fmt(-5, "EUR/2"), "-€0.05");
    assert_eq!(fmt(-150000000, "BTC/8"), "-1.50000000 BTC");
}

#[test]
fn test_crypto_suffix_and_stablecoin_prefix() {
    assert_eq!(fmt(100000000, "BTC/8"), "1.00000000 BTC");
    assert_eq!(fmt(12345, "USDT/2"), "USDT 123.45");
}

#[test]
fn test_unknown_code_is_prefixed() {
    assert_eq!(fmt(7, "COIN"), "COIN 7");
    assert_eq!(fmt(1, "POINTS/3"), "POINTS 0.001");
}

#[test]
fn test_zero_and_small_amounts_are_padded() {
    assert_eq!(fmt(0, "USD/2"), "$0.00");
    assert_eq!(fmt(7, "USD/2"), "$0.07");
}

#[test]
fn test_amount_beyond_i64() {
    let amount: BigInt = "123456789012345678901234".parse().unwrap();
    assert_eq!(
        format_amount(&amount, "EUR/2"),
        "€1234567890123456789012.34"
    );
}

#[test]
fn test_oversized_precision_is_not_padded() {
    assert_eq!(fmt(1, "X/4000000000"), "X/4000000000 1");
}
