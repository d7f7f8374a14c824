use crate::parser::literals::split_asset;
use crate::semantic::Asset;
use num_bigint::BigInt;
use num_traits::Signed;

/// Where a currency symbol goes relative to the number
enum Symbol {
    Prefix(&'static str),
    Suffix(&'static str),
}

fn symbol_for(code: &str) -> Option<Symbol> {
    let symbol = match code {
        "USD" => Symbol::Prefix("$"),
        "EUR" => Symbol::Prefix("€"),
        "GBP" => Symbol::Prefix("£"),
        "BRL" => Symbol::Prefix("R$"),
        "JPY" => Symbol::Prefix("¥"),
        "INR" => Symbol::Prefix("₹"),
        "MXN" => Symbol::Prefix("MX$"),
        "CAD" => Symbol::Prefix("CA$"),
        "USDT" => Symbol::Prefix("USDT "),
        "USDC" => Symbol::Prefix("USDC "),
        "DAI" => Symbol::Prefix("DAI "),
        "BTC" => Symbol::Suffix(" BTC"),
        "ETH" => Symbol::Suffix(" ETH"),
        "SOL" => Symbol::Suffix(" SOL"),
        _ => return None,
    };
    Some(symbol)
}

/// Render an integer amount of `asset` for display
///
/// Prints exactly `precision` fractional digits: `10000` of `USD/2` is
/// `$100.00`, `-5` of `EUR/2` is `-€0.05`. Codes without a known symbol are
/// prefixed with the code and a space.
pub fn format_amount(amount: &BigInt, asset: &str) -> String {
    let asset = split_asset(asset).unwrap_or_else(|_| Asset {
        code: asset.to_string(),
        precision: 0,
    });

    let sign = if amount.is_negative() { "-" } else { "" };
    let number = decimal_string(&amount.abs().to_string(), asset.precision as usize);

    match symbol_for(&asset.code) {
        Some(Symbol::Prefix(symbol)) => format!("{}{}{}", sign, symbol, number),
        Some(Symbol::Suffix(symbol)) => format!("{}{}{}", sign, number, symbol),
        None => format!("{}{} {}", sign, asset.code, number),
    }
}

fn decimal_string(digits: &str, precision: usize) -> String {
    if precision == 0 {
        return digits.to_string();
    }
    let padded = format!("{:0>width$}", digits, width = precision + 1);
    let (whole, fraction) = padded.split_at(padded.len() - precision);
    format!("{}.{}", whole, fraction)
}
