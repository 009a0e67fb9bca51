//! Helpers for the loose money values users type in and the way they get shown.

pub const CURRENCY_SIGN: &str = "¥";

/// Parses an amount typed by a person. Currency signs, thousands separators and surrounding
/// whitespace are ignored. Anything that still isn't a finite number counts as zero.
pub fn parse_amount_lenient(value: &str) -> f64 {
    let cleaned = value
        .trim()
        .trim_start_matches(['¥', '$'])
        .replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.,
    }
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn format_money(value: f64) -> String {
    format!("{CURRENCY_SIGN}{value:.2}")
}
