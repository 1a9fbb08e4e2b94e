//! Price display formatting.

/// Formats prices as `$1,234.56`.
///
/// Built once from configuration and shared read-only through `AppState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormatter {
    symbol: String,
}

impl Default for PriceFormatter {
    fn default() -> Self {
        Self::new("$")
    }
}

impl PriceFormatter {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    /// Render `value` with two decimals and comma-grouped thousands.
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return format!("{}0.00", self.symbol);
        }

        let fixed = format!("{:.2}", value.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
        format!("{sign}{}{grouped}.{cents}", self.symbol)
    }
}
