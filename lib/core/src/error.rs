//! Error handling foundation shared by the engine crates.
//!
//! Only the `Result` alias lives here. Every crate keeps its own error
//! enums next to the code that raises them and wraps lower layers with
//! rootcause's `.context()`, so a report read at the controller shows the
//! whole chain from transport or store up to the turn that failed.

use rootcause::Report;

/// Result alias carrying a rootcause [`Report`].
///
/// `C` is the context type of the outermost layer; `()` leaves it untyped.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_delay(raw: &str) -> Result<u64, std::num::ParseIntError> {
        Ok(raw.parse::<u64>()?)
    }

    #[test]
    fn alias_carries_values_and_reports() {
        assert_eq!(parse_delay("150").expect("should parse"), 150);
        assert!(parse_delay("soon").is_err());
    }
}
