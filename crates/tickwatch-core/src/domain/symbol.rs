use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Longest ticker accepted, exchange suffix included (`BRK.B`, `SHOP.TO`).
pub const MAX_TICKER_LEN: usize = 15;

/// An uppercase ASCII ticker such as `AAPL`, `BRK.B` or `RDS-A`.
///
/// A ticker is a root that begins with a letter, optionally followed by
/// class or exchange parts joined with `.` or `-`. Equality is exact match
/// on the normalized text, so `brk.b` and `BRK.B` are the same symbol.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes user or provider input into a ticker.
    ///
    /// Non-ASCII input is rejected before case folding.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::BlankTicker);
        }
        if !raw.is_ascii() {
            return Err(ValidationError::NonAsciiTicker {
                ticker: raw.to_owned(),
            });
        }
        if raw.len() > MAX_TICKER_LEN {
            return Err(ValidationError::TickerTooLong {
                ticker: raw.to_owned(),
                max: MAX_TICKER_LEN,
            });
        }

        let ticker = raw.to_ascii_uppercase();
        check_parts(&ticker)?;
        Ok(Self(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before any class or exchange suffix: `BRK` for `BRK.B`.
    pub fn root(&self) -> &str {
        self.0
            .split(is_separator)
            .next()
            .unwrap_or(self.0.as_str())
    }
}

fn is_separator(ch: char) -> bool {
    ch == '.' || ch == '-'
}

fn check_parts(ticker: &str) -> Result<(), ValidationError> {
    if let Some(ch) = ticker
        .chars()
        .find(|ch| !ch.is_ascii_alphanumeric() && !is_separator(*ch))
    {
        return Err(ValidationError::TickerBadCharacter {
            ticker: ticker.to_owned(),
            ch,
        });
    }

    if !ticker.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        return Err(ValidationError::TickerStartsWithoutLetter {
            ticker: ticker.to_owned(),
        });
    }

    if ticker.split(is_separator).any(str::is_empty) {
        return Err(ValidationError::TickerEmptyPart {
            ticker: ticker.to_owned(),
        });
    }

    Ok(())
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid ticker")
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(ticker(" aapl ").as_str(), "AAPL");
        assert_eq!(ticker("brk.b"), ticker("BRK.B"));
    }

    #[test]
    fn keeps_class_and_exchange_parts() {
        assert_eq!(ticker("RDS-A").root(), "RDS");
        assert_eq!(ticker("shop.to").as_str(), "SHOP.TO");
        assert_eq!(ticker("IBM").root(), "IBM");
    }

    #[test]
    fn rejects_non_ascii_before_case_folding() {
        // U+0131 DOTLESS I would otherwise look like a plain ticker
        let err = Symbol::parse("\u{0131}bm").expect_err("must fail");
        assert!(matches!(err, ValidationError::NonAsciiTicker { .. }));

        let err = Symbol::parse("ÄAPL").expect_err("must fail");
        assert!(matches!(err, ValidationError::NonAsciiTicker { .. }));
    }

    #[test]
    fn root_must_begin_with_a_letter() {
        let err = Symbol::parse("1BAD").expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::TickerStartsWithoutLetter {
                ticker: String::from("1BAD")
            }
        );
    }

    #[test]
    fn separators_need_text_on_both_sides() {
        for raw in ["BRK..B", "BRK.", ".BRK", "RDS-"] {
            let err = Symbol::parse(raw).expect_err(raw);
            assert!(
                matches!(
                    err,
                    ValidationError::TickerEmptyPart { .. }
                        | ValidationError::TickerStartsWithoutLetter { .. }
                ),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn rejects_punctuation_blank_and_overlong_input() {
        assert!(matches!(
            Symbol::parse("AAPL$"),
            Err(ValidationError::TickerBadCharacter { ch: '$', .. })
        ));
        assert_eq!(Symbol::parse("   "), Err(ValidationError::BlankTicker));
        assert!(matches!(
            Symbol::parse("ABCDEFGHIJKLMNOP"),
            Err(ValidationError::TickerTooLong { max: MAX_TICKER_LEN, .. })
        ));
    }

    #[test]
    fn deserialization_applies_the_same_rules() {
        let parsed: Symbol = serde_json::from_str("\" msft \"").expect("valid ticker json");
        assert_eq!(parsed.as_str(), "MSFT");
        assert!(serde_json::from_str::<Symbol>("\"$$$\"").is_err());
    }
}
