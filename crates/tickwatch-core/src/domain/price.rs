use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Symbol, ValidationError};

/// Closing price for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(with = "calendar_date")]
    pub date: Date,
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(date: Date, price: Decimal) -> Result<Self, ValidationError> {
        if price < Decimal::ZERO {
            return Err(ValidationError::NegativeValue { field: "price" });
        }
        Ok(Self { date, price })
    }

    /// Parses a `YYYY-MM-DD` calendar date.
    pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
        calendar_date::parse(input)
    }
}

/// Daily closes for one symbol, ascending by date with unique dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSeries {
    symbol: Symbol,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points in any order.
    pub fn new(symbol: Symbol, mut points: Vec<PricePoint>) -> Result<Self, ValidationError> {
        points.sort_by_key(|point| point.date);

        if let Some(pair) = points.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ValidationError::DuplicateDate {
                symbol: symbol.to_string(),
                date: calendar_date::format(pair[0].date),
            });
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// The most recent close.
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// The most recent `count` points, oldest first.
    pub fn tail(&self, count: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(count);
        &self.points[start..]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

mod calendar_date {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::BorrowedFormatItem;
    use time::macros::format_description;
    use time::Date;

    use crate::ValidationError;

    const FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn parse(input: &str) -> Result<Date, ValidationError> {
        Date::parse(input.trim(), FORMAT).map_err(|_| ValidationError::InvalidDate {
            value: input.to_owned(),
        })
    }

    pub fn format(date: Date) -> String {
        date.format(FORMAT)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }
}
