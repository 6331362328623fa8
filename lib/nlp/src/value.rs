//! Typed entity values.
//!
//! Values are produced once by extraction or normalization and never
//! mutated afterwards.

use crate::error::NormalizationError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Precision unit of a temporal value.
///
/// Variants are ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateGrain {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl DateGrain {
    /// Returns true for time-of-day grains (second, minute, hour).
    #[must_use]
    pub fn is_time(self) -> bool {
        matches!(self, Self::Second | Self::Minute | Self::Hour)
    }

    /// Returns the lowercase grain name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for DateGrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateGrain {
    type Err = NormalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "second" => Ok(Self::Second),
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            _ => Err(NormalizationError::UnknownGrain {
                grain: s.to_string(),
            }),
        }
    }
}

/// A point in time with its precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateEntityValue {
    /// The instant, in the offset the extractor reported.
    pub date: DateTime<FixedOffset>,
    /// The precision of `date`.
    pub grain: DateGrain,
}

impl DateEntityValue {
    /// Creates a date value.
    #[must_use]
    pub fn new(date: DateTime<FixedOffset>, grain: DateGrain) -> Self {
        Self { date, grain }
    }
}

/// Temperature units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    /// A bare "degree" with no scale.
    Degree,
}

impl TemperatureUnit {
    /// Parses a unit name, falling back to [`TemperatureUnit::Degree`].
    #[must_use]
    pub fn parse_lenient(unit: &str) -> Self {
        match unit.to_ascii_lowercase().as_str() {
            "celsius" => Self::Celsius,
            "fahrenheit" => Self::Fahrenheit,
            _ => Self::Degree,
        }
    }
}

/// The closed set of typed entity results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Value {
    Number {
        value: f64,
    },
    Ordinal {
        value: f64,
    },
    Date(DateEntityValue),
    DateInterval {
        from: DateEntityValue,
        to: DateEntityValue,
    },
    AmountOfMoney {
        value: f64,
        unit: String,
    },
    Distance {
        value: f64,
        unit: String,
    },
    Temperature {
        value: f64,
        unit: TemperatureUnit,
    },
    Volume {
        value: f64,
        unit: String,
    },
    Url {
        value: String,
    },
    Email {
        value: String,
    },
    PhoneNumber {
        value: String,
    },
}

impl Value {
    /// Returns true for date points and date intervals.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date(_) | Self::DateInterval { .. })
    }

    /// Returns the date point, if this is one.
    #[must_use]
    pub fn as_date(&self) -> Option<&DateEntityValue> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grain_order_is_finest_first() {
        assert!(DateGrain::Minute < DateGrain::Day);
        assert!(DateGrain::Day < DateGrain::Year);
    }

    #[test]
    fn only_sub_day_grains_are_time() {
        assert!(DateGrain::Hour.is_time());
        assert!(!DateGrain::Day.is_time());
        assert!(!DateGrain::Week.is_time());
    }

    #[test]
    fn grain_parses_case_insensitively() {
        assert_eq!("Day".parse::<DateGrain>().expect("grain"), DateGrain::Day);
        assert!("fortnight".parse::<DateGrain>().is_err());
    }

    #[test]
    fn value_is_tagged_by_type() {
        let json = serde_json::to_value(Value::AmountOfMoney {
            value: 12.5,
            unit: "EUR".to_string(),
        })
        .expect("serialize");
        assert_eq!(json["type"], "amount_of_money");
        assert_eq!(json["unit"], "EUR");
    }
}
