//! Normalization of raw extraction spans.
//!
//! An extractor reports every candidate it finds, so a sentence like
//! "tomorrow at 8pm" yields one span for "tomorrow" and an overlapping one
//! for "at 8pm". [`normalize`] decodes each span into a typed [`Value`],
//! then resolves overlapping temporal spans into a single value:
//!
//! 1. Temporal spans are sorted by `(start, end)`.
//! 2. A single left-to-right pass merges an entry with the next one when
//!    they overlap. The merged pair is consumed, so three chained
//!    overlapping spans produce one merge and one untouched entry.
//! 3. Non-temporal values keep their input order and are interleaved with
//!    the temporal results by start offset.
//!
//! A span that fails to decode is logged and skipped; it never prevents
//! the other spans of the batch from being decoded.

use crate::error::NormalizationError;
use crate::value::{DateEntityValue, DateGrain, TemperatureUnit, Value};
use chrono::{DateTime, Duration, Timelike};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

/// One raw extraction result, before decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSpan {
    /// Extraction dimension (`time`, `number`, `email`, ...).
    pub dimension: String,
    /// Start character offset, inclusive.
    pub start: usize,
    /// End character offset, exclusive.
    pub end: usize,
    /// The dimension specific payload.
    pub value: JsonValue,
}

impl RawSpan {
    /// Creates a raw span.
    #[must_use]
    pub fn new(dimension: impl Into<String>, start: usize, end: usize, value: JsonValue) -> Self {
        Self {
            dimension: dimension.into(),
            start,
            end,
            value,
        }
    }
}

/// A decoded value with its `[start, end)` offsets in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueWithRange {
    pub start: usize,
    pub end: usize,
    pub value: Value,
}

impl ValueWithRange {
    /// Returns true if this range extends past the start of `next`.
    #[must_use]
    pub fn overlaps(&self, next: &ValueWithRange) -> bool {
        self.end > next.start
    }
}

/// Normalizes a batch of raw spans into typed values.
///
/// Pure and deterministic: the same input always yields the same output.
#[must_use]
pub fn normalize(spans: &[RawSpan]) -> Vec<Value> {
    let mut temporal = Vec::new();
    let mut others = Vec::new();

    for span in spans {
        match decode_span(span) {
            Ok(decoded) if decoded.value.is_temporal() => temporal.push(decoded),
            Ok(decoded) => others.push(decoded),
            Err(report) => {
                warn!(
                    dimension = %span.dimension,
                    start = span.start,
                    end = span.end,
                    error = %report,
                    "skipping undecodable span"
                );
            }
        }
    }

    temporal.sort_by_key(|v| (v.start, v.end));
    let temporal = merge_overlapping(temporal);

    interleave(temporal, others)
}

/// Decodes a single raw span.
///
/// # Errors
///
/// Returns an error for unknown dimensions and malformed payloads.
pub fn decode_span(span: &RawSpan) -> Result<ValueWithRange, Report<NormalizationError>> {
    let dimension = span.dimension.as_str();
    let payload = &span.value;
    let value = match dimension {
        "time" | "datetime" => decode_temporal(payload)?,
        "number" => Value::Number {
            value: number_field(dimension, payload, "value")?,
        },
        "ordinal" => Value::Ordinal {
            value: number_field(dimension, payload, "value")?,
        },
        "distance" => Value::Distance {
            value: number_field(dimension, payload, "value")?,
            unit: string_field(dimension, payload, "unit")?,
        },
        "volume" => Value::Volume {
            value: number_field(dimension, payload, "value")?,
            unit: string_field(dimension, payload, "unit")?,
        },
        "amount-of-money" => Value::AmountOfMoney {
            value: number_field(dimension, payload, "value")?,
            unit: string_field(dimension, payload, "unit")?,
        },
        "temperature" => Value::Temperature {
            value: number_field(dimension, payload, "value")?,
            unit: TemperatureUnit::parse_lenient(&string_field(dimension, payload, "unit")?),
        },
        "url" => Value::Url {
            value: string_field(dimension, payload, "value")?,
        },
        "email" => Value::Email {
            value: string_field(dimension, payload, "value")?,
        },
        "phone-number" => Value::PhoneNumber {
            value: string_field(dimension, payload, "value")?,
        },
        _ => {
            return Err(NormalizationError::UnknownDimension {
                dimension: dimension.to_string(),
            }
            .into());
        }
    };

    Ok(ValueWithRange {
        start: span.start,
        end: span.end,
        value,
    })
}

/// Decodes a temporal payload into a point or an interval.
fn decode_temporal(payload: &JsonValue) -> Result<Value, Report<NormalizationError>> {
    if payload.get("grain").is_some_and(|g| !g.is_null()) {
        return Ok(Value::Date(decode_point(payload)?));
    }

    let from = present(payload.get("from"));
    let to = present(payload.get("to"));

    if let (Some(from), Some(to)) = (from, to) {
        if present(to.get("grain")).is_some() {
            return Ok(Value::DateInterval {
                from: decode_point(from)?,
                to: decode_point(to)?,
            });
        }
    }

    match from.or(to) {
        Some(point) => Ok(Value::Date(decode_point(point)?)),
        None => Err(NormalizationError::MissingField {
            dimension: "time".to_string(),
            field: "grain".to_string(),
        }
        .into()),
    }
}

fn decode_point(payload: &JsonValue) -> Result<DateEntityValue, Report<NormalizationError>> {
    let raw_date = string_field("time", payload, "value")?;
    let date = DateTime::parse_from_rfc3339(&raw_date).map_err(|e| {
        NormalizationError::InvalidDate {
            value: raw_date.clone(),
            reason: e.to_string(),
        }
    })?;
    let grain: DateGrain = string_field("time", payload, "grain")?.parse()?;
    Ok(DateEntityValue::new(date, grain))
}

fn present(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| !v.is_null())
}

fn number_field(
    dimension: &str,
    payload: &JsonValue,
    field: &str,
) -> Result<f64, Report<NormalizationError>> {
    let raw = present(payload.get(field)).ok_or_else(|| NormalizationError::MissingField {
        dimension: dimension.to_string(),
        field: field.to_string(),
    })?;
    raw.as_f64().ok_or_else(|| {
        NormalizationError::InvalidField {
            dimension: dimension.to_string(),
            field: field.to_string(),
        }
        .into()
    })
}

fn string_field(
    dimension: &str,
    payload: &JsonValue,
    field: &str,
) -> Result<String, Report<NormalizationError>> {
    let raw = present(payload.get(field)).ok_or_else(|| NormalizationError::MissingField {
        dimension: dimension.to_string(),
        field: field.to_string(),
    })?;
    raw.as_str().map(str::to_string).ok_or_else(|| {
        NormalizationError::InvalidField {
            dimension: dimension.to_string(),
            field: field.to_string(),
        }
        .into()
    })
}

/// Merges adjacent overlapping entries of a sorted list in one pass.
///
/// Looks at most one entry ahead; an entry consumed by a merge is not
/// compared with its own successor.
fn merge_overlapping(sorted: Vec<ValueWithRange>) -> Vec<ValueWithRange> {
    let mut merged = Vec::with_capacity(sorted.len());
    let mut entries = sorted.into_iter().peekable();

    while let Some(current) = entries.next() {
        match entries.next_if(|next| current.overlaps(next)) {
            Some(next) => merged.push(merge_pair(current, next)),
            None => merged.push(current),
        }
    }

    merged
}

/// Merges two overlapping temporal entries.
fn merge_pair(first: ValueWithRange, second: ValueWithRange) -> ValueWithRange {
    let (Value::Date(a), Value::Date(b)) = (&first.value, &second.value) else {
        return first;
    };

    let value = if a.grain == b.grain {
        Value::DateInterval {
            from: a.clone(),
            to: b.clone(),
        }
    } else if a.grain.is_time() != b.grain.is_time() {
        let (date, time) = if a.grain.is_time() { (b, a) } else { (a, b) };
        let offset = Duration::seconds(i64::from(time.date.num_seconds_from_midnight()));
        Value::Date(DateEntityValue::new(date.date + offset, time.grain))
    } else {
        // Two time-of-day grains, or two date grains: no offset applies.
        return first;
    };

    ValueWithRange {
        start: first.start,
        end: first.end.max(second.end),
        value,
    }
}

/// Interleaves temporal results with the other values by start offset.
///
/// `others` is consumed in its original order.
fn interleave(temporal: Vec<ValueWithRange>, others: Vec<ValueWithRange>) -> Vec<Value> {
    let mut result = Vec::with_capacity(temporal.len() + others.len());
    let mut temporal = temporal.into_iter().peekable();
    let mut others = others.into_iter().peekable();

    loop {
        let take_temporal = match (temporal.peek(), others.peek()) {
            (Some(t), Some(o)) => t.start < o.start,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_temporal {
            temporal.next()
        } else {
            others.next()
        };
        if let Some(entry) = next {
            result.push(entry.value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(start: usize, end: usize, date: &str, grain: &str) -> RawSpan {
        RawSpan::new("time", start, end, json!({"value": date, "grain": grain}))
    }

    fn date(raw: &str, grain: DateGrain) -> DateEntityValue {
        DateEntityValue::new(DateTime::parse_from_rfc3339(raw).expect("date"), grain)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn single_span_passes_through() {
        let values = normalize(&[point(0, 8, "2017-04-28T00:00:00.000+02:00", "day")]);
        assert_eq!(
            values,
            vec![Value::Date(date("2017-04-28T00:00:00+02:00", DateGrain::Day))]
        );
    }

    #[test]
    fn disjoint_spans_keep_count_and_order() {
        let spans = vec![
            RawSpan::new("number", 0, 1, json!({"value": 3})),
            RawSpan::new("email", 10, 25, json!({"value": "a@example.com"})),
            point(30, 38, "2017-04-28T00:00:00.000+02:00", "day"),
            RawSpan::new("url", 40, 60, json!({"value": "https://example.com"})),
        ];

        let values = normalize(&spans);

        assert_eq!(values.len(), spans.len());
        assert_eq!(values[0], Value::Number { value: 3.0 });
        assert!(matches!(values[1], Value::Email { .. }));
        assert!(values[2].is_temporal());
        assert!(matches!(values[3], Value::Url { .. }));
    }

    #[test]
    fn overlapping_points_with_equal_grain_become_interval() {
        let spans = vec![
            point(0, 10, "2017-04-28T00:00:00.000+02:00", "day"),
            point(5, 20, "2017-04-30T00:00:00.000+02:00", "day"),
        ];

        let values = normalize(&spans);

        assert_eq!(
            values,
            vec![Value::DateInterval {
                from: date("2017-04-28T00:00:00+02:00", DateGrain::Day),
                to: date("2017-04-30T00:00:00+02:00", DateGrain::Day),
            }]
        );
    }

    #[test]
    fn overlapping_date_and_time_become_single_point() {
        let spans = vec![
            point(0, 8, "2017-04-28T00:00:00.000+02:00", "day"),
            point(6, 16, "2017-04-27T20:30:00.000+02:00", "minute"),
        ];

        let values = normalize(&spans);

        assert_eq!(
            values,
            vec![Value::Date(date("2017-04-28T20:30:00+02:00", DateGrain::Minute))]
        );
    }

    #[test]
    fn time_first_then_date_merges_the_same_way() {
        let spans = vec![
            point(0, 6, "2017-04-27T08:15:00.000+02:00", "minute"),
            point(4, 14, "2017-05-02T00:00:00.000+02:00", "day"),
        ];

        let values = normalize(&spans);

        assert_eq!(
            values,
            vec![Value::Date(date("2017-05-02T08:15:00+02:00", DateGrain::Minute))]
        );
    }

    #[test]
    fn overlapping_time_grains_keep_earlier_entry() {
        let spans = vec![
            point(0, 3, "2017-04-28T20:00:00.000+02:00", "hour"),
            point(2, 8, "2017-04-28T20:30:00.000+02:00", "minute"),
        ];

        let values = normalize(&spans);

        assert_eq!(
            values,
            vec![Value::Date(date("2017-04-28T20:00:00+02:00", DateGrain::Hour))]
        );
    }

    #[test]
    fn overlapping_date_grains_keep_earlier_entry() {
        let spans = vec![
            point(0, 9, "2017-04-24T00:00:00.000+02:00", "week"),
            point(5, 12, "2017-04-28T00:00:00.000+02:00", "day"),
        ];

        let values = normalize(&spans);

        assert_eq!(
            values,
            vec![Value::Date(date("2017-04-24T00:00:00+02:00", DateGrain::Week))]
        );
    }

    #[test]
    fn overlapping_interval_keeps_earlier_entry() {
        let interval = RawSpan::new(
            "time",
            0,
            10,
            json!({
                "from": {"value": "2017-04-28T00:00:00.000+02:00", "grain": "day"},
                "to": {"value": "2017-04-30T00:00:00.000+02:00", "grain": "day"}
            }),
        );
        let spans = vec![interval, point(5, 12, "2017-05-01T00:00:00.000+02:00", "day")];

        let values = normalize(&spans);

        assert_eq!(values.len(), 1);
        assert!(matches!(values[0], Value::DateInterval { .. }));
    }

    #[test]
    fn three_chained_overlaps_merge_only_the_first_pair() {
        let spans = vec![
            point(0, 10, "2017-04-28T00:00:00.000+02:00", "day"),
            point(5, 15, "2017-04-29T00:00:00.000+02:00", "day"),
            point(12, 20, "2017-04-30T00:00:00.000+02:00", "day"),
        ];

        let values = normalize(&spans);

        assert_eq!(values.len(), 2);
        assert!(matches!(values[0], Value::DateInterval { .. }));
        assert_eq!(
            values[1],
            Value::Date(date("2017-04-30T00:00:00+02:00", DateGrain::Day))
        );
    }

    #[test]
    fn unsorted_spans_are_sorted_before_merging() {
        let spans = vec![
            point(5, 20, "2017-04-30T00:00:00.000+02:00", "day"),
            point(0, 10, "2017-04-28T00:00:00.000+02:00", "day"),
        ];

        let values = normalize(&spans);

        let Value::DateInterval { from, .. } = &values[0] else {
            panic!("expected interval, got {values:?}");
        };
        assert_eq!(from.date.to_rfc3339(), "2017-04-28T00:00:00+02:00");
    }

    #[test]
    fn malformed_span_does_not_block_others() {
        let spans = vec![
            RawSpan::new("time", 0, 5, json!({"value": "not a date", "grain": "day"})),
            RawSpan::new("number", 6, 7, json!({"value": "seven"})),
            RawSpan::new("duration", 8, 12, json!({"value": 3, "unit": "hour"})),
            RawSpan::new("temperature", 13, 18, json!({"value": 21, "unit": "celsius"})),
        ];

        let values = normalize(&spans);

        assert_eq!(
            values,
            vec![Value::Temperature {
                value: 21.0,
                unit: TemperatureUnit::Celsius
            }]
        );
    }

    #[test]
    fn interval_without_to_grain_decodes_as_point() {
        let span = RawSpan::new(
            "time",
            0,
            9,
            json!({
                "from": {"value": "2017-04-28T18:00:00.000+02:00", "grain": "hour"},
                "to": {"value": "2017-04-28T21:00:00.000+02:00"}
            }),
        );

        let decoded = decode_span(&span).expect("decodes");

        assert_eq!(
            decoded.value,
            Value::Date(date("2017-04-28T18:00:00+02:00", DateGrain::Hour))
        );
    }

    #[test]
    fn temporal_values_are_placed_by_offset() {
        let spans = vec![
            RawSpan::new("number", 20, 21, json!({"value": 2})),
            point(0, 8, "2017-04-28T00:00:00.000+02:00", "day"),
            RawSpan::new("number", 30, 31, json!({"value": 4})),
        ];

        let values = normalize(&spans);

        assert!(values[0].is_temporal());
        assert_eq!(values[1], Value::Number { value: 2.0 });
        assert_eq!(values[2], Value::Number { value: 4.0 });
    }

    #[test]
    fn unknown_dimension_is_reported() {
        let err = decode_span(&RawSpan::new("duration", 0, 1, json!({}))).unwrap_err();
        assert!(err.to_string().contains("unknown dimension"));
    }
}
