//! Lenient deserializers for form-style JSON payloads.
//!
//! Registration forms post numbers either as JSON numbers or as strings,
//! and leave untouched fields empty. These helpers resolve such values
//! into plain options once, at the deserialization boundary.
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Form {
//!     #[serde(default, deserialize_with = "clientdesk_common::flexible::f64_opt")]
//!     revenue: Option<f64>,
//! }
//!
//! let form: Form = serde_json::from_str(r#"{"revenue": "1500.5"}"#).unwrap();
//! assert_eq!(form.revenue, Some(1500.5));
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de::Error as _};

/// Calendar date format accepted in payloads.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A number that may arrive as a JSON number or as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleNumber {
    Float(f64),
    Text(String),
}

impl FlexibleNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Deserialize a number, numeric string, empty string or null into `Option<f64>`.
///
/// Strings that do not parse resolve to `None`.
pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FlexibleNumber>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(FlexibleNumber::as_f64)
        .filter(|v| v.is_finite()))
}

/// Deserialize a number, numeric string, empty string or null into `Option<i32>`.
///
/// Fractional values are truncated; out-of-range and unparsable values resolve to `None`.
pub fn i32_opt<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FlexibleNumber>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(FlexibleNumber::as_f64)
        .filter(|v| v.is_finite() && *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
        .map(|v| v as i32))
}

/// Deserialize `YYYY-MM-DD`, empty string or null into `Option<NaiveDate>`.
///
/// A non-empty string in any other shape is an error.
pub fn date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid date '{s}', expected YYYY-MM-DD"))),
    }
}

/// Deserialize a string, treating empty or whitespace-only input as absent.
pub fn string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
