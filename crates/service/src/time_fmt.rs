//! Lenient date/time parsing for query strings and JSON bodies.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};

use crate::errors::ServiceError;

/// `YYYY-MM-DD`.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ServiceError::validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

/// `HH:MM` or `HH:MM:SS`.
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ServiceError> {
    let v = value.trim();
    NaiveTime::parse_from_str(v, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M:%S"))
        .map_err(|_| ServiceError::validation(format!("{field} must be a time in HH:MM format")))
}

pub fn opt_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ServiceError> {
    value.filter(|v| !v.trim().is_empty()).map(|v| parse_date(field, v)).transpose()
}

pub fn hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Serde adapter accepting `HH:MM` as well as `HH:MM:SS`.
pub mod flex_time {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_time("time", &raw).map_err(serde::de::Error::custom)
    }
}

pub mod flex_time_opt {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => parse_time("time", &raw).map(Some).map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_time_forms() {
        assert_eq!(parse_time("t", "09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time("t", "09:30:15").unwrap(), NaiveTime::from_hms_opt(9, 30, 15).unwrap());
        assert!(parse_time("t", "9.30").is_err());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("date", "2024-02-30").is_err());
        assert_eq!(opt_date("date", Some("")).unwrap(), None);
        assert!(opt_date("date", Some("2024-02-29")).unwrap().is_some());
    }

    #[test]
    fn serde_adapter_parses_short_times() {
        #[derive(serde::Deserialize)]
        struct Body {
            #[serde(deserialize_with = "flex_time::deserialize")]
            at: NaiveTime,
            #[serde(default, deserialize_with = "flex_time_opt::deserialize")]
            until: Option<NaiveTime>,
        }
        let b: Body = serde_json::from_str(r#"{"at":"14:00"}"#).unwrap();
        assert_eq!(hhmm(b.at), "14:00");
        assert!(b.until.is_none());
    }
}
