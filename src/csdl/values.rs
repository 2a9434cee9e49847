//! Textual forms of constant expression values shared by both writers.

use std::fmt::Write as _;

use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeDelta};

///////////////////////////////////////////////////////////////////////////////

/// `INF`, `-INF` and `NaN` for the values JSON numbers cannot carry
pub fn special_float(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("INF")
    } else if value == f64::NEG_INFINITY {
        Some("-INF")
    } else {
        None
    }
}

pub fn format_float(value: f64) -> String {
    match special_float(value) {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn format_date_time_offset(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn format_time_of_day(value: &NaiveTime) -> String {
    value.format("%H:%M:%S%.f").to_string()
}

/// ISO 8601 day-time duration, e.g. `P1DT2H3M4.5S`
pub fn format_duration(value: &TimeDelta) -> String {
    let negative = *value < TimeDelta::zero();
    let value = if negative { -*value } else { *value };

    let total_seconds = value.num_seconds();
    let nanos = value.subsec_nanos();
    let days = total_seconds / 86_400;
    let hours = total_seconds % 86_400 / 3_600;
    let minutes = total_seconds % 3_600 / 60;
    let seconds = total_seconds % 60;

    let mut out = String::from(if negative { "-P" } else { "P" });
    if days > 0 {
        let _ = write!(out, "{days}D");
    }
    let has_time = hours > 0 || minutes > 0 || seconds > 0 || nanos > 0;
    if has_time || days == 0 {
        out.push('T');
        if hours > 0 {
            let _ = write!(out, "{hours}H");
        }
        if minutes > 0 {
            let _ = write!(out, "{minutes}M");
        }
        if seconds > 0 || nanos > 0 || (hours == 0 && minutes == 0) {
            let _ = write!(out, "{seconds}");
            if nanos > 0 {
                let fraction = format!("{nanos:09}");
                let _ = write!(out, ".{}", fraction.trim_end_matches('0'));
            }
            out.push('S');
        }
    }
    out
}

pub fn format_guid(value: &uuid::Uuid) -> String {
    value.hyphenated().to_string()
}

/// Standard alphabet with padding, used by CSDL-XML
pub fn format_binary_base64(value: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(value)
}

/// URL-safe alphabet without padding, used by CSDL-JSON
pub fn format_binary_base64url(value: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(value)
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

///////////////////////////////////////////////////////////////////////////////
