// src/extractors/composite.rs
//! Micro-grammars for cells that pack two or three numbers into one token.
//!
//! Every parser takes the metric name it is filling so a mismatch can be
//! reported as `ExtractError::MalformedField` with the offending text. The
//! patterns are anchored at the start of the token only.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::extractors::value::{coerce, Value};
use crate::utils::error::ExtractError;

static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+)\s*\((\d{4}\.\d{2}\.\d{2})\s*-\s*(\d{4}\.\d{2}\.\d{2})\)")
        .expect("Failed to compile PERIOD_RE")
});

static VALUE_PERCENTAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-*\d+(?:\.\d+)*)\s+\((-*\d+(?:\.\d+)*)%\)")
        .expect("Failed to compile VALUE_PERCENTAGE_RE")
});

static PERCENTAGE_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-*\d+(?:\.\d+)*)%\s+\((-*\d+(?:\.\d+)*)\)")
        .expect("Failed to compile PERCENTAGE_VALUE_RE")
});

static VALUE_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-*\d+(?:\.\d+)*)\s+\((-*\d+(?:\.\d+)*)\)")
        .expect("Failed to compile VALUE_PAIR_RE")
});

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d+):(\d+)").expect("Failed to compile DURATION_RE")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub period: String,
    pub date_start: String,
    pub date_end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuePercentage {
    pub value: Value,
    pub percentage: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueOf {
    pub value: Value,
    pub of: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueDiff {
    pub value: Value,
    pub diff: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duration {
    pub h: Value,
    pub m: Value,
    pub s: Value,
}

fn captures<'t>(re: &Regex, field: &str, raw: &'t str) -> Result<regex::Captures<'t>, ExtractError> {
    re.captures(raw).ok_or_else(|| {
        tracing::error!("Could not parse {}: \"{}\"", field, raw);
        ExtractError::malformed(field, raw)
    })
}

/// `H1 (2023.01.01 - 2023.01.31)`
pub fn parse_period(field: &str, raw: &str) -> Result<Period, ExtractError> {
    let caps = captures(&PERIOD_RE, field, raw)?;
    Ok(Period {
        period: caps[1].to_string(),
        date_start: caps[2].to_string(),
        date_end: caps[3].to_string(),
    })
}

/// `1 234.50 (12.34%)`
pub fn parse_value_percentage(field: &str, raw: &str) -> Result<ValuePercentage, ExtractError> {
    let caps = captures(&VALUE_PERCENTAGE_RE, field, raw)?;
    Ok(ValuePercentage {
        value: coerce(&caps[1]),
        percentage: coerce(&caps[2]),
    })
}

/// `12.34% (1 234.50)`, normalized to the same shape as [`parse_value_percentage`].
pub fn parse_percentage_value(field: &str, raw: &str) -> Result<ValuePercentage, ExtractError> {
    let caps = captures(&PERCENTAGE_VALUE_RE, field, raw)?;
    Ok(ValuePercentage {
        value: coerce(&caps[2]),
        percentage: coerce(&caps[1]),
    })
}

pub fn parse_value_of(field: &str, raw: &str) -> Result<ValueOf, ExtractError> {
    let caps = captures(&VALUE_PAIR_RE, field, raw)?;
    Ok(ValueOf {
        value: coerce(&caps[1]),
        of: coerce(&caps[2]),
    })
}

pub fn parse_value_diff(field: &str, raw: &str) -> Result<ValueDiff, ExtractError> {
    let caps = captures(&VALUE_PAIR_RE, field, raw)?;
    Ok(ValueDiff {
        value: coerce(&caps[1]),
        diff: coerce(&caps[2]),
    })
}

/// `hh:mm:ss`, hours unbounded.
pub fn parse_duration(field: &str, raw: &str) -> Result<Duration, ExtractError> {
    let caps = captures(&DURATION_RE, field, raw)?;
    Ok(Duration {
        h: coerce(&caps[1]),
        m: coerce(&caps[2]),
        s: coerce(&caps[3]),
    })
}
