// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use crate::{EntityKind, RowId, TableSchema};

/// One typed field value as seen by filters, editors and renderers.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
    /// Wire name of an enumerated option.
    Choice(&'static str),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&'static str> {
        match self {
            Self::Choice(value) => Some(value),
            _ => None,
        }
    }

    /// Exact comparison against a filter option key. Flags compare as
    /// `"true"`/`"false"`.
    pub fn matches_key(&self, key: &str) -> bool {
        match self {
            Self::Text(value) => value == key,
            Self::Number(value) => key.parse::<f64>().is_ok_and(|parsed| parsed == *value),
            Self::Flag(value) => key == if *value { "true" } else { "false" },
            Self::Choice(value) => *value == key,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => format_number(*value),
            Self::Flag(true) => "true".to_owned(),
            Self::Flag(false) => "false".to_owned(),
            Self::Choice(value) => (*value).to_owned(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// A row of one entity kind. Field names are the camelCase wire names used
/// by the schemas.
pub trait Record: Clone + fmt::Debug + 'static {
    const KIND: EntityKind;

    fn schema() -> &'static TableSchema;

    fn id(&self) -> &RowId;

    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Writes one field. Returns false when the field is unknown, read-only
    /// (`id`) or the value has the wrong shape; the record is then untouched.
    fn set_field(&mut self, name: &str, value: &FieldValue) -> bool;
}

pub(crate) fn number_to_count(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, format_number, number_to_count};

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn matches_key_compares_by_shape() {
        assert!(FieldValue::Flag(true).matches_key("true"));
        assert!(!FieldValue::Flag(false).matches_key("true"));
        assert!(FieldValue::Choice("Active").matches_key("Active"));
        assert!(!FieldValue::Choice("Active").matches_key("active"));
        assert!(FieldValue::Number(5.0).matches_key("5"));
        assert!(FieldValue::text("vcc").matches_key("vcc"));
    }

    #[test]
    fn count_conversion_truncates_and_zeroes_non_finite() {
        assert_eq!(number_to_count(3.9), 3);
        assert_eq!(number_to_count(f64::NAN), 0);
        assert_eq!(number_to_count(f64::INFINITY), 0);
    }
}
