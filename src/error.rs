use crate::field::{Field, FieldValueType};
use thiserror::Error;

/// Crate specific Errors implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum CronError {
    /// Cron line has less than five time fields followed by a command.
    #[error("cron entry has {0} fields, at least {min} expected", min = crate::crontab::CRON_FIELDS)]
    TooFewFields(usize),
    /// All five time fields are `*`.
    #[error("cron entry is null: {0}")]
    NullEntry(String),
    /// Field token doesn't match any implemented pattern.
    #[error("time pattern is not implemented: {0}")]
    UnsupportedPattern(String),
    /// Numeric part of the field can't be converted into a number.
    #[error("invalid numeric value: {0}")]
    NumericConversion(String),
    /// Field value is out of the field's bounds.
    #[error("invalid {field} value: {value}")]
    InvalidFieldValue {
        /// Field the value belongs to.
        field: Field,
        /// Offending value as it was specified.
        value: String,
    },
    /// Step of the `*/n` pattern is out of the field's bounds.
    #[error("invalid repeating pattern: {0}")]
    InvalidRepeatingPattern(String),
    /// Day of month doesn't exist in the resolved month.
    #[error("invalid date: day {day} doesn't exist in month {month}")]
    InvalidDate {
        /// Resolved month.
        month: FieldValueType,
        /// Requested day of month.
        day: FieldValueType,
    },
}

/// Error of a single crontab line, produced by [`parse_all`](crate::crontab::parse_all).
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[error("line {line}: {source}")]
pub struct LineError {
    /// 1-based number of the failed line.
    pub line: usize,
    /// Reason of the failure.
    pub source: CronError,
}
