use crate::{series::StepSeries, utils, CronError, Result};
use regex::Regex;
use std::{fmt::Display, sync::LazyLock};

/// Numeric type of every cron field value.
pub type FieldValueType = u8;

static SIMPLE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{1,2}-[0-9]{1,2}$").unwrap());
static COMPLEX_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}-[0-9]{1,2}/[0-9]{1,2}$").unwrap());
static SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{1,2}$").unwrap());
static REPEAT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*/[0-9]{1,2}$").unwrap());
static LIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{1,2}(,[0-9]{1,2})+$").unwrap());

/// One of the five time fields of a crontab line, in the order they appear in the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    /// Minute of the hour.
    Minutes,
    /// Hour of the day.
    Hours,
    /// Day of the month.
    Doms,
    /// Month of the year.
    Months,
    /// Day of the week, `0` is Sunday.
    Dows,
}

impl Field {
    /// All fields in the crontab line order.
    pub const ALL: [Field; 5] = [Self::Minutes, Self::Hours, Self::Doms, Self::Months, Self::Dows];

    /// Returns inclusive bounds of the field's values.
    pub fn min_max(&self) -> (FieldValueType, FieldValueType) {
        match self {
            Self::Minutes => (0, 59),
            Self::Hours => (0, 23),
            Self::Doms => (1, 31),
            Self::Months => (1, 12),
            Self::Dows => (0, 6),
        }
    }

    /// Parses a number and checks it against the field's bounds.
    fn parse(&self, input: &str) -> Result<FieldValueType> {
        let (min, max) = self.min_max();
        let value = utils::parse_number(input)?;
        if value < min || value > max {
            Err(CronError::InvalidFieldValue {
                field: *self,
                value: input.to_owned(),
            })
        } else {
            Ok(value)
        }
    }

    /// Returns every value of the `*/step` series within the field's bounds.
    pub(crate) fn series(&self, step: FieldValueType) -> impl Iterator<Item = FieldValueType> {
        let (min, max) = self.min_max();
        StepSeries::new(min, max, step)
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Minutes => "minute",
            Self::Hours => "hour",
            Self::Doms => "day of month",
            Self::Months => "month",
            Self::Dows => "day of week",
        };
        write!(f, "{name}")
    }
}

/// Kind of the raw field token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `*`: field isn't constrained.
    Unused,
    /// `n`: particular value.
    Single,
    /// `*/n`: every `n` units.
    Repeat,
    /// `n,n,...`: list of particular values.
    List,
    /// Anything else, including ranges and mnemonic names.
    NotImplemented,
}

/// Determines kind of the raw field token.
///
/// Range forms are checked first so they never pass as a single value or a list.
pub fn classify(token: &str) -> FieldKind {
    if SIMPLE_RANGE_RE.is_match(token) || COMPLEX_RANGE_RE.is_match(token) {
        FieldKind::NotImplemented
    } else if token == "*" {
        FieldKind::Unused
    } else if SINGLE_RE.is_match(token) {
        FieldKind::Single
    } else if REPEAT_RE.is_match(token) {
        FieldKind::Repeat
    } else if LIST_RE.is_match(token) {
        FieldKind::List
    } else {
        FieldKind::NotImplemented
    }
}

/// Concrete value of a field in a [`ScheduleEntry`](crate::ScheduleEntry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// Particular value.
    Fixed(FieldValueType),
    /// Every `n` units, `*/n`.
    Every(FieldValueType),
}

impl FieldValue {
    /// Returns the number carried by the value: the value itself or the step.
    pub fn value(&self) -> FieldValueType {
        match self {
            Self::Fixed(value) | Self::Every(value) => *value,
        }
    }

    /// Returns `true` for `*/n` values.
    pub fn is_repeating(&self) -> bool {
        matches!(self, Self::Every(_))
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(value) => write!(f, "{value}"),
            Self::Every(step) => write!(f, "*/{step}"),
        }
    }
}

/// Values denoted by a single raw field token, in the order of the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldValueSet {
    values: Vec<FieldValueType>,
    repeating: bool,
}

impl FieldValueSet {
    /// Classifies and expands the raw `token` of the `field`.
    pub fn parse(field: Field, token: &str) -> Result<Self> {
        Self::expand(field, token, classify(token))
    }

    /// Expands the raw `token` of already known `kind`.
    ///
    /// Returns [`CronError::UnsupportedPattern`] for [`FieldKind::NotImplemented`],
    /// [`CronError::NumericConversion`] if the token doesn't hold numbers where `kind` expects them.
    pub fn expand(field: Field, token: &str, kind: FieldKind) -> Result<Self> {
        match kind {
            FieldKind::NotImplemented => Err(CronError::UnsupportedPattern(token.to_owned())),
            FieldKind::Unused => Ok(Self::default()),
            FieldKind::Single => Ok(Self {
                values: vec![field.parse(token)?],
                repeating: false,
            }),
            FieldKind::Repeat => {
                let step = token
                    .split_once('/')
                    .map(|(_, step)| step)
                    .ok_or_else(|| CronError::NumericConversion(token.to_owned()))?;
                let step = utils::parse_number(step)?;
                let (_min, max) = field.min_max();
                if step == 0 || step > max {
                    return Err(CronError::InvalidRepeatingPattern(token.to_owned()));
                }
                Ok(Self {
                    values: vec![step],
                    repeating: true,
                })
            }
            FieldKind::List => Ok(Self {
                values: token.split(',').map(|value| field.parse(value)).collect::<Result<_>>()?,
                repeating: false,
            }),
        }
    }

    /// Values of the set, `*/n` sets hold the single step value.
    pub fn values(&self) -> &[FieldValueType] {
        &self.values
    }

    /// Returns `true` if the set came from `*/n` token.
    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    /// Returns `true` if the field is unused (`*`).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of values in the set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over set members as entry field values.
    pub(crate) fn iter(&self) -> impl Iterator<Item = FieldValue> + '_ {
        let repeating = self.repeating;
        self.values.iter().map(move |value| {
            if repeating {
                FieldValue::Every(*value)
            } else {
                FieldValue::Fixed(*value)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("*", FieldKind::Unused)]
    #[case("0", FieldKind::Single)]
    #[case("5", FieldKind::Single)]
    #[case("59", FieldKind::Single)]
    #[case("*/5", FieldKind::Repeat)]
    #[case("*/15", FieldKind::Repeat)]
    #[case("10,15", FieldKind::List)]
    #[case("0,2,4", FieldKind::List)]
    #[case("1-2", FieldKind::NotImplemented)]
    #[case("9-12", FieldKind::NotImplemented)]
    #[case("1-2/3", FieldKind::NotImplemented)]
    #[case("JAN", FieldKind::NotImplemented)]
    #[case("MON", FieldKind::NotImplemented)]
    #[case("SUN", FieldKind::NotImplemented)]
    #[case("π", FieldKind::NotImplemented)]
    #[case("١", FieldKind::NotImplemented)]
    #[case("123", FieldKind::NotImplemented)]
    #[case("", FieldKind::NotImplemented)]
    #[case("**", FieldKind::NotImplemented)]
    #[case("*/", FieldKind::NotImplemented)]
    #[case("5/2", FieldKind::NotImplemented)]
    #[case("1,", FieldKind::NotImplemented)]
    #[case("1,abc", FieldKind::NotImplemented)]
    #[case("1,2-3", FieldKind::NotImplemented)]
    #[case("?", FieldKind::NotImplemented)]
    #[case("L", FieldKind::NotImplemented)]
    fn test_classify(#[case] token: &str, #[case] expected: FieldKind) {
        assert_eq!(classify(token), expected, "token = {token}");
    }

    #[rstest]
    #[case(Field::Minutes, "*", vec![], false)]
    #[case(Field::Minutes, "5", vec![5], false)]
    #[case(Field::Minutes, "*/15", vec![15], true)]
    #[case(Field::Minutes, "15,10", vec![15, 10], false)]
    #[case(Field::Hours, "20,16", vec![20, 16], false)]
    #[case(Field::Hours, "0,2,4", vec![0, 2, 4], false)]
    #[case(Field::Doms, "1", vec![1], false)]
    #[case(Field::Doms, "*/1", vec![1], true)]
    #[case(Field::Months, "2,8", vec![2, 8], false)]
    #[case(Field::Dows, "0", vec![0], false)]
    #[case(Field::Dows, "5,6", vec![5, 6], false)]
    fn test_parse_valid(
        #[case] field: Field,
        #[case] token: &str,
        #[case] values: Vec<FieldValueType>,
        #[case] repeating: bool,
    ) {
        let set = FieldValueSet::parse(field, token).unwrap();
        assert_eq!(set.values(), values.as_slice(), "token = {token}");
        assert_eq!(set.is_repeating(), repeating, "token = {token}");
        assert_eq!(set.is_empty(), values.is_empty());
        assert_eq!(set.len(), values.len());

        // pure function: the same token gives the same result
        assert_eq!(FieldValueSet::parse(field, token).unwrap(), set);
    }

    #[test]
    fn unused_differs_from_sunday() {
        let unused = FieldValueSet::parse(Field::Dows, "*").unwrap();
        let sunday = FieldValueSet::parse(Field::Dows, "0").unwrap();

        assert!(unused.is_empty());
        assert_eq!(sunday.values(), &[0]);
        assert_ne!(unused, sunday);
    }

    #[rstest]
    #[case(Field::Minutes, "60", CronError::InvalidFieldValue { field: Field::Minutes, value: "60".into() })]
    #[case(Field::Hours, "24", CronError::InvalidFieldValue { field: Field::Hours, value: "24".into() })]
    #[case(Field::Doms, "0", CronError::InvalidFieldValue { field: Field::Doms, value: "0".into() })]
    #[case(Field::Doms, "32", CronError::InvalidFieldValue { field: Field::Doms, value: "32".into() })]
    #[case(Field::Months, "13", CronError::InvalidFieldValue { field: Field::Months, value: "13".into() })]
    #[case(Field::Months, "1,0", CronError::InvalidFieldValue { field: Field::Months, value: "0".into() })]
    #[case(Field::Dows, "7", CronError::InvalidFieldValue { field: Field::Dows, value: "7".into() })]
    #[case(Field::Minutes, "*/0", CronError::InvalidRepeatingPattern("*/0".into()))]
    #[case(Field::Hours, "*/24", CronError::InvalidRepeatingPattern("*/24".into()))]
    #[case(Field::Dows, "*/7", CronError::InvalidRepeatingPattern("*/7".into()))]
    #[case(Field::Months, "JAN", CronError::UnsupportedPattern("JAN".into()))]
    #[case(Field::Dows, "MON", CronError::UnsupportedPattern("MON".into()))]
    #[case(Field::Hours, "1-2", CronError::UnsupportedPattern("1-2".into()))]
    #[case(Field::Hours, "1-2/3", CronError::UnsupportedPattern("1-2/3".into()))]
    #[case(Field::Minutes, "π", CronError::UnsupportedPattern("π".into()))]
    fn test_parse_invalid(#[case] field: Field, #[case] token: &str, #[case] expected: CronError) {
        assert_eq!(FieldValueSet::parse(field, token), Err(expected), "token = {token}");
    }

    #[rstest]
    #[case("x", FieldKind::Single)]
    #[case("*/x", FieldKind::Repeat)]
    #[case("5", FieldKind::Repeat)]
    #[case("1,x", FieldKind::List)]
    fn test_expand_mismatched_kind(#[case] token: &str, #[case] kind: FieldKind) {
        assert!(matches!(
            FieldValueSet::expand(Field::Minutes, token, kind),
            Err(CronError::NumericConversion(_))
        ));
    }

    #[test]
    fn test_field_value() {
        assert_eq!(FieldValue::Fixed(5).value(), 5);
        assert_eq!(FieldValue::Every(15).value(), 15);
        assert!(!FieldValue::Fixed(5).is_repeating());
        assert!(FieldValue::Every(15).is_repeating());
        assert_eq!(FieldValue::Fixed(5).to_string(), "5");
        assert_eq!(FieldValue::Every(15).to_string(), "*/15");
    }

    #[rstest]
    #[case(Field::Minutes, 15, vec![0, 15, 30, 45])]
    #[case(Field::Hours, 6, vec![0, 6, 12, 18])]
    #[case(Field::Doms, 10, vec![1, 11, 21, 31])]
    #[case(Field::Months, 4, vec![1, 5, 9])]
    #[case(Field::Dows, 3, vec![0, 3, 6])]
    fn test_field_series(#[case] field: Field, #[case] step: FieldValueType, #[case] expected: Vec<FieldValueType>) {
        assert_eq!(field.series(step).collect::<Vec<_>>(), expected);
    }
}
