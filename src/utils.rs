/// Common utility functions.
use crate::{field::FieldValueType, CronError, Result};
use chrono::NaiveDate;

/// Converts string into unsigned number without bounds validation.
pub(crate) fn parse_number(input: &str) -> Result<FieldValueType> {
    input
        .parse::<FieldValueType>()
        .map_err(|_| CronError::NumericConversion(input.to_owned()))
}

/// Returns number of days in specified month, `None` if month is out of `1..=12`.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (following_year, following_month) = next_month(year, month);
    let next = NaiveDate::from_ymd_opt(following_year, following_month, 1)?;
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Returns `(year, month)` of the month following the specified one.
#[inline]
pub(crate) fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parse_number_valid_values() {
        assert_eq!(parse_number("5"), Ok(5));
        assert_eq!(parse_number("0"), Ok(0));
        assert_eq!(parse_number("59"), Ok(59));
        assert_eq!(parse_number("07"), Ok(7));
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case("-1")]
    #[case("1.5")]
    #[case("256")]
    #[case(" 5")]
    fn parse_number_invalid_input(#[case] input: &str) {
        assert_eq!(parse_number(input), Err(CronError::NumericConversion(input.to_owned())));
    }

    #[rstest]
    #[case(2023, 1, Some(31))]
    #[case(2023, 4, Some(30))]
    #[case(2023, 9, Some(30))]
    #[case(2023, 12, Some(31))]
    #[case(2023, 2, Some(28))]
    #[case(2024, 2, Some(29))]
    #[case(2000, 2, Some(29))]
    #[case(1900, 2, Some(28))]
    #[case(2023, 0, None)]
    #[case(2023, 13, None)]
    fn test_days_in_month(#[case] y: i32, #[case] m: u32, #[case] expected: Option<u32>) {
        assert_eq!(days_in_month(y, m), expected, "{y:04}-{m:02} has {expected:?} days");
    }

    #[rstest]
    #[case(2024, 1, (2024, 2))]
    #[case(2024, 11, (2024, 12))]
    #[case(2024, 12, (2025, 1))]
    fn test_next_month(#[case] y: i32, #[case] m: u32, #[case] expected: (i32, u32)) {
        assert_eq!(next_month(y, m), expected);
    }
}
