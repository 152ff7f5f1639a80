use crate::{
    entry::ScheduleEntry,
    field::{Field, FieldValue, FieldValueType},
    utils, CronError, Result,
};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use std::{cmp::Reverse, collections::BinaryHeap};

/// Max number of years to look through for a date like February 29.
const MAX_YEARS_LOOKUP: i32 = 8;

/// Resolved calendar time of a schedule entry with the command to run.
///
/// Occurrences are ordered by time first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occurrence {
    /// Time to run the command at.
    pub timestamp: DateTime<Utc>,
    /// Command to run.
    pub command: String,
}

/// Result of the [`ScheduleEntry`] resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Entry has no field set and does nothing.
    Nothing,
    /// Entry has fixed fields only and resolves to a single occurrence.
    Once(Occurrence),
    /// Entry has `*/n` fields and resolves once per concrete combination of values.
    Repeating {
        /// Occurrences of all valid combinations, ordered by time.
        occurrences: Vec<Occurrence>,
        /// Errors of combinations without such a date, in the combinations order.
        errors: Vec<CronError>,
    },
}

impl Resolution {
    /// Consumes the resolution and returns all its occurrences.
    pub fn into_occurrences(self) -> Vec<Occurrence> {
        match self {
            Self::Nothing => vec![],
            Self::Once(occurrence) => vec![occurrence],
            Self::Repeating { occurrences, .. } => occurrences,
        }
    }
}

/// Truncates `time` to the start of its day.
pub fn anchor(time: &DateTime<Utc>) -> DateTime<Utc> {
    time.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Returns the start of the current day, use it once per resolution pass to get reproducible results.
pub fn anchor_now() -> DateTime<Utc> {
    anchor(&Utc::now())
}

/// Resolves `entry` starting from the midnight of `anchor`.
///
/// Fixed fields are applied from the biggest one to the smallest:
/// day of week (moves forward to the nearest following day with that weekday),
/// month, day of month, hour and minute. Each step overwrites its own part of the date only.
///
/// Every `*/n` field is expanded into all multiples of `n` within the field's bounds,
/// and each combination with the fixed fields is resolved separately.
/// Combinations with nonexistent dates are reported in [`Resolution::Repeating`] next to
/// the valid ones. If no combination is valid, the first error is returned.
///
/// Returns [`CronError::InvalidDate`] if both month and day of month are set,
/// but there is no such day in that month.
pub fn resolve(entry: &ScheduleEntry, anchor: &DateTime<Utc>) -> Result<Resolution> {
    if entry.is_null() {
        return Ok(Resolution::Nothing);
    }
    check_bounds(entry)?;

    if !entry.is_repeating() {
        let timestamp = resolve_fixed(&Pattern::fixed(entry), anchor)?;
        return Ok(Resolution::Once(Occurrence {
            timestamp,
            command: entry.command().to_owned(),
        }));
    }

    let mut occurrences = vec![];
    let mut errors = vec![];
    for pattern in combinations(entry) {
        match resolve_fixed(&pattern, anchor) {
            Ok(timestamp) => occurrences.push(Occurrence {
                timestamp,
                command: entry.command().to_owned(),
            }),
            Err(err) => {
                tracing::debug!(entry = %entry, error = %err, "combination has no such date");
                errors.push(err);
            }
        }
    }

    if occurrences.is_empty() && !errors.is_empty() {
        return Err(errors.swap_remove(0));
    }

    occurrences.sort();
    Ok(Resolution::Repeating { occurrences, errors })
}

/// Returns a lazy series of up to `count` first occurrences of `entry` starting from the midnight of `anchor`.
///
/// The first occurrence of every concrete combination is the one [`resolve`] gives, next ones carry
/// into the unit right above the biggest fixed field: yearly if month is set, monthly for day of month,
/// weekly for day of week, daily for hour and hourly for minute.
/// Series of all combinations are merged in time order, combinations without such a date
/// are listed by [`Upcoming::errors`]. If no combination is valid, the first error is returned.
pub fn upcoming(entry: &ScheduleEntry, anchor: &DateTime<Utc>, count: usize) -> Result<Upcoming> {
    let mut upcoming = Upcoming {
        pending: BinaryHeap::new(),
        command: entry.command().to_owned(),
        remaining: count,
        errors: vec![],
    };
    if entry.is_null() || count == 0 {
        return Ok(upcoming);
    }
    check_bounds(entry)?;

    // series starting after the `count` earliest ones can't contribute
    let mut earliest = BinaryHeap::new();
    for pattern in combinations(entry) {
        match Cursor::start(&pattern, anchor) {
            Ok(cursor) => {
                earliest.push(cursor);
                if earliest.len() > count {
                    earliest.pop();
                }
            }
            Err(err) => {
                tracing::debug!(entry = %entry, error = %err, "combination has no such date");
                upcoming.errors.push(err);
            }
        }
    }

    if earliest.is_empty() && !upcoming.errors.is_empty() {
        return Err(upcoming.errors.swap_remove(0));
    }

    upcoming.pending = earliest.into_iter().map(Reverse).collect();
    Ok(upcoming)
}

/// Lazy series of occurrences of an entry with fixed fields only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrences {
    cursor: Option<Cursor>,
    command: String,
}

impl Occurrences {
    /// Resolves the first occurrence of `entry` and prepares the series.
    ///
    /// Use [`upcoming`] for repeating entries, their `*/n` fields are ignored here.
    pub fn new(entry: &ScheduleEntry, anchor: &DateTime<Utc>) -> Result<Self> {
        let cursor = if entry.is_null() {
            None
        } else {
            check_bounds(entry)?;
            Some(Cursor::start(&Pattern::fixed(entry), anchor)?)
        };

        Ok(Self {
            cursor,
            command: entry.command().to_owned(),
        })
    }
}

impl Iterator for Occurrences {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.take()?;
        self.cursor = cursor.advance();
        Some(Occurrence {
            timestamp: cursor.timestamp,
            command: self.command.clone(),
        })
    }
}

/// Time ordered merge of the series of every concrete combination of an entry, see [`upcoming`].
#[derive(Debug, Clone)]
pub struct Upcoming {
    pending: BinaryHeap<Reverse<Cursor>>,
    command: String,
    remaining: usize,
    errors: Vec<CronError>,
}

impl Upcoming {
    /// Errors of the combinations which have no such date and take no part in the series.
    pub fn errors(&self) -> &[CronError] {
        &self.errors
    }
}

impl Iterator for Upcoming {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let Reverse(cursor) = self.pending.pop()?;
        if let Some(next) = cursor.advance() {
            self.pending.push(Reverse(next));
        }
        self.remaining -= 1;

        Some(Occurrence {
            timestamp: cursor.timestamp,
            command: self.command.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Concrete values of the time fields, unset ones don't constrain the date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
struct Pattern {
    minute: Option<u32>,
    hour: Option<u32>,
    dom: Option<u32>,
    month: Option<u32>,
    dow: Option<u32>,
}

impl Pattern {
    /// Takes fixed fields of the entry, `*/n` ones stay unset.
    fn fixed(entry: &ScheduleEntry) -> Self {
        Self::from_values(Field::ALL.map(|field| match entry.get(field) {
            Some(FieldValue::Fixed(value)) => Some(value),
            _ => None,
        }))
    }

    fn from_values(values: [Option<FieldValueType>; 5]) -> Self {
        let [minute, hour, dom, month, dow] = values.map(|value| value.map(u32::from));
        Self {
            minute,
            hour,
            dom,
            month,
            dow,
        }
    }
}

/// Every concrete combination of an entry's values, `*/n` fields are replaced with their series.
#[derive(Debug, Clone)]
struct Combinations {
    choices: [Vec<Option<FieldValueType>>; 5],
    indices: Option<[usize; 5]>,
}

fn combinations(entry: &ScheduleEntry) -> Combinations {
    let choices = Field::ALL.map(|field| match entry.get(field) {
        None => vec![None],
        Some(FieldValue::Fixed(value)) => vec![Some(value)],
        Some(FieldValue::Every(step)) => field.series(step).map(Some).collect(),
    });
    let indices = choices.iter().all(|values| !values.is_empty()).then_some([0; 5]);

    Combinations { choices, indices }
}

impl Iterator for Combinations {
    type Item = Pattern;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.indices?;
        let values: [Option<FieldValueType>; 5] = std::array::from_fn(|idx| self.choices[idx][current[idx]]);

        // minute is the fastest digit
        let mut next = current;
        self.indices = None;
        for (idx, values) in self.choices.iter().enumerate() {
            next[idx] += 1;
            if next[idx] < values.len() {
                self.indices = Some(next);
                break;
            }
            next[idx] = 0;
        }

        Some(Pattern::from_values(values))
    }
}

/// Period of the fixed entry, the unit right above its biggest set field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Cadence {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
}

impl Cadence {
    fn of(pattern: &Pattern) -> Self {
        if pattern.month.is_some() {
            Self::Yearly
        } else if pattern.dom.is_some() {
            Self::Monthly
        } else if pattern.dow.is_some() {
            Self::Weekly
        } else if pattern.hour.is_some() {
            Self::Daily
        } else {
            Self::Hourly
        }
    }
}

/// Position in the series of a single concrete combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Cursor {
    timestamp: DateTime<Utc>,
    cadence: Cadence,
    /// Requested day of month, the anchor's day if it's unset.
    day: u32,
    /// Unset day of month sticks to the last day of shorter months.
    day_fixed: bool,
}

impl Cursor {
    fn start(pattern: &Pattern, anchor: &DateTime<Utc>) -> Result<Self> {
        let date = weekday_from(anchor.date_naive(), pattern.dow)?;
        Ok(Self {
            timestamp: place(pattern, date)?,
            cadence: Cadence::of(pattern),
            day: pattern.dom.unwrap_or(date.day()),
            day_fixed: pattern.dom.is_some(),
        })
    }

    /// Returns the next position, skipping months and years without the fixed day.
    fn advance(&self) -> Option<Self> {
        let current = self.timestamp;
        let time = current.time();
        let timestamp = match self.cadence {
            Cadence::Hourly => current.checked_add_signed(TimeDelta::hours(1)),
            Cadence::Daily => current.checked_add_signed(TimeDelta::days(1)),
            Cadence::Weekly => current.checked_add_signed(TimeDelta::weeks(1)),
            Cadence::Monthly => {
                let (mut year, mut month) = (current.year(), current.month());
                let mut date = None;
                // any day of month exists at least once in 12 months
                for _ in 0..12 {
                    (year, month) = utils::next_month(year, month);
                    date = self.date_in(year, month);
                    if date.is_some() {
                        break;
                    }
                }
                date.map(|date| date.and_time(time).and_utc())
            }
            Cadence::Yearly => (1..=MAX_YEARS_LOOKUP)
                .find_map(|shift| self.date_in(current.year() + shift, current.month()))
                .map(|date| date.and_time(time).and_utc()),
        }?;

        Some(Self { timestamp, ..*self })
    }

    fn date_in(&self, year: i32, month: u32) -> Option<NaiveDate> {
        let day = if self.day_fixed {
            self.day
        } else {
            self.day.min(utils::days_in_month(year, month)?)
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Resolves fixed values of the pattern, see [`resolve`].
fn resolve_fixed(pattern: &Pattern, anchor: &DateTime<Utc>) -> Result<DateTime<Utc>> {
    place(pattern, weekday_from(anchor.date_naive(), pattern.dow)?)
}

/// Moves `date` to the nearest following day of the `dow` weekday, it never stays on the same day.
fn weekday_from(date: NaiveDate, dow: Option<u32>) -> Result<NaiveDate> {
    let Some(dow) = dow else {
        return Ok(date);
    };

    let shift = match (dow + 7 - date.weekday().num_days_from_sunday()) % 7 {
        0 => 7,
        shift => shift,
    };
    date.checked_add_days(Days::new(u64::from(shift)))
        .ok_or(CronError::InvalidDate {
            month: date.month() as FieldValueType,
            day: date.day() as FieldValueType,
        })
}

/// Overwrites month, day of month and time of `date` with the pattern's values.
fn place(pattern: &Pattern, date: NaiveDate) -> Result<DateTime<Utc>> {
    let mut year = date.year();
    let mut month = pattern.month.unwrap_or(date.month());
    let day = pattern.dom.unwrap_or(date.day());

    let date = match (pattern.month, pattern.dom) {
        (Some(_), Some(_)) => NaiveDate::from_ymd_opt(year, month, day),
        (Some(_), None) => {
            // unconstrained day beyond the month's end sticks to its last day
            let last = utils::days_in_month(year, month).unwrap_or(day);
            NaiveDate::from_ymd_opt(year, month, day.min(last))
        }
        (None, Some(_)) => {
            // carry to the next month which has this day
            let mut result = NaiveDate::from_ymd_opt(year, month, day);
            for _ in 0..12 {
                if result.is_some() {
                    break;
                }
                (year, month) = utils::next_month(year, month);
                result = NaiveDate::from_ymd_opt(year, month, day);
            }
            result
        }
        (None, None) => Some(date),
    }
    .ok_or(CronError::InvalidDate {
        month: month as FieldValueType,
        day: day as FieldValueType,
    })?;

    let hour = pattern.hour.unwrap_or(0);
    let minute = pattern.minute.unwrap_or(0);
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        let (field, value) = if hour > 23 {
            (Field::Hours, hour)
        } else {
            (Field::Minutes, minute)
        };
        CronError::InvalidFieldValue {
            field,
            value: value.to_string(),
        }
    })?;

    Ok(date.and_time(time).and_utc())
}

/// Checks every set field of the entry against the field bounds.
fn check_bounds(entry: &ScheduleEntry) -> Result<()> {
    for field in Field::ALL {
        let (min, max) = field.min_max();
        match entry.get(field) {
            Some(FieldValue::Fixed(value)) if value < min || value > max => {
                return Err(CronError::InvalidFieldValue {
                    field,
                    value: value.to_string(),
                });
            }
            Some(FieldValue::Every(step)) if step == 0 || step > max => {
                return Err(CronError::InvalidRepeatingPattern(FieldValue::Every(step).to_string()));
            }
            _ => {}
        }
    }

    Ok(())
}

impl ScheduleEntry {
    /// Resolves the entry starting from the midnight of `anchor`, see [`resolve`].
    #[inline]
    pub fn resolve(&self, anchor: &DateTime<Utc>) -> Result<Resolution> {
        resolve(self, anchor)
    }

    /// Returns a series of up to `count` first occurrences of the entry, see [`upcoming`].
    #[inline]
    pub fn upcoming(&self, anchor: &DateTime<Utc>, count: usize) -> Result<Upcoming> {
        upcoming(self, anchor, count)
    }
}
