use crate::field::{Field, FieldValue, FieldValueSet};
use std::fmt::Display;

/// One fully concrete variant of a crontab line: at most one value per field.
///
/// An absent field isn't constrained and takes no part in the date resolution,
/// which is different from any particular value (`0` is Sunday for the day of week, for example).
///
/// Entries are produced by [`expand`] (usually via [`parse_line`](crate::parse_line)
/// or [`parse_all`](crate::parse_all)) and may be constructed manually with [`ScheduleEntry::new`]
/// and [`ScheduleEntry::with`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleEntry {
    minute: Option<FieldValue>,
    hour: Option<FieldValue>,
    dom: Option<FieldValue>,
    month: Option<FieldValue>,
    dow: Option<FieldValue>,
    command: String,
}

impl ScheduleEntry {
    /// Creates an entry without any time constraint.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Returns the entry with `field` set to `value`.
    #[must_use]
    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        *self.slot(field) = Some(value);
        self
    }

    /// Value of the `field`, `None` if the field is unused.
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Minutes => self.minute,
            Field::Hours => self.hour,
            Field::Doms => self.dom,
            Field::Months => self.month,
            Field::Dows => self.dow,
        }
    }

    /// Minute value.
    pub fn minute(&self) -> Option<FieldValue> {
        self.minute
    }

    /// Hour value.
    pub fn hour(&self) -> Option<FieldValue> {
        self.hour
    }

    /// Day of month value.
    pub fn dom(&self) -> Option<FieldValue> {
        self.dom
    }

    /// Month value.
    pub fn month(&self) -> Option<FieldValue> {
        self.month
    }

    /// Day of week value.
    pub fn dow(&self) -> Option<FieldValue> {
        self.dow
    }

    /// Command to run.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns `true` if `field` is `*/n`.
    pub fn is_field_repeating(&self, field: Field) -> bool {
        self.get(field).is_some_and(|value| value.is_repeating())
    }

    /// Returns `true` if any field is `*/n`.
    pub fn is_repeating(&self) -> bool {
        Field::ALL.iter().any(|field| self.is_field_repeating(*field))
    }

    /// Returns `true` if no field is set, so the entry does nothing.
    pub fn is_null(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_none())
    }

    fn slot(&mut self, field: Field) -> &mut Option<FieldValue> {
        match field {
            Field::Minutes => &mut self.minute,
            Field::Hours => &mut self.hour,
            Field::Doms => &mut self.dom,
            Field::Months => &mut self.month,
            Field::Dows => &mut self.dow,
        }
    }
}

impl Display for ScheduleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for field in Field::ALL {
            match self.get(field) {
                Some(value) => write!(f, "{value} ")?,
                None => write!(f, "* ")?,
            }
        }
        write!(f, "{}", self.command)
    }
}

/// Builds one entry per permutation of the field values.
///
/// Fields are crossed in the line order: minute, hour, day of month, month, day of week.
/// Every member of a multi-valued set multiplies the entries accumulated so far,
/// an empty (unused) set leaves the field absent.
/// `sets` are expected in the [`Field::ALL`] order.
pub fn expand(command: &str, sets: &[FieldValueSet; 5]) -> Vec<ScheduleEntry> {
    Field::ALL
        .iter()
        .zip(sets.iter())
        .fold(vec![ScheduleEntry::new(command)], |entries, (field, set)| {
            if set.is_empty() {
                entries
            } else {
                set.iter()
                    .flat_map(|value| entries.iter().map(move |entry| entry.clone().with(*field, value)))
                    .collect()
            }
        })
}
