use crate::{
    entry::{self, ScheduleEntry},
    error::LineError,
    field::{Field, FieldValueSet},
    CronError, Result,
};

/// Number of whitespace separated tokens expected in a crontab line: five time fields and a command.
pub const CRON_FIELDS: usize = 6;

/// Rejects structurally malformed lines split into tokens.
///
/// The line should have five time fields and at least one command token,
/// and at least one time field should be other than `*`.
pub fn validate<S: AsRef<str>>(fields: &[S]) -> Result<()> {
    if fields.len() < CRON_FIELDS {
        return Err(CronError::TooFewFields(fields.len()));
    }

    let time_fields = &fields[..CRON_FIELDS - 1];
    if time_fields.iter().all(|field| field.as_ref() == "*") {
        let pattern = time_fields.iter().map(|f| f.as_ref()).collect::<Vec<_>>().join(" ");
        return Err(CronError::NullEntry(pattern));
    }

    Ok(())
}

/// Parses a single crontab line into all of its schedule entries.
///
/// List fields produce an entry per value, so `10,15 1,2 * * * cmd` gives four entries.
/// The command is the rest of the line after five time fields, joined with single spaces.
pub fn parse_line(line: &str) -> Result<Vec<ScheduleEntry>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    validate(&tokens)?;

    let mut sets: [FieldValueSet; 5] = Default::default();
    for (idx, field) in Field::ALL.iter().enumerate() {
        sets[idx] = FieldValueSet::parse(*field, tokens[idx])?;
    }

    let command = tokens[CRON_FIELDS - 1..].join(" ");
    Ok(entry::expand(&command, &sets))
}

/// Parses the whole crontab content.
///
/// Empty lines and lines starting with `#` are skipped, whitespace or indentation is a regular line.
/// A line that fails to parse is reported in the errors list and doesn't stop parsing of the rest,
/// so every other line contributes its entries (in the file order) regardless of failures.
pub fn parse_all(text: &str) -> (Vec<ScheduleEntry>, Vec<LineError>) {
    let mut entries = vec![];
    let mut errors = vec![];

    for (idx, line) in text.lines().enumerate() {
        let number = idx + 1;
        if line.is_empty() || line.starts_with('#') {
            tracing::trace!(line = number, "skipping empty or comment line");
            continue;
        }

        match parse_line(line) {
            Ok(parsed) => entries.extend(parsed),
            Err(source) => {
                tracing::warn!(line = number, error = %source, "failed to parse cron entry");
                errors.push(LineError { line: number, source });
            }
        }
    }

    (entries, errors)
}
