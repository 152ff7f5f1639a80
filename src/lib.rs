//! Crontab parser which resolves schedule lines into calendar occurrences.
#![deny(unsafe_code, missing_docs)]

//! This is a small crate, intended to:
//! - parse POSIX crontab lines into concrete schedule entries;
//! - resolve every entry into calendar timestamps starting from a fixed anchor time;
//! - export resolved occurrences as an iCalendar document.
//!
//! _This is not a cron jobs scheduler or runner._
//!
//! ## Crontab format
//!
//! Every line has five time fields followed by a command, which may contain spaces:
//!
//! ```text
//!  * * * * *  command to execute
//!  │ │ │ │ │
//!  │ │ │ │ └───── day of week (0 - 6, 0 is Sunday)
//!  │ │ │ └────────── month (1 - 12)
//!  │ │ └─────────────── day of month (1 - 31)
//!  │ └──────────────────── hour (0 - 23)
//!  └───────────────────────── minute (0 - 59)
//! ```
//!
//! Empty lines and lines starting with `#` are ignored.
//!
//! | Pattern   | Meaning                                   |
//! |-----------|-------------------------------------------|
//! | `*`       | field is unused and doesn't constrain time |
//! | `n`       | particular value                          |
//! | `*/n`     | every `n` units                           |
//! | `n,m,...` | list of values, an entry per value        |
//!
//! Ranges (`1-5`, `0-30/5`) and mnemonic names (`JAN`, `MON`) aren't supported
//! and are reported as [`CronError::UnsupportedPattern`].
//! A line with all five fields set to `*` is rejected as [`CronError::NullEntry`].
//!
//! Every list field multiplies the number of entries produced by a line:
//! `10,15 20,16 1 * * cmd` gives four [`ScheduleEntry`] values.
//!
//! ## Resolution
//!
//! All calculations are in UTC and start from the midnight of the provided anchor time,
//! so the result is reproducible during the whole day.
//! Fixed fields are applied from day of week to minute, see [`resolve`] for details,
//! and [`upcoming`] produces a series of the next occurrences.
//!
//! ### Example
//! ```rust
//! use chrono::DateTime;
//! use cronical::{parse_all, Result};
//!
//! fn occurrences() -> Result<()> {
//!     let crontab = "\
//! 0 2 * * 5,6  echo \"weekend\"
//! 0 0 1 JAN *  echo \"unsupported\"
//! ";
//!     let (entries, errors) = parse_all(crontab);
//!     assert_eq!(entries.len(), 2);
//!     assert_eq!(errors.len(), 1);
//!
//!     let anchor = DateTime::parse_from_rfc3339("2024-01-01T08:00:00Z").unwrap().to_utc();
//!     for entry in &entries {
//!         for occurrence in entry.upcoming(&anchor, 3)? {
//!             println!("{}: {}", occurrence.timestamp, occurrence.command);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! # occurrences().unwrap();
//! ```
//!
//! # Feature flags
//! * `serde`: adds [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) trait implementation for [`ScheduleEntry`] and [`Occurrence`].

/// Crontab content and line parser.
pub mod crontab;
/// Schedule entry and its expansion into permutations.
pub mod entry;
/// Crate specific Error implementation.
pub mod error;
/// Field token classification and expansion.
pub mod field;
/// iCalendar export of occurrences.
pub mod ical;
/// Occurrences resolution.
pub mod resolver;
mod series;
mod utils;

// Re-export of public entities.
pub use crontab::{parse_all, parse_line};
pub use entry::ScheduleEntry;
pub use error::{CronError, LineError};
pub use field::{Field, FieldValue};
pub use ical::Calendar;
pub use resolver::{anchor, anchor_now, resolve, upcoming, Occurrence, Occurrences, Resolution, Upcoming};

/// Convenient alias for `Result`.
pub type Result<T, E = CronError> = std::result::Result<T, E>;
