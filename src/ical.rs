use crate::resolver::Occurrence;
use chrono::{DateTime, TimeDelta, Utc};

/// Max length of the content line in octets, excluding line break.
const MAX_LINE_OCTETS: usize = 75;
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// iCalendar (RFC 5545) exporter of occurrences.
///
/// Every occurrence becomes a `VEVENT` with the command as a summary.
/// ```rust
/// use chrono::{TimeDelta, Utc};
/// use cronical::{parse_line, Calendar};
///
/// let anchor = cronical::anchor(&Utc::now());
/// let occurrences = parse_line("0 2 * * 5 backup.sh")
///     .unwrap()
///     .iter()
///     .flat_map(|entry| entry.upcoming(&anchor, 4).unwrap())
///     .collect::<Vec<_>>();
///
/// let calendar = Calendar::default()
///     .with_duration(TimeDelta::minutes(30))
///     .with_location("backup-host");
/// let ics = calendar.render(&occurrences, &Utc::now());
/// assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
/// assert_eq!(ics.matches("BEGIN:VEVENT").count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Calendar {
    product_id: String,
    duration: TimeDelta,
    location: Option<String>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            product_id: format!("-//{name}//{name} {}//EN", env!("CARGO_PKG_VERSION"), name = env!("CARGO_PKG_NAME")),
            duration: TimeDelta::minutes(1),
            location: None,
        }
    }
}

impl Calendar {
    /// Replaces `PRODID` of the calendar.
    #[must_use]
    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    /// Sets duration of every event, one minute by default.
    #[must_use]
    pub fn with_duration(mut self, duration: TimeDelta) -> Self {
        self.duration = duration;
        self
    }

    /// Sets `LOCATION` of every event, usually a host the crontab belongs to.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Renders `occurrences` as a `VCALENDAR` object.
    ///
    /// `stamp` is used as `DTSTAMP` of every event, pass the same value to get the same output.
    pub fn render(&self, occurrences: &[Occurrence], stamp: &DateTime<Utc>) -> String {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", escape(&self.product_id)),
            "CALSCALE:GREGORIAN".to_string(),
        ];

        for (idx, occurrence) in occurrences.iter().enumerate() {
            let start = occurrence.timestamp;
            let end = start.checked_add_signed(self.duration).unwrap_or(start);
            lines.push("BEGIN:VEVENT".to_string());
            lines.push(format!(
                "UID:{}-{idx}@{}",
                start.format(DATE_TIME_FORMAT),
                env!("CARGO_PKG_NAME")
            ));
            lines.push(format!("DTSTAMP:{}", stamp.format(DATE_TIME_FORMAT)));
            lines.push(format!("DTSTART:{}", start.format(DATE_TIME_FORMAT)));
            lines.push(format!("DTEND:{}", end.format(DATE_TIME_FORMAT)));
            lines.push(format!("SUMMARY:{}", escape(&occurrence.command)));
            if let Some(location) = &self.location {
                lines.push(format!("LOCATION:{}", escape(location)));
            }
            lines.push("END:VEVENT".to_string());
        }
        lines.push("END:VCALENDAR".to_string());

        lines.iter().map(|line| fold_line(line)).collect()
    }
}

/// Escapes TEXT property value, CR of CRLF is dropped.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Returns CRLF terminated content line folded into 75 octets chunks.
///
/// Continuation chunks start with a space which is counted in their length.
/// Multi-octet characters are never split.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut folded = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS) * 3 + 2);
    let mut limit = MAX_LINE_OCTETS;
    let mut length = 0;
    for c in line.chars() {
        if length + c.len_utf8() > limit {
            folded.push_str("\r\n ");
            limit = MAX_LINE_OCTETS - 1;
            length = 0;
        }
        folded.push(c);
        length += c.len_utf8();
    }
    folded.push_str("\r\n");
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn time(input: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(input).unwrap().to_utc()
    }

    #[test]
    fn render_calendar() {
        let occurrences = vec![
            Occurrence {
                timestamp: time("2024-01-05T02:00:00Z"),
                command: "echo \"test two\"".into(),
            },
            Occurrence {
                timestamp: time("2024-01-06T02:00:00Z"),
                command: "echo a,b; echo c".into(),
            },
        ];

        let calendar = Calendar::default()
            .with_product_id("-//test//test//EN")
            .with_duration(TimeDelta::minutes(15))
            .with_location("ASRV-01");
        let output = calendar.render(&occurrences, &time("2024-01-01T10:20:30Z"));

        let expected = [
            "BEGIN:VCALENDAR",
            "VERSION:2.0",
            "PRODID:-//test//test//EN",
            "CALSCALE:GREGORIAN",
            "BEGIN:VEVENT",
            "UID:20240105T020000Z-0@cronical",
            "DTSTAMP:20240101T102030Z",
            "DTSTART:20240105T020000Z",
            "DTEND:20240105T021500Z",
            "SUMMARY:echo \"test two\"",
            "LOCATION:ASRV-01",
            "END:VEVENT",
            "BEGIN:VEVENT",
            "UID:20240106T020000Z-1@cronical",
            "DTSTAMP:20240101T102030Z",
            "DTSTART:20240106T020000Z",
            "DTEND:20240106T021500Z",
            "SUMMARY:echo a\\,b\\; echo c",
            "LOCATION:ASRV-01",
            "END:VEVENT",
            "END:VCALENDAR",
            "",
        ]
        .join("\r\n");

        assert_eq!(output, expected);
    }

    #[test]
    fn render_empty_calendar() {
        let output = Calendar::default().render(&[], &time("2024-01-01T00:00:00Z"));

        assert!(output.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//cronical//cronical "));
        assert!(output.ends_with("CALSCALE:GREGORIAN\r\nEND:VCALENDAR\r\n"));
        assert!(!output.contains("VEVENT"));
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("a,b", "a\\,b")]
    #[case("a;b", "a\\;b")]
    #[case("C:\\path", "C:\\\\path")]
    #[case("one\r\ntwo", "one\\ntwo")]
    fn test_escape(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape(input), expected);
    }

    #[rstest]
    #[case("SUMMARY:short")]
    #[case(&"X".repeat(75))]
    fn fold_short_line(#[case] line: &str) {
        assert_eq!(fold_line(line), format!("{line}\r\n"));
    }

    #[test]
    fn fold_boundary_76_octets() {
        let line = "A".repeat(76);
        assert_eq!(fold_line(&line), format!("{}\r\n A\r\n", "A".repeat(75)));
    }

    #[test]
    fn fold_long_line() {
        let line = format!("SUMMARY:{}", "x".repeat(200));
        let output = fold_line(&line);

        let chunks = output.trim_end_matches("\r\n").split("\r\n").collect::<Vec<_>>();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 75);
        assert_eq!(chunks[1].len(), 75);
        assert!(chunks[1].starts_with(' '));
        assert_eq!(chunks.concat().replace(' ', ""), line);
    }

    #[test]
    fn fold_keeps_multibyte_chars() {
        let line = format!("SUMMARY:{}", "π".repeat(60));
        let output = fold_line(&line);

        for chunk in output.split("\r\n").filter(|c| !c.is_empty()) {
            assert!(chunk.len() <= 75, "chunk = {chunk}");
        }
        assert_eq!(output.replace("\r\n ", "").trim_end(), line);

        // 73 + 9 octets, the first CJK character doesn't fit into the first chunk
        let line = format!("{}日本語", "A".repeat(73));
        assert_eq!(fold_line(&line), format!("{}\r\n 日本語\r\n", "A".repeat(73)));
    }
}
