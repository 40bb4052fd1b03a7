//! Fixed-width record layouts: template lines and high-priority event lines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Character used to pad a record out to its fixed width.
pub const FILL: char = '~';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordParseError {
    #[error("missing {0} group")]
    MissingGroup(&'static str),
    #[error("unterminated group starting at '{0}'")]
    Unterminated(char),
    #[error("invalid time window '{0}'")]
    Window(String),
    #[error("invalid coordinate '{0}'")]
    Coordinate(String),
}

/// Cut a record at its first fill character and trim what is left.
pub fn strip_fill(line: &str) -> &str {
    match line.find(FILL) {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

/// Trailing four-digit attribution number, or 0 when the record has none.
pub fn attribution_id(line: &str) -> u32 {
    let line = line.trim_end_matches(['\r', '\n']);
    let bytes = line.as_bytes();
    if bytes.len() < 5 {
        return 0;
    }
    let tail = &bytes[bytes.len() - 5..];
    if tail[0] != b' ' || !tail[1..].iter().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    line[line.len() - 4..].parse().unwrap_or(0)
}

/// The three characters following the first `$`, if they form a key.
pub fn image_key(line: &str) -> Option<String> {
    let pos = line.find('$')?;
    let key = line.get(pos + 1..pos + 4)?;
    if key.len() == 3 && key.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(key.to_string())
    } else {
        None
    }
}

/// A template record split into its text and trailing markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordLine {
    /// Template text with fill and markers removed.
    pub body: String,
    pub attribution_id: u32,
    pub image_key: Option<String>,
}

impl RecordLine {
    /// Split a raw record. Markers are read before anything is stripped.
    pub fn parse(raw: &str) -> RecordLine {
        let attribution_id = attribution_id(raw);
        let image_key = image_key(raw);

        let body = if raw.contains(FILL) {
            strip_fill(raw)
        } else {
            // Unpadded records can still carry markers at the end.
            let mut body = raw.trim();
            if attribution_id > 0 || body.ends_with(" 0000") {
                body = body[..body.len() - 5].trim_end();
            }
            if let Some(pos) = body.rfind('$') {
                if body.len() - pos == 4 {
                    body = body[..pos].trim_end();
                }
            }
            body
        };

        RecordLine {
            body: body.to_string(),
            attribution_id,
            image_key,
        }
    }
}

/// Which clock a high-priority window is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clock {
    Utc,
    Local,
}

/// One end of a high-priority window, within an unspecified year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPoint {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl WindowPoint {
    /// `MMDDhhmm` as one comparable integer.
    pub fn packed(&self) -> u32 {
        self.month * 1_000_000 + self.day * 10_000 + self.hour * 100 + self.minute
    }

    fn parse(text: &str) -> Result<WindowPoint, RecordParseError> {
        let bad = || RecordParseError::Window(text.to_string());
        let (date, time) = text.trim().split_once(' ').ok_or_else(bad)?;
        let (month, day) = date.split_once('-').ok_or_else(bad)?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        let day: u32 = day.parse().map_err(|_| bad())?;
        let time = time.trim();
        if time.len() != 4 {
            return Err(bad());
        }
        let packed: u32 = time.parse().map_err(|_| bad())?;
        let (hour, minute) = (packed / 100, packed % 100);
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) || hour > 23 || minute > 59 {
            return Err(bad());
        }
        Ok(WindowPoint {
            month,
            day,
            hour,
            minute,
        })
    }
}

/// Rectangular latitude/longitude region. Corner order does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geobox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Geobox {
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Geobox {
        Geobox {
            lat_min: a.0.min(b.0),
            lat_max: a.0.max(b.0),
            lon_min: a.1.min(b.1),
            lon_max: a.1.max(b.1),
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

/// A parsed line of the year-scoped high-priority event source.
///
/// Layout: `(MM-DD HHMM)(MM-DD HHMM)(lat,lon)(lat,lon) message`, with square
/// brackets around the two window groups for local time. The geobox groups
/// are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityRecord {
    pub clock: Clock,
    pub start: WindowPoint,
    pub end: WindowPoint,
    pub geobox: Option<Geobox>,
    /// Remainder of the line, still carrying fill and markers.
    pub message: String,
}

impl PriorityRecord {
    pub fn parse(line: &str) -> Result<PriorityRecord, RecordParseError> {
        let line = line.trim_start();
        let (clock, open, close) = match line.chars().next() {
            Some('(') => (Clock::Utc, '(', ')'),
            Some('[') => (Clock::Local, '[', ']'),
            _ => return Err(RecordParseError::MissingGroup("start")),
        };

        let (start, rest) = take_group(line, open, close, "start")?;
        let (end, mut rest) = take_group(rest, open, close, "end")?;
        let start = WindowPoint::parse(start)?;
        let end = WindowPoint::parse(end)?;

        let mut geobox = None;
        if rest.starts_with('(') {
            let (a, after_a) = take_group(rest, '(', ')', "geobox")?;
            let (b, after_b) = take_group(after_a, '(', ')', "geobox")?;
            geobox = Some(Geobox::from_corners(parse_corner(a)?, parse_corner(b)?));
            rest = after_b;
        }

        Ok(PriorityRecord {
            clock,
            start,
            end,
            geobox,
            message: rest.trim_start().to_string(),
        })
    }

    /// Half-open window test, `[start, end)`, with endpoints in either order.
    ///
    /// Windows do not wrap: a start after its end is swapped, so
    /// `(12-31 2300)(01-01 0100)` covers January 1 through December 31
    /// rather than the two hours around midnight. `is_reversed` flags these.
    pub fn window_contains(&self, now: &WindowPoint) -> bool {
        let (a, b) = (self.start.packed(), self.end.packed());
        let (lo, hi) = (a.min(b), a.max(b));
        let t = now.packed();
        t >= lo && t < hi
    }

    /// Whether the window was written end first.
    pub fn is_reversed(&self) -> bool {
        self.start.packed() > self.end.packed()
    }

    /// Records without a geobox match everywhere.
    pub fn geobox_contains(&self, lat: f64, lon: f64) -> bool {
        self.geobox.map_or(true, |g| g.contains(lat, lon))
    }
}

fn take_group<'a>(
    text: &'a str,
    open: char,
    close: char,
    name: &'static str,
) -> Result<(&'a str, &'a str), RecordParseError> {
    let inner = text
        .strip_prefix(open)
        .ok_or(RecordParseError::MissingGroup(name))?;
    let end = inner
        .find(close)
        .ok_or(RecordParseError::Unterminated(open))?;
    Ok((&inner[..end], &inner[end + close.len_utf8()..]))
}

fn parse_corner(text: &str) -> Result<(f64, f64), RecordParseError> {
    let bad = || RecordParseError::Coordinate(text.to_string());
    let (lat, lon) = text.split_once(',').ok_or_else(bad)?;
    let lat: f64 = lat.trim().parse().map_err(|_| bad())?;
    let lon: f64 = lon.trim().parse().map_err(|_| bad())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(bad());
    }
    Ok((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_fill_cuts_at_first_tilde() {
        assert_eq!(strip_fill("good afternoon ~~~~~ $hrg"), "good afternoon");
        assert_eq!(strip_fill("  plain text  "), "plain text");
    }

    #[test]
    fn attribution_requires_space_and_four_digits() {
        assert_eq!(attribution_id("radical inclusion ~~~~ $p04 0042"), 42);
        assert_eq!(attribution_id("radical inclusion ~~~~ $p04\r\n"), 0);
        assert_eq!(attribution_id("x12345"), 0);
        assert_eq!(attribution_id("123"), 0);
    }

    #[test]
    fn image_key_reads_three_chars_after_dollar() {
        assert_eq!(image_key("hello ~~~ $p04"), Some("p04".to_string()));
        assert_eq!(image_key("hello ~~~ $p0"), None);
        assert_eq!(image_key("hello"), None);
    }

    #[test]
    fn record_line_with_fill() {
        let r = RecordLine::parse("practice radical self-reliance ~~~~~~~~~~ $p04 0007");
        assert_eq!(r.body, "practice radical self-reliance");
        assert_eq!(r.attribution_id, 7);
        assert_eq!(r.image_key.as_deref(), Some("p04"));
    }

    #[test]
    fn record_line_without_fill_drops_markers() {
        let r = RecordLine::parse("leave no trace $brc 1234");
        assert_eq!(r.body, "leave no trace");
        assert_eq!(r.attribution_id, 1234);
        assert_eq!(r.image_key.as_deref(), Some("brc"));
    }

    #[test]
    fn parse_utc_priority_record_with_geobox() {
        let line = "(05-16 0134)(05-16 0653)(-90.0000,-154.0000)(+90.0000,+034.0000) time to burn ~~~~~~";
        let rec = PriorityRecord::parse(line).unwrap();
        assert_eq!(rec.clock, Clock::Utc);
        assert_eq!(rec.start.packed(), 5_16_01_34);
        assert_eq!(rec.end.hour, 6);
        let g = rec.geobox.unwrap();
        assert_eq!(g.lon_min, -154.0);
        assert_eq!(g.lon_max, 34.0);
        assert_eq!(strip_fill(&rec.message), "time to burn");
    }

    #[test]
    fn parse_local_priority_record_without_geobox() {
        let rec = PriorityRecord::parse("[03-26 2030][03-26 2130] earth hour ~~~").unwrap();
        assert_eq!(rec.clock, Clock::Local);
        assert!(rec.geobox.is_none());
        assert!(rec.geobox_contains(10.0, 10.0));
    }

    #[test]
    fn window_is_half_open() {
        let rec = PriorityRecord::parse("(01-20 1640)(01-20 1710) x").unwrap();
        let at = |hour, minute| WindowPoint {
            month: 1,
            day: 20,
            hour,
            minute,
        };
        assert!(rec.window_contains(&at(16, 40)));
        assert!(rec.window_contains(&at(17, 9)));
        assert!(!rec.window_contains(&at(17, 10)));
        assert!(!rec.window_contains(&at(16, 39)));
        assert!(!rec.is_reversed());
    }

    #[test]
    fn reversed_window_spans_the_year() {
        let rec = PriorityRecord::parse("(12-31 2300)(01-01 0100) new year ~~~").unwrap();
        assert!(rec.is_reversed());
        let point = |month, day, hour| WindowPoint {
            month,
            day,
            hour,
            minute: 0,
        };
        assert!(rec.window_contains(&point(6, 15, 12)));
        assert!(!rec.window_contains(&point(12, 31, 23)));
        assert!(!rec.window_contains(&point(1, 1, 0)));
    }

    #[test]
    fn malformed_priority_records_error() {
        assert!(PriorityRecord::parse("no groups here").is_err());
        assert!(PriorityRecord::parse("(13-01 0000)(13-02 0000) x").is_err());
        assert!(PriorityRecord::parse("(01-01 0000)(01-02 00").is_err());
        assert!(PriorityRecord::parse("(01-01 0000)(01-02 0000)(abc,def)(1,2) x").is_err());
    }
}
