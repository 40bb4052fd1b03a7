//! Pass 1: the leading `!` gate.
//!
//! `!H>6,H<18 good afternoon` keeps `good afternoon` only when every
//! predicate holds against the context.

use chrono::{Datelike, Timelike};

use crate::schema::context::{to_twelve_hour, Context};
use crate::schema::record::strip_fill;

/// Context fields a predicate may test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Latitude,
    Longitude,
    Weekday,
    UtcHour,
    UtcTwelveHour,
    UtcClock,
    LocalHour,
    LocalTwelveHour,
    LocalClock,
    Minute,
    Second,
    Month,
    Year,
    Region,
    Day,
    DayOfYear,
    Season,
}

impl Field {
    pub fn from_letter(c: char) -> Option<Field> {
        Some(match c {
            'A' => Self::Latitude,
            'O' => Self::Longitude,
            'D' => Self::Weekday,
            'H' => Self::UtcHour,
            'I' => Self::UtcTwelveHour,
            'T' => Self::UtcClock,
            'h' => Self::LocalHour,
            'i' => Self::LocalTwelveHour,
            't' => Self::LocalClock,
            'm' => Self::Minute,
            's' => Self::Second,
            'M' => Self::Month,
            'Y' => Self::Year,
            'Z' => Self::Region,
            'd' => Self::Day,
            'y' => Self::DayOfYear,
            'z' => Self::Season,
            _ => return None,
        })
    }

    pub fn value(self, ctx: &Context) -> i64 {
        match self {
            Self::Latitude => (ctx.latitude * 1000.0) as i64,
            Self::Longitude => (ctx.longitude * 1000.0) as i64,
            Self::Weekday => ctx.weekday_number(),
            Self::UtcHour => ctx.utc.hour() as i64,
            Self::UtcTwelveHour => to_twelve_hour(ctx.utc.hour()) as i64,
            Self::UtcClock => ctx.utc_hhmm(),
            Self::LocalHour => ctx.local.hour() as i64,
            Self::LocalTwelveHour => to_twelve_hour(ctx.local.hour()) as i64,
            Self::LocalClock => ctx.local_hhmm(),
            Self::Minute => ctx.local.minute() as i64,
            Self::Second => ctx.local.second() as i64,
            Self::Month => ctx.local.month() as i64,
            Self::Year => ctx.local.year() as i64,
            Self::Region => ctx.region as i64,
            Self::Day => ctx.local.day() as i64,
            Self::DayOfYear => ctx.day_of_year() as i64,
            Self::Season => ctx.season().code(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Equal,
    Greater,
}

/// One `<field><op><integer>` term of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    pub field: Field,
    pub comparison: Comparison,
    pub target: i64,
}

impl Predicate {
    pub fn parse(text: &str) -> Option<Predicate> {
        let text = text.trim();
        let mut chars = text.chars();
        let field = Field::from_letter(chars.next()?)?;
        let comparison = match chars.next()? {
            '<' => Comparison::Less,
            '=' => Comparison::Equal,
            '>' => Comparison::Greater,
            _ => return None,
        };
        let target = chars.as_str().trim().parse().ok()?;
        Some(Predicate {
            field,
            comparison,
            target,
        })
    }

    pub fn holds(&self, ctx: &Context) -> bool {
        let value = self.field.value(ctx);
        match self.comparison {
            Comparison::Less => value < self.target,
            Comparison::Equal => value == self.target,
            Comparison::Greater => value > self.target,
        }
    }
}

/// Split a gated template into its predicates and body.
///
/// `None` when the clause has no body after it or any predicate is
/// malformed. Templates without a gate come back with no predicates.
pub fn parse_gate(template: &str) -> Option<(Vec<Predicate>, &str)> {
    let Some(gated) = template.strip_prefix('!') else {
        return Some((Vec::new(), template));
    };
    let (clause, body) = gated.split_once(' ')?;
    let predicates = clause
        .split(',')
        .map(Predicate::parse)
        .collect::<Option<Vec<_>>>()?;
    Some((predicates, body))
}

/// Evaluate the gate and strip it, cutting the fill either way.
///
/// `None` rejects the template.
pub fn apply(template: &str, ctx: &Context) -> Option<String> {
    let (predicates, body) = parse_gate(template)?;
    if !predicates.iter().all(|p| p.holds(ctx)) {
        return None;
    }
    let body = strip_fill(body);
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}
