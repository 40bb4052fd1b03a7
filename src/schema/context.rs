//! Time and place context for one fetch cycle.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Season codes as used by conditional predicates and the season handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring = 1,
    Summer = 2,
    Autumn = 3,
    Winter = 4,
}

impl Season {
    /// Numeric code, 1 = spring .. 4 = winter.
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

/// Everything the pipeline knows about "now" and "here".
///
/// Immutable for the duration of one fetch cycle. Timestamps are naive: the
/// local one already carries the timezone offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub local: NaiveDateTime,
    pub utc: NaiveDateTime,
    /// Signed degrees, north positive.
    pub latitude: f64,
    /// Signed degrees, east positive.
    pub longitude: f64,
    /// One-based index into the region record source.
    pub region: u32,
    /// Offset from UTC as signed `hhmm` (PDT = -700).
    pub utc_offset: i32,
}

impl Context {
    /// Build a context from a UTC instant, deriving local time from the offset.
    pub fn from_utc(
        utc: NaiveDateTime,
        utc_offset: i32,
        latitude: f64,
        longitude: f64,
        region: u32,
    ) -> Context {
        Context {
            local: utc + offset_duration(utc_offset),
            utc,
            latitude,
            longitude,
            region,
            utc_offset,
        }
    }

    /// Weekday of the local date, 1 = Sunday .. 7 = Saturday.
    pub fn weekday_number(&self) -> i64 {
        self.local.weekday().num_days_from_sunday() as i64 + 1
    }

    /// Day of the local year, 1..=366.
    pub fn day_of_year(&self) -> u32 {
        self.local.ordinal()
    }

    /// Season of the local date, flipped for the southern hemisphere.
    ///
    /// Boundaries fall at midnight on the 21st of March, June, September
    /// and December. A latitude of exactly zero counts as southern.
    pub fn season(&self) -> Season {
        let year = self.local.year();
        let boundary = |month: u32| {
            NaiveDate::from_ymd_opt(year, month, 21)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        };
        let before = |month: u32| boundary(month).map_or(false, |b| self.local < b);

        let northern = if before(3) {
            Season::Winter
        } else if before(6) {
            Season::Spring
        } else if before(9) {
            Season::Summer
        } else if before(12) {
            Season::Autumn
        } else {
            Season::Winter
        };

        if self.latitude > 0.0 {
            northern
        } else {
            match northern {
                Season::Spring => Season::Autumn,
                Season::Summer => Season::Winter,
                Season::Autumn => Season::Spring,
                Season::Winter => Season::Summer,
            }
        }
    }

    /// Packed `HHmm` for the UTC clock.
    pub fn utc_hhmm(&self) -> i64 {
        (self.utc.hour() * 100 + self.utc.minute()) as i64
    }

    /// Packed `HHmm` for the local clock.
    pub fn local_hhmm(&self) -> i64 {
        (self.local.hour() * 100 + self.local.minute()) as i64
    }
}

/// Convert a 24-hour clock value to the 12-hour clock used by the display.
///
/// Midnight stays at zero so callers can special-case it.
pub fn to_twelve_hour(hour: u32) -> u32 {
    if hour > 12 {
        hour - 12
    } else {
        hour
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Turn a signed `hhmm` offset into a duration. `-730` is minus 7h30m.
pub fn offset_duration(offset: i32) -> Duration {
    let hours = (offset / 100) as i64;
    let minutes = (offset.abs() % 100) as i64;
    let minutes = if offset < 0 { -minutes } else { minutes };
    Duration::hours(hours) + Duration::minutes(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn ctx(local: NaiveDateTime, lat: f64) -> Context {
        Context {
            local,
            utc: local,
            latitude: lat,
            longitude: 0.0,
            region: 1,
            utc_offset: 0,
        }
    }

    #[test]
    fn from_utc_applies_negative_offset() {
        let c = Context::from_utc(at(2025, 6, 1, 10, 0), -730, 47.4, -122.6, 134);
        assert_eq!(c.local, at(2025, 6, 1, 2, 30));
        assert_eq!(c.utc_offset, -730);
    }

    #[test]
    fn weekday_number_starts_on_sunday() {
        // 2025-06-01 was a Sunday
        assert_eq!(ctx(at(2025, 6, 1, 12, 0), 10.0).weekday_number(), 1);
        assert_eq!(ctx(at(2025, 6, 7, 12, 0), 10.0).weekday_number(), 7);
    }

    #[test]
    fn season_boundaries_northern() {
        assert_eq!(ctx(at(2025, 3, 20, 23, 59), 45.0).season(), Season::Winter);
        assert_eq!(ctx(at(2025, 3, 21, 0, 0), 45.0).season(), Season::Spring);
        assert_eq!(ctx(at(2025, 7, 4, 0, 0), 45.0).season(), Season::Summer);
        assert_eq!(ctx(at(2025, 10, 1, 0, 0), 45.0).season(), Season::Autumn);
        assert_eq!(ctx(at(2025, 12, 25, 0, 0), 45.0).season(), Season::Winter);
    }

    #[test]
    fn season_flips_in_south() {
        assert_eq!(ctx(at(2025, 7, 4, 0, 0), -33.0).season(), Season::Winter);
        assert_eq!(ctx(at(2025, 1, 4, 0, 0), -33.0).season(), Season::Summer);
        assert_eq!(ctx(at(2025, 1, 4, 0, 0), -33.0).season().code(), 2);
    }

    #[test]
    fn twelve_hour_keeps_midnight_at_zero() {
        assert_eq!(to_twelve_hour(0), 0);
        assert_eq!(to_twelve_hour(12), 12);
        assert_eq!(to_twelve_hour(13), 1);
        assert_eq!(to_twelve_hour(23), 11);
    }

    #[test]
    fn packed_clock_values() {
        let c = ctx(at(2025, 1, 1, 9, 5), 0.0);
        assert_eq!(c.local_hhmm(), 905);
        assert_eq!(c.utc_hhmm(), 905);
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2025));
        assert!(!is_leap_year(2100));
        assert!(is_leap_year(2000));
    }
}
