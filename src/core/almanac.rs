//! Calendar and sky figures consumed by the algorithmic generator.
//!
//! Timestamps in and out are naive UTC unless a method says otherwise.

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use std::f64::consts::PI;

/// Julian date of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000: f64 = 2_451_545.0;
/// Mean length of a lunation in days.
pub const SYNODIC_MONTH: f64 = 29.530_588_853;
/// A new moon used as the lunation reference.
const NEW_MOON_JD: f64 = 2_451_550.1;
/// Terrestrial time minus UTC, in days.
const TT_OFFSET_DAYS: f64 = 32.184 / 86_400.0;

/// Sun events for one day, UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: NaiveDateTime,
    pub solar_noon: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

/// Coordinated mars time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarsTime {
    pub sol: u64,
    pub hour: u32,
    pub minute: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planet {
    Mercury,
    Venus,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    pub const ALL: [Planet; 9] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Moon,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Mercury => "mercury",
            Self::Venus => "venus",
            Self::Moon => "the moon",
            Self::Mars => "mars",
            Self::Jupiter => "jupiter",
            Self::Saturn => "saturn",
            Self::Uranus => "uranus",
            Self::Neptune => "neptune",
            Self::Pluto => "pluto",
        }
    }
}

pub trait Almanac {
    /// Julian date of a UTC instant, fraction included.
    fn julian_date(&self, utc: NaiveDateTime) -> f64 {
        julian_date(utc)
    }

    fn mars_time(&self, utc: NaiveDateTime) -> Option<MarsTime> {
        mars_time(self.julian_date(utc))
    }

    /// Lunation fraction for a date: 0.0 new, 0.5 full, approaching 1.0 new again.
    fn moon_phase(&self, date: NaiveDateTime) -> f64;

    /// `None` during polar day or night.
    fn sun_times(&self, latitude: f64, longitude: f64, utc: NaiveDateTime) -> Option<SunTimes>;

    /// Lower-case constellation name the planet sits in.
    fn planet_constellation(&self, planet: Planet, utc: NaiveDateTime) -> Option<String>;
}

pub fn julian_date(utc: NaiveDateTime) -> f64 {
    let ts = utc.and_utc();
    let seconds = ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_millis()) / 1000.0;
    seconds / 86_400.0 + UNIX_EPOCH_JD
}

fn from_julian(jd: f64) -> Option<NaiveDateTime> {
    let seconds = ((jd - UNIX_EPOCH_JD) * 86_400.0).round() as i64;
    DateTime::from_timestamp(seconds, 0).map(|t| t.naive_utc())
}

/// Mars sol date from a terrestrial julian date.
pub fn mars_time(jd: f64) -> Option<MarsTime> {
    let msd = (jd + TT_OFFSET_DAYS - 2_405_522.002_505_4) / 1.027_491_251_7;
    if msd < 1.0 {
        return None;
    }
    let sol = msd.floor();
    let minutes = (msd - sol) * 1440.0;
    let hour = (minutes / 60.0).floor();
    Some(MarsTime {
        sol: sol as u64,
        hour: hour as u32,
        minute: (minutes - hour * 60.0) as u32,
    })
}

/// Arithmetic almanac: mean lunation and the sunrise equation, no planets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAlmanac;

impl Almanac for BasicAlmanac {
    fn moon_phase(&self, date: NaiveDateTime) -> f64 {
        let midnight = date.date().and_time(NaiveTime::MIN);
        ((julian_date(midnight) - NEW_MOON_JD) / SYNODIC_MONTH).rem_euclid(1.0)
    }

    fn sun_times(&self, latitude: f64, longitude: f64, utc: NaiveDateTime) -> Option<SunTimes> {
        let deg = PI / 180.0;
        let midnight = utc.date().and_time(NaiveTime::MIN);
        let n = (julian_date(midnight) - J2000 + 0.0008).ceil();
        let mean_noon = n - longitude / 360.0;
        let anomaly = (357.5291 + 0.985_600_28 * mean_noon).rem_euclid(360.0);
        let m = anomaly * deg;
        let center = 1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin();
        let ecliptic = (anomaly + center + 180.0 + 102.9372).rem_euclid(360.0) * deg;
        let transit = J2000 + mean_noon + 0.0053 * m.sin() - 0.0069 * (2.0 * ecliptic).sin();
        let declination = (ecliptic.sin() * (23.4397 * deg).sin()).asin();
        let phi = latitude * deg;
        let cos_hour = ((-0.833 * deg).sin() - phi.sin() * declination.sin())
            / (phi.cos() * declination.cos());
        if !(-1.0..=1.0).contains(&cos_hour) {
            return None;
        }
        let half_day = cos_hour.acos() / deg / 360.0;
        Some(SunTimes {
            sunrise: from_julian(transit - half_day)?,
            solar_noon: from_julian(transit)?,
            sunset: from_julian(transit + half_day)?,
        })
    }

    fn planet_constellation(&self, _planet: Planet, _utc: NaiveDateTime) -> Option<String> {
        None
    }
}
