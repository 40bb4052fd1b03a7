//! Messages computed from the calendar and the sky instead of read from a
//! template: sun and moon, other calendars, mars time, deep-space probes
//! and the burn countdown.
//!
//! Non-gregorian dates come from the year-day record for today, which packs
//! them into fixed columns.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use log::trace;
use std::ops::Range;

use crate::core::almanac::{Almanac, Planet};
use crate::core::numerals::{num_to_text, time_diff_str};
use crate::core::random::RandomService;
use crate::schema::context::{offset_duration, Context};

/// A computed message and the background it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub image_key: Option<&'static str>,
}

impl Generated {
    fn new(text: String, image_key: Option<&'static str>) -> Self {
        Self { text, image_key }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generator {
    Sun,
    Moon,
    Julian,
    Zodiac,
    Islamic,
    Chinese,
    Hebrew,
    LongCount,
    Indian,
    Coptic,
    Mars,
    Burn,
    Probe,
}

impl Generator {
    pub const ALL: [Generator; 13] = [
        Generator::Sun,
        Generator::Moon,
        Generator::Julian,
        Generator::Zodiac,
        Generator::Islamic,
        Generator::Chinese,
        Generator::Hebrew,
        Generator::LongCount,
        Generator::Indian,
        Generator::Coptic,
        Generator::Mars,
        Generator::Burn,
        Generator::Probe,
    ];

    /// Map a 1..=22 roll onto a generator.
    pub fn from_roll(roll: u32) -> Option<Generator> {
        Some(match roll {
            1 | 2 => Self::Sun,
            3 | 4 => Self::Moon,
            5 => Self::Julian,
            6 | 7 => Self::Zodiac,
            8 | 9 => Self::Islamic,
            10 | 11 => Self::Chinese,
            12 | 13 => Self::Hebrew,
            14 | 15 => Self::LongCount,
            16 | 17 => Self::Indian,
            18 | 19 => Self::Coptic,
            20 => Self::Mars,
            21 => Self::Burn,
            22 => Self::Probe,
            _ => return None,
        })
    }

    /// Columns of the year-day record holding this generator's date.
    pub fn columns(self) -> Option<Range<usize>> {
        match self {
            Self::Islamic => Some(0..8),
            Self::Chinese => Some(9..18),
            Self::Hebrew => Some(19..27),
            Self::LongCount => Some(28..39),
            Self::Indian => Some(40..48),
            Self::Coptic => Some(49..57),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Moon => "moon",
            Self::Julian => "julian",
            Self::Zodiac => "zodiac",
            Self::Islamic => "islamic",
            Self::Chinese => "chinese",
            Self::Hebrew => "hebrew",
            Self::LongCount => "long count",
            Self::Indian => "indian",
            Self::Coptic => "coptic",
            Self::Mars => "mars",
            Self::Burn => "burn",
            Self::Probe => "probe",
        }
    }
}

const ISLAMIC_MONTHS: [&str; 12] = [
    "al-muharram", "safar", "rabi al-'awwal", "rabi ath-thani", "jumada al-'ula",
    "jumada ath-thaniyah", "rajab", "sha'ban", "ramadan", "shawwal", "du al-qa'dah",
    "du al-hijjah",
];

const CHINESE_ELEMENTS: [&str; 5] = ["wood", "fire", "earth", "metal", "water"];
const CHINESE_STEMS: [&str; 10] = [
    "jia", "yi", "bing", "ding", "wu", "ji", "geng", "xin", "ren", "gui",
];
const CHINESE_ANIMALS: [&str; 12] = [
    "rat", "ox", "tiger", "rabbit", "dragon", "snake", "horse", "goat", "monkey", "rooster",
    "dog", "pig",
];
const CHINESE_BRANCHES: [&str; 12] = [
    "zi", "chou", "yin", "mao", "chen", "si", "wu", "wei", "shen", "you", "xu", "hai",
];
const CHINESE_MONTHS_NUMBERED: [&str; 12] = [
    "zhengyue", "eryue", "sanyue", "siyue", "wuyue", "liuyue", "qiyue", "bayue", "jiuyue",
    "shiyue", "dongyue", "layue",
];
const CHINESE_MONTHS_FLORAL: [&str; 12] = [
    "zouyue", "xingyue", "taoyue", "meiyue", "liuyue", "heyue", "lanyue", "guiyue", "juyue",
    "luyue", "jaiyue", "bingyue",
];
/// One character per year of the sexagenary cycle, starting at wood rat.
const SEXAGENARY_KEYS: &str = "123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxy";

/// Indexed so that leap years skip `adar` and common years skip both adars
/// of the leap layout.
const HEBREW_MONTHS: [&str; 14] = [
    "tishrei", "cheshvan", "kislev", "tevet", "shevat", "adar", "adar alef", "adar beit",
    "nissan", "iyar", "sivan", "tamuz", "av", "elul",
];

const INDIAN_MONTHS: [&str; 12] = [
    "chaitra", "vaisakha", "jyeshtha", "ashadha", "shraavana", "bhadrapada", "ashvin",
    "kartika", "agrahayana", "pausha", "magha", "phalguna",
];

const COPTIC_MONTHS: [&str; 13] = [
    "thout", "paopi", "hathor", "koiak", "tobi", "meshir", "paremhat", "parmouti", "pashons",
    "paoni", "epip", "mesori", "pi kogi enavot",
];

// Zodiac tables: `MMDD` start of each band, ascending. Dates before the
// first start belong to the last band.
const TROPICAL_SIGNS: [(u32, &str); 12] = [
    (120, "aquarius"),
    (219, "pisces"),
    (321, "aries"),
    (420, "taurus"),
    (521, "gemini"),
    (621, "cancer"),
    (723, "leo"),
    (823, "virgo"),
    (923, "libra"),
    (1023, "scorpius"),
    (1122, "sagittarius"),
    (1222, "capricornus"),
];
const SIDEREAL_SIGNS: [(u32, &str); 12] = [
    (115, "capricornus"),
    (215, "aquarius"),
    (315, "pisces"),
    (415, "aries"),
    (516, "taurus"),
    (616, "gemini"),
    (716, "cancer"),
    (816, "leo"),
    (916, "virgo"),
    (1016, "libra"),
    (1117, "scorpius"),
    (1216, "sagittarius"),
];
const CONSTELLATIONS: [(u32, &str); 13] = [
    (119, "capricornus"),
    (215, "aquarius"),
    (312, "pisces"),
    (419, "aries"),
    (514, "taurus"),
    (620, "gemini"),
    (721, "cancer"),
    (810, "leo"),
    (916, "virgo"),
    (1031, "libra"),
    (1123, "scorpius"),
    (1130, "ophiuchus"),
    (1218, "sagittarius"),
];
const STARS: [(u32, &str); 13] = [
    (119, "deneb algedi"),
    (215, "sadalsuud"),
    (312, "alpherg"),
    (419, "hamal"),
    (514, "aldebaran"),
    (620, "pollux"),
    (721, "al tarf"),
    (810, "regulus"),
    (916, "spica"),
    (1031, "zubeneschamali"),
    (1123, "antares"),
    (1130, "rasalhague"),
    (1218, "kaus australis"),
];

/// Deep-space probes: name, julian day of the fix, miles from the sun at
/// the fix, and outbound speed in miles per second.
const PROBES: [(&str, f64, f64, f64); 5] = [
    ("voyager one", 2_456_172.0, 1.12e10, 10.59),
    ("voyager two", 2_458_428.0, 1.11e10, 9.534),
    ("pioneer ten", 2_460_463.0, 1.27e10, 7.65),
    ("pioneer eleven", 2_460_486.0, 1.06e10, 6.93),
    ("new horizons", 2_459_322.0, 4.6e9, 8.5),
];

/// Last year the burn countdown runs.
const BURN_LAST_YEAR: i32 = 2100;

fn band<'a>(table: &[(u32, &'a str)], mmdd: u32) -> &'a str {
    table
        .iter()
        .rev()
        .find(|(start, _)| *start <= mmdd)
        .or_else(|| table.last())
        .map(|(_, name)| *name)
        .unwrap_or_default()
}

fn day_fraction(t: NaiveDateTime) -> f64 {
    f64::from(t.num_seconds_from_midnight()) / 86_400.0
}

fn digits(field: &str, range: Range<usize>) -> Option<u64> {
    let s = field.get(range)?;
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// A `ddmmyyyy` calendar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CalendarDate {
    day: u64,
    month: u64,
    year: u64,
}

impl CalendarDate {
    fn parse(field: &str) -> Option<CalendarDate> {
        Some(CalendarDate {
            day: digits(field, 0..2)?,
            month: digits(field, 2..4)?,
            year: digits(field, 4..8)?,
        })
    }
}

/// Pick one of four shapes: day and month, month, month and year, or all three.
fn assemble_date(
    date: &CalendarDate,
    month_name: &str,
    rng: &mut dyn RandomService,
) -> Option<String> {
    let d = format!("the {} day of", num_to_text(date.day, true)?);
    let m = format!("the month of {month_name}");
    let y = format!("in the {} year", num_to_text(date.year, true)?);
    let r = rng.uniform_int(1, 1, 40);
    Some(if r < 10 {
        format!("{d} {m}")
    } else if r < 20 {
        m
    } else if r < 30 {
        format!("{m} {y}")
    } else {
        format!("{d} {m} {y}")
    })
}

/// Labor day: the first Monday of September.
pub fn labor_day(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, 9, Weekday::Mon, 1)
}

/// Whole months, then whole days, from `from` until `to`.
fn months_and_days(from: NaiveDateTime, to: NaiveDateTime) -> (u32, i64) {
    let mut months = 0;
    while let Some(next) = from.checked_add_months(Months::new(months + 1)) {
        if next > to {
            break;
        }
        months += 1;
    }
    let anchor = from
        .checked_add_months(Months::new(months))
        .unwrap_or(from);
    (months, (to - anchor).num_days())
}

/// Picks and runs one generator per call.
pub struct AlgorithmicGenerator<'a, A: Almanac + ?Sized> {
    almanac: &'a A,
}

impl<'a, A: Almanac + ?Sized> AlgorithmicGenerator<'a, A> {
    pub fn new(almanac: &'a A) -> Self {
        Self { almanac }
    }

    /// Roll 1..=22 for a generator and run it. `calendar` is today's
    /// year-day record, or empty when there is none.
    pub fn generate(
        &self,
        ctx: &Context,
        calendar: &str,
        rng: &mut dyn RandomService,
    ) -> Option<Generated> {
        let generator = Generator::from_roll(rng.uniform_int(1, 1, 22))?;
        trace!("algorithmic generator: {}", generator.name());
        self.generate_with(generator, ctx, calendar, rng)
    }

    pub fn generate_with(
        &self,
        generator: Generator,
        ctx: &Context,
        calendar: &str,
        rng: &mut dyn RandomService,
    ) -> Option<Generated> {
        let field = match generator.columns() {
            Some(range) => calendar.get(range)?,
            None => "",
        };
        match generator {
            Generator::Sun => self.sun(ctx, rng),
            Generator::Moon => self.moon(ctx),
            Generator::Julian => self.julian(ctx),
            Generator::Zodiac => self.zodiac(ctx, rng),
            Generator::Islamic => islamic(field, rng),
            Generator::Chinese => chinese(field, rng),
            Generator::Hebrew => hebrew(field, rng),
            Generator::LongCount => long_count(field, rng),
            Generator::Indian => indian(field, rng),
            Generator::Coptic => coptic(field, rng),
            Generator::Mars => self.mars(ctx, rng),
            Generator::Burn => burn(ctx, rng),
            Generator::Probe => self.probe(ctx, rng),
        }
    }

    /// Prayer names or time relative to sunrise, solar noon and sunset.
    fn sun(&self, ctx: &Context, rng: &mut dyn RandomService) -> Option<Generated> {
        let times = self.almanac.sun_times(ctx.latitude, ctx.longitude, ctx.utc)?;
        let offset = offset_duration(ctx.utc_offset);
        let sr = day_fraction(times.sunrise + offset);
        let sn = day_fraction(times.solar_noon + offset);
        let ss = day_fraction(times.sunset + offset);
        let ct = day_fraction(ctx.local);

        if rng.percentile() < 40 {
            let prayer = if ct >= sr - 0.04 && ct <= sr {
                Some("fajr")
            } else if ct >= sn && ct <= sn + 0.04 {
                Some("zuhr")
            } else if ct >= sn + 0.05 && ct < ss {
                Some("asr")
            } else if ct >= ss && ct < ss + 0.04 {
                Some("maghrib")
            } else if ct > ss + 0.05 {
                Some("isha")
            } else {
                None
            };
            if let Some(prayer) = prayer {
                return Some(Generated::new(prayer.to_string(), Some("isl")));
            }
        }

        let text = if ct < sr - 0.01 {
            time_diff_str(sr - ct, "sunrise")
        } else if ct <= sr + 0.01 {
            "sunrise".to_string()
        } else if ct < sn - 0.06 {
            time_diff_str(sr - ct, "sunrise")
        } else if ct < sn - 0.01 {
            time_diff_str(sn - ct, "solar noon")
        } else if ct <= sn + 0.01 {
            "solar noon".to_string()
        } else if ct <= sn + 0.06 {
            time_diff_str(sn - ct, "solar noon")
        } else if ct < ss - 0.01 {
            time_diff_str(ss - ct, "sunset")
        } else if ct <= ss + 0.01 {
            "sunset".to_string()
        } else if ct <= ss + 0.03 {
            "twilight".to_string()
        } else {
            time_diff_str(ss - ct, "sunset")
        };
        Some(Generated::new(text, None))
    }

    fn moon(&self, ctx: &Context) -> Option<Generated> {
        let age = self.almanac.moon_phase(ctx.local) * 29.53;
        let phase = if age < 1.84 {
            "new"
        } else if age < 5.53 {
            "waxing crescent"
        } else if age < 9.22 {
            "first quarter"
        } else if age < 12.91 {
            "waxing gibbous"
        } else if age < 16.61 {
            "full"
        } else if age < 20.30 {
            "waning gibbous"
        } else if age < 23.99 {
            "third quarter"
        } else if age < 27.68 {
            "waning crescent"
        } else if age < 29.54 {
            "new"
        } else {
            return None;
        };
        Some(Generated::new(format!("under a {phase} moon"), Some("mun")))
    }

    /// Julian day number of the UTC date.
    fn julian_day(&self, ctx: &Context) -> i64 {
        let midnight = ctx.utc.date().and_time(NaiveTime::MIN);
        self.almanac.julian_date(midnight).floor() as i64 + 1
    }

    fn julian(&self, ctx: &Context) -> Option<Generated> {
        let remainder = u64::try_from(self.julian_day(ctx) - 2_000_000).ok()?;
        let words = num_to_text(remainder, false)?;
        Some(Generated::new(format!("julian day two million {words}"), None))
    }

    fn zodiac(&self, ctx: &Context, rng: &mut dyn RandomService) -> Option<Generated> {
        let mmdd = ctx.local.month() * 100 + ctx.local.day();
        let r = rng.uniform_int(1, 1, 50);
        let text = if r < 10 {
            let planet = *Planet::ALL.get(r as usize - 1)?;
            let constellation = self.almanac.planet_constellation(planet, ctx.utc)?;
            format!("{} is in the constellation of {}", planet.name(), constellation)
        } else if r < 20 {
            format!("under the tropical sign of {}", band(&TROPICAL_SIGNS, mmdd))
        } else if r < 30 {
            format!("under the sidereal sign of {}", band(&SIDEREAL_SIGNS, mmdd))
        } else if r < 40 {
            format!("under the constellation of {}", band(&CONSTELLATIONS, mmdd))
        } else {
            format!("under the star {}", band(&STARS, mmdd))
        };
        Some(Generated::new(text, Some("zod")))
    }

    fn mars(&self, ctx: &Context, rng: &mut dyn RandomService) -> Option<Generated> {
        let mars = self.almanac.mars_time(ctx.utc)?;
        let mut text = format!("sol {}", num_to_text(mars.sol, false)?);
        if rng.uniform_int(1, 1, 40) > 20 {
            text.push_str(" coordinated mars time ");
            text.push_str(&num_to_text(u64::from(mars.hour), false)?);
            text.push(' ');
            if mars.minute < 10 {
                text.push_str("oh ");
            }
            text.push_str(&num_to_text(u64::from(mars.minute), false)?);
        }
        Some(Generated::new(text, Some("mrs")))
    }

    /// Distance of a probe from the sun, extrapolated from a fixed position
    /// at constant speed.
    fn probe(&self, ctx: &Context, rng: &mut dyn RandomService) -> Option<Generated> {
        let day = self.julian_day(ctx) as f64;
        let r = rng.uniform_int(1, 1, 50);
        let index = (r / 10).min(4) as usize;
        let (name, fix_day, fix_miles, speed) = PROBES[index];
        let billions = ((day - fix_day) * 86_400.0 * speed + fix_miles) / 1e9;
        let whole = billions.floor();
        let millions = ((billions - whole) * 1000.0) as u64;

        let mut text = format!(
            "the {name} spacecraft is approximately {} billion ",
            num_to_text(whole as u64, false)?
        );
        if millions > 0 {
            text.push_str(&num_to_text(millions, false)?);
            text.push_str(" million ");
        }
        text.push_str("miles from the sun");
        Some(Generated::new(text, Some("pbd")))
    }
}

fn islamic(field: &str, rng: &mut dyn RandomService) -> Option<Generated> {
    let date = CalendarDate::parse(field)?;
    let month = ISLAMIC_MONTHS.get(usize::try_from(date.month).ok()?.checked_sub(1)?)?;
    Some(Generated::new(assemble_date(&date, month, rng)?, Some("isl")))
}

/// `ddmmyyyyY`, where `Y` keys the year of the sexagenary cycle.
fn chinese(field: &str, rng: &mut dyn RandomService) -> Option<Generated> {
    let date = CalendarDate::parse(field)?;
    let key = field.get(8..9)?;
    let cycle = SEXAGENARY_KEYS.find(key)?;
    let element = (cycle % 10) / 2;
    let animal = cycle % 12;
    let month = usize::try_from(date.month).ok()?.checked_sub(1)?;

    let d = format!("the {} day of", num_to_text(date.day, true)?);
    let month_name = if rng.percentile() <= 50 {
        CHINESE_MONTHS_FLORAL.get(month)?
    } else {
        CHINESE_MONTHS_NUMBERED.get(month)?
    };
    let m = format!("the month of {month_name}");
    let y = if rng.percentile() <= 50 {
        format!(
            "in the year of the {} {}",
            CHINESE_ELEMENTS[element], CHINESE_ANIMALS[animal]
        )
    } else {
        format!(
            "in the year of {} {}",
            CHINESE_STEMS[cycle % 10],
            CHINESE_BRANCHES[animal]
        )
    };

    let r = rng.uniform_int(1, 1, 50);
    let text = if r < 10 {
        format!("{d} {m}")
    } else if r < 20 {
        m
    } else if r < 30 {
        format!("{m} {y}")
    } else if r < 40 {
        y
    } else {
        format!("{d} {m} {y}")
    };
    Some(Generated::new(text, Some("chn")))
}

/// Months above 20 belong to a leap year and count from 21.
fn hebrew(field: &str, rng: &mut dyn RandomService) -> Option<Generated> {
    let date = CalendarDate::parse(field)?;
    let (leap, month) = if date.month > 20 {
        (true, date.month - 21)
    } else {
        (false, date.month.checked_sub(1)?)
    };
    let index = match (leap, month) {
        (true, m) if m >= 5 => m + 1,
        (false, m) if m >= 6 => m + 2,
        (_, m) => m,
    };
    let name = HEBREW_MONTHS.get(usize::try_from(index).ok()?)?;
    Some(Generated::new(assemble_date(&date, name, rng)?, Some("heb")))
}

/// `kkwwttKKKbb`: k'in, winal, tun, k'atun, b'ak'tun.
fn long_count(field: &str, rng: &mut dyn RandomService) -> Option<Generated> {
    let kin = format!("{} k'in", num_to_text(digits(field, 0..2)?, true)?);
    let winal = format!("{} winal", num_to_text(digits(field, 2..4)?, true)?);
    let tun = format!("{} tun", num_to_text(digits(field, 4..6)?, true)?);
    let katun = format!("{} k'atun", num_to_text(digits(field, 6..9)?, true)?);
    let baktun = format!(
        "in the {} b'ak'tun",
        num_to_text(digits(field, 9..11)?, true)?
    );

    let r = rng.uniform_int(1, 1, 120);
    let text = if r < 10 {
        format!("in the {kin}")
    } else if r < 20 {
        format!("in the {kin} of the {winal}")
    } else if r < 30 {
        format!("in the {kin} of the {winal} in the {tun}")
    } else if r < 40 {
        format!("in the {winal}")
    } else if r < 50 {
        format!("in the {winal} of the {tun}")
    } else if r < 60 {
        format!("in the {winal} of the {tun} in the {katun}")
    } else if r < 70 {
        format!("in the {tun}")
    } else if r < 80 {
        format!("in the {tun} of the {katun}")
    } else if r < 90 {
        format!("in the {tun} of the {katun} {baktun}")
    } else if r < 100 {
        format!("in the {katun}")
    } else if r < 110 {
        format!("in the {katun} {baktun}")
    } else {
        baktun
    };
    Some(Generated::new(text, Some("myn")))
}

fn indian(field: &str, rng: &mut dyn RandomService) -> Option<Generated> {
    let date = CalendarDate::parse(field)?;
    let month = INDIAN_MONTHS.get(usize::try_from(date.month).ok()?.checked_sub(1)?)?;
    Some(Generated::new(assemble_date(&date, month, rng)?, Some("ind")))
}

fn coptic(field: &str, rng: &mut dyn RandomService) -> Option<Generated> {
    let date = CalendarDate::parse(field)?;
    let month = COPTIC_MONTHS.get(usize::try_from(date.month).ok()?.checked_sub(1)?)?;
    Some(Generated::new(assemble_date(&date, month, rng)?, Some("cop")))
}

/// Countdown to the temple burn, the man burn or the gate opening. Runs
/// only through August 19th.
fn burn(ctx: &Context, rng: &mut dyn RandomService) -> Option<Generated> {
    let now = ctx.local;
    if now.year() > BURN_LAST_YEAR || now.month() > 8 || (now.month() == 8 && now.day() > 19) {
        return None;
    }
    let labor_day = labor_day(now.year())?.and_time(NaiveTime::MIN);
    let r = rng.uniform_int(1, 1, 120);
    let (target, event) = if r < 40 {
        (labor_day - Duration::days(1), "the temple burns")
    } else if r < 80 {
        (labor_day - Duration::days(2), "the man burns")
    } else {
        (labor_day - Duration::days(8), "the gates open")
    };

    let (months, days) = months_and_days(now, target);
    let mut text = match months {
        0 => String::new(),
        1 => "one month ".to_string(),
        n => format!("{} months ", num_to_text(u64::from(n), false)?),
    };
    match days {
        0 => text.push_str("until "),
        1 => text.push_str("one day until "),
        n => {
            text.push_str(&num_to_text(u64::try_from(n).ok()?, false)?);
            text.push_str(" days until ");
        }
    }
    text.push_str(event);
    Some(Generated::new(text, Some("brc")))
}
