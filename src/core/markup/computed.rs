//! Pass 5: computed `<X` codes rendered from the context and random draws.

use chrono::{Datelike, Timelike};
use log::trace;
use rustc_hash::FxHashMap;

use crate::core::markup::handlers;
use crate::core::numerals::{choose_between, num_to_text};
use crate::core::random::RandomService;
use crate::core::timezone::{region_display_name, TimezoneService};
use crate::schema::context::Context;

/// Characters that end a computed token's parameter.
const TERMINATORS: [char; 3] = [' ', '~', '/'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputedCode {
    /// `A` latitude and longitude in whole degrees.
    Coordinates,
    /// `B` one of the two-word B.C. names.
    Flavor,
    /// `C`
    Century,
    /// `D` local weekday.
    Weekday,
    /// `G=+ddfff,+dddfff` direction and distance from a fixed point.
    Bearing,
    /// `H` and `H'`
    UtcHour,
    /// `M` local month.
    Month,
    /// `N`
    RandomMonth,
    /// `O=lo-hi`
    RandomDistance,
    /// `P` somewhere in Black Rock City.
    PlayaLocation,
    /// `R=lo-hi`
    RandomNumber,
    /// `S`
    Season,
    /// `W`
    RandomWeekday,
    /// `Y` local year, spoken one of two ways.
    Year,
    /// `Z` display name of the context's region.
    ZoneName,
    /// `d` ordinal day of the month.
    DayOfMonth,
    /// `e` a random event topic, drawn fresh for every occurrence.
    Event,
    /// `g` geomagnetic readings. There is no source for them, so it always rejects.
    Geomagnetic,
    /// `h` and `h'`
    LocalHour,
    /// `i` and `i'` twelve-hour clock.
    TwelveHour,
    /// `m`
    LocalMinute,
    /// `n`
    UtcMinute,
    /// `p` a.m. or p.m.
    Meridiem,
    /// `r=lo-hi` as an ordinal.
    RandomOrdinal,
    /// `s=north|south`
    Hemisphere,
    /// `t` lead-in phrase, possibly empty.
    Connective,
    /// `y` day of the year; `yo` and longer spell it as an ordinal.
    DayOfYear,
    /// `?a|b|c` inline choice.
    Choice,
}

impl ComputedCode {
    pub fn from_char(c: char) -> Option<ComputedCode> {
        Some(match c {
            'A' => Self::Coordinates,
            'B' => Self::Flavor,
            'C' => Self::Century,
            'D' => Self::Weekday,
            'G' => Self::Bearing,
            'H' => Self::UtcHour,
            'M' => Self::Month,
            'N' => Self::RandomMonth,
            'O' => Self::RandomDistance,
            'P' => Self::PlayaLocation,
            'R' => Self::RandomNumber,
            'S' => Self::Season,
            'W' => Self::RandomWeekday,
            'Y' => Self::Year,
            'Z' => Self::ZoneName,
            'd' => Self::DayOfMonth,
            'e' => Self::Event,
            'g' => Self::Geomagnetic,
            'h' => Self::LocalHour,
            'i' => Self::TwelveHour,
            'm' => Self::LocalMinute,
            'n' => Self::UtcMinute,
            'p' => Self::Meridiem,
            'r' => Self::RandomOrdinal,
            's' => Self::Hemisphere,
            't' => Self::Connective,
            'y' => Self::DayOfYear,
            '?' => Self::Choice,
            _ => return None,
        })
    }

    /// Whether every occurrence draws its own value instead of sharing one.
    pub fn draws_per_occurrence(self) -> bool {
        self == Self::Event
    }
}

/// One `<X...` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedToken<'t> {
    pub code: ComputedCode,
    /// Full token text, `<` included.
    pub text: &'t str,
    pub start: usize,
}

impl<'t> ComputedToken<'t> {
    /// Everything after `<X`.
    pub fn param(&self) -> &'t str {
        self.text.get(2..).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputedFault {
    /// `<` at the end of the text.
    MissingCode,
    UnknownCode(char),
}

/// Locate every computed token in order.
pub fn scan(text: &str) -> Result<Vec<ComputedToken<'_>>, ComputedFault> {
    let mut tokens = Vec::new();
    let mut search = 0;
    while let Some(offset) = text[search..].find('<') {
        let start = search + offset;
        let after = &text[start + 1..];
        let c = after.chars().next().ok_or(ComputedFault::MissingCode)?;
        let code = ComputedCode::from_char(c).ok_or(ComputedFault::UnknownCode(c))?;
        let param_start = start + 1 + c.len_utf8();
        let param_len = text[param_start..]
            .find(|ch| TERMINATORS.contains(&ch))
            .unwrap_or(text.len() - param_start);
        let end = param_start + param_len;
        tokens.push(ComputedToken {
            code,
            text: &text[start..end],
            start,
        });
        search = end;
    }
    Ok(tokens)
}

fn render<T: TimezoneService + ?Sized>(
    token: &ComputedToken<'_>,
    ctx: &Context,
    rng: &mut dyn RandomService,
    timezones: &T,
) -> Option<String> {
    match token.code {
        ComputedCode::Coordinates => handlers::coordinates(ctx),
        ComputedCode::Flavor => handlers::flavor(rng),
        ComputedCode::Century => handlers::century(ctx),
        ComputedCode::Weekday => handlers::weekday(ctx),
        ComputedCode::Bearing => handlers::bearing(token.text, ctx, rng),
        ComputedCode::UtcHour => handlers::hour(token.text, &ctx.utc),
        ComputedCode::Month => handlers::month(ctx),
        ComputedCode::RandomMonth => handlers::random_month(rng),
        ComputedCode::RandomDistance => handlers::random_distance(token.param(), rng),
        ComputedCode::PlayaLocation => handlers::playa_location(rng),
        ComputedCode::RandomNumber => handlers::random_number(token.param(), false, rng),
        ComputedCode::Season => Some(ctx.season().name().to_string()),
        ComputedCode::RandomWeekday => handlers::random_weekday(rng),
        ComputedCode::Year => handlers::year(ctx, rng),
        ComputedCode::ZoneName => timezones
            .region_record(ctx.region)
            .as_deref()
            .and_then(region_display_name),
        ComputedCode::DayOfMonth => num_to_text(ctx.local.day() as u64, true),
        ComputedCode::Event => handlers::event(rng),
        ComputedCode::Geomagnetic => None,
        ComputedCode::LocalHour => handlers::hour(token.text, &ctx.local),
        ComputedCode::TwelveHour => handlers::twelve_hour(token.text, ctx),
        ComputedCode::LocalMinute => handlers::minutes(ctx.local.minute()),
        ComputedCode::UtcMinute => handlers::minutes(ctx.utc.minute()),
        ComputedCode::Meridiem => handlers::meridiem(ctx),
        ComputedCode::RandomOrdinal => handlers::random_number(token.param(), true, rng),
        ComputedCode::Hemisphere => handlers::hemisphere(token.param(), ctx),
        ComputedCode::Connective => handlers::connective(rng),
        ComputedCode::DayOfYear => num_to_text(ctx.day_of_year() as u64, token.text.len() > 2),
        ComputedCode::Choice => choose_between(token.param(), '|', rng),
    }
}

/// Render every computed token. `None` rejects the template.
///
/// Identical tokens share one rendering, except `<e` which draws anew.
pub fn apply<T: TimezoneService + ?Sized>(
    text: &str,
    ctx: &Context,
    rng: &mut dyn RandomService,
    timezones: &T,
) -> Option<String> {
    let tokens = scan(text).ok()?;
    if tokens.is_empty() {
        return Some(text.to_string());
    }
    let mut rendered: FxHashMap<&str, String> = FxHashMap::default();
    let mut out = String::with_capacity(text.len() + 64);
    let mut cursor = 0;
    for token in &tokens {
        out.push_str(&text[cursor..token.start]);
        if token.code.draws_per_occurrence() {
            out.push_str(&render(token, ctx, rng, timezones)?);
        } else {
            if !rendered.contains_key(token.text) {
                let words = render(token, ctx, rng, timezones)?;
                trace!("computed token {} -> {:?}", token.text, words);
                rendered.insert(token.text, words);
            }
            if let Some(words) = rendered.get(token.text) {
                out.push_str(words);
            }
        }
        cursor = token.start + token.text.len();
    }
    out.push_str(&text[cursor..]);
    Some(out)
}
