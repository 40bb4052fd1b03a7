//! Renderers for the computed `<X` codes that need more than a lookup.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::core::geo::{compass_point, rhumb_bearing, rhumb_distance_km, COMPASS};
use crate::core::numerals::{num_to_text, ONES};
use crate::core::random::{byte_width_for, RandomService};
use crate::schema::context::{to_twelve_hour, Context};

pub const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Indexed from Sunday.
pub const WEEKDAYS: [&str; 7] = [
    "sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday",
];

const KM_TO_MILES: f64 = 0.62137;

/// Minimum distance, in kilometers, for a bearing to be worth showing.
pub const MIN_BEARING_KM: f64 = 25.0;

pub const FLAVOR_NAMES: [&str; 80] = [
    "bandicoot coloringbook", "baritone choirboy", "benedryl cucumber", "benedict cumberbatch",
    "benzedrine charcoal", "benefit carwash", "ballpark centerfield", "bellicose custardbath",
    "beeinfested cucumberpatch", "bumpercar crumplezone", "burlington coatfactory",
    "benevolent computerglitch", "buildingmaterial cinderblock", "braidedhair yogamat",
    "birdfeeder climatechange", "beneficial cabbagepants", "bumblebee cutiebutt",
    "badfinger carebearstare", "barbecue charcuterieboard", "barrister tennismatch",
    "britishname cantgetitright", "bandersnoot cannabis", "bustamove charlestondance",
    "budapest lumberjack", "backitup johnnycash", "backflipping corgidogs",
    "boondoggle campaignmanager", "battlefield counterstrike", "balancepole carryingcase",
    "bathysphere cuttlefish", "butternut crinklefries", "butterfried crunchwrap",
    "bedridden catalepticman", "butcherknife kitchenware", "beachside contemplation",
    "bangladesh cricketmatch", "beelzebubs carphonenumber", "beneficial cholesterol",
    "burningman centercamp", "badminton concubine", "bangalore kryptonite",
    "build-a-bear comewithme", "barelylegal codename", "burningdown campingspot",
    "bucketboy compostbin", "buffalo cornerstone", "barristerof collingswood",
    "brambleberry creampie", "berryflavored cookiebatch", "burberry crochetpattern",
    "bakelite countertop", "bentonite claycement", "beachcomber cleanupcrew",
    "bendystraw creamsodacup", "broccolislaw carmelcorn", "boogieman cantgetenough",
    "borealis carringtonevent", "beattheodds kesselrun", "breakingnews kesslersyndrome",
    "beveryquiet chasingrabbits", "byzantine codedmessage", "brocaded cummerbund",
    "byzantium crusadeknight", "bollywood cameracrew", "beneficial cantonfood",
    "butterfinger candybar", "bootycall comeovertonight", "barelynoticed catchphrase",
    "balancingact catchersnet", "baseball catchersmitt", "bernardino highwaycrash",
    "billionaire casinowinner", "broccolislaw cupofnoodles", "bodywork cadillac",
    "blacklight cameralens", "blackletter calligraphy", "barcelona krispykreme",
    "bossanova carhorn", "baselessly convicted", "beverly crushersghost",
];

pub const EVENTS: [&str; 100] = [
    "airplanes", "alcohol", "aliens", "anthropology", "archery", "architecture", "art history",
    "artificial intelligence", "astronomy", "avionics", "baking", "biomimicry", "blacksmithing",
    "bluegrass", "body modification", "body painting", "bondage", "braiding", "burlesque",
    "cephalopods", "cooking", "crafting", "crystals", "daoism", "dance", "deep time",
    "demolitions", "drag queens", "drugs", "dungeons and dragons", "ecology", "economics",
    "electronics", "engineering", "fashion", "fencing", "filmmaking", "finance", "flogging",
    "fly fishing", "food", "forestry", "furries", "futurism", "genomics", "ghosts", "gnosticism",
    "group sex", "hacking", "healing", "hentai", "herbalism", "history", "humanism",
    "icelandic sagas", "journaling", "kung fu", "landscaping", "linguistics", "magic",
    "medicine", "music theory", "mysticism", "networking", "nudity", "opera", "photography",
    "physics", "podcasting", "poetry", "politics", "pornography", "psychology", "recovery",
    "religion", "robotics", "sailing", "science", "scrapbooking", "security systems", "sewing",
    "sex", "social media", "solar power", "solarpunk", "space travel", "sportsmanship",
    "steampunk", "stripping", "survivalism", "tacos", "tattoos", "technology", "time travel",
    "transportation", "witchcraft", "yoga", "zombies", "zoology", "zymurgy",
];

pub const PLAYA_LOCATIONS: [&str; 24] = [
    "the esplanade", "the nearest intersection", "the man", "the temple",
    "the nearest art project", "the nearest bar", "the nearest sound camp",
    "the nearest art car", "the nearest camp", "the nearest healing camp", "dpw ghetto",
    "the nearest porta potty", "the nearest plaza", "the lamplighters",
    "the nearest coffee camp", "the airport", "the nearest science camp",
    "the nearest food camp", "center camp", "the nearest performance space", "the artery",
    "the first camp you see", "the closest camp to you", "bmir",
];

const PLAYA_STREETS: [&str; 4] = [" o'clock", " fifteen", " thirty", " forty five"];
const PLAYA_LETTERS: [&str; 11] = ["esplanade", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];

fn pick<'a>(table: &[&'a str], rng: &mut dyn RandomService) -> &'a str {
    let hi = u32::try_from(table.len().saturating_sub(1)).unwrap_or(u32::MAX);
    table
        .get(rng.uniform_int(1, 0, hi) as usize)
        .copied()
        .unwrap_or_default()
}

/// `=lo-hi` with `lo <= hi`.
fn parse_range(param: &str) -> Option<(u32, u32)> {
    let (lo, hi) = param.strip_prefix('=')?.split_once('-')?;
    let lo: u32 = lo.parse().ok()?;
    let hi: u32 = hi.parse().ok()?;
    if lo > hi {
        None
    } else {
        Some((lo, hi))
    }
}

/// Exactly `'` after the code asks for the hour rounded on the minutes.
/// Any other suffix renders the plain hour.
fn rounding_flag(text: &str) -> bool {
    text.get(2..) == Some("'")
}

/// Kilometers, or miles three times in ten.
fn distance_phrase(km: f64, rng: &mut dyn RandomService) -> Option<String> {
    if rng.percentile() > 70 {
        let miles = num_to_text((km * KM_TO_MILES) as u64, false)?;
        Some(format!("{miles} miles"))
    } else {
        Some(format!("{} kilometers", num_to_text(km as u64, false)?))
    }
}

pub fn coordinates(ctx: &Context) -> Option<String> {
    let lat = num_to_text(ctx.latitude.round().abs() as u64, false)?;
    let lon = num_to_text(ctx.longitude.round().abs() as u64, false)?;
    let ns = if ctx.latitude < 0.0 { "south" } else { "north" };
    let ew = if ctx.longitude < 0.0 { "west" } else { "east" };
    Some(format!("{lat} degrees {ns} by {lon} degrees {ew}"))
}

pub fn flavor(rng: &mut dyn RandomService) -> Option<String> {
    Some(pick(&FLAVOR_NAMES, rng).to_string())
}

pub fn century(ctx: &Context) -> Option<String> {
    let words = if ctx.local.year() < 2100 {
        "twenty first"
    } else {
        "twenty second"
    };
    Some(words.to_string())
}

pub fn weekday(ctx: &Context) -> Option<String> {
    let index = (ctx.weekday_number() - 1) as usize;
    WEEKDAYS.get(index).map(|s| s.to_string())
}

fn coordinate_part(sign: &str, degrees: &str, thousandths: &str) -> Option<f64> {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(degrees) || !all_digits(thousandths) {
        return None;
    }
    let value = degrees.parse::<f64>().ok()? + thousandths.parse::<f64>().ok()? / 1000.0;
    match sign {
        "+" => Some(value),
        "-" => Some(-value),
        _ => None,
    }
}

/// Target of `<G=+ddfff,+dddfff`.
pub fn parse_target(text: &str) -> Option<(f64, f64)> {
    if text.len() != 17 || text.get(2..3)? != "=" || text.get(9..10)? != "," {
        return None;
    }
    let lat = coordinate_part(text.get(3..4)?, text.get(4..6)?, text.get(6..9)?)?;
    let lon = coordinate_part(text.get(10..11)?, text.get(11..14)?, text.get(14..17)?)?;
    Some((lat, lon))
}

/// Direction and/or distance from a fixed target to the display.
pub fn bearing(text: &str, ctx: &Context, rng: &mut dyn RandomService) -> Option<String> {
    let (lat, lon) = parse_target(text)?;
    let km = rhumb_distance_km(ctx.latitude, ctx.longitude, lat, lon);
    if km < MIN_BEARING_KM {
        return None;
    }
    // Near the poles every heading collapses onto one direction.
    let direction = if lat < -87.0 {
        "north"
    } else if lat > 87.0 {
        "south"
    } else {
        compass_point(rhumb_bearing(ctx.latitude, ctx.longitude, lat, lon))
    };
    let distance = distance_phrase(km, rng)?;
    let r = rng.uniform_int(1, 1, 90);
    Some(if r < 30 {
        format!("{direction} of")
    } else if r < 60 {
        format!("{distance} from")
    } else {
        format!("{distance} {direction} of")
    })
}

pub fn hour(text: &str, time: &NaiveDateTime) -> Option<String> {
    let rounding = rounding_flag(text);
    let mut hh = time.hour();
    if rounding && time.minute() > 30 {
        hh += 1;
    }
    if hh > 24 {
        hh -= 24;
    }
    let words = num_to_text(hh as u64, false)?;
    if (1..10).contains(&hh) {
        Some(format!("oh {words}"))
    } else {
        Some(words)
    }
}

pub fn twelve_hour(text: &str, ctx: &Context) -> Option<String> {
    let rounding = rounding_flag(text);
    let mut hh = to_twelve_hour(ctx.local.hour());
    if rounding && ctx.local.minute() > 30 {
        hh += 1;
    }
    if hh > 12 {
        hh -= 12;
    }
    if hh == 0 {
        return Some("midnight".to_string());
    }
    num_to_text(hh as u64, false)
}

pub fn month(ctx: &Context) -> Option<String> {
    MONTHS.get(ctx.local.month0() as usize).map(|s| s.to_string())
}

pub fn random_month(rng: &mut dyn RandomService) -> Option<String> {
    let m = rng.uniform_int(2, 1, 12) as usize;
    MONTHS.get(m - 1).map(|s| s.to_string())
}

/// Random distance in `=lo-hi` kilometers and a random compass point.
pub fn random_distance(param: &str, rng: &mut dyn RandomService) -> Option<String> {
    let (lo, hi) = parse_range(param)?;
    let km = rng.uniform_int(byte_width_for(hi), lo, hi) as f64;
    let distance = distance_phrase(km, rng)?;
    let heading = COMPASS[rng.uniform_int(1, 1, 16) as usize % COMPASS.len()];
    let r = rng.uniform_int(1, 1, 120);
    Some(if r < 40 {
        format!("{heading} of")
    } else if r < 80 {
        format!("{distance} from")
    } else {
        format!("{distance} {heading} from")
    })
}

/// A landmark, or a clock-position address like `four thirty and c`.
pub fn playa_location(rng: &mut dyn RandomService) -> Option<String> {
    if rng.percentile() < 40 {
        return Some(pick(&PLAYA_LOCATIONS, rng).to_string());
    }
    let clock = rng.uniform_int(1, 2, 10) as usize;
    let mut street = rng.uniform_int(1, 0, 3) as usize;
    if clock == 10 {
        street = 0;
    }
    let letter = PLAYA_LETTERS[(rng.uniform_int(1, 1, 110) % 11) as usize];
    Some(format!(
        "{}{} and {}",
        ONES[clock - 1],
        PLAYA_STREETS[street],
        letter
    ))
}

pub fn random_number(param: &str, ordinal: bool, rng: &mut dyn RandomService) -> Option<String> {
    let (lo, hi) = parse_range(param)?;
    let n = rng.uniform_int(byte_width_for(hi), lo, hi);
    num_to_text(n as u64, ordinal)
}

/// Roll 1..=700 in bands of 100. Sunday's band is one short (1..=99) and
/// Saturday takes whatever is left.
pub fn random_weekday(rng: &mut dyn RandomService) -> Option<String> {
    let r = rng.uniform_int(2, 1, 700);
    let day = if r < 100 {
        "sunday"
    } else if r < 200 {
        "monday"
    } else if r < 300 {
        "tuesday"
    } else if r < 400 {
        "wednesday"
    } else if r < 500 {
        "thursday"
    } else if r < 600 {
        "friday"
    } else {
        "saturday"
    };
    Some(day.to_string())
}

/// `two thousand twenty five` or `twenty twenty five`, even odds.
pub fn year(ctx: &Context, rng: &mut dyn RandomService) -> Option<String> {
    let year = ctx.local.year().max(0) as u64;
    if rng.percentile() <= 50 {
        return num_to_text(year, false);
    }
    let high = num_to_text(year / 100, false)?;
    let low = match year % 100 {
        0 => "hundred".to_string(),
        n @ 1..=9 => format!("oh {}", num_to_text(n, false)?),
        n => num_to_text(n, false)?,
    };
    Some(format!("{high} {low}"))
}

pub fn event(rng: &mut dyn RandomService) -> Option<String> {
    Some(pick(&EVENTS, rng).to_string())
}

pub fn minutes(minute: u32) -> Option<String> {
    let words = num_to_text(minute as u64, false)?;
    if minute < 10 {
        Some(format!("oh {words}"))
    } else {
        Some(words)
    }
}

pub fn meridiem(ctx: &Context) -> Option<String> {
    Some(if ctx.local.hour() < 12 { "a.m." } else { "p.m." }.to_string())
}

/// `=northern|southern`, chosen by the sign of the latitude.
pub fn hemisphere(param: &str, ctx: &Context) -> Option<String> {
    let (north, south) = param.strip_prefix('=')?.split_once('|')?;
    Some(if ctx.latitude < 0.0 { south } else { north }.to_string())
}

/// Lead-in phrase; three rolls in ten give nothing at all.
pub fn connective(rng: &mut dyn RandomService) -> Option<String> {
    let r = rng.percentile();
    let phrase = if r < 10 {
        "time to"
    } else if r < 20 {
        "a good time to"
    } else if r < 30 {
        "just about time to"
    } else if r < 40 {
        "almost time to"
    } else if r < 50 {
        "approaching the time to"
    } else if r < 60 {
        "a time to"
    } else if r < 70 {
        "nearly time to"
    } else {
        ""
    };
    Some(phrase.to_string())
}
