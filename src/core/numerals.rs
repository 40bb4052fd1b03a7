//! Spelled-out numbers and a few phrase helpers built on them.

use crate::core::random::RandomService;

/// Largest value `num_to_text` will spell.
pub const MAX_SPELLED: u64 = 999_999;

pub const ONES: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];
const TEENS: [&str; 10] = [
    "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
    "eighteen", "nineteen",
];
const TENS: [&str; 8] = [
    "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const ONES_ORD: [&str; 9] = [
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
];
const TEENS_ORD: [&str; 10] = [
    "tenth", "eleventh", "twelfth", "thirteenth", "fourteenth", "fifteenth", "sixteenth",
    "seventeenth", "eighteenth", "nineteenth",
];
const TENS_ORD: [&str; 8] = [
    "twentieth", "thirtieth", "fortieth", "fiftieth", "sixtieth", "seventieth", "eightieth",
    "ninetieth",
];

/// Spell `n` as English words, cardinal or ordinal.
///
/// No "and" is inserted: 123 is "one hundred twenty three". Returns `None`
/// above 999,999.
pub fn num_to_text(n: u64, ordinal: bool) -> Option<String> {
    if n > MAX_SPELLED {
        return None;
    }
    if n == 0 {
        return Some(if ordinal { "zeroth" } else { "zero" }.to_string());
    }

    let mut words: Vec<&'static str> = Vec::new();
    let mut rest = n;

    let thousands = rest / 1000;
    if thousands > 0 {
        push_below_thousand(&mut words, thousands as usize, false);
        rest %= 1000;
        if rest == 0 && ordinal {
            words.push("thousandth");
            return Some(words.join(" "));
        }
        words.push("thousand");
    }

    if rest > 0 {
        push_below_thousand(&mut words, rest as usize, ordinal);
    }
    Some(words.join(" "))
}

fn push_below_thousand(words: &mut Vec<&'static str>, n: usize, ordinal: bool) {
    let mut rest = n;
    if rest >= 100 {
        words.push(ONES[rest / 100 - 1]);
        rest %= 100;
        if rest == 0 {
            words.push(if ordinal { "hundredth" } else { "hundred" });
            return;
        }
        words.push("hundred");
    }
    if rest >= 20 {
        let tens = rest / 10 - 2;
        rest %= 10;
        if rest == 0 {
            words.push(if ordinal { TENS_ORD[tens] } else { TENS[tens] });
            return;
        }
        words.push(TENS[tens]);
    }
    if rest >= 10 {
        words.push(if ordinal { TEENS_ORD[rest - 10] } else { TEENS[rest - 10] });
    } else if rest >= 1 {
        words.push(if ordinal { ONES_ORD[rest - 1] } else { ONES[rest - 1] });
    }
}

/// Phrase a gap, given as a fraction of a day, relative to a named event.
///
/// Positive gaps mean the event is still ahead ("until" under half an hour
/// of minutes, otherwise "before"); negative ones mean it has passed
/// ("after" / "since"). A zero gap yields the event name alone.
pub fn time_diff_str(day_fraction: f64, event: &str) -> String {
    if day_fraction == 0.0 {
        return event.to_string();
    }
    let ahead = day_fraction > 0.0;
    let d = day_fraction.abs();
    let hours = (24.0 * d) as u64;
    let minutes = ((1440.0 * d) as u64).saturating_sub(hours * 60);

    let mut s = String::new();
    match hours {
        0 => {}
        1 => s.push_str("one hour "),
        h => {
            if let Some(words) = num_to_text(h, false) {
                s.push_str(&words);
                s.push_str(" hours ");
            }
        }
    }
    match minutes {
        0 => {}
        1 => s.push_str("one minute "),
        m => {
            if let Some(words) = num_to_text(m, false) {
                s.push_str(&words);
                s.push_str(" minutes ");
            }
        }
    }
    let link = match (ahead, minutes < 30) {
        (true, true) => "until ",
        (true, false) => "before ",
        (false, true) => "after ",
        (false, false) => "since ",
    };
    s.push_str(link);
    s.push_str(event);
    s
}

/// Pick one non-blank alternative of a `delim`-separated list, trimmed.
pub fn choose_between(text: &str, delim: char, rng: &mut dyn RandomService) -> Option<String> {
    let options: Vec<&str> = text
        .split(delim)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if options.is_empty() {
        return None;
    }
    let hi = u32::try_from(options.len() - 1).unwrap_or(u32::MAX);
    let pick = rng.uniform_int(1, 0, hi) as usize;
    options.get(pick).map(|s| s.to_string())
}
