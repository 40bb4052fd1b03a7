//! Pass 2: year-distance tokens `(a-N)`, `(b-N)`, `(o-N)`.

use chrono::Datelike;
use log::trace;
use rustc_hash::FxHashMap;

use crate::core::numerals::num_to_text;
use crate::core::random::RandomService;
use crate::schema::context::Context;

/// How a year token counts from its reference year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearKind {
    /// `a`: years since a common-era year.
    After,
    /// `b`: years since a year before the common era; there is no year zero.
    Before,
    /// `o`: like `a`, rendered as an ordinal with no qualifier.
    Ordinal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearToken<'t> {
    pub kind: YearKind,
    pub year: i64,
    /// Full token text, parentheses included.
    pub text: &'t str,
    pub start: usize,
}

impl YearToken<'_> {
    /// Signed distance in years from the reference year to `current`.
    pub fn delta(&self, current: i64) -> i64 {
        match self.kind {
            YearKind::After | YearKind::Ordinal => current - self.year,
            YearKind::Before => current + self.year - 1,
        }
    }
}

/// Locate every year token. `None` when any `(` does not open one.
pub fn scan(text: &str) -> Option<Vec<YearToken<'_>>> {
    let mut tokens = Vec::new();
    let mut search = 0;
    while let Some(offset) = text[search..].find('(') {
        let start = search + offset;
        let token = parse_at(text, start)?;
        search = start + token.text.len();
        tokens.push(token);
    }
    Some(tokens)
}

fn parse_at(text: &str, start: usize) -> Option<YearToken<'_>> {
    let bytes = text.as_bytes();
    let kind = match bytes.get(start + 1)? {
        b'a' => YearKind::After,
        b'b' => YearKind::Before,
        b'o' => YearKind::Ordinal,
        _ => return None,
    };
    if *bytes.get(start + 2)? != b'-' {
        return None;
    }
    let digits_start = start + 3;
    let digits_len = bytes[digits_start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return None;
    }
    let close = digits_start + digits_len;
    if *bytes.get(close)? != b')' {
        return None;
    }
    let year = text[digits_start..close].parse().ok()?;
    Some(YearToken {
        kind,
        year,
        text: &text[start..=close],
        start,
    })
}

fn render(token: &YearToken<'_>, current: i64, rng: &mut dyn RandomService) -> Option<String> {
    let delta = token.delta(current);
    if delta.abs() < 2 {
        return None;
    }
    let words = num_to_text(delta.unsigned_abs(), token.kind == YearKind::Ordinal)?;
    if token.kind == YearKind::Ordinal {
        return Some(words);
    }
    let first = rng.percentile() <= 50;
    let qualifier = match (delta < 0, first) {
        (true, true) => " years before",
        (true, false) => " years until",
        (false, true) => " years after",
        (false, false) => " years since",
    };
    Some(words + qualifier)
}

/// Replace every year token. `None` rejects the template.
pub fn apply(text: &str, ctx: &Context, rng: &mut dyn RandomService) -> Option<String> {
    let tokens = scan(text)?;
    if tokens.is_empty() {
        return Some(text.to_string());
    }
    let current = ctx.local.year() as i64;
    let mut rendered: FxHashMap<&str, String> = FxHashMap::default();
    let mut out = String::with_capacity(text.len() + 32);
    let mut cursor = 0;
    for token in &tokens {
        out.push_str(&text[cursor..token.start]);
        if !rendered.contains_key(token.text) {
            let words = render(token, current, rng)?;
            trace!("year token {} -> {}", token.text, words);
            rendered.insert(token.text, words);
        }
        if let Some(words) = rendered.get(token.text) {
            out.push_str(words);
        }
        cursor = token.start + token.text.len();
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedRandom;
    use chrono::NaiveDate;

    fn ctx_in(year: i32) -> Context {
        let utc = NaiveDate::from_ymd_opt(year, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Context::from_utc(utc, 0, 10.0, 10.0, 1)
    }

    #[test]
    fn same_year_rejects() {
        let mut rng = ScriptedRandom::default();
        assert_eq!(apply("(a-2025)", &ctx_in(2025), &mut rng), None);
        assert_eq!(apply("(a-2024)", &ctx_in(2025), &mut rng), None);
    }

    #[test]
    fn later_year_renders_with_qualifier() {
        let mut rng = ScriptedRandom::new([10]);
        assert_eq!(
            apply("(a-2025)", &ctx_in(2027), &mut rng).as_deref(),
            Some("two years after")
        );
        let mut rng = ScriptedRandom::new([90]);
        assert_eq!(
            apply("(a-1969) the moon landing", &ctx_in(2026), &mut rng).as_deref(),
            Some("fifty seven years since the moon landing")
        );
    }

    #[test]
    fn future_reference_is_before_or_until() {
        let mut rng = ScriptedRandom::new([90]);
        assert_eq!(
            apply("(a-2030) the launch", &ctx_in(2026), &mut rng).as_deref(),
            Some("four years until the launch")
        );
    }

    #[test]
    fn bce_years_skip_zero() {
        let mut rng = ScriptedRandom::new([1]);
        assert_eq!(
            apply("(b-44) caesar", &ctx_in(2025), &mut rng).as_deref(),
            Some("two thousand sixty eight years after caesar")
        );
    }

    #[test]
    fn ordinal_has_no_qualifier() {
        let mut rng = ScriptedRandom::default();
        assert_eq!(
            apply("the (o-1776) anniversary", &ctx_in(2026), &mut rng).as_deref(),
            Some("the two hundred fiftieth anniversary")
        );
        assert_eq!(rng.drawn(), 0);
    }

    #[test]
    fn repeated_token_renders_once() {
        let mut rng = ScriptedRandom::new([10, 90]);
        assert_eq!(
            apply("(a-2000) and (a-2000)", &ctx_in(2025), &mut rng).as_deref(),
            Some("twenty five years after and twenty five years after")
        );
        assert_eq!(rng.drawn(), 1);
    }

    #[test]
    fn stray_paren_fails_closed() {
        let mut rng = ScriptedRandom::default();
        assert_eq!(apply("(c-2000)", &ctx_in(2025), &mut rng), None);
        assert_eq!(apply("(a-)", &ctx_in(2025), &mut rng), None);
        assert_eq!(apply("(a-2000", &ctx_in(2025), &mut rng), None);
        assert_eq!(apply("trailing (", &ctx_in(2025), &mut rng), None);
    }

    #[test]
    fn untouched_without_tokens() {
        let mut rng = ScriptedRandom::default();
        assert_eq!(
            apply("no years here", &ctx_in(2025), &mut rng).as_deref(),
            Some("no years here")
        );
    }
}
