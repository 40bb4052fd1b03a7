//! Pass 3: two-character macro codes, `_0` for "midnight" and so on.

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Every macro code and its phrase.
pub const MACROS: [(char, &str); 74] = [
    ('%', "nativity fast"),
    ('&', "moon"),
    ('*', "since"),
    (',', "of the"),
    ('.', "night"),
    ('0', "midnight"),
    ('1', "somewhere"),
    ('2', "sometime"),
    ('3', "getting"),
    ('4', "approaching"),
    ('5', "in the evening"),
    ('6', "at night"),
    ('7', "your"),
    ('8', "month"),
    ('9', "week"),
    (':', "the feast of"),
    ('@', "festival"),
    ('A', "the discovery of"),
    ('B', "almost"),
    ('C', "around"),
    ('D', "nearly"),
    ('E', "o'clock"),
    ('F', "about"),
    ('G', "approximately"),
    ('H', "half past"),
    ('I', "until"),
    ('J', "before"),
    ('K', "after"),
    ('L', "last"),
    ('M', "year"),
    ('N', "years"),
    ('O', "months"),
    ('P', "days"),
    ('Q', "hours"),
    ('R', "minutes"),
    ('S', "seconds"),
    ('T', "right now"),
    ('U', "anniversary"),
    ('V', "quarter"),
    ('W', "in the morning"),
    ('X', "top of the hour"),
    ('Y', "bottom of the hour"),
    ('Z', "in the afternoon"),
    ('[', "awareness month"),
    (']', "the invention of"),
    ('`', "paces"),
    ('a', "time to"),
    ('b', "a.m."),
    ('c', "p.m."),
    ('d', "hundred hours"),
    ('e', "noon"),
    ('f', "time for"),
    ('g', "straight up"),
    ('h', "just after"),
    ('i', "just before"),
    ('j', "appreciation day"),
    ('k', "awareness day"),
    ('l', "at the start of"),
    ('m', "remembrance"),
    ('n', "the end of"),
    ('o', "the beginning of"),
    ('p', "the birth of"),
    ('q', "the death of"),
    ('r', "the founding of"),
    ('s', "first"),
    ('t', "day"),
    ('u', "international"),
    ('v', "birthday"),
    ('w', "national"),
    ('x', "saint"),
    ('y', "the publication of"),
    ('z', "chocolate"),
    ('{', "in the"),
    ('}', "meteors"),
];

/// Characters allowed right after a macro code.
pub const DELIMITERS: [char; 5] = [' ', ';', '|', '~', '/'];

fn table() -> &'static FxHashMap<char, &'static str> {
    static TABLE: OnceLock<FxHashMap<char, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| MACROS.iter().copied().collect())
}

pub fn phrase(code: char) -> Option<&'static str> {
    table().get(&code).copied()
}

/// Where a macro goes wrong, for the linter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroFault {
    /// `_` at the end of the text.
    MissingCode,
    UnknownCode(char),
    /// Code followed by something other than a delimiter.
    BadDelimiter(char),
}

/// Check one `_` at `chars[i]`, returning its code.
fn check(chars: &[char], i: usize) -> Result<char, MacroFault> {
    let code = *chars.get(i + 1).ok_or(MacroFault::MissingCode)?;
    match chars.get(i + 2) {
        Some(&next) if !DELIMITERS.contains(&next) => return Err(MacroFault::BadDelimiter(next)),
        _ => {}
    }
    if phrase(code).is_none() {
        return Err(MacroFault::UnknownCode(code));
    }
    Ok(code)
}

/// All macro faults in `text`, in order.
pub fn faults(text: &str) -> Vec<MacroFault> {
    let chars: Vec<char> = text.chars().collect();
    (0..chars.len())
        .filter(|&i| chars[i] == '_')
        .filter_map(|i| check(&chars, i).err())
        .collect()
}

/// Substitute every macro. `None` rejects the template.
pub fn apply(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '_' {
            let code = check(&chars, i).ok()?;
            out.push_str(phrase(code)?);
            i += 2;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_unique_codes() {
        assert_eq!(table().len(), MACROS.len());
    }

    #[test]
    fn midnight_oclock() {
        assert_eq!(apply("_0 _E").as_deref(), Some("midnight o'clock"));
    }

    #[test]
    fn every_code_substitutes_cleanly() {
        for (code, expected) in MACROS {
            let out = apply(&format!("_{code} x")).unwrap();
            assert_eq!(out, format!("{expected} x"));
            assert!(!out.contains('_'), "residual underscore for {code}");
        }
    }

    #[test]
    fn delimiters_are_accepted() {
        assert_eq!(apply("_T;_e|_0/_.~").as_deref(), Some("right now;noon|midnight/night~"));
        assert_eq!(apply("under the _&").as_deref(), Some("under the moon"));
    }

    #[test]
    fn bad_delimiter_rejects() {
        assert_eq!(apply("_0x"), None);
        assert_eq!(apply("snake_case"), None);
    }

    #[test]
    fn unknown_or_missing_code_rejects() {
        assert_eq!(apply("_! now"), None);
        assert_eq!(apply("dangling _"), None);
    }

    #[test]
    fn faults_are_reported_in_order() {
        assert_eq!(
            faults("_0x _! _"),
            vec![
                MacroFault::BadDelimiter('x'),
                MacroFault::UnknownCode('!'),
                MacroFault::MissingCode
            ]
        );
        assert!(faults("_0 and _e").is_empty());
    }
}
