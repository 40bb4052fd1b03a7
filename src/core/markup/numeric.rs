//! Pass 4: `#NNN` spelled out as a cardinal.

use crate::core::numerals::num_to_text;

/// Every `#` token in `text`, digits included. `None` when a `#` has no
/// digits after it.
pub fn scan(text: &str) -> Option<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut search = 0;
    while let Some(offset) = text[search..].find('#') {
        let start = search + offset;
        let digits = text[start + 1..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return None;
        }
        let end = start + 1 + digits;
        tokens.push(&text[start..end]);
        search = end;
    }
    Some(tokens)
}

/// Spell every number token. `None` rejects the template.
///
/// Tokens are replaced longest first so that `#12` never eats the front
/// of `#123`.
pub fn apply(text: &str) -> Option<String> {
    let mut tokens = scan(text)?;
    if tokens.is_empty() {
        return Some(text.to_string());
    }
    tokens.sort_by(|a, b| b.len().cmp(&a.len()));
    tokens.dedup();

    let mut out = text.to_string();
    for token in tokens {
        let value: u64 = token[1..].parse().ok()?;
        let words = num_to_text(value, false)?;
        out = out.replace(token, &words);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spells_each_number() {
        assert_eq!(
            apply("#12 and #123").as_deref(),
            Some("twelve and one hundred twenty three")
        );
        assert_eq!(apply("#5 minutes").as_deref(), Some("five minutes"));
    }

    #[test]
    fn shorter_prefix_does_not_clobber_longer() {
        assert_eq!(
            apply("#1 #10 #100 #1").as_deref(),
            Some("one ten one hundred one")
        );
    }

    #[test]
    fn idempotent() {
        let once = apply("#42 paces to #7").unwrap();
        assert_eq!(apply(&once).as_deref(), Some(once.as_str()));
    }

    #[test]
    fn rejects_bare_hash_and_large_values() {
        assert_eq!(apply("# nothing"), None);
        assert_eq!(apply("#1000000 too many"), None);
        assert_eq!(apply("#99999999999999999999999 overflow"), None);
    }

    #[test]
    fn zero_is_spelled() {
        assert_eq!(apply("#0").as_deref(), Some("zero"));
    }
}
