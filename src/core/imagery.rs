//! Background image rules for candidates that carry no `$xxx` key.

/// Keyword rules in priority order. The first rule with any matching
/// needle supplies the key.
const RULES: [(&[&str], &str); 4] = [
    (&["gahanbar"], "ind"),
    (
        &["are in conjunction", "aphelion", "perihelion", "retrograde"],
        "zod",
    ),
    (&["lunar eclipse", "_&"], "mun"),
    (&["<G=", "<O="], "map"),
];

/// Image key implied by the text of a raw template, if any.
///
/// Matching runs against the template before markup so that markers such
/// as `_&` and `<G=` are still visible.
pub fn derive_image(text: &str) -> Option<&'static str> {
    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| text.contains(n)))
        .map(|(_, key)| *key)
}

/// Fill `slot` from the rules when it is still empty.
pub fn fill_image(slot: &mut Option<String>, raw_template: &str) {
    if slot.is_none() {
        *slot = derive_image(raw_template).map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_map_to_keys() {
        assert_eq!(derive_image("the maidyozarem gahanbar begins"), Some("ind"));
        assert_eq!(derive_image("mercury is retrograde"), Some("zod"));
        assert_eq!(derive_image("a total lunar eclipse"), Some("mun"));
        assert_eq!(derive_image("under the _&"), Some("mun"));
        assert_eq!(derive_image("<G=+47434,-122668 seattle"), Some("map"));
        assert_eq!(derive_image("<O=10-90 of here"), Some("map"));
        assert_eq!(derive_image("nothing to see"), None);
    }

    #[test]
    fn earlier_rules_win() {
        assert_eq!(derive_image("gahanbar under the _&"), Some("ind"));
        assert_eq!(derive_image("perihelion during a lunar eclipse"), Some("zod"));
    }

    #[test]
    fn existing_key_is_kept() {
        let mut slot = Some("brc".to_string());
        fill_image(&mut slot, "under the _&");
        assert_eq!(slot.as_deref(), Some("brc"));

        let mut slot = None;
        fill_image(&mut slot, "under the _&");
        assert_eq!(slot.as_deref(), Some("mun"));
    }
}
