//! The value handed to the presentation layer once per fetch cycle.

use serde::{Deserialize, Serialize};

/// Characters per display line when the caller has no better figure.
pub const DEFAULT_LINE_WIDTH: usize = 56;

/// Final output of one `select()` call.
///
/// Built fresh every cycle; an empty `text` means the router exhausted its
/// sources and the presentation layer should show its own fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResult {
    pub text: String,
    /// Reference into the attribution list, 0 when the record had none.
    pub attribution_id: u32,
    /// Three-character background image key.
    pub image_key: Option<String>,
}

impl MessageResult {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Break the text into display lines.
    ///
    /// `/` forces a break; otherwise words are packed greedily so that no
    /// line exceeds `width` characters unless a single word does.
    pub fn lines(&self, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for segment in self.text.split('/') {
            let mut current: Vec<&str> = Vec::new();
            let mut used = 0;
            for word in segment.split_whitespace() {
                let len = word.chars().count();
                if current.is_empty() {
                    current.push(word);
                    used = len;
                } else if used + 1 + len <= width {
                    current.push(word);
                    used += 1 + len;
                } else {
                    lines.push(current.join(" "));
                    current = vec![word];
                    used = len;
                }
            }
            if !current.is_empty() {
                lines.push(current.join(" "));
            }
        }
        lines
    }
}
