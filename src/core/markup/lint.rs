//! Static checks for template records, without a context.

use std::fmt;

use super::computed::{self, ComputedFault};
use super::conditional;
use super::macros::{self, MacroFault};
use super::numeric;
use super::year;
use crate::schema::record::strip_fill;

/// Sigil misuse that would make a template fail closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintIssue {
    /// Gate with a bad predicate or no body.
    BadConditional,
    /// A `(` that does not open a year token.
    MalformedYear,
    Macro(MacroFault),
    /// A `#` with no digits after it.
    BareNumber,
    Computed(ComputedFault),
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadConditional => f.write_str("malformed conditional clause"),
            Self::MalformedYear => f.write_str("'(' does not open a year token"),
            Self::Macro(MacroFault::MissingCode) => f.write_str("'_' with no macro code"),
            Self::Macro(MacroFault::UnknownCode(c)) => write!(f, "unknown macro code '_{c}'"),
            Self::Macro(MacroFault::BadDelimiter(c)) => {
                write!(f, "macro followed by '{c}' instead of a delimiter")
            }
            Self::BareNumber => f.write_str("'#' with no digits"),
            Self::Computed(ComputedFault::MissingCode) => f.write_str("'<' with no code"),
            Self::Computed(ComputedFault::UnknownCode(c)) => {
                write!(f, "unknown computed code '<{c}'")
            }
        }
    }
}

/// Every issue found in one template record.
pub fn lint_template(template: &str) -> Vec<LintIssue> {
    let Some((_, body)) = conditional::parse_gate(template) else {
        return vec![LintIssue::BadConditional];
    };
    let body = strip_fill(body);
    let mut issues = Vec::new();
    if template.starts_with('!') && body.is_empty() {
        issues.push(LintIssue::BadConditional);
    }
    if year::scan(body).is_none() {
        issues.push(LintIssue::MalformedYear);
    }
    issues.extend(macros::faults(body).into_iter().map(LintIssue::Macro));
    if numeric::scan(body).is_none() {
        issues.push(LintIssue::BareNumber);
    }
    if let Err(fault) = computed::scan(body) {
        issues.push(LintIssue::Computed(fault));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_template_has_no_issues() {
        assert!(lint_template("!H>6 it is <h _E and #3 (a-1969) ~~~~ $mun 0042").is_empty());
    }

    #[test]
    fn reports_each_sigil() {
        assert_eq!(lint_template("!Q>1 body"), vec![LintIssue::BadConditional]);
        assert_eq!(lint_template("!H>1 ~~~"), vec![LintIssue::BadConditional]);
        assert_eq!(lint_template("(x-12)"), vec![LintIssue::MalformedYear]);
        assert_eq!(
            lint_template("_0x"),
            vec![LintIssue::Macro(MacroFault::BadDelimiter('x'))]
        );
        assert_eq!(lint_template("# sign"), vec![LintIssue::BareNumber]);
        assert_eq!(
            lint_template("<X"),
            vec![LintIssue::Computed(ComputedFault::UnknownCode('X'))]
        );
    }

    #[test]
    fn messages_name_the_code() {
        let issue = LintIssue::Computed(ComputedFault::UnknownCode('X'));
        assert_eq!(issue.to_string(), "unknown computed code '<X'");
    }
}
