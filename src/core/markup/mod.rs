//! Template markup: five passes, each owning one sigil.
//!
//! | pass | sigil | module |
//! |---|---|---|
//! | 1 | `!` gate | [`conditional`] |
//! | 2 | `(` year distance | [`year`] |
//! | 3 | `_` macro | [`macros`] |
//! | 4 | `#` number | [`numeric`] |
//! | 5 | `<` computed | [`computed`] |
//!
//! Every pass either rewrites the whole text or rejects the template. A
//! rejection anywhere makes the final result empty.

pub mod computed;
pub mod conditional;
pub mod handlers;
pub mod lint;
pub mod macros;
pub mod numeric;
pub mod year;

use log::trace;

use crate::core::random::RandomService;
use crate::core::timezone::TimezoneService;
use crate::schema::context::Context;

/// Runs templates through the five markup passes.
pub struct MarkupEngine<'a, T: TimezoneService + ?Sized> {
    timezones: &'a T,
}

impl<'a, T: TimezoneService + ?Sized> MarkupEngine<'a, T> {
    pub fn new(timezones: &'a T) -> Self {
        Self { timezones }
    }

    /// Rewrite `template` for `ctx`. An empty string means the template is
    /// unusable here and now.
    pub fn process(&self, template: &str, ctx: &Context, rng: &mut dyn RandomService) -> String {
        self.run(template, ctx, rng).unwrap_or_default()
    }

    fn run(&self, template: &str, ctx: &Context, rng: &mut dyn RandomService) -> Option<String> {
        let text = conditional::apply(template, ctx)?;
        let text = year::apply(&text, ctx, rng)?;
        let text = macros::apply(&text)?;
        let text = numeric::apply(&text)?;
        let text = computed::apply(&text, ctx, rng, self.timezones)?;
        trace!("markup {:?} -> {:?}", template, text);
        Some(text)
    }
}
