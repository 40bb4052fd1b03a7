//! Generation runtime: collaborators, markup engine, and selection router.

pub mod algorithmic;
pub mod almanac;
pub mod config;
pub mod geo;
pub mod imagery;
pub mod markup;
pub mod numerals;
pub mod random;
pub mod router;
pub mod store;
pub mod timezone;
