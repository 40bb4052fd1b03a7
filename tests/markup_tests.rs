//! Markup integration tests: templates through all five passes.

use chrono::NaiveDate;
use subjective_time::core::markup::macros::MACROS;
use subjective_time::core::markup::{numeric, MarkupEngine};
use subjective_time::core::random::{ScriptedRandom, SeededRandom};
use subjective_time::core::store::{MemoryRecordStore, RecordSource};
use subjective_time::schema::context::Context;

fn utc_context(year: i32, month: u32, day: u32, hour: u32) -> Context {
    let utc = NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap();
    Context::from_utc(utc, 0, 51.477, -0.001, 1)
}

fn render(template: &str, ctx: &Context, draws: &[u32]) -> String {
    let store = MemoryRecordStore::new();
    let engine = MarkupEngine::new(&store);
    let mut rng = ScriptedRandom::new(draws.iter().copied());
    engine.process(template, ctx, &mut rng)
}

#[test]
fn failed_gate_empties_the_template() {
    let ctx = utc_context(2025, 6, 1, 10);
    assert_eq!(render("!H>11 too early", &ctx, &[]), "");
    assert_eq!(render("!M=12 only in december", &ctx, &[]), "");
}

#[test]
fn afternoon_gate_follows_the_utc_hour() {
    let template = "!H>6,H<18 good afternoon~~~~";
    assert_eq!(render(template, &utc_context(2025, 6, 1, 10), &[]), "good afternoon");
    assert_eq!(render(template, &utc_context(2025, 6, 1, 20), &[]), "");
}

#[test]
fn numbers_are_spelled_out() {
    let ctx = utc_context(2025, 6, 1, 10);
    assert_eq!(
        render("#12 and #123", &ctx, &[]),
        "twelve and one hundred twenty three"
    );
    assert_eq!(render("#5 minutes", &ctx, &[]), "five minutes");
}

#[test]
fn numeric_pass_is_idempotent() {
    for text in ["#12 and #123", "#5 minutes", "no numbers here", "#999999 stars"] {
        let once = numeric::apply(text).unwrap();
        assert_eq!(numeric::apply(&once).unwrap(), once);
    }
}

#[test]
fn numbers_past_the_spelling_limit_reject() {
    let ctx = utc_context(2025, 6, 1, 10);
    assert_eq!(render("#1000000 grains of sand", &ctx, &[]), "");
}

#[test]
fn year_distance_needs_a_positive_span() {
    assert_eq!(render("(a-2025)", &utc_context(2025, 6, 1, 10), &[]), "");
    // a single year is too close to call
    assert_eq!(render("(a-2025)", &utc_context(2026, 6, 1, 10), &[]), "");
    assert_eq!(
        render("(a-2025)", &utc_context(2027, 6, 1, 10), &[1]),
        "two years after"
    );
    assert!(!render("(a-2025)", &utc_context(2040, 6, 1, 10), &[]).is_empty());
}

#[test]
fn every_macro_code_substitutes() {
    let ctx = utc_context(2025, 6, 1, 10);
    for (code, phrase) in MACROS {
        let out = render(&format!("_{code} x"), &ctx, &[]);
        assert_eq!(out, format!("{phrase} x"), "macro _{code}");
        assert!(!out.contains('_'), "residual underscore for _{code}");
    }
}

#[test]
fn midnight_oclock() {
    assert_eq!(
        render("_0 o'clock", &utc_context(2025, 6, 1, 10), &[]),
        "midnight o'clock"
    );
}

#[test]
fn bearing_to_a_nearby_target_rejects() {
    let utc = NaiveDate::from_ymd_opt(2025, 8, 27)
        .unwrap()
        .and_hms_opt(21, 0, 0)
        .unwrap();
    let ctx = Context::from_utc(utc, -700, 40.786, -119.206, 452);
    assert_eq!(render("<G=+40786,-119206 the man", &ctx, &[]), "");
    assert_eq!(render("<G=+40900,-119206 the man", &ctx, &[]), "");
}

#[test]
fn bearing_to_a_distant_target_renders() {
    let utc = NaiveDate::from_ymd_opt(2025, 8, 27)
        .unwrap()
        .and_hms_opt(21, 0, 0)
        .unwrap();
    let ctx = Context::from_utc(utc, -700, 40.786, -119.206, 452);
    // direction only
    let out = render("<G=+47606,-122332 seattle", &ctx, &[1]);
    assert!(out.ends_with(" of seattle"), "{out}");
    assert!(!out.contains('<'));
}

#[test]
fn weighted_weekday_bands() {
    let ctx = utc_context(2025, 6, 1, 10);
    let mut counts = std::collections::BTreeMap::new();
    for r in 1..=700 {
        let day = render("<W", &ctx, &[r]);
        *counts.entry(day).or_insert(0) += 1;
    }
    assert_eq!(counts["sunday"], 99);
    assert_eq!(counts["monday"], 100);
    assert_eq!(counts["tuesday"], 100);
    assert_eq!(counts["wednesday"], 100);
    assert_eq!(counts["thursday"], 100);
    assert_eq!(counts["friday"], 100);
    assert_eq!(counts["saturday"], 101);
    assert_eq!(counts.len(), 7);
}

#[test]
fn weekday_bands_hold_under_the_seeded_generator() {
    let ctx = utc_context(2025, 6, 1, 10);
    let store = MemoryRecordStore::new();
    let engine = MarkupEngine::new(&store);
    let mut rng = SeededRandom::new(2025);
    let mut counts = std::collections::BTreeMap::new();
    let rolls = 70_000;
    for _ in 0..rolls {
        let day = engine.process("<W", &ctx, &mut rng);
        *counts.entry(day).or_insert(0u32) += 1;
    }
    assert_eq!(counts.len(), 7);
    assert_eq!(counts.values().sum::<u32>(), rolls);
    // expected share per 700: sunday 99, saturday 101, the rest 100
    for (day, per_700) in [
        ("sunday", 99),
        ("monday", 100),
        ("tuesday", 100),
        ("wednesday", 100),
        ("thursday", 100),
        ("friday", 100),
        ("saturday", 101),
    ] {
        let expected = rolls / 700 * per_700;
        let got = counts[day];
        assert!(got.abs_diff(expected) < 500, "{day}: {got} vs {expected}");
    }
}

#[test]
fn hour_suffixes_other_than_a_lone_quote_do_not_round() {
    let utc = NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(10, 45, 0)
        .unwrap();
    let ctx = Context::from_utc(utc, 0, 51.477, -0.001, 1);
    assert_eq!(render("it is nearly <i'", &ctx, &[]), "it is nearly eleven");
    assert_eq!(render("it is nearly <i'.", &ctx, &[]), "it is nearly ten");
    assert_eq!(render("it is <i, more or less", &ctx, &[]), "it is ten more or less");
    assert_eq!(render("it is <H, utc", &ctx, &[]), "it is ten utc");
    assert_eq!(render("it is <p. now", &ctx, &[]), "it is a.m. now");
}

#[test]
fn zone_name_comes_from_the_region_source() {
    let store = MemoryRecordStore::new().with_source(
        RecordSource::Regions,
        ["-28467,-065783;america/argentina/catamarca ~~~~ -03:00"],
    );
    let engine = MarkupEngine::new(&store);
    let utc = NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(15, 0, 0)
        .unwrap();
    let ctx = Context::from_utc(utc, -300, -28.467, -65.783, 1);
    let mut rng = ScriptedRandom::default();
    assert_eq!(engine.process("good day <Z", &ctx, &mut rng), "good day catamarca");
}

#[test]
fn stray_sigils_never_leak() {
    let ctx = utc_context(2025, 6, 1, 10);
    let mut rng = SeededRandom::new(7);
    let store = MemoryRecordStore::new();
    let engine = MarkupEngine::new(&store);
    for template in ["(z-12) x", "_ x", "_Ax", "# x", "<", "<Q x", "!Q>1 x"] {
        assert_eq!(engine.process(template, &ctx, &mut rng), "", "{template}");
    }
}

#[test]
fn seeded_runs_are_repeatable() {
    let ctx = utc_context(2025, 6, 1, 10);
    let store = MemoryRecordStore::new();
    let engine = MarkupEngine::new(&store);
    let template = "<B in <N on a <W and #3 _P (a-1969)";
    let a = engine.process(template, &ctx, &mut SeededRandom::new(99));
    let b = engine.process(template, &ctx, &mut SeededRandom::new(99));
    assert_eq!(a, b);
    assert!(!a.is_empty());
}
