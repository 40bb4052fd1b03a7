//! The selection router: Context → MessageResult orchestration.
//!
//! Tries the high-priority events first, then one weighted tier, then a
//! bounded fallback ladder over the resident pools. Every tier-2 and
//! ladder candidate runs through the markup engine.

use chrono::{Datelike, Timelike};
use log::debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::algorithmic::AlgorithmicGenerator;
use crate::core::almanac::{Almanac, BasicAlmanac};
use crate::core::config::{ConfigError, RouterConfig};
use crate::core::imagery::fill_image;
use crate::core::markup::MarkupEngine;
use crate::core::numerals::choose_between;
use crate::core::random::{RandomService, SeededRandom};
use crate::core::store::{FileRecordStore, RecordSource, RecordStore};
use crate::schema::context::{is_leap_year, Context};
use crate::schema::message::MessageResult;
use crate::schema::record::{strip_fill, Clock, PriorityRecord, RecordLine, WindowPoint, FILL};

/// Image key of a time-of-day pick that wins the hourglass roll.
const HOURGLASS_IMAGE: &str = "hrg";
/// Default image for playa-pool records without one.
const PLAYA_IMAGE: &str = "brc";
/// Records carrying this key are never shown on the playa.
const NOT_ON_PLAYA_IMAGE: &str = "nop";
/// First column of the macro indices in a year-day record.
const MACRO_INDEX_COLUMN: usize = 58;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no record store configured")]
    MissingStore,
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Weighted tier picked by the percentile roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Algorithmic,
    YearDay,
    TimeOfDay,
    Playa,
}

/// A raw template plus the markers read from its record.
#[derive(Debug, Clone, Default)]
struct Candidate {
    template: String,
    attribution_id: u32,
    image_key: Option<String>,
}

impl Candidate {
    fn bare(template: String) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }
}

/// Picks one message per call. Built via `MessageRouter::builder()`.
pub struct MessageRouter {
    store: Box<dyn RecordStore>,
    random: Box<dyn RandomService>,
    almanac: Box<dyn Almanac>,
    config: RouterConfig,
}

/// Builder for constructing a `MessageRouter`.
pub struct MessageRouterBuilder {
    data_root: Option<PathBuf>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    /// Directly provided store (for testing without files).
    store: Option<Box<dyn RecordStore>>,
    random: Option<Box<dyn RandomService>>,
    almanac: Option<Box<dyn Almanac>>,
    config: Option<RouterConfig>,
}

impl MessageRouter {
    pub fn builder() -> MessageRouterBuilder {
        MessageRouterBuilder {
            data_root: None,
            config_path: None,
            seed: None,
            store: None,
            random: None,
            almanac: None,
            config: None,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Pick the message to show for `ctx`. An empty text means every
    /// source came up dry.
    pub fn select(&mut self, ctx: &Context, on_playa: bool) -> MessageResult {
        if let Some(result) = self.high_priority(ctx) {
            debug!("high-priority message: {:?}", result.text);
            return result;
        }

        let roll = self.random.percentile();
        if let Some(tier) = self.tier_for(roll, on_playa) {
            debug!("tier roll {} -> {:?}", roll, tier);
            if let Some(candidate) = self.tier_candidate(tier, ctx) {
                if let Some(result) = self.accept(candidate, ctx) {
                    return result;
                }
            }
        } else {
            debug!("tier roll {} -> none", roll);
        }

        self.ladder(ctx).unwrap_or_default()
    }

    /// Run a template through the markup passes with this router's
    /// collaborators.
    pub fn render(&mut self, template: &str, ctx: &Context) -> String {
        let engine = MarkupEngine::new(self.store.as_ref());
        condense(&engine.process(template, ctx, self.random.as_mut()))
    }

    pub fn tier_for(&self, roll: u32, on_playa: bool) -> Option<Tier> {
        let bands = self.config.bands(on_playa);
        if roll <= bands.algorithmic {
            Some(Tier::Algorithmic)
        } else if roll <= bands.year_day {
            Some(Tier::YearDay)
        } else if roll <= bands.time_of_day {
            Some(Tier::TimeOfDay)
        } else if roll <= bands.playa {
            Some(Tier::Playa)
        } else {
            None
        }
    }

    fn high_priority(&mut self, ctx: &Context) -> Option<MessageResult> {
        let year = ctx.local.year();
        if !self.config.high_priority_years().contains(&year) {
            return None;
        }
        let source = RecordSource::HighPriority { year };
        let count = match self.store.line_count(source) {
            Ok(count) => count,
            Err(e) => {
                debug!("skipping {}: {}", source, e);
                return None;
            }
        };

        for index in 1..=count {
            let line = match self.store.read_line(source, index) {
                Ok(line) => line,
                Err(e) => {
                    debug!("skipping {} line {}: {}", source, index, e);
                    continue;
                }
            };
            let record = match PriorityRecord::parse(&line) {
                Ok(record) => record,
                Err(e) => {
                    debug!("malformed {} line {}: {}", source, index, e);
                    continue;
                }
            };
            let clock = match record.clock {
                Clock::Utc => ctx.utc,
                Clock::Local => ctx.local,
            };
            let now = WindowPoint {
                month: clock.month(),
                day: clock.day(),
                hour: clock.hour(),
                minute: clock.minute(),
            };
            if !record.window_contains(&now) {
                continue;
            }
            let roll = self.random.percentile();
            if !record.geobox_contains(ctx.latitude, ctx.longitude)
                || roll > self.config.high_priority_chance
            {
                continue;
            }

            let parsed = RecordLine::parse(&record.message);
            if parsed.body.is_empty() {
                continue;
            }
            let mut image_key = parsed.image_key;
            fill_image(&mut image_key, &parsed.body);
            return Some(MessageResult {
                text: condense(&parsed.body),
                attribution_id: parsed.attribution_id,
                image_key,
            });
        }
        None
    }

    fn tier_candidate(&mut self, tier: Tier, ctx: &Context) -> Option<Candidate> {
        match tier {
            Tier::Algorithmic => self.algorithmic(ctx),
            Tier::YearDay => self.year_day(ctx).map(Candidate::bare),
            Tier::TimeOfDay => self.time_of_day(ctx),
            Tier::Playa => self.resident(RecordSource::Playa, ctx),
        }
    }

    fn algorithmic(&mut self, ctx: &Context) -> Option<Candidate> {
        let year = ctx.local.year();
        if !self.config.year_files().contains(&year) {
            return None;
        }
        let calendar = self
            .read(RecordSource::YearDay { year }, ctx.day_of_year() as usize)
            .unwrap_or_default();
        let generator = AlgorithmicGenerator::new(self.almanac.as_ref());
        let generated = generator.generate(ctx, &calendar, self.random.as_mut())?;
        Some(Candidate {
            template: generated.text,
            attribution_id: 0,
            image_key: generated.image_key.map(str::to_string),
        })
    }

    /// One alternative of today's macro lines.
    fn year_day(&mut self, ctx: &Context) -> Option<String> {
        let year = ctx.local.year();
        let mut day = ctx.day_of_year() as usize;

        let indices: Vec<usize> = if self.config.year_files().contains(&year) {
            let line = self.read(RecordSource::YearDay { year }, day)?;
            let field = line.get(MACRO_INDEX_COLUMN..).unwrap_or("");
            let field = field.split(FILL).next().unwrap_or("").trim();
            let parsed: Result<Vec<usize>, _> =
                field.split(';').map(|n| n.trim().parse::<usize>()).collect();
            match parsed {
                Ok(indices) => indices,
                Err(e) => {
                    debug!("bad macro indices {:?} for day {}: {}", field, day, e);
                    return None;
                }
            }
        } else {
            // The macro source is laid out for a leap year.
            if !is_leap_year(year) && ctx.local.month() >= 3 {
                day += 1;
            }
            vec![day]
        };

        let mut options = Vec::with_capacity(indices.len());
        for index in indices {
            let line = self.read(RecordSource::Macro, index)?;
            options.push(strip_fill(&line).to_string());
        }
        choose_between(&options.join(";"), ';', self.random.as_mut())
    }

    fn time_of_day(&mut self, ctx: &Context) -> Option<Candidate> {
        let slot = (ctx.local.hour() * 12 + ctx.local.minute() / 5 + 1) as usize;
        if slot >= 290 {
            return None;
        }
        let line = self.read(RecordSource::TimeOfDay, slot)?;
        let pick = choose_between(strip_fill(&line), ';', self.random.as_mut())?;
        let mut candidate = Candidate::bare(pick);
        if self.random.percentile() < self.config.time_of_day_image_chance {
            candidate.image_key = Some(HOURGLASS_IMAGE.to_string());
        }
        Some(candidate)
    }

    /// A random record of a resident pool with its markers split off.
    fn resident(&mut self, source: RecordSource, ctx: &Context) -> Option<Candidate> {
        let line = match self.store.random_line(source, self.random.as_mut()) {
            Ok(line) => line,
            Err(e) => {
                debug!("skipping {}: {}", source, e);
                return None;
            }
        };
        let parsed = RecordLine::parse(&line);
        if ctx.region == self.config.playa_region
            && parsed.image_key.as_deref() == Some(NOT_ON_PLAYA_IMAGE)
        {
            debug!("{} record marked off-playa: {:?}", source, parsed.body);
            return None;
        }
        let mut image_key = parsed.image_key;
        if source == RecordSource::Playa && image_key.is_none() {
            image_key = Some(PLAYA_IMAGE.to_string());
        }
        Some(Candidate {
            template: parsed.body,
            attribution_id: parsed.attribution_id,
            image_key,
        })
    }

    fn ladder(&mut self, ctx: &Context) -> Option<MessageResult> {
        for attempt in 1..=self.config.ladder_limit {
            let source = if attempt <= self.config.conditional_draws {
                RecordSource::Conditional
            } else {
                RecordSource::AnyTime
            };
            debug!("ladder attempt {} from {}", attempt, source);
            let Some(candidate) = self.resident(source, ctx) else {
                continue;
            };
            if let Some(result) = self.accept(candidate, ctx) {
                return Some(result);
            }
        }
        debug!("ladder exhausted after {} attempts", self.config.ladder_limit);
        None
    }

    /// Rewrite a candidate; `None` when the markup rejects it.
    fn accept(&mut self, candidate: Candidate, ctx: &Context) -> Option<MessageResult> {
        let Candidate {
            template,
            attribution_id,
            mut image_key,
        } = candidate;
        if template.is_empty() {
            return None;
        }
        fill_image(&mut image_key, &template);
        let text = self.render(&template, ctx);
        if text.is_empty() {
            debug!("markup rejected {:?}", template);
            return None;
        }
        Some(MessageResult {
            text,
            attribution_id,
            image_key,
        })
    }

    fn read(&self, source: RecordSource, index: usize) -> Option<String> {
        self.store
            .read_line(source, index)
            .map_err(|e| debug!("skipping {} line {}: {}", source, index, e))
            .ok()
    }
}

impl MessageRouterBuilder {
    /// Serve records from fixed-width files under `path`.
    pub fn data_root(mut self, path: impl AsRef<Path>) -> Self {
        self.data_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load the router configuration from a RON file at build time.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Seed the default random service.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Provide the store directly (for testing without files).
    pub fn store(mut self, store: Box<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn random(mut self, random: Box<dyn RandomService>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn almanac(mut self, almanac: Box<dyn Almanac>) -> Self {
        self.almanac = Some(almanac);
        self
    }

    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<MessageRouter, RouterError> {
        let store: Box<dyn RecordStore> = match (self.store, self.data_root) {
            (Some(store), _) => store,
            (None, Some(root)) => Box::new(FileRecordStore::new(root)),
            (None, None) => return Err(RouterError::MissingStore),
        };

        // A config file overrides a directly provided config.
        let config = match (self.config_path, self.config) {
            (Some(path), _) => RouterConfig::load_from_ron(&path)?,
            (None, Some(config)) => {
                config.validate()?;
                config
            }
            (None, None) => RouterConfig::default(),
        };

        let random: Box<dyn RandomService> = match (self.random, self.seed) {
            (Some(random), _) => random,
            (None, Some(seed)) => Box::new(SeededRandom::new(seed)),
            (None, None) => Box::new(SeededRandom::from_entropy()),
        };

        Ok(MessageRouter {
            store,
            random,
            almanac: self.almanac.unwrap_or_else(|| Box::new(BasicAlmanac)),
            config,
        })
    }
}

/// Collapse space runs, drop spaces around `/` and trim the ends.
pub fn condense(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, segment) in text.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        let words: Vec<&str> = segment.split(' ').filter(|w| !w.is_empty()).collect();
        out.push_str(&words.join(" "));
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedRandom;
    use crate::core::store::MemoryRecordStore;

    fn router(config: RouterConfig) -> MessageRouter {
        MessageRouter::builder()
            .store(Box::new(MemoryRecordStore::new()))
            .random(Box::new(ScriptedRandom::default()))
            .config(config)
            .build()
            .unwrap()
    }

    #[test]
    fn condense_spacing() {
        assert_eq!(condense("  under   the man  "), "under the man");
        assert_eq!(condense("good night /  sleep well"), "good night/sleep well");
        assert_eq!(condense("a / / b"), "a//b");
        assert_eq!(condense(""), "");
    }

    #[test]
    fn default_bands() {
        let r = router(RouterConfig::default());
        assert_eq!(r.tier_for(1, true), Some(Tier::Algorithmic));
        assert_eq!(r.tier_for(8, false), Some(Tier::Algorithmic));
        assert_eq!(r.tier_for(9, true), Some(Tier::YearDay));
        assert_eq!(r.tier_for(15, false), Some(Tier::YearDay));
        assert_eq!(r.tier_for(30, true), Some(Tier::TimeOfDay));
        assert_eq!(r.tier_for(31, true), Some(Tier::Playa));
        assert_eq!(r.tier_for(50, true), Some(Tier::Playa));
        assert_eq!(r.tier_for(51, true), None);
        assert_eq!(r.tier_for(35, false), Some(Tier::TimeOfDay));
        assert_eq!(r.tier_for(36, false), None);
    }

    #[test]
    fn build_requires_a_store() {
        assert!(matches!(
            MessageRouter::builder().seed(1).build(),
            Err(RouterError::MissingStore)
        ));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = RouterConfig {
            conditional_draws: 40,
            ..RouterConfig::default()
        };
        let result = MessageRouter::builder()
            .store(Box::new(MemoryRecordStore::new()))
            .config(config)
            .build();
        assert!(matches!(result, Err(RouterError::Config(_))));
    }

    #[test]
    fn build_loads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.ron");
        std::fs::write(&path, "(ladder_limit: 10)").unwrap();
        let r = MessageRouter::builder()
            .data_root(dir.path())
            .config_path(&path)
            .seed(7)
            .build()
            .unwrap();
        assert_eq!(r.config().ladder_limit, 10);
        assert_eq!(r.config().conditional_draws, 5);
    }
}
