//! Fixed-width record sources and the stores that serve them.
//!
//! Every source is a text file of equal-length lines terminated by a
//! two-byte line break, addressed by one-based line number.

use log::debug;
use rustc_hash::FxHashMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::random::RandomService;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record source not available: {0}")]
    UnknownSource(RecordSource),
    #[error("line {1} out of range for {0}")]
    OutOfRange(RecordSource, usize),
}

/// Named record sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSource {
    /// Year-scoped high-priority events, `h_YYYY`.
    HighPriority { year: i32 },
    /// Year-scoped day records, `r_YYYY`: calendar columns plus macro indices.
    YearDay { year: i32 },
    /// Day-of-year templates, laid out for a leap year.
    Macro,
    /// Templates keyed by five-minute slot of the day.
    TimeOfDay,
    /// Resident pool valid only on the playa.
    Playa,
    /// Resident pool of templates that mostly carry a conditional clause.
    Conditional,
    /// Resident pool of templates valid at any time.
    AnyTime,
    /// Timezone region records.
    Regions,
}

impl RecordSource {
    /// Line width in bytes, including the two-byte terminator.
    pub fn width(&self) -> usize {
        match self {
            Self::Regions => 56,
            Self::HighPriority { .. } => 103,
            Self::YearDay { .. } => 112,
            Self::Macro | Self::TimeOfDay | Self::Playa | Self::Conditional | Self::AnyTime => 136,
        }
    }

    /// Location relative to the data root.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Self::HighPriority { year } => PathBuf::from(format!("h_year/h_{year}.txt")),
            Self::YearDay { year } => PathBuf::from(format!("r_year/r_{year}.txt")),
            Self::Macro => PathBuf::from("data/r_macr.txt"),
            Self::TimeOfDay => PathBuf::from("data/r_time.txt"),
            Self::Playa => PathBuf::from("data/r_brc.txt"),
            Self::Conditional => PathBuf::from("data/r_cond.txt"),
            Self::AnyTime => PathBuf::from("data/r_anys.txt"),
            Self::Regions => PathBuf::from("data/all_rgn.txt"),
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HighPriority { year } => write!(f, "h_{year}"),
            Self::YearDay { year } => write!(f, "r_{year}"),
            Self::Macro => f.write_str("r_macr"),
            Self::TimeOfDay => f.write_str("r_time"),
            Self::Playa => f.write_str("r_brc"),
            Self::Conditional => f.write_str("r_cond"),
            Self::AnyTime => f.write_str("r_anys"),
            Self::Regions => f.write_str("all_rgn"),
        }
    }
}

/// Line-addressed access to record sources.
pub trait RecordStore {
    /// Read line `index` (one-based) of `source`, without its terminator.
    fn read_line(&self, source: RecordSource, index: usize) -> Result<String, RecordError>;

    fn line_count(&self, source: RecordSource) -> Result<usize, RecordError>;

    /// Read a uniformly chosen line using a two-byte draw.
    fn random_line(
        &self,
        source: RecordSource,
        rng: &mut dyn RandomService,
    ) -> Result<String, RecordError> {
        let count = self.line_count(source)?;
        if count == 0 {
            return Err(RecordError::OutOfRange(source, 1));
        }
        let hi = u32::try_from(count - 1).unwrap_or(u32::MAX);
        let pick = rng.uniform_int(2, 0, hi) as usize;
        self.read_line(source, pick + 1)
    }
}

/// Serves sources from fixed-width files under a data root.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    root: PathBuf,
}

impl FileRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, source: RecordSource) -> PathBuf {
        self.root.join(source.relative_path())
    }
}

impl RecordStore for FileRecordStore {
    fn read_line(&self, source: RecordSource, index: usize) -> Result<String, RecordError> {
        let count = self.line_count(source)?;
        if index == 0 || index > count {
            return Err(RecordError::OutOfRange(source, index));
        }
        let width = source.width();
        let mut file = File::open(self.path_of(source))?;
        file.seek(SeekFrom::Start(((index - 1) * width) as u64))?;
        let mut buf = Vec::with_capacity(width - 2);
        file.take((width - 2) as u64).read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn line_count(&self, source: RecordSource) -> Result<usize, RecordError> {
        let path = self.path_of(source);
        let len = std::fs::metadata(&path)?.len() as usize;
        let width = source.width();
        // The final line may be missing its terminator.
        let count = (len + width - 1) / width;
        debug!("{} holds {} records", path.display(), count);
        Ok(count)
    }
}

/// Serves sources from in-memory line lists. Lines longer than the source
/// width are cut the way a fixed-width read would cut them.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    sources: FxHashMap<RecordSource, Vec<String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source<I, S>(mut self, source: RecordSource, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(source, lines);
        self
    }

    pub fn insert<I, S>(&mut self, source: RecordSource, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources
            .insert(source, lines.into_iter().map(Into::into).collect());
    }
}

impl RecordStore for MemoryRecordStore {
    fn read_line(&self, source: RecordSource, index: usize) -> Result<String, RecordError> {
        let lines = self
            .sources
            .get(&source)
            .ok_or(RecordError::UnknownSource(source))?;
        let line = index
            .checked_sub(1)
            .and_then(|i| lines.get(i))
            .ok_or(RecordError::OutOfRange(source, index))?;
        Ok(line.chars().take(source.width() - 2).collect())
    }

    fn line_count(&self, source: RecordSource) -> Result<usize, RecordError> {
        self.sources
            .get(&source)
            .map(Vec::len)
            .ok_or(RecordError::UnknownSource(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedRandom;
    use std::io::Write;

    fn padded(text: &str, width: usize) -> String {
        let mut line = format!("{text} ");
        while line.len() < width - 2 {
            line.push('~');
        }
        line.push_str("\r\n");
        line
    }

    #[test]
    fn widths_match_layouts() {
        assert_eq!(RecordSource::Regions.width(), 56);
        assert_eq!(RecordSource::HighPriority { year: 2025 }.width(), 103);
        assert_eq!(RecordSource::YearDay { year: 2025 }.width(), 112);
        assert_eq!(RecordSource::AnyTime.width(), 136);
    }

    #[test]
    fn paths_and_names() {
        let src = RecordSource::HighPriority { year: 2031 };
        assert_eq!(src.relative_path(), PathBuf::from("h_year/h_2031.txt"));
        assert_eq!(src.to_string(), "h_2031");
        assert_eq!(RecordSource::Playa.to_string(), "r_brc");
    }

    #[test]
    fn memory_store_is_one_based() {
        let store = MemoryRecordStore::new().with_source(RecordSource::AnyTime, ["first", "second"]);
        assert_eq!(store.read_line(RecordSource::AnyTime, 1).unwrap(), "first");
        assert_eq!(store.read_line(RecordSource::AnyTime, 2).unwrap(), "second");
        assert!(matches!(
            store.read_line(RecordSource::AnyTime, 0),
            Err(RecordError::OutOfRange(_, 0))
        ));
        assert!(matches!(
            store.read_line(RecordSource::AnyTime, 3),
            Err(RecordError::OutOfRange(_, 3))
        ));
        assert!(matches!(
            store.line_count(RecordSource::Macro),
            Err(RecordError::UnknownSource(RecordSource::Macro))
        ));
    }

    #[test]
    fn memory_store_cuts_to_width() {
        let long = "x".repeat(80);
        let store = MemoryRecordStore::new().with_source(RecordSource::Regions, [long]);
        assert_eq!(store.read_line(RecordSource::Regions, 1).unwrap().len(), 54);
    }

    #[test]
    fn random_line_uses_draw() {
        let store =
            MemoryRecordStore::new().with_source(RecordSource::Playa, ["a", "b", "c"]);
        let mut rng = ScriptedRandom::new([2]);
        assert_eq!(store.random_line(RecordSource::Playa, &mut rng).unwrap(), "c");
    }

    #[test]
    fn file_store_reads_fixed_width_lines() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        let mut file = File::create(data.join("r_anys.txt")).unwrap();
        for text in ["leave no trace", "radical inclusion $p04 0012", "gifting"] {
            file.write_all(padded(text, 136).as_bytes()).unwrap();
        }
        drop(file);

        let store = FileRecordStore::new(dir.path());
        assert_eq!(store.line_count(RecordSource::AnyTime).unwrap(), 3);
        let line = store.read_line(RecordSource::AnyTime, 2).unwrap();
        assert_eq!(line.len(), 134);
        assert!(line.starts_with("radical inclusion $p04 0012 ~~"));
        assert!(matches!(
            store.read_line(RecordSource::AnyTime, 4),
            Err(RecordError::OutOfRange(_, 4))
        ));
    }

    #[test]
    fn file_store_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());
        assert!(matches!(
            store.line_count(RecordSource::Macro),
            Err(RecordError::Io(_))
        ));
    }
}
