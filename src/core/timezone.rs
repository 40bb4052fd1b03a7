//! Timezone region records.
//!
//! A region record looks like
//! `-28467,-065783;america/argentina/catamarca ~~~~ -03:00`: a reference
//! point in thousandths of a degree, the zone path, fill, and the offset.

use log::debug;

use crate::core::store::{RecordSource, RecordStore};
use crate::schema::record::FILL;

pub trait TimezoneService {
    /// Raw record for a one-based region id, `None` when unavailable.
    fn region_record(&self, region: u32) -> Option<String>;
}

impl<T: RecordStore + ?Sized> TimezoneService for T {
    fn region_record(&self, region: u32) -> Option<String> {
        match self.read_line(RecordSource::Regions, region as usize) {
            Ok(line) => Some(line),
            Err(e) => {
                debug!("region {} unavailable: {}", region, e);
                None
            }
        }
    }
}

/// Display name of a zone: the text after the last `/` and before the fill.
pub fn region_display_name(record: &str) -> Option<String> {
    let body = match record.find(FILL) {
        Some(pos) => &record[..pos],
        None => record,
    };
    let slash = body.rfind('/')?;
    let name = body[slash + 1..].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryRecordStore;

    const COCOS: &str = "-12118,+096895;indian/the cocos islands ~~~~~~~ +06:30";
    const CATAMARCA: &str = "-28467,-065783;america/argentina/catamarca ~~~~ -03:00";

    #[test]
    fn display_name_uses_last_segment() {
        assert_eq!(region_display_name(COCOS).as_deref(), Some("the cocos islands"));
        assert_eq!(region_display_name(CATAMARCA).as_deref(), Some("catamarca"));
        assert_eq!(region_display_name("no zone here ~~~"), None);
    }

    #[test]
    fn stores_serve_region_records() {
        let store = MemoryRecordStore::new().with_source(RecordSource::Regions, [COCOS, CATAMARCA]);
        assert_eq!(store.region_record(2).as_deref(), Some(CATAMARCA));
        assert!(store.region_record(0).is_none());
        assert!(store.region_record(9).is_none());
    }
}
