use crate::core::error::ConfigError;
use crate::memory::region::{RegionId, RegionStore};

/// A byte range seen identically by two or more CPUs.
///
/// Every mapping of the window routes to the same region, so a write through
/// one CPU's map is visible to the next read through any other map. Each
/// mapping must span exactly [`len`](Self::len) bytes; see
/// [`AddressMapBuilder::shared`](crate::memory::map::AddressMapBuilder::shared).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedWindow {
    name: &'static str,
    region: RegionId,
    offset: usize,
    len: usize,
}

impl SharedWindow {
    /// Declare `len` bytes at `offset` in `region` as shared. The span must
    /// lie inside the region.
    pub fn new(
        regions: &RegionStore,
        name: &'static str,
        region: RegionId,
        offset: usize,
        len: usize,
    ) -> Result<Self, ConfigError> {
        let backing = regions.get(region);
        if len == 0 || offset + len > backing.len() {
            return Err(ConfigError::RegionSizeMismatch {
                region: backing.name().to_string(),
                expected: offset + len,
                actual: backing.len(),
            });
        }
        Ok(Self {
            name,
            region,
            offset,
            len,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
