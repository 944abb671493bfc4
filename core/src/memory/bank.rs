use crate::core::error::ConfigError;
use crate::memory::region::{RegionId, RegionStore};

/// One bank-switched window: which page of a larger region the window
/// currently shows.
#[derive(Debug, Clone)]
pub struct BankState {
    name: &'static str,
    region: RegionId,
    base: usize,
    page_size: usize,
    count: usize,
    current: usize,
}

impl BankState {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Offset into the backing region of the first byte of the window.
    pub fn offset(&self) -> usize {
        self.base + self.current * self.page_size
    }
}

/// Handle to a bank inside a [`BankController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BankId(usize);

/// Bank Switch Controller: owns every bank of one machine.
///
/// Selecting a bank is a pure remap: the next access through the banked
/// window resolves against the new page, nothing else is invalidated.
#[derive(Debug, Clone, Default)]
pub struct BankController {
    banks: Vec<BankState>,
}

impl BankController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a bank of `count` pages of `page_size` bytes starting at
    /// `base` in `region`. The pages must fit inside the region.
    pub fn add(
        &mut self,
        regions: &RegionStore,
        name: &'static str,
        region: RegionId,
        base: usize,
        page_size: usize,
        count: usize,
    ) -> Result<BankId, ConfigError> {
        if self.banks.iter().any(|b| b.name == name) {
            return Err(ConfigError::DuplicateName(name.to_string()));
        }
        let region_len = regions.get(region).len();
        let fits = page_size
            .checked_mul(count)
            .and_then(|span| span.checked_add(base))
            .is_some_and(|end| end <= region_len);
        if !fits || count == 0 || page_size == 0 {
            return Err(ConfigError::BankExceedsRegion {
                name: name.to_string(),
                base,
                page_size,
                count,
                region_len,
            });
        }
        self.banks.push(BankState {
            name,
            region,
            base,
            page_size,
            count,
            current: 0,
        });
        Ok(BankId(self.banks.len() - 1))
    }

    pub fn get(&self, id: BankId) -> &BankState {
        &self.banks[id.0]
    }

    pub fn find(&self, name: &str) -> Option<BankId> {
        self.banks.iter().position(|b| b.name == name).map(BankId)
    }

    /// Switch `id` to page `bank`. Out-of-range pages are rejected and the
    /// previous page stays mapped.
    pub fn select(&mut self, id: BankId, bank: usize) -> Result<(), ConfigError> {
        let state = &mut self.banks[id.0];
        if bank >= state.count {
            return Err(ConfigError::BankOutOfRange {
                name: state.name.to_string(),
                bank,
                count: state.count,
            });
        }
        if state.current != bank {
            log::debug!("bank '{}': page {} -> {}", state.name, state.current, bank);
        }
        state.current = bank;
        Ok(())
    }

    pub fn offset(&self, id: BankId) -> usize {
        self.banks[id.0].offset()
    }

    /// Every bank back to page 0.
    pub fn reset(&mut self) {
        for bank in &mut self.banks {
            bank.current = 0;
        }
    }
}
