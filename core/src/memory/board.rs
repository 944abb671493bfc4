//! The machine state every handler operates on.

use crate::core::lines::InterruptCoordinator;
use crate::memory::bank::{BankController, BankId};
use crate::memory::region::{MemoryRegion, RegionId, RegionStore};

/// Value of an input port nobody has driven (switches open, active low).
pub const INPUT_IDLE: u8 = 0xFF;

/// Input/DIP-switch bytes supplied by the frontend.
#[derive(Debug, Clone)]
pub struct InputPorts {
    ports: Vec<u8>,
}

impl InputPorts {
    pub fn new(count: usize) -> Self {
        Self {
            ports: vec![INPUT_IDLE; count],
        }
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Ports past the end read as idle.
    pub fn read_input_port(&self, port: usize) -> u8 {
        self.ports.get(port).copied().unwrap_or(INPUT_IDLE)
    }

    pub fn set(&mut self, port: usize, value: u8) {
        match self.ports.get_mut(port) {
            Some(slot) => *slot = value,
            None => log::warn!("input port {port} does not exist ({} ports)", self.ports.len()),
        }
    }
}

/// A region span exposed read-only to the renderer (video RAM, sprite RAM,
/// scroll registers, ...). Fixed at configuration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub name: &'static str,
    pub region: RegionId,
    pub offset: usize,
    pub len: usize,
}

/// Everything the handlers of one machine may touch.
///
/// Fields are public so a handler can borrow disjoint parts at once, e.g.
/// reading a region while driving the interrupt lines.
pub struct Board<S> {
    pub regions: RegionStore,
    pub banks: BankController,
    pub lines: InterruptCoordinator,
    pub inputs: InputPorts,
    /// Driver-specific state (latches, protection chips, masks).
    pub state: S,
    published: Vec<Published>,
    frames_since_watchdog: u32,
    boost_frames: u32,
}

impl<S> Board<S> {
    pub(crate) fn new(
        regions: RegionStore,
        banks: BankController,
        lines: InterruptCoordinator,
        inputs: InputPorts,
        published: Vec<Published>,
        state: S,
    ) -> Self {
        Self {
            regions,
            banks,
            lines,
            inputs,
            state,
            published,
            frames_since_watchdog: 0,
            boost_frames: 0,
        }
    }

    pub fn region(&self, id: RegionId) -> &MemoryRegion {
        self.regions.get(id)
    }

    pub fn region_mut(&mut self, id: RegionId) -> &mut MemoryRegion {
        self.regions.get_mut(id)
    }

    /// Bank-select from a running program. An out-of-range page is logged
    /// and ignored; the previous page stays mapped.
    pub fn select_bank(&mut self, id: BankId, bank: usize) -> bool {
        match self.banks.select(id, bank) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{err}; keeping page {}", self.banks.get(id).current());
                false
            }
        }
    }

    pub fn read_input_port(&self, port: usize) -> u8 {
        self.inputs.read_input_port(port)
    }

    pub fn published(&self, name: &str) -> Option<&[u8]> {
        let window = self.published.iter().find(|p| p.name == name)?;
        let data = self.regions.get(window.region).as_slice();
        data.get(window.offset..window.offset + window.len)
    }

    pub fn published_windows(&self) -> &[Published] {
        &self.published
    }

    pub fn kick_watchdog(&mut self) {
        self.frames_since_watchdog = 0;
    }

    pub fn frames_since_watchdog(&self) -> u32 {
        self.frames_since_watchdog
    }

    /// Count one frame; true once `limit` frames passed without a kick.
    pub(crate) fn watchdog_expired(&mut self, limit: u32) -> bool {
        self.frames_since_watchdog = self.frames_since_watchdog.saturating_add(1);
        self.frames_since_watchdog >= limit
    }

    /// Run the next `frames` frames at the boosted interleave.
    pub fn boost_interleave(&mut self, frames: u32) {
        self.boost_frames = self.boost_frames.max(frames);
    }

    pub fn boost_pending(&self) -> bool {
        self.boost_frames > 0
    }

    pub(crate) fn take_boost(&mut self) -> bool {
        if self.boost_frames == 0 {
            return false;
        }
        self.boost_frames -= 1;
        true
    }

    pub(crate) fn power_on(&mut self) {
        self.regions.clear_ram();
        self.banks.reset();
        self.lines.reset_all();
        self.frames_since_watchdog = 0;
        self.boost_frames = 0;
    }
}
