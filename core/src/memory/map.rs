//! Declarative per-CPU address maps.
//!
//! A map is an ordered list of `[start, end]` entries, each carrying a
//! [`Handler`]. Reads and writes are resolved separately: an entry only takes
//! part in resolution for the directions it serves, so a read-only input
//! port and a write-only latch may share an address. Within one direction
//! entries may not overlap; [`AddressMapBuilder::build`] rejects that, and
//! resolution picks the first matching entry in declaration order.
//!
//! Maps are built once at machine setup and never change afterwards; only
//! the data they point at (regions, bank selections, driver state) does.

use std::fmt;

use crate::core::bus::Access;
use crate::core::error::ConfigError;
use crate::memory::bank::{BankController, BankId};
use crate::memory::board::Board;
use crate::memory::region::{RegionId, RegionStore};
use crate::memory::shared::SharedWindow;

/// Read callback: `(board, offset from entry start) -> data`.
pub type ReadFn<S> = fn(&mut Board<S>, u32) -> u8;

/// Write callback: `(board, offset from entry start, data)`.
pub type WriteFn<S> = fn(&mut Board<S>, u32, u8);

/// What an address map entry routes to.
pub enum Handler<S> {
    /// Read/write storage at `offset` within `region`.
    Ram { region: RegionId, offset: usize },
    /// Read-only storage; writes fall through to the next entry (if any).
    Rom { region: RegionId, offset: usize },
    /// Bank-switched window; reads go through the bank's current page.
    Bank { bank: BankId, writable: bool },
    Read(ReadFn<S>),
    Write(WriteFn<S>),
    ReadWrite(ReadFn<S>, WriteFn<S>),
    /// Write sink (watchdog stubs, unconnected latches).
    Nop,
}

impl<S> Clone for Handler<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Handler<S> {}

impl<S> fmt::Debug for Handler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ram { region, offset } => write!(f, "Ram({region:?}+{offset:#X})"),
            Self::Rom { region, offset } => write!(f, "Rom({region:?}+{offset:#X})"),
            Self::Bank { bank, writable } => write!(f, "Bank({bank:?}, writable={writable})"),
            Self::Read(_) => f.write_str("Read"),
            Self::Write(_) => f.write_str("Write"),
            Self::ReadWrite(..) => f.write_str("ReadWrite"),
            Self::Nop => f.write_str("Nop"),
        }
    }
}

impl<S> Handler<S> {
    pub fn serves(&self, access: Access) -> bool {
        match self {
            Self::Ram { .. } | Self::ReadWrite(..) => true,
            Self::Rom { .. } | Self::Read(_) => access == Access::Read,
            Self::Write(_) | Self::Nop => access == Access::Write,
            Self::Bank { writable, .. } => access == Access::Read || *writable,
        }
    }
}

#[derive(Debug)]
pub struct MapEntry<S> {
    pub start: u32,
    pub end: u32,
    pub handler: Handler<S>,
}

impl<S> MapEntry<S> {
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr <= self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// A validated, immutable address map for one CPU.
#[derive(Debug)]
pub struct AddressMap<S> {
    cpu: usize,
    entries: Vec<MapEntry<S>>,
}

impl<S> AddressMap<S> {
    pub fn cpu(&self) -> usize {
        self.cpu
    }

    pub fn entries(&self) -> &[MapEntry<S>] {
        &self.entries
    }

    /// First entry containing `addr` that serves `access`.
    pub fn resolve(&self, addr: u32, access: Access) -> Option<&MapEntry<S>> {
        self.entries
            .iter()
            .find(|e| e.contains(addr) && e.handler.serves(access))
    }

    /// Dispatch a read. `None` means no entry claims the address.
    pub fn read(&self, board: &mut Board<S>, addr: u32) -> Option<u8> {
        let entry = self.resolve(addr, Access::Read)?;
        let offset = addr - entry.start;
        match entry.handler {
            Handler::Ram { region, offset: base } | Handler::Rom { region, offset: base } => {
                Some(board.regions.get(region).read(base + offset as usize))
            }
            Handler::Bank { bank, .. } => {
                let state = board.banks.get(bank);
                let index = state.offset() + offset as usize;
                Some(board.regions.get(state.region()).read(index))
            }
            Handler::Read(read) | Handler::ReadWrite(read, _) => Some(read(board, offset)),
            Handler::Write(_) | Handler::Nop => None,
        }
    }

    /// Dispatch a write. Returns false if no entry claims the address.
    pub fn write(&self, board: &mut Board<S>, addr: u32, data: u8) -> bool {
        let Some(entry) = self.resolve(addr, Access::Write) else {
            return false;
        };
        let offset = addr - entry.start;
        match entry.handler {
            Handler::Ram { region, offset: base } => {
                board.regions.get_mut(region).write(base + offset as usize, data);
            }
            Handler::Bank { bank, .. } => {
                let state = board.banks.get(bank);
                let (region, index) = (state.region(), state.offset() + offset as usize);
                board.regions.get_mut(region).write(index, data);
            }
            Handler::Write(write) | Handler::ReadWrite(_, write) => write(board, offset, data),
            Handler::Nop => {}
            Handler::Rom { .. } | Handler::Read(_) => return false,
        }
        true
    }
}

/// Collects entries for one CPU; [`build`](Self::build) validates them.
pub struct AddressMapBuilder<S> {
    cpu: usize,
    entries: Vec<MapEntry<S>>,
    error: Option<ConfigError>,
}

impl<S> AddressMapBuilder<S> {
    pub fn new(cpu: usize) -> Self {
        Self {
            cpu,
            entries: Vec::new(),
            error: None,
        }
    }

    pub fn cpu(&self) -> usize {
        self.cpu
    }

    pub fn entry(mut self, start: u32, end: u32, handler: Handler<S>) -> Self {
        self.entries.push(MapEntry {
            start,
            end,
            handler,
        });
        self
    }

    pub fn rom(self, start: u32, end: u32, region: RegionId) -> Self {
        self.rom_at(start, end, region, 0)
    }

    pub fn rom_at(self, start: u32, end: u32, region: RegionId, offset: usize) -> Self {
        self.entry(start, end, Handler::Rom { region, offset })
    }

    pub fn ram(self, start: u32, end: u32, region: RegionId) -> Self {
        self.ram_at(start, end, region, 0)
    }

    pub fn ram_at(self, start: u32, end: u32, region: RegionId, offset: usize) -> Self {
        self.entry(start, end, Handler::Ram { region, offset })
    }

    /// Read-only banked window.
    pub fn bank(self, start: u32, end: u32, bank: BankId) -> Self {
        self.entry(
            start,
            end,
            Handler::Bank {
                bank,
                writable: false,
            },
        )
    }

    /// Banked window backed by RAM pages.
    pub fn bank_ram(self, start: u32, end: u32, bank: BankId) -> Self {
        self.entry(
            start,
            end,
            Handler::Bank {
                bank,
                writable: true,
            },
        )
    }

    pub fn read(self, start: u32, end: u32, read: ReadFn<S>) -> Self {
        self.entry(start, end, Handler::Read(read))
    }

    pub fn write(self, start: u32, end: u32, write: WriteFn<S>) -> Self {
        self.entry(start, end, Handler::Write(write))
    }

    pub fn read_write(self, start: u32, end: u32, read: ReadFn<S>, write: WriteFn<S>) -> Self {
        self.entry(start, end, Handler::ReadWrite(read, write))
    }

    pub fn nop(self, start: u32, end: u32) -> Self {
        self.entry(start, end, Handler::Nop)
    }

    /// Map a shared window. The range must span exactly the window length;
    /// a mismatch is reported by [`build`](Self::build).
    pub fn shared(mut self, window: &SharedWindow, start: u32, end: u32) -> Self {
        let actual = end.checked_sub(start).map_or(0, |span| span as usize + 1);
        if actual != window.len() && self.error.is_none() {
            self.error = Some(ConfigError::SharedWindowMismatch {
                name: window.name().to_string(),
                cpu: self.cpu,
                expected: window.len(),
                actual,
            });
        }
        self.ram_at(start, end, window.region(), window.offset())
    }

    pub fn build(
        self,
        regions: &RegionStore,
        banks: &BankController,
    ) -> Result<AddressMap<S>, ConfigError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let cpu = self.cpu;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.start > entry.end {
                return Err(ConfigError::InvalidRange {
                    cpu,
                    start: entry.start,
                    end: entry.end,
                });
            }
            for earlier in &self.entries[..i] {
                if !entry.overlaps(earlier) {
                    continue;
                }
                for access in [Access::Read, Access::Write] {
                    if entry.handler.serves(access) && earlier.handler.serves(access) {
                        return Err(ConfigError::OverlappingRange {
                            cpu,
                            access,
                            start: entry.start,
                            end: entry.end,
                            other_start: earlier.start,
                            other_end: earlier.end,
                        });
                    }
                }
            }
            match entry.handler {
                Handler::Ram { region, offset } | Handler::Rom { region, offset } => {
                    let backing = regions.get(region);
                    if offset + entry.len() > backing.len() {
                        return Err(ConfigError::RegionTooSmall {
                            cpu,
                            start: entry.start,
                            end: entry.end,
                            region: backing.name().to_string(),
                            offset,
                            needed: entry.len(),
                            available: backing.len(),
                        });
                    }
                }
                Handler::Bank { bank, .. } => {
                    let state = banks.get(bank);
                    if entry.len() > state.page_size() {
                        return Err(ConfigError::BankWindowTooLarge {
                            cpu,
                            name: state.name().to_string(),
                            start: entry.start,
                            end: entry.end,
                            page_size: state.page_size(),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(AddressMap {
            cpu,
            entries: self.entries,
        })
    }
}
