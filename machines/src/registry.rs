//! Machine registry for automatic front-end discovery.
//!
//! Each driver self-registers via [`inventory::submit!`] with a
//! [`MachineEntry`] containing its name and a factory function. Callers
//! discover available boards at runtime without any central list, then load
//! ROM images into the returned machine with
//! [`Machine::load_region`](arcbus_core::core::machine::Machine::load_region).

use arcbus_core::core::error::ConfigError;
use arcbus_core::core::machine::Machine;

/// Describes one registered board.
pub struct MachineEntry {
    /// Name used to select this machine (e.g., "gunsmoke").
    pub name: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Factory: build the board with blank ROM regions.
    pub create: fn() -> Result<Box<dyn Machine>, ConfigError>,
}

impl MachineEntry {
    pub const fn new(
        name: &'static str,
        title: &'static str,
        create: fn() -> Result<Box<dyn Machine>, ConfigError>,
    ) -> Self {
        Self {
            name,
            title,
            create,
        }
    }
}

inventory::collect!(MachineEntry);

/// Return all registered machines, sorted by name.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut entries: Vec<_> = inventory::iter::<MachineEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a machine by name.
pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|e| e.name == name)
}
