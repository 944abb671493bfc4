pub mod core;
pub mod cpu;
pub mod device;
pub mod memory;

pub mod prelude {
    pub use crate::core::machine::{BoardState, Machine};
    pub use crate::core::{
        Bus, BusMaster, ConfigError, CpuSpec, MachineConfig, System, SystemBuilder,
        bus::InterruptState,
    };
    pub use crate::cpu::Cpu;
    pub use crate::memory::{AddressMapBuilder, Board, MemoryRegion};
}
