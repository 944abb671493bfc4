pub mod bus;
pub mod config;
pub mod error;
pub mod lines;
pub mod machine;
pub mod system;

pub use bus::{Access, Bus, BusMaster, InterruptState};
pub use config::MachineConfig;
pub use error::{ConfigError, SettingsError};
pub use lines::{ExecState, InterruptCoordinator, LineState};
pub use machine::{BoardState, Machine};
pub use system::{CpuSpec, System, SystemBuilder};
