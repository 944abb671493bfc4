pub mod eeprom;
pub mod gpio;
pub mod latch;
pub mod mcu68705;
pub mod retofinv_prot;
pub mod sound_comm;

pub use eeprom::Eeprom;
pub use gpio::GpioPort;
pub use latch::{AddressableLatch, SoundLatch};
pub use mcu68705::{Mcu68705, McuHost};
pub use retofinv_prot::RetofinvProtection;
pub use sound_comm::SoundComm;
