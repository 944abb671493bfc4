pub mod bank;
pub mod board;
pub mod map;
pub mod region;
pub mod shared;

pub use bank::{BankController, BankId, BankState};
pub use board::{Board, InputPorts, Published};
pub use map::{AddressMap, AddressMapBuilder, Handler, MapEntry, ReadFn, WriteFn};
pub use region::{MemoryRegion, RegionId, RegionKind, RegionStore};
pub use shared::SharedWindow;
