pub mod gunsmoke;
pub mod mexico86;
pub mod registry;
pub mod retofinv;
pub mod vindictr;

pub use gunsmoke::GunsmokeSystem;
pub use mexico86::Mexico86System;
pub use registry::MachineEntry;
pub use retofinv::RetofinvSystem;
pub use vindictr::VindictrSystem;
