use std::fmt;

/// Identifies who is accessing the bus (for multi-CPU arbitration)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BusMaster {
    Cpu(usize), // CPU 0 (main), CPU 1 (sound/sub), CPU 2 (MCU), ...
}

impl BusMaster {
    /// Index of the CPU, used to pick its address map and line set.
    pub fn index(self) -> usize {
        match self {
            Self::Cpu(n) => n,
        }
    }
}

/// Direction of a bus access. Address maps keep separate read and write
/// views, so an entry only takes part in resolution for the directions it
/// serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Generic bus interface supporting halt lines and latched interrupts.
pub trait Bus {
    type Address: Copy + Into<u64>; // u32 covers 8-bit and 24-bit address spaces
    type Data; // u8

    fn read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data;
    fn write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data);

    /// Check if the bus is halted for this master (HALT line asserted).
    /// Returns true if the master must pause before the next bus cycle.
    fn is_halted_for(&self, master: BusMaster) -> bool;

    /// Interrupt lines as latched at the start of the master's current slice.
    fn check_interrupts(&self, target: BusMaster) -> InterruptState;

    /// The CPU has taken an interrupt at `level`. Drops a pulsed request so
    /// it is not serviced twice.
    fn acknowledge_interrupt(&mut self, _master: BusMaster, _level: u8) {}
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptState {
    pub nmi: bool,
    pub irq: bool,
    /// Highest asserted IRQ level (68000-style priority); 0 on 8-bit CPUs.
    pub irq_level: u8,
    /// Vector byte supplied with the highest asserted level (Z80 IM2, etc.)
    pub irq_vector: Option<u8>,
}
