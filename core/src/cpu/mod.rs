use crate::core::bus::{Bus, BusMaster};

/// Bus type every CPU core is driven through: 32-bit addresses cover both
/// the 16-bit 8-bit-CPU spaces and the 68000's 24-bit space.
pub type CpuBus<'a> = dyn Bus<Address = u32, Data = u8> + 'a;

/// Generic CPU interface.
///
/// Instruction cores live outside this crate. The scheduler owns one boxed
/// core per CPU slot and steps it through a bus that resolves the slot's
/// address map and exposes its latched interrupt lines.
pub trait Cpu {
    /// Reset vector fetch, register clear. Called on machine reset and when
    /// the CPU's reset line is pulsed or released.
    fn reset(&mut self);

    /// Execute one instruction (or take one interrupt) and return the cycles
    /// it consumed. Interrupt lines are read through
    /// [`Bus::check_interrupts`] between instructions.
    fn step(&mut self, bus: &mut CpuBus<'_>, master: BusMaster) -> u32;
}
