use crate::core::config::MachineConfig;
use crate::core::error::ConfigError;
use crate::core::lines::InterruptCoordinator;
use crate::core::system::System;
use crate::cpu::Cpu;
use crate::memory::board::Board;

/// Driver-specific part of a board's state.
pub trait BoardState: Sized {
    /// Bring the driver state to its power-on values and drive the initial
    /// line levels (e.g. CPUs held in reset by a cleared control latch).
    ///
    /// Called once when the system is built and again on every reset, after
    /// RAM, banks and lines have been cleared.
    fn power_on(_board: &mut Board<Self>) {}
}

impl BoardState for () {}

/// Machine-agnostic interface for emulated boards.
///
/// Every [`System`] implements it, so a frontend can drive any registered
/// machine without knowing its driver state type.
pub trait Machine {
    fn name(&self) -> &'static str;

    fn cpu_count(&self) -> usize;

    /// Run one frame of round-robin interleave.
    fn run_frame(&mut self);

    /// Run one CPU for up to `budget` cycles; returns cycles executed.
    fn run_slice(&mut self, cpu: usize, budget: u32) -> u32;

    fn read_byte(&mut self, cpu: usize, addr: u32) -> u8;

    fn write_byte(&mut self, cpu: usize, addr: u32, data: u8);

    /// Renderer view of a published window (video RAM, sprites, scroll).
    fn published(&self, name: &str) -> Option<&[u8]>;

    fn set_input_port(&mut self, port: usize, value: u8);

    fn lines(&self) -> &InterruptCoordinator;

    fn attach_cpu(&mut self, cpu: usize, core: Box<dyn Cpu>) -> Result<(), ConfigError>;

    fn load_region(&mut self, name: &str, data: &[u8]) -> Result<(), ConfigError>;

    fn config(&self) -> &MachineConfig;

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);
}

impl<S: BoardState + 'static> Machine for System<S> {
    fn name(&self) -> &'static str {
        System::name(self)
    }

    fn cpu_count(&self) -> usize {
        System::cpu_count(self)
    }

    fn run_frame(&mut self) {
        System::run_frame(self);
    }

    fn run_slice(&mut self, cpu: usize, budget: u32) -> u32 {
        System::run_slice(self, cpu, budget)
    }

    fn read_byte(&mut self, cpu: usize, addr: u32) -> u8 {
        System::read_byte(self, cpu, addr)
    }

    fn write_byte(&mut self, cpu: usize, addr: u32, data: u8) {
        System::write_byte(self, cpu, addr, data);
    }

    fn published(&self, name: &str) -> Option<&[u8]> {
        self.board().published(name)
    }

    fn set_input_port(&mut self, port: usize, value: u8) {
        self.board_mut().inputs.set(port, value);
    }

    fn lines(&self) -> &InterruptCoordinator {
        &self.board().lines
    }

    fn attach_cpu(&mut self, cpu: usize, core: Box<dyn Cpu>) -> Result<(), ConfigError> {
        System::attach_cpu(self, cpu, core)
    }

    fn load_region(&mut self, name: &str, data: &[u8]) -> Result<(), ConfigError> {
        System::load_region(self, name, data)
    }

    fn config(&self) -> &MachineConfig {
        System::config(self)
    }

    fn reset(&mut self) {
        System::reset(self);
    }
}
