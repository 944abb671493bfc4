//! A multi-CPU board: address maps, shared state and a cooperative
//! round-robin scheduler.
//!
//! All CPUs of a [`System`] run on one thread. [`System::run_slice`] is the
//! only place where a CPU picks up changes to its interrupt, reset and halt
//! lines; every handler call happens synchronously inside the slice of the
//! CPU that made the access.

use crate::core::bus::{Bus, BusMaster, InterruptState};
use crate::core::config::MachineConfig;
use crate::core::error::{ConfigError, SettingsError};
use crate::core::lines::{ExecState, InterruptCoordinator};
use crate::core::machine::BoardState;
use crate::cpu::Cpu;
use crate::memory::bank::{BankController, BankId};
use crate::memory::board::{Board, InputPorts, Published};
use crate::memory::map::{AddressMap, AddressMapBuilder};
use crate::memory::region::{MemoryRegion, RegionId, RegionStore};
use crate::memory::shared::SharedWindow;

/// Per-frame interrupt generator: `(board, index within the frame)`.
pub type FrameInterruptFn<S> = fn(&mut Board<S>, u32);

/// Static description of one CPU slot.
pub struct CpuSpec<S> {
    pub name: &'static str,
    pub cycles_per_frame: u32,
    /// How many times per frame `frame_interrupt` fires. Calls are spread
    /// evenly over the frame's slices; with fewer slices than interrupts,
    /// several calls land in the same slice.
    pub interrupts_per_frame: u32,
    pub frame_interrupt: Option<FrameInterruptFn<S>>,
}

impl<S> CpuSpec<S> {
    pub fn new(name: &'static str, cycles_per_frame: u32) -> Self {
        Self {
            name,
            cycles_per_frame,
            interrupts_per_frame: 0,
            frame_interrupt: None,
        }
    }

    pub fn with_interrupt(mut self, per_frame: u32, generator: FrameInterruptFn<S>) -> Self {
        self.interrupts_per_frame = per_frame;
        self.frame_interrupt = Some(generator);
        self
    }
}

/// Collects regions, banks, maps and CPU slots, then validates the lot.
pub struct SystemBuilder<S> {
    name: &'static str,
    regions: RegionStore,
    banks: BankController,
    cpus: Vec<(CpuSpec<S>, AddressMapBuilder<S>)>,
    published: Vec<Published>,
    input_ports: usize,
    config: MachineConfig,
}

impl<S: BoardState> SystemBuilder<S> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            regions: RegionStore::new(),
            banks: BankController::new(),
            cpus: Vec::new(),
            published: Vec::new(),
            input_ports: 0,
            config: MachineConfig::default(),
        }
    }

    pub fn region(&mut self, region: MemoryRegion) -> Result<RegionId, ConfigError> {
        self.regions.add(region)
    }

    pub fn bank(
        &mut self,
        name: &'static str,
        region: RegionId,
        base: usize,
        page_size: usize,
        count: usize,
    ) -> Result<BankId, ConfigError> {
        self.banks
            .add(&self.regions, name, region, base, page_size, count)
    }

    pub fn shared_window(
        &self,
        name: &'static str,
        region: RegionId,
        offset: usize,
        len: usize,
    ) -> Result<SharedWindow, ConfigError> {
        SharedWindow::new(&self.regions, name, region, offset, len)
    }

    /// Expose `len` bytes at `offset` of `region` to the renderer.
    pub fn publish(
        &mut self,
        name: &'static str,
        region: RegionId,
        offset: usize,
        len: usize,
    ) -> Result<(), ConfigError> {
        if self.published.iter().any(|p| p.name == name) {
            return Err(ConfigError::DuplicateName(name.to_string()));
        }
        let backing = self.regions.get(region);
        if offset + len > backing.len() {
            return Err(ConfigError::RegionSizeMismatch {
                region: backing.name().to_string(),
                expected: offset + len,
                actual: backing.len(),
            });
        }
        self.published.push(Published {
            name,
            region,
            offset,
            len,
        });
        Ok(())
    }

    pub fn input_ports(&mut self, count: usize) -> &mut Self {
        self.input_ports = count;
        self
    }

    pub fn config(&mut self, config: MachineConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Add a CPU slot. Slots are numbered in the order they are added and the
    /// map must have been created for that number.
    pub fn cpu(&mut self, spec: CpuSpec<S>, map: AddressMapBuilder<S>) -> &mut Self {
        self.cpus.push((spec, map));
        self
    }

    pub fn build(self, state: S) -> Result<System<S>, ConfigError> {
        let mut maps = Vec::with_capacity(self.cpus.len());
        let mut cpus = Vec::with_capacity(self.cpus.len());
        for (index, (spec, map)) in self.cpus.into_iter().enumerate() {
            if map.cpu() != index {
                return Err(ConfigError::UnknownCpu(map.cpu()));
            }
            maps.push(map.build(&self.regions, &self.banks)?);
            cpus.push(CpuSlot {
                spec,
                core: None,
                cycles: 0,
            });
        }

        let lines = InterruptCoordinator::new(cpus.len());
        let mut board = Board::new(
            self.regions,
            self.banks,
            lines,
            InputPorts::new(self.input_ports),
            self.published,
            state,
        );
        S::power_on(&mut board);
        log::debug!("{}: built with {} cpus", self.name, cpus.len());

        Ok(System {
            name: self.name,
            board,
            maps,
            cpus,
            config: self.config,
            frame: 0,
        })
    }
}

struct CpuSlot<S> {
    spec: CpuSpec<S>,
    core: Option<Box<dyn Cpu>>,
    cycles: u64,
}

/// The bus a CPU core sees during its slice.
struct SliceBus<'a, S> {
    map: &'a AddressMap<S>,
    board: &'a mut Board<S>,
    open_bus: u8,
}

impl<S> Bus for SliceBus<'_, S> {
    type Address = u32;
    type Data = u8;

    fn read(&mut self, master: BusMaster, addr: u32) -> u8 {
        read_mapped(Some(self.map), self.board, master.index(), addr, self.open_bus)
    }

    fn write(&mut self, master: BusMaster, addr: u32, data: u8) {
        write_mapped(Some(self.map), self.board, master.index(), addr, data);
    }

    fn is_halted_for(&self, master: BusMaster) -> bool {
        self.board.lines.exec_state(master.index()) != ExecState::Running
    }

    fn check_interrupts(&self, target: BusMaster) -> InterruptState {
        self.board.lines.interrupt_state(target.index())
    }

    fn acknowledge_interrupt(&mut self, master: BusMaster, level: u8) {
        self.board.lines.acknowledge(master.index(), level);
    }
}

fn read_mapped<S>(
    map: Option<&AddressMap<S>>,
    board: &mut Board<S>,
    cpu: usize,
    addr: u32,
    open_bus: u8,
) -> u8 {
    match map.and_then(|m| m.read(board, addr)) {
        Some(data) => data,
        None => {
            log::trace!("cpu {cpu}: unmapped read {addr:#06X}");
            open_bus
        }
    }
}

fn write_mapped<S>(
    map: Option<&AddressMap<S>>,
    board: &mut Board<S>,
    cpu: usize,
    addr: u32,
    data: u8,
) {
    if !map.is_some_and(|m| m.write(board, addr, data)) {
        log::trace!("cpu {cpu}: unmapped write {addr:#06X} = {data:#04X}");
    }
}

fn slice_budget(cycles_per_frame: u32, slice: u32, slices: u32) -> u32 {
    let total = u64::from(cycles_per_frame);
    let (slice, slices) = (u64::from(slice), u64::from(slices));
    (total * (slice + 1) / slices - total * slice / slices) as u32
}

/// One emulated machine.
pub struct System<S> {
    name: &'static str,
    board: Board<S>,
    maps: Vec<AddressMap<S>>,
    cpus: Vec<CpuSlot<S>>,
    config: MachineConfig,
    frame: u64,
}

impl<S: BoardState> System<S> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cpu_count(&self) -> usize {
        self.cpus.len()
    }

    pub fn cpu_name(&self, cpu: usize) -> Option<&'static str> {
        self.cpus.get(cpu).map(|slot| slot.spec.name)
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MachineConfig) -> Result<(), SettingsError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Overlay a TOML settings document on the current config.
    pub fn apply_settings(&mut self, text: &str) -> Result<(), SettingsError> {
        self.config = self.config.apply_toml(text)?;
        Ok(())
    }

    pub fn board(&self) -> &Board<S> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<S> {
        &mut self.board
    }

    pub fn state(&self) -> &S {
        &self.board.state
    }

    pub fn map(&self, cpu: usize) -> Option<&AddressMap<S>> {
        self.maps.get(cpu)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Total cycles executed by `cpu` since construction.
    pub fn cycles(&self, cpu: usize) -> u64 {
        self.cpus.get(cpu).map_or(0, |slot| slot.cycles)
    }

    /// One access through `cpu`'s map. Unmapped reads return the open-bus
    /// value.
    pub fn read_byte(&mut self, cpu: usize, addr: u32) -> u8 {
        read_mapped(
            self.maps.get(cpu),
            &mut self.board,
            cpu,
            addr,
            self.config.open_bus,
        )
    }

    /// Unmapped writes are dropped.
    pub fn write_byte(&mut self, cpu: usize, addr: u32, data: u8) {
        write_mapped(self.maps.get(cpu), &mut self.board, cpu, addr, data);
    }

    pub fn attach_cpu(&mut self, cpu: usize, mut core: Box<dyn Cpu>) -> Result<(), ConfigError> {
        let slot = self.cpus.get_mut(cpu).ok_or(ConfigError::UnknownCpu(cpu))?;
        core.reset();
        slot.core = Some(core);
        Ok(())
    }

    /// Fill a ROM (or preset a RAM) region with an image of exactly its size.
    pub fn load_region(&mut self, name: &str, data: &[u8]) -> Result<(), ConfigError> {
        let id = self.board.regions.require(name)?;
        self.board.regions.get_mut(id).load(data)
    }

    /// Run `cpu` for up to `budget` cycles and return the cycles executed.
    ///
    /// Line changes made since the CPU's previous slice take effect here: a
    /// pulsed or released reset resets the core first, and a CPU that is
    /// halted or held in reset sits the slice out.
    pub fn run_slice(&mut self, cpu: usize, budget: u32) -> u32 {
        let Some(slot) = self.cpus.get_mut(cpu) else {
            return 0;
        };
        let start = self.board.lines.begin_slice(cpu);
        if start.reset_core {
            if let Some(core) = slot.core.as_mut() {
                core.reset();
            }
        }
        if start.state != ExecState::Running {
            return 0;
        }
        let Some(core) = slot.core.as_mut() else {
            return 0;
        };

        let mut bus = SliceBus {
            map: &self.maps[cpu],
            board: &mut self.board,
            open_bus: self.config.open_bus,
        };
        let master = BusMaster::Cpu(cpu);
        let mut used = 0u32;
        while used < budget {
            used = used.saturating_add(core.step(&mut bus, master).max(1));
        }
        slot.cycles += u64::from(used);
        used
    }

    /// One video frame of round-robin interleave.
    ///
    /// Each CPU's frame interrupts fire right before the slice they fall in,
    /// so the CPU latches them at that slice's start. After the frame the
    /// watchdog (if enabled) is checked.
    pub fn run_frame(&mut self) {
        let slices = if self.board.take_boost() {
            self.config.boost_slices_per_frame
        } else {
            self.config.slices_per_frame
        }
        .max(1);

        for slice in 0..slices {
            for cpu in 0..self.cpus.len() {
                self.fire_frame_interrupts(cpu, slice, slices);
                let budget = slice_budget(self.cpus[cpu].spec.cycles_per_frame, slice, slices);
                self.run_slice(cpu, budget);
            }
        }
        self.frame += 1;

        if let Some(limit) = self.config.watchdog_frames {
            if self.board.watchdog_expired(limit) {
                log::warn!("{}: watchdog not serviced for {limit} frames, resetting", self.name);
                self.reset();
            }
        }
    }

    fn fire_frame_interrupts(&mut self, cpu: usize, slice: u32, slices: u32) {
        let spec = &self.cpus[cpu].spec;
        let Some(generator) = spec.frame_interrupt else {
            return;
        };
        let per_frame = u64::from(spec.interrupts_per_frame);
        for index in 0..spec.interrupts_per_frame {
            if u64::from(index) * u64::from(slices) / per_frame == u64::from(slice) {
                generator(&mut self.board, index);
            }
        }
    }

    /// Power-on reset: RAM refilled, banks to page 0, every line dropped,
    /// driver state re-initialized, every attached core reset.
    pub fn reset(&mut self) {
        self.board.power_on();
        S::power_on(&mut self.board);
        for slot in &mut self.cpus {
            if let Some(core) = slot.core.as_mut() {
                core.reset();
            }
        }
        log::debug!("{}: reset", self.name);
    }
}
