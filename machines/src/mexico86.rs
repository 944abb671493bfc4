//! Mexico 86 / KiKi KaiKai hardware (Taito, 1986): main Z80, sound Z80 and
//! a 68705 protection MCU.
//!
//! Main and sound CPUs share 10KB of RAM (video RAM and object RAM live in
//! its first 6KB). The MCU never sees main memory directly: it reaches the
//! 256-byte protection RAM and two input ports through the port-B handshake
//! of [`Mcu68705`], and interrupts the main CPU with a vector it reads from
//! protection RAM offset 0.

use arcbus_core::core::config::MachineConfig;
use arcbus_core::core::error::ConfigError;
use arcbus_core::core::lines::InterruptCoordinator;
use arcbus_core::core::machine::{BoardState, Machine};
use arcbus_core::core::system::{CpuSpec, System, SystemBuilder};
use arcbus_core::device::{Mcu68705, McuHost};
use arcbus_core::memory::{
    AddressMapBuilder, BankId, Board, InputPorts, MemoryRegion, RegionId, RegionStore,
};

use crate::registry::MachineEntry;

pub const MAIN: usize = 0;
pub const SOUND: usize = 1;
pub const MCU: usize = 2;

pub const MAIN_ROM: &str = "maincpu";
pub const SOUND_ROM: &str = "soundcpu";
pub const MCU_ROM: &str = "mcu";

// Fixed 32KB, a 32KB hole, then six 16KB banks.
const MAIN_ROM_SIZE: usize = 0x28000;
const BANK_BASE: usize = 0x10000;
const BANK_SIZE: usize = 0x4000;
const BANK_COUNT: usize = 6;

const SHARED_SIZE: usize = 0x2800;
const VIDEORAM_SIZE: usize = 0x1500;
const OBJECTRAM_SIZE: usize = 0x300;

pub type Mexico86System = System<Mexico86Board>;

pub struct Mexico86Board {
    bank: BankId,
    protram: RegionId,
    pub mcu: Mcu68705,
    pub charbank: u8,
}

impl BoardState for Mexico86Board {
    fn power_on(board: &mut Board<Self>) {
        board.state.mcu.reset();
        board.state.charbank = 0;
    }
}

/// The MCU's view of the main board.
struct McuBus<'a> {
    regions: &'a mut RegionStore,
    lines: &'a mut InterruptCoordinator,
    inputs: &'a InputPorts,
    protram: RegionId,
}

impl McuHost for McuBus<'_> {
    fn read_shared(&mut self, address: u8) -> u8 {
        self.regions.get(self.protram).read(usize::from(address))
    }

    fn write_shared(&mut self, address: u8, data: u8) {
        self.regions
            .get_mut(self.protram)
            .write(usize::from(address), data);
    }

    fn read_input(&mut self, port: usize) -> u8 {
        self.inputs.read_input_port(port)
    }

    fn interrupt_host(&mut self, vector: u8) {
        // Stays up until the Z80 takes it.
        self.lines.hold_interrupt(MAIN, 0, Some(vector));
    }
}

/// 0xF000: ROM bank (bits 0-2), character bank (bit 5).
fn bankswitch_w(board: &mut Board<Mexico86Board>, _offset: u32, data: u8) {
    let bank = board.state.bank;
    board.select_bank(bank, usize::from(data & 0x07));
    board.state.charbank = (data & 0x20) >> 5;
}

/// 0xF008: reset lines of the sound CPU (bit 2) and MCU (bit 3), active low.
fn reset_lines_w(board: &mut Board<Mexico86Board>, _offset: u32, data: u8) {
    board.lines.set_reset_line(SOUND, data & 0x04 == 0);
    board.lines.set_reset_line(MCU, data & 0x08 == 0);
}

fn mcu_port_b_w(board: &mut Board<Mexico86Board>, _offset: u32, data: u8) {
    let Board {
        regions,
        lines,
        inputs,
        state,
        ..
    } = board;
    let mut host = McuBus {
        regions,
        lines,
        inputs,
        protram: state.protram,
    };
    state.mcu.write_port_b(data, &mut host);
}

pub fn build() -> Result<Mexico86System, ConfigError> {
    let mut builder = SystemBuilder::<Mexico86Board>::new("mexico86");

    let main_rom = builder.region(MemoryRegion::rom_blank(MAIN_ROM, MAIN_ROM_SIZE))?;
    let shared = builder.region(MemoryRegion::ram("shared", SHARED_SIZE, 0x00))?;
    let protram = builder.region(MemoryRegion::ram("protram", 0x100, 0x00))?;
    let main_ram = builder.region(MemoryRegion::ram("mainram", 0x700, 0x00))?;
    let comm_ram = builder.region(MemoryRegion::ram("commram", 0x800, 0x00))?;
    let sound_rom = builder.region(MemoryRegion::rom_blank(SOUND_ROM, 0x8000))?;
    let sound_ram = builder.region(MemoryRegion::ram("soundram", 0x1800, 0x00))?;
    let mcu_rom = builder.region(MemoryRegion::rom_blank(MCU_ROM, 0x800))?;
    let mcu_ram = builder.region(MemoryRegion::ram("mcuram", 0x70, 0x00))?;

    let bank = builder.bank("bank1", main_rom, BANK_BASE, BANK_SIZE, BANK_COUNT)?;
    let window = builder.shared_window("shared", shared, 0, SHARED_SIZE)?;

    builder.publish("videoram", shared, 0, VIDEORAM_SIZE)?;
    builder.publish("objectram", shared, VIDEORAM_SIZE, OBJECTRAM_SIZE)?;

    let main_map = AddressMapBuilder::<Mexico86Board>::new(MAIN)
        .rom(0x0000, 0x7FFF, main_rom)
        .bank(0x8000, 0xBFFF, bank)
        .shared(&window, 0xC000, 0xE7FF)
        .ram(0xE800, 0xE8FF, protram)
        .ram(0xE900, 0xEFFF, main_ram)
        .write(0xF000, 0xF000, bankswitch_w)
        .write(0xF008, 0xF008, reset_lines_w)
        .read(0xF010, 0xF010, |board, _| board.read_input_port(5))
        .write(0xF018, 0xF018, |board, _, _| board.kick_watchdog())
        .ram(0xF800, 0xFFFF, comm_ram);

    let sound_map = AddressMapBuilder::<Mexico86Board>::new(SOUND)
        .rom(0x0000, 0x7FFF, sound_rom)
        .shared(&window, 0x8000, 0xA7FF)
        .ram(0xA800, 0xBFFF, sound_ram)
        // YM2203: status never busy
        .read(0xC000, 0xC001, |_, _| 0x00)
        .nop(0xC000, 0xC001);

    let mcu_map = AddressMapBuilder::<Mexico86Board>::new(MCU)
        .read_write(
            0x000,
            0x000,
            |board, _| board.state.mcu.read_port_a(),
            |board, _, data| board.state.mcu.write_port_a(data),
        )
        .read_write(
            0x001,
            0x001,
            |board, _| board.state.mcu.read_port_b(),
            mcu_port_b_w,
        )
        .read(0x002, 0x002, |board, _| board.read_input_port(0))
        .write(0x004, 0x004, |board, _, data| board.state.mcu.write_ddr_a(data))
        .write(0x005, 0x005, |board, _, data| board.state.mcu.write_ddr_b(data))
        .nop(0x00A, 0x00A)
        .ram(0x010, 0x07F, mcu_ram)
        .rom_at(0x080, 0x7FF, mcu_rom, 0x080);

    builder
        .input_ports(6)
        .config(MachineConfig {
            slices_per_frame: 100,
            boost_slices_per_frame: 100,
            ..MachineConfig::default()
        })
        .cpu(CpuSpec::new("main", 6_000_000 / 60), main_map)
        .cpu(
            CpuSpec::new("sound", 6_000_000 / 60).with_interrupt(1, |board, _| {
                board.lines.hold_interrupt(SOUND, 0, None);
            }),
            sound_map,
        )
        .cpu(
            // 4MHz crystal, divided by 4 inside the 68705
            CpuSpec::new("mcu", 1_000_000 / 60).with_interrupt(2, |board, index| {
                if index == 0 {
                    board.lines.assert_interrupt(MCU, 0, None);
                } else {
                    board.lines.clear_interrupt(MCU, 0);
                }
            }),
            mcu_map,
        );

    builder.build(Mexico86Board {
        bank,
        protram,
        mcu: Mcu68705::new(),
        charbank: 0,
    })
}

fn create_machine() -> Result<Box<dyn Machine>, ConfigError> {
    Ok(Box::new(build()?))
}

inventory::submit! {
    MachineEntry::new("mexico86", "Mexico 86", create_machine)
}
