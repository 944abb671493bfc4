//! Vindicators (Atari Games, 1988): 68010 main CPU and the 6502 on the
//! JSA sound board.
//!
//! The 68010 bus is 16 bits wide; this core dispatches bytes, with the
//! usual big-endian split (even address = upper byte). The 8-bit
//! peripherals (EEPROM, inputs, sound ports) sit on the lower byte, and
//! upper-byte reads of them return all ones.

use arcbus_core::core::config::MachineConfig;
use arcbus_core::core::error::ConfigError;
use arcbus_core::core::machine::{BoardState, Machine};
use arcbus_core::core::system::{CpuSpec, System, SystemBuilder};
use arcbus_core::device::{Eeprom, SoundComm};
use arcbus_core::memory::{AddressMapBuilder, BankId, Board, MemoryRegion};

use crate::registry::MachineEntry;

pub const MAIN: usize = 0;
pub const SOUND: usize = 1;

pub const MAIN_ROM: &str = "maincpu";
/// 6502 program at 0x4000-0xFFFF, then four 4KB banks for 0x3000-0x3FFF.
pub const SOUND_ROM: &str = "jsa";

const SOUND_ROM_SIZE: usize = 0x14000;
const SOUND_BANK_BASE: usize = 0x10000;

/// EEPROM cells (one per 16-bit word of the 0x0E0000-0x0E0FFF window).
const EEPROM_SIZE: usize = 0x800;

pub const SCANLINE_IRQ_LEVEL: u8 = 4;
pub const SOUND_IRQ_LEVEL: u8 = 6;

/// Port 1 bits driven by the sound comm ready flags.
const PORT1_SOUND_TO_CPU: u8 = 0x04;
const PORT1_CPU_TO_SOUND: u8 = 0x08;

/// Frames of boosted interleave after a main -> sound command.
const COMM_BOOST_FRAMES: u32 = 1;

pub type VindictrSystem = System<VindictrBoard>;

pub struct VindictrBoard {
    sound_bank: BankId,
    pub eeprom: Eeprom,
    pub comm: SoundComm,
}

impl BoardState for VindictrBoard {
    fn power_on(board: &mut Board<Self>) {
        board.state.eeprom.reset();
        board.state.comm.reset();
    }
}

fn is_low_byte(offset: u32) -> bool {
    offset & 1 == 1
}

fn eeprom_r(board: &mut Board<VindictrBoard>, offset: u32) -> u8 {
    if is_low_byte(offset) {
        board.state.eeprom.read((offset >> 1) as usize)
    } else {
        0xFF
    }
}

fn eeprom_w(board: &mut Board<VindictrBoard>, offset: u32, data: u8) {
    if is_low_byte(offset) {
        board.state.eeprom.write((offset >> 1) as usize, data);
    }
}

/// 0x260000/0x260010/0x260020: switch inputs on the low byte.
fn input_r(board: &mut Board<VindictrBoard>, port: usize, offset: u32) -> u8 {
    if !is_low_byte(offset) {
        return 0xFF;
    }
    let mut value = board.read_input_port(port);
    if port == 1 {
        if board.state.comm.sound_to_cpu_ready() {
            value ^= PORT1_SOUND_TO_CPU;
        }
        if board.state.comm.cpu_to_sound_ready() {
            value ^= PORT1_CPU_TO_SOUND;
        }
    }
    value
}

/// 0x260030: sound response.
fn sound_r(board: &mut Board<VindictrBoard>, offset: u32) -> u8 {
    if !is_low_byte(offset) {
        return 0xFF;
    }
    let Board { lines, state, .. } = board;
    state.comm.main_read(lines)
}

/// 0x360030: sound command.
fn sound_w(board: &mut Board<VindictrBoard>, offset: u32, data: u8) {
    if !is_low_byte(offset) {
        return;
    }
    let Board { lines, state, .. } = board;
    state.comm.main_write(lines, data);
    board.boost_interleave(COMM_BOOST_FRAMES);
}

fn sound_reset_w(board: &mut Board<VindictrBoard>, _offset: u32, _data: u8) {
    let Board { lines, state, .. } = board;
    state.comm.sound_reset(lines);
}

/// JSA 0x2804: bit 6 command waiting, bit 5 response unread, bit 4 test
/// switch (open). The rest comes from input port 3.
fn jsa_status_r(board: &mut Board<VindictrBoard>, _offset: u32) -> u8 {
    let mut status = (board.read_input_port(3) & 0x8F) | 0x10;
    if board.state.comm.cpu_to_sound_ready() {
        status |= 0x40;
    }
    if board.state.comm.sound_to_cpu_ready() {
        status |= 0x20;
    }
    status
}

/// JSA 0x2A04: bits 6-7 select the ROM bank at 0x3000.
fn jsa_control_w(board: &mut Board<VindictrBoard>, _offset: u32, data: u8) {
    let bank = board.state.sound_bank;
    board.select_bank(bank, usize::from(data >> 6));
}

fn jsa_irq_ack(board: &mut Board<VindictrBoard>) {
    board.lines.clear_interrupt(SOUND, 0);
}

pub fn build() -> Result<VindictrSystem, ConfigError> {
    let mut builder = SystemBuilder::<VindictrBoard>::new("vindictr");

    let main_rom = builder.region(MemoryRegion::rom_blank(MAIN_ROM, 0x60000))?;
    let palette = builder.region(MemoryRegion::ram("paletteram", 0x1000, 0x00))?;
    let playfield = builder.region(MemoryRegion::ram("playfield", 0x2000, 0x00))?;
    let mo = builder.region(MemoryRegion::ram("spriteram", 0x2000, 0x00))?;
    let alpha = builder.region(MemoryRegion::ram("alpha", 0x1000, 0x00))?;
    let work_ram = builder.region(MemoryRegion::ram("workram", 0xB000, 0x00))?;
    let sound_rom = builder.region(MemoryRegion::rom_blank(SOUND_ROM, SOUND_ROM_SIZE))?;
    let sound_ram = builder.region(MemoryRegion::ram("jsaram", 0x2000, 0x00))?;

    let sound_bank = builder.bank("jsabank", sound_rom, SOUND_BANK_BASE, 0x1000, 4)?;

    builder.publish("paletteram", palette, 0, 0x1000)?;
    builder.publish("playfield", playfield, 0, 0x2000)?;
    builder.publish("spriteram", mo, 0, 0x2000)?;
    builder.publish("alpha", alpha, 0, 0x1000)?;

    let main_map = AddressMapBuilder::<VindictrBoard>::new(MAIN)
        .rom(0x000000, 0x05FFFF, main_rom)
        .read_write(0x0E0000, 0x0E0FFF, eeprom_r, eeprom_w)
        .write(0x1F0000, 0x1FFFFF, |board, _, _| board.state.eeprom.unlock())
        .read(0x260000, 0x260001, |board, offset| input_r(board, 0, offset))
        .read(0x260010, 0x260011, |board, offset| input_r(board, 1, offset))
        .read(0x260020, 0x260021, |board, offset| input_r(board, 2, offset))
        .read(0x260030, 0x260031, sound_r)
        .write(0x2E0000, 0x2E0001, |board, _, _| board.kick_watchdog())
        .write(0x360000, 0x360001, |board, _, _| {
            board.lines.clear_interrupt(MAIN, SCANLINE_IRQ_LEVEL);
        })
        .nop(0x360010, 0x360011)
        .write(0x360020, 0x360021, sound_reset_w)
        .write(0x360030, 0x360031, sound_w)
        .ram(0x3E0000, 0x3E0FFF, palette)
        .ram(0x3F0000, 0x3F1FFF, playfield)
        .ram(0x3F2000, 0x3F3FFF, mo)
        .ram(0x3F4000, 0x3F4FFF, alpha)
        .ram(0x3F5000, 0x3FFFFF, work_ram);

    let sound_map = AddressMapBuilder::<VindictrBoard>::new(SOUND)
        .ram(0x0000, 0x1FFF, sound_ram)
        // YM2151: never busy
        .read(0x2000, 0x2001, |_, _| 0x00)
        .nop(0x2000, 0x2001)
        .read(0x2802, 0x2802, |board, _| {
            let Board { lines, state, .. } = board;
            state.comm.sound_read(lines)
        })
        .read(0x2804, 0x2804, jsa_status_r)
        .read_write(
            0x2806,
            0x2806,
            |board, _| {
                jsa_irq_ack(board);
                0x00
            },
            |board, _, _| jsa_irq_ack(board),
        )
        .write(0x2A02, 0x2A02, |board, _, data| {
            let Board { lines, state, .. } = board;
            state.comm.sound_write(lines, data);
        })
        .write(0x2A04, 0x2A04, jsa_control_w)
        .bank(0x3000, 0x3FFF, sound_bank)
        .rom_at(0x4000, 0xFFFF, sound_rom, 0x4000);

    builder
        .input_ports(4)
        .config(MachineConfig {
            slices_per_frame: 10,
            boost_slices_per_frame: 200,
            ..MachineConfig::default()
        })
        .cpu(
            CpuSpec::new("main", 7_159_090 / 60).with_interrupt(1, |board, _| {
                board.lines.assert_interrupt(MAIN, SCANLINE_IRQ_LEVEL, None);
            }),
            main_map,
        )
        .cpu(
            CpuSpec::new("jsa", 1_789_773 / 60).with_interrupt(4, |board, _| {
                board.lines.assert_interrupt(SOUND, 0, None);
            }),
            sound_map,
        );

    builder.build(VindictrBoard {
        sound_bank,
        eeprom: Eeprom::new(EEPROM_SIZE),
        comm: SoundComm::new(MAIN, SOUND, SOUND_IRQ_LEVEL),
    })
}

fn create_machine() -> Result<Box<dyn Machine>, ConfigError> {
    Ok(Box::new(build()?))
}

inventory::submit! {
    MachineEntry::new("vindictr", "Vindicators", create_machine)
}
