//! Return of the Invaders (Taito, 1985): main Z80, sub Z80 and sound Z80.
//!
//! Main and sub CPUs see the same foreground video RAM, work RAM and
//! background video RAM. A 74LS259 at 0xC800 holds both IRQ masks and the
//! (active-low) reset lines of the sub and sound CPUs, so after power-on
//! both stay in reset until the main program releases them.

use arcbus_core::core::config::MachineConfig;
use arcbus_core::core::error::ConfigError;
use arcbus_core::core::machine::{BoardState, Machine};
use arcbus_core::core::system::{CpuSpec, System, SystemBuilder};
use arcbus_core::device::{AddressableLatch, RetofinvProtection, SoundLatch};
use arcbus_core::memory::{AddressMapBuilder, Board, MemoryRegion, RegionId};

use crate::registry::MachineEntry;

pub const MAIN: usize = 0;
pub const SUB: usize = 1;
pub const SOUND: usize = 2;

pub const MAIN_ROM: &str = "maincpu";
pub const SUB_ROM: &str = "subcpu";
pub const SOUND_ROM: &str = "soundcpu";

/// Main-CPU address of the first byte of the shared work RAM.
const SHARED_BASE: u16 = 0x8800;
const SHARED_SIZE: usize = 0x1800;

// Control latch outputs
const LATCH_MAIN_IRQ: u8 = 0;
const LATCH_SUB_IRQ: u8 = 1;
const LATCH_SUB_RESET: u8 = 2;
const LATCH_SOUND_RESET: u8 = 3;
const LATCH_COIN_LOCKOUT: u8 = 4;

pub type RetofinvSystem = System<RetofinvBoard>;

pub struct RetofinvBoard {
    shared: RegionId,
    pub control: AddressableLatch,
    pub soundlatch: SoundLatch,
    pub protection: RetofinvProtection,
    pub flip_screen: bool,
    pub bg_bank: u8,
}

impl BoardState for RetofinvBoard {
    fn power_on(board: &mut Board<Self>) {
        let state = &mut board.state;
        state.control.clear();
        state.soundlatch.clear();
        state.protection.reset();
        state.flip_screen = false;
        state.bg_bank = 0;
        // Latch outputs low: both slave CPUs held in reset.
        board.lines.assert_reset(SUB);
        board.lines.assert_reset(SOUND);
    }
}

/// 0xC800-0xC807: 74LS259 control latch.
fn control_w(board: &mut Board<RetofinvBoard>, offset: u32, data: u8) {
    let Some(level) = board.state.control.write(offset, data) else {
        return;
    };
    match (offset & 0x07) as u8 {
        LATCH_MAIN_IRQ if !level => board.lines.clear_interrupt(MAIN, 0),
        LATCH_SUB_IRQ if !level => board.lines.clear_interrupt(SUB, 0),
        LATCH_SUB_RESET => board.lines.set_reset_line(SUB, !level),
        LATCH_SOUND_RESET => board.lines.set_reset_line(SOUND, !level),
        LATCH_COIN_LOCKOUT => log::debug!("retofinv: coin lockout {}", level),
        _ => {}
    }
}

/// 0xD800: sound command, with an NMI to the sound CPU.
fn soundcommand_w(board: &mut Board<RetofinvBoard>, _offset: u32, data: u8) {
    board.state.soundlatch.write(data);
    board.lines.pulse_nmi(SOUND);
}

/// 0xE800: protection command.
fn protection_w(board: &mut Board<RetofinvBoard>, _offset: u32, data: u8) {
    let Board { regions, state, .. } = board;
    let shared = regions.get(state.shared);
    state
        .protection
        .command(data, |addr| shared.read(usize::from(addr - SHARED_BASE)));
}

fn main_interrupt(board: &mut Board<RetofinvBoard>, _index: u32) {
    if board.state.control.bit(LATCH_MAIN_IRQ) {
        board.lines.hold_interrupt(MAIN, 0, None);
    }
}

fn sub_interrupt(board: &mut Board<RetofinvBoard>, _index: u32) {
    if board.state.control.bit(LATCH_SUB_IRQ) {
        board.lines.hold_interrupt(SUB, 0, None);
    }
}

pub fn build() -> Result<RetofinvSystem, ConfigError> {
    let mut builder = SystemBuilder::<RetofinvBoard>::new("retofinv");

    let main_rom = builder.region(MemoryRegion::rom_blank(MAIN_ROM, 0x6000))?;
    let sub_rom = builder.region(MemoryRegion::rom_blank(SUB_ROM, 0x2000))?;
    let sound_rom = builder.region(MemoryRegion::rom_blank(SOUND_ROM, 0x2000))?;
    let fg = builder.region(MemoryRegion::ram("fgvideoram", 0x800, 0x00))?;
    let shared = builder.region(MemoryRegion::ram("sharedram", SHARED_SIZE, 0x00))?;
    let bg = builder.region(MemoryRegion::ram("bgvideoram", 0x800, 0x00))?;
    let sound_ram = builder.region(MemoryRegion::ram("soundram", 0x800, 0x00))?;

    let fg_window = builder.shared_window("fgvideoram", fg, 0, 0x800)?;
    let shared_window = builder.shared_window("sharedram", shared, 0, SHARED_SIZE)?;
    let bg_window = builder.shared_window("bgvideoram", bg, 0, 0x800)?;

    builder.publish("fgvideoram", fg, 0, 0x400)?;
    builder.publish("fgcolorram", fg, 0x400, 0x400)?;
    builder.publish("bgvideoram", bg, 0, 0x400)?;
    builder.publish("bgcolorram", bg, 0x400, 0x400)?;
    builder.publish("spriteram1", shared, 0x0780, 0x80)?;
    builder.publish("spriteram2", shared, 0x0F80, 0x80)?;
    builder.publish("spriteram3", shared, 0x1780, 0x80)?;

    let main_map = AddressMapBuilder::<RetofinvBoard>::new(MAIN)
        .rom(0x0000, 0x5FFF, main_rom)
        .shared(&fg_window, 0x8000, 0x87FF)
        .shared(&shared_window, 0x8800, 0x9FFF)
        .shared(&bg_window, 0xA000, 0xA7FF)
        .write(0xB800, 0xB800, |board, _, data| {
            board.state.flip_screen = data & 0x01 != 0;
        })
        .write(0xB801, 0xB802, |board, _, data| board.state.bg_bank = data & 0x01)
        .read(0xC000, 0xC007, |board, offset| {
            board.read_input_port(offset as usize)
        })
        .write(0xC800, 0xC807, control_w)
        .write(0xD000, 0xD000, |board, _, _| board.kick_watchdog())
        .write(0xD800, 0xD800, soundcommand_w)
        .read(0xE000, 0xE000, |board, _| board.state.protection.read_data())
        .write(0xE800, 0xE800, protection_w)
        .read(0xF800, 0xF800, |board, _| board.state.protection.status());

    let sub_map = AddressMapBuilder::<RetofinvBoard>::new(SUB)
        .rom(0x0000, 0x1FFF, sub_rom)
        .shared(&fg_window, 0x8000, 0x87FF)
        .shared(&shared_window, 0x8800, 0x9FFF)
        .shared(&bg_window, 0xA000, 0xA7FF);

    let sound_map = AddressMapBuilder::<RetofinvBoard>::new(SOUND)
        .rom(0x0000, 0x1FFF, sound_rom)
        .ram(0x2000, 0x27FF, sound_ram)
        .read(0x4000, 0x4000, |board, _| board.state.soundlatch.read())
        // command acknowledge
        .nop(0x6000, 0x6000)
        // SN76496 x2
        .nop(0x8000, 0x8000)
        .nop(0xA000, 0xA000);

    builder
        .input_ports(8)
        .config(MachineConfig {
            slices_per_frame: 100,
            boost_slices_per_frame: 100,
            ..MachineConfig::default()
        })
        .cpu(
            CpuSpec::new("main", 3_072_000 / 60).with_interrupt(1, main_interrupt),
            main_map,
        )
        .cpu(
            CpuSpec::new("sub", 3_072_000 / 60).with_interrupt(1, sub_interrupt),
            sub_map,
        )
        .cpu(CpuSpec::new("sound", 3_072_000 / 60), sound_map);

    builder.build(RetofinvBoard {
        shared,
        control: AddressableLatch::new(),
        soundlatch: SoundLatch::new(),
        protection: RetofinvProtection::new(),
        flip_screen: false,
        bg_bank: 0,
    })
}

fn create_machine() -> Result<Box<dyn Machine>, ConfigError> {
    Ok(Box::new(build()?))
}

inventory::submit! {
    MachineEntry::new("retofinv", "Return of the Invaders", create_machine)
}
