//! Gun.Smoke (Capcom, 1985): main Z80 + sound Z80.
//!
//! The main CPU has a 16KB banked ROM window and talks to the sound CPU
//! through a one-byte command latch the sound program polls. The board also
//! reads a 3-byte table at 0xC4C9 that real hardware answers from an
//! unidentified device; the game only checks it against fixed values, so it
//! is a plain ROM region here.

use arcbus_core::core::config::MachineConfig;
use arcbus_core::core::error::ConfigError;
use arcbus_core::core::machine::{BoardState, Machine};
use arcbus_core::core::system::{CpuSpec, System, SystemBuilder};
use arcbus_core::device::SoundLatch;
use arcbus_core::memory::{AddressMapBuilder, BankId, Board, MemoryRegion};

use crate::registry::MachineEntry;

pub const MAIN: usize = 0;
pub const SOUND: usize = 1;

/// Main program: fixed 32KB followed by four 16KB banks.
pub const MAIN_ROM: &str = "maincpu";
pub const SOUND_ROM: &str = "soundcpu";

const MAIN_ROM_SIZE: usize = 0x18000;
const BANK_BASE: usize = 0x8000;
const BANK_SIZE: usize = 0x4000;
const BANK_COUNT: usize = 4;

/// Contents expected at 0xC4C9-0xC4CB.
const C4C9_TABLE: [u8; 3] = [0xFF, 0x00, 0x00];

/// Z80 IM0 opcode placed on the bus with the main IRQ (RST 10h).
pub const MAIN_IRQ_VECTOR: u8 = 0xD7;

const MAIN_CLOCK: u32 = 4_000_000;
const SOUND_CLOCK: u32 = 3_000_000;
const FPS: u32 = 60;

pub type GunsmokeSystem = System<GunsmokeBoard>;

pub struct GunsmokeBoard {
    bank: BankId,
    pub soundlatch: SoundLatch,
    pub coin_counters: u8,
    pub flip_screen: bool,
    pub chars_on: bool,
    pub bg_on: bool,
    pub sprites_on: bool,
}

impl GunsmokeBoard {
    fn new(bank: BankId) -> Self {
        Self {
            bank,
            soundlatch: SoundLatch::new(),
            coin_counters: 0,
            flip_screen: false,
            chars_on: false,
            bg_on: false,
            sprites_on: false,
        }
    }
}

impl BoardState for GunsmokeBoard {
    fn power_on(board: &mut Board<Self>) {
        board.state = Self::new(board.state.bank);
    }
}

/// 0xC804: coin counters, ROM bank, screen flip, character layer.
fn c804_w(board: &mut Board<GunsmokeBoard>, _offset: u32, data: u8) {
    // bits 0-1: coin counters; bit 5 unknown
    board.state.coin_counters = data & 0x03;

    let bank = board.state.bank;
    board.select_bank(bank, usize::from((data & 0x0C) >> 2));

    board.state.flip_screen = data & 0x40 != 0;
    board.state.chars_on = data & 0x80 != 0;
}

/// 0xD806: layer enables.
fn d806_w(board: &mut Board<GunsmokeBoard>, _offset: u32, data: u8) {
    board.state.bg_on = data & 0x10 != 0;
    board.state.sprites_on = data & 0x20 != 0;
}

pub fn build() -> Result<GunsmokeSystem, ConfigError> {
    let mut builder = SystemBuilder::<GunsmokeBoard>::new("gunsmoke");

    let main_rom = builder.region(MemoryRegion::rom_blank(MAIN_ROM, MAIN_ROM_SIZE))?;
    let table = builder.region(MemoryRegion::rom("c4c9_table", &C4C9_TABLE))?;
    let videoram = builder.region(MemoryRegion::ram("videoram", 0x400, 0x00))?;
    let colorram = builder.region(MemoryRegion::ram("colorram", 0x400, 0x00))?;
    let scroll = builder.region(MemoryRegion::ram("scroll", 3, 0x00))?;
    let main_ram = builder.region(MemoryRegion::ram("mainram", 0x1000, 0x00))?;
    let spriteram = builder.region(MemoryRegion::ram("spriteram", 0x1000, 0x00))?;
    let sound_rom = builder.region(MemoryRegion::rom_blank(SOUND_ROM, 0x8000))?;
    let sound_ram = builder.region(MemoryRegion::ram("soundram", 0x800, 0x00))?;

    let bank = builder.bank("bank1", main_rom, BANK_BASE, BANK_SIZE, BANK_COUNT)?;

    builder.publish("videoram", videoram, 0, 0x400)?;
    builder.publish("colorram", colorram, 0, 0x400)?;
    builder.publish("scroll", scroll, 0, 3)?;
    builder.publish("spriteram", spriteram, 0, 0x1000)?;

    let main_map = AddressMapBuilder::<GunsmokeBoard>::new(MAIN)
        .rom(0x0000, 0x7FFF, main_rom)
        .bank(0x8000, 0xBFFF, bank)
        .read(0xC000, 0xC004, |board, offset| {
            board.read_input_port(offset as usize)
        })
        .rom(0xC4C9, 0xC4CB, table)
        .write(0xC800, 0xC800, |board, _, data| board.state.soundlatch.write(data))
        .write(0xC804, 0xC804, c804_w)
        .write(0xC806, 0xC806, |board, _, _| board.kick_watchdog())
        .ram(0xD000, 0xD3FF, videoram)
        .ram(0xD400, 0xD7FF, colorram)
        .ram(0xD800, 0xD802, scroll)
        .write(0xD806, 0xD806, d806_w)
        .ram(0xE000, 0xEFFF, main_ram)
        .ram(0xF000, 0xFFFF, spriteram);

    let sound_map = AddressMapBuilder::<GunsmokeBoard>::new(SOUND)
        .rom(0x0000, 0x7FFF, sound_rom)
        .ram(0xC000, 0xC7FF, sound_ram)
        .read(0xC800, 0xC800, |board, _| board.state.soundlatch.read())
        // YM2203 x2
        .nop(0xE000, 0xE003);

    builder
        .input_ports(5)
        .config(MachineConfig {
            slices_per_frame: 4,
            boost_slices_per_frame: 4,
            ..MachineConfig::default()
        })
        .cpu(
            CpuSpec::new("main", MAIN_CLOCK / FPS).with_interrupt(1, |board, _| {
                board.lines.hold_interrupt(MAIN, 0, Some(MAIN_IRQ_VECTOR));
            }),
            main_map,
        )
        .cpu(
            CpuSpec::new("sound", SOUND_CLOCK / FPS).with_interrupt(4, |board, _| {
                board.lines.hold_interrupt(SOUND, 0, None);
            }),
            sound_map,
        );

    builder.build(GunsmokeBoard::new(bank))
}

fn create_machine() -> Result<Box<dyn Machine>, ConfigError> {
    Ok(Box::new(build()?))
}

inventory::submit! {
    MachineEntry::new("gunsmoke", "Gun.Smoke", create_machine)
}
