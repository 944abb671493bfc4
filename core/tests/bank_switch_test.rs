use arcbus_core::core::error::ConfigError;
use arcbus_core::core::machine::BoardState;
use arcbus_core::core::system::{CpuSpec, System, SystemBuilder};
use arcbus_core::memory::{AddressMapBuilder, BankId, Board, MemoryRegion};
use test_log::test;

const PAGE: usize = 0x1000;
const PAGES: usize = 4;

struct Banked {
    bank: BankId,
    ram_bank: BankId,
}

impl BoardState for Banked {}

/// Program ROM: 0x4000 fixed bytes, then four 4KB pages each filled with
/// `0x10 * page` plus the low bits of the offset.
fn rom_image() -> Vec<u8> {
    let mut rom = vec![0xEE; 0x4000];
    for page in 0..PAGES {
        rom.extend((0..PAGE).map(|i| (0x10 * page as u8) | (i & 0x0F) as u8));
    }
    rom
}

/// 0x0000-0x3FFF fixed ROM, 0x8000-0x8FFF banked ROM, 0xA000-0xA3FF banked
/// RAM (two pages), bank select at 0xF000 and 0xF001.
fn build() -> System<Banked> {
    let mut builder = SystemBuilder::<Banked>::new("banktest");
    let rom = builder.region(MemoryRegion::rom("rom", &rom_image())).unwrap();
    let ram = builder.region(MemoryRegion::ram("ram", 0x800, 0x00)).unwrap();
    let bank = builder.bank("rombank", rom, 0x4000, PAGE, PAGES).unwrap();
    let ram_bank = builder.bank("rambank", ram, 0, 0x400, 2).unwrap();

    let map = AddressMapBuilder::<Banked>::new(0)
        .rom(0x0000, 0x3FFF, rom)
        .bank(0x8000, 0x8FFF, bank)
        .bank_ram(0xA000, 0xA3FF, ram_bank)
        .write(0xF000, 0xF000, |board, _, data| {
            let bank = board.state.bank;
            board.select_bank(bank, usize::from(data));
        })
        .write(0xF001, 0xF001, |board, _, data| {
            let bank = board.state.ram_bank;
            board.select_bank(bank, usize::from(data));
        });
    builder.cpu(CpuSpec::new("main", 1000), map);
    builder.build(Banked { bank, ram_bank }).unwrap()
}

#[test]
fn test_window_follows_selected_page() {
    let mut sys = build();
    for page in 0..PAGES as u8 {
        sys.write_byte(0, 0xF000, page);
        for offset in [0x000, 0x005, 0x7FF, 0xFFF] {
            let expected = (0x10 * page) | (offset & 0x0F) as u8;
            assert_eq!(sys.read_byte(0, 0x8000 + offset), expected, "page {page}");
        }
    }
}

#[test]
fn test_bank_starts_on_page_zero() {
    let mut sys = build();
    assert_eq!(sys.read_byte(0, 0x8003), 0x03);
    let bank = sys.state().bank;
    assert_eq!(sys.board().banks.get(bank).current(), 0);
}

#[test]
fn test_reselecting_same_page_changes_nothing() {
    let mut sys = build();
    sys.write_byte(0, 0xF000, 2);
    let before = sys.read_byte(0, 0x8001);
    sys.write_byte(0, 0xF000, 2);
    assert_eq!(sys.read_byte(0, 0x8001), before);
    assert_eq!(before, 0x21);
}

#[test]
fn test_out_of_range_page_keeps_previous_mapping() {
    let mut sys = build();
    sys.write_byte(0, 0xF000, 1);
    sys.write_byte(0, 0xF000, 7);
    assert_eq!(sys.read_byte(0, 0x8000), 0x10);
    let bank = sys.state().bank;
    assert_eq!(sys.board().banks.get(bank).current(), 1);
}

#[test]
fn test_banked_rom_ignores_writes() {
    let mut sys = build();
    sys.write_byte(0, 0x8000, 0x99);
    assert_eq!(sys.read_byte(0, 0x8000), 0x00);
}

#[test]
fn test_banked_ram_pages_are_independent() {
    let mut sys = build();
    sys.write_byte(0, 0xA010, 0x11);
    sys.write_byte(0, 0xF001, 1);
    assert_eq!(sys.read_byte(0, 0xA010), 0x00);
    sys.write_byte(0, 0xA010, 0x22);
    sys.write_byte(0, 0xF001, 0);
    assert_eq!(sys.read_byte(0, 0xA010), 0x11);

    let ram = sys.board().regions.require("ram").unwrap();
    assert_eq!(sys.board().region(ram).read(0x410), 0x22);
}

#[test]
fn test_reset_returns_banks_to_page_zero() {
    let mut sys = build();
    sys.write_byte(0, 0xF000, 3);
    sys.reset();
    assert_eq!(sys.read_byte(0, 0x8000), 0x00);
}

#[test]
fn test_pages_must_fit_region() {
    let mut builder = SystemBuilder::<()>::new("bad");
    let rom = builder.region(MemoryRegion::rom_blank("rom", 0x8000)).unwrap();
    assert_eq!(
        builder.bank("bank", rom, 0x4000, 0x2000, 3).err(),
        Some(ConfigError::BankExceedsRegion {
            name: "bank".to_string(),
            base: 0x4000,
            page_size: 0x2000,
            count: 3,
            region_len: 0x8000,
        })
    );
}

#[test]
fn test_window_larger_than_page_rejected() {
    let mut builder = SystemBuilder::<()>::new("bad");
    let rom = builder.region(MemoryRegion::rom_blank("rom", 0x8000)).unwrap();
    let bank = builder.bank("bank", rom, 0, 0x1000, 8).unwrap();
    let map = AddressMapBuilder::<()>::new(0).bank(0x8000, 0x9FFF, bank);
    builder.cpu(CpuSpec::new("main", 100), map);
    assert!(matches!(
        builder.build(()).err(),
        Some(ConfigError::BankWindowTooLarge { cpu: 0, page_size: 0x1000, .. })
    ));
}
