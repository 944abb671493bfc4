use arcbus_core::core::bus::Access;
use arcbus_core::core::config::MachineConfig;
use arcbus_core::core::error::ConfigError;
use arcbus_core::core::machine::BoardState;
use arcbus_core::core::system::{CpuSpec, System, SystemBuilder};
use arcbus_core::memory::{AddressMapBuilder, Board, Handler, MemoryRegion};
use test_log::test;

#[derive(Default)]
struct Probe {
    last_write: Option<(u32, u8)>,
    reads: u32,
}

impl BoardState for Probe {}

fn probe_read(board: &mut Board<Probe>, offset: u32) -> u8 {
    board.state.reads += 1;
    0x80 | offset as u8
}

fn probe_write(board: &mut Board<Probe>, offset: u32, data: u8) {
    board.state.last_write = Some((offset, data));
}

/// CPU 0: ROM 0x0000-0x0FFF, RAM 0x2000-0x27FF, constant table 0x3000-0x3002,
/// read port 0x4000-0x400F, write port 0x4000-0x4000.
/// CPU 1: RAM 0x0000-0x00FF only.
fn build(config: MachineConfig) -> System<Probe> {
    let mut builder = SystemBuilder::<Probe>::new("maptest");
    let rom: Vec<u8> = (0..0x1000).map(|i| (i & 0xFF) as u8).collect();
    let rom = builder.region(MemoryRegion::rom("rom", &rom)).unwrap();
    let ram = builder.region(MemoryRegion::ram("ram", 0x800, 0x00)).unwrap();
    let table = builder
        .region(MemoryRegion::rom("table", &[0xFF, 0x00, 0x00]))
        .unwrap();
    let ram1 = builder.region(MemoryRegion::ram("ram1", 0x100, 0x00)).unwrap();

    let map0 = AddressMapBuilder::<Probe>::new(0)
        .rom(0x0000, 0x0FFF, rom)
        .ram(0x2000, 0x27FF, ram)
        .rom(0x3000, 0x3002, table)
        .read(0x4000, 0x400F, probe_read)
        .write(0x4000, 0x4000, probe_write);
    let map1 = AddressMapBuilder::<Probe>::new(1).ram(0x0000, 0x00FF, ram1);

    builder
        .config(config)
        .cpu(CpuSpec::new("cpu0", 1000), map0)
        .cpu(CpuSpec::new("cpu1", 1000), map1);
    builder.build(Probe::default()).unwrap()
}

#[test]
fn test_unmapped_reads_return_open_bus_on_every_cpu() {
    let mut sys = build(MachineConfig::default());
    for addr in [0x1000, 0x1FFF, 0x2800, 0x3003, 0x4010, 0xFFFF] {
        assert_eq!(sys.read_byte(0, addr), 0xFF, "cpu0 {addr:#06X}");
    }
    for addr in [0x0100, 0x8000, 0xFFFF] {
        assert_eq!(sys.read_byte(1, addr), 0xFF, "cpu1 {addr:#06X}");
    }
}

#[test]
fn test_unmapped_writes_are_no_ops() {
    let mut sys = build(MachineConfig::default());
    sys.write_byte(0, 0x1000, 0x12);
    sys.write_byte(1, 0x0100, 0x34);
    assert_eq!(sys.read_byte(0, 0x1000), 0xFF);
    assert_eq!(sys.read_byte(1, 0x0100), 0xFF);
    for region in sys.board().regions.iter() {
        assert!(region.as_slice().iter().all(|&b| b == 0) || region.name() == "rom"
            || region.name() == "table");
    }
}

#[test]
fn test_open_bus_value_is_configurable() {
    let mut sys = build(MachineConfig {
        open_bus: 0x00,
        ..MachineConfig::default()
    });
    assert_eq!(sys.read_byte(0, 0x1000), 0x00);
}

#[test]
fn test_rom_reads_backing_and_ignores_writes() {
    let mut sys = build(MachineConfig::default());
    assert_eq!(sys.read_byte(0, 0x0123), 0x23);
    sys.write_byte(0, 0x0123, 0x99);
    assert_eq!(sys.read_byte(0, 0x0123), 0x23);
}

#[test]
fn test_ram_uses_local_offset() {
    let mut sys = build(MachineConfig::default());
    sys.write_byte(0, 0x2010, 0xAB);
    let ram = sys.board().regions.require("ram").unwrap();
    assert_eq!(sys.board().region(ram).read(0x10), 0xAB);
    assert_eq!(sys.read_byte(0, 0x2010), 0xAB);
}

#[test]
fn test_constant_table_is_plain_rom() {
    let mut sys = build(MachineConfig::default());
    assert_eq!(sys.read_byte(0, 0x3000), 0xFF);
    assert_eq!(sys.read_byte(0, 0x3001), 0x00);
    assert_eq!(sys.read_byte(0, 0x3002), 0x00);
    sys.write_byte(0, 0x3000, 0x00);
    assert_eq!(sys.read_byte(0, 0x3000), 0xFF);
}

#[test]
fn test_read_and_write_handlers_share_address() {
    let mut sys = build(MachineConfig::default());
    assert_eq!(sys.read_byte(0, 0x4005), 0x85);
    sys.write_byte(0, 0x4000, 0x42);
    assert_eq!(sys.state().last_write, Some((0, 0x42)));
    assert_eq!(sys.state().reads, 1);
    // Write-only at 0x4001: writes there are unmapped.
    sys.write_byte(0, 0x4001, 0x43);
    assert_eq!(sys.state().last_write, Some((0, 0x42)));
}

#[test]
fn test_resolve_is_direction_aware() {
    let sys = build(MachineConfig::default());
    let map = sys.map(0).unwrap();
    assert!(matches!(
        map.resolve(0x4000, Access::Read).map(|e| e.handler),
        Some(Handler::Read(_))
    ));
    assert!(matches!(
        map.resolve(0x4000, Access::Write).map(|e| e.handler),
        Some(Handler::Write(_))
    ));
    assert!(map.resolve(0x0000, Access::Write).is_none());
}

fn build_single(map: AddressMapBuilder<()>) -> Result<System<()>, ConfigError> {
    let mut builder = SystemBuilder::<()>::new("single");
    builder.cpu(CpuSpec::new("cpu0", 100), map);
    builder.build(())
}

#[test]
fn test_overlapping_ranges_rejected() {
    let mut builder = SystemBuilder::<()>::new("overlap");
    let ram = builder.region(MemoryRegion::ram("ram", 0x1000, 0)).unwrap();
    let map = AddressMapBuilder::<()>::new(0)
        .ram(0x0000, 0x0FFF, ram)
        .read(0x0800, 0x0800, |_, _| 0);
    builder.cpu(CpuSpec::new("cpu0", 100), map);
    assert_eq!(
        builder.build(()).err(),
        Some(ConfigError::OverlappingRange {
            cpu: 0,
            access: Access::Read,
            start: 0x0800,
            end: 0x0800,
            other_start: 0x0000,
            other_end: 0x0FFF,
        })
    );
}

#[test]
fn test_overlap_in_one_direction_only_is_allowed() {
    let map = AddressMapBuilder::<()>::new(0)
        .read(0x0000, 0x00FF, |_, _| 0)
        .nop(0x0000, 0x00FF);
    assert!(build_single(map).is_ok());
}

#[test]
fn test_inverted_range_rejected() {
    let map = AddressMapBuilder::<()>::new(0).nop(0x2000, 0x1000);
    assert_eq!(
        build_single(map).err(),
        Some(ConfigError::InvalidRange {
            cpu: 0,
            start: 0x2000,
            end: 0x1000,
        })
    );
}

#[test]
fn test_backing_region_too_small_rejected() {
    let mut builder = SystemBuilder::<()>::new("small");
    let ram = builder.region(MemoryRegion::ram("ram", 0x400, 0)).unwrap();
    let map = AddressMapBuilder::<()>::new(0).ram(0x0000, 0x07FF, ram);
    builder.cpu(CpuSpec::new("cpu0", 100), map);
    let err = builder.build(()).err().unwrap();
    assert!(matches!(
        err,
        ConfigError::RegionTooSmall {
            cpu: 0,
            needed: 0x800,
            available: 0x400,
            ..
        }
    ));
    // The message names the offending range.
    assert!(err.to_string().contains("0x0000-0x07FF"));
}

#[test]
fn test_map_for_wrong_slot_rejected() {
    let map = AddressMapBuilder::<()>::new(3).nop(0, 0);
    assert_eq!(build_single(map).err(), Some(ConfigError::UnknownCpu(3)));
}
