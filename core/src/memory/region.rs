use crate::core::error::ConfigError;

/// Whether a region survives a machine reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    /// Refilled with its fill byte on reset.
    Ram,
    /// Loaded once (ROM image or constant table); never cleared.
    Rom,
}

/// A flat byte buffer: one ROM image, one RAM chip, or a constant table.
///
/// Regions are allocated while the machine is being configured and live as
/// long as the machine. Address maps refer to them by [`RegionId`] only.
#[derive(Debug, Clone)]
pub struct MemoryRegion {
    name: &'static str,
    kind: RegionKind,
    fill: u8,
    data: Vec<u8>,
}

impl MemoryRegion {
    /// Zero- (or `fill`-) initialized RAM.
    pub fn ram(name: &'static str, size: usize, fill: u8) -> Self {
        Self {
            name,
            kind: RegionKind::Ram,
            fill,
            data: vec![fill; size],
        }
    }

    /// ROM with initial contents.
    pub fn rom(name: &'static str, data: &[u8]) -> Self {
        Self {
            name,
            kind: RegionKind::Rom,
            fill: 0,
            data: data.to_vec(),
        }
    }

    /// Empty ROM of a fixed size, to be filled later with [`load`](Self::load).
    pub fn rom_blank(name: &'static str, size: usize) -> Self {
        Self {
            name,
            kind: RegionKind::Rom,
            fill: 0,
            data: vec![0; size],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn read(&self, offset: usize) -> u8 {
        self.data[offset]
    }

    pub fn write(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
    }

    /// Replace the whole contents. The image must match the region size.
    pub fn load(&mut self, data: &[u8]) -> Result<(), ConfigError> {
        if data.len() != self.data.len() {
            return Err(ConfigError::RegionSizeMismatch {
                region: self.name.to_string(),
                expected: self.data.len(),
                actual: data.len(),
            });
        }
        self.data.copy_from_slice(data);
        Ok(())
    }

    /// Power-on state: RAM is refilled, ROM is untouched.
    pub fn clear(&mut self) {
        if self.kind == RegionKind::Ram {
            self.data.fill(self.fill);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Handle to a region inside a [`RegionStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionId(usize);

/// Arena owning every region of one machine.
#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    regions: Vec<MemoryRegion>,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, region: MemoryRegion) -> Result<RegionId, ConfigError> {
        if self.find(region.name).is_some() {
            return Err(ConfigError::DuplicateName(region.name.to_string()));
        }
        self.regions.push(region);
        Ok(RegionId(self.regions.len() - 1))
    }

    pub fn get(&self, id: RegionId) -> &MemoryRegion {
        &self.regions[id.0]
    }

    pub fn get_mut(&mut self, id: RegionId) -> &mut MemoryRegion {
        &mut self.regions[id.0]
    }

    pub fn find(&self, name: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.name == name)
            .map(RegionId)
    }

    pub fn require(&self, name: &str) -> Result<RegionId, ConfigError> {
        self.find(name)
            .ok_or_else(|| ConfigError::UnknownRegion(name.to_string()))
    }

    /// Refill every RAM region.
    pub fn clear_ram(&mut self) {
        for region in &mut self.regions {
            region.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryRegion> {
        self.regions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_starts_with_fill_byte() {
        let ram = MemoryRegion::ram("work", 16, 0xA5);
        assert!(ram.as_slice().iter().all(|&b| b == 0xA5));
        assert_eq!(ram.kind(), RegionKind::Ram);
    }

    #[test]
    fn clear_refills_ram_only() {
        let mut ram = MemoryRegion::ram("work", 4, 0x00);
        let mut rom = MemoryRegion::rom("prog", &[1, 2, 3, 4]);
        ram.write(2, 0x42);
        rom.write(2, 0x42);
        ram.clear();
        rom.clear();
        assert_eq!(ram.read(2), 0x00);
        assert_eq!(rom.read(2), 0x42);
    }

    #[test]
    fn load_requires_exact_size() {
        let mut rom = MemoryRegion::rom_blank("prog", 4);
        assert!(rom.load(&[1, 2, 3, 4]).is_ok());
        assert_eq!(rom.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(
            rom.load(&[1, 2, 3]),
            Err(ConfigError::RegionSizeMismatch {
                region: "prog".to_string(),
                expected: 4,
                actual: 3,
            })
        );
    }

    #[test]
    fn store_lookup_by_name() {
        let mut store = RegionStore::new();
        let a = store.add(MemoryRegion::ram("a", 1, 0)).unwrap();
        let b = store.add(MemoryRegion::ram("b", 2, 0)).unwrap();
        assert_eq!(store.find("a"), Some(a));
        assert_eq!(store.find("b"), Some(b));
        assert_eq!(store.find("c"), None);
        assert!(matches!(
            store.require("c"),
            Err(ConfigError::UnknownRegion(_))
        ));
    }

    #[test]
    fn store_rejects_duplicate_names() {
        let mut store = RegionStore::new();
        store.add(MemoryRegion::ram("a", 1, 0)).unwrap();
        assert_eq!(
            store.add(MemoryRegion::ram("a", 1, 0)),
            Err(ConfigError::DuplicateName("a".to_string()))
        );
    }
}
