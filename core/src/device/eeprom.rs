/// Unlock-per-write parallel EEPROM (Atari 2804/2816 style).
///
/// A write anywhere in the enable range arms the chip for exactly one data
/// write; data writes while locked are ignored. Contents persist across
/// machine resets (only the lock is restored), and can be saved/loaded like
/// battery-backed RAM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eeprom {
    data: Vec<u8>,
    unlocked: bool,
}

/// Value of an unprogrammed cell.
pub const ERASED: u8 = 0xFF;

impl Eeprom {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![ERASED; size],
            unlocked: false,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Enable-range write: allow the next data write.
    pub fn unlock(&mut self) {
        self.unlocked = true;
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Offset wraps at the chip size.
    pub fn read(&self, offset: usize) -> u8 {
        if self.data.is_empty() {
            return ERASED;
        }
        self.data[offset % self.data.len()]
    }

    pub fn write(&mut self, offset: usize, value: u8) {
        if !self.unlocked {
            log::trace!("eeprom: locked write {offset:#X} = {value:#04X} ignored");
            return;
        }
        self.unlocked = false;
        let len = self.data.len();
        if len == 0 {
            return;
        }
        self.data[offset % len] = value;
    }

    /// Machine reset relocks the chip; contents stay.
    pub fn reset(&mut self) {
        self.unlocked = false;
    }

    /// Load contents (e.g. from a save file). A short image leaves the
    /// remaining cells untouched; a long one is truncated.
    pub fn load_from(&mut self, src: &[u8]) {
        let len = src.len().min(self.data.len());
        self.data[..len].copy_from_slice(&src[..len]);
    }

    pub fn snapshot(&self) -> &[u8] {
        &self.data
    }
}
