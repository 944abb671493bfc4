/// 74LS259 8-bit addressable latch.
///
/// Address lines A0-A2 select one output bit; data bit 0 is its new level.
/// Boards wire the outputs to IRQ masks, reset lines, coin lockouts, etc.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddressableLatch {
    bits: u8,
}

impl AddressableLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output `offset & 7` to `data & 1`. Returns the new level if the
    /// output changed.
    pub fn write(&mut self, offset: u32, data: u8) -> Option<bool> {
        let mask = 1u8 << (offset & 0x07);
        let level = data & 0x01 != 0;
        let before = self.bits;
        if level {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
        (before != self.bits).then_some(level)
    }

    pub fn bit(&self, n: u8) -> bool {
        self.bits & (1 << (n & 0x07)) != 0
    }

    pub fn value(&self) -> u8 {
        self.bits
    }

    /// Power-on: all outputs low.
    pub fn clear(&mut self) {
        self.bits = 0;
    }
}

/// One-byte command latch between two CPUs (main writes, sound reads).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SoundLatch {
    value: u8,
}

impl SoundLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, data: u8) {
        self.value = data;
    }

    pub fn read(&self) -> u8 {
        self.value
    }

    pub fn clear(&mut self) {
        self.value = 0;
    }
}
