/// One 8-bit bidirectional GPIO port.
///
/// The chip drives `output` on pins whose direction bit is 1; the other pins
/// are sampled from `input`, which the outside world drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GpioPort {
    pub output: u8, // latched by the owning chip
    pub input: u8,  // driven externally
    pub ddr: u8,    // 0=input, 1=output
}

impl GpioPort {
    /// Port with all pins configured as inputs and the output latch preset.
    pub fn with_output(output: u8) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }

    /// Pin levels as seen by the owning chip.
    pub fn read(&self) -> u8 {
        (self.output & self.ddr) | (self.input & !self.ddr)
    }

    /// Level the chip drives onto the pins (inputs float high).
    pub fn pins(&self) -> u8 {
        (self.output & self.ddr) | !self.ddr
    }
}
