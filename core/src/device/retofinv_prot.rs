/// Return of the Invaders protection device, simulated as a command table.
///
/// The main CPU writes a command byte; the device answers with one byte that
/// the main CPU reads back from the data port. Every command is a plain
/// assignment of the result register, so repeating a command changes
/// nothing.
///
/// | Command            | Result                               |
/// |--------------------|--------------------------------------|
/// | `0x00..=0x0F`      | nibble echoed into both halves       |
/// | `0x30`             | `0x00`                               |
/// | `0x40/0x41/0x42`   | main-CPU RAM at `0x9800/0x9801/0x9802` |
/// | anything else      | `0x3B`                               |
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetofinvProtection {
    result: u8,
    data_ready: bool,
}

/// Result for unrecognized commands.
pub const FALLBACK: u8 = 0x3B;

const STATUS_DATA_READY: u8 = 0x10;
const STATUS_COMMAND_READY: u8 = 0x20;

impl RetofinvProtection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Execute `cmd`. `read_main` reads the main CPU's address space (only
    /// the shared work RAM cells listed above are ever requested).
    pub fn command(&mut self, cmd: u8, read_main: impl FnOnce(u16) -> u8) {
        self.result = match cmd {
            0x00..=0x0F => (cmd << 4) | cmd,
            0x30 => 0x00,
            0x40 => read_main(0x9800),
            0x41 => read_main(0x9801),
            0x42 => read_main(0x9802),
            _ => {
                log::trace!("retofinv protection: unknown command {cmd:#04X}");
                FALLBACK
            }
        };
        self.data_ready = true;
    }

    /// Data port read; clears the data-ready flag.
    pub fn read_data(&mut self) -> u8 {
        self.data_ready = false;
        self.result
    }

    /// Status port: bit 4 = result waiting, bit 5 = ready for a command.
    pub fn status(&self) -> u8 {
        let ready = if self.data_ready { STATUS_DATA_READY } else { 0 };
        STATUS_COMMAND_READY | ready
    }

    pub fn result(&self) -> u8 {
        self.result
    }
}
