//! 68705 protection MCU, host side of the port-B handshake.
//!
//! The MCU talks to the host through port A (data) and port B (strobes).
//! Only the port B *edges* matter; each strobe is gated by its DDR-B bit, so
//! a pin configured as input never triggers anything:
//!
//! | Bit | Edge    | Action                                                  |
//! |-----|---------|---------------------------------------------------------|
//! | 0   | falling | port A input := latch                                   |
//! | 1   | rising  | address := port A output                                |
//! | 3   | falling | bit 4 set: latch := shared RAM\[address\] (bit 2 set)   |
//! |     |         | or input port `(address & 1) + 1` (bit 2 clear);        |
//! |     |         | bit 4 clear: shared RAM\[address\] := port A output     |
//! | 5   | rising  | interrupt the host with vector shared RAM\[0\]          |
//! | 6,7 | falling | unknown strobes, logged only                            |
//!
//! Port B's output latch powers up as all ones (pull-ups), so the first
//! write of a 0 to a strobe bit is already a falling edge.

use crate::device::gpio::GpioPort;

/// Everything on the host side of the protocol.
pub trait McuHost {
    fn read_shared(&mut self, address: u8) -> u8;
    fn write_shared(&mut self, address: u8, data: u8);
    fn read_input(&mut self, port: usize) -> u8;
    /// Raise the host CPU's interrupt with `vector`.
    fn interrupt_host(&mut self, vector: u8);
}

const PORT_B_POWER_ON: u8 = 0xFF;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mcu68705 {
    port_a: GpioPort,
    port_b: GpioPort,
    latch: u8,
    address: u8,
}

impl Default for Mcu68705 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mcu68705 {
    pub fn new() -> Self {
        Self {
            port_a: GpioPort::default(),
            port_b: GpioPort::with_output(PORT_B_POWER_ON),
            latch: 0,
            address: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn read_port_a(&self) -> u8 {
        self.port_a.read()
    }

    pub fn write_port_a(&mut self, data: u8) {
        self.port_a.output = data;
    }

    pub fn write_ddr_a(&mut self, data: u8) {
        self.port_a.ddr = data;
    }

    pub fn read_port_b(&self) -> u8 {
        self.port_b.read()
    }

    pub fn write_ddr_b(&mut self, data: u8) {
        self.port_b.ddr = data;
    }

    /// Port B write: run every strobe whose edge `data` produces, then latch
    /// `data` as the new previous state.
    pub fn write_port_b(&mut self, data: u8, host: &mut dyn McuHost) {
        let previous = self.port_b.output;
        let ddr = self.port_b.ddr;
        let falling = |mask: u8| ddr & mask != 0 && data & mask == 0 && previous & mask != 0;
        let rising = |mask: u8| ddr & mask != 0 && data & mask != 0 && previous & mask == 0;

        if falling(0x01) {
            self.port_a.input = self.latch;
        }
        if rising(0x02) {
            self.address = self.port_a.output;
        }
        if falling(0x08) {
            if data & 0x10 != 0 {
                self.latch = if data & 0x04 != 0 {
                    host.read_shared(self.address)
                } else {
                    host.read_input(usize::from(self.address & 1) + 1)
                };
            } else {
                host.write_shared(self.address, self.port_a.output);
            }
        }
        if rising(0x20) {
            let vector = host.read_shared(0);
            host.interrupt_host(vector);
        }
        if falling(0x40) {
            log::warn!("68705: unknown port B strobe, bit 6 (data {data:#04X})");
        }
        if falling(0x80) {
            log::warn!("68705: unknown port B strobe, bit 7 (data {data:#04X})");
        }

        self.port_b.output = data;
    }

    pub fn latch(&self) -> u8 {
        self.latch
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// What the host currently drives onto port A.
    pub fn port_a_input(&self) -> u8 {
        self.port_a.input
    }
}
