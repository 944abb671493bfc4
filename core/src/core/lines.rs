//! Interrupt, reset and halt lines between CPUs.
//!
//! Handlers running on one CPU drive the lines of another CPU (sound command
//! latches raising an NMI, a reset-lines register holding the sound CPU in
//! reset, ...). Those writes land in a *pending* set. A CPU only ever sees
//! its *latched* set, which is refreshed from the pending set by
//! [`InterruptCoordinator::begin_slice`] at the start of that CPU's next
//! slice. Nothing a handler does can change what an already-running slice
//! observes.
//!
//! IRQ requests come in three flavours: asserted lines follow the device,
//! pulses live for one slice, and held requests wait for the CPU to take them.

use crate::core::bus::InterruptState;

/// Number of IRQ priority levels tracked per CPU (68000 uses 1-7, 8-bit
/// CPUs use level 0 only).
pub const IRQ_LEVELS: usize = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineState {
    #[default]
    Cleared,
    Asserted,
    /// Delivered for exactly one slice, then cleared automatically.
    Pulsed,
    /// Stays up across slices until the CPU acknowledges it.
    Held,
}

impl LineState {
    pub fn is_active(self) -> bool {
        self != Self::Cleared
    }
}

/// Execution state of a CPU as seen by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecState {
    Running,
    Halted,
    ResetAsserted,
}

/// What the scheduler must do before running a CPU's slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceStart {
    pub state: ExecState,
    /// Reset the CPU core before executing (reset pulsed or released).
    pub reset_core: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LineSet {
    irq: [LineState; IRQ_LEVELS],
    vectors: [Option<u8>; IRQ_LEVELS],
    nmi: LineState,
    reset: LineState,
    halt: LineState,
}

impl LineSet {
    fn interrupt_state(&self) -> InterruptState {
        let level = (0..IRQ_LEVELS).rev().find(|&l| self.irq[l].is_active());
        InterruptState {
            nmi: self.nmi.is_active(),
            irq: level.is_some(),
            irq_level: level.unwrap_or(0) as u8,
            irq_vector: level.and_then(|l| self.vectors[l]),
        }
    }

    fn exec_state(&self) -> ExecState {
        // A pulsed reset resets the core and lets it run; only a held line
        // keeps the CPU off the bus.
        if self.reset == LineState::Asserted {
            ExecState::ResetAsserted
        } else if self.halt.is_active() {
            ExecState::Halted
        } else {
            ExecState::Running
        }
    }

    fn consume_pulses(&mut self) {
        for level in 0..IRQ_LEVELS {
            if self.irq[level] == LineState::Pulsed {
                self.irq[level] = LineState::Cleared;
                self.vectors[level] = None;
            }
        }
        for line in [&mut self.nmi, &mut self.reset, &mut self.halt] {
            if *line == LineState::Pulsed {
                *line = LineState::Cleared;
            }
        }
    }
}

/// Interrupt Coordinator: owns the pending and latched line sets of every
/// CPU on the board.
#[derive(Debug, Clone)]
pub struct InterruptCoordinator {
    pending: Vec<LineSet>,
    latched: Vec<LineSet>,
}

impl InterruptCoordinator {
    pub fn new(cpu_count: usize) -> Self {
        Self {
            pending: vec![LineSet::default(); cpu_count],
            latched: vec![LineSet::default(); cpu_count],
        }
    }

    pub fn cpu_count(&self) -> usize {
        self.pending.len()
    }

    fn irq_index(cpu: usize, level: u8) -> Option<usize> {
        let index = usize::from(level);
        if index >= IRQ_LEVELS {
            log::warn!("cpu {cpu}: irq level {level} out of range, ignored");
            return None;
        }
        Some(index)
    }

    // -----------------------------------------------------------------------
    // Handler side
    // -----------------------------------------------------------------------

    /// Hold an IRQ line at `level` until cleared.
    pub fn assert_interrupt(&mut self, cpu: usize, level: u8, vector: Option<u8>) {
        let Some(level) = Self::irq_index(cpu, level) else {
            return;
        };
        let lines = &mut self.pending[cpu];
        lines.irq[level] = LineState::Asserted;
        lines.vectors[level] = vector;
        log::trace!("cpu {cpu}: irq {level} asserted (vector {vector:02X?})");
    }

    /// Request a single interrupt: visible during the CPU's next slice only,
    /// or until the CPU acknowledges it.
    pub fn pulse_interrupt(&mut self, cpu: usize, level: u8, vector: Option<u8>) {
        let Some(level) = Self::irq_index(cpu, level) else {
            return;
        };
        let lines = &mut self.pending[cpu];
        if lines.irq[level] == LineState::Cleared {
            lines.irq[level] = LineState::Pulsed;
        }
        lines.vectors[level] = vector;
        log::trace!("cpu {cpu}: irq {level} pulsed (vector {vector:02X?})");
    }

    /// Raise an interrupt that stays pending until the CPU acknowledges it
    /// (or a device clears it), however many slices that takes.
    pub fn hold_interrupt(&mut self, cpu: usize, level: u8, vector: Option<u8>) {
        let Some(level) = Self::irq_index(cpu, level) else {
            return;
        };
        let lines = &mut self.pending[cpu];
        if lines.irq[level] != LineState::Asserted {
            lines.irq[level] = LineState::Held;
        }
        lines.vectors[level] = vector;
        log::trace!("cpu {cpu}: irq {level} held (vector {vector:02X?})");
    }

    pub fn clear_interrupt(&mut self, cpu: usize, level: u8) {
        let Some(level) = Self::irq_index(cpu, level) else {
            return;
        };
        let lines = &mut self.pending[cpu];
        lines.irq[level] = LineState::Cleared;
        lines.vectors[level] = None;
    }

    pub fn assert_nmi(&mut self, cpu: usize) {
        self.pending[cpu].nmi = LineState::Asserted;
    }

    pub fn pulse_nmi(&mut self, cpu: usize) {
        if self.pending[cpu].nmi != LineState::Asserted {
            self.pending[cpu].nmi = LineState::Pulsed;
        }
    }

    pub fn clear_nmi(&mut self, cpu: usize) {
        self.pending[cpu].nmi = LineState::Cleared;
    }

    pub fn assert_reset(&mut self, cpu: usize) {
        if self.pending[cpu].reset != LineState::Asserted {
            log::debug!("cpu {cpu}: reset asserted");
        }
        self.pending[cpu].reset = LineState::Asserted;
    }

    pub fn clear_reset(&mut self, cpu: usize) {
        if self.pending[cpu].reset == LineState::Asserted {
            log::debug!("cpu {cpu}: reset released");
        }
        self.pending[cpu].reset = LineState::Cleared;
    }

    pub fn pulse_reset(&mut self, cpu: usize) {
        log::debug!("cpu {cpu}: reset pulsed");
        self.pending[cpu].reset = LineState::Pulsed;
    }

    /// Drive the reset line to a level (`true` = held in reset).
    pub fn set_reset_line(&mut self, cpu: usize, asserted: bool) {
        if asserted {
            self.assert_reset(cpu);
        } else {
            self.clear_reset(cpu);
        }
    }

    pub fn assert_halt(&mut self, cpu: usize) {
        if self.pending[cpu].halt != LineState::Asserted {
            log::debug!("cpu {cpu}: halt asserted");
        }
        self.pending[cpu].halt = LineState::Asserted;
    }

    pub fn clear_halt(&mut self, cpu: usize) {
        if self.pending[cpu].halt == LineState::Asserted {
            log::debug!("cpu {cpu}: halt released");
        }
        self.pending[cpu].halt = LineState::Cleared;
    }

    // -----------------------------------------------------------------------
    // Scheduler / CPU side
    // -----------------------------------------------------------------------

    /// Latch the pending lines for `cpu` at its slice boundary.
    ///
    /// Pulses are handed over to the latched set and dropped from the
    /// pending set, so each pulse is seen by exactly one slice.
    pub fn begin_slice(&mut self, cpu: usize) -> SliceStart {
        let previous = self.latched[cpu];
        let next = self.pending[cpu];
        self.pending[cpu].consume_pulses();
        self.latched[cpu] = next;

        let reset_core = next.reset == LineState::Pulsed
            || (previous.reset == LineState::Asserted && next.reset == LineState::Cleared);
        SliceStart {
            state: next.exec_state(),
            reset_core,
        }
    }

    /// Lines as the CPU sees them during its current slice.
    pub fn interrupt_state(&self, cpu: usize) -> InterruptState {
        self.latched[cpu].interrupt_state()
    }

    /// Lines the CPU will see from its next slice on.
    pub fn pending_state(&self, cpu: usize) -> InterruptState {
        self.pending[cpu].interrupt_state()
    }

    pub fn exec_state(&self, cpu: usize) -> ExecState {
        self.latched[cpu].exec_state()
    }

    pub fn pending_exec_state(&self, cpu: usize) -> ExecState {
        self.pending[cpu].exec_state()
    }

    /// The CPU took the interrupt at `level`. Pulsed and held requests are
    /// consumed; asserted lines stay up until their device clears them.
    pub fn acknowledge(&mut self, cpu: usize, level: u8) {
        let Some(level) = Self::irq_index(cpu, level) else {
            return;
        };
        for lines in [&mut self.latched[cpu], &mut self.pending[cpu]] {
            if matches!(lines.irq[level], LineState::Pulsed | LineState::Held) {
                lines.irq[level] = LineState::Cleared;
                lines.vectors[level] = None;
            }
        }
    }

    /// Drop every line on every CPU (machine reset).
    pub fn reset_all(&mut self) {
        self.pending.fill(LineSet::default());
        self.latched.fill(LineSet::default());
    }
}
