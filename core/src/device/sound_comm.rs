//! Main <-> sound CPU command ports of the Atari System 1/2 style boards.
//!
//! Each direction is a byte plus a ready flag. A main-CPU write holds the
//! sound CPU's NMI until the sound CPU reads the byte; a sound-CPU response
//! holds the main CPU's "sound" interrupt until the main CPU reads it.
//!
//! The device drives lines only; callers that want the tighter interleave
//! after a command call [`Board::boost_interleave`](crate::memory::Board::boost_interleave).

use crate::core::lines::InterruptCoordinator;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundComm {
    main_cpu: usize,
    sound_cpu: usize,
    /// IRQ level raised on the main CPU when a response is waiting.
    main_irq_level: u8,
    cpu_to_sound: u8,
    cpu_to_sound_ready: bool,
    sound_to_cpu: u8,
    sound_to_cpu_ready: bool,
}

impl SoundComm {
    pub fn new(main_cpu: usize, sound_cpu: usize, main_irq_level: u8) -> Self {
        Self {
            main_cpu,
            sound_cpu,
            main_irq_level,
            cpu_to_sound: 0,
            cpu_to_sound_ready: false,
            sound_to_cpu: 0,
            sound_to_cpu_ready: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.main_cpu, self.sound_cpu, self.main_irq_level);
    }

    /// Main CPU posts a command.
    pub fn main_write(&mut self, lines: &mut InterruptCoordinator, data: u8) {
        if self.cpu_to_sound_ready {
            log::debug!("sound comm: command {:#04X} overwritten by {data:#04X}", self.cpu_to_sound);
        }
        self.cpu_to_sound = data;
        self.cpu_to_sound_ready = true;
        lines.assert_nmi(self.sound_cpu);
    }

    /// Sound CPU fetches the command.
    pub fn sound_read(&mut self, lines: &mut InterruptCoordinator) -> u8 {
        self.cpu_to_sound_ready = false;
        lines.clear_nmi(self.sound_cpu);
        self.cpu_to_sound
    }

    /// Sound CPU posts a response.
    pub fn sound_write(&mut self, lines: &mut InterruptCoordinator, data: u8) {
        self.sound_to_cpu = data;
        self.sound_to_cpu_ready = true;
        lines.assert_interrupt(self.main_cpu, self.main_irq_level, None);
    }

    /// Main CPU fetches the response.
    pub fn main_read(&mut self, lines: &mut InterruptCoordinator) -> u8 {
        self.sound_to_cpu_ready = false;
        lines.clear_interrupt(self.main_cpu, self.main_irq_level);
        self.sound_to_cpu
    }

    /// Main CPU resets the sound board: un-halt, pulse reset, drop any
    /// pending response.
    pub fn sound_reset(&mut self, lines: &mut InterruptCoordinator) {
        lines.clear_halt(self.sound_cpu);
        lines.pulse_reset(self.sound_cpu);
        self.sound_to_cpu_ready = false;
        lines.clear_interrupt(self.main_cpu, self.main_irq_level);
    }

    pub fn cpu_to_sound_ready(&self) -> bool {
        self.cpu_to_sound_ready
    }

    pub fn sound_to_cpu_ready(&self) -> bool {
        self.sound_to_cpu_ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: usize = 0;
    const SOUND: usize = 1;

    fn setup() -> (SoundComm, InterruptCoordinator) {
        (SoundComm::new(MAIN, SOUND, 6), InterruptCoordinator::new(2))
    }

    #[test]
    fn command_raises_and_read_clears_nmi() {
        let (mut comm, mut lines) = setup();
        comm.main_write(&mut lines, 0x42);
        assert!(comm.cpu_to_sound_ready());
        assert!(lines.pending_state(SOUND).nmi);

        assert_eq!(comm.sound_read(&mut lines), 0x42);
        assert!(!comm.cpu_to_sound_ready());
        assert!(!lines.pending_state(SOUND).nmi);
    }

    #[test]
    fn response_raises_and_read_clears_main_irq() {
        let (mut comm, mut lines) = setup();
        comm.sound_write(&mut lines, 0x99);
        let state = lines.pending_state(MAIN);
        assert!(state.irq);
        assert_eq!(state.irq_level, 6);

        assert_eq!(comm.main_read(&mut lines), 0x99);
        assert!(!comm.sound_to_cpu_ready());
        assert!(!lines.pending_state(MAIN).irq);
    }

    #[test]
    fn sound_reset_drops_response_and_pulses_reset() {
        let (mut comm, mut lines) = setup();
        lines.assert_halt(SOUND);
        comm.sound_write(&mut lines, 0x01);
        comm.sound_reset(&mut lines);

        assert!(!comm.sound_to_cpu_ready());
        assert!(!lines.pending_state(MAIN).irq);
        let start = lines.begin_slice(SOUND);
        assert!(start.reset_core);
        assert_eq!(start.state, crate::core::lines::ExecState::Running);
    }
}
