#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use arcbus_core::core::bus::{BusMaster, InterruptState};
use arcbus_core::cpu::{Cpu, CpuBus};

/// One scripted bus operation; each `step` performs at most one.
#[derive(Clone, Copy, Debug)]
pub enum Op {
    Read(u32),
    Write(u32, u8),
    /// Take the highest pending IRQ (acknowledge it).
    Acknowledge,
    Idle,
}

/// What a [`ScriptCpu`] saw while it ran.
#[derive(Default, Debug)]
pub struct Trace {
    pub steps: usize,
    pub resets: usize,
    pub reads: Vec<(u32, u8)>,
    /// Interrupt lines observed at every instruction boundary.
    pub interrupts: Vec<InterruptState>,
    pub halted: Vec<bool>,
}

/// Stand-in CPU core: runs a fixed list of bus operations, one per step,
/// and records everything it observes.
pub struct ScriptCpu {
    ops: VecDeque<Op>,
    cycles_per_step: u32,
    trace: Rc<RefCell<Trace>>,
}

impl ScriptCpu {
    pub fn new(ops: &[Op], cycles_per_step: u32) -> (Self, Rc<RefCell<Trace>>) {
        let trace = Rc::new(RefCell::new(Trace::default()));
        let cpu = Self {
            ops: ops.iter().copied().collect(),
            cycles_per_step,
            trace: Rc::clone(&trace),
        };
        (cpu, trace)
    }

    pub fn boxed(ops: &[Op], cycles_per_step: u32) -> (Box<dyn Cpu>, Rc<RefCell<Trace>>) {
        let (cpu, trace) = Self::new(ops, cycles_per_step);
        (Box::new(cpu), trace)
    }
}

impl Cpu for ScriptCpu {
    fn reset(&mut self) {
        self.trace.borrow_mut().resets += 1;
    }

    fn step(&mut self, bus: &mut CpuBus<'_>, master: BusMaster) -> u32 {
        let mut trace = self.trace.borrow_mut();
        trace.steps += 1;
        let lines = bus.check_interrupts(master);
        trace.interrupts.push(lines);
        trace.halted.push(bus.is_halted_for(master));
        match self.ops.pop_front().unwrap_or(Op::Idle) {
            Op::Read(addr) => {
                let data = bus.read(master, addr);
                trace.reads.push((addr, data));
            }
            Op::Write(addr, data) => bus.write(master, addr, data),
            Op::Acknowledge => {
                if lines.irq {
                    bus.acknowledge_interrupt(master, lines.irq_level);
                }
            }
            Op::Idle => {}
        }
        self.cycles_per_step
    }
}
