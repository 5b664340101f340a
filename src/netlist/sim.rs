//! Two-phase evaluation of a compiled circuit.

use super::compile::{Circuit, Op};
use super::{Bus, NetlistError, Wire};
use std::sync::Arc;

/// Runtime state of one circuit instance.
///
/// Each tick happens in two phases: every combinational node is evaluated in
/// dependency order from the currently latched flip-flop values and inputs,
/// then every flip-flop samples its next value and all of them commit
/// together. No flip-flop ever observes another flip-flop's next value.
#[derive(Debug, Clone)]
pub struct Simulation {
    circuit: Arc<Circuit>,
    values: Vec<bool>,
    latch: Vec<bool>,
    tick: u64,
    settled: bool,
}

impl Simulation {
    /// Start a simulation with every flip-flop and input at zero.
    pub fn new(circuit: Arc<Circuit>) -> Self {
        let mut values = vec![false; circuit.node_count];
        for &(index, value) in &circuit.constants {
            values[index as usize] = value;
        }
        let latch = vec![false; circuit.flip_flops.len()];
        Self {
            circuit,
            values,
            latch,
            tick: 0,
            settled: false,
        }
    }

    pub fn circuit(&self) -> &Arc<Circuit> {
        &self.circuit
    }

    /// Number of clock ticks committed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Drive an input wire.
    pub fn set_wire(&mut self, wire: Wire, value: bool) {
        debug_assert!(
            self.circuit.is_input[wire.index()],
            "{:?} is not an input",
            wire
        );
        if self.values[wire.index()] != value {
            self.values[wire.index()] = value;
            self.settled = false;
        }
    }

    /// Drive an input bus with the low `N` bits of `value`.
    pub fn set<const N: usize>(&mut self, bus: &Bus<N>, value: u64) {
        self.set_wires(bus.as_slice(), value);
    }

    fn set_wires(&mut self, wires: &[Wire], value: u64) {
        for (i, &wire) in wires.iter().enumerate() {
            self.set_wire(wire, i < 64 && (value >> i) & 1 == 1);
        }
    }

    /// Drive a named input port.
    pub fn set_port(&mut self, name: &str, value: u64) -> Result<(), NetlistError> {
        let circuit = Arc::clone(&self.circuit);
        let port = circuit.port(name)?;
        self.set_wires(&port.wires, value);
        Ok(())
    }

    /// Read a wire, settling the combinational logic first if needed.
    pub fn wire(&mut self, wire: Wire) -> bool {
        self.settle();
        self.values[wire.index()]
    }

    /// Read a bus as an unsigned value.
    pub fn get<const N: usize>(&mut self, bus: &Bus<N>) -> u64 {
        self.settle();
        self.read(bus.as_slice())
    }

    /// Read a named port.
    pub fn get_port(&mut self, name: &str) -> Result<u64, NetlistError> {
        self.settle();
        let port = self.circuit.port(name)?;
        Ok(self.read(&port.wires))
    }

    /// Read wires that hold state (flip-flop outputs) or settled values
    /// without re-evaluating.
    pub fn peek(&self, wires: &[Wire]) -> u64 {
        self.read(wires)
    }

    fn read(&self, wires: &[Wire]) -> u64 {
        debug_assert!(wires.len() <= 64);
        wires
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, w)| acc | (u64::from(self.values[w.index()]) << i))
    }

    /// Overwrite the current value of flip-flops, bypassing the clock.
    ///
    /// Used to preload memories and registers before a run.
    pub fn load_state(&mut self, wires: &[Wire], value: u64) {
        for (i, &wire) in wires.iter().enumerate() {
            debug_assert!(
                self.circuit.is_state[wire.index()],
                "{:?} is not a flip-flop",
                wire
            );
            self.values[wire.index()] = i < 64 && (value >> i) & 1 == 1;
        }
        self.settled = false;
    }

    /// Evaluate the combinational logic from the current state and inputs.
    pub fn settle(&mut self) {
        if self.settled {
            return;
        }
        let values = &mut self.values;
        for op in &self.circuit.ops {
            match *op {
                Op::Nand { out, a, b } => {
                    values[out as usize] = !(values[a as usize] && values[b as usize]);
                }
                Op::Copy { out, src } => values[out as usize] = values[src as usize],
            }
        }
        self.settled = true;
    }

    /// Advance the clock by one tick and return the new tick count.
    pub fn tick(&mut self) -> u64 {
        self.settle();
        for (slot, &(_, next)) in self.latch.iter_mut().zip(&self.circuit.flip_flops) {
            *slot = self.values[next as usize];
        }
        for (&value, &(q, _)) in self.latch.iter().zip(&self.circuit.flip_flops) {
            self.values[q as usize] = value;
        }
        self.tick += 1;
        self.settled = false;
        self.tick
    }
}
