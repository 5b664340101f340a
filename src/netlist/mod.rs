//! Gate-level netlists.
//!
//! A circuit is described as an append-only arena of nodes:
//! - constants and named external inputs
//! - two-input NAND gates, the only combinational primitive
//! - flip-flops, the only state-holding primitive
//! - forward wires, declared before the signal that drives them exists
//!
//! Chips are plain functions that append nodes to a [`Netlist`] and return
//! typed [`Bus`] handles. Calling a chip function twice produces two
//! independent copies. Once composed, [`Netlist::compile`] checks the wiring
//! and produces a [`Circuit`], which a [`Simulation`] evaluates tick by tick.

mod compile;
mod sim;

pub use compile::{Circuit, CircuitStats};
pub use sim::Simulation;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single signal in a netlist.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Wire(u32);

impl Wire {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// A fixed-width, ordered group of wires. Bit 0 is the least significant.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bus<const N: usize> {
    wires: [Wire; N],
}

impl<const N: usize> Bus<N> {
    /// Bus width in bits.
    pub const WIDTH: usize = N;

    pub const fn from_wires(wires: [Wire; N]) -> Self {
        Self { wires }
    }

    #[inline]
    pub const fn wires(&self) -> &[Wire; N] {
        &self.wires
    }

    #[inline]
    pub fn as_slice(&self) -> &[Wire] {
        &self.wires
    }

    /// Get a single wire by index (0 = LSB).
    #[inline]
    pub const fn bit(&self, index: usize) -> Wire {
        self.wires[index]
    }

    /// Take `M` consecutive wires starting at `start`.
    ///
    /// # Panics
    /// Panics if the range does not fit inside this bus.
    pub fn slice<const M: usize>(&self, start: usize) -> Bus<M> {
        assert!(
            start + M <= N,
            "slice {}..{} out of range for a {}-wide bus",
            start,
            start + M,
            N
        );
        Bus {
            wires: std::array::from_fn(|i| self.wires[start + i]),
        }
    }

    /// Apply `f` to each wire, building a bus of the same width.
    pub fn map(&self, mut f: impl FnMut(Wire) -> Wire) -> Self {
        Bus {
            wires: std::array::from_fn(|i| f(self.wires[i])),
        }
    }

    /// A bus with every bit driven by the same wire.
    pub fn splat(wire: Wire) -> Self {
        Bus { wires: [wire; N] }
    }
}

impl<const N: usize> std::ops::Index<usize> for Bus<N> {
    type Output = Wire;

    fn index(&self, index: usize) -> &Wire {
        &self.wires[index]
    }
}

impl<const N: usize> fmt::Debug for Bus<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bus<{}>", N)?;
        f.debug_list().entries(self.wires.iter()).finish()
    }
}

/// Handle to a flip-flop whose next value has not been connected yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipFlop(Wire);

impl FlipFlop {
    /// The flip-flop's current value, valid for the whole tick.
    #[inline]
    pub const fn output(self) -> Wire {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Node {
    Const(bool),
    Input,
    Nand(Wire, Wire),
    FlipFlop { next: Option<Wire> },
    Forward { source: Option<Wire> },
}

/// Whether a named port feeds the circuit or observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

/// A named, fixed-width group of wires on the circuit boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub wires: Vec<Wire>,
}

/// Errors detected when a composed netlist is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetlistError {
    #[error("combinational loop through {wire:?} ({involved} nodes never settle)")]
    CombinationalCycle { wire: Wire, involved: usize },

    #[error("forward wire {0:?} is never driven")]
    UndrivenWire(Wire),

    #[error("flip-flop {0:?} has no next-value connection")]
    UnconnectedFlipFlop(Wire),

    #[error("{0:?} is driven more than once")]
    MultipleDrivers(Wire),

    #[error("{0:?} is not a forward wire or flip-flop and cannot be driven")]
    NotDrivable(Wire),

    #[error("port `{0}` is declared more than once")]
    DuplicatePort(String),

    #[error("no port named `{0}`")]
    UnknownPort(String),
}

/// Netlist under construction.
#[derive(Debug, Default)]
pub struct Netlist {
    pub(crate) nodes: Vec<Node>,
    pub(crate) ports: Vec<Port>,
    /// Wiring defects found while composing, reported by [`Netlist::compile`].
    pub(crate) defects: Vec<NetlistError>,
    zero: Option<Wire>,
    one: Option<Wire>,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes appended so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> Wire {
        assert!(
            self.nodes.len() < u32::MAX as usize,
            "netlist exceeds {} nodes",
            u32::MAX
        );
        let wire = Wire(self.nodes.len() as u32);
        self.nodes.push(node);
        wire
    }

    /// The universal primitive.
    pub fn nand(&mut self, a: Wire, b: Wire) -> Wire {
        self.push(Node::Nand(a, b))
    }

    /// Constant `false`, shared by every user.
    pub fn zero(&mut self) -> Wire {
        match self.zero {
            Some(wire) => wire,
            None => {
                let wire = self.push(Node::Const(false));
                self.zero = Some(wire);
                wire
            }
        }
    }

    /// Constant `true`, shared by every user.
    pub fn one(&mut self) -> Wire {
        match self.one {
            Some(wire) => wire,
            None => {
                let wire = self.push(Node::Const(true));
                self.one = Some(wire);
                wire
            }
        }
    }

    /// A bus hard-wired to `value` (low `N` bits).
    pub fn constant<const N: usize>(&mut self, value: u64) -> Bus<N> {
        let zero = self.zero();
        let one = self.one();
        Bus::from_wires(std::array::from_fn(|i| {
            if i < 64 && (value >> i) & 1 == 1 {
                one
            } else {
                zero
            }
        }))
    }

    /// Declare a named external input bus.
    pub fn input<const N: usize>(&mut self, name: &str) -> Bus<N> {
        let bus = Bus::from_wires(std::array::from_fn(|_| self.push(Node::Input)));
        self.add_port(name, Direction::Input, bus.as_slice());
        bus
    }

    /// Declare a named single-wire input.
    pub fn input_wire(&mut self, name: &str) -> Wire {
        self.input::<1>(name).bit(0)
    }

    /// Expose a bus under a name so it can be looked up on the compiled circuit.
    pub fn expose(&mut self, name: &str, wires: &[Wire]) {
        self.add_port(name, Direction::Output, wires);
    }

    fn add_port(&mut self, name: &str, direction: Direction, wires: &[Wire]) {
        if self.ports.iter().any(|p| p.name == name) {
            self.defects.push(NetlistError::DuplicatePort(name.to_string()));
            return;
        }
        self.ports.push(Port {
            name: name.to_string(),
            direction,
            wires: wires.to_vec(),
        });
    }

    /// Allocate a flip-flop. Its next value is supplied later by [`Netlist::latch`].
    pub fn flip_flop(&mut self) -> FlipFlop {
        FlipFlop(self.push(Node::FlipFlop { next: None }))
    }

    /// Connect the value a flip-flop takes at the next tick boundary.
    pub fn latch(&mut self, ff: FlipFlop, next: Wire) {
        match &mut self.nodes[ff.0.index()] {
            Node::FlipFlop { next: slot @ None } => *slot = Some(next),
            Node::FlipFlop { next: Some(_) } => {
                self.defects.push(NetlistError::MultipleDrivers(ff.0))
            }
            _ => self.defects.push(NetlistError::NotDrivable(ff.0)),
        }
    }

    /// Declare a wire whose driver is connected later with [`Netlist::drive`].
    pub fn forward(&mut self) -> Wire {
        self.push(Node::Forward { source: None })
    }

    /// Declare a bus of forward wires.
    pub fn forward_bus<const N: usize>(&mut self) -> Bus<N> {
        Bus::from_wires(std::array::from_fn(|_| self.forward()))
    }

    /// Connect a forward wire to its driver.
    pub fn drive(&mut self, wire: Wire, source: Wire) {
        match &mut self.nodes[wire.index()] {
            Node::Forward { source: slot @ None } => *slot = Some(source),
            Node::Forward { source: Some(_) } => {
                self.defects.push(NetlistError::MultipleDrivers(wire))
            }
            _ => self.defects.push(NetlistError::NotDrivable(wire)),
        }
    }

    /// Connect every wire of a forward bus to the matching bit of `source`.
    pub fn drive_bus<const N: usize>(&mut self, wires: &Bus<N>, source: &Bus<N>) {
        for i in 0..N {
            self.drive(wires[i], source[i]);
        }
    }
}
