//! Composition-time validation and evaluation ordering.

use super::{Direction, Netlist, NetlistError, Node, Port, Wire};
use std::collections::VecDeque;

/// One step of the compiled evaluation program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Nand { out: u32, a: u32, b: u32 },
    Copy { out: u32, src: u32 },
}

/// Gate and state element counts of a compiled circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct CircuitStats {
    pub nodes: usize,
    pub nands: usize,
    pub flip_flops: usize,
    pub inputs: usize,
}

/// A validated netlist with a fixed evaluation order.
///
/// A circuit is immutable and can be shared by any number of
/// [`Simulation`](super::Simulation)s, each holding its own state.
#[derive(Debug)]
pub struct Circuit {
    pub(crate) node_count: usize,
    pub(crate) ops: Vec<Op>,
    /// (flip-flop output, next-value wire)
    pub(crate) flip_flops: Vec<(u32, u32)>,
    pub(crate) constants: Vec<(u32, bool)>,
    pub(crate) is_input: Vec<bool>,
    pub(crate) is_state: Vec<bool>,
    ports: Vec<Port>,
    stats: CircuitStats,
}

impl Circuit {
    pub fn stats(&self) -> CircuitStats {
        self.stats
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Look up a named port.
    pub fn port(&self, name: &str) -> Result<&Port, NetlistError> {
        self.ports
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| NetlistError::UnknownPort(name.to_string()))
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.direction == Direction::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.direction == Direction::Output)
    }
}

impl Netlist {
    /// Validate the wiring and order the combinational nodes.
    ///
    /// Flip-flop outputs, inputs and constants are sources: a loop is legal
    /// only if it passes through a flip-flop. Any loop that does not is
    /// reported as [`NetlistError::CombinationalCycle`].
    pub fn compile(self) -> Result<Circuit, NetlistError> {
        if let Some(defect) = self.defects.into_iter().next() {
            return Err(defect);
        }

        let count = self.nodes.len();
        let mut fanout_start = vec![0u32; count + 1];
        let mut indegree = vec![0u32; count];

        for (index, node) in self.nodes.iter().enumerate() {
            let wire = Wire(index as u32);
            match *node {
                Node::Nand(a, b) => {
                    fanout_start[a.index() + 1] += 1;
                    fanout_start[b.index() + 1] += 1;
                    indegree[index] = 2;
                }
                Node::Forward { source: Some(src) } => {
                    fanout_start[src.index() + 1] += 1;
                    indegree[index] = 1;
                }
                Node::Forward { source: None } => return Err(NetlistError::UndrivenWire(wire)),
                Node::FlipFlop { next: None } => {
                    return Err(NetlistError::UnconnectedFlipFlop(wire))
                }
                Node::FlipFlop { next: Some(_) } | Node::Const(_) | Node::Input => {}
            }
        }

        for i in 0..count {
            fanout_start[i + 1] += fanout_start[i];
        }
        let mut cursor = fanout_start.clone();
        let mut fanout = vec![0u32; fanout_start[count] as usize];
        let mut link = |from: Wire, to: usize| {
            let slot = &mut cursor[from.index()];
            fanout[*slot as usize] = to as u32;
            *slot += 1;
        };
        for (index, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Nand(a, b) => {
                    link(a, index);
                    link(b, index);
                }
                Node::Forward { source: Some(src) } => link(src, index),
                _ => {}
            }
        }

        let mut queue: VecDeque<u32> = (0..count as u32)
            .filter(|&i| indegree[i as usize] == 0)
            .collect();
        let mut ops = Vec::with_capacity(count);
        let mut visited = 0usize;

        while let Some(head) = queue.pop_front() {
            visited += 1;
            match self.nodes[head as usize] {
                Node::Nand(a, b) => ops.push(Op::Nand {
                    out: head,
                    a: a.0,
                    b: b.0,
                }),
                Node::Forward { source: Some(src) } => ops.push(Op::Copy { out: head, src: src.0 }),
                _ => {}
            }
            let (start, end) = (
                fanout_start[head as usize] as usize,
                fanout_start[head as usize + 1] as usize,
            );
            for &to in &fanout[start..end] {
                let degree = &mut indegree[to as usize];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(to);
                }
            }
        }

        if visited < count {
            let stuck = indegree.iter().position(|&d| d > 0).unwrap_or(0);
            return Err(NetlistError::CombinationalCycle {
                wire: Wire(stuck as u32),
                involved: count - visited,
            });
        }

        let mut flip_flops = Vec::new();
        let mut constants = Vec::new();
        let mut is_input = vec![false; count];
        let mut is_state = vec![false; count];
        let mut stats = CircuitStats {
            nodes: count,
            ..Default::default()
        };
        for (index, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::FlipFlop { next: Some(next) } => {
                    flip_flops.push((index as u32, next.0));
                    is_state[index] = true;
                    stats.flip_flops += 1;
                }
                Node::Const(value) => constants.push((index as u32, value)),
                Node::Input => {
                    is_input[index] = true;
                    stats.inputs += 1;
                }
                Node::Nand(..) => stats.nands += 1,
                _ => {}
            }
        }

        tracing::debug!(
            nodes = stats.nodes,
            nands = stats.nands,
            flip_flops = stats.flip_flops,
            "compiled circuit"
        );

        Ok(Circuit {
            node_count: count,
            ops,
            flip_flops,
            constants,
            is_input,
            is_state,
            ports: self.ports,
            stats,
        })
    }
}
