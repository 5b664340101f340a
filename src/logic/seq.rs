//! Sequential chips: Bit, Register and the program counter.
//!
//! A bare flip-flop always takes its input at the next tick. Conditional
//! load is built on top by feeding the flip-flop's own output back through a
//! multiplexer: `out(t+1) = load(t) ? in(t) : out(t)`.

use super::arith::increment;
use super::gates::{mux, mux_bus};
use crate::netlist::{Bus, Netlist, Wire};

/// One-bit storage cell with load enable.
pub fn bit(n: &mut Netlist, input: Wire, load: Wire) -> Wire {
    let ff = n.flip_flop();
    let next = mux(n, ff.output(), input, load);
    n.latch(ff, next);
    ff.output()
}

/// `N` independent bits sharing one load signal.
pub fn register<const N: usize>(n: &mut Netlist, input: &Bus<N>, load: Wire) -> Bus<N> {
    Bus::from_wires(std::array::from_fn(|i| bit(n, input[i], load)))
}

/// Program counter.
///
/// ```text
/// reset(t)      => out(t+1) = 0
/// else load(t)  => out(t+1) = in(t)
/// else inc(t)   => out(t+1) = out(t) + 1
/// else             out(t+1) = out(t)
/// ```
pub fn program_counter<const N: usize>(
    n: &mut Netlist,
    input: &Bus<N>,
    load: Wire,
    inc: Wire,
    reset: Wire,
) -> Bus<N> {
    let feedback = n.forward_bus::<N>();
    let incremented = increment(n, &feedback);
    let stepped = mux_bus(n, &feedback, &incremented, inc);
    let loaded = mux_bus(n, &stepped, input, load);
    let zeros = n.constant::<N>(0);
    let next = mux_bus(n, &loaded, &zeros, reset);
    let always = n.one();
    let out = register(n, &next, always);
    n.drive_bus(&feedback, &out);
    out
}
