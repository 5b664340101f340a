//! The combinational gate network.
//!
//! Only [`Netlist::nand`] touches the primitive; everything else is built
//! from the gates defined before it.

use crate::netlist::{Bus, Netlist, Wire};

#[inline]
pub fn not(n: &mut Netlist, a: Wire) -> Wire {
    n.nand(a, a)
}

#[inline]
pub fn and(n: &mut Netlist, a: Wire, b: Wire) -> Wire {
    let nand = n.nand(a, b);
    not(n, nand)
}

#[inline]
pub fn or(n: &mut Netlist, a: Wire, b: Wire) -> Wire {
    let na = not(n, a);
    let nb = not(n, b);
    n.nand(na, nb)
}

pub fn xor(n: &mut Netlist, a: Wire, b: Wire) -> Wire {
    let both = n.nand(a, b);
    let left = n.nand(a, both);
    let right = n.nand(b, both);
    n.nand(left, right)
}

/// `sel ? b : a`
pub fn mux(n: &mut Netlist, a: Wire, b: Wire, sel: Wire) -> Wire {
    let not_sel = not(n, sel);
    mux_with(n, a, b, sel, not_sel)
}

fn mux_with(n: &mut Netlist, a: Wire, b: Wire, sel: Wire, not_sel: Wire) -> Wire {
    let left = n.nand(a, not_sel);
    let right = n.nand(b, sel);
    n.nand(left, right)
}

/// Route `input` to the first output when `sel` is 0, to the second when 1.
/// The unselected output is 0.
pub fn dmux(n: &mut Netlist, input: Wire, sel: Wire) -> (Wire, Wire) {
    let not_sel = not(n, sel);
    (and(n, input, not_sel), and(n, input, sel))
}

pub fn not_bus<const N: usize>(n: &mut Netlist, a: &Bus<N>) -> Bus<N> {
    a.map(|w| not(n, w))
}

pub fn and_bus<const N: usize>(n: &mut Netlist, a: &Bus<N>, b: &Bus<N>) -> Bus<N> {
    Bus::from_wires(std::array::from_fn(|i| and(n, a[i], b[i])))
}

pub fn or_bus<const N: usize>(n: &mut Netlist, a: &Bus<N>, b: &Bus<N>) -> Bus<N> {
    Bus::from_wires(std::array::from_fn(|i| or(n, a[i], b[i])))
}

/// Bitwise `sel ? b : a`, sharing one inverter for the select line.
pub fn mux_bus<const N: usize>(n: &mut Netlist, a: &Bus<N>, b: &Bus<N>, sel: Wire) -> Bus<N> {
    let not_sel = not(n, sel);
    Bus::from_wires(std::array::from_fn(|i| mux_with(n, a[i], b[i], sel, not_sel)))
}

/// Force every bit to 0 unless `enable` is 1.
pub fn gate_bus<const N: usize>(n: &mut Netlist, a: &Bus<N>, enable: Wire) -> Bus<N> {
    and_bus(n, a, &Bus::splat(enable))
}

/// N-input OR as a balanced tree. An empty input list is constant 0.
pub fn or_many(n: &mut Netlist, inputs: &[Wire]) -> Wire {
    match inputs {
        [] => n.zero(),
        [single] => *single,
        _ => {
            let (low, high) = inputs.split_at(inputs.len() / 2);
            let low = or_many(n, low);
            let high = or_many(n, high);
            or(n, low, high)
        }
    }
}

/// N-input AND as a balanced tree. An empty input list is constant 1.
pub fn and_many(n: &mut Netlist, inputs: &[Wire]) -> Wire {
    match inputs {
        [] => n.one(),
        [single] => *single,
        _ => {
            let (low, high) = inputs.split_at(inputs.len() / 2);
            let low = and_many(n, low);
            let high = and_many(n, high);
            and(n, low, high)
        }
    }
}

/// Select one of `2^k` buses with `k` select bits (`sel[0]` is the LSB).
///
/// # Panics
/// Panics if `inputs.len() != 2^sel.len()`.
pub fn mux_n<const N: usize>(n: &mut Netlist, inputs: &[Bus<N>], sel: &[Wire]) -> Bus<N> {
    assert_eq!(
        inputs.len(),
        1usize << sel.len(),
        "mux fan-in must be 2^{} for {} select bits",
        sel.len(),
        sel.len()
    );
    match sel.split_last() {
        None => inputs[0],
        Some((&top, rest)) => {
            let (low, high) = inputs.split_at(inputs.len() / 2);
            let low = mux_n(n, low, rest);
            let high = mux_n(n, high, rest);
            mux_bus(n, &low, &high, top)
        }
    }
}

/// Route `input` to exactly one of `2^k` outputs, zeroing all the others.
pub fn dmux_n(n: &mut Netlist, input: Wire, sel: &[Wire]) -> Vec<Wire> {
    match sel.split_last() {
        None => vec![input],
        Some((&top, rest)) => {
            let (low, high) = dmux(n, input, top);
            let mut outputs = dmux_n(n, low, rest);
            outputs.extend(dmux_n(n, high, rest));
            outputs
        }
    }
}

pub fn mux4way<const N: usize>(n: &mut Netlist, inputs: &[Bus<N>; 4], sel: &Bus<2>) -> Bus<N> {
    mux_n(n, inputs, sel.as_slice())
}

pub fn mux8way<const N: usize>(n: &mut Netlist, inputs: &[Bus<N>; 8], sel: &Bus<3>) -> Bus<N> {
    mux_n(n, inputs, sel.as_slice())
}

pub fn dmux4way(n: &mut Netlist, input: Wire, sel: &Bus<2>) -> [Wire; 4] {
    let outputs = dmux_n(n, input, sel.as_slice());
    std::array::from_fn(|i| outputs[i])
}

pub fn dmux8way(n: &mut Netlist, input: Wire, sel: &Bus<3>) -> [Wire; 8] {
    let outputs = dmux_n(n, input, sel.as_slice());
    std::array::from_fn(|i| outputs[i])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::netlist::Simulation;
    use std::sync::Arc;

    pub(crate) fn simulate(n: Netlist) -> Simulation {
        Simulation::new(Arc::new(n.compile().unwrap()))
    }

    fn truth_table(gate: fn(&mut Netlist, Wire, Wire) -> Wire) -> [bool; 4] {
        let mut n = Netlist::new();
        let a = n.input_wire("a");
        let b = n.input_wire("b");
        let out = gate(&mut n, a, b);
        let mut sim = simulate(n);
        let mut table = [false; 4];
        for (i, row) in table.iter_mut().enumerate() {
            sim.set_wire(a, i & 1 == 1);
            sim.set_wire(b, i & 2 == 2);
            *row = sim.wire(out);
        }
        table
    }

    #[test]
    fn test_two_input_gates() {
        // rows: (a, b) = 00, 10, 01, 11
        assert_eq!(truth_table(and), [false, false, false, true]);
        assert_eq!(truth_table(or), [false, true, true, true]);
        assert_eq!(truth_table(xor), [false, true, true, false]);
        assert_eq!(truth_table(|n, a, b| n.nand(a, b)), [true, true, true, false]);
    }

    #[test]
    fn test_not() {
        let mut n = Netlist::new();
        let a = n.input_wire("a");
        let out = not(&mut n, a);
        let mut sim = simulate(n);
        assert!(sim.wire(out));
        sim.set_wire(a, true);
        assert!(!sim.wire(out));
    }

    #[test]
    fn test_mux_and_dmux() {
        let mut n = Netlist::new();
        let a = n.input_wire("a");
        let b = n.input_wire("b");
        let sel = n.input_wire("sel");
        let out = mux(&mut n, a, b, sel);
        let (low, high) = dmux(&mut n, a, sel);
        let mut sim = simulate(n);

        sim.set_wire(a, true);
        assert!(sim.wire(out));
        assert!(sim.wire(low));
        assert!(!sim.wire(high));

        sim.set_wire(sel, true);
        assert!(!sim.wire(out));
        assert!(!sim.wire(low));
        assert!(sim.wire(high));
    }

    #[test]
    fn test_or_many() {
        let mut n = Netlist::new();
        let bus = n.input::<16>("in");
        let any = or_many(&mut n, bus.as_slice());
        let all = and_many(&mut n, bus.as_slice());
        let mut sim = simulate(n);
        assert!(!sim.wire(any));
        sim.set(&bus, 1 << 11);
        assert!(sim.wire(any));
        assert!(!sim.wire(all));
        sim.set(&bus, 0xFFFF);
        assert!(sim.wire(all));
    }

    #[test]
    fn test_mux8way_selects_each_input() {
        let mut n = Netlist::new();
        let inputs: [Bus<16>; 8] = std::array::from_fn(|i| n.constant(100 + i as u64));
        let sel = n.input::<3>("sel");
        let out = mux8way(&mut n, &inputs, &sel);
        let mut sim = simulate(n);
        for i in 0..8 {
            sim.set(&sel, i);
            assert_eq!(sim.get(&out), 100 + i);
        }
    }

    #[test]
    fn test_dmux8way_zeroes_unselected() {
        let mut n = Netlist::new();
        let input = n.input_wire("in");
        let sel = n.input::<3>("sel");
        let outs = dmux8way(&mut n, input, &sel);
        let mut sim = simulate(n);
        sim.set_wire(input, true);
        for i in 0..8u64 {
            sim.set(&sel, i);
            for (j, &out) in outs.iter().enumerate() {
                assert_eq!(sim.wire(out), j as u64 == i, "sel={} out{}", i, j);
            }
        }
        sim.set_wire(input, false);
        assert!(outs.iter().all(|&o| !sim.wire(o)));
    }

    #[test]
    fn test_mux4way_dmux4way() {
        let mut n = Netlist::new();
        let inputs: [Bus<2>; 4] = std::array::from_fn(|i| n.constant(i as u64));
        let sel = n.input::<2>("sel");
        let out = mux4way(&mut n, &inputs, &sel);
        let one = n.one();
        let routed = dmux4way(&mut n, one, &sel);
        let mut sim = simulate(n);
        for i in 0..4u64 {
            sim.set(&sel, i);
            assert_eq!(sim.get(&out), i);
            assert_eq!(sim.peek(&routed), 1 << i);
        }
    }

    #[test]
    #[should_panic(expected = "mux fan-in")]
    fn test_mux_n_rejects_wrong_fan_in() {
        let mut n = Netlist::new();
        let inputs: [Bus<1>; 3] = std::array::from_fn(|_| n.input::<1>(""));
        let sel = n.input::<2>("sel");
        let _ = mux_n(&mut n, &inputs, sel.as_slice());
    }
}
