//! Arithmetic chips.
//!
//! All arithmetic is two's complement and wraps silently: the final carry of
//! an adder is dropped.

use super::gates::{and, gate_bus, or, xor};
use crate::netlist::{Bus, Netlist, Wire};

/// Sum and carry outputs of an adder cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sum {
    pub sum: Wire,
    pub carry: Wire,
}

pub fn half_adder(n: &mut Netlist, a: Wire, b: Wire) -> Sum {
    Sum {
        sum: xor(n, a, b),
        carry: and(n, a, b),
    }
}

pub fn full_adder(n: &mut Netlist, a: Wire, b: Wire, c: Wire) -> Sum {
    let first = half_adder(n, a, b);
    let second = half_adder(n, first.sum, c);
    Sum {
        sum: second.sum,
        carry: or(n, first.carry, second.carry),
    }
}

/// Ripple-carry adder: one half adder followed by `N - 1` full adders.
pub fn add<const N: usize>(n: &mut Netlist, a: &Bus<N>, b: &Bus<N>) -> Bus<N> {
    let mut carry = None;
    Bus::from_wires(std::array::from_fn(|i| {
        let cell = match carry {
            None => half_adder(n, a[i], b[i]),
            Some(c) => full_adder(n, a[i], b[i], c),
        };
        carry = Some(cell.carry);
        cell.sum
    }))
}

/// `a + 1`
pub fn increment<const N: usize>(n: &mut Netlist, a: &Bus<N>) -> Bus<N> {
    let one = n.constant::<N>(1);
    add(n, a, &one)
}

/// Shift toward the MSB by one, filling bit 0 with 0.
pub fn shift_left_logical<const N: usize>(n: &mut Netlist, a: &Bus<N>) -> Bus<N> {
    let zero = n.zero();
    Bus::from_wires(std::array::from_fn(|i| if i == 0 { zero } else { a[i - 1] }))
}

/// Shift toward the LSB by one, filling the MSB with 0.
pub fn shift_right_logical<const N: usize>(n: &mut Netlist, a: &Bus<N>) -> Bus<N> {
    let zero = n.zero();
    Bus::from_wires(std::array::from_fn(|i| if i + 1 == N { zero } else { a[i + 1] }))
}

/// Shift toward the MSB by one, filling bit 0 with 0 and keeping the sign bit.
pub fn shift_left_arithmetic<const N: usize>(n: &mut Netlist, a: &Bus<N>) -> Bus<N> {
    let zero = n.zero();
    Bus::from_wires(std::array::from_fn(|i| match i {
        0 => zero,
        _ if i + 1 == N => a[i],
        _ => a[i - 1],
    }))
}

/// Shift toward the LSB by one, replicating the sign bit.
pub fn shift_right_arithmetic<const N: usize>(a: &Bus<N>) -> Bus<N> {
    Bus::from_wires(std::array::from_fn(|i| if i + 1 == N { a[i] } else { a[i + 1] }))
}

/// Shift-and-add multiplier, truncated to `N` bits.
///
/// Every bit of `y` gates one logically shifted copy of `x`, and all `N`
/// partial products go through an adder whatever the operand values.
pub fn multiply<const N: usize>(n: &mut Netlist, x: &Bus<N>, y: &Bus<N>) -> Bus<N> {
    let mut acc = n.constant::<N>(0);
    let mut shifted = *x;
    for i in 0..N {
        let partial = gate_bus(n, &shifted, y[i]);
        acc = add(n, &acc, &partial);
        shifted = shift_left_logical(n, &shifted);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::gates::tests::simulate;
    use crate::netlist::Simulation;
    use proptest::prelude::*;

    struct Binary {
        sim: Simulation,
        a: Bus<16>,
        b: Bus<16>,
        out: Bus<16>,
    }

    impl Binary {
        fn build(chip: impl FnOnce(&mut Netlist, &Bus<16>, &Bus<16>) -> Bus<16>) -> Self {
            let mut n = Netlist::new();
            let a = n.input::<16>("a");
            let b = n.input::<16>("b");
            let out = chip(&mut n, &a, &b);
            Self {
                sim: simulate(n),
                a,
                b,
                out,
            }
        }

        fn eval(&mut self, a: u16, b: u16) -> u16 {
            self.sim.set(&self.a, a as u64);
            self.sim.set(&self.b, b as u64);
            self.sim.get(&self.out) as u16
        }
    }

    #[test]
    fn test_full_adder_truth_table() {
        let mut n = Netlist::new();
        let bits = n.input::<3>("abc");
        let cell = full_adder(&mut n, bits[0], bits[1], bits[2]);
        let mut sim = simulate(n);
        for v in 0..8u64 {
            sim.set(&bits, v);
            let total = v.count_ones();
            assert_eq!(sim.wire(cell.sum), total & 1 == 1, "sum of {:03b}", v);
            assert_eq!(sim.wire(cell.carry), total >= 2, "carry of {:03b}", v);
        }
    }

    #[test]
    fn test_half_adder() {
        let mut n = Netlist::new();
        let bits = n.input::<2>("ab");
        let cell = half_adder(&mut n, bits[0], bits[1]);
        let mut sim = simulate(n);
        sim.set(&bits, 0b11);
        assert!(!sim.wire(cell.sum));
        assert!(sim.wire(cell.carry));
        sim.set(&bits, 0b10);
        assert!(sim.wire(cell.sum));
        assert!(!sim.wire(cell.carry));
    }

    #[test]
    fn test_add_wraps() {
        let mut adder = Binary::build(|n, a, b| add(n, a, b));
        assert_eq!(adder.eval(2, 3), 5);
        assert_eq!(adder.eval(0xFFFF, 1), 0);
        assert_eq!(adder.eval(0x7FFF, 1), 0x8000);
        assert_eq!(adder.eval((-5i16) as u16, 3), (-2i16) as u16);
    }

    #[test]
    fn test_increment() {
        let mut n = Netlist::new();
        let a = n.input::<16>("a");
        let out = increment(&mut n, &a);
        let mut sim = simulate(n);
        for v in [0u16, 1, 41, 0x7FFF, 0xFFFF] {
            sim.set(&a, v as u64);
            assert_eq!(sim.get(&out) as u16, v.wrapping_add(1));
        }
    }

    #[test]
    fn test_shifts() {
        let mut n = Netlist::new();
        let a = n.input::<16>("a");
        let sll = shift_left_logical(&mut n, &a);
        let srl = shift_right_logical(&mut n, &a);
        let sla = shift_left_arithmetic(&mut n, &a);
        let sra = shift_right_arithmetic(&a);
        let mut sim = simulate(n);

        sim.set(&a, 0x8003);
        assert_eq!(sim.get(&sll), 0x0006);
        assert_eq!(sim.get(&srl), 0x4001);
        assert_eq!(sim.get(&sla), 0x8006);
        assert_eq!(sim.get(&sra), 0xC001);

        sim.set(&a, 0x4001);
        assert_eq!(sim.get(&sll), 0x8002);
        assert_eq!(sim.get(&sla), 0x0002);
        assert_eq!(sim.get(&sra), 0x2000);
    }

    #[test]
    fn test_multiply_edge_cases() {
        let mut mul = Binary::build(|n, a, b| multiply(n, a, b));
        assert_eq!(mul.eval(0, 1234), 0);
        assert_eq!(mul.eval(1234, 0), 0);
        assert_eq!(mul.eval(7, 6), 42);
        assert_eq!(mul.eval((-1i16) as u16, 1), (-1i16) as u16);
        assert_eq!(mul.eval((-3i16) as u16, (-3i16) as u16), 9);
        assert_eq!(mul.eval(0x100, 0x100), 0);
    }

    proptest! {
        #[test]
        fn prop_add_matches_wrapping_add(a: u16, b: u16) {
            let mut adder = Binary::build(|n, x, y| add(n, x, y));
            prop_assert_eq!(adder.eval(a, b), a.wrapping_add(b));
        }

        #[test]
        fn prop_multiply_matches_wrapping_mul(a: i16, b: i16) {
            let mut mul = Binary::build(|n, x, y| multiply(n, x, y));
            prop_assert_eq!(mul.eval(a as u16, b as u16), a.wrapping_mul(b) as u16);
        }
    }
}
