//! The Hack ALU and its extended variant.
//!
//! Standard control bits, MSB first: `zx nx zy ny f no`.
//!
//! ```text
//! zx: x = 0          zy: y = 0          f:  out = f ? x + y : x & y
//! nx: x = !x         ny: y = !y         no: out = !out
//! ```
//!
//! The extended control code is 9 bits wide:
//!
//! ```text
//! bits 8..7  selector A: 00 multiply, 01 shift, 10 multiply, 11 standard ALU
//! bits 6..5  selector B: 00 y >> 1, 01 x >> 1, 10 y << 1, 11 x << 1
//! bits 5..0  standard ALU control
//! ```
//!
//! Selector B is only consulted on the shift path and the ALU bits only on
//! the standard path, so the overlap at bit 5 is harmless.

use super::arith::{add, multiply, shift_left_logical, shift_right_logical};
use super::gates::{and_bus, mux_bus, mux_n, not, not_bus, or_many};
use super::Word;
use crate::netlist::{Bus, Netlist, Wire};

/// Standard control bit positions inside the 6-bit code.
pub const ZX: usize = 5;
pub const NX: usize = 4;
pub const ZY: usize = 3;
pub const NY: usize = 2;
pub const F: usize = 1;
pub const NO: usize = 0;

/// Result and status flags of an ALU evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOut {
    pub out: Word,
    /// 1 iff `out == 0`.
    pub zr: Wire,
    /// 1 iff `out < 0`.
    pub ng: Wire,
}

fn flags(n: &mut Netlist, out: Word) -> AluOut {
    let any = or_many(n, out.as_slice());
    AluOut {
        out,
        zr: not(n, any),
        ng: out[15],
    }
}

fn condition(n: &mut Netlist, operand: &Word, zero: Wire, negate: Wire) -> Word {
    let zeros = n.constant::<16>(0);
    let zeroed = mux_bus(n, operand, &zeros, zero);
    let inverted = not_bus(n, &zeroed);
    mux_bus(n, &zeroed, &inverted, negate)
}

pub fn alu(n: &mut Netlist, x: &Word, y: &Word, control: &Bus<6>) -> AluOut {
    let x = condition(n, x, control[ZX], control[NX]);
    let y = condition(n, y, control[ZY], control[NY]);
    let sum = add(n, &x, &y);
    let conjunction = and_bus(n, &x, &y);
    let pre = mux_bus(n, &conjunction, &sum, control[F]);
    let inverted = not_bus(n, &pre);
    let out = mux_bus(n, &pre, &inverted, control[NO]);
    flags(n, out)
}

/// ALU with multiply and shift functions. The flags always describe the
/// selected result, never the inner ALU's own flags.
pub fn extended_alu(n: &mut Netlist, x: &Word, y: &Word, control: &Bus<9>) -> AluOut {
    let product = multiply(n, x, y);
    let shifts = [
        shift_right_logical(n, y),
        shift_right_logical(n, x),
        shift_left_logical(n, y),
        shift_left_logical(n, x),
    ];
    let shifted = mux_n(n, &shifts, control.slice::<2>(5).as_slice());
    let standard = alu(n, x, y, &control.slice::<6>(0));
    let out = mux_n(
        n,
        &[product, shifted, product, standard.out],
        control.slice::<2>(7).as_slice(),
    );
    flags(n, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::gates::tests::simulate;
    use crate::netlist::Simulation;
    use proptest::prelude::*;

    /// Control codes of the Hack computation table.
    const ZERO: u64 = 0b101010;
    const ONE: u64 = 0b111111;
    const MINUS_ONE: u64 = 0b111010;
    const X: u64 = 0b001100;
    const Y: u64 = 0b110000;
    const NOT_X: u64 = 0b001101;
    const NOT_Y: u64 = 0b110001;
    const NEG_X: u64 = 0b001111;
    const NEG_Y: u64 = 0b110011;
    const X_PLUS_1: u64 = 0b011111;
    const Y_PLUS_1: u64 = 0b110111;
    const X_MINUS_1: u64 = 0b001110;
    const Y_MINUS_1: u64 = 0b110010;
    const X_PLUS_Y: u64 = 0b000010;
    const X_MINUS_Y: u64 = 0b010011;
    const Y_MINUS_X: u64 = 0b000111;
    const X_AND_Y: u64 = 0b000000;
    const X_OR_Y: u64 = 0b010101;

    struct Harness<const C: usize> {
        sim: Simulation,
        x: Word,
        y: Word,
        control: Bus<C>,
        out: AluOut,
    }

    impl<const C: usize> Harness<C> {
        fn build(chip: impl FnOnce(&mut Netlist, &Word, &Word, &Bus<C>) -> AluOut) -> Self {
            let mut n = Netlist::new();
            let x = n.input::<16>("x");
            let y = n.input::<16>("y");
            let control = n.input::<C>("control");
            let out = chip(&mut n, &x, &y, &control);
            Self {
                sim: simulate(n),
                x,
                y,
                control,
                out,
            }
        }

        /// Returns (out, zr, ng).
        fn eval(&mut self, x: u16, y: u16, control: u64) -> (u16, bool, bool) {
            self.sim.set(&self.x, x as u64);
            self.sim.set(&self.y, y as u64);
            self.sim.set(&self.control, control);
            let out = self.sim.get(&self.out.out) as u16;
            (out, self.sim.wire(self.out.zr), self.sim.wire(self.out.ng))
        }
    }

    fn standard() -> Harness<6> {
        Harness::build(|n, x, y, c| alu(n, x, y, c))
    }

    fn extended() -> Harness<9> {
        Harness::build(|n, x, y, c| extended_alu(n, x, y, c))
    }

    #[test]
    fn test_computation_table() {
        let mut h = standard();
        let (x, y) = (17u16, 3u16);
        let expect = [
            (ZERO, 0u16),
            (ONE, 1),
            (MINUS_ONE, 0xFFFF),
            (X, x),
            (Y, y),
            (NOT_X, !x),
            (NOT_Y, !y),
            (NEG_X, x.wrapping_neg()),
            (NEG_Y, y.wrapping_neg()),
            (X_PLUS_1, x + 1),
            (Y_PLUS_1, y + 1),
            (X_MINUS_1, x - 1),
            (Y_MINUS_1, y - 1),
            (X_PLUS_Y, x + y),
            (X_MINUS_Y, x - y),
            (Y_MINUS_X, y.wrapping_sub(x)),
            (X_AND_Y, x & y),
            (X_OR_Y, x | y),
        ];
        for (control, value) in expect {
            let (out, zr, ng) = h.eval(x, y, control);
            assert_eq!(out, value, "control {:06b}", control);
            assert_eq!(zr, value == 0, "zr for control {:06b}", control);
            assert_eq!(ng, (value as i16) < 0, "ng for control {:06b}", control);
        }
    }

    #[test]
    fn test_flags() {
        let mut h = standard();
        assert_eq!(h.eval(5, 5, X_MINUS_Y), (0, true, false));
        assert_eq!(h.eval(4, 5, X_MINUS_Y), (0xFFFF, false, true));
        assert_eq!(h.eval(6, 5, X_MINUS_Y), (1, false, false));
    }

    #[test]
    fn test_extended_selects_standard_path() {
        let mut h = extended();
        let control = (0b11 << 7) | X_PLUS_Y;
        assert_eq!(h.eval(40, 2, control), (42, false, false));
    }

    #[test]
    fn test_extended_multiply_alias() {
        let mut h = extended();
        for selector in [0b00u64, 0b10] {
            let (out, zr, ng) = h.eval((-6i16) as u16, 7, selector << 7);
            assert_eq!(out as i16, -42);
            assert!(!zr);
            assert!(ng);
        }
    }

    #[test]
    fn test_extended_shifts() {
        let mut h = extended();
        let shift = |b: u64| (0b01 << 7) | (b << 5);
        let (x, y) = (0x8001u16, 0x0006u16);
        assert_eq!(h.eval(x, y, shift(0b00)).0, 0x0003);
        assert_eq!(h.eval(x, y, shift(0b01)).0, 0x4000);
        assert_eq!(h.eval(x, y, shift(0b10)).0, 0x000C);
        // flags follow the selected result
        assert_eq!(h.eval(x, y, shift(0b11)), (0x0002, false, false));
        assert_eq!(h.eval(0x8000, y, shift(0b11)), (0, true, false));
    }

    proptest! {
        #[test]
        fn prop_zero_function(x: u16, y: u16) {
            let mut h = standard();
            prop_assert_eq!(h.eval(x, y, ZERO), (0, true, false));
        }

        #[test]
        fn prop_add_function(x: u16, y: u16) {
            let mut h = standard();
            let (out, zr, ng) = h.eval(x, y, X_PLUS_Y);
            let sum = x.wrapping_add(y);
            prop_assert_eq!(out, sum);
            prop_assert_eq!(zr, sum == 0);
            prop_assert_eq!(ng, (sum as i16) < 0);
        }

        #[test]
        fn prop_extended_standard_path_matches_alu(x: u16, y: u16, control in 0u64..64) {
            let mut plain = standard();
            let mut ext = extended();
            prop_assert_eq!(ext.eval(x, y, (0b11 << 7) | control), plain.eval(x, y, control));
        }
    }
}
