//! Recursively composed random-access memory.
//!
//! A memory with `k` address bits is made of 8 memories with `k - 3` address
//! bits (or 4 / 2 when `k` is not a multiple of 3, at the top level only).
//! The low address bits go unchanged to every child. The high bits drive a
//! demultiplexer that hands the load signal to exactly one child and a
//! multiplexer that picks which child's output is forwarded. The base case
//! is a single [`register`].
//!
//! | chip   | address bits | levels |
//! |--------|--------------|--------|
//! | RAM8   | 3            | 1      |
//! | RAM64  | 6            | 2      |
//! | RAM512 | 9            | 3      |
//! | RAM4K  | 12           | 4      |
//! | RAM16K | 14           | 5      |
//! | RAM32K | 15           | 5      |

use super::gates::{dmux_n, mux_n};
use super::seq::register;
use super::Word;
use crate::netlist::{Bus, Netlist, Wire};

/// Ports of a composed memory.
#[derive(Debug, Clone)]
pub struct Ram {
    /// Contents of the addressed cell.
    pub out: Word,
    /// Output wires of every cell, indexed by address. Observation only.
    pub cells: Vec<Word>,
}

impl Ram {
    pub fn size(&self) -> usize {
        self.cells.len()
    }
}

struct AddressWidth<const A: usize>;

impl<const A: usize> AddressWidth<A> {
    const VALID: () = assert!(A >= 3 && A <= 15, "memory address width must be 3..=15 bits");
}

/// Memory of `2^A` 16-bit words.
pub fn ram<const A: usize>(n: &mut Netlist, input: &Word, load: Wire, address: &Bus<A>) -> Ram {
    #[allow(clippy::let_unit_value)]
    let () = AddressWidth::<A>::VALID;
    ram_dyn(n, input, load, address.as_slice())
}

/// Memory addressed by a runtime-sized slice of address wires.
///
/// # Panics
/// Panics if `address` is not 3..=15 wires wide.
pub fn ram_dyn(n: &mut Netlist, input: &Word, load: Wire, address: &[Wire]) -> Ram {
    assert!(
        (3..=15).contains(&address.len()),
        "memory address width must be 3..=15 bits, got {}",
        address.len()
    );
    let mut cells = Vec::with_capacity(1 << address.len());
    let out = level(n, input, load, address, &mut cells);
    Ram { out, cells }
}

fn level(n: &mut Netlist, input: &Word, load: Wire, address: &[Wire], cells: &mut Vec<Word>) -> Word {
    if address.is_empty() {
        let out = register(n, input, load);
        cells.push(out);
        return out;
    }
    let select_bits = match address.len() % 3 {
        0 => 3,
        r => r,
    };
    let (low, high) = address.split_at(address.len() - select_bits);
    let loads = dmux_n(n, load, high);
    let children: Vec<Word> = loads
        .into_iter()
        .map(|child_load| level(n, input, child_load, low, cells))
        .collect();
    mux_n(n, &children, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::gates::tests::simulate;
    use crate::netlist::Simulation;
    use proptest::prelude::*;

    struct Memory<const A: usize> {
        sim: Simulation,
        input: Word,
        load: Wire,
        address: Bus<A>,
        ram: Ram,
    }

    impl<const A: usize> Memory<A> {
        fn new() -> Self {
            let mut n = Netlist::new();
            let input = n.input::<16>("in");
            let load = n.input_wire("load");
            let address = n.input::<A>("address");
            let ram = ram(&mut n, &input, load, &address);
            Self {
                sim: simulate(n),
                input,
                load,
                address,
                ram,
            }
        }

        fn write(&mut self, address: u64, value: u16) {
            self.sim.set(&self.address, address);
            self.sim.set(&self.input, value as u64);
            self.sim.set_wire(self.load, true);
            self.sim.tick();
            self.sim.set_wire(self.load, false);
        }

        fn read(&mut self, address: u64) -> u16 {
            self.sim.set(&self.address, address);
            self.sim.get(&self.ram.out) as u16
        }
    }

    #[test]
    fn test_ram8_write_read() {
        let mut mem = Memory::<3>::new();
        assert_eq!(mem.ram.size(), 8);
        mem.write(3, 1234);
        assert_eq!(mem.read(3), 1234);
        for other in (0..8).filter(|&a| a != 3) {
            assert_eq!(mem.read(other), 0);
        }
    }

    #[test]
    fn test_write_is_not_visible_within_tick() {
        let mut mem = Memory::<6>::new();
        mem.sim.set(&mem.address, 40);
        mem.sim.set(&mem.input, 77);
        mem.sim.set_wire(mem.load, true);
        assert_eq!(mem.sim.get(&mem.ram.out), 0);
        mem.sim.tick();
        assert_eq!(mem.sim.get(&mem.ram.out), 77);
    }

    #[test]
    fn test_cells_are_indexed_by_address() {
        let mut mem = Memory::<9>::new();
        mem.write(0, 1);
        mem.write(300, 2);
        mem.write(511, 3);
        assert_eq!(mem.sim.peek(mem.ram.cells[0].as_slice()), 1);
        assert_eq!(mem.sim.peek(mem.ram.cells[300].as_slice()), 2);
        assert_eq!(mem.sim.peek(mem.ram.cells[511].as_slice()), 3);
    }

    #[test]
    fn test_ram16k_matches_flat_array() {
        let mut mem = Memory::<14>::new();
        assert_eq!(mem.ram.size(), 16384);
        let writes = [(0u64, 11u16), (16383, 22), (4096, 33), (8191, 44), (1, 55), (4096, 66)];
        let mut flat = vec![0u16; 16384];
        for &(address, value) in &writes {
            mem.write(address, value);
            flat[address as usize] = value;
        }
        for address in [0u64, 1, 2, 4095, 4096, 4097, 8191, 8192, 16383] {
            assert_eq!(mem.read(address), flat[address as usize], "address {}", address);
        }
    }

    #[test]
    fn test_odd_widths_compose() {
        let mut mem = Memory::<4>::new();
        assert_eq!(mem.ram.size(), 16);
        mem.write(9, 5);
        assert_eq!(mem.read(9), 5);
        assert_eq!(mem.read(1), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_ram512_behaves_like_array(
            ops in proptest::collection::vec((0u64..512, any::<u16>()), 1..24),
            probe in 0u64..512,
        ) {
            let mut mem = Memory::<9>::new();
            let mut flat = vec![0u16; 512];
            for &(address, value) in &ops {
                mem.write(address, value);
                flat[address as usize] = value;
            }
            prop_assert_eq!(mem.read(probe), flat[probe as usize]);
            for &(address, _) in &ops {
                prop_assert_eq!(mem.read(address), flat[address as usize]);
            }
        }
    }
}
