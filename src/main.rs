//! Hack Simulator - CLI Entry Point
//!
//! Commands:
//! - `hack-sim run <program>` - Run an ASM or HACK file on the gate-level computer
//! - `hack-sim asm <source>` - Assemble to HACK
//! - `hack-sim disasm <hack>` - Disassemble HACK
//! - `hack-sim test` - Built-in self-test

use clap::{ArgAction, Parser, Subcommand};
use hack::asm::disassemble_instruction;
use hack::{Computer, MachineConfig};
use serde::Serialize;
use std::path::Path;

#[derive(Parser)]
#[command(name = "hack-sim")]
#[command(version)]
#[command(about = "A gate-level simulator of the Hack computer")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the ASM or HACK file to execute
        program: String,
        /// Maximum number of cycles to run
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Machine configuration (JSON)
        #[arg(short, long)]
        config: Option<String>,
        /// Print the first N data memory words after the run
        #[arg(short, long)]
        dump: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Assemble source to HACK
    Asm {
        /// Path to the source file
        source: String,
        /// Output HACK file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble HACK to readable text
    Disasm {
        /// Path to the HACK file
        program: String,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    let cli = Cli::parse();
    hack::logging::logging_setup(cli.verbose);

    match cli.command {
        Some(Commands::Run {
            program,
            max_cycles,
            trace,
            config,
            dump,
            json,
        }) => {
            let options = RunOptions {
                max_cycles,
                trace,
                dump,
                json,
            };
            run_program(&program, config.as_deref(), &options);
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { program }) => {
            disassemble_file(&program);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("Hack Simulator v{}", env!("CARGO_PKG_VERSION"));
            println!("A computer built from NAND gates and flip-flops");
            println!();
            println!("Use --help for available commands");
            println!();
            demo();
        }
    }
}

struct RunOptions {
    max_cycles: u64,
    trace: bool,
    dump: Option<usize>,
    json: bool,
}

#[derive(Serialize)]
struct RunReport {
    summary: hack::RunSummary,
    ticks: u64,
    circuit: hack::netlist::CircuitStats,
    memory: Vec<u16>,
}

/// Assemble `.asm` files, load anything else as `.hack`.
fn load_program(path: &str) -> Vec<u16> {
    let is_asm = Path::new(path).extension().is_some_and(|ext| ext == "asm");
    if is_asm {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to read file: {}", e);
                std::process::exit(1);
            }
        };
        match hack::assemble(&source) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match hack::load_hack(path) {
            Ok(file) => file.words,
            Err(e) => {
                eprintln!("❌ Failed to load HACK file: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run_program(path: &str, config_path: Option<&str>, options: &RunOptions) {
    let config = match config_path {
        Some(p) => match MachineConfig::from_json_file(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => MachineConfig::default(),
    };

    let words = load_program(path);
    if words.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    let mut computer = match Computer::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to build computer: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = computer.load_program(&words) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    if !options.json {
        let stats = computer.stats();
        println!("🔧 Running: {} ({} words)", path, words.len());
        println!(
            "   circuit: {} NAND gates, {} flip-flops",
            stats.nands, stats.flip_flops
        );
        println!();
        println!("━━━ Execution ━━━");
    }

    let summary = if options.trace {
        let start = computer.tick_count();
        while computer.state() == hack::CpuState::Running
            && computer.tick_count() - start < options.max_cycles
        {
            let pc = computer.pc();
            let text = disassemble_instruction(computer.fetch(pc));
            computer.step();
            if !options.json {
                println!(
                    "{:05}: {:<16} A={} D={}",
                    pc,
                    text,
                    computer.a(),
                    computer.d() as i16
                );
            }
        }
        // picks up the cycle count and final registers
        let mut summary = computer.run(0);
        summary.cycles = computer.tick_count() - start;
        summary
    } else {
        computer.run(options.max_cycles)
    };

    let dump = options.dump.unwrap_or(0).min(computer.memory_size());
    let memory: Vec<u16> = (0..dump).filter_map(|a| computer.memory(a)).collect();

    if options.json {
        let report = RunReport {
            summary,
            ticks: computer.tick_count(),
            circuit: computer.stats(),
            memory,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to encode result: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", summary.cycles);
    println!("State: {:?}", summary.state);
    println!("PC: {}", summary.pc);
    println!("A:  {} ({})", summary.a, summary.a as i16);
    println!("D:  {} ({})", summary.d, summary.d as i16);
    for (address, value) in memory.iter().enumerate() {
        println!("RAM[{:5}] = {:6} ({:016b})", address, *value as i16, value);
    }

    if summary.state == hack::CpuState::Running && summary.cycles >= options.max_cycles {
        println!();
        println!(
            "⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.",
            options.max_cycles
        );
    }
}

fn assemble_file(source_path: &str, output: Option<String>) {
    let out_path = output.unwrap_or_else(|| {
        Path::new(source_path)
            .with_extension("hack")
            .to_string_lossy()
            .into_owned()
    });

    println!("📝 Assembling: {} → {}", source_path, out_path);

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let words = match hack::assemble(&source) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Assembled {} instructions", words.len());

    if let Err(e) = hack::save_hack(&out_path, &words) {
        eprintln!("❌ Failed to save HACK file: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(path: &str) {
    println!("📖 Disassembling: {}", path);
    println!();

    let file = match hack::load_hack(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("❌ Failed to load HACK file: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", hack::disassemble(&file.words));
}

/// Multiplies R0 by R1 into R2 with repeated addition.
const DEMO_PROGRAM: &str = "
    @R2
    M=0
(LOOP)
    @R1
    D=M
    @END
    D;JLE
    @R0
    D=M
    @R2
    M=D+M
    @R1
    M=M-1
    @LOOP
    0;JMP
(END)
    @END
    0;JMP
";

fn demo() {
    println!("━━━ Gate-Level Demo ━━━");
    println!();

    let words = match hack::assemble(DEMO_PROGRAM) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };
    let config = MachineConfig {
        data_address_bits: 6,
        ..MachineConfig::default()
    };
    let mut computer = match Computer::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to build computer: {}", e);
            std::process::exit(1);
        }
    };
    let stats = computer.stats();
    println!(
        "Computer with {} words of RAM: {} NAND gates, {} flip-flops",
        computer.memory_size(),
        stats.nands,
        stats.flip_flops
    );

    let loaded = computer
        .set_memory(0, 6)
        .and_then(|_| computer.set_memory(1, 7))
        .and_then(|_| computer.load_program(&words));
    if let Err(e) = loaded {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    let summary = computer.run(1000);
    println!(
        "  R0 × R1 = 6 × 7 = {} ({} cycles, {:?})",
        computer.memory(2).unwrap_or(0),
        summary.cycles,
        summary.state
    );
    println!();
    println!("✓ Gate-level computer working!");
}

fn check(name: &str, ok: bool, passed: &mut u32, failed: &mut u32) {
    print!("{}... ", name);
    if ok {
        println!("✓");
        *passed += 1;
    } else {
        println!("✗");
        *failed += 1;
    }
}

fn run_program_on(config: MachineConfig, source: &str, cycles: u64) -> Option<Computer> {
    let words = hack::assemble(source).ok()?;
    let mut computer = Computer::new(config).ok()?;
    computer.load_program(&words).ok()?;
    computer.run(cycles);
    Some(computer)
}

fn run_self_test() {
    use hack::cpu::reference::{alu, extended_alu};
    use hack::{AluVariant, ReferenceMachine};

    println!("━━━ Hack Simulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;
    let small = MachineConfig {
        data_address_bits: 4,
        ..MachineConfig::default()
    };
    let extended = MachineConfig {
        alu: AluVariant::Extended,
        ..small
    };

    // Test 1: CPU scenario
    let ok = run_program_on(small, "@5\nD=D+A", 2)
        .is_some_and(|c| c.d() == 5 && c.pc() == 2 && (0..16).all(|a| c.memory(a) == Some(0)));
    check("CPU load then add", ok, &mut passed, &mut failed);

    // Test 2: Memory store and load
    let ok = run_program_on(small, "@1234\nD=A\n@9\nM=D\nD=0\nD=M", 6)
        .is_some_and(|c| c.memory(9) == Some(1234) && c.d() == 1234);
    check("Memory store/load", ok, &mut passed, &mut failed);

    // Test 3: Halt detection
    let ok = run_program_on(small, "(END)\n@END\n0;JMP", 100)
        .is_some_and(|c| c.state() == hack::CpuState::Halted);
    check("Idle loop halts", ok, &mut passed, &mut failed);

    // Test 4: Extended ALU multiply on gates
    let ok = run_program_on(extended, "@300\nD=A\n@7\nD=D*A", 4).is_some_and(|c| c.d() == 2100);
    check("Extended ALU multiply", ok, &mut passed, &mut failed);

    // Test 5: Reference ALU identities
    let ok = [0u16, 1, 0x7FFF, 0x8000, 0xFFFF]
        .iter()
        .all(|&x| alu(x, x, 0b101010) == (0, true, false) && extended_alu(x, 1, 0).0 == x);
    check("ALU identities", ok, &mut passed, &mut failed);

    // Test 6: Gate-level vs reference machine
    let program = hack::assemble(DEMO_PROGRAM).unwrap_or_default();
    let ok = Computer::new(small).ok().is_some_and(|mut computer| {
        let mut reference = ReferenceMachine::new(16, AluVariant::Standard);
        reference.ram[0] = 3;
        reference.ram[1] = 4;
        let loaded = computer.set_memory(0, 3).is_ok()
            && computer.set_memory(1, 4).is_ok()
            && computer.load_program(&program).is_ok();
        for _ in 0..60 {
            computer.step();
        }
        reference.run(&program, 60);
        loaded
            && computer.a() == reference.a
            && computer.d() == reference.d
            && computer.pc() == reference.pc
            && (0..16).all(|a| computer.memory(a) == Some(reference.ram[a]))
            && reference.ram[2] == 12
    });
    check("Gates match reference machine", ok, &mut passed, &mut failed);

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
