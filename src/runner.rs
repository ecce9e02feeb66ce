//! Loads a guest program into a fresh [`Machine`] and sets up the CP/M
//! environment the reference implementation builds before handing control
//! to the guest: the warm-boot/BDOS trampoline at page zero, the default
//! FCB at 0x005C, and the command-tail buffer at 0x0080.
//!
//! Grounded in `main.c`'s `LoadProgram`/`main`: load address by extension,
//! default-FCB derivation from the second CLI argument (falling back to
//! the first), and the unbounded-when-zero instruction cap all follow it.

use std::fs;
use std::io;
use std::path::Path;

use crate::cpu::Machine;
use crate::fcb;

/// `.COM` images load at CP/M's standard TPA origin; anything else (raw
/// 8080 assemblies) loads at 0x0000.
const COM_LOAD_ADDR: u16 = 0x0100;
const RAW_LOAD_ADDR: u16 = 0x0000;

pub const DEFAULT_MAX_INSTRUCTIONS: u64 = 50_000_000;

#[derive(Debug)]
pub struct RunSummary {
    pub instructions: u64,
    pub cycles: u64,
}

/// Reads `program_path` off disk and returns the machine it was loaded
/// into. `name_arg` is the CLI argument the default FCB and command tail
/// are derived from: the reference implementation uses the second
/// positional argument when present, falling back to the program path.
/// `max_instructions_arg` is the raw third positional argument, carried
/// through only so the command tail can include it exactly when the
/// caller typed it, as `main.c` does for every `argv` entry.
pub fn load_program(
    program_path: &Path,
    name_arg: &Path,
    max_instructions_arg: Option<u64>,
) -> io::Result<Machine> {
    let image = fs::read(program_path)?;

    let mut m = Machine::new();
    let load_addr = if has_com_extension(program_path) {
        COM_LOAD_ADDR
    } else {
        RAW_LOAD_ADDR
    };
    m.mem.load(load_addr, &image);

    install_trampoline(&mut m);
    write_command_tail(&mut m, program_path, name_arg, max_instructions_arg);
    fcb::write_name(
        &mut m.mem,
        fcb::DEFAULT_FCB_ADDR,
        &file_stem(name_arg),
        &file_ext(name_arg),
    );

    m.pc = load_addr;
    Ok(m)
}

fn has_com_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("com"))
        .unwrap_or(false)
}

/// `JMP 0x0000` at the warm-boot vector, `RET` at the BDOS entry point.
/// `Machine::step` intercepts both addresses directly, but a guest that
/// reads these bytes before calling them still sees a coherent trampoline.
fn install_trampoline(m: &mut Machine) {
    m.mem.write_8(0x0000, 0xC3);
    m.mem.write_8(0x0001, 0x00);
    m.mem.write_8(0x0002, 0x00);
    m.mem.write_8(0x0005, 0xC9);
}

/// The command tail at 0x0080: a length-prefixed copy of the invocation
/// line, as CP/M programs expect to find it. Joins every CLI argument the
/// caller actually supplied, mirroring `main.c`'s
/// `for (int idx = 1; idx < argc; idx++) strcat(cmdTail, argv[idx])`.
fn write_command_tail(
    m: &mut Machine,
    program_path: &Path,
    name_arg: &Path,
    max_instructions_arg: Option<u64>,
) {
    let mut tail = program_path.to_string_lossy().into_owned();
    if name_arg != program_path {
        tail.push(' ');
        tail.push_str(&name_arg.to_string_lossy());
    }
    if let Some(max_instructions) = max_instructions_arg {
        tail.push(' ');
        tail.push_str(&max_instructions.to_string());
    }
    let bytes = tail.as_bytes();
    let len = bytes.len().min(127);
    m.mem.write_8(0x0080, len as u8);
    m.mem.load(0x0081, &bytes[..len]);
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_ext(path: &Path) -> String {
    path.extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Runs `m` to completion (HLT, warm boot, or the instruction cap,
/// whichever comes first), then releases any host files the guest left
/// open. `max_instructions == 0` means unbounded, matching the reference
/// implementation's behaviour for exhaustive instruction-set exercisers.
pub fn run(m: &mut Machine, max_instructions: u64) -> RunSummary {
    let mut instructions = 0u64;
    let mut cycles = 0u64;

    loop {
        if m.halted {
            break;
        }
        if max_instructions != 0 && instructions >= max_instructions {
            break;
        }
        cycles += m.step() as u64;
        instructions += 1;
    }

    m.bdos.close_all();
    RunSummary {
        instructions,
        cycles,
    }
}
