use clap::Parser;

use i8080_cpm::cli::Cli;
use i8080_cpm::runner;

fn main() {
    let cli = Cli::parse();

    let mut machine =
        match runner::load_program(&cli.program, cli.name_arg(), cli.max_instructions) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: Could not load program {}: {e}", cli.program.display());
                std::process::exit(1);
            }
        };

    let summary = runner::run(&mut machine, cli.max_instructions());

    println!(
        "\nHALTED after {} instructions ({} cycles)",
        summary.instructions, summary.cycles
    );
    print_state(&machine);
}

fn print_state(m: &i8080_cpm::Machine) {
    println!("PC={:04X} SP={:04X}", m.pc, m.sp);
    println!(
        "A={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X}",
        m.regs.a, m.regs.b, m.regs.c, m.regs.d, m.regs.e, m.regs.h, m.regs.l
    );
    println!(
        "S={} Z={} AC={} P={} CY={}",
        m.flags.sign() as u8,
        m.flags.zero() as u8,
        m.flags.aux_carry() as u8,
        m.flags.parity() as u8,
        m.flags.carry() as u8
    );
    println!("HALT={} INT={}", m.halted as u8, m.interrupts_enabled as u8);
}
