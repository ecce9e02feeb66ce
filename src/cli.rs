//! Command-line surface: `i8080-cpm <program> [name-arg] [max-instructions]`,
//! mirroring the reference implementation's positional argument order.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "i8080-cpm",
    about = "An Intel 8080 CPU emulator with a CP/M 2.2 BDOS shim"
)]
pub struct Cli {
    /// Program image to load and run (.com loads at 0x0100, anything else at 0x0000).
    pub program: PathBuf,

    /// Argument the default FCB and command tail are derived from.
    /// Defaults to `program` when omitted.
    pub name_arg: Option<PathBuf>,

    /// Instruction budget; 0 means run until HLT/warm boot with no cap.
    /// Left unset (rather than defaulted) so the command tail only ever
    /// carries it when the caller actually typed it, matching the
    /// reference implementation's `argc >= 4` check.
    pub max_instructions: Option<u64>,
}

impl Cli {
    pub fn name_arg(&self) -> &std::path::Path {
        self.name_arg.as_deref().unwrap_or(&self.program)
    }

    pub fn max_instructions(&self) -> u64 {
        self.max_instructions
            .unwrap_or(crate::runner::DEFAULT_MAX_INSTRUCTIONS)
    }
}
