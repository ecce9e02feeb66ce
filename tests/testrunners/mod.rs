use i8080_cpm::Machine;

#[allow(dead_code)]
/// Loads `code` at 0x0100 (the `.COM` load address) and steps a fresh
/// [`Machine`] until it halts or the instruction budget is exhausted.
pub fn run_program(code: &[u8]) -> Machine {
    run_program_at(0x0100, code)
}

#[allow(dead_code)]
pub fn run_program_at(addr: u16, code: &[u8]) -> Machine {
    let mut m = Machine::new();
    m.mem.load(addr, code);
    m.pc = addr;

    let mut instructions_left = 10_000;
    while !m.halted && instructions_left > 0 {
        m.step();
        instructions_left -= 1;
    }
    m
}
