use i8080_cpm::fcb;
use i8080_cpm::Machine;
use std::fs;

fn temp_path(name: &str) -> std::path::PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("i8080_cpm_dos_test_{name}"));
    p
}

/// Runs one BDOS call with C=`func`, DE=`de`, from a fresh `CALL 0x0005`
/// at 0x0100.
fn bdos_call(m: &mut Machine, func: u8, de: u16) {
    m.regs.c = func;
    m.regs.set_de(de);
    m.pc = 0x0100;
    m.mem.write_8(0x0100, 0xCD);
    m.mem.write_16(0x0101, 0x0005);
    m.step();
}

#[test]
fn make_file_write_close_open_read_round_trips_a_full_record() {
    let path = temp_path("roundtrip.txt");
    let _ = fs::remove_file(&path);
    std::env::set_current_dir(std::env::temp_dir()).unwrap();
    let filename = path.file_name().unwrap().to_str().unwrap();

    let mut m = Machine::new();
    fcb::write_name(&mut m.mem, fcb::DEFAULT_FCB_ADDR, "roundtrip", "txt");
    assert_eq!(filename, "i8080_cpm_dos_test_roundtrip.txt");

    bdos_call(&mut m, 22, fcb::DEFAULT_FCB_ADDR); // MAKE FILE
    assert_eq!(m.regs.a, 0x00);

    m.bdos.dma = 0x0200;
    for i in 0..128u16 {
        m.mem.write_8(0x0200 + i, i as u8);
    }
    bdos_call(&mut m, 21, fcb::DEFAULT_FCB_ADDR); // WRITE SEQUENTIAL
    assert_eq!(m.regs.a, 0x00);

    bdos_call(&mut m, 16, fcb::DEFAULT_FCB_ADDR); // CLOSE
    assert_eq!(m.regs.a, 0x00);

    bdos_call(&mut m, 15, fcb::DEFAULT_FCB_ADDR); // OPEN
    assert_eq!(m.regs.a, 0x00);

    m.bdos.dma = 0x0300;
    bdos_call(&mut m, 20, fcb::DEFAULT_FCB_ADDR); // READ SEQUENTIAL
    assert_eq!(m.regs.a, 0x00);

    for i in 0..128u16 {
        assert_eq!(m.mem.read_8(0x0300 + i), i as u8, "byte {i}");
    }

    m.bdos.close_all();
    let _ = fs::remove_file(&path);
}

#[test]
fn read_sequential_on_unopened_fcb_fails() {
    let mut m = Machine::new();
    fcb::write_name(&mut m.mem, fcb::DEFAULT_FCB_ADDR, "nope", "txt");
    bdos_call(&mut m, 20, fcb::DEFAULT_FCB_ADDR);
    assert_eq!(m.regs.a, 0xFF);
}

#[test]
fn print_string_stops_at_dollar_sign() {
    let mut m = Machine::new();
    let msg = b"HELLO$GARBAGE";
    for (i, byte) in msg.iter().enumerate() {
        m.mem.write_8(0x0400 + i as u16, *byte);
    }
    bdos_call(&mut m, 9, 0x0400); // PRINT STRING
    assert_eq!(m.mem.read_8(0x0400), b'H'); // source buffer is untouched
}

#[test]
fn get_version_returns_0x0022() {
    let mut m = Machine::new();
    bdos_call(&mut m, 12, 0);
    assert_eq!(m.regs.a, 0x22);
    assert_eq!(m.regs.h, 0x00);
    assert_eq!(m.regs.l, 0x22);
}

#[test]
fn unknown_function_returns_0xff() {
    let mut m = Machine::new();
    bdos_call(&mut m, 200, 0);
    assert_eq!(m.regs.a, 0xFF);
    assert_eq!(m.regs.l, 0xFF);
}

#[test]
fn search_first_always_fails() {
    let mut m = Machine::new();
    bdos_call(&mut m, 17, 0);
    assert_eq!(m.regs.a, 0xFF);
}

#[test]
fn write_random_with_zero_fill_aliases_write_random() {
    let path = temp_path("random.dat");
    let _ = fs::remove_file(&path);
    std::env::set_current_dir(std::env::temp_dir()).unwrap();

    let mut m = Machine::new();
    fcb::write_name(&mut m.mem, fcb::DEFAULT_FCB_ADDR, "random", "dat");
    bdos_call(&mut m, 22, fcb::DEFAULT_FCB_ADDR); // MAKE FILE

    fcb::write_random_record(&mut m.mem, fcb::DEFAULT_FCB_ADDR, 0);
    m.bdos.dma = 0x0200;
    for i in 0..128u16 {
        m.mem.write_8(0x0200 + i, 0xAA);
    }
    bdos_call(&mut m, 40, fcb::DEFAULT_FCB_ADDR); // WRITE RANDOM (WITH ZERO FILL)
    assert_eq!(m.regs.a, 0x00);

    m.bdos.close_all();
    let written = fs::read(&path).unwrap();
    assert_eq!(written.len(), 128);
    assert!(written.iter().all(|&b| b == 0xAA));
    let _ = fs::remove_file(&path);
}
