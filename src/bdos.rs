//! The CP/M 2.2 BDOS call shim: dispatches on the function number in
//! register C, services it against the host terminal/filesystem, and
//! returns a result in A (mirrored into L, the CP/M calling convention).
//!
//! Grounded in the reference implementation's `bdos.c`: function numbers,
//! argument placement and the `0xFF`/`0x00` error convention all follow it.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::cpu::Machine;
use crate::fcb;

pub const RECORD_SIZE: usize = 128;
const MAX_OPEN_FILES: usize = 16;
const EOF_FILL: u8 = 0x1A;

struct OpenFileSlot {
    file: File,
    fcb_addr: u16,
}

/// BDOS-owned state: the DMA pointer, current disk, and the open-file
/// table keyed by guest FCB address. A host file handle is owned
/// exclusively by its slot; BDOS close is the only path that releases it,
/// other than [`BdosState::close_all`] on program exit.
pub struct BdosState {
    pub dma: u16,
    pub current_disk: u8,
    open_files: [Option<OpenFileSlot>; MAX_OPEN_FILES],
}

impl Default for BdosState {
    fn default() -> Self {
        BdosState {
            dma: 0x0080,
            current_disk: 0,
            open_files: std::array::from_fn(|_| None),
        }
    }
}

impl BdosState {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, fcb_addr: u16) -> Option<usize> {
        self.open_files
            .iter()
            .position(|slot| matches!(slot, Some(s) if s.fcb_addr == fcb_addr))
    }

    fn free_slot(&self) -> Option<usize> {
        self.open_files.iter().position(|slot| slot.is_none())
    }

    /// Closes every remaining open host file. Called on program halt so a
    /// guest that forgets to close its files doesn't leak handles.
    pub fn close_all(&mut self) {
        for slot in self.open_files.iter_mut() {
            *slot = None;
        }
    }
}

fn set_result(m: &mut Machine, value: u8) {
    m.regs.a = value;
    m.regs.l = value;
}

fn set_ok(m: &mut Machine) {
    set_result(m, 0x00);
}

fn set_fail(m: &mut Machine) {
    set_result(m, 0xFF);
}

/// Runs the BDOS function named by register C. `JMP 0x0000` (CP/M warm
/// boot) is handled by the instruction engine directly, not here.
pub fn dispatch(m: &mut Machine) {
    let func = m.regs.c;
    let de = m.regs.de();

    match func {
        0 => m.halted = true,
        1 => console_input(m),
        2 => {
            write_stdout(m.regs.e);
            set_ok(m);
        }
        3 => set_result(m, EOF_FILL),
        5 => {
            write_stdout(m.regs.e);
            set_ok(m);
        }
        6 => direct_console_io(m),
        7 => set_ok(m),
        9 => print_string(m, de),
        10 => read_console_buffer(m, de),
        11 => set_ok(m),
        12 => {
            m.regs.h = 0x00;
            m.regs.l = 0x22;
            m.regs.a = 0x22;
        }
        13 => {
            m.bdos.current_disk = 0;
            m.bdos.dma = 0x0080;
            set_ok(m);
        }
        14 => {
            m.bdos.current_disk = m.regs.e;
            set_ok(m);
        }
        15 => open_file(m, de),
        16 => close_file(m, de),
        17 => set_fail(m),
        19 => delete_file(m, de),
        20 => read_sequential(m, de),
        21 => write_sequential(m, de),
        22 => make_file(m, de),
        23 => rename_file(m, de),
        24 => {
            m.regs.h = 0x00;
            m.regs.l = 0x01;
            m.regs.a = 0x01;
        }
        25 => set_result(m, m.bdos.current_disk),
        26 => m.bdos.dma = de,
        33 => read_random(m, de),
        34 => write_random(m, de),
        35 => compute_file_size(m, de),
        36 => set_random_record(m, de),
        40 => write_random(m, de),
        _ => set_fail(m),
    }
}

fn write_stdout(byte: u8) {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(&[byte]);
    let _ = stdout.flush();
}

fn read_stdin_byte() -> Option<u8> {
    let mut buf = [0u8; 1];
    match io::stdin().read(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf[0]),
        Err(_) => None,
    }
}

fn console_input(m: &mut Machine) {
    let byte = read_stdin_byte().unwrap_or(EOF_FILL);
    set_result(m, byte);
}

fn direct_console_io(m: &mut Machine) {
    if m.regs.e == 0xFF {
        set_ok(m);
    } else {
        write_stdout(m.regs.e);
    }
}

fn print_string(m: &mut Machine, start: u16) {
    let mut addr = start;
    let mut out = Vec::new();
    loop {
        let byte = m.mem.read_8(addr);
        if byte == b'$' {
            break;
        }
        out.push(byte);
        addr = addr.wrapping_add(1);
    }
    let mut stdout = io::stdout();
    let _ = stdout.write_all(&out);
    let _ = stdout.flush();
}

fn read_console_buffer(m: &mut Machine, buf_addr: u16) {
    let max_len = m.mem.read_8(buf_addr);
    let data_start = buf_addr.wrapping_add(2);

    let mut stdout = io::stdout();
    let mut len: u8 = 0;
    while len < max_len {
        let Some(byte) = read_stdin_byte() else { break };
        if byte == b'\n' {
            break;
        }
        if byte == 0x08 || byte == 0x7F {
            if len > 0 {
                len -= 1;
                let _ = stdout.write_all(b"\x08 \x08");
                let _ = stdout.flush();
            }
            continue;
        }
        m.mem.write_8(data_start + len as u16, byte);
        let _ = stdout.write_all(&[byte]);
        let _ = stdout.flush();
        len += 1;
    }

    m.mem.write_8(buf_addr.wrapping_add(1), len);
    let _ = stdout.write_all(b"\n");
    let _ = stdout.flush();
}

fn open_file(m: &mut Machine, fcb_addr: u16) {
    let Some(slot) = m.bdos.free_slot() else {
        set_fail(m);
        return;
    };

    let filename = fcb::derive_filename(&m.mem, fcb_addr);
    let opened = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&filename)
        .or_else(|_| OpenOptions::new().read(true).open(&filename));

    match opened {
        Ok(file) => {
            m.bdos.open_files[slot] = Some(OpenFileSlot { file, fcb_addr });
            set_ok(m);
        }
        Err(_) => set_fail(m),
    }
}

fn close_file(m: &mut Machine, fcb_addr: u16) {
    match m.bdos.find(fcb_addr) {
        Some(slot) => {
            m.bdos.open_files[slot] = None;
            set_ok(m);
        }
        None => set_fail(m),
    }
}

fn delete_file(m: &mut Machine, fcb_addr: u16) {
    let filename = fcb::derive_filename(&m.mem, fcb_addr);
    match std::fs::remove_file(&filename) {
        Ok(()) => set_ok(m),
        Err(_) => set_fail(m),
    }
}

fn read_sequential(m: &mut Machine, fcb_addr: u16) {
    let Some(slot) = m.bdos.find(fcb_addr) else {
        set_fail(m);
        return;
    };
    let dma = m.bdos.dma;
    let mut buffer = [0u8; RECORD_SIZE];
    let n = match m.bdos.open_files[slot].as_mut().unwrap().file.read(&mut buffer) {
        Ok(n) => n,
        Err(_) => {
            set_fail(m);
            return;
        }
    };
    if n == 0 {
        set_result(m, 1);
        return;
    }
    for (i, byte) in buffer.iter().enumerate() {
        let value = if i < n { *byte } else { EOF_FILL };
        m.mem.write_8(dma.wrapping_add(i as u16), value);
    }
    set_ok(m);
}

fn write_sequential(m: &mut Machine, fcb_addr: u16) {
    let Some(slot) = m.bdos.find(fcb_addr) else {
        set_fail(m);
        return;
    };
    let dma = m.bdos.dma;
    let mut buffer = [0u8; RECORD_SIZE];
    for (i, byte) in buffer.iter_mut().enumerate() {
        *byte = m.mem.read_8(dma.wrapping_add(i as u16));
    }
    let file = &mut m.bdos.open_files[slot].as_mut().unwrap().file;
    match file.write_all(&buffer) {
        Ok(()) => set_ok(m),
        Err(_) => set_fail(m),
    }
}

fn make_file(m: &mut Machine, fcb_addr: u16) {
    let Some(slot) = m.bdos.free_slot() else {
        set_fail(m);
        return;
    };
    let filename = fcb::derive_filename(&m.mem, fcb_addr);
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&filename)
    {
        Ok(file) => {
            m.bdos.open_files[slot] = Some(OpenFileSlot { file, fcb_addr });
            set_ok(m);
        }
        Err(_) => set_fail(m),
    }
}

fn rename_file(m: &mut Machine, old_fcb_addr: u16) {
    let old_name = fcb::derive_filename(&m.mem, old_fcb_addr);
    let new_name = fcb::derive_filename(&m.mem, old_fcb_addr.wrapping_add(16));
    match std::fs::rename(&old_name, &new_name) {
        Ok(()) => set_ok(m),
        Err(_) => set_fail(m),
    }
}

fn read_random(m: &mut Machine, fcb_addr: u16) {
    let Some(slot) = m.bdos.find(fcb_addr) else {
        set_fail(m);
        return;
    };
    let record = fcb::read_random_record(&m.mem, fcb_addr);
    let dma = m.bdos.dma;
    let file = &mut m.bdos.open_files[slot].as_mut().unwrap().file;
    if file
        .seek(SeekFrom::Start(record as u64 * RECORD_SIZE as u64))
        .is_err()
    {
        set_fail(m);
        return;
    }
    let mut buffer = [0u8; RECORD_SIZE];
    let n = match file.read(&mut buffer) {
        Ok(n) => n,
        Err(_) => {
            set_fail(m);
            return;
        }
    };
    if n == 0 {
        set_result(m, 1);
        return;
    }
    for (i, byte) in buffer.iter().enumerate() {
        let value = if i < n { *byte } else { EOF_FILL };
        m.mem.write_8(dma.wrapping_add(i as u16), value);
    }
    set_ok(m);
}

fn write_random(m: &mut Machine, fcb_addr: u16) {
    let Some(slot) = m.bdos.find(fcb_addr) else {
        set_fail(m);
        return;
    };
    let record = fcb::read_random_record(&m.mem, fcb_addr);
    let dma = m.bdos.dma;
    let mut buffer = [0u8; RECORD_SIZE];
    for (i, byte) in buffer.iter_mut().enumerate() {
        *byte = m.mem.read_8(dma.wrapping_add(i as u16));
    }
    let file = &mut m.bdos.open_files[slot].as_mut().unwrap().file;
    if file
        .seek(SeekFrom::Start(record as u64 * RECORD_SIZE as u64))
        .is_err()
    {
        set_fail(m);
        return;
    }
    match file.write_all(&buffer) {
        Ok(()) => set_ok(m),
        Err(_) => set_fail(m),
    }
}

fn compute_file_size(m: &mut Machine, fcb_addr: u16) {
    let filename = fcb::derive_filename(&m.mem, fcb_addr);
    match std::fs::metadata(&filename) {
        Ok(meta) => {
            let records = (meta.len() + (RECORD_SIZE as u64 - 1)) / RECORD_SIZE as u64;
            fcb::write_random_record(&mut m.mem, fcb_addr, records as u32);
            set_ok(m);
        }
        Err(_) => set_fail(m),
    }
}

fn set_random_record(m: &mut Machine, fcb_addr: u16) {
    let Some(slot) = m.bdos.find(fcb_addr) else {
        set_fail(m);
        return;
    };
    let pos = match m.bdos.open_files[slot]
        .as_mut()
        .unwrap()
        .file
        .stream_position()
    {
        Ok(p) => p,
        Err(_) => {
            set_fail(m);
            return;
        }
    };
    fcb::write_random_record(&mut m.mem, fcb_addr, (pos / RECORD_SIZE as u64) as u32);
    set_ok(m);
}
