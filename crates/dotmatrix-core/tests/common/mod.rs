#![allow(dead_code)]

use dotmatrix_core::{cartridge::Cartridge, gameboy::GameBoy};

/// Build a syntactically valid ROM image: correct length for the declared
/// size code, a title, and a matching header checksum. The body is NOPs.
pub fn build_rom(cart_type: u8, rom_size_code: u8, ram_size_code: u8) -> Vec<u8> {
    let banks: usize = match rom_size_code {
        0x00 => 2,
        0x01 => 4,
        0x02 => 8,
        0x03 => 16,
        0x04 => 32,
        0x05 => 64,
        0x06 => 128,
        0x07 => 256,
        _ => 2,
    };
    let mut rom = vec![0u8; banks * 0x4000];
    rom[0x0134..0x0138].copy_from_slice(b"TEST");
    rom[0x0147] = cart_type;
    rom[0x0148] = rom_size_code;
    rom[0x0149] = ram_size_code;
    let mut checksum = 0u8;
    for i in 0x0134..=0x014C {
        checksum = checksum.wrapping_sub(rom[i]).wrapping_sub(1);
    }
    rom[0x014D] = checksum;
    rom
}

/// Mark the first byte of every ROM bank with the bank number, so bank
/// switching is observable through reads.
pub fn mark_banks(rom: &mut [u8]) {
    for bank in 0..rom.len() / 0x4000 {
        rom[bank * 0x4000] = bank as u8;
    }
}

pub fn rom_only_gameboy() -> GameBoy {
    GameBoy::new(Cartridge::load(build_rom(0x00, 0x00, 0x00)).unwrap())
}

/// Poke a program into work RAM and point the CPU at it.
pub fn load_program(gb: &mut GameBoy, addr: u16, bytes: &[u8]) {
    for (i, b) in bytes.iter().enumerate() {
        gb.mmu.write_byte(addr + i as u16, *b);
    }
    gb.cpu.pc = addr;
}
