use log::{trace, warn};

use crate::{
    apu::Apu, cartridge::Cartridge, input::Input, ppu::Ppu, serial::Serial, timer::Timer,
};

const WORK_RAM_SIZE: usize = 0x2000;
const HIGH_RAM_SIZE: usize = 0x7F;

/// Total length of an OAM DMA transfer in cycles.
pub const DMA_CYCLES: u32 = 648;
const OAM_TRANSFER_SIZE: u16 = 0xA0;

/// The memory regions of the 16-bit address space. Every access is decoded
/// to a region first so the DMA and PPU gating rules can be applied by
/// region rather than by raw address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Rom,
    RomBank,
    Vram,
    ExtRam,
    WorkRam,
    WorkRamBank,
    Oam,
    Unused,
    Io,
    Apu,
    WaveRam,
    HighRam,
}

/// Decode an address to its region and offset. IO-like regions keep the
/// absolute address as their offset.
pub fn map_address(addr: u16) -> (Region, u16) {
    match addr >> 12 {
        0x0..=0x3 => (Region::Rom, addr & 0x3FFF),
        0x4..=0x7 => (Region::RomBank, addr & 0x3FFF),
        0x8 | 0x9 => (Region::Vram, addr & 0x1FFF),
        0xA | 0xB => (Region::ExtRam, addr & 0x1FFF),
        // 0xE000 echoes 0xC000-0xCFFF.
        0xC | 0xE => (Region::WorkRam, addr & 0x0FFF),
        0xD => (Region::WorkRamBank, addr & 0x0FFF),
        _ => {
            if addr < 0xFE00 {
                // 0xF000-0xFDFF: echo of 0xD000-0xDDFF
                (Region::WorkRamBank, addr & 0x0FFF)
            } else if addr <= 0xFE9F {
                (Region::Oam, addr - 0xFE00)
            } else if addr <= 0xFEFF {
                (Region::Unused, addr)
            } else if addr < 0xFF10 {
                (Region::Io, addr)
            } else if addr < 0xFF30 {
                (Region::Apu, addr)
            } else if addr <= 0xFF3F {
                (Region::WaveRam, addr)
            } else if addr <= 0xFF7F {
                (Region::Io, addr)
            } else if addr <= 0xFFFE {
                (Region::HighRam, addr - 0xFF80)
            } else {
                (Region::Io, addr)
            }
        }
    }
}

struct Dma {
    active: bool,
    source: (Region, u16),
    offset: u16,
    cycles: u32,
}

pub struct Mmu {
    pub cart: Option<Cartridge>,
    wram: [u8; WORK_RAM_SIZE],
    hram: [u8; HIGH_RAM_SIZE],
    pub if_reg: u8,
    pub ie_reg: u8,
    pub ppu: Ppu,
    pub apu: Apu,
    pub timer: Timer,
    pub input: Input,
    pub serial: Serial,
    dma: Dma,
    /// Global cycle counter; advanced once per [`Mmu::tick`].
    pub cycles: u64,
}

impl Mmu {
    pub fn new() -> Self {
        Self {
            cart: None,
            wram: [0; WORK_RAM_SIZE],
            hram: [0; HIGH_RAM_SIZE],
            if_reg: 0,
            ie_reg: 0,
            ppu: Ppu::new(),
            apu: Apu::new(),
            timer: Timer::new(),
            input: Input::new(),
            serial: Serial::new(),
            dma: Dma {
                active: false,
                source: (Region::Rom, 0),
                offset: 0,
                cycles: 0,
            },
            cycles: 0,
        }
    }

    pub fn load_cart(&mut self, cart: Cartridge) {
        self.cart = Some(cart);
    }

    pub fn save_cart_ram(&mut self) {
        if let Some(cart) = &self.cart {
            if let Err(e) = cart.save_ram() {
                warn!(target: "memory", "failed to save RAM: {e}");
            }
        }
    }

    /// While OAM DMA runs, the CPU can only reach High RAM, unless the DMA
    /// reads from VRAM, in which case everything except VRAM and OAM stays
    /// reachable.
    fn dma_access_ok(&self, region: Region) -> bool {
        !self.dma.active
            || region == Region::HighRam
            || (self.dma.source.0 == Region::Vram
                && region != Region::Vram
                && region != Region::Oam)
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        let (region, off) = map_address(addr);
        if !self.dma_access_ok(region) {
            trace!(target: "memory", "read_byte({addr:#06X}) blocked during DMA");
            return 0xFF;
        }
        self.read_region(region, off)
    }

    fn read_region(&self, region: Region, off: u16) -> u8 {
        match region {
            Region::Rom => self
                .cart
                .as_ref()
                .map(|c| c.read_cart(off))
                .unwrap_or(0xFF),
            Region::RomBank => self
                .cart
                .as_ref()
                .map(|c| c.read_cart(0x4000 | off))
                .unwrap_or(0xFF),
            Region::Vram => {
                if self.ppu.vram_accessible() {
                    self.ppu.vram[off as usize]
                } else {
                    trace!(target: "video", "VRAM read blocked, returning 0xFF");
                    0xFF
                }
            }
            Region::ExtRam => self
                .cart
                .as_ref()
                .map(|c| c.read_ext_ram(off))
                .unwrap_or(0xFF),
            Region::WorkRam => self.wram[off as usize],
            Region::WorkRamBank => self.wram[0x1000 + off as usize],
            Region::Oam => {
                if self.ppu.oam_accessible() {
                    self.ppu.oam_read(off)
                } else {
                    trace!(target: "video", "OAM read blocked, returning 0xFF");
                    0xFF
                }
            }
            Region::Unused => 0,
            Region::Io => self.read_io(off),
            Region::Apu => self.apu.read_reg(off),
            Region::WaveRam => self.apu.read_wave_ram(off),
            Region::HighRam => self.hram[off as usize],
        }
    }

    fn read_io(&self, addr: u16) -> u8 {
        match addr {
            0xFF00 => self.input.read(),
            0xFF01 | 0xFF02 => self.serial.read(addr),
            0xFF04..=0xFF07 => self.timer.read(addr),
            0xFF0F => 0xE0 | self.if_reg,
            // DMA is write-only.
            0xFF46 => 0xFF,
            0xFF40..=0xFF4B => self.ppu.read_reg(addr),
            0xFFFF => self.ie_reg,
            _ => 0xFF,
        }
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        let (region, off) = map_address(addr);
        if !self.dma_access_ok(region) {
            trace!(target: "memory", "write_byte({addr:#06X}, {val:#04X}) dropped during DMA");
            return;
        }
        match region {
            Region::Rom | Region::RomBank => {
                if let Some(cart) = self.cart.as_mut() {
                    cart.write_rom(addr, val);
                }
            }
            Region::Vram => {
                if self.ppu.vram_accessible() {
                    self.ppu.write_vram(off, val);
                } else {
                    trace!(target: "video", "VRAM write blocked");
                }
            }
            Region::ExtRam => {
                if let Some(cart) = self.cart.as_mut() {
                    cart.write_ext_ram(off, val);
                }
            }
            Region::WorkRam => self.wram[off as usize] = val,
            Region::WorkRamBank => self.wram[0x1000 + off as usize] = val,
            Region::Oam => {
                if self.ppu.oam_accessible() {
                    self.ppu.oam_write(off, val);
                } else {
                    trace!(target: "video", "OAM write blocked");
                }
            }
            Region::Unused => {}
            Region::Io => self.write_io(addr, val),
            Region::Apu => self.apu.write_reg(addr, val),
            Region::WaveRam => self.apu.write_wave_ram(addr, val),
            Region::HighRam => self.hram[off as usize] = val,
        }
    }

    fn write_io(&mut self, addr: u16, val: u8) {
        match addr {
            0xFF00 => self.input.write(val),
            0xFF01 | 0xFF02 => self.serial.write(addr, val),
            0xFF04..=0xFF07 => self.timer.write(addr, val),
            0xFF0F => self.if_reg = val,
            0xFF46 => self.start_dma(val),
            0xFF40..=0xFF4B => self.ppu.write_reg(addr, val),
            0xFFFF => self.ie_reg = val,
            _ => trace!(target: "io", "write_io({addr:#06X}, {val:#04X}) ignored"),
        }
    }

    fn start_dma(&mut self, val: u8) {
        self.dma.active = true;
        self.dma.source = map_address((val as u16) << 8);
        self.dma.offset = 0;
        self.dma.cycles = 0;
        trace!(target: "memory", "OAM DMA started from {:#06X}", (val as u16) << 8);
    }

    pub fn dma_active(&self) -> bool {
        self.dma.active
    }

    fn update_dma(&mut self, cycles: u32) {
        if !self.dma.active {
            return;
        }
        if self.dma.offset < OAM_TRANSFER_SIZE {
            let (region, base) = self.dma.source;
            let mut n = 0;
            // One byte every 4 cycles, read with the same region rules as the
            // CPU but without the DMA lockout.
            while n < cycles && self.dma.offset < OAM_TRANSFER_SIZE {
                let byte = self.read_region(region, base.wrapping_add(self.dma.offset));
                self.ppu.oam_write(self.dma.offset, byte);
                self.dma.offset += 1;
                n += 4;
            }
        }
        self.dma.cycles += cycles;
        if self.dma.cycles >= DMA_CYCLES {
            self.dma.cycles -= DMA_CYCLES;
            self.dma.active = false;
        }
    }

    /// Advance every sub-clock by `cycles`. Order is fixed: DMA, then PPU,
    /// then timer, then APU, so interrupt edges from mode transitions are
    /// observable before the timer's for the same budget.
    pub fn tick(&mut self, cycles: u32) {
        self.update_dma(cycles);
        self.ppu.step(cycles, &mut self.if_reg);
        self.timer.step(cycles, &mut self.if_reg);
        self.apu.step(cycles);
        self.cycles += cycles as u64;
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}
