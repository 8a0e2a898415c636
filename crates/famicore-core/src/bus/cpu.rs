use tracing::{debug, trace, warn};

use crate::{
    audio::{Audio, SilentAudio},
    bus::{Bus, stack_addr},
    cartridge::{Cartridge, MapperBus},
    controller::Controller,
    cpu::Cpu,
    memory::cpu as cpu_mem,
    ppu::{Ppu, timing},
    ram::cpu::AddressSpace,
};

/// Power-on pattern of the internal RAM: runs of four `$00` then four `$FF`.
const fn power_on_byte(index: usize) -> u8 {
    if index & 7 < 4 { 0x00 } else { 0xFF }
}

/// CPU-visible bus that owns the console hardware: RAM, the PPU, the first
/// controller port, the sound unit and the inserted cartridge.
///
/// Decode:
///
/// | Range           | Device                                        |
/// |-----------------|-----------------------------------------------|
/// | `$0000-$1FFF`   | 2 KiB internal RAM, mirrored every `$0800`     |
/// | `$2000-$3FFF`   | PPU registers, mirrored every 8 bytes          |
/// | `$4000-$4017`   | sound registers, OAM DMA, controller port 1    |
/// | `$4018-$401F`   | test mode, ignored                             |
/// | `$4020-$FFFF`   | cartridge space, writes pass the mapper first  |
#[derive(Debug, Clone)]
pub struct CpuBus {
    memory: AddressSpace,
    ppu: Ppu,
    controller: Controller,
    audio: Box<dyn Audio>,
    cartridge: Option<Cartridge>,
}

impl Default for CpuBus {
    fn default() -> Self {
        Self::new(Box::new(SilentAudio::new()))
    }
}

impl CpuBus {
    pub fn new(audio: Box<dyn Audio>) -> Self {
        let mut bus = Self {
            memory: AddressSpace::new(),
            ppu: Ppu::new(),
            controller: Controller::new(),
            audio,
            cartridge: None,
        };
        bus.fill_internal_ram();
        bus
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    /// The flat CPU view, without any device side effects.
    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn audio(&self) -> &dyn Audio {
        self.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> &mut dyn Audio {
        self.audio.as_mut()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// Side-effect free read of the backing memory. RAM mirrors are folded,
    /// I/O registers read as 0.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.memory.read((addr & cpu_mem::INTERNAL_RAM_MASK) as usize)
            }
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => self.memory.read(addr as usize),
            _ => 0,
        }
    }

    /// Powers the console on with `cartridge` inserted.
    ///
    /// Memory and the PPU start from scratch, the mapper installs its power-on
    /// banks and the PPU picks up the board's mirroring and CHR kind.
    pub(crate) fn insert_cartridge(&mut self, mut cartridge: Cartridge) {
        self.memory = AddressSpace::new();
        self.ppu = Ppu::new();
        self.controller = Controller::new();
        self.fill_internal_ram();

        {
            let Cartridge { rom, mapper } = &mut cartridge;
            let mut bus = MapperBus {
                rom,
                memory: &mut self.memory,
                ppu: &mut self.ppu,
                cycle: 0,
            };
            mapper.on_load(&mut bus);
        }
        let rom = cartridge.rom();
        self.ppu.attach_cartridge(rom.mirroring(), rom.has_chr_ram());
        debug!(
            mapper = rom.mapper_id(),
            mirroring = ?rom.mirroring(),
            chr_ram = rom.has_chr_ram(),
            "cartridge inserted"
        );
        self.cartridge = Some(cartridge);
    }

    /// Console reset: the mapper goes back to its power-on banks and the PPU
    /// leaves any frame in progress. RAM is left untouched.
    pub(crate) fn reset(&mut self) {
        self.ppu.reset_rendering();
        let Some(cartridge) = self.cartridge.as_mut() else {
            return;
        };
        if let Err(err) = cartridge.rebuild_mapper() {
            warn!(%err, "mapper kept its bank state across reset");
            return;
        }
        let Cartridge { rom, mapper } = &mut *cartridge;
        let mut bus = MapperBus {
            rom,
            memory: &mut self.memory,
            ppu: &mut self.ppu,
            cycle: 0,
        };
        mapper.on_load(&mut bus);
        let rom = cartridge.rom();
        self.ppu.attach_cartridge(rom.mirroring(), rom.has_chr_ram());
    }

    fn fill_internal_ram(&mut self) {
        for index in 0..cpu_mem::INTERNAL_RAM_SIZE {
            self.memory.write(index, power_on_byte(index));
        }
    }

    fn oam_dma(&mut self, cpu: &mut Cpu, page: u8) {
        let base = u16::from(page) << 8;
        let mut data = [0u8; 256];
        for (offset, byte) in data.iter_mut().enumerate() {
            *byte = self.read(cpu, base | offset as u16);
        }
        self.ppu.oam_dma(&data);
        cpu.add_cycles(timing::OAM_DMA_CYCLES);
        trace!(page, "OAM DMA");
    }

    fn write_cartridge_space(&mut self, cpu: &Cpu, addr: u16, value: u8) {
        let Some(cartridge) = self.cartridge.as_mut() else {
            return;
        };
        let Cartridge { rom, mapper } = cartridge;
        let mut bus = MapperBus {
            rom,
            memory: &mut self.memory,
            ppu: &mut self.ppu,
            cycle: cpu.cycles(),
        };
        let outcome = mapper.on_write(addr, value, &mut bus);
        if !outcome.suppress_default_write {
            self.memory.write(addr as usize, value);
        }
    }
}

impl Bus for CpuBus {
    fn read(&mut self, cpu: &mut Cpu, addr: u16) -> u8 {
        match addr {
            0..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.memory.read((addr & cpu_mem::INTERNAL_RAM_MASK) as usize)
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                self.ppu.cpu_read(addr, cpu.cycles())
            }
            cpu_mem::APU_STATUS => self.audio.read_status(),
            cpu_mem::CONTROLLER_PORT_1 => self.controller.read(),
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::TEST_MODE_END => 0,
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                self.memory.read(addr as usize)
            }
        }
    }

    fn write(&mut self, cpu: &mut Cpu, addr: u16, value: u8) {
        match addr {
            0..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.memory
                    .write((addr & cpu_mem::INTERNAL_RAM_MASK) as usize, value);
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                self.ppu.cpu_write(addr, value, cpu.cycles());
            }
            cpu_mem::OAM_DMA => self.oam_dma(cpu, value),
            cpu_mem::CONTROLLER_PORT_1 => self.controller.write(value),
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_REGISTER_END
            | cpu_mem::APU_STATUS
            | cpu_mem::APU_FRAME_COUNTER => self.audio.write_register(addr, value),
            cpu_mem::TEST_MODE_BASE..=cpu_mem::TEST_MODE_END => {}
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                self.write_cartridge_space(cpu, addr, value);
            }
        }
    }

    fn read_stack(&mut self, sp: u8) -> u8 {
        self.memory.read(stack_addr(sp) as usize)
    }

    fn write_stack(&mut self, sp: u8, value: u8) {
        self.memory.write(stack_addr(sp) as usize, value);
    }

    fn audio_tick(&mut self, len: u8) {
        self.audio.tick(len);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        cartridge::{Mirroring, Rom},
        controller::Button,
    };

    #[derive(Debug, Clone, Default)]
    struct RecordingAudio {
        writes: Rc<RefCell<Vec<(u16, u8)>>>,
        ticks: Rc<RefCell<u64>>,
    }

    impl Audio for RecordingAudio {
        fn tick(&mut self, len: u8) {
            *self.ticks.borrow_mut() += u64::from(len);
        }

        fn write_register(&mut self, addr: u16, value: u8) {
            self.writes.borrow_mut().push((addr, value));
        }

        fn read_status(&mut self) -> u8 {
            0x5A
        }

        fn end_frame(&mut self) {}
    }

    fn bus_with(prg_banks: usize, mapper_id: u16) -> CpuBus {
        let prg = (0..prg_banks).map(|bank| vec![bank as u8; 0x4000]).collect();
        let rom = Rom::new(prg, vec![vec![0; 0x2000]], mapper_id, Mirroring::Horizontal);
        let mut bus = CpuBus::default();
        bus.insert_cartridge(Cartridge::new(rom).unwrap());
        bus
    }

    #[test]
    fn internal_ram_is_mirrored() {
        let mut bus = CpuBus::default();
        let mut cpu = Cpu::new();
        bus.write(&mut cpu, 0x0012, 0xAB);
        for mirror in [0x0812, 0x1012, 0x1812] {
            assert_eq!(bus.read(&mut cpu, mirror), 0xAB);
        }
        bus.write(&mut cpu, 0x1FFF, 0x42);
        assert_eq!(bus.read(&mut cpu, 0x07FF), 0x42);
    }

    #[test]
    fn internal_ram_powers_on_with_pattern() {
        let bus = CpuBus::default();
        assert_eq!(bus.peek(0x0000), 0x00);
        assert_eq!(bus.peek(0x0003), 0x00);
        assert_eq!(bus.peek(0x0004), 0xFF);
        assert_eq!(bus.peek(0x0007), 0xFF);
        assert_eq!(bus.peek(0x0008), 0x00);
    }

    #[test]
    fn oam_dma_copies_page_and_stalls() {
        let mut bus = CpuBus::default();
        let mut cpu = Cpu::new();
        for offset in 0..=0xFFu16 {
            bus.write(&mut cpu, 0x0200 + offset, offset as u8);
        }
        let before = cpu.cycles();
        bus.write(&mut cpu, cpu_mem::OAM_DMA, 0x02);
        assert_eq!(cpu.cycles() - before, timing::OAM_DMA_CYCLES);

        // OAMADDR = 5, then read OAMDATA.
        bus.write(&mut cpu, 0x2003, 0x05);
        assert_eq!(bus.read(&mut cpu, 0x2004), 0x05);
    }

    #[test]
    fn controller_port_reports_latched_buttons() {
        let mut bus = CpuBus::default();
        let mut cpu = Cpu::new();
        bus.controller_mut().set_button(Button::A, true);
        bus.controller_mut().set_button(Button::Start, true);
        bus.write(&mut cpu, cpu_mem::CONTROLLER_PORT_1, 1);
        bus.write(&mut cpu, cpu_mem::CONTROLLER_PORT_1, 0);

        let bits: Vec<u8> = (0..8)
            .map(|_| bus.read(&mut cpu, cpu_mem::CONTROLLER_PORT_1))
            .collect();
        assert_eq!(bits, [1, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(bus.read(&mut cpu, cpu_mem::CONTROLLER_PORT_1), 1);
        assert_eq!(bus.read(&mut cpu, cpu_mem::APU_FRAME_COUNTER), 0);
    }

    #[test]
    fn sound_registers_pass_through() {
        let audio = RecordingAudio::default();
        let writes = Rc::clone(&audio.writes);
        let ticks = Rc::clone(&audio.ticks);
        let mut bus = CpuBus::new(Box::new(audio));
        let mut cpu = Cpu::new();

        bus.write(&mut cpu, 0x4000, 0x30);
        bus.write(&mut cpu, 0x4013, 0x01);
        bus.write(&mut cpu, cpu_mem::APU_STATUS, 0x0F);
        bus.write(&mut cpu, cpu_mem::APU_FRAME_COUNTER, 0x40);
        bus.write(&mut cpu, 0x4018, 0x99);
        bus.audio_tick(3);

        assert_eq!(
            *writes.borrow(),
            [(0x4000, 0x30), (0x4013, 0x01), (0x4015, 0x0F), (0x4017, 0x40)]
        );
        assert_eq!(*ticks.borrow(), 3);
        assert_eq!(bus.read(&mut cpu, cpu_mem::APU_STATUS), 0x5A);
        assert_eq!(bus.read(&mut cpu, 0x4000), 0);
    }

    #[test]
    fn cartridge_writes_go_through_the_mapper() {
        let mut bus = bus_with(4, 2);
        let mut cpu = Cpu::new();
        assert_eq!(bus.read(&mut cpu, 0x8000), 0);
        assert_eq!(bus.read(&mut cpu, 0xC000), 3);

        bus.write(&mut cpu, 0x8000, 2);
        assert_eq!(bus.read(&mut cpu, 0x8000), 2);
        assert_eq!(bus.read(&mut cpu, 0xC000), 3);

        bus.write(&mut cpu, 0x6000, 0x77);
        assert_eq!(bus.read(&mut cpu, 0x6000), 0x77);
    }

    #[test]
    fn reset_restores_power_on_banks_and_keeps_ram() {
        let mut bus = bus_with(4, 2);
        let mut cpu = Cpu::new();
        bus.write(&mut cpu, 0x8000, 1);
        bus.write(&mut cpu, 0x0300, 0x55);
        assert_eq!(bus.peek(0x8000), 1);

        bus.reset();
        assert_eq!(bus.peek(0x8000), 0);
        assert_eq!(bus.peek(0x0300), 0x55);
    }

    #[test]
    fn writes_without_cartridge_are_dropped() {
        let mut bus = CpuBus::default();
        let mut cpu = Cpu::new();
        bus.write(&mut cpu, 0x8000, 0x12);
        assert_eq!(bus.read(&mut cpu, 0x8000), 0);
    }
}
