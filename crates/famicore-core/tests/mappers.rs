mod common;

use anyhow::Result;
use common::{Image, boot};
use famicore_core::cartridge::Mirroring;

#[test]
fn uxrom_program_switches_low_window() -> Result<()> {
    #[rustfmt::skip]
    let code = [
        0xA9, 0x02,       // $C000 LDA #$02
        0x8D, 0x00, 0x80, // $C002 STA $8000
        0xAD, 0x00, 0x80, // $C005 LDA $8000
        0x85, 0x00,       // $C008 STA $00
        0xAD, 0x00, 0xC0, // $C00A LDA $C000
        0x85, 0x01,       // $C00D STA $01
        0x4C, 0x0F, 0xC0, // $C00F JMP $C00F
    ];
    let image = Image::new(2, 4, 0).code(3, 0, &code).vectors(0xC000, 0xC000, 0xC000);
    let mut nes = boot(&image)?;
    assert_eq!(nes.bus().peek(0x8000), 0);

    nes.run_frame();
    assert_eq!(nes.bus().peek(0x0000), 2);
    assert_eq!(nes.bus().peek(0x0001), 0xA9);
    Ok(())
}

#[test]
fn cnrom_switch_is_visible_through_ppudata() -> Result<()> {
    #[rustfmt::skip]
    let code = [
        0xA9, 0x01,       // $8000 LDA #$01
        0x8D, 0x00, 0x80, // $8002 STA $8000
        0xA9, 0x00,       // $8005 LDA #$00
        0x8D, 0x06, 0x20, // $8007 STA $2006
        0x8D, 0x06, 0x20, // $800A STA $2006
        0xAD, 0x07, 0x20, // $800D LDA $2007 (read-ahead)
        0xAD, 0x07, 0x20, // $8010 LDA $2007
        0x85, 0x00,       // $8013 STA $00
        0x4C, 0x15, 0x80, // $8015 JMP $8015
    ];
    let image = Image::new(3, 1, 2).code(0, 0, &code).vectors(0x8000, 0x8000, 0x8000);
    let mut nes = boot(&image)?;
    assert_eq!(nes.bus().ppu().video().peek(0x0000), 0x10);

    nes.run_frame();
    assert_eq!(nes.bus().peek(0x0000), 0x11);
    assert_eq!(nes.bus().ppu().video().peek(0x1FFF), 0x11);
    Ok(())
}

#[test]
fn mmc1_commits_on_the_fifth_serial_write() -> Result<()> {
    #[rustfmt::skip]
    let code = [
        0xA9, 0x01,       // $C000 LDA #$01
        0x8D, 0x00, 0xE0, // $C002 STA $E000
        0x4A,             // $C005 LSR A
        0x8D, 0x00, 0xE0, // $C006 STA $E000
        0x8D, 0x00, 0xE0, // $C009 STA $E000
        0x8D, 0x00, 0xE0, // $C00C STA $E000
        0xAD, 0x00, 0x80, // $C00F LDA $8000
        0x85, 0x01,       // $C012 STA $01
        0x8D, 0x00, 0xE0, // $C014 STA $E000
        0xAD, 0x00, 0x80, // $C017 LDA $8000
        0x85, 0x00,       // $C01A STA $00
        0x4C, 0x1C, 0xC0, // $C01C JMP $C01C
    ];
    let image = Image::new(1, 4, 1).code(3, 0, &code).vectors(0xC000, 0xC000, 0xC000);
    let mut nes = boot(&image)?;
    nes.run_frame();

    // Four writes in, bank 0 was still mapped.
    assert_eq!(nes.bus().peek(0x0001), 0);
    assert_eq!(nes.bus().peek(0x0000), 1);
    assert_eq!(nes.bus().peek(0xC000), 0xA9);
    Ok(())
}

#[test]
fn mmc1_reset_write_discards_partial_value() -> Result<()> {
    #[rustfmt::skip]
    let code = [
        0xA9, 0x01,       // $C000 LDA #$01
        0x8D, 0x00, 0xE0, // $C002 STA $E000
        0x8D, 0x00, 0xE0, // $C005 STA $E000
        0xA9, 0x80,       // $C008 LDA #$80
        0x8D, 0x00, 0x80, // $C00A STA $8000 (reset)
        0xA9, 0x02,       // $C00D LDA #$02
        0x8D, 0x00, 0xE0, // $C00F STA $E000
        0x4A,             // $C012 LSR A
        0x8D, 0x00, 0xE0, // $C013 STA $E000
        0x4A,             // $C016 LSR A
        0x8D, 0x00, 0xE0, // $C017 STA $E000
        0x8D, 0x00, 0xE0, // $C01A STA $E000
        0x8D, 0x00, 0xE0, // $C01D STA $E000
        0xAD, 0x00, 0x80, // $C020 LDA $8000
        0x85, 0x00,       // $C023 STA $00
        0x4C, 0x25, 0xC0, // $C025 JMP $C025
    ];
    let image = Image::new(1, 4, 1).code(3, 0, &code).vectors(0xC000, 0xC000, 0xC000);
    let mut nes = boot(&image)?;
    nes.run_frame();

    // Bits shifted in after the reset were 0, 1, 0, 0, 0.
    assert_eq!(nes.bus().peek(0x0000), 2);
    Ok(())
}

#[test]
fn header_mirroring_reaches_the_video_bus() -> Result<()> {
    let horizontal = boot(&Image::nrom(&[0x4C, 0x00, 0x80]))?;
    assert_eq!(horizontal.bus().ppu().video().mirroring(), Mirroring::Horizontal);

    let vertical = boot(&Image::nrom(&[0x4C, 0x00, 0x80]).vertical())?;
    assert_eq!(vertical.bus().ppu().video().mirroring(), Mirroring::Vertical);
    Ok(())
}
