mod args;

use std::{fs::File, io::BufWriter, path::Path, time::Instant};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use famicore_core::{
    Nes,
    ppu::{SCREEN_HEIGHT, SCREEN_WIDTH},
};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::args::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut nes = Nes::new();
    nes.load_rom_file(&args.rom)
        .with_context(|| format!("loading {}", args.rom.display()))?;
    for &button in &args.hold {
        nes.set_button(button, true);
    }

    let start = Instant::now();
    for _ in 0..args.frames {
        nes.run_frame();
    }
    info!(
        frames = nes.frame_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        pc = format_args!("{:#06x}", nes.cpu().pc()),
        "run finished"
    );

    if let Some(path) = &args.png {
        write_png(path, nes.frame_rgba())
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "last frame saved");
    }
    Ok(())
}

fn write_png(path: &Path, rgba: &[u8]) -> Result<()> {
    ensure!(
        rgba.len() == SCREEN_WIDTH * SCREEN_HEIGHT * 4,
        "frame has {} bytes",
        rgba.len()
    );
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(file, SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()?;
    Ok(())
}
