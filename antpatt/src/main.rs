// antpatt/src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio::io::{stdin, stdout, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};

use pattern_modules::{format_frequency, Controller, PatternCollection, Response, Settings};

#[derive(Parser, Debug)]
#[command(name = "antpatt")]
#[command(about = "Antenna pattern capture over a line-oriented control stream")]
struct Args {
    /// Display settings to load at startup (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the display settings here on exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "pattern_modules=debug"; overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) {
    // stdout carries the protocol, logs go to stderr
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.target(env_logger::Target::Stderr).init();
}

async fn respond(out: &mut Stdout, response: Response) -> Result<()> {
    out.write_all(format!("{response}\n").as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let mut collection = PatternCollection::new();
    if let Some(path) = &args.config {
        let settings = Settings::load_from_disk(path)?;
        collection.apply_settings(&settings);
        collection.unchanged();
        info!("Loaded settings from {}", path.display());
    }

    let mut out = stdout();
    respond(&mut out, Response::Ready).await?;

    // --- CONTROL LOOP ---
    let mut controller = Controller::new();
    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read control stream")?
    {
        let response = controller.handle_line(&mut collection, &line);
        respond(&mut out, response).await?;
    }
    controller.finish(&mut collection);

    // --- SUMMARY ---
    info!("{} pattern(s) captured", collection.len());
    for (id, entry) in collection.entries() {
        let signal = entry.signal();
        info!(
            "  #{} {:?} {}: {} samples, peak {:.2} dB",
            id.0,
            entry.name(),
            format_frequency(entry.freq()),
            signal.count(),
            signal.peak()
        );
    }

    if let Some(path) = &args.save_config {
        collection.settings().save_to_disk(path)?;
        info!("Saved settings to {}", path.display());
    }

    respond(&mut out, Response::Bye).await?;
    Ok(())
}
