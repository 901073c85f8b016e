use clap::{Parser, Subcommand};
use song_stem_splitter::{
    io::console, run, BatchOptions, DemucsModel, Device, MixConfig, Mp3Bitrate,
};
use std::{path::PathBuf, process};

#[derive(Parser)]
#[command(name = "song-splitter")]
#[command(about = "Separate vocals and instrumentals for every song folder in a directory", long_about = None)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// List available demucs models
    Models,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Folder whose subfolders each hold one song (audio + .txt)
    input_folder: Option<PathBuf>,

    /// cpu runs demucs, cuda runs the karaoke roformer model
    #[arg(short, long, default_value = "cpu")]
    device: Device,

    /// Demucs model (cpu only)
    #[arg(short, long, default_value = "htdemucs")]
    model: DemucsModel,

    /// Limits the amount of folders processed
    #[arg(long)]
    limit: Option<usize>,

    /// Number of folders to skip before processing
    #[arg(long)]
    offset: Option<usize>,

    /// Reprocess folders that already carry #VOCALS/#INSTRUMENTAL tags
    #[arg(long)]
    overwrite: bool,

    /// Vocals volume percentage mixed into the instrumental track
    #[arg(long, alias = "vocals_volume", default_value_t = 40,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    vocals_volume: u8,

    /// Reuse stems left in the separated folder instead of separating again
    #[arg(long)]
    reuse_cache: bool,

    /// MP3 bitrate in kbps
    #[arg(long, default_value = "128")]
    bitrate: Mp3Bitrate,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Models) => handle_models(),
        None => handle_run(cli.run),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    }
}

fn handle_run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = args
        .input_folder
        .ok_or("missing <INPUT_FOLDER> argument")?;
    if !input.is_dir() {
        return Err(format!("Input folder not found: {}", input.display()).into());
    }

    let config = MixConfig {
        reuse_cached_stems: args.reuse_cache,
        bitrate: args.bitrate,
        ..MixConfig::new(args.device, args.model, args.vocals_volume)?
    };
    let options = BatchOptions {
        overwrite_existing: args.overwrite,
        offset: args.offset,
        limit: args.limit,
    };

    let report = run(&input, &config, &options)?;
    log::info!(
        "{}",
        console::summary(
            report.processed.len(),
            report.skipped.len(),
            report.failed.len()
        )
    );

    Ok(())
}

fn handle_models() -> Result<(), Box<dyn std::error::Error>> {
    println!("📋 Available demucs models");
    for model in DemucsModel::ALL {
        let marker = if model == DemucsModel::default() {
            " (default)"
        } else {
            ""
        };
        println!("  • {}{}", model, marker);
    }
    println!();
    println!("Use --model <name> with --device cpu");
    Ok(())
}
