use std::path::PathBuf;

use clap::Parser;
use dicom_volume_organizer::{
    organizer::{OrganizerConfig, VolumeOrganizer},
    sorter::DEFAULT_EPSILON,
};
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the .dcm files of one series
    #[arg(default_value = "dicom")]
    directory: PathBuf,

    /// Tolerated deviation between slice spacings
    #[arg(short, long, default_value_t = DEFAULT_EPSILON)]
    epsilon: f64,

    /// Skip sub-volumes that repeat one proposed for an earlier attribute
    #[arg(long)]
    dedupe: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = OrganizerConfig::default()
        .with_epsilon(cli.epsilon)
        .with_deduplication(cli.dedupe);
    let volumes = VolumeOrganizer::new(config)
        .organize_directory(&cli.directory)
        .expect("should have organized files from directory");

    for volume in volumes {
        let marker = if volume.selected { "*" } else { " " };
        println!("{marker} {} ({} files)", volume.name, volume.files.len());
        if let Some(warning) = volume.warning {
            println!("    warning: {warning}");
        }
        for file in &volume.files {
            println!("    {}", file.display());
        }
    }
}
