use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use vibesvn_icons::{generate_with, GenerateOptions, IconSet, IconStyle};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate the vibesvn application icon assets")]
struct Args {
    /// Project root the icon paths are resolved against
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Icon set to generate (repeatable); all sets when omitted
    #[arg(short, long = "set", value_enum)]
    sets: Vec<IconSet>,

    /// Text drawn on the icons
    #[arg(long)]
    label: Option<String>,

    /// Font file to try for PNG labels (repeatable, tried in order)
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Create missing output directories
    #[arg(long)]
    create_dirs: bool,

    /// List the files that would be written without writing them
    #[arg(long)]
    dry_run: bool,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let level = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let mut style = IconStyle::default();
    if let Some(label) = args.label.clone() {
        style.label = label;
    }
    if !args.fonts.is_empty() {
        style.font_candidates = args.fonts.clone();
    }

    let opts = GenerateOptions {
        root: args.root.clone(),
        sets: IconSet::selection(&args.sets),
        style,
        create_dirs: args.create_dirs,
        dry_run: args.dry_run,
    };

    let dry_run = opts.dry_run;
    let report = generate_with(&opts, |_, path| {
        if dry_run {
            println!("Would write: {}", path.display());
        } else {
            println!("Wrote: {}", path.display());
        }
    })?;

    if !dry_run {
        for &set in &opts.sets {
            if report.paths_for(set).next().is_some() {
                println!("{set} icons created!");
            }
        }
    }

    Ok(())
}
