mod prompt;

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use stampname_core::{PolicyKind, ProcessOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "stampname",
    version,
    about = "Rename photos and videos to \"YYYY-MM-DD HH-MM-SS[ 00][ description].ext\" from name and metadata timestamps"
)]
struct Cli {
    /// Folder whose files are renamed
    folder: PathBuf,

    /// Description appended to every name; asked for when omitted
    #[arg(short, long)]
    description: Option<String>,

    /// Strict mode: only letters, digits and - . _ ~, with "_" as separator
    #[arg(short, long)]
    strict: bool,

    /// Actually rename files; without it this is a dry run
    #[arg(long)]
    rename: bool,

    /// Choose manually when name and metadata disagree
    #[arg(short, long, conflicts_with = "prefer_name")]
    interactive: bool,

    /// Prefer the name timestamp when name and metadata disagree
    #[arg(short = 'n', long)]
    prefer_name: bool,

    /// Abort instead of incrementing the previous timestamp for files without one
    #[arg(long)]
    no_fallback: bool,

    /// Set the modification time of renamed files to their timestamp
    #[arg(long)]
    set_mtime: bool,

    /// ffprobe program used for video metadata
    #[arg(long, env = "STAMPNAME_FFPROBE", default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Write a JSON report of every decision to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// More output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "stampname_core=info,stampname_cli=info",
        1 => "stampname_core=debug,stampname_cli=debug",
        _ => "stampname_core=trace,stampname_cli=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let t_total = std::time::Instant::now();

    let description = match cli.description {
        Some(d) => d,
        None => prompt::ask_description(cli.strict)?,
    };

    let policy = if cli.interactive {
        PolicyKind::Interactive
    } else if cli.prefer_name {
        PolicyKind::PreferName
    } else {
        PolicyKind::PreferMetadata
    };

    let options = ProcessOptions {
        folder: cli.folder,
        description,
        strict: cli.strict,
        rename: cli.rename,
        policy,
        fallback: !cli.no_fallback,
        set_mtime: cli.set_mtime,
        ffprobe: cli.ffprobe,
        report: cli.report,
    };

    tracing::debug!(?options, "options");

    let reader = options.reader();
    let mut chooser = prompt::StdinChooser::default();
    let result = stampname_core::process(&options, &reader, Some(&mut chooser))?;

    eprintln!(
        "Done! {} files, {} renamed, {} already named, {} moved to 00, {} conflicts ({:.2}s){}",
        result.files_seen,
        result.files_renamed,
        result.files_skipped,
        result.promotions,
        result.conflicts,
        t_total.elapsed().as_secs_f64(),
        if options.rename { "" } else { " [dry run, pass --rename to apply]" }
    );

    Ok(())
}
