use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "introgate", version)]
struct Cli {
    /// Log sequencer transitions and timers to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a timed input script and print the resulting trace as JSON.
    Simulate(SimulateArgs),
    /// Measure an animated GIF and print its frame count and duration.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Gate configuration JSON; overrides the script's own `config`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Animated GIF whose measured length replaces the configured clip duration.
    #[arg(long)]
    clip: Option<PathBuf>,

    /// Write the trace here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Pretty-print the trace.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Animated GIF to measure.
    #[arg(long)]
    clip: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let mut script = introgate::Script::from_path(&args.script)
        .with_context(|| format!("load script '{}'", args.script.display()))?;

    if let Some(path) = &args.config {
        script.config = introgate::GateConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?;
    }
    if let Some(clip) = &args.clip {
        script.config.clip_duration =
            introgate::clip_duration_or(clip, script.config.clip_duration);
    }

    let trace = introgate::run_script(&script)?;

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f =
                File::create(path).with_context(|| format!("create '{}'", path.display()))?;
            write_json(BufWriter::new(f), &trace, args.pretty)?;
            eprintln!("wrote {}", path.display());
        }
        None => write_json(std::io::stdout().lock(), &trace, args.pretty)?,
    }
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let info = introgate::probe_clip(&args.clip)
        .with_context(|| format!("probe '{}'", args.clip.display()))?;
    println!(
        "{}: {} frames, {}",
        args.clip.display(),
        info.frames,
        info.duration
    );
    Ok(())
}

fn write_json<W: std::io::Write>(
    mut w: W,
    value: &impl serde::Serialize,
    pretty: bool,
) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut w, value)?;
    } else {
        serde_json::to_writer(&mut w, value)?;
    }
    writeln!(w)?;
    w.flush()?;
    Ok(())
}
