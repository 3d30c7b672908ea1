// ABOUTME: Main application entry point.
// ABOUTME: Parses arguments and loads config, then runs a layout script and prints the result.

mod render;
mod script;

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tw_core::Config;
use tw_layout::Frame;

use script::Command;

#[derive(Parser, Debug)]
#[command(name = "tilewin")]
#[command(author, version, long_about = None)]
#[command(about = "Run a window layout script and print the resulting layout")]
struct Args {
    /// Config file (defaults to ~/.config/tilewin/config.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Frame height in lines (overrides config)
    #[arg(long, value_name = "LINES")]
    height: Option<i32>,

    /// Frame width in columns (overrides config)
    #[arg(long, value_name = "COLUMNS")]
    width: Option<i32>,

    /// Print layouts as JSON instead of an indented tree
    #[arg(long)]
    json: bool,

    /// Log every layout operation
    #[arg(short, long)]
    verbose: bool,

    /// Script to run (reads stdin when omitted)
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_or_default(),
    };
    let height = args.height.unwrap_or(config.frame.height);
    let width = args.width.unwrap_or(config.frame.width);
    if height < 1 || width < 1 {
        anyhow::bail!("frame must be at least 1x1 (got {}x{})", height, width);
    }

    let source = match &args.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?,
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read script from stdin")?;
            source
        }
    };
    let commands = script::parse_script(&source)?;

    tracing::info!(height, width, commands = commands.len(), "Starting tilewin");

    let mut frame = Frame::new(height, width, &config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (line, command) in commands {
        if command == Command::Show {
            print_layout(&mut out, &frame, args.json)?;
            continue;
        }
        execute(&mut frame, command)
            .with_context(|| format!("line {}: {:?} failed", line, command))?;
    }
    frame.validate().context("layout is inconsistent")?;
    print_layout(&mut out, &frame, args.json)?;

    Ok(())
}

/// Apply one script command to the frame.
fn execute(frame: &mut Frame, command: Command) -> Result<()> {
    match command {
        Command::Split {
            window,
            direction,
            size,
        } => {
            let new = frame.split(window, size, direction)?;
            tracing::info!(%window, %new, "split");
        }
        Command::Delete(window) => frame.delete(window)?,
        Command::DeleteOthers(window) => frame.delete_other_windows(window)?,
        Command::Resize {
            window,
            delta,
            axis,
        } => frame.resize(window, delta, axis, tw_layout::Ignore::Nothing)?,
        Command::Edge {
            window,
            delta,
            axis,
        } => {
            let moved = frame.adjust_trailing_edge(window, delta, axis)?;
            if moved != delta {
                tracing::info!(%window, delta, moved, "edge move clamped");
            }
        }
        Command::Maximize(window) => {
            frame.maximize(window, tw_layout::Axis::Vertical)?;
            frame.maximize(window, tw_layout::Axis::Horizontal)?;
        }
        Command::Minimize(window) => {
            frame.minimize(window, tw_layout::Axis::Vertical)?;
            frame.minimize(window, tw_layout::Axis::Horizontal)?;
        }
        Command::Balance => {
            let report = frame.balance(frame.root())?;
            tracing::info!(passes = report.passes, changed = report.changed, "balanced");
        }
        Command::BalanceArea => {
            let report = frame.balance_area(frame.root())?;
            tracing::info!(passes = report.passes, changed = report.changed, "balanced areas");
        }
        Command::Atom(window) => {
            if frame.make_atomic(window)?.is_none() {
                tracing::warn!(%window, "a single window cannot form an atomic group");
            }
        }
        Command::Side { window, side } => {
            frame.with_side(window, Some(side))?;
            if !frame.check_sides() {
                tracing::warn!(%window, ?side, "side tags were inconsistent and have been cleared");
            }
        }
        Command::Fix { window, fixed } => frame.set_fixed_size(window, fixed)?,
        Command::Frame { height, width } => frame.set_frame_size(height, width)?,
        Command::Show => {}
    }
    Ok(())
}

fn print_layout(out: &mut impl Write, frame: &Frame, json: bool) -> Result<()> {
    let snapshot = frame.snapshot();
    if json {
        serde_json::to_writer_pretty(&mut *out, &snapshot)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render::render_tree(&snapshot))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_layout::{Axis, WindowId};

    fn run(source: &str) -> Result<Frame> {
        let mut frame = Frame::new(24, 80, &Config::default());
        for (_, command) in script::parse_script(source)? {
            execute(&mut frame, command)?;
        }
        Ok(frame)
    }

    #[test]
    fn test_script_builds_layout() {
        let frame = run("split 0 below\nsplit 0 right 20\n").unwrap();
        assert_eq!(frame.leaves().len(), 3);
        let rect = frame.edges(WindowId(0)).unwrap();
        assert_eq!((rect.height, rect.width), (12, 20));
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn test_script_error_stops_run() {
        assert!(run("split 0\ndelete 7\n").is_err());
    }

    #[test]
    fn test_maximize_takes_all_room() {
        let frame = run("split 0 below\nmaximize 0\n").unwrap();
        let min = Config::default().sizes.min_height;
        assert_eq!(frame.tree().total(WindowId(0), Axis::Vertical), 24 - min);
    }

    #[test]
    fn test_json_output_parses() {
        let frame = run("split 0 right").unwrap();
        let mut buf = Vec::new();
        print_layout(&mut buf, &frame, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["size"]["width"], 80);
        assert_eq!(value["root"]["children"].as_array().map(Vec::len), Some(2));
    }
}
