// ABOUTME: Parser for tilewin command scripts.
// ABOUTME: One layout command per line, windows addressed by numeric id, '#' starts a comment.

use anyhow::{bail, Context, Result};
use tw_layout::{Axis, Direction, FixedSize, Side, WindowId};

/// A single line of a layout script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Split {
        window: WindowId,
        direction: Direction,
        size: Option<i32>,
    },
    Delete(WindowId),
    DeleteOthers(WindowId),
    Resize {
        window: WindowId,
        delta: i32,
        axis: Axis,
    },
    Edge {
        window: WindowId,
        delta: i32,
        axis: Axis,
    },
    Maximize(WindowId),
    Minimize(WindowId),
    Balance,
    BalanceArea,
    Atom(WindowId),
    Side {
        window: WindowId,
        side: Side,
    },
    Fix {
        window: WindowId,
        fixed: Option<FixedSize>,
    },
    Frame {
        height: i32,
        width: i32,
    },
    Show,
}

/// Parse a whole script. Blank lines and comments are skipped; each command
/// is returned with its 1-based line number.
pub fn parse_script(source: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        if let Some(command) =
            parse_line(line).with_context(|| format!("line {}: {}", line_no, line.trim()))?
        {
            commands.push((line_no, command));
        }
    }
    Ok(commands)
}

/// Parse one line, returning None for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let content = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    let words: Vec<&str> = content.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match name {
        "split" => {
            expect_args(name, args, 1, 3)?;
            let window = window_arg(args[0])?;
            let direction = match args.get(1) {
                Some(word) => direction_arg(word)?,
                None => Direction::Below,
            };
            let size = args.get(2).map(|word| int_arg("size", word)).transpose()?;
            Command::Split {
                window,
                direction,
                size,
            }
        }
        "delete" => {
            expect_args(name, args, 1, 1)?;
            Command::Delete(window_arg(args[0])?)
        }
        "delete-others" => {
            expect_args(name, args, 1, 1)?;
            Command::DeleteOthers(window_arg(args[0])?)
        }
        "resize" | "edge" => {
            expect_args(name, args, 3, 3)?;
            let window = window_arg(args[0])?;
            let delta = int_arg("delta", args[1])?;
            let axis = axis_arg(args[2])?;
            if name == "resize" {
                Command::Resize {
                    window,
                    delta,
                    axis,
                }
            } else {
                Command::Edge {
                    window,
                    delta,
                    axis,
                }
            }
        }
        "maximize" => {
            expect_args(name, args, 1, 1)?;
            Command::Maximize(window_arg(args[0])?)
        }
        "minimize" => {
            expect_args(name, args, 1, 1)?;
            Command::Minimize(window_arg(args[0])?)
        }
        "balance" => {
            expect_args(name, args, 0, 0)?;
            Command::Balance
        }
        "balance-area" => {
            expect_args(name, args, 0, 0)?;
            Command::BalanceArea
        }
        "atom" => {
            expect_args(name, args, 1, 1)?;
            Command::Atom(window_arg(args[0])?)
        }
        "side" => {
            expect_args(name, args, 2, 2)?;
            Command::Side {
                window: window_arg(args[0])?,
                side: side_arg(args[1])?,
            }
        }
        "fix" => {
            expect_args(name, args, 2, 2)?;
            let fixed = match args[1] {
                "height" => Some(FixedSize::Height),
                "width" => Some(FixedSize::Width),
                "both" => Some(FixedSize::Both),
                "none" => None,
                other => bail!("expected height, width, both or none, got '{}'", other),
            };
            Command::Fix {
                window: window_arg(args[0])?,
                fixed,
            }
        }
        "frame" => {
            expect_args(name, args, 2, 2)?;
            Command::Frame {
                height: int_arg("height", args[0])?,
                width: int_arg("width", args[1])?,
            }
        }
        "show" => {
            expect_args(name, args, 0, 0)?;
            Command::Show
        }
        other => bail!("unknown command '{}'", other),
    };
    Ok(Some(command))
}

fn expect_args(name: &str, args: &[&str], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        if min == max {
            bail!("{} takes {} argument(s), got {}", name, min, args.len());
        }
        bail!(
            "{} takes {} to {} arguments, got {}",
            name,
            min,
            max,
            args.len()
        );
    }
    Ok(())
}

fn window_arg(word: &str) -> Result<WindowId> {
    let id = word
        .trim_start_matches('#')
        .parse::<u32>()
        .with_context(|| format!("invalid window id '{}'", word))?;
    Ok(WindowId(id))
}

fn int_arg(what: &str, word: &str) -> Result<i32> {
    word.parse::<i32>()
        .with_context(|| format!("invalid {} '{}'", what, word))
}

fn axis_arg(word: &str) -> Result<Axis> {
    match word {
        "height" => Ok(Axis::Vertical),
        "width" => Ok(Axis::Horizontal),
        other => bail!("expected height or width, got '{}'", other),
    }
}

fn direction_arg(word: &str) -> Result<Direction> {
    match word {
        "above" => Ok(Direction::Above),
        "below" => Ok(Direction::Below),
        "left" => Ok(Direction::Left),
        "right" => Ok(Direction::Right),
        other => bail!("expected above, below, left or right, got '{}'", other),
    }
}

fn side_arg(word: &str) -> Result<Side> {
    match word {
        "left" => Ok(Side::Left),
        "top" => Ok(Side::Top),
        "right" => Ok(Side::Right),
        "bottom" => Ok(Side::Bottom),
        "main" => Ok(Side::Main),
        other => bail!("expected left, top, right, bottom or main, got '{}'", other),
    }
}
