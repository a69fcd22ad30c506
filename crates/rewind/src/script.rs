/// Command script parsing and execution against a tracked text state.
use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rewind_history::{Store, Tracked};

pub type TextHistory = Tracked<String, Store<String>>;

/// A single script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set(String),
    Append(String),
    Undo(usize),
    Redo(usize),
    Clear,
    Group(Vec<Command>),
    Filter(Vec<Command>),
    Sleep(Duration),
    Show,
}

/// Parses a whole script. Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns an error naming the first malformed line.
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = parse_command(line).with_context(|| format!("line {}", idx + 1))?;
        commands.push(command);
    }
    Ok(commands)
}

/// Parses one command line.
///
/// # Errors
///
/// Returns an error for unknown commands or malformed arguments.
pub fn parse_command(line: &str) -> Result<Command> {
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "set" => Command::Set(rest.to_string()),
        "append" => Command::Append(rest.to_string()),
        "undo" => Command::Undo(parse_step(rest)?),
        "redo" => Command::Redo(parse_step(rest)?),
        "clear" => Command::Clear,
        "show" => Command::Show,
        "sleep" => {
            let ms: u64 = rest
                .parse()
                .with_context(|| format!("invalid sleep duration '{rest}'"))?;
            Command::Sleep(Duration::from_millis(ms))
        }
        "group" => Command::Group(parse_block(rest)?),
        "filter" => Command::Filter(parse_block(rest)?),
        other => bail!("unknown command '{other}'"),
    };
    Ok(command)
}

fn parse_step(arg: &str) -> Result<usize> {
    if arg.is_empty() {
        return Ok(1);
    }
    arg.parse().with_context(|| format!("invalid step '{arg}'"))
}

fn parse_block(body: &str) -> Result<Vec<Command>> {
    body.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_command)
        .collect()
}

/// Runs `commands` against `state`, writing `show` output to `out`.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn run(state: &mut TextHistory, commands: &[Command], out: &mut impl Write) -> Result<()> {
    for command in commands {
        execute(state, command, out)?;
    }
    Ok(())
}

fn execute(state: &mut TextHistory, command: &Command, out: &mut impl Write) -> Result<()> {
    tracing::debug!(?command, "executing");
    match command {
        Command::Set(text) => state.set_state(text.clone()),
        Command::Append(text) => state.update(|current| format!("{current}{text}")),
        Command::Undo(step) => state.undo_by(*step),
        Command::Redo(step) => state.redo_by(*step),
        Command::Clear => state.clear(),
        Command::Group(inner) => state.group(|state| run(state, inner, out))?,
        Command::Filter(inner) => state.filter(|state| run(state, inner, out))?,
        Command::Sleep(duration) => std::thread::sleep(*duration),
        Command::Show => show(state, out)?,
    }
    Ok(())
}

fn show(state: &TextHistory, out: &mut impl Write) -> Result<()> {
    let history = state.history();
    writeln!(out, "current: {:?}", state.get_state())?;
    writeln!(out, "past:    {:?}", history.past())?;
    writeln!(out, "future:  {:?}", history.future())?;
    Ok(())
}
