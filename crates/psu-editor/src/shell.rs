use std::io::{BufRead, Write};
use std::path::PathBuf;

use argh::{EarlyExit, FromArgs};
use colored::Colorize;

use crate::cli::{print_error, print_outcome, Operation, Session};

pub const PROMPT: &str = "psu> ";

#[derive(FromArgs, Debug)]
/// Commands run against the bound archive. `exit` or `quit` leaves the shell.
pub struct ShellArgs {
    #[argh(subcommand)]
    pub command: ShellCommand,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
pub enum ShellCommand {
    List(ShellList),
    Create(ShellCreate),
    Import(ShellImport),
    Export(ShellExport),
    Rename(ShellRename),
    Delete(ShellDelete),
}

#[derive(FromArgs, Debug)]
/// List the entries of the archive.
#[argh(subcommand, name = "list")]
pub struct ShellList {}

#[derive(FromArgs, Debug)]
/// Create an empty archive, overwriting the bound file.
#[argh(subcommand, name = "create")]
pub struct ShellCreate {}

#[derive(FromArgs, Debug)]
/// Import a local file.
#[argh(subcommand, name = "import")]
pub struct ShellImport {
    /// local file to import
    #[argh(positional)]
    pub file: PathBuf,

    /// entry name, defaults to the local file name
    #[argh(positional)]
    pub name: Option<String>,
}

#[derive(FromArgs, Debug)]
/// Export an entry to a local file.
#[argh(subcommand, name = "export")]
pub struct ShellExport {
    /// entry to export
    #[argh(positional)]
    pub name: String,

    /// destination file, defaults to the entry name
    #[argh(positional)]
    pub output: Option<PathBuf>,
}

#[derive(FromArgs, Debug)]
/// Rename an entry.
#[argh(subcommand, name = "rename")]
pub struct ShellRename {
    /// current entry name
    #[argh(positional)]
    pub name: String,

    /// new entry name
    #[argh(positional)]
    pub new_name: String,
}

#[derive(FromArgs, Debug)]
/// Delete an entry.
#[argh(subcommand, name = "delete")]
pub struct ShellDelete {
    /// entry to delete
    #[argh(positional)]
    pub name: String,
}

impl From<ShellCommand> for Operation {
    fn from(command: ShellCommand) -> Self {
        match command {
            ShellCommand::List(_) => Operation::List,
            ShellCommand::Create(_) => Operation::Create,
            ShellCommand::Import(cmd) => Operation::Import {
                file: cmd.file,
                name: cmd.name,
            },
            ShellCommand::Export(cmd) => Operation::Export {
                name: cmd.name,
                output: cmd.output,
            },
            ShellCommand::Rename(cmd) => Operation::Rename {
                name: cmd.name,
                new_name: cmd.new_name,
            },
            ShellCommand::Delete(cmd) => Operation::Delete { name: cmd.name },
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Reads one command per line until `exit`, `quit` or end of input.
///
/// Failed commands are reported and the loop carries on.
pub fn run_interactive<R: BufRead, W: Write>(
    session: &Session,
    input: R,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{} {}",
        "Editing".dimmed(),
        session.path().display().to_string().bold()
    )?;

    write!(out, "{PROMPT}")?;
    out.flush()?;
    for line in input.lines() {
        if handle_line(session, &line?, out)? == Flow::Exit {
            return Ok(());
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

fn handle_line<W: Write>(session: &Session, line: &str, out: &mut W) -> std::io::Result<Flow> {
    let tokens = match split_command_line(line) {
        Ok(tokens) => tokens,
        Err(message) => {
            writeln!(out, "{} {}", "[-]".red(), message)?;
            return Ok(Flow::Continue);
        }
    };

    let Some(first) = tokens.first() else {
        return Ok(Flow::Continue);
    };
    match first.as_str() {
        "exit" | "quit" => return Ok(Flow::Exit),
        "help" | "?" => {
            write_usage(out, &["--help"])?;
            return Ok(Flow::Continue);
        }
        _ => {}
    }

    let args = tokens.iter().map(String::as_str).collect::<Vec<_>>();
    match ShellArgs::from_args(&["psu"], &args) {
        Ok(parsed) => match session.run(&parsed.command.into()) {
            Ok(outcome) => print_outcome(out, &outcome)?,
            Err(err) => print_error(out, &err)?,
        },
        Err(EarlyExit { output, status }) => match status {
            Ok(()) => write!(out, "{output}")?,
            Err(()) => writeln!(out, "{} {}", "[-]".red(), output.trim_end())?,
        },
    }
    Ok(Flow::Continue)
}

fn write_usage<W: Write>(out: &mut W, args: &[&str]) -> std::io::Result<()> {
    if let Err(EarlyExit { output, .. }) = ShellArgs::from_args(&["psu"], args) {
        write!(out, "{output}")?;
    }
    writeln!(out, "Type `exit` or `quit` to leave.")
}

/// Splits a line on whitespace, keeping quoted runs together.
pub fn split_command_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("Unterminated {q} quote"));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
