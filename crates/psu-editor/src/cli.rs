use std::io::Write;
use std::path::{Path, PathBuf};

use argh::FromArgs;
use colored::Colorize;

use crate::{listing, Archive, Error, Settings};

#[derive(FromArgs, Debug)]
/// List, create and edit PS2 PSU save archives.
pub struct Args {
    /// TOML settings file with an [editor] section
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    #[argh(subcommand)]
    pub command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
pub enum Command {
    List(ListCommand),
    Create(CreateCommand),
    Import(ImportCommand),
    Export(ExportCommand),
    Rename(RenameCommand),
    Delete(DeleteCommand),
    Interactive(InteractiveCommand),
}

#[derive(FromArgs, Debug)]
/// List the entries of an archive.
#[argh(subcommand, name = "list")]
pub struct ListCommand {
    /// path to the PSU archive
    #[argh(positional)]
    pub psu: PathBuf,
}

#[derive(FromArgs, Debug)]
/// Create an empty archive, overwriting any existing file.
#[argh(subcommand, name = "create")]
pub struct CreateCommand {
    /// path to the PSU archive
    #[argh(positional)]
    pub psu: PathBuf,
}

#[derive(FromArgs, Debug)]
/// Import a local file into an archive.
#[argh(subcommand, name = "import")]
pub struct ImportCommand {
    /// path to the PSU archive
    #[argh(positional)]
    pub psu: PathBuf,

    /// local file to import
    #[argh(positional)]
    pub file: PathBuf,

    /// entry name, defaults to the local file name
    #[argh(option, short = 'n')]
    pub name: Option<String>,
}

#[derive(FromArgs, Debug)]
/// Export an entry to a local file.
#[argh(subcommand, name = "export")]
pub struct ExportCommand {
    /// path to the PSU archive
    #[argh(positional)]
    pub psu: PathBuf,

    /// entry to export
    #[argh(positional)]
    pub name: String,

    /// destination file, defaults to the entry name
    #[argh(option, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(FromArgs, Debug)]
/// Rename an entry.
#[argh(subcommand, name = "rename")]
pub struct RenameCommand {
    /// path to the PSU archive
    #[argh(positional)]
    pub psu: PathBuf,

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
pub struct DeleteCommand {
    /// path to the PSU archive
    #[argh(positional)]
    pub psu: PathBuf,

    /// entry to delete
    #[argh(positional)]
    pub name: String,
}

#[derive(FromArgs, Debug)]
/// Run commands against one archive until `exit`.
#[argh(subcommand, name = "interactive")]
pub struct InteractiveCommand {
    /// path to the PSU archive
    #[argh(positional)]
    pub psu: PathBuf,
}

/// A single archive operation, independent of how it was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Import {
        file: PathBuf,
        name: Option<String>,
    },
    Export {
        name: String,
        output: Option<PathBuf>,
    },
    Rename {
        name: String,
        new_name: String,
    },
    Delete {
        name: String,
    },
}

pub enum Invocation {
    Run(PathBuf, Operation),
    Interactive(PathBuf),
}

impl Command {
    pub fn into_invocation(self) -> Invocation {
        match self {
            Command::List(cmd) => Invocation::Run(cmd.psu, Operation::List),
            Command::Create(cmd) => Invocation::Run(cmd.psu, Operation::Create),
            Command::Import(cmd) => Invocation::Run(
                cmd.psu,
                Operation::Import {
                    file: cmd.file,
                    name: cmd.name,
                },
            ),
            Command::Export(cmd) => Invocation::Run(
                cmd.psu,
                Operation::Export {
                    name: cmd.name,
                    output: cmd.output,
                },
            ),
            Command::Rename(cmd) => Invocation::Run(
                cmd.psu,
                Operation::Rename {
                    name: cmd.name,
                    new_name: cmd.new_name,
                },
            ),
            Command::Delete(cmd) => Invocation::Run(cmd.psu, Operation::Delete { name: cmd.name }),
            Command::Interactive(cmd) => Invocation::Interactive(cmd.psu),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Listing(String),
    Message(String),
}

/// The archive path and settings every command of a run works against.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    settings: Settings,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Loads the archive, applies `operation` and saves when it changed anything.
    pub fn run(&self, operation: &Operation) -> Result<Outcome, Error> {
        match operation {
            Operation::List => {
                let archive = self.load()?;
                Ok(Outcome::Listing(listing::format_listing(&archive)))
            }
            Operation::Create => {
                let mut archive = Archive::create_with(&self.path, &self.settings)?;
                archive.save()?;
                Ok(Outcome::Message(format!(
                    "Created {} as \"{}\"",
                    self.path.display(),
                    archive.name()
                )))
            }
            Operation::Import { file, name } => {
                let name = match name {
                    Some(name) => name.clone(),
                    None => file
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .ok_or_else(|| Error::NameError(file.display().to_string()))?,
                };
                let mut archive = self.load()?;
                let size = archive.copy(file, &name)?.size;
                archive.save()?;
                Ok(Outcome::Message(format!(
                    "Imported {} as \"{name}\" ({size} bytes)",
                    file.display()
                )))
            }
            Operation::Export { name, output } => {
                let output = output.clone().unwrap_or_else(|| PathBuf::from(name));
                let archive = self.load()?;
                archive.export(&output, name)?;
                Ok(Outcome::Message(format!(
                    "Exported \"{name}\" to {}",
                    output.display()
                )))
            }
            Operation::Rename { name, new_name } => {
                let mut archive = self.load()?;
                archive.rename(name, new_name)?;
                archive.save()?;
                Ok(Outcome::Message(format!(
                    "Renamed \"{name}\" to \"{new_name}\""
                )))
            }
            Operation::Delete { name } => {
                let mut archive = self.load()?;
                archive.delete(name)?;
                archive.save()?;
                Ok(Outcome::Message(format!("Deleted \"{name}\"")))
            }
        }
    }

    fn load(&self) -> Result<Archive, Error> {
        Archive::load_with(&self.path, &self.settings)
    }
}

pub fn print_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> std::io::Result<()> {
    match outcome {
        Outcome::Listing(listing) => write!(out, "{listing}"),
        Outcome::Message(message) => writeln!(out, "{} {}", "[+]".green(), message),
    }
}

pub fn print_error<W: Write>(out: &mut W, err: &Error) -> std::io::Result<()> {
    writeln!(out, "{} {}", "[-]".red(), err)
}
