use std::path::PathBuf;

use ps2_filetypes::{FormatError, PSUEntryKind};

#[derive(Debug)]
pub enum Error {
    NotFound(String),
    FileNotFound(PathBuf),
    Duplicate(String),
    WrongKind {
        name: String,
        expected: PSUEntryKind,
    },
    Protected(String),
    NameError(String),
    FormatError(FormatError),
    IOError(std::io::Error),
    ConfigError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NotFound(name) => write!(f, "Entry \"{name}\" not found"),
            Error::FileNotFound(path) => write!(f, "File \"{}\" not found", path.display()),
            Error::Duplicate(name) => write!(f, "Entry \"{name}\" already exists"),
            Error::WrongKind { name, expected } => match expected {
                PSUEntryKind::File => write!(f, "Entry \"{name}\" is not a file"),
                PSUEntryKind::Directory => write!(f, "Entry \"{name}\" is not a directory"),
            },
            Error::Protected(name) => write!(f, "Entry \"{name}\" is protected"),
            Error::NameError(name) => write!(
                f,
                "Invalid name \"{name}\": expected 1-{} bytes without control characters or path separators",
                ps2_filetypes::MAX_NAME_LEN
            ),
            Error::FormatError(err) => write!(f, "{err}"),
            Error::IOError(err) => write!(f, "{err}"),
            Error::ConfigError(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FormatError(err) => Some(err),
            Error::IOError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::FormatError(err)
    }
}
