#[derive(Debug)]
pub enum FormatError {
    /// The stream ended before a header or payload was complete.
    Truncated { offset: u64, expected: u64 },
    UnknownMode { mode: u16, name: String },
    InvalidName { offset: u64 },
    NameTooLong(String),
    /// The self entry, `.` or `..` is missing, out of place or not a directory.
    MissingDirectoryEntry(&'static str),
    UnexpectedDirectory(String),
    DuplicateName(String),
    SizeOverflow(String),
    SizeMismatch {
        name: String,
        declared: u32,
        actual: u32,
    },
    IOError(std::io::Error),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FormatError::Truncated { offset, expected } => write!(
                f,
                "Unexpected end of data at offset {offset:#x}, {expected} more bytes required"
            ),
            FormatError::UnknownMode { mode, name } => {
                write!(f, "Unknown type value \"{mode:04x}\" found for entry \"{name}\"")
            }
            FormatError::InvalidName { offset } => {
                write!(f, "Invalid entry name in header at offset {offset:#x}")
            }
            FormatError::NameTooLong(name) => write!(
                f,
                "Entry name \"{name}\" exceeds {} bytes",
                crate::MAX_NAME_LEN
            ),
            FormatError::MissingDirectoryEntry(which) => {
                write!(f, "Archive has a missing or misplaced {which} directory entry")
            }
            FormatError::UnexpectedDirectory(name) => {
                write!(f, "Nested directory \"{name}\" is not supported")
            }
            FormatError::DuplicateName(name) => {
                write!(f, "Entry \"{name}\" appears more than once")
            }
            FormatError::SizeOverflow(name) => {
                write!(f, "Entry \"{name}\" is too large for a PSU archive")
            }
            FormatError::SizeMismatch {
                name,
                declared,
                actual,
            } => write!(
                f,
                "Entry \"{name}\" declares {declared} bytes but holds {actual}"
            ),
            FormatError::IOError(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::IOError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        FormatError::IOError(err)
    }
}
