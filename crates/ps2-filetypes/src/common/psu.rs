use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{FormatError, Timestamp};

pub const DIR_ID: u16 = 0x8427;
pub const FILE_ID: u16 = 0x8497;

const MODE_EXISTS: u16 = 0x8000;
const MODE_DIRECTORY: u16 = 0x0020;
const MODE_FILE: u16 = 0x0010;

pub const PAGE_SIZE: u32 = 0x400;
pub const HEADER_SIZE: usize = 0x200;
pub const NAME_OFFSET: usize = 0x40;
pub const NAME_FIELD_SIZE: usize = HEADER_SIZE - NAME_OFFSET;
/// Longest file name the memory card directory can hold.
pub const MAX_NAME_LEN: usize = 32;

pub const CURRENT_DIR: &str = ".";
pub const PARENT_DIR: &str = "..";

/// Decoded archive: the self entry, `.`, `..` and then the files, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PSU {
    pub entries: Vec<PSUEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PSUEntryKind {
    Directory,
    File,
}

impl PSUEntryKind {
    pub fn from_mode(mode: u16) -> Option<Self> {
        if mode & MODE_EXISTS == 0 {
            return None;
        }
        match (mode & MODE_DIRECTORY != 0, mode & MODE_FILE != 0) {
            (true, false) => Some(PSUEntryKind::Directory),
            (false, true) => Some(PSUEntryKind::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PSUEntry {
    pub mode: u16,
    pub size: u32,
    pub created: Timestamp,
    pub sector: u16,
    pub modified: Timestamp,
    pub name: String,
    pub kind: PSUEntryKind,
    pub contents: Option<Vec<u8>>,
}

impl PSUEntry {
    pub fn directory(name: impl Into<String>, size: u32, timestamp: Timestamp) -> Self {
        Self {
            mode: DIR_ID,
            size,
            created: timestamp,
            sector: 0,
            modified: timestamp,
            name: name.into(),
            kind: PSUEntryKind::Directory,
            contents: None,
        }
    }

    /// Builds a file entry whose size is taken from `contents`.
    ///
    /// Payloads beyond `u32::MAX` bytes saturate the size field; the writer
    /// rejects such entries.
    pub fn file(name: impl Into<String>, contents: Vec<u8>, timestamp: Timestamp) -> Self {
        Self {
            mode: FILE_ID,
            size: u32::try_from(contents.len()).unwrap_or(u32::MAX),
            created: timestamp,
            sector: 0,
            modified: timestamp,
            name: name.into(),
            kind: PSUEntryKind::File,
            contents: Some(contents),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, PSUEntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, PSUEntryKind::Directory)
    }

    pub fn contents(&self) -> &[u8] {
        self.contents.as_deref().unwrap_or_default()
    }

    pub fn header(&self) -> EntryHeader {
        EntryHeader {
            mode: self.mode,
            size: self.size,
            created: self.created,
            sector: self.sector,
            modified: self.modified,
            name: self.name.clone(),
        }
    }
}

/// Bytes of page padding that follow a payload of `size` bytes.
pub fn page_padding(size: u32) -> u32 {
    let remainder = size % PAGE_SIZE;
    if remainder == 0 {
        0
    } else {
        PAGE_SIZE - remainder
    }
}

/// Names must fit the card directory and stay inside a flat folder.
pub fn is_valid_entry_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name
            .chars()
            .any(|c| c.is_control() || matches!(c, '/' | '\\'))
}

/// The fixed 512-byte record header.
///
/// ```text
/// 0x000 u16  mode
/// 0x002 u16  reserved
/// 0x004 u32  size
/// 0x008 [8]  created
/// 0x010 u16  sector
/// 0x012 u16  reserved
/// 0x014 u32  reserved
/// 0x018 [8]  modified
/// 0x020 [32] reserved
/// 0x040 [448] name
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    pub mode: u16,
    pub size: u32,
    pub created: Timestamp,
    pub sector: u16,
    pub modified: Timestamp,
    pub name: String,
}

impl EntryHeader {
    /// Decodes a header. `offset` is only used for error reporting.
    pub fn parse(bytes: &[u8; HEADER_SIZE], offset: u64) -> Result<Self, FormatError> {
        let mut c = Cursor::new(&bytes[..]);
        let mode = c.read_u16::<LittleEndian>()?;
        let _reserved = c.read_u16::<LittleEndian>()?;
        let size = c.read_u32::<LittleEndian>()?;
        let created = Timestamp::read_from(&mut c)?;
        let sector = c.read_u16::<LittleEndian>()?;
        let _reserved = c.read_u16::<LittleEndian>()?;
        let _reserved = c.read_u32::<LittleEndian>()?;
        let modified = Timestamp::read_from(&mut c)?;

        let mut name_field = [0u8; NAME_FIELD_SIZE];
        c.set_position(NAME_OFFSET as u64);
        c.read_exact(&mut name_field)?;
        let name = decode_name(&name_field, offset)?;

        Ok(Self {
            mode,
            size,
            created,
            sector,
            modified,
            name,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), FormatError> {
        let name = self.name.as_bytes();
        if name.len() > MAX_NAME_LEN {
            return Err(FormatError::NameTooLong(self.name.clone()));
        }

        w.write_u16::<LittleEndian>(self.mode)?;
        w.write_u16::<LittleEndian>(0)?;
        w.write_u32::<LittleEndian>(self.size)?;
        self.created.write_to(w)?;
        w.write_u16::<LittleEndian>(self.sector)?;
        w.write_u16::<LittleEndian>(0)?;
        w.write_u32::<LittleEndian>(0)?;
        self.modified.write_to(w)?;
        w.write_all(&[0u8; NAME_OFFSET - 0x20])?;

        let mut name_field = [0u8; NAME_FIELD_SIZE];
        name_field[..name.len()].copy_from_slice(name);
        w.write_all(&name_field)?;
        Ok(())
    }
}

fn decode_name(field: &[u8], offset: u64) -> Result<String, FormatError> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let name = std::str::from_utf8(&field[..end])
        .map_err(|_| FormatError::InvalidName { offset })?
        .to_owned();

    if name.len() > MAX_NAME_LEN {
        return Err(FormatError::NameTooLong(name));
    }
    if name.is_empty() || name.chars().any(char::is_control) {
        return Err(FormatError::InvalidName { offset });
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> EntryHeader {
        EntryHeader {
            mode: FILE_ID,
            size: 11,
            created: Timestamp::new(2024, 1, 2, 3, 4, 5),
            sector: 7,
            modified: Timestamp::new(2024, 6, 7, 8, 9, 10),
            name: "hello.txt".to_string(),
        }
    }

    fn encode(header: &EntryHeader) -> [u8; HEADER_SIZE] {
        let mut bytes: Vec<u8> = Vec::new();
        header.write_to(&mut bytes).expect("encode header");
        bytes.try_into().expect("header is exactly one record")
    }

    #[test]
    fn header_fields_land_at_fixed_offsets() {
        let bytes = encode(&sample_header());

        assert_eq!(&bytes[0x00..0x02], &[0x97, 0x84]);
        assert_eq!(&bytes[0x04..0x08], &[11, 0, 0, 0]);
        assert_eq!(&bytes[0x08..0x10], &[0, 5, 4, 3, 2, 1, 0xE8, 0x07]);
        assert_eq!(&bytes[0x10..0x12], &[7, 0]);
        assert_eq!(&bytes[0x18..0x20], &[0, 10, 9, 8, 7, 6, 0xE8, 0x07]);
        assert!(bytes[0x20..0x40].iter().all(|&b| b == 0));
        assert_eq!(&bytes[0x40..0x49], b"hello.txt");
        assert!(bytes[0x49..].iter().all(|&b| b == 0));
    }

    #[test]
    fn reserved_bytes_are_ignored_on_decode() {
        let mut bytes = encode(&sample_header());
        bytes[0x02] = 0xAA;
        bytes[0x14] = 0xBB;
        bytes[0x30] = 0xCC;

        let decoded = EntryHeader::parse(&bytes, 0).expect("decode header");
        assert_eq!(decoded, sample_header());
    }

    #[test]
    fn oversized_names_are_rejected() {
        let mut header = sample_header();
        header.name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            header.write_to(&mut Vec::<u8>::new()),
            Err(FormatError::NameTooLong(_))
        ));

        let mut bytes = encode(&sample_header());
        bytes[NAME_OFFSET..NAME_OFFSET + 40].fill(b'x');
        assert!(matches!(
            EntryHeader::parse(&bytes, 0),
            Err(FormatError::NameTooLong(_))
        ));
    }

    #[test]
    fn control_characters_in_names_are_rejected() {
        let mut bytes = encode(&sample_header());
        bytes[NAME_OFFSET] = 0x07;
        assert!(matches!(
            EntryHeader::parse(&bytes, 0x200),
            Err(FormatError::InvalidName { offset: 0x200 })
        ));
    }

    #[test]
    fn mode_classification() {
        assert_eq!(PSUEntryKind::from_mode(DIR_ID), Some(PSUEntryKind::Directory));
        assert_eq!(PSUEntryKind::from_mode(FILE_ID), Some(PSUEntryKind::File));
        assert_eq!(PSUEntryKind::from_mode(0x0427), None);
        assert_eq!(PSUEntryKind::from_mode(0x8000), None);
        assert_eq!(PSUEntryKind::from_mode(0x8030), None);
    }

    #[test]
    fn payloads_pad_to_page_boundary() {
        assert_eq!(page_padding(0), 0);
        assert_eq!(page_padding(1), PAGE_SIZE - 1);
        assert_eq!(page_padding(PAGE_SIZE), 0);
        assert_eq!(page_padding(PAGE_SIZE + 24), PAGE_SIZE - 24);
    }

    #[test]
    fn entry_names() {
        assert!(is_valid_entry_name("icon.sys"));
        assert!(is_valid_entry_name(&"a".repeat(MAX_NAME_LEN)));
        assert!(!is_valid_entry_name(""));
        assert!(!is_valid_entry_name(&"a".repeat(MAX_NAME_LEN + 1)));
        assert!(!is_valid_entry_name("sub/file"));
        assert!(!is_valid_entry_name("tab\tname"));
    }
}
