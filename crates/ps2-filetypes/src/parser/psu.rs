use std::collections::HashSet;
use std::io::{Cursor, Read};

use crate::{
    page_padding, EntryHeader, FormatError, PSUEntry, PSUEntryKind, CURRENT_DIR, HEADER_SIZE,
    PARENT_DIR, PSU,
};

pub struct PSUParser {
    pub(crate) c: Cursor<Vec<u8>>,
    pub(crate) len: u64,
}

impl PSU {
    /// Decodes a complete archive, failing without side effects on malformed input.
    pub fn parse(data: Vec<u8>) -> Result<Self, FormatError> {
        PSUParser::new(data).parse()
    }

    pub fn directory(&self) -> Option<&PSUEntry> {
        self.entries.first()
    }
}

impl PSUParser {
    pub fn new(data: Vec<u8>) -> Self {
        let len = data.len() as u64;
        Self {
            c: Cursor::new(data),
            len,
        }
    }

    /// Bytes left unread, e.g. trailing data after the last declared record.
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.c.position())
    }

    pub fn parse(&mut self) -> Result<PSU, FormatError> {
        let root = self.read_entry()?;
        if !root.is_directory() || root.name == CURRENT_DIR || root.name == PARENT_DIR {
            return Err(FormatError::MissingDirectoryEntry("self"));
        }

        let declared = root.size as usize;
        if declared < 2 {
            return Err(FormatError::MissingDirectoryEntry(CURRENT_DIR));
        }

        // Each record is at least one header long.
        let capacity = declared.min(self.remaining() as usize / HEADER_SIZE) + 1;
        let mut entries = Vec::with_capacity(capacity);
        entries.push(root);

        let mut seen = HashSet::new();
        for index in 0..declared {
            let entry = self.read_entry()?;
            match index {
                0 => expect_directory(&entry, CURRENT_DIR)?,
                1 => expect_directory(&entry, PARENT_DIR)?,
                _ => {
                    // `.` and `..` appear exactly once, ahead of the files.
                    if let Some(dir) = [CURRENT_DIR, PARENT_DIR]
                        .into_iter()
                        .find(|dir| entry.name == *dir)
                    {
                        return Err(FormatError::MissingDirectoryEntry(dir));
                    }
                    if entry.is_directory() {
                        return Err(FormatError::UnexpectedDirectory(entry.name));
                    }
                    if !seen.insert(entry.name.clone()) {
                        return Err(FormatError::DuplicateName(entry.name));
                    }
                }
            }
            entries.push(entry);
        }

        Ok(PSU { entries })
    }

    fn read_entry(&mut self) -> Result<PSUEntry, FormatError> {
        let offset = self.c.position();
        let mut raw = [0u8; HEADER_SIZE];
        self.read_exact_at(&mut raw)?;

        let header = EntryHeader::parse(&raw, offset)?;
        let kind = PSUEntryKind::from_mode(header.mode).ok_or_else(|| FormatError::UnknownMode {
            mode: header.mode,
            name: header.name.clone(),
        })?;

        let contents = match kind {
            PSUEntryKind::Directory => None,
            PSUEntryKind::File => {
                self.ensure_available(u64::from(header.size))?;
                let mut contents = vec![0u8; header.size as usize];
                self.read_exact_at(&mut contents)?;
                self.skip_padding(page_padding(header.size));
                Some(contents)
            }
        };

        let EntryHeader {
            mode,
            size,
            created,
            sector,
            modified,
            name,
        } = header;

        Ok(PSUEntry {
            mode,
            size,
            created,
            sector,
            modified,
            name,
            kind,
            contents,
        })
    }

    fn read_exact_at(&mut self, buf: &mut [u8]) -> Result<(), FormatError> {
        self.ensure_available(buf.len() as u64)?;
        self.c.read_exact(buf)?;
        Ok(())
    }

    fn ensure_available(&self, needed: u64) -> Result<(), FormatError> {
        let available = self.remaining();
        if available < needed {
            return Err(FormatError::Truncated {
                offset: self.c.position(),
                expected: needed - available,
            });
        }
        Ok(())
    }

    // Some tools drop the padding after the final payload.
    fn skip_padding(&mut self, padding: u32) {
        let skip = u64::from(padding).min(self.remaining());
        self.c.set_position(self.c.position() + skip);
    }
}

fn expect_directory(entry: &PSUEntry, name: &'static str) -> Result<(), FormatError> {
    if entry.is_directory() && entry.name == name {
        Ok(())
    } else {
        Err(FormatError::MissingDirectoryEntry(name))
    }
}
