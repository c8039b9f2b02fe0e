use std::io::Write;

use crate::{page_padding, FormatError, PSUEntry, PSUEntryKind, HEADER_SIZE, PSU};

pub struct PSUWriter<'a> {
    psu: &'a PSU,
}

impl<'a> PSUWriter<'a> {
    pub fn new(psu: &'a PSU) -> Self {
        Self { psu }
    }

    /// Serializes every entry in order. Sizes are written as stored; keeping
    /// the self entry's record count current is the caller's job.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let capacity = self
            .psu
            .entries
            .iter()
            .map(|entry| HEADER_SIZE + entry.contents().len())
            .sum();
        let mut out = Vec::with_capacity(capacity);
        for entry in self.psu.entries.iter() {
            write_entry(&mut out, entry)?;
        }
        Ok(out)
    }
}

fn write_entry<W: Write>(w: &mut W, entry: &PSUEntry) -> Result<(), FormatError> {
    entry.header().write_to(w)?;

    if let PSUEntryKind::File = entry.kind {
        let contents = entry.contents();
        let size = u32::try_from(contents.len())
            .map_err(|_| FormatError::SizeOverflow(entry.name.clone()))?;
        if size != entry.size {
            return Err(FormatError::SizeMismatch {
                name: entry.name.clone(),
                declared: entry.size,
                actual: size,
            });
        }
        w.write_all(contents)?;
        w.write_all(&vec![0u8; page_padding(size) as usize])?;
    }

    Ok(())
}
