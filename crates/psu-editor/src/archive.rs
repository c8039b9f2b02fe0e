use std::path::{Path, PathBuf};

use colored::Colorize;
use ps2_filetypes::{
    is_valid_entry_name, PSUEntry, PSUEntryKind, PSUParser, PSUWriter, Timestamp, CURRENT_DIR,
    PARENT_DIR, PSU,
};

use crate::{Error, Settings};

/// Index of `.`; everything before it is the self entry.
const FIRST_LISTED: usize = 1;
const FIRST_FILE: usize = 3;

/// An editable PSU archive bound to a path on disk.
///
/// Entries are held in file order: the self entry (named after the save and
/// carrying the record count), `.`, `..`, then the files in the order they were
/// added. Nothing touches the disk until [`Archive::save`].
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    psu: PSU,
    timestamp: Option<Timestamp>,
}

impl Archive {
    /// New, unsaved archive named after the file stem of `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::create_with(path, &Settings::default())
    }

    pub fn create_with(path: impl AsRef<Path>, settings: &Settings) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = match &settings.name {
            Some(name) => name.clone(),
            None => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        if !is_valid_save_name(&name) {
            return Err(Error::NameError(name));
        }

        let mut archive = Self {
            path: path.to_path_buf(),
            psu: PSU::default(),
            timestamp: settings.timestamp.map(Timestamp::from),
        };
        let now = archive.now();
        archive.psu.entries = vec![
            PSUEntry::directory(name, 2, now),
            PSUEntry::directory(CURRENT_DIR, 0, now),
            PSUEntry::directory(PARENT_DIR, 0, now),
        ];
        Ok(archive)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::load_with(path, &Settings::default())
    }

    pub fn load_with(path: impl AsRef<Path>, settings: &Settings) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = read_local(path)?;

        let mut parser = PSUParser::new(data);
        let psu = parser.parse()?;
        let trailing = parser.remaining();
        if trailing > 0 {
            eprintln!(
                "{} {} {} {}",
                path.display().to_string().dimmed(),
                "has".dimmed(),
                trailing.to_string().dimmed(),
                "trailing bytes, ignoring".dimmed()
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            psu,
            timestamp: settings.timestamp.map(Timestamp::from),
        })
    }

    /// Writes the whole archive to its bound path.
    pub fn save(&mut self) -> Result<(), Error> {
        self.sync_count();
        let bytes = self.to_bytes()?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Writes the archive to `path` without rebinding it.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.sync_count();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(PSUWriter::new(&self.psu).to_bytes()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The save identifier stored in the self entry.
    pub fn name(&self) -> &str {
        &self.directory().name
    }

    pub fn directory(&self) -> &PSUEntry {
        &self.psu.entries[0]
    }

    /// Record count kept in the self entry: `.`, `..` and every file.
    pub fn count(&self) -> u32 {
        self.directory().size
    }

    /// `.`, `..` and the files, in archive order.
    pub fn list(&self) -> &[PSUEntry] {
        &self.psu.entries[FIRST_LISTED..]
    }

    pub fn files(&self) -> &[PSUEntry] {
        &self.psu.entries[FIRST_FILE..]
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Result<&PSUEntry, Error> {
        self.position(name)
            .map(|index| &self.psu.entries[index])
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }

    pub fn is_file(&self, name: &str) -> Result<bool, Error> {
        Ok(self.get(name)?.is_file())
    }

    pub fn is_directory(&self, name: &str) -> Result<bool, Error> {
        Ok(self.get(name)?.is_directory())
    }

    pub fn read(&self, name: &str) -> Result<&[u8], Error> {
        let entry = self.get(name)?;
        match entry.kind {
            PSUEntryKind::File => Ok(entry.contents()),
            PSUEntryKind::Directory => Err(Error::WrongKind {
                name: name.to_owned(),
                expected: PSUEntryKind::File,
            }),
        }
    }

    /// Replaces the contents of file `name`, or appends it as a new file.
    pub fn write(&mut self, name: &str, data: impl Into<Vec<u8>>) -> Result<&PSUEntry, Error> {
        if is_reserved(name) {
            return Err(Error::WrongKind {
                name: name.to_owned(),
                expected: PSUEntryKind::File,
            });
        }

        let data = data.into();
        let size = u32::try_from(data.len())
            .map_err(|_| ps2_filetypes::FormatError::SizeOverflow(name.to_owned()))?;
        let now = self.now();

        let index = match self.position(name) {
            Some(index) => {
                let entry = &mut self.psu.entries[index];
                entry.size = size;
                entry.contents = Some(data);
                entry.modified = now;
                index
            }
            None => {
                if !is_valid_entry_name(name) {
                    return Err(Error::NameError(name.to_owned()));
                }
                self.psu.entries.push(PSUEntry::file(name, data, now));
                self.sync_count();
                self.psu.entries.len() - 1
            }
        };

        Ok(&self.psu.entries[index])
    }

    /// Imports a local file as `name`.
    pub fn copy(&mut self, local: impl AsRef<Path>, name: &str) -> Result<&PSUEntry, Error> {
        let data = read_local(local.as_ref())?;
        self.write(name, data)
    }

    /// Writes the contents of file `name` to a local path.
    pub fn export(&self, local: impl AsRef<Path>, name: &str) -> Result<(), Error> {
        let data = self.read(name)?;
        std::fs::write(local, data)?;
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<PSUEntry, Error> {
        if is_reserved(name) {
            return Err(Error::Protected(name.to_owned()));
        }
        let index = self
            .position(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;

        let removed = self.psu.entries.remove(index);
        self.sync_count();
        Ok(removed)
    }

    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<&PSUEntry, Error> {
        if is_reserved(name) {
            return Err(Error::Protected(name.to_owned()));
        }
        if is_reserved(new_name) {
            return Err(Error::Protected(new_name.to_owned()));
        }
        let index = self
            .position(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;

        if name != new_name {
            if !is_valid_entry_name(new_name) {
                return Err(Error::NameError(new_name.to_owned()));
            }
            if self.has(new_name) {
                return Err(Error::Duplicate(new_name.to_owned()));
            }
            self.psu.entries[index].name = new_name.to_owned();
        }

        Ok(&self.psu.entries[index])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.psu
            .entries
            .iter()
            .enumerate()
            .skip(FIRST_LISTED)
            .find(|(_, entry)| entry.name == name)
            .map(|(index, _)| index)
    }

    /// Self entry holds the record count; `.` and `..` are always stored empty.
    fn sync_count(&mut self) {
        let count = (self.psu.entries.len() - FIRST_LISTED) as u32;
        self.psu.entries[0].size = count;
        for entry in &mut self.psu.entries[FIRST_LISTED..FIRST_FILE] {
            entry.size = 0;
        }
    }

    fn now(&self) -> Timestamp {
        self.timestamp.unwrap_or_else(Timestamp::now)
    }
}

fn is_reserved(name: &str) -> bool {
    name == CURRENT_DIR || name == PARENT_DIR
}

fn is_valid_save_name(name: &str) -> bool {
    is_valid_entry_name(name) && !is_reserved(name)
}

fn read_local(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::IOError(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_settings() -> Settings {
        Settings {
            name: None,
            timestamp: chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5),
        }
    }

    fn archive() -> Archive {
        Archive::create_with("BASLUS-20000.psu", &fixed_settings()).expect("create archive")
    }

    #[test]
    fn create_names_self_entry_after_file_stem() {
        let archive = archive();
        assert_eq!(archive.name(), "BASLUS-20000");
        assert_eq!(archive.count(), 2);
        let names = archive
            .list()
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![".", ".."]);
        assert!(archive.files().is_empty());
    }

    #[test]
    fn create_rejects_unusable_save_names() {
        let settings = Settings {
            name: Some("a/b".to_string()),
            timestamp: None,
        };
        assert!(matches!(
            Archive::create_with("save.psu", &settings),
            Err(Error::NameError(_))
        ));
        assert!(matches!(Archive::create("..psu"), Err(Error::NameError(_))));
    }

    #[test]
    fn write_keeps_count_and_size_in_step() {
        let mut archive = archive();
        archive.write("a.bin", vec![1, 2, 3]).unwrap();
        archive.write("b.bin", Vec::new()).unwrap();
        assert_eq!(archive.count(), 4);

        let entry = archive.write("a.bin", vec![9; 10]).unwrap();
        assert_eq!(entry.size, 10);
        assert_eq!(archive.count(), 4);

        archive.delete("b.bin").unwrap();
        assert_eq!(archive.count(), 3);
        assert!(archive
            .files()
            .iter()
            .all(|entry| entry.size as usize == entry.contents().len()));
    }

    #[test]
    fn overwrite_updates_modified_and_keeps_created() {
        let mut archive = archive();
        archive.write("a.bin", vec![1]).unwrap();
        archive.timestamp = Some(Timestamp::new(2030, 5, 6, 7, 8, 9));
        let entry = archive.write("a.bin", vec![2]).unwrap();
        assert_eq!(entry.created, Timestamp::new(2024, 1, 2, 3, 4, 5));
        assert_eq!(entry.modified, Timestamp::new(2030, 5, 6, 7, 8, 9));
    }

    #[test]
    fn failed_write_leaves_archive_untouched() {
        let mut archive = archive();
        let before = archive.to_bytes().unwrap();
        assert!(matches!(
            archive.write("", vec![1]),
            Err(Error::NameError(_))
        ));
        assert!(matches!(
            archive.write(&"x".repeat(33), vec![1]),
            Err(Error::NameError(_))
        ));
        assert_eq!(archive.to_bytes().unwrap(), before);
    }

    #[test]
    fn rename_checks_collisions_and_reserved_names() {
        let mut archive = archive();
        archive.write("a.bin", vec![1]).unwrap();
        archive.write("b.bin", vec![2]).unwrap();

        assert!(matches!(
            archive.rename("a.bin", "b.bin"),
            Err(Error::Duplicate(_))
        ));
        assert!(matches!(
            archive.rename("a.bin", ".."),
            Err(Error::Protected(_))
        ));
        assert!(matches!(
            archive.rename(".", "c.bin"),
            Err(Error::Protected(_))
        ));
        assert!(matches!(
            archive.rename("missing", "c.bin"),
            Err(Error::NotFound(_))
        ));

        archive.rename("a.bin", "a.bin").unwrap();
        archive.rename("a.bin", "c.bin").unwrap();
        let names = archive
            .files()
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["c.bin", "b.bin"]);
        assert_eq!(archive.read("c.bin").unwrap(), &[1]);
    }

    #[test]
    fn self_entry_is_not_addressable_by_name() {
        let archive = archive();
        assert!(!archive.has("BASLUS-20000"));
        assert!(archive.has("."));
        assert!(archive.has(".."));
    }

    #[test]
    fn classification() {
        let mut archive = archive();
        archive.write("a.bin", vec![1]).unwrap();
        assert!(archive.is_file("a.bin").unwrap());
        assert!(!archive.is_directory("a.bin").unwrap());
        assert!(archive.is_directory(".").unwrap());
        assert!(matches!(
            archive.is_file("missing"),
            Err(Error::NotFound(_))
        ));
    }
}
