use chrono::{Datelike, Local};
use ps2_filetypes::{PSUEntry, PSUEntryKind, Timestamp};

use crate::Archive;

/// `ls -l` style listing of everything after the self entry.
pub fn format_listing(archive: &Archive) -> String {
    format_listing_for_year(archive, Local::now().year())
}

pub fn format_listing_for_year(archive: &Archive, current_year: i32) -> String {
    let mut out = format!("total {}\n", archive.count());
    for entry in archive.list() {
        out.push_str(&format_entry(entry, current_year));
        out.push('\n');
    }
    out
}

pub fn format_entry(entry: &PSUEntry, current_year: i32) -> String {
    let modified = format_modified(&entry.modified, current_year);
    match entry.kind {
        PSUEntryKind::Directory => format!("d {modified: <12} {: <6} {}", 0, entry.name),
        PSUEntryKind::File => format!("- {modified: <12} {: <6} {}", entry.size, entry.name),
    }
}

// Older stamps show the year instead of the time, like `ls`.
fn format_modified(timestamp: &Timestamp, current_year: i32) -> String {
    match timestamp.to_naive() {
        Some(value) if value.year() < current_year => value.format("%b %d %Y").to_string(),
        Some(value) => value.format("%b %d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_show_size_and_directories_zero() {
        let stamp = Timestamp::new(2024, 3, 9, 14, 5, 0);
        let file = PSUEntry::file("hello.txt", b"Hello World".to_vec(), stamp);
        let dir = PSUEntry::directory(".", 0, stamp);

        assert_eq!(format_entry(&file, 2024), "- Mar 09 14:05 11     hello.txt");
        assert_eq!(format_entry(&dir, 2024), "d Mar 09 14:05 0      .");
    }

    #[test]
    fn older_entries_show_year() {
        let file = PSUEntry::file("a", vec![1], Timestamp::new(2003, 11, 30, 1, 2, 3));
        assert_eq!(format_entry(&file, 2024), "- Nov 30 2003  1      a");
    }

    #[test]
    fn invalid_stamps_render_placeholder() {
        let file = PSUEntry::file("a", vec![], Timestamp::default());
        assert_eq!(format_entry(&file, 2024), "- -            0      a");
    }
}
