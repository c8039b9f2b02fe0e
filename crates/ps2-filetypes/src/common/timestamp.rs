use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};

pub const TIMESTAMP_SIZE: usize = 8;

/// Calendar moment as stored by the memory card.
///
/// Fields are kept exactly as read so that archives written by other tools
/// survive a round trip even when a stamp is not a valid date (many packers
/// leave it zeroed). Field order gives chronological ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Timestamp {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn now() -> Self {
        Local::now().naive_local().into()
    }

    /// Returns `None` when the stored fields do not form a real date.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())?.and_hms_opt(
            self.hour.into(),
            self.minute.into(),
            self.second.into(),
        )
    }

    pub fn read_from<R: Read>(r: &mut R) -> std::io::Result<Self> {
        let _reserved = r.read_u8()?;
        let second = r.read_u8()?;
        let minute = r.read_u8()?;
        let hour = r.read_u8()?;
        let day = r.read_u8()?;
        let month = r.read_u8()?;
        let year = r.read_u16::<LittleEndian>()?;
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u8(0)?;
        w.write_u8(self.second)?;
        w.write_u8(self.minute)?;
        w.write_u8(self.hour)?;
        w.write_u8(self.day)?;
        w.write_u8(self.month)?;
        w.write_u16::<LittleEndian>(self.year)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self {
            year: value.year().clamp(0, u16::MAX as i32) as u16,
            month: value.month() as u8,
            day: value.day() as u8,
            hour: value.hour() as u8,
            minute: value.minute() as u8,
            second: value.second() as u8,
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
