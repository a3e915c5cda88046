use chrono::{DateTime, TimeZone};

use crate::constants::protocol::{FILENAME_EXTENSION, FILENAME_MARKER, TIMESTAMP_FORMAT};

/// `<YYYY-MM-DD_HH.MM.SS>_cisco_backup_<host>.cfg`, to whole seconds.
pub fn backup_filename<Tz>(captured_at: &DateTime<Tz>, host: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}{}{}.{}",
        captured_at.format(TIMESTAMP_FORMAT),
        FILENAME_MARKER,
        host,
        FILENAME_EXTENSION
    )
}
