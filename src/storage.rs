//! Block storage collaborator and the CSV record format written to it.

use core::fmt::Write;

use heapless::String;

use crate::alerts::AlertStatus;
use crate::clock::DateTime;
use crate::sensors::Readings;

/// Storage failures, as seen by the logging session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageFault {
    /// No card, or the card did not answer even after a reinit.
    NoCard,
    /// The log file could not be opened.
    OpenFailed,
    /// A write, seek or flush failed on an open file.
    WriteFailed,
    /// Every `data_NNN.csv` name is taken.
    NamesExhausted,
}

/// POSIX-like access to a FAT volume.
///
/// Files are opened for a single operation and closed right after, so a
/// power loss can only ever damage the record being written.
pub trait Storage {
    type File;

    /// Whether `path` exists. `"/"` probes the volume itself.
    fn exists(&mut self, path: &str) -> bool;
    /// Opens `path` for appending, creating it if needed.
    fn open_append(&mut self, path: &str) -> Result<Self::File, StorageFault>;
    fn size(&mut self, file: &Self::File) -> u32;
    fn seek(&mut self, file: &mut Self::File, pos: u32) -> Result<(), StorageFault>;
    fn write(&mut self, file: &mut Self::File, data: &[u8]) -> Result<(), StorageFault>;
    fn flush(&mut self, file: &mut Self::File) -> Result<(), StorageFault>;
    fn close(&mut self, file: Self::File);
    /// Resets the bus and card. Returns whether the volume is reachable again.
    fn reinit(&mut self) -> bool;
}

/// Longest record line, newline included.
pub const RECORD_LEN: usize = 96;

/// One parsed log line.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub date: String<10>,
    pub time: String<8>,
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub pressure_hpa: Option<f32>,
    pub note: String<16>,
}

/// Formats one CSV record: `YYYY/MM/DD,HH:MM:SS,t,h,p,note\n`.
/// Missing readings are written as empty fields.
pub fn format_record(
    now: &DateTime,
    readings: &Readings,
    alerts: &AlertStatus,
) -> String<RECORD_LEN> {
    let mut line: String<RECORD_LEN> = String::new();
    let _ = write!(line, "{},{},", now.format_date(), now.format_time());
    push_value(&mut line, readings.temperature_c, 2);
    let _ = line.push(',');
    push_value(&mut line, readings.humidity_pct, 2);
    let _ = line.push(',');
    push_value(&mut line, readings.pressure_hpa, 1);
    let _ = write!(line, ",{}\n", alerts.note());
    line
}

fn push_value(line: &mut String<RECORD_LEN>, value: Option<f32>, decimals: usize) {
    if let Some(v) = value {
        let _ = write!(line, "{:.*}", decimals, v);
    }
}

impl Record {
    /// Parses a line produced by [`format_record`].
    pub fn parse(line: &str) -> Option<Record> {
        let mut fields = line.trim_end_matches(['\r', '\n']).split(',');
        let date = String::try_from(fields.next()?).ok()?;
        let time = String::try_from(fields.next()?).ok()?;
        let temperature_c = parse_value(fields.next()?)?;
        let humidity_pct = parse_value(fields.next()?)?;
        let pressure_hpa = parse_value(fields.next()?)?;
        let note = String::try_from(fields.next()?).ok()?;
        if fields.next().is_some() {
            return None;
        }
        Some(Record {
            date,
            time,
            temperature_c,
            humidity_pct,
            pressure_hpa,
            note,
        })
    }
}

/// `Some(None)` for an empty field, `None` for garbage.
fn parse_value(field: &str) -> Option<Option<f32>> {
    if field.is_empty() {
        Some(None)
    } else {
        field.parse::<f32>().ok().map(Some)
    }
}
