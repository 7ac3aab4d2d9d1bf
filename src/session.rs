//! CSV logging session.
//!
//! A session owns one `/data_NNN.csv` file on the card. The file is reopened
//! for every record and closed right after, so no handle survives between
//! calls and a card pulled mid-session is caught on the next write.

use core::fmt::Write;

use heapless::String;

use crate::alerts::AlertStatus;
use crate::clock::{now_or_default, Rtc};
use crate::config::{CSV_HEADER, FIRST_FILE_INDEX, LAST_FILE_INDEX, SAVE_INTERVAL_MS};
use crate::sensors::Readings;
use crate::storage::{format_record, Storage, StorageFault};
use crate::timer::IntervalTimer;

/// Longest log file path: `/data_999.csv`.
pub const PATH_LEN: usize = 16;

/// `/data_NNN.csv` for `index`.
pub fn file_name(index: u16) -> String<PATH_LEN> {
    let mut path: String<PATH_LEN> = String::new();
    let _ = write!(path, "/data_{:03}.csv", index);
    path
}

pub struct LogSession {
    active: bool,
    path: String<PATH_LEN>,
    /// Next index to try. Only ever grows, so a power cycle never reuses a name.
    counter: u16,
    save: IntervalTimer,
}

impl Default for LogSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSession {
    pub const fn new() -> LogSession {
        LogSession {
            active: false,
            path: String::new(),
            counter: FIRST_FILE_INDEX,
            save: IntervalTimer::at_least(SAVE_INTERVAL_MS),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Path of the current (or last) log file; empty before the first start.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Opens a new log file and activates the session.
    ///
    /// Probes the card first and retries once through a bus reinit. On any
    /// failure the session stays inactive.
    pub fn start<S: Storage>(&mut self, storage: &mut S) -> Result<(), StorageFault> {
        if self.active {
            return Ok(());
        }

        if !storage.exists("/") && !storage.reinit() {
            warn!("no card present");
            return Err(StorageFault::NoCard);
        }

        let path = self.allocate(storage)?;
        let mut file = storage.open_append(path.as_str()).map_err(|_| {
            warn!("could not open {=str}", path.as_str());
            StorageFault::OpenFailed
        })?;
        let header = write_header_if_new(storage, &mut file);
        storage.close(file);
        header?;

        self.path = path;
        self.active = true;
        info!("logging to {=str}", self.path.as_str());
        Ok(())
    }

    /// Deactivates the session. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if self.active {
            info!("logging stopped ({=str})", self.path.as_str());
        }
        self.active = false;
    }

    /// Appends one record if the session is active and the save interval
    /// has elapsed. Returns whether a record was written.
    ///
    /// On a storage fault the session is deactivated and the bus is
    /// reinitialised, so a later [`start`](Self::start) can succeed once the
    /// card is back.
    pub fn tick<S: Storage, R: Rtc>(
        &mut self,
        storage: &mut S,
        rtc: &mut R,
        now_ms: u32,
        readings: &Readings,
        alerts: &AlertStatus,
    ) -> Result<bool, StorageFault> {
        if !self.active || !self.save.poll(now_ms) {
            return Ok(false);
        }

        let line = format_record(&now_or_default(rtc), readings, alerts);
        match self.append(storage, line.as_bytes()) {
            Ok(()) => {
                debug!("record written to {=str}", self.path.as_str());
                Ok(true)
            }
            Err(fault) => {
                warn!("write to {=str} failed: {}", self.path.as_str(), fault);
                self.active = false;
                storage.reinit();
                Err(fault)
            }
        }
    }

    /// First free file name at or above the counter.
    fn allocate<S: Storage>(&mut self, storage: &mut S) -> Result<String<PATH_LEN>, StorageFault> {
        while self.counter <= LAST_FILE_INDEX {
            let path = file_name(self.counter);
            if !storage.exists(path.as_str()) {
                return Ok(path);
            }
            self.counter += 1;
        }
        warn!("all log file names are taken");
        Err(StorageFault::NamesExhausted)
    }

    fn append<S: Storage>(&mut self, storage: &mut S, data: &[u8]) -> Result<(), StorageFault> {
        let mut file = storage.open_append(self.path.as_str())?;
        let result = seek_end_and_write(storage, &mut file, data);
        storage.close(file);
        result
    }
}

fn write_header_if_new<S: Storage>(storage: &mut S, file: &mut S::File) -> Result<(), StorageFault> {
    if storage.size(file) == 0 {
        storage.write(file, CSV_HEADER.as_bytes())?;
        storage.write(file, b"\n")?;
        storage.flush(file)?;
    }
    Ok(())
}

fn seek_end_and_write<S: Storage>(
    storage: &mut S,
    file: &mut S::File,
    data: &[u8],
) -> Result<(), StorageFault> {
    let size = storage.size(file);
    if size > 0 {
        storage.seek(file, size)?;
    }
    storage.write(file, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DateTime;
    use crate::mock::{FakeRtc, MemStorage};
    use crate::storage::Record;

    fn rtc() -> FakeRtc {
        FakeRtc(Some(DateTime {
            year: 2025,
            month: 1,
            day: 2,
            hour: 3,
            minute: 4,
            second: 5,
        }))
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(file_name(1).as_str(), "/data_001.csv");
        assert_eq!(file_name(42).as_str(), "/data_042.csv");
        assert_eq!(file_name(999).as_str(), "/data_999.csv");
    }

    #[test]
    fn start_writes_header_once() {
        let mut storage = MemStorage::with_card();
        let mut session = LogSession::new();
        session.start(&mut storage).unwrap();

        assert!(session.is_active());
        assert_eq!(session.path(), "/data_001.csv");
        let card = storage.card.borrow();
        assert_eq!(card.text("/data_001.csv"), "Fecha,Hora,Temp_C,Hum_%,Pres_hPa,Nota\n");
        assert_eq!(card.open_files, 0);
    }

    #[test]
    fn start_skips_existing_files() {
        let mut storage = MemStorage::with_card();
        for i in 1..=4 {
            storage.touch(file_name(i).as_str());
        }
        let mut session = LogSession::new();
        session.start(&mut storage).unwrap();
        assert_eq!(session.path(), "/data_005.csv");
        assert_eq!(session.counter(), 5);
    }

    #[test]
    fn start_fills_the_first_gap() {
        let mut storage = MemStorage::with_card();
        for i in [1, 2, 4] {
            storage.touch(file_name(i).as_str());
        }
        let mut session = LogSession::new();
        session.start(&mut storage).unwrap();
        assert_eq!(session.path(), "/data_003.csv");
        assert_eq!(session.counter(), 3);
    }

    #[test]
    fn gaps_below_the_counter_are_skipped() {
        let mut storage = MemStorage::with_card();
        for i in [1, 2, 4] {
            storage.touch(file_name(i).as_str());
        }
        let mut session = LogSession::new();
        session.counter = 4;
        session.start(&mut storage).unwrap();
        assert_eq!(session.path(), "/data_005.csv");
        assert_eq!(session.counter(), 5);
    }

    #[test]
    fn counter_never_goes_back() {
        let mut storage = MemStorage::with_card();
        let mut session = LogSession::new();
        session.start(&mut storage).unwrap();
        session.stop();
        session.start(&mut storage).unwrap();
        assert_eq!(session.path(), "/data_002.csv");

        // Freeing a lower name does not make the session reuse it
        storage.card.borrow_mut().files.remove("/data_001.csv");
        session.stop();
        session.start(&mut storage).unwrap();
        assert_eq!(session.path(), "/data_003.csv");
        assert_eq!(session.counter(), 3);
    }

    #[test]
    fn names_exhausted() {
        let mut storage = MemStorage::with_card();
        storage.touch("/data_999.csv");
        let mut session = LogSession::new();
        session.counter = LAST_FILE_INDEX;
        assert_eq!(session.start(&mut storage), Err(StorageFault::NamesExhausted));
        assert!(!session.is_active());
    }

    #[test]
    fn absent_card_tries_one_reinit() {
        let mut storage = MemStorage::without_card();
        let mut session = LogSession::new();
        assert_eq!(session.start(&mut storage), Err(StorageFault::NoCard));
        assert!(!session.is_active());
        assert_eq!(storage.card.borrow().reinit_count, 1);
    }

    #[test]
    fn reinit_can_recover_at_start() {
        let mut storage = MemStorage::without_card();
        storage.card.borrow_mut().reinit_restores = true;
        let mut session = LogSession::new();
        assert_eq!(session.start(&mut storage), Ok(()));
        assert!(session.is_active());
    }

    #[test]
    fn open_failure_keeps_session_inactive() {
        let mut storage = MemStorage::with_card();
        storage.card.borrow_mut().fail_open = true;
        let mut session = LogSession::new();
        assert_eq!(session.start(&mut storage), Err(StorageFault::OpenFailed));
        assert!(!session.is_active());
    }

    #[test]
    fn tick_respects_interval_and_appends() {
        let mut storage = MemStorage::with_card();
        let mut session = LogSession::new();
        let readings = Readings::new(29.0, 50.0, 1013.0);
        let alerts = AlertStatus {
            temp_exceeded: true,
            hum_exceeded: false,
        };

        assert_eq!(session.tick(&mut storage, &mut rtc(), 5000, &readings, &alerts), Ok(false));

        session.start(&mut storage).unwrap();
        assert_eq!(session.tick(&mut storage, &mut rtc(), 5000, &readings, &alerts), Ok(true));
        assert_eq!(session.tick(&mut storage, &mut rtc(), 5900, &readings, &alerts), Ok(false));
        assert_eq!(session.tick(&mut storage, &mut rtc(), 5999, &readings, &alerts), Ok(false));
        assert_eq!(session.tick(&mut storage, &mut rtc(), 6000, &readings, &alerts), Ok(true));

        let text = storage.card.borrow().text("/data_001.csv");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "2025/01/02,03:04:05,29.00,50.00,1013.0,ALERTA TEMP");
        let rec = Record::parse(lines[2]).unwrap();
        assert_eq!(rec.note.as_str(), "ALERTA TEMP");
        assert_eq!(storage.card.borrow().open_files, 0);
    }

    #[test]
    fn fault_mid_session_deactivates_and_reinits() {
        let mut storage = MemStorage::with_card();
        let mut session = LogSession::new();
        session.start(&mut storage).unwrap();

        storage.card.borrow_mut().present = false;
        let readings = Readings::new(20.0, 40.0, 1000.0);
        let result = session.tick(&mut storage, &mut rtc(), 2000, &readings, &AlertStatus::default());
        assert_eq!(result, Err(StorageFault::OpenFailed));
        assert!(!session.is_active());
        assert_eq!(storage.card.borrow().reinit_count, 1);

        // Card comes back: a new start succeeds on the next free name
        storage.card.borrow_mut().present = true;
        session.start(&mut storage).unwrap();
        assert_eq!(session.path(), "/data_002.csv");
    }

    #[test]
    fn stop_is_idempotent() {
        let mut storage = MemStorage::with_card();
        let mut session = LogSession::new();
        session.stop();
        session.start(&mut storage).unwrap();
        session.stop();
        session.stop();
        assert!(!session.is_active());
        assert_eq!(storage.card.borrow().open_files, 0);
    }

    #[test]
    fn missing_clock_uses_fallback_timestamp() {
        let mut storage = MemStorage::with_card();
        let mut session = LogSession::new();
        session.start(&mut storage).unwrap();
        let readings = Readings::new(20.0, 40.0, 1000.0);
        session
            .tick(&mut storage, &mut FakeRtc(None), 1001, &readings, &AlertStatus::default())
            .unwrap();
        let text = storage.card.borrow().text("/data_001.csv");
        assert!(text.ends_with("2000/01/01,00:00:00,20.00,40.00,1000.0,\n"));
    }
}
