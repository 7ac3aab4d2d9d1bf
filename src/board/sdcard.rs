//! FAT volume on an SD card over SPI, through `embedded-sdmmc`'s raw API.

use defmt::{debug, warn};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use embedded_sdmmc::{
    Error, Mode, RawFile, RawVolume, SdCard, TimeSource, Timestamp, VolumeIdx, VolumeManager,
};
use envmon_rs::storage::{Storage, StorageFault};

/// File timestamps. The RTC belongs to the controller, so files are
/// stamped with the same fallback time the UI uses.
pub struct FixedTime;

impl TimeSource for FixedTime {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 30,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

pub struct SdStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    volumes: VolumeManager<SdCard<SPI, DELAY>, FixedTime>,
    volume: Option<RawVolume>,
}

/// `/data_001.csv` -> `data_001.csv`; only the root directory is used.
fn short_name(path: &str) -> &str {
    path.trim_start_matches('/')
}

impl<SPI, DELAY> SdStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    pub fn new(card: SdCard<SPI, DELAY>) -> Self {
        SdStorage {
            volumes: VolumeManager::new(card, FixedTime),
            volume: None,
        }
    }

    /// Mounts the first partition if it is not mounted yet.
    fn mount(&mut self) -> Option<RawVolume> {
        if self.volume.is_none() {
            match self.volumes.open_raw_volume(VolumeIdx(0)) {
                Ok(volume) => {
                    debug!("volume mounted");
                    self.volume = Some(volume);
                }
                Err(e) => {
                    warn!("mount failed: {}", defmt::Debug2Format(&e));
                }
            }
        }
        self.volume
    }

    fn unmount(&mut self) {
        if let Some(volume) = self.volume.take() {
            self.volumes.close_volume(volume).ok();
        }
    }
}

impl<SPI, DELAY> Storage for SdStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    type File = RawFile;

    /// `/` is answered by reading the root directory off the card, so a
    /// card pulled while idle is noticed here.
    fn exists(&mut self, path: &str) -> bool {
        let Some(volume) = self.mount() else {
            return false;
        };
        let Ok(root) = self.volumes.open_root_dir(volume) else {
            self.unmount();
            return false;
        };
        let result = if path == "/" {
            self.volumes.iterate_dir(root, |_| {})
        } else {
            self.volumes
                .find_directory_entry(root, short_name(path))
                .map(|_| ())
        };
        self.volumes.close_dir(root).ok();
        match result {
            Ok(()) => true,
            Err(Error::NotFound) => false,
            Err(e) => {
                warn!("card read failed: {}", defmt::Debug2Format(&e));
                self.unmount();
                self.volumes.device().mark_card_uninit();
                false
            }
        }
    }

    fn open_append(&mut self, path: &str) -> Result<RawFile, StorageFault> {
        let volume = self.mount().ok_or(StorageFault::NoCard)?;
        let root = self
            .volumes
            .open_root_dir(volume)
            .map_err(|_| StorageFault::OpenFailed)?;
        let file = self.volumes.open_file_in_dir(
            root,
            short_name(path),
            Mode::ReadWriteCreateOrAppend,
        );
        self.volumes.close_dir(root).ok();
        file.map_err(|_| StorageFault::OpenFailed)
    }

    fn size(&mut self, file: &RawFile) -> u32 {
        self.volumes.file_length(*file).unwrap_or(0)
    }

    fn seek(&mut self, file: &mut RawFile, pos: u32) -> Result<(), StorageFault> {
        self.volumes
            .file_seek_from_start(*file, pos)
            .map_err(|_| StorageFault::WriteFailed)
    }

    fn write(&mut self, file: &mut RawFile, data: &[u8]) -> Result<(), StorageFault> {
        self.volumes
            .write(*file, data)
            .map_err(|_| StorageFault::WriteFailed)
    }

    fn flush(&mut self, file: &mut RawFile) -> Result<(), StorageFault> {
        self.volumes
            .flush_file(*file)
            .map_err(|_| StorageFault::WriteFailed)
    }

    fn close(&mut self, file: RawFile) {
        if self.volumes.close_file(file).is_err() {
            warn!("close failed");
        }
    }

    fn reinit(&mut self) -> bool {
        self.unmount();
        // Forces the card through its SPI init sequence on next access
        self.volumes.device().mark_card_uninit();
        self.mount().is_some()
    }
}
