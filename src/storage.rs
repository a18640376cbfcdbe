//! Persistent colour storage in the nRF52840's internal flash.
//!
//! Uses `sequential-storage` (key-value map) on a few pages right below
//! the USB bootloader. Two keys:
//!   - `KEY_LAST_COLOR`: the colour saved at each mode-cycle wrap.
//!   - `KEY_COLOR_LIST`: the serialized list of named colours.
//!
//! The NVMC is a blocking peripheral, adapted to the async flash traits.
//! Each operation runs to completion inside the caller; a page erase is
//! the worst case (~85 ms).

use core::ops::Range;

use defmt::{debug, error, info};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_futures::block_on;
use embassy_nrf::nvmc::Nvmc;
use embedded_storage_async::nor_flash::NorFlash;
use hsv_picker::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use hsv_picker::persistence::{
    decode_last_color, encode_last_color, PersistenceGateway, SavedColorList, MAX_LIST_RECORD_LEN,
};
use hsv_picker::{Rgb, StorageError};
use sequential_storage::cache::NoCache;

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

const FLASH_RANGE: Range<u32> = STORAGE_START..STORAGE_END;

/// Key for the last-colour record.
const KEY_LAST_COLOR: u8 = 0x01;

/// Key for the named colour list.
const KEY_COLOR_LIST: u8 = 0x02;

/// Scratch buffer size: the largest record plus map item overhead.
const RECORD_BUF_LEN: usize = MAX_LIST_RECORD_LEN + 32;

/// Concrete flash type used by the firmware.
pub type InternalFlash = BlockingAsync<Nvmc<'static>>;

pub struct FlashGateway<F> {
    flash: F,
}

impl<F: NorFlash> FlashGateway<F> {
    pub const fn new(flash: F) -> Self {
        Self { flash }
    }

    async fn fetch<'b>(
        &mut self,
        key: u8,
        buf: &'b mut [u8],
    ) -> Result<Option<&'b [u8]>, StorageError> {
        sequential_storage::map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            FLASH_RANGE,
            &mut NoCache::new(),
            buf,
            &key,
        )
        .await
        .map_err(|e| {
            error!("Flash read error: {:?}", defmt::Debug2Format(&e));
            storage_error(e)
        })
    }

    async fn store(&mut self, key: u8, item: &[u8]) -> Result<(), StorageError> {
        let mut buf = [0u8; RECORD_BUF_LEN];
        sequential_storage::map::store_item::<u8, &[u8], _>(
            &mut self.flash,
            FLASH_RANGE,
            &mut NoCache::new(),
            &mut buf,
            &key,
            &item,
        )
        .await
        .map_err(|e| {
            error!("Flash write error: {:?}", defmt::Debug2Format(&e));
            storage_error(e)
        })
    }
}

fn storage_error<E>(e: sequential_storage::Error<E>) -> StorageError {
    match e {
        sequential_storage::Error::FullStorage => StorageError::Full,
        sequential_storage::Error::Corrupted { .. } => StorageError::Corrupted,
        _ => StorageError::Flash,
    }
}

impl<F: NorFlash> PersistenceGateway for FlashGateway<F> {
    fn load_last_color(&mut self) -> Option<Rgb> {
        let mut buf = [0u8; RECORD_BUF_LEN];
        match block_on(self.fetch(KEY_LAST_COLOR, &mut buf)) {
            Ok(Some(data)) => decode_last_color(data),
            Ok(None) => {
                info!("No last color in flash");
                None
            }
            Err(_) => None,
        }
    }

    fn save_last_color(&mut self, rgb: Rgb) -> Result<(), StorageError> {
        block_on(self.store(KEY_LAST_COLOR, &encode_last_color(rgb)))?;
        debug!("Stored last color {}", rgb);
        Ok(())
    }

    fn load_list(&mut self) -> Result<SavedColorList, StorageError> {
        let mut buf = [0u8; RECORD_BUF_LEN];
        match block_on(self.fetch(KEY_COLOR_LIST, &mut buf))? {
            Some(data) => Ok(SavedColorList::deserialize(data)),
            None => Ok(SavedColorList::new()),
        }
    }

    fn store_list(&mut self, list: &SavedColorList) -> Result<(), StorageError> {
        let mut data = [0u8; MAX_LIST_RECORD_LEN];
        let len = list.serialize(&mut data);
        if len == 0 {
            return Err(StorageError::Full);
        }
        block_on(self.store(KEY_COLOR_LIST, &data[..len]))?;
        info!("Saved {} colors to flash", list.len());
        Ok(())
    }
}
