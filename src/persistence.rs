//! Persistence of the last colour and the named colour list.
//!
//! The core only talks to [`PersistenceGateway`]; the firmware implements it
//! on internal flash, tests use [`MemoryGateway`].
//!
//! Record layout (what the flash gateway stores per key):
//! ```text
//! last colour: [VALID][r][g][b]
//! colour list: [count] { [VALID][r][g][b][name_len][name bytes..] } * count
//! ```

use crate::color::Rgb;
use crate::config::{COLOR_NAME_MAX_LEN, MAX_SAVED_COLORS};
use crate::error::{Error, StorageError, ValidationError};
use heapless::{String, Vec};

/// Marker byte written in front of every valid record.
pub const VALID_MARKER: u8 = 0xA5;

/// Encoded size of the last-colour record.
pub const LAST_COLOR_RECORD_LEN: usize = 4;

/// Fixed part of one encoded list entry (marker, rgb, name length).
const ENTRY_HEADER_LEN: usize = 5;

/// Largest possible encoded colour list.
pub const MAX_LIST_RECORD_LEN: usize = 1 + MAX_SAVED_COLORS * (ENTRY_HEADER_LEN + COLOR_NAME_MAX_LEN);

pub type ColorName = String<COLOR_NAME_MAX_LEN>;

/// Storage backend for colours.
pub trait PersistenceGateway {
    /// Colour active at the last mode-cycle wrap, if one was ever saved.
    fn load_last_color(&mut self) -> Option<Rgb>;

    fn save_last_color(&mut self, rgb: Rgb) -> Result<(), StorageError>;

    /// Stored colour list; empty when none was ever written.
    fn load_list(&mut self) -> Result<SavedColorList, StorageError>;

    /// Replace the stored colour list.
    fn store_list(&mut self, list: &SavedColorList) -> Result<(), StorageError>;

    /// Best-effort listing: an unreadable list shows as empty.
    fn list_saved_colors(&mut self) -> SavedColorList {
        self.load_list().unwrap_or_else(|e| {
            log_warn!("Reading saved colors failed: {}", e);
            SavedColorList::new()
        })
    }

    /// Append a named colour. Invalid names are rejected before storage is
    /// touched; an unreadable list is never overwritten.
    fn save_named_color(&mut self, name: &str, rgb: Rgb) -> Result<(), Error> {
        validate_name(name)?;
        let mut list = self.load_list()?;
        list.try_add(name, rgb)?;
        self.store_list(&list)?;
        Ok(())
    }
}

/// Check a user-supplied colour name.
pub fn validate_name(name: &str) -> Result<ColorName, ValidationError> {
    if name.len() > COLOR_NAME_MAX_LEN {
        return Err(ValidationError::NameTooLong);
    }
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(ValidationError::InvalidName);
    }
    let mut out = ColorName::new();
    out.push_str(name)
        .map_err(|_| ValidationError::NameTooLong)?;
    Ok(out)
}

/// A named colour stored in flash.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SavedColor {
    pub name: ColorName,
    pub rgb: Rgb,
}

impl SavedColor {
    /// Serialize to bytes. Returns 0 if `buf` is too small.
    fn serialize(&self, buf: &mut [u8]) -> usize {
        let name = self.name.as_bytes();
        let total = ENTRY_HEADER_LEN + name.len();
        if buf.len() < total {
            return 0;
        }
        buf[0] = VALID_MARKER;
        buf[1] = self.rgb.red;
        buf[2] = self.rgb.green;
        buf[3] = self.rgb.blue;
        buf[4] = name.len() as u8;
        buf[ENTRY_HEADER_LEN..total].copy_from_slice(name);
        total
    }

    /// Deserialize one entry; `None` if the marker or the name is bad.
    fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < ENTRY_HEADER_LEN || data[0] != VALID_MARKER {
            return None;
        }
        let name_len = data[4] as usize;
        let name_bytes = data.get(ENTRY_HEADER_LEN..ENTRY_HEADER_LEN + name_len)?;
        let name = core::str::from_utf8(name_bytes).ok()?;
        Some(Self {
            name: validate_name(name).ok()?,
            rgb: Rgb::new(data[1], data[2], data[3]),
        })
    }
}

/// In-memory list of named colours, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavedColorList {
    colors: Vec<SavedColor, MAX_SAVED_COLORS>,
}

impl SavedColorList {
    pub const fn new() -> Self {
        Self { colors: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedColor> {
        self.colors.iter()
    }

    pub fn find(&self, name: &str) -> Option<&SavedColor> {
        self.colors.iter().find(|c| c.name.as_str() == name)
    }

    /// Append a colour. Names are unique; entries are never overwritten.
    pub fn try_add(&mut self, name: &str, rgb: Rgb) -> Result<(), Error> {
        let name = validate_name(name)?;
        if self.find(&name).is_some() {
            return Err(ValidationError::DuplicateName.into());
        }
        self.colors
            .push(SavedColor { name, rgb })
            .map_err(|_| StorageError::Full)?;
        Ok(())
    }

    /// Serialize the whole list. Returns the number of bytes written, or 0
    /// if `buf` cannot hold it.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        buf[0] = self.colors.len() as u8;
        let mut offset = 1;
        for color in &self.colors {
            let written = color.serialize(&mut buf[offset..]);
            if written == 0 {
                return 0;
            }
            offset += written;
        }
        offset
    }

    /// Rebuild a list from flash bytes.
    ///
    /// Invalid entries are skipped; a truncated record keeps what was
    /// decoded before the cut.
    pub fn deserialize(data: &[u8]) -> Self {
        let mut list = Self::new();
        let Some((&count, mut rest)) = data.split_first() else {
            return list;
        };

        for _ in 0..count {
            if rest.len() < ENTRY_HEADER_LEN {
                break;
            }
            let entry_len = ENTRY_HEADER_LEN + rest[4] as usize;
            if rest.len() < entry_len {
                break;
            }
            if let Some(color) = SavedColor::deserialize(&rest[..entry_len]) {
                if list.find(&color.name).is_none() && !list.colors.is_full() {
                    let _ = list.colors.push(color);
                }
            }
            rest = &rest[entry_len..];
        }
        list
    }
}

/// Encode the last-colour record.
pub fn encode_last_color(rgb: Rgb) -> [u8; LAST_COLOR_RECORD_LEN] {
    [VALID_MARKER, rgb.red, rgb.green, rgb.blue]
}

/// Decode the last-colour record; `None` for anything but a valid record.
pub fn decode_last_color(data: &[u8]) -> Option<Rgb> {
    match data {
        [VALID_MARKER, r, g, b, ..] => Some(Rgb::new(*r, *g, *b)),
        _ => None,
    }
}

/// RAM-only gateway: nothing survives a reset.
///
/// Useful on boards without spare flash and as a test double; it counts
/// writes and can be told to fail reads or writes.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    pub last: Option<Rgb>,
    pub colors: SavedColorList,
    /// Number of successful `save_last_color` calls.
    pub last_color_saves: usize,
    /// Every write fails with this error while set.
    pub fail_writes: Option<StorageError>,
    /// Every colour list read fails with this error while set.
    pub fail_reads: Option<StorageError>,
}

impl PersistenceGateway for MemoryGateway {
    fn load_last_color(&mut self) -> Option<Rgb> {
        self.last
    }

    fn save_last_color(&mut self, rgb: Rgb) -> Result<(), StorageError> {
        if let Some(e) = self.fail_writes {
            return Err(e);
        }
        self.last = Some(rgb);
        self.last_color_saves += 1;
        Ok(())
    }

    fn load_list(&mut self) -> Result<SavedColorList, StorageError> {
        match self.fail_reads {
            Some(e) => Err(e),
            None => Ok(self.colors.clone()),
        }
    }

    fn store_list(&mut self, list: &SavedColorList) -> Result<(), StorageError> {
        if let Some(e) = self.fail_writes {
            return Err(e);
        }
        self.colors = list.clone();
        Ok(())
    }
}
