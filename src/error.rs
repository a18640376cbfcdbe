//! Unified error type for hsv-picker.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

use core::fmt;

/// Top-level error type used across the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A command argument was rejected at the CLI boundary.
    Validation(ValidationError),

    /// Flash read/write failed or ran out of room.
    Storage(StorageError),

    /// The command keyword is not known.
    UnknownCommand,

    /// No saved colour carries the requested name.
    NotFound,
}

/// Reasons a command line or one of its arguments is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Wrong number of arguments for the command.
    ArgCount { expected: u8 },
    /// An argument that should be a decimal integer is not.
    NotANumber,
    /// A numeric argument is outside its legal range.
    OutOfRange { max: u16 },
    /// Colour name longer than `COLOR_NAME_MAX_LEN` bytes.
    NameTooLong,
    /// Colour name is empty or contains non-printable characters.
    InvalidName,
    /// A colour with this name is already saved.
    DuplicateName,
    /// The input line overflowed the line buffer.
    LineTooLong,
}

/// Storage failures surfaced by the persistence gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No room left for another record (list full or flash full).
    Full,
    /// The flash driver reported a write/erase/alignment fault.
    Flash,
    /// Stored data could not be decoded.
    Corrupted,
}

// Convenience conversions

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(e) => write!(f, "invalid input: {}", e),
            Error::Storage(e) => write!(f, "storage failure: {}", e),
            Error::UnknownCommand => f.write_str("unknown command, type 'help'"),
            Error::NotFound => f.write_str("no saved color with that name"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ArgCount { expected } => {
                write!(f, "expected {} argument(s)", expected)
            }
            ValidationError::NotANumber => f.write_str("argument is not a number"),
            ValidationError::OutOfRange { max } => write!(f, "value must be 0..={}", max),
            ValidationError::NameTooLong => f.write_str("name longer than 31 characters"),
            ValidationError::InvalidName => f.write_str("name must be printable, without spaces"),
            ValidationError::DuplicateName => f.write_str("name already saved"),
            ValidationError::LineTooLong => f.write_str("line too long"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Full => f.write_str("storage full"),
            StorageError::Flash => f.write_str("flash not writable"),
            StorageError::Corrupted => f.write_str("stored data corrupted"),
        }
    }
}
