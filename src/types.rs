use embedded_storage::nor_flash::{NorFlashError, NorFlashErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No flash descriptor has been cached yet.
    NotInitialized,
    /// Auto-identification did not report a valid part.
    IdentifyFailed,
    /// The engine cannot snapshot the decode configuration in its current mode.
    StateSaveUnsupported,
    /// Decode state could not be saved, so the decode path was forced to
    /// [`FALLBACK_DECODE_CONFIG`](crate::rcv::FALLBACK_DECODE_CONFIG) and the
    /// recovery bit was not touched.
    DecodeFallback,
    /// A flash command completed but did not have the requested effect.
    CommandFailure,
    Timeout,
    /// An exclusive section was requested while one is already open.
    Reentrant,
    InvalidBitPosition,
    NotAligned,
    OutOfBounds,
}

impl NorFlashError for Error {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            Self::NotAligned => NorFlashErrorKind::NotAligned,
            Self::OutOfBounds => NorFlashErrorKind::OutOfBounds,
            Self::NotInitialized
            | Self::IdentifyFailed
            | Self::StateSaveUnsupported
            | Self::DecodeFallback
            | Self::CommandFailure
            | Self::Timeout
            | Self::Reentrant
            | Self::InvalidBitPosition => NorFlashErrorKind::Other,
        }
    }
}

impl From<NorFlashErrorKind> for Error {
    fn from(value: NorFlashErrorKind) -> Self {
        match value {
            NorFlashErrorKind::NotAligned => Self::NotAligned,
            NorFlashErrorKind::OutOfBounds => Self::OutOfBounds,
            _ => Self::CommandFailure,
        }
    }
}

/// Bus width used by the memory-mapped read path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoMode {
    /// Command, address and data on one line.
    Single,
    DualOutput,
    QuadOutput,
    DualIo,
    QuadIo,
}
