use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    WouldBlock,
    Disconnected,
    Interrupted,
    SchedulerFull,
    Other,
}

/// Error reported by a raw device or the event loop.
///
/// Rings never return errors: misuse of their API is a caller bug and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Error { kind }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true for errors that only mean "try again on a later tick".
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorKind::WouldBlock | ErrorKind::Interrupted)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::WouldBlock => write!(f, "Operation would block"),
            ErrorKind::Disconnected => write!(f, "Device disconnected"),
            ErrorKind::Interrupted => write!(f, "Operation interrupted"),
            ErrorKind::SchedulerFull => write!(f, "Event loop has no free task slot"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        let kind = match err.kind {
            ErrorKind::WouldBlock => std::io::ErrorKind::WouldBlock,
            ErrorKind::Disconnected => std::io::ErrorKind::NotConnected,
            ErrorKind::Interrupted => std::io::ErrorKind::Interrupted,
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
