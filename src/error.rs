use static_assertions::assert_impl_all;
use std::fmt;

/// Failure detail reported by the driver alongside a callback.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    description: String,
}

assert_impl_all!(Error: Send, Sync);

impl Error {
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Builds the error from a Core Bluetooth error domain code.
    pub fn from_code(code: isize, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::from_code(code), description)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl std::error::Error for Error {}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Error from unknown domain.
    Other,

    /// An unknown error occurred.
    Unknown,

    /// The specified parameters are invalid.
    InvalidParameters,

    /// The specified attribute handle is invalid.
    InvalidHandle,

    /// The device isn’t currently connected.
    NotConnected,

    /// The device has run out of space to complete the intended operation.
    OutOfSpace,

    /// The error represents a canceled operation.
    OperationCancelled,

    /// The connection timed out.
    ConnectionTimeout,

    /// The peripheral disconnected.
    PeripheralDisconnected,

    /// The specified UUID isn’t permitted.
    UuidNotAllowed,

    /// The peripheral is already advertising.
    AlreadyAdvertising,

    /// The connection failed.
    ConnectionFailed,

    /// The device already has the maximum number of connections.
    ConnectionLimitReached,

    /// The operation isn’t supported.
    OperationNotSupported,

    /// The device is unknown.
    UnknownDevice,

    /// Pairing failed because the peer removed its pairing information.
    PeerRemovedPairingInformation,

    /// The connection failed because of an encryption timeout.
    EncryptionTimedOut,

    /// The peer has reached the maximum number of pairings.
    TooManyLePairedDevices,
}

impl ErrorKind {
    fn from_code(code: isize) -> Self {
        use ErrorKind::*;
        match code {
            1 => InvalidParameters,
            2 => InvalidHandle,
            3 => NotConnected,
            4 => OutOfSpace,
            5 => OperationCancelled,
            6 => ConnectionTimeout,
            7 => PeripheralDisconnected,
            8 => UuidNotAllowed,
            9 => AlreadyAdvertising,
            10 => ConnectionFailed,
            11 => ConnectionLimitReached,
            12 => UnknownDevice,
            13 => OperationNotSupported,
            14 => PeerRemovedPairingInformation,
            15 => EncryptionTimedOut,
            16 => TooManyLePairedDevices,
            0 => Unknown,
            _ => Other,
        }
    }
}

/// Failure outcome of a one-shot central manager operation.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum CentralManagerError {
    /// The driver reported that connecting to the peripheral failed.
    FailedToConnect(Option<Error>),
}

assert_impl_all!(CentralManagerError: Send, Sync);

impl CentralManagerError {
    /// The underlying driver error, if the driver supplied one.
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::FailedToConnect(e) => e.as_ref(),
        }
    }
}

impl fmt::Display for CentralManagerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FailedToConnect(Some(e)) => write!(f, "failed to connect: {}", e),
            Self::FailedToConnect(None) => f.write_str("failed to connect"),
        }
    }
}

impl std::error::Error for CentralManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kind_from_code() {
        assert_eq!(Error::from_code(6, "timed out").kind(), ErrorKind::ConnectionTimeout);
        assert_eq!(Error::from_code(0, "").kind(), ErrorKind::Unknown);
        assert_eq!(Error::from_code(1000, "").kind(), ErrorKind::Other);
    }

    #[test]
    fn connect_failure_display() {
        let e = CentralManagerError::FailedToConnect(Some(Error::new(ErrorKind::ConnectionFailed, "link lost")));
        assert_eq!(e.to_string(), "failed to connect: link lost");
        assert_eq!(e.cause().map(|e| e.kind()), Some(ErrorKind::ConnectionFailed));
        assert_eq!(CentralManagerError::FailedToConnect(None).to_string(), "failed to connect");
    }
}
