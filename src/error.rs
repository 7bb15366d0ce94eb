//! Every error that can occur in this crate.

/// Alias to simplify implementing the results of USB operations.
pub type UsbResult<T> = Result<T, Error>;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// Error for a promise-mode call made while no future implementation is
    /// configured -- neither an injected provider nor the built-in default.
    /// Reported synchronously, before the underlying operation is started.
    NoAsyncImplementationAvailable,

    /// Error for when no devices are found that match a given selector.
    DeviceNotFound,

    /// Error for claiming an interface that is already claimed.
    InterfaceBusy,

    /// A descriptor payload reported by the backend did not parse.
    MalformedDescriptor,

    /// An unspecified error, with associated OS error number.
    OsError(i64),
    UnspecifiedOsError,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Error::*;

        match self {
            NoAsyncImplementationAvailable => write!(
                f,
                "no future implementation available for promise-mode calls",
            )?,
            DeviceNotFound => write!(f, "no device found")?,
            InterfaceBusy => write!(f, "interface is already claimed")?,
            MalformedDescriptor => write!(f, "descriptor data did not parse")?,
            OsError(errno) => write!(f, "operating system IO error {}", errno)?,
            UnspecifiedOsError => write!(
                f,
                "operating system IO error, but the OS doesn't specify which",
            )?,
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
