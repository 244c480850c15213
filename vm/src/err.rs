//! Crate-wide error type.

use core::fmt;

use alloc::collections::TryReserveError;

struct_enum::struct_enum! {
    /// Closed set of failure modes this crate can report.
    pub struct Error: u32 {
        /// A control structure or physical frame could not be allocated.
        OUT_OF_MEMORY = 1;
        /// A caller-supplied argument violates a precondition (e.g. an
        /// empty permission set, or an unrecognized fault kind).
        INVALID_ARGUMENT = 2;
        /// The faulting address is not covered by any region, or a write
        /// targeted a read-only page.
        PROTECTION_FAULT = 3;
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match *self {
            Error::OUT_OF_MEMORY => "out of memory",
            Error::INVALID_ARGUMENT => "invalid argument",
            Error::PROTECTION_FAULT => "protection fault",
            other => return write!(f, "unknown vm error ({})", other.to_raw()),
        };
        f.write_str(msg)
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::OUT_OF_MEMORY
    }
}

pub type Result<T> = core::result::Result<T, Error>;
