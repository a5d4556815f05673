//! Error taxonomy for the sieving engine.

use thiserror::Error;

/// Errors that can surface from the public engine API.
///
/// Propagation is synchronous and non-retrying: a failed call leaves the
/// engine in a resettable but otherwise unspecified state. Callers should
/// construct a fresh engine (or iterator) rather than attempt to resume one
/// that has returned an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SieveError {
    /// `stop` exceeds the maximum supported bound, or `start > stop` at an
    /// API boundary that rejects it, or an `nth_prime` request would exceed
    /// the supported range.
    #[error("{value} is out of range: {reason}")]
    OutOfRange { value: u64, reason: String },

    /// A tuning parameter violates a crosser's precondition: sieve size not
    /// a power of two where required, sieve size outside `[16, 8192]` KiB,
    /// or a max-prime bound that would overflow a crosser's multiple index.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The bucket allocator could not obtain a fresh block of storage.
    #[error("allocation failure: {0}")]
    Allocation(String),

    /// An internal failure in the iterator's forward/backward refill logic.
    /// Once returned, the iterator has latched into an error state; further
    /// calls return `None` rather than attempting to resieve.
    #[error("iterator error: {0}")]
    Iterator(String),
}

impl SieveError {
    pub fn out_of_range(value: u64, reason: impl Into<String>) -> Self {
        SieveError::OutOfRange {
            value,
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        SieveError::InvalidConfig(reason.into())
    }

    pub fn allocation(reason: impl Into<String>) -> Self {
        SieveError::Allocation(reason.into())
    }

    pub fn iterator(reason: impl Into<String>) -> Self {
        SieveError::Iterator(reason.into())
    }
}

/// Convenience alias used throughout the crate.
pub type SieveResult<T> = Result<T, SieveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = SieveError::out_of_range(u64::MAX, "exceeds MAX_STOP");
        assert_eq!(
            err.to_string(),
            format!("{} is out of range: exceeds MAX_STOP", u64::MAX)
        );

        let err = SieveError::invalid_config("sieve size must be a power of two");
        assert_eq!(
            err.to_string(),
            "invalid configuration: sieve size must be a power of two"
        );
    }

    #[test]
    fn errors_are_comparable_for_tests() {
        assert_eq!(
            SieveError::allocation("out of memory"),
            SieveError::allocation("out of memory")
        );
        assert_ne!(
            SieveError::allocation("a"),
            SieveError::allocation("b")
        );
    }
}
