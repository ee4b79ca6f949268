use std::ops::Range;

use thiserror::Error;

/// Caller contract violations reported by the checked (`try_*`) operations.
///
/// Running out of data or dropping more than is held are not errors, those
/// operations saturate instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("range {index}..{index}+{length} is out of bounds for a slice of length {len}")]
    RangeOutOfBounds {
        index: usize,
        length: usize,
        len: usize,
    },

    #[error("requested {requested} bytes but the destination only has room for {remaining}")]
    CapacityExceeded { requested: usize, remaining: usize },
}

/// Resolves `index`/`length` against a slice of `len` elements.
pub(crate) fn checked_range(len: usize, index: usize, length: usize) -> Result<Range<usize>, Error> {
    match index.checked_add(length) {
        Some(end) if end <= len => Ok(index..end),
        _ => Err(Error::RangeOutOfBounds { index, length, len }),
    }
}
