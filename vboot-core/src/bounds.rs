// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The bounds validator (C1): the single trust boundary between a
//! declared `(offset, size)` pair and the bytes it names.
//!
//! No other module in this crate may turn an offset into a slice
//! without going through [`validate`]. All arithmetic is done in `u64`
//! regardless of host pointer width, and every addition is checked:
//! overflow is rejected, never wrapped.

/// A byte range inside some buffer, already proven to be in bounds.
///
/// `start`/`end` are absolute offsets from the start of the buffer that
/// [`validate`] was called against (the container, not necessarily the
/// whole caller-supplied input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    start: u64,
    end: u64,
}

impl Region {
    /// Resolve this region into a slice of `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than the region. Callers must only
    /// ever call this with the same buffer (or a buffer at least as
    /// long) that the region's `parent_size` was checked against.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start as usize..self.end as usize]
    }

    /// Length of this region, in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns `true` if this region is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Reasons [`validate`] can refuse a sub-region. Carries no data beyond
/// the fact of rejection: this is an internal signal consumed by the
/// component-level error mapping, never surfaced directly to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsError;

/// Is sub-region `(data_offset, data_size)`, computed relative to a
/// member header of `member_size` bytes located at `hdr_off` inside a
/// parent of `parent_size` bytes, fully contained in the parent?
///
/// `hdr_off` is never derived from pointer subtraction: every caller in
/// this crate passes a statically-known header offset (containers have
/// a fixed layout; only the key/signature *material* they point at has
/// a caller-declared offset), so there is no "pointer not inside
/// parent" case to reason about, only the arithmetic below.
///
/// On success, returns the resolved, absolute `Region` of the named
/// sub-object (`[hdr_off + data_offset, hdr_off + data_offset +
/// data_size)`), so the caller can slice it without repeating the
/// arithmetic.
pub fn validate(
    parent_size: u64,
    hdr_off: u64,
    member_size: u64,
    data_offset: u64,
    data_size: u64,
) -> Result<Region, BoundsError> {
    if hdr_off > parent_size {
        return Err(BoundsError);
    }

    let hdr_end = hdr_off.checked_add(member_size).ok_or(BoundsError)?;
    if hdr_end > parent_size {
        return Err(BoundsError);
    }

    let data_start = hdr_off.checked_add(data_offset).ok_or(BoundsError)?;
    if data_start > parent_size {
        return Err(BoundsError);
    }

    let data_end = data_start.checked_add(data_size).ok_or(BoundsError)?;
    if data_end > parent_size {
        return Err(BoundsError);
    }

    Ok(Region {
        start: data_start,
        end: data_end,
    })
}

/// Is the header itself, `member_size` bytes at `hdr_off`, contained in
/// a parent of `parent_size` bytes? Used when a sub-object's own header
/// bytes must be checked without yet knowing a data offset/size to
/// resolve (e.g. before that header has been parsed).
pub fn validate_header(parent_size: u64, hdr_off: u64, member_size: u64) -> Result<(), BoundsError> {
    validate(parent_size, hdr_off, member_size, 0, 0).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_fully_contained_region() {
        let region = validate(100, 10, 20, 5, 30).unwrap();
        assert_eq!(region.slice(&[0u8; 100]).len(), 30);
    }

    #[test]
    fn rejects_header_past_parent() {
        assert_eq!(validate(100, 90, 20, 0, 0), Err(BoundsError));
    }

    #[test]
    fn rejects_data_past_parent() {
        assert_eq!(validate(100, 10, 20, 5, 66), Err(BoundsError));
    }

    #[test]
    fn rejects_hdr_off_past_parent_even_with_zero_member_size() {
        assert_eq!(validate(100, 101, 0, 0, 0), Err(BoundsError));
    }

    #[test]
    fn rejects_overflow_in_data_offset() {
        assert_eq!(validate(100, 10, 20, u64::MAX, 1), Err(BoundsError));
    }

    #[test]
    fn rejects_overflow_in_data_size() {
        assert_eq!(validate(100, 10, 20, 5, u64::MAX), Err(BoundsError));
    }

    #[test]
    fn accepts_exact_fit() {
        let region = validate(50, 0, 10, 0, 50).unwrap();
        assert_eq!(region.len(), 50);
    }

    #[test]
    fn rejects_one_byte_overrun() {
        assert_eq!(validate(50, 0, 10, 0, 51), Err(BoundsError));
    }
}
