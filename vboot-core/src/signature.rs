// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Signature view (C3): a purely descriptive header naming both the
//! signed input prefix and the signature bytes. Performs no
//! allocation; interpreted by [`crate::verify`].

use nom::number::complete::le_u64;
use nom::sequence::tuple;
use nom::IResult;

use crate::bounds;

/// An unauthenticated, packed signature descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureView {
    /// Offset of the signature blob, relative to this header's start.
    pub sig_offset: u64,
    /// Length of the signature blob, in bytes.
    pub sig_size: u64,
    /// Length, from some externally-specified base, of the bytes this
    /// signature authenticates. The signed region is always a *prefix*
    /// of the container.
    pub data_size: u64,
}

impl SignatureView {
    /// Size of the fixed-layout header, in bytes.
    pub const LEN: u64 = 24;

    pub(crate) fn parse(i: &[u8]) -> IResult<&[u8], SignatureView> {
        nom::combinator::map(
            tuple((le_u64, le_u64, le_u64)),
            |(sig_offset, sig_size, data_size)| SignatureView {
                sig_offset,
                sig_size,
                data_size,
            },
        )(i)
    }

    /// Bounds-check the signature blob against a parent envelope and
    /// return the raw signature bytes. `hdr_off` is this header's own,
    /// statically-known offset inside `parent`.
    pub(crate) fn sig_bytes<'a>(
        &self,
        parent: &'a [u8],
        parent_size: u64,
        hdr_off: u64,
    ) -> Result<&'a [u8], bounds::BoundsError> {
        let region = bounds::validate(parent_size, hdr_off, Self::LEN, self.sig_offset, self.sig_size)?;
        Ok(region.slice(parent))
    }
}
