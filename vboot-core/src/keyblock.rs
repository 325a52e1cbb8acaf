// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Key-block verifier (C5): validate the outer container that hands
//! off a data key, either by root-key signature or, in
//! unauthenticated-inspection mode, by embedded hash.
//!
//! ```text
//!     ENTRY
//!       |  magic/version/size checks
//!       v
//!     CHECKED_HEADER
//!       |  root_key present  -> AUTH_SIGNATURE
//!       |  root_key absent   -> AUTH_HASH
//!       v
//!     AUTH_*  (mutually exclusive)
//!       |  bounds-validate chosen SignatureView inside key_block_size
//!       |  run crypto verify (signature) or digest compare (hash)
//!       v
//!     AUTHENTICATED
//!       |  signed prefix >= sizeof(header), and <= key_block_size
//!       |  bounds-validate data_key inside key_block_size
//!       |  bounds-validate data_key inside signature.data_size
//!       v
//!     ACCEPTED
//! ```
//!
//! In hash-only mode (no root key), acceptance proves only that the
//! key-block's internal checksum is self-consistent: it is **not** a
//! trust decision. Callers use this path for inspection/tooling only.

use nom::number::complete::{le_u32, le_u64};
use nom::IResult;

use crate::error::Error;
use crate::key::{PublicKeyHandle, PublicKeyView};
use crate::signature::SignatureView;
use crate::verify::{self, DataVerifyError};

/// Fixed magic tag identifying a key block.
const MAGIC: [u8; 8] = *b"VBKEYBLK";

/// Supported `header_version_major`. Minor is parsed and ignored.
const MAJOR: u32 = 2;

const OFF_SIGNATURE: u64 = 24;
const OFF_CHECKSUM: u64 = 48;
const OFF_DATA_KEY: u64 = 72;

/// `sizeof` the fixed-layout key-block header, in bytes.
pub const HEADER_LEN: u64 = 104;

#[derive(Debug, Clone, Copy)]
struct KeyBlockHeader {
    magic: [u8; 8],
    major: u32,
    minor: u32,
    key_block_size: u64,
    signature: SignatureView,
    checksum: SignatureView,
    data_key: PublicKeyView,
}

fn header(i: &[u8]) -> IResult<&[u8], KeyBlockHeader> {
    let (i, magic_bytes) = nom::bytes::complete::take(8usize)(i)?;
    let mut magic = [0u8; 8];
    magic.copy_from_slice(magic_bytes);

    let (i, major) = le_u32(i)?;
    let (i, minor) = le_u32(i)?;
    let (i, key_block_size) = le_u64(i)?;
    let (i, signature) = SignatureView::parse(i)?;
    let (i, checksum) = SignatureView::parse(i)?;
    let (i, data_key) = PublicKeyView::parse(i)?;

    Ok((
        i,
        KeyBlockHeader {
            magic,
            major,
            minor,
            key_block_size,
            signature,
            checksum,
            data_key,
        },
    ))
}

/// The handed-off data key and bookkeeping fields from a successfully
/// validated key block.
pub struct VerifiedKeyBlock {
    /// The data key, to be used to validate a preamble.
    pub data_key: PublicKeyHandle,
    /// `key_block_size` declared by the container.
    pub key_block_size: u64,
    /// `key_version` of the handed-off data key, forwarded unexamined.
    pub data_key_version: u64,
    /// `header_version_minor` declared by the container, forwarded
    /// unexamined.
    pub header_version_minor: u32,
}

/// Validate a key-block container.
///
/// With `root_key` present: prove the key block was signed by that
/// root key, and that `data_key` is authenticated. Without: prove only
/// that the block's embedded checksum is self-consistent: inspection
/// only, not a trust decision.
pub fn verify_keyblock(buf: &[u8], root_key: Option<&PublicKeyHandle>) -> Result<VerifiedKeyBlock, Error> {
    log::debug!("verifying key block ({} bytes supplied)", buf.len());

    let (_, header) = header(buf).map_err(|_| Error::KeyBlockInvalid)?;

    if header.magic != MAGIC {
        log::debug!("key block magic mismatch");
        return Err(Error::KeyBlockInvalid);
    }

    if header.major != MAJOR {
        log::debug!("key block major version mismatch: got {}, want {MAJOR}", header.major);
        return Err(Error::KeyBlockInvalid);
    }

    let key_block_size = header.key_block_size;
    if (buf.len() as u64) < key_block_size {
        log::debug!("buffer ({} bytes) shorter than declared key_block_size ({key_block_size})", buf.len());
        return Err(Error::KeyBlockInvalid);
    }

    log::trace!("key block header checked, key_block_size={key_block_size}");

    let (chosen, chosen_off) = match root_key {
        Some(_) => (&header.signature, OFF_SIGNATURE),
        None => (&header.checksum, OFF_CHECKSUM),
    };

    let sig_bytes = chosen
        .sig_bytes(buf, key_block_size, chosen_off)
        .map_err(|_| Error::KeyBlockInvalid)?;

    match root_key {
        Some(root_key) => {
            log::trace!("authenticating key block by root-key signature");
            verify::verify_data(buf, chosen, sig_bytes, root_key).map_err(|e| match e {
                DataVerifyError::SizeMismatch => Error::KeyBlockInvalid,
                DataVerifyError::Rejected => Error::KeyBlockSignatureFailed,
            })?;
        }
        None => {
            log::trace!("authenticating key block by embedded checksum (inspection only)");
            verify::verify_checksum(buf, chosen, sig_bytes).map_err(|e| match e {
                DataVerifyError::SizeMismatch => Error::KeyBlockInvalid,
                DataVerifyError::Rejected => Error::KeyBlockHashFailed,
            })?;
        }
    }

    // The header itself must be covered by its own signature, or a
    // substitution of header fields below the signed range would go
    // unnoticed.
    if chosen.data_size < HEADER_LEN {
        log::debug!("signed prefix ({}) does not cover the key block header ({HEADER_LEN})", chosen.data_size);
        return Err(Error::KeyBlockInvalid);
    }

    // The signed prefix cannot extend past the container.
    if key_block_size < chosen.data_size {
        log::debug!("signed prefix ({}) extends past key_block_size ({key_block_size})", chosen.data_size);
        return Err(Error::KeyBlockInvalid);
    }

    // data_key must live inside the container *and* inside the signed
    // prefix: two separate envelopes. Omitting the second would allow
    // an attacker to append an unsigned key past the signed region.
    let data_key = header
        .data_key
        .resolve(buf, key_block_size, chosen.data_size, OFF_DATA_KEY)?;

    log::debug!("key block accepted");

    Ok(VerifiedKeyBlock {
        data_key_version: header.data_key.key_version,
        header_version_minor: header.minor,
        key_block_size,
        data_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_truncated_header() {
        let err = verify_keyblock(&[0u8; 10], None).unwrap_err();
        assert_eq!(err, Error::KeyBlockInvalid);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = [0u8; HEADER_LEN as usize];
        buf[0..8].copy_from_slice(b"NOTAVBK!");
        let err = verify_keyblock(&buf, None).unwrap_err();
        assert_eq!(err, Error::KeyBlockInvalid);
    }

    #[test]
    fn rejects_buffer_shorter_than_declared_size() {
        let mut buf = [0u8; HEADER_LEN as usize];
        buf[0..8].copy_from_slice(&MAGIC);
        buf[8..12].copy_from_slice(&MAJOR.to_le_bytes());
        buf[16..24].copy_from_slice(&(HEADER_LEN + 1000).to_le_bytes());
        let err = verify_keyblock(&buf, None).unwrap_err();
        assert_eq!(err, Error::KeyBlockInvalid);
    }
}
