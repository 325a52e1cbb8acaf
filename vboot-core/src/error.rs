// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error reporter (C7): a closed enumeration of terminal outcomes, one
//! English phrase per code. The engine emits exactly one value per
//! call; there is no chaining, no cause tracking, no localization.

/// Terminal outcome of a verification call.
///
/// Success is represented as `Ok(..)` on the corresponding `Result`,
/// per normal Rust convention, rather than as a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Magic mismatch, major-version mismatch, size underrun, a bounds
    /// check inside the key-block failed, checksum length mismatch, or
    /// insufficient signed-region coverage.
    KeyBlockInvalid,
    /// The root-key signature did not validate.
    KeyBlockSignatureFailed,
    /// Hash-only mode: checksum did not match the recomputed digest.
    KeyBlockHashFailed,
    /// A [`crate::key::PublicKeyView`]'s algorithm is out of range, its
    /// `key_size` disagrees with the algorithm table, or the crypto
    /// provider rejected the key bytes.
    PublicKeyInvalid,
    /// Major-version mismatch, size underrun, a bounds check inside
    /// the preamble failed, or insufficient signed-region coverage.
    PreambleInvalid,
    /// The preamble signature, verified with the data key, did not
    /// validate. Also used for a caller-invoked `verify_data`/
    /// `verify_digest` rejection of a payload authenticated by a
    /// descriptor obtained from a preamble (e.g. the firmware/kernel
    /// body signature); there is no separate code for that case.
    PreambleSignatureFailed,
}

impl Error {
    /// The one-line phrase associated with this code, suitable for
    /// debug logging only.
    pub const fn phrase(self) -> &'static str {
        match self {
            Error::KeyBlockInvalid => "key block is malformed or internally inconsistent",
            Error::KeyBlockSignatureFailed => "key block signature did not validate against the root key",
            Error::KeyBlockHashFailed => "key block checksum did not match its recomputed digest",
            Error::PublicKeyInvalid => "embedded public key descriptor is invalid",
            Error::PreambleInvalid => "preamble is malformed or internally inconsistent",
            Error::PreambleSignatureFailed => "preamble signature did not validate against the data key",
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.phrase())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
