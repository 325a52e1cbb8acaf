// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Verified-boot container parsing and signature verification.
//!
//! Given a root public key anchored in read-only hardware and a
//! candidate firmware or kernel image, this crate walks a chain of
//! embedded, self-describing, signed containers (a key block, then a
//! preamble) and reports either the identity of a trusted data key
//! (and, for firmware, a trusted kernel subkey) or a precise failure
//! reason.
//!
//! The hard part is the container-parsing and bounds-validation
//! discipline, not the cryptography: every offset/size pair named by a
//! container must be checked against *two* envelopes (the parent
//! object and the signed-region prefix) before any byte it names is
//! read, and every transition between "unauthenticated bytes" and
//! "authenticated structure" is explicit: see [`bounds`] for the
//! single trust boundary this crate funnels every sub-object through.
//!
//! This engine does not decide policy beyond signature validity and
//! major-version compatibility: it does not enforce rollback
//! protection (version numbers are parsed and returned to callers, not
//! compared), and it never mutates the input buffer.
//!
//! # Example
//!
//! ```
//! use vboot_core::{keyblock, preamble};
//!
//! fn boot(key_block_buf: &[u8], preamble_buf: &[u8], root_key: &vboot_core::PublicKeyHandle) {
//!     let key_block = match keyblock::verify_keyblock(key_block_buf, Some(root_key)) {
//!         Ok(kb) => kb,
//!         Err(e) => {
//!             log::error!("key block rejected: {e}");
//!             return;
//!         }
//!     };
//!
//!     match preamble::verify_firmware_preamble(preamble_buf, &key_block.data_key) {
//!         Ok(pre) => log::info!("firmware preamble accepted, version {}", pre.firmware_version),
//!         Err(e) => log::error!("preamble rejected: {e}"),
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod bounds;
pub mod error;
pub mod key;
pub mod keyblock;
pub mod preamble;
pub mod signature;
mod verify;

pub use algorithm::{AlgorithmSpec, DigestKind, ALGORITHMS};
pub use error::Error;
pub use key::{PublicKeyHandle, PublicKeyView};
pub use keyblock::{verify_keyblock, VerifiedKeyBlock};
pub use preamble::{verify_firmware_preamble, verify_kernel_preamble, VerifiedFirmwarePreamble, VerifiedKernelPreamble};
pub use signature::SignatureView;

use verify::DataVerifyError;

/// Verify-data: check that `sig_bytes` authenticates the first
/// `sig.data_size` bytes of `data` under `key`.
///
/// Exposed at the crate root as the same primitive [`keyblock`] and
/// [`preamble`] use internally, so that callers can apply it to a
/// `body_signature` descriptor obtained from a verified preamble: the
/// firmware/kernel body itself is loaded and hashed outside this
/// crate's scope (flash layout, storage I/O), per [`crate`]'s
/// documented non-goals.
pub fn verify_data(data: &[u8], sig: &SignatureView, sig_bytes: &[u8], key: &PublicKeyHandle) -> Result<(), Error> {
    verify::verify_data(data, sig, sig_bytes, key).map_err(|e| match e {
        DataVerifyError::SizeMismatch => Error::PreambleInvalid,
        DataVerifyError::Rejected => Error::PreambleSignatureFailed,
    })
}

/// Verify-digest: identical to [`verify_data`] but `digest` is a
/// precomputed digest in place of `(data, total_size)`: the hot path
/// for a body streamed and hashed separately from storage.
pub fn verify_digest(digest: &[u8], sig: &SignatureView, sig_bytes: &[u8], key: &PublicKeyHandle) -> Result<(), Error> {
    verify::verify_digest(digest, sig, sig_bytes, key).map_err(|e| match e {
        DataVerifyError::SizeMismatch => Error::PreambleInvalid,
        DataVerifyError::Rejected => Error::PreambleSignatureFailed,
    })
}
