// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Data verifier (C4): decide whether a signature authenticates a data
//! prefix, either from the raw data or a precomputed digest. Also
//! provides the hash-only checksum compare used by the key-block's
//! unauthenticated-inspection path.
//!
//! Algorithm selection here is a plain `match` on [`algorithm::DigestKind`],
//! a dense, compile-time-enumerable switch, never open-ended plugin
//! dispatch.

use digest::Digest;
use rsa::pkcs1v15::Pkcs1v15Sign;
use sha1::Sha1;
use sha2::{Sha512, Sha256};
use subtle::ConstantTimeEq;

use crate::algorithm::{self, DigestKind};
use crate::key::PublicKeyHandle;
use crate::signature::SignatureView;

/// Why a crypto-level verification call did not succeed. Kept separate
/// from the crate's public [`crate::Error`] because the right external
/// error code depends on which container the caller was validating:
/// a structural size mismatch is always `*Invalid`, but the caller
/// picks which `*Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataVerifyError {
    /// `sig.sig_size`/`sig.data_size` disagreed with the algorithm
    /// table or with the available data: a structural defect, not a
    /// failed cryptographic check.
    SizeMismatch,
    /// The cryptographic primitive rejected the signature/digest.
    Rejected,
}

fn pkcs1v15_scheme(kind: DigestKind) -> Pkcs1v15Sign {
    match kind {
        DigestKind::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        DigestKind::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        DigestKind::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

fn digest_and_verify(kind: DigestKind, key: &rsa::RsaPublicKey, data: &[u8], sig: &[u8]) -> bool {
    match kind {
        DigestKind::Sha1 => {
            let digest = Sha1::digest(data);
            key.verify(pkcs1v15_scheme(kind), &digest, sig).is_ok()
        }
        DigestKind::Sha256 => {
            let digest = Sha256::digest(data);
            key.verify(pkcs1v15_scheme(kind), &digest, sig).is_ok()
        }
        DigestKind::Sha512 => {
            let digest = Sha512::digest(data);
            key.verify(pkcs1v15_scheme(kind), &digest, sig).is_ok()
        }
    }
}

/// Verify-data: check `sig.sig_size == expected_for(algorithm)`, check
/// `sig.data_size <= data.len()`, then verify `sig_bytes` against the
/// first `sig.data_size` bytes of `data`.
pub(crate) fn verify_data(
    data: &[u8],
    sig: &SignatureView,
    sig_bytes: &[u8],
    key: &PublicKeyHandle,
) -> Result<(), DataVerifyError> {
    let spec = algorithm::spec(key.algorithm).ok_or(DataVerifyError::SizeMismatch)?;

    if sig_bytes.len() as u64 != spec.signature_size() {
        log::debug!("signature length does not match algorithm table");
        return Err(DataVerifyError::SizeMismatch);
    }

    if sig.data_size > data.len() as u64 {
        log::debug!("signed prefix extends past the available data");
        return Err(DataVerifyError::SizeMismatch);
    }

    let prefix = &data[..sig.data_size as usize];
    if digest_and_verify(spec.digest, &key.rsa, prefix, sig_bytes) {
        Ok(())
    } else {
        log::debug!("signature verification rejected by crypto provider");
        Err(DataVerifyError::Rejected)
    }
}

/// Verify-digest: identical to [`verify_data`] but the caller supplies
/// a precomputed digest in place of `(data, total_size)`: the hot path
/// for a payload streamed and hashed separately from storage.
pub(crate) fn verify_digest(
    digest: &[u8],
    sig: &SignatureView,
    sig_bytes: &[u8],
    key: &PublicKeyHandle,
) -> Result<(), DataVerifyError> {
    let spec = algorithm::spec(key.algorithm).ok_or(DataVerifyError::SizeMismatch)?;

    if sig_bytes.len() as u64 != spec.signature_size() {
        return Err(DataVerifyError::SizeMismatch);
    }

    if digest.len() as u64 != spec.digest_size() {
        return Err(DataVerifyError::SizeMismatch);
    }

    if key.rsa.verify(pkcs1v15_scheme(spec.digest), digest, sig_bytes).is_ok() {
        Ok(())
    } else {
        log::debug!("digest verification rejected by crypto provider");
        Err(DataVerifyError::Rejected)
    }
}

/// Hash-only checksum compare, used by the key-block's
/// unauthenticated-inspection path. The comparison itself is
/// constant-time: timing leakage of the matching prefix length would
/// otherwise enable iterative forgery against the checksum, even
/// though the compared bytes are adversary-supplied rather than
/// secret.
pub(crate) fn verify_checksum(
    data: &[u8],
    sig: &SignatureView,
    checksum_bytes: &[u8],
) -> Result<(), DataVerifyError> {
    if checksum_bytes.len() as u64 != algorithm::CHECKSUM_DIGEST_SIZE {
        log::debug!("checksum length does not match the configured digest length");
        return Err(DataVerifyError::SizeMismatch);
    }

    if sig.data_size > data.len() as u64 {
        return Err(DataVerifyError::SizeMismatch);
    }

    let digest = Sha512::digest(&data[..sig.data_size as usize]);
    if bool::from(digest.as_slice().ct_eq(checksum_bytes)) {
        Ok(())
    } else {
        log::debug!("checksum did not match recomputed digest");
        Err(DataVerifyError::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::PublicKeyHandle;

    fn odd_modulus() -> [u8; 256] {
        let mut modulus = [0xffu8; 256];
        modulus[255] = 0x01;
        modulus
    }

    #[test]
    fn verify_data_rejects_signed_prefix_longer_than_data() {
        let key = PublicKeyHandle::from_modulus(1, &odd_modulus()).unwrap();
        let sig = SignatureView { sig_offset: 0, sig_size: 256, data_size: 1000 };
        let err = verify_data(&[0u8; 10], &sig, &[0u8; 256], &key).unwrap_err();
        assert_eq!(err, DataVerifyError::SizeMismatch);
    }

    #[test]
    fn verify_data_rejects_wrong_signature_length() {
        let key = PublicKeyHandle::from_modulus(1, &odd_modulus()).unwrap();
        let sig = SignatureView { sig_offset: 0, sig_size: 10, data_size: 4 };
        let err = verify_data(&[0u8; 10], &sig, &[0u8; 10], &key).unwrap_err();
        assert_eq!(err, DataVerifyError::SizeMismatch);
    }

    #[test]
    fn verify_checksum_rejects_mismatched_length() {
        let sig = SignatureView { sig_offset: 0, sig_size: 10, data_size: 4 };
        let err = verify_checksum(&[0u8; 10], &sig, &[0u8; 10]).unwrap_err();
        assert_eq!(err, DataVerifyError::SizeMismatch);
    }

    #[test]
    fn verify_checksum_accepts_matching_digest() {
        let data = b"hello vboot";
        let digest = Sha512::digest(data);
        let sig = SignatureView { sig_offset: 0, sig_size: 64, data_size: data.len() as u64 };
        verify_checksum(data, &sig, &digest).unwrap();
    }

    #[test]
    fn verify_checksum_rejects_mismatched_digest() {
        let data = b"hello vboot";
        let mut digest = Sha512::digest(data);
        digest[0] ^= 0xff;
        let sig = SignatureView { sig_offset: 0, sig_size: 64, data_size: data.len() as u64 };
        let err = verify_checksum(data, &sig, &digest).unwrap_err();
        assert_eq!(err, DataVerifyError::Rejected);
    }
}
