// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The algorithm table: a dense, compile-time-constant index from
//! `algorithm` field values to RSA modulus size, digest kind, and the
//! canonical key/signature/digest byte lengths those imply.
//!
//! This is looked up by a plain array index, never a `match` on an
//! open-ended tag and never a plugin registry: algorithm selection
//! stays table-driven, not dynamically dispatched.

/// Which digest a given algorithm id pairs an RSA key with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    /// SHA-1 (160-bit digest).
    Sha1,
    /// SHA-256 (256-bit digest).
    Sha256,
    /// SHA-512 (512-bit digest).
    Sha512,
}

impl DigestKind {
    /// Digest output length, in bytes.
    pub const fn digest_size(self) -> u64 {
        match self {
            DigestKind::Sha1 => 20,
            DigestKind::Sha256 => 32,
            DigestKind::Sha512 => 64,
        }
    }
}

/// One row of the algorithm table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmSpec {
    /// RSA modulus size, in bits. The public exponent is fixed at
    /// 65537 for every algorithm, so the modulus length alone fully
    /// determines the processed key size.
    pub modulus_bits: u32,
    /// Digest paired with this RSA modulus size.
    pub digest: DigestKind,
}

impl AlgorithmSpec {
    /// Canonical processed key length: the RSA modulus, big-endian,
    /// with no exponent or padding.
    pub const fn key_size(self) -> u64 {
        (self.modulus_bits as u64) / 8
    }

    /// Canonical signature length: one RSA block.
    pub const fn signature_size(self) -> u64 {
        self.key_size()
    }

    /// Digest length this algorithm's signatures are computed over.
    pub const fn digest_size(self) -> u64 {
        self.digest.digest_size()
    }
}

/// The fixed algorithm table. `algorithm` fields in [`crate::key::PublicKeyView`]
/// index into this array; `N = ALGORITHMS.len()`.
pub static ALGORITHMS: &[AlgorithmSpec] = &[
    AlgorithmSpec { modulus_bits: 2048, digest: DigestKind::Sha1 },
    AlgorithmSpec { modulus_bits: 2048, digest: DigestKind::Sha256 },
    AlgorithmSpec { modulus_bits: 2048, digest: DigestKind::Sha512 },
    AlgorithmSpec { modulus_bits: 4096, digest: DigestKind::Sha256 },
    AlgorithmSpec { modulus_bits: 4096, digest: DigestKind::Sha512 },
    AlgorithmSpec { modulus_bits: 8192, digest: DigestKind::Sha512 },
];

/// Look up an algorithm id in [`ALGORITHMS`]. Returns `None` for `a >= N`.
pub fn spec(algorithm: u64) -> Option<AlgorithmSpec> {
    usize::try_from(algorithm)
        .ok()
        .and_then(|a| ALGORITHMS.get(a))
        .copied()
}

/// Fixed digest used for the key-block's hash-only checksum path. This
/// is independent of any per-key algorithm id: the checksum is not a
/// keyed signature, just a recomputed digest compared for
/// self-consistency.
pub const CHECKSUM_DIGEST_SIZE: u64 = DigestKind::Sha512.digest_size();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_internally_consistent() {
        assert_eq!(ALGORITHMS.len(), 6);
        for a in ALGORITHMS {
            assert_eq!(a.key_size(), a.signature_size());
            assert!(a.digest_size() > 0);
        }
    }

    #[test]
    fn spec_rejects_out_of_range_index() {
        assert!(spec(ALGORITHMS.len() as u64).is_none());
        assert!(spec(u64::MAX).is_none());
    }
}
