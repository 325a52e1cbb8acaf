// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Public-key view (C2): interpreting a packed public-key descriptor
//! and materializing it into an RSA verification handle.

use nom::number::complete::le_u64;
use nom::sequence::tuple;
use nom::IResult;
use num_bigint_dig::BigUint;
use rsa::RsaPublicKey;

use crate::algorithm;
use crate::bounds;
use crate::error::Error;

/// Fixed RSA public exponent used for every key in this format.
const PUBLIC_EXPONENT: u32 = 65537;

/// An unauthenticated, packed public-key descriptor: a header followed,
/// at `key_offset` (relative to the header's own start), by `key_size`
/// bytes of key material.
///
/// This is a non-owning view: it records field values only, not the
/// resolved key bytes. Call [`PublicKeyView::resolve`] against the
/// parent envelope(s) it must live inside before reading any bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKeyView {
    /// Offset of the key material, relative to this header's start.
    pub key_offset: u64,
    /// Length of the key material, in bytes.
    pub key_size: u64,
    /// Index into [`algorithm::ALGORITHMS`].
    pub algorithm: u64,
    /// Opaque monotonic tag, forwarded to callers unexamined.
    pub key_version: u64,
}

impl PublicKeyView {
    /// Size of the fixed-layout header, in bytes.
    pub const LEN: u64 = 32;

    pub(crate) fn parse(i: &[u8]) -> IResult<&[u8], PublicKeyView> {
        nom::combinator::map(
            tuple((le_u64, le_u64, le_u64, le_u64)),
            |(key_offset, key_size, algorithm, key_version)| PublicKeyView {
                key_offset,
                key_size,
                algorithm,
                key_version,
            },
        )(i)
    }

    /// Bounds-check the key material against a parent envelope and
    /// return the raw key bytes. `hdr_off` is this header's own,
    /// statically-known offset inside `parent`.
    fn key_bytes<'a>(
        &self,
        parent: &'a [u8],
        parent_size: u64,
        hdr_off: u64,
    ) -> Result<&'a [u8], bounds::BoundsError> {
        let region = bounds::validate(parent_size, hdr_off, Self::LEN, self.key_offset, self.key_size)?;
        Ok(region.slice(parent))
    }

    /// Resolve and materialize this view into a [`PublicKeyHandle`].
    ///
    /// The caller supplies the *two* envelopes required when this key
    /// must also live inside a signed prefix: pass `signed_size` equal
    /// to `parent_size` when no second envelope applies.
    pub(crate) fn resolve(
        &self,
        parent: &[u8],
        parent_size: u64,
        signed_size: u64,
        hdr_off: u64,
    ) -> Result<PublicKeyHandle, Error> {
        let key_bytes = self
            .key_bytes(parent, parent_size, hdr_off)
            .map_err(|_| Error::PublicKeyInvalid)?;

        // Second envelope: the key must also live inside the signed
        // prefix, not merely inside the container. Omitting this would
        // let an attacker append an unsigned key past the signed
        // region.
        bounds::validate(signed_size, hdr_off, Self::LEN, self.key_offset, self.key_size)
            .map_err(|_| Error::PublicKeyInvalid)?;

        materialize(self.algorithm, key_bytes)
    }
}

/// A materialized RSA public key, tagged with the algorithm id it was
/// declared under. This is the only heap-allocated intermediate the
/// engine produces; it is a plain owned value and is dropped (freeing
/// the underlying `BigUint` storage) on every return path, including
/// early `?`-propagated failures, which is the idiomatic-Rust
/// equivalent of the "release on every exit path" resource discipline.
pub struct PublicKeyHandle {
    pub(crate) algorithm: u64,
    pub(crate) rsa: RsaPublicKey,
}

impl PublicKeyHandle {
    /// Build a handle directly from a modulus and an out-of-band
    /// algorithm id. Used by callers to materialize a root key that is
    /// anchored outside of any container this engine parses (e.g.
    /// baked into read-only hardware).
    pub fn from_modulus(algorithm: u64, modulus: &[u8]) -> Result<Self, Error> {
        materialize(algorithm, modulus)
    }

    /// The algorithm id this key was materialized under.
    pub fn algorithm(&self) -> u64 {
        self.algorithm
    }
}

fn materialize(algorithm: u64, key_bytes: &[u8]) -> Result<PublicKeyHandle, Error> {
    let spec = algorithm::spec(algorithm).ok_or(Error::PublicKeyInvalid)?;

    if key_bytes.len() as u64 != spec.key_size() {
        log::debug!("public key material length mismatch for algorithm {algorithm}");
        return Err(Error::PublicKeyInvalid);
    }

    let n = BigUint::from_bytes_be(key_bytes);
    let e = BigUint::from(PUBLIC_EXPONENT);

    let rsa = RsaPublicKey::new(n, e).map_err(|error| {
        log::debug!("crypto provider rejected public key bytes: {error}");
        Error::PublicKeyInvalid
    })?;

    Ok(PublicKeyHandle { algorithm, rsa })
}
