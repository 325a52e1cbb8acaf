// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Builds signed key-block/preamble byte buffers from scratch, using a
//! seeded RNG so the resulting test vectors are reproducible without
//! checking in any real key material as binary fixtures.
//!
//! The field layout and fixed offsets mirror `vboot-core`'s parsers
//! exactly; see the module docs for the mapping. Signed-prefix
//! boundaries are chosen so that every object the engine bounds-checks
//! against a signed prefix (the key block's `data_key`, a preamble's
//! `kernel_subkey` and `body_signature`) actually lies inside it, while
//! the signature/checksum blob that authenticates the prefix is itself
//! placed just outside it: signing a container's own trailing
//! signature bytes would be circular.

use digest::Digest;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rsa::pkcs1v15::Pkcs1v15Sign;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

/// Digest paired with an algorithm id. Mirrors `vboot_core::algorithm::DigestKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
}

/// One row of the algorithm table. Mirrors `vboot_core::algorithm::ALGORITHMS`
/// field for field; kept in sync by hand since this crate does not
/// depend on `vboot-core` (that dependency runs the other way).
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmSpec {
    /// RSA modulus size, in bits.
    pub modulus_bits: u32,
    /// Digest this algorithm's signatures are computed over.
    pub digest: DigestKind,
}

impl AlgorithmSpec {
    /// Canonical processed key length, in bytes.
    pub fn key_size(self) -> u64 {
        (self.modulus_bits as u64) / 8
    }

    /// Canonical signature length, in bytes: one RSA block.
    pub fn signature_size(self) -> u64 {
        self.key_size()
    }
}

/// Mirrors `vboot_core::algorithm::ALGORITHMS`.
pub static ALGORITHMS: &[AlgorithmSpec] = &[
    AlgorithmSpec { modulus_bits: 2048, digest: DigestKind::Sha1 },
    AlgorithmSpec { modulus_bits: 2048, digest: DigestKind::Sha256 },
    AlgorithmSpec { modulus_bits: 2048, digest: DigestKind::Sha512 },
    AlgorithmSpec { modulus_bits: 4096, digest: DigestKind::Sha256 },
    AlgorithmSpec { modulus_bits: 4096, digest: DigestKind::Sha512 },
    AlgorithmSpec { modulus_bits: 8192, digest: DigestKind::Sha512 },
];

/// Fixed digest used for a key block's hash-only checksum. Mirrors
/// `vboot_core::algorithm::CHECKSUM_DIGEST_SIZE`.
pub const CHECKSUM_DIGEST_SIZE: u64 = 64;

fn algorithm(id: u64) -> AlgorithmSpec {
    ALGORITHMS[id as usize]
}

fn digest_bytes(kind: DigestKind, data: &[u8]) -> Vec<u8> {
    match kind {
        DigestKind::Sha1 => Sha1::digest(data).to_vec(),
        DigestKind::Sha256 => Sha256::digest(data).to_vec(),
        DigestKind::Sha512 => Sha512::digest(data).to_vec(),
    }
}

fn pkcs1v15_scheme(kind: DigestKind) -> Pkcs1v15Sign {
    match kind {
        DigestKind::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        DigestKind::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        DigestKind::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

/// Sign `data` (a whole prefix, not a pre-hashed digest) under `key`'s
/// algorithm, producing the raw signature bytes as they would appear
/// embedded in a container.
fn sign(kind: DigestKind, key: &RsaPrivateKey, data: &[u8]) -> Vec<u8> {
    let digest = digest_bytes(kind, data);
    key.sign(pkcs1v15_scheme(kind), &digest)
        .expect("rsa signing should not fail for a freshly generated test key")
}

/// An RSA key pair tagged with the algorithm id it was generated
/// under, analogous to `vboot_core::key::PublicKeyHandle` but retaining
/// the private half so test vectors can sign with it.
pub struct TestKey {
    /// Index into [`ALGORITHMS`].
    pub algorithm: u64,
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl TestKey {
    /// Deterministically generate a key pair for `algorithm` from
    /// `seed`. The same `(seed, algorithm)` always yields the same key.
    pub fn generate(seed: u64, algorithm: u64) -> Self {
        let spec = self::algorithm(algorithm);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let private = RsaPrivateKey::new(&mut rng, spec.modulus_bits as usize)
            .expect("rsa key generation should not fail for a supported modulus size");
        let public = RsaPublicKey::from(&private);
        TestKey { algorithm, private, public }
    }

    /// The processed public-key material: the RSA modulus, big-endian,
    /// left-padded to the algorithm's canonical key size.
    pub fn modulus_bytes(&self) -> Vec<u8> {
        let spec = self::algorithm(self.algorithm);
        let size = spec.key_size() as usize;
        let raw = self.public.n().to_bytes_be();
        let mut out = vec![0u8; size];
        out[size - raw.len()..].copy_from_slice(&raw);
        out
    }
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut [u8], at: usize, v: u64) {
    buf[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

/// Write a `SignatureView` header (`sig_offset`, `sig_size`, `data_size`)
/// at absolute offset `at`.
fn put_signature_view(buf: &mut [u8], at: usize, sig_offset: u64, sig_size: u64, data_size: u64) {
    put_u64(buf, at, sig_offset);
    put_u64(buf, at + 8, sig_size);
    put_u64(buf, at + 16, data_size);
}

/// Write a `PublicKeyView` header (`key_offset`, `key_size`, `algorithm`,
/// `key_version`) at absolute offset `at`.
fn put_key_view(buf: &mut [u8], at: usize, key_offset: u64, key_size: u64, algorithm: u64, key_version: u64) {
    put_u64(buf, at, key_offset);
    put_u64(buf, at + 8, key_size);
    put_u64(buf, at + 16, algorithm);
    put_u64(buf, at + 24, key_version);
}

/// `sizeof` the fixed-layout key-block header. Mirrors `vboot_core::keyblock::HEADER_LEN`.
pub const KEY_BLOCK_HEADER_LEN: u64 = 104;
const KB_OFF_SIGNATURE: u64 = 24;
const KB_OFF_CHECKSUM: u64 = 48;
const KB_OFF_DATA_KEY: u64 = 72;
/// Default magic tag. Mirrors `vboot_core::keyblock::MAGIC`.
pub const KEY_BLOCK_MAGIC: [u8; 8] = *b"VBKEYBLK";
/// Default supported major version. Mirrors `vboot_core::keyblock::MAJOR`.
pub const KEY_BLOCK_MAJOR: u32 = 2;

/// Build a key-block container handing off `data_key`, signed by
/// `root`.
///
/// The returned buffer authenticates via either path: pass it to
/// `verify_keyblock(buf, Some(&root_handle))` for the signature path,
/// or `verify_keyblock(buf, None)` for hash-only inspection: both
/// check against data written by this one call, since a real key block
/// carries both a signature and a checksum unconditionally.
pub fn build_key_block(data_key: &TestKey, root: &TestKey, data_key_version: u64, header_version_minor: u32) -> Vec<u8> {
    let data_key_modulus = data_key.modulus_bytes();
    let key_size = data_key_modulus.len() as u64;
    let root_spec = algorithm(root.algorithm);

    let data_key_offset = KEY_BLOCK_HEADER_LEN;
    let sig_blob_offset = data_key_offset + key_size;
    let sig_blob_len = root_spec.signature_size();
    let checksum_blob_offset = sig_blob_offset + sig_blob_len;
    let checksum_blob_len = CHECKSUM_DIGEST_SIZE;
    let total = checksum_blob_offset + checksum_blob_len;

    // Signed prefix covers the header and the handed-off data key, but
    // stops short of the signature/checksum blobs that authenticate it.
    let data_size = data_key_offset + key_size;

    let mut buf = vec![0u8; total as usize];
    buf[0..8].copy_from_slice(&KEY_BLOCK_MAGIC);
    put_u32(&mut buf, 8, KEY_BLOCK_MAJOR);
    put_u32(&mut buf, 12, header_version_minor);
    put_u64(&mut buf, 16, total);
    put_signature_view(&mut buf, KB_OFF_SIGNATURE as usize, sig_blob_offset - KB_OFF_SIGNATURE, sig_blob_len, data_size);
    put_signature_view(&mut buf, KB_OFF_CHECKSUM as usize, checksum_blob_offset - KB_OFF_CHECKSUM, checksum_blob_len, data_size);
    put_key_view(&mut buf, KB_OFF_DATA_KEY as usize, data_key_offset - KB_OFF_DATA_KEY, key_size, data_key.algorithm, data_key_version);
    buf[data_key_offset as usize..(data_key_offset + key_size) as usize].copy_from_slice(&data_key_modulus);

    let prefix = buf[0..data_size as usize].to_vec();
    let signature = sign(root_spec.digest, &root.private, &prefix);
    buf[sig_blob_offset as usize..(sig_blob_offset + sig_blob_len) as usize].copy_from_slice(&signature);

    let checksum = Sha512::digest(&prefix);
    buf[checksum_blob_offset as usize..(checksum_blob_offset + checksum_blob_len) as usize].copy_from_slice(&checksum);

    buf
}

/// A body-signature descriptor plus the raw signature bytes that get
/// embedded in the preamble. The signed body itself lives outside the
/// preamble buffer (on flash, in this format); only its signature
/// travels with the preamble.
pub struct BodySignature {
    /// Length of the (externally stored) body this signature authenticates.
    pub data_size: u64,
    /// Raw signature bytes, already sized to the signing key's algorithm.
    pub sig_bytes: Vec<u8>,
}

/// Sign `body` under `key`, producing a [`BodySignature`] ready to embed
/// in a firmware or kernel preamble.
pub fn sign_body(key: &TestKey, body: &[u8]) -> BodySignature {
    let spec = algorithm(key.algorithm);
    BodySignature {
        data_size: body.len() as u64,
        sig_bytes: sign(spec.digest, &key.private, body),
    }
}

/// `sizeof` the fixed-layout firmware-preamble header. Mirrors
/// `vboot_core::preamble::FIRMWARE_HEADER_LEN`.
pub const FIRMWARE_HEADER_LEN: u64 = 104;
const FW_OFF_PREAMBLE_SIGNATURE: u64 = 16;
const FW_OFF_KERNEL_SUBKEY: u64 = 48;
const FW_OFF_BODY_SIGNATURE: u64 = 80;
/// Default supported major version. Mirrors `vboot_core::preamble::FIRMWARE_MAJOR`.
pub const FIRMWARE_MAJOR: u32 = 2;

/// Build a firmware-preamble container, signed by `data_key` and handing
/// off `kernel_subkey`.
pub fn build_firmware_preamble(
    data_key: &TestKey,
    kernel_subkey: &TestKey,
    firmware_version: u64,
    header_version_minor: u32,
    body_signature: &BodySignature,
) -> Vec<u8> {
    let kernel_subkey_modulus = kernel_subkey.modulus_bytes();
    let kernel_key_size = kernel_subkey_modulus.len() as u64;
    let data_key_spec = algorithm(data_key.algorithm);

    let kernel_subkey_offset = FIRMWARE_HEADER_LEN;
    let body_sig_blob_offset = kernel_subkey_offset + kernel_key_size;
    let body_sig_blob_len = body_signature.sig_bytes.len() as u64;
    let preamble_sig_blob_offset = body_sig_blob_offset + body_sig_blob_len;
    let preamble_sig_blob_len = data_key_spec.signature_size();
    let total = preamble_sig_blob_offset + preamble_sig_blob_len;

    // Signed prefix covers the header, the kernel subkey, and the body
    // signature blob, but stops short of its own trailing signature.
    let data_size = body_sig_blob_offset + body_sig_blob_len;

    let mut buf = vec![0u8; total as usize];
    put_u32(&mut buf, 0, FIRMWARE_MAJOR);
    put_u32(&mut buf, 4, header_version_minor);
    put_u64(&mut buf, 8, total);
    put_signature_view(
        &mut buf,
        FW_OFF_PREAMBLE_SIGNATURE as usize,
        preamble_sig_blob_offset - FW_OFF_PREAMBLE_SIGNATURE,
        preamble_sig_blob_len,
        data_size,
    );
    put_u64(&mut buf, 40, firmware_version);
    put_key_view(
        &mut buf,
        FW_OFF_KERNEL_SUBKEY as usize,
        kernel_subkey_offset - FW_OFF_KERNEL_SUBKEY,
        kernel_key_size,
        kernel_subkey.algorithm,
        0,
    );
    put_signature_view(
        &mut buf,
        FW_OFF_BODY_SIGNATURE as usize,
        body_sig_blob_offset - FW_OFF_BODY_SIGNATURE,
        body_sig_blob_len,
        body_signature.data_size,
    );
    buf[kernel_subkey_offset as usize..(kernel_subkey_offset + kernel_key_size) as usize]
        .copy_from_slice(&kernel_subkey_modulus);
    buf[body_sig_blob_offset as usize..(body_sig_blob_offset + body_sig_blob_len) as usize]
        .copy_from_slice(&body_signature.sig_bytes);

    let prefix = buf[0..data_size as usize].to_vec();
    let signature = sign(data_key_spec.digest, &data_key.private, &prefix);
    buf[preamble_sig_blob_offset as usize..(preamble_sig_blob_offset + preamble_sig_blob_len) as usize]
        .copy_from_slice(&signature);

    buf
}

/// `sizeof` the fixed-layout kernel-preamble header. Mirrors
/// `vboot_core::preamble::KERNEL_HEADER_LEN`.
pub const KERNEL_HEADER_LEN: u64 = 88;
const KERNEL_OFF_PREAMBLE_SIGNATURE: u64 = 16;
const KERNEL_OFF_BODY_SIGNATURE: u64 = 64;
/// Default supported major version. Mirrors `vboot_core::preamble::KERNEL_MAJOR`.
pub const KERNEL_MAJOR: u32 = 1;

/// Build a kernel-preamble container, signed by `data_key` (either the
/// key block's data key directly, or a firmware preamble's kernel
/// subkey).
pub fn build_kernel_preamble(
    data_key: &TestKey,
    kernel_version: u64,
    body_load_address: u64,
    header_version_minor: u32,
    body_signature: &BodySignature,
) -> Vec<u8> {
    let data_key_spec = algorithm(data_key.algorithm);

    let body_sig_blob_offset = KERNEL_HEADER_LEN;
    let body_sig_blob_len = body_signature.sig_bytes.len() as u64;
    let preamble_sig_blob_offset = body_sig_blob_offset + body_sig_blob_len;
    let preamble_sig_blob_len = data_key_spec.signature_size();
    let total = preamble_sig_blob_offset + preamble_sig_blob_len;

    let data_size = body_sig_blob_offset + body_sig_blob_len;

    let mut buf = vec![0u8; total as usize];
    put_u32(&mut buf, 0, KERNEL_MAJOR);
    put_u32(&mut buf, 4, header_version_minor);
    put_u64(&mut buf, 8, total);
    put_signature_view(
        &mut buf,
        KERNEL_OFF_PREAMBLE_SIGNATURE as usize,
        preamble_sig_blob_offset - KERNEL_OFF_PREAMBLE_SIGNATURE,
        preamble_sig_blob_len,
        data_size,
    );
    put_u64(&mut buf, 40, kernel_version);
    put_u64(&mut buf, 48, body_load_address);
    put_u64(&mut buf, 56, body_signature.data_size);
    put_signature_view(
        &mut buf,
        KERNEL_OFF_BODY_SIGNATURE as usize,
        body_sig_blob_offset - KERNEL_OFF_BODY_SIGNATURE,
        body_sig_blob_len,
        body_signature.data_size,
    );
    buf[body_sig_blob_offset as usize..(body_sig_blob_offset + body_sig_blob_len) as usize]
        .copy_from_slice(&body_signature.sig_bytes);

    let prefix = buf[0..data_size as usize].to_vec();
    let signature = sign(data_key_spec.digest, &data_key.private, &prefix);
    buf[preamble_sig_blob_offset as usize..(preamble_sig_blob_offset + preamble_sig_blob_len) as usize]
        .copy_from_slice(&signature);

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_deterministic() {
        let a = TestKey::generate(1, 0);
        let b = TestKey::generate(1, 0);
        assert_eq!(a.modulus_bytes(), b.modulus_bytes());
    }

    #[test]
    fn modulus_bytes_match_canonical_key_size() {
        let key = TestKey::generate(7, 0);
        assert_eq!(key.modulus_bytes().len() as u64, ALGORITHMS[0].key_size());
    }

    #[test]
    fn build_key_block_produces_a_well_formed_buffer() {
        let root = TestKey::generate(1, 0);
        let data_key = TestKey::generate(2, 0);
        let buf = build_key_block(&data_key, &root, 1, 0);
        assert_eq!(&buf[0..8], &KEY_BLOCK_MAGIC);
        assert!(buf.len() as u64 >= KEY_BLOCK_HEADER_LEN);
    }
}
