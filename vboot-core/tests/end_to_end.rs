// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Black-box chain tests: build containers with `vboot-test-vectors`,
//! verify them with the public `vboot-core` API only.

use vboot_core::{keyblock, preamble, verify_data, verify_digest, Error, PublicKeyHandle};
use vboot_test_vectors::signer::{self, TestKey};

const SHA256_2048: u64 = 1;

fn root_key() -> TestKey {
    TestKey::generate(0x5eed_0001, SHA256_2048)
}

fn data_key() -> TestKey {
    TestKey::generate(0x5eed_0002, SHA256_2048)
}

fn kernel_subkey() -> TestKey {
    TestKey::generate(0x5eed_0003, SHA256_2048)
}

fn handle_of(key: &TestKey) -> PublicKeyHandle {
    PublicKeyHandle::from_modulus(key.algorithm, &key.modulus_bytes()).unwrap()
}

#[test]
fn key_block_verifies_against_its_root_key_and_yields_the_data_key() {
    let root = root_key();
    let data_key = data_key();
    let buf = signer::build_key_block(&data_key, &root, 42, 0);

    let root_handle = handle_of(&root);
    let verified = keyblock::verify_keyblock(&buf, Some(&root_handle)).unwrap();

    assert_eq!(verified.data_key_version, 42);
    assert_eq!(verified.data_key.algorithm(), data_key.algorithm);
    assert_eq!(verified.key_block_size, buf.len() as u64);
}

#[test]
fn key_block_hash_only_inspection_does_not_require_a_root_key() {
    let root = root_key();
    let data_key = data_key();
    let buf = signer::build_key_block(&data_key, &root, 42, 0);

    // Same buffer as the signature-path test: the checksum is always
    // present, so inspection mode succeeds without ever touching the
    // root key. This is explicitly not a trust decision.
    keyblock::verify_keyblock(&buf, None).unwrap();
}

#[test]
fn key_block_rejects_a_corrupted_magic() {
    let root = root_key();
    let data_key = data_key();
    let mut buf = signer::build_key_block(&data_key, &root, 1, 0);
    buf[0] &= 0x12;

    let err = keyblock::verify_keyblock(&buf, None).unwrap_err();
    assert_eq!(err, Error::KeyBlockInvalid);
}

#[test]
fn key_block_major_version_mismatch_is_rejected_independent_of_minor() {
    let root = root_key();
    let data_key = data_key();

    // Minor alone can vary freely: the header's major-version byte is
    // bumped without touching the signed prefix, so a mismatched major
    // is caught before any cryptographic check runs.
    let buf_minor_bumped = signer::build_key_block(&data_key, &root, 1, 9);
    let root_handle = handle_of(&root);
    keyblock::verify_keyblock(&buf_minor_bumped, Some(&root_handle)).unwrap();

    let mut buf_major_bumped = signer::build_key_block(&data_key, &root, 1, 0);
    buf_major_bumped[8] += 1;
    let err = keyblock::verify_keyblock(&buf_major_bumped, Some(&root_handle)).unwrap_err();
    assert_eq!(err, Error::KeyBlockInvalid);
}

#[test]
fn key_block_rejects_signature_offset_pushed_out_of_bounds() {
    let root = root_key();
    let data_key = data_key();
    let mut buf = signer::build_key_block(&data_key, &root, 1, 0);

    // sig_offset at offset 24 inside the header; push it out so
    // sig_offset + sig_size overruns key_block_size.
    let key_block_size = buf.len() as u64;
    buf[24..32].copy_from_slice(&key_block_size.to_le_bytes());

    let root_handle = handle_of(&root);
    let err = keyblock::verify_keyblock(&buf, Some(&root_handle)).unwrap_err();
    assert_eq!(err, Error::KeyBlockInvalid);
}

#[test]
fn key_block_rejects_checksum_data_size_below_header_len() {
    use sha2::{Digest, Sha512};

    let root = root_key();
    let data_key = data_key();
    let buf = signer::build_key_block(&data_key, &root, 1, 0);

    // Shrink the checksum's signed-prefix coverage to below the header
    // length, then recompute the checksum itself over that shrunk
    // prefix so the hash-only path gets past the digest compare and
    // hits the insufficient-coverage check instead.
    let mut corrupted = buf.clone();
    let new_data_size = 4u64;
    corrupted[64..72].copy_from_slice(&new_data_size.to_le_bytes());

    let checksum_sig_offset = u64::from_le_bytes(buf[48..56].try_into().unwrap());
    let checksum_abs_offset = (48 + checksum_sig_offset) as usize;
    let recomputed = Sha512::digest(&corrupted[..new_data_size as usize]);
    corrupted[checksum_abs_offset..checksum_abs_offset + 64].copy_from_slice(&recomputed);

    let err = keyblock::verify_keyblock(&corrupted, None).unwrap_err();
    assert_eq!(err, Error::KeyBlockInvalid);
}

#[test]
fn key_block_rejects_root_signature_mismatch() {
    let root = root_key();
    let other_root = TestKey::generate(0x5eed_00ff, SHA256_2048);
    let data_key = data_key();
    let buf = signer::build_key_block(&data_key, &root, 1, 0);

    let wrong_handle = handle_of(&other_root);
    let err = keyblock::verify_keyblock(&buf, Some(&wrong_handle)).unwrap_err();
    assert_eq!(err, Error::KeyBlockSignatureFailed);
}

#[test]
fn key_block_rejects_a_bit_flip_in_the_signed_prefix() {
    let root = root_key();
    let data_key = data_key();
    let mut buf = signer::build_key_block(&data_key, &root, 1, 0);

    // Flip a byte inside the handed-off data key's modulus, which lies
    // within the signed prefix but after the fixed header.
    let flip_at = signer::KEY_BLOCK_HEADER_LEN as usize + 4;
    buf[flip_at] ^= 0xff;

    let root_handle = handle_of(&root);
    let err = keyblock::verify_keyblock(&buf, Some(&root_handle)).unwrap_err();
    assert_eq!(err, Error::KeyBlockSignatureFailed);

    let err = keyblock::verify_keyblock(&buf, None).unwrap_err();
    assert_eq!(err, Error::KeyBlockHashFailed);
}

#[test]
fn key_block_tolerates_trailing_slack_but_rejects_truncation() {
    let root = root_key();
    let data_key = data_key();
    let buf = signer::build_key_block(&data_key, &root, 1, 0);

    let mut padded = buf.clone();
    padded.push(0xaa);
    keyblock::verify_keyblock(&padded, None).unwrap();

    let truncated = &buf[..buf.len() - 1];
    let err = keyblock::verify_keyblock(truncated, None).unwrap_err();
    assert_eq!(err, Error::KeyBlockInvalid);
}

/// Full chain: key block hands off a data key, a firmware preamble
/// (authenticated by that data key) hands off a kernel subkey, and a
/// kernel preamble is authenticated by that subkey in turn.
#[test]
fn full_chain_key_block_to_firmware_to_kernel_preamble() {
    let root = root_key();
    let data_key = data_key();
    let kernel_subkey = kernel_subkey();

    let key_block_buf = signer::build_key_block(&data_key, &root, 1, 0);
    let root_handle = handle_of(&root);
    let verified_key_block = keyblock::verify_keyblock(&key_block_buf, Some(&root_handle)).unwrap();

    let body = b"pretend this is a firmware body, hashed and verified by the caller";
    let body_sig = signer::sign_body(&data_key, body);
    let firmware_buf = signer::build_firmware_preamble(&data_key, &kernel_subkey, 7, 0, &body_sig);

    let verified_firmware =
        preamble::verify_firmware_preamble(&firmware_buf, &verified_key_block.data_key).unwrap();
    assert_eq!(verified_firmware.firmware_version, 7);

    verify_data(body, &verified_firmware.body_signature, &body_sig.sig_bytes, &verified_key_block.data_key).unwrap();

    let kernel_body = b"pretend this is a kernel body";
    let kernel_body_sig = signer::sign_body(&kernel_subkey, kernel_body);
    let kernel_buf = signer::build_kernel_preamble(&kernel_subkey, 3, 0x1000_0000, 0, &kernel_body_sig);

    let verified_kernel =
        preamble::verify_kernel_preamble(&kernel_buf, &verified_firmware.kernel_subkey).unwrap();
    assert_eq!(verified_kernel.kernel_version, 3);
    assert_eq!(verified_kernel.body_load_address, 0x1000_0000);

    verify_data(
        kernel_body,
        &verified_kernel.body_signature,
        &kernel_body_sig.sig_bytes,
        &verified_firmware.kernel_subkey,
    )
    .unwrap();
}

#[test]
fn firmware_preamble_rejects_kernel_subkey_tampered_after_signing() {
    let data_key = data_key();
    let kernel_subkey = kernel_subkey();
    let body_sig = signer::sign_body(&data_key, b"body");
    let mut buf = signer::build_firmware_preamble(&data_key, &kernel_subkey, 1, 0, &body_sig);

    let flip_at = signer::FIRMWARE_HEADER_LEN as usize + 1;
    buf[flip_at] ^= 0xff;

    let data_key_handle = handle_of(&data_key);
    let err = preamble::verify_firmware_preamble(&buf, &data_key_handle).unwrap_err();
    assert_eq!(err, Error::PreambleSignatureFailed);
}

#[test]
fn firmware_preamble_tolerates_trailing_slack_but_rejects_truncation() {
    let data_key = data_key();
    let kernel_subkey = kernel_subkey();
    let body_sig = signer::sign_body(&data_key, b"body");
    let buf = signer::build_firmware_preamble(&data_key, &kernel_subkey, 1, 0, &body_sig);
    let data_key_handle = handle_of(&data_key);

    let mut padded = buf.clone();
    padded.push(0x00);
    preamble::verify_firmware_preamble(&padded, &data_key_handle).unwrap();

    let truncated = &buf[..buf.len() - 1];
    let err = preamble::verify_firmware_preamble(truncated, &data_key_handle).unwrap_err();
    assert_eq!(err, Error::PreambleInvalid);
}

#[test]
fn verify_digest_matches_verify_data_for_the_same_payload() {
    use sha2::{Digest, Sha256};

    let key = data_key();
    let body = b"a body verified on the hot path from a precomputed digest";
    let body_sig = signer::sign_body(&key, body);
    let key_handle = handle_of(&key);

    let sig_view = vboot_core::SignatureView { sig_offset: 0, sig_size: body_sig.sig_bytes.len() as u64, data_size: body.len() as u64 };
    verify_data(body, &sig_view, &body_sig.sig_bytes, &key_handle).unwrap();

    let digest = Sha256::digest(body);
    verify_digest(&digest, &sig_view, &body_sig.sig_bytes, &key_handle).unwrap();
}

/// P4/P5 across a small matrix of algorithm ids and payload lengths:
/// every combination round-trips, and a single-byte flip inside the
/// signed prefix is always caught.
#[test]
fn key_block_round_trips_and_rejects_bit_flips_across_the_algorithm_matrix() {
    const ALGORITHMS: &[u64] = &[0, 1, 2, 3];
    const PAYLOAD_LENS: &[usize] = &[0, 1, 64];

    for &algorithm in ALGORITHMS {
        let root = TestKey::generate(0x5eed_1000 + algorithm, algorithm);
        let data_key = TestKey::generate(0x5eed_2000 + algorithm, algorithm);
        let root_handle = handle_of(&root);

        for &version in &[0u64, 1, u64::MAX] {
            let buf = signer::build_key_block(&data_key, &root, version, 0);
            let verified = keyblock::verify_keyblock(&buf, Some(&root_handle)).unwrap();
            assert_eq!(verified.data_key_version, version);
            assert_eq!(verified.data_key.algorithm(), algorithm);

            let mut flipped = buf.clone();
            flipped[signer::KEY_BLOCK_HEADER_LEN as usize] ^= 0xff;
            let err = keyblock::verify_keyblock(&flipped, Some(&root_handle)).unwrap_err();
            assert_eq!(err, Error::KeyBlockSignatureFailed);
        }

        for &len in PAYLOAD_LENS {
            let body = vec![0x5au8; len];
            let sig = signer::sign_body(&data_key, &body);
            let sig_view = vboot_core::SignatureView { sig_offset: 0, sig_size: sig.sig_bytes.len() as u64, data_size: sig.data_size };
            let data_key_handle = handle_of(&data_key);
            verify_data(&body, &sig_view, &sig.sig_bytes, &data_key_handle).unwrap();
        }
    }
}
