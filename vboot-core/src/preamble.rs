// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Preamble verifier (C6): using the data key handed off by
//! [`crate::keyblock::verify_keyblock`], validate a firmware or kernel
//! preamble container.
//!
//! Both variants follow the same shape:
//!
//! 1. Check major-version match; ignore minor.
//! 2. Check `buffer_size >= preamble_size`.
//! 3. Bounds-validate `preamble_signature`'s signature blob inside `preamble_size`.
//! 4. Check `preamble_size >= preamble_signature.data_size`.
//! 5. Run the data verifier using the data key.
//! 6. Check `preamble_signature.data_size >= sizeof(header)`.
//! 7. Bounds-validate `body_signature` inside `preamble_size` *and*
//!    inside `preamble_signature.data_size`, the same two-envelope
//!    discipline used for the key block's data key: an attacker could
//!    otherwise place an unsigned descriptor past the signed prefix
//!    but still inside the container.
//! 8. Firmware only: the same two-envelope check for `kernel_subkey`.

use nom::number::complete::{le_u32, le_u64};
use nom::IResult;

use crate::error::Error;
use crate::key::{PublicKeyHandle, PublicKeyView};
use crate::signature::SignatureView;
use crate::verify::{self, DataVerifyError};

const OFF_PREAMBLE_SIGNATURE: u64 = 16;

/// Outcome of the shared steps common to both preamble variants:
/// header checked, authenticated, and the header's own signed-prefix
/// coverage confirmed.
struct Authenticated {
    preamble_size: u64,
    minor: u32,
    signed_size: u64,
}

fn authenticate(
    buf: &[u8],
    data_key: &PublicKeyHandle,
    major: u32,
    minor: u32,
    preamble_size: u64,
    preamble_signature: &SignatureView,
    header_len: u64,
    invalid: Error,
    signature_failed: Error,
    expected_major: u32,
) -> Result<Authenticated, Error> {
    if major != expected_major {
        log::debug!("preamble major version mismatch: got {major}, want {expected_major}");
        return Err(invalid);
    }

    if (buf.len() as u64) < preamble_size {
        log::debug!("buffer ({} bytes) shorter than declared preamble_size ({preamble_size})", buf.len());
        return Err(invalid);
    }

    let sig_bytes = preamble_signature
        .sig_bytes(buf, preamble_size, OFF_PREAMBLE_SIGNATURE)
        .map_err(|_| invalid)?;

    if preamble_size < preamble_signature.data_size {
        log::debug!("signed prefix ({}) extends past preamble_size ({preamble_size})", preamble_signature.data_size);
        return Err(invalid);
    }

    verify::verify_data(buf, preamble_signature, sig_bytes, data_key).map_err(|e| match e {
        DataVerifyError::SizeMismatch => invalid,
        DataVerifyError::Rejected => signature_failed,
    })?;

    if preamble_signature.data_size < header_len {
        log::debug!(
            "signed prefix ({}) does not cover the preamble header ({header_len})",
            preamble_signature.data_size
        );
        return Err(invalid);
    }

    Ok(Authenticated {
        preamble_size,
        minor,
        signed_size: preamble_signature.data_size,
    })
}

/// Bounds-validate an embedded object inside both the container and
/// the signed prefix.
fn validate_two_envelopes(
    preamble_size: u64,
    signed_size: u64,
    hdr_off: u64,
    member_size: u64,
    data_offset: u64,
    data_size: u64,
    invalid: Error,
) -> Result<(), Error> {
    crate::bounds::validate(preamble_size, hdr_off, member_size, data_offset, data_size)
        .map_err(|_| invalid)?;
    crate::bounds::validate(signed_size, hdr_off, member_size, data_offset, data_size)
        .map_err(|_| invalid)?;
    Ok(())
}

/// Supported `header_version_major` for firmware preambles.
pub const FIRMWARE_MAJOR: u32 = 2;

const FW_OFF_KERNEL_SUBKEY: u64 = 48;
const FW_OFF_BODY_SIGNATURE: u64 = 80;

/// `sizeof` the fixed-layout firmware preamble header, in bytes.
pub const FIRMWARE_HEADER_LEN: u64 = 104;

#[derive(Debug, Clone, Copy)]
struct FirmwarePreambleHeader {
    major: u32,
    minor: u32,
    preamble_size: u64,
    preamble_signature: SignatureView,
    firmware_version: u64,
    kernel_subkey: PublicKeyView,
    body_signature: SignatureView,
}

fn firmware_preamble_header(i: &[u8]) -> IResult<&[u8], FirmwarePreambleHeader> {
    let (i, major) = le_u32(i)?;
    let (i, minor) = le_u32(i)?;
    let (i, preamble_size) = le_u64(i)?;
    let (i, preamble_signature) = SignatureView::parse(i)?;
    let (i, firmware_version) = le_u64(i)?;
    let (i, kernel_subkey) = PublicKeyView::parse(i)?;
    let (i, body_signature) = SignatureView::parse(i)?;

    Ok((
        i,
        FirmwarePreambleHeader {
            major,
            minor,
            preamble_size,
            preamble_signature,
            firmware_version,
            kernel_subkey,
            body_signature,
        },
    ))
}

/// Result of a successfully validated firmware preamble.
pub struct VerifiedFirmwarePreamble {
    /// The kernel subkey, handed off for kernel-preamble validation.
    pub kernel_subkey: PublicKeyHandle,
    /// Descriptor authenticating the separately-stored firmware body;
    /// verified later by the caller, not by this engine.
    pub body_signature: SignatureView,
    /// Opaque firmware version tag, forwarded unexamined.
    pub firmware_version: u64,
    /// `preamble_size` declared by the container.
    pub preamble_size: u64,
    /// `header_version_minor` declared by the container, forwarded
    /// unexamined.
    pub header_version_minor: u32,
}

/// Validate a firmware preamble using the data key handed off by the
/// key block.
pub fn verify_firmware_preamble(
    buf: &[u8],
    data_key: &PublicKeyHandle,
) -> Result<VerifiedFirmwarePreamble, Error> {
    log::debug!("verifying firmware preamble ({} bytes supplied)", buf.len());

    let (_, header) = firmware_preamble_header(buf).map_err(|_| Error::PreambleInvalid)?;

    let authenticated = authenticate(
        buf,
        data_key,
        header.major,
        header.minor,
        header.preamble_size,
        &header.preamble_signature,
        FIRMWARE_HEADER_LEN,
        Error::PreambleInvalid,
        Error::PreambleSignatureFailed,
        FIRMWARE_MAJOR,
    )?;

    validate_two_envelopes(
        authenticated.preamble_size,
        authenticated.signed_size,
        FW_OFF_KERNEL_SUBKEY,
        PublicKeyView::LEN,
        header.kernel_subkey.key_offset,
        header.kernel_subkey.key_size,
        Error::PreambleInvalid,
    )?;

    validate_two_envelopes(
        authenticated.preamble_size,
        authenticated.signed_size,
        FW_OFF_BODY_SIGNATURE,
        SignatureView::LEN,
        header.body_signature.sig_offset,
        header.body_signature.sig_size,
        Error::PreambleInvalid,
    )?;

    let kernel_subkey = header
        .kernel_subkey
        .resolve(buf, authenticated.preamble_size, authenticated.signed_size, FW_OFF_KERNEL_SUBKEY)?;

    log::debug!("firmware preamble accepted");

    Ok(VerifiedFirmwarePreamble {
        kernel_subkey,
        body_signature: header.body_signature,
        firmware_version: header.firmware_version,
        preamble_size: authenticated.preamble_size,
        header_version_minor: authenticated.minor,
    })
}

/// Supported `header_version_major` for kernel preambles.
pub const KERNEL_MAJOR: u32 = 1;

const KERNEL_OFF_BODY_SIGNATURE: u64 = 64;

/// `sizeof` the fixed-layout kernel preamble header, in bytes.
pub const KERNEL_HEADER_LEN: u64 = 88;

#[derive(Debug, Clone, Copy)]
struct KernelPreambleHeader {
    major: u32,
    minor: u32,
    preamble_size: u64,
    preamble_signature: SignatureView,
    kernel_version: u64,
    body_load_address: u64,
    body_size: u64,
    body_signature: SignatureView,
}

fn kernel_preamble_header(i: &[u8]) -> IResult<&[u8], KernelPreambleHeader> {
    let (i, major) = le_u32(i)?;
    let (i, minor) = le_u32(i)?;
    let (i, preamble_size) = le_u64(i)?;
    let (i, preamble_signature) = SignatureView::parse(i)?;
    let (i, kernel_version) = le_u64(i)?;
    let (i, body_load_address) = le_u64(i)?;
    let (i, body_size) = le_u64(i)?;
    let (i, body_signature) = SignatureView::parse(i)?;

    Ok((
        i,
        KernelPreambleHeader {
            major,
            minor,
            preamble_size,
            preamble_signature,
            kernel_version,
            body_load_address,
            body_size,
            body_signature,
        },
    ))
}

/// Result of a successfully validated kernel preamble.
pub struct VerifiedKernelPreamble {
    /// Descriptor authenticating the separately-stored kernel body;
    /// verified later by the caller, not by this engine.
    pub body_signature: SignatureView,
    /// Load address of the kernel body, forwarded unexamined.
    pub body_load_address: u64,
    /// Declared size of the kernel body, forwarded unexamined.
    pub body_size: u64,
    /// Opaque kernel version tag, forwarded unexamined.
    pub kernel_version: u64,
    /// `preamble_size` declared by the container.
    pub preamble_size: u64,
    /// `header_version_minor` declared by the container, forwarded
    /// unexamined.
    pub header_version_minor: u32,
}

/// Validate a kernel preamble using the data key handed off by the key
/// block, or the kernel subkey handed off by a firmware preamble.
pub fn verify_kernel_preamble(
    buf: &[u8],
    data_key: &PublicKeyHandle,
) -> Result<VerifiedKernelPreamble, Error> {
    log::debug!("verifying kernel preamble ({} bytes supplied)", buf.len());

    let (_, header) = kernel_preamble_header(buf).map_err(|_| Error::PreambleInvalid)?;

    let authenticated = authenticate(
        buf,
        data_key,
        header.major,
        header.minor,
        header.preamble_size,
        &header.preamble_signature,
        KERNEL_HEADER_LEN,
        Error::PreambleInvalid,
        Error::PreambleSignatureFailed,
        KERNEL_MAJOR,
    )?;

    validate_two_envelopes(
        authenticated.preamble_size,
        authenticated.signed_size,
        KERNEL_OFF_BODY_SIGNATURE,
        SignatureView::LEN,
        header.body_signature.sig_offset,
        header.body_signature.sig_size,
        Error::PreambleInvalid,
    )?;

    log::debug!("kernel preamble accepted");

    Ok(VerifiedKernelPreamble {
        body_signature: header.body_signature,
        body_load_address: header.body_load_address,
        body_size: header.body_size,
        kernel_version: header.kernel_version,
        preamble_size: authenticated.preamble_size,
        header_version_minor: authenticated.minor,
    })
}
