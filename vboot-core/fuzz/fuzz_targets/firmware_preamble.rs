// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vboot_core::preamble::verify_firmware_preamble;
use vboot_core::PublicKeyHandle;

#[derive(Debug, Arbitrary)]
pub struct Data<'a> {
    pub algorithm: u64,
    pub modulus: &'a [u8],
    pub preamble: &'a [u8],
}

fuzz_target!(|data: Data| {
    if let Ok(key) = PublicKeyHandle::from_modulus(data.algorithm, data.modulus) {
        verify_firmware_preamble(data.preamble, &key).ok();
    }
});
