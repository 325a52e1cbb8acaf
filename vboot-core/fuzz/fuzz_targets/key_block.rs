// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_main]

use libfuzzer_sys::fuzz_target;
use vboot_core::keyblock::verify_keyblock;

fuzz_target!(|data: &[u8]| {
    verify_keyblock(data, None).ok();
});
