// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{command, value_parser, Arg, ArgAction};
use vboot_core::{keyblock, preamble, PublicKeyHandle};

fn main() -> Result<()> {
    env_logger::init();

    let matches = command!()
        .arg(
            Arg::new("key-block")
                .long("key-block")
                .value_name("file")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Key block container"),
        )
        .arg(
            Arg::new("preamble")
                .long("preamble")
                .value_name("file")
                .value_parser(value_parser!(PathBuf))
                .help("Firmware preamble container, verified against the key block's data key"),
        )
        .arg(
            Arg::new("root-key")
                .long("root-key")
                .value_name("file")
                .value_parser(value_parser!(PathBuf))
                .help("Raw RSA modulus for the root key; omit for hash-only inspection mode"),
        )
        .arg(
            Arg::new("algorithm")
                .long("algorithm")
                .value_name("id")
                .value_parser(value_parser!(u64))
                .default_value("1")
                .help("Algorithm table index the root key modulus was generated under"),
        )
        .arg(
            Arg::new("inspect")
                .long("inspect")
                .action(ArgAction::SetTrue)
                .help("Force hash-only inspection mode even if --root-key is given"),
        )
        .get_matches();

    let key_block_path = matches.get_one::<PathBuf>("key-block").unwrap();
    let key_block_buf = fs::read(key_block_path).context("failed to read key block")?;

    let root_key = if matches.get_flag("inspect") {
        None
    } else {
        matches
            .get_one::<PathBuf>("root-key")
            .map(|path| load_root_key(path, *matches.get_one::<u64>("algorithm").unwrap()))
            .transpose()?
    };

    let key_block = keyblock::verify_keyblock(&key_block_buf, root_key.as_ref())
        .map_err(|e| anyhow::anyhow!("key block verification failed: {e}"))?;

    println!("Key block:");
    println!("{:>17}: {} bytes", "Size", key_block.key_block_size);
    println!("{:>17}: {}", "Data key algorithm", key_block.data_key.algorithm());
    println!("{:>17}: {}", "Data key version", key_block.data_key_version);
    if root_key.is_none() {
        println!("(hash-only inspection mode: this is NOT a trust decision)");
    }

    if let Some(preamble_path) = matches.get_one::<PathBuf>("preamble") {
        if root_key.is_none() {
            bail!("preamble verification requires a root key (--root-key), not --inspect");
        }

        let preamble_buf = fs::read(preamble_path).context("failed to read preamble")?;
        let preamble = preamble::verify_firmware_preamble(&preamble_buf, &key_block.data_key)
            .map_err(|e| anyhow::anyhow!("preamble verification failed: {e}"))?;

        println!("Firmware preamble:");
        println!("{:>17}: {} bytes", "Size", preamble.preamble_size);
        println!("{:>17}: {}", "Firmware version", preamble.firmware_version);
        println!(
            "{:>17}: offset {}, size {} (verify the body separately)",
            "Body signature", preamble.body_signature.sig_offset, preamble.body_signature.sig_size
        );
    }

    println!("Verification succeeded.");

    Ok(())
}

fn load_root_key(path: &PathBuf, algorithm: u64) -> Result<PublicKeyHandle> {
    let modulus = fs::read(path).context("failed to read root key")?;
    PublicKeyHandle::from_modulus(algorithm, &modulus)
        .map_err(|e| anyhow::anyhow!("invalid root key: {e}"))
}
