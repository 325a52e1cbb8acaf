// SPDX-FileCopyrightText: © 2026 VBoot Project Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deterministic key-block/preamble signer used to build test vectors
//! for `vboot-core`.
//!
//! This crate is a host-side signing collaborator, never linked into
//! the verification engine itself. Every container it builds is
//! generated from a seeded RNG rather than checked in as a binary
//! fixture, so the test vectors stay reproducible without the crate
//! shipping any real key material.
//!
//! The wire layout built here must match `vboot_core`'s parsers field
//! for field; this crate intentionally does not depend on `vboot-core`
//! (that dependency runs the other way, as a dev-dependency, to avoid
//! a cycle), so the fixed-layout offsets below are kept in sync by
//! hand with `vboot-core/src/{keyblock,preamble}.rs`.

pub mod signer;
