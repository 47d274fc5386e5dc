//! Hardware-agnostic core logic for the fascia bench tool
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - uPD16432B display controller emulation (RAM areas, dirty tracking)
//! - Radio display-text decoding into structured state
//!
//! Everything here is driven by plain byte slices, so the same code runs
//! under the firmware and in host-side tests.

#![no_std]
#![deny(unsafe_code)]

pub mod radio;
pub mod upd;
