//! Hardware driver implementations for the fascia tool
//!
//! Drivers are generic over `embedded-hal` traits so the transmission path
//! can be exercised on the host with mock buses.

#![no_std]
#![deny(unsafe_code)]

pub mod faceplate;

pub use faceplate::{AreaSet, Faceplate, FaceplateError};
