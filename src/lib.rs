//! Fixedreg converts 32-bit fixed-point register words to and from decimal
//! text, and provides the register-backed control surfaces that sit around
//! that conversion on embedded Linux FPGA systems.
//!
//! The [`fixed`] module is the heart of the crate. It reproduces the
//! digit-by-digit conversion used by the reference platform drivers,
//! including its intentional precision loss, while rejecting inputs those
//! drivers accepted silently.
//!
//! Register access is provided through memory-mapped windows ([`registers`]),
//! a user-space rendition of a misc character device with sysfs-style text
//! attributes ([`device`]), a client for attributes exported by a kernel
//! driver ([`sysfs`]), and the init sequences for the Audio Mini board's
//! SPI and I2C peripherals ([`audio`]).

// Used by rustdoc to link other crates to fixedreg's docs
#![doc(html_root_url = "https://docs.rs/fixedreg/0.1.0")]

#[macro_use]
mod macros;

pub mod audio;
pub mod device;
pub mod fixed;
pub mod hps_led_patterns;
pub mod registers;
pub mod sysfs;
