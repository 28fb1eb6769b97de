//! Register map for the `hps_led_patterns` FPGA component.
//!
//! The component drives the board's LEDs either from the HPS (through
//! `led_reg`) or from its own pattern generator, which steps at a rate set
//! by `base_period` (in seconds, as an unsigned fixed-point number with four
//! fractional bits) and `sys_clks_sec` (the fabric clock frequency).
//!
//! | Offset | Attribute         | Type     |
//! |--------|-------------------|----------|
//! | `0x0`  | `hps_led_control` | bool     |
//! | `0x4`  | `sys_clks_sec`    | u32      |
//! | `0x8`  | `led_reg`         | u8       |
//! | `0xc`  | `base_period`     | `UQ28.4` |
//!
//! ## Examples
//!
//! ```
//! use fixedreg::hps_led_patterns::{self, SPAN};
//! use fixedreg::registers::RegisterBank;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let device = hps_led_patterns::device(Box::new(RegisterBank::new(SPAN)?));
//!
//! device.store("base_period", "0.125")?;
//! assert_eq!(device.show("base_period")?, "0.125000000\n");
//! # Ok(())
//! # }
//! ```

use crate::device::{Attribute, Device, Kind};
use crate::fixed::Format;
use crate::registers::Registers;

/// Name of the misc device, which appears as `/dev/hps_led_patterns`.
pub const DEVICE_NAME: &str = "hps_led_patterns";
/// Device tree compatible string.
pub const COMPATIBLE: &str = "adsd,hps_led_patterns";

/// Selects HPS control of the LEDs (1) or the pattern generator (0).
pub const HPS_LED_CONTROL: usize = 0x0;
/// Number of fabric clock cycles per second.
pub const SYS_CLKS_SEC: usize = 0x4;
/// LED state when under HPS control.
pub const LED_REG: usize = 0x8;
/// Pattern generator base period.
pub const BASE_PERIOD: usize = 0xc;
/// Memory span of all registers, used or not.
pub const SPAN: usize = 0x10;

/// Format of `base_period`.
pub const BASE_PERIOD_FORMAT: Format = Format::new_unchecked(4, false);

/// Returns the component's attributes.
pub fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::new("hps_led_control", HPS_LED_CONTROL, Kind::Bool),
        Attribute::new("sys_clks_sec", SYS_CLKS_SEC, Kind::U32),
        Attribute::new("led_reg", LED_REG, Kind::U8),
        Attribute::new("base_period", BASE_PERIOD, Kind::Fixed(BASE_PERIOD_FORMAT)),
    ]
}

/// Constructs a [`Device`] for the component's register window.
///
/// # Panics
///
/// Panics if `registers` spans less than [`SPAN`] bytes.
pub fn device(registers: Box<dyn Registers>) -> Device {
    Device::new(DEVICE_NAME, registers, attributes())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Seek, SeekFrom, Write};

    use super::*;
    use crate::registers::RegisterBank;

    fn open() -> Device {
        device(Box::new(RegisterBank::new(SPAN).unwrap()))
    }

    #[test]
    fn attribute_offsets() {
        let device = open();
        let names: Vec<_> = device.attributes().iter().map(|a| a.name()).collect();

        assert_eq!(
            names,
            ["hps_led_control", "sys_clks_sec", "led_reg", "base_period"]
        );
        assert_eq!(device.attribute("led_reg").unwrap().offset(), LED_REG);
        assert_eq!(device.name(), DEVICE_NAME);
    }

    #[test]
    fn setup_through_attributes() {
        let device = open();

        device.store("hps_led_control", "1").unwrap();
        device.store("sys_clks_sec", "50000000").unwrap();
        device.store("led_reg", "0x55").unwrap();
        device.store("base_period", "1.5").unwrap();

        let mut file = device.open();
        let mut words = [0u32; 4];
        for word in words.iter_mut() {
            let mut buf = [0u8; 4];
            file.read_exact(&mut buf).unwrap();
            *word = u32::from_ne_bytes(buf);
        }

        assert_eq!(words, [1, 50_000_000, 0x55, 0x18]);
    }

    #[test]
    fn base_period_written_through_file() {
        let device = open();
        let mut file = device.open();

        file.seek(SeekFrom::Start(BASE_PERIOD as u64)).unwrap();
        file.write_all(&0x3u32.to_ne_bytes()).unwrap();

        // 0.1875 loses its lowest bit on the way out
        assert_eq!(device.show("base_period").unwrap(), "0.125000000\n");
    }

    #[test]
    fn base_period_uses_the_whole_word() {
        let device = open();

        assert_eq!(BASE_PERIOD_FORMAT.to_string(), "UQ28.4");

        device.store("base_period", "268435455.5").unwrap();
        assert_eq!(device.show("base_period").unwrap(), "268435455.500000000\n");
        assert!(matches!(
            device.store("base_period", "268435456"),
            Err(crate::device::Error::Fixed(crate::fixed::Error::Overflow { .. }))
        ));
    }

    #[test]
    #[should_panic]
    fn window_too_small() {
        device(Box::new(RegisterBank::new(0x8).unwrap()));
    }
}
