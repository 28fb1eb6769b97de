//! Initialization of the Audio Mini board's codec and headphone amplifier.
//!
//! The Audio Mini pairs an AD1939 audio codec, configured over SPI, with a
//! TPA6130A2 headphone amplifier, configured over I2C. Both only need a fixed
//! sequence of register writes at startup to pass audio through.
//!
//! The drivers are generic over the `embedded-hal` v1.0 bus traits, so any
//! implementation can be used, including `rppal`'s [`Spi`] and [`I2c`] or
//! `linux-embedded-hal`.
//!
//! [`Spi`]: https://docs.rs/rppal/latest/rppal/spi/struct.Spi.html
//! [`I2c`]: https://docs.rs/rppal/latest/rppal/i2c/struct.I2c.html

use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;
use tracing::{info, warn};

/// AD1939 chip address byte for a register write (global address 0x04, R/W low).
pub const AD1939_WRITE: u8 = 0x08;

/// AD1939 registers touched during initialization.
pub mod ad1939_reg {
    pub const PLL_CLOCK_CONTROL_0: u8 = 0x00;
    pub const PLL_CLOCK_CONTROL_1: u8 = 0x01;
    pub const DAC_CONTROL_0: u8 = 0x02;
    pub const ADC_CONTROL_0: u8 = 0x0e;
    pub const ADC_CONTROL_2: u8 = 0x10;
}

// Step description, register, value
const AD1939_INIT: [(&str, u8, u8); 5] = [
    ("Unmuting the channels", ad1939_reg::PLL_CLOCK_CONTROL_0, 0x80),
    ("Setting PLL mode", ad1939_reg::PLL_CLOCK_CONTROL_1, 0x00),
    ("Setting PLL mode", ad1939_reg::ADC_CONTROL_2, 0xc8),
    ("Setting sampling frequency to 48 kHz", ad1939_reg::DAC_CONTROL_0, 0x00),
    ("Setting sampling frequency to 48 kHz", ad1939_reg::ADC_CONTROL_0, 0x00),
];

/// AD1939 audio codec on an SPI bus.
#[derive(Debug)]
pub struct Ad1939<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Ad1939<SPI> {
    /// Constructs a new `Ad1939`.
    pub fn new(spi: SPI) -> Ad1939<SPI> {
        Ad1939 { spi }
    }

    /// Writes a single register.
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), SPI::Error> {
        self.spi.write(&[AD1939_WRITE, register, value])
    }

    /// Configures the codec for 48 kHz pass-through.
    ///
    /// Stops at the first failed write.
    pub fn init(&mut self) -> Result<(), SPI::Error> {
        info!("Initializing AD1939 codec");

        for &(step, register, value) in AD1939_INIT.iter() {
            info!(register, value, "{}", step);
            self.write_register(register, value)?;
        }

        Ok(())
    }

    /// Returns the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

/// Default I2C address of the TPA6130A2.
pub const TPA6130A2_ADDRESS: u8 = 0x60;

/// TPA6130A2 registers touched during initialization.
pub mod tpa6130a2_reg {
    pub const CONTROL: u8 = 0x01;
    pub const VOLUME: u8 = 0x02;
}

/// Both channels enabled.
const TPA6130A2_CHANNELS_ON: u8 = 0xc0;
/// -0.3 dB, the closest setting to unity gain.
const TPA6130A2_UNITY_GAIN: u8 = 0x34;

/// TPA6130A2 headphone amplifier on an I2C bus.
#[derive(Debug)]
pub struct Tpa6130a2<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Tpa6130a2<I2C> {
    /// Constructs a new `Tpa6130a2` at the default address.
    pub fn new(i2c: I2C) -> Tpa6130a2<I2C> {
        Tpa6130a2::with_address(i2c, TPA6130A2_ADDRESS)
    }

    /// Constructs a new `Tpa6130a2` at the specified 7-bit address.
    pub fn with_address(i2c: I2C, address: u8) -> Tpa6130a2<I2C> {
        Tpa6130a2 { i2c, address }
    }

    /// Returns the I2C address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Writes a single register.
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    /// Unmutes both channels, and sets the gain close to unity.
    ///
    /// A failed write is logged and doesn't stop the sequence. Returns the
    /// number of writes that failed.
    pub fn init(&mut self) -> usize {
        info!(address = self.address, "Initializing TPA6130A2 amplifier");

        let steps = [
            ("Unmuting amplifier channels", tpa6130a2_reg::CONTROL, TPA6130A2_CHANNELS_ON),
            ("Setting unity gain", tpa6130a2_reg::VOLUME, TPA6130A2_UNITY_GAIN),
        ];

        let mut failed = 0;
        for (step, register, value) in steps {
            info!("{}", step);
            if let Err(e) = self.write_register(register, value) {
                warn!(error = ?e, "{} failed", step);
                failed += 1;
            }
        }

        failed
    }

    /// Returns the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource};
    use embedded_hal::spi;

    use super::*;

    // Records every SPI write
    #[derive(Debug, Default)]
    struct SpiRecorder {
        writes: Vec<Vec<u8>>,
    }

    impl spi::ErrorType for SpiRecorder {
        type Error = Infallible;
    }

    impl SpiDevice for SpiRecorder {
        fn transaction(
            &mut self,
            operations: &mut [spi::Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            for op in operations.iter() {
                if let spi::Operation::Write(bytes) = op {
                    self.writes.push(bytes.to_vec());
                }
            }
            Ok(())
        }
    }

    #[derive(Debug, PartialEq)]
    struct Nack;

    impl i2c::Error for Nack {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        }
    }

    // Records every I2C write, and fails the writes listed in `fail`
    #[derive(Debug, Default)]
    struct I2cRecorder {
        writes: Vec<(u8, Vec<u8>)>,
        fail: Vec<usize>,
    }

    impl i2c::ErrorType for I2cRecorder {
        type Error = Nack;
    }

    impl I2c for I2cRecorder {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [i2c::Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations.iter() {
                if let i2c::Operation::Write(bytes) = op {
                    let index = self.writes.len();
                    self.writes.push((address, bytes.to_vec()));
                    if self.fail.contains(&index) {
                        return Err(Nack);
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn ad1939_init_sequence() {
        let mut codec = Ad1939::new(SpiRecorder::default());
        codec.init().unwrap();

        assert_eq!(
            codec.release().writes,
            vec![
                vec![0x08, 0x00, 0x80],
                vec![0x08, 0x01, 0x00],
                vec![0x08, 0x10, 0xc8],
                vec![0x08, 0x02, 0x00],
                vec![0x08, 0x0e, 0x00],
            ]
        );
    }

    #[test]
    fn tpa6130a2_init_sequence() {
        let mut amp = Tpa6130a2::new(I2cRecorder::default());

        assert_eq!(amp.init(), 0);
        assert_eq!(
            amp.release().writes,
            vec![(0x60, vec![0x01, 0xc0]), (0x60, vec![0x02, 0x34])]
        );
    }

    #[test]
    fn tpa6130a2_continues_after_failure() {
        let bus = I2cRecorder {
            fail: vec![0],
            ..Default::default()
        };
        let mut amp = Tpa6130a2::with_address(bus, 0x61);

        assert_eq!(amp.address(), 0x61);
        assert_eq!(amp.init(), 1);
        assert_eq!(amp.release().writes.len(), 2);
    }

    #[test]
    fn tpa6130a2_single_register() {
        let mut amp = Tpa6130a2::new(I2cRecorder {
            fail: vec![0],
            ..Default::default()
        });

        assert_eq!(amp.write_register(tpa6130a2_reg::VOLUME, 0x00), Err(Nack));
    }
}
