// hps_led_patterns.rs
//
// Reads the hps_led_patterns registers, writes a set of setup values, and
// reads them back, both as raw words and as attribute text.
//
// Pass the component's physical base address (e.g. 0xff200000) to map the
// registers through /dev/mem. Without an address, an in-memory register bank
// is used instead.

use std::env;
use std::error::Error;
use std::io::{Read, Seek, SeekFrom, Write};
use std::process::exit;

use fixedreg::device::{Device, DeviceFile};
use fixedreg::hps_led_patterns::{self, BASE_PERIOD, HPS_LED_CONTROL, LED_REG, SPAN, SYS_CLKS_SEC};
use fixedreg::registers::{Mmio, RegisterBank, Registers};

const REGISTERS: [(&str, usize); 4] = [
    ("HPS_LED_control", HPS_LED_CONTROL),
    ("SYS_CLKs_sec", SYS_CLKS_SEC),
    ("LED_reg", LED_REG),
    ("Base_period", BASE_PERIOD),
];

fn parse_address(arg: &str) -> Option<u64> {
    match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => arg.parse().ok(),
    }
}

fn read_word(file: &mut DeviceFile) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    file.read_exact(&mut buf)?;

    Ok(u32::from_ne_bytes(buf))
}

fn print_registers(device: &Device) -> Result<(), Box<dyn Error>> {
    let mut file = device.open();
    for (name, _) in REGISTERS.iter() {
        println!("{:<16} = {:#x}", name, read_word(&mut file)?);
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let registers: Box<dyn Registers> = match env::args().nth(1) {
        Some(arg) => match parse_address(&arg) {
            Some(base) => Box::new(Mmio::open("/dev/mem", base, SPAN)?),
            None => {
                eprintln!("Invalid base address: {}", arg);
                exit(1);
            }
        },
        None => Box::new(RegisterBank::new(SPAN)?),
    };

    let device = hps_led_patterns::device(registers);

    println!("\n* read initial register values\n");
    print_registers(&device)?;

    println!("\n* write all registers with desired setup values\n");
    let mut file = device.open();
    let setup: [(usize, u32); 4] = [
        (LED_REG, 0x55),
        (SYS_CLKS_SEC, 50_000_000),
        (BASE_PERIOD, 0x18),
        (HPS_LED_CONTROL, 1),
    ];
    for &(offset, value) in setup.iter() {
        file.seek(SeekFrom::Start(offset as u64))?;
        file.write_all(&value.to_ne_bytes())?;

        let name = REGISTERS
            .iter()
            .find(|(_, o)| *o == offset)
            .map_or("?", |(n, _)| *n);
        println!("wrote {:#x} to {}", value, name);
    }

    println!("\n* register values after writing\n");
    print_registers(&device)?;

    println!("\n* attributes\n");
    for attr in device.attributes() {
        print!("{:<16} = {}", attr.name(), device.show(attr.name())?);
    }

    device.store("base_period", "0.25\n")?;
    print!("{:<16} = {}", "base_period", device.show("base_period")?);

    Ok(())
}
