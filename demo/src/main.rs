mod config;

use crate::config::Config;
use dotenv::dotenv;
use lcm1602_lcd::lcd::hd44780::driver::{HD44780Driver, I2cHD44780Driver};
use lcm1602_lcd::transport::hal::HalTransport;
use log::{debug, info};
use std::env::var;
use std::thread::sleep;
use std::time::Duration;
use sysinfo::System;
use time::OffsetDateTime;

const DEFAULT_BUS: u8 = 1;
// Most PCF8574T backpacks; PCF8574AT ones sit at 0x3F.
const DEFAULT_ADDRESS: u8 = 0x27;

fn parse_address(address_str: &str) -> eyre::Result<u8> {
    let address_str = address_str.trim();
    let address = match address_str.strip_prefix("0x").or_else(|| address_str.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => address_str.parse()?,
    };
    if address > 0x7F {
        return Err(eyre::eyre!("I2C address {:#x} is not a 7-bit address", address));
    }
    Ok(address)
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!(
        "Hello, {}!",
        System::name().as_deref().unwrap_or(UNKNOWN_STR)
    );
    info!(
        "Hostname {}",
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR)
    );

    let bus: u8 = match var("LCM1602_I2C_BUS") {
        Ok(bus_str) => bus_str.trim().parse()?,
        Err(_) => DEFAULT_BUS,
    };
    let address = match var("LCM1602_I2C_ADDRESS") {
        Ok(address_str) => parse_address(&address_str)?,
        Err(_) => DEFAULT_ADDRESS,
    };

    info!("LCD @ /dev/i2c-{}, address {:#04x}", bus, address);

    debug!("Opening I2C bus...");
    let transport = HalTransport::open_i2cdev(bus, address)?;
    debug!("{:?} opened.", transport);

    debug!("Initializing LCD driver...");
    let mut lcd = I2cHD44780Driver::open(transport)?;
    debug!("{:?} initialized.", lcd);

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };

    lcd.clear()?;
    for line in &config.lines {
        debug!("Writing {:?} at row {}, column {}", line.text, line.row, line.column);
        lcd.write_string(&line.text, line.row, line.column)?;
    }

    let Some(clock_row) = config.clock_row else {
        info!("Done.");
        return Ok(());
    };

    info!("Showing local time on row {}...", clock_row);
    loop {
        let now = OffsetDateTime::now_local()?;
        let time_str = format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second());
        lcd.write_string(&time_str, clock_row, 0)?;

        sleep(Duration::from_secs(1));
    }
}
