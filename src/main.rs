extern crate docopt;
extern crate i2cdev;
#[macro_use]
extern crate serde_derive;

use docopt::Docopt;

#[cfg(target_os = "linux")]
use i2cdev::linux::*;

mod clock;
mod utils;

mod bmp085;
use bmp085::*;
use clock::*;

const USAGE: &'static str = "
Reading BMP085 sensor value

Usage:
  bmp085 <device> [--address <addr>] [--oss <oss>] [--sampling-time <ms>] [--sea-level <pa>] [--temperature] [--pressure] [--altitude]
  bmp085 (-h | --help)
  bmp085 (-v | --version)

Options:
  -h --help    Show this help text.
  --address <addr>    I2C device address [default: 119] (=0x77)
  --oss <oss>    Oversampling setting, 0 to 3 [default: 3]
  --sampling-time <ms>    Minimum sampling interval in ms [default: 1000]
  --sea-level <pa>    Sea level reference pressure in Pa [default: 101325]
  --temperature    Show temperature.
  --pressure    Show pressure.
  --altitude    Show altitude.
  -v --version    Show version.
";

const BMP085_DEFAULT_ADDRESS: u16 = 0x77;

#[derive(Debug, Deserialize)]
struct Args {
    arg_device: String,
    flag_address: Option<u16>,
    flag_oss: Option<i32>,
    flag_sampling_time: Option<u32>,
    flag_sea_level: Option<i32>,
    flag_version: bool,
    flag_temperature: bool,
    flag_pressure: bool,
    flag_altitude: bool,
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This program can run only on Linux")
}

#[cfg(target_os = "linux")]
fn main() {
    let args: Args = Docopt::new(USAGE).and_then(|d| d.deserialize()).unwrap_or_else(|e| e.exit());

    if args.flag_version {
        println!("bmp085 {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let address = args.flag_address.unwrap_or(BMP085_DEFAULT_ADDRESS);
    let config: Config = Config {
        oversampling: args.flag_oss.unwrap_or(3),
        sampling_time: args.flag_sampling_time.unwrap_or(1000),
        sea_level_pressure: args.flag_sea_level.unwrap_or(101325),
    };

    let dev = LinuxI2CDevice::new(args.arg_device, address).unwrap();
    let mut bmp085 = BMP085::new(dev, SystemClock::new(), config).unwrap();

    if args.flag_temperature {
        println!("{:.1}", bmp085.temperature().unwrap());
    }
    if args.flag_pressure {
        println!("{}", bmp085.pressure().unwrap());
    }
    if args.flag_altitude {
        println!("{:.2}", bmp085.altitude());
    }
}
