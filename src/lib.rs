//! # bmp085-rs
//!
//! This crate provides you a way to access the BMP085 barometric pressure
//! sensor via Linux I2C interface.
//!
//! Readings are cached: the accessors only touch the bus once the configured
//! sampling interval has passed, and every pressure read brings the
//! temperature compensation term up to date first.
//!
//! # Examples
//! ```no_run
//! extern crate bmp085_rs;
//! extern crate i2cdev;
//!
//! use bmp085_rs::{BMP085, Config, SystemClock};
//! use i2cdev::linux::LinuxI2CDevice;
//!
//! fn main() {
//!     let dev = LinuxI2CDevice::new("/dev/i2c-1", 0x77).unwrap();
//!     let mut bmp085 = BMP085::new(dev, SystemClock::new(), Config::default()).unwrap();
//!     println!("{:.1}", bmp085.temperature().unwrap());
//!     println!("{}", bmp085.pressure().unwrap());
//!     println!("{:.2}", bmp085.altitude());
//! }
//! ```

extern crate i2cdev;

mod bmp085;
mod clock;
mod utils;

pub use bmp085::*;
pub use clock::*;
