extern crate i2cdev;

use std::cmp;

use i2cdev::core::I2CDevice;

use clock::Clock;
use utils::*;

/// Driver failure modes. Bus faults pass through untyped; timeout and fault
/// policy belong to the transport.
#[derive(Debug)]
pub enum Error<E> {
    /// Underlying bus transaction failed.
    Bus(E),
    /// A calibration coefficient made a compensation divisor zero.
    InvalidCalibration,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Error<E> {
        Error::Bus(err)
    }
}

/// Factory calibration coefficients from the BMP085 EEPROM. Each device is
/// calibrated individually during production; the compensation formulas are
/// meaningless without them.
pub struct CalibrationParams {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl CalibrationParams {
    pub fn new() -> CalibrationParams {
        CalibrationParams {
            ac1: 0,
            ac2: 0,
            ac3: 0,
            ac4: 0,
            ac5: 0,
            ac6: 0,
            b1: 0,
            b2: 0,
            mb: 0,
            mc: 0,
            md: 0,
        }
    }

    /// Reads the eleven coefficients at 0xAA..0xBE, in address order.
    pub fn load<D: I2CDevice>(&mut self, dev: &mut D) -> Result<(), D::Error> {
        self.ac1 = read_signed_short(dev, 0xAA)?;
        self.ac2 = read_signed_short(dev, 0xAC)?;
        self.ac3 = read_signed_short(dev, 0xAE)?;
        self.ac4 = read_unsigned_short(dev, 0xB0)?;
        self.ac5 = read_unsigned_short(dev, 0xB2)?;
        self.ac6 = read_unsigned_short(dev, 0xB4)?;
        self.b1 = read_signed_short(dev, 0xB6)?;
        self.b2 = read_signed_short(dev, 0xB8)?;
        self.mb = read_signed_short(dev, 0xBA)?;
        self.mc = read_signed_short(dev, 0xBC)?;
        self.md = read_signed_short(dev, 0xBE)?;
        Ok(())
    }

    /// B5 term of the temperature compensation. Pressure compensation
    /// consumes it, so a pressure value is only valid against the B5 of the
    /// most recent temperature update. `None` when `X1 + MD` is zero.
    pub fn temperature_b5(&self, ut: i32) -> Option<i32> {
        let x1 = ((ut - self.ac6 as i32) * self.ac5 as i32) >> 15;
        let divisor = x1 + self.md as i32;
        if divisor == 0 {
            return None;
        }
        let x2 = ((self.mc as i32) << 11) / divisor;
        Some(x1 + x2)
    }

    /// True temperature in 0.1 degC steps.
    pub fn true_temperature(&self, b5: i32) -> i32 {
        (b5 + 8) >> 4
    }

    /// True pressure in Pa from the uncompensated reading, the B5 term and
    /// the oversampling setting. The B4/B7 steps run in unsigned 32 bit
    /// with wraparound, which the datasheet sequence relies on. `None` when
    /// B4 is zero.
    pub fn true_pressure(&self, up: i32, b5: i32, oss: u8) -> Option<i32> {
        let b6 = b5 - 4000;
        let x1 = ((self.b2 as i32) * ((b6 * b6) >> 12)) >> 11;
        let x2 = ((self.ac2 as i32) * b6) >> 11;
        let x3 = x1 + x2;
        let b3 = ((((self.ac1 as i32) * 4 + x3) << oss) + 2) >> 2;
        let x1 = ((self.ac3 as i32) * b6) >> 13;
        let x2 = ((self.b1 as i32) * ((b6 * b6) >> 12)) >> 16;
        let x3 = ((x1 + x2) + 2) >> 2;
        let b4 = ((self.ac4 as u32) * ((x3 + 32768) as u32)) >> 15;
        if b4 == 0 {
            return None;
        }
        let b7 = (up as u32).wrapping_sub(b3 as u32).wrapping_mul(50000 >> oss);
        let p = if b7 < 0x8000_0000 {
            ((b7 << 1) / b4) as i32
        } else {
            ((b7 / b4) << 2) as i32
        };
        let x1 = (p >> 8) * (p >> 8);
        let x1 = (x1 * 3038) >> 16;
        let x2 = (-7357 * p) >> 16;
        Some(p + ((x1 + x2 + 3791) >> 4))
    }
}

/// Driver configuration, applied at construction. Values go through the
/// same clamping as the runtime setters.
pub struct Config {
    /// Oversampling setting, 0 to 3.
    pub oversampling: i32,
    /// Minimum sampling interval in ms.
    pub sampling_time: u32,
    /// Reference pressure at sea level in Pa.
    pub sea_level_pressure: i32,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            oversampling: 3,
            sampling_time: 1000,
            sea_level_pressure: 101325,
        }
    }
}

/// BMP085 driver. Owns the bus device and the clock, caches the last
/// compensated readings and re-samples the sensor only once they go stale.
pub struct BMP085<D: I2CDevice + Sized, C: Clock> {
    pub device: D,
    clock: C,
    pub params: CalibrationParams,
    oss: u8,
    sampling_time: u32,
    ut: i32,
    up: i32,
    b5: i32,
    temp: i32,
    pres: i32,
    alt: f32,
    pres0: f32,
    temp_time: u32,
    pres_time: u32,
}

impl<D, C> BMP085<D, C>
where
    D: I2CDevice + Sized,
    C: Clock,
{
    /// Creates a driver: reads the calibration EEPROM, then runs the first
    /// temperature and pressure conversion so every accessor starts from a
    /// populated cache.
    pub fn new(device: D, clock: C, config: Config) -> Result<BMP085<D, C>, Error<D::Error>> {
        let mut bmp085 = BMP085 {
            device: device,
            clock: clock,
            params: CalibrationParams::new(),
            oss: 0,
            sampling_time: 0,
            ut: 0,
            up: 0,
            b5: 0,
            temp: 0,
            pres: 0,
            alt: 0.0,
            pres0: config.sea_level_pressure as f32,
            temp_time: 0,
            pres_time: 0,
        };
        bmp085.set_oversampling(config.oversampling);
        bmp085.set_sampling_time(config.sampling_time);
        bmp085.params.load(&mut bmp085.device)?;
        bmp085.update_temperature()?;
        bmp085.update_pressure()?;
        Ok(bmp085)
    }

    pub fn oversampling(&self) -> u8 {
        self.oss
    }

    /// Sets the oversampling setting, clamped to 0..3. Cached readings stay
    /// valid; the new setting applies from the next refresh.
    pub fn set_oversampling(&mut self, value: i32) {
        self.oss = cmp::min(cmp::max(value, 0), 3) as u8;
    }

    pub fn sampling_time(&self) -> u32 {
        self.sampling_time
    }

    /// Sets the minimum sampling interval in ms. Requests faster than the
    /// conversion latency of the current oversampling setting are raised to
    /// that latency (5/8/14/26 ms for OSS 0..3).
    pub fn set_sampling_time(&mut self, value: u32) {
        self.sampling_time = match self.oss {
            0 => cmp::max(value, 5),
            1 => cmp::max(value, 8),
            2 => cmp::max(value, 14),
            _ => cmp::max(value, 26),
        };
    }

    /// Current temperature in degC, 0.1 degC resolution. Re-samples once
    /// the cached value is older than max(sampling time, 1000) ms; the
    /// device cannot usefully sample temperature above ~1 Hz.
    pub fn temperature(&mut self) -> Result<f32, Error<D::Error>> {
        if self.temperature_stale() {
            self.update_temperature()?;
        }
        Ok(self.temp as f32 / 10.0)
    }

    /// Current pressure in Pa. Checks the temperature track first so the
    /// compensation below always uses the B5 term of the latest temperature
    /// update.
    pub fn pressure(&mut self) -> Result<i32, Error<D::Error>> {
        if self.temperature_stale() {
            self.update_temperature()?;
        }
        if self.stale(self.pres_time, self.sampling_time) {
            self.update_pressure()?;
        }
        Ok(self.pres)
    }

    /// Altitude in m over the sea-level reference, derived from the last
    /// cached pressure. Never triggers a bus transaction.
    pub fn altitude(&self) -> f32 {
        self.alt
    }

    /// Sets the sea-level reference pressure (Pa), then refreshes
    /// temperature and pressure so the cached altitude tracks the new
    /// reference.
    pub fn calibrate_with_pressure(&mut self, pres0: i32) -> Result<(), Error<D::Error>> {
        self.pres0 = pres0 as f32;
        self.update_temperature()?;
        self.update_pressure()?;
        Ok(())
    }

    /// Back-solves the sea-level reference from a known altitude (m): takes
    /// a fresh measurement, inverts the altitude formula against it, then
    /// refreshes pressure once more so the cached altitude reflects the new
    /// reference.
    pub fn calibrate_with_altitude(&mut self, alt0: f32) -> Result<(), Error<D::Error>> {
        self.update_temperature()?;
        self.update_pressure()?;
        self.clock.delay_millis(30);
        self.pres0 = self.pres as f32 / (1.0 - alt0 / 44330.0).powf(5.25588);
        self.update_pressure()?;
        Ok(())
    }

    fn temperature_stale(&self) -> bool {
        self.stale(self.temp_time, cmp::max(self.sampling_time, 1000))
    }

    // A negative elapsed time means the ms counter wrapped; refresh instead
    // of serving a cache entry of unknown age.
    fn stale(&self, last_update: u32, interval: u32) -> bool {
        let elapsed = self.clock.now_millis().wrapping_sub(last_update) as i32;
        elapsed < 0 || elapsed as u32 >= interval
    }

    fn update_temperature(&mut self) -> Result<(), Error<D::Error>> {
        self.device.smbus_write_byte_data(0xF4, 0x2E)?;
        self.clock.delay_millis(5);
        self.ut = read_unsigned_short(&mut self.device, 0xF6)? as i32;

        let b5 = match self.params.temperature_b5(self.ut) {
            Some(b5) => b5,
            None => return Err(Error::InvalidCalibration),
        };
        self.b5 = b5;
        self.temp = self.params.true_temperature(b5);
        self.temp_time = self.clock.now_millis();
        Ok(())
    }

    fn update_pressure(&mut self) -> Result<(), Error<D::Error>> {
        // Conversion time grows with the oversampling setting.
        self.device.smbus_write_byte_data(0xF4, 0x34 + (self.oss << 6))?;
        self.clock.delay_millis(2 + (3 << self.oss));
        let values = self.device.smbus_read_i2c_block_data(0xF6, 3)?;
        let msb = values[0] as i32;
        let lsb = values[1] as i32;
        let xlsb = values[2] as i32;
        self.up = ((msb << 16) | (lsb << 8) | xlsb) >> (8 - self.oss);

        let pres = match self.params.true_pressure(self.up, self.b5, self.oss) {
            Some(pres) => pres,
            None => return Err(Error::InvalidCalibration),
        };
        self.pres = pres;
        self.calc_altitude();
        self.pres_time = self.clock.now_millis();
        Ok(())
    }

    fn calc_altitude(&mut self) {
        self.alt = 44330.0 * (1.0 - (self.pres as f32 / self.pres0).powf(1.0 / 5.25588));
    }
}
