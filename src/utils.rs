extern crate i2cdev;

use i2cdev::core::I2CDevice;

// BMP085 registers are MSB first.

pub fn read_unsigned_short<D: I2CDevice>(dev: &mut D, address: u8) -> Result<u16, D::Error> {
    let values = dev.smbus_read_i2c_block_data(address, 2)?;
    let msb = values[0] as u16;
    let lsb = values[1] as u16;
    Ok((msb << 8) | lsb)
}

pub fn read_signed_short<D: I2CDevice>(dev: &mut D, address: u8) -> Result<i16, D::Error> {
    Ok(read_unsigned_short(dev, address)? as i16)
}
