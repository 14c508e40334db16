//! Byte order handling for well-known binary
//!
//! This module implements the Strategy pattern for handling the two byte
//! orders (XDR big-endian, NDR little-endian) a WKB geometry may use.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result, Write};

use crate::errors::{GeoError, GeoResult};

/// Represents the byte order of a WKB geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (NDR, flag 1)
    LittleEndian,
    /// Big-endian byte order (XDR, flag 0)
    BigEndian,
}

impl ByteOrder {
    /// Reads the leading byte-order flag of a WKB geometry
    pub fn detect(reader: &mut dyn Read) -> GeoResult<Self> {
        let flag = reader.read_u8()
            .map_err(|_| GeoError::MalformedGeometry("missing byte order flag".to_string()))?;
        Self::from_flag(flag)
    }

    /// Maps a WKB byte-order flag to a byte order
    pub fn from_flag(flag: u8) -> GeoResult<Self> {
        match flag {
            0 => Ok(ByteOrder::BigEndian),
            1 => Ok(ByteOrder::LittleEndian),
            _ => Err(GeoError::MalformedGeometry(format!("invalid byte order flag: {}", flag))),
        }
    }

    /// The WKB flag byte for this byte order
    pub fn flag(&self) -> u8 {
        match self {
            ByteOrder::BigEndian => 0,
            ByteOrder::LittleEndian => 1,
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (NDR)",
            ByteOrder::BigEndian => "Big Endian (XDR)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn Read) -> Result<u32>;

    /// Read an f64 value
    fn read_f64(&self, reader: &mut dyn Read) -> Result<f64>;

    /// Write a u32 value
    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()>;

    /// Write an f64 value
    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<()>;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_u32(&self, reader: &mut dyn Read) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_f64(&self, reader: &mut dyn Read) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }

    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()> {
        writer.write_u32::<LittleEndian>(value)
    }

    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<()> {
        writer.write_f64::<LittleEndian>(value)
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_u32(&self, reader: &mut dyn Read) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_f64(&self, reader: &mut dyn Read) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }

    fn write_u32(&self, writer: &mut dyn Write, value: u32) -> Result<()> {
        writer.write_u32::<BigEndian>(value)
    }

    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<()> {
        writer.write_f64::<BigEndian>(value)
    }
}
