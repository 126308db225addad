//! Logical pixel types and their physical storage primitives.

use std::fmt::Debug;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::bytecast::*;
use crate::error::{KeaError, KeaResult};

/// The pixel type of a band, as recorded in its `DATATYPE` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
#[non_exhaustive]
pub enum DataType {
    /// No type; never valid for pixel transfer.
    Undefined = 0,
    /// Signed 8-bit integer.
    Int8 = 1,
    /// Signed 16-bit integer.
    Int16 = 2,
    /// Signed 32-bit integer.
    Int32 = 3,
    /// Signed 64-bit integer.
    Int64 = 4,
    /// Unsigned 8-bit integer.
    UInt8 = 5,
    /// Unsigned 16-bit integer.
    UInt16 = 6,
    /// Unsigned 32-bit integer.
    UInt32 = 7,
    /// Unsigned 64-bit integer.
    UInt64 = 8,
    /// 32-bit IEEE float.
    Float32 = 9,
    /// 64-bit IEEE float.
    Float64 = 10,
}

impl DataType {
    /// Parse a stored `DATATYPE` tag.
    pub fn from_tag(tag: u16) -> KeaResult<Self> {
        DataType::try_from(tag).map_err(|_| KeaError::UnsupportedType(tag))
    }

    /// The tag stored on disk for this type.
    pub fn tag(self) -> u16 {
        self.into()
    }

    /// Size of one element in bytes.
    pub fn size(self) -> KeaResult<usize> {
        Ok(to_physical_native(self)?.size())
    }

    /// Human readable name, as used in band descriptions and logs.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Undefined => "Undefined",
            DataType::Int8 => "8 Bit Integer",
            DataType::Int16 => "16 Bit Integer",
            DataType::Int32 => "32 Bit Integer",
            DataType::Int64 => "64 Bit Integer",
            DataType::UInt8 => "8 Bit Unsigned Integer",
            DataType::UInt16 => "16 Bit Unsigned Integer",
            DataType::UInt32 => "32 Bit Unsigned Integer",
            DataType::UInt64 => "64 Bit Unsigned Integer",
            DataType::Float32 => "32 Bit Float",
            DataType::Float64 => "64 Bit Float",
        }
    }
}

/// Classification of a band's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum LayerType {
    /// Measurements on a continuous scale.
    #[default]
    Continuous = 0,
    /// Class labels, usually paired with an attribute table.
    Thematic = 1,
}

/// Endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Little Endian
    LittleEndian,
    /// Big Endian
    BigEndian,
}

impl Endianness {
    /// Byte order of the host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endianness = Endianness::LittleEndian;
    /// Byte order of the host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endianness = Endianness::BigEndian;
}

/// Number representation without byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Primitive {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl Primitive {
    /// Size in bytes.
    pub fn size(self) -> usize {
        match self {
            Primitive::I8 | Primitive::U8 => 1,
            Primitive::I16 | Primitive::U16 => 2,
            Primitive::I32 | Primitive::U32 | Primitive::F32 => 4,
            Primitive::I64 | Primitive::U64 | Primitive::F64 => 8,
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Primitive::I8 => 1,
            Primitive::I16 => 2,
            Primitive::I32 => 3,
            Primitive::I64 => 4,
            Primitive::U8 => 5,
            Primitive::U16 => 6,
            Primitive::U32 => 7,
            Primitive::U64 => 8,
            Primitive::F32 => 9,
            Primitive::F64 => 10,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Primitive::I8,
            2 => Primitive::I16,
            3 => Primitive::I32,
            4 => Primitive::I64,
            5 => Primitive::U8,
            6 => Primitive::U16,
            7 => Primitive::U32,
            8 => Primitive::U64,
            9 => Primitive::F32,
            10 => Primitive::F64,
            _ => return None,
        })
    }
}

/// A concrete storage primitive: number representation plus byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalType {
    /// Number representation.
    pub primitive: Primitive,
    /// Byte order of stored or transferred values.
    pub endianness: Endianness,
}

impl PhysicalType {
    /// Standard little-endian on-disk form of `primitive`.
    pub const fn fixed(primitive: Primitive) -> Self {
        Self {
            primitive,
            endianness: Endianness::LittleEndian,
        }
    }

    /// Host-endian in-memory form of `primitive`.
    pub const fn native(primitive: Primitive) -> Self {
        Self {
            primitive,
            endianness: Endianness::NATIVE,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.primitive.size()
    }
}

fn to_primitive(data_type: DataType) -> KeaResult<Primitive> {
    match data_type {
        DataType::Int8 => Ok(Primitive::I8),
        DataType::Int16 => Ok(Primitive::I16),
        DataType::Int32 => Ok(Primitive::I32),
        DataType::Int64 => Ok(Primitive::I64),
        DataType::UInt8 => Ok(Primitive::U8),
        DataType::UInt16 => Ok(Primitive::U16),
        DataType::UInt32 => Ok(Primitive::U32),
        DataType::UInt64 => Ok(Primitive::U64),
        DataType::Float32 => Ok(Primitive::F32),
        DataType::Float64 => Ok(Primitive::F64),
        DataType::Undefined => Err(KeaError::UnsupportedType(data_type.tag())),
    }
}

/// The little-endian primitive used to store `data_type` in a container.
pub fn to_physical_fixed(data_type: DataType) -> KeaResult<PhysicalType> {
    Ok(PhysicalType::fixed(to_primitive(data_type)?))
}

/// The host-endian primitive used for in-memory buffers of `data_type`.
pub fn to_physical_native(data_type: DataType) -> KeaResult<PhysicalType> {
    Ok(PhysicalType::native(to_primitive(data_type)?))
}

/// Rust types that can be transferred as pixels.
pub trait Pixel: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    /// Logical type matching this Rust type.
    const DATA_TYPE: DataType;

    /// Storage primitive matching this Rust type.
    const PRIMITIVE: Primitive;

    /// Host-endian physical type of in-memory values.
    fn native_type() -> PhysicalType {
        PhysicalType::native(Self::PRIMITIVE)
    }

    /// View a slice of values as native-endian bytes.
    fn as_ne_bytes(values: &[Self]) -> &[u8];

    /// View a mutable slice of values as native-endian bytes.
    fn as_ne_mut_bytes(values: &mut [Self]) -> &mut [u8];
}

macro_rules! impl_pixel {
    ($ty:ty, $data_type:expr, $primitive:expr, $bytes:expr, $mut_bytes:expr) => {
        impl Pixel for $ty {
            const DATA_TYPE: DataType = $data_type;
            const PRIMITIVE: Primitive = $primitive;

            fn as_ne_bytes(values: &[Self]) -> &[u8] {
                $bytes(values)
            }

            fn as_ne_mut_bytes(values: &mut [Self]) -> &mut [u8] {
                $mut_bytes(values)
            }
        }
    };
}

impl_pixel!(u8, DataType::UInt8, Primitive::U8, u8_as_ne_bytes, u8_as_ne_mut_bytes);
impl_pixel!(i8, DataType::Int8, Primitive::I8, i8_as_ne_bytes, i8_as_ne_mut_bytes);
impl_pixel!(u16, DataType::UInt16, Primitive::U16, u16_as_ne_bytes, u16_as_ne_mut_bytes);
impl_pixel!(i16, DataType::Int16, Primitive::I16, i16_as_ne_bytes, i16_as_ne_mut_bytes);
impl_pixel!(u32, DataType::UInt32, Primitive::U32, u32_as_ne_bytes, u32_as_ne_mut_bytes);
impl_pixel!(i32, DataType::Int32, Primitive::I32, i32_as_ne_bytes, i32_as_ne_mut_bytes);
impl_pixel!(u64, DataType::UInt64, Primitive::U64, u64_as_ne_bytes, u64_as_ne_mut_bytes);
impl_pixel!(i64, DataType::Int64, Primitive::I64, i64_as_ne_bytes, i64_as_ne_mut_bytes);
impl_pixel!(f32, DataType::Float32, Primitive::F32, f32_as_ne_bytes, f32_as_ne_mut_bytes);
impl_pixel!(f64, DataType::Float64, Primitive::F64, f64_as_ne_bytes, f64_as_ne_mut_bytes);
