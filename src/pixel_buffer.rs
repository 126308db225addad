use crate::bytecast::*;
use crate::data_type::DataType;
use crate::error::{KeaError, KeaResult};

/// Pixels of a band read in the band's own data type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PixelBuffer {
    /// A vector of unsigned bytes
    U8(Vec<u8>),
    /// A vector of unsigned words
    U16(Vec<u16>),
    /// A vector of 32 bit unsigned ints
    U32(Vec<u32>),
    /// A vector of 64 bit unsigned ints
    U64(Vec<u64>),
    /// A vector of 32 bit IEEE floats
    F32(Vec<f32>),
    /// A vector of 64 bit IEEE floats
    F64(Vec<f64>),
    /// A vector of 8 bit signed ints
    I8(Vec<i8>),
    /// A vector of 16 bit signed ints
    I16(Vec<i16>),
    /// A vector of 32 bit signed ints
    I32(Vec<i32>),
    /// A vector of 64 bit signed ints
    I64(Vec<i64>),
}

impl PixelBuffer {
    /// A zeroed buffer of `len` elements of `data_type`.
    pub fn new(data_type: DataType, len: usize) -> KeaResult<Self> {
        Ok(match data_type {
            DataType::UInt8 => PixelBuffer::U8(vec![0; len]),
            DataType::UInt16 => PixelBuffer::U16(vec![0; len]),
            DataType::UInt32 => PixelBuffer::U32(vec![0; len]),
            DataType::UInt64 => PixelBuffer::U64(vec![0; len]),
            DataType::Int8 => PixelBuffer::I8(vec![0; len]),
            DataType::Int16 => PixelBuffer::I16(vec![0; len]),
            DataType::Int32 => PixelBuffer::I32(vec![0; len]),
            DataType::Int64 => PixelBuffer::I64(vec![0; len]),
            DataType::Float32 => PixelBuffer::F32(vec![0.0; len]),
            DataType::Float64 => PixelBuffer::F64(vec![0.0; len]),
            DataType::Undefined => return Err(KeaError::UnsupportedType(data_type.tag())),
        })
    }

    /// Logical type of the elements.
    pub fn data_type(&self) -> DataType {
        match self {
            PixelBuffer::U8(_) => DataType::UInt8,
            PixelBuffer::U16(_) => DataType::UInt16,
            PixelBuffer::U32(_) => DataType::UInt32,
            PixelBuffer::U64(_) => DataType::UInt64,
            PixelBuffer::I8(_) => DataType::Int8,
            PixelBuffer::I16(_) => DataType::Int16,
            PixelBuffer::I32(_) => DataType::Int32,
            PixelBuffer::I64(_) => DataType::Int64,
            PixelBuffer::F32(_) => DataType::Float32,
            PixelBuffer::F64(_) => DataType::Float64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::U8(v) => v.len(),
            PixelBuffer::U16(v) => v.len(),
            PixelBuffer::U32(v) => v.len(),
            PixelBuffer::U64(v) => v.len(),
            PixelBuffer::I8(v) => v.len(),
            PixelBuffer::I16(v) => v.len(),
            PixelBuffer::I32(v) => v.len(),
            PixelBuffer::I64(v) => v.len(),
            PixelBuffer::F32(v) => v.len(),
            PixelBuffer::F64(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// use this buffer as a `&mut[u8]` buffer
    pub fn as_mut_u8_buf(&mut self) -> &mut [u8] {
        match self {
            PixelBuffer::U8(v) => v,
            PixelBuffer::U16(v) => u16_as_ne_mut_bytes(v),
            PixelBuffer::U32(v) => u32_as_ne_mut_bytes(v),
            PixelBuffer::U64(v) => u64_as_ne_mut_bytes(v),
            PixelBuffer::I8(v) => i8_as_ne_mut_bytes(v),
            PixelBuffer::I16(v) => i16_as_ne_mut_bytes(v),
            PixelBuffer::I32(v) => i32_as_ne_mut_bytes(v),
            PixelBuffer::I64(v) => i64_as_ne_mut_bytes(v),
            PixelBuffer::F32(v) => f32_as_ne_mut_bytes(v),
            PixelBuffer::F64(v) => f64_as_ne_mut_bytes(v),
        }
    }

    /// use this buffer as a `&[u8]` buffer
    pub fn as_u8_buf(&self) -> &[u8] {
        match self {
            PixelBuffer::U8(v) => v,
            PixelBuffer::U16(v) => u16_as_ne_bytes(v),
            PixelBuffer::U32(v) => u32_as_ne_bytes(v),
            PixelBuffer::U64(v) => u64_as_ne_bytes(v),
            PixelBuffer::I8(v) => i8_as_ne_bytes(v),
            PixelBuffer::I16(v) => i16_as_ne_bytes(v),
            PixelBuffer::I32(v) => i32_as_ne_bytes(v),
            PixelBuffer::I64(v) => i64_as_ne_bytes(v),
            PixelBuffer::F32(v) => f32_as_ne_bytes(v),
            PixelBuffer::F64(v) => f64_as_ne_bytes(v),
        }
    }
}
