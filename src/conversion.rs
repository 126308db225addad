//! Conversion of element buffers between physical types.
//!
//! Transfers between memory and storage may change both byte order and number representation.
//! Integer narrowing saturates at the target range, floats convert to integers by truncation
//! (saturating, NaN becomes zero) and integers convert to floats with rounding.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::data_type::{Endianness, PhysicalType, Primitive};

/// Reorder the bytes of every `size`-byte element in `buf` in place.
pub fn swap_bytes(buf: &mut [u8], size: usize) {
    if size <= 1 {
        return;
    }
    buf.chunks_exact_mut(size).for_each(|v| v.reverse());
}

/// Bring `buf`, holding elements of `size` bytes in `byte_order`, into host order.
pub fn fix_endianness(buf: &mut [u8], byte_order: Endianness, size: usize) {
    if byte_order != Endianness::NATIVE {
        swap_bytes(buf, size);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    Int(i64),
    UInt(u64),
    Float(f64),
}

fn read_scalar(bytes: &[u8], ty: PhysicalType) -> Scalar {
    match ty.endianness {
        Endianness::LittleEndian => read_scalar_as::<LittleEndian>(bytes, ty.primitive),
        Endianness::BigEndian => read_scalar_as::<BigEndian>(bytes, ty.primitive),
    }
}

fn read_scalar_as<B: ByteOrder>(bytes: &[u8], primitive: Primitive) -> Scalar {
    match primitive {
        Primitive::I8 => Scalar::Int(bytes[0] as i8 as i64),
        Primitive::I16 => Scalar::Int(B::read_i16(bytes) as i64),
        Primitive::I32 => Scalar::Int(B::read_i32(bytes) as i64),
        Primitive::I64 => Scalar::Int(B::read_i64(bytes)),
        Primitive::U8 => Scalar::UInt(bytes[0] as u64),
        Primitive::U16 => Scalar::UInt(B::read_u16(bytes) as u64),
        Primitive::U32 => Scalar::UInt(B::read_u32(bytes) as u64),
        Primitive::U64 => Scalar::UInt(B::read_u64(bytes)),
        Primitive::F32 => Scalar::Float(B::read_f32(bytes) as f64),
        Primitive::F64 => Scalar::Float(B::read_f64(bytes)),
    }
}

fn as_wide(value: Scalar) -> Option<i128> {
    match value {
        Scalar::Int(v) => Some(v as i128),
        Scalar::UInt(v) => Some(v as i128),
        Scalar::Float(_) => None,
    }
}

fn write_scalar(value: Scalar, ty: PhysicalType, out: &mut [u8]) {
    match ty.endianness {
        Endianness::LittleEndian => write_scalar_as::<LittleEndian>(value, ty.primitive, out),
        Endianness::BigEndian => write_scalar_as::<BigEndian>(value, ty.primitive, out),
    }
}

fn write_scalar_as<B: ByteOrder>(value: Scalar, primitive: Primitive, out: &mut [u8]) {
    macro_rules! integer {
        ($int:ty) => {
            match as_wide(value) {
                Some(wide) => wide.clamp(<$int>::MIN as i128, <$int>::MAX as i128) as $int,
                // `as` saturates and maps NaN to zero
                None => match value {
                    Scalar::Float(f) => f as $int,
                    _ => 0,
                },
            }
        };
    }
    macro_rules! float {
        ($float:ty) => {
            match value {
                Scalar::Int(v) => v as $float,
                Scalar::UInt(v) => v as $float,
                Scalar::Float(v) => v as $float,
            }
        };
    }

    match primitive {
        Primitive::I8 => out[0] = integer!(i8) as u8,
        Primitive::I16 => B::write_i16(out, integer!(i16)),
        Primitive::I32 => B::write_i32(out, integer!(i32)),
        Primitive::I64 => B::write_i64(out, integer!(i64)),
        Primitive::U8 => out[0] = integer!(u8),
        Primitive::U16 => B::write_u16(out, integer!(u16)),
        Primitive::U32 => B::write_u32(out, integer!(u32)),
        Primitive::U64 => B::write_u64(out, integer!(u64)),
        Primitive::F32 => B::write_f32(out, float!(f32)),
        Primitive::F64 => B::write_f64(out, float!(f64)),
    }
}

/// Convert the elements of `src`, stored as `src_type`, into `dst` as `dst_type`.
///
/// `dst` must hold exactly as many elements as `src`.
pub fn convert(src: &[u8], src_type: PhysicalType, dst: &mut [u8], dst_type: PhysicalType) {
    debug_assert_eq!(src.len() / src_type.size(), dst.len() / dst_type.size());
    if src_type.primitive == dst_type.primitive {
        dst.copy_from_slice(src);
        if src_type.endianness != dst_type.endianness {
            swap_bytes(dst, dst_type.size());
        }
        return;
    }
    for (s, d) in src
        .chunks_exact(src_type.size())
        .zip(dst.chunks_exact_mut(dst_type.size()))
    {
        write_scalar(read_scalar(s, src_type), dst_type, d);
    }
}

/// Convert `src` into a newly allocated buffer of `dst_type` elements.
pub fn convert_to_vec(src: &[u8], src_type: PhysicalType, dst_type: PhysicalType) -> Vec<u8> {
    let count = src.len() / src_type.size();
    let mut out = vec![0u8; count * dst_type.size()];
    convert(src, src_type, &mut out, dst_type);
    out
}
