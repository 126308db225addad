//! Views of typed pixel slices as native-endian bytes.
//!
//! Every type handled here is a plain number without padding or invalid bit patterns, so any
//! byte sequence of the right length is a valid value.

macro_rules! integral_slice_as_bytes {
    ($int:ty, $const:ident, $mut:ident) => {
        pub(crate) fn $const(slice: &[$int]) -> &[u8] {
            // SAFETY: $int has no padding, every byte is initialized and u8 has alignment 1.
            unsafe {
                std::slice::from_raw_parts(slice.as_ptr().cast(), std::mem::size_of_val(slice))
            }
        }

        pub(crate) fn $mut(slice: &mut [$int]) -> &mut [u8] {
            // SAFETY: as above, and every bit pattern written back is a valid $int.
            unsafe {
                std::slice::from_raw_parts_mut(
                    slice.as_mut_ptr().cast(),
                    std::mem::size_of_val(slice),
                )
            }
        }
    };
}

pub(crate) fn u8_as_ne_bytes(slice: &[u8]) -> &[u8] {
    slice
}

pub(crate) fn u8_as_ne_mut_bytes(slice: &mut [u8]) -> &mut [u8] {
    slice
}

integral_slice_as_bytes!(i8, i8_as_ne_bytes, i8_as_ne_mut_bytes);
integral_slice_as_bytes!(u16, u16_as_ne_bytes, u16_as_ne_mut_bytes);
integral_slice_as_bytes!(i16, i16_as_ne_bytes, i16_as_ne_mut_bytes);
integral_slice_as_bytes!(u32, u32_as_ne_bytes, u32_as_ne_mut_bytes);
integral_slice_as_bytes!(i32, i32_as_ne_bytes, i32_as_ne_mut_bytes);
integral_slice_as_bytes!(u64, u64_as_ne_bytes, u64_as_ne_mut_bytes);
integral_slice_as_bytes!(i64, i64_as_ne_bytes, i64_as_ne_mut_bytes);
integral_slice_as_bytes!(f32, f32_as_ne_bytes, f32_as_ne_mut_bytes);
integral_slice_as_bytes!(f64, f64_as_ne_bytes, f64_as_ne_mut_bytes);
