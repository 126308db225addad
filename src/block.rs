//! Block transfers between caller buffers and band, mask and overview arrays.
//!
//! A transfer moves a `width` x `height` rectangle of pixels starting at (`x_off`, `y_off`).
//! The caller's buffer is `buf_width` x `buf_height` elements, row-major. When the rectangle is
//! smaller than the buffer, as happens for blocks clipped at the right or bottom edge of an
//! image, only the top-left `width` x `height` elements of the buffer take part and the rest of
//! it is left untouched.

use tracing::trace;
use zarrs::array_subset::ArraySubset;

use crate::data_type::{to_physical_native, DataType, PhysicalType, Pixel};
use crate::error::{KeaError, KeaResult};
use crate::image::KeaImageIO;
use crate::layout;
use crate::pixel_buffer::PixelBuffer;

/// A pixel rectangle and the shape of the buffer holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Column of the first pixel.
    pub x_off: u64,
    /// Row of the first pixel.
    pub y_off: u64,
    /// Columns transferred.
    pub width: u64,
    /// Rows transferred.
    pub height: u64,
    /// Row length of the caller's buffer.
    pub buf_width: u64,
    /// Rows in the caller's buffer.
    pub buf_height: u64,
}

impl Block {
    /// A `width` x `height` rectangle held in a buffer of the same shape.
    pub fn new(x_off: u64, y_off: u64, width: u64, height: u64) -> Self {
        Self {
            x_off,
            y_off,
            width,
            height,
            buf_width: width,
            buf_height: height,
        }
    }

    /// Hold the rectangle in the top-left corner of a `buf_width` x `buf_height` buffer.
    pub fn with_buffer(mut self, buf_width: u64, buf_height: u64) -> Self {
        self.buf_width = buf_width;
        self.buf_height = buf_height;
        self
    }

    /// Number of elements in the caller's buffer, or `None` when that does not fit a `usize`.
    pub fn buffer_len(&self) -> Option<usize> {
        let len = self.buf_width.checked_mul(self.buf_height)?;
        usize::try_from(len).ok()
    }

    fn is_clipped(&self) -> bool {
        self.width != self.buf_width || self.height != self.buf_height
    }

    /// Region of an array of `extent` (rows, columns) covered by the block.
    pub(crate) fn region(&self, extent: [u64; 2]) -> KeaResult<ArraySubset> {
        let [rows, cols] = extent;
        if self.x_off > cols || self.x_off.saturating_add(self.width) > cols {
            return Err(KeaError::OutOfBounds(format!(
                "Block columns {}..{} are not within the image width {cols}.",
                self.x_off,
                self.x_off.saturating_add(self.width)
            )));
        }
        if self.y_off > rows || self.y_off.saturating_add(self.height) > rows {
            return Err(KeaError::OutOfBounds(format!(
                "Block rows {}..{} are not within the image height {rows}.",
                self.y_off,
                self.y_off.saturating_add(self.height)
            )));
        }
        if self.width > self.buf_width || self.height > self.buf_height {
            return Err(KeaError::OutOfBounds(format!(
                "Block of {}x{} does not fit a buffer of {}x{}.",
                self.width, self.height, self.buf_width, self.buf_height
            )));
        }
        Ok(ArraySubset::new_with_ranges(&[
            self.y_off..self.y_off + self.height,
            self.x_off..self.x_off + self.width,
        ]))
    }

    /// Check the caller's buffer and return the bytes of it taking part in the transfer.
    fn check_buffer(&self, memory_type: PhysicalType, actual: usize) -> KeaResult<usize> {
        let expected = self
            .buffer_len()
            .and_then(|len| len.checked_mul(memory_type.size()))
            .unwrap_or(usize::MAX);
        if actual < expected {
            return Err(KeaError::BufferTooSmall { expected, actual });
        }
        Ok(expected)
    }

    /// Bytes per block row and per buffer row.
    fn row_bytes(&self, elem: usize) -> KeaResult<(usize, usize)> {
        let bytes = |elements: u64| {
            usize::try_from(elements)
                .ok()
                .and_then(|elements| elements.checked_mul(elem))
        };
        match (bytes(self.width), bytes(self.buf_width)) {
            (Some(row), Some(stride)) => Ok((row, stride)),
            _ => Err(KeaError::OutOfBounds(format!(
                "Block rows of {} elements do not fit in memory.",
                self.buf_width
            ))),
        }
    }

    /// Copy the block's rows out of the strided buffer into a dense one.
    fn gather(&self, elem: usize, strided: &[u8]) -> KeaResult<Vec<u8>> {
        let (row, stride) = self.row_bytes(elem)?;
        let mut dense = Vec::with_capacity(row.saturating_mul(self.height as usize));
        if row == 0 {
            return Ok(dense);
        }
        for line in strided.chunks(stride).take(self.height as usize) {
            dense.extend_from_slice(&line[..row]);
        }
        Ok(dense)
    }

    /// Copy dense block rows into the top-left corner of the strided buffer.
    fn scatter(&self, elem: usize, dense: &[u8], strided: &mut [u8]) -> KeaResult<()> {
        let (row, stride) = self.row_bytes(elem)?;
        if row == 0 {
            return Ok(());
        }
        for (line, values) in strided.chunks_mut(stride).zip(dense.chunks_exact(row)) {
            line[..row].copy_from_slice(values);
        }
        Ok(())
    }
}

impl KeaImageIO {
    /// Write `data` into `block` of band `band`, converting from `T` to the band's type.
    pub fn write_image_block<T: Pixel>(
        &mut self,
        band: u32,
        block: &Block,
        data: &[T],
    ) -> KeaResult<()> {
        let extent = self.image_extent();
        self.write_block(
            band,
            &layout::band_data(band),
            extent,
            block,
            T::native_type(),
            T::as_ne_bytes(data),
        )
    }

    /// Read `block` of band `band` into `data`, converting from the band's type to `T`.
    pub fn read_image_block<T: Pixel>(
        &self,
        band: u32,
        block: &Block,
        data: &mut [T],
    ) -> KeaResult<()> {
        self.read_block(
            band,
            &layout::band_data(band),
            self.image_extent(),
            block,
            T::native_type(),
            T::as_ne_mut_bytes(data),
        )
    }

    /// Write host-endian elements of `data_type` held in `data` into `block` of band `band`.
    pub fn write_image_block_raw(
        &mut self,
        band: u32,
        block: &Block,
        data: &[u8],
        data_type: DataType,
    ) -> KeaResult<()> {
        let memory_type = to_physical_native(data_type)?;
        let extent = self.image_extent();
        self.write_block(
            band,
            &layout::band_data(band),
            extent,
            block,
            memory_type,
            data,
        )
    }

    /// Read `block` of band `band` into `data` as host-endian elements of `data_type`.
    pub fn read_image_block_raw(
        &self,
        band: u32,
        block: &Block,
        data: &mut [u8],
        data_type: DataType,
    ) -> KeaResult<()> {
        let memory_type = to_physical_native(data_type)?;
        self.read_block(
            band,
            &layout::band_data(band),
            self.image_extent(),
            block,
            memory_type,
            data,
        )
    }

    /// Read `block` of band `band` in the band's own data type.
    ///
    /// The returned buffer has `block.buf_width * block.buf_height` elements; elements outside
    /// the block are zero.
    pub fn read_image_block_native(&self, band: u32, block: &Block) -> KeaResult<PixelBuffer> {
        let data_type = self.band_data_type(band)?;
        let len = block.buffer_len().ok_or_else(|| {
            KeaError::OutOfBounds(format!(
                "A buffer of {}x{} elements does not fit in memory.",
                block.buf_width, block.buf_height
            ))
        })?;
        let mut buffer = PixelBuffer::new(data_type, len)?;
        self.read_image_block_raw(band, block, buffer.as_mut_u8_buf(), data_type)?;
        Ok(buffer)
    }

    /// Extent of band arrays as (rows, columns).
    pub(crate) fn image_extent(&self) -> [u64; 2] {
        [self.spatial_info.y_size, self.spatial_info.x_size]
    }

    pub(crate) fn write_block(
        &mut self,
        band: u32,
        path: &str,
        extent: [u64; 2],
        block: &Block,
        memory_type: PhysicalType,
        memory: &[u8],
    ) -> KeaResult<()> {
        self.check_band(band)?;
        let region = block.region(extent)?;
        let used = block.check_buffer(memory_type, memory.len())?;
        trace!(
            path,
            x_off = block.x_off,
            y_off = block.y_off,
            width = block.width,
            height = block.height,
            "writing block"
        );
        let store = self.store_mut()?;
        if block.is_clipped() {
            let dense = block.gather(memory_type.size(), &memory[..used])?;
            store.write_region(path, &region, memory_type, &dense)?;
        } else {
            store.write_region(path, &region, memory_type, &memory[..used])?;
        }
        Ok(())
    }

    pub(crate) fn read_block(
        &self,
        band: u32,
        path: &str,
        extent: [u64; 2],
        block: &Block,
        memory_type: PhysicalType,
        memory: &mut [u8],
    ) -> KeaResult<()> {
        self.check_band(band)?;
        let region = block.region(extent)?;
        let used = block.check_buffer(memory_type, memory.len())?;
        trace!(
            path,
            x_off = block.x_off,
            y_off = block.y_off,
            width = block.width,
            height = block.height,
            "reading block"
        );
        let store = self.store_ref()?;
        if block.is_clipped() {
            let (row, _) = block.row_bytes(memory_type.size())?;
            let mut dense = vec![0u8; row * block.height as usize];
            store.read_region(path, &region, memory_type, &mut dense)?;
            block.scatter(memory_type.size(), &dense, &mut memory[..used])?;
        } else {
            store.read_region(path, &region, memory_type, &mut memory[..used])?;
        }
        Ok(())
    }
}
