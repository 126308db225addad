//! Reduced-resolution copies of a band.
//!
//! Overviews of a band are numbered by the caller and may be created in any order, with any
//! size. Each is an independent chunked array with its own extent.

use tracing::debug;

use crate::band::block_size_attribute;
use crate::block::Block;
use crate::data_type::{to_physical_fixed, Pixel};
use crate::error::{KeaError, KeaResult};
use crate::image::{clamp_block_size, create_pixel_array, KeaImageIO};
use crate::layout;

impl KeaImageIO {
    /// Create overview `overview` of band `band`, `x_size` by `y_size` pixels, replacing any
    /// existing overview with that index.
    pub fn create_overview(
        &mut self,
        band: u32,
        overview: u32,
        x_size: u64,
        y_size: u64,
    ) -> KeaResult<()> {
        let data_type = to_physical_fixed(self.band_data_type(band)?)?;
        let band_block = self.image_block_size(band)? as u64;
        let deflate = self.config.deflate;
        let path = layout::band_overview(band, overview);

        let store = self.store_mut()?;
        if store.exists(&path) {
            store.unlink(&path)?;
        }
        let block_size = clamp_block_size(band_block, x_size, y_size);
        create_pixel_array(
            store,
            &path,
            data_type,
            [y_size, x_size],
            block_size,
            deflate,
        )?;
        debug!(band, overview, x_size, y_size, "created overview");
        Ok(())
    }

    /// Remove overview `overview` of band `band`. Succeeds if it does not exist.
    pub fn remove_overview(&mut self, band: u32, overview: u32) -> KeaResult<()> {
        self.check_band(band)?;
        let path = layout::band_overview(band, overview);
        let store = self.store_mut()?;
        if store.exists(&path) {
            store.unlink(&path)?;
            debug!(band, overview, "removed overview");
        }
        Ok(())
    }

    /// Number of overviews of band `band`.
    pub fn num_overviews(&self, band: u32) -> KeaResult<u32> {
        self.check_band(band)?;
        let names = self
            .store_ref()?
            .child_names(&layout::band_overviews(band))?;
        Ok(names.len() as u32)
    }

    /// Chunk edge length of overview `overview` of band `band`.
    pub fn overview_block_size(&self, band: u32, overview: u32) -> KeaResult<u32> {
        self.check_band(band)?;
        block_size_attribute(self.store_ref()?, &layout::band_overview(band, overview))
    }

    /// Width and height of overview `overview` of band `band`.
    pub fn overview_size(&self, band: u32, overview: u32) -> KeaResult<(u64, u64)> {
        self.check_band(band)?;
        let [rows, cols] = self.overview_extent(band, overview)?;
        Ok((cols, rows))
    }

    /// Write `data` into `block` of overview `overview` of band `band`.
    pub fn write_to_overview<T: Pixel>(
        &mut self,
        band: u32,
        overview: u32,
        block: &Block,
        data: &[T],
    ) -> KeaResult<()> {
        self.check_band(band)?;
        let extent = self.overview_extent(band, overview)?;
        self.write_block(
            band,
            &layout::band_overview(band, overview),
            extent,
            block,
            T::native_type(),
            T::as_ne_bytes(data),
        )
    }

    /// Read `block` of overview `overview` of band `band` into `data`.
    pub fn read_from_overview<T: Pixel>(
        &self,
        band: u32,
        overview: u32,
        block: &Block,
        data: &mut [T],
    ) -> KeaResult<()> {
        self.check_band(band)?;
        let extent = self.overview_extent(band, overview)?;
        self.read_block(
            band,
            &layout::band_overview(band, overview),
            extent,
            block,
            T::native_type(),
            T::as_ne_mut_bytes(data),
        )
    }

    /// Extent of an overview array as (rows, columns).
    fn overview_extent(&self, band: u32, overview: u32) -> KeaResult<[u64; 2]> {
        let shape = self
            .store_ref()?
            .dataset_shape(&layout::band_overview(band, overview))?;
        match shape[..] {
            [rows, cols] => Ok([rows, cols]),
            _ => Err(KeaError::InvalidDimensionality {
                expected: 2,
                found: shape.len(),
            }),
        }
    }
}
