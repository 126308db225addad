//! Per-band properties: type, classification, description, no-data value and mask.

use serde_json::json;
use tracing::debug;

use crate::block::Block;
use crate::data_type::{to_physical_fixed, DataType, LayerType, PhysicalType, Pixel, Primitive};
use crate::error::{KeaError, KeaResult};
use crate::image::KeaImageIO;
use crate::layout;
use crate::store::{read_array, write_array, ContainerStore, DatasetSpec};

/// Which pixel array of a band an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandKind {
    /// The band's image data.
    #[default]
    Standard,
    /// The band's validity mask; never carries an attribute table.
    Mask,
}

/// Mask value of pixels holding valid data.
pub const MASK_VALID: u8 = 255;

const MASK_TYPE: PhysicalType = PhysicalType::fixed(Primitive::U8);

impl KeaImageIO {
    /// Logical pixel type of band `band`.
    pub fn band_data_type(&self, band: u32) -> KeaResult<DataType> {
        self.check_band(band)?;
        let tag = read_array::<u16>(self.store_ref()?, &layout::band_data_type(band))?;
        match tag.first() {
            Some(&tag) => DataType::from_tag(tag),
            None => Err(KeaError::UnsupportedType(0)),
        }
    }

    /// Classification of band `band`.
    pub fn band_layer_type(&self, band: u32) -> KeaResult<LayerType> {
        self.check_band(band)?;
        let tag = read_array::<u8>(self.store_ref()?, &layout::band_layer_type(band))?;
        let Some(&tag) = tag.first() else {
            return Err(KeaError::IoFailure(format!(
                "Band {band} has an empty layer type."
            )));
        };
        LayerType::try_from(tag)
            .map_err(|_| KeaError::IoFailure(format!("Unknown layer type {tag} for band {band}.")))
    }

    /// Set the classification of band `band`.
    pub fn set_band_layer_type(&mut self, band: u32, layer_type: LayerType) -> KeaResult<()> {
        self.check_band(band)?;
        write_array(
            self.store_mut()?,
            &layout::band_layer_type(band),
            &[u8::from(layer_type)],
        )?;
        Ok(())
    }

    /// Description of band `band`.
    pub fn band_description(&self, band: u32) -> KeaResult<String> {
        self.check_band(band)?;
        Ok(self
            .store_ref()?
            .read_string(&layout::band_description(band))?)
    }

    /// Replace the description of band `band`.
    pub fn set_band_description(&mut self, band: u32, description: &str) -> KeaResult<()> {
        self.check_band(band)?;
        self.store_mut()?
            .write_string(&layout::band_description(band), description)?;
        Ok(())
    }

    /// Chunk edge length of band `band`'s image data.
    pub fn image_block_size(&self, band: u32) -> KeaResult<u32> {
        self.check_band(band)?;
        block_size_attribute(self.store_ref()?, &layout::band_data(band))
    }

    /// Set the no-data value of band `band`.
    ///
    /// The value is converted from `T` to the band's type; `T` need not match it.
    pub fn set_no_data_value<T: Pixel>(&mut self, band: u32, value: T) -> KeaResult<()> {
        let data_type = self.band_data_type(band)?;
        let path = layout::band_no_data(band);
        let store = self.store_mut()?;
        if !store.exists(&path) {
            let spec = DatasetSpec::numeric(to_physical_fixed(data_type)?, &[1]);
            store.create_dataset(&path, spec)?;
        }
        write_array(store, &path, &[value])?;
        Ok(())
    }

    /// The no-data value of band `band` as `T`, or `None` if none is defined.
    pub fn no_data_value<T: Pixel>(&self, band: u32) -> KeaResult<Option<T>> {
        self.check_band(band)?;
        let path = layout::band_no_data(band);
        let store = self.store_ref()?;
        if !store.exists(&path) {
            return Ok(None);
        }
        Ok(read_array::<T>(store, &path)?.first().copied())
    }

    /// Remove the no-data value of band `band`. Succeeds if none is defined.
    pub fn undefine_no_data_value(&mut self, band: u32) -> KeaResult<()> {
        self.check_band(band)?;
        let path = layout::band_no_data(band);
        let store = self.store_mut()?;
        if store.exists(&path) {
            store.unlink(&path)?;
        }
        Ok(())
    }

    /// Create the validity mask of band `band`, initially all valid. Does nothing if it exists.
    pub fn create_mask(&mut self, band: u32) -> KeaResult<()> {
        self.check_band(band)?;
        let data = layout::band_data(band);
        let mask = layout::band_mask(band);
        let deflate = self.config.deflate;
        let store = self.store_mut()?;
        if store.exists(&mask) {
            return Ok(());
        }

        let shape = store.dataset_shape(&data)?;
        let chunk = store.dataset_chunk(&data)?;
        let spec = DatasetSpec::numeric(MASK_TYPE, &shape)
            .with_chunk(&chunk)
            .with_shuffle()
            .with_deflate(deflate)
            .with_fill_value(MASK_VALID);
        store.create_dataset(&mask, spec)?;
        let block_size = block_size_attribute(store, &data)?;
        store.set_attribute(&mask, layout::ATTR_BLOCK_SIZE, json!(block_size))?;
        debug!(band, "created mask");
        Ok(())
    }

    /// Whether band `band` has a validity mask.
    pub fn mask_created(&self, band: u32) -> KeaResult<bool> {
        self.check_band(band)?;
        Ok(self.store_ref()?.exists(&layout::band_mask(band)))
    }

    /// Write `data` into `block` of band `band`'s mask.
    pub fn write_mask_block(&mut self, band: u32, block: &Block, data: &[u8]) -> KeaResult<()> {
        self.require_mask(band)?;
        let extent = self.image_extent();
        let path = self.band_array(band, BandKind::Mask);
        self.write_block(
            band,
            &path,
            extent,
            block,
            u8::native_type(),
            data,
        )
    }

    /// Read `block` of band `band`'s mask into `data`.
    pub fn read_mask_block(&self, band: u32, block: &Block, data: &mut [u8]) -> KeaResult<()> {
        self.require_mask(band)?;
        self.read_block(
            band,
            &self.band_array(band, BandKind::Mask),
            self.image_extent(),
            block,
            u8::native_type(),
            data,
        )
    }

    /// Path of the pixel array of `kind` for band `band`.
    pub(crate) fn band_array(&self, band: u32, kind: BandKind) -> String {
        match kind {
            BandKind::Standard => layout::band_data(band),
            BandKind::Mask => layout::band_mask(band),
        }
    }

    fn require_mask(&self, band: u32) -> KeaResult<()> {
        if self.mask_created(band)? {
            Ok(())
        } else {
            Err(KeaError::IoFailure(format!(
                "Band {band} does not have a mask."
            )))
        }
    }
}

/// The `BLOCK_SIZE` attribute of the pixel array at `path`.
pub(crate) fn block_size_attribute(store: &dyn ContainerStore, path: &str) -> KeaResult<u32> {
    store
        .attribute(path, layout::ATTR_BLOCK_SIZE)?
        .as_u64()
        .and_then(|size| u32::try_from(size).ok())
        .ok_or_else(|| KeaError::IoFailure(format!("{path} has an invalid block size.")))
}
