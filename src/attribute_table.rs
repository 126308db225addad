//! Attribute tables attached to bands.
//!
//! The table encoding belongs to the [`AttributeTable`] implementation. The image only provides
//! the container and records whether a table is present through the band's `ATT_SIZE` vector,
//! whose first element is the number of rows.

use crate::band::BandKind;
use crate::error::{KeaError, KeaResult};
use crate::image::KeaImageIO;
use crate::layout;
use crate::store::{read_array, ContainerStore};

/// A table that can be stored under a band's `ATT` group.
pub trait AttributeTable: Sized {
    /// Write the table for band `band`, including its `ATT_SIZE` and `ATT_CHUNKSIZE` entries.
    fn export_to_kea(
        &self,
        store: &mut dyn ContainerStore,
        band: u32,
        chunk_size: u32,
        deflate: u32,
    ) -> KeaResult<()>;

    /// Read the table of band `band`.
    fn import_from_kea(store: &dyn ContainerStore, band: u32) -> KeaResult<Self>;
}

impl KeaImageIO {
    /// Store `table` as the attribute table of band `band`.
    ///
    /// `chunk_size` defaults to the configured attribute block size.
    pub fn set_attribute_table<A: AttributeTable>(
        &mut self,
        table: &A,
        band: u32,
        chunk_size: Option<u32>,
    ) -> KeaResult<()> {
        self.check_band(band)?;
        let chunk_size = chunk_size.unwrap_or(self.config.att_block_size);
        let deflate = self.config.deflate;
        table.export_to_kea(self.store_mut()?, band, chunk_size, deflate)
    }

    /// Read the attribute table of band `band`.
    pub fn attribute_table<A: AttributeTable>(&self, band: u32) -> KeaResult<A> {
        self.check_band(band)?;
        A::import_from_kea(self.store_ref()?, band)
    }

    /// Whether band `band` has a non-empty attribute table.
    pub fn attribute_table_present(&self, band: u32) -> KeaResult<bool> {
        self.attribute_table_present_for(band, BandKind::Standard)
    }

    /// Whether the `kind` array of band `band` has a non-empty attribute table.
    pub fn attribute_table_present_for(&self, band: u32, kind: BandKind) -> KeaResult<bool> {
        self.check_band(band)?;
        if kind == BandKind::Mask {
            return Ok(false);
        }
        let size = read_array::<u64>(self.store_ref()?, &layout::band_att_size(band))
            .map_err(|_| {
                KeaError::IoFailure("The attribute table size field is not present.".into())
            })?;
        Ok(size.first().map_or(false, |&rows| rows > 0))
    }

    /// Chunk size the attribute table of band `band` was written with.
    pub fn attribute_table_chunk_size(&self, band: u32) -> KeaResult<u64> {
        self.check_band(band)?;
        let chunk = read_array::<u64>(self.store_ref()?, &layout::band_att_chunk_size(band))?;
        Ok(chunk.first().copied().unwrap_or_default())
    }
}
