//! Key/value metadata attached to the image or to a band.
//!
//! Each entry is a single-string leaf named by its key inside the scope's metadata group.
//! Setting an existing key overwrites it. Entries are enumerated in name order.

use crate::error::{KeaError, KeaResult};
use crate::image::KeaImageIO;
use crate::layout;

impl KeaImageIO {
    /// Set image metadata `key` to `value`.
    pub fn set_image_meta_data(&mut self, key: &str, value: &str) -> KeaResult<()> {
        self.set_meta_data(layout::METADATA, key, value)
    }

    /// Image metadata value of `key`.
    pub fn image_meta_data(&self, key: &str) -> KeaResult<String> {
        self.meta_data(layout::METADATA, key)
    }

    /// Keys of all image metadata.
    pub fn image_meta_data_names(&self) -> KeaResult<Vec<String>> {
        self.meta_data_names(layout::METADATA)
    }

    /// All image metadata as (key, value) pairs.
    pub fn image_meta_data_all(&self) -> KeaResult<Vec<(String, String)>> {
        self.meta_data_all(layout::METADATA)
    }

    /// Set image metadata from (key, value) pairs in order.
    ///
    /// Not atomic: pairs before a failing one stay written.
    pub fn set_image_meta_data_all<K, V>(&mut self, pairs: &[(K, V)]) -> KeaResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            self.set_meta_data(layout::METADATA, key.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    /// Set metadata `key` of band `band` to `value`.
    pub fn set_band_meta_data(&mut self, band: u32, key: &str, value: &str) -> KeaResult<()> {
        self.check_band(band)?;
        self.set_meta_data(&layout::band_metadata(band), key, value)
    }

    /// Metadata value of `key` on band `band`.
    pub fn band_meta_data(&self, band: u32, key: &str) -> KeaResult<String> {
        self.check_band(band)?;
        self.meta_data(&layout::band_metadata(band), key)
    }

    /// Keys of all metadata of band `band`.
    pub fn band_meta_data_names(&self, band: u32) -> KeaResult<Vec<String>> {
        self.check_band(band)?;
        self.meta_data_names(&layout::band_metadata(band))
    }

    /// All metadata of band `band` as (key, value) pairs.
    pub fn band_meta_data_all(&self, band: u32) -> KeaResult<Vec<(String, String)>> {
        self.check_band(band)?;
        self.meta_data_all(&layout::band_metadata(band))
    }

    /// Set metadata of band `band` from (key, value) pairs in order.
    ///
    /// Not atomic: pairs before a failing one stay written.
    pub fn set_band_meta_data_all<K, V>(&mut self, band: u32, pairs: &[(K, V)]) -> KeaResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.check_band(band)?;
        let scope = layout::band_metadata(band);
        for (key, value) in pairs {
            self.set_meta_data(&scope, key.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    fn set_meta_data(&mut self, scope: &str, key: &str, value: &str) -> KeaResult<()> {
        let path = layout::metadata_key(scope, key);
        self.store_mut()?.write_string(&path, value)?;
        Ok(())
    }

    fn meta_data(&self, scope: &str, key: &str) -> KeaResult<String> {
        let store = self.store_ref()?;
        let path = layout::metadata_key(scope, key);
        if !store.exists(&path) {
            return Err(KeaError::MetadataKeyNotFound(key.to_string()));
        }
        Ok(store.read_string(&path)?)
    }

    fn meta_data_names(&self, scope: &str) -> KeaResult<Vec<String>> {
        Ok(self.store_ref()?.child_names(scope)?)
    }

    fn meta_data_all(&self, scope: &str) -> KeaResult<Vec<(String, String)>> {
        let store = self.store_ref()?;
        store
            .child_names(scope)?
            .into_iter()
            .map(|key| -> KeaResult<(String, String)> {
                let value = store.read_string(&layout::metadata_key(scope, &key))?;
                Ok((key, value))
            })
            .collect()
    }
}
