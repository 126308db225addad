//! The image session: creating, opening and closing KEA images.

use std::path::Path;

use serde_json::json;
use tracing::{debug, warn};

use crate::config::KeaConfig;
use crate::data_type::{to_physical_fixed, DataType, LayerType, PhysicalType, Pixel, Primitive};
use crate::error::{KeaError, KeaResult};
use crate::layout;
use crate::spatial::SpatialInfo;
use crate::store::{
    read_array, write_array, ContainerStore, DatasetSpec, OpenMode, ZarrContainer,
};

/// Shape and initial contents of a new image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDefinition {
    /// Pixel type of every band.
    pub data_type: DataType,
    /// Width in pixels.
    pub x_size: u64,
    /// Height in pixels.
    pub y_size: u64,
    /// Number of bands.
    pub num_bands: u16,
    /// Descriptions of the first bands; later bands are named `Band {n}`.
    pub band_descriptions: Vec<String>,
    /// Georeferencing; `None` places the image at the origin with unit pixels.
    pub spatial_info: Option<SpatialInfo>,
}

impl ImageDefinition {
    /// An image of `num_bands` bands of `data_type`, `x_size` by `y_size` pixels.
    pub fn new(data_type: DataType, x_size: u64, y_size: u64, num_bands: u16) -> Self {
        Self {
            data_type,
            x_size,
            y_size,
            num_bands,
            band_descriptions: Vec::new(),
            spatial_info: None,
        }
    }

    /// Set the band descriptions.
    pub fn with_band_descriptions<S: Into<String>>(
        mut self,
        descriptions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.band_descriptions = descriptions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the georeferencing.
    pub fn with_spatial_info(mut self, spatial_info: SpatialInfo) -> Self {
        self.spatial_info = Some(spatial_info);
        self
    }
}

/// An open or closed KEA image.
///
/// Every operation other than creating, opening and probing files requires an open image and
/// fails with [`KeaError::NotOpen`] otherwise. Bands are numbered from 1.
///
/// Dropping an open, writable image flushes it; use [`KeaImageIO::close`] to observe flush
/// failures.
#[derive(Debug)]
pub struct KeaImageIO {
    pub(crate) store: Option<Box<dyn ContainerStore>>,
    pub(crate) spatial_info: SpatialInfo,
    pub(crate) num_bands: u32,
    pub(crate) config: KeaConfig,
}

impl Default for KeaImageIO {
    fn default() -> Self {
        Self::new()
    }
}

const fn fixed(primitive: Primitive) -> PhysicalType {
    PhysicalType::fixed(primitive)
}

impl KeaImageIO {
    /// A closed session using the default configuration.
    pub fn new() -> Self {
        Self::with_config(KeaConfig::default())
    }

    /// A closed session using `config` for datasets it creates.
    pub fn with_config(config: KeaConfig) -> Self {
        Self {
            store: None,
            spatial_info: SpatialInfo::default(),
            num_bands: 0,
            config,
        }
    }

    /// Create a KEA image at `path` and open it.
    pub fn create(
        path: impl AsRef<Path>,
        definition: &ImageDefinition,
        config: KeaConfig,
    ) -> KeaResult<Self> {
        let store = Self::create_kea_image(path, definition, &config)?;
        let mut image = Self::with_config(config);
        image.open_kea_image_header(store)?;
        Ok(image)
    }

    /// Open the KEA image at `path`.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, config: KeaConfig) -> KeaResult<Self> {
        let store = match mode {
            OpenMode::ReadOnly => Self::open_kea_h5_read_only(path)?,
            OpenMode::ReadWrite => Self::open_kea_h5_rw(path)?,
        };
        let mut image = Self::with_config(config);
        image.open_kea_image_header(store)?;
        Ok(image)
    }

    /// Create the container directory at `path`, replacing any existing image, and lay out an
    /// empty image.
    ///
    /// The returned container is ready for [`KeaImageIO::open_kea_image_header`].
    pub fn create_kea_image(
        path: impl AsRef<Path>,
        definition: &ImageDefinition,
        config: &KeaConfig,
    ) -> KeaResult<Box<dyn ContainerStore>> {
        let path = path.as_ref();
        let mut store = ZarrContainer::create(path)?;
        Self::write_kea_schema(&mut store, definition, config)?;
        store.flush()?;
        debug!(
            path = %path.display(),
            bands = definition.num_bands,
            width = definition.x_size,
            height = definition.y_size,
            data_type = definition.data_type.name(),
            "created KEA image"
        );
        Ok(Box::new(store))
    }

    /// Lay out an empty image in an empty container.
    pub fn write_kea_schema(
        store: &mut dyn ContainerStore,
        definition: &ImageDefinition,
        config: &KeaConfig,
    ) -> KeaResult<()> {
        let data_type = to_physical_fixed(definition.data_type)?;
        let default_spatial = SpatialInfo::default();
        let spatial = definition.spatial_info.as_ref().unwrap_or(&default_spatial);

        store.create_group(layout::HEADER)?;
        create_array(store, layout::HEADER_NUMBANDS, &[definition.num_bands])?;
        create_array(store, layout::HEADER_TL, &[spatial.tl_x, spatial.tl_y])?;
        create_array(store, layout::HEADER_RES, &[spatial.x_res, spatial.y_res])?;
        create_array(store, layout::HEADER_ROT, &[spatial.x_rot, spatial.y_rot])?;
        create_array(
            store,
            layout::HEADER_SIZE,
            &[definition.x_size, definition.y_size],
        )?;
        store.write_string(layout::HEADER_WKT, &spatial.wkt)?;
        store.write_string(layout::HEADER_FILETYPE, layout::KEA_FILETYPE)?;
        store.write_string(layout::HEADER_GENERATOR, layout::KEA_GENERATOR)?;
        store.write_string(layout::HEADER_VERSION, layout::KEA_VERSION)?;
        store.create_group(layout::METADATA)?;

        let block_size = clamp_block_size(
            config.image_block_size as u64,
            definition.x_size,
            definition.y_size,
        );
        for band in 1..=definition.num_bands as u32 {
            store.create_group(&layout::band(band))?;

            let data = layout::band_data(band);
            create_pixel_array(
                store,
                &data,
                data_type,
                [definition.y_size, definition.x_size],
                block_size,
                config.deflate,
            )?;

            let description = definition
                .band_descriptions
                .get(band as usize - 1)
                .cloned()
                .unwrap_or_else(|| format!("Band {band}"));
            store.write_string(&layout::band_description(band), &description)?;
            create_array(
                store,
                &layout::band_data_type(band),
                &[definition.data_type.tag()],
            )?;
            create_array(
                store,
                &layout::band_layer_type(band),
                &[u8::from(LayerType::Continuous)],
            )?;
            store.create_group(&layout::band_metadata(band))?;
            store.create_group(&layout::band_overviews(band))?;

            store.create_group(&layout::band_att(band))?;
            store.create_group(&layout::band_att_data(band))?;
            store.create_group(&layout::band_att_neighbours(band))?;
            store.create_group(&layout::band_att_header(band))?;
            create_array(store, &layout::band_att_chunk_size(band), &[0u64])?;
            create_array(
                store,
                &layout::band_att_size(band),
                &[0u64; layout::ATT_SIZE_LEN],
            )?;
        }
        Ok(())
    }

    /// Open the container at `path` for reading and writing.
    pub fn open_kea_h5_rw(path: impl AsRef<Path>) -> KeaResult<Box<dyn ContainerStore>> {
        Ok(Box::new(ZarrContainer::open(path, OpenMode::ReadWrite)?))
    }

    /// Open the container at `path` for reading only.
    pub fn open_kea_h5_read_only(path: impl AsRef<Path>) -> KeaResult<Box<dyn ContainerStore>> {
        Ok(Box::new(ZarrContainer::open(path, OpenMode::ReadOnly)?))
    }

    /// Read the image header from `store` and take ownership of it.
    ///
    /// The session is open only if every header field could be read.
    pub fn open_kea_image_header(&mut self, store: Box<dyn ContainerStore>) -> KeaResult<()> {
        let header: &dyn ContainerStore = &*store;
        let num_bands = read_header::<u16>(header, layout::HEADER_NUMBANDS, "NUMBANDS", 1)?;
        let tl = read_header::<f64>(header, layout::HEADER_TL, "TL", 2)?;
        let res = read_header::<f32>(header, layout::HEADER_RES, "RES", 2)?;
        let rot = read_header::<f32>(header, layout::HEADER_ROT, "ROT", 2)?;
        let size = read_header::<u64>(header, layout::HEADER_SIZE, "SIZE", 2)?;
        let wkt = header
            .read_string(layout::HEADER_WKT)
            .map_err(|_| KeaError::MissingHeaderField("WKT"))?;

        self.spatial_info = SpatialInfo {
            tl_x: tl[0],
            tl_y: tl[1],
            x_res: res[0],
            y_res: res[1],
            x_rot: rot[0],
            y_rot: rot[1],
            x_size: size[0],
            y_size: size[1],
            wkt,
        };
        self.num_bands = num_bands[0] as u32;
        self.store = Some(store);
        debug!(bands = self.num_bands, "opened KEA image header");
        Ok(())
    }

    /// Whether `path` is a readable KEA image. Never fails.
    ///
    /// Only the root and header metadata are read; pixel chunks are never touched.
    pub fn is_kea_image(path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if !ZarrContainer::is_container(path) {
            return false;
        }
        let store = match ZarrContainer::open(path, OpenMode::ReadOnly) {
            Ok(store) => store,
            Err(err) => {
                debug!(path = %path.display(), %err, "not a KEA image");
                return false;
            }
        };
        let tag_is = |tag: &str, expected: &str| {
            store
                .read_string(tag)
                .map_or(false, |value| value == expected)
        };
        tag_is(layout::HEADER_FILETYPE, layout::KEA_FILETYPE)
            && tag_is(layout::HEADER_VERSION, layout::KEA_VERSION)
    }

    /// Flush and release the container. The session is closed afterwards even if flushing
    /// failed.
    pub fn close(&mut self) -> KeaResult<()> {
        let mut store = self.store.take().ok_or(KeaError::NotOpen)?;
        self.num_bands = 0;
        store.flush()?;
        debug!("closed KEA image");
        Ok(())
    }

    /// Whether the session holds an open image.
    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Configuration used for datasets created by this session.
    pub fn config(&self) -> &KeaConfig {
        &self.config
    }

    /// Georeferencing read from the header.
    pub fn spatial_info(&self) -> KeaResult<&SpatialInfo> {
        self.store_ref()?;
        Ok(&self.spatial_info)
    }

    /// Replace the corner, resolution, rotation and spatial reference in the header.
    ///
    /// The raster size is fixed when the image is created; `x_size` and `y_size` are ignored.
    pub fn set_spatial_info(&mut self, spatial_info: &SpatialInfo) -> KeaResult<()> {
        let store = self.store_mut()?;
        write_array(store, layout::HEADER_TL, &[spatial_info.tl_x, spatial_info.tl_y])?;
        write_array(
            store,
            layout::HEADER_RES,
            &[spatial_info.x_res, spatial_info.y_res],
        )?;
        write_array(
            store,
            layout::HEADER_ROT,
            &[spatial_info.x_rot, spatial_info.y_rot],
        )?;
        store.write_string(layout::HEADER_WKT, &spatial_info.wkt)?;

        self.spatial_info = SpatialInfo {
            x_size: self.spatial_info.x_size,
            y_size: self.spatial_info.y_size,
            ..spatial_info.clone()
        };
        Ok(())
    }

    /// Number of bands.
    pub fn num_image_bands(&self) -> KeaResult<u32> {
        self.store_ref()?;
        Ok(self.num_bands)
    }

    pub(crate) fn store_ref(&self) -> KeaResult<&dyn ContainerStore> {
        self.store.as_deref().ok_or(KeaError::NotOpen)
    }

    pub(crate) fn store_mut(&mut self) -> KeaResult<&mut dyn ContainerStore> {
        match self.store.as_mut() {
            Some(store) => {
                let store: &mut dyn ContainerStore = &mut **store;
                Ok(store)
            }
            None => Err(KeaError::NotOpen),
        }
    }

    /// Validate `band` against the open image.
    pub(crate) fn check_band(&self, band: u32) -> KeaResult<()> {
        self.store_ref()?;
        if band == 0 {
            return Err(KeaError::InvalidBandIndex);
        }
        if band > self.num_bands {
            return Err(KeaError::BandNotFound {
                band,
                num_bands: self.num_bands,
            });
        }
        Ok(())
    }
}

impl Drop for KeaImageIO {
    fn drop(&mut self) {
        if let Some(store) = self.store.as_mut() {
            if store.is_writable() {
                if let Err(err) = store.flush() {
                    warn!(%err, "failed to flush KEA image on drop");
                }
            }
        }
    }
}

/// Chunk edge length for a `x_size` by `y_size` array: the requested size, capped by the
/// shorter axis, and at least 1.
pub(crate) fn clamp_block_size(requested: u64, x_size: u64, y_size: u64) -> u64 {
    requested.min(x_size).min(y_size).max(1)
}

/// Create a chunked, shuffled and compressed 2-D pixel array with its image attributes.
pub(crate) fn create_pixel_array(
    store: &mut dyn ContainerStore,
    path: &str,
    data_type: PhysicalType,
    shape: [u64; 2],
    block_size: u64,
    deflate: u32,
) -> KeaResult<()> {
    let spec = DatasetSpec::numeric(data_type, &shape)
        .with_chunk(&[block_size, block_size])
        .with_shuffle()
        .with_deflate(deflate);
    store.create_dataset(path, spec)?;
    store.set_attribute(path, layout::ATTR_CLASS, json!(layout::IMAGE_CLASS))?;
    store.set_attribute(
        path,
        layout::ATTR_IMAGE_VERSION,
        json!(layout::IMAGE_VERSION),
    )?;
    store.set_attribute(path, layout::ATTR_BLOCK_SIZE, json!(block_size))?;
    Ok(())
}

/// Create a contiguous 1-D array of `T` in its fixed form and write `values` to it.
pub(crate) fn create_array<T: Pixel>(
    store: &mut dyn ContainerStore,
    path: &str,
    values: &[T],
) -> KeaResult<()> {
    let spec = DatasetSpec::numeric(fixed(T::PRIMITIVE), &[values.len() as u64]);
    store.create_dataset(path, spec)?;
    write_array(store, path, values)?;
    Ok(())
}

fn read_header<T: Pixel>(
    store: &dyn ContainerStore,
    path: &str,
    field: &'static str,
    len: usize,
) -> KeaResult<Vec<T>> {
    match read_array::<T>(store, path) {
        Ok(values) if values.len() >= len => Ok(values),
        _ => Err(KeaError::MissingHeaderField(field)),
    }
}
