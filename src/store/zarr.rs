//! The bundled storage engine: a Zarr V3 hierarchy.
//!
//! Groups and datasets are Zarr groups and arrays; every array is chunked and pixel arrays carry
//! a Blosc codec running byte-shuffle and zlib. String leaves are one-dimensional `uint8` arrays
//! marked with an `ENCODING` attribute. Every write goes straight to the backing store, so
//! [`ContainerStore::flush`] has nothing left to do.

use std::fmt::{self, Debug, Display};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::codec::BytesToBytesCodecTraits;
use zarrs::array::{Array, ArrayBuilder, ChunkGrid, DataType as ZarrDataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::group::{Group, GroupBuilder};
use zarrs::storage::store::MemoryStore;
use zarrs::storage::{
    ListableStorageTraits, ReadableStorageTraits, ReadableWritableListableStorage,
    ReadableWritableListableStorageTraits, StoreKey, StorePrefix, WritableStorageTraits,
};
use zarrs_filesystem::FilesystemStore;

use crate::conversion::convert;
use crate::data_type::{PhysicalType, Pixel, Primitive};
use crate::store::{ContainerStore, DatasetSpec, OpenMode, StoreError, StoreResult};

type Storage = dyn ReadableWritableListableStorageTraits;

const ZARR_JSON: &str = "zarr.json";
const TEXT_ENCODING: &str = "ENCODING";
const UTF8: &str = "UTF-8";

/// Run `$body` with `$ty` bound to the Rust type of `$primitive`.
macro_rules! with_primitive {
    ($primitive:expr, $ty:ident => $body:block) => {
        match $primitive {
            Primitive::I8 => {
                type $ty = i8;
                $body
            }
            Primitive::I16 => {
                type $ty = i16;
                $body
            }
            Primitive::I32 => {
                type $ty = i32;
                $body
            }
            Primitive::I64 => {
                type $ty = i64;
                $body
            }
            Primitive::U8 => {
                type $ty = u8;
                $body
            }
            Primitive::U16 => {
                type $ty = u16;
                $body
            }
            Primitive::U32 => {
                type $ty = u32;
                $body
            }
            Primitive::U64 => {
                type $ty = u64;
                $body
            }
            Primitive::F32 => {
                type $ty = f32;
                $body
            }
            Primitive::F64 => {
                type $ty = f64;
                $body
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Group,
    Array,
}

/// A Zarr V3 hierarchy in a directory or in memory.
pub struct ZarrContainer {
    storage: ReadableWritableListableStorage,
    location: String,
    mode: OpenMode,
}

impl Debug for ZarrContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZarrContainer")
            .field("location", &self.location)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn zarr<E: Display>(err: E) -> StoreError {
    StoreError::Zarr(err.to_string())
}

/// `path` as a zarrs node path: a leading `/` and no trailing one.
fn node_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

fn meta_key(path: &str) -> StoreResult<StoreKey> {
    let relative = path.trim_matches('/');
    let key = if relative.is_empty() {
        ZARR_JSON.to_string()
    } else {
        format!("{relative}/{ZARR_JSON}")
    };
    StoreKey::new(key).map_err(zarr)
}

fn node_prefix(path: &str) -> StoreResult<StorePrefix> {
    let relative = path.trim_matches('/');
    if relative.is_empty() {
        Ok(StorePrefix::root())
    } else {
        StorePrefix::new(format!("{relative}/")).map_err(zarr)
    }
}

/// The parent group path of `path`; `None` for the root.
fn parent_path(path: &str) -> Option<String> {
    let relative = path.trim_matches('/');
    if relative.is_empty() {
        return None;
    }
    match relative.rsplit_once('/') {
        Some((parent, _)) => Some(format!("/{parent}")),
        None => Some("/".to_string()),
    }
}

fn zarr_data_type(primitive: Primitive) -> ZarrDataType {
    match primitive {
        Primitive::I8 => ZarrDataType::Int8,
        Primitive::I16 => ZarrDataType::Int16,
        Primitive::I32 => ZarrDataType::Int32,
        Primitive::I64 => ZarrDataType::Int64,
        Primitive::U8 => ZarrDataType::UInt8,
        Primitive::U16 => ZarrDataType::UInt16,
        Primitive::U32 => ZarrDataType::UInt32,
        Primitive::U64 => ZarrDataType::UInt64,
        Primitive::F32 => ZarrDataType::Float32,
        Primitive::F64 => ZarrDataType::Float64,
    }
}

fn primitive_of(data_type: &ZarrDataType, path: &str) -> StoreResult<Primitive> {
    Ok(match data_type {
        ZarrDataType::Int8 => Primitive::I8,
        ZarrDataType::Int16 => Primitive::I16,
        ZarrDataType::Int32 => Primitive::I32,
        ZarrDataType::Int64 => Primitive::I64,
        ZarrDataType::UInt8 => Primitive::U8,
        ZarrDataType::UInt16 => Primitive::U16,
        ZarrDataType::UInt32 => Primitive::U32,
        ZarrDataType::UInt64 => Primitive::U64,
        ZarrDataType::Float32 => Primitive::F32,
        ZarrDataType::Float64 => Primitive::F64,
        other => {
            return Err(StoreError::TypeMismatch {
                path: path.to_string(),
                message: format!("unsupported element type {other:?}"),
            })
        }
    })
}

/// Blosc running zlib at the spec's level, shuffling elements when requested.
fn compression_codec(spec: &DatasetSpec) -> StoreResult<Arc<dyn BytesToBytesCodecTraits>> {
    let level = spec.deflate.unwrap_or(0).min(9) as u8;
    let level = BloscCompressionLevel::try_from(level)
        .map_err(|_| StoreError::Zarr(format!("invalid compression level {level}")))?;
    let (shuffle, typesize) = if spec.shuffle {
        (BloscShuffleMode::Shuffle, Some(spec.primitive.size()))
    } else {
        (BloscShuffleMode::NoShuffle, None)
    };
    let codec = BloscCodec::new(BloscCompressor::Zlib, level, None, shuffle, typesize)
        .map_err(zarr)?;
    Ok(Arc::new(codec))
}

/// Validate `region` against a dataset of `shape` and a memory buffer of `memory_len` bytes.
fn check_region(
    path: &str,
    shape: &[u64],
    region: &ArraySubset,
    memory_type: PhysicalType,
    memory_len: usize,
) -> StoreResult<()> {
    if region.dimensionality() != shape.len() {
        return Err(StoreError::Selection(format!(
            "region has {} dimensions, {path} has {}",
            region.dimensionality(),
            shape.len()
        )));
    }
    for ((&start, &len), &extent) in region.start().iter().zip(region.shape()).zip(shape) {
        if start.checked_add(len).map_or(true, |end| end > extent) {
            return Err(StoreError::Selection(format!(
                "region {:?} of shape {:?} exceeds {path} of shape {shape:?}",
                region.start(),
                region.shape()
            )));
        }
    }
    let needed = usize::try_from(region.num_elements())
        .ok()
        .and_then(|elements| elements.checked_mul(memory_type.size()));
    if needed != Some(memory_len) {
        return Err(StoreError::Selection(format!(
            "memory buffer holds {memory_len} bytes, region of shape {:?} needs {needed:?}",
            region.shape()
        )));
    }
    Ok(())
}

impl ZarrContainer {
    fn with_storage(
        storage: ReadableWritableListableStorage,
        location: String,
        mode: OpenMode,
    ) -> Self {
        Self {
            storage,
            location,
            mode,
        }
    }

    fn init_root(&self) -> StoreResult<()> {
        GroupBuilder::new()
            .build(self.storage.clone(), "/")
            .map_err(zarr)?
            .store_metadata()
            .map_err(zarr)
    }

    /// A writable container that lives in memory only.
    pub fn in_memory() -> StoreResult<Self> {
        let storage: ReadableWritableListableStorage = Arc::new(MemoryStore::new());
        let container = Self::with_storage(storage, "memory".to_string(), OpenMode::ReadWrite);
        container.init_root()?;
        Ok(container)
    }

    /// Create an empty container in the directory `path`.
    ///
    /// An existing container or file at `path` is replaced. A directory holding anything else is
    /// left alone and reported as [`StoreError::AlreadyExists`].
    pub fn create(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if path.is_file() {
            std::fs::remove_file(path)?;
        } else if Self::is_container(path) {
            std::fs::remove_dir_all(path)?;
        } else if path.is_dir() && std::fs::read_dir(path)?.next().is_some() {
            return Err(StoreError::AlreadyExists(path.display().to_string()));
        }
        std::fs::create_dir_all(path)?;

        let storage: ReadableWritableListableStorage =
            Arc::new(FilesystemStore::new(path).map_err(zarr)?);
        let container =
            Self::with_storage(storage, path.display().to_string(), OpenMode::ReadWrite);
        container.init_root()?;
        debug!(path = %path.display(), "created container");
        Ok(container)
    }

    /// Open the container in the directory `path`.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> StoreResult<Self> {
        let path = path.as_ref();
        if !Self::is_container(path) {
            return Err(StoreError::NotAContainer(path.display().to_string()));
        }
        let storage: ReadableWritableListableStorage =
            Arc::new(FilesystemStore::new(path).map_err(zarr)?);
        let container = Self::with_storage(storage, path.display().to_string(), mode);
        if container.node_kind("/")? != Some(NodeKind::Group) {
            return Err(StoreError::NotAContainer(path.display().to_string()));
        }
        debug!(path = %path.display(), ?mode, "opened container");
        Ok(container)
    }

    /// Whether `path` is a directory with root node metadata.
    pub fn is_container(path: impl AsRef<Path>) -> bool {
        path.as_ref().join(ZARR_JSON).is_file()
    }

    fn check_writable(&self) -> StoreResult<()> {
        match self.mode {
            OpenMode::ReadWrite => Ok(()),
            OpenMode::ReadOnly => Err(StoreError::ReadOnly),
        }
    }

    fn node_kind(&self, path: &str) -> StoreResult<Option<NodeKind>> {
        let Some(metadata) = self.storage.get(&meta_key(path)?).map_err(zarr)? else {
            return Ok(None);
        };
        let metadata: serde_json::Value = serde_json::from_slice(&metadata)
            .map_err(|err| StoreError::NotAContainer(format!("{path}: {err}")))?;
        match metadata.get("node_type").and_then(|kind| kind.as_str()) {
            Some("group") => Ok(Some(NodeKind::Group)),
            Some("array") => Ok(Some(NodeKind::Array)),
            _ => Err(StoreError::NotAContainer(format!(
                "{path} has no recognised node type"
            ))),
        }
    }

    fn open_array(&self, path: &str) -> StoreResult<Array<Storage>> {
        match self.node_kind(path)? {
            Some(NodeKind::Array) => {
                Array::open(self.storage.clone(), &node_path(path)).map_err(zarr)
            }
            Some(NodeKind::Group) => Err(StoreError::NotADataset(path.to_string())),
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    fn open_group(&self, path: &str) -> StoreResult<Group<Storage>> {
        match self.node_kind(path)? {
            Some(NodeKind::Group) => {
                Group::open(self.storage.clone(), &node_path(path)).map_err(zarr)
            }
            Some(NodeKind::Array) => Err(StoreError::NotAGroup(path.to_string())),
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    /// Check that a new object may be created at `path`.
    fn check_new(&self, path: &str) -> StoreResult<()> {
        self.check_writable()?;
        let Some(parent) = parent_path(path) else {
            return Err(StoreError::AlreadyExists(path.to_string()));
        };
        match self.node_kind(&parent)? {
            Some(NodeKind::Group) => {}
            Some(NodeKind::Array) => return Err(StoreError::NotAGroup(parent)),
            None => return Err(StoreError::NotFound(parent)),
        }
        if self.node_kind(path)?.is_some() {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        Ok(())
    }

    fn build_array(
        &self,
        path: &str,
        spec: &DatasetSpec,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> StoreResult<Array<Storage>> {
        let invalid = |message: String| StoreError::InvalidDefinition {
            path: path.to_string(),
            message,
        };
        let chunk = spec.chunk_shape();
        if chunk.len() != spec.shape.len() {
            return Err(invalid(format!(
                "chunk {chunk:?} does not match shape {:?}",
                spec.shape
            )));
        }
        let chunk_grid: ChunkGrid = chunk
            .try_into()
            .map_err(|err| invalid(format!("{err:?}")))?;
        let fill = spec
            .fill
            .clone()
            .unwrap_or_else(|| vec![0; spec.primitive.size()]);

        let mut builder = ArrayBuilder::new(
            spec.shape.clone(),
            zarr_data_type(spec.primitive),
            chunk_grid,
            FillValue::new(fill),
        );
        builder.attributes(attributes);
        if spec.shuffle || spec.deflate.is_some() {
            builder.bytes_to_bytes_codecs(vec![compression_codec(spec)?]);
        }
        let array = builder
            .build(self.storage.clone(), &node_path(path))
            .map_err(zarr)?;
        array.store_metadata().map_err(zarr)?;
        Ok(array)
    }
}

impl ContainerStore for ZarrContainer {
    fn exists(&self, path: &str) -> bool {
        matches!(self.node_kind(path), Ok(Some(_)))
    }

    fn is_group(&self, path: &str) -> bool {
        matches!(self.node_kind(path), Ok(Some(NodeKind::Group)))
    }

    fn create_group(&mut self, path: &str) -> StoreResult<()> {
        self.check_new(path)?;
        GroupBuilder::new()
            .build(self.storage.clone(), &node_path(path))
            .map_err(zarr)?
            .store_metadata()
            .map_err(zarr)
    }

    fn create_dataset(&mut self, path: &str, spec: DatasetSpec) -> StoreResult<()> {
        self.check_new(path)?;
        self.build_array(path, &spec, serde_json::Map::new())?;
        Ok(())
    }

    fn unlink(&mut self, path: &str) -> StoreResult<()> {
        self.check_writable()?;
        if parent_path(path).is_none() {
            return Err(StoreError::InvalidDefinition {
                path: path.to_string(),
                message: "the root group cannot be removed".into(),
            });
        }
        if self.node_kind(path)?.is_none() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        self.storage
            .erase_prefix(&node_prefix(path)?)
            .map_err(zarr)?;
        Ok(())
    }

    fn child_names(&self, path: &str) -> StoreResult<Vec<String>> {
        self.open_group(path)?;
        let listing = self.storage.list_dir(&node_prefix(path)?).map_err(zarr)?;
        let parent = node_path(path);
        let mut names = Vec::new();
        for prefix in listing.prefixes() {
            let name = prefix
                .as_str()
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default();
            let child = format!("{}/{name}", parent.trim_end_matches('/'));
            if self.node_kind(&child)?.is_some() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn dataset_shape(&self, path: &str) -> StoreResult<Vec<u64>> {
        Ok(self.open_array(path)?.shape().to_vec())
    }

    fn dataset_chunk(&self, path: &str) -> StoreResult<Vec<u64>> {
        let array = self.open_array(path)?;
        let origin = vec![0u64; array.dimensionality()];
        let chunk = array
            .chunk_grid()
            .chunk_shape(&origin, array.shape())
            .map_err(zarr)?
            .ok_or_else(|| StoreError::Zarr(format!("{path} has no chunk at the origin")))?;
        Ok((0..origin.len()).map(|i| chunk[i].get()).collect())
    }

    fn read_region(
        &self,
        path: &str,
        region: &ArraySubset,
        memory_type: PhysicalType,
        memory: &mut [u8],
    ) -> StoreResult<()> {
        let array = self.open_array(path)?;
        let primitive = primitive_of(array.data_type(), path)?;
        check_region(path, array.shape(), region, memory_type, memory.len())?;
        if region.num_elements() == 0 {
            return Ok(());
        }
        with_primitive!(primitive, T => {
            let values: Vec<T> = array.retrieve_array_subset_elements(region).map_err(zarr)?;
            convert(
                T::as_ne_bytes(&values),
                PhysicalType::native(primitive),
                memory,
                memory_type,
            );
        });
        Ok(())
    }

    fn write_region(
        &mut self,
        path: &str,
        region: &ArraySubset,
        memory_type: PhysicalType,
        memory: &[u8],
    ) -> StoreResult<()> {
        self.check_writable()?;
        let array = self.open_array(path)?;
        let primitive = primitive_of(array.data_type(), path)?;
        check_region(path, array.shape(), region, memory_type, memory.len())?;
        let elements = memory.len() / memory_type.size();
        if elements == 0 {
            return Ok(());
        }
        with_primitive!(primitive, T => {
            let mut values = vec![T::default(); elements];
            convert(
                memory,
                memory_type,
                T::as_ne_mut_bytes(&mut values),
                PhysicalType::native(primitive),
            );
            array
                .store_array_subset_elements(region, &values)
                .map_err(zarr)?;
        });
        Ok(())
    }

    fn read_string(&self, path: &str) -> StoreResult<String> {
        let array = self.open_array(path)?;
        let encoding = array
            .attributes()
            .get(TEXT_ENCODING)
            .and_then(|encoding| encoding.as_str());
        if encoding != Some(UTF8) {
            return Err(StoreError::TypeMismatch {
                path: path.to_string(),
                message: "not a string leaf".into(),
            });
        }
        let len = array.shape().first().copied().unwrap_or_default();
        if len == 0 {
            return Ok(String::new());
        }
        let bytes: Vec<u8> = array
            .retrieve_array_subset_elements(&ArraySubset::new_with_shape(vec![len]))
            .map_err(zarr)?;
        String::from_utf8(bytes).map_err(|err| StoreError::TypeMismatch {
            path: path.to_string(),
            message: err.to_string(),
        })
    }

    fn write_string(&mut self, path: &str, value: &str) -> StoreResult<()> {
        match self.node_kind(path)? {
            Some(NodeKind::Array) => {
                self.read_string(path)?;
                self.unlink(path)?;
            }
            Some(NodeKind::Group) => return Err(StoreError::NotADataset(path.to_string())),
            None => {}
        }
        self.check_new(path)?;

        let len = value.len() as u64;
        let spec = DatasetSpec::numeric(PhysicalType::fixed(Primitive::U8), &[len]);
        let mut attributes = serde_json::Map::new();
        attributes.insert(TEXT_ENCODING.to_string(), serde_json::json!(UTF8));
        let array = self.build_array(path, &spec, attributes)?;
        if len > 0 {
            array
                .store_array_subset_elements(
                    &ArraySubset::new_with_shape(vec![len]),
                    value.as_bytes(),
                )
                .map_err(zarr)?;
        }
        Ok(())
    }

    fn set_attribute(
        &mut self,
        path: &str,
        name: &str,
        value: serde_json::Value,
    ) -> StoreResult<()> {
        self.check_writable()?;
        match self.node_kind(path)? {
            Some(NodeKind::Array) => {
                let mut array = self.open_array(path)?;
                array.attributes_mut().insert(name.to_string(), value);
                array.store_metadata().map_err(zarr)
            }
            Some(NodeKind::Group) => {
                let mut group = self.open_group(path)?;
                group.attributes_mut().insert(name.to_string(), value);
                group.store_metadata().map_err(zarr)
            }
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    fn attribute(&self, path: &str, name: &str) -> StoreResult<serde_json::Value> {
        let value = match self.node_kind(path)? {
            Some(NodeKind::Array) => self.open_array(path)?.attributes().get(name).cloned(),
            Some(NodeKind::Group) => self.open_group(path)?.attributes().get(name).cloned(),
            None => return Err(StoreError::NotFound(path.to_string())),
        };
        value.ok_or_else(|| StoreError::AttributeNotFound {
            path: path.to_string(),
            name: name.to_string(),
        })
    }

    fn flush(&mut self) -> StoreResult<()> {
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.mode == OpenMode::ReadWrite
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::{read_array, write_array};

    fn fixed(primitive: Primitive) -> PhysicalType {
        PhysicalType::fixed(primitive)
    }

    #[test]
    fn hierarchy() {
        let mut store = ZarrContainer::in_memory().unwrap();
        store.create_group("/HEADER").unwrap();
        store.create_group("BAND1").unwrap();
        store.create_group("/BAND1/OVERVIEWS/").unwrap();
        store
            .create_dataset("/HEADER/SIZE", DatasetSpec::numeric(fixed(Primitive::U64), &[2]))
            .unwrap();

        assert!(store.exists("/HEADER/SIZE"));
        assert!(store.is_group("/BAND1/OVERVIEWS"));
        assert!(!store.is_group("/HEADER/SIZE"));
        assert_eq!(store.child_names("/").unwrap(), vec!["BAND1", "HEADER"]);
        assert_eq!(store.child_names("/HEADER").unwrap(), vec!["SIZE"]);
        assert!(store.child_names("/BAND1/OVERVIEWS").unwrap().is_empty());

        assert!(matches!(
            store.create_group("/MISSING/CHILD"),
            Err(StoreError::NotFound(parent)) if parent == "/MISSING"
        ));
        assert!(matches!(
            store.create_group("/HEADER"),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            store.create_group("/HEADER/SIZE/CHILD"),
            Err(StoreError::NotAGroup(_))
        ));
        assert!(matches!(
            store.child_names("/HEADER/SIZE"),
            Err(StoreError::NotAGroup(_))
        ));
        assert!(matches!(
            store.dataset_shape("/HEADER"),
            Err(StoreError::NotADataset(_))
        ));

        store.unlink("/HEADER").unwrap();
        assert!(!store.exists("/HEADER/SIZE"));
        assert_eq!(store.child_names("/").unwrap(), vec!["BAND1"]);
        assert!(matches!(store.unlink("/HEADER"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn chunked_regions_convert_and_fill() {
        let mut store = ZarrContainer::in_memory().unwrap();
        let spec = DatasetSpec::numeric(fixed(Primitive::I16), &[5, 7])
            .with_chunk(&[2, 3])
            .with_shuffle()
            .with_deflate(1)
            .with_fill_value(7u8);
        store.create_dataset("/DATA", spec).unwrap();
        assert_eq!(store.dataset_chunk("/DATA").unwrap(), vec![2, 3]);

        let region = ArraySubset::new_with_ranges(&[1..3, 2..6]);
        let values: Vec<f64> = (0..8).map(|v| v as f64 * 1000.0 - 0.5).collect();
        store
            .write_region("/DATA", &region, f64::native_type(), f64::as_ne_bytes(&values))
            .unwrap();

        let all = read_array::<i32>(&store, "/DATA").unwrap();
        assert_eq!(all.len(), 35);
        assert_eq!(all[0], 7);
        assert_eq!(&all[9..13], &[0, 999, 1999, 2999]);
        assert_eq!(&all[16..20], &[3999, 4999, 5999, 6999]);
        assert_eq!(all[34], 7);

        let mut narrow = [0u8; 8];
        store
            .read_region("/DATA", &region, u8::native_type(), &mut narrow)
            .unwrap();
        assert_eq!(narrow, [0, 255, 255, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn regions_are_validated() {
        let mut store = ZarrContainer::in_memory().unwrap();
        store
            .create_dataset("/DATA", DatasetSpec::numeric(fixed(Primitive::U8), &[4, 4]))
            .unwrap();
        let mut out = [0u8; 4];
        let outside = ArraySubset::new_with_ranges(&[3..5, 0..2]);
        assert!(matches!(
            store.read_region("/DATA", &outside, u8::native_type(), &mut out),
            Err(StoreError::Selection(_))
        ));
        let flat = ArraySubset::new_with_ranges(&[0..4]);
        assert!(matches!(
            store.read_region("/DATA", &flat, u8::native_type(), &mut out),
            Err(StoreError::Selection(_))
        ));
        let region = ArraySubset::new_with_ranges(&[0..2, 0..2]);
        assert!(matches!(
            store.write_region("/DATA", &region, u16::native_type(), &out),
            Err(StoreError::Selection(_))
        ));
        let empty = ArraySubset::new_with_ranges(&[4..4, 0..0]);
        store
            .write_region("/DATA", &empty, u8::native_type(), &[])
            .unwrap();
    }

    #[test]
    fn string_leaves() {
        let mut store = ZarrContainer::in_memory().unwrap();
        store.write_string("/WKT", "").unwrap();
        assert_eq!(store.read_string("/WKT").unwrap(), "");
        store.write_string("/WKT", "PROJCS[\"UTM 11N\"]").unwrap();
        assert_eq!(store.read_string("/WKT").unwrap(), "PROJCS[\"UTM 11N\"]");
        store.write_string("/WKT", "LOCAL").unwrap();
        assert_eq!(store.read_string("/WKT").unwrap(), "LOCAL");

        store
            .create_dataset("/TYPE", DatasetSpec::numeric(fixed(Primitive::U8), &[1]))
            .unwrap();
        assert!(matches!(
            store.read_string("/TYPE"),
            Err(StoreError::TypeMismatch { .. })
        ));
        assert!(store.write_string("/TYPE", "text").is_err());
        assert_eq!(read_array::<u8>(&store, "/TYPE").unwrap(), vec![0]);

        store.create_group("/GROUP").unwrap();
        assert!(matches!(
            store.write_string("/GROUP", "text"),
            Err(StoreError::NotADataset(_))
        ));
    }

    #[test]
    fn attributes() {
        let mut store = ZarrContainer::in_memory().unwrap();
        store.create_group("/BAND1").unwrap();
        store
            .create_dataset("/BAND1/DATA", DatasetSpec::numeric(fixed(Primitive::F32), &[2, 2]))
            .unwrap();
        store
            .set_attribute("/BAND1/DATA", "BLOCK_SIZE", serde_json::json!(256))
            .unwrap();
        store
            .set_attribute("/BAND1", "CLASS", serde_json::json!("IMAGE"))
            .unwrap();

        let block_size = store.attribute("/BAND1/DATA", "BLOCK_SIZE").unwrap();
        assert_eq!(block_size.as_u64(), Some(256));
        assert_eq!(
            store.attribute("/BAND1", "CLASS").unwrap().as_str(),
            Some("IMAGE")
        );
        assert!(matches!(
            store.attribute("/BAND1", "MISSING"),
            Err(StoreError::AttributeNotFound { .. })
        ));
        assert!(matches!(
            store.set_attribute("/BAND2", "CLASS", serde_json::json!("IMAGE")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn directory_round_trip_and_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.kea");
        let mut store = ZarrContainer::create(&path).unwrap();
        store
            .create_dataset("/SIZE", DatasetSpec::numeric(fixed(Primitive::U64), &[2]))
            .unwrap();
        write_array(&mut store, "/SIZE", &[30u64, 20]).unwrap();
        store.write_string("/FILETYPE", "KEA").unwrap();
        drop(store);
        assert!(ZarrContainer::is_container(&path));

        let mut store = ZarrContainer::open(&path, OpenMode::ReadOnly).unwrap();
        assert!(!store.is_writable());
        assert_eq!(read_array::<u64>(&store, "/SIZE").unwrap(), vec![30, 20]);
        assert_eq!(store.read_string("/FILETYPE").unwrap(), "KEA");
        assert!(matches!(
            write_array(&mut store, "/SIZE", &[1u64, 1]),
            Err(StoreError::ReadOnly)
        ));
        assert!(matches!(store.unlink("/SIZE"), Err(StoreError::ReadOnly)));
        assert!(matches!(
            store.create_group("/GROUP"),
            Err(StoreError::ReadOnly)
        ));
        store.flush().unwrap();
    }

    #[test]
    fn foreign_locations() {
        let dir = tempfile::tempdir().unwrap();
        let occupied = dir.path().join("occupied");
        std::fs::create_dir(&occupied).unwrap();
        std::fs::write(occupied.join("notes.txt"), "keep me").unwrap();
        assert!(matches!(
            ZarrContainer::create(&occupied),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(occupied.join("notes.txt").is_file());
        assert!(matches!(
            ZarrContainer::open(&occupied, OpenMode::ReadOnly),
            Err(StoreError::NotAContainer(_))
        ));

        let file = dir.path().join("image.kea");
        std::fs::write(&file, "not a container").unwrap();
        ZarrContainer::create(&file).unwrap();
        assert!(ZarrContainer::is_container(&file));
    }
}
