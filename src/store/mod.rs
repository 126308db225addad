//! Hierarchical chunked-array storage.
//!
//! The image layer talks to storage exclusively through [`ContainerStore`]: groups and datasets
//! addressed by `/`-separated paths, JSON attributes, and dense transfers of a rectangular
//! [`ArraySubset`] of a dataset.
//!
//! [`ZarrContainer`] is the bundled implementation, a Zarr V3 hierarchy held in a directory or in
//! memory.

mod zarr;

use std::fmt::Debug;

use thiserror::Error;
use zarrs::array_subset::ArraySubset;

use crate::conversion::convert;
use crate::data_type::{PhysicalType, Pixel, Primitive};

pub use zarr::ZarrContainer;

/// Errors raised by a storage engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// Nothing exists at the path.
    #[error("Object {0} does not exist")]
    NotFound(String),

    /// An object already exists at the path.
    #[error("Object {0} already exists")]
    AlreadyExists(String),

    /// The path names a dataset where a group is required.
    #[error("Object {0} is not a group")]
    NotAGroup(String),

    /// The path names a group where a dataset is required.
    #[error("Object {0} is not a dataset")]
    NotADataset(String),

    /// The attribute is not attached to the object.
    #[error("Attribute {name} not found on {path}")]
    AttributeNotFound {
        /// Object path.
        path: String,
        /// Attribute name.
        name: String,
    },

    /// The container was opened read-only.
    #[error("Container is read-only")]
    ReadOnly,

    /// A region does not fit its dataset or the memory buffer.
    #[error("Invalid selection: {0}")]
    Selection(String),

    /// The dataset's elements cannot be transferred this way.
    #[error("Type mismatch on {path}: {message}")]
    TypeMismatch {
        /// Dataset path.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// Dataset creation parameters are inconsistent.
    #[error("Invalid dataset definition for {path}: {message}")]
    InvalidDefinition {
        /// Dataset path.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// The location does not hold a container.
    #[error("Not a container: {0}")]
    NotAContainer(String),

    /// Failure reported by the zarrs crate.
    #[error("Zarr error: {0}")]
    Zarr(String),

    /// IO Error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// Storage-level result type.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// How a container is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Mutations are rejected.
    ReadOnly,
    /// Mutations are allowed.
    ReadWrite,
}

/// Creation parameters for a numeric dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    pub(crate) primitive: Primitive,
    pub(crate) shape: Vec<u64>,
    pub(crate) chunk: Option<Vec<u64>>,
    pub(crate) shuffle: bool,
    pub(crate) deflate: Option<u32>,
    pub(crate) fill: Option<Vec<u8>>,
}

impl DatasetSpec {
    /// A dataset of `shape` holding `ty` numbers, zero filled and stored as a single chunk.
    pub fn numeric(ty: PhysicalType, shape: &[u64]) -> Self {
        Self {
            primitive: ty.primitive,
            shape: shape.to_vec(),
            chunk: None,
            shuffle: false,
            deflate: None,
            fill: None,
        }
    }

    /// Store the dataset in chunks of `chunk` elements per dimension.
    pub fn with_chunk(mut self, chunk: &[u64]) -> Self {
        self.chunk = Some(chunk.to_vec());
        self
    }

    /// Byte-shuffle chunks before compression.
    pub fn with_shuffle(mut self) -> Self {
        self.shuffle = true;
        self
    }

    /// Compress chunks with zlib at `level` (0-9).
    pub fn with_deflate(mut self, level: u32) -> Self {
        self.deflate = Some(level.min(9));
        self
    }

    /// Value read back from regions that were never written.
    pub fn with_fill_value<T: Pixel>(mut self, value: T) -> Self {
        let ty = PhysicalType::native(self.primitive);
        let mut fill = vec![0u8; ty.size()];
        convert(T::as_ne_bytes(&[value]), T::native_type(), &mut fill, ty);
        self.fill = Some(fill);
        self
    }

    /// Number representation of the elements.
    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// Extent per dimension.
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Chunk shape: the requested one, or the whole extent with empty dimensions widened to 1.
    pub(crate) fn chunk_shape(&self) -> Vec<u64> {
        match &self.chunk {
            Some(chunk) => chunk.clone(),
            None => self.shape.iter().map(|&d| d.max(1)).collect(),
        }
    }
}

/// Capabilities the image layer requires from a storage engine.
///
/// Paths are `/`-separated; a leading `/` is optional. Creating an object requires its parent
/// group to exist. Regions are row-major and memory buffers hold exactly the region's elements.
pub trait ContainerStore: Debug + Send {
    /// Whether any object exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Whether a group exists at `path`.
    fn is_group(&self, path: &str) -> bool;

    /// Create an empty group.
    fn create_group(&mut self, path: &str) -> StoreResult<()>;

    /// Create a numeric dataset.
    fn create_dataset(&mut self, path: &str, spec: DatasetSpec) -> StoreResult<()>;

    /// Remove the object at `path`, and everything below it.
    fn unlink(&mut self, path: &str) -> StoreResult<()>;

    /// Names of the direct children of the group at `path`, in byte-wise order.
    fn child_names(&self, path: &str) -> StoreResult<Vec<String>>;

    /// Extent of the dataset at `path`.
    fn dataset_shape(&self, path: &str) -> StoreResult<Vec<u64>>;

    /// Chunk shape of the dataset at `path`.
    fn dataset_chunk(&self, path: &str) -> StoreResult<Vec<u64>>;

    /// Read `region` of the dataset at `path` into `memory` as `memory_type` elements.
    fn read_region(
        &self,
        path: &str,
        region: &ArraySubset,
        memory_type: PhysicalType,
        memory: &mut [u8],
    ) -> StoreResult<()>;

    /// Write `memory`, holding `memory_type` elements, into `region` of the dataset at `path`.
    fn write_region(
        &mut self,
        path: &str,
        region: &ArraySubset,
        memory_type: PhysicalType,
        memory: &[u8],
    ) -> StoreResult<()>;

    /// Read the string leaf at `path`.
    fn read_string(&self, path: &str) -> StoreResult<String>;

    /// Replace the string leaf at `path`, creating it if absent.
    fn write_string(&mut self, path: &str, value: &str) -> StoreResult<()>;

    /// Attach or replace an attribute.
    fn set_attribute(
        &mut self,
        path: &str,
        name: &str,
        value: serde_json::Value,
    ) -> StoreResult<()>;

    /// Read an attribute.
    fn attribute(&self, path: &str, name: &str) -> StoreResult<serde_json::Value>;

    /// Persist pending changes.
    fn flush(&mut self) -> StoreResult<()>;

    /// Whether mutations are permitted.
    fn is_writable(&self) -> bool;
}

/// Read a whole numeric dataset as `T`.
pub fn read_array<T: Pixel>(store: &dyn ContainerStore, path: &str) -> StoreResult<Vec<T>> {
    let shape = store.dataset_shape(path)?;
    let len = usize::try_from(shape.iter().product::<u64>())
        .map_err(|_| StoreError::Selection(format!("{path} is too large to read whole")))?;
    let mut values = vec![T::default(); len];
    store.read_region(
        path,
        &ArraySubset::new_with_shape(shape),
        T::native_type(),
        T::as_ne_mut_bytes(&mut values),
    )?;
    Ok(values)
}

/// Overwrite a whole numeric dataset with `values`.
pub fn write_array<T: Pixel>(
    store: &mut dyn ContainerStore,
    path: &str,
    values: &[T],
) -> StoreResult<()> {
    let shape = store.dataset_shape(path)?;
    store.write_region(
        path,
        &ArraySubset::new_with_shape(shape),
        T::native_type(),
        T::as_ne_bytes(values),
    )
}
