#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod attribute_table;
pub mod band;
pub mod block;
pub(crate) mod bytecast;
pub mod config;
pub mod conversion;
pub mod data_type;
pub mod error;
pub mod image;
pub mod layout;
pub mod metadata;
pub mod overview;
mod pixel_buffer;
pub mod spatial;
pub mod store;

pub use attribute_table::AttributeTable;
pub use band::BandKind;
pub use block::Block;
pub use config::KeaConfig;
pub use data_type::{DataType, LayerType, Pixel};
pub use error::{KeaError, KeaResult};
pub use image::{ImageDefinition, KeaImageIO};
pub use pixel_buffer::PixelBuffer;
pub use spatial::{AffineTransform, SpatialInfo};
pub use store::{OpenMode, ZarrContainer};
