//! Creation parameters.

/// Default edge length of the square pixel chunks of image bands.
pub const DEFAULT_IMAGE_BLOCK_SIZE: u32 = 256;

/// Default number of rows per chunk in attribute tables.
pub const DEFAULT_ATT_BLOCK_SIZE: u32 = 1000;

/// Default zlib level for pixel chunks.
pub const DEFAULT_DEFLATE: u32 = 1;

/// Parameters applied when an image is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeaConfig {
    /// Requested edge length of pixel chunks; clamped to the image extent per band.
    pub image_block_size: u32,
    /// Rows per chunk of attribute tables.
    pub att_block_size: u32,
    /// zlib level for pixel chunks, 0-9.
    pub deflate: u32,
}

impl Default for KeaConfig {
    fn default() -> Self {
        Self {
            image_block_size: DEFAULT_IMAGE_BLOCK_SIZE,
            att_block_size: DEFAULT_ATT_BLOCK_SIZE,
            deflate: DEFAULT_DEFLATE,
        }
    }
}

impl KeaConfig {
    /// Set the pixel chunk edge length.
    pub fn with_image_block_size(mut self, size: u32) -> Self {
        self.image_block_size = size;
        self
    }

    /// Set the attribute table chunk length.
    pub fn with_att_block_size(mut self, size: u32) -> Self {
        self.att_block_size = size;
        self
    }

    /// Set the zlib level, clamped to 9.
    pub fn with_deflate(mut self, level: u32) -> Self {
        self.deflate = level.min(9);
        self
    }
}
