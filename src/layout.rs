//! Paths of the objects making up a KEA image inside its container.
//!
//! ```text
//! /HEADER/{NUMBANDS,TL,RES,ROT,SIZE,WKT,FILETYPE,GENERATOR,VERSION}
//! /METADATA/<key>
//! /BAND{n}/{DATA,DESCRIPTION,DATATYPE,TYPE,NO_DATA_VALUE,MASK}
//! /BAND{n}/METADATA/<key>
//! /BAND{n}/OVERVIEWS/OVERVIEW{k}
//! /BAND{n}/ATT/{DATA,NEIGHBOURS,HEADER}
//! /BAND{n}/{ATT_CHUNKSIZE,ATT_SIZE}
//! ```

/// Group holding the image header.
pub const HEADER: &str = "/HEADER";
/// Number of bands, `u16`.
pub const HEADER_NUMBANDS: &str = "/HEADER/NUMBANDS";
/// Top-left corner, `f64[2]`.
pub const HEADER_TL: &str = "/HEADER/TL";
/// Pixel resolution, `f32[2]`.
pub const HEADER_RES: &str = "/HEADER/RES";
/// Rotation terms, `f32[2]`.
pub const HEADER_ROT: &str = "/HEADER/ROT";
/// Raster extent in pixels, `u64[2]`.
pub const HEADER_SIZE: &str = "/HEADER/SIZE";
/// Spatial reference string.
pub const HEADER_WKT: &str = "/HEADER/WKT";
/// File type tag.
pub const HEADER_FILETYPE: &str = "/HEADER/FILETYPE";
/// Name of the writing library.
pub const HEADER_GENERATOR: &str = "/HEADER/GENERATOR";
/// Format version tag.
pub const HEADER_VERSION: &str = "/HEADER/VERSION";

/// Image-level metadata group.
pub const METADATA: &str = "/METADATA";

/// Value of [`HEADER_FILETYPE`].
pub const KEA_FILETYPE: &str = "KEA";
/// Value of [`HEADER_VERSION`].
pub const KEA_VERSION: &str = "1.0";
/// Value of [`HEADER_GENERATOR`] written by this crate.
pub const KEA_GENERATOR: &str = "LibKEA";

/// `CLASS` attribute of pixel arrays.
pub const ATTR_CLASS: &str = "CLASS";
/// Value of [`ATTR_CLASS`].
pub const IMAGE_CLASS: &str = "IMAGE";
/// `IMAGE_VERSION` attribute of pixel arrays.
pub const ATTR_IMAGE_VERSION: &str = "IMAGE_VERSION";
/// Value of [`ATTR_IMAGE_VERSION`].
pub const IMAGE_VERSION: &str = "1.2";
/// Chunk edge length attribute of pixel arrays.
pub const ATTR_BLOCK_SIZE: &str = "BLOCK_SIZE";

/// Number of elements in the attribute table size vector.
pub const ATT_SIZE_LEN: usize = 5;

/// `/BAND{n}`
pub fn band(band: u32) -> String {
    format!("/BAND{band}")
}

/// `/BAND{n}/DATA`
pub fn band_data(band: u32) -> String {
    format!("/BAND{band}/DATA")
}

/// `/BAND{n}/DESCRIPTION`
pub fn band_description(band: u32) -> String {
    format!("/BAND{band}/DESCRIPTION")
}

/// `/BAND{n}/DATATYPE`
pub fn band_data_type(band: u32) -> String {
    format!("/BAND{band}/DATATYPE")
}

/// `/BAND{n}/TYPE`
pub fn band_layer_type(band: u32) -> String {
    format!("/BAND{band}/TYPE")
}

/// `/BAND{n}/NO_DATA_VALUE`
pub fn band_no_data(band: u32) -> String {
    format!("/BAND{band}/NO_DATA_VALUE")
}

/// `/BAND{n}/MASK`
pub fn band_mask(band: u32) -> String {
    format!("/BAND{band}/MASK")
}

/// `/BAND{n}/METADATA`
pub fn band_metadata(band: u32) -> String {
    format!("/BAND{band}/METADATA")
}

/// `/BAND{n}/OVERVIEWS`
pub fn band_overviews(band: u32) -> String {
    format!("/BAND{band}/OVERVIEWS")
}

/// `/BAND{n}/OVERVIEWS/OVERVIEW{k}`
pub fn band_overview(band: u32, overview: u32) -> String {
    format!("/BAND{band}/OVERVIEWS/OVERVIEW{overview}")
}

/// `/BAND{n}/ATT`
pub fn band_att(band: u32) -> String {
    format!("/BAND{band}/ATT")
}

/// `/BAND{n}/ATT/DATA`
pub fn band_att_data(band: u32) -> String {
    format!("/BAND{band}/ATT/DATA")
}

/// `/BAND{n}/ATT/NEIGHBOURS`
pub fn band_att_neighbours(band: u32) -> String {
    format!("/BAND{band}/ATT/NEIGHBOURS")
}

/// `/BAND{n}/ATT/HEADER`
pub fn band_att_header(band: u32) -> String {
    format!("/BAND{band}/ATT/HEADER")
}

/// `/BAND{n}/ATT_CHUNKSIZE`
pub fn band_att_chunk_size(band: u32) -> String {
    format!("/BAND{band}/ATT_CHUNKSIZE")
}

/// `/BAND{n}/ATT_SIZE`
pub fn band_att_size(band: u32) -> String {
    format!("/BAND{band}/ATT_SIZE")
}

/// Leaf holding `key` inside the metadata group `scope`.
pub fn metadata_key(scope: &str, key: &str) -> String {
    format!("{scope}/{key}")
}
