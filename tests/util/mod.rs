use std::path::{Path, PathBuf};

use kea::{DataType, ImageDefinition, KeaConfig, KeaImageIO};
use tempfile::TempDir;

pub(crate) fn scratch() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed creating scratch directory");
    let path = dir.path().join("image.kea");
    (dir, path)
}

pub(crate) fn create_image(
    path: &Path,
    data_type: DataType,
    x_size: u64,
    y_size: u64,
    num_bands: u16,
    block_size: u32,
) -> KeaImageIO {
    let definition = ImageDefinition::new(data_type, x_size, y_size, num_bands);
    let config = KeaConfig::default().with_image_block_size(block_size);
    KeaImageIO::create(path, &definition, config).unwrap()
}
