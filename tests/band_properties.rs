/// Integration tests on metadata, overviews and per-band properties persisted to disk.
use kea::data_type::{PhysicalType, Primitive};
use kea::layout;
use kea::store::{read_array, write_array, ContainerStore, DatasetSpec};
use kea::{
    AttributeTable, BandKind, Block, DataType, KeaConfig, KeaError, KeaImageIO, KeaResult,
    LayerType, OpenMode,
};

mod util;

fn reopen(path: &std::path::Path) -> KeaImageIO {
    KeaImageIO::open(path, OpenMode::ReadWrite, KeaConfig::default()).unwrap()
}

#[test]
fn metadata_persists() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::UInt8, 8, 8, 2, 4);
    image.set_image_meta_data("SENSOR", "Landsat 8").unwrap();
    image.set_image_meta_data("SENSOR", "Landsat 9").unwrap();
    image
        .set_band_meta_data_all(1, &[("STATISTICS_MINIMUM", "0"), ("STATISTICS_MAXIMUM", "255")])
        .unwrap();
    image.close().unwrap();

    let image = reopen(&path);
    assert_eq!(image.image_meta_data("SENSOR").unwrap(), "Landsat 9");
    assert_eq!(
        image.image_meta_data_all().unwrap(),
        vec![("SENSOR".to_string(), "Landsat 9".to_string())]
    );
    assert_eq!(
        image.band_meta_data_names(1).unwrap(),
        vec!["STATISTICS_MAXIMUM", "STATISTICS_MINIMUM"]
    );
    assert_eq!(image.band_meta_data(1, "STATISTICS_MAXIMUM").unwrap(), "255");
    assert!(image.band_meta_data_all(2).unwrap().is_empty());
    assert!(matches!(
        image.band_meta_data(2, "STATISTICS_MAXIMUM"),
        Err(KeaError::MetadataKeyNotFound(_))
    ));
}

#[test]
fn overviews_are_independent() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::Float32, 64, 48, 2, 16);
    image.create_overview(1, 1, 16, 12).unwrap();
    image.create_overview(1, 0, 32, 24).unwrap();
    image.create_overview(2, 0, 8, 6).unwrap();

    let level0 = vec![2.5f32; 32 * 24];
    image
        .write_to_overview(1, 0, &Block::new(0, 0, 32, 24), &level0)
        .unwrap();
    let level1 = vec![7.0f32; 16 * 12];
    image
        .write_to_overview(1, 1, &Block::new(0, 0, 16, 12), &level1)
        .unwrap();
    image.close().unwrap();

    let mut image = reopen(&path);
    assert_eq!(image.num_overviews(1).unwrap(), 2);
    assert_eq!(image.num_overviews(2).unwrap(), 1);
    assert_eq!(image.overview_size(1, 1).unwrap(), (16, 12));
    assert_eq!(image.overview_block_size(1, 0).unwrap(), 16);
    assert_eq!(image.overview_block_size(2, 0).unwrap(), 6);

    let mut out = vec![0f32; 32 * 24];
    image
        .read_from_overview(1, 0, &Block::new(0, 0, 32, 24), &mut out)
        .unwrap();
    assert!(out.iter().all(|&v| v == 2.5));

    // clipped read at the overview's own edge
    let mut edge = [-1f32; 16];
    image
        .read_from_overview(1, 1, &Block::new(14, 10, 2, 2).with_buffer(4, 4), &mut edge)
        .unwrap();
    assert_eq!(&edge[..2], &[7.0, 7.0]);
    assert_eq!(&edge[4..6], &[7.0, 7.0]);
    assert_eq!(edge[2], -1.0);
    assert!(matches!(
        image.read_from_overview(1, 1, &Block::new(15, 0, 2, 1), &mut edge),
        Err(KeaError::OutOfBounds(_))
    ));

    image.remove_overview(1, 0).unwrap();
    image.remove_overview(1, 0).unwrap();
    image.remove_overview(2, 9).unwrap();
    assert_eq!(image.num_overviews(1).unwrap(), 1);
    image
        .read_from_overview(1, 1, &Block::new(0, 0, 16, 12), &mut out[..16 * 12])
        .unwrap();
    assert!(out[..16 * 12].iter().all(|&v| v == 7.0));
    assert!(matches!(
        image.remove_overview(3, 0),
        Err(KeaError::BandNotFound { .. })
    ));
}

#[test]
fn no_data_read_as_other_type() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::Float32, 4, 4, 1, 4);
    assert_eq!(image.no_data_value::<f32>(1).unwrap(), None);
    image.set_no_data_value(1, 13i32).unwrap();
    image.close().unwrap();

    let mut image = reopen(&path);
    assert_eq!(image.no_data_value::<f32>(1).unwrap(), Some(13.0));
    assert_eq!(image.no_data_value::<u8>(1).unwrap(), Some(13));
    image.undefine_no_data_value(1).unwrap();
    assert_eq!(image.no_data_value::<f32>(1).unwrap(), None);
}

#[test]
fn band_properties_persist() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::UInt32, 4, 4, 2, 4);
    image.set_band_layer_type(2, LayerType::Thematic).unwrap();
    image.set_band_description(2, "Land cover").unwrap();
    image.create_mask(1).unwrap();
    image
        .write_mask_block(1, &Block::new(0, 0, 2, 1), &[0, 0])
        .unwrap();
    image.close().unwrap();

    let image = reopen(&path);
    assert_eq!(image.band_layer_type(1).unwrap(), LayerType::Continuous);
    assert_eq!(image.band_layer_type(2).unwrap(), LayerType::Thematic);
    assert_eq!(image.band_description(2).unwrap(), "Land cover");
    assert_eq!(image.band_data_type(2).unwrap(), DataType::UInt32);
    assert!(image.mask_created(1).unwrap());
    assert!(!image.mask_created(2).unwrap());

    let mut mask = [0u8; 4];
    image
        .read_mask_block(1, &Block::new(0, 0, 4, 1), &mut mask)
        .unwrap();
    assert_eq!(mask, [0, 0, 255, 255]);
}

/// Class codes stored one per row.
#[derive(Debug, PartialEq)]
struct ClassCodes(Vec<u32>);

impl AttributeTable for ClassCodes {
    fn export_to_kea(
        &self,
        store: &mut dyn ContainerStore,
        band: u32,
        chunk_size: u32,
        _deflate: u32,
    ) -> KeaResult<()> {
        let path = format!("{}/CLASS", layout::band_att_data(band));
        let rows = self.0.len() as u64;
        store
            .create_dataset(
                &path,
                DatasetSpec::numeric(PhysicalType::fixed(Primitive::U32), &[rows]),
            )
            .map_err(|err| KeaError::AttributeTable(err.to_string()))?;
        write_array(store, &path, &self.0)?;
        write_array(store, &layout::band_att_size(band), &[rows, 0, 1, 0, 0])?;
        write_array(
            store,
            &layout::band_att_chunk_size(band),
            &[chunk_size as u64],
        )?;
        Ok(())
    }

    fn import_from_kea(store: &dyn ContainerStore, band: u32) -> KeaResult<Self> {
        let path = format!("{}/CLASS", layout::band_att_data(band));
        Ok(ClassCodes(read_array(store, &path)?))
    }
}

#[test]
fn attribute_table_persists() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::UInt8, 4, 4, 1, 4);
    assert!(!image.attribute_table_present(1).unwrap());
    image
        .set_attribute_table(&ClassCodes(vec![3, 1, 4]), 1, None)
        .unwrap();
    image.close().unwrap();

    let image = reopen(&path);
    assert!(image.attribute_table_present(1).unwrap());
    assert!(!image
        .attribute_table_present_for(1, BandKind::Mask)
        .unwrap());
    assert_eq!(image.attribute_table_chunk_size(1).unwrap(), 1000);
    assert_eq!(
        image.attribute_table::<ClassCodes>(1).unwrap(),
        ClassCodes(vec![3, 1, 4])
    );
}
