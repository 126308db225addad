/// Integration tests on KEA images written to disk.
use std::path::Path;

use kea::layout;
use kea::{
    Block, DataType, ImageDefinition, KeaConfig, KeaError, KeaImageIO, OpenMode, PixelBuffer,
    SpatialInfo,
};

mod util;

fn write_closed_image(path: &Path) {
    util::create_image(path, DataType::UInt8, 4, 4, 1, 4)
        .close()
        .unwrap();
}

macro_rules! round_trip {
    ($name:ident, $ty:ty, $data_type:expr) => {
        #[test]
        fn $name() {
            let (_dir, path) = util::scratch();
            let mut image = util::create_image(&path, $data_type, 20, 10, 1, 8);
            let data: Vec<$ty> = (0..200).map(|i| (i % 100) as $ty).collect();
            image
                .write_image_block(1, &Block::new(0, 0, 20, 10), &data)
                .unwrap();
            image.close().unwrap();

            let image = KeaImageIO::open(&path, OpenMode::ReadOnly, KeaConfig::default()).unwrap();
            assert_eq!(image.band_data_type(1).unwrap(), $data_type);
            let mut out = vec![<$ty>::default(); 200];
            image
                .read_image_block(1, &Block::new(0, 0, 20, 10), &mut out)
                .unwrap();
            assert_eq!(out, data);
        }
    };
}

round_trip!(round_trip_u8, u8, DataType::UInt8);
round_trip!(round_trip_u16, u16, DataType::UInt16);
round_trip!(round_trip_u32, u32, DataType::UInt32);
round_trip!(round_trip_u64, u64, DataType::UInt64);
round_trip!(round_trip_i8, i8, DataType::Int8);
round_trip!(round_trip_i16, i16, DataType::Int16);
round_trip!(round_trip_i32, i32, DataType::Int32);
round_trip!(round_trip_i64, i64, DataType::Int64);
round_trip!(round_trip_f32, f32, DataType::Float32);
round_trip!(round_trip_f64, f64, DataType::Float64);

#[test]
fn column_index_block() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::Float32, 1000, 2000, 3, 256);
    let block = Block::new(0, 0, 100, 200);
    let data: Vec<f32> = (0..200 * 100).map(|k| (k % 100) as f32).collect();
    image.write_image_block(1, &block, &data).unwrap();

    let mut out = vec![-1f32; 200 * 100];
    image.read_image_block(1, &block, &mut out).unwrap();
    for i in 0..200 {
        for j in 0..100 {
            assert_eq!(out[i * 100 + j], j as f32);
        }
    }

    // other bands are untouched
    image.read_image_block(2, &block, &mut out).unwrap();
    assert!(out.iter().all(|&v| v == 0.0));
}

#[test]
fn clipped_edge_block() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::UInt16, 10, 10, 1, 4);
    let sentinel = 999u16;
    let mut buffer = [sentinel; 16];
    buffer[0] = 1;
    buffer[1] = 2;
    buffer[4] = 3;
    buffer[5] = 4;
    let clipped = Block::new(8, 8, 2, 2).with_buffer(4, 4);
    image.write_image_block(1, &clipped, &buffer).unwrap();

    let mut all = [0u16; 100];
    image
        .read_image_block(1, &Block::new(0, 0, 10, 10), &mut all)
        .unwrap();
    assert_eq!(all.iter().filter(|&&v| v != 0).count(), 4);
    assert_eq!((all[88], all[89], all[98], all[99]), (1, 2, 3, 4));

    let mut out = [0xaaaau16; 16];
    image.read_image_block(1, &clipped, &mut out).unwrap();
    for (i, value) in out.iter().enumerate() {
        match i {
            0 => assert_eq!(*value, 1),
            1 => assert_eq!(*value, 2),
            4 => assert_eq!(*value, 3),
            5 => assert_eq!(*value, 4),
            _ => assert_eq!(*value, 0xaaaa),
        }
    }
}

#[test]
fn block_errors() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::UInt8, 10, 10, 2, 4);
    let block = Block::new(0, 0, 2, 2);
    let data = [0u8; 4];

    assert!(matches!(
        image.write_image_block(0, &block, &data),
        Err(KeaError::InvalidBandIndex)
    ));
    assert!(matches!(
        image.write_image_block(3, &block, &data),
        Err(KeaError::BandNotFound {
            band: 3,
            num_bands: 2
        })
    ));
    assert!(matches!(
        image.write_image_block(1, &Block::new(9, 0, 2, 2), &data),
        Err(KeaError::OutOfBounds(_))
    ));
    assert!(matches!(
        image.write_image_block(1, &Block::new(0, 11, 0, 0), &data),
        Err(KeaError::OutOfBounds(_))
    ));
    assert!(matches!(
        image.write_image_block(1, &block, &data[..3]),
        Err(KeaError::BufferTooSmall {
            expected: 4,
            actual: 3
        })
    ));
    assert!(matches!(
        image.write_image_block_raw(1, &block, &data, DataType::Undefined),
        Err(KeaError::UnsupportedType(0))
    ));
}

#[test]
fn raw_and_native_reads() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::Int16, 4, 4, 1, 4);
    let values = [-3i16, 7, 1000, -32000];
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    let block = Block::new(1, 1, 2, 2);
    image
        .write_image_block_raw(1, &block, &bytes, DataType::Int16)
        .unwrap();

    match image.read_image_block_native(1, &block).unwrap() {
        PixelBuffer::I16(read) => assert_eq!(read, values),
        other => panic!("unexpected buffer {other:?}"),
    }

    let mut as_i8 = [0u8; 4];
    image
        .read_image_block_raw(1, &block, &mut as_i8, DataType::Int8)
        .unwrap();
    assert_eq!(as_i8.map(|b| b as i8), [-3, 7, 127, -128]);
}

#[test]
fn header_survives_reopen() {
    let (_dir, path) = util::scratch();
    let spatial = SpatialInfo {
        tl_x: 440720.0,
        tl_y: 3751320.0,
        x_res: 60.0,
        y_res: -60.0,
        wkt: "PROJCS[\"WGS 84 / UTM zone 11N\"]".to_string(),
        ..Default::default()
    };
    let definition = ImageDefinition::new(DataType::UInt8, 30, 20, 2)
        .with_band_descriptions(["Red"])
        .with_spatial_info(spatial.clone());
    let image = KeaImageIO::create(&path, &definition, KeaConfig::default()).unwrap();
    drop(image);

    let mut image = KeaImageIO::open(&path, OpenMode::ReadWrite, KeaConfig::default()).unwrap();
    assert_eq!(image.num_image_bands().unwrap(), 2);
    let info = image.spatial_info().unwrap().clone();
    assert_eq!(info.tl_x, spatial.tl_x);
    assert_eq!(info.y_res, -60.0);
    assert_eq!((info.x_size, info.y_size), (30, 20));
    assert_eq!(info.wkt, spatial.wkt);
    assert_eq!(image.band_description(1).unwrap(), "Red");
    assert_eq!(image.band_description(2).unwrap(), "Band 2");
    assert_eq!(image.image_block_size(1).unwrap(), 20);

    let moved = SpatialInfo {
        tl_x: 0.5,
        ..info
    };
    image.set_spatial_info(&moved).unwrap();
    image.close().unwrap();

    let image = KeaImageIO::open(&path, OpenMode::ReadOnly, KeaConfig::default()).unwrap();
    assert_eq!(image.spatial_info().unwrap().tl_x, 0.5);
    assert_eq!(
        image.spatial_info().unwrap().transform().apply(1.0, 1.0),
        (60.5, 3751260.0)
    );
}

#[test]
fn closed_image() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::Float64, 4, 4, 1, 4);
    assert!(image.is_open());
    image.close().unwrap();
    assert!(!image.is_open());

    let mut out = [0f64; 1];
    assert!(matches!(
        image.read_image_block(1, &Block::new(0, 0, 1, 1), &mut out),
        Err(KeaError::NotOpen)
    ));
    assert!(matches!(
        image.set_image_meta_data("KEY", "VALUE"),
        Err(KeaError::NotOpen)
    ));
    assert!(matches!(image.num_overviews(1), Err(KeaError::NotOpen)));
    assert!(matches!(image.close(), Err(KeaError::NotOpen)));
}

#[test]
fn read_only_rejects_writes() {
    let (_dir, path) = util::scratch();
    write_closed_image(&path);

    let mut image = KeaImageIO::open(&path, OpenMode::ReadOnly, KeaConfig::default()).unwrap();
    assert!(matches!(
        image.write_image_block(1, &Block::new(0, 0, 1, 1), &[1u8]),
        Err(KeaError::IoFailure(_))
    ));
    assert!(matches!(
        image.set_band_meta_data(1, "KEY", "VALUE"),
        Err(KeaError::IoFailure(_))
    ));
    image.close().unwrap();
}

#[test]
fn kea_image_detection() {
    let (dir, path) = util::scratch();
    assert!(!KeaImageIO::is_kea_image(&path));

    write_closed_image(&path);
    assert!(KeaImageIO::is_kea_image(&path));

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "not a raster").unwrap();
    assert!(!KeaImageIO::is_kea_image(&text));

    let corrupt = dir.path().join("corrupt.kea");
    std::fs::create_dir(&corrupt).unwrap();
    std::fs::write(corrupt.join("zarr.json"), "{\"node_type\":").unwrap();
    assert!(!KeaImageIO::is_kea_image(&corrupt));

    let other_type = dir.path().join("other_type.kea");
    write_closed_image(&other_type);
    let mut store = KeaImageIO::open_kea_h5_rw(&other_type).unwrap();
    store.write_string(layout::HEADER_FILETYPE, "HDF5").unwrap();
    drop(store);
    assert!(!KeaImageIO::is_kea_image(&other_type));

    let newer = dir.path().join("newer.kea");
    write_closed_image(&newer);
    let mut store = KeaImageIO::open_kea_h5_rw(&newer).unwrap();
    store.write_string(layout::HEADER_VERSION, "2.0").unwrap();
    drop(store);
    assert!(!KeaImageIO::is_kea_image(&newer));

    let unversioned = dir.path().join("unversioned.kea");
    write_closed_image(&unversioned);
    let mut store = KeaImageIO::open_kea_h5_rw(&unversioned).unwrap();
    store.unlink(layout::HEADER_VERSION).unwrap();
    drop(store);
    assert!(!KeaImageIO::is_kea_image(&unversioned));

    assert!(matches!(
        KeaImageIO::open(&text, OpenMode::ReadOnly, KeaConfig::default()),
        Err(KeaError::IoFailure(_))
    ));
    assert!(matches!(
        KeaImageIO::open(&corrupt, OpenMode::ReadOnly, KeaConfig::default()),
        Err(KeaError::IoFailure(_))
    ));
}

#[test]
fn detection_and_open_skip_pixel_chunks() {
    let (_dir, path) = util::scratch();
    let mut image = util::create_image(&path, DataType::UInt8, 8, 8, 1, 4);
    image
        .write_image_block(1, &Block::new(0, 0, 8, 8), &[7u8; 64])
        .unwrap();
    image.close().unwrap();

    std::fs::remove_dir_all(path.join("BAND1").join("DATA").join("c")).unwrap();
    assert!(KeaImageIO::is_kea_image(&path));

    let image = KeaImageIO::open(&path, OpenMode::ReadOnly, KeaConfig::default()).unwrap();
    assert_eq!(image.num_image_bands().unwrap(), 1);
    let mut out = [1u8; 64];
    image
        .read_image_block(1, &Block::new(0, 0, 8, 8), &mut out)
        .unwrap();
    assert_eq!(out, [0u8; 64]);
}

#[test]
fn writes_are_visible_before_close() {
    let (_dir, path) = util::scratch();
    let mut writer = util::create_image(&path, DataType::Int32, 16, 16, 1, 8);
    let block = Block::new(8, 0, 8, 8);
    let data: Vec<i32> = (0..64).map(|v| v * 3 - 50).collect();
    writer.write_image_block(1, &block, &data).unwrap();
    writer.set_image_meta_data("STAGE", "partial").unwrap();

    let reader = KeaImageIO::open(&path, OpenMode::ReadOnly, KeaConfig::default()).unwrap();
    let mut out = vec![0i32; 64];
    reader.read_image_block(1, &block, &mut out).unwrap();
    assert_eq!(out, data);
    assert_eq!(reader.image_meta_data("STAGE").unwrap(), "partial");

    writer.close().unwrap();
}

#[test]
fn oversized_buffer_shape_is_rejected() {
    let (_dir, path) = util::scratch();
    let image = util::create_image(&path, DataType::Float32, 4, 4, 1, 4);
    let block = Block::new(0, 0, 1, 1).with_buffer(u64::MAX / 2, 4);

    let mut out = [0f32; 1];
    assert!(matches!(
        image.read_image_block(1, &block, &mut out),
        Err(KeaError::BufferTooSmall { actual: 4, .. })
    ));
    assert!(matches!(
        image.read_image_block_native(1, &block),
        Err(KeaError::OutOfBounds(_))
    ));
}
