//! Plane decoding over direct and sequential compressed payloads.

use std::io::Write;
use std::sync::Arc;

use bioformats::core::{DimensionOrder, Region, SeriesDescriptor};
use bioformats::io::{
    compress, ChannelLayout, Codec, DecoderOptions, DecoderState, FileSource, Location,
    MemorySource, PixelStorage, PlaneDecoder,
};
use bioformats::{Error, PixelType};

const SIZE_X: usize = 6;
const SIZE_Y: usize = 4;

fn series(planes: usize) -> SeriesDescriptor {
    let mut desc = SeriesDescriptor::new(SIZE_X, SIZE_Y)
        .with_zct(planes, 1, 1)
        .with_pixel_type(PixelType::Uint16);
    desc.finalize().unwrap();
    desc
}

/// Deterministic, non-repeating payload.
fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 7) % 251) as u8).collect()
}

fn direct(desc: &SeriesDescriptor, data: &[u8], options: DecoderOptions) -> PlaneDecoder {
    let storage = PixelStorage::Direct {
        source: Box::new(MemorySource::new(data.to_vec())),
        offset: 0,
    };
    PlaneDecoder::new(desc.clone(), storage, options).unwrap()
}

fn compressed(desc: &SeriesDescriptor, data: &[u8], codec: Codec, options: DecoderOptions) -> PlaneDecoder {
    // a few junk bytes ahead of the stream exercise the offset
    let mut bytes = vec![0xAB; 5];
    bytes.extend(compress(codec, data, 6).unwrap());
    let storage = PixelStorage::Compressed {
        location: Location::Memory(Arc::from(bytes)),
        offset: 5,
        codec,
    };
    PlaneDecoder::new(desc.clone(), storage, options).unwrap()
}

#[test]
fn test_cursor_restart_matches_direct() {
    let desc = series(8);
    let data = payload(desc.plane_size() * 8);

    for codec in [Codec::Gzip, Codec::Zlib] {
        let mut reference = direct(&desc, &data, DecoderOptions::default());
        let mut stream = compressed(&desc, &data, codec, DecoderOptions::default());

        for index in [3, 4, 5, 2, 3] {
            let expected = reference.open_plane(index).unwrap();
            let got = stream.open_plane(index).unwrap();
            assert_eq!(got, expected, "{:?} plane {}", codec, index);
            assert_eq!(stream.state(), DecoderState::SequentialCursor { position: index });
        }
        // the first read opens the stream, going back to 2 reopens it
        assert_eq!(stream.stream_opens(), 2);
    }
}

#[test]
fn test_regions_match_direct() {
    let desc = series(4);
    let data = payload(desc.plane_size() * 4);
    let mut reference = direct(&desc, &data, DecoderOptions::default());
    let mut stream = compressed(&desc, &data, Codec::Gzip, DecoderOptions::default());

    let region = Region::new(2, 1, 3, 2);
    for index in [0, 3, 1] {
        let expected = reference.open_plane_region(index, region).unwrap();
        assert_eq!(expected.len(), desc.region_size(3, 2));
        assert_eq!(stream.open_plane_region(index, region).unwrap(), expected);
    }

    // the region really is a crop of the full plane
    let full = reference.open_plane(1).unwrap();
    let crop = reference.open_plane_region(1, region).unwrap();
    let row = SIZE_X * 2;
    assert_eq!(&crop[..6], &full[row + 4..row + 10]);
}

#[test]
fn test_invert_y_applies_after_crop() {
    let desc = series(2);
    let data = payload(desc.plane_size() * 2);
    let options = DecoderOptions {
        invert_y: true,
        ..Default::default()
    };
    let mut upright = direct(&desc, &data, DecoderOptions::default());
    let mut flipped = compressed(&desc, &data, Codec::Gzip, options);

    let region = Region::new(0, 1, SIZE_X, 2);
    let plain = upright.open_plane_region(1, region).unwrap();
    let got = flipped.open_plane_region(1, region).unwrap();
    let row = SIZE_X * 2;
    assert_eq!(&got[..row], &plain[row..]);
    assert_eq!(&got[row..], &plain[..row]);
}

#[test]
fn test_invalid_requests_never_touch_storage() {
    let desc = series(3);
    let data = payload(desc.plane_size() * 3);
    let mut stream = compressed(&desc, &data, Codec::Gzip, DecoderOptions::default());

    assert!(matches!(stream.open_plane(3), Err(Error::OutOfRange { .. })));
    assert!(matches!(
        stream.open_plane_region(0, Region::new(4, 0, 3, 1)),
        Err(Error::InvalidRegion { .. })
    ));
    assert_eq!(stream.state(), DecoderState::Idle);
    assert_eq!(stream.stream_opens(), 0);
}

#[test]
fn test_corrupt_stream_closes_decoder() {
    let desc = series(3);
    let storage = PixelStorage::Compressed {
        location: Location::Memory(Arc::from(vec![0x1fu8, 0x8b, 0x08, 0x00, 0xde, 0xad])),
        offset: 0,
        codec: Codec::Gzip,
    };
    let mut decoder = PlaneDecoder::new(desc, storage, DecoderOptions::default()).unwrap();

    assert!(matches!(
        decoder.open_plane(1),
        Err(Error::Decode { series: 0, plane: 1, .. })
    ));
    assert_eq!(decoder.state(), DecoderState::Closed);
    assert!(matches!(decoder.open_plane(0), Err(Error::DecoderClosed { .. })));
}

#[test]
fn test_interleaved_channels_as_planes() {
    let (x, y, c, z) = (3, 2, 6, 2);
    let mut desc = SeriesDescriptor::new(x, y)
        .with_zct(z, c, 1)
        .with_dimension_order(DimensionOrder::XYCZT);
    desc.finalize().unwrap();

    // record per z: pixel-major, channel-minor
    let mut data = Vec::new();
    for zi in 0..z {
        for p in 0..x * y {
            for ci in 0..c {
                data.push((zi * 100 + ci * 10 + p) as u8);
            }
        }
    }
    let options = DecoderOptions {
        channel_layout: ChannelLayout::Interleaved,
        ..Default::default()
    };
    let mut decoder = compressed(&desc, &data, Codec::Zlib, options);

    for index in [7, 8, 0] {
        let coord = desc.index_to_coord(index).unwrap();
        let plane = decoder.open_plane(index).unwrap();
        let expected: Vec<u8> = (0..x * y)
            .map(|p| (coord.z * 100 + coord.c * 10 + p) as u8)
            .collect();
        assert_eq!(plane, expected, "plane {}", index);
    }
}

#[test]
fn test_mapped_file_source() {
    let desc = series(3);
    let data = payload(desc.plane_size() * 3);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"HEADER").unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    for use_mmap in [true, false] {
        let source = FileSource::open_opts(file.path(), use_mmap).unwrap();
        let storage = PixelStorage::Direct {
            source: Box::new(source),
            offset: 6,
        };
        let mut decoder = PlaneDecoder::new(desc.clone(), storage, DecoderOptions::default()).unwrap();
        let size = desc.plane_size();
        assert_eq!(decoder.open_plane(2).unwrap(), &data[2 * size..3 * size]);
        assert_eq!(decoder.state(), DecoderState::Idle);
    }
}

#[test]
fn test_compressed_file_location() {
    let desc = series(3);
    let data = payload(desc.plane_size() * 3);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"HDR").unwrap();
    file.write_all(&compress(Codec::Gzip, &data, 6).unwrap()).unwrap();
    file.flush().unwrap();

    let size = desc.plane_size();
    for use_mmap in [true, false] {
        let storage = PixelStorage::Compressed {
            location: Location::file(file.path(), use_mmap),
            offset: 3,
            codec: Codec::Gzip,
        };
        let mut decoder = PlaneDecoder::new(desc.clone(), storage, DecoderOptions::default()).unwrap();
        for index in [2, 0, 1] {
            assert_eq!(decoder.open_plane(index).unwrap(), &data[index * size..(index + 1) * size]);
        }
        assert_eq!(decoder.stream_opens(), 2);
    }
}
