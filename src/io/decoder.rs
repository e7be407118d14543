//! Streaming plane decoder.
//!
//! Serves random plane reads over either a random-access source or a
//! one-way decompressing stream. For compressed payloads the decoder
//! keeps a forward-only cursor: moving forward skips the planes in
//! between, moving backward (or repeating) reopens the payload from its
//! start. The cursor is an explicit state machine owned by one dataset
//! handle.

use std::io::Read;

use tracing::{debug, trace};

use super::compression::{decompressing_stream, skip_bytes, Codec, PlaneStream};
use super::region::{extract_channel, extract_region, invert_rows};
use super::source::{ByteSource, Location};
use crate::core::{Axis, Region, SeriesDescriptor, ZctCoord};
use crate::util::{Error, Result};

/// Where the pixel bytes of a series come from.
pub enum PixelStorage {
    /// Uncompressed payload starting at `offset` in a seekable source.
    Direct {
        source: Box<dyn ByteSource>,
        offset: u64,
    },
    /// Compressed payload starting at `offset`; can only be read forward.
    /// Every reopen goes through `location`, including its mmap choice.
    Compressed {
        location: Location,
        offset: u64,
        codec: Codec,
    },
}

impl PixelStorage {
    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::Compressed { .. })
    }
}

/// How channels are laid out in storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelLayout {
    /// One stored plane per plane index.
    #[default]
    Planar,
    /// All channels of a (z, t) pair interleaved per pixel in one record,
    /// exposed as separate planes.
    Interleaved,
}

/// Per-series decode options set by the format parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Rows are stored bottom-up.
    pub invert_y: bool,
    pub channel_layout: ChannelLayout,
}

/// Observable cursor state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    /// No stream open.
    Idle,
    /// Sequential stream open, positioned right after record `position`.
    SequentialCursor { position: usize },
    /// Reads refused until [`PlaneDecoder::reopen`].
    Closed,
}

enum Cursor {
    Idle,
    Sequential { stream: PlaneStream, position: usize },
    Closed,
}

/// Stateful reader of the planes of one series.
///
/// Not safe for concurrent use: every read moves the cursor.
pub struct PlaneDecoder {
    series: SeriesDescriptor,
    storage: PixelStorage,
    options: DecoderOptions,
    cursor: Cursor,
    /// Last interleaved record, reused while the same (z, t) is requested.
    record_cache: Option<(usize, Vec<u8>)>,
    stream_opens: usize,
}

impl PlaneDecoder {
    /// Create a decoder for a finalized series.
    pub fn new(series: SeriesDescriptor, storage: PixelStorage, options: DecoderOptions) -> Result<Self> {
        if !series.is_finalized() {
            return Err(Error::format(format!(
                "series {} must be finalized before decoding",
                series.series()
            )));
        }
        if options.channel_layout == ChannelLayout::Interleaved {
            if series.is_rgb() {
                return Err(Error::format("interleaved channel layout conflicts with RGB samples"));
            }
            if series.dimension_order().axes()[0] != Axis::C {
                return Err(Error::format(format!(
                    "interleaved channel layout needs C as fastest axis, got {}",
                    series.dimension_order()
                )));
            }
        }
        Ok(Self {
            series,
            storage,
            options,
            cursor: Cursor::Idle,
            record_cache: None,
            stream_opens: 0,
        })
    }

    #[inline]
    pub fn series(&self) -> &SeriesDescriptor {
        &self.series
    }

    #[inline]
    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    pub fn state(&self) -> DecoderState {
        match &self.cursor {
            Cursor::Idle => DecoderState::Idle,
            Cursor::Sequential { position, .. } => DecoderState::SequentialCursor { position: *position },
            Cursor::Closed => DecoderState::Closed,
        }
    }

    /// How many times the compressed payload has been (re)opened.
    #[inline]
    pub fn stream_opens(&self) -> usize {
        self.stream_opens
    }

    /// Drop any open stream and refuse further reads.
    pub fn close(&mut self) {
        self.cursor = Cursor::Closed;
        self.record_cache = None;
    }

    /// Leave the closed state; the next read starts from scratch.
    pub fn reopen(&mut self) {
        if matches!(self.cursor, Cursor::Closed) {
            self.cursor = Cursor::Idle;
        }
    }

    /// Read a whole plane.
    pub fn open_plane(&mut self, index: usize) -> Result<Vec<u8>> {
        let region = self.series.full_region();
        self.open_plane_region(index, region)
    }

    /// Read a sub-region of a plane.
    ///
    /// A decode failure closes the decoder.
    pub fn open_plane_region(&mut self, index: usize, region: Region) -> Result<Vec<u8>> {
        if matches!(self.cursor, Cursor::Closed) {
            return Err(Error::DecoderClosed { series: self.series.series() });
        }
        self.series.check_plane_region(index, region)?;

        let result = self.decode(index, region);
        if let Err(Error::Decode { .. }) = &result {
            self.close();
        }
        let mut buf = result?;

        if self.options.invert_y {
            let row_len = self.output_region_size(region.width, 1);
            invert_rows(&mut buf, row_len, region.height);
        }
        Ok(buf)
    }

    fn output_region_size(&self, width: usize, height: usize) -> usize {
        match self.options.channel_layout {
            ChannelLayout::Planar => self.series.region_size(width, height),
            ChannelLayout::Interleaved => width * height * self.series.pixel_type().bytes_per_pixel(),
        }
    }

    /// Bytes of one stored record.
    fn record_size(&self) -> usize {
        match self.options.channel_layout {
            ChannelLayout::Planar => self.series.plane_size(),
            ChannelLayout::Interleaved => self.series.plane_size() * self.series.size_c(),
        }
    }

    /// Record holding plane `index`, and the plane's channel.
    fn record_of(&self, index: usize) -> Result<(usize, usize)> {
        match self.options.channel_layout {
            ChannelLayout::Planar => Ok((index, 0)),
            ChannelLayout::Interleaved => {
                let coord = self.series.index_to_coord(index)?;
                let first = self.series.coord_to_index(ZctCoord::new(coord.z, 0, coord.t))?;
                Ok((first / self.series.size_c(), coord.c))
            }
        }
    }

    fn decode(&mut self, index: usize, region: Region) -> Result<Vec<u8>> {
        let (record, channel) = self.record_of(index)?;
        let series = self.series.series();

        if self.options.channel_layout == ChannelLayout::Planar {
            if let PixelStorage::Direct { source, offset } = &mut self.storage {
                return read_direct_region(source.as_mut(), *offset, &self.series, record, region)
                    .map_err(|e| Error::decode(series, index, e));
            }
        }

        let data = match self.record_cache.take() {
            Some((cached, data)) if cached == record => data,
            _ => self.read_record(record).map_err(|e| match e {
                Error::Io(io) => Error::decode(series, index, io),
                other => other,
            })?,
        };

        let out = match self.options.channel_layout {
            ChannelLayout::Planar => extract_region(&data, &self.series, region),
            ChannelLayout::Interleaved => {
                let out = extract_channel(&data, &self.series, channel, self.series.size_c(), region);
                self.record_cache = Some((record, data));
                out
            }
        };
        Ok(out)
    }

    /// Read one whole record, moving the cursor for sequential storage.
    fn read_record(&mut self, record: usize) -> Result<Vec<u8>> {
        let record_size = self.record_size();
        let mut data = vec![0u8; record_size];

        match &mut self.storage {
            PixelStorage::Direct { source, offset } => {
                source.seek(*offset + (record * record_size) as u64)?;
                source.read_exact(&mut data)?;
            }
            PixelStorage::Compressed { location, offset, codec } => {
                let (mut stream, to_skip) = match std::mem::replace(&mut self.cursor, Cursor::Idle) {
                    Cursor::Sequential { stream, position } if record > position => {
                        trace!(record, position, "sequential cursor moving forward");
                        (stream, (record - position - 1) * record_size)
                    }
                    _ => {
                        debug!(
                            series = self.series.series(),
                            record,
                            source = %location.describe(),
                            "reopening compressed payload"
                        );
                        let mut source = location.open()?;
                        source.seek(*offset)?;
                        self.stream_opens += 1;
                        (decompressing_stream(*codec, source), record * record_size)
                    }
                };
                skip_bytes(stream.as_mut(), to_skip as u64)?;
                stream.read_exact(&mut data)?;
                self.cursor = Cursor::Sequential { stream, position: record };
            }
        }
        Ok(data)
    }
}

/// Read only the rows of `region` from an uncompressed planar payload.
fn read_direct_region(
    source: &mut dyn ByteSource,
    offset: u64,
    desc: &SeriesDescriptor,
    plane: usize,
    region: Region,
) -> std::io::Result<Vec<u8>> {
    let pixel = desc.rgb_channel_count() * desc.pixel_type().bytes_per_pixel();
    let row_len = desc.size_x() * pixel;
    let plane_start = offset + (plane * desc.plane_size()) as u64;
    let out_row = region.width * pixel;
    let mut out = vec![0u8; out_row * region.height];
    for (i, row) in (region.y..region.y + region.height).enumerate() {
        source.seek(plane_start + (row * row_len + region.x * pixel) as u64)?;
        source.read_exact(&mut out[i * out_row..(i + 1) * out_row])?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DimensionOrder;
    use crate::io::{compress, MemorySource};
    use std::sync::Arc;

    fn series(z: usize) -> SeriesDescriptor {
        let mut s = SeriesDescriptor::new(4, 2).with_zct(z, 1, 1);
        s.finalize().unwrap();
        s
    }

    /// Plane `i` is filled with byte `i`.
    fn payload(planes: usize, plane_size: usize) -> Vec<u8> {
        (0..planes).flat_map(|i| std::iter::repeat(i as u8).take(plane_size)).collect()
    }

    fn gzip_decoder(z: usize, options: DecoderOptions) -> PlaneDecoder {
        let packed = compress(Codec::Gzip, &payload(z, 8), 6).unwrap();
        let storage = PixelStorage::Compressed {
            location: Location::Memory(Arc::from(packed)),
            offset: 0,
            codec: Codec::Gzip,
        };
        PlaneDecoder::new(series(z), storage, options).unwrap()
    }

    #[test]
    fn test_direct_reads_are_stateless() {
        let storage = PixelStorage::Direct {
            source: Box::new(MemorySource::new(payload(3, 8))),
            offset: 0,
        };
        let mut d = PlaneDecoder::new(series(3), storage, DecoderOptions::default()).unwrap();
        assert_eq!(d.open_plane(2).unwrap(), vec![2; 8]);
        assert_eq!(d.open_plane(0).unwrap(), vec![0; 8]);
        assert_eq!(d.state(), DecoderState::Idle);
        assert_eq!(d.stream_opens(), 0);
    }

    #[test]
    fn test_cursor_transitions() {
        let mut d = gzip_decoder(6, DecoderOptions::default());
        assert_eq!(d.state(), DecoderState::Idle);

        assert_eq!(d.open_plane(1).unwrap(), vec![1; 8]);
        assert_eq!(d.state(), DecoderState::SequentialCursor { position: 1 });
        assert_eq!(d.stream_opens(), 1);

        // forward: no reopen
        assert_eq!(d.open_plane(4).unwrap(), vec![4; 8]);
        assert_eq!(d.stream_opens(), 1);

        // repeat: reopen
        assert_eq!(d.open_plane(4).unwrap(), vec![4; 8]);
        assert_eq!(d.stream_opens(), 2);

        // backward: reopen
        assert_eq!(d.open_plane(0).unwrap(), vec![0; 8]);
        assert_eq!(d.stream_opens(), 3);
        assert_eq!(d.state(), DecoderState::SequentialCursor { position: 0 });
    }

    #[test]
    fn test_validation_before_storage() {
        let mut d = gzip_decoder(2, DecoderOptions::default());
        assert!(matches!(d.open_plane(2), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            d.open_plane_region(0, Region::new(3, 0, 2, 1)),
            Err(Error::InvalidRegion { .. })
        ));
        assert_eq!(d.stream_opens(), 0);
        assert_eq!(d.state(), DecoderState::Idle);
    }

    #[test]
    fn test_invert_y() {
        let storage = PixelStorage::Direct {
            source: Box::new(MemorySource::new((0..8).collect::<Vec<u8>>())),
            offset: 0,
        };
        let options = DecoderOptions { invert_y: true, ..Default::default() };
        let mut d = PlaneDecoder::new(series(1), storage, options).unwrap();
        assert_eq!(d.open_plane(0).unwrap(), vec![4, 5, 6, 7, 0, 1, 2, 3]);
        assert_eq!(d.open_plane_region(0, Region::new(1, 0, 2, 2)).unwrap(), vec![5, 6, 1, 2]);
    }

    #[test]
    fn test_truncated_stream_closes() {
        let packed = compress(Codec::Gzip, &payload(2, 8), 6).unwrap();
        let storage = PixelStorage::Compressed {
            location: Location::Memory(Arc::from(packed)),
            offset: 0,
            codec: Codec::Gzip,
        };
        // claims three planes, payload holds two
        let mut d = PlaneDecoder::new(series(3), storage, DecoderOptions::default()).unwrap();
        assert!(matches!(d.open_plane(2), Err(Error::Decode { plane: 2, .. })));
        assert_eq!(d.state(), DecoderState::Closed);
        assert!(matches!(d.open_plane(0), Err(Error::DecoderClosed { .. })));

        d.reopen();
        assert_eq!(d.state(), DecoderState::Idle);
        assert_eq!(d.open_plane(1).unwrap(), vec![1; 8]);
    }

    #[test]
    fn test_interleaved_channels() {
        // 2x1 pixels, 5 channels interleaved, 2 z-slices
        let mut s = SeriesDescriptor::new(2, 1)
            .with_zct(2, 5, 1)
            .with_dimension_order(DimensionOrder::XYCZT);
        s.finalize().unwrap();
        let record = |z: u8| -> Vec<u8> {
            (0..2u8).flat_map(|p| (0..5u8).map(move |c| z * 100 + p * 10 + c)).collect()
        };
        let data: Vec<u8> = [record(0), record(1)].concat();
        let options = DecoderOptions { channel_layout: ChannelLayout::Interleaved, ..Default::default() };

        let packed = compress(Codec::Zlib, &data, 6).unwrap();
        let storage = PixelStorage::Compressed {
            location: Location::Memory(Arc::from(packed)),
            offset: 0,
            codec: Codec::Zlib,
        };
        let mut d = PlaneDecoder::new(s.clone(), storage, options).unwrap();
        // index 7 = c2 z1
        assert_eq!(d.open_plane(7).unwrap(), vec![102, 112]);
        // same record, served from cache without reopening
        assert_eq!(d.open_plane(5).unwrap(), vec![100, 110]);
        assert_eq!(d.stream_opens(), 1);
        assert_eq!(d.open_plane(3).unwrap(), vec![3, 13]);
        assert_eq!(d.stream_opens(), 2);

        let storage = PixelStorage::Direct { source: Box::new(MemorySource::new(data)), offset: 0 };
        let mut direct = PlaneDecoder::new(s, storage, options).unwrap();
        assert_eq!(direct.open_plane(9).unwrap(), vec![104, 114]);
    }

    #[test]
    fn test_interleaved_requires_c_first() {
        let mut s = SeriesDescriptor::new(2, 1).with_zct(2, 5, 1);
        s.finalize().unwrap();
        let storage = PixelStorage::Direct { source: Box::new(MemorySource::new(vec![0u8; 20])), offset: 0 };
        let options = DecoderOptions { channel_layout: ChannelLayout::Interleaved, ..Default::default() };
        assert!(PlaneDecoder::new(s, storage, options).is_err());
    }
}
