//! Image Cytometry Standard reader.
//!
//! Version 1 datasets are an `.ics` text header plus an `.ids` pixel file
//! with the same stem. Version 2 files carry the pixels in the `.ics`
//! file right after the header's `end` line. Pixels may be gzip
//! compressed as one stream.

mod header;
mod keys;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use self::header::{parse_header, IcsHeader};
use super::{FormatReader, MetadataLevel, ParsedDataset, ReaderOptions};
use crate::core::{ChannelDim, ChannelKind, Dataset, DimensionOrder, FileGroupOption, SeriesDescriptor, ZctCoord};
use crate::io::{
    is_gzip, ByteSource, ChannelLayout, Codec, DecoderOptions, FileSource, Location, PixelStorage,
    PlaneDecoder,
};
use crate::meta::{
    create_lsid, Correction, DetectorType, ExperimentType, Immersion, LaserMedium, LaserType,
    MetadataGraph, NodeHandle, NodeKind, RefKind,
};
use crate::util::{Error, PixelType, Result};

const MAGIC: &[u8] = b"ics_version";

/// Reader for `.ics` / `.ids` datasets.
#[derive(Debug, Default)]
pub struct IcsReader;

impl IcsReader {
    pub fn new() -> Self {
        Self
    }
}

/// Swap the second-to-last character of the suffix (`c` <-> `d`),
/// preserving case.
fn swap_suffix(path: &Path, from: char, to: char) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let mut chars: Vec<char> = name.chars().collect();
    let n = chars.len();
    if n < 2 {
        return None;
    }
    let c = &mut chars[n - 2];
    *c = match *c {
        x if x == from => to,
        x if x == from.to_ascii_uppercase() => to.to_ascii_uppercase(),
        _ => return None,
    };
    Some(path.with_file_name(chars.into_iter().collect::<String>()))
}

/// The `.ics` header and `.ids` pixel file paths for either file.
pub(crate) fn companion_paths(path: &Path) -> Option<(PathBuf, PathBuf)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "ics" => Some((path.to_path_buf(), swap_suffix(path, 'c', 'd')?)),
        "ids" => Some((swap_suffix(path, 'd', 'c')?, path.to_path_buf())),
        _ => None,
    }
}

impl FormatReader for IcsReader {
    fn name(&self) -> &'static str {
        "Image Cytometry Standard"
    }

    fn suffixes(&self) -> &'static [&'static str] {
        &["ics", "ids"]
    }

    fn file_group_option(&self, _path: &Path) -> FileGroupOption {
        FileGroupOption::MustGroup
    }

    fn is_this_type_by_header(&self, header: &[u8]) -> bool {
        // skip the separator line
        let body = match header.iter().position(|&b| b == b'\n') {
            Some(i) => &header[i + 1..],
            None => header,
        };
        body.starts_with(MAGIC) || header.starts_with(MAGIC)
    }

    fn parse(&self, path: &Path, options: &ReaderOptions) -> Result<ParsedDataset> {
        info!("Finding companion file");
        let (ics_path, ids_path) = companion_paths(path)
            .ok_or_else(|| Error::format(format!("not an ICS file name: {}", path.display())))?;
        if !ics_path.exists() {
            return Err(Error::FileNotFound(ics_path));
        }

        info!("Reading metadata");
        let file = File::open(&ics_path)?;
        let header = parse_header(&mut BufReader::new(file), options.metadata_level)?;
        let version_two = header.is_version_two();

        let mut dataset = Dataset::new();
        dataset.add_file(&ics_path);
        let pixels_path = if version_two {
            ics_path.clone()
        } else {
            if !ids_path.exists() {
                return Err(Error::FileNotFound(ids_path));
            }
            dataset.add_file(&ids_path);
            ids_path
        };

        info!("Populating core metadata");
        let core = populate_core(&header)?;
        let series = dataset.push_series(core.series)?;
        let series = dataset.get(series)?.clone();

        let offset = if version_two { header.header_len } else { 0 };
        let storage = pixel_storage(&pixels_path, offset, header.is_gzip(), options.use_mmap)?;
        let decoder_options = DecoderOptions {
            invert_y: header.invert_y,
            channel_layout: core.layout,
        };
        let decoder = PlaneDecoder::new(series.clone(), storage, decoder_options)?;

        info!("Populating metadata graph");
        let mut metadata = MetadataGraph::new();
        let mut global_meta = header.global_meta.clone();
        populate_graph(&mut metadata, &mut global_meta, &header, &series, options.metadata_level)?;

        Ok(ParsedDataset {
            dataset,
            decoders: vec![decoder],
            metadata,
            global_meta,
        })
    }
}

/// Core metadata plus how channels are stored.
struct Core {
    series: SeriesDescriptor,
    layout: ChannelLayout,
}

/// Multiply a repeated axis into the running extent.
fn fold_extent(current: usize, len: usize, axis: &str) -> Result<usize> {
    if current == 0 {
        return Ok(len);
    }
    current
        .checked_mul(len)
        .ok_or_else(|| Error::format(format!("layout sizes overflow on axis '{}'", axis)))
}

fn populate_core(header: &IcsHeader) -> Result<Core> {
    let (mut size_x, mut size_y, mut size_z, mut size_c, mut size_t) = (0, 0, 0, 0, 0);
    let mut bits = 0;
    let mut order = String::from("XY");
    let mut channel_dims = Vec::new();
    let mut stored_rgb = false;
    let mut rgb = false;

    if header.axes.is_empty() || header.axis_lengths.is_empty() {
        return Err(Error::format("missing layout order or layout sizes"));
    }

    for (axis, &len) in header.axes.iter().zip(&header.axis_lengths) {
        match axis.as_str() {
            "bits" => {
                bits = len
                    .checked_next_multiple_of(8)
                    .ok_or_else(|| Error::format(format!("bad sample width {}", len)))?;
                if bits == 24 || bits == 48 {
                    bits /= 3;
                }
            }
            "x" => size_x = len,
            "y" => size_y = len,
            "z" => {
                size_z = len;
                if !order.contains('Z') {
                    order.push('Z');
                }
            }
            "t" => {
                size_t = fold_extent(size_t, len, "t")?;
                if !order.contains('T') {
                    order.push('T');
                }
            }
            other => {
                size_c = fold_extent(size_c, len, other)?;
                // a channel axis ahead of x means samples are interleaved per pixel
                stored_rgb = size_x == 0;
                rgb = size_x == 0 && size_c > 1 && size_c <= 4;
                if !order.contains('C') {
                    order.push('C');
                }
                let kind = if other.starts_with('c') {
                    ChannelKind::Channel
                } else if other == "p" {
                    ChannelKind::Phase
                } else if other == "f" {
                    ChannelKind::Frequency
                } else {
                    ChannelKind::Other
                };
                channel_dims.push(ChannelDim::new(len, kind));
            }
        }
    }

    if channel_dims.is_empty() {
        channel_dims.push(ChannelDim::channels(1));
    }
    let mut dimension_order = DimensionOrder::make_sane(&order);
    size_z = size_z.max(1);
    size_c = size_c.max(1);
    size_t = size_t.max(1);

    let mut layout = if stored_rgb && !rgb && size_c > 4 && channel_dims.len() == 1 {
        ChannelLayout::Interleaved
    } else {
        ChannelLayout::Planar
    };

    // lifetime data with bins stored along a nominal spatial axis
    if header.lifetime {
        if let Some(labels) = header.labels.as_deref() {
            let bins = if labels.eq_ignore_ascii_case("t x y") {
                // nominal X Y Z is really bins X Y, bins fastest
                let bins = size_x;
                size_x = size_y;
                size_y = size_z;
                layout = ChannelLayout::Interleaved;
                Some(bins)
            } else if labels.eq_ignore_ascii_case("x y t") {
                Some(size_z)
            } else {
                debug!("Lifetime data, unexpected 'history labels' {}", labels);
                None
            };
            if let Some(bins) = bins {
                size_z = 1;
                size_c = bins;
                rgb = false;
                dimension_order = DimensionOrder::XYCZT;
                channel_dims = vec![ChannelDim::new(bins, ChannelKind::Lifetime)];
            }
        }
    }

    // the byte order field is written differently for integer and real data
    let mut little_endian = true;
    if let Some(first) = header.byte_order.as_deref().and_then(|b| b.split(' ').next()) {
        let first: i64 = first
            .trim()
            .parse()
            .map_err(|_| Error::format(format!("bad byte_order '{}'", first)))?;
        little_endian = if header.is_real() { first == 1 } else { first != 1 };
    }
    if bits < 32 {
        little_endian = !little_endian;
    }

    let pixel_type = PixelType::from_bytes(bits / 8, header.signed, header.is_real()).ok_or_else(|| {
        Error::format(format!(
            "unsupported sample format: {} bits, signed={}, format={:?}",
            bits, header.signed, header.format
        ))
    })?;

    let mut series = SeriesDescriptor::new(size_x, size_y)
        .with_zct(size_z, size_c, size_t)
        .with_dimension_order(dimension_order)
        .with_pixel_type(pixel_type)
        .with_little_endian(little_endian)
        .with_channel_dims(channel_dims);
    if rgb {
        series = series.with_samples_per_pixel(size_c);
    }
    series.set_interleaved(rgb);
    if let Some(b) = header.significant_bits {
        series.set_bits_per_pixel(b);
    }

    debug!(
        size_x,
        size_y,
        size_z,
        size_c,
        size_t,
        order = %dimension_order,
        pixel_type = %pixel_type,
        ?layout,
        "ICS core metadata"
    );
    Ok(Core { series, layout })
}

fn pixel_storage(path: &Path, offset: u64, gzip: bool, use_mmap: bool) -> Result<PixelStorage> {
    let mut source = FileSource::open_opts(path, use_mmap)?;
    if gzip {
        let mut magic = [0u8; 2];
        source.seek(offset)?;
        let n = source.read(&mut magic)?;
        if is_gzip(&magic[..n]) {
            return Ok(PixelStorage::Compressed {
                location: Location::file(path, use_mmap),
                offset,
                codec: Codec::Gzip,
            });
        }
        warn!("{}: compression is gzip but payload is not; reading raw", path.display());
    }
    Ok(PixelStorage::Direct {
        source: Box::new(source),
        offset,
    })
}

/// Accept a positive value, warning about anything else.
fn positive<T: PartialOrd + Default + std::fmt::Display>(value: T, field: &str) -> Option<T> {
    if value > T::default() {
        Some(value)
    } else {
        warn!("Expected positive value for {}; got {}", field, value);
        None
    }
}

/// Empty unit is accepted, otherwise it must be one of `expected`.
fn check_unit(actual: &str, expected: &[&str]) -> bool {
    if actual.is_empty() || expected.contains(&actual) {
        return true;
    }
    debug!("Unexpected unit '{}'; expected {:?}", actual, expected);
    false
}

fn populate_graph(
    graph: &mut MetadataGraph,
    global_meta: &mut crate::meta::Attributes,
    header: &IcsHeader,
    series: &SeriesDescriptor,
    level: MetadataLevel,
) -> Result<()> {
    let image = graph.register_node(create_lsid("Image", &[0]), NodeKind::Image)?;
    if let Some(name) = &header.image_name {
        graph.set_attr(image, "Name", name.as_str())?;
    }
    if let Some(date) = &header.date {
        graph.set_attr(image, "AcquisitionDate", date.as_str())?;
    }

    let pixels = graph.register_node(create_lsid("Pixels", &[0]), NodeKind::Pixels)?;
    let pixel_attrs = [
        ("DimensionOrder", series.dimension_order().to_string()),
        ("Type", series.pixel_type().to_string()),
        ("SizeX", series.size_x().to_string()),
        ("SizeY", series.size_y().to_string()),
        ("SizeZ", series.size_z().to_string()),
        ("SizeC", series.size_c().to_string()),
        ("SizeT", series.size_t().to_string()),
        ("SignificantBits", series.bits_per_pixel().to_string()),
        ("BigEndian", (!series.little_endian()).to_string()),
    ];
    for (k, v) in pixel_attrs {
        graph.set_attr(pixels, k, v)?;
    }

    if level == MetadataLevel::Minimum {
        return Ok(());
    }
    let acq = &header.acquisition;

    if let Some(description) = &acq.description {
        graph.set_attr(image, "Description", description.as_str())?;
    }

    let instrument_id = create_lsid("Instrument", &[0]);
    let instrument = graph.register_node(instrument_id.as_str(), NodeKind::Instrument)?;
    set_opt(graph, instrument, "Model", acq.microscope_model.as_deref())?;
    set_opt(graph, instrument, "Manufacturer", acq.microscope_manufacturer.as_deref())?;
    graph.enqueue_reference(image, RefKind::Instrument, instrument_id)?;

    let experiment_id = create_lsid("Experiment", &[0]);
    let experiment = graph.register_node(experiment_id.as_str(), NodeKind::Experiment)?;
    let experiment_type = ExperimentType::parse_or_other(header.experiment_type.as_deref().unwrap_or(""));
    graph.set_attr(experiment, "Type", experiment_type.name())?;
    graph.enqueue_reference(image, RefKind::Experiment, experiment_id)?;

    populate_physical_sizes(graph, pixels, header, series)?;
    populate_planes(graph, global_meta, header, series)?;

    let channels = populate_channels(graph, header, series)?;
    let lasers = populate_lasers(graph, acq)?;
    link_light_sources(graph, &channels, acq, &lasers)?;
    populate_filters(graph, acq)?;

    if header.has_instrument_data() {
        let objective_id = create_lsid("Objective", &[0, 0]);
        let objective = graph.register_node(objective_id.as_str(), NodeKind::Objective)?;
        set_opt(graph, objective, "Model", acq.objective_model.as_deref())?;
        let immersion = Immersion::parse_or_other(acq.immersion.as_deref().unwrap_or("Other"));
        graph.set_attr(objective, "Immersion", immersion.name())?;
        set_num(graph, objective, "LensNA", acq.lens_na)?;
        set_num(graph, objective, "WorkingDistance", acq.working_distance)?;
        set_num(graph, objective, "CalibratedMagnification", acq.magnification)?;
        graph.set_attr(objective, "Correction", Correction::Other.name())?;
        graph.enqueue_reference(image, RefKind::Objective, objective_id)?;
    }

    // detector, linked from every channel with a gain
    let detector_id = create_lsid("Detector", &[0, 0]);
    let detector = graph.register_node(detector_id.as_str(), NodeKind::Detector)?;
    set_opt(graph, detector, "Manufacturer", acq.detector_manufacturer.as_deref())?;
    set_opt(graph, detector, "Model", acq.detector_model.as_deref())?;
    graph.set_attr(detector, "Type", DetectorType::Other.name())?;
    for (&index, &gain) in &acq.gains {
        if let Some(&channel) = channels.get(index) {
            graph.set_attr(channel, "DetectorSettings.Gain", gain.to_string())?;
            graph.enqueue_reference(channel, RefKind::Detector, detector_id.as_str())?;
        }
    }

    if let Some(last_name) = &acq.last_name {
        let experimenter_id = create_lsid("Experimenter", &[0]);
        let experimenter = graph.register_node(experimenter_id.as_str(), NodeKind::Experimenter)?;
        graph.set_attr(experimenter, "LastName", last_name.as_str())?;
        graph.set_attr(experimenter, "DisplayName", last_name.as_str())?;
        graph.enqueue_reference(image, RefKind::Experimenter, experimenter_id)?;
    }
    Ok(())
}

fn set_opt(graph: &mut MetadataGraph, node: NodeHandle, key: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) => graph.set_attr(node, key, v),
        None => Ok(()),
    }
}

fn set_num(graph: &mut MetadataGraph, node: NodeHandle, key: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) => graph.set_attr(node, key, v.to_string()),
        None => Ok(()),
    }
}

fn populate_physical_sizes(
    graph: &mut MetadataGraph,
    pixels: NodeHandle,
    header: &IcsHeader,
    series: &SeriesDescriptor,
) -> Result<()> {
    const MICRONS: &[&str] = &["um", "microns", "micrometers"];

    if let Some(sizes) = &header.pixel_sizes {
        let mut units = header.units.clone().unwrap_or_default();
        if units.len() + 1 == sizes.len() {
            // the unit of a "ch" axis is often missing entirely
            let mut given = units.into_iter();
            units = header
                .axes
                .iter()
                .map(|a| {
                    if a.eq_ignore_ascii_case("ch") {
                        "nm".to_string()
                    } else {
                        given.next().unwrap_or_default()
                    }
                })
                .collect();
        }

        for (i, size) in sizes.iter().enumerate() {
            let Some(size) = *size else { continue };
            let axis = header.axes.get(i).map(String::as_str).unwrap_or("");
            let unit = units.get(i).map(String::as_str).unwrap_or("");
            let key = match axis {
                "x" => "PhysicalSizeX",
                "y" => "PhysicalSizeY",
                "z" => "PhysicalSizeZ",
                "t" => {
                    if check_unit(unit, &["ms"]) {
                        graph.set_attr(pixels, "TimeIncrement", (1000.0 * size).to_string())?;
                    }
                    continue;
                }
                _ => continue,
            };
            if check_unit(unit, MICRONS) {
                if let Some(v) = positive(size, key) {
                    graph.set_attr(pixels, key, v.to_string())?;
                }
            } else {
                warn!("Expected micron unit for {}; got '{}'", key, unit);
            }
        }
    } else if let Some(extents) = &header.acquisition.extents {
        if let Some(v) = extents.first().and_then(|&x| positive(x, "PhysicalSizeX")) {
            graph.set_attr(pixels, "PhysicalSizeX", v.to_string())?;
        }
        if let Some(&y) = extents.get(1) {
            if let Some(v) = positive(y / series.size_y() as f64, "PhysicalSizeY") {
                graph.set_attr(pixels, "PhysicalSizeY", v.to_string())?;
            }
        }
    }
    Ok(())
}

/// Plane nodes carry per-plane timing, stage position and exposure.
fn populate_planes(
    graph: &mut MetadataGraph,
    global_meta: &mut crate::meta::Attributes,
    header: &IcsHeader,
    series: &SeriesDescriptor,
) -> Result<()> {
    let acq = &header.acquisition;
    if header.timestamps.is_none() && acq.stage_pos.is_none() && acq.exposure_time.is_none() {
        return Ok(());
    }

    let mut planes = Vec::with_capacity(series.image_count());
    for index in 0..series.image_count() {
        let coord = series.index_to_coord(index)?;
        let plane = graph.register_node(create_lsid("Plane", &[0, index]), NodeKind::Plane)?;
        graph.set_attr(plane, "TheZ", coord.z.to_string())?;
        graph.set_attr(plane, "TheC", coord.c.to_string())?;
        graph.set_attr(plane, "TheT", coord.t.to_string())?;
        planes.push(plane);
    }

    if let Some(timestamps) = &header.timestamps {
        for (t, delta) in timestamps.iter().enumerate().take(series.size_t()) {
            let Some(delta) = delta.filter(|d| !d.is_nan()) else { continue };
            for z in 0..series.size_z() {
                for c in 0..series.effective_size_c() {
                    let index = series.coord_to_index(ZctCoord::new(z, c, t))?;
                    graph.set_attr(planes[index], "DeltaT", delta.to_string())?;
                }
            }
        }
    }

    if let Some(pos) = &acq.stage_pos {
        for (i, (key, label)) in [
            ("PositionX", "X position for position #1"),
            ("PositionY", "Y position for position #1"),
            ("PositionZ", "Z position for position #1"),
        ]
        .into_iter()
        .enumerate()
        {
            let Some(Some(v)) = pos.get(i) else { continue };
            global_meta.set(label, v.to_string());
            for &plane in &planes {
                graph.set_attr(plane, key, v.to_string())?;
            }
        }
    }

    if let Some(exposure) = acq.exposure_time {
        for &plane in &planes {
            graph.set_attr(plane, "ExposureTime", exposure.to_string())?;
        }
    }
    Ok(())
}

fn populate_channels(
    graph: &mut MetadataGraph,
    header: &IcsHeader,
    series: &SeriesDescriptor,
) -> Result<Vec<NodeHandle>> {
    let acq = &header.acquisition;
    let mut channels = Vec::with_capacity(series.effective_size_c());

    for i in 0..series.effective_size_c() {
        let channel = graph.register_node(create_lsid("Channel", &[0, i]), NodeKind::Channel)?;
        if let Some(name) = acq.channel_names.get(&i) {
            graph.set_attr(channel, "Name", name.as_str())?;
        }
        if let Some(pinhole) = acq.pinholes.get(&i) {
            graph.set_attr(channel, "PinholeSize", pinhole.to_string())?;
        }
        let waves = [
            ("EmissionWavelength", &acq.em_waves),
            ("ExcitationWavelength", &acq.ex_waves),
        ];
        for (key, list) in waves {
            if let Some(Some(w)) = list.as_ref().and_then(|l| l.get(i)) {
                if let Some(w) = positive(*w, key) {
                    graph.set_attr(channel, key, w.to_string())?;
                }
            }
        }
        channels.push(channel);
    }
    Ok(channels)
}

/// Register one laser per recorded wavelength. Returns each laser's ID
/// and wavelength.
fn populate_lasers(graph: &mut MetadataGraph, acq: &header::Acquisition) -> Result<Vec<(String, Option<i64>)>> {
    let mut lasers: Vec<(usize, Option<i64>)> = acq.wavelengths.values().map(|&w| Some(w)).enumerate().collect();
    if lasers.is_empty() && acq.laser_manufacturer.is_some() {
        lasers.push((0, None));
    }

    let mut registered = Vec::with_capacity(lasers.len());
    for (i, wavelength) in lasers {
        let laser_id = create_lsid("LightSource", &[0, i]);
        let laser = graph.register_node(laser_id.as_str(), NodeKind::Laser)?;
        if let Some(w) = wavelength.and_then(|w| positive(w, "wavelength")) {
            graph.set_attr(laser, "Wavelength", w.to_string())?;
        }
        graph.set_attr(laser, "Type", LaserType::Other.name())?;
        graph.set_attr(laser, "LaserMedium", LaserMedium::Other.name())?;
        set_opt(graph, laser, "Manufacturer", acq.laser_manufacturer.as_deref())?;
        set_opt(graph, laser, "Model", acq.laser_model.as_deref())?;
        set_num(graph, laser, "Power", acq.laser_power)?;
        set_num(graph, laser, "RepetitionRate", acq.laser_repetition_rate)?;
        registered.push((laser_id, wavelength));
    }
    Ok(registered)
}

/// Link each channel to the laser emitting at its excitation wavelength.
fn link_light_sources(
    graph: &mut MetadataGraph,
    channels: &[NodeHandle],
    acq: &header::Acquisition,
    lasers: &[(String, Option<i64>)],
) -> Result<()> {
    let Some(ex_waves) = &acq.ex_waves else {
        return Ok(());
    };
    for (&channel, wave) in channels.iter().zip(ex_waves) {
        let Some(wave) = *wave else { continue };
        if let Some((laser_id, _)) = lasers.iter().find(|(_, w)| *w == Some(wave)) {
            graph.enqueue_reference(channel, RefKind::LightSource, laser_id.as_str())?;
        }
    }
    Ok(())
}

fn populate_filters(graph: &mut MetadataGraph, acq: &header::Acquisition) -> Result<()> {
    let Some(model) = &acq.filter_set_model else {
        return Ok(());
    };
    let filter_set = graph.register_node(create_lsid("FilterSet", &[0, 0]), NodeKind::FilterSet)?;
    graph.set_attr(filter_set, "Model", model.as_str())?;

    let dichroic_id = create_lsid("Dichroic", &[0, 0]);
    let emission_id = create_lsid("Filter", &[0, 0]);
    let excitation_id = create_lsid("Filter", &[0, 1]);

    let dichroic = graph.register_node(dichroic_id.as_str(), NodeKind::Dichroic)?;
    set_opt(graph, dichroic, "Model", acq.dichroic_model.as_deref())?;
    graph.enqueue_reference(filter_set, RefKind::Dichroic, dichroic_id)?;

    let emission = graph.register_node(emission_id.as_str(), NodeKind::Filter)?;
    set_opt(graph, emission, "Model", acq.emission_model.as_deref())?;
    graph.enqueue_reference(filter_set, RefKind::EmissionFilter, emission_id)?;

    let excitation = graph.register_node(excitation_id.as_str(), NodeKind::Filter)?;
    set_opt(graph, excitation, "Model", acq.excitation_model.as_deref())?;
    graph.enqueue_reference(filter_set, RefKind::ExcitationFilter, excitation_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(axes: &[&str], lengths: &[usize]) -> IcsHeader {
        IcsHeader {
            axes: axes.iter().map(|s| s.to_string()).collect(),
            axis_lengths: lengths.to_vec(),
            format: Some("integer".into()),
            byte_order: Some("1 2".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_companion_paths() {
        let (ics, ids) = companion_paths(Path::new("/data/cells.ics")).unwrap();
        assert_eq!(ics, Path::new("/data/cells.ics"));
        assert_eq!(ids, Path::new("/data/cells.ids"));

        let (ics, ids) = companion_paths(Path::new("/data/CELLS.IDS")).unwrap();
        assert_eq!(ics, Path::new("/data/CELLS.ICS"));
        assert_eq!(ids, Path::new("/data/CELLS.IDS"));

        assert!(companion_paths(Path::new("/data/cells.tif")).is_none());
    }

    #[test]
    fn test_detect_by_header() {
        let r = IcsReader::new();
        assert!(r.is_this_type_by_header(b"\t\nics_version\t1.0\n"));
        assert!(!r.is_this_type_by_header(b"II*\0"));
        assert!(r.is_this_type_by_name(Path::new("a.IDS")));
    }

    #[test]
    fn test_core_plain_stack() {
        let core = populate_core(&header(&["bits", "x", "y", "z", "t"], &[16, 8, 6, 3, 2])).unwrap();
        let s = core.series;
        assert_eq!((s.size_x(), s.size_y(), s.size_z(), s.size_c(), s.size_t()), (8, 6, 3, 1, 2));
        assert_eq!(s.dimension_order(), DimensionOrder::XYZTC);
        assert_eq!(s.pixel_type(), PixelType::Uint16);
        assert!(s.little_endian());
        assert_eq!(core.layout, ChannelLayout::Planar);
    }

    #[test]
    fn test_core_rgb_and_spectral() {
        let core = populate_core(&header(&["bits", "ch", "x", "y"], &[8, 3, 4, 4])).unwrap();
        assert!(core.series.is_rgb());
        assert_eq!(core.series.samples_per_pixel(), 3);
        assert_eq!(core.series.image_count(), 1);

        let core = populate_core(&header(&["bits", "ch", "x", "y", "z"], &[8, 7, 4, 4, 2])).unwrap();
        assert!(!core.series.is_rgb());
        assert_eq!(core.layout, ChannelLayout::Interleaved);
        assert_eq!(core.series.dimension_order(), DimensionOrder::XYCZT);
        assert_eq!(core.series.channel_dims(), vec![ChannelDim::new(7, ChannelKind::Channel)]);
    }

    #[test]
    fn test_core_lifetime_labels() {
        let mut h = header(&["bits", "x", "y", "z"], &[16, 64, 32, 16]);
        h.lifetime = true;
        h.labels = Some("t x y".into());
        let core = populate_core(&h).unwrap();
        let s = &core.series;
        assert_eq!((s.size_x(), s.size_y(), s.size_z(), s.size_c()), (32, 16, 1, 64));
        assert_eq!(s.channel_dims(), vec![ChannelDim::new(64, ChannelKind::Lifetime)]);
        assert_eq!(core.layout, ChannelLayout::Interleaved);
    }

    #[test]
    fn test_core_byte_order() {
        let mut h = header(&["bits", "x", "y"], &[16, 4, 4]);
        h.byte_order = Some("2 1".into());
        assert!(!populate_core(&h).unwrap().series.little_endian());

        let mut h = header(&["bits", "x", "y"], &[32, 4, 4]);
        h.format = Some("real".into());
        h.signed = true;
        let s = populate_core(&h).unwrap().series;
        assert_eq!(s.pixel_type(), PixelType::Float);
        assert!(s.little_endian());
    }

    #[test]
    fn test_core_overflowing_sizes() {
        let h = header(&["bits", "x", "y", "t", "t"], &[16, 4, 4, 1 << 40, 1 << 40]);
        assert!(matches!(populate_core(&h), Err(Error::Format(_))));

        let h = header(&["bits", "x", "y", "ch", "p"], &[16, 4, 4, 1 << 40, 1 << 40]);
        assert!(matches!(populate_core(&h), Err(Error::Format(_))));

        let h = header(&["bits", "x", "y"], &[usize::MAX, 4, 4]);
        assert!(matches!(populate_core(&h), Err(Error::Format(_))));
    }

    #[test]
    fn test_gzip_storage_keeps_mmap_choice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packed.ics");
        let mut bytes = b"head".to_vec();
        bytes.extend(crate::io::compress(Codec::Gzip, &[1, 2, 3, 4], 6).unwrap());
        std::fs::write(&path, bytes).unwrap();

        for use_mmap in [true, false] {
            let storage = pixel_storage(&path, 4, true, use_mmap).unwrap();
            assert!(matches!(
                storage,
                PixelStorage::Compressed { location: Location::File { use_mmap: m, .. }, offset: 4, .. }
                    if m == use_mmap
            ));
        }
    }

    #[test]
    fn test_core_requires_layout() {
        assert!(populate_core(&IcsHeader::default()).is_err());
    }
}
