//! ICS header parsing.
//!
//! Turns the key/value lines of an `.ics` header into [`IcsHeader`].
//! Every line also lands in the dataset's global metadata table.

use std::collections::BTreeMap;
use std::io::BufRead;

use tracing::debug;

use super::keys;
use crate::formats::MetadataLevel;
use crate::meta::Attributes;
use crate::text::tokenize;
use crate::util::Result;

/// Instrument and acquisition fields, only collected at
/// [`MetadataLevel::All`].
#[derive(Clone, Debug, Default)]
pub struct Acquisition {
    pub description: Option<String>,
    pub text_block: String,
    pub gains: BTreeMap<usize, f64>,
    pub pinholes: BTreeMap<usize, f64>,
    /// Laser index to wavelength in nm.
    pub wavelengths: BTreeMap<usize, i64>,
    pub channel_names: BTreeMap<usize, String>,
    pub em_waves: Option<Vec<Option<i64>>>,
    pub ex_waves: Option<Vec<Option<i64>>>,
    pub stage_pos: Option<Vec<Option<f64>>>,
    pub extents: Option<Vec<f64>>,
    pub magnification: Option<f64>,
    pub lens_na: Option<f64>,
    pub working_distance: Option<f64>,
    pub objective_model: Option<String>,
    pub immersion: Option<String>,
    pub last_name: Option<String>,
    pub laser_model: Option<String>,
    pub laser_manufacturer: Option<String>,
    pub laser_power: Option<f64>,
    pub laser_repetition_rate: Option<f64>,
    pub detector_manufacturer: Option<String>,
    pub detector_model: Option<String>,
    pub microscope_model: Option<String>,
    pub microscope_manufacturer: Option<String>,
    pub exposure_time: Option<f64>,
    pub filter_set_model: Option<String>,
    pub dichroic_model: Option<String>,
    pub excitation_model: Option<String>,
    pub emission_model: Option<String>,
}

/// Parsed header of one ICS dataset.
#[derive(Clone, Debug, Default)]
pub struct IcsHeader {
    pub version: Option<String>,
    pub image_name: Option<String>,
    pub axes: Vec<String>,
    pub axis_lengths: Vec<usize>,
    pub significant_bits: Option<usize>,
    pub byte_order: Option<String>,
    pub format: Option<String>,
    pub compression: Option<String>,
    pub signed: bool,
    pub pixel_sizes: Option<Vec<Option<f64>>>,
    pub timestamps: Option<Vec<Option<f64>>>,
    pub units: Option<Vec<String>>,
    pub invert_y: bool,
    pub lifetime: bool,
    pub labels: Option<String>,
    pub date: Option<String>,
    pub experiment_type: Option<String>,
    pub acquisition: Acquisition,
    pub global_meta: Attributes,
    /// Byte offset just past the `end` line.
    pub header_len: u64,
}

impl IcsHeader {
    pub fn is_version_two(&self) -> bool {
        self.version.as_deref().map(str::trim) == Some("2.0")
    }

    pub fn is_gzip(&self) -> bool {
        self.compression.as_deref() == Some("gzip")
    }

    pub fn is_real(&self) -> bool {
        self.format.as_deref() == Some("real")
    }

    /// Any objective, wavelength or stage value present.
    pub fn has_instrument_data(&self) -> bool {
        let a = &self.acquisition;
        a.em_waves.is_some()
            || a.ex_waves.is_some()
            || a.lens_na.is_some()
            || a.stage_pos.is_some()
            || a.magnification.is_some()
            || a.working_distance.is_some()
            || a.objective_model.is_some()
            || a.immersion.is_some()
    }
}

/// Read one line terminated by `\n`, `\r\n` or end of input.
fn read_line(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> std::io::Result<Option<(String, usize)>> {
    buf.clear();
    let n = reader.read_until(b'\n', buf)?;
    if n == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some((String::from_utf8_lossy(buf).into_owned(), n)))
}

/// Parse header lines up to and including the `end` line.
///
/// The first line declares the field separators and is skipped.
pub fn parse_header(reader: &mut impl BufRead, level: MetadataLevel) -> Result<IcsHeader> {
    let classifier = keys::classifier()?;
    let mut header = IcsHeader::default();
    let mut buf = Vec::new();
    let mut consumed = 0u64;

    if let Some((_, n)) = read_line(reader, &mut buf)? {
        consumed += n as u64;
    }

    while let Some((line, n)) = read_line(reader, &mut buf)? {
        consumed += n as u64;
        let line = line.trim();
        if line == "end" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let tokens = tokenize(line);
        let Some(first) = tokens.first() else { continue };
        let category = first.to_lowercase();
        match category.as_str() {
            "ics_version" => {
                let value = tokens[1..].join(" ");
                header.global_meta.set(category.as_str(), value.as_str());
                header.version = Some(value);
            }
            "filename" => {
                let value = tokens[1..].join(" ");
                header.global_meta.set(category.as_str(), value.as_str());
                header.image_name = Some(value);
            }
            "layout" | "representation" | "parameter" | "history" | "document" | "sensor" => {
                let Some(kv) = classifier.classify(&tokens) else { continue };
                header.global_meta.set(kv.key.as_str(), kv.value.as_str());
                let lower = kv.key.to_lowercase();
                match category.as_str() {
                    "layout" => header.apply_layout(&lower, &kv.value),
                    "representation" => header.apply_representation(&lower, &kv.value),
                    "parameter" => header.apply_parameter(&lower, &kv.value, level),
                    "history" => header.apply_history(&kv.key, &lower, kv.value, level),
                    "sensor" if level == MetadataLevel::All => header.apply_sensor(&lower, &kv.value),
                    _ => {}
                }
            }
            "view" => {
                let Some(kv) = classifier.classify(&tokens) else { continue };
                let (key, value) = split_view_key(&kv.key, &kv.value);
                header.global_meta.set(key, value);
            }
            _ => debug!("Unknown category {}", category),
        }
    }

    if !header.acquisition.text_block.is_empty() {
        header
            .global_meta
            .set("history text", header.acquisition.text_block.as_str());
    }
    header.header_len = consumed;
    Ok(header)
}

impl IcsHeader {
    fn apply_layout(&mut self, key: &str, value: &str) {
        match key {
            "layout sizes" => {
                self.axis_lengths = value
                    .split_whitespace()
                    .map(|t| {
                        t.parse().unwrap_or_else(|_| {
                            debug!("Could not parse axis length '{}'", t);
                            0
                        })
                    })
                    .collect();
            }
            "layout order" => {
                self.axes = value.split_whitespace().map(str::to_string).collect();
            }
            "layout significant_bits" => self.significant_bits = value.trim().parse().ok(),
            _ => {}
        }
    }

    fn apply_representation(&mut self, key: &str, value: &str) {
        match key {
            "representation byte_order" => self.byte_order = Some(value.to_string()),
            "representation format" => self.format = Some(value.to_string()),
            "representation compression" => self.compression = Some(value.to_string()),
            "representation sign" => self.signed = value == "signed",
            _ => {}
        }
    }

    fn apply_parameter(&mut self, key: &str, value: &str, level: MetadataLevel) {
        match key {
            "parameter scale" => self.pixel_sizes = Some(split_doubles(value)),
            "parameter t" => self.timestamps = Some(split_doubles(value)),
            "parameter units" => {
                self.units = Some(value.split_whitespace().map(str::to_string).collect())
            }
            "parameter ch" if level == MetadataLevel::All => {
                for (n, name) in value.split(' ').enumerate() {
                    self.acquisition.channel_names.insert(n, name.trim().to_string());
                }
            }
            _ => {}
        }
    }

    fn apply_history(&mut self, raw_key: &str, key: &str, value: String, level: MetadataLevel) {
        let number = value.trim().parse::<f64>().ok();

        match key {
            "history software" if value.contains("SVI") => {
                // Huygens writes rows bottom-up
                self.invert_y = true;
                return;
            }
            "history date" | "history created on" => {
                if let Some(space) = value.rfind(' ').filter(|&i| i > 0) {
                    self.date = Some(value[..space].to_string());
                }
                return;
            }
            "history creation date" => {
                self.date = Some(value);
                return;
            }
            "history type" => {
                if value.eq_ignore_ascii_case("time resolved")
                    || value.eq_ignore_ascii_case("FluorescenceLifetime")
                {
                    self.lifetime = true;
                }
                self.experiment_type = Some(value);
                return;
            }
            "history labels" => {
                self.labels = Some(value);
                return;
            }
            _ => {}
        }
        if level != MetadataLevel::All {
            return;
        }

        let acq = &mut self.acquisition;
        match key {
            "history" | "history text" => {
                acq.text_block.push_str(&value);
                acq.text_block.push('\n');
                self.global_meta.remove(raw_key);
            }
            k if k.starts_with("history gain") => {
                let n = k["history gain".len()..]
                    .trim()
                    .parse::<usize>()
                    .map(|n| n.saturating_sub(1))
                    .unwrap_or(0);
                if let Some(v) = number {
                    acq.gains.insert(n, v);
                }
            }
            k if k.starts_with("history laser") && k.ends_with("wavelength") => {
                let index = k["history laser".len()..]
                    .split(' ')
                    .next()
                    .and_then(|n| n.parse::<usize>().ok());
                let wave = value.replace("nm", "").trim().parse::<i64>();
                match (index, wave) {
                    (Some(i), Ok(w)) => {
                        acq.wavelengths.insert(i.saturating_sub(1), w);
                    }
                    _ => debug!("Could not parse wavelength '{}'", value),
                }
            }
            "history wavelength*" => {
                for (i, w) in value.split(' ').enumerate() {
                    if let Ok(w) = w.trim().parse() {
                        acq.wavelengths.insert(i, w);
                    }
                }
            }
            "history laser manufacturer" => acq.laser_manufacturer = Some(value),
            "history laser model" => acq.laser_model = Some(value),
            "history laser power" => acq.laser_power = number,
            "history laser rep rate" => {
                let rate = match value.rfind(' ') {
                    Some(i) => &value[..i],
                    None => value.as_str(),
                };
                acq.laser_repetition_rate = rate.trim().parse().ok();
            }
            "history objective type" | "history objective" => acq.objective_model = Some(value),
            "history objective immersion" => acq.immersion = Some(value),
            "history objective na" => acq.lens_na = number,
            "history objective workingdistance" => acq.working_distance = number,
            "history objective magnification" | "history objective mag" => {
                acq.magnification = number
            }
            "history camera manufacturer" => acq.detector_manufacturer = Some(value),
            "history camera model" => acq.detector_model = Some(value),
            "history author" | "history experimenter" => acq.last_name = Some(value),
            "history extents" => {
                acq.extents = Some(value.split(' ').map(|v| v.trim().parse().unwrap_or(0.0)).collect());
            }
            "history stage_xyzum" => {
                acq.stage_pos = Some(value.split(' ').map(|v| v.trim().parse().ok()).collect());
            }
            "history stage positionx" | "history stage positiony" | "history stage positionz" => {
                let axis = match key.as_bytes()[key.len() - 1] {
                    b'x' => 0,
                    b'y' => 1,
                    _ => 2,
                };
                let pos = acq.stage_pos.get_or_insert_with(|| vec![None; 3]);
                if pos.len() <= axis {
                    pos.resize(axis + 1, None);
                }
                pos[axis] = number;
            }
            "history other text" => acq.description = Some(value),
            k if k.starts_with("history step") && k.ends_with("name") => {
                let n = k["history step".len()..]
                    .split(' ')
                    .next()
                    .and_then(|n| n.parse::<usize>().ok());
                if let Some(n) = n {
                    acq.channel_names.insert(n, value);
                }
            }
            "history cube" => {
                let n = acq.channel_names.len();
                acq.channel_names.insert(n, value);
            }
            "history cube emm nm" => acq.em_waves = Some(vec![second_int(&value)]),
            "history cube exc nm" => acq.ex_waves = Some(vec![second_int(&value)]),
            "history microscope" => acq.microscope_model = Some(value),
            "history manufacturer" => acq.microscope_manufacturer = Some(value),
            "history exposure" => {
                let first = value.split(' ').next().unwrap_or("");
                acq.exposure_time = first.trim().parse().ok();
            }
            "history filterset" => acq.filter_set_model = Some(value),
            "history filterset dichroic name" => acq.dichroic_model = Some(value),
            "history filterset exc name" => acq.excitation_model = Some(value),
            "history filterset emm name" => acq.emission_model = Some(value),
            _ => {}
        }
    }

    fn apply_sensor(&mut self, key: &str, value: &str) {
        let acq = &mut self.acquisition;
        match key {
            "sensor s_params lambdaem" => acq.em_waves = Some(split_waves(value)),
            "sensor s_params lambdaex" => acq.ex_waves = Some(split_waves(value)),
            "sensor s_params pinholeradius" => {
                let pins = value.split(' ').filter(|p| !p.trim().is_empty());
                for (channel, pin) in pins.enumerate() {
                    match pin.trim().parse() {
                        Ok(v) => {
                            acq.pinholes.insert(channel, v);
                        }
                        Err(_) => debug!("Could not parse pinhole '{}'", pin),
                    }
                }
            }
            _ => {}
        }
    }
}

/// Whitespace-separated floats; unparsable entries become `None`.
fn split_doubles(value: &str) -> Vec<Option<f64>> {
    value
        .split_whitespace()
        .map(|t| {
            let v = t.parse().ok();
            if v.is_none() {
                debug!("Could not parse double value '{}'", t);
            }
            v
        })
        .collect()
}

/// Space-separated wavelengths, truncated to whole nanometers.
fn split_waves(value: &str) -> Vec<Option<i64>> {
    value
        .split(' ')
        .map(|w| w.trim().parse::<f64>().ok().map(|v| v as i64))
        .collect()
}

/// Integer in the second space-separated field, as in `"ex 488"`.
fn second_int(value: &str) -> Option<i64> {
    value.split(' ').nth(1).and_then(|v| v.trim().parse().ok())
}

/// Move the colour or scheme name of view color keys from the value into
/// the key, so `lut Green Fire green` and `lut Red` get distinct keys.
fn split_view_key(key: &str, value: &str) -> (String, String) {
    let lower_key = key.to_lowercase();
    let lower = value.to_lowercase();
    let index = if lower_key == "view view color lib lut" {
        let last = |name: &str| lower.rfind(name).map(|i| i as isize).unwrap_or(-1);
        let (red, green, blue) = (last("red"), last("green"), last("blue"));
        if red > 0 && red > green && red > blue {
            Some(red as usize + "red".len())
        } else if green > 0 && green > red && green > blue {
            Some(green as usize + "green".len())
        } else if blue > 0 && blue > red && blue > green {
            Some(blue as usize + "blue".len())
        } else {
            value.find(' ')
        }
    } else if lower_key == "view view color mode rgb set" {
        match lower.rfind("colors").filter(|&i| i > 0) {
            Some(i) => Some(i + "colors".len()),
            None => value.find(' '),
        }
    } else {
        None
    };

    let split = index
        .filter(|&i| i > 0)
        .and_then(|i| value.get(..i).map(|head| (i, head)));
    match split {
        Some((i, head)) => (
            format!("{} {}", key, head),
            value.get(i + 1..).unwrap_or("").to_string(),
        ),
        None => (key.to_string(), value.to_string()),
    }
}
