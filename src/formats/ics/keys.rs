//! ICS header key tables.
//!
//! Rows are regular expressions matched against whole lower-cased
//! tokens. Within a table the most qualified row must come first, so
//! `{"a", "b"}` precedes `{"a"}`; otherwise rows are alphabetical.

use crate::text::{Classifier, KeyTable};
use crate::util::Result;

type Rows = &'static [&'static [&'static str]];

const DOCUMENT_KEYS: Rows = &[
    &["date"],
    &["document", "average"],
    &["document"],
    &["gmtdate"],
    &["label"],
];

const HISTORY_KEYS: Rows = &[
    &["a\\d"],
    &["acquisition", "acquire\\..*."],
    &["acquisition", "laserbox\\..*."],
    &["acquisition", "modules\\(.*."],
    &["acquisition", "objective", "position"],
    &["adc", "resolution"],
    &["atd_hardware", "ver"],
    &["atd_libraries", "ver"],
    &["atd_microscopy", "ver"],
    &["author"],
    &["averagecount"],
    &["averagequality"],
    &["beam", "zoom"],
    &["binning"],
    &["bits/pixel"],
    &["black", "level"],
    &["black", "level\\*"],
    &["black_level"],
    &["camera", "manufacturer"],
    &["camera", "model"],
    &["camera"],
    &["cfd", "holdoff"],
    &["cfd", "limit", "high"],
    &["cfd", "limit", "low"],
    &["cfd", "zc", "level"],
    &["channel\\*"],
    &["collection", "time"],
    &["cols"],
    &["company"],
    &["count", "increment"],
    &["created", "on"],
    &["creation", "date"],
    &["cube", "descriptio"],
    &["cube", "description"],
    &["cube", "emm", "nm"],
    &["cube", "exc", "nm"],
    &["cube"],
    &["date"],
    &["dategmt"],
    &["dead", "time", "comp"],
    &["desc", "exc", "turret"],
    &["desc", "emm", "turret"],
    &["detector", "type"],
    &["detector"],
    &["dimensions"],
    &["direct", "turret"],
    &["dither", "range"],
    &["dwell"],
    &["excitationfwhm"],
    &["experiment"],
    &["experimenter"],
    &["expon.", "order"],
    &["exposure"],
    &["exposure_time"],
    &["ext", "latch", "delay"],
    &["extents"],
    &["filterset", "dichroic", "name"],
    &["filterset", "dichroic", "nm"],
    &["filterset", "emm", "name"],
    &["filterset", "emm", "nm"],
    &["filterset", "exc", "name"],
    &["filterset", "exc", "nm"],
    &["filterset"],
    &["filter\\*"],
    &["firmware"],
    &["fret", "backgr\\d"],
    &["frametime"],
    &["gain"],
    &["gain\\d"],
    &["gain\\*"],
    &["gamma"],
    &["icsviewer", "ver"],
    &["ht\\*"],
    &["id"],
    &["illumination", "mode", "laser"],
    &["illumination", "mode"],
    &["image", "bigendian"],
    &["image", "bpp"],
    &["image", "form"],
    &["image", "physical_sizex"],
    &["image", "physical_sizey"],
    &["image", "sizex"],
    &["image", "sizey"],
    &["labels"],
    &["lamp", "manufacturer"],
    &["lamp", "model"],
    &["laser", "firmware"],
    &["laser", "manufacturer"],
    &["laser", "model"],
    &["laser", "power"],
    &["laser", "rep", "rate"],
    &["laser", "type"],
    &["laser\\d", "intensity"],
    &["laser\\d", "name"],
    &["laser\\d", "wavelength"],
    &["left"],
    &["length"],
    &["line", "compressio"],
    &["line", "compression"],
    &["linetime"],
    &["magnification"],
    &["manufacturer"],
    &["max", "photon", "coun"],
    &["max", "photon", "count"],
    &["memory", "bank"],
    &["metadata", "format", "ver"],
    &["microscope", "built", "on"],
    &["microscope", "name"],
    &["microscope"],
    &["mirror", "\\d"],
    &["mode"],
    &["noiseval"],
    &["no.", "frames"],
    &["objective", "detail"],
    &["objective", "immersion"],
    &["objective", "mag"],
    &["objective", "magnification"],
    &["objective", "na"],
    &["objective", "type"],
    &["objective", "workingdistance"],
    &["objective"],
    &["offsets"],
    &["other", "text"],
    &["passcount"],
    &["pinhole"],
    &["pixel", "clock"],
    &["pixel", "time"],
    &["pmt"],
    &["polarity"],
    &["region"],
    &["rep", "period"],
    &["repeat", "time"],
    &["revision"],
    &["routing", "chan", "x"],
    &["routing", "chan", "y"],
    &["rows"],
    &["scan", "borders"],
    &["scan", "flyback"],
    &["scan", "pattern"],
    &["scan", "pixels", "x"],
    &["scan", "pixels", "y"],
    &["scan", "pos", "x"],
    &["scan", "pos", "y"],
    &["scan", "resolution"],
    &["scan", "speed"],
    &["scan", "zoom"],
    &["scanner", "lag"],
    &["scanner", "pixel", "time"],
    &["scanner", "resolution"],
    &["scanner", "speed"],
    &["scanner", "xshift"],
    &["scanner", "yshift"],
    &["scanner", "zoom"],
    &["shutter\\d"],
    &["shutter", "type"],
    &["software"],
    &["spectral", "bin_definition"],
    &["spectral", "calibration", "gain", "data"],
    &["spectral", "calibration", "gain", "mode"],
    &["spectral", "calibration", "offset", "data"],
    &["spectral", "calibration", "offset", "mode"],
    &["spectral", "calibration", "sensitivity", "mode"],
    &["spectral", "central_wavelength"],
    &["spectral", "laser_shield"],
    &["spectral", "laser_shield_width"],
    &["spectral", "resolution"],
    &["stage", "controller"],
    &["stage", "firmware"],
    &["stage", "manufacturer"],
    &["stage", "model"],
    &["stage", "pos"],
    &["stage", "positionx"],
    &["stage", "positiony"],
    &["stage", "positionz"],
    &["stage_xyzum"],
    &["step\\d", "channel", "\\d"],
    &["step\\d", "gain", "\\d"],
    &["step\\d", "laser"],
    &["step\\d", "name"],
    &["step\\d", "pinhole"],
    &["step\\d", "pmt", "ch", "\\d"],
    &["step\\d", "shutter", "\\d"],
    &["step\\d"],
    &["stop", "on", "o'flow"],
    &["stop", "on", "time"],
    &["study"],
    &["sync", "freq", "div"],
    &["sync", "holdoff"],
    &["sync"],
    &["tac", "gain"],
    &["tac", "limit", "low"],
    &["tac", "offset"],
    &["tac", "range"],
    &["tau\\d"],
    &["tcspc", "adc", "res"],
    &["tcspc", "adc", "resolution"],
    &["tcspc", "approx", "adc", "rate"],
    &["tcspc", "approx", "cfd", "rate"],
    &["tcspc", "approx", "tac", "rate"],
    &["tcspc", "bh"],
    &["tcspc", "cfd", "holdoff"],
    &["tcspc", "cfd", "limit", "high"],
    &["tcspc", "cfd", "limit", "low"],
    &["tcspc", "cfd", "zc", "level"],
    &["tcspc", "clock", "polarity"],
    &["tcspc", "collection", "time"],
    &["tcspc", "count", "increment"],
    &["tcspc", "dead", "time", "enabled"],
    &["tcspc", "delay"],
    &["tcspc", "dither", "range"],
    &["tcspc", "left", "border"],
    &["tcspc", "line", "compression"],
    &["tcspc", "mem", "offset"],
    &["tcspc", "operation", "mode"],
    &["tcspc", "overflow"],
    &["tcspc", "pixel", "clk", "divider"],
    &["tcspc", "pixel", "clock"],
    &["tcspc", "routing", "x"],
    &["tcspc", "routing", "y"],
    &["tcspc", "scan", "x"],
    &["tcspc", "scan", "y"],
    &["tcspc", "sync", "divider"],
    &["tcspc", "sync", "holdoff"],
    &["tcspc", "sync", "rate"],
    &["tcspc", "sync", "threshold"],
    &["tcspc", "sync", "zc", "level"],
    &["tcspc", "tac", "gain"],
    &["tcspc", "tac", "limit", "high"],
    &["tcspc", "tac", "limit", "low"],
    &["tcspc", "tac", "offset"],
    &["tcspc", "tac", "range"],
    &["tcspc", "time", "window"],
    &["tcspc", "top", "border"],
    &["tcspc", "total", "frames"],
    &["tcspc", "total", "time"],
    &["tcspc", "trigger"],
    &["tcspc", "x", "sync", "polarity"],
    &["tcspc", "y", "sync", "polarity"],
    &["text"],
    &["time"],
    &["title"],
    &["top"],
    &["transmission"],
    &["trigger"],
    &["type"],
    &["units"],
    &["version"],
    &["wavelength\\*"],
    &["x", "amplitude"],
    &["y", "amplitude"],
    &["x", "delay"],
    &["y", "delay"],
    &["x", "offset"],
    &["y", "offset"],
    &["z", "\\(background\\)"],
];

const LAYOUT_KEYS: Rows = &[
    &["coordinates"],
    &["order"],
    &["parameters"],
    &["real_significant_bits"],
    &["significant_bits"],
    &["significant_channels"],
    &["sizes"],
];

const PARAMETER_KEYS: Rows = &[
    &["allowedlinemodes"],
    &["ch"],
    &["higher_limit"],
    &["labels"],
    &["lower_limit"],
    &["origin"],
    &["range"],
    &["sample_width", "ch"],
    &["sample_width"],
    &["scale"],
    &["units", "adc-units", "channels"],
    &["units", "adc-units", "nm"],
    &["units"],
];

const REPRESENTATION_KEYS: Rows = &[&["byte_order"], &["compression"], &["format"], &["sign"]];

const SENSOR_KEYS: Rows = &[
    &["model"],
    &["s_params", "channels"],
    &["s_params", "exphotoncnt"],
    &["s_params", "lambdaem"],
    &["s_params", "lambdaex"],
    &["s_params", "numaperture"],
    &["s_params", "pinholeradius"],
    &["s_params", "pinholespacing"],
    // misspelled variants seen in the wild
    &["s_params", "refinxlensmedium"],
    &["s_params", "refinxmedium"],
    &["s_params", "refrinxlensmedium"],
    &["s_params", "refrinxmedium"],
    &["type"],
];

const VIEW_KEYS: Rows = &[
    &["view", "color", "lib", "lut"],
    &["view", "color", "count"],
    &["view", "color", "doc", "scale"],
    &["view", "color", "mode", "rgb", "set"],
    &["view", "color", "mode", "rgb"],
    &["view", "color", "schemes"],
    &["view", "color", "view", "active"],
    &["view", "color"],
    &["view\\d", "alpha"],
    &["view\\d", "alphastate"],
    &["view\\d", "annotation", "annellipse"],
    &["view\\d", "annotation", "annpoint"],
    &["view\\d", "autoresize"],
    &["view\\d", "axis"],
    &["view\\d", "blacklevel"],
    &["view\\d", "color"],
    &["view\\d", "cursor"],
    &["view\\d", "dimviewoption"],
    &["view\\d", "gamma"],
    &["view\\d", "ignoreaspect"],
    &["view\\d", "intzoom"],
    &["view\\d", "live"],
    &["view\\d", "order"],
    &["view\\d", "port"],
    &["view\\d", "position"],
    &["view\\d", "saturation"],
    &["view\\d", "scale"],
    &["view\\d", "showall"],
    &["view\\d", "showcursor"],
    &["view\\d", "showindex"],
    &["view\\d", "size"],
    &["view\\d", "synchronize"],
    &["view\\d", "tile"],
    &["view\\d", "useunits"],
    &["view\\d", "zoom"],
    &["view\\d"],
    &["view"],
];

/// Legacy keys without category context, matched anywhere in a line
/// when the category table has no row for it.
const OTHER_KEYS: Rows = &[
    &["cube", "descriptio"],
    &["cube", "description"],
    &["image", "form"],
    &["refinxlensmedium"],
    &["refinxmedium"],
    &["scil_type"],
    &["source"],
];

/// Build the classifier for ICS headers.
pub fn classifier() -> Result<Classifier> {
    Ok(Classifier::new(KeyTable::new(OTHER_KEYS)?)
        .with_category("document", KeyTable::new(DOCUMENT_KEYS)?)
        .with_category("history", KeyTable::new(HISTORY_KEYS)?)
        .with_category("layout", KeyTable::new(LAYOUT_KEYS)?)
        .with_category("parameter", KeyTable::new(PARAMETER_KEYS)?)
        .with_category("representation", KeyTable::new(REPRESENTATION_KEYS)?)
        .with_category("sensor", KeyTable::new(SENSOR_KEYS)?)
        .with_category("view", KeyTable::new(VIEW_KEYS)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{tokenize, MatchTier};

    #[test]
    fn test_tables_compile() {
        let c = classifier().unwrap();
        for category in ["document", "history", "layout", "parameter", "representation", "sensor", "view"] {
            assert!(c.has_category(category));
        }
    }

    #[test]
    fn test_history_keys() {
        let c = classifier().unwrap();
        let kv = c.classify(&tokenize("history\tobjective\tNA\t1.40")).unwrap();
        assert_eq!((kv.key.as_str(), kv.value.as_str()), ("history objective NA", "1.40"));

        let kv = c.classify(&tokenize("history filterset dichroic name FT 395")).unwrap();
        assert_eq!(kv.key, "history filterset dichroic name");
        assert_eq!(kv.value, "FT 395");

        let kv = c.classify(&tokenize("history laser1 wavelength 488 nm")).unwrap();
        assert_eq!(kv.key, "history laser1 wavelength");
    }

    #[test]
    fn test_layout_and_sensor_keys() {
        let c = classifier().unwrap();
        let kv = c.classify(&tokenize("layout\tsizes\t16\t64\t64\t3")).unwrap();
        assert_eq!(kv.key, "layout sizes");
        assert_eq!(kv.value, "16 64 64 3");

        let kv = c.classify(&tokenize("sensor s_params LambdaEm 520 610")).unwrap();
        assert_eq!(kv.key, "sensor s_params LambdaEm");
        assert_eq!(kv.tier, MatchTier::Category);
    }

    #[test]
    fn test_other_keys_reached_from_category() {
        let c = classifier().unwrap();
        let kv = c.classify(&tokenize("document scil_type g3d")).unwrap();
        assert_eq!(kv.tier, MatchTier::Other);
        assert_eq!(kv.key, "document scil_type");
        assert_eq!(kv.value, "g3d");
    }
}
