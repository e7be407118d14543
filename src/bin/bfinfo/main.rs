//! bfinfo - Tool for inspecting microscopy datasets.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use bioformats::meta::{MetadataGraph, NodeHandle, Slot};
use bioformats::util::min_max;
use bioformats::ImageReader;
use tracing::{debug, info, trace};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Slots worth printing for every node.
const SLOTS: &[Slot] = &[
    Slot::Instrument,
    Slot::Objective,
    Slot::Experimenter,
    Slot::Experiment,
    Slot::Detector,
    Slot::LightSource,
    Slot::FilterSet,
    Slot::Dichroic,
    Slot::EmissionFilters,
    Slot::ExcitationFilters,
    Slot::Annotations,
    Slot::Annotated,
    Slot::Plate,
    Slot::PlateAcquisitions,
    Slot::WellSamples,
    Slot::Image,
];

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr));
    // a second init only happens in tests
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "off",
            _ => filtered_args.push(arg),
        }
    }

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
    if json_mode {
        level = "off";
    }
    init_logging(level);

    let result = match filtered_args[0] {
        "info" | "i" => with_file(&filtered_args, "info", cmd_info),
        "meta" | "m" => with_file(&filtered_args, "meta", cmd_meta),
        "dump" | "d" => with_file(&filtered_args, "dump", |p| cmd_dump(p, json_mode)),
        "planes" | "p" => with_file(&filtered_args, "planes", cmd_planes),
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            print_version();
            Ok(())
        }
        // Default: if file exists, show info; otherwise error
        other => {
            if Path::new(other).exists() {
                cmd_info(other)
            } else {
                eprintln!("Unknown command: {}", other);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn with_file(args: &[&str], command: &str, run: impl FnOnce(&str) -> Result<()>) -> Result<()> {
    match args.get(1).filter(|s| !s.starts_with('-')) {
        Some(path) => run(path),
        None => {
            eprintln!("Error: missing file argument");
            eprintln!("Usage: bfinfo {} <file>", command);
            std::process::exit(1);
        }
    }
}

fn print_version() {
    println!(
        "bfinfo {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("BIOFORMATS_BUILD_DATE"),
        env!("BIOFORMATS_BUILD_TIME")
    );
}

fn print_help() {
    println!("bfinfo - microscopy dataset inspector");
    println!();
    println!("USAGE:");
    println!("    bfinfo [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>              Show series dimensions and pixel layout");
    println!("    m, meta   <file>              Show original key/value metadata");
    println!("    d, dump   <file> [--json]     Dump series and the resolved metadata graph");
    println!("    p, planes <file>              Decode every plane and show min/max");
    println!("    h, help                       Show this help");
    println!("    --version                     Show version and build date");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress all log output");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
}

fn open(path: &str) -> Result<ImageReader> {
    info!("Opening dataset: {}", path);
    let reader = ImageReader::open(path).with_context(|| format!("failed to open {}", path))?;
    debug!("Detected format: {}", reader.format());
    Ok(reader)
}

fn cmd_info(path: &str) -> Result<()> {
    let mut reader = open(path)?;

    println!("Dataset: {}", path);
    println!("Format: {}", reader.format());
    println!("Files:");
    for file in reader.used_files() {
        println!("  {}", file.display());
    }
    println!("Series: {}", reader.series_count());

    for s in 0..reader.series_count() {
        reader.set_series(s)?;
        let series = reader.series()?;
        println!();
        println!("Series #{}", s);
        println!("  Size: {} x {}", series.size_x(), series.size_y());
        println!(
            "  Z/C/T: {} / {} / {}",
            series.size_z(),
            series.size_c(),
            series.size_t()
        );
        println!("  Image count: {}", series.image_count());
        println!("  Dimension order: {}", series.dimension_order());
        println!(
            "  Pixel type: {} ({} significant bits, {})",
            series.pixel_type(),
            series.bits_per_pixel(),
            if series.little_endian() { "little endian" } else { "big endian" }
        );
        println!(
            "  RGB: {} ({} samples, interleaved={})",
            series.is_rgb(),
            series.rgb_channel_count(),
            series.interleaved()
        );
        let dims: Vec<String> = series
            .channel_dims()
            .iter()
            .map(|d| format!("{}x{}", d.length, d.kind))
            .collect();
        println!("  Channel dims: {}", dims.join(", "));
    }
    Ok(())
}

fn cmd_meta(path: &str) -> Result<()> {
    let reader = open(path)?;
    let meta = reader.global_meta();
    println!("Original metadata ({} entries)", meta.len());
    let mut entries: Vec<_> = meta.iter().collect();
    entries.sort();
    for (key, value) in entries {
        println!("  {} = {}", key, value);
    }
    Ok(())
}

fn linked_ids(graph: &MetadataGraph, handle: NodeHandle, slot: Slot) -> Vec<String> {
    graph
        .get_linked(handle, slot)
        .unwrap_or_default()
        .iter()
        .filter_map(|&h| graph.node(h))
        .map(|n| n.id().to_string())
        .collect()
}

fn cmd_dump(path: &str, json_mode: bool) -> Result<()> {
    let mut reader = open(path)?;

    let mut series = Vec::new();
    for s in 0..reader.series_count() {
        reader.set_series(s)?;
        let d = reader.series()?;
        series.push(serde_json::json!({
            "index": s,
            "sizeX": d.size_x(),
            "sizeY": d.size_y(),
            "sizeZ": d.size_z(),
            "sizeC": d.size_c(),
            "sizeT": d.size_t(),
            "imageCount": d.image_count(),
            "dimensionOrder": d.dimension_order().to_string(),
            "pixelType": d.pixel_type().to_string(),
            "littleEndian": d.little_endian(),
            "rgbChannelCount": d.rgb_channel_count(),
        }));
    }

    let (graph, unresolved) = reader.resolve_metadata()?;
    trace!("Graph has {} nodes", graph.len());

    if json_mode {
        let nodes: Vec<serde_json::Value> = graph
            .iter()
            .map(|(handle, node)| {
                let attrs: serde_json::Map<String, serde_json::Value> = node
                    .attrs()
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
                    .collect();
                let links: serde_json::Map<String, serde_json::Value> = SLOTS
                    .iter()
                    .map(|&slot| (slot.name().to_string(), linked_ids(&graph, handle, slot)))
                    .filter(|(_, ids)| !ids.is_empty())
                    .map(|(slot, ids)| (slot, serde_json::Value::from(ids)))
                    .collect();
                serde_json::json!({
                    "id": node.id(),
                    "kind": node.kind().name(),
                    "attributes": attrs,
                    "links": links,
                })
            })
            .collect();
        let unresolved: Vec<String> = unresolved.iter().map(|u| u.to_string()).collect();
        let out = serde_json::json!({
            "dataset": path,
            "series": series,
            "nodes": nodes,
            "unresolved": unresolved,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Dataset: {}", path);
    for s in &series {
        println!("Series: {}", s);
    }
    println!();
    println!("Metadata graph ({} nodes)", graph.len());
    for (handle, node) in graph.iter() {
        println!("[{}] {}", node.kind(), node.id());
        for (key, value) in node.attrs().iter() {
            println!("    {} = {}", key, value);
        }
        for &slot in SLOTS {
            let ids = linked_ids(&graph, handle, slot);
            if !ids.is_empty() {
                println!("    -> {}: {}", slot, ids.join(", "));
            }
        }
    }
    if !unresolved.is_empty() {
        println!();
        println!("Unresolved references ({})", unresolved.len());
        for u in unresolved {
            println!("  {}", u);
        }
    }
    Ok(())
}

fn cmd_planes(path: &str) -> Result<()> {
    let mut reader = open(path)?;

    for s in 0..reader.series_count() {
        reader.set_series(s)?;
        let (pixel_type, little_endian, count) = {
            let d = reader.series()?;
            (d.pixel_type(), d.little_endian(), d.image_count())
        };
        println!("Series #{} ({} planes, {})", s, count, pixel_type);

        for index in 0..count {
            let coord = reader.series()?.index_to_coord(index)?;
            let plane = reader
                .open_plane(index)
                .with_context(|| format!("series {} plane {}", s, index))?;
            match min_max(&plane, pixel_type, little_endian) {
                Some((min, max)) => println!(
                    "  #{:<4} z={} c={} t={}  min={} max={}",
                    index, coord.z, coord.c, coord.t, min, max
                ),
                None => println!("  #{:<4} z={} c={} t={}  (empty)", index, coord.z, coord.c, coord.t),
            }
        }
    }
    Ok(())
}
