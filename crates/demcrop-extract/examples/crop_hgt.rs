//! Example: Crop a window out of an SRTM3 tile and print it.
//!
//! Usage: cargo run --example crop_hgt -- <lat_min> <lng_min> <lat_max> <lng_max> <hgt_file>

use demcrop_extract::{extract_hgt, ExtractConfig, GeoBoundingBox};
use std::env;
use std::time::Instant;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 6 {
        eprintln!("Usage: {} <lat_min> <lng_min> <lat_max> <lng_max> <hgt_file>", args[0]);
        eprintln!("Example: {} 45.10 6.10 45.11 6.11 ./N45E006.hgt", args[0]);
        std::process::exit(1);
    }

    let coords: Vec<f64> = args[1..5]
        .iter()
        .map(|s| s.parse().expect("Invalid coordinate"))
        .collect();
    let bbox = GeoBoundingBox::new(coords[0], coords[1], coords[2], coords[3])
        .expect("Invalid bounding box");

    let start = Instant::now();
    let mut out = Vec::new();
    match extract_hgt(&args[5], &bbox, &ExtractConfig::default(), &mut out) {
        Ok(report) => {
            println!("{}", String::from_utf8_lossy(&out));
            eprintln!(
                "{} samples in {:.3}s",
                report.samples,
                start.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
