//! Command-line batch geotagger
//!
//! Walks a photo directory, loads the GPX logs from its `gpx/` subfolder,
//! interpolates a position for every timestamped photo, writes the result
//! into the files' EXIF tags, and moves photos that could not be matched
//! into a `no_gps/` subfolder for manual handling.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use geotag::{
    check_exiftool, find_image_files, load_track_points, match_photos, read_photo_metadata,
    write_matched, GeotagConfig, MatchStatus,
};

struct CliArgs {
    photo_dir: PathBuf,
    max_gap_seconds: Option<i64>,
    config_file: Option<PathBuf>,
    dry_run: bool,
}

fn print_usage() {
    eprintln!("Usage: geotag <photo_dir> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --max-gap SECONDS   Maximum track gap to interpolate across (default 3600)");
    eprintln!("  --config FILE       Load settings from a JSON config file");
    eprintln!("  --dry-run           Match and report without writing or moving files");
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut photo_dir = None;
    let mut max_gap_seconds = None;
    let mut config_file = None;
    let mut dry_run = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--max-gap" => {
                let value = iter.next().ok_or("--max-gap requires a value")?;
                let seconds: i64 = value
                    .parse()
                    .map_err(|_| format!("Invalid --max-gap value '{}'", value))?;
                if seconds <= 0 {
                    return Err("--max-gap must be positive".to_string());
                }
                max_gap_seconds = Some(seconds);
            }
            "--config" => {
                let value = iter.next().ok_or("--config requires a value")?;
                config_file = Some(PathBuf::from(value));
            }
            "--dry-run" => dry_run = true,
            other if other.starts_with('-') => {
                return Err(format!("Unknown option '{}'", other));
            }
            other => {
                if photo_dir.is_some() {
                    return Err("Only one photo directory may be given".to_string());
                }
                photo_dir = Some(PathBuf::from(other));
            }
        }
    }

    Ok(CliArgs {
        photo_dir: photo_dir.ok_or("Missing photo directory argument")?,
        max_gap_seconds,
        config_file,
        dry_run,
    })
}

fn run(args: CliArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config_file {
        Some(path) => GeotagConfig::load_from_file(path)?,
        None => GeotagConfig::default(),
    };
    if let Some(seconds) = args.max_gap_seconds {
        config.max_gap_seconds = seconds;
    }
    config.validate()?;

    if !args.photo_dir.is_dir() {
        return Err(format!("'{}' is not a directory", args.photo_dir.display()).into());
    }

    let version = check_exiftool(&config.exiftool_path)?;
    println!("Using exiftool {}", version);

    // Step 1: track log
    let gpx_dir = args.photo_dir.join(&config.gpx_subdir);
    let track = load_track_points(&gpx_dir)?;
    if track.is_empty() {
        return Err(format!(
            "No usable track points found in '{}'",
            gpx_dir.display()
        )
        .into());
    }
    println!("Loaded {} track points", track.len());

    // Step 2: photo metadata
    let files = find_image_files(&args.photo_dir)?;
    if files.is_empty() {
        println!("No image files found in '{}'", args.photo_dir.display());
        return Ok(());
    }
    let mut photos = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        println!(
            "[{}/{}] Reading {}",
            i + 1,
            files.len(),
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        photos.push(read_photo_metadata(&config.exiftool_path, path));
    }

    // Step 3: matching
    match_photos(&mut photos, &track, config.max_gap());

    // Step 4: write results and set aside the unmatched
    let no_match_dir = args.photo_dir.join(&config.no_match_subdir);
    let mut already_gps = 0usize;
    let mut tagged = 0usize;
    let mut no_time = 0usize;
    let mut no_match = 0usize;
    let mut errors = 0usize;

    for record in &mut photos {
        match record.status {
            MatchStatus::HasGps => {
                already_gps += 1;
                println!("  {}: already has GPS data, skipped", record.filename);
            }
            MatchStatus::Matched => {
                if args.dry_run {
                    tagged += 1;
                    if let Some(fix) = record.matched {
                        println!(
                            "  {}: would tag with {:.6}, {:.6} ({:.1} m)",
                            record.filename, fix.lat, fix.lon, fix.ele
                        );
                    }
                } else if write_matched(&config.exiftool_path, record) {
                    tagged += 1;
                    if let Some(fix) = record.matched {
                        println!(
                            "  {}: tagged with {:.6}, {:.6} ({:.1} m)",
                            record.filename, fix.lat, fix.lon, fix.ele
                        );
                    }
                } else {
                    errors += 1;
                }
            }
            MatchStatus::NoTime | MatchStatus::NoMatch => {
                let reason = if record.status == MatchStatus::NoTime {
                    no_time += 1;
                    "no capture time"
                } else {
                    no_match += 1;
                    "no track match"
                };
                if args.dry_run {
                    println!("  {}: {} (would move to {})", record.filename, reason, config.no_match_subdir);
                } else {
                    fs::create_dir_all(&no_match_dir)?;
                    let dest = no_match_dir.join(&record.filename);
                    match fs::rename(&record.filepath, &dest) {
                        Ok(()) => {
                            println!("  {}: {}, moved to {}", record.filename, reason, config.no_match_subdir)
                        }
                        Err(e) => {
                            errors += 1;
                            eprintln!("Warning: could not move '{}': {}", record.filename, e);
                        }
                    }
                }
            }
            // match_photos never leaves these behind
            MatchStatus::Pending | MatchStatus::Written | MatchStatus::Error => {}
        }
    }

    println!();
    println!("Done: {} photos processed", photos.len());
    println!("  already had GPS: {}", already_gps);
    println!("  tagged:          {}", tagged);
    println!("  no capture time: {}", no_time);
    println!("  no track match:  {}", no_match);
    println!("  errors:          {}", errors);
    if args.dry_run {
        println!("(dry run: no files were modified)");
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        process::exit(if args.is_empty() { 1 } else { 0 });
    }

    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(parsed) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
