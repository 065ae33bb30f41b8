// ============================================================================
// pixlab CLI — headless batch pixel processing
// ============================================================================
//
// Usage examples:
//   pixlab -i photo.png --scale 0.5 -o small.png
//   pixlab -i "shots/*.jpg" --curve 64,0,192,255 --output-dir out/ --format png
//   pixlab -i photo.png --kernel sharpen -o sharp.png
//   pixlab -i photo.png --kernel "0,-1,0,-1,5,-1,0,-1,0" -o custom.png
//   pixlab -i photo.png --resize 800x600 --keep-aspect -o thumb.png
//   pixlab -i photo.png --pick 10,20
//   pixlab -i photo.png --histogram hist.csv
//
// Operations apply in a fixed order: resize/scale, then tone curve, then
// kernel. All processing runs synchronously on the current thread; the pixel
// loops themselves parallelize over rows internally.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{self, SaveFormat};
use crate::log_err;
use crate::ops::curves::CurvePoints;
use crate::ops::histogram::Histogram;
use crate::ops::kernel::Kernel;
use crate::ops::resample;
use crate::session::EditorSession;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// pixlab headless image processor.
///
/// Scale, tone-curve, and convolution-filter raster images without a GUI.
#[derive(Parser, Debug)]
#[command(
    name = "pixlab",
    about = "pixlab headless batch image processor",
    long_about = "Apply nearest-neighbor scaling, two-point tone curves and 3x3\n\
                  convolution kernels to image files, or inspect them (eyedropper,\n\
                  channel histograms) — no GUI required.\n\n\
                  Example:\n  \
                  pixlab --input photo.png --scale 0.5 --output small.png\n  \
                  pixlab -i \"*.jpg\" --kernel sharpen --output-dir out/ --format png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the target format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, bmp.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Nearest-neighbor scale factor (e.g. 0.5, 2.0). Mutually exclusive with --resize.
    #[arg(short, long, value_name = "FACTOR")]
    pub scale: Option<f64>,

    /// Nearest-neighbor resize to explicit dimensions, e.g. 800x600.
    #[arg(long, value_name = "WxH")]
    pub resize: Option<String>,

    /// With --resize: shrink the target box to preserve the source aspect ratio.
    #[arg(long)]
    pub keep_aspect: bool,

    /// Tone curve control points: input1,output1,input2,output2 (each 0–255,
    /// input1 < input2). Applied to R, G and B through a lookup table.
    #[arg(long, value_name = "I1,O1,I2,O2")]
    pub curve: Option<String>,

    /// Convolution kernel: a preset name (identity, sharpen, gaussian,
    /// box-blur) or nine comma-separated weights, row-major.
    #[arg(short, long, value_name = "PRESET|WEIGHTS")]
    pub kernel: Option<String>,

    /// Eyedropper: print the color at pixel X,Y of each input and exit
    /// status only (no output file required).
    #[arg(long, value_name = "X,Y")]
    pub pick: Option<String>,

    /// Write the 256-bin R,G,B histogram of the processed image as CSV.
    /// Only valid for single-file input.
    #[arg(long, value_name = "FILE")]
    pub histogram: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything parsed and validated once, before touching any file.
struct Pipeline {
    scale: Option<f64>,
    resize: Option<(u32, u32)>,
    keep_aspect: bool,
    curve: Option<CurvePoints>,
    kernel: Option<Kernel>,
    pick: Option<(u32, u32)>,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    // Multiple inputs require --output-dir, not a single --output path.
    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }
    if inputs.len() > 1 && args.histogram.is_some() {
        eprintln!("error: --histogram only accepts a single input file.");
        return ExitCode::FAILURE;
    }

    let pipeline = match build_pipeline(&args) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("error: {}", msg);
            return ExitCode::FAILURE;
        }
    };

    let save_format = resolve_format(args.format.as_deref(), args.output.as_deref());

    let mut failures = 0usize;
    for input in &inputs {
        let started = Instant::now();
        match process_file(input, &args, &pipeline, save_format) {
            Ok(()) => {
                if args.verbose {
                    println!("{}: done in {:.1?}", input.display(), started.elapsed());
                }
            }
            Err(msg) => {
                eprintln!("{}: {}", input.display(), msg);
                log_err!("{}: {}", input.display(), msg);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!("{} of {} file(s) failed.", failures, inputs.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// ============================================================================
// Per-file processing
// ============================================================================

fn process_file(
    input: &Path,
    args: &CliArgs,
    pipeline: &Pipeline,
    save_format: SaveFormat,
) -> Result<(), String> {
    let mut session = EditorSession::load_from_path(input).map_err(|e| e.to_string())?;

    if let Some((x, y)) = pipeline.pick {
        match session.sample(x, y) {
            Some([r, g, b, a]) => {
                println!("{}: rgb({}, {}, {}) alpha {} at {},{}", input.display(), r, g, b, a, x, y)
            }
            None => {
                return Err(format!(
                    "pixel {},{} is outside the {}x{} image",
                    x,
                    y,
                    session.current().width(),
                    session.current().height()
                ));
            }
        }
    }

    if let Some((w, h)) = pipeline.resize {
        let (w, h) = if pipeline.keep_aspect {
            let cur = session.current();
            resample::fit_dimensions(cur.width(), cur.height(), w, h)
        } else {
            (w, h)
        };
        session.resize(w, h).map_err(|e| e.to_string())?;
    } else if let Some(factor) = pipeline.scale {
        session.scale(factor).map_err(|e| e.to_string())?;
    }

    if let Some(points) = &pipeline.curve {
        session.curve(points);
    }

    if let Some(kernel) = &pipeline.kernel {
        session.kernel(kernel);
    }

    if let Some(csv_path) = &args.histogram {
        write_histogram_csv(&session.histogram(), csv_path)
            .map_err(|e| format!("failed to write histogram: {}", e))?;
    }

    if let Some(out_path) = output_path_for(input, args, save_format) {
        io::encode_and_write(session.current(), &out_path, save_format, args.quality)
            .map_err(|e| format!("failed to write {}: {}", out_path.display(), e))?;
    }

    Ok(())
}

/// Destination path for one input, or `None` when no output was requested
/// (inspection-only runs: --pick / --histogram).
fn output_path_for(input: &Path, args: &CliArgs, format: SaveFormat) -> Option<PathBuf> {
    if let Some(dir) = &args.output_dir {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        return Some(dir.join(format!("{}.{}", stem, format.extension())));
    }
    args.output.clone()
}

fn write_histogram_csv(hist: &Histogram, path: &Path) -> std::io::Result<()> {
    let mut csv = String::with_capacity(256 * 16);
    csv.push_str("level,r,g,b\n");
    for i in 0..256 {
        // Writing into a String cannot fail.
        let _ = writeln!(csv, "{},{},{},{}", i, hist.r[i], hist.g[i], hist.b[i]);
    }
    std::fs::write(path, csv)
}

// ============================================================================
// Argument parsing helpers
// ============================================================================

fn build_pipeline(args: &CliArgs) -> Result<Pipeline, String> {
    if args.scale.is_some() && args.resize.is_some() {
        return Err("--scale and --resize are mutually exclusive.".to_string());
    }

    let resize = args.resize.as_deref().map(parse_dimensions).transpose()?;
    let curve = args.curve.as_deref().map(parse_curve).transpose()?;
    let kernel = args.kernel.as_deref().map(parse_kernel).transpose()?;
    let pick = args.pick.as_deref().map(parse_coordinate).transpose()?;

    Ok(Pipeline {
        scale: args.scale,
        resize,
        keep_aspect: args.keep_aspect,
        curve,
        kernel,
        pick,
    })
}

/// Expand glob patterns / literal paths into concrete input files.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        match glob::glob(pattern) {
            Ok(paths) => {
                let mut matched = false;
                for path in paths.flatten() {
                    if path.is_file() {
                        inputs.push(path);
                        matched = true;
                    }
                }
                // A literal path with glob metacharacters stripped out by a
                // shell, or simply no matches: keep it so the user gets a
                // per-file error instead of silence.
                if !matched && !pattern.contains(['*', '?', '[']) {
                    inputs.push(PathBuf::from(pattern));
                }
            }
            Err(_) => inputs.push(PathBuf::from(pattern)),
        }
    }
    inputs
}

fn resolve_format(format: Option<&str>, output: Option<&Path>) -> SaveFormat {
    if let Some(name) = format {
        if let Some(f) = SaveFormat::from_name(name) {
            return f;
        }
        eprintln!("warning: unknown format '{}', defaulting to png.", name);
        return SaveFormat::Png;
    }
    output
        .and_then(SaveFormat::from_extension)
        .unwrap_or(SaveFormat::Png)
}

/// Parse "800x600" (also accepts "800X600").
fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH (e.g. 800x600), got '{}'", s))?;
    let w = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("bad width in '{}'", s))?;
    let h = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("bad height in '{}'", s))?;
    Ok((w, h))
}

/// Parse "i1,o1,i2,o2" into validated curve control points.
fn parse_curve(s: &str) -> Result<CurvePoints, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!(
            "expected four comma-separated levels (input1,output1,input2,output2), got '{}'",
            s
        ));
    }
    let mut levels = [0u8; 4];
    for (slot, part) in levels.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u8>()
            .map_err(|_| format!("curve level '{}' is not in 0–255", part))?;
    }
    CurvePoints::new(levels[0], levels[1], levels[2], levels[3]).map_err(|e| e.to_string())
}

/// Parse a preset name or nine comma-separated weights, row-major.
fn parse_kernel(s: &str) -> Result<Kernel, String> {
    if let Some(preset) = Kernel::preset(s.trim()) {
        return Ok(preset);
    }
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 9 {
        return Err(format!(
            "expected a preset name (identity, sharpen, gaussian, box-blur) \
             or nine comma-separated weights, got '{}'",
            s
        ));
    }
    let mut weights = [[0.0f64; 3]; 3];
    for (i, part) in parts.iter().enumerate() {
        weights[i / 3][i % 3] = part
            .parse::<f64>()
            .map_err(|_| format!("kernel weight '{}' is not a number", part))?;
    }
    Ok(Kernel(weights))
}

fn parse_coordinate(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y (e.g. 10,20), got '{}'", s))?;
    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("bad x coordinate in '{}'", s))?;
    let y = y
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("bad y coordinate in '{}'", s))?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_parse() {
        assert_eq!(parse_dimensions("800x600").unwrap(), (800, 600));
        assert_eq!(parse_dimensions("12X34").unwrap(), (12, 34));
        assert!(parse_dimensions("800").is_err());
        assert!(parse_dimensions("ax600").is_err());
    }

    #[test]
    fn curve_parse_validates_order() {
        assert!(parse_curve("64,0,192,255").is_ok());
        assert!(parse_curve("192,0,64,255").is_err()); // input1 >= input2
        assert!(parse_curve("0,0,300,255").is_err()); // out of byte range
        assert!(parse_curve("1,2,3").is_err());
    }

    #[test]
    fn kernel_parse_presets_and_weights() {
        assert_eq!(parse_kernel("sharpen").unwrap(), Kernel::SHARPEN);
        let custom = parse_kernel("0,-1,0,-1,5,-1,0,-1,0").unwrap();
        assert_eq!(custom, Kernel::SHARPEN);
        assert!(parse_kernel("1,2,3").is_err());
        assert!(parse_kernel("emboss").is_err());
    }

    #[test]
    fn coordinate_parse() {
        assert_eq!(parse_coordinate("10,20").unwrap(), (10, 20));
        assert!(parse_coordinate("10").is_err());
        assert!(parse_coordinate("-1,2").is_err());
    }

    #[test]
    fn format_resolution_precedence() {
        // Explicit --format wins over the output extension.
        assert_eq!(
            resolve_format(Some("bmp"), Some(Path::new("out.png"))),
            SaveFormat::Bmp
        );
        assert_eq!(
            resolve_format(None, Some(Path::new("out.jpg"))),
            SaveFormat::Jpeg
        );
        assert_eq!(resolve_format(None, None), SaveFormat::Png);
    }
}
