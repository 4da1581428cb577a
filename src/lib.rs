use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use image::{png::PngEncoder, ColorType, Rgba, RgbaImage};
use itertools::Itertools;
use log::*;
use std::convert::TryFrom;
use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
pub mod colors;
pub mod palettes;
use colors::Color;
use palettes::load::LoadPalette;
use palettes::{bucket_index, classify, ThresholdPalette};

/// Circle radius relative to the normalized viewport diagonal, as in SVG `r="20%"`.
const RADIUS_FRACTION: f64 = 0.2;
const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// Largest indicator edge, in pixels.
pub const MAX_SIZE: u32 = 4096;
/// Largest raster we allocate, in pixels (256 MiB of RGBA).
pub const MAX_PIXELS: u64 = 1 << 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    WebP,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(OsStr::to_str)
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "svg" => Ok(OutputFormat::Svg),
            other => bail!("Unknown output format '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Edge length in pixels of one indicator.
    pub size: u32,
    pub format: OutputFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 64,
            format: OutputFormat::Png,
        }
    }
}

/// A ratio and the color it classifies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicator {
    pub value: f64,
    pub color: Color,
}

impl Indicator {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            color: classify(value),
        }
    }

    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="{}" height="100%" width="100%"><circle cx="50%" cy="50%" r="20%" fill="{}" /></svg>"#,
            SVG_NS, self.color
        )
    }

    pub fn draw(&self, width: u32, height: u32) -> RgbaImage {
        let r = radius(width, height);
        let (cx, cy) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
        RgbaImage::from_fn(width, height, |x, y| self.pixel(x, y, cx, cy, r))
    }

    fn pixel(&self, x: u32, y: u32, cx: f64, cy: f64, r: f64) -> Rgba<u8> {
        let dx = f64::from(x) + 0.5 - cx;
        let dy = f64::from(y) + 0.5 - cy;
        if dx * dx + dy * dy <= r * r {
            Rgba(self.color.rgba(255))
        } else {
            Rgba([0, 0, 0, 0])
        }
    }
}

fn radius(width: u32, height: u32) -> f64 {
    let (w, h) = (f64::from(width), f64::from(height));
    RADIUS_FRACTION * ((w * w + h * h) / 2.0).sqrt()
}

fn check_size(size: u32) -> Result<()> {
    if size == 0 {
        bail!("Indicator size must be positive");
    }
    if size > MAX_SIZE {
        bail!("Indicator size {} exceeds {}px", size, MAX_SIZE);
    }
    Ok(())
}

fn strip_width(count: usize, cell: u32) -> Result<u32> {
    if count == 0 {
        bail!("No values to draw");
    }
    check_size(cell)?;
    let count = u32::try_from(count).context("Too many values for one image")?;
    let width = count
        .checked_mul(cell)
        .with_context(|| format!("Strip of {} indicators at {}px is too wide", count, cell))?;
    if u64::from(width) * u64::from(cell) > MAX_PIXELS {
        bail!(
            "Strip of {} indicators at {}px exceeds {} pixels",
            count,
            cell,
            MAX_PIXELS
        );
    }
    Ok(width)
}

/// Lays out one `cell`x`cell` indicator per value, left to right.
pub fn draw_strip(values: &[f64], cell: u32) -> Result<RgbaImage> {
    let width = strip_width(values.len(), cell)?;
    let indicators: Vec<Indicator> = values.iter().copied().map(Indicator::new).collect();
    let r = radius(cell, cell);
    let c = f64::from(cell) / 2.0;
    info!("Drawing strip {}x{}", width, cell);
    Ok(RgbaImage::from_fn(width, cell, |x, y| {
        indicators[(x / cell) as usize].pixel(x % cell, y, c, c, r)
    }))
}

pub fn strip_svg(values: &[f64], cell: u32) -> Result<String> {
    let width = strip_width(values.len(), cell)?;
    let r = radius(cell, cell);
    let circles: String = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let cx = f64::from(cell) * (i as f64 + 0.5);
            format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}" />"#,
                cx,
                f64::from(cell) / 2.0,
                r,
                classify(*v)
            )
        })
        .collect();
    Ok(format!(
        r#"<svg xmlns="{}" width="{}" height="{}" viewBox="0 0 {} {}">{}</svg>"#,
        SVG_NS, width, cell, width, cell, circles
    ))
}

pub fn encode_image(img: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    match format {
        OutputFormat::Png => {
            let mut buf = Vec::new();
            PngEncoder::new(&mut buf)
                .encode(img.as_raw(), width, height, ColorType::Rgba8)
                .context("PNG encoding failed")?;
            Ok(buf)
        }
        OutputFormat::WebP => Ok(webp::Encoder::new(
            img.as_raw(),
            webp::PixelLayout::Rgba,
            width,
            height,
        )
        .encode_lossless()
        .to_vec()),
        OutputFormat::Svg => bail!("SVG output is not a raster format"),
    }
}

/// Encodes `values` as a strip in the requested format.
pub fn render_series(values: &[f64], options: &RenderOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Svg => Ok(strip_svg(values, options.size)?.into_bytes()),
        format => encode_image(&draw_strip(values, options.size)?, format),
    }
}

pub fn render_value(value: f64, options: &RenderOptions) -> Result<Vec<u8>> {
    let indicator = Indicator::new(value);
    debug!("{} -> {}", value, indicator.color);
    match options.format {
        OutputFormat::Svg => Ok(indicator.to_svg().into_bytes()),
        format => {
            check_size(options.size)?;
            encode_image(&indicator.draw(options.size, options.size), format)
        }
    }
}

fn save<P: AsRef<Path>>(data: &[u8], dest: P) -> Result<()> {
    let dest = dest.as_ref();
    info!("Saving {} ({} bytes)", dest.display(), data.len());
    let mut f =
        File::create(dest).with_context(|| format!("Could not create {}", dest.display()))?;
    f.write_all(data)
        .with_context(|| format!("Could not write {}", dest.display()))
}

/// Parses a ratio from user input. Non-finite values are rejected here even
/// though `classify` accepts them.
pub fn parse_ratio(s: &str) -> Result<f64> {
    let value: f64 = s
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number", s))?;
    if !value.is_finite() {
        bail!("Ratio must be finite, got '{}'", s);
    }
    Ok(value)
}

pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    Ok(match path.extension() {
        Some(ext) if ext == OsStr::new("gz") => Box::new(GzDecoder::new(file)),
        _ => Box::new(file),
    })
}

/// Reads one ratio per CSV record, taken from the record's last non-empty
/// field. Blank lines are skipped.
pub fn read_ratios<R: Read>(file: R) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    let mut values = Vec::new();
    for result in reader.records() {
        let record = result.context("Invalid CSV record")?;
        let line = record.position().map_or(0, |p| p.line());
        match record.iter().rev().find(|cell| !cell.is_empty()) {
            Some(cell) => {
                values.push(parse_ratio(cell).with_context(|| format!("Line {}", line))?)
            }
            _ => trace!("Skipping blank line {}", line),
        }
    }
    Ok(values)
}

/// Logs how many values fall into each bucket, hottest first.
pub fn summarize(values: &[f64]) {
    let palette = LoadPalette {};
    let counts = values
        .iter()
        .map(|v| bucket_index(&palette, *v))
        .counts();
    for (i, color) in palette.colors().into_iter().enumerate() {
        info!("{}: {}", color, counts.get(&i).copied().unwrap_or(0));
    }
}

/// `data.csv.gz` and `data.csv` both become `data.<ext>`.
pub fn output_path<P: AsRef<Path>>(path: P, format: OutputFormat) -> PathBuf {
    let path = path.as_ref();
    let path = match path.extension() {
        Some(ext) if ext == OsStr::new("gz") => path.with_extension(""),
        _ => path.to_path_buf(),
    };
    path.with_extension(format.extension())
}

pub fn render_file<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<PathBuf> {
    let path = path.as_ref();
    info!("Loading: {}", path.display());
    let values = read_ratios(open_file(path)?)
        .with_context(|| format!("Could not read ratios from {}", path.display()))?;
    info!("{} values", values.len());
    summarize(&values);
    let data = render_series(&values, options)?;
    let dest = output_path(path, options.format);
    save(&data, &dest)?;
    Ok(dest)
}

pub fn render_value_to<P: AsRef<Path>>(
    value: f64,
    options: &RenderOptions,
    dest: P,
) -> Result<Color> {
    let data = render_value(value, options)?;
    save(&data, dest)?;
    Ok(classify(value))
}
