// image decode/encode helpers used by the command line driver

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{Delay, DynamicImage, Frame, ImageFormat, RgbaImage};

use crate::error::{Error, Result};

/// output encodings, chosen by file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Png,
    Jpeg,
    Svg,
    Gif,
}

impl OutputKind {
    /// `-` means SVG on stdout; unknown extensions are an error
    pub fn from_path(path: &str) -> Result<Self> {
        if path == "-" {
            return Ok(Self::Svg);
        }
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            "gif" => Ok(Self::Gif),
            _ => Err(Error::unsupported_format(format!("unrecognized file extension: .{ext}"))),
        }
    }
}

pub fn load_image(path: impl AsRef<Path>) -> Result<RgbaImage> {
    profiling::scope!("load_image");
    Ok(image::open(path)?.to_rgba8())
}

/// shrink so neither side exceeds `max_side`, keeping the aspect ratio.
/// images that already fit (or `max_side == 0`) are returned unchanged.
pub fn thumbnail(image: RgbaImage, max_side: u32) -> RgbaImage {
    profiling::scope!("thumbnail");
    let (w, h) = image.dimensions();
    if max_side == 0 || (w <= max_side && h <= max_side) {
        return image;
    }
    DynamicImage::ImageRgba8(image)
        .resize(max_side, max_side, FilterType::Triangle)
        .to_rgba8()
}

pub fn save_png(path: impl AsRef<Path>, image: &RgbaImage) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// JPEG has no alpha channel; the image is flattened to RGB first
pub fn save_jpg(path: impl AsRef<Path>, image: &RgbaImage, quality: u8) -> Result<()> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut out = BufWriter::new(File::create(path)?);
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))?;
    out.flush()?;
    Ok(())
}

/// looping animation; every frame shows for `delay_ms` except the last,
/// which shows for `last_delay_ms`
pub fn save_gif(path: impl AsRef<Path>, frames: Vec<RgbaImage>, delay_ms: u32, last_delay_ms: u32) -> Result<()> {
    profiling::scope!("save_gif");
    let mut out = BufWriter::new(File::create(path)?);
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder.set_repeat(Repeat::Infinite)?;
        let last = frames.len().saturating_sub(1);
        let frames = frames.into_iter().enumerate().map(|(i, img)| {
            let ms = if i == last { last_delay_ms } else { delay_ms };
            Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(ms, 1))
        });
        encoder.encode_frames(frames)?;
    }
    out.flush()?;
    Ok(())
}

/// write `contents` to `path`, or to stdout when `path` is `-`
pub fn save_file(path: &str, contents: &str) -> Result<()> {
    if path == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(contents.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    } else {
        std::fs::write(path, contents)?;
    }
    Ok(())
}

/// substitute the frame number for the first `%d` (with optional zero-padded
/// width, e.g. `%03d`) in an output path
pub fn frame_path(pattern: &str, frame: usize) -> String {
    let Some(start) = pattern.find('%') else {
        return pattern.to_owned();
    };
    let rest = &pattern[start + 1..];
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if !rest[digits..].starts_with('d') {
        return pattern.to_owned();
    }
    let pad = &rest[..digits];
    let formatted = match pad.strip_prefix('0').and_then(|w| w.parse::<usize>().ok()) {
        Some(width) => format!("{frame:0width$}"),
        None => match pad.parse::<usize>() {
            Ok(width) => format!("{frame:width$}"),
            Err(_) => frame.to_string(),
        },
    };
    format!("{}{}{}", &pattern[..start], formatted, &rest[digits + 1..])
}
