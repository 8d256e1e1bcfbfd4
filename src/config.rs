// Command line and settings file.
// Visual: window size, picture, watermark, mask color and eraser width at startup.
// Values come from an optional JSON file; flags on the command line override it.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::Argb;
use crate::view::{DEFAULT_ERASER_SIZE, DEFAULT_MASK_COLOR, DEFAULT_TOUCH_SLOP, ViewOptions};
use crate::watermark::WatermarkSource;

/// Scratch off a gray layer to reveal the picture underneath.
#[derive(Debug, Parser)]
#[command(name = "scratch-card", version)]
pub struct Cli {
    /// JSON settings file.
    #[arg(long, env = "SCRATCH_CARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Window width in pixels.
    #[arg(long)]
    pub width: Option<usize>,

    /// Window height in pixels.
    #[arg(long)]
    pub height: Option<usize>,

    /// Picture revealed under the mask (a generated gradient if omitted).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Watermark: `none`, `builtin`, or an image path.
    #[arg(long)]
    pub watermark: Option<WatermarkSource>,

    /// Mask color: `#RRGGBB`, `#AARRGGBB`, gray, red, green or blue.
    #[arg(long)]
    pub mask_color: Option<Argb>,

    /// Eraser width in device-independent units.
    #[arg(long)]
    pub eraser_size: Option<f32>,

    /// Pixels per device-independent unit.
    #[arg(long)]
    pub density: Option<f32>,

    /// Minimum pointer travel before a move erases, in device-independent units.
    #[arg(long)]
    pub touch_slop: Option<f32>,

    /// Verbose logging (honours RUST_LOG).
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub image: Option<PathBuf>,
    pub watermark: WatermarkSource,
    pub mask_color: Argb,
    pub eraser_size: f32,
    pub density: f32,
    pub touch_slop: f32,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 480,
            height: 640,
            image: None,
            watermark: WatermarkSource::None,
            mask_color: DEFAULT_MASK_COLOR,
            eraser_size: DEFAULT_ERASER_SIZE,
            density: 1.0,
            touch_slop: DEFAULT_TOUCH_SLOP,
            debug: false,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead { path: path.to_path_buf(), source })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse { path: path.to_path_buf(), source })
    }

    /// File settings (if any) with command line overrides applied, validated.
    pub fn resolve(cli: &Cli) -> Result<Self, Error> {
        let mut s = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(v) = cli.width {
            s.width = v;
        }
        if let Some(v) = cli.height {
            s.height = v;
        }
        if let Some(v) = &cli.image {
            s.image = Some(v.clone());
        }
        if let Some(v) = &cli.watermark {
            s.watermark = v.clone();
        }
        if let Some(v) = cli.mask_color {
            s.mask_color = v;
        }
        if let Some(v) = cli.eraser_size {
            s.eraser_size = v;
        }
        if let Some(v) = cli.density {
            s.density = v;
        }
        if let Some(v) = cli.touch_slop {
            s.touch_slop = v;
        }
        s.debug |= cli.debug;

        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!("window size must be positive, got {}x{}", self.width, self.height)));
        }
        if !(self.eraser_size.is_finite() && self.eraser_size > 0.0) {
            return Err(Error::Config(format!("eraser_size must be positive, got {}", self.eraser_size)));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(Error::Config(format!("density must be positive, got {}", self.density)));
        }
        if !(self.touch_slop.is_finite() && self.touch_slop >= 0.0) {
            return Err(Error::Config(format!("touch_slop must not be negative, got {}", self.touch_slop)));
        }
        Ok(())
    }

    /// View settings, decoding the watermark if one is configured.
    pub fn view_options(&self) -> Result<ViewOptions, Error> {
        Ok(ViewOptions {
            mask_color: self.mask_color,
            eraser_size: self.eraser_size,
            watermark: self.watermark.load()?,
            density: self.density,
            touch_slop: self.touch_slop,
        })
    }
}
