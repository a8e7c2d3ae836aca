// src/collection/settings.rs

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::signal::Interpolation;

pub const MIN_SIZE: i64 = 350;
pub const MAX_SIZE: i64 = 3000;
pub const MIN_LINE: f64 = 0.1;
pub const MAX_LINE: f64 = 2.0;

/// Radial scale of the polar plot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// Logarithmic scale, 0.89 per 0.5 dB
    #[default]
    Arrl,
    Linear20,
    Linear30,
    Linear40,
    Linear50,
    Linear60,
}

impl Scale {
    pub const ALL: [Scale; 6] = [
        Scale::Arrl,
        Scale::Linear20,
        Scale::Linear30,
        Scale::Linear40,
        Scale::Linear50,
        Scale::Linear60,
    ];

    /// dB span of a linear scale, `None` for ARRL.
    pub fn range_db(self) -> Option<f64> {
        match self {
            Scale::Arrl => None,
            Scale::Linear20 => Some(20.0),
            Scale::Linear30 => Some(30.0),
            Scale::Linear40 => Some(40.0),
            Scale::Linear50 => Some(50.0),
            Scale::Linear60 => Some(60.0),
        }
    }

    /// Relative plot radius in [0, 1] for an attenuation `db` (<= 0).
    pub fn radius(self, db: f64) -> f64 {
        match self.range_db() {
            Some(range) if db > -range => 1.0 + db / range,
            Some(_) => 0.0,
            None => 0.89_f64.powf(-0.5 * db),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scale::Arrl => "ARRL",
            Scale::Linear20 => "20 dB",
            Scale::Linear30 => "30 dB",
            Scale::Linear40 => "40 dB",
            Scale::Linear50 => "50 dB",
            Scale::Linear60 => "60 dB",
        }
    }
}

/// Collection-wide display settings, as stored in a config file.
///
/// Missing keys fall back to their defaults. Values are not validated
/// here; [`PatternCollection::apply_settings`](super::PatternCollection::apply_settings)
/// clamps them through the regular setters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub size: i64,        // Canvas edge in pixels
    pub title: String,
    pub scale: Scale,
    pub line: f64,        // Trace width multiplier
    pub interp: Interpolation,
    pub full_angle: bool, // 0..360 instead of -180..180
    pub black: bool,      // Dark theme
    pub normalize: bool,  // Each entry against its own peak
    pub legend: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            size: 600,
            title: String::new(),
            scale: Scale::Arrl,
            line: 1.0,
            interp: Interpolation::Linear,
            full_angle: true,
            black: true,
            normalize: true,
            legend: true,
        }
    }
}

impl Settings {
    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create settings file {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    pub fn load_from_disk(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open settings file {}", path.display()))?;
        let reader = BufReader::new(file);
        let settings = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        Ok(settings)
    }
}
