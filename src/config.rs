use std::fs;
use std::path::Path;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use crate::scope::error::ScopeError;
use crate::scope::filter::ButterKind;
/// Default preferences file, looked up next to the working directory.
pub const DEFAULT_PREFERENCES_FILE: &str = "preferences.json";
/// Parameters recalled for the FFT custom script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FftPrefs {
    /// Channel heading the spectrum is computed from.
    pub channel: String,
    /// Decimation factor; larger values narrow the plotted frequency range.
    pub reduce: usize,
    /// Peaks to highlight; -1 shows every peak above the height floor.
    pub peak_count: i32,
    /// Minimum peak magnitude, in the channel's units.
    pub min_peak_height: f64,
}
impl Default for FftPrefs {
    fn default() -> Self {
        Self {
            channel: "CH1(V)".into(),
            reduce: 10,
            peak_count: 4,
            min_peak_height: 0.0,
        }
    }
}
/// Parameters recalled for the Butterworth custom script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButterPrefs {
    pub channel: String,
    pub kind: ButterKind,
    pub order: usize,
    pub low_cut_hz: f64,
    pub high_cut_hz: f64,
}
impl Default for ButterPrefs {
    fn default() -> Self {
        Self {
            channel: "CH1(V)".into(),
            kind: ButterKind::Bandpass,
            order: 3,
            low_cut_hz: 500.0,
            high_cut_hz: 1100.0,
        }
    }
}
/// Everything the session recalls between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Add a "Frequency via FFT" legend to every channel plot.
    pub display_frequency: bool,
    /// Registered name of the custom script to run.
    pub custom_script: String,
    pub fft: FftPrefs,
    pub butter: ButterPrefs,
}
impl Default for Preferences {
    fn default() -> Self {
        Self {
            display_frequency: true,
            custom_script: "null".into(),
            fft: FftPrefs::default(),
            butter: ButterPrefs::default(),
        }
    }
}
impl Preferences {
    /// Load preferences, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, ScopeError> {
        if !path.exists() {
            debug!("no preferences at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
    /// Persist the current choices so the next run recalls them.
    pub fn store(&self, path: &Path) -> Result<(), ScopeError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        info!("preferences stored in {}", path.display());
        Ok(())
    }
}
