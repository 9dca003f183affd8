use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::Millis;
use crate::foundation::error::{IntroError, IntroResult};

/// Tunables for the intro sequence.
///
/// Every field has a default, so a JSON document only needs the values it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Scroll position (px) that must be exceeded to arm the intro.
    pub scroll_threshold_px: f64,
    /// Wheel delta magnitude that must be exceeded to arm the intro.
    pub wheel_sensitivity: f64,
    /// Assumed length of the motion clip.
    pub clip_duration: Millis,
    /// Scroll indicator fade before it is removed.
    pub indicator_fade: Millis,
    /// How long the final image stays fully opaque after completion.
    pub final_hold: Millis,
    /// Cross-fade of the whole image container to transparent.
    pub container_fade: Millis,
    /// Background track behaviour.
    pub audio: AudioConfig,
    /// Icon micro-interaction behaviour.
    pub icon: IconConfig,
}

/// Volume ramp used by `fade_and_stop`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Volume removed per ramp step.
    pub fade_step: f64,
    /// Interval between ramp steps.
    pub fade_interval: Millis,
    /// The ramp stops once volume is at or below this level.
    pub fade_floor: f64,
    /// Delay from the start of the ramp to the hard stop.
    pub stop_after: Millis,
}

/// Icon click and fall behaviour.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconConfig {
    /// Clicks needed to make the icon fall.
    pub fall_threshold: u32,
    /// Duration of the per-click shake.
    pub shake: Millis,
    /// Duration of the fall before the icon is hidden.
    pub fall: Millis,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: 50.0,
            wheel_sensitivity: 10.0,
            clip_duration: Millis(3000),
            indicator_fade: Millis(300),
            final_hold: Millis(3000),
            container_fade: Millis(1000),
            audio: AudioConfig::default(),
            icon: IconConfig::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fade_step: 0.1,
            fade_interval: Millis(100),
            fade_floor: 0.1,
            stop_after: Millis(1500),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            fall_threshold: 3,
            shake: Millis(500),
            fall: Millis(2000),
        }
    }
}

impl GateConfig {
    /// Parse a configuration from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> IntroResult<Self> {
        let cfg: GateConfig = serde_json::from_reader(r)
            .map_err(|e| IntroError::config(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> IntroResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            IntroError::config(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check value ranges.
    pub fn validate(&self) -> IntroResult<()> {
        if !self.scroll_threshold_px.is_finite() || self.scroll_threshold_px < 0.0 {
            return Err(IntroError::config(
                "scroll_threshold_px must be finite and >= 0",
            ));
        }
        if !self.wheel_sensitivity.is_finite() || self.wheel_sensitivity < 0.0 {
            return Err(IntroError::config("wheel_sensitivity must be finite and >= 0"));
        }
        if self.clip_duration.is_zero() {
            return Err(IntroError::config("clip_duration must be > 0"));
        }
        self.audio.validate()?;
        self.icon.validate()
    }
}

impl AudioConfig {
    fn validate(&self) -> IntroResult<()> {
        if !(self.fade_step.is_finite() && self.fade_step > 0.0 && self.fade_step <= 1.0) {
            return Err(IntroError::config("audio.fade_step must be in (0, 1]"));
        }
        if !(self.fade_floor.is_finite() && (0.0..=1.0).contains(&self.fade_floor)) {
            return Err(IntroError::config("audio.fade_floor must be in [0, 1]"));
        }
        if self.fade_interval.is_zero() {
            return Err(IntroError::config("audio.fade_interval must be > 0"));
        }
        Ok(())
    }
}

impl IconConfig {
    fn validate(&self) -> IntroResult<()> {
        if self.fall_threshold == 0 {
            return Err(IntroError::config("icon.fall_threshold must be > 0"));
        }
        Ok(())
    }
}
