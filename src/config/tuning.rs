use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which pointer device feeds the aim controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    /// Mouse first, touch when the mouse reports nothing.
    #[default]
    Auto,
    Mouse,
    Touch,
}

/// All tunable game parameters, loaded from tuning.ron.
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub dt: f32,
    pub pixels_per_unit: f32,
    /// Pull vector length ceiling (world units).
    pub max_pull_distance: f32,
    /// Pull → launch velocity scale.
    pub force_multiplier: f32,
    /// Time step between two preview dots (seconds of flight).
    pub dot_spacing: f32,
    pub dot_count: usize,
    pub dot_radius: f32,
    /// Constant ambient gravity shared by physics and the preview.
    pub gravity: [f32; 2],
    /// Rig joints that follow the aim angle while drawing.
    pub aim_joints: Vec<String>,
    pub input_mode: InputMode,
    /// Flying arrows below this height are removed.
    pub kill_plane_y: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            pixels_per_unit: 40.0,
            max_pull_distance: 3.0,
            force_multiplier: 10.0,
            dot_spacing: 0.1,
            dot_count: 20,
            dot_radius: 0.06,
            gravity: [0.0, -9.81],
            aim_joints: vec!["body".into()],
            input_mode: InputMode::Auto,
            kill_plane_y: -30.0,
        }
    }
}

impl Tuning {
    /// Get the data directory for tuning files.
    pub fn data_dir() -> PathBuf {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("archer_aim")
    }

    /// Path to the tuning file.
    pub fn file_path() -> PathBuf {
        Self::data_dir().join("tuning.ron")
    }

    pub fn gravity_vec(&self) -> Vec2 {
        Vec2::from_array(self.gravity)
    }

    /// Clamp values that would break the aim model into a usable range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.dt.is_finite() && self.dt > 0.0) {
            warn!("tuning: dt={} is not usable, falling back to {}", self.dt, defaults.dt);
            self.dt = defaults.dt;
        }
        if !(self.pixels_per_unit.is_finite() && self.pixels_per_unit >= 1.0) {
            self.pixels_per_unit = defaults.pixels_per_unit;
        }
        self.max_pull_distance = finite_or(self.max_pull_distance, 0.0).max(0.0);
        self.force_multiplier = finite_or(self.force_multiplier, 0.0).max(0.0);
        self.dot_spacing = finite_or(self.dot_spacing, 0.0).max(0.0);
        self.dot_radius = finite_or(self.dot_radius, defaults.dot_radius).max(0.0);
        if !self.gravity.iter().all(|g| g.is_finite()) {
            self.gravity = defaults.gravity;
        }
        self.kill_plane_y = finite_or(self.kill_plane_y, defaults.kill_plane_y);
        self
    }

    /// Parse RON text, sanitizing the result.
    pub fn from_ron(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str::<Self>(contents).map(Self::sanitized)
    }

    /// Load from file, or create default if not found.
    pub fn load_or_default() -> Self {
        let path = Self::file_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::from_ron(&contents) {
                    Ok(tuning) => return tuning,
                    Err(e) => {
                        warn!("Failed to parse tuning.ron: {e}, using defaults");
                    }
                },
                Err(e) => {
                    warn!("Failed to read tuning.ron: {e}, using defaults");
                }
            }
        }
        let tuning = Self::default();
        tuning.save();
        tuning
    }

    /// Save current tuning to file.
    pub fn save(&self) {
        let path = Self::file_path();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let pretty = ron::ser::PrettyConfig::default();
        match ron::ser::to_string_pretty(self, pretty) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    warn!("Failed to write tuning.ron: {e}");
                }
            }
            Err(e) => {
                warn!("Failed to serialize tuning: {e}");
            }
        }
    }

    /// Reload from file (called by key press).
    pub fn reload(&mut self) {
        *self = Self::load_or_default();
        info!("Tuning reloaded");
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}
