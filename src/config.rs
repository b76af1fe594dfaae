use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub chart: ChartConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub education_url: String,
    pub counties_url: String,
    /// Name of the county object collection inside the topology payload.
    pub counties_object: String,
    /// Name of the state-boundary object collection, from the same payload.
    pub states_object: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub padding_top: f64,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_bottom: f64,
    pub low_color: String,
    pub pivot_color: String,
    pub high_color: String,
    pub state_stroke: String,
    pub legend_steps: usize,
    pub legend_rect_width: f64,
    pub legend_label_spacing: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub svg_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            education_url:
                "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/for_user_education.json"
                    .to_string(),
            counties_url:
                "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/counties.json"
                    .to_string(),
            counties_object: "counties".to_string(),
            states_object: "states".to_string(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        // Hue and lightness fixed across the three scale colors, only saturation moves.
        Self {
            width: 1000.0,
            height: 600.0,
            padding_top: 40.0,
            padding_left: 20.0,
            padding_right: 60.0,
            padding_bottom: 20.0,
            low_color: "#c21d00".to_string(),
            pivot_color: "#ffff33".to_string(),
            high_color: "#00941b".to_string(),
            state_stroke: "#322a2a".to_string(),
            legend_steps: 10,
            legend_rect_width: 10.0,
            legend_label_spacing: 15.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            svg_path: PathBuf::from("choropleth.svg"),
        }
    }
}

impl ChartConfig {
    /// Outer SVG width including padding.
    pub fn outer_width(&self) -> f64 {
        self.width + self.padding_left + self.padding_right
    }

    /// Outer SVG height including padding.
    pub fn outer_height(&self) -> f64 {
        self.height + self.padding_top + self.padding_bottom
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Loads the config file when present, otherwise the built-in defaults
    /// (which reproduce the canonical chart).
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
