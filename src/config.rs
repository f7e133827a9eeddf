//! Diagram configuration
//!
//! Defaults for routing, markers and the interactive gesture, with optional
//! TOML loading for host applications that keep these in a file.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::routing::{RoutingMode, DEFAULT_MANHATTAN_STEP};

/// Errors that can occur when loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Stroke styling applied to an edge's rendered primitives. Kept as plain
/// strings: this crate computes geometry and hands styling through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    /// SVG-style dash pattern, e.g. "4,2"
    pub dasharray: Option<String>,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: "#333333".to_string(),
            stroke_width: 2.0,
            dasharray: None,
        }
    }
}

impl EdgeStyle {
    /// Dashed variant used for the temporary rubber-band edge
    pub fn dashed() -> Self {
        Self {
            dasharray: Some("4,4".to_string()),
            ..Self::default()
        }
    }
}

/// Configuration options for a diagram
#[derive(Debug, Clone)]
pub struct DiagramConfig {
    /// Routing strategy applied to edges that do not pick their own
    pub default_routing: RoutingMode,

    /// Grid step for Manhattan routing
    pub manhattan_step: f64,

    /// Default arrowhead size for end markers
    pub marker_size: f64,

    /// Search radius for endpoint picking during the connect gesture
    pub pick_radius: f64,

    /// Styling for permanent edges
    pub edge_style: EdgeStyle,

    /// Styling for the temporary edge shown while a connection is dragged
    pub temp_edge_style: EdgeStyle,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            default_routing: RoutingMode::Direct,
            manhattan_step: DEFAULT_MANHATTAN_STEP,
            marker_size: 10.0,
            pick_radius: 8.0,
            edge_style: EdgeStyle::default(),
            temp_edge_style: EdgeStyle::dashed(),
        }
    }
}

/// TOML structure for deserializing a config file
#[derive(Deserialize)]
struct TomlConfig {
    routing: Option<String>,
    manhattan_step: Option<f64>,
    marker_size: Option<f64>,
    pick_radius: Option<f64>,
    edge_style: Option<EdgeStyle>,
    temp_edge_style: Option<EdgeStyle>,
}

impl DiagramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_routing(mut self, mode: RoutingMode) -> Self {
        self.default_routing = mode;
        self
    }

    pub fn with_manhattan_step(mut self, step: f64) -> Self {
        self.manhattan_step = step;
        self
    }

    pub fn with_marker_size(mut self, size: f64) -> Self {
        self.marker_size = size;
        self
    }

    pub fn with_pick_radius(mut self, radius: f64) -> Self {
        self.pick_radius = radius;
        self
    }

    /// Load a configuration from a TOML file; unspecified keys keep their
    /// defaults, unknown keys are ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();
        if let Some(step) = parsed.manhattan_step {
            config.manhattan_step = step;
        }
        if let Some(mode) = parsed.routing.as_deref() {
            config.default_routing = match mode {
                "orthogonal" => RoutingMode::Orthogonal,
                "manhattan" => RoutingMode::Manhattan {
                    step: config.manhattan_step,
                },
                _ => RoutingMode::Direct,
            };
        }
        if let Some(size) = parsed.marker_size {
            config.marker_size = size;
        }
        if let Some(radius) = parsed.pick_radius {
            config.pick_radius = radius;
        }
        if let Some(style) = parsed.edge_style {
            config.edge_style = style;
        }
        if let Some(style) = parsed.temp_edge_style {
            config.temp_edge_style = style;
        }
        Ok(config)
    }
}
