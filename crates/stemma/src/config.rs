//! Configuration types for family tree layout and rendering.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file with `[layout]` and `[style]` sections. Every field is optional
//! in the file; missing fields take their default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Box dimensions, gaps, origin and compaction settings.
//! - [`StyleConfig`] - Colours and fonts used by the SVG renderer.
//!
//! # Example
//!
//! ```
//! # use stemma::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().box_width(), 25.9);
//! assert!(config.layout().compaction());
//! ```

use serde::Deserialize;

/// Finest compaction step, in decimals, that `f32` coordinates under a
/// metre still resolve.
const MAX_PRECISION: u32 = 4;

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Geometric constants of the layout.
///
/// Lengths are millimetres. `scale` multiplies the box dimensions and all
/// gaps; the origin is not scaled.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    box_width: f32,
    box_height: f32,
    /// Horizontal gap between rows that share an ancestor.
    same_family_gap: f32,
    /// Horizontal gap between rows of different ancestors.
    different_family_gap: f32,
    /// Vertical gap between a row and the connector run below it.
    gap_before: f32,
    /// Vertical gap between the connector run and the next row.
    gap_after: f32,
    scale: f32,
    /// Left edge the first generation is centred on.
    origin_left: f32,
    /// Top of the first generation.
    origin_top: f32,
    /// Decimal places kept by compaction.
    precision: u32,
    compaction: bool,
    max_compaction_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            box_width: 25.9,
            box_height: 16.0,
            same_family_gap: 6.1,
            different_family_gap: 9.9,
            gap_before: 9.9,
            gap_after: 16.0,
            scale: 1.0,
            origin_left: 594.5,
            origin_top: 90.0,
            precision: 2,
            compaction: true,
            max_compaction_passes: 1000,
        }
    }
}

impl LayoutConfig {
    /// Sets the size of one person box.
    pub fn with_box_size(mut self, width: f32, height: f32) -> Self {
        self.box_width = width;
        self.box_height = height;
        self
    }

    /// Sets the horizontal gaps between rows of the same and of different families.
    pub fn with_family_gaps(mut self, same: f32, different: f32) -> Self {
        self.same_family_gap = same;
        self.different_family_gap = different;
        self
    }

    /// Sets the vertical gaps above and below the connector run.
    pub fn with_vertical_gaps(mut self, before: f32, after: f32) -> Self {
        self.gap_before = before;
        self.gap_after = after;
        self
    }

    pub fn with_origin(mut self, left: f32, top: f32) -> Self {
        self.origin_left = left;
        self.origin_top = top;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_compaction(mut self, compaction: bool) -> Self {
        self.compaction = compaction;
        self
    }

    pub fn with_max_compaction_passes(mut self, passes: usize) -> Self {
        self.max_compaction_passes = passes;
        self
    }

    pub fn box_width(&self) -> f32 {
        self.box_width
    }

    pub fn box_height(&self) -> f32 {
        self.box_height
    }

    pub fn same_family_gap(&self) -> f32 {
        self.same_family_gap
    }

    pub fn different_family_gap(&self) -> f32 {
        self.different_family_gap
    }

    pub fn gap_before(&self) -> f32 {
        self.gap_before
    }

    pub fn gap_after(&self) -> f32 {
        self.gap_after
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn origin_left(&self) -> f32 {
        self.origin_left
    }

    pub fn origin_top(&self) -> f32 {
        self.origin_top
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Returns whether compaction runs after placement.
    pub fn compaction(&self) -> bool {
        self.compaction
    }

    pub fn max_compaction_passes(&self) -> usize {
        self.max_compaction_passes
    }

    /// Checks that the constants describe a drawable layout.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("box_width", self.box_width),
            ("box_height", self.box_height),
            ("scale", self.scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("`{name}` must be a positive number, got {value}"));
            }
        }

        let non_negative = [
            ("same_family_gap", self.same_family_gap),
            ("different_family_gap", self.different_family_gap),
            ("gap_before", self.gap_before),
            ("gap_after", self.gap_after),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("`{name}` must not be negative, got {value}"));
            }
        }

        if !(self.origin_left.is_finite() && self.origin_top.is_finite()) {
            return Err("origin must be finite".to_string());
        }
        if self.precision > MAX_PRECISION {
            return Err(format!(
                "`precision` must be at most {MAX_PRECISION} decimals, got {}",
                self.precision
            ));
        }
        Ok(())
    }
}

/// Visual styling for the SVG renderer.
///
/// Colours are CSS colour strings. Fields that are not set fall back to
/// renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    box_fill: Option<String>,
    box_stroke: Option<String>,
    /// Fill for married-in spouses; lineage boxes use `box_fill`.
    spouse_fill: Option<String>,
    connector_stroke: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
}

impl StyleConfig {
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    pub fn box_fill(&self) -> Option<&str> {
        self.box_fill.as_deref()
    }

    pub fn box_stroke(&self) -> Option<&str> {
        self.box_stroke.as_deref()
    }

    pub fn spouse_fill(&self) -> Option<&str> {
        self.spouse_fill.as_deref()
    }

    pub fn connector_stroke(&self) -> Option<&str> {
        self.connector_stroke.as_deref()
    }

    pub fn font_family(&self) -> Option<&str> {
        self.font_family.as_deref()
    }

    pub fn font_size(&self) -> Option<f32> {
        self.font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_box() {
        let config = LayoutConfig::default().with_box_size(0.0, 16.0);
        let err = config.validate().unwrap_err();
        assert!(err.contains("box_width"));
    }

    #[test]
    fn test_validate_rejects_negative_gap() {
        let config = LayoutConfig::default().with_family_gaps(-1.0, 9.9);
        assert!(config.validate().unwrap_err().contains("same_family_gap"));
    }

    #[test]
    fn test_validate_rejects_large_precision() {
        assert!(LayoutConfig::default().with_precision(4).validate().is_ok());
        let err = LayoutConfig::default().with_precision(5).validate().unwrap_err();
        assert!(err.contains("precision"));
    }

    #[test]
    fn test_style_builders() {
        let style = StyleConfig::default()
            .with_background_color("white")
            .with_font_size(4.0);
        assert_eq!(style.background_color(), Some("white"));
        assert_eq!(style.font_size(), Some(4.0));
        assert_eq!(style.box_fill(), None);
    }
}
