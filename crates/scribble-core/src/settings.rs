//! Active tool and style settings.

use crate::elements::SerializableColor;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};

/// Swatch colors offered by the view layer.
pub const PALETTE: [SerializableColor; 16] = [
    SerializableColor::rgb(0x00, 0x00, 0x00),
    SerializableColor::rgb(0xff, 0xff, 0xff),
    SerializableColor::rgb(0xff, 0x00, 0x00),
    SerializableColor::rgb(0x00, 0xff, 0x00),
    SerializableColor::rgb(0x00, 0x00, 0xff),
    SerializableColor::rgb(0xff, 0xff, 0x00),
    SerializableColor::rgb(0xff, 0x00, 0xff),
    SerializableColor::rgb(0x00, 0xff, 0xff),
    SerializableColor::rgb(0xff, 0xa5, 0x00), // orange
    SerializableColor::rgb(0xff, 0xd7, 0x00),
    SerializableColor::rgb(0xff, 0x45, 0x00),
    SerializableColor::rgb(0xda, 0x70, 0xd6),
    SerializableColor::rgb(0xfa, 0x80, 0x72),
    SerializableColor::rgb(0x20, 0xb2, 0xaa),
    SerializableColor::rgb(0x87, 0xce, 0xeb),
    SerializableColor::rgb(0x7f, 0xff, 0xd4),
];

/// Direction for image resize requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeDirection {
    Increase,
    Decrease,
}

impl ResizeDirection {
    /// Scale factor applied to both width and height.
    pub fn factor(self) -> f64 {
        match self {
            ResizeDirection::Increase => ToolSettings::IMAGE_GROW_FACTOR,
            ResizeDirection::Decrease => ToolSettings::IMAGE_SHRINK_FACTOR,
        }
    }
}

/// Settings the view layer drives. New elements copy these at gesture start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: SerializableColor,
    pub stroke_width: f64,
    pub text_size: f64,
}

impl ToolSettings {
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
    pub const MIN_STROKE_WIDTH: f64 = 1.0;
    pub const MAX_STROKE_WIDTH: f64 = 20.0;

    pub const DEFAULT_TEXT_SIZE: f64 = 20.0;
    pub const MIN_TEXT_SIZE: f64 = 8.0;
    pub const MAX_TEXT_SIZE: f64 = 72.0;
    /// Step used by increase/decrease.
    pub const TEXT_SIZE_STEP: f64 = 2.0;

    pub const IMAGE_GROW_FACTOR: f64 = 1.1;
    pub const IMAGE_SHRINK_FACTOR: f64 = 0.9;

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width.clamp(Self::MIN_STROKE_WIDTH, Self::MAX_STROKE_WIDTH);
    }

    pub fn set_text_size(&mut self, size: f64) {
        self.text_size = size.clamp(Self::MIN_TEXT_SIZE, Self::MAX_TEXT_SIZE);
    }

    pub fn increase_text_size(&mut self) {
        self.set_text_size(self.text_size + Self::TEXT_SIZE_STEP);
    }

    pub fn decrease_text_size(&mut self) {
        self.set_text_size(self.text_size - Self::TEXT_SIZE_STEP);
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pencil,
            color: SerializableColor::black(),
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
            text_size: Self::DEFAULT_TEXT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ToolSettings::default();
        assert_eq!(settings.tool, ToolKind::Pencil);
        assert_eq!(settings.color.to_hex(), "#000000");
        assert!((settings.stroke_width - 2.0).abs() < f64::EPSILON);
        assert!((settings.text_size - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stroke_width_clamped() {
        let mut settings = ToolSettings::default();
        settings.set_stroke_width(0.0);
        assert!((settings.stroke_width - 1.0).abs() < f64::EPSILON);
        settings.set_stroke_width(50.0);
        assert!((settings.stroke_width - 20.0).abs() < f64::EPSILON);
        settings.set_stroke_width(7.5);
        assert!((settings.stroke_width - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_size_steps_and_clamps() {
        let mut settings = ToolSettings::default();
        settings.increase_text_size();
        assert!((settings.text_size - 22.0).abs() < f64::EPSILON);

        for _ in 0..100 {
            settings.increase_text_size();
        }
        assert!((settings.text_size - 72.0).abs() < f64::EPSILON);

        for _ in 0..100 {
            settings.decrease_text_size();
        }
        assert!((settings.text_size - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_palette_starts_with_default_color() {
        assert_eq!(PALETTE[0], ToolSettings::default().color);
        assert_eq!(PALETTE[8].to_hex(), "#ffa500");
    }

    #[test]
    fn test_resize_factors() {
        assert!((ResizeDirection::Increase.factor() - 1.1).abs() < f64::EPSILON);
        assert!((ResizeDirection::Decrease.factor() - 0.9).abs() < f64::EPSILON);
    }
}
