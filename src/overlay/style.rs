use image::Rgba;

use crate::config::{
    BOX_COLOR, BOX_CORNER_RADIUS, BOX_STROKE_WIDTH, LABEL_BACKGROUND, LABEL_CORNER_RADIUS,
    LABEL_FONT_SIZE, LABEL_HEIGHT, LABEL_OFFSET, LABEL_TEXT_COLOR, LABEL_WIDTH,
};

/// 叠加层样式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub stroke_width: f32,
    pub stroke_color: Rgba<u8>,
    pub box_corner_radius: f32,
    pub font_size: f32,
    pub text_color: Rgba<u8>,
    pub label_background: Rgba<u8>,
    pub label_corner_radius: f32,
    pub label_width: f32,
    pub label_height: f32,
    /// 标签上移的距离
    pub label_offset: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_width: BOX_STROKE_WIDTH,
            stroke_color: Rgba(BOX_COLOR),
            box_corner_radius: BOX_CORNER_RADIUS,
            font_size: LABEL_FONT_SIZE,
            text_color: Rgba(LABEL_TEXT_COLOR),
            label_background: Rgba(LABEL_BACKGROUND),
            label_corner_radius: LABEL_CORNER_RADIUS,
            label_width: LABEL_WIDTH,
            label_height: LABEL_HEIGHT,
            label_offset: LABEL_OFFSET,
        }
    }
}

impl OverlayStyle {
    pub fn with_stroke(mut self, width: f32, color: Rgba<u8>) -> Self {
        self.stroke_width = width;
        self.stroke_color = color;
        self
    }

    pub fn with_box_corner_radius(mut self, radius: f32) -> Self {
        self.box_corner_radius = radius;
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_label_colors(mut self, text: Rgba<u8>, background: Rgba<u8>) -> Self {
        self.text_color = text;
        self.label_background = background;
        self
    }

    pub fn with_label_size(mut self, width: f32, height: f32) -> Self {
        self.label_width = width;
        self.label_height = height;
        self
    }

    pub fn with_label_offset(mut self, offset: f32) -> Self {
        self.label_offset = offset;
        self
    }
}
