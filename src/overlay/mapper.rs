use crate::detect::types::NormalizedRect;

/// 绘制表面尺寸（像素）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(u32, u32)> for SurfaceSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// 绘制表面上的矩形，原点位于左上角，单位为像素
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }
}

/// 将左下角原点的归一化矩形映射为表面像素坐标
///
/// 纯函数。纵向翻转以归一化上边缘`max_y`为基准：
/// `y = (1 - max_y) * height`。
pub fn map(rect: NormalizedRect, surface: SurfaceSize) -> ScreenRect {
    ScreenRect {
        x: rect.x * surface.width,
        y: (1.0 - rect.max_y()) * surface.height,
        width: rect.width * surface.width,
        height: rect.height * surface.height,
    }
}
