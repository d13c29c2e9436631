use image::{DynamicImage, ImageBuffer, Rgba, imageops::FilterType};
use raqote::{
    DrawOptions, DrawTarget, LineJoin, Path, PathBuilder, SolidSource, Source, StrokeStyle,
};

use crate::overlay::mapper::{ScreenRect, SurfaceSize};
use crate::overlay::renderer::OverlayElement;
use crate::overlay::surface::Surface;

/// 基于raqote的光栅叠加层
///
/// 在透明图层上描绘检测框和标签底板，可合成到视频帧之上。
/// 文字字形由宿主界面绘制，标签文字保存在元素中。
pub struct RasterSurface {
    target: DrawTarget,
    elements: Vec<OverlayElement>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: DrawTarget::new(width as i32, height as i32),
            elements: Vec::new(),
        }
    }

    /// 改变表面尺寸，已有的叠加层被清空
    pub fn resize(&mut self, width: u32, height: u32) {
        self.target = DrawTarget::new(width as i32, height as i32);
        self.elements.clear();
    }

    pub fn width(&self) -> u32 {
        self.target.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.target.height() as u32
    }

    /// 当前叠加层中的元素
    pub fn elements(&self) -> &[OverlayElement] {
        &self.elements
    }

    /// 读取叠加层像素（非预乘RGBA）
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let argb = self.target.get_data()[(y * self.width() + x) as usize];
        Some(unpremultiply(argb))
    }

    /// 将叠加层合成到帧之上，帧被缩放到表面尺寸
    pub fn composite(&self, frame: &DynamicImage) -> DynamicImage {
        let (width, height) = (self.width(), self.height());
        let frame = frame.resize_exact(width, height, FilterType::Triangle).to_rgba8();

        let mut dt = DrawTarget::new(width as i32, height as i32);
        let frame_data: Vec<u32> = frame
            .chunks(4)
            .map(|pixel| u32::from_le_bytes([pixel[2], pixel[1], pixel[0], 0xFF]))
            .collect();
        dt.draw_image_at(
            0.0,
            0.0,
            &raqote::Image {
                width: width as i32,
                height: height as i32,
                data: &frame_data,
            },
            &DrawOptions::new(),
        );
        dt.draw_image_at(
            0.0,
            0.0,
            &raqote::Image {
                width: width as i32,
                height: height as i32,
                data: self.target.get_data(),
            },
            &DrawOptions::new(),
        );

        let pixels: Vec<u8> = dt
            .get_data()
            .iter()
            .flat_map(|&argb| unpremultiply(argb).0)
            .collect();
        ImageBuffer::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgba8)
            .unwrap_or_else(|| DynamicImage::new_rgba8(width, height))
    }

    fn redraw(&mut self) {
        self.target.clear(SolidSource::from_unpremultiplied_argb(0, 0, 0, 0));
        for element in &self.elements {
            match element {
                OverlayElement::Box(b) => {
                    let path = rounded_rect(&b.rect, b.corner_radius);
                    self.target.stroke(
                        &path,
                        &Source::Solid(solid(b.stroke_color)),
                        &StrokeStyle {
                            join: LineJoin::Round,
                            width: b.stroke_width,
                            ..StrokeStyle::default()
                        },
                        &DrawOptions::new(),
                    );
                }
                OverlayElement::Label(l) => {
                    let path = rounded_rect(&l.frame, l.corner_radius);
                    self.target
                        .fill(&path, &Source::Solid(solid(l.background)), &DrawOptions::new());
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::from((self.width(), self.height()))
    }

    fn replace_overlay(&mut self, elements: &[OverlayElement]) {
        self.elements = elements.to_vec();
        self.redraw();
    }
}

fn solid(color: Rgba<u8>) -> SolidSource {
    let [r, g, b, a] = color.0;
    SolidSource::from_unpremultiplied_argb(a, r, g, b)
}

fn unpremultiply(argb: u32) -> Rgba<u8> {
    let [b, g, r, a] = argb.to_le_bytes();
    if a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let scale = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
    Rgba([scale(r), scale(g), scale(b), a])
}

/// 圆角矩形路径，圆角半径不超过短边的一半
fn rounded_rect(rect: &ScreenRect, radius: f32) -> Path {
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
    let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);

    let mut pb = PathBuilder::new();
    if r <= 0.0 {
        pb.rect(x, y, w, h);
        return pb.finish();
    }
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}
