use image::Rgba;

use crate::detect::types::{Detection, DetectionSet};
use crate::overlay::mapper::{ScreenRect, SurfaceSize, map};
use crate::overlay::style::OverlayStyle;

/// 检测框元素
#[derive(Debug, Clone, PartialEq)]
pub struct BoxElement {
    pub rect: ScreenRect,
    pub stroke_width: f32,
    pub stroke_color: Rgba<u8>,
    pub corner_radius: f32,
}

/// 带背景的文字标签元素
#[derive(Debug, Clone, PartialEq)]
pub struct LabelElement {
    pub frame: ScreenRect,
    pub text: String,
    pub font_size: f32,
    pub text_color: Rgba<u8>,
    pub background: Rgba<u8>,
    pub corner_radius: f32,
}

/// 叠加层上的一个可见元素
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayElement {
    Box(BoxElement),
    Label(LabelElement),
}

/// 当前绘制的全部元素，每次渲染整体替换
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    elements: Vec<OverlayElement>,
}

impl OverlayState {
    pub fn elements(&self) -> &[OverlayElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn boxes(&self) -> impl Iterator<Item = &BoxElement> {
        self.elements.iter().filter_map(|e| match e {
            OverlayElement::Box(b) => Some(b),
            OverlayElement::Label(_) => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &LabelElement> {
        self.elements.iter().filter_map(|e| match e {
            OverlayElement::Label(l) => Some(l),
            OverlayElement::Box(_) => None,
        })
    }
}

/// 标签文字，形如`person (87%)`
pub fn label_text(detection: &Detection) -> String {
    format!("{} ({}%)", detection.label, (detection.confidence * 100.0).round() as i64)
}

/// 叠加层渲染器
///
/// 独占叠加层状态，只能在拥有绘制表面的执行上下文中使用。
/// 其他上下文通过`RenderHandle`提交结果。
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
    state: OverlayState,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            style,
            state: OverlayState::default(),
        }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// 清空所有叠加元素
    pub fn clear(&mut self) {
        self.state.elements.clear();
    }

    /// 用检测结果替换叠加层
    ///
    /// 先清空已有元素；结果为空时到此为止。否则按顺序为每个检测结果
    /// 生成一个检测框和一个位于框上边缘之上的标签（不越过表面顶部）。
    /// 相同输入重复调用得到相同状态。
    pub fn render(&mut self, detections: &DetectionSet, surface: SurfaceSize) -> &OverlayState {
        self.clear();
        if detections.is_empty() {
            return &self.state;
        }

        let style = &self.style;
        self.state.elements.reserve(detections.len() * 2);
        for detection in detections {
            let rect = map(detection.bounding_box, surface);
            self.state.elements.push(OverlayElement::Box(BoxElement {
                rect,
                stroke_width: style.stroke_width,
                stroke_color: style.stroke_color,
                corner_radius: style.box_corner_radius,
            }));

            let frame = ScreenRect::new(
                rect.min_x(),
                (rect.min_y() - style.label_offset).max(0.0),
                style.label_width,
                style.label_height,
            );
            self.state.elements.push(OverlayElement::Label(LabelElement {
                frame,
                text: label_text(detection),
                font_size: style.font_size,
                text_color: style.text_color,
                background: style.label_background,
                corner_radius: style.label_corner_radius,
            }));
        }

        &self.state
    }
}
