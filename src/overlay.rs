//! Overlay模块 - 将检测结果绘制为与当前画面对齐的叠加层
//!
//! - mapper：左下角原点的归一化坐标到表面像素坐标的转换
//! - renderer：由检测结果整体重建叠加层状态
//! - surface：绘制表面接口、渲染上下文及其提交句柄
//! - raster：基于raqote的光栅表面

pub mod mapper;
pub mod raster;
pub mod renderer;
pub mod style;
pub mod surface;

pub use mapper::{ScreenRect, SurfaceSize, map};
pub use raster::RasterSurface;
pub use renderer::{BoxElement, LabelElement, OverlayElement, OverlayRenderer, OverlayState, label_text};
pub use style::OverlayStyle;
pub use surface::{RenderHandle, RenderLoop, Surface, render_channel};
