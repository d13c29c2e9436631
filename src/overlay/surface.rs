use std::sync::Arc;
use tokio::sync::watch;

use crate::detect::types::DetectionSet;
use crate::overlay::mapper::SurfaceSize;
use crate::overlay::renderer::{OverlayElement, OverlayRenderer, OverlayState};
use crate::overlay::style::OverlayStyle;

/// 绘制表面
///
/// 接收一组绘制元素并整体替换当前叠加层；空切片表示清空。
pub trait Surface {
    /// 当前表面尺寸（像素）
    fn size(&self) -> SurfaceSize;

    fn replace_overlay(&mut self, elements: &[OverlayElement]);
}

/// 渲染上下文的提交句柄
///
/// 其他执行上下文只能通过句柄把检测结果交给渲染上下文。
/// 句柄只保存最新一份尚未渲染的结果，新结果覆盖旧结果。
#[derive(Debug, Clone)]
pub struct RenderHandle {
    sender: Arc<watch::Sender<DetectionSet>>,
}

impl RenderHandle {
    /// 安排一次渲染
    ///
    /// # 返回值
    /// 渲染上下文已结束时返回false
    pub fn submit(&self, detections: DetectionSet) -> bool {
        self.sender.send_replace(detections);
        !self.sender.is_closed()
    }

    /// 安排一次清空
    pub fn clear(&self) -> bool {
        self.submit(DetectionSet::empty())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// 渲染上下文
///
/// 独占渲染器和绘制表面，所有叠加层修改都在这里发生。
pub struct RenderLoop<S> {
    renderer: OverlayRenderer,
    surface: S,
    receiver: watch::Receiver<DetectionSet>,
    renders: u64,
}

/// 创建渲染上下文及其提交句柄
pub fn render_channel<S: Surface>(surface: S, style: OverlayStyle) -> (RenderLoop<S>, RenderHandle) {
    let (sender, receiver) = watch::channel(DetectionSet::empty());
    let render_loop = RenderLoop {
        renderer: OverlayRenderer::new(style),
        surface,
        receiver,
        renders: 0,
    };
    (
        render_loop,
        RenderHandle {
            sender: Arc::new(sender),
        },
    )
}

impl<S: Surface> RenderLoop<S> {
    /// 持续渲染提交的结果，直到所有句柄都被丢弃，然后交还绘制表面
    pub async fn run(mut self) -> S {
        while self.receiver.changed().await.is_ok() {
            let detections = self.receiver.borrow_and_update().clone();
            self.render(&detections);
        }
        log::debug!("render loop finished after {} renders", self.renders);
        self.surface
    }

    /// 若有尚未渲染的结果则立即渲染，不等待
    ///
    /// 适用于由界面事件循环驱动的表面。
    pub fn pump(&mut self) -> bool {
        let detections = {
            let latest = self.receiver.borrow_and_update();
            if !latest.has_changed() {
                return false;
            }
            latest.clone()
        };
        self.render(&detections);
        true
    }

    /// 在当前上下文中直接渲染
    pub fn render(&mut self, detections: &DetectionSet) {
        let size = self.surface.size();
        let state = self.renderer.render(detections, size);
        self.surface.replace_overlay(state.elements());
        self.renders += 1;
        log::debug!(
            "rendered {} detections as {} elements on {}x{}",
            detections.len(),
            state.len(),
            size.width,
            size.height
        );
    }

    pub fn state(&self) -> &OverlayState {
        self.renderer.state()
    }

    /// 已完成的渲染次数
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// 表面尺寸变化等操作同样在渲染上下文中进行
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
