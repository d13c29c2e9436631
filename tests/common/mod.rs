#![allow(dead_code)]

use glimpse::overlay::{OverlayElement, Surface, SurfaceSize};
use glimpse::{DetectionError, DetectionModel, Frame, NormalizedRect, Observation};
use image::DynamicImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// 记录每次整体替换的测试表面
pub struct RecordingSurface {
    size: SurfaceSize,
    current: Vec<OverlayElement>,
    replaced: UnboundedSender<Vec<OverlayElement>>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> (Self, UnboundedReceiver<Vec<OverlayElement>>) {
        let (tx, rx) = unbounded_channel();
        (
            Self {
                size: SurfaceSize::new(width, height),
                current: Vec::new(),
                replaced: tx,
            },
            rx,
        )
    }

    pub fn current(&self) -> &[OverlayElement] {
        &self.current
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn replace_overlay(&mut self, elements: &[OverlayElement]) {
        self.current = elements.to_vec();
        let _ = self.replaced.send(self.current.clone());
    }
}

pub fn frame() -> Frame {
    Frame::upright_from(DynamicImage::new_rgb8(8, 8))
}

pub fn label_of(elements: &[OverlayElement]) -> Vec<String> {
    elements
        .iter()
        .filter_map(|e| match e {
            OverlayElement::Label(l) => Some(l.text.clone()),
            OverlayElement::Box(_) => None,
        })
        .collect()
}

/// 并发计数
#[derive(Debug, Default, Clone)]
pub struct Concurrency {
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl Concurrency {
    /// 进入一次调用，返回调用序号（从1开始）
    pub fn enter(&self) -> usize {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// 每次调用都等待测试放行的模型，结果标签为`call<N>`
pub struct GatedModel {
    pub concurrency: Concurrency,
    started: mpsc::Sender<usize>,
    proceed: mpsc::Receiver<()>,
}

pub struct GatedControl {
    pub started: mpsc::Receiver<usize>,
    pub proceed: mpsc::Sender<()>,
}

impl GatedControl {
    pub fn wait_started(&self) -> usize {
        self.started
            .recv_timeout(Duration::from_secs(5))
            .expect("inference did not start")
    }
}

impl GatedModel {
    pub fn new() -> (Self, GatedControl) {
        let (started_tx, started_rx) = mpsc::channel();
        let (proceed_tx, proceed_rx) = mpsc::channel();
        (
            Self {
                concurrency: Concurrency::default(),
                started: started_tx,
                proceed: proceed_rx,
            },
            GatedControl {
                started: started_rx,
                proceed: proceed_tx,
            },
        )
    }
}

impl DetectionModel for GatedModel {
    fn detect(&mut self, _image: &DynamicImage) -> Result<Vec<Observation>, DetectionError> {
        let call = self.concurrency.enter();
        let _ = self.started.send(call);
        let proceed = self.proceed.recv_timeout(Duration::from_secs(5));
        self.concurrency.exit();
        proceed.map_err(|e| DetectionError::Runtime(e.to_string()))?;
        Ok(vec![Observation::labeled(
            format!("call{call}"),
            0.9,
            NormalizedRect::new(0.25, 0.5, 0.25, 0.25),
        )])
    }
}

/// 固定耗时的模型
pub struct SlowModel {
    pub concurrency: Concurrency,
    pub latency: Duration,
}

impl DetectionModel for SlowModel {
    fn detect(&mut self, _image: &DynamicImage) -> Result<Vec<Observation>, DetectionError> {
        self.concurrency.enter();
        std::thread::sleep(self.latency);
        self.concurrency.exit();
        Ok(Vec::new())
    }
}
