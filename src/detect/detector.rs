use image::DynamicImage;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;
use thiserror::Error;

use crate::detect::types::{Detection, DetectionSet, Observation};
use crate::frame::Frame;

/// 推理失败
///
/// 所有变体都在流水线内部恢复：释放闸门、清空叠加层，不向调用方传播。
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("malformed frame: {width}x{height}")]
    MalformedFrame { width: u32, height: u32 },
    #[error("model runtime error: {0}")]
    Runtime(String),
    #[error("unexpected model output: {0}")]
    Output(String),
    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("model panicked: {0}")]
    Panicked(String),
}

/// 外部检测模型接口
///
/// 输入一幅正常方向的图像，返回模型输出顺序的观测结果。
/// 调用在推理线程上同步执行。
pub trait DetectionModel: Send {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Observation>, DetectionError>;
}

impl<F> DetectionModel for F
where
    F: FnMut(&DynamicImage) -> Result<Vec<Observation>, DetectionError> + Send,
{
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Observation>, DetectionError> {
        self(image)
    }
}

/// 检测器
///
/// 对被接纳的帧调用外部模型，并将结果整理为按置信度降序排列的`DetectionSet`。
pub struct Detector<M> {
    model: M,
}

impl<M: DetectionModel> Detector<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// 对一帧执行推理
    ///
    /// 帧在调用结束时被丢弃。模型发生panic时同样返回错误，
    /// 以便调用方按普通失败处理。
    ///
    /// # 错误处理
    /// 宽或高为0的帧返回`DetectionError::MalformedFrame`，
    /// 模型错误原样返回
    pub fn infer(&mut self, frame: Frame) -> Result<DetectionSet, DetectionError> {
        if frame.is_empty() {
            return Err(DetectionError::MalformedFrame {
                width: frame.width(),
                height: frame.height(),
            });
        }

        let image = frame.upright();
        drop(frame);

        let start_time = Instant::now();
        let model = &mut self.model;
        let observations = catch_unwind(AssertUnwindSafe(|| model.detect(&image)))
            .map_err(|payload| DetectionError::Panicked(panic_message(payload.as_ref())))??;
        log::trace!("model inference took {:?}", start_time.elapsed());

        Ok(observations
            .iter()
            .filter_map(Detection::from_observation)
            .collect())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
