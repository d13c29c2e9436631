use image::DynamicImage;
use ort::session::Session;
use std::time::Instant;

use crate::config::{
    DEFAULT_CLASS_LABEL, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH,
    DEFAULT_NMS_THRESHOLD,
};
use crate::detect::detector::{DetectionError, DetectionModel};
use crate::detect::infer::run_inference;
use crate::detect::posts::process_detections;
use crate::detect::prevs::{image_to_tensor, resize_image};
use crate::detect::types::Observation;

/// 基于ONNX Runtime的YOLO检测模型
///
/// 封装图像预处理、模型推理和结果后处理，输出左下角原点的归一化观测结果。
///
/// # 示例
///
/// ```no_run
/// use glimpse::detect::{model::load_model, yolo::YoloModel};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let session = load_model("models/yolo11n.onnx")?;
/// let model = YoloModel::new(session, 640, 640)
///     .with_confidence_threshold(0.5)
///     .with_nms_threshold(0.7);
/// # Ok(())
/// # }
/// ```
pub struct YoloModel {
    /// ONNX模型会话
    session: Session,
    input_width: usize,
    input_height: usize,
    /// 置信度阈值，低于此值的检测结果将被过滤
    confidence_threshold: f32,
    /// NMS阈值，用于去除重复检测
    nms_threshold: f32,
    /// 按类别ID索引的类别名称
    class_names: Vec<String>,
}

impl YoloModel {
    pub fn new(session: Session, input_width: usize, input_height: usize) -> Self {
        Self {
            session,
            input_width,
            input_height,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
            class_names: vec![DEFAULT_CLASS_LABEL.to_string()],
        }
    }

    /// 使用默认输入尺寸
    pub fn with_default_input(session: Session) -> Self {
        Self::new(session, DEFAULT_INPUT_WIDTH, DEFAULT_INPUT_HEIGHT)
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_nms_threshold(mut self, threshold: f32) -> Self {
        self.nms_threshold = threshold;
        self
    }

    pub fn with_class_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn input_height(&self) -> usize {
        self.input_height
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn nms_threshold(&self) -> f32 {
        self.nms_threshold
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }
}

impl DetectionModel for YoloModel {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<Observation>, DetectionError> {
        let resized = resize_image(image, self.input_width as u32, self.input_height as u32);
        let input_tensor = image_to_tensor(&resized, self.input_height, self.input_width);

        let start_time = Instant::now();
        let output = run_inference(&mut self.session, &input_tensor)?;
        log::trace!("onnx session run took {:?}", start_time.elapsed());

        Ok(process_detections(
            &output,
            self.input_width,
            self.input_height,
            self.confidence_threshold,
            self.nms_threshold,
            &self.class_names,
        ))
    }
}
