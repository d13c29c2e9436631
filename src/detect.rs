//! Detect模块 - 检测调用协议与基于YOLO的检测模型
//!
//! # 主要组件
//!
//! - Detector：对被接纳的帧调用外部模型，产出按置信度降序排列的DetectionSet
//! - DetectionModel：外部检测模型接口
//! - YoloModel：基于ONNX Runtime的DetectionModel实现
//! - load_model：加载ONNX格式的YOLO模型
//!
//! # 坐标约定
//!
//! 模型输出的边界框使用归一化坐标，原点位于图像左下角。
//! 转换到绘制表面坐标由overlay模块负责。

pub mod detector;
pub mod infer;
pub mod model;
pub mod posts;
pub mod prevs;
pub mod types;
pub mod yolo;

pub use detector::{DetectionError, DetectionModel, Detector};
pub use model::load_model;
pub use types::{Classification, Detection, DetectionSet, NormalizedRect, Observation};
pub use yolo::YoloModel;
