use ort::session::{Session, builder::GraphOptimizationLevel};
use std::path::Path;

use crate::config::DEFAULT_INTRA_THREADS;

/// 加载ONNX格式的YOLO模型
///
/// 加载模型并应用优化配置。模型加载属于启动阶段的工作，
/// 失败由调用方处理，流水线只在模型就绪后才会被构造。
///
/// # 示例
///
/// ```no_run
/// use glimpse::detect::model::load_model;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let session = load_model("models/yolo11n.onnx")?;
/// # Ok(())
/// # }
/// ```
pub fn load_model(model_path: impl AsRef<Path>) -> Result<Session, ort::Error> {
    let model = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(DEFAULT_INTRA_THREADS)?
        .commit_from_file(model_path)?;
    Ok(model)
}
