pub mod config;
pub mod detect;
pub mod frame;
pub mod overlay;
pub mod pipeline;
pub mod utils;

// 重新导出常用类型和函数
pub use detect::{Detection, DetectionError, DetectionModel, DetectionSet, Detector, NormalizedRect, Observation};
pub use detect::{YoloModel, load_model};
pub use frame::{Frame, FrameReceiver, FrameSender, Orientation};
pub use overlay::{OverlayRenderer, OverlayStyle, RasterSurface, RenderHandle, RenderLoop, ScreenRect, Surface, SurfaceSize, render_channel};
pub use pipeline::{Admission, Coordinator, PipelineStats};
pub use utils::{AdmissionGate, GatePermit};
