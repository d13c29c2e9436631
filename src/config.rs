/// 采集端到协调器之间的帧通道容量，满时直接丢弃迟到的帧
pub const FRAME_CHANNEL_CAPACITY: usize = 1;
pub const DEFAULT_CLASS_LABEL: &str = "person";

// 目标检测超参数配置
pub const DEFAULT_INPUT_WIDTH: usize = 640;
pub const DEFAULT_INPUT_HEIGHT: usize = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.7;
pub const DEFAULT_INTRA_THREADS: usize = 4;

// 叠加层样式
pub const BOX_STROKE_WIDTH: f32 = 2.0;
pub const BOX_CORNER_RADIUS: f32 = 6.0;
pub const BOX_COLOR: [u8; 4] = [0xFF, 0x00, 0x00, 0xFF];
pub const LABEL_FONT_SIZE: f32 = 13.0;
pub const LABEL_WIDTH: f32 = 220.0;
pub const LABEL_HEIGHT: f32 = 20.0;
/// 标签相对检测框上边缘的偏移
pub const LABEL_OFFSET: f32 = 22.0;
pub const LABEL_CORNER_RADIUS: f32 = 4.0;
/// 黑色，透明度0.6
pub const LABEL_BACKGROUND: [u8; 4] = [0x00, 0x00, 0x00, 0x99];
pub const LABEL_TEXT_COLOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// 推理线程名称
pub const INFERENCE_THREAD_NAME: &str = "glimpse-inference";
