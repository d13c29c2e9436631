//! 帧模块 - 采集端交给流水线的图像帧以及帧通道
//!
//! 帧由外部采集源产生，按值移交给协调器。被接纳的帧只在一次推理调用期间
//! 由推理线程持有，调用结束即被丢弃；被拒绝的帧在接纳判定处直接丢弃。

use image::{DynamicImage, GenericImageView};
use tokio::sync::mpsc::{self, error::TrySendError};

/// 帧的方向（与EXIF方向一致）
///
/// 描述图像缓冲区相对于正常显示方向的旋转与镜像。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// 已是正常方向
    #[default]
    Up,
    /// 水平镜像
    UpMirrored,
    /// 旋转了180度
    Down,
    /// 垂直镜像
    DownMirrored,
    /// 画面顶部位于左侧
    Left,
    LeftMirrored,
    /// 画面顶部位于右侧
    Right,
    RightMirrored,
}

impl Orientation {
    /// 旋转后宽高是否互换
    pub fn swaps_dimensions(&self) -> bool {
        matches!(
            self,
            Orientation::Left | Orientation::LeftMirrored | Orientation::Right | Orientation::RightMirrored
        )
    }

    /// 将图像转换为正常显示方向
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        match self {
            Orientation::Up => image.clone(),
            Orientation::UpMirrored => image.fliph(),
            Orientation::Down => image.rotate180(),
            Orientation::DownMirrored => image.flipv(),
            Orientation::Left => image.rotate90(),
            Orientation::LeftMirrored => image.rotate90().fliph(),
            Orientation::Right => image.rotate270(),
            Orientation::RightMirrored => image.rotate270().fliph(),
        }
    }
}

/// 一帧采集到的图像
#[derive(Debug, Clone)]
pub struct Frame {
    /// 原始图像缓冲区
    pub image: DynamicImage,
    /// 缓冲区方向
    pub orientation: Orientation,
}

impl Frame {
    pub fn new(image: DynamicImage, orientation: Orientation) -> Self {
        Self { image, orientation }
    }

    /// 以正常方向创建帧
    pub fn upright_from(image: DynamicImage) -> Self {
        Self::new(image, Orientation::Up)
    }

    /// 缓冲区像素宽度
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// 缓冲区像素高度
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// 宽或高为0的帧无法推理
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// 返回按正常显示方向摆放的图像，供模型使用
    pub fn upright(&self) -> DynamicImage {
        self.orientation.apply(&self.image)
    }
}

/// 帧通道的发送端，由采集源持有
#[derive(Debug, Clone)]
pub struct FrameSender {
    inner: mpsc::Sender<Frame>,
}

/// 帧通道的接收端，由协调器消费
#[derive(Debug)]
pub struct FrameReceiver {
    inner: mpsc::Receiver<Frame>,
}

/// 创建帧通道
///
/// 通道不向采集端施加反压：通道已满时新帧会被直接丢弃，
/// 与采集设备丢弃迟到帧的行为一致。
pub fn channel(capacity: usize) -> (FrameSender, FrameReceiver) {
    let (inner_tx, inner_rx) = mpsc::channel(capacity.max(1));
    (FrameSender { inner: inner_tx }, FrameReceiver { inner: inner_rx })
}

impl FrameSender {
    /// 推送一帧，从不阻塞
    ///
    /// # 返回值
    /// 帧进入通道返回true；通道已满或已关闭时帧被丢弃并返回false
    pub fn push(&self, frame: Frame) -> bool {
        match self.inner.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::trace!("frame channel full, discarding late frame");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl FrameReceiver {
    /// 等待下一帧；所有发送端都被丢弃后返回None
    pub async fn recv(&mut self) -> Option<Frame> {
        self.inner.recv().await
    }

    /// 非阻塞地取出一帧
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.inner.try_recv().ok()
    }
}
