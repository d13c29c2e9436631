//! 流水线协调器
//!
//! 将帧源、接纳闸门、检测器和渲染上下文连接起来：
//!
//! 1. 帧到达后在采集上下文中调用闸门的`try_acquire`
//! 2. 闸门被占用时直接丢弃该帧
//! 3. 闸门空闲时把帧连同许可交给推理线程
//! 4. 推理结束（成功或失败）后先释放闸门，再把结果交给渲染上下文，
//!    失败时提交空结果以清空叠加层
//!
//! 同一时刻最多只有一次推理在进行，因此结果天然按开始顺序完成。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use crate::config::INFERENCE_THREAD_NAME;
use crate::detect::detector::{DetectionModel, Detector};
use crate::detect::types::DetectionSet;
use crate::frame::{Frame, FrameReceiver};
use crate::overlay::surface::RenderHandle;
use crate::utils::gate::{AdmissionGate, GatePermit};

/// 一帧的接纳结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// 已进入推理
    Admitted,
    /// 推理进行中，帧已被丢弃
    Rejected,
}

/// 流水线的累计计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub offered: u64,
    pub admitted: u64,
    /// 因推理进行中而被丢弃的帧
    pub rejected: u64,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
}

struct Job {
    frame: Frame,
    permit: GatePermit,
}

/// 流水线协调器
///
/// 拥有闸门和推理线程。`offer`在调用方线程上以O(1)完成接纳判定，从不阻塞。
pub struct Coordinator {
    gate: Arc<AdmissionGate>,
    jobs: Option<SyncSender<Job>>,
    counters: Arc<Counters>,
    worker: Option<JoinHandle<()>>,
}

impl Coordinator {
    /// 创建协调器并启动推理线程
    ///
    /// # 错误处理
    /// 推理线程无法创建时返回Err
    pub fn new<M>(detector: Detector<M>, render: RenderHandle) -> std::io::Result<Self>
    where
        M: DetectionModel + 'static,
    {
        let gate = Arc::new(AdmissionGate::new());
        let counters = Arc::new(Counters::default());
        // 容量为1即可：许可在任务被取走之后才会释放
        let (jobs_tx, jobs_rx) = mpsc::sync_channel::<Job>(1);

        let worker_counters = Arc::clone(&counters);
        let worker = thread::Builder::new()
            .name(INFERENCE_THREAD_NAME.to_string())
            .spawn(move || inference_worker(detector, jobs_rx, render, worker_counters))?;

        Ok(Self {
            gate,
            jobs: Some(jobs_tx),
            counters,
            worker: Some(worker),
        })
    }

    /// 直接用检测模型创建协调器
    pub fn with_model<M>(model: M, render: RenderHandle) -> std::io::Result<Self>
    where
        M: DetectionModel + 'static,
    {
        Self::new(Detector::new(model), render)
    }

    /// 提交一帧
    ///
    /// 闸门空闲时帧进入推理，否则立即丢弃。被拒绝不是错误。
    pub fn offer(&self, frame: Frame) -> Admission {
        let Some(jobs) = &self.jobs else {
            return Admission::Rejected;
        };
        let Some(permit) = self.gate.try_admit() else {
            log::trace!("inference in flight, dropping frame");
            return Admission::Rejected;
        };

        match jobs.try_send(Job { frame, permit }) {
            Ok(()) => Admission::Admitted,
            // 任务随许可一起被丢弃，闸门随之释放
            Err(TrySendError::Full(_)) => {
                log::warn!("inference queue unexpectedly full, dropping frame");
                Admission::Rejected
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("inference worker gone, dropping frame");
                Admission::Rejected
            }
        }
    }

    /// 消费帧通道直到其关闭
    pub async fn drive(&self, mut frames: FrameReceiver) {
        while let Some(frame) = frames.recv().await {
            self.offer(frame);
        }
        log::debug!("frame channel closed");
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// 推理是否正在进行
    pub fn is_busy(&self) -> bool {
        self.gate.is_held()
    }

    pub fn stats(&self) -> PipelineStats {
        let gate = self.gate.stats();
        PipelineStats {
            offered: gate.admitted + gate.rejected,
            admitted: gate.admitted,
            rejected: gate.rejected,
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// 停止接收新帧，等待当前推理结束后退出推理线程
    pub fn shutdown(mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("inference worker panicked");
            }
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        // 关闭任务通道，推理线程在当前任务结束后自行退出
        self.jobs.take();
    }
}

fn inference_worker<M: DetectionModel>(
    mut detector: Detector<M>,
    jobs: Receiver<Job>,
    render: RenderHandle,
    counters: Arc<Counters>,
) {
    log::info!("inference worker started");
    while let Ok(Job { frame, permit }) = jobs.recv() {
        let result = detector.infer(frame);
        permit.release();

        let detections = match result {
            Ok(detections) => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
                detections
            }
            Err(error) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("detection failed, clearing overlay: {}", error);
                DetectionSet::empty()
            }
        };

        if !render.submit(detections) {
            log::debug!("render context closed, result discarded");
        }
    }
    log::info!("inference worker stopped");
}
