use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// 容量为1的接纳闸门
///
/// 控制新到达的帧能否进入推理。推理进行中时闸门被占用，
/// 此时到达的帧全部被拒绝，不排队。
///
/// 每次成功的`try_acquire`必须恰好对应一次`release`，
/// 否则流水线将永久停止处理新帧。推荐使用`try_admit`返回的
/// `GatePermit`，它在被丢弃时自动释放闸门。
#[derive(Debug, Default)]
pub struct AdmissionGate {
    held: AtomicBool,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

/// 闸门的累计计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    pub admitted: u64,
    pub rejected: u64,
}

impl AdmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试占用闸门，从不阻塞
    ///
    /// # 返回值
    /// 闸门空闲时将其标记为占用并返回true，否则立即返回false
    pub fn try_acquire(&self) -> bool {
        let acquired = self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if acquired {
            self.admitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
        acquired
    }

    /// 将闸门恢复为空闲
    pub fn release(&self) {
        if !self.held.swap(false, Ordering::AcqRel) {
            log::warn!("admission gate released while already free");
        }
    }

    /// 闸门当前是否被占用
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// 尝试占用闸门并返回许可，许可被丢弃时自动释放闸门
    pub fn try_admit(self: &Arc<Self>) -> Option<GatePermit> {
        if self.try_acquire() {
            Some(GatePermit {
                gate: Arc::clone(self),
            })
        } else {
            None
        }
    }

    pub fn stats(&self) -> GateStats {
        GateStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// 闸门许可
///
/// 随被接纳的帧一起传递到推理线程。无论推理成功、失败还是提前退出，
/// 许可被丢弃时都会释放闸门，且只释放一次。
#[derive(Debug)]
#[must_use = "dropping the permit releases the gate immediately"]
pub struct GatePermit {
    gate: Arc<AdmissionGate>,
}

impl GatePermit {
    /// 显式释放闸门
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}
