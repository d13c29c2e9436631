//! 后处理模块
//!
//! 负责处理模型输出：置信度过滤、按类别的非极大值抑制(NMS)，
//! 以及从模型输入像素坐标到左下角原点归一化坐标的转换。

use ndarray::{Array2, Axis};

use crate::detect::types::{Classification, NormalizedRect, Observation};

/// 模型输入像素坐标中的候选框
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    class_id: usize,
    score: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }
}

/// 处理模型输出，应用置信度和NMS阈值
///
/// # 参数
/// * `output` - 模型输出，形状为(num_boxes, num_params)，每行为[x1, y1, x2, y2, score, class_id]
/// * `input_width` - 模型输入宽度
/// * `input_height` - 模型输入高度
/// * `confidence_threshold` - 置信度阈值
/// * `nms_threshold` - NMS阈值
/// * `class_names` - 类别名称，按类别ID索引
///
/// # 返回值
/// 按置信度降序排列的观测结果
pub fn process_detections(
    output: &Array2<f32>,
    input_width: usize,
    input_height: usize,
    confidence_threshold: f32,
    nms_threshold: f32,
    class_names: &[String],
) -> Vec<Observation> {
    let (w, h) = (input_width as f32, input_height as f32);
    let mut candidates = Vec::with_capacity(output.len_of(Axis(0)));

    for row in output.axis_iter(Axis(0)) {
        let score = row[4];
        if !score.is_finite() || score < confidence_threshold {
            continue;
        }
        let class_id = if row.len() > 5 && row[5] >= 0.0 {
            row[5] as usize
        } else {
            0
        };

        // 保证坐标有序并裁剪到输入范围内
        let candidate = Candidate {
            x1: row[0].min(row[2]).clamp(0.0, w),
            y1: row[1].min(row[3]).clamp(0.0, h),
            x2: row[0].max(row[2]).clamp(0.0, w),
            y2: row[1].max(row[3]).clamp(0.0, h),
            class_id,
            score: score.min(1.0),
        };
        if candidate.area() <= 0.0 {
            continue;
        }
        candidates.push(candidate);
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    apply_nms(&candidates, nms_threshold)
        .into_iter()
        .map(|c| {
            let label = class_names
                .get(c.class_id)
                .cloned()
                .unwrap_or_else(|| format!("class{}", c.class_id));
            Observation::new(
                c.score,
                vec![Classification::new(label, c.score)],
                normalize(&c, w, h),
            )
        })
        .collect()
}

/// 转换为左下角原点的归一化矩形
fn normalize(candidate: &Candidate, w: f32, h: f32) -> NormalizedRect {
    NormalizedRect {
        x: candidate.x1 / w,
        y: 1.0 - candidate.y2 / h,
        width: (candidate.x2 - candidate.x1) / w,
        height: (candidate.y2 - candidate.y1) / h,
    }
}

/// 应用非极大值抑制
///
/// 输入需按置信度降序排列。同一类别中与已保留框IoU不小于阈值的框被去除。
fn apply_nms(candidates: &[Candidate], nms_threshold: f32) -> Vec<Candidate> {
    let mut result: Vec<Candidate> = Vec::new();
    let mut suppressed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        result.push(candidates[i]);

        for j in (i + 1)..candidates.len() {
            if suppressed[j] || candidates[j].class_id != candidates[i].class_id {
                continue;
            }
            if iou(&candidates[i], &candidates[j]) >= nms_threshold {
                suppressed[j] = true;
            }
        }
    }

    result
}

/// 计算两个框的交并比
fn iou(a: &Candidate, b: &Candidate) -> f32 {
    let width = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let height = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let intersection = width * height;
    let union = a.area() + b.area() - intersection;
    if union <= 0.0 { 0.0 } else { intersection / union }
}
