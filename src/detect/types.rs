/// 归一化矩形
///
/// 坐标以图像宽高的比例表示，取值范围[0, 1]，原点位于图像左下角。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedRect {
    /// 左边缘
    pub x: f32,
    /// 下边缘
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

const EPSILON: f32 = 1e-4;

impl NormalizedRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// 覆盖整幅图像的矩形
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// 左下角原点坐标系中的上边缘
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// 检查所有分量是否有限且位于[0, 1]内
    pub fn is_valid(&self) -> bool {
        let unit = |v: f32| v.is_finite() && (-EPSILON..=1.0 + EPSILON).contains(&v);
        unit(self.x)
            && unit(self.y)
            && unit(self.width)
            && unit(self.height)
            && self.max_x() <= 1.0 + EPSILON
            && self.max_y() <= 1.0 + EPSILON
    }
}

/// 模型给出的单个分类
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub identifier: String,
    pub confidence: f32,
}

impl Classification {
    pub fn new(identifier: impl Into<String>, confidence: f32) -> Self {
        Self {
            identifier: identifier.into(),
            confidence,
        }
    }
}

/// 模型的原始输出
///
/// `labels`按可信度从高到低排列，第一个即最佳分类。
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub confidence: f32,
    pub labels: Vec<Classification>,
    pub bounding_box: NormalizedRect,
}

impl Observation {
    pub fn new(confidence: f32, labels: Vec<Classification>, bounding_box: NormalizedRect) -> Self {
        Self {
            confidence,
            labels,
            bounding_box,
        }
    }

    /// 只带一个分类的观测结果
    pub fn labeled(identifier: impl Into<String>, confidence: f32, bounding_box: NormalizedRect) -> Self {
        Self::new(confidence, vec![Classification::new(identifier, confidence)], bounding_box)
    }

    pub fn best_label(&self) -> Option<&Classification> {
        self.labels.first()
    }
}

/// 单个检测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// 类别名称
    pub label: String,
    /// 置信度，取值范围[0, 1]
    pub confidence: f32,
    /// 归一化边界框
    pub bounding_box: NormalizedRect,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bounding_box: NormalizedRect) -> Self {
        Self {
            label: label.into(),
            confidence,
            bounding_box,
        }
    }

    /// 由观测结果的最佳分类生成检测结果，无分类时返回None
    pub fn from_observation(observation: &Observation) -> Option<Self> {
        let best = observation.best_label()?;
        Some(Self::new(
            best.identifier.clone(),
            observation.confidence,
            observation.bounding_box,
        ))
    }
}

/// 一次推理得到的检测结果集合
///
/// 按置信度降序排列，置信度相同时保持模型输出的先后顺序。
/// 创建后不可修改。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionSet {
    detections: Vec<Detection>,
}

impl DetectionSet {
    /// 空集合，推理失败时用于清空叠加层
    pub fn empty() -> Self {
        Self::default()
    }

    /// 以模型输出顺序构造，内部做稳定的降序排序
    pub fn from_unsorted(mut detections: Vec<Detection>) -> Self {
        detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self { detections }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn as_slice(&self) -> &[Detection] {
        &self.detections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    pub fn first(&self) -> Option<&Detection> {
        self.detections.first()
    }

    /// 按排列顺序返回所有类别名称
    pub fn labels(&self) -> Vec<&str> {
        self.detections.iter().map(|d| d.label.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<Detection> {
        self.detections
    }
}

impl FromIterator<Detection> for DetectionSet {
    fn from_iter<I: IntoIterator<Item = Detection>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}
