use ndarray::{Array2, Array4};
use ort::{inputs, session::Session, value::Tensor};

use crate::detect::detector::DetectionError;

/// 模型输入名称
pub const INPUT_NAME: &str = "images";

/// 运行模型推理
///
/// # 参数
/// * `model` - ONNX模型Session
/// * `input` - 输入张量，形状为(1, 3, height, width)
///
/// # 返回值
/// 返回形状为(num_boxes, num_params)的输出矩阵，每行为
/// [x1, y1, x2, y2, score, class_id...]，坐标相对模型输入尺寸
///
/// # 错误处理
/// 输出形状不是[1, N, C]（C >= 5）时返回`DetectionError::Output`
pub fn run_inference(model: &mut Session, input: &Array4<f32>) -> Result<Array2<f32>, DetectionError> {
    let shape: Vec<usize> = input.shape().to_vec();
    let (data, _offset) = input.clone().into_raw_vec_and_offset();
    let input_tensor = Tensor::from_array(([shape[0], shape[1], shape[2], shape[3]], data))?;
    let outputs = model.run(inputs![INPUT_NAME => input_tensor])?;

    let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
    if shape.len() != 3 || shape[0] != 1 || shape[2] < 5 {
        return Err(DetectionError::Output(format!(
            "expected [1, N, C>=5], got {:?}",
            shape.to_vec()
        )));
    }

    let array = Array2::from_shape_vec((shape[1] as usize, shape[2] as usize), data.to_vec())?;
    Ok(array)
}
