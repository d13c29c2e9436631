use image::{DynamicImage, GenericImageView, imageops::FilterType};
use ndarray::{Array, Array4};

/// 调整图像大小以适应模型输入
///
/// 使用CatmullRom插值拉伸到指定尺寸，不保持宽高比，
/// 因此相对模型输入的归一化坐标等于相对原图的归一化坐标。
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    img.resize_exact(width, height, FilterType::CatmullRom)
}

/// 将图像转换为模型输入张量
///
/// 返回形状为(1, 3, height, width)的NCHW张量，通道顺序为RGB，像素值范围[0, 1]。
/// 图像尺寸应与输入尺寸一致，超出部分被忽略。
pub fn image_to_tensor(img: &DynamicImage, input_height: usize, input_width: usize) -> Array4<f32> {
    let mut tensor = Array::zeros((1, 3, input_height, input_width));

    for (x, y, pixel) in img.pixels() {
        let (x, y) = (x as usize, y as usize);
        if x >= input_width || y >= input_height {
            continue;
        }
        let [r, g, b, _] = pixel.0;
        tensor[[0, 0, y, x]] = (r as f32) / 255.0;
        tensor[[0, 1, y, x]] = (g as f32) / 255.0;
        tensor[[0, 2, y, x]] = (b as f32) / 255.0;
    }

    tensor
}
