use glimpse::overlay::{OverlayStyle, RasterSurface, render_channel};
use glimpse::{Admission, Coordinator, Frame, YoloModel, load_model};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Glimpse 实时检测预览");
    println!("========================");

    // 注意：确保模型文件和帧目录路径正确
    let model = load_model("module/yolo11n.onnx")?;
    let detector = YoloModel::with_default_input(model)
        .with_confidence_threshold(0.5)
        .with_nms_threshold(0.7);

    let (mut render_loop, handle) =
        render_channel(RasterSurface::new(960, 540), OverlayStyle::default());
    let coordinator = Coordinator::with_model(detector, handle)?;

    let mut paths: Vec<PathBuf> = std::fs::read_dir("data/frames")?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("jpg" | "jpeg" | "png")
            )
        })
        .collect();
    paths.sort();
    println!("共 {} 帧", paths.len());

    std::fs::create_dir_all("results")?;
    for (i, path) in paths.iter().enumerate() {
        let image = image::open(path)?;
        if coordinator.offer(Frame::upright_from(image.clone())) == Admission::Rejected {
            println!("帧 {}: 推理进行中，已丢弃", i + 1);
            continue;
        }

        // 等待渲染上下文收到这一帧的结果
        while !render_loop.pump() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let labels: Vec<&str> = render_loop
            .state()
            .labels()
            .map(|label| label.text.as_str())
            .collect();
        println!("帧 {}: {:?}", i + 1, labels);

        let output_path = format!("results/preview_{:04}.png", i + 1);
        render_loop.surface().composite(&image).save(&output_path)?;
    }

    let stats = coordinator.stats();
    println!(
        "送入 {} 帧，推理 {} 帧，丢弃 {} 帧，失败 {} 次",
        stats.offered, stats.admitted, stats.rejected, stats.failed
    );
    coordinator.shutdown();
    Ok(())
}
