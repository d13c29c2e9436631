mod common;

use common::{Concurrency, GatedModel, RecordingSurface, SlowModel, frame, label_of};
use glimpse::overlay::{OverlayStyle, render_channel};
use glimpse::{
    Admission, Coordinator, DetectionError, Frame, NormalizedRect, Observation, frame as frames,
};
use image::DynamicImage;
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_frames_during_inference_are_dropped() {
        let (surface, mut rendered) = RecordingSurface::new(400.0, 200.0);
        let (render_loop, handle) = render_channel(surface, OverlayStyle::default());
        let render_task = tokio::spawn(render_loop.run());

        let (model, control) = GatedModel::new();
        let concurrency = model.concurrency.clone();
        let coordinator = Coordinator::with_model(model, handle).expect("worker starts");

        assert_eq!(coordinator.offer(frame()), Admission::Admitted);
        assert_eq!(control.wait_started(), 1);

        // 帧2到帧5在帧1的推理期间到达
        for _ in 2..=5 {
            assert_eq!(coordinator.offer(frame()), Admission::Rejected);
        }
        assert!(coordinator.is_busy());

        control.proceed.send(()).expect("model alive");
        let elements = timeout(WAIT, rendered.recv())
            .await
            .expect("render in time")
            .expect("surface alive");
        assert_eq!(label_of(&elements), vec!["call1 (90%)".to_string()]);

        // 渲染前闸门已经释放
        assert!(!coordinator.is_busy());
        assert_eq!(coordinator.offer(frame()), Admission::Admitted);
        assert_eq!(control.wait_started(), 2);
        control.proceed.send(()).expect("model alive");
        let elements = timeout(WAIT, rendered.recv())
            .await
            .expect("render in time")
            .expect("surface alive");
        assert_eq!(label_of(&elements), vec!["call2 (90%)".to_string()]);

        let stats = coordinator.stats();
        assert_eq!(stats.offered, 6);
        assert_eq!(stats.admitted, 2);
        assert_eq!(stats.rejected, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(concurrency.calls(), 2);
        assert_eq!(concurrency.max_active(), 1);

        coordinator.shutdown();
        let surface = timeout(WAIT, render_task)
            .await
            .expect("render loop ends")
            .expect("render task");
        assert_eq!(surface.current().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rapid_arrivals_never_overlap_inference() {
        let (surface, _rendered) = RecordingSurface::new(64.0, 64.0);
        let (render_loop, handle) = render_channel(surface, OverlayStyle::default());
        let render_task = tokio::spawn(render_loop.run());

        let concurrency = Concurrency::default();
        let model = SlowModel {
            concurrency: concurrency.clone(),
            latency: Duration::from_millis(15),
        };
        let coordinator = Coordinator::with_model(model, handle).expect("worker starts");

        // 采集线程以远高于推理吞吐的速率送帧
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..200 {
                    coordinator.offer(frame());
                    std::thread::sleep(Duration::from_millis(1));
                }
            });
        });

        let stats = coordinator.stats();
        assert_eq!(stats.offered, 200);
        assert!(stats.admitted >= 1);
        assert!(stats.rejected >= 1);
        assert_eq!(stats.admitted + stats.rejected, 200);

        coordinator.shutdown();
        assert_eq!(concurrency.max_active(), 1);
        assert_eq!(concurrency.calls() as u64, stats.admitted);
        timeout(WAIT, render_task)
            .await
            .expect("render loop ends")
            .expect("render task");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_detection_error_clears_overlay_and_frees_gate() {
        let (surface, mut rendered) = RecordingSurface::new(400.0, 200.0);
        let (render_loop, handle) = render_channel(surface, OverlayStyle::default());
        let render_task = tokio::spawn(render_loop.run());

        let mut calls = 0;
        let model = move |_image: &DynamicImage| {
            calls += 1;
            if calls == 2 {
                return Err(DetectionError::Runtime("accelerator reset".to_string()));
            }
            Ok(vec![Observation::labeled(
                "person",
                0.75,
                NormalizedRect::new(0.1, 0.1, 0.5, 0.5),
            )])
        };
        let coordinator = Coordinator::with_model(model, handle).expect("worker starts");

        assert_eq!(coordinator.offer(frame()), Admission::Admitted);
        let elements = timeout(WAIT, rendered.recv()).await.expect("render").expect("alive");
        assert_eq!(elements.len(), 2);

        assert_eq!(coordinator.offer(frame()), Admission::Admitted);
        let elements = timeout(WAIT, rendered.recv()).await.expect("render").expect("alive");
        assert!(elements.is_empty());
        assert!(!coordinator.is_busy());

        // 下一帧自动恢复
        assert_eq!(coordinator.offer(frame()), Admission::Admitted);
        let elements = timeout(WAIT, rendered.recv()).await.expect("render").expect("alive");
        assert_eq!(label_of(&elements), vec!["person (75%)".to_string()]);

        let stats = coordinator.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 2);

        drop(coordinator);
        timeout(WAIT, render_task).await.expect("render loop ends").expect("render task");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_model_does_not_stick_gate() {
        let (surface, mut rendered) = RecordingSurface::new(100.0, 100.0);
        let (render_loop, handle) = render_channel(surface, OverlayStyle::default());
        let render_task = tokio::spawn(render_loop.run());

        let mut calls = 0;
        let model = move |_image: &DynamicImage| -> Result<Vec<Observation>, DetectionError> {
            calls += 1;
            if calls == 1 {
                panic!("corrupt buffer");
            }
            Ok(vec![Observation::labeled("cup", 0.5, NormalizedRect::full())])
        };
        let coordinator = Coordinator::with_model(model, handle).expect("worker starts");

        assert_eq!(coordinator.offer(frame()), Admission::Admitted);
        let elements = timeout(WAIT, rendered.recv()).await.expect("render").expect("alive");
        assert!(elements.is_empty());

        assert_eq!(coordinator.offer(frame()), Admission::Admitted);
        let elements = timeout(WAIT, rendered.recv()).await.expect("render").expect("alive");
        assert_eq!(elements.len(), 2);

        coordinator.shutdown();
        timeout(WAIT, render_task).await.expect("render loop ends").expect("render task");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_malformed_frame_clears_overlay() {
        let (surface, mut rendered) = RecordingSurface::new(100.0, 100.0);
        let (render_loop, handle) = render_channel(surface, OverlayStyle::default());
        let render_task = tokio::spawn(render_loop.run());

        let model = |_image: &DynamicImage| {
            Ok::<_, DetectionError>(vec![Observation::labeled("cup", 0.5, NormalizedRect::full())])
        };
        let coordinator = Coordinator::with_model(model, handle).expect("worker starts");

        assert_eq!(coordinator.offer(frame()), Admission::Admitted);
        let elements = timeout(WAIT, rendered.recv()).await.expect("render").expect("alive");
        assert_eq!(elements.len(), 2);

        let empty = Frame::upright_from(DynamicImage::new_rgb8(0, 0));
        assert_eq!(coordinator.offer(empty), Admission::Admitted);
        let elements = timeout(WAIT, rendered.recv()).await.expect("render").expect("alive");
        assert!(elements.is_empty());
        assert_eq!(coordinator.stats().failed, 1);

        coordinator.shutdown();
        timeout(WAIT, render_task).await.expect("render loop ends").expect("render task");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_drive_consumes_frame_channel() {
        let (surface, _rendered) = RecordingSurface::new(100.0, 100.0);
        let (render_loop, handle) = render_channel(surface, OverlayStyle::default());
        let render_task = tokio::spawn(render_loop.run());

        let concurrency = Concurrency::default();
        let model = SlowModel {
            concurrency: concurrency.clone(),
            latency: Duration::from_millis(5),
        };
        let coordinator = Coordinator::with_model(model, handle).expect("worker starts");

        let (sender, receiver) = frames::channel(1);
        let producer = tokio::spawn(async move {
            let mut pushed = 0;
            for _ in 0..50 {
                if sender.push(frame()) {
                    pushed += 1;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            pushed
        });

        timeout(WAIT, coordinator.drive(receiver))
            .await
            .expect("drive ends when the sender is dropped");
        let pushed: u64 = producer.await.expect("producer");

        let stats = coordinator.stats();
        assert_eq!(stats.offered, pushed);
        assert!(stats.admitted >= 1);

        coordinator.shutdown();
        assert_eq!(concurrency.max_active(), 1);
        timeout(WAIT, render_task).await.expect("render loop ends").expect("render task");
    }
}
