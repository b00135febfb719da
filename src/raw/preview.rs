/// Adapters for plugging a synchronous image engine into the render queue
///
/// Preview rendering is CPU-bound, so blocking engines are run on tokio's
/// blocking pool and never on the async workers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::queue::ProcessFuture;
use super::task::{RenderOutput, RenderTask};

/// Wrap a blocking render function as a queue processor
///
/// Each call is moved onto `spawn_blocking`; a join error (panic in the
/// engine) becomes an ordinary render error.
pub fn blocking_processor<F>(
    render: F,
) -> impl Fn(RenderTask) -> ProcessFuture + Send + Sync + 'static
where
    F: Fn(&RenderTask) -> Result<RenderOutput, String> + Send + Sync + 'static,
{
    let render = Arc::new(render);
    move |task: RenderTask| -> ProcessFuture {
        let render = Arc::clone(&render);
        Box::pin(async move {
            match tokio::task::spawn_blocking(move || (*render)(&task)).await {
                Ok(result) => result,
                Err(e) => Err(format!("Task join error: {}", e)),
            }
        })
    }
}

/// Where the preview for a task is cached: `<cache_dir>/<id>.jpg`,
/// or `<cache_dir>/<id>_f<frame>.jpg` for a specific frame
pub fn preview_cache_path(cache_dir: &Path, task: &RenderTask) -> PathBuf {
    match task.frame {
        Some(frame) => cache_dir.join(format!("{}_f{}.jpg", task.id, frame)),
        None => cache_dir.join(format!("{}.jpg", task.id)),
    }
}

/// Get the cache directory for rendered previews
pub fn get_preview_cache_dir() -> Option<PathBuf> {
    let mut path = dirs::cache_dir().or_else(dirs::home_dir)?;
    path.push("raw-editor");
    path.push("previews");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::raw::queue::ProcessingQueue;

    #[test]
    fn test_cache_path_includes_frame() {
        let dir = Path::new("/cache");
        let task = RenderTask::new("12", "/photos/12.nef");
        assert_eq!(preview_cache_path(dir, &task), PathBuf::from("/cache/12.jpg"));
        assert_eq!(
            preview_cache_path(dir, &task.with_frame(4)),
            PathBuf::from("/cache/12_f4.jpg")
        );
    }

    #[tokio::test]
    async fn test_blocking_engine_through_queue() {
        let cache = tempfile::tempdir().unwrap();
        let cache_dir = cache.path().to_path_buf();

        let queue = ProcessingQueue::new();
        queue.set_processor(blocking_processor(move |task: &RenderTask| {
            if !Path::new(&task.path).exists() {
                return Err(format!("RAW file does not exist: {}", task.path));
            }
            let preview = preview_cache_path(&cache_dir, task);
            std::fs::write(&preview, b"jpeg").map_err(|e| e.to_string())?;
            Ok(RenderOutput {
                id: task.id.clone(),
                path: preview.to_string_lossy().to_string(),
            })
        }));

        let source = cache.path().join("source.nef");
        std::fs::write(&source, b"raw").unwrap();

        let output = queue
            .request_processing(RenderTask::new("1", source.to_string_lossy()))
            .await
            .unwrap();
        assert!(Path::new(&output.path).exists());

        let missing = queue
            .request_processing(RenderTask::new("2", "/nonexistent/path.nef"))
            .await;
        assert!(matches!(missing, Err(QueueError::Failed(_))));
    }
}
