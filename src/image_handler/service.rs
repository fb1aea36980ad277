//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `ImageServiceState` 作为 Web 层注入状态，替代全局单例函数。
//! 好处：生命周期由 `main.rs` 统一管理，测试可创建独立实例。
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `accept_upload`：入口校验
//! - `process`：在阻塞线程池中执行完整处理链路，避免解码/编码阻塞异步运行时

use std::sync::Arc;

use bytes::Bytes;

use super::source::{ProcessedImage, UploadedFile};
use super::{ImageConfig, ImageError, ImageHandler};

/// 图片处理服务状态。
#[derive(Debug, Clone)]
pub struct ImageServiceState {
    handler: Arc<ImageHandler>,
}

impl ImageServiceState {
    /// 使用默认配置创建服务状态。
    ///
    /// # 示例
    /// ```rust
    /// use piclink::image_handler::ImageServiceState;
    ///
    /// let service = ImageServiceState::new()?;
    /// # Ok::<(), piclink::image_handler::ImageError>(())
    /// ```
    pub fn new() -> Result<Self, ImageError> {
        Self::with_config(ImageConfig::default())
    }

    /// 使用自定义配置创建服务状态。
    pub fn with_config(config: ImageConfig) -> Result<Self, ImageError> {
        Ok(Self {
            handler: Arc::new(ImageHandler::new(config)?),
        })
    }

    pub fn config(&self) -> &ImageConfig {
        self.handler.config()
    }

    pub fn accept_upload(
        &self,
        filename: &str,
        declared_mime: Option<&str>,
        bytes: Bytes,
    ) -> Result<Option<UploadedFile>, ImageError> {
        self.handler.accept_upload(filename, declared_mime, bytes)
    }

    /// 执行完整处理链路。
    pub async fn process(&self, upload: Arc<UploadedFile>) -> Result<ProcessedImage, ImageError> {
        let handler = Arc::clone(&self.handler);
        Self::run_blocking(move || handler.process(&upload)).await
    }

    /// 在阻塞线程池中执行，线程异常退出映射为 `ImageError::Worker`。
    async fn run_blocking<T, F>(task: F) -> Result<T, ImageError>
    where
        F: FnOnce() -> Result<T, ImageError> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(task).await.map_err(|e| {
            log::error!("❌ 图片处理任务异常退出: {}", e);
            ImageError::Worker(format!("image worker stopped: {}", e))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(3, 2, Rgba([1u8, 2, 3, 255]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    #[tokio::test]
    async fn service_processes_upload_off_the_runtime() {
        let service = ImageServiceState::new().expect("service init failed");
        let upload = service
            .accept_upload("tiny.png", Some("image/png"), Bytes::from(png_bytes()))
            .expect("upload should be accepted")
            .expect("upload should be present");

        let processed = service
            .process(Arc::new(upload))
            .await
            .expect("process should succeed");

        assert_eq!((processed.width, processed.height), (3, 2));
    }

    #[tokio::test]
    async fn worker_panic_is_reported_as_worker_failure() {
        let result: Result<(), ImageError> =
            ImageServiceState::run_blocking(|| panic!("encoder blew up")).await;

        let err = result.expect_err("panicking worker should fail");
        assert!(matches!(err, ImageError::Worker(_)));
        assert_eq!(err.stage(), "process");
    }

    #[test]
    fn service_rejects_invalid_config() {
        let mut config = ImageConfig::default();
        config.max_decoded_bytes = 0;

        assert!(matches!(
            ImageServiceState::with_config(config),
            Err(ImageError::ResourceLimit(_))
        ));
    }
}
