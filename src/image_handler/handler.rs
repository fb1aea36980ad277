//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排，不直接与 Web 层绑定。
//! 处理链路固定为：
//! 1. 解码上传字节
//! 2. 按识别格式重新编码（未识别回退 PNG）
//! 3. Base64 打包为 data URL（MIME 取上传声明）
//!
//! ## 实现思路
//!
//! - 每次请求都从 `UploadedFile` 重新计算全部派生值，不缓存结果。
//! - 记录 `decode/encode/package/total` 阶段耗时，便于性能诊断。

use std::time::Instant;

use super::source::{DataUrl, ProcessedImage, UploadedFile};
use super::{ImageConfig, ImageError};

/// 图片处理器。
#[derive(Debug, Clone)]
pub struct ImageHandler {
    pub(super) config: ImageConfig,
}

impl ImageHandler {
    /// 根据配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use piclink::image_handler::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default())?;
    /// # Ok::<(), piclink::image_handler::ImageError>(())
    /// ```
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// 处理主入口：解码、重新编码并生成 data URL。
    pub fn process(&self, upload: &UploadedFile) -> Result<ProcessedImage, ImageError> {
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let decoded = self.decode(upload.bytes())?;
        let decode_elapsed = decode_start.elapsed();

        let encode_start = Instant::now();
        let (encoded_kind, encoded_bytes) = self.reencode(&decoded)?;
        let encode_elapsed = encode_start.elapsed();

        let package_start = Instant::now();
        let data_url = DataUrl::new(upload.declared_kind(), &encoded_bytes);
        let package_elapsed = package_start.elapsed();

        if data_url.kind() != encoded_kind {
            log::warn!(
                "⚠️ data URL 声明类型 {} 与实际负载格式 {} 不一致 - 文件: {}",
                data_url.mime(),
                encoded_kind.mime(),
                upload.name()
            );
        }

        log::info!(
            "✅ 图片处理完成 - 文件: {} decode={}ms encode={}ms package={}ms total={}ms",
            upload.name(),
            decode_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            package_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(ProcessedImage {
            width: decoded.width,
            height: decoded.height,
            detected_format: decoded.format,
            encoded_kind,
            encoded_bytes,
            data_url,
        })
    }
}
