//! # 上传入口校验模块
//!
//! ## 设计思路
//!
//! 在“尽可能早”的阶段执行输入校验：扩展名白名单、声明 MIME、体积上限。
//! 文件选择器上的 `accept` 只是提示，这里才是真正的边界。
//!
//! ## 实现思路
//!
//! - 未选择文件（空文件名 + 空内容）视为空闲状态，返回 `Ok(None)`。
//! - 扩展名映射为 `ImageKind`，不在白名单内直接拒绝。
//! - 声明 MIME 缺失或为 `application/octet-stream` 时回退到扩展名对应格式。
//! - 空内容与超限体积分别映射为解码错误与资源限制错误。

use bytes::Bytes;

use super::source::UploadedFile;
use super::{ImageConfig, ImageError, ImageHandler, ImageKind};

const GENERIC_BINARY_MIME: &str = "application/octet-stream";

impl ImageHandler {
    /// 校验一次上传并构造 `UploadedFile`。
    pub fn accept_upload(
        &self,
        filename: &str,
        declared_mime: Option<&str>,
        bytes: Bytes,
    ) -> Result<Option<UploadedFile>, ImageError> {
        Self::accept_upload_with_config(filename, declared_mime, bytes, &self.config)
    }

    pub(super) fn accept_upload_with_config(
        filename: &str,
        declared_mime: Option<&str>,
        bytes: Bytes,
        config: &ImageConfig,
    ) -> Result<Option<UploadedFile>, ImageError> {
        let name = filename.trim();
        if name.is_empty() && bytes.is_empty() {
            log::debug!("📭 未选择文件，保持空闲状态");
            return Ok(None);
        }

        let name = Self::base_filename(name);
        if name.is_empty() {
            return Err(ImageError::UnsupportedFormat("file has no name".to_string()));
        }

        let extension_kind = ImageKind::from_filename(name).ok_or_else(|| {
            log::warn!("🚫 拒绝上传：扩展名不在白名单内 - {}", name);
            ImageError::UnsupportedFormat(format!(
                "{} (allowed: {})",
                name,
                ImageKind::EXTENSIONS.join(", ")
            ))
        })?;

        let declared_kind = Self::resolve_declared_kind(declared_mime, extension_kind)?;
        if declared_kind != extension_kind {
            log::warn!(
                "⚠️ 声明 MIME 与扩展名不一致 - 文件: {} 扩展名: {} 声明: {}",
                name,
                extension_kind,
                declared_kind
            );
        }

        let size = bytes.len() as u64;
        if size > config.max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "file is too large: {:.2} MB (limit: {:.2} MB)",
                size as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        if bytes.is_empty() {
            return Err(ImageError::Decode(format!("{} is empty", name)));
        }

        log::info!(
            "📥 接收上传 - 文件: {} 声明类型: {} 大小: {} bytes",
            name,
            declared_kind.mime(),
            size
        );

        Ok(Some(UploadedFile {
            name: name.to_string(),
            declared_kind,
            bytes,
        }))
    }

    /// 声明 MIME → `ImageKind`，缺省时回退到扩展名格式。
    fn resolve_declared_kind(
        declared_mime: Option<&str>,
        extension_kind: ImageKind,
    ) -> Result<ImageKind, ImageError> {
        let Some(mime) = declared_mime.map(str::trim).filter(|m| !m.is_empty()) else {
            return Ok(extension_kind);
        };

        if mime.eq_ignore_ascii_case(GENERIC_BINARY_MIME) {
            return Ok(extension_kind);
        }

        ImageKind::from_mime(mime).ok_or_else(|| {
            log::warn!("🚫 拒绝上传：声明 MIME 不受支持 - {}", mime);
            ImageError::UnsupportedFormat(format!("declared type {} is not a supported image", mime))
        })
    }

    /// 部分浏览器会带上客户端路径，只保留最后一段。
    fn base_filename(name: &str) -> &str {
        name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(
        name: &str,
        mime: Option<&str>,
        bytes: &'static [u8],
    ) -> Result<Option<UploadedFile>, ImageError> {
        ImageHandler::accept_upload_with_config(
            name,
            mime,
            Bytes::from_static(bytes),
            &ImageConfig::default(),
        )
    }

    #[test]
    fn missing_file_is_idle_not_error() {
        assert!(matches!(accept("", None, b""), Ok(None)));
        assert!(matches!(accept("   ", Some("application/octet-stream"), b""), Ok(None)));
    }

    #[test]
    fn rejects_extension_outside_allow_list() {
        let result = accept("notes.txt", Some("text/plain"), b"hello");

        assert!(matches!(result, Err(ImageError::UnsupportedFormat(_))));
    }

    #[test]
    fn rejects_non_image_declared_mime() {
        let result = accept("fake.png", Some("text/html"), b"<html>");

        assert!(matches!(result, Err(ImageError::UnsupportedFormat(_))));
    }

    #[test]
    fn uppercase_extension_is_accepted() {
        let upload = accept("PHOTO.JPEG", Some("image/jpeg"), b"\xFF\xD8\xFF")
            .expect("upload should be accepted")
            .expect("upload should be present");

        assert_eq!(upload.declared_kind(), ImageKind::Jpeg);
        assert_eq!(upload.name(), "PHOTO.JPEG");
    }

    #[test]
    fn missing_mime_falls_back_to_extension() {
        let upload = accept("a.webp", None, b"RIFF")
            .expect("upload should be accepted")
            .expect("upload should be present");
        assert_eq!(upload.declared_mime(), "image/webp");

        let upload = accept("b.gif", Some("application/octet-stream"), b"GIF8")
            .expect("upload should be accepted")
            .expect("upload should be present");
        assert_eq!(upload.declared_mime(), "image/gif");
    }

    #[test]
    fn declared_mime_wins_over_extension() {
        let upload = accept("a.png", Some("image/jpeg"), b"\xFF\xD8\xFF")
            .expect("upload should be accepted")
            .expect("upload should be present");

        assert_eq!(upload.declared_kind(), ImageKind::Jpeg);
    }

    #[test]
    fn strips_client_side_path() {
        let upload = accept("C:\\Users\\me\\Pictures\\cat.png", None, b"\x89PNG")
            .expect("upload should be accepted")
            .expect("upload should be present");

        assert_eq!(upload.name(), "cat.png");
    }

    #[test]
    fn empty_named_file_is_decode_error() {
        assert!(matches!(accept("a.png", Some("image/png"), b""), Err(ImageError::Decode(_))));
    }

    #[test]
    fn rejects_oversized_upload() {
        let mut config = ImageConfig::default();
        config.max_file_size = 4;

        let result = ImageHandler::accept_upload_with_config(
            "a.png",
            Some("image/png"),
            Bytes::from_static(b"\x89PNG\r\n"),
            &config,
        );

        assert!(matches!(result, Err(ImageError::ResourceLimit(_))));
    }
}
