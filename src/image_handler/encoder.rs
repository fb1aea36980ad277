//! # 编码与打包模块
//!
//! ## 设计思路
//!
//! 负责“光栅图像 → 字节 → Base64 → data URL”。
//! data URL 的 MIME 取自上传时声明的格式，而不是重新编码后的格式：
//! 两者不一致时只记录告警，不做静默修正。
//!
//! ## 实现思路
//!
//! - 重新编码格式：识别到的格式优先，未识别时回退 PNG。
//! - Base64 使用标准字母表并保留填充，输出中不含换行。
//! - `DataUrl::parse` 为反向解析，负载超限时在解码前拒绝。

use base64::{Engine as _, engine::general_purpose};
use std::io::Cursor;

use super::source::{DataUrl, DecodedImage};
use super::{ImageError, ImageHandler, ImageKind};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

impl ImageHandler {
    /// 将解码结果重新编码为字节，返回实际使用的格式。
    pub fn reencode(&self, decoded: &DecodedImage) -> Result<(ImageKind, Vec<u8>), ImageError> {
        Self::reencode_image(decoded)
    }

    pub(super) fn reencode_image(decoded: &DecodedImage) -> Result<(ImageKind, Vec<u8>), ImageError> {
        let target = decoded.format.unwrap_or(ImageKind::Png);

        let mut cursor = Cursor::new(Vec::new());
        decoded
            .raster
            .write_to(&mut cursor, target.image_format())
            .map_err(|e| ImageError::Encode(format!("{} encoder failed: {}", target, e)))?;

        let bytes = cursor.into_inner();
        log::debug!("🧱 重新编码完成 - 格式: {} 大小: {} bytes", target, bytes.len());

        Ok((target, bytes))
    }
}

impl DataUrl {
    /// 以声明格式与编码字节构造 data URL。
    pub fn new(kind: ImageKind, bytes: &[u8]) -> Self {
        Self {
            kind,
            payload: general_purpose::STANDARD.encode(bytes),
        }
    }

    /// 解析 `data:<mime>;base64,<payload>`。
    pub fn parse(input: &str) -> Result<Self, ImageError> {
        let rest = input
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| ImageError::InvalidDataUrl("missing data: prefix".to_string()))?;

        let marker = rest
            .find(BASE64_MARKER)
            .ok_or_else(|| ImageError::InvalidDataUrl("missing ;base64, marker".to_string()))?;

        let mime = &rest[..marker];
        let payload = &rest[marker + BASE64_MARKER.len()..];

        let kind = ImageKind::from_mime(mime)
            .filter(|kind| kind.mime() == mime)
            .ok_or_else(|| ImageError::InvalidDataUrl(format!("unsupported media type: {}", mime)))?;

        if payload.is_empty() {
            return Err(ImageError::InvalidDataUrl("empty payload".to_string()));
        }

        if payload.chars().any(char::is_whitespace) {
            return Err(ImageError::InvalidDataUrl("payload contains whitespace".to_string()));
        }

        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ImageError::InvalidDataUrl(format!("invalid base64: {}", e)))?;

        Ok(Self {
            kind,
            payload: payload.to_string(),
        })
    }

    /// 解码负载字节。
    pub fn decode_payload(&self) -> Result<Vec<u8>, ImageError> {
        general_purpose::STANDARD
            .decode(&self.payload)
            .map_err(|e| ImageError::InvalidDataUrl(format!("invalid base64: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgba};

    fn decoded(format: Option<ImageKind>) -> DecodedImage {
        let img = ImageBuffer::from_pixel(6, 4, Rgba([200u8, 100, 50, 255]));
        DecodedImage {
            width: 6,
            height: 4,
            format,
            raster: DynamicImage::ImageRgba8(img),
        }
    }

    #[test]
    fn reencode_keeps_detected_format() {
        let (kind, bytes) = ImageHandler::reencode_image(&decoded(Some(ImageKind::Bmp)))
            .expect("bmp encode should succeed");

        assert_eq!(kind, ImageKind::Bmp);
        assert_eq!(&bytes[..2], b"BM");
    }

    #[test]
    fn reencode_defaults_to_png() {
        let (kind, bytes) =
            ImageHandler::reencode_image(&decoded(None)).expect("png encode should succeed");

        assert_eq!(kind, ImageKind::Png);
        assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn reencode_surfaces_encoder_failures() {
        // GIF 的宽高字段只有 16 位
        let width = u32::from(u16::MAX) + 1;
        let img = ImageBuffer::from_pixel(width, 1, Rgba([0u8, 0, 0, 255]));
        let decoded = DecodedImage {
            width,
            height: 1,
            format: Some(ImageKind::Gif),
            raster: DynamicImage::ImageRgba8(img),
        };

        let result = ImageHandler::reencode_image(&decoded);

        assert!(matches!(result, Err(ImageError::Encode(_))));
    }

    #[test]
    fn data_url_parse_accepts_generated_urls() {
        let url = DataUrl::new(ImageKind::Gif, b"GIF89a-bytes");
        let parsed = DataUrl::parse(&url.to_string()).expect("parse should succeed");

        assert_eq!(parsed, url);
        assert_eq!(parsed.decode_payload().expect("payload"), b"GIF89a-bytes");
    }

    #[test]
    fn data_url_parse_rejects_malformed_input() {
        for input in [
            "image/png;base64,AAAA",
            "data:image/png,AAAA",
            "data:text/plain;base64,AAAA",
            "data:image/png;base64,",
            "data:image/png;base64,AA AA",
            "data:image/png;base64,@@@@",
            "data:IMAGE/PNG;base64,AAAA",
        ] {
            assert!(
                matches!(DataUrl::parse(input), Err(ImageError::InvalidDataUrl(_))),
                "{input} should be rejected"
            );
        }
    }
}
