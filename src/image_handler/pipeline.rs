//! # 解码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做签名与尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 通过文件签名（magic bytes）拒绝明显不是图片的内容
//! 2. 读取 header 尺寸并按像素/内存上限快速拒绝
//! 3. 完整解码
//! 4. 将识别到的格式映射为 `ImageKind`（不受支持的格式记为 `None`）

use image::{GenericImageView, ImageReader};
use std::io::Cursor;

use super::source::DecodedImage;
use super::{ImageConfig, ImageError, ImageHandler, ImageKind};

impl ImageHandler {
    /// 将原始字节解码为 `DecodedImage`。
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, ImageError> {
        Self::decode_with_config(bytes, &self.config)
    }

    pub(super) fn decode_with_config(
        bytes: &[u8],
        config: &ImageConfig,
    ) -> Result<DecodedImage, ImageError> {
        Self::validate_image_signature(bytes)?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let detected = image::guess_format(bytes)
            .map_err(|e| ImageError::Decode(format!("unrecognized image format: {}", e)))?;

        let raster = image::load_from_memory(bytes)
            .map_err(|e| ImageError::Decode(e.to_string()))?;

        let (width, height) = raster.dimensions();
        let format = ImageKind::from_image_format(detected);

        if format.is_none() {
            log::warn!("⚠️ 识别到受支持集合之外的格式：{:?}，重新编码将回退为 PNG", detected);
        }

        log::info!(
            "✅ 图片解码成功 - 格式: {:?} 尺寸: {}x{}",
            detected,
            width,
            height
        );

        Ok(DecodedImage {
            width,
            height,
            format,
            raster,
        })
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(format!("cannot detect image format: {}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("cannot read image dimensions: {}", e)))
    }

    /// 通过文件签名校验输入是否为图片。
    ///
    /// `infer` 无法识别时交给解码器判断；明确识别为非图片时直接拒绝。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Decode("image content is empty".to_string()));
        }

        if let Some(kind) = infer::get(bytes) {
            if kind.matcher_type() != infer::MatcherType::Image {
                return Err(ImageError::Decode(format!(
                    "file signature is not an image: {}",
                    kind.mime_type()
                )));
            }
        }

        Ok(())
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(config: &ImageConfig, width: u32, height: u32) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("pixel count overflow".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "image has {} pixels (limit: {} pixels)",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &ImageConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ImageError::ResourceLimit("decoded size overflow".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ImageError::ResourceLimit(format!(
                "decoding would need {:.2} MB (limit: {:.2} MB)",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }
}
