//! # 配置模块
//!
//! ## 设计思路
//!
//! 将上传与解码阶段的资源上限集中到 `ImageConfig`，保证运行时行为可观测、可调整、可测试。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的上限（上传体积对齐常见网页上传组件的 200MB）。
//! - 通过 `serde(default)` 允许配置文件只覆盖部分字段。
//! - `validate` 拒绝会让所有上传都失败的 0 值配置。

use serde::{Deserialize, Serialize};

use super::ImageError;

/// 图片处理配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// 单次上传允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_size: 200 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
        }
    }
}

impl ImageConfig {
    pub(crate) fn validate(&self) -> Result<(), ImageError> {
        if self.max_file_size == 0 {
            return Err(ImageError::ResourceLimit("max_file_size must be greater than 0".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ImageError::ResourceLimit(
                "max_decoded_pixels must be greater than 0".to_string(),
            ));
        }
        if self.max_decoded_bytes == 0 {
            return Err(ImageError::ResourceLimit(
                "max_decoded_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ImageConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = ImageConfig::default();
        config.max_decoded_pixels = 0;

        assert!(matches!(config.validate(), Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ImageConfig =
            serde_json::from_str(r#"{ "max_file_size": 1024 }"#).expect("parse partial config");

        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.max_decoded_pixels, ImageConfig::default().max_decoded_pixels);
    }
}
