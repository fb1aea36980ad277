//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `UploadedFile` 表示已通过入口校验的上传文件（原始字节原样保留，供下载）
//! - `DecodedImage` 表示解码后的光栅图像
//! - `DataUrl` 表示最终可分享的 `data:` URL
//! - `ProcessedImage` 汇总一次请求内全部派生值
//!
//! 所有模型都只活在单次请求内，派生值每次重新计算。

use std::fmt;

use bytes::Bytes;
use image::DynamicImage;

use super::ImageKind;

/// 上传阶段输出：文件名、声明格式与原始字节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub(crate) name: String,
    pub(crate) declared_kind: ImageKind,
    pub(crate) bytes: Bytes,
}

impl UploadedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 上传时声明的格式，决定 data URL 与下载使用的 MIME。
    pub fn declared_kind(&self) -> ImageKind {
        self.declared_kind
    }

    pub fn declared_mime(&self) -> &'static str {
        self.declared_kind.mime()
    }

    /// 原始上传字节（不是重新编码后的字节）。
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// 以 KB 表示的体积，保留两位小数，例如 `2.00`。
    pub fn size_kb(&self) -> String {
        format_size_kb(self.size())
    }
}

/// `len / 1024` 保留两位小数。
pub fn format_size_kb(len: usize) -> String {
    format!("{:.2}", len as f64 / 1024.0)
}

/// 解码阶段输出：尺寸、识别到的格式与光栅数据。
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// 编解码库识别出的格式；识别结果不在受支持集合内时为 `None`。
    pub format: Option<ImageKind>,
    pub(crate) raster: DynamicImage,
}

/// `data:<mime>;base64,<payload>` 形式的 URL。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub(crate) kind: ImageKind,
    pub(crate) payload: String,
}

impl DataUrl {
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }

    /// Base64 负载（标准字母表，带填充，无换行）。
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.kind.mime(), self.payload)
    }
}

/// 一次完整处理的结果。
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub width: u32,
    pub height: u32,
    pub detected_format: Option<ImageKind>,
    /// 实际用于重新编码的格式（未识别时回退为 PNG）。
    pub encoded_kind: ImageKind,
    pub encoded_bytes: Vec<u8>,
    pub data_url: DataUrl,
}

impl ProcessedImage {
    /// 例如 `100 x 50`。
    pub fn dimensions(&self) -> String {
        format!("{} x {}", self.width, self.height)
    }

    /// URL 声明的 MIME 与实际负载格式是否一致。
    pub fn mime_matches_payload(&self) -> bool {
        self.data_url.kind == self.encoded_kind
    }
}
