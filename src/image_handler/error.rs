//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载上传 → 解码 → 编码 → 打包整条链路的错误来源，
//! 避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误（直接展示在页面横幅中），
//! 同时通过 `code()` / `stage()` 输出稳定标识，供 JSON 接口与日志使用。

/// 图片处理统一错误类型。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Could not re-encode image: {0}")]
    Encode(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Resource limit exceeded: {0}")]
    ResourceLimit(String),

    /// 后台处理线程异常退出（panic 或被取消），与具体格式无关。
    #[error("Image processing was interrupted: {0}")]
    Worker(String),
}

impl ImageError {
    /// 稳定错误码，前端与接口调用方可以按码分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::Decode(_) => "decode_failed",
            Self::Encode(_) => "encode_failed",
            Self::InvalidDataUrl(_) => "invalid_data_url",
            Self::Upload(_) => "upload_failed",
            Self::ResourceLimit(_) => "resource_limit",
            Self::Worker(_) => "worker_failed",
        }
    }

    /// 出错所在的处理阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) | Self::Upload(_) | Self::ResourceLimit(_) => "upload",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::InvalidDataUrl(_) => "package",
            Self::Worker(_) => "process",
        }
    }
}

impl From<ImageError> for String {
    fn from(error: ImageError) -> Self {
        error.to_string()
    }
}
