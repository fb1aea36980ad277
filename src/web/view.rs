//! 页面视图模型
//!
//! 页面只有两种状态：未上传（空闲）与已上传。
//! 视图模型是当前上传与处理结果的纯函数，渲染层只负责把它转成 HTML。

use crate::image_handler::{ImageError, ProcessedImage, UploadedFile};

/// 错误横幅。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub code: &'static str,
    pub message: String,
}

impl From<&ImageError> for Banner {
    fn from(error: &ImageError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// 处理成功时右侧“分享”栏的内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareView {
    pub width: u32,
    pub height: u32,
    pub data_url: String,
    /// URL 声明的 MIME 是否与实际负载格式一致。
    pub mime_matches_payload: bool,
    pub encoded_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileView {
    pub filename: String,
    pub size_kb: String,
    pub declared_mime: &'static str,
    pub outcome: Result<ShareView, Banner>,
    /// 点击复制按钮后回显代码块与确认信息。
    pub show_copy_echo: bool,
}

impl FileView {
    pub fn caption_filename(&self) -> String {
        format!("Filename: {}", self.filename)
    }

    pub fn caption_size(&self) -> String {
        format!("Size: {} KB", self.size_kb)
    }

    pub fn caption_dimensions(&self) -> Option<String> {
        self.outcome
            .as_ref()
            .ok()
            .map(|share| format!("Dimensions: {} x {} pixels", share.width, share.height))
    }

    pub fn data_url(&self) -> Option<&str> {
        self.outcome.as_ref().ok().map(|share| share.data_url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView {
    /// 未上传文件：占位提示 + 使用说明；上传被拒绝时附带横幅。
    Idle { error: Option<Banner> },
    FilePresent(FileView),
}

impl PageView {
    pub fn idle() -> Self {
        Self::Idle { error: None }
    }

    /// 上传在入口处被拒绝：不保留文件，只展示错误。
    pub fn rejected(error: &ImageError) -> Self {
        Self::Idle {
            error: Some(Banner::from(error)),
        }
    }

    pub fn for_upload(
        upload: &UploadedFile,
        result: Result<ProcessedImage, ImageError>,
        show_copy_echo: bool,
    ) -> Self {
        let outcome = result
            .map(|processed| ShareView {
                width: processed.width,
                height: processed.height,
                mime_matches_payload: processed.mime_matches_payload(),
                encoded_label: processed.encoded_kind.label(),
                data_url: processed.data_url.to_string(),
            })
            .map_err(|error| Banner::from(&error));

        let show_copy_echo = show_copy_echo && outcome.is_ok();

        Self::FilePresent(FileView {
            filename: upload.name().to_string(),
            size_kb: upload.size_kb(),
            declared_mime: upload.declared_mime(),
            outcome,
            show_copy_echo,
        })
    }

    pub fn error(&self) -> Option<&Banner> {
        match self {
            Self::Idle { error } => error.as_ref(),
            Self::FilePresent(file) => file.outcome.as_ref().err(),
        }
    }
}
