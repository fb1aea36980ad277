//! multipart 表单读取
//!
//! 只读取名为 `file` 的字段，其他字段忽略；没有文件字段时返回 `None`。

use bytes::{BufMut, Bytes};
use futures_util::TryStreamExt;
use warp::multipart::{FormData, Part};

use crate::image_handler::ImageError;

/// 文件字段名。
pub const FILE_FIELD: &str = "file";

/// 表单中的文件字段。
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

pub async fn read_upload_form(mut form: FormData) -> Result<Option<UploadPart>, ImageError> {
    let mut upload = None;

    while let Some(part) = form
        .try_next()
        .await
        .map_err(|e| ImageError::Upload(format!("malformed form data: {}", e)))?
    {
        if part.name() != FILE_FIELD || upload.is_some() {
            continue;
        }
        upload = Some(read_part(part).await?);
    }

    Ok(upload)
}

async fn read_part(part: Part) -> Result<UploadPart, ImageError> {
    let filename = part.filename().unwrap_or_default().to_string();
    let content_type = part.content_type().map(str::to_string);

    let data = part
        .stream()
        .try_fold(Vec::new(), |mut acc, buf| async move {
            acc.put(buf);
            Ok(acc)
        })
        .await
        .map_err(|e| ImageError::Upload(format!("could not read uploaded file: {}", e)))?;

    log::debug!("📦 读取表单文件字段 - 文件: {} 大小: {} bytes", filename, data.len());

    Ok(UploadPart {
        filename,
        content_type,
        bytes: Bytes::from(data),
    })
}
