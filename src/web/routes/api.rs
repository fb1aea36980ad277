//! JSON 接口
//!
//! `POST /api/data-url`：与页面上传相同的处理链路，但不写入会话，直接返回结果。

use std::sync::Arc;

use serde::Serialize;
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use super::{upload_form, with_state};
use crate::image_handler::{ImageError, ImageKind, ProcessedImage, UploadedFile};
use crate::web::multipart::read_upload_form;
use crate::web::response::ImageCommandError;
use crate::web::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct DataUrlResponse {
    pub filename: String,
    pub size_bytes: usize,
    pub size_kb: String,
    pub width: u32,
    pub height: u32,
    pub mime: &'static str,
    pub encoded_format: ImageKind,
    pub data_url: String,
}

impl DataUrlResponse {
    fn new(upload: &UploadedFile, processed: ProcessedImage) -> Self {
        Self {
            filename: upload.name().to_string(),
            size_bytes: upload.size(),
            size_kb: upload.size_kb(),
            width: processed.width,
            height: processed.height,
            mime: processed.data_url.mime(),
            encoded_format: processed.encoded_kind,
            data_url: processed.data_url.to_string(),
        }
    }
}

pub fn route(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let max_file_size = state.images.config().max_file_size;
    warp::path!("api" / "data-url")
        .and(warp::post())
        .and(with_state(state))
        .and(upload_form(max_file_size))
        .and_then(handle_data_url)
}

async fn handle_data_url(
    state: AppState,
    form: Result<FormData, ImageError>,
) -> Result<Response, Rejection> {
    let form = match form {
        Ok(form) => form,
        Err(err) => return Ok(ImageCommandError::from(err).into_response(StatusCode::PAYLOAD_TOO_LARGE)),
    };

    let part = match read_upload_form(form).await {
        Ok(Some(part)) => part,
        Ok(None) => return Ok(ImageCommandError::missing_file().into_response(StatusCode::BAD_REQUEST)),
        Err(err) => return Ok(unprocessable(err.into())),
    };

    let upload = match state
        .images
        .accept_upload(&part.filename, part.content_type.as_deref(), part.bytes)
    {
        Ok(Some(upload)) => Arc::new(upload),
        Ok(None) => return Ok(ImageCommandError::missing_file().into_response(StatusCode::BAD_REQUEST)),
        Err(err) => return Ok(unprocessable(err.into())),
    };

    match state.images.process(Arc::clone(&upload)).await {
        Ok(processed) => Ok(warp::reply::json(&DataUrlResponse::new(&upload, processed)).into_response()),
        Err(err) => {
            log::warn!("⚠️ 接口处理失败 - 文件: {} 错误: {}", upload.name(), err);
            Ok(unprocessable(err.into()))
        }
    }
}

fn unprocessable(error: ImageCommandError) -> Response {
    error.into_response(StatusCode::UNPROCESSABLE_ENTITY)
}
