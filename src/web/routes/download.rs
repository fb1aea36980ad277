use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use warp::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use warp::http::StatusCode;
use warp::hyper::Body;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use super::{session_cookie, with_session_headers, with_state};
use crate::error::AppError;
use crate::web::AppState;

/// 下载路由
pub fn route(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("download")
        .and(warp::get())
        .and(with_state(state))
        .and(session_cookie())
        .and_then(handle_download)
}

/// 处理下载请求：返回原始上传字节，而不是重新编码后的字节。
async fn handle_download(state: AppState, cookie: Option<String>) -> Result<Response, Rejection> {
    let session = state.sessions.resolve(cookie.as_deref());

    let Some(upload) = state.sessions.current(&session).map_err(warp::reject::custom)? else {
        log::info!("Download requested without an upload");
        let mut response =
            warp::reply::with_status("No file has been uploaded.", StatusCode::NOT_FOUND).into_response();
        with_session_headers(&mut response, &session);
        return Ok(response);
    };

    log::info!("Download request for upload: {} ({} bytes)", upload.name(), upload.size());

    let mut response = warp::http::Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, upload.declared_mime())
        .header(CONTENT_DISPOSITION, content_disposition(upload.name()))
        .header(CONTENT_LENGTH, upload.size().to_string())
        .body(Body::from(upload.bytes().clone()))
        .map_err(|e| warp::reject::custom(AppError::Server(format!("构建下载响应失败: {}", e))))?;

    with_session_headers(&mut response, &session);
    Ok(response)
}

/// `attachment` 头：ASCII 回退文件名 + RFC 5987 编码的原始文件名。
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|ch| match ch {
            '"' | '\\' => '_',
            ch if ch.is_ascii_graphic() || ch == ' ' => ch,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(filename, NON_ALPHANUMERIC)
    )
}
