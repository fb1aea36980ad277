//! 页面路由
//!
//! 每个用户动作对应一次请求，页面内容全部由当前会话的上传重新计算。

use std::sync::Arc;

use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use super::{page_response, session_cookie, upload_form, with_state};
use crate::image_handler::{ImageError, UploadedFile};
use crate::web::multipart::read_upload_form;
use crate::web::view::PageView;
use crate::web::AppState;

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and(session_cookie())
        .and_then(handle_index);

    let upload = warp::path!("upload")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(session_cookie())
        .and(upload_form(state.images.config().max_file_size))
        .and_then(handle_upload);

    let copy = warp::path!("copy")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(session_cookie())
        .and_then(handle_copy);

    let clear = warp::path!("clear")
        .and(warp::post())
        .and(with_state(state))
        .and(session_cookie())
        .and_then(handle_clear);

    index.or(upload).or(copy).or(clear)
}

async fn handle_index(state: AppState, cookie: Option<String>) -> Result<Response, Rejection> {
    render_session(state, cookie, false).await
}

async fn handle_copy(state: AppState, cookie: Option<String>) -> Result<Response, Rejection> {
    render_session(state, cookie, true).await
}

async fn handle_clear(state: AppState, cookie: Option<String>) -> Result<Response, Rejection> {
    let session = state.sessions.resolve(cookie.as_deref());
    if state.sessions.clear(&session).map_err(warp::reject::custom)? {
        log::info!("🗑️ 已移除会话上传");
    }
    Ok(page_response(&PageView::idle(), &session))
}

async fn handle_upload(
    state: AppState,
    cookie: Option<String>,
    form: Result<FormData, ImageError>,
) -> Result<Response, Rejection> {
    let session = state.sessions.resolve(cookie.as_deref());
    let status = match &form {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::PAYLOAD_TOO_LARGE,
    };

    let accepted = match form {
        Ok(form) => match read_upload_form(form).await {
            Ok(Some(part)) => state
                .images
                .accept_upload(&part.filename, part.content_type.as_deref(), part.bytes),
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        },
        Err(err) => Err(err),
    };

    let view = match accepted {
        Ok(Some(upload)) => {
            let upload = Arc::new(upload);
            state
                .sessions
                .store(&session, Arc::clone(&upload))
                .map_err(warp::reject::custom)?;
            file_view(&state, upload, false).await
        }
        Ok(None) => {
            state.sessions.clear(&session).map_err(warp::reject::custom)?;
            PageView::idle()
        }
        Err(err) => {
            log::warn!("🚫 上传被拒绝: {}", err);
            state.sessions.clear(&session).map_err(warp::reject::custom)?;
            PageView::rejected(&err)
        }
    };

    let mut response = page_response(&view, &session);
    *response.status_mut() = status;
    Ok(response)
}

async fn render_session(
    state: AppState,
    cookie: Option<String>,
    show_copy_echo: bool,
) -> Result<Response, Rejection> {
    let session = state.sessions.resolve(cookie.as_deref());

    let view = match state.sessions.current(&session).map_err(warp::reject::custom)? {
        Some(upload) => file_view(&state, upload, show_copy_echo).await,
        None => PageView::idle(),
    };

    Ok(page_response(&view, &session))
}

async fn file_view(state: &AppState, upload: Arc<UploadedFile>, show_copy_echo: bool) -> PageView {
    let result = state.images.process(Arc::clone(&upload)).await;
    if let Err(err) = &result {
        log::warn!("⚠️ 图片处理失败 - 文件: {} 阶段: {} 错误: {}", upload.name(), err.stage(), err);
    }
    PageView::for_upload(&upload, result, show_copy_echo)
}
