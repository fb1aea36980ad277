//! 路由汇总
//!
//! | 路由 | 动作 |
//! |------|------|
//! | `GET /` | 按会话渲染当前页面 |
//! | `POST /upload` | 校验并保存上传，渲染页面 |
//! | `POST /copy` | 渲染页面并回显 data URL |
//! | `POST /clear` | 移除会话上传 |
//! | `GET /download` | 下载原始上传字节 |
//! | `POST /api/data-url` | JSON 接口 |

pub mod api;
pub mod download;
pub mod page;

use std::convert::Infallible;

use warp::http::header::{HeaderValue, CACHE_CONTROL, SET_COOKIE};
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use super::render::{render_error_page, render_page};
use super::view::PageView;
use super::AppState;
use crate::error::AppError;
use crate::image_handler::ImageError;
use crate::session::{SessionId, SESSION_COOKIE};

impl warp::reject::Reject for AppError {}

/// 全部路由，附带统一的拒绝处理。
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    page::routes(state.clone())
        .or(download::route(state.clone()))
        .or(api::route(state))
        .recover(handle_rejection)
}

/// 注入应用状态
pub(crate) fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// 读取会话 Cookie
pub(crate) fn session_cookie() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::cookie::optional(SESSION_COOKIE)
}

/// multipart 表单，上限为文件上限加上表单头部余量。
///
/// 请求体超限不作为拒绝向上传播，而是转成 `ImageError::ResourceLimit`，
/// 交给处理函数按“上传被拒绝”处理（清空会话上传）。
pub(crate) fn upload_form(
    max_file_size: u64,
) -> impl Filter<Extract = (Result<FormData, ImageError>,), Error = Rejection> + Clone {
    const FORM_OVERHEAD: u64 = 64 * 1024;
    let limit = max_file_size.saturating_add(FORM_OVERHEAD);
    warp::multipart::form()
        .max_length(limit)
        .map(|form: FormData| Ok::<_, ImageError>(form))
        .or_else(move |rejection: Rejection| oversized_form(max_file_size, rejection))
}

async fn oversized_form(
    max_file_size: u64,
    rejection: Rejection,
) -> Result<(Result<FormData, ImageError>,), Rejection> {
    if rejection.find::<warp::reject::PayloadTooLarge>().is_none() {
        return Err(rejection);
    }

    log::warn!("🚫 拒绝上传：请求体超过大小限制");
    Ok((Err(ImageError::ResourceLimit(format!(
        "the uploaded file exceeds the {:.2} MB limit",
        max_file_size as f64 / 1024.0 / 1024.0
    ))),))
}

/// 页面响应：HTML + 禁止缓存 + 新会话时写回 Cookie。
pub(crate) fn page_response(view: &PageView, session: &SessionId) -> Response {
    let mut response = warp::reply::html(render_page(view)).into_response();
    with_session_headers(&mut response, session);
    response
}

pub(crate) fn with_session_headers(response: &mut Response, session: &SessionId) {
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if session.is_new() {
        match HeaderValue::from_str(&session.set_cookie_value()) {
            Ok(value) => {
                headers.insert(SET_COOKIE, value);
            }
            Err(err) => log::warn!("⚠️ 会话 Cookie 无法写入响应头: {}", err),
        }
    }
}

/// 统一的拒绝处理。
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(error_page(StatusCode::NOT_FOUND, "The requested page does not exist."));
    }

    if let Some(app_err) = err.find::<AppError>() {
        log::error!("❌ 请求处理失败: {}", app_err);
        return Ok(error_page(StatusCode::INTERNAL_SERVER_ERROR, &app_err.to_string()));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_page(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed."));
    }

    log::debug!("请求被拒绝: {:?}", err);
    Ok(error_page(StatusCode::BAD_REQUEST, "The request could not be processed."))
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let status_line = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    warp::reply::with_status(warp::reply::html(render_error_page(&status_line, message)), status)
        .into_response()
}
