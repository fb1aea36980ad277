//! # Web 展示层
//!
//! ## 设计思路
//!
//! 每次用户动作（上传、复制、移除、下载）都是一次独立的 HTTP 请求，
//! 路由层只做参数提取与会话解析，页面内容由 `view` 纯函数生成、`render` 输出 HTML。
//!
//! - `routes`：路由与拒绝处理
//! - `multipart`：表单文件字段读取
//! - `view`：空闲 / 已上传两种页面状态的视图模型
//! - `render`：HTML 渲染与转义
//! - `response`：JSON 错误模型

pub mod multipart;
pub mod render;
pub mod response;
pub mod routes;
pub mod view;

use std::net::SocketAddr;
use std::sync::Arc;

use warp::Filter;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::image_handler::ImageServiceState;
use crate::session::SessionStore;

pub use routes::routes;

/// 路由共享状态。
#[derive(Clone)]
pub struct AppState {
    pub images: ImageServiceState,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            images: ImageServiceState::with_config(config.image.clone())?,
            sessions: Arc::new(SessionStore::new(
                config.server.max_sessions,
                config.server.max_total_bytes,
                config.session_ttl(),
            )?),
        })
    }
}

pub struct WebServer {
    addr: SocketAddr,
    state: AppState,
}

impl WebServer {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            addr: config.socket_addr()?,
            state: AppState::from_config(config)?,
        })
    }

    /// 绑定地址并持续提供服务，直到收到 Ctrl+C。
    pub async fn run(self) -> Result<(), AppError> {
        let routes = routes(self.state).with(warp::log("piclink::web"));

        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(self.addr, async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    log::warn!("⚠️ 无法监听退出信号，服务将持续运行: {}", err);
                    std::future::pending::<()>().await;
                }
            })
            .map_err(|e| AppError::Server(format!("无法绑定 {}: {}", self.addr, e)))?;

        log::info!("🚀 PicLink 已启动: http://{}", addr);
        server.await;
        log::info!("👋 PicLink 已停止");
        Ok(())
    }
}
