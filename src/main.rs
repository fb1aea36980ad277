//! # PicLink — 应用入口
//!
//! 本文件仅负责日志初始化、配置加载与服务启动。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use piclink::config::AppConfig;
use piclink::web::WebServer;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("setup: begin");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            log::error!("setup: 配置加载失败: {err}");
            std::process::exit(2);
        }
    };

    let server = match WebServer::new(&config) {
        Ok(server) => server,
        Err(err) => {
            log::error!("setup: 服务初始化失败: {err}");
            std::process::exit(2);
        }
    };
    log::info!("setup: complete");

    if let Err(err) = server.run().await {
        log::error!("服务异常退出: {err}");
        std::process::exit(1);
    }
}
