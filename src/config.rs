//! 应用配置模块
//!
//! # 设计思路
//!
//! 服务监听地址、会话上限与图片资源上限集中在 `AppConfig`，
//! 全部字段都有默认值，配置文件只需要写想覆盖的部分。
//!
//! # 实现思路
//!
//! - 配置文件路径取 `PICLINK_CONFIG` 环境变量，未设置时为工作目录下的 `piclink.json`。
//! - 文件不存在时使用默认配置；文件存在但无法解析或取值非法时启动失败，
//!   避免带着错误配置静默运行。

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::image_handler::ImageConfig;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "PICLINK_CONFIG";
/// 默认配置文件名。
pub const DEFAULT_CONFIG_FILE: &str = "piclink.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址，例如 `127.0.0.1:8501`。
    pub bind_addr: String,
    /// 同时保留上传的会话数上限。
    pub max_sessions: usize,
    /// 会话无访问多久后丢弃上传（秒）。
    pub session_ttl_secs: u64,
    /// 所有会话上传字节数之和的上限，超出时淘汰最久未访问的会话。
    pub max_total_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            max_sessions: 256,
            session_ttl_secs: 30 * 60,
            max_total_bytes: 1024 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub image: ImageConfig,
}

impl AppConfig {
    /// 按环境变量或默认文件名加载配置。
    pub fn load() -> Result<Self, AppError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::info!("⚙️ 未找到配置文件 {}，使用默认配置", path.display());
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("解析配置文件 {} 失败: {}", path.display(), e)))?;
        config.validate()?;

        log::info!("⚙️ 已加载配置文件 {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.socket_addr()?;
        if self.server.max_sessions == 0 {
            return Err(AppError::Config("server.max_sessions 必须大于 0".to_string()));
        }
        if self.server.session_ttl_secs == 0 {
            return Err(AppError::Config("server.session_ttl_secs 必须大于 0".to_string()));
        }
        if self.server.max_total_bytes < self.image.max_file_size {
            return Err(AppError::Config(format!(
                "server.max_total_bytes ({}) 不能小于 image.max_file_size ({})",
                self.server.max_total_bytes, self.image.max_file_size
            )));
        }
        self.image
            .validate()
            .map_err(|e| AppError::Config(format!("image: {}", e)))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        self.server.bind_addr.parse().map_err(|e| {
            AppError::Config(format!("server.bind_addr 无效 '{}': {}", self.server.bind_addr, e))
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.server.session_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(content: Option<&str>) -> PathBuf {
        let path = std::env::temp_dir().join(format!("piclink-config-{}.json", uuid::Uuid::new_v4()));
        if let Some(content) = content {
            fs::write(&path, content).expect("write temp config failed");
        }
        path
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = temp_config_path(None);

        let config = AppConfig::load_from_path(&path).expect("load should succeed");

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.socket_addr().expect("addr").port(), 8501);
    }

    #[test]
    fn partial_file_overrides_selected_fields() {
        let path = temp_config_path(Some(
            r#"{ "server": { "bind_addr": "0.0.0.0:9000" }, "image": { "max_file_size": 2048 } }"#,
        ));

        let config = AppConfig::load_from_path(&path).expect("load should succeed");
        let _ = fs::remove_file(&path);

        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.server.max_sessions, 256);
        assert_eq!(config.server.max_total_bytes, 1024 * 1024 * 1024);
        assert_eq!(config.image.max_file_size, 2048);
        assert_eq!(config.image.max_decoded_pixels, 40_000_000);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let path = temp_config_path(Some("{ not json"));

        let result = AppConfig::load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = AppConfig::default();
        config.server.bind_addr = "not an address".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = AppConfig::default();
        config.server.session_ttl_secs = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = AppConfig::default();
        config.image.max_file_size = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = AppConfig::default();
        config.server.max_total_bytes = config.image.max_file_size - 1;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
