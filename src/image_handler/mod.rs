//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“上传校验 → 解码 → 重新编码 → data URL 打包”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：承载可注入状态（`ImageServiceState`）
//! - `handler`：编排整条处理流水线
//! - `loader`：负责上传入口校验（扩展名 / MIME / 体积）
//! - `pipeline`：负责签名探测、像素限制与解码
//! - `encoder`：负责重新编码与 data URL 构造/解析
//! - `config/error/format/source`：配置、错误、格式枚举、中间数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 浏览器表单提交
//!    ↓
//! web::routes（multipart 解析、会话）
//!    ↓
//! service.rs（State 注入、阻塞线程池）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（入口校验）
//!    ├─ pipeline.rs（签名 + 像素限制 + 解码）
//!    └─ encoder.rs（重新编码 + Base64 + data URL）
//!    ↓
//! ProcessedImage / ImageError 交给页面渲染
//! ```

mod config;
mod encoder;
mod error;
mod format;
mod handler;
mod loader;
mod pipeline;
mod service;
mod source;

pub use config::ImageConfig;
pub use error::ImageError;
pub use format::ImageKind;
pub use handler::ImageHandler;
pub use service::ImageServiceState;
pub use source::{format_size_kb, DataUrl, DecodedImage, ProcessedImage, UploadedFile};
