//! # PicLink — 库入口
//!
//! 上传一张图片，预览它，并得到一个可以复制或下载的 base64 data URL。
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                浏览器（服务端渲染的 HTML 页面）            │
//! │   上传表单 ── 复制按钮 ── 移除按钮 ── 下载链接             │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ HTTP（一次用户动作 = 一次请求）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ web ──────── warp 路由 · 视图模型 · HTML 渲染          │
//! │  │                                                       │
//! │  ├─ session ──── 会话上传槽（内存 LRU + TTL）              │
//! │  │                                                       │
//! │  ├─ image_handler  上传校验·解码·重新编码·data URL        │
//! │  │                                                       │
//! │  ├─ config ───── AppConfig（JSON 文件 + 默认值）          │
//! │  └─ error ────── AppError (统一错误类型)                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`config`] | 服务与图片处理配置的加载与校验 |
//! | [`image_handler`] | 上传校验、解码、重新编码、data URL 打包 |
//! | [`session`] | 每个浏览器会话最多一个上传文件，只存在内存中 |
//! | [`web`] | HTTP 路由、页面视图模型与 HTML 渲染 |

pub mod config;
pub mod error;
pub mod image_handler;
pub mod session;
pub mod web;
