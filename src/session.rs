//! 会话上传槽模块
//!
//! # 设计思路
//!
//! 每个浏览器会话最多持有一个上传文件，只存在内存中：
//! 复制、下载等后续操作基于它重新计算全部派生值，新上传直接覆盖旧文件。
//!
//! # 实现思路
//!
//! - 会话 ID 为 UUID v4，通过 Cookie 传递；不是合法 UUID 的 Cookie 一律换发新 ID。
//! - `LruCache` 限制会话总数，超出时淘汰最久未访问的会话。
//! - 同时记录所有上传的字节总数，超过 `max_total_bytes` 时同样按 LRU 顺序淘汰。
//! - 每个条目记录最近访问时间，访问时检查过期，写入时顺带清理过期条目。
//! - 锁中毒统一映射为 `AppError::Session`，不使用 `unwrap()`。

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;
use uuid::Uuid;

use crate::error::AppError;
use crate::image_handler::UploadedFile;

/// 会话 Cookie 名称。
pub const SESSION_COOKIE: &str = "piclink_session";

/// 解析后的会话 ID。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    value: String,
    issued: bool,
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// 本次请求新签发的 ID，需要写回 `Set-Cookie`。
    pub fn is_new(&self) -> bool {
        self.issued
    }

    pub fn set_cookie_value(&self) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.value)
    }
}

struct SessionEntry {
    upload: Arc<UploadedFile>,
    touched_at: Instant,
}

/// 锁内状态：会话条目与它们持有的上传字节总数。
struct SessionSlots {
    entries: LruCache<String, SessionEntry>,
    total_bytes: u64,
}

impl SessionSlots {
    fn remove(&mut self, key: &str) -> Option<SessionEntry> {
        let entry = self.entries.pop(key)?;
        self.total_bytes = self.total_bytes.saturating_sub(entry.upload.size() as u64);
        Some(entry)
    }
}

/// 内存会话存储。
pub struct SessionStore {
    slots: Mutex<SessionSlots>,
    max_total_bytes: u64,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(max_sessions: usize, max_total_bytes: u64, ttl: Duration) -> Result<Self, AppError> {
        let capacity = NonZeroUsize::new(max_sessions)
            .ok_or_else(|| AppError::Config("max_sessions must be greater than 0".to_string()))?;
        if max_total_bytes == 0 {
            return Err(AppError::Config("max_total_bytes must be greater than 0".to_string()));
        }

        Ok(Self {
            slots: Mutex::new(SessionSlots {
                entries: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_total_bytes,
            ttl,
        })
    }

    /// 由 Cookie 值解析会话 ID，缺失或非法时签发新 ID。
    pub fn resolve(&self, cookie: Option<&str>) -> SessionId {
        match cookie.map(str::trim).and_then(|raw| Uuid::parse_str(raw).ok()) {
            Some(id) => SessionId {
                value: id.hyphenated().to_string(),
                issued: false,
            },
            None => {
                let id = Uuid::new_v4().hyphenated().to_string();
                log::debug!("🆕 签发新会话: {}", id);
                SessionId {
                    value: id,
                    issued: true,
                }
            }
        }
    }

    /// 读取会话当前上传（过期则清除并返回 `None`）。
    pub fn current(&self, id: &SessionId) -> Result<Option<Arc<UploadedFile>>, AppError> {
        let mut slots = self.lock()?;

        match slots.entries.get_mut(id.as_str()) {
            None => return Ok(None),
            Some(entry) if entry.touched_at.elapsed() < self.ttl => {
                entry.touched_at = Instant::now();
                return Ok(Some(Arc::clone(&entry.upload)));
            }
            Some(_) => {}
        }

        slots.remove(id.as_str());
        log::debug!("⌛ 会话已过期，丢弃上传: {}", id.as_str());

        Ok(None)
    }

    /// 写入会话上传，覆盖旧文件。
    ///
    /// 写入后若会话数或字节总数超限，按最久未访问顺序淘汰其他会话。
    pub fn store(&self, id: &SessionId, upload: Arc<UploadedFile>) -> Result<(), AppError> {
        let mut slots = self.lock()?;
        self.sweep_expired(&mut slots);
        slots.remove(id.as_str());

        let size = upload.size() as u64;
        let entry = SessionEntry {
            upload,
            touched_at: Instant::now(),
        };

        if let Some((evicted, old)) = slots.entries.push(id.as_str().to_string(), entry) {
            slots.total_bytes = slots.total_bytes.saturating_sub(old.upload.size() as u64);
            log::info!("♻️ 会话数达到上限，淘汰最久未访问的会话: {}", evicted);
        }
        slots.total_bytes += size;

        while slots.total_bytes > self.max_total_bytes && slots.entries.len() > 1 {
            let Some((evicted, old)) = slots.entries.pop_lru() else {
                break;
            };
            slots.total_bytes = slots.total_bytes.saturating_sub(old.upload.size() as u64);
            log::info!("♻️ 上传总量超过 {} bytes，淘汰会话: {}", self.max_total_bytes, evicted);
        }

        log::debug!(
            "📦 会话上传已保存 - 会话数: {} 总大小: {} bytes",
            slots.entries.len(),
            slots.total_bytes
        );

        Ok(())
    }

    /// 清除会话上传，返回之前是否存在。
    pub fn clear(&self, id: &SessionId) -> Result<bool, AppError> {
        Ok(self.lock()?.remove(id.as_str()).is_some())
    }

    fn sweep_expired(&self, slots: &mut SessionSlots) {
        let expired: Vec<String> = slots
            .entries
            .iter()
            .filter(|(_, entry)| entry.touched_at.elapsed() >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            slots.remove(&key);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionSlots>, AppError> {
        self.slots
            .lock()
            .map_err(|_| AppError::Session("session store lock poisoned".to_string()))
    }
}
