use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::cache::SessionCache;
use crate::config::ReaperConfig;
use crate::database::{SessionStore, StoreError};

/// 过期令牌清理
///
/// 由登录等操作随手触发，但每个间隔窗口内最多执行一次；
/// 窗口内或清理进行中到达的触发直接丢弃，不排队。
pub struct StaleSessionReaper {
    store: Arc<dyn SessionStore>,
    cache: Arc<SessionCache>,
    config: ReaperConfig,
    throttle: Mutex<Throttle>,
}

#[derive(Default)]
struct Throttle {
    last_started: Option<Instant>,
    running: bool,
}

/// 任务结束（包括 panic）时清除运行标记
struct RunningGuard<'a>(&'a Mutex<Throttle>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().running = false;
    }
}

impl StaleSessionReaper {
    pub fn new(store: Arc<dyn SessionStore>, cache: Arc<SessionCache>, config: ReaperConfig) -> Self {
        Self {
            store,
            cache,
            config,
            throttle: Mutex::new(Throttle::default()),
        }
    }

    /// 触发一次清理。被接受时返回后台任务句柄，被合并丢弃时返回 `None`。
    pub fn trigger(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.try_begin() {
            tracing::debug!("Reaper trigger coalesced");
            return None;
        }

        let reaper = Arc::clone(self);
        Some(tokio::spawn(async move {
            let _running = RunningGuard(&reaper.throttle);
            match reaper.run_once().await {
                Ok(0) => tracing::debug!("Reaper found no stale tokens"),
                Ok(removed) => tracing::info!("Reaper removed {} stale tokens", removed),
                Err(e) => tracing::error!("Reaper sweep failed: {}", e),
            }
        }))
    }

    fn try_begin(&self) -> bool {
        let mut throttle = self.throttle.lock();
        if throttle.running {
            return false;
        }

        let now = Instant::now();
        if let Some(last) = throttle.last_started {
            if now.duration_since(last) < self.config.interval {
                return false;
            }
        }

        throttle.running = true;
        throttle.last_started = Some(now);
        true
    }

    /// 立即执行一次清理，不经过限流
    pub async fn run_once(&self) -> Result<usize, StoreError> {
        self.sweep(Utc::now()).await
    }

    /// 以 `now` 为基准清理一批过期令牌，返回删除的数量
    ///
    /// 创建时间严格早于 `now - retention` 的令牌才会被删除。
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let cutoff = self.cutoff(now);
        let stale = self
            .store
            .select_stale_tokens(cutoff, self.config.batch_size)
            .await?;
        if stale.is_empty() {
            return Ok(0);
        }

        let deleted = self.store.delete_tokens(&stale).await?;
        for token in &stale {
            self.cache.tokens.remove_token(token);
        }

        tracing::debug!(
            "Reaper swept {} tokens created before {} ({} rows deleted)",
            stale.len(),
            cutoff,
            deleted
        );
        Ok(stale.len())
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let retention = TimeDelta::from_std(self.config.retention).unwrap_or(TimeDelta::MAX);
        now.checked_sub_signed(retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
