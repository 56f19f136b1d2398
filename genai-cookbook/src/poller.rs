//! Readiness polling for resources the service processes asynchronously.
//!
//! Uploaded media (video in particular) stays `PROCESSING` for a while before
//! it can be referenced from a request. [`ReadinessPoller`] re-fetches the
//! resource until the service reports it ready, reports it failed, or the
//! wait budget in [`PollOptions`] runs out. The decision logic lives in
//! [`PollTracker`] so it can be exercised without any I/O.

use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use genai_cookbook_types::enums::FileState;
use genai_cookbook_types::files::File;

use crate::error::{Error, Result};

/// 资源处理状态的归类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// 仍在处理（或状态未知），需要继续等待。
    Pending,
    /// 可以使用。
    Ready,
    /// 终止失败，不再重试。
    Failed,
}

/// 可被轮询的远端资源。
pub trait ProcessingResource {
    /// 服务端资源名。
    fn resource_name(&self) -> Option<&str>;
    /// 用于日志与错误信息的状态文本。
    fn state_label(&self) -> String;
    fn readiness(&self) -> Readiness;
    /// 服务端给出的失败原因。
    fn failure_message(&self) -> Option<String> {
        None
    }
}

impl ProcessingResource for File {
    fn resource_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn state_label(&self) -> String {
        self.state
            .map_or_else(|| FileState::StateUnspecified.to_string(), |s| s.to_string())
    }

    fn readiness(&self) -> Readiness {
        match self.state {
            Some(FileState::Active) => Readiness::Ready,
            Some(FileState::Failed) => Readiness::Failed,
            Some(FileState::Processing | FileState::StateUnspecified | FileState::Unknown) | None => {
                Readiness::Pending
            }
        }
    }

    fn failure_message(&self) -> Option<String> {
        self.error.as_ref().and_then(|status| status.message.clone())
    }
}

/// 按名称重新获取资源当前状态。
pub trait StatusSource<R>: Send + Sync {
    fn fetch_status<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<R>>;
}

/// 时间来源与挂起。
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// 基于 tokio 计时器的时钟。
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// 轮询配置。
///
/// 默认每 5 秒查询一次，最多等待 300 秒，不限制次数。
///
/// 若下一次等待会达到或越过 `timeout`，则不再等待而直接判定超时。因此当
/// `timeout` 不是 `interval` 的整数倍时，实际放弃的时间会早于 `timeout`：
/// 间隔 200 秒、超时 300 秒时，在第一次查询后即报告超时。`interval` 必须大于零。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Some(Duration::from_secs(300)),
            max_attempts: None,
        }
    }
}

impl PollOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 两次查询之间的间隔。
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 最长等待时间。
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 不限制等待时间。
    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// 最多查询次数。
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

/// 单次观察后的决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    Ready,
    Failed,
    /// 挂起给定时长后再次查询。
    Wait(Duration),
    TimedOut,
}

/// 轮询状态机，不做任何 I/O。
///
/// 每次查询结果通过 [`PollTracker::observe`] 输入。当下一次等待会触及
/// 超时上限，或查询次数达到上限时，判定为超时。
#[derive(Debug, Clone)]
pub struct PollTracker {
    options: PollOptions,
    attempts: u32,
}

impl PollTracker {
    #[must_use]
    pub const fn new(options: PollOptions) -> Self {
        Self {
            options,
            attempts: 0,
        }
    }

    /// 已执行的查询次数。
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// 记录一次查询结果。`elapsed` 为从开始轮询到本次查询完成的时长。
    pub fn observe(&mut self, readiness: Readiness, elapsed: Duration) -> PollDecision {
        self.attempts = self.attempts.saturating_add(1);
        match readiness {
            Readiness::Ready => PollDecision::Ready,
            Readiness::Failed => PollDecision::Failed,
            Readiness::Pending => {
                if self
                    .options
                    .max_attempts
                    .is_some_and(|max| self.attempts >= max)
                {
                    return PollDecision::TimedOut;
                }
                let interval = self.options.interval;
                if self
                    .options
                    .timeout
                    .is_some_and(|timeout| elapsed.saturating_add(interval) >= timeout)
                {
                    return PollDecision::TimedOut;
                }
                PollDecision::Wait(interval)
            }
        }
    }
}

/// 轮询资源直到就绪。
///
/// 第一次迭代总是先查询，调用方持有的旧句柄不参与判断。查询失败立即以
/// [`Error::TransientQuery`] 返回，不做重试。
pub struct ReadinessPoller<'a, S: ?Sized, C = TokioClock> {
    source: &'a S,
    clock: C,
    options: PollOptions,
}

impl<'a, S: ?Sized> ReadinessPoller<'a, S, TokioClock> {
    pub const fn new(source: &'a S, options: PollOptions) -> Self {
        Self {
            source,
            clock: TokioClock,
            options,
        }
    }
}

impl<'a, S: ?Sized, C: Clock> ReadinessPoller<'a, S, C> {
    /// 替换时钟（测试中使用手动时钟）。
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ReadinessPoller<'a, S, C2> {
        ReadinessPoller {
            source: self.source,
            clock,
            options: self.options,
        }
    }

    /// 等待资源就绪并返回最新句柄。
    ///
    /// # Errors
    /// - [`Error::ResourceProcessingFailed`]：服务端报告失败；
    /// - [`Error::ResourceProcessingTimedOut`]：超出等待预算；
    /// - [`Error::TransientQuery`]：状态查询失败；
    /// - [`Error::InvalidConfig`]：轮询间隔为零（不发出任何查询）。
    pub async fn wait<R>(&self, name: &str) -> Result<R>
    where
        S: StatusSource<R>,
        R: ProcessingResource,
    {
        if self.options.interval.is_zero() {
            return Err(Error::InvalidConfig {
                message: "Poll interval must be greater than zero".into(),
            });
        }
        let start = self.clock.now();
        let mut tracker = PollTracker::new(self.options);
        loop {
            let resource =
                self.source
                    .fetch_status(name)
                    .await
                    .map_err(|source| Error::TransientQuery {
                        name: name.to_string(),
                        source: Box::new(source),
                    })?;
            let elapsed = self.clock.now().saturating_duration_since(start);
            let decision = tracker.observe(resource.readiness(), elapsed);
            tracing::debug!(
                resource = name,
                attempt = tracker.attempts(),
                state = %resource.state_label(),
                ?elapsed,
                ?decision,
                "polled resource state"
            );

            match decision {
                PollDecision::Ready => return Ok(resource),
                PollDecision::Failed => {
                    return Err(Error::ResourceProcessingFailed {
                        name: resource.resource_name().unwrap_or(name).to_string(),
                        state: resource.state_label(),
                        message: resource.failure_message(),
                    });
                }
                PollDecision::TimedOut => {
                    return Err(Error::ResourceProcessingTimedOut {
                        name: name.to_string(),
                        attempts: tracker.attempts(),
                        elapsed,
                        last_state: resource.state_label(),
                    });
                }
                PollDecision::Wait(interval) => self.clock.sleep(interval).await,
            }
        }
    }
}
