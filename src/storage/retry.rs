//! 存储操作重试模块
//!
//! 指数退避重试执行器，用于分类引擎的存储更新

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::errors::{Result, ShortUrlError};

/// 判断错误是否可重试
///
/// Only transient store failures (write conflicts, lost connections) are
/// retried. `NotFound` and client errors are permanent.
pub fn is_retryable_error(err: &ShortUrlError) -> bool {
    matches!(err, ShortUrlError::Storage(_))
}

/// Run `operation` with bounded exponential backoff.
///
/// Non-retryable errors and exhausted budgets are returned to the caller;
/// the caller decides whether to propagate or log (detached tasks log).
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(err) if is_retryable_error(&err) && attempt < config.max_retries => {
                attempt += 1;
                let delay = config
                    .base_delay_ms
                    .saturating_mul(2u64.saturating_pow(attempt - 1))
                    .min(config.max_delay_ms);
                warn!(
                    "{} failed (attempt {}/{}): {}, retrying in {}ms",
                    operation_name, attempt, config.max_retries, err, delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
