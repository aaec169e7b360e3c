use crate::errors::{AppError, ErrorSeverity};
use std::future::Future;
use tracing::{debug, error, warn};

/// バックエンド呼び出しをトレースする
///
/// 所要時間と失敗を記録し、結果はそのまま返す。
pub async fn trace_backend_operation<T, Fut>(
    service: &str,
    operation: &str,
    future: Fut,
) -> Result<T, AppError>
where
    Fut: Future<Output = Result<T, AppError>>,
{
    let start_time = std::time::Instant::now();
    let result = future.await;
    let duration = start_time.elapsed();

    match &result {
        Ok(_) => {
            debug!(
                service = service,
                operation = operation,
                duration_ms = duration.as_millis() as u64,
                "バックエンド操作成功"
            );
        }
        Err(e) => record_error(e, service, operation),
    }

    result
}

/// エラーを重要度に応じたレベルで記録
pub fn record_error(error: &AppError, service: &str, operation: &str) {
    let metadata = error.metadata();
    match metadata.severity {
        ErrorSeverity::Info | ErrorSeverity::Warning => warn!(
            service = service,
            operation = operation,
            code = metadata.code,
            category = ?metadata.category,
            error = %error,
            "バックエンド操作失敗"
        ),
        ErrorSeverity::Error | ErrorSeverity::Critical => error!(
            service = service,
            operation = operation,
            code = metadata.code,
            category = ?metadata.category,
            error = %error,
            "バックエンド操作失敗"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trace_backend_operation_passes_result_through() {
        let ok = trace_backend_operation("todos", "get", async { Ok::<_, AppError>(42) }).await;
        assert_eq!(ok, Ok(42));

        let err = trace_backend_operation("todos", "get", async {
            Err::<u32, _>(AppError::Network("offline".to_string()))
        })
        .await;
        assert_eq!(err, Err(AppError::Network("offline".to_string())));
    }
}
