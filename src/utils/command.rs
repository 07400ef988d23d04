use crate::cursor_error;
use crate::error::Result;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Запустить внешнюю утилиту и вернуть её stdout без пробельных символов по краям
///
/// Ошибкой считаются: невозможность запуска, ненулевой код выхода, пустой вывод
/// и превышение `timeout`. Stderr используется только для отладочного лога.
pub async fn query_stdout(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| cursor_error!(timeout, "{} не ответил за {}мс", program, timeout.as_millis()))?
        .map_err(|e| {
            debug!("{} не найден или не запускается: {}", program, e);
            cursor_error!(probe, "{} не найден: {}", program, e)
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("{} вернул ошибку ({:?}): {}", program, output.status.code(), stderr.trim());
        return Err(cursor_error!(
            probe,
            "{} завершился с кодом {:?}",
            program,
            output.status.code()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        return Err(cursor_error!(probe, "{} вернул пустой вывод", program));
    }

    Ok(stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::CursorError;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_stdout_is_trimmed() {
        let out = query_stdout("sh", &["-c", "printf '  ru \\n'"], TIMEOUT).await.unwrap();
        assert_eq!(out, "ru");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let err = query_stdout("sh", &["-c", "echo us; exit 3"], TIMEOUT).await.unwrap_err();
        assert!(matches!(err, CursorError::Probe(_)));
    }

    #[tokio::test]
    async fn test_empty_output_is_error() {
        let err = query_stdout("sh", &["-c", "echo '   '"], TIMEOUT).await.unwrap_err();
        assert!(matches!(err, CursorError::Probe(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let err = query_stdout("layout-cursor-no-such-binary", &[], TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, CursorError::Probe(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = query_stdout("sleep", &["5"], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, CursorError::ProbeTimeout(_)));
    }
}
