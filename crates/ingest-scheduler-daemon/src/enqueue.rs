use std::process::Stdio;

use tokio::process::Command;

/// Enqueues a backfill job (§4.13) by forking the `ingest-backfiller` binary
/// rather than a work queue, consistent with each component being its own
/// OS process. The daemon does not wait on the child; it logs the exit
/// status from a detached task instead.
pub async fn spawn_backfill(identity_id: &str, chat_id: i64, days: Option<u32>, config_path: Option<&str>) {
    let identity_id = identity_id.to_owned();
    let mut cmd = Command::new("ingest-backfiller");
    cmd.arg("--identity-id")
        .arg(&identity_id)
        .arg("--chat-id")
        .arg(chat_id.to_string());
    if let Some(d) = days {
        cmd.arg("--days").arg(d.to_string());
    }
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path);
    }
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

    match cmd.spawn() {
        Ok(mut child) => {
            tokio::spawn(async move {
                match child.wait().await {
                    Ok(status) if status.success() => {}
                    Ok(status) => {
                        tracing::warn!(identity_id, chat_id, %status, "backfill job exited non-zero")
                    }
                    Err(e) => {
                        tracing::warn!(identity_id, chat_id, error = %e, "backfill job wait failed")
                    }
                }
            });
        }
        Err(e) => {
            tracing::warn!(identity_id, chat_id, error = %e, "failed to spawn backfill job")
        }
    }
}
