use std::path::Path;

use chrono::{Duration, Utc};
use tracing::warn;

use crate::context::DaemonContext;
use crate::enqueue::spawn_backfill;

const NEW_CHAT_WINDOW_SECS: i64 = 15 * 60;

/// Bootstrap-new-chats job (§4.13): a chat with no row older than 15
/// minutes is treated as freshly onboarded and gets one backfill job per
/// identity currently assigned to it.
pub async fn run(ctx: &DaemonContext) -> anyhow::Result<()> {
    let realtime =
        ingest_core::realtime_config::load_realtime_config(Path::new(&ctx.config.paths.realtime))?;
    let cutoff = Utc::now() - Duration::seconds(NEW_CHAT_WINDOW_SECS);

    for account in &realtime.accounts {
        let assignment = match ingest_store::assignments::get_assignment(&ctx.pool, &account.account_id).await {
            Ok(Some(a)) => a,
            Ok(None) => continue,
            Err(e) => {
                warn!(identity_id = %account.account_id, error = %e, "reading assignment failed");
                continue;
            }
        };

        for chat_id in assignment.chat_ids {
            match ingest_store::persister::has_history_before(&ctx.pool, chat_id, cutoff).await {
                Ok(false) => {
                    spawn_backfill(&account.account_id, chat_id, None, ctx.config_path.as_deref()).await;
                }
                Ok(true) => {}
                Err(e) => warn!(chat_id, error = %e, "new-chat check failed"),
            }
        }
    }
    Ok(())
}
