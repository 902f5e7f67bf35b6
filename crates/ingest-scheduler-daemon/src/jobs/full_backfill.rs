use std::path::Path;

use tracing::warn;

use crate::context::DaemonContext;
use crate::enqueue::spawn_backfill;

/// Full-backfill job (§4.13): daily re-walk of every (identity, assigned
/// chat) pair out to the configured history horizon.
pub async fn run(ctx: &DaemonContext) -> anyhow::Result<()> {
    let realtime =
        ingest_core::realtime_config::load_realtime_config(Path::new(&ctx.config.paths.realtime))?;
    let days = ctx.config.realtime.scheduled_history_days;

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
            spawn_backfill(&account.account_id, chat_id, Some(days), ctx.config_path.as_deref()).await;
        }
    }
    Ok(())
}
