pub mod bootstrap;
pub mod full_backfill;
pub mod reassign;

use ingest_scheduler::Job;
use tracing::warn;

use crate::context::DaemonContext;

pub const REASSIGN: &str = "reassign";
pub const BOOTSTRAP_NEW_CHATS: &str = "bootstrap_new_chats";
pub const FULL_BACKFILL: &str = "full_backfill";

/// Dispatches one fired job to its handler (§4.13). A handler error is
/// logged and never aborts the daemon — one job's failure must not prevent
/// the others from running (§7).
pub async fn dispatch(job: Job, ctx: &DaemonContext) {
    let result = match job.name.as_str() {
        REASSIGN => reassign::run(ctx).await,
        BOOTSTRAP_NEW_CHATS => bootstrap::run(ctx).await,
        FULL_BACKFILL => full_backfill::run(ctx).await,
        other => {
            warn!(job = other, "fired job has no registered handler");
            Ok(())
        }
    };
    if let Err(e) = result {
        warn!(job = %job.name, error = %e, "job failed");
    }
}
