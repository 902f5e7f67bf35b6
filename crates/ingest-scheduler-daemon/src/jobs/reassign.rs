use std::collections::{HashMap, HashSet};
use std::path::Path;

use ingest_assignment::{assign_balanced, format_assignment_summary, Assignment};
use ingest_telegram::IdentityClient;
use tracing::{info, warn};

use crate::context::DaemonContext;

/// Reassign job (§4.13): rebuilds eligibility from each identity's live
/// dialog list, weighs chats by recent activity (C3), solves for a
/// balanced assignment (C4), and writes it back (C2) with a summary.
pub async fn run(ctx: &DaemonContext) -> anyhow::Result<()> {
    let realtime =
        ingest_core::realtime_config::load_realtime_config(Path::new(&ctx.config.paths.realtime))?;
    let target_chats: Vec<i64> = realtime.chats.iter().map(|c| c.chat_id).collect();
    let identities: Vec<String> = realtime.accounts.iter().map(|a| a.account_id.clone()).collect();

    let mut eligible: HashMap<i64, Vec<String>> = HashMap::new();
    let mut prev = Assignment::new();

    for account in &realtime.accounts {
        match ctx.sessions.get(&account.account_id) {
            Ok(Some(credential)) => {
                match IdentityClient::connect(
                    &account.account_id,
                    ctx.config.telegram.api_id,
                    &ctx.config.telegram.api_hash,
                    Some(credential),
                )
                .await
                {
                    Ok(client) => match client.dialog_chat_ids().await {
                        Ok(dialogs) => {
                            let dialog_ids: HashSet<i64> = dialogs.iter().map(|d| d.chat_id).collect();
                            for chat_id in &target_chats {
                                if dialog_ids.contains(chat_id) {
                                    eligible
                                        .entry(*chat_id)
                                        .or_default()
                                        .push(account.account_id.clone());
                                }
                            }
                        }
                        Err(e) => warn!(
                            identity_id = %account.account_id, error = %e,
                            "listing dialogs failed, identity excluded this round"
                        ),
                    },
                    Err(e) => warn!(
                        identity_id = %account.account_id, error = %e,
                        "connect failed, identity excluded this round"
                    ),
                }
            }
            Ok(None) => warn!(identity_id = %account.account_id, "no credential stored, identity excluded this round"),
            Err(e) => warn!(identity_id = %account.account_id, error = %e, "credential lookup failed"),
        }

        match ingest_store::assignments::get_assignment(&ctx.pool, &account.account_id).await {
            Ok(Some(a)) => {
                prev.insert(account.account_id.clone(), a.chat_ids.into_iter().collect());
            }
            Ok(None) => {}
            Err(e) => warn!(identity_id = %account.account_id, error = %e, "reading previous assignment failed"),
        }
    }

    let weight =
        ingest_store::weights::compute_weights(&ctx.pool, ctx.config.weight.alpha, ctx.config.weight.min).await?;
    let capacity: HashMap<String, f64> = identities
        .iter()
        .map(|id| (id.clone(), ctx.config.realtime.account_capacity_default as f64))
        .collect();

    let new = assign_balanced(&target_chats, &eligible, &weight, &identities, &capacity);
    let summary = format_assignment_summary(&prev, &new, &weight, &capacity, &target_chats);
    info!("{summary}");

    let assignments: HashMap<String, (Vec<i64>, String)> = identities
        .iter()
        .map(|id| {
            let chats: Vec<i64> = new.get(id).cloned().unwrap_or_default().into_iter().collect();
            (id.clone(), (chats, summary.clone()))
        })
        .collect();

    ingest_store::assignments::write_all(&ctx.pool, &assignments).await?;
    Ok(())
}
