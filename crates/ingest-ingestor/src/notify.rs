use ingest_core::types::EnrichedMessage;
use ingest_router::RoutableDomain;
use std::sync::atomic::Ordering;

use crate::context::PipelineContext;

/// A row is a signal worth notifying on only when the LLM classified it as
/// a REQUEST and the router actually has somewhere to send it — an OFFER/INFO
/// row, or a filtered row (`domains=[NONE]`), must never reach a destination.
fn is_signal(row: &EnrichedMessage, targets: &[i64]) -> bool {
    row.intents.iter().any(|i| i == "REQUEST") && !targets.is_empty()
}

/// Routes a persisted row to every matching destination and posts a signal
/// to each (§4.11, §4.12). Duplicate destinations across domains deliver
/// the message more than once, matching the router's documented behavior.
pub async fn route_and_notify(row: &EnrichedMessage, ctx: &PipelineContext) {
    let Some(bot) = ctx.notifier_bot.as_ref() else {
        return;
    };

    let domains: Vec<RoutableDomain> = row
        .domains
        .iter()
        .map(|d| RoutableDomain {
            domain: d.domain.clone(),
            subcategories: d.subcategories.clone(),
        })
        .collect();
    let locations = ctx.chat_locations.get(&row.chat_id).cloned().unwrap_or_default();
    let targets = ctx.routing.get_chat_ids(&domains, &locations);

    if !is_signal(row, &targets) {
        return;
    }

    for target in targets {
        let text = ingest_notifier::format_signal(
            &row.text,
            row.chat_id,
            row.sender_id,
            Some(row.message_id),
            row.sender_username.as_deref(),
            row.chat_username.as_deref(),
            Some(row.message_date),
        );
        ingest_notifier::send(bot, target, &text).await;
        ctx.stats.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }
}
