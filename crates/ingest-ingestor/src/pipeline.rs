use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use ingest_bus::{Bus, Lane};
use ingest_core::types::{EnrichedMessage, RawMessagePayload};
use ingest_llm::{ClassifyItem, ClassifyOutcome};
use ingest_taxonomy::ClassifiedMessage;
use lapin::message::Delivery;
use tracing::warn;

use crate::classify::{self, into_enriched};
use crate::context::PipelineContext;
use crate::notify::route_and_notify;

struct RawEnvelope {
    delivery: Delivery,
    payload: RawMessagePayload,
}

struct LlmCandidate {
    delivery: Delivery,
    payload: RawMessagePayload,
    key: String,
}

/// Runs one lane's two-stage batching loop (§4.9): a size/time-triggered
/// read-batch, a prefilter pass that peels off synthetic-classified rows
/// for immediate persistence, and a drain-triggered LLM batch for the rest.
/// Returns only if the bus consumer stream closes.
pub async fn run_consumer_loop(lane: Lane, bus: Arc<Bus>, ctx: Arc<PipelineContext>) {
    let consumer_tag = format!("ingestor-{}", lane.queue());
    let mut consumer = match bus.consume(lane, &consumer_tag).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, queue = lane.queue(), "failed to open consumer, loop exiting");
            return;
        }
    };

    let read_batch_size = ctx.config.batch.read_batch_size;
    let read_timeout = Duration::from_secs(ctx.config.batch.read_batch_timeout_secs.max(1));
    let llm_batch_size = ctx.config.batch.llm_batch_size.max(1);

    let mut buffer: Vec<RawEnvelope> = Vec::new();
    let mut llm_pending: Vec<LlmCandidate> = Vec::new();
    let deadline = tokio::time::sleep(read_timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            next = consumer.next() => {
                match next {
                    Some(Ok(delivery)) => {
                        ctx.stats.mark_consumed();
                        match serde_json::from_slice::<RawMessagePayload>(&delivery.data) {
                            Ok(payload) => buffer.push(RawEnvelope { delivery, payload }),
                            Err(e) => {
                                warn!(queue = lane.queue(), error = %e, "undecodable payload, dropping");
                                let _ = ingest_bus::drop_without_requeue(&delivery).await;
                            }
                        }
                        if buffer.len() >= read_batch_size {
                            drain_read_batch(&mut buffer, &mut llm_pending, &ctx).await;
                            deadline.as_mut().reset(tokio::time::Instant::now() + read_timeout);
                        }
                    }
                    Some(Err(e)) => {
                        warn!(queue = lane.queue(), error = %e, "consumer delivery error");
                    }
                    None => {
                        if !buffer.is_empty() {
                            drain_read_batch(&mut buffer, &mut llm_pending, &ctx).await;
                        }
                        tracing::warn!(queue = lane.queue(), "consumer stream closed, loop exiting");
                        return;
                    }
                }
            }
            _ = &mut deadline => {
                if !buffer.is_empty() {
                    drain_read_batch(&mut buffer, &mut llm_pending, &ctx).await;
                }
                deadline.as_mut().reset(tokio::time::Instant::now() + read_timeout);
            }
        }

        while llm_pending.len() >= llm_batch_size {
            let drained: Vec<LlmCandidate> = llm_pending.drain(0..llm_batch_size).collect();
            dispatch_llm_batch(drained, &ctx).await;
        }
    }
}

/// Prefilter pass (§4.9 step 2): force/skip and empty-text messages get a
/// synthetic classification and are persisted immediately; everything else
/// becomes an LLM candidate.
async fn drain_read_batch(
    buffer: &mut Vec<RawEnvelope>,
    llm_pending: &mut Vec<LlmCandidate>,
    ctx: &PipelineContext,
) {
    if buffer.is_empty() {
        return;
    }
    let batch: Vec<RawEnvelope> = buffer.drain(..).collect();

    let mut immediate_rows = Vec::new();
    let mut immediate_deliveries = Vec::new();

    for env in batch {
        let text = env.payload.message.message.clone();
        if text.trim().is_empty() {
            let decision = classify::skipped("empty message text", &[]);
            ctx.stats.filtered.fetch_add(1, Ordering::Relaxed);
            ctx.stats.mark_urgency(decision.urgency_score);
            immediate_rows.push(into_enriched(&env.payload, decision));
            immediate_deliveries.push(env.delivery);
            continue;
        }

        let (decision_kind, matched) = ctx.prefilter.match_text(&text);
        match decision_kind {
            Some(ingest_prefilter::Decision::Force) => {
                let decision = classify::forced(&matched);
                ctx.stats.forced.fetch_add(1, Ordering::Relaxed);
                ctx.stats.mark_urgency(decision.urgency_score);
                immediate_rows.push(into_enriched(&env.payload, decision));
                immediate_deliveries.push(env.delivery);
            }
            Some(ingest_prefilter::Decision::Skip) => {
                let decision = classify::skipped("prefilter skip rule matched", &matched);
                ctx.stats.filtered.fetch_add(1, Ordering::Relaxed);
                ctx.stats.mark_urgency(decision.urgency_score);
                immediate_rows.push(into_enriched(&env.payload, decision));
                immediate_deliveries.push(env.delivery);
            }
            None => {
                let key = format!("{}:{}", env.payload.chat_id, env.payload.message_id);
                llm_pending.push(LlmCandidate {
                    delivery: env.delivery,
                    payload: env.payload,
                    key,
                });
            }
        }
    }

    if !immediate_rows.is_empty() {
        persist_and_finish(immediate_rows, immediate_deliveries, ctx, true).await;
    }
}

/// LLM dispatch and result handling (§4.9 steps 4-5).
async fn dispatch_llm_batch(batch: Vec<LlmCandidate>, ctx: &PipelineContext) {
    let items: Vec<ClassifyItem> = batch
        .iter()
        .map(|c| ClassifyItem {
            id: c.key.clone(),
            text: c.payload.message.message.clone(),
        })
        .collect();

    let outcome: ClassifyOutcome = ctx.llm.classify(&items).await;

    match outcome {
        Ok(success) => {
            let mut by_id: HashMap<String, ClassifiedMessage> =
                success.classified_messages.into_iter().collect();
            let mut rows = Vec::with_capacity(batch.len());
            let mut deliveries = Vec::with_capacity(batch.len());
            for cand in batch {
                let decision = match by_id.remove(&cand.key) {
                    Some(msg) => classify::from_llm(&msg, &success.raw),
                    None => classify::llm_missing("missing_result", &success.raw),
                };
                ctx.stats.mark_urgency(decision.urgency_score);
                rows.push(into_enriched(&cand.payload, decision));
                deliveries.push(cand.delivery);
            }
            persist_and_finish(rows, deliveries, ctx, true).await;
        }
        Err(failure) if failure.should_requeue() => {
            ctx.stats.failed.fetch_add(batch.len() as u64, Ordering::Relaxed);
            for cand in &batch {
                let _ = ingest_bus::requeue(&cand.delivery).await;
            }
        }
        Err(failure) => {
            let mut rows = Vec::with_capacity(batch.len());
            let mut deliveries = Vec::with_capacity(batch.len());
            for cand in batch {
                let decision = classify::llm_batch_error(
                    failure.kind.as_str(),
                    failure.status,
                    failure.body.as_deref(),
                    &failure.message,
                );
                ctx.stats.mark_urgency(decision.urgency_score);
                rows.push(into_enriched(&cand.payload, decision));
                deliveries.push(cand.delivery);
            }
            persist_and_finish(rows, deliveries, ctx, false).await;
        }
    }
}

/// Persists a batch through C10 and acks only on success (§4.9 step 3/5);
/// a persist failure requeues the whole batch rather than dropping it.
async fn persist_and_finish(
    rows: Vec<EnrichedMessage>,
    deliveries: Vec<Delivery>,
    ctx: &PipelineContext,
    notify: bool,
) {
    match ingest_store::persister::upsert(&ctx.pool, &rows).await {
        Ok(_) => {
            ctx.stats.persisted.fetch_add(rows.len() as u64, Ordering::Relaxed);
            for d in &deliveries {
                if let Err(e) = ingest_bus::ack(d).await {
                    warn!(error = %e, "ack failed");
                }
            }
            if notify {
                for row in &rows {
                    route_and_notify(row, ctx).await;
                }
            }
        }
        Err(e) => {
            warn!(error = %e, batch_len = rows.len(), "persist failed, requeuing batch");
            ctx.stats.failed.fetch_add(rows.len() as u64, Ordering::Relaxed);
            for d in &deliveries {
                let _ = ingest_bus::requeue(d).await;
            }
        }
    }
}
