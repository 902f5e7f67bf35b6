use ingest_core::types::{DomainClassification, EnrichedMessage, RawMessagePayload};
use ingest_taxonomy::{ClassifiedMessage, Domain, Intent};
use serde_json::{json, Value};

/// One fully decided outcome for a bus payload: intents/domains/urgency plus
/// the evidence to write into `llm_analysis`/`openrouter_response`.
pub struct Decision {
    pub intents: Vec<String>,
    pub domains: Vec<DomainClassification>,
    pub urgency_score: i32,
    pub is_spam: bool,
    pub reasoning: String,
    pub llm_analysis: Value,
    pub openrouter_response: Option<Value>,
}

/// Prefilter `force` outcome (§4.9 step 2): REQUEST + CONSTRUCTION_AND_REPAIR, urgency 3.
pub fn forced(matched: &[String]) -> Decision {
    Decision {
        intents: vec![Intent::Request.as_str().to_string()],
        domains: vec![DomainClassification {
            domain: Domain::ConstructionAndRepair.as_str().to_string(),
            subcategories: Vec::new(),
        }],
        urgency_score: 3,
        is_spam: false,
        reasoning: "prefilter forced this message past classification".to_string(),
        llm_analysis: json!({ "source": "prefilter", "decision": "force", "matched": matched }),
        openrouter_response: None,
    }
}

/// Prefilter `skip` / empty-text outcome (§4.9 step 2): OTHER + NONE, urgency 1.
pub fn skipped(reason: &str, matched: &[String]) -> Decision {
    Decision {
        intents: vec![Intent::Other.as_str().to_string()],
        domains: vec![DomainClassification {
            domain: Domain::None_.as_str().to_string(),
            subcategories: Vec::new(),
        }],
        urgency_score: 1,
        is_spam: false,
        reasoning: reason.to_string(),
        llm_analysis: json!({ "source": "prefilter", "decision": "skip", "matched": matched }),
        openrouter_response: None,
    }
}

/// A message present in the LLM's batch response (§4.9 step 5, `ok=true`).
pub fn from_llm(msg: &ClassifiedMessage, raw: &Value) -> Decision {
    Decision {
        intents: msg.intents.iter().map(|s| s.to_string()).collect(),
        domains: msg
            .domains
            .iter()
            .map(|d| DomainClassification {
                domain: d.domain.to_string(),
                subcategories: d.subcategories.iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
        urgency_score: msg.urgency_score,
        is_spam: msg.is_spam,
        reasoning: msg.reasoning.clone(),
        llm_analysis: json!({
            "source": "llm",
            "intents": msg.intents,
            "domains": msg.domains.iter().map(|d| json!({
                "domain": d.domain,
                "subcategories": d.subcategories,
            })).collect::<Vec<_>>(),
            "is_spam": msg.is_spam,
            "urgency_score": msg.urgency_score,
        }),
        openrouter_response: Some(raw.clone()),
    }
}

/// An LLM candidate with no matching id in a successful batch response
/// (§4.9 step 5: `parse_error` or `missing_result`).
pub fn llm_missing(reason: &str, raw: &Value) -> Decision {
    let mut d = skipped(reason, &[]);
    d.llm_analysis = json!({ "source": "llm", "error": reason });
    d.openrouter_response = Some(raw.clone());
    d
}

/// Whole-batch LLM failure that isn't requeued (§4.9 step 5, other `ok=false`).
pub fn llm_batch_error(kind: &str, status: Option<u16>, body: Option<&str>, message: &str) -> Decision {
    let mut d = skipped(message, &[]);
    let body_snippet = body.map(|b| b.chars().take(500).collect::<String>());
    d.llm_analysis = json!({
        "source": "llm",
        "error": kind,
        "status": status,
        "body": body_snippet,
        "message": message,
    });
    d.openrouter_response = None;
    d
}

pub fn into_enriched(payload: &RawMessagePayload, decision: Decision) -> EnrichedMessage {
    EnrichedMessage {
        chat_id: payload.chat_id,
        message_id: payload.message_id,
        sender_id: payload.message.sender_id,
        sender_username: payload.sender_username.clone(),
        chat_username: payload.chat_username.clone(),
        text: payload.message.message.clone(),
        intents: decision.intents,
        domains: decision.domains,
        urgency_score: decision.urgency_score,
        is_spam: decision.is_spam,
        reasoning: decision.reasoning,
        llm_analysis: decision.llm_analysis,
        openrouter_response: decision.openrouter_response,
        message_date: payload.message.date,
    }
}
