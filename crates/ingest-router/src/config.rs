use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{Result, RouterError};
use crate::types::{ChatIdValue, DomainEntry, LocationOverride, RoutingConfig, SubcatEntry};

fn parse_chat_id_value(value: Option<&Value>) -> ChatIdValue {
    match value {
        Some(Value::String(s)) if s == "muted" => ChatIdValue::Muted,
        Some(Value::Bool(false)) => ChatIdValue::Muted,
        Some(Value::Null) | None => ChatIdValue::UseFallback,
        Some(Value::Number(n)) => n
            .as_i64()
            .map(ChatIdValue::Chat)
            .unwrap_or(ChatIdValue::UseFallback),
        _ => ChatIdValue::UseFallback,
    }
}

fn normalize_location_value(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn parse_location_overrides(value: Option<&Value>) -> Vec<LocationOverride> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let city = normalize_location_value(obj.get("city"))?;
            let district = normalize_location_value(obj.get("district"));
            let chat_id = parse_chat_id_value(obj.get("chat_id"));
            Some(LocationOverride {
                city,
                district,
                chat_id,
            })
        })
        .collect()
}

fn parse_subcat_entry(value: &Value) -> SubcatEntry {
    match value {
        Value::Object(obj) => SubcatEntry::Structured {
            default: parse_chat_id_value(obj.get("default")),
            location_overrides: parse_location_overrides(obj.get("location_overrides")),
        },
        other => SubcatEntry::Scalar(parse_chat_id_value(Some(other))),
    }
}

fn parse_domain_entry(value: &Value) -> DomainEntry {
    match value {
        Value::Object(obj) => {
            let default = parse_chat_id_value(obj.get("default"));
            let location_overrides = parse_location_overrides(obj.get("location_overrides"));
            let mut subcategories = HashMap::new();
            if let Some(Value::Object(subs)) = obj.get("subcategories") {
                for (name, v) in subs {
                    subcategories.insert(name.clone(), parse_subcat_entry(v));
                }
            }
            DomainEntry::Structured {
                default,
                location_overrides,
                subcategories,
            }
        }
        other => DomainEntry::Scalar(parse_chat_id_value(Some(other))),
    }
}

/// Loads and validates the routing config. `fallback` is mandatory; its
/// absence is a fatal load error (§6).
pub fn load_routing_config(path: &Path) -> Result<RoutingConfig> {
    if !path.exists() {
        return Err(RouterError::NotFound(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&raw)?;

    let domains_raw = data.get("domains").and_then(Value::as_object);
    let mut domains = HashMap::new();
    if let Some(domains_raw) = domains_raw {
        for (name, cfg) in domains_raw {
            domains.insert(name.clone(), parse_domain_entry(cfg));
        }
    }

    let fallback_chat_id = match data.get("fallback") {
        Some(Value::Number(n)) => n.as_i64().ok_or(RouterError::MissingFallback)?,
        _ => return Err(RouterError::MissingFallback),
    };

    let muted_subcategories: HashSet<String> = data
        .get("muted_subcategories")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    Ok(RoutingConfig {
        domains,
        muted_subcategories,
        fallback_chat_id,
    })
}
