use crate::types::{
    ChatIdValue, DomainEntry, LocationOverride, NormalizedLocation, RoutableDomain, RoutingConfig,
    SubcatEntry,
};

fn normalize_locations(locations: &[ingest_core::types::Location]) -> Vec<NormalizedLocation> {
    locations
        .iter()
        .filter_map(|l| {
            let city = l.city.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
            let district = l.district.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
            if city.is_none() && district.is_none() {
                None
            } else {
                Some(NormalizedLocation { city, district })
            }
        })
        .collect()
}

/// Resolves a `ChatIdValue` to `(chat_id, should_use_fallback)`.
fn resolve_chat_id(value: ChatIdValue) -> (Option<i64>, bool) {
    match value {
        ChatIdValue::Muted => (None, false),
        ChatIdValue::Chat(id) => (Some(id), false),
        ChatIdValue::UseFallback => (None, true),
    }
}

/// Matches city+district first, then city-only, returning
/// `(matched, resolved_chat_id, should_use_fallback)`.
fn match_location_override(
    overrides: &[LocationOverride],
    locations: &[NormalizedLocation],
) -> (bool, Option<i64>, bool) {
    if overrides.is_empty() || locations.is_empty() {
        return (false, None, false);
    }

    for loc in locations {
        let (Some(city), Some(district)) = (&loc.city, &loc.district) else {
            continue;
        };
        for rule in overrides {
            if &rule.city == city && rule.district.as_ref() == Some(district) {
                let (chat_id, fallback) = resolve_chat_id(rule.chat_id);
                return (true, chat_id, fallback);
            }
        }
    }

    for loc in locations {
        let Some(city) = &loc.city else { continue };
        for rule in overrides {
            if &rule.city == city && rule.district.is_none() {
                let (chat_id, fallback) = resolve_chat_id(rule.chat_id);
                return (true, chat_id, fallback);
            }
        }
    }

    (false, None, false)
}

/// Resolves a classified message's domains into the list of destination
/// chat-ids, preserving duplicates when two domains route to the same
/// destination (§9 design note — intentional, never dedup).
pub fn get_chat_ids_for_domains(
    config: &RoutingConfig,
    domains: &[RoutableDomain],
    locations: &[ingest_core::types::Location],
) -> Vec<i64> {
    if domains.is_empty() {
        return Vec::new();
    }

    let normalized_locations = normalize_locations(locations);
    let mut chat_ids = Vec::new();

    'domain: for domain_info in domains {
        if domain_info.domain.is_empty() {
            chat_ids.push(config.fallback_chat_id);
            continue;
        }

        if domain_info
            .subcategories
            .iter()
            .any(|s| config.muted_subcategories.contains(s))
        {
            continue;
        }

        let Some(entry) = config.domains.get(&domain_info.domain) else {
            chat_ids.push(config.fallback_chat_id);
            continue;
        };

        match entry {
            DomainEntry::Scalar(value) => {
                let (chat_id, use_fallback) = resolve_chat_id(*value);
                if let Some(id) = chat_id {
                    chat_ids.push(id);
                } else if use_fallback {
                    chat_ids.push(config.fallback_chat_id);
                }
            }
            DomainEntry::Structured {
                default,
                location_overrides,
                subcategories,
            } => {
                let mut subcategory_value: Option<ChatIdValue> = None;
                let mut subcategory_overrides: &[LocationOverride] = &[];

                for subcat in &domain_info.subcategories {
                    if let Some(sub_entry) = subcategories.get(subcat) {
                        match sub_entry {
                            SubcatEntry::Scalar(v) => subcategory_value = Some(*v),
                            SubcatEntry::Structured {
                                default: sub_default,
                                location_overrides: sub_overrides,
                            } => {
                                subcategory_value = Some(*sub_default);
                                subcategory_overrides = sub_overrides;
                            }
                        }
                        break;
                    }
                }

                if matches!(subcategory_value, Some(ChatIdValue::Muted)) {
                    continue 'domain;
                }

                if !subcategory_overrides.is_empty() {
                    let (matched, chat_id, use_fallback) =
                        match_location_override(subcategory_overrides, &normalized_locations);
                    if matched {
                        if let Some(id) = chat_id {
                            chat_ids.push(id);
                        } else if use_fallback {
                            chat_ids.push(config.fallback_chat_id);
                        }
                        continue;
                    }
                }

                if !location_overrides.is_empty() {
                    let (matched, chat_id, use_fallback) =
                        match_location_override(location_overrides, &normalized_locations);
                    if matched {
                        if let Some(id) = chat_id {
                            chat_ids.push(id);
                        } else if use_fallback {
                            chat_ids.push(config.fallback_chat_id);
                        }
                        continue;
                    }
                }

                let value_to_use = subcategory_value.unwrap_or(*default);
                let (chat_id, use_fallback) = resolve_chat_id(value_to_use);
                if let Some(id) = chat_id {
                    chat_ids.push(id);
                } else if use_fallback {
                    chat_ids.push(config.fallback_chat_id);
                }
            }
        }
    }

    chat_ids
}
