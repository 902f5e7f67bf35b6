use std::collections::HashMap;

/// A resolved (or sentinel) chat-id value from the routing config's tagged
/// variant (§9 design notes): an integer destination, the `"muted"` /
/// `false` sentinel, or `null` meaning "use fallback".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatIdValue {
    Chat(i64),
    Muted,
    UseFallback,
}

#[derive(Debug, Clone)]
pub struct LocationOverride {
    pub city: String,
    pub district: Option<String>,
    pub chat_id: ChatIdValue,
}

#[derive(Debug, Clone)]
pub enum SubcatEntry {
    Scalar(ChatIdValue),
    Structured {
        default: ChatIdValue,
        location_overrides: Vec<LocationOverride>,
    },
}

#[derive(Debug, Clone)]
pub enum DomainEntry {
    Scalar(ChatIdValue),
    Structured {
        default: ChatIdValue,
        location_overrides: Vec<LocationOverride>,
        subcategories: HashMap<String, SubcatEntry>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedLocation {
    pub city: Option<String>,
    pub district: Option<String>,
}

/// Fully parsed routing table (§6 routing config, §9 tagged-variant design).
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub domains: HashMap<String, DomainEntry>,
    pub muted_subcategories: std::collections::HashSet<String>,
    pub fallback_chat_id: i64,
}

/// The classification input the resolver walks — deliberately decoupled
/// from `ingest-taxonomy` so this crate has no upstream dependency.
#[derive(Debug, Clone)]
pub struct RoutableDomain {
    pub domain: String,
    pub subcategories: Vec<String>,
}
