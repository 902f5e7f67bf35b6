//! `ingest-router` — the domain/subcategory routing resolver (§4 routing),
//! a tagged-variant JSON config walked by a single resolver per §9.

pub mod config;
pub mod error;
pub mod resolver;
pub mod types;

pub use config::load_routing_config;
pub use error::{Result, RouterError};
pub use resolver::get_chat_ids_for_domains;
pub use types::{ChatIdValue, DomainEntry, RoutableDomain, RoutingConfig, SubcatEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_core::types::Location;

    fn loc(city: &str, district: &str) -> Location {
        Location {
            city: Some(city.to_string()),
            district: Some(district.to_string()),
        }
    }

    #[test]
    fn location_override_wins_over_default() {
        let json = r#"{
            "domains": {
                "CONSTRUCTION_AND_REPAIR": {
                    "default": -1000,
                    "subcategories": {
                        "REPAIR_SERVICES": {
                            "default": -1000,
                            "location_overrides": [
                                {"city": "moscow", "district": "szao", "chat_id": -1001}
                            ]
                        }
                    }
                }
            },
            "fallback": -999
        }"#;

        let dir = std::env::temp_dir();
        let path = dir.join(format!("ingest-router-test-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        let config = load_routing_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let domains = vec![RoutableDomain {
            domain: "CONSTRUCTION_AND_REPAIR".to_string(),
            subcategories: vec!["REPAIR_SERVICES".to_string()],
        }];
        let locations = vec![loc("moscow", "szao")];

        let result = get_chat_ids_for_domains(&config, &domains, &locations);
        assert_eq!(result, vec![-1001]);
    }

    #[test]
    fn muted_at_top_level_suppresses_domain() {
        let json = r#"{"domains": {"LAW": "muted"}, "fallback": -999}"#;
        let dir = std::env::temp_dir();
        let path = dir.join(format!("ingest-router-test2-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        let config = load_routing_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let domains = vec![RoutableDomain {
            domain: "LAW".to_string(),
            subcategories: vec!["LAWYER".to_string()],
        }];
        let result = get_chat_ids_for_domains(&config, &domains, &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn null_resolves_to_fallback() {
        let json = r#"{"domains": {"AUTO": null}, "fallback": -999}"#;
        let dir = std::env::temp_dir();
        let path = dir.join(format!("ingest-router-test3-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        let config = load_routing_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let domains = vec![RoutableDomain {
            domain: "AUTO".to_string(),
            subcategories: vec![],
        }];
        let result = get_chat_ids_for_domains(&config, &domains, &[]);
        assert_eq!(result, vec![-999]);
    }

    #[test]
    fn missing_fallback_is_fatal() {
        let json = r#"{"domains": {}}"#;
        let dir = std::env::temp_dir();
        let path = dir.join(format!("ingest-router-test4-{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();
        let result = load_routing_config(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
