use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codes::{Domain, Intent};

/// One domain + the subcategory names matched within it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainInfo {
    pub domain: &'static str,
    pub subcategories: Vec<&'static str>,
}

/// A fully decoded classification line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedMessage {
    pub id: String,
    pub intents: Vec<&'static str>,
    pub domains: Vec<DomainInfo>,
    pub is_spam: bool,
    pub urgency_score: i32,
    pub reasoning: String,
}

#[derive(Debug, Error)]
pub enum CompactParseError {
    #[error("invalid line format (expected 7 parts): {0}")]
    BadShape(String),
    #[error("missing message id in line: {0}")]
    MissingId(String),
    #[error("invalid code value: {0}")]
    InvalidCode(String),
    #[error("unknown intent code: {0}")]
    UnknownIntent(i32),
    #[error("unknown domain code: {0}")]
    UnknownDomain(i32),
    #[error("unknown subcategory code {0} for domain code {1}")]
    UnknownSubcategory(i32, i32),
    #[error("subcategories not allowed for NONE domain")]
    SubcategoriesOnNone,
    #[error("subcategory entries for non-selected domains: {0:?}")]
    OrphanSubcategories(Vec<i32>),
    #[error("invalid spam flag: {0}")]
    InvalidSpam(String),
    #[error("urgency out of range (1..5): {0}")]
    UrgencyOutOfRange(i32),
}

/// A line that failed to parse, retaining whatever id could be salvaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineError {
    pub id: String,
    pub line: String,
    pub error: String,
}

fn parse_int_code(raw: &str) -> Result<i32, CompactParseError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| CompactParseError::InvalidCode(raw.to_string()))
}

fn parse_code_list(raw: &str) -> Result<Vec<i32>, CompactParseError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| CompactParseError::InvalidCode(s.to_string()))
        })
        .collect()
}

/// Parses the `<sub-block>` segment: `domain=subcode,subcode;domain=subcode`.
/// A bare code list with no `=` continues the most recently seen domain.
fn parse_subcategory_map(segment: &str) -> Result<Vec<(i32, Vec<i32>)>, CompactParseError> {
    let mut out: Vec<(i32, Vec<i32>)> = Vec::new();
    if segment.trim().is_empty() {
        return Ok(out);
    }
    let mut tokens = Vec::new();
    for part in segment.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        for item in part.split(',') {
            let item = item.trim();
            if !item.is_empty() {
                tokens.push(item.to_string());
            }
        }
    }

    let mut current_domain: Option<i32> = None;
    for token in tokens {
        if let Some((domain_str, sub_str)) = token.split_once('=') {
            let domain_code = parse_int_code(domain_str)?;
            if sub_str.trim().is_empty() {
                return Err(CompactParseError::InvalidCode(token));
            }
            current_domain = Some(domain_code);
            let subcodes = parse_code_list(sub_str)?;
            push_subcodes(&mut out, domain_code, subcodes);
        } else {
            let domain_code = current_domain
                .ok_or_else(|| CompactParseError::InvalidCode(token.clone()))?;
            let subcodes = parse_code_list(&token)?;
            push_subcodes(&mut out, domain_code, subcodes);
        }
    }
    Ok(out)
}

fn push_subcodes(out: &mut Vec<(i32, Vec<i32>)>, domain_code: i32, subcodes: Vec<i32>) {
    if let Some(entry) = out.iter_mut().find(|(d, _)| *d == domain_code) {
        entry.1.extend(subcodes);
    } else {
        out.push((domain_code, subcodes));
    }
}

/// Parses a single compact-protocol line:
/// `<id>|<intent-code>|<domain-codes-csv>|<sub-block>|<spam 0/1>|<urgency 1..5>|<reasoning>`
pub fn parse_compact_line(line: &str) -> Result<ClassifiedMessage, CompactParseError> {
    let parts: Vec<&str> = line.splitn(7, '|').collect();
    if parts.len() != 7 {
        return Err(CompactParseError::BadShape(line.to_string()));
    }
    let msg_id = parts[0].trim();
    let intent_raw = parts[1].trim();
    let domains_raw = parts[2].trim();
    let subcats_raw = parts[3].trim();
    let spam_raw = parts[4].trim();
    let urgency_raw = parts[5].trim();
    let reasoning = parts[6].trim();

    if msg_id.is_empty() {
        return Err(CompactParseError::MissingId(line.to_string()));
    }

    let intent_code = parse_int_code(intent_raw)?;
    let intent = Intent::from_code(intent_code)
        .ok_or(CompactParseError::UnknownIntent(intent_code))?;

    let mut domain_codes = if domains_raw.is_empty() {
        Vec::new()
    } else {
        parse_code_list(domains_raw)?
    };
    if domain_codes.is_empty() {
        domain_codes.push(Domain::None_.code());
    }
    let mut subcat_map = parse_subcategory_map(subcats_raw)?;

    let none_code = Domain::None_.code();
    if domain_codes.contains(&none_code) && domain_codes.len() > 1 {
        domain_codes.retain(|c| *c != none_code);
        subcat_map.retain(|(d, _)| *d != none_code);
    }

    let selected: std::collections::HashSet<i32> = domain_codes.iter().copied().collect();
    let orphans: Vec<i32> = subcat_map
        .iter()
        .map(|(d, _)| *d)
        .filter(|d| !selected.contains(d))
        .collect();
    if !orphans.is_empty() {
        let mut orphans = orphans;
        orphans.sort_unstable();
        orphans.dedup();
        return Err(CompactParseError::OrphanSubcategories(orphans));
    }

    let mut domains = Vec::with_capacity(domain_codes.len());
    for domain_code in domain_codes {
        let domain = Domain::from_code(domain_code)
            .ok_or(CompactParseError::UnknownDomain(domain_code))?;
        let subcodes = subcat_map
            .iter()
            .find(|(d, _)| *d == domain_code)
            .map(|(_, s)| s.clone())
            .unwrap_or_default();
        if domain.as_str() == Domain::None_.as_str() && !subcodes.is_empty() {
            return Err(CompactParseError::SubcategoriesOnNone);
        }
        let mut subcategories = Vec::with_capacity(subcodes.len());
        for sub_code in subcodes {
            let name = domain
                .subcategory_name(sub_code)
                .ok_or(CompactParseError::UnknownSubcategory(sub_code, domain_code))?;
            subcategories.push(name);
        }
        domains.push(DomainInfo {
            domain: domain.as_str(),
            subcategories,
        });
    }

    if spam_raw != "0" && spam_raw != "1" {
        return Err(CompactParseError::InvalidSpam(spam_raw.to_string()));
    }
    let is_spam = spam_raw == "1";

    let urgency_score = parse_int_code(urgency_raw)?;
    if !(1..=5).contains(&urgency_score) {
        return Err(CompactParseError::UrgencyOutOfRange(urgency_score));
    }

    Ok(ClassifiedMessage {
        id: msg_id.to_string(),
        intents: vec![intent.as_str()],
        domains,
        is_spam,
        urgency_score,
        reasoning: reasoning.to_string(),
    })
}

/// Best-effort batch parse: every non-blank line ends up in exactly one of
/// the two returned lists (§8 testable property).
pub fn parse_compact_batch_partial(text: &str) -> (Vec<ClassifiedMessage>, Vec<LineError>) {
    let mut messages = Vec::new();
    let mut errors = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_compact_line(line) {
            Ok(msg) => messages.push(msg),
            Err(e) => {
                let id = line.split('|').next().unwrap_or("").trim().to_string();
                errors.push(LineError {
                    id,
                    line: line.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    (messages, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_line() {
        let line = "1|1|1|1=2|0|3|Ищет ремонтную бригаду";
        let parsed = parse_compact_line(line).unwrap();
        assert_eq!(parsed.id, "1");
        assert_eq!(parsed.intents, vec!["REQUEST"]);
        assert_eq!(parsed.domains.len(), 1);
        assert_eq!(parsed.domains[0].domain, "CONSTRUCTION_AND_REPAIR");
        assert_eq!(parsed.domains[0].subcategories, vec!["REPAIR_SERVICES"]);
        assert!(!parsed.is_spam);
        assert_eq!(parsed.urgency_score, 3);
    }

    #[test]
    fn coalesces_none_with_real_domain() {
        let line = "2|6|12,1||0|1|spam-ish";
        let parsed = parse_compact_line(line).unwrap();
        assert_eq!(parsed.domains.len(), 1);
        assert_eq!(parsed.domains[0].domain, "CONSTRUCTION_AND_REPAIR");
    }

    #[test]
    fn rejects_orphan_subcategory() {
        let line = "3|1|1|2=1|0|1|x";
        assert!(parse_compact_line(line).is_err());
    }

    #[test]
    fn partial_batch_splits_good_and_bad() {
        let text = "1|1|1|1=2|0|3|ok\nbad-line\n2|6||0,|1|2|ok2";
        let (ok, err) = parse_compact_batch_partial(text);
        assert_eq!(ok.len() + err.len(), 3);
        assert!(!err.is_empty());
    }
}
