//! `ingest-prefilter` — hot-reloaded substring/regex rule set that lets C7
//! short-circuit the LLM with a synthetic force/skip classification.

use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Instant, SystemTime};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Force,
    Skip,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    substrings: Vec<RawRule>,
    #[serde(default)]
    regexes: Vec<RawRule>,
}

#[derive(Debug, Deserialize, Clone)]
struct RawRule {
    pattern: String,
    action: String,
    #[serde(default)]
    ignore_case: Option<bool>,
}

struct SubstringRule {
    pattern: String,
    ignore_case: bool,
    action: Decision,
}

struct RegexRule {
    pattern: String,
    compiled: Regex,
    action: Decision,
}

struct Rules {
    substrings: Vec<SubstringRule>,
    regexes: Vec<RegexRule>,
    enabled: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            substrings: Vec::new(),
            regexes: Vec::new(),
            enabled: false,
        }
    }
}

struct ReloadState {
    rules: Rules,
    last_mtime: Option<SystemTime>,
    last_check: Option<Instant>,
}

/// Process-wide prefilter, hot-reloaded from `config_path` at most once
/// every `reload_interval`. A parse failure or missing-file-turned-back
/// keeps the previous rule set (§7 observability-only error kind).
pub struct Prefilter {
    config_path: Option<PathBuf>,
    reload_interval: std::time::Duration,
    state: Mutex<ReloadState>,
}

impl Prefilter {
    pub fn new(config_path: Option<PathBuf>, reload_interval_secs: u64) -> Self {
        Self {
            config_path,
            reload_interval: std::time::Duration::from_secs(reload_interval_secs.max(1)),
            state: Mutex::new(ReloadState {
                rules: Rules::default(),
                last_mtime: None,
                last_check: None,
            }),
        }
    }

    /// Matches `text` against the current rule set. Empty ruleset (or no
    /// config path configured) always returns `(None, [])` (§8 boundary
    /// behavior).
    pub fn match_text(&self, text: &str) -> (Option<Decision>, Vec<String>) {
        if text.is_empty() {
            return (None, Vec::new());
        }
        self.maybe_reload();

        let state = self.state.lock().unwrap();
        if !state.rules.enabled {
            return (None, Vec::new());
        }

        let mut matched = Vec::new();
        let mut force = false;
        let mut skip = false;

        if !state.rules.substrings.is_empty() {
            let lower = text.to_lowercase();
            for rule in &state.rules.substrings {
                let hit = if rule.ignore_case {
                    lower.contains(&rule.pattern.to_lowercase())
                } else {
                    text.contains(&rule.pattern)
                };
                if hit {
                    matched.push(rule.pattern.clone());
                    match rule.action {
                        Decision::Force => force = true,
                        Decision::Skip => skip = true,
                    }
                }
            }
        }

        for rule in &state.rules.regexes {
            if rule.compiled.is_match(text) {
                matched.push(rule.pattern.clone());
                match rule.action {
                    Decision::Force => force = true,
                    Decision::Skip => skip = true,
                }
            }
        }

        if matched.is_empty() {
            return (None, Vec::new());
        }

        let mut seen = std::collections::HashSet::new();
        let deduped: Vec<String> = matched.into_iter().filter(|m| seen.insert(m.clone())).collect();

        if force {
            (Some(Decision::Force), deduped)
        } else if skip {
            (Some(Decision::Skip), deduped)
        } else {
            (None, deduped)
        }
    }

    fn maybe_reload(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        {
            let state = self.state.lock().unwrap();
            if let Some(last) = state.last_check {
                if last.elapsed() < self.reload_interval {
                    return;
                }
            }
        }
        let mut state = self.state.lock().unwrap();
        state.last_check = Some(Instant::now());
        self.reload_locked(path, &mut state);
    }

    fn reload_locked(&self, path: &PathBuf, state: &mut ReloadState) {
        let meta = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(_) => {
                state.rules = Rules::default();
                state.last_mtime = None;
                return;
            }
        };
        let mtime = match meta.modified() {
            Ok(m) => m,
            Err(_) => return,
        };
        if state.last_mtime == Some(mtime) {
            return;
        }

        let raw = match std::fs::read_to_string(path) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "prefilter: failed to read config, keeping prior rules");
                return;
            }
        };
        let parsed: RuleFile = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "prefilter: failed to parse config, keeping prior rules");
                return;
            }
        };

        let substrings = build_substring_rules(&parsed.substrings);
        let regexes = build_regex_rules(&parsed.regexes);
        let enabled = !substrings.is_empty() || !regexes.is_empty();

        state.rules = Rules {
            substrings,
            regexes,
            enabled,
        };
        state.last_mtime = Some(mtime);
    }
}

fn parse_action(action: &str) -> Option<Decision> {
    match action {
        "force" => Some(Decision::Force),
        "skip" => Some(Decision::Skip),
        _ => None,
    }
}

fn build_substring_rules(items: &[RawRule]) -> Vec<SubstringRule> {
    items
        .iter()
        .filter(|r| !r.pattern.is_empty())
        .filter_map(|r| {
            let action = parse_action(&r.action)?;
            Some(SubstringRule {
                pattern: r.pattern.clone(),
                ignore_case: r.ignore_case.unwrap_or(true),
                action,
            })
        })
        .collect()
}

fn build_regex_rules(items: &[RawRule]) -> Vec<RegexRule> {
    items
        .iter()
        .filter(|r| !r.pattern.is_empty())
        .filter_map(|r| {
            let action = parse_action(&r.action)?;
            let pattern = if r.ignore_case.unwrap_or(false) {
                format!("(?i){}", r.pattern)
            } else {
                r.pattern.clone()
            };
            let compiled = Regex::new(&pattern).ok()?;
            Some(RegexRule {
                pattern: r.pattern.clone(),
                compiled,
                action,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_ruleset_never_matches() {
        let pf = Prefilter::new(None, 1);
        assert_eq!(pf.match_text("пожар"), (None, Vec::new()));
    }

    #[test]
    fn force_rule_wins_and_reloads() {
        let mut file = tempfile_json(r#"{"substrings":[{"pattern":"пожар","action":"force"}]}"#);
        let pf = Prefilter::new(Some(file.path()), 0);
        let (decision, matched) = pf.match_text("У нас пожар в подъезде");
        assert_eq!(decision, Some(Decision::Force));
        assert_eq!(matched, vec!["пожар".to_string()]);
        file.flush().ok();
    }

    struct TmpJson {
        path: PathBuf,
    }
    impl TmpJson {
        fn path(&self) -> PathBuf {
            self.path.clone()
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    impl Drop for TmpJson {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn tempfile_json(contents: &str) -> TmpJson {
        let mut path = std::env::temp_dir();
        path.push(format!("ingest-prefilter-test-{}.json", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        TmpJson { path }
    }
}
