use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Instant, SystemTime};

use ingest_core::types::Location;
use ingest_router::{load_routing_config, RoutableDomain, RoutingConfig};
use tracing::warn;

/// Hot-reloaded wrapper around the routing table (§4.11), mtime-gated the
/// same way `ingest-prefilter` reloads its rule file — `ingest-router`
/// itself only exposes a one-shot loader.
pub struct RoutingTable {
    path: PathBuf,
    reload_interval: std::time::Duration,
    state: Mutex<State>,
}

struct State {
    config: Option<RoutingConfig>,
    last_mtime: Option<SystemTime>,
    last_check: Option<Instant>,
}

impl RoutingTable {
    pub fn load(path: PathBuf, reload_interval_secs: u64) -> Self {
        let mut state = State {
            config: None,
            last_mtime: None,
            last_check: None,
        };
        reload_locked(&path, &mut state);
        Self {
            path,
            reload_interval: std::time::Duration::from_secs(reload_interval_secs.max(1)),
            state: Mutex::new(state),
        }
    }

    pub fn get_chat_ids(&self, domains: &[RoutableDomain], locations: &[Location]) -> Vec<i64> {
        self.maybe_reload();
        let state = self.state.lock().unwrap();
        match &state.config {
            Some(cfg) => ingest_router::get_chat_ids_for_domains(cfg, domains, locations),
            None => Vec::new(),
        }
    }

    fn maybe_reload(&self) {
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
        reload_locked(&self.path, &mut state);
    }
}

fn reload_locked(path: &PathBuf, state: &mut State) {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            if state.config.is_none() {
                warn!(error = %e, ?path, "routing config unreadable at startup, routing disabled");
            }
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

    match load_routing_config(path) {
        Ok(cfg) => {
            state.config = Some(cfg);
            state.last_mtime = Some(mtime);
        }
        Err(e) => {
            warn!(error = %e, ?path, "routing config reload failed, keeping prior table");
        }
    }
}
