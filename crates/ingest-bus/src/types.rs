/// The two durable fanout lanes §6 requires: realtime listener events and
/// historical backfill events, each with its own exchange+queue pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Realtime,
    Historical,
}

impl Lane {
    pub fn exchange(self) -> &'static str {
        match self {
            Lane::Realtime => "realtime_fanout",
            Lane::Historical => "historical_fanout",
        }
    }

    pub fn queue(self) -> &'static str {
        match self {
            Lane::Realtime => "realtime_raw",
            Lane::Historical => "historical_raw",
        }
    }
}
