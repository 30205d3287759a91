use std::sync::Arc;

use super::{config::Config, csp::CspViolation, guests::GuestEntry, store::MemoryStore};

pub struct AppState {
    pub config: Config,
    pub guests: MemoryStore<GuestEntry>,
    pub reports: MemoryStore<CspViolation>,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            guests: MemoryStore::new(),
            reports: MemoryStore::new(),
        })
    }
}
