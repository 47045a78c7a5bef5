//! Per-render request tokens.
//!
//! Each widget page render mints one token; the proxy only forwards
//! messages that present a live one. A token stays valid for the configured
//! TTL from its issue time (12 hours unless overridden) and is reusable for
//! any number of sends from that page within the window. Expired entries
//! are pruned on every issue/validate so the store stays bounded by live
//! renders.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

pub struct TokenStore {
    ttl: Duration,
    issued: Mutex<HashMap<String, Instant>>,
}

impl TokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Mints a fresh token for one page render.
    pub fn issue(&self) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut issued = self.issued.lock().unwrap();
        Self::prune(&mut issued, self.ttl);
        issued.insert(token.clone(), Instant::now());
        token
    }

    pub fn validate(&self, token: &str) -> bool {
        let mut issued = self.issued.lock().unwrap();
        Self::prune(&mut issued, self.ttl);
        issued.contains_key(token)
    }

    fn prune(issued: &mut HashMap<String, Instant>, ttl: Duration) {
        issued.retain(|_, issued_at| issued_at.elapsed() <= ttl);
    }

    #[cfg(test)]
    fn live_tokens(&self) -> usize {
        self.issued.lock().unwrap().len()
    }
}
