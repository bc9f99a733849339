use std::collections::BTreeMap;
use std::time::Duration;

use crate::events::EventBus;
use crate::hooks::{Hook, HookRegistry};

/// Budget for the websocket connect and upgrade before the attempt is
/// abandoned in favor of transport degradation.
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_millis(2500);

/// Connect-time configuration for a live session.
pub struct SessionConfig {
    pub fallback_timeout: Duration,
    /// Outbound parameters delivered in the handshake, e.g. `csrf_token`.
    pub params: BTreeMap<String, String>,
    /// Hooks available to server-driven element bindings.
    pub hooks: HookRegistry,
    /// Development build flag; gates the live-reload diagnostic channel.
    pub dev: bool,
    /// Page-event bus to publish lifecycle events on. A fresh bus is created
    /// when not supplied.
    pub bus: Option<EventBus>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
            params: BTreeMap::new(),
            hooks: HookRegistry::standard(),
            dev: cfg!(debug_assertions),
            bus: None,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout = timeout;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn csrf_token(self, token: impl Into<String>) -> Self {
        self.param("csrf_token", token)
    }

    pub fn hook(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Hook> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.register(name, factory);
        self
    }

    pub fn dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bootstrap_contract() {
        let config = SessionConfig::new();
        assert_eq!(config.fallback_timeout, Duration::from_millis(2500));
        assert!(config.params.is_empty());
        assert!(config.bus.is_none());
    }

    #[test]
    fn csrf_token_lands_in_params() {
        let config = SessionConfig::new().csrf_token("tok");
        assert_eq!(config.params.get("csrf_token").map(String::as_str), Some("tok"));
    }
}
