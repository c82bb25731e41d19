//! Registry of setting handlers.

use std::collections::HashMap;

use super::handlers::{
    direct_fallback_handler, min_priority_handler, overlap_policy_handler, HistorySizeHandler,
    LogFilterHandler, TranscriptHandler,
};
use super::SettingHandler;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `murmur set` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        // Register handlers in display order
        registry.register(Box::new(overlap_policy_handler()));
        registry.register(Box::new(min_priority_handler()));
        registry.register(Box::new(HistorySizeHandler));
        registry.register(Box::new(direct_fallback_handler()));
        registry.register(Box::new(LogFilterHandler));
        registry.register(Box::new(TranscriptHandler));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key. Underscored spellings from the config file are
    /// accepted too.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        let key = key.trim().to_ascii_lowercase().replace('_', "-");
        self.handlers.get(key.as_str()).map(|h| h.as_ref())
    }

    /// Get all keys in sorted order.
    pub fn keys_sorted(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.handlers.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
