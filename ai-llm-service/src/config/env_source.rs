//! Where configuration values come from.
//!
//! Production code reads the process environment through [`ProcessEnv`];
//! tests hand a `HashMap` to the same loaders instead of mutating the
//! process environment.

use std::collections::HashMap;

/// Read-only lookup of configuration variables by name.
pub trait EnvSource {
    /// Returns the raw value of `name`, or `None` when unset or not valid UTF-8.
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}
