//! Per-environment soundtrack candidates.
//!
//! Each environment maps to an ordered list of file names: the primary name
//! first, then spelling variants. The controller tries them in order.

use std::collections::HashMap;

use crate::config::AudioConfig;
use crate::environment::Environment;

/// Built-in track names for an environment.
pub fn default_tracks(environment: Environment) -> &'static [&'static str] {
    match environment {
        Environment::Valley => &["all the stars.mp3", "all_the_stars.mp3"],
        Environment::Forest => &["Espresso.mp3", "espresso.mp3"],
        Environment::Park => &["Nadaaniyan.mp3", "nadaaniyan.mp3"],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackCatalog {
    root: String,
    overrides: HashMap<Environment, Vec<String>>,
}

impl TrackCatalog {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            overrides: HashMap::new(),
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            root: config.root.clone(),
            overrides: config.tracks.clone(),
        }
    }

    /// Replace the candidate names for one environment.
    pub fn set_tracks(&mut self, environment: Environment, names: Vec<String>) {
        self.overrides.insert(environment, names);
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Resolved candidate sources for `environment`, duplicates removed
    /// (first occurrence wins) and empty names skipped.
    pub fn candidates(&self, environment: Environment) -> Vec<String> {
        let names: Vec<&str> = match self.overrides.get(&environment) {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => default_tracks(environment).to_vec(),
        };

        let mut out: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if name.trim().is_empty() {
                continue;
            }
            let source = self.resolve(name);
            if !out.contains(&source) {
                out.push(source);
            }
        }
        out
    }

    fn resolve(&self, name: &str) -> String {
        let root = self.root.trim_end_matches('/');
        if root.is_empty() {
            name.to_string()
        } else {
            format!("{root}/{name}")
        }
    }
}

impl Default for TrackCatalog {
    fn default() -> Self {
        Self::from_config(&AudioConfig::default())
    }
}
