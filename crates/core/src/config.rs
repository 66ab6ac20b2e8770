use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chunking: ChunkingSettings,
    pub reconcile: ReconcileSettings,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DOCCHAT_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DOCCHAT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let chunking = ChunkingSettings::from_env_profiled(p);
        let reconcile = ReconcileSettings::from_env_profiled(p, chunking.max_tokens_per_chunk);
        Self {
            profile: p.to_string(),
            chunking,
            reconcile,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:    max_tokens={}, overlap={}",
            self.chunking.max_tokens_per_chunk,
            self.chunking.token_overlap
        );
        tracing::info!(
            "  reconcile:   min_tokens={}, max_tokens={}",
            self.reconcile.min_tokens_per_chunk,
            self.reconcile.max_tokens_per_chunk
        );
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingSettings {
    pub max_tokens_per_chunk: usize,
    pub token_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 500,
            token_overlap: 50,
        }
    }
}

impl ChunkingSettings {
    fn from_env_profiled(p: &str) -> Self {
        let defaults = Self::default();
        Self {
            max_tokens_per_chunk: profiled_env_usize(
                p,
                "CHUNK_MAX_TOKENS",
                defaults.max_tokens_per_chunk,
            ),
            token_overlap: profiled_env_usize(p, "CHUNK_OVERLAP_TOKENS", defaults.token_overlap),
        }
    }
}

// ── Reconciliation ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileSettings {
    pub min_tokens_per_chunk: usize,
    pub max_tokens_per_chunk: usize,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            min_tokens_per_chunk: 50,
            max_tokens_per_chunk: ChunkingSettings::default().max_tokens_per_chunk,
        }
    }
}

impl ReconcileSettings {
    fn from_env_profiled(p: &str, chunk_max: usize) -> Self {
        Self {
            min_tokens_per_chunk: profiled_env_usize(p, "CHUNK_MIN_TOKENS", 50),
            max_tokens_per_chunk: profiled_env_usize(p, "RECONCILE_MAX_TOKENS", chunk_max),
        }
    }
}
