use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub surrealdb_address: String,
    pub surrealdb_username: String,
    pub surrealdb_password: String,
    pub surrealdb_namespace: String,
    pub surrealdb_database: String,
    pub http_port: u16,
    #[serde(default = "default_summary_api_base")]
    pub summary_api_base: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_max_terms_per_cycle")]
    pub max_terms_per_cycle: usize,
    #[serde(default = "default_max_fetch_candidates")]
    pub max_fetch_candidates: usize,
}

fn default_summary_api_base() -> String {
    "https://es.wikipedia.org/api/rest_v1/page/summary".to_string()
}

fn default_language() -> String {
    "es".to_string()
}

/// Caps how many newly discovered terms one cycle may persist. Relationship
/// reinforcement is pairwise over the new-term batch, so cycle cost grows
/// quadratically with this value.
fn default_max_terms_per_cycle() -> usize {
    24
}

/// Upper bound on pending topics tried per cycle when no explicit topic is
/// supplied and a candidate's summary turns out not to exist.
fn default_max_fetch_candidates() -> usize {
    3
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
