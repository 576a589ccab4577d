use figment::{error::Kind, providers::Env, Figment};

use super::{types::Config, ConfigError};

/// Prefix shared by all recognized environment variables.
///
/// Nested sections use a double underscore, e.g. the generator API key is
/// read from `QUOTEPIPE_GENERATOR__API_KEY`.
pub const ENV_PREFIX: &str = "QUOTEPIPE_";

/// Load configuration from the process environment.
///
/// The environment is the sole configuration channel; a missing required
/// key fails with [`ConfigError::MissingKey`] naming the variable.
pub fn load_config() -> Result<Config, ConfigError> {
    Figment::new()
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| match &e.kind {
            Kind::MissingField(field) => ConfigError::MissingKey(env_key(&e.path, field)),
            _ => ConfigError::Parse(e.to_string()),
        })
}

/// Reconstruct the environment variable name for a missing field.
fn env_key(path: &[String], field: &str) -> String {
    let mut parts: Vec<String> = path.iter().map(|p| p.to_uppercase()).collect();
    parts.push(field.to_uppercase());
    format!("{}{}", ENV_PREFIX, parts.join("__"))
}
