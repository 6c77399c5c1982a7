//! Shared resolution helpers for CLI commands.

use std::path::PathBuf;

use skyport::catalog::{HttpCatalog, HttpCatalogBuilder};
use skyport::config::ConfigFile;
use skyport::filter::MatchRule;

use crate::error::CliError;

/// Load the user's config, falling back to defaults on any problem.
pub fn load_config() -> ConfigFile {
    ConfigFile::load().unwrap_or_default()
}

/// Resolve the catalog endpoint: CLI flag first, then config.
pub fn require_endpoint(cli: Option<String>, config: &ConfigFile) -> Result<String, CliError> {
    cli.or_else(|| config.remote.endpoint.clone())
        .ok_or_else(|| {
            CliError::Config(
                "No catalog endpoint specified. Use --endpoint or set remote.endpoint \
                 with 'skyport config set'."
                    .to_string(),
            )
        })
}

/// Resolve the release channel: CLI flag first, then config.
pub fn resolve_channel(cli: Option<String>, config: &ConfigFile) -> Option<String> {
    cli.or_else(|| config.remote.channel.clone())
}

/// Resolve the destination directory: CLI flag, config, then `./bundles`.
pub fn resolve_dir(cli: Option<PathBuf>, config: &ConfigFile) -> PathBuf {
    cli.or_else(|| config.sync.dir.clone())
        .unwrap_or_else(|| PathBuf::from("bundles"))
}

/// Start building a catalog client for the given endpoint.
pub fn catalog_builder(endpoint: &str) -> HttpCatalogBuilder {
    HttpCatalog::builder().endpoint(endpoint)
}

/// Turn CLI pattern strings into match rules.
///
/// Patterns are glob-style by default; a `re:` prefix switches a pattern
/// to regex matching.
pub fn parse_rules(patterns: &[String]) -> Result<Vec<MatchRule>, CliError> {
    patterns
        .iter()
        .map(|pattern| {
            if let Some(raw) = pattern.strip_prefix("re:") {
                regex::Regex::new(raw)
                    .map(MatchRule::regex)
                    .map_err(|e| CliError::Config(format!("invalid regex '{}': {}", raw, e)))
            } else {
                Ok(MatchRule::name(pattern))
            }
        })
        .collect()
}
