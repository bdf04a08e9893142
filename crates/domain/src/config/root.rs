use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::resolver::ResolverConfig;
use crate::address::{Address, Protocol};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub recursive: Option<bool>,
    pub nameservers: Option<Vec<String>>,
    pub timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load from a TOML file (or defaults when no path is given) and apply
    /// command-line overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(recursive) = overrides.recursive {
            self.resolver.recursive = recursive;
        }
        if let Some(nameservers) = overrides.nameservers {
            self.resolver.nameservers = nameservers;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.resolver.timeout_ms = timeout_ms;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolver = &self.resolver;

        if resolver.timeout_ms == 0 || resolver.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "timeout_ms and request_timeout_ms must be greater than zero".into(),
            ));
        }
        if resolver.max_cname_hops == 0 {
            return Err(ConfigError::Invalid(
                "max_cname_hops must be greater than zero".into(),
            ));
        }
        if resolver.cache_max_entries == 0 {
            return Err(ConfigError::Invalid(
                "cache_max_entries must be greater than zero".into(),
            ));
        }

        resolver
            .referral_protocol
            .parse::<Protocol>()
            .map_err(|e| ConfigError::Invalid(format!("referral_protocol: {}", e)))?;

        let zone_servers = resolver.forward_zones.iter().flat_map(|z| z.servers.iter());
        for server in resolver.nameservers.iter().chain(zone_servers) {
            server
                .parse::<Address>()
                .map_err(|e| ConfigError::Invalid(format!("name server '{}': {}", server, e)))?;
        }

        for record in &resolver.static_records {
            record.to_record().map_err(|e| {
                ConfigError::Invalid(format!("static record '{}': {}", record.name, e))
            })?;
        }

        Ok(())
    }
}
