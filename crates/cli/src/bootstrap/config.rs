use delve_dns_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        recursive = config.resolver.recursive,
        nameservers = config.resolver.nameservers.len(),
        timeout_ms = config.resolver.timeout_ms,
        "Configuration loaded"
    );

    Ok(config)
}
