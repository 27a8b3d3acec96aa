use ferrous_pdns_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    if let Some(source) = path.map(str::to_string).or_else(Config::get_config_path) {
        info!(path = %source, "Configuration loaded");
    }

    Ok(config)
}
