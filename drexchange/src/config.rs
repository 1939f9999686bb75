//! Layered configuration for the command-line tool.
//!
//! Sources, lowest precedence first: built-in defaults, the TOML file given
//! with `--config`, then environment variables.

use dre_exchange::ExchangeConfig;
use std::path::Path;

/// Load the exchange configuration.
///
/// Environment variables are mapped using the pattern
/// `DRE_<SECTION>__<KEY>` to `<section>.<key>`:
///
/// ```bash
/// export DRE_SOLVER__BACKEND="clarabel"
/// export DRE_SOLVER__TIME_LIMIT="2s"
/// ```
pub fn load(path: Option<&Path>) -> anyhow::Result<ExchangeConfig> {
    let mut config = config::Config::builder();

    config = config.add_source(config::Config::try_from(&ExchangeConfig::default())?);

    if let Some(path) = path {
        if path.exists() {
            config = config.add_source(config::File::from(path));
        } else {
            return Err(anyhow::anyhow!(
                "config file {} does not exist",
                path.display()
            ));
        }
    }

    // DRE_SOLVER__NODE_LIMIT maps to solver.node_limit
    config = config.add_source(
        config::Environment::with_prefix("DRE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    config.build()?.try_deserialize().map_err(Into::into)
}
