//! Command implementations.

mod detect;
mod process;
mod split;

pub use detect::execute_detect;
pub use process::execute_process;
pub use split::execute_split;

use anyhow::{Context, Result};
use secstruct_engine::EngineConfig;
use std::path::Path;

/// Load the engine configuration from a TOML file, or fall back to defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            EngineConfig::from_toml(&text).map_err(anyhow::Error::msg)?
        }
        None => EngineConfig::default(),
    };
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

/// Read a filing document as UTF-8 text.
pub(crate) fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read filing {}", path.display()))
}

/// Write JSON to the output path, or stdout when none was given.
pub(crate) fn write_json(output: Option<&Path>, json: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write output {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
