//! Parameter store resolution for the CLI.

use std::path::{Path, PathBuf};

use infra_config::FrtbConfig;
use tracing::info;

use crate::Result;

/// Environment variable naming a parameter file.
pub const ENV_CONFIG: &str = "FRTB_CONFIG";

/// Loads the parameter store.
///
/// Precedence: the `--config` flag, then `FRTB_CONFIG`, then the embedded
/// BCBS set. Environment overrides are applied and the result validated in
/// every case.
pub fn load(flag: Option<&Path>) -> Result<FrtbConfig> {
    let from_env = std::env::var_os(ENV_CONFIG).map(PathBuf::from);
    let config = match flag.map(Path::to_path_buf).or(from_env) {
        Some(path) => {
            info!("Loading parameters from {}", path.display());
            FrtbConfig::load_with_env_and_validate(&path)?
        }
        None => {
            info!("Using embedded BCBS parameters");
            let config = FrtbConfig::bcbs()?.with_env_override();
            config.validate()?;
            config
        }
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra_config::store::BCBS_TOML;
    use std::io::Write;

    #[test]
    fn test_flag_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BCBS_TOML.as_bytes()).unwrap();
        let config = load(Some(file.path())).unwrap();
        assert!(!config.asset_classes.is_empty());
    }

    #[test]
    fn test_missing_flag_path_fails() {
        assert!(load(Some(Path::new("/nonexistent/frtb.toml"))).is_err());
    }
}
