//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use mixer_core::{PoolConfig, PoolError, DEFAULT_DENOMINATION, DEFAULT_HEIGHT};

#[derive(Debug, Clone, Parser)]
#[command(name = "mixer-pool-server", about = "HTTP API hosting a mixer pool")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "MIXER_LISTEN", default_value = "0.0.0.0:3001")]
    pub listen: SocketAddr,

    /// Merkle tree height
    #[arg(long, env = "MIXER_HEIGHT", default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Fixed deposit amount, in the asset's smallest unit
    #[arg(long, env = "MIXER_DENOMINATION", default_value_t = DEFAULT_DENOMINATION)]
    pub denomination: u128,

    /// Directory holding (or receiving) the withdraw circuit keys
    #[arg(long, env = "MIXER_KEYS_DIR", default_value = "keys")]
    pub keys_dir: PathBuf,

    /// State file holding the pool snapshot and ledger; restored on start and saved after each change
    #[arg(long, env = "MIXER_STATE_FILE")]
    pub state_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn pool_config(&self) -> Result<PoolConfig, PoolError> {
        let config = PoolConfig::new(self.height, self.denomination);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::parse_from(["mixer-pool-server"]);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.denomination, DEFAULT_DENOMINATION);
        assert_eq!(config.listen.port(), 3001);
        assert!(config.state_file.is_none());
    }

    #[test]
    fn test_flags() {
        let config = ServerConfig::parse_from([
            "mixer-pool-server",
            "--height",
            "8",
            "--denomination",
            "100000000000000000000",
            "--state-file",
            "/tmp/pool.bin",
        ]);
        assert_eq!(config.height, 8);
        assert_eq!(config.denomination, 100_000_000_000_000_000_000);
        assert!(config.pool_config().is_ok());
    }

    #[test]
    fn test_invalid_pool_config() {
        let config = ServerConfig::parse_from(["mixer-pool-server", "--height", "40"]);
        assert!(config.pool_config().is_err());
    }
}
