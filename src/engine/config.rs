// Wallet Engine — Configuration
// EngineConfig: TOML-backed settings injected at construction time in place
// of compiled-in endpoints, slippage and asset tables.
//
// Parsing is pure (`from_toml_str`); `load` is the only filesystem access.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::keystore::FileKeystore;
use super::sol_dex::constants::{DEFAULT_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS, NETWORK_ENDPOINTS};
use crate::atoms::constants::{
    DEFAULT_CONFIRM_POLL_INTERVAL_MS, DEFAULT_CONFIRM_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    MAX_TIMEOUT_SECS,
};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{Commitment, Pubkey};

/// One `[[assets]]` entry: a token the registry should know by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub symbol: String,
    pub mint: String,
    pub decimals: u8,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// `mainnet` | `testnet` | `devnet` | `localhost`. Ignored when `rpc_url` is set.
    pub network: String,
    pub rpc_url: Option<String>,
    pub quote_api_url: Option<String>,
    /// Sent as `x-api-key` to the quote service.
    pub quote_api_key: Option<String>,
    pub default_slippage_bps: u16,
    pub max_slippage_bps: u16,
    pub commitment: Commitment,
    pub request_timeout_secs: u64,
    pub confirm_timeout_secs: u64,
    pub confirm_poll_interval_ms: u64,
    pub keystore_dir: Option<PathBuf>,
    pub assets: Vec<AssetEntry>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network: "mainnet".into(),
            rpc_url: None,
            quote_api_url: None,
            quote_api_key: None,
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            max_slippage_bps: MAX_SLIPPAGE_BPS,
            commitment: Commitment::Confirmed,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            confirm_timeout_secs: DEFAULT_CONFIRM_TIMEOUT_SECS,
            confirm_poll_interval_ms: DEFAULT_CONFIRM_POLL_INTERVAL_MS,
            keystore_dir: None,
            assets: Vec::new(),
        }
    }
}

// API key stays out of logs.
impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("network", &self.network)
            .field("rpc_url", &self.rpc_url)
            .field("quote_api_url", &self.quote_api_url)
            .field("quote_api_key", &self.quote_api_key.as_ref().map(|_| "<redacted>"))
            .field("default_slippage_bps", &self.default_slippage_bps)
            .field("max_slippage_bps", &self.max_slippage_bps)
            .field("commitment", &self.commitment)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("confirm_timeout_secs", &self.confirm_timeout_secs)
            .field("confirm_poll_interval_ms", &self.confirm_poll_interval_ms)
            .field("keystore_dir", &self.keystore_dir)
            .field("assets", &self.assets.len())
            .finish()
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| EngineError::Config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Explicit `rpc_url`, else the public endpoint of `network`.
    pub fn rpc_endpoint(&self) -> EngineResult<String> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        NETWORK_ENDPOINTS.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(self.network.trim()))
            .map(|(_, url)| url.to_string())
            .ok_or_else(|| EngineError::Config(format!(
                "unknown network '{}' (expected mainnet, testnet, devnet or localhost)", self.network
            )))
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.rpc_endpoint()?;
        if self.max_slippage_bps > 10_000 {
            return Err(EngineError::Config(format!(
                "max_slippage_bps {} exceeds 10000 (100%)", self.max_slippage_bps
            )));
        }
        if self.default_slippage_bps > self.max_slippage_bps {
            return Err(EngineError::Config(format!(
                "default_slippage_bps {} exceeds max_slippage_bps {}",
                self.default_slippage_bps, self.max_slippage_bps
            )));
        }
        if self.request_timeout_secs == 0 || self.confirm_timeout_secs == 0 || self.confirm_poll_interval_ms == 0 {
            return Err(EngineError::Config("timeouts and poll interval must be non-zero".into()));
        }
        for (name, secs) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("confirm_timeout_secs", self.confirm_timeout_secs),
            ("confirm_poll_interval_ms", self.confirm_poll_interval_ms / 1000),
        ] {
            if secs > MAX_TIMEOUT_SECS {
                return Err(EngineError::Config(format!(
                    "{name} exceeds the {MAX_TIMEOUT_SECS}s limit"
                )));
            }
        }
        for asset in &self.assets {
            if asset.symbol.trim().is_empty() {
                return Err(EngineError::Config("asset entry with empty symbol".into()));
            }
            asset.mint.parse::<Pubkey>()
                .map_err(|e| EngineError::Config(format!("asset {}: {}", asset.symbol, e)))?;
            // 10^20 no longer fits a u64 amount
            if asset.decimals > 19 {
                return Err(EngineError::Config(format!(
                    "asset {}: decimals {} out of range", asset.symbol, asset.decimals
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_poll_interval_ms)
    }

    /// Configured keystore directory, else `~/.solwallet/keys`.
    pub fn keystore_dir(&self) -> EngineResult<PathBuf> {
        self.keystore_dir.clone()
            .or_else(FileKeystore::default_dir)
            .ok_or_else(|| EngineError::Config("no keystore_dir configured and no home directory".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.default_slippage_bps, 100);
        assert_eq!(config.commitment, Commitment::Confirmed);
        assert_eq!(config.rpc_endpoint().unwrap(), "https://api.mainnet-beta.solana.com");
    }

    #[test]
    fn parses_full_document() {
        let config = EngineConfig::from_toml_str(r#"
            network = "devnet"
            quote_api_key = "k"
            default_slippage_bps = 50
            commitment = "finalized"
            keystore_dir = "/tmp/keys"

            [[assets]]
            symbol = "PYTH"
            mint = "HZ1JovNiVvGrGNiiYvEozEVgZ58xaU3RKwX8eACQBCt3"
            decimals = 6
        "#).unwrap();
        assert_eq!(config.rpc_endpoint().unwrap(), "https://api.devnet.solana.com");
        assert_eq!(config.default_slippage_bps, 50);
        assert_eq!(config.commitment, Commitment::Finalized);
        assert_eq!(config.keystore_dir().unwrap(), PathBuf::from("/tmp/keys"));
        assert_eq!(config.assets.len(), 1);
        assert!(!format!("{:?}", config).contains("\"k\""));
    }

    #[test]
    fn rpc_url_overrides_network() {
        let config = EngineConfig::from_toml_str(r#"
            network = "nowhere"
            rpc_url = "http://127.0.0.1:8899"
        "#).unwrap();
        assert_eq!(config.rpc_endpoint().unwrap(), "http://127.0.0.1:8899");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(EngineConfig::from_toml_str("network = \"moon\""), Err(EngineError::Config(_))));
        assert!(EngineConfig::from_toml_str("default_slippage_bps = 6000").is_err());
        assert!(EngineConfig::from_toml_str("max_slippage_bps = 20000").is_err());
        assert!(EngineConfig::from_toml_str("request_timeout_secs = 0").is_err());
        assert!(EngineConfig::from_toml_str("commitment = \"eventually\"").is_err());
        assert!(EngineConfig::from_toml_str("unknown_key = 1").is_err());
        assert!(EngineConfig::from_toml_str(r#"
            [[assets]]
            symbol = "BAD"
            mint = "nope"
            decimals = 6
        "#).is_err());
    }

    #[test]
    fn rejects_oversized_timeouts() {
        let huge = EngineConfig::from_toml_str("confirm_timeout_secs = 9223372036854775807");
        assert!(matches!(huge, Err(EngineError::Config(_))));
        assert!(EngineConfig::from_toml_str("request_timeout_secs = 86401").is_err());
        assert!(EngineConfig::from_toml_str("confirm_poll_interval_ms = 90000000").is_err());
        let day = EngineConfig::from_toml_str("confirm_timeout_secs = 86400").unwrap();
        assert_eq!(day.confirm_timeout(), Duration::from_secs(86_400));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.toml");
        std::fs::write(&path, "network = \"localhost\"\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.rpc_endpoint().unwrap(), "http://localhost:8899");
        assert!(matches!(EngineConfig::load(&dir.path().join("missing.toml")), Err(EngineError::Io(_))));
    }
}
