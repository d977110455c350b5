// ── Wallet Atoms: Constants ────────────────────────────────────────────────
// Engine-wide named constants that are not chain specific.

// ── Keystore layout ────────────────────────────────────────────────────────
// Key files are named `wallet_<first N chars of address>.json`.
pub(crate) const KEYSTORE_FILE_PREFIX: &str = "wallet_";
pub(crate) const KEYSTORE_ADDRESS_PREFIX_LEN: usize = 10;

/// Default keystore directory under the user's home (`~/.solwallet/keys`).
pub(crate) const KEYSTORE_HOME_DIR: &str = ".solwallet";
pub(crate) const KEYSTORE_SUBDIR: &str = "keys";

// ── Network timing ─────────────────────────────────────────────────────────
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONFIRM_POLL_INTERVAL_MS: u64 = 500;
pub(crate) const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;
/// Upper bound for any configured timeout (one day).
pub(crate) const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Default log filter when `RUST_LOG` is unset.
pub(crate) const DEFAULT_LOG_FILTER: &str = "solwallet=info";
