// ── Wallet Atoms: Error Types ──────────────────────────────────────────────
// Single canonical error enum for the wallet engine, built with `thiserror`.
//
// Design rules:
//   • Variants follow the engine's failure taxonomy (account, chain, quote…).
//   • Collaborator failures are wrapped, never flattened to strings, so the
//     original cause stays reachable through `source()`.
//   • No variant carries secret material (keys, keystore blobs) in its message.

use thiserror::Error;

// ── Chain collaborator errors ──────────────────────────────────────────────

/// Failure reported by (or while talking to) the chain RPC endpoint.
#[derive(Debug, Error)]
pub enum ChainError {
    /// HTTP / connection failure (reqwest layer).
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON-RPC level error object returned by the node.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered, but not in the shape we expected.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The transaction landed but its execution failed on-chain.
    #[error("transaction failed on-chain: {0}")]
    Execution(String),
}

impl ChainError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc { code, message: message.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// No keypair has been created or restored yet.
    #[error("no active account")]
    NoActiveAccount,

    /// Secret material had the wrong length or encoding.
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// A read-only chain query failed.
    #[error("chain query failed: {0}")]
    ChainQuery(#[source] ChainError),

    /// Advisory pre-flight balance check failed; nothing was submitted.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },

    /// The network refused (or we could not deliver) a signed transaction.
    /// The on-chain outcome is unknown and must be re-queried.
    #[error("submission failed: {0}")]
    Submission(#[source] ChainError),

    /// Quote / swap service answered with a non-success status or a body we
    /// could not use. `body` is the response body verbatim.
    #[error("quote failed (HTTP {status}): {body}")]
    Quote { status: u16, body: String },

    /// Confirmation did not arrive in time. Does not imply failure.
    #[error("timed out waiting for confirmation of {signature}")]
    Timeout { signature: String },

    /// The caller's cancellation or deadline signal fired.
    #[error("operation cancelled")]
    Cancelled,

    /// Symbol or mint not known to the asset registry.
    #[error("unsupported asset: {0}")]
    UnsupportedAsset(String),

    /// Caller supplied an argument the engine refuses up front.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A transaction's required signers differ from the keys offered.
    #[error("signer mismatch: {0}")]
    SignerMismatch(String),

    /// Keystore collaborator failure.
    #[error("keystore error: {0}")]
    Keystore(String),

    /// Engine configuration is invalid or missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP failure talking to the quote service.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EngineError {
    pub fn quote(status: u16, body: impl Into<String>) -> Self {
        Self::Quote { status, body: body.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn malformed_key(message: impl Into<String>) -> Self {
        Self::MalformedKey(message.into())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations return this type.
pub type EngineResult<T> = Result<T, EngineError>;
