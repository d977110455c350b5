// solwallet — self-custody Solana wallet engine
//
//   atoms   — errors, value types, engine-wide constants (no I/O)
//   engine  — config, keystore, cancellation, logging, and the Solana
//             transfer / quote / swap machinery behind `WalletEngine`

pub mod atoms;
pub mod engine;

pub use atoms::error::{ChainError, EngineError, EngineResult};
pub use atoms::types::{
    AssetRef, Balance, Commitment, Hash, Pubkey, Quote, QuoteRequest, Signature, SignatureStatus,
    TokenAccount, TokenAmount,
};
pub use engine::cancel::{CancelHandle, CancelSignal};
pub use engine::config::EngineConfig;
pub use engine::keystore::{FileKeystore, Keystore, MemoryKeystore};
pub use engine::registry::AssetRegistry;
pub use engine::WalletEngine;
