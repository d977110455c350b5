// ── Wallet Atoms: Value Types ──────────────────────────────────────────────
// Addresses, hashes, signatures, asset references, balances and quotes.
// All base58 newtypes serialize as their base58 string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::EngineError;

// ── Base58 fixed-length identifiers ────────────────────────────────────────

macro_rules! base58_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn to_bytes(&self) -> [u8; $len] {
                self.0
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn try_from_slice(bytes: &[u8]) -> Result<Self, EngineError> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| {
                    EngineError::invalid(format!(
                        "{} must be {} bytes, got {}", $label, $len, bytes.len()
                    ))
                })?;
                Ok(Self(arr))
            }
        }

        impl FromStr for $name {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = bs58::decode(s.trim()).into_vec().map_err(|e| {
                    EngineError::invalid(format!("invalid base58 {}: {}", $label, e))
                })?;
                Self::try_from_slice(&bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&bs58::encode(&self.0).into_string())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

base58_newtype!(
    /// A 32-byte account address (ed25519 public key or program-derived).
    Pubkey, 32, "address"
);
base58_newtype!(
    /// A recent blockhash: the freshness token every transaction carries.
    Hash, 32, "blockhash"
);
base58_newtype!(
    /// A 64-byte ed25519 signature. The first signature of a transaction is
    /// its network-assigned identifier.
    Signature, 64, "signature"
);

impl Default for Pubkey {
    fn default() -> Self {
        Self([0u8; 32])
    }
}

// ── Assets & balances ──────────────────────────────────────────────────────

/// Either the network's native asset or a fungible token identified by mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRef {
    Native,
    Token(Pubkey),
}

impl AssetRef {
    pub fn is_native(&self) -> bool {
        matches!(self, AssetRef::Native)
    }

    pub fn mint(&self) -> Option<Pubkey> {
        match self {
            AssetRef::Native => None,
            AssetRef::Token(mint) => Some(*mint),
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetRef::Native => f.write_str("SOL"),
            AssetRef::Token(mint) => write!(f, "{}", mint),
        }
    }
}

/// A point-in-time balance in the asset's smallest indivisible unit.
/// `decimals` is passed through from the chain when known, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub asset: AssetRef,
    pub amount: u64,
    pub decimals: Option<u8>,
}

/// Raw token amount as reported for a single token account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub amount: u64,
    pub decimals: u8,
}

/// A token account as returned by an owner+mint lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccount {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

// ── Confirmation ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl FromStr for Commitment {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(EngineError::Config(format!("unknown commitment level '{}'", other))),
        }
    }
}

/// What the network currently knows about a submitted signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub slot: u64,
    pub commitment: Option<Commitment>,
    /// On-chain execution error, rendered as text. `None` means success so far.
    pub err: Option<String>,
}

impl SignatureStatus {
    pub fn is_confirmed(&self) -> bool {
        self.err.is_none() && self.commitment.is_some_and(|c| c >= Commitment::Confirmed)
    }
}

// ── Quotes ─────────────────────────────────────────────────────────────────

/// Parameters for a price-routing quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub input: AssetRef,
    pub output: AssetRef,
    pub amount: u64,
    /// Overrides the configured default when set.
    pub slippage_bps: Option<u16>,
}

/// An immutable quote. `raw` is the service response exactly as received and
/// is what gets handed back to the swap endpoint; the typed fields are a view.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub input_mint: Pubkey,
    pub in_amount: u64,
    pub output_mint: Pubkey,
    pub out_amount: u64,
    pub other_amount_threshold: u64,
    pub slippage_bps: u16,
    pub route_plan: Vec<serde_json::Value>,
    pub(crate) raw: serde_json::Value,
}

impl Quote {
    /// Route metadata exactly as the service returned it.
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// AMM labels along the route, e.g. `["Raydium", "Orca"]`.
    pub fn route_labels(&self) -> Vec<String> {
        self.route_plan.iter()
            .filter_map(|r| r.pointer("/swapInfo/label").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .collect()
    }
}
