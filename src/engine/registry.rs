// Wallet Engine — Asset Registry
// Immutable symbol ↔ asset table built once from the well-known token list
// plus configured `[[assets]]`, then shared read-only.

use std::collections::HashMap;

use super::config::EngineConfig;
use super::sol_dex::constants::{KNOWN_TOKENS, NATIVE_DECIMALS, NATIVE_MINT};
use super::sol_dex::helpers::{amount_to_lamports, format_units};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{AssetRef, Balance, Pubkey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub symbol: String,
    pub asset: AssetRef,
    pub decimals: u8,
}

#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    by_symbol: HashMap<String, AssetInfo>,
    by_asset: HashMap<AssetRef, String>,
}

impl AssetRegistry {
    /// Well-known mainnet tokens only.
    pub fn builtin() -> EngineResult<Self> {
        let mut registry = Self::default();
        for (symbol, mint, decimals) in KNOWN_TOKENS {
            registry.insert(symbol, mint, *decimals)?;
        }
        Ok(registry)
    }

    /// Built-ins, then config entries (which override by symbol).
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let mut registry = Self::builtin()?;
        for entry in &config.assets {
            registry.insert(&entry.symbol, &entry.mint, entry.decimals)?;
        }
        Ok(registry)
    }

    /// Add one entry while building.
    pub fn with_asset(mut self, symbol: &str, mint: &str, decimals: u8) -> EngineResult<Self> {
        self.insert(symbol, mint, decimals)?;
        Ok(self)
    }

    fn insert(&mut self, symbol: &str, mint: &str, decimals: u8) -> EngineResult<()> {
        let asset = asset_for_mint(mint.parse()?);
        let symbol = symbol.trim().to_uppercase();
        if let Some(previous) = self.by_symbol.get(&symbol) {
            self.by_asset.remove(&previous.asset);
        }
        self.by_asset.insert(asset, symbol.clone());
        self.by_symbol.insert(symbol.clone(), AssetInfo { symbol, asset, decimals });
        Ok(())
    }

    /// Case-insensitive symbol, or a base58 mint taken verbatim.
    pub fn resolve(&self, symbol_or_mint: &str) -> EngineResult<AssetRef> {
        let key = symbol_or_mint.trim();
        if let Some(info) = self.by_symbol.get(&key.to_uppercase()) {
            return Ok(info.asset);
        }
        key.parse::<Pubkey>()
            .map(asset_for_mint)
            .map_err(|_| EngineError::UnsupportedAsset(key.to_string()))
    }

    pub fn decimals(&self, asset: &AssetRef) -> Option<u8> {
        if asset.is_native() {
            return Some(NATIVE_DECIMALS);
        }
        self.info(asset).map(|i| i.decimals)
    }

    pub fn symbol_of(&self, asset: &AssetRef) -> Option<&str> {
        self.by_asset.get(asset).map(|s| s.as_str())
    }

    pub fn info(&self, asset: &AssetRef) -> Option<&AssetInfo> {
        self.by_asset.get(asset).and_then(|s| self.by_symbol.get(s))
    }

    /// "1.5" of `symbol_or_mint` in base units. Unknown decimals are an error
    /// rather than a guess.
    pub fn parse_amount(&self, symbol_or_mint: &str, amount: &str) -> EngineResult<u64> {
        let asset = self.resolve(symbol_or_mint)?;
        let decimals = self.decimals(&asset).ok_or_else(|| {
            EngineError::UnsupportedAsset(format!("{} (decimals unknown)", symbol_or_mint.trim()))
        })?;
        amount_to_lamports(amount, decimals)
    }

    /// Human-readable amount of `balance`, e.g. "1.5". Decimals reported by
    /// the chain win over the registry's.
    pub fn format_balance(&self, balance: &Balance) -> EngineResult<String> {
        let decimals = balance.decimals
            .or_else(|| self.decimals(&balance.asset))
            .ok_or_else(|| EngineError::UnsupportedAsset(format!("{} (decimals unknown)", balance.asset)))?;
        Ok(format_units(balance.amount, decimals))
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

fn asset_for_mint(mint: Pubkey) -> AssetRef {
    if mint.to_string() == NATIVE_MINT {
        AssetRef::Native
    } else {
        AssetRef::Token(mint)
    }
}
