// Solana DEX — Balances
// BalanceResolver: (account, asset) → point-in-time Balance

use std::sync::Arc;

use log::debug;

use super::constants::NATIVE_DECIMALS;
use super::helpers::short;
use super::rpc::ChainClient;
use super::transaction::derive_ata;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{AssetRef, Balance, Pubkey};

/// Resolves balances straight from the chain on every call.
#[derive(Clone)]
pub struct BalanceResolver {
    chain: Arc<dyn ChainClient>,
}

impl BalanceResolver {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Native assets are read from the address itself. Tokens are read from
    /// the owner's associated token account; one that does not exist yet
    /// holds 0.
    pub async fn balance_of(&self, account: &Pubkey, asset: &AssetRef) -> EngineResult<Balance> {
        match asset {
            AssetRef::Native => {
                let lamports = self.chain.get_native_balance(account).await
                    .map_err(EngineError::ChainQuery)?;
                debug!("[sol_dex] {} holds {} lamports", short(&account.to_string()), lamports);
                Ok(Balance { asset: AssetRef::Native, amount: lamports, decimals: Some(NATIVE_DECIMALS) })
            }
            AssetRef::Token(mint) => {
                let ata = derive_ata(account, mint)?;
                let held = self.chain.get_token_account_balance(&ata).await
                    .map_err(EngineError::ChainQuery)?;
                let balance = match held {
                    Some(t) => Balance { asset: *asset, amount: t.amount, decimals: Some(t.decimals) },
                    None => Balance { asset: *asset, amount: 0, decimals: None },
                };
                debug!(
                    "[sol_dex] {} holds {} of mint {}",
                    short(&account.to_string()), balance.amount, short(&mint.to_string())
                );
                Ok(balance)
            }
        }
    }

    /// Balance of an explicit token account rather than the derived one.
    pub async fn token_account_balance(&self, token_account: &Pubkey, mint: &Pubkey) -> EngineResult<Balance> {
        let held = self.chain.get_token_account_balance(token_account).await
            .map_err(EngineError::ChainQuery)?;
        Ok(Balance {
            asset: AssetRef::Token(*mint),
            amount: held.map(|t| t.amount).unwrap_or(0),
            decimals: held.map(|t| t.decimals),
        })
    }
}

impl std::fmt::Debug for BalanceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceResolver").finish_non_exhaustive()
    }
}
