// Wallet Engine — Native Rust Solana wallet
// Owns one signing key, resolves balances, submits SOL/SPL transfers and
// drives quote-then-swap execution through a routing service.
//
// Module layout:
//   config    — EngineConfig (TOML)
//   registry  — AssetRegistry (symbol ↔ mint, decimals)
//   keystore  — Keystore trait, FileKeystore, MemoryKeystore
//   cancel    — CancelHandle / CancelSignal
//   logging   — init_logging (env_logger)
//   sol_dex   — chain client, wallet, transactions, transfers, quotes, swaps

pub mod cancel;
pub mod config;
pub mod keystore;
pub mod logging;
pub mod registry;
pub mod sol_dex;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::atoms::constants::MAX_TIMEOUT_SECS;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{AssetRef, Balance, Pubkey, QuoteRequest, Signature};
use cancel::CancelSignal;
use config::EngineConfig;
use keystore::{FileKeystore, Keystore};
use registry::AssetRegistry;
use sol_dex::balance::BalanceResolver;
use sol_dex::jupiter::{JupiterClient, QuoteClient};
use sol_dex::rpc::{ChainClient, RpcChainClient};
use sol_dex::swap::{SwapOrchestrator, SwapState};
use sol_dex::transfer::{EnsuredTokenAccount, TransactionBuilder};
use sol_dex::wallet::AccountStore;

/// The engine facade. Every network-bound call takes a [`CancelSignal`];
/// submissions from the same account must be serialized by the caller.
pub struct WalletEngine {
    config: EngineConfig,
    registry: Arc<AssetRegistry>,
    accounts: AccountStore,
    chain: Arc<dyn ChainClient>,
    balances: BalanceResolver,
    transfers: TransactionBuilder,
    swaps: SwapOrchestrator,
}

impl WalletEngine {
    pub fn new(
        config: EngineConfig,
        registry: Arc<AssetRegistry>,
        keystore: Arc<dyn Keystore>,
        chain: Arc<dyn ChainClient>,
        quotes: Arc<dyn QuoteClient>,
    ) -> Self {
        let swaps = SwapOrchestrator::new(chain.clone(), quotes)
            .with_confirmation(config.confirm_timeout(), config.poll_interval());
        Self {
            registry,
            accounts: AccountStore::new(keystore),
            balances: BalanceResolver::new(chain.clone()),
            transfers: TransactionBuilder::new(chain.clone()),
            swaps,
            chain,
            config,
        }
    }

    /// JSON-RPC chain client, Jupiter quote client and file keystore, all
    /// from `config`.
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let registry = Arc::new(AssetRegistry::from_config(&config)?);
        let keystore = Arc::new(FileKeystore::new(config.keystore_dir()?));
        let chain = Arc::new(RpcChainClient::from_config(&config)?);
        let quotes = Arc::new(JupiterClient::from_config(&config)?);
        info!("[wallet] Engine ready (rpc={}, commitment={})", chain.url(), config.commitment.as_str());
        Ok(Self::new(config, registry, keystore, chain, quotes))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    // ── Accounts ──────────────────────────────────────────────────────

    pub fn create_account(&self) -> EngineResult<Pubkey> {
        self.accounts.create()
    }

    pub fn restore_account(&self, secret: &[u8]) -> EngineResult<Pubkey> {
        self.accounts.restore(secret)
    }

    pub fn restore_account_base58(&self, encoded: &str) -> EngineResult<Pubkey> {
        self.accounts.restore_base58(encoded)
    }

    pub fn load_account(&self, path: &Path) -> EngineResult<Pubkey> {
        self.accounts.load(path)
    }

    pub fn active_address(&self) -> EngineResult<Pubkey> {
        self.accounts.active_address()
    }

    // ── Balances ──────────────────────────────────────────────────────

    /// Balance of the active account.
    pub async fn balance_of(&self, asset: &AssetRef, cancel: &CancelSignal) -> EngineResult<Balance> {
        let owner = self.accounts.active_address()?;
        cancel.run(self.balances.balance_of(&owner, asset)).await
    }

    pub async fn balance_of_symbol(&self, symbol: &str, cancel: &CancelSignal) -> EngineResult<Balance> {
        let asset = self.registry.resolve(symbol)?;
        let owner = self.accounts.active_address()?;
        let mut balance = self.balance_of(&asset, cancel).await?;
        if balance.decimals.is_none() {
            balance.decimals = self.registry.decimals(&asset);
        }
        if let Ok(shown) = self.registry.format_balance(&balance) {
            debug!("[wallet] {} balance: {} {}", owner, shown, symbol.trim().to_uppercase());
        }
        Ok(balance)
    }

    // ── Transfers ─────────────────────────────────────────────────────

    pub async fn transfer_native(&self, to: &Pubkey, lamports: u64, cancel: &CancelSignal) -> EngineResult<Signature> {
        let signer = self.accounts.active_keypair()?;
        cancel.run(self.transfers.transfer_native(&signer, to, lamports)).await
    }

    pub async fn transfer_token(
        &self,
        mint: &Pubkey,
        from_token_account: &Pubkey,
        to_token_account: &Pubkey,
        amount: u64,
        decimals: u8,
        cancel: &CancelSignal,
    ) -> EngineResult<Signature> {
        let signer = self.accounts.active_keypair()?;
        cancel.run(self.transfers.transfer_token(
            &signer, mint, from_token_account, to_token_account, amount, decimals,
        )).await
    }

    /// Create `owner`'s token account for `mint` if missing; the active
    /// account pays.
    pub async fn ensure_token_account(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        cancel: &CancelSignal,
    ) -> EngineResult<EnsuredTokenAccount> {
        let payer = self.accounts.active_keypair()?;
        cancel.run(self.transfers.ensure_token_account(&payer, owner, mint)).await
    }

    /// Devnet / localhost faucet funding for the active account.
    pub async fn request_airdrop(&self, lamports: u64, cancel: &CancelSignal) -> EngineResult<Signature> {
        if lamports == 0 {
            return Err(EngineError::invalid("airdrop amount must be greater than zero"));
        }
        let address = self.accounts.active_address()?;
        let signature = cancel.run(async {
            self.chain.request_airdrop(&address, lamports).await.map_err(EngineError::Submission)
        }).await?;
        info!("[wallet] Airdrop of {} lamports requested for {} ({})", lamports, address, signature);
        Ok(signature)
    }

    // ── Swaps ─────────────────────────────────────────────────────────

    /// Run a swap to a terminal state. Slippage defaults to the configured
    /// value and may not exceed the configured maximum.
    pub async fn swap(&self, request: QuoteRequest, cancel: &CancelSignal) -> EngineResult<SwapState> {
        self.swap_with_timeout(request, self.config.confirm_timeout(), cancel).await
    }

    /// [`swap`](Self::swap) with a caller-chosen confirmation timeout for this
    /// swap only.
    pub async fn swap_with_timeout(
        &self,
        mut request: QuoteRequest,
        confirm_timeout: Duration,
        cancel: &CancelSignal,
    ) -> EngineResult<SwapState> {
        if confirm_timeout.is_zero() || confirm_timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
            return Err(EngineError::invalid(format!(
                "confirmation timeout must be between 1ms and {}s", MAX_TIMEOUT_SECS
            )));
        }
        let slippage = request.slippage_bps.unwrap_or(self.config.default_slippage_bps);
        if slippage > self.config.max_slippage_bps {
            return Err(EngineError::invalid(format!(
                "Slippage too high: {}bps. Max is {}bps", slippage, self.config.max_slippage_bps
            )));
        }
        request.slippage_bps = Some(slippage);
        let signer = self.accounts.active_keypair()?;
        Ok(self.swaps.run_with_timeout(request, &signer, confirm_timeout, cancel).await)
    }
}

impl std::fmt::Debug for WalletEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletEngine")
            .field("config", &self.config)
            .field("accounts", &self.accounts)
            .finish_non_exhaustive()
    }
}
