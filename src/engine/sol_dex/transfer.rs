// Solana DEX — Outbound Transfers (SOL + SPL Tokens)
// TransactionBuilder: transfer_native, transfer_token, ensure_token_account

use std::sync::Arc;

use log::{info, warn};

use super::balance::BalanceResolver;
use super::helpers::short;
use super::rpc::ChainClient;
use super::transaction::{
    create_associated_token_account, derive_ata, system_transfer, token_transfer_checked,
    Instruction, Message, Transaction,
};
use super::wallet::Keypair;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{AssetRef, Pubkey, Signature};

/// Outcome of [`TransactionBuilder::ensure_token_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsuredTokenAccount {
    pub address: Pubkey,
    /// Set when a creation transaction was submitted.
    pub created: Option<Signature>,
}

/// Assembles, signs and submits transfer transactions. Every submission
/// fetches its own blockhash; nothing is retried.
#[derive(Clone)]
pub struct TransactionBuilder {
    chain: Arc<dyn ChainClient>,
    balances: BalanceResolver,
}

impl TransactionBuilder {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        let balances = BalanceResolver::new(chain.clone());
        Self { chain, balances }
    }

    /// Send `lamports` of the native asset from `signer` to `to`.
    pub async fn transfer_native(&self, signer: &Keypair, to: &Pubkey, lamports: u64) -> EngineResult<Signature> {
        if lamports == 0 {
            return Err(EngineError::invalid("transfer amount must be greater than zero"));
        }
        let from = signer.pubkey();

        // Advisory: fees may still make the network reject it.
        let have = self.balances.balance_of(&from, &AssetRef::Native).await?.amount;
        if have < lamports {
            warn!("[sol_dex] Native transfer refused: have {}, need {}", have, lamports);
            return Err(EngineError::InsufficientFunds { have, need: lamports });
        }

        let ix = system_transfer(&from, to, lamports)?;
        let signature = self.submit(signer, &[ix]).await?;
        info!(
            "[sol_dex] Transferred {} lamports {} → {} ({})",
            lamports, short(&from.to_string()), short(&to.to_string()), signature
        );
        Ok(signature)
    }

    /// TransferChecked between two already-resolved token accounts.
    /// Missing destination accounts are not created here; see
    /// [`ensure_token_account`](Self::ensure_token_account).
    pub async fn transfer_token(
        &self,
        signer: &Keypair,
        mint: &Pubkey,
        from_token_account: &Pubkey,
        to_token_account: &Pubkey,
        amount: u64,
        decimals: u8,
    ) -> EngineResult<Signature> {
        if amount == 0 {
            return Err(EngineError::invalid("transfer amount must be greater than zero"));
        }

        let have = self.balances.token_account_balance(from_token_account, mint).await?.amount;
        if have < amount {
            warn!("[sol_dex] Token transfer refused: have {}, need {}", have, amount);
            return Err(EngineError::InsufficientFunds { have, need: amount });
        }

        let authority = signer.pubkey();
        let ix = token_transfer_checked(from_token_account, mint, to_token_account, &authority, amount, decimals)?;
        let signature = self.submit(signer, &[ix]).await?;
        info!(
            "[sol_dex] Transferred {} (decimals={}) of mint {} → {} ({})",
            amount, decimals, short(&mint.to_string()), short(&to_token_account.to_string()), signature
        );
        Ok(signature)
    }

    /// Make sure `owner`'s associated token account for `mint` exists,
    /// creating it (paid by `payer`) when it does not.
    pub async fn ensure_token_account(
        &self,
        payer: &Keypair,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> EngineResult<EnsuredTokenAccount> {
        let address = derive_ata(owner, mint)?;
        let existing = self.chain.get_token_accounts_by_owner_and_mint(owner, mint).await
            .map_err(EngineError::ChainQuery)?;
        if existing.iter().any(|acct| acct.address == address) {
            return Ok(EnsuredTokenAccount { address, created: None });
        }

        let ix = create_associated_token_account(&payer.pubkey(), owner, mint)?;
        let signature = self.submit(payer, &[ix]).await?;
        info!(
            "[sol_dex] Created token account {} for owner {} mint {} ({})",
            address, short(&owner.to_string()), short(&mint.to_string()), signature
        );
        Ok(EnsuredTokenAccount { address, created: Some(signature) })
    }

    /// blockhash → compile → sign → send, exactly once.
    async fn submit(&self, signer: &Keypair, instructions: &[Instruction]) -> EngineResult<Signature> {
        let blockhash = self.chain.get_latest_blockhash().await
            .map_err(EngineError::ChainQuery)?;
        let message = Message::compile(&signer.pubkey(), instructions, blockhash)?;
        let mut tx = Transaction::new_unsigned(message);
        tx.sign(&[signer])?;
        let wire = tx.serialize()?;

        self.chain.send_transaction(&wire).await.map_err(|e| {
            warn!("[sol_dex] Submission failed: {}", e);
            EngineError::Submission(e)
        })
    }
}

impl std::fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBuilder").finish_non_exhaustive()
    }
}
