// Solana DEX — Chain RPC
// ChainClient (the chain collaborator seam) and RpcChainClient, its JSON-RPC
// implementation: rpc_call, getBalance, getLatestBlockhash, sendTransaction,
// getTokenAccountBalance, getTokenAccountsByOwner, getSignatureStatuses,
// requestAirdrop, and polling confirmation on top of them.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use log::{debug, info};
use serde_json::{json, Value};
use tokio::time::Instant;

use super::helpers::short;
use crate::atoms::constants::MAX_TIMEOUT_SECS;
use crate::atoms::error::{ChainError, EngineError, EngineResult};
use crate::atoms::types::{
    Commitment, Hash, Pubkey, Signature, SignatureStatus, TokenAccount, TokenAmount,
};
use crate::engine::config::EngineConfig;

/// Everything the engine needs from the chain. One call is one attempt;
/// retry policy belongs to the caller.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native balance in lamports.
    async fn get_native_balance(&self, address: &Pubkey) -> Result<u64, ChainError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, ChainError>;

    /// Submit a fully signed wire transaction; returns its signature.
    async fn send_transaction(&self, wire_tx: &[u8]) -> Result<Signature, ChainError>;

    /// Balance of one token account. `None` when the account does not exist.
    async fn get_token_account_balance(&self, token_account: &Pubkey) -> Result<Option<TokenAmount>, ChainError>;

    async fn get_token_accounts_by_owner_and_mint(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccount>, ChainError>;

    /// `None` when the network has no record of the signature (yet).
    async fn get_signature_status(&self, signature: &Signature) -> Result<Option<SignatureStatus>, ChainError>;

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature, ChainError>;

    /// Poll until the signature is confirmed or failed on-chain, or `timeout`
    /// elapses. A timeout says nothing about the transaction's fate.
    async fn wait_for_confirmation(
        &self,
        signature: &Signature,
        timeout: Duration,
        poll_interval: Duration,
    ) -> EngineResult<SignatureStatus> {
        let start = Instant::now();
        let deadline = start.checked_add(timeout)
            .unwrap_or_else(|| start + Duration::from_secs(MAX_TIMEOUT_SECS));
        loop {
            let status = self.get_signature_status(signature).await
                .map_err(EngineError::ChainQuery)?;
            if let Some(status) = status {
                if status.err.is_some() || status.is_confirmed() {
                    return Ok(status);
                }
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(EngineError::Timeout { signature: signature.to_string() });
            }
            tokio::time::sleep(poll_interval.min(deadline - now)).await;
        }
    }
}

// ── JSON-RPC client ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RpcChainClient {
    url: String,
    http: reqwest::Client,
    commitment: Commitment,
}

impl RpcChainClient {
    pub fn new(url: impl Into<String>, commitment: Commitment, timeout: Duration) -> EngineResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url: url.into(), http, commitment })
    }

    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        Self::new(config.rpc_endpoint()?, config.commitment, config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make a Solana JSON-RPC call
    pub async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });
        debug!("[sol_dex] rpc {} → {}", method, self.url);

        let resp = self.http.post(&self.url).json(&body).send().await?;
        let json: Value = resp.json().await?;

        if let Some(error) = json.get("error") {
            let code = error.get("code").and_then(|v| v.as_i64()).unwrap_or(0);
            let message = error.get("message").and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(ChainError::Rpc { code, message });
        }

        json.get("result").cloned()
            .ok_or_else(|| ChainError::malformed(format!("{}: missing 'result' field", method)))
    }

    fn commitment_config(&self) -> Value {
        json!({ "commitment": self.commitment.as_str() })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_native_balance(&self, address: &Pubkey) -> Result<u64, ChainError> {
        let result = self.rpc_call("getBalance", json!([address.to_string(), self.commitment_config()])).await?;
        result.get("value")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ChainError::malformed("getBalance: missing value"))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ChainError> {
        let result = self.rpc_call("getLatestBlockhash", json!([self.commitment_config()])).await?;
        let blockhash = result.pointer("/value/blockhash")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChainError::malformed("getLatestBlockhash: missing blockhash"))?;
        blockhash.parse()
            .map_err(|e| ChainError::malformed(format!("getLatestBlockhash: {}", e)))
    }

    async fn send_transaction(&self, wire_tx: &[u8]) -> Result<Signature, ChainError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(wire_tx);
        let result = self.rpc_call("sendTransaction", json!([
            encoded,
            {
                "encoding": "base64",
                "skipPreflight": false,
                "preflightCommitment": self.commitment.as_str()
            }
        ])).await?;
        let sig = result.as_str()
            .ok_or_else(|| ChainError::malformed("sendTransaction: expected signature string"))?;
        info!("[sol_dex] Transaction sent: {}", sig);
        sig.parse()
            .map_err(|e| ChainError::malformed(format!("sendTransaction: {}", e)))
    }

    async fn get_token_account_balance(&self, token_account: &Pubkey) -> Result<Option<TokenAmount>, ChainError> {
        let result = self.rpc_call(
            "getTokenAccountBalance",
            json!([token_account.to_string(), self.commitment_config()]),
        ).await;
        match result {
            Ok(value) => parse_token_amount(&value).map(Some),
            Err(e) if is_missing_account(&e) => {
                debug!("[sol_dex] Token account {} not initialized", short(&token_account.to_string()));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_token_accounts_by_owner_and_mint(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccount>, ChainError> {
        let result = self.rpc_call("getTokenAccountsByOwner", json!([
            owner.to_string(),
            { "mint": mint.to_string() },
            { "encoding": "jsonParsed", "commitment": self.commitment.as_str() }
        ])).await?;
        parse_token_accounts(&result)
    }

    async fn get_signature_status(&self, signature: &Signature) -> Result<Option<SignatureStatus>, ChainError> {
        let result = self.rpc_call("getSignatureStatuses", json!([
            [signature.to_string()],
            { "searchTransactionHistory": true }
        ])).await?;
        parse_signature_status(&result)
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature, ChainError> {
        let result = self.rpc_call("requestAirdrop", json!([
            address.to_string(),
            lamports,
            self.commitment_config()
        ])).await?;
        result.as_str()
            .ok_or_else(|| ChainError::malformed("requestAirdrop: expected signature string"))?
            .parse()
            .map_err(|e| ChainError::malformed(format!("requestAirdrop: {}", e)))
    }
}

// ── Response parsing ──────────────────────────────────────────────────

/// Nodes answer `getTokenAccountBalance` for an uninitialized account with
/// an "invalid param: could not find account" error.
fn is_missing_account(err: &ChainError) -> bool {
    matches!(err, ChainError::Rpc { message, .. } if message.contains("could not find account"))
}

pub(crate) fn parse_token_amount(result: &Value) -> Result<TokenAmount, ChainError> {
    let value = result.get("value")
        .ok_or_else(|| ChainError::malformed("getTokenAccountBalance: missing value"))?;
    let amount = value.get("amount")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| ChainError::malformed("getTokenAccountBalance: bad amount"))?;
    let decimals = value.get("decimals")
        .and_then(|v| v.as_u64())
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| ChainError::malformed("getTokenAccountBalance: bad decimals"))?;
    Ok(TokenAmount { amount, decimals })
}

pub(crate) fn parse_token_accounts(result: &Value) -> Result<Vec<TokenAccount>, ChainError> {
    let accounts = result.get("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ChainError::malformed("getTokenAccountsByOwner: missing value"))?;

    let mut out = Vec::with_capacity(accounts.len());
    for acct in accounts {
        let field = |ptr: &str| -> Result<&str, ChainError> {
            acct.pointer(ptr)
                .and_then(|v| v.as_str())
                .ok_or_else(|| ChainError::malformed(format!("getTokenAccountsByOwner: missing {}", ptr)))
        };
        let parse_key = |ptr: &str| -> Result<Pubkey, ChainError> {
            field(ptr)?.parse()
                .map_err(|e| ChainError::malformed(format!("getTokenAccountsByOwner: {}", e)))
        };
        let amount = field("/account/data/parsed/info/tokenAmount/amount")?
            .parse::<u64>()
            .map_err(|e| ChainError::malformed(format!("getTokenAccountsByOwner: {}", e)))?;
        out.push(TokenAccount {
            address: parse_key("/pubkey")?,
            mint: parse_key("/account/data/parsed/info/mint")?,
            owner: parse_key("/account/data/parsed/info/owner")?,
            amount,
        });
    }
    Ok(out)
}

pub(crate) fn parse_signature_status(result: &Value) -> Result<Option<SignatureStatus>, ChainError> {
    let statuses = result.get("value")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ChainError::malformed("getSignatureStatuses: missing value"))?;
    let Some(status) = statuses.first().filter(|s| !s.is_null()) else {
        return Ok(None);
    };
    let commitment = status.get("confirmationStatus")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<Commitment>().ok());
    let err = status.get("err")
        .filter(|e| !e.is_null())
        .map(|e| e.to_string());
    Ok(Some(SignatureStatus {
        slot: status.get("slot").and_then(|v| v.as_u64()).unwrap_or(0),
        commitment,
        err,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports a signature as confirmed on the third status query.
    #[derive(Default)]
    struct ConfirmsLater {
        polls: AtomicUsize,
    }

    #[async_trait]
    impl ChainClient for ConfirmsLater {
        async fn get_native_balance(&self, _: &Pubkey) -> Result<u64, ChainError> {
            Ok(0)
        }
        async fn get_latest_blockhash(&self) -> Result<Hash, ChainError> {
            Ok(Hash::new([1; 32]))
        }
        async fn send_transaction(&self, _: &[u8]) -> Result<Signature, ChainError> {
            Err(ChainError::malformed("not used"))
        }
        async fn get_token_account_balance(&self, _: &Pubkey) -> Result<Option<TokenAmount>, ChainError> {
            Ok(None)
        }
        async fn get_token_accounts_by_owner_and_mint(&self, _: &Pubkey, _: &Pubkey) -> Result<Vec<TokenAccount>, ChainError> {
            Ok(Vec::new())
        }
        async fn get_signature_status(&self, _: &Signature) -> Result<Option<SignatureStatus>, ChainError> {
            if self.polls.fetch_add(1, Ordering::SeqCst) < 2 {
                return Ok(None);
            }
            Ok(Some(SignatureStatus { slot: 3, commitment: Some(Commitment::Confirmed), err: None }))
        }
        async fn request_airdrop(&self, _: &Pubkey, _: u64) -> Result<Signature, ChainError> {
            Err(ChainError::malformed("not used"))
        }
    }

    #[tokio::test]
    async fn confirmation_wait_survives_unbounded_timeout() {
        let chain = ConfirmsLater::default();
        let sig = Signature::new([4; 64]);
        let status = chain.wait_for_confirmation(&sig, Duration::MAX, Duration::from_millis(1)).await.unwrap();
        assert!(status.is_confirmed());
        assert_eq!(chain.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn confirmation_wait_times_out() {
        let chain = ConfirmsLater::default();
        let sig = Signature::new([5; 64]);
        let err = chain.wait_for_confirmation(&sig, Duration::from_millis(1), Duration::from_millis(5)).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout { .. }));
    }

    #[test]
    fn missing_account_detection() {
        let missing = ChainError::rpc(-32602, "Invalid param: could not find account");
        let other = ChainError::rpc(-32602, "Invalid param: WrongSize");
        assert!(is_missing_account(&missing));
        assert!(!is_missing_account(&other));
        assert!(!is_missing_account(&ChainError::malformed("x")));
    }

    #[test]
    fn parses_token_amount() {
        let v = json!({"context": {"slot": 1}, "value": {"amount": "12345", "decimals": 6, "uiAmount": 0.012345}});
        assert_eq!(parse_token_amount(&v).unwrap(), TokenAmount { amount: 12345, decimals: 6 });
        assert!(parse_token_amount(&json!({"value": {"amount": 5}})).is_err());
    }

    #[test]
    fn token_amount_requires_byte_sized_decimals() {
        let missing = json!({"value": {"amount": "10"}});
        let wide = json!({"value": {"amount": "10", "decimals": 300}});
        let negative = json!({"value": {"amount": "10", "decimals": -1}});
        for v in [missing, wide, negative] {
            assert!(matches!(parse_token_amount(&v), Err(ChainError::Malformed(_))));
        }
        let max = json!({"value": {"amount": "10", "decimals": 255}});
        assert_eq!(parse_token_amount(&max).unwrap().decimals, 255);
    }

    #[test]
    fn parses_token_accounts() {
        let owner = Pubkey::new([1; 32]);
        let mint = Pubkey::new([2; 32]);
        let ata = Pubkey::new([3; 32]);
        let v = json!({"value": [{
            "pubkey": ata.to_string(),
            "account": {"data": {"parsed": {"info": {
                "mint": mint.to_string(),
                "owner": owner.to_string(),
                "tokenAmount": {"amount": "77", "decimals": 0}
            }}}}
        }]});
        let accounts = parse_token_accounts(&v).unwrap();
        assert_eq!(accounts, vec![TokenAccount { address: ata, mint, owner, amount: 77 }]);
        assert!(parse_token_accounts(&json!({"value": []})).unwrap().is_empty());
    }

    #[test]
    fn parses_signature_status() {
        let pending = json!({"value": [null]});
        assert_eq!(parse_signature_status(&pending).unwrap(), None);

        let done = json!({"value": [{"slot": 9, "confirmations": null, "err": null, "confirmationStatus": "finalized"}]});
        let status = parse_signature_status(&done).unwrap().unwrap();
        assert_eq!(status.slot, 9);
        assert_eq!(status.commitment, Some(Commitment::Finalized));
        assert!(status.is_confirmed());

        let failed = json!({"value": [{"slot": 9, "err": {"InstructionError": [0, "Custom"]}, "confirmationStatus": "confirmed"}]});
        let status = parse_signature_status(&failed).unwrap().unwrap();
        assert!(status.err.unwrap().contains("InstructionError"));
    }
}
