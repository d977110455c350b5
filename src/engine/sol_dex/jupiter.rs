// Solana DEX — Jupiter Quote & Swap API
// QuoteClient (the routing-service seam), JupiterClient, parse_quote_response,
// parse_swap_response

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use log::{info, warn};
use serde_json::Value;

use super::constants::{DEFAULT_QUOTE_API, DEFAULT_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS, NATIVE_MINT};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{AssetRef, Pubkey, Quote, QuoteRequest};
use crate::engine::config::EngineConfig;

/// A price-routing service: quotes a swap, then turns an accepted quote into
/// an unsigned transaction for the user to sign.
#[async_trait]
pub trait QuoteClient: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> EngineResult<Quote>;

    /// The wire transaction (unsigned) that executes `quote` for `user`.
    /// The quote's route metadata is forwarded exactly as received.
    async fn swap_transaction(&self, user: &Pubkey, quote: &Quote) -> EngineResult<Vec<u8>>;
}

/// Mint used on the routing service's side for an asset. The native asset is
/// routed as wrapped SOL.
pub fn routing_mint(asset: &AssetRef) -> EngineResult<Pubkey> {
    match asset {
        AssetRef::Native => NATIVE_MINT.parse(),
        AssetRef::Token(mint) => Ok(*mint),
    }
}

// ── HTTP client ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct JupiterClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
    default_slippage_bps: u16,
    max_slippage_bps: u16,
}

impl JupiterClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            http,
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            max_slippage_bps: MAX_SLIPPAGE_BPS,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_slippage(mut self, default_bps: u16, max_bps: u16) -> Self {
        self.default_slippage_bps = default_bps;
        self.max_slippage_bps = max_bps;
        self
    }

    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let client = Self::new(
            config.quote_api_url.as_deref().unwrap_or(DEFAULT_QUOTE_API),
            config.request_timeout(),
        )?
        .with_slippage(config.default_slippage_bps, config.max_slippage_bps);
        Ok(match &config.quote_api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Slippage actually requested: the override or the default, capped.
    pub fn effective_slippage(&self, requested: Option<u16>) -> EngineResult<u16> {
        let bps = requested.unwrap_or(self.default_slippage_bps);
        if bps > self.max_slippage_bps {
            return Err(EngineError::invalid(format!(
                "Slippage too high: {}bps. Max is {}bps ({}%)",
                bps, self.max_slippage_bps, self.max_slippage_bps / 100
            )));
        }
        Ok(bps)
    }

    pub fn quote_url(&self, input: &Pubkey, output: &Pubkey, amount: u64, slippage_bps: u16) -> String {
        format!(
            "{}/quote?inputMint={}&outputMint={}&amount={}&slippageBps={}",
            self.base_url,
            urlencoding::encode(&input.to_string()),
            urlencoding::encode(&output.to_string()),
            amount,
            slippage_bps
        )
    }

    fn with_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }
}

#[async_trait]
impl QuoteClient for JupiterClient {
    async fn quote(&self, request: &QuoteRequest) -> EngineResult<Quote> {
        if request.amount == 0 {
            return Err(EngineError::invalid("quote amount must be greater than zero"));
        }
        let slippage_bps = self.effective_slippage(request.slippage_bps)?;
        let input = routing_mint(&request.input)?;
        let output = routing_mint(&request.output)?;
        let url = self.quote_url(&input, &output, request.amount, slippage_bps);

        info!(
            "[sol_dex] Getting Jupiter quote: {} {} → {} ({}bps)",
            request.amount, request.input, request.output, slippage_bps
        );
        let resp = self.with_key(self.http.get(&url)).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        let quote = parse_quote_response(status, &body)?;
        if quote.input_mint != input || quote.output_mint != output {
            warn!("[sol_dex] Quote mints do not match the request");
            return Err(EngineError::quote(status, body));
        }
        info!(
            "[sol_dex] Quote: {} → {} (min {}, route {})",
            quote.in_amount, quote.out_amount, quote.other_amount_threshold,
            route_summary(&quote)
        );
        Ok(quote)
    }

    async fn swap_transaction(&self, user: &Pubkey, quote: &Quote) -> EngineResult<Vec<u8>> {
        let swap_body = serde_json::json!({
            "quoteResponse": quote.raw(),
            "userPublicKey": user.to_string(),
            "wrapAndUnwrapSol": true,
            "dynamicComputeUnitLimit": true
        });

        info!("[sol_dex] Getting swap transaction from Jupiter...");
        let resp = self.with_key(self.http.post(format!("{}/swap", self.base_url)))
            .json(&swap_body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        parse_swap_response(status, &body)
    }
}

// ── Response parsing ──────────────────────────────────────────────────

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Amounts come back as decimal strings; accept bare numbers too.
fn amount_field(body: &Value, key: &str) -> Option<u64> {
    match body.get(key)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn mint_field(body: &Value, key: &str) -> Option<Pubkey> {
    body.get(key)?.as_str()?.parse().ok()
}

/// Turn a raw `/quote` response into a [`Quote`].
///
/// Non-2xx statuses, bodies that are not JSON, missing amounts or mints, and
/// a missing or empty `routePlan` are all `EngineError::Quote` carrying the
/// status and body verbatim.
pub fn parse_quote_response(status: u16, body: &str) -> EngineResult<Quote> {
    if !is_success(status) {
        warn!("[sol_dex] Jupiter quote failed: HTTP {}", status);
        return Err(EngineError::quote(status, body));
    }
    let reject = |reason: &str| {
        warn!("[sol_dex] Unusable quote response: {}", reason);
        EngineError::quote(status, body)
    };

    let raw: Value = serde_json::from_str(body).map_err(|_| reject("body is not JSON"))?;
    let route_plan = raw.get("routePlan")
        .and_then(|v| v.as_array())
        .filter(|routes| !routes.is_empty())
        .cloned()
        .ok_or_else(|| reject("missing routePlan"))?;

    Ok(Quote {
        input_mint: mint_field(&raw, "inputMint").ok_or_else(|| reject("missing inputMint"))?,
        in_amount: amount_field(&raw, "inAmount").ok_or_else(|| reject("missing inAmount"))?,
        output_mint: mint_field(&raw, "outputMint").ok_or_else(|| reject("missing outputMint"))?,
        out_amount: amount_field(&raw, "outAmount").ok_or_else(|| reject("missing outAmount"))?,
        other_amount_threshold: amount_field(&raw, "otherAmountThreshold")
            .ok_or_else(|| reject("missing otherAmountThreshold"))?,
        slippage_bps: raw.get("slippageBps")
            .and_then(|v| v.as_u64())
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| reject("missing slippageBps"))?,
        route_plan,
        raw,
    })
}

/// Decode the base64 `swapTransaction` of a `/swap` response.
pub fn parse_swap_response(status: u16, body: &str) -> EngineResult<Vec<u8>> {
    if !is_success(status) {
        warn!("[sol_dex] Jupiter swap failed: HTTP {}", status);
        return Err(EngineError::quote(status, body));
    }
    let data: Value = serde_json::from_str(body).map_err(|_| EngineError::quote(status, body))?;
    let swap_tx_b64 = data.get("swapTransaction")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::quote(status, body))?;
    base64::engine::general_purpose::STANDARD
        .decode(swap_tx_b64)
        .map_err(|_| EngineError::quote(status, body))
}

fn route_summary(quote: &Quote) -> String {
    let labels = quote.route_labels();
    if labels.is_empty() { "Direct".into() } else { labels.join(" → ") }
}
