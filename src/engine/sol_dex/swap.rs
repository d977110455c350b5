// Solana DEX — Swap Orchestrator
// SwapState machine (Idle → Quoted → Built → Signed → Submitted → Confirmed,
// or Failed), the pure `transition` function, and SwapOrchestrator which
// fetches each collaborator response and feeds it through `transition`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use super::balance::BalanceResolver;
use super::jupiter::QuoteClient;
use super::rpc::ChainClient;
use super::transaction::sign_wire_transaction;
use super::wallet::Keypair;
use crate::atoms::constants::{DEFAULT_CONFIRM_POLL_INTERVAL_MS, DEFAULT_CONFIRM_TIMEOUT_SECS};
use crate::atoms::error::{ChainError, EngineError, EngineResult};
use crate::atoms::types::{Quote, QuoteRequest, Signature, SignatureStatus};
use crate::engine::cancel::CancelSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SwapStage {
    Quoted,
    Built,
    Signed,
    Submitted,
    Confirmed,
}

impl fmt::Display for SwapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapStage::Quoted => "quoted",
            SwapStage::Built => "built",
            SwapStage::Signed => "signed",
            SwapStage::Submitted => "submitted",
            SwapStage::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

/// Where a swap stands, with everything accumulated so far.
#[derive(Debug)]
pub enum SwapState {
    Idle { request: QuoteRequest },
    Quoted { quote: Quote },
    /// `payload` is the unsigned wire transaction from the routing service.
    Built { quote: Quote, payload: Vec<u8> },
    Signed { quote: Quote, signed: Vec<u8>, signature: Signature },
    Submitted { quote: Quote, signature: Signature },
    Confirmed { quote: Quote, signature: Signature, status: SignatureStatus },
    /// `stage` is the stage that could not be entered. `signature` is set
    /// once a signed transaction exists; after a submission failure or
    /// timeout it is the id to re-query.
    Failed { stage: SwapStage, cause: EngineError, signature: Option<Signature> },
}

/// A collaborator response, tagged with the stage it was fetched for.
#[derive(Debug)]
pub enum SwapEvent {
    Quoted(EngineResult<Quote>),
    Built(EngineResult<Vec<u8>>),
    Signed(EngineResult<(Vec<u8>, Signature)>),
    Submitted(EngineResult<Signature>),
    Confirmed(EngineResult<SignatureStatus>),
}

impl SwapEvent {
    fn stage(&self) -> SwapStage {
        match self {
            SwapEvent::Quoted(_) => SwapStage::Quoted,
            SwapEvent::Built(_) => SwapStage::Built,
            SwapEvent::Signed(_) => SwapStage::Signed,
            SwapEvent::Submitted(_) => SwapStage::Submitted,
            SwapEvent::Confirmed(_) => SwapStage::Confirmed,
        }
    }
}

impl SwapState {
    pub fn new(request: QuoteRequest) -> Self {
        SwapState::Idle { request }
    }

    /// The stage reached, or for `Failed` the stage that failed.
    /// `None` while idle.
    pub fn stage(&self) -> Option<SwapStage> {
        match self {
            SwapState::Idle { .. } => None,
            SwapState::Quoted { .. } => Some(SwapStage::Quoted),
            SwapState::Built { .. } => Some(SwapStage::Built),
            SwapState::Signed { .. } => Some(SwapStage::Signed),
            SwapState::Submitted { .. } => Some(SwapStage::Submitted),
            SwapState::Confirmed { .. } => Some(SwapStage::Confirmed),
            SwapState::Failed { stage, .. } => Some(*stage),
        }
    }

    /// The stage the next successful step enters.
    pub fn next_stage(&self) -> Option<SwapStage> {
        match self {
            SwapState::Idle { .. } => Some(SwapStage::Quoted),
            SwapState::Quoted { .. } => Some(SwapStage::Built),
            SwapState::Built { .. } => Some(SwapStage::Signed),
            SwapState::Signed { .. } => Some(SwapStage::Submitted),
            SwapState::Submitted { .. } => Some(SwapStage::Confirmed),
            SwapState::Confirmed { .. } | SwapState::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapState::Confirmed { .. } | SwapState::Failed { .. })
    }

    pub fn quote(&self) -> Option<&Quote> {
        match self {
            SwapState::Quoted { quote }
            | SwapState::Built { quote, .. }
            | SwapState::Signed { quote, .. }
            | SwapState::Submitted { quote, .. }
            | SwapState::Confirmed { quote, .. } => Some(quote),
            SwapState::Idle { .. } | SwapState::Failed { .. } => None,
        }
    }

    pub fn signature(&self) -> Option<Signature> {
        match self {
            SwapState::Signed { signature, .. }
            | SwapState::Submitted { signature, .. }
            | SwapState::Confirmed { signature, .. } => Some(*signature),
            SwapState::Failed { signature, .. } => *signature,
            _ => None,
        }
    }

    /// Collapse a terminal state: the signature once confirmed, the cause
    /// otherwise.
    pub fn into_result(self) -> EngineResult<Signature> {
        match self {
            SwapState::Confirmed { signature, .. } => Ok(signature),
            SwapState::Failed { cause, .. } => Err(cause),
            other => Err(EngineError::invalid(format!(
                "swap stopped before completion (next stage: {:?})", other.next_stage()
            ))),
        }
    }

    fn fail(self, stage: SwapStage, cause: EngineError) -> SwapState {
        let signature = self.signature();
        SwapState::Failed { stage, cause, signature }
    }
}

/// Advance `state` with a collaborator response. Pure: no I/O, no clocks.
///
/// Terminal states are returned unchanged. An event for a stage other than
/// the next one fails that next stage.
pub fn transition(state: SwapState, event: SwapEvent) -> SwapState {
    let Some(expected) = state.next_stage() else {
        return state;
    };
    if event.stage() != expected {
        let cause = EngineError::invalid(format!(
            "expected a {} response, got {}", expected, event.stage()
        ));
        return state.fail(expected, cause);
    }

    match (state, event) {
        (SwapState::Idle { .. }, SwapEvent::Quoted(Ok(quote))) => SwapState::Quoted { quote },
        (SwapState::Quoted { quote }, SwapEvent::Built(Ok(payload))) => SwapState::Built { quote, payload },
        (SwapState::Built { quote, .. }, SwapEvent::Signed(Ok((signed, signature)))) => {
            SwapState::Signed { quote, signed, signature }
        }
        (SwapState::Signed { quote, signature, .. }, SwapEvent::Submitted(Ok(returned))) => {
            if returned != signature {
                warn!("[swap] Network returned signature {} for signed tx {}", returned, signature);
            }
            SwapState::Submitted { quote, signature }
        }
        (SwapState::Submitted { quote, signature }, SwapEvent::Confirmed(Ok(status))) => {
            if let Some(err) = &status.err {
                SwapState::Failed {
                    stage: SwapStage::Confirmed,
                    cause: EngineError::Submission(ChainError::Execution(err.clone())),
                    signature: Some(signature),
                }
            } else {
                SwapState::Confirmed { quote, signature, status }
            }
        }
        (state, event) => {
            let cause = match event {
                SwapEvent::Quoted(r) => r.err(),
                SwapEvent::Built(r) => r.err(),
                SwapEvent::Signed(r) => r.err(),
                SwapEvent::Submitted(r) => r.err(),
                SwapEvent::Confirmed(r) => r.err(),
            };
            let cause = cause.unwrap_or_else(|| EngineError::invalid("unexpected swap response"));
            state.fail(expected, cause)
        }
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────

/// Drives a swap through its stages, one collaborator call per step, each
/// raced against the caller's cancel signal.
#[derive(Clone)]
pub struct SwapOrchestrator {
    chain: Arc<dyn ChainClient>,
    quotes: Arc<dyn QuoteClient>,
    balances: BalanceResolver,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl SwapOrchestrator {
    pub fn new(chain: Arc<dyn ChainClient>, quotes: Arc<dyn QuoteClient>) -> Self {
        let balances = BalanceResolver::new(chain.clone());
        Self {
            chain,
            quotes,
            balances,
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_CONFIRM_POLL_INTERVAL_MS),
        }
    }

    pub fn with_confirmation(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.confirm_timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Run from `Idle` until a terminal state.
    pub async fn run(&self, request: QuoteRequest, signer: &Keypair, cancel: &CancelSignal) -> SwapState {
        self.run_with_timeout(request, signer, self.confirm_timeout, cancel).await
    }

    /// [`run`](Self::run) with `confirm_timeout` bounding this swap's
    /// `Submitted → Confirmed` wait instead of the configured one.
    pub async fn run_with_timeout(
        &self,
        request: QuoteRequest,
        signer: &Keypair,
        confirm_timeout: Duration,
        cancel: &CancelSignal,
    ) -> SwapState {
        let mut state = SwapState::new(request);
        while !state.is_terminal() {
            state = self.advance(state, signer, confirm_timeout, cancel).await;
        }
        match &state {
            SwapState::Confirmed { signature, .. } => info!("[swap] Swap confirmed: {}", signature),
            SwapState::Failed { stage, cause, .. } => warn!("[swap] Swap failed at {}: {}", stage, cause),
            _ => {}
        }
        state
    }

    /// Perform the single collaborator call the current state needs and
    /// apply its response.
    pub async fn step(&self, state: SwapState, signer: &Keypair, cancel: &CancelSignal) -> SwapState {
        self.advance(state, signer, self.confirm_timeout, cancel).await
    }

    async fn advance(
        &self,
        state: SwapState,
        signer: &Keypair,
        confirm_timeout: Duration,
        cancel: &CancelSignal,
    ) -> SwapState {
        let event = match &state {
            SwapState::Idle { request } => Some(SwapEvent::Quoted(
                cancel.run(self.fetch_quote(request, signer)).await,
            )),
            SwapState::Quoted { quote } => Some(SwapEvent::Built(
                cancel.run(self.quotes.swap_transaction(&signer.pubkey(), quote)).await,
            )),
            SwapState::Built { payload, .. } => Some(SwapEvent::Signed(
                cancel.check().and_then(|_| sign_wire_transaction(payload, signer)),
            )),
            SwapState::Signed { signed, .. } => Some(SwapEvent::Submitted(
                cancel.run(async {
                    self.chain.send_transaction(signed).await.map_err(EngineError::Submission)
                }).await,
            )),
            SwapState::Submitted { signature, .. } => Some(SwapEvent::Confirmed(
                cancel.run(self.chain.wait_for_confirmation(signature, confirm_timeout, self.poll_interval)).await,
            )),
            SwapState::Confirmed { .. } | SwapState::Failed { .. } => None,
        };
        let Some(event) = event else {
            return state;
        };

        let next = transition(state, event);
        match (&next, next.stage()) {
            (SwapState::Failed { .. }, _) | (_, None) => {}
            (_, Some(stage)) => info!("[swap] → {}", stage),
        }
        next
    }

    /// Balance check, then quote. An insufficient balance never reaches the
    /// routing service.
    async fn fetch_quote(&self, request: &QuoteRequest, signer: &Keypair) -> EngineResult<Quote> {
        if request.amount == 0 {
            return Err(EngineError::invalid("swap amount must be greater than zero"));
        }
        let have = self.balances.balance_of(&signer.pubkey(), &request.input).await?.amount;
        if have < request.amount {
            return Err(EngineError::InsufficientFunds { have, need: request.amount });
        }
        self.quotes.quote(request).await
    }
}

impl fmt::Debug for SwapOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapOrchestrator")
            .field("confirm_timeout", &self.confirm_timeout)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::{AssetRef, Commitment};
    use crate::engine::sol_dex::jupiter::parse_quote_response;

    fn request() -> QuoteRequest {
        QuoteRequest { input: AssetRef::Native, output: AssetRef::Native, amount: 10, slippage_bps: None }
    }

    fn quote() -> Quote {
        let body = serde_json::json!({
            "inputMint": "So11111111111111111111111111111111111111112",
            "inAmount": "10",
            "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "outAmount": "20",
            "otherAmountThreshold": "19",
            "slippageBps": 100,
            "routePlan": [{"swapInfo": {"label": "Orca"}, "percent": 100}]
        });
        parse_quote_response(200, &body.to_string()).unwrap()
    }

    fn sig(n: u8) -> Signature {
        Signature::new([n; 64])
    }

    fn confirmed() -> SignatureStatus {
        SignatureStatus { slot: 1, commitment: Some(Commitment::Confirmed), err: None }
    }

    #[test]
    fn happy_path_reaches_confirmed() {
        let mut s = SwapState::new(request());
        assert_eq!(s.stage(), None);
        s = transition(s, SwapEvent::Quoted(Ok(quote())));
        assert_eq!(s.stage(), Some(SwapStage::Quoted));
        s = transition(s, SwapEvent::Built(Ok(vec![1, 2, 3])));
        assert_eq!(s.stage(), Some(SwapStage::Built));
        s = transition(s, SwapEvent::Signed(Ok((vec![4, 5, 6], sig(7)))));
        assert_eq!(s.signature(), Some(sig(7)));
        s = transition(s, SwapEvent::Submitted(Ok(sig(7))));
        assert_eq!(s.stage(), Some(SwapStage::Submitted));
        s = transition(s, SwapEvent::Confirmed(Ok(confirmed())));
        assert_eq!(s.stage(), Some(SwapStage::Confirmed));
        assert!(s.is_terminal());
        assert_eq!(s.into_result().unwrap(), sig(7));
    }

    #[test]
    fn quote_failure_fails_quoted_stage() {
        let s = transition(SwapState::new(request()), SwapEvent::Quoted(Err(EngineError::quote(404, "Error: Not Found"))));
        match s {
            SwapState::Failed { stage, cause, signature } => {
                assert_eq!(stage, SwapStage::Quoted);
                assert!(cause.to_string().contains("Error: Not Found"));
                assert_eq!(signature, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn submission_failure_keeps_signature_for_requery() {
        let s = SwapState::Signed { quote: quote(), signed: vec![], signature: sig(3) };
        let s = transition(s, SwapEvent::Submitted(Err(EngineError::Submission(ChainError::malformed("x")))));
        assert_eq!(s.stage(), Some(SwapStage::Submitted));
        assert_eq!(s.signature(), Some(sig(3)));
        assert!(matches!(s.into_result(), Err(EngineError::Submission(_))));
    }

    #[test]
    fn timeout_fails_confirmed_stage() {
        let s = SwapState::Submitted { quote: quote(), signature: sig(1) };
        let s = transition(s, SwapEvent::Confirmed(Err(EngineError::Timeout { signature: sig(1).to_string() })));
        assert!(matches!(s, SwapState::Failed { stage: SwapStage::Confirmed, cause: EngineError::Timeout { .. }, .. }));
    }

    #[test]
    fn on_chain_error_is_not_confirmed() {
        let s = SwapState::Submitted { quote: quote(), signature: sig(1) };
        let status = SignatureStatus { err: Some("InstructionError".into()), ..confirmed() };
        let s = transition(s, SwapEvent::Confirmed(Ok(status)));
        assert!(matches!(
            s,
            SwapState::Failed { stage: SwapStage::Confirmed, cause: EngineError::Submission(ChainError::Execution(_)), .. }
        ));
    }

    #[test]
    fn terminal_states_ignore_events() {
        let done = SwapState::Confirmed { quote: quote(), signature: sig(2), status: confirmed() };
        let s = transition(done, SwapEvent::Quoted(Ok(quote())));
        assert!(matches!(s, SwapState::Confirmed { .. }));

        let failed = SwapState::Failed { stage: SwapStage::Built, cause: EngineError::Cancelled, signature: None };
        let s = transition(failed, SwapEvent::Built(Ok(vec![])));
        assert!(matches!(s, SwapState::Failed { stage: SwapStage::Built, cause: EngineError::Cancelled, .. }));
    }

    #[test]
    fn out_of_order_event_fails_next_stage() {
        let s = transition(SwapState::new(request()), SwapEvent::Submitted(Ok(sig(1))));
        assert!(matches!(s, SwapState::Failed { stage: SwapStage::Quoted, cause: EngineError::InvalidArgument(_), .. }));
    }

    #[test]
    fn non_terminal_into_result_is_error() {
        let s = SwapState::Quoted { quote: quote() };
        assert!(!s.is_terminal());
        assert_eq!(s.next_stage(), Some(SwapStage::Built));
        assert!(s.into_result().is_err());
    }
}
