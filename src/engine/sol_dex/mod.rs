// Wallet Engine — Solana DEX (JSON-RPC + Jupiter)
// Self-custody Solana wallet with on-chain transfer and swap execution.
//
// Module layout:
//   constants    — KNOWN_TOKENS, program ids, endpoints, slippage defaults
//   helpers      — format_units, amount_to_lamports
//   rpc          — ChainClient, RpcChainClient
//   wallet       — Keypair, AccountStore
//   transaction  — instructions, Message, Transaction, sign_wire_transaction, compact-u16, derive_ata
//   balance      — BalanceResolver
//   transfer     — TransactionBuilder (native, token, ensure token account)
//   jupiter      — QuoteClient, JupiterClient, parse_quote_response
//   swap         — SwapState, transition, SwapOrchestrator

pub mod constants;
pub mod helpers;
pub mod rpc;
pub mod wallet;
pub mod transaction;
pub mod balance;
pub mod transfer;
pub mod jupiter;
pub mod swap;

// ── Re-exports ───────────────────────────────────────────────────────────────

pub use balance::BalanceResolver;
pub use jupiter::{parse_quote_response, JupiterClient, QuoteClient};
pub use rpc::{ChainClient, RpcChainClient};
pub use swap::{transition, SwapEvent, SwapOrchestrator, SwapStage, SwapState};
pub use transaction::{derive_ata, sign_wire_transaction, Instruction, Message, Transaction};
pub use transfer::{EnsuredTokenAccount, TransactionBuilder};
pub use wallet::{AccountStore, Keypair};
