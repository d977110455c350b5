// Solana DEX — Constants
// KNOWN_TOKENS, program ids, public endpoints, slippage defaults.

/// Well-known SPL tokens on Solana mainnet (symbol, mint_address, decimals).
/// Seeds the asset registry; config `[[assets]]` entries extend or override it.
pub(crate) const KNOWN_TOKENS: &[(&str, &str, u8)] = &[
    ("SOL",   "So11111111111111111111111111111111111111112",  9),
    ("USDC",  "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 6),
    ("USDT",  "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",  6),
    ("BONK",  "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",  5),
    ("JUP",   "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN",   6),
    ("RAY",   "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R",  6),
    ("WIF",   "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm",  6),
    ("MSOL",  "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So",   9),
];

/// Wrapped-SOL mint. Quote services use it to denote the native asset.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// Decimals of the native asset (1 SOL = 10^9 lamports).
pub const NATIVE_DECIMALS: u8 = 9;

/// Jupiter-compatible quote/swap API base URL.
pub(crate) const DEFAULT_QUOTE_API: &str = "https://quote-api.jup.ag/v6";

/// Program ids
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Public cluster endpoints by network name.
pub(crate) const NETWORK_ENDPOINTS: &[(&str, &str)] = &[
    ("mainnet",   "https://api.mainnet-beta.solana.com"),
    ("testnet",   "https://api.testnet.solana.com"),
    ("devnet",    "https://api.devnet.solana.com"),
    ("localhost", "http://localhost:8899"),
];

/// Default slippage tolerance (1% = 100 bps)
pub(crate) const DEFAULT_SLIPPAGE_BPS: u16 = 100;
/// Maximum allowed slippage (50%, volatile meme tokens need it)
pub(crate) const MAX_SLIPPAGE_BPS: u16 = 5000;

/// Instruction discriminators
pub(crate) const SYSTEM_IX_TRANSFER: u32 = 2;
pub(crate) const TOKEN_IX_TRANSFER_CHECKED: u8 = 12;
