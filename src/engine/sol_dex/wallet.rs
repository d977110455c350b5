// Solana DEX — Wallet
// Keypair (ed25519 signing key), AccountStore (the single active account)

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use log::info;
use parking_lot::RwLock;
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{Pubkey, Signature};
use crate::engine::keystore::Keystore;

// ── Keypair ───────────────────────────────────────────────────────────

/// An ed25519 signing keypair. The secret half is zeroized on drop and is
/// never printed: `Debug` shows only the public address.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS entropy source.
    pub fn generate() -> EngineResult<Self> {
        let mut seed = Zeroizing::new([0u8; 32]);
        OsRng.try_fill_bytes(&mut seed[..]).map_err(|e| {
            EngineError::Io(std::io::Error::other(format!("entropy source failure: {}", e)))
        })?;
        Ok(Self::from_seed(&seed))
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { signing_key: SigningKey::from_bytes(seed) }
    }

    /// Accepts the 64-byte Solana keypair layout (secret ‖ public) or a bare
    /// 32-byte seed. For the 64-byte form the public half must match.
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        match bytes.len() {
            32 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                seed.copy_from_slice(bytes);
                Ok(Self::from_seed(&seed))
            }
            64 => {
                let mut full = Zeroizing::new([0u8; 64]);
                full.copy_from_slice(bytes);
                let signing_key = SigningKey::from_keypair_bytes(&full)
                    .map_err(|_| EngineError::malformed_key("public half does not match secret"))?;
                Ok(Self { signing_key })
            }
            n => Err(EngineError::malformed_key(format!(
                "expected 64-byte keypair or 32-byte seed, got {} bytes", n
            ))),
        }
    }

    /// Decode a base58-encoded keypair (the format wallets export).
    pub fn from_base58(encoded: &str) -> EngineResult<Self> {
        let bytes = Zeroizing::new(
            bs58::decode(encoded.trim()).into_vec()
                .map_err(|e| EngineError::malformed_key(format!("invalid base58: {}", e)))?,
        );
        Self::from_bytes(&bytes)
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new(self.signing_key.verifying_key().to_bytes())
    }

    /// 64-byte keypair export (secret ‖ public), zeroized when dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes())
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        verify_signature(&self.pubkey(), message, signature)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.pubkey())
    }
}

/// Check an ed25519 signature against an address.
pub fn verify_signature(signer: &Pubkey, message: &[u8], signature: &Signature) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(signer.as_bytes()) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    key.verify(message, &sig).is_ok()
}

// ── AccountStore ──────────────────────────────────────────────────────

/// Owns the engine's single active account.
///
/// Persistence is handed to a [`Keystore`]: it receives the raw secret on
/// `create` and supplies it again for `load`. The active keypair is handed
/// out as an `Arc`, so no lock is held while callers talk to the network.
pub struct AccountStore {
    active: RwLock<Option<Arc<Keypair>>>,
    keystore: Arc<dyn Keystore>,
}

impl AccountStore {
    pub fn new(keystore: Arc<dyn Keystore>) -> Self {
        Self { active: RwLock::new(None), keystore }
    }

    /// Generate a new keypair, persist it, and make it active.
    /// If the keystore refuses the secret the new key is discarded, so an
    /// unrecoverable address is never activated.
    pub fn create(&self) -> EngineResult<Pubkey> {
        let keypair = Keypair::generate()?;
        let address = keypair.pubkey();
        let location = self.keystore.save(&address, keypair.to_bytes().as_slice())?;
        *self.active.write() = Some(Arc::new(keypair));
        info!("[wallet] Created new account {} (saved to {})", address, location.display());
        Ok(address)
    }

    /// Reconstruct an account from exported secret bytes and make it active.
    pub fn restore(&self, secret: &[u8]) -> EngineResult<Pubkey> {
        let keypair = Keypair::from_bytes(secret)?;
        Ok(self.activate(keypair))
    }

    /// Same as [`restore`](Self::restore) for a base58-encoded keypair string.
    pub fn restore_base58(&self, encoded: &str) -> EngineResult<Pubkey> {
        let keypair = Keypair::from_base58(encoded)?;
        Ok(self.activate(keypair))
    }

    /// Read secret material from the keystore and restore it.
    pub fn load(&self, path: &Path) -> EngineResult<Pubkey> {
        let secret = self.keystore.load(path)?;
        self.restore(&secret)
    }

    pub fn active_address(&self) -> EngineResult<Pubkey> {
        self.active.read().as_ref()
            .map(|kp| kp.pubkey())
            .ok_or(EngineError::NoActiveAccount)
    }

    pub fn active_keypair(&self) -> EngineResult<Arc<Keypair>> {
        self.active.read().clone().ok_or(EngineError::NoActiveAccount)
    }

    fn activate(&self, keypair: Keypair) -> Pubkey {
        let address = keypair.pubkey();
        *self.active.write() = Some(Arc::new(keypair));
        info!("[wallet] Restored account {}", address);
        address
    }
}

impl fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountStore")
            .field("active", &self.active_address().ok())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::keystore::MemoryKeystore;

    #[test]
    fn keypair_bytes_roundtrip() {
        let kp = Keypair::generate().unwrap();
        let restored = Keypair::from_bytes(kp.to_bytes().as_slice()).unwrap();
        assert_eq!(kp.pubkey(), restored.pubkey());
    }

    #[test]
    fn seed_restores_same_address() {
        let kp = Keypair::from_seed(&[42u8; 32]);
        let bytes = kp.to_bytes();
        let from_seed = Keypair::from_bytes(&bytes[..32]).unwrap();
        assert_eq!(kp.pubkey(), from_seed.pubkey());
    }

    #[test]
    fn rejects_bad_lengths_and_mismatched_public_half() {
        assert!(matches!(Keypair::from_bytes(&[1u8; 31]), Err(EngineError::MalformedKey(_))));
        assert!(matches!(Keypair::from_bytes(&[]), Err(EngineError::MalformedKey(_))));

        let mut bytes = *Keypair::from_seed(&[1u8; 32]).to_bytes();
        bytes[40] ^= 0xff;
        assert!(matches!(Keypair::from_bytes(&bytes), Err(EngineError::MalformedKey(_))));
    }

    #[test]
    fn base58_restore() {
        let kp = Keypair::from_seed(&[3u8; 32]);
        let encoded = bs58::encode(kp.to_bytes().as_slice()).into_string();
        assert_eq!(Keypair::from_base58(&encoded).unwrap().pubkey(), kp.pubkey());
        assert!(matches!(Keypair::from_base58("not-base58-0OIl"), Err(EngineError::MalformedKey(_))));
    }

    #[test]
    fn debug_never_prints_secret() {
        let kp = Keypair::from_seed(&[9u8; 32]);
        let rendered = format!("{:?}", kp);
        assert_eq!(rendered, format!("Keypair({})", kp.pubkey()));
    }

    #[test]
    fn sign_and_verify() {
        let kp = Keypair::generate().unwrap();
        let sig = kp.sign(b"hello");
        assert!(kp.verify(b"hello", &sig));
        assert!(!kp.verify(b"hullo", &sig));
    }

    #[test]
    fn store_starts_empty() {
        let store = AccountStore::new(Arc::new(MemoryKeystore::default()));
        assert!(matches!(store.active_address(), Err(EngineError::NoActiveAccount)));
        assert!(matches!(store.active_keypair(), Err(EngineError::NoActiveAccount)));
    }

    #[test]
    fn create_persists_and_load_restores() {
        let keystore = Arc::new(MemoryKeystore::default());
        let store = AccountStore::new(keystore.clone());
        let address = store.create().unwrap();
        assert_eq!(store.active_address().unwrap(), address);

        let path = keystore.path_for(&address);
        let other = AccountStore::new(keystore);
        assert_eq!(other.load(&path).unwrap(), address);
    }

    #[test]
    fn restore_replaces_active_account() {
        let store = AccountStore::new(Arc::new(MemoryKeystore::default()));
        let first = store.restore(&[1u8; 32]).unwrap();
        let second = store.restore(&[2u8; 32]).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.active_address().unwrap(), second);
    }
}
