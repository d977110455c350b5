// Wallet Engine — Keystore
// Persistence collaborator for secret key material. The engine treats the
// blob as opaque bytes keyed by public address; these implementations
// store it as JSON.
//
//   FileKeystore   — `wallet_<address prefix>.json` files in one directory
//   MemoryKeystore — in-process map, for embedding and tests

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use log::info;
use parking_lot::Mutex;
use zeroize::Zeroizing;

use crate::atoms::constants::{
    KEYSTORE_ADDRESS_PREFIX_LEN, KEYSTORE_FILE_PREFIX, KEYSTORE_HOME_DIR, KEYSTORE_SUBDIR,
};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::Pubkey;

pub trait Keystore: Send + Sync {
    /// Persist `secret` for `address`; returns where it was stored.
    fn save(&self, address: &Pubkey, secret: &[u8]) -> EngineResult<PathBuf>;

    /// Read back secret bytes previously written by `save`.
    fn load(&self, path: &Path) -> EngineResult<Zeroizing<Vec<u8>>>;
}

/// `wallet_<first 10 chars of address>.json`
pub fn key_file_name(address: &Pubkey) -> String {
    let addr = address.to_string();
    let prefix = &addr[..KEYSTORE_ADDRESS_PREFIX_LEN.min(addr.len())];
    format!("{}{}.json", KEYSTORE_FILE_PREFIX, prefix)
}

/// Decode a key file body: a JSON array of byte values (the Solana CLI
/// layout) or a JSON string holding base64.
pub fn decode_secret(text: &str) -> EngineResult<Zeroizing<Vec<u8>>> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| EngineError::Keystore(format!("key file is not JSON: {}", e)))?;
    match value {
        serde_json::Value::Array(items) => {
            let mut bytes = Zeroizing::new(Vec::with_capacity(items.len()));
            for item in &items {
                let byte = item.as_u64()
                    .filter(|b| *b <= u8::MAX as u64)
                    .ok_or_else(|| EngineError::Keystore("key array must hold byte values".into()))?;
                bytes.push(byte as u8);
            }
            Ok(bytes)
        }
        serde_json::Value::String(encoded) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| EngineError::Keystore(format!("invalid base64 key: {}", e)))?;
            Ok(Zeroizing::new(bytes))
        }
        _ => Err(EngineError::Keystore("key file must be a byte array or base64 string".into())),
    }
}

fn encode_secret(secret: &[u8]) -> EngineResult<Zeroizing<String>> {
    Ok(Zeroizing::new(serde_json::to_string(secret)?))
}

// ── File-backed ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FileKeystore {
    dir: PathBuf,
}

impl FileKeystore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.solwallet/keys`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(KEYSTORE_HOME_DIR).join(KEYSTORE_SUBDIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Keystore for FileKeystore {
    fn save(&self, address: &Pubkey, secret: &[u8]) -> EngineResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(key_file_name(address));
        let body = encode_secret(secret)?;
        write_private(&path, body.as_bytes())?;

        info!("[keystore] Saved key for {} to {}", address, path.display());
        Ok(path)
    }

    fn load(&self, path: &Path) -> EngineResult<Zeroizing<Vec<u8>>> {
        let text = Zeroizing::new(fs::read_to_string(path)?);
        decode_secret(&text)
    }
}

/// Write `bytes` to a file readable only by the owner. The file is created
/// with mode 0600, so the secret is never on disk with wider permissions.
fn write_private(path: &Path, bytes: &[u8]) -> EngineResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // `mode` only applies on creation; tighten a pre-existing file too.
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

// ── In-memory ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryKeystore {
    blobs: Mutex<HashMap<PathBuf, Zeroizing<String>>>,
}

impl MemoryKeystore {
    pub fn path_for(&self, address: &Pubkey) -> PathBuf {
        PathBuf::from(key_file_name(address))
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

impl Keystore for MemoryKeystore {
    fn save(&self, address: &Pubkey, secret: &[u8]) -> EngineResult<PathBuf> {
        let path = self.path_for(address);
        self.blobs.lock().insert(path.clone(), encode_secret(secret)?);
        Ok(path)
    }

    fn load(&self, path: &Path) -> EngineResult<Zeroizing<Vec<u8>>> {
        let blobs = self.blobs.lock();
        let text = blobs.get(path)
            .ok_or_else(|| EngineError::Keystore(format!("no key stored at {}", path.display())))?;
        decode_secret(text)
    }
}
