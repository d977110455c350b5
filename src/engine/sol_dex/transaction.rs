// Solana DEX — Transaction Building & Signing
// Instruction builders, Message compilation, Transaction signing,
// sign_wire_transaction, decode/encode_compact_u16, derive_ata

use log::{debug, info};
use sha2::{Digest, Sha256};

use super::constants::{
    ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_IX_TRANSFER, SYSTEM_PROGRAM_ID, TOKEN_IX_TRANSFER_CHECKED,
    TOKEN_PROGRAM_ID,
};
use super::wallet::Keypair;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{Hash, Pubkey, Signature};

// ── Instructions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(pubkey: Pubkey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: true }
    }

    pub fn readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

pub(crate) fn program_id(b58: &str) -> EngineResult<Pubkey> {
    b58.parse()
        .map_err(|e| EngineError::Config(format!("bad program id {}: {}", b58, e)))
}

/// System Program transfer: [2u32 LE] + lamports (LE u64).
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> EngineResult<Instruction> {
    let mut data = SYSTEM_IX_TRANSFER.to_le_bytes().to_vec();
    data.extend_from_slice(&lamports.to_le_bytes());
    Ok(Instruction {
        program_id: program_id(SYSTEM_PROGRAM_ID)?,
        accounts: vec![
            AccountMeta::writable(*from, true),
            AccountMeta::writable(*to, false),
        ],
        data,
    })
}

/// SPL Token TransferChecked: [12] + amount (LE u64) + decimals.
/// The token program rejects the transfer if `decimals` disagrees with the mint.
pub fn token_transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> EngineResult<Instruction> {
    let mut data = vec![TOKEN_IX_TRANSFER_CHECKED];
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);
    Ok(Instruction {
        program_id: program_id(TOKEN_PROGRAM_ID)?,
        accounts: vec![
            AccountMeta::writable(*source, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::writable(*destination, false),
            AccountMeta::readonly(*authority, true),
        ],
        data,
    })
}

/// Associated Token Account program Create (empty data).
/// Accounts: [payer, ata, owner, mint, system_program, token_program]
pub fn create_associated_token_account(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> EngineResult<Instruction> {
    let ata = derive_ata(owner, mint)?;
    Ok(Instruction {
        program_id: program_id(ASSOCIATED_TOKEN_PROGRAM_ID)?,
        accounts: vec![
            AccountMeta::writable(*payer, true),
            AccountMeta::writable(ata, false),
            AccountMeta::readonly(*owner, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::readonly(program_id(SYSTEM_PROGRAM_ID)?, false),
            AccountMeta::readonly(program_id(TOKEN_PROGRAM_ID)?, false),
        ],
        data: vec![],
    })
}

// ── Message ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// A legacy message: header, ordered account keys, blockhash, instructions.
///
/// Accounts are ordered fee payer first, then writable signers, readonly
/// signers, writable non-signers, readonly non-signers. The first
/// `num_required_signatures` keys are exactly the keys that must sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    pub fn compile(fee_payer: &Pubkey, instructions: &[Instruction], recent_blockhash: Hash) -> EngineResult<Self> {
        // (pubkey, is_signer, is_writable), first-seen order
        let mut metas: Vec<(Pubkey, bool, bool)> = vec![(*fee_payer, true, true)];
        fn upsert(metas: &mut Vec<(Pubkey, bool, bool)>, key: Pubkey, signer: bool, writable: bool) {
            if let Some(m) = metas.iter_mut().find(|m| m.0 == key) {
                m.1 |= signer;
                m.2 |= writable;
            } else {
                metas.push((key, signer, writable));
            }
        }
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(&mut metas, meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(&mut metas, ix.program_id, false, false);
        }

        // Stable sort keeps the fee payer at index 0 (it ranks first).
        metas.sort_by_key(|(_, signer, writable)| match (signer, writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if metas.len() > u8::MAX as usize + 1 {
            return Err(EngineError::invalid(format!("too many accounts in message: {}", metas.len())));
        }

        let num_required_signatures = metas.iter().filter(|(_, s, _)| *s).count() as u8;
        let num_readonly_signed = metas.iter().filter(|(_, s, w)| *s && !*w).count() as u8;
        let num_readonly_unsigned = metas.iter().filter(|(_, s, w)| !*s && !*w).count() as u8;
        let account_keys: Vec<Pubkey> = metas.into_iter().map(|(k, _, _)| k).collect();

        let index_of = |key: &Pubkey| -> u8 {
            // Every key was inserted above.
            account_keys.iter().position(|k| k == key).unwrap_or_default() as u8
        };
        let compiled = instructions.iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|m| index_of(&m.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            num_required_signatures,
            num_readonly_signed,
            num_readonly_unsigned,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn fee_payer(&self) -> &Pubkey {
        &self.account_keys[0]
    }

    /// Keys whose signatures the network will demand, in slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        &self.account_keys[..self.num_required_signatures as usize]
    }

    /// Serialized message bytes: what every signer signs.
    pub fn serialize(&self) -> Vec<u8> {
        let mut message = vec![
            self.num_required_signatures,
            self.num_readonly_signed,
            self.num_readonly_unsigned,
        ];
        message.extend_from_slice(&encode_compact_u16(self.account_keys.len() as u16));
        for key in &self.account_keys {
            message.extend_from_slice(key.as_bytes());
        }
        message.extend_from_slice(self.recent_blockhash.as_bytes());
        message.extend_from_slice(&encode_compact_u16(self.instructions.len() as u16));
        for ix in &self.instructions {
            message.push(ix.program_id_index);
            message.extend_from_slice(&encode_compact_u16(ix.accounts.len() as u16));
            message.extend_from_slice(&ix.accounts);
            message.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
            message.extend_from_slice(&ix.data);
        }
        message
    }
}

// ── Transaction ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub message: Message,
    pub signatures: Vec<Signature>,
}

impl Transaction {
    pub fn new_unsigned(message: Message) -> Self {
        Self { message, signatures: Vec::new() }
    }

    /// Sign with exactly the required signer set. Offering a key the message
    /// does not need, or omitting one it does, is an error.
    pub fn sign(&mut self, signers: &[&Keypair]) -> EngineResult<()> {
        let required = self.message.signer_keys();

        if let Some(extra) = signers.iter().find(|kp| !required.contains(&kp.pubkey())) {
            return Err(EngineError::SignerMismatch(format!("unused signer {}", extra.pubkey())));
        }

        let bytes = self.message.serialize();
        let mut signatures = Vec::with_capacity(required.len());
        for key in required {
            let kp = signers.iter().find(|kp| kp.pubkey() == *key)
                .ok_or_else(|| EngineError::SignerMismatch(format!("missing signature for {}", key)))?;
            signatures.push(kp.sign(&bytes));
        }
        self.signatures = signatures;
        debug!("[sol_dex] Transaction signed (sigs={}, msg_len={})", self.signatures.len(), bytes.len());
        Ok(())
    }

    pub fn is_signed(&self) -> bool {
        self.signatures.len() == self.message.num_required_signatures as usize
            && !self.signatures.is_empty()
    }

    /// Transaction id: the fee payer's signature.
    pub fn signature(&self) -> Option<Signature> {
        self.signatures.first().copied()
    }

    /// Wire format: [num_signatures (compact-u16)] [signatures (N×64)] [message]
    pub fn serialize(&self) -> EngineResult<Vec<u8>> {
        if !self.is_signed() {
            return Err(EngineError::SignerMismatch(format!(
                "transaction has {} of {} required signatures",
                self.signatures.len(), self.message.num_required_signatures
            )));
        }
        let mut tx = encode_compact_u16(self.signatures.len() as u16);
        for sig in &self.signatures {
            tx.extend_from_slice(sig.as_bytes());
        }
        tx.extend_from_slice(&self.message.serialize());
        Ok(tx)
    }
}

// ── Opaque payload signing ────────────────────────────────────────────

/// Sign a pre-built wire transaction (legacy or versioned) produced by a
/// third party, e.g. a swap route.
///
/// **Wire:** [num_signatures (compact-u16)] [signature_slots (N×64)] [message]
///
/// **Message:** optional version prefix byte (high bit set), then the header
/// whose first byte is the number of required signatures, then the
/// compact-u16 count of static account keys and the keys themselves.
///
/// The payload must require exactly one signature and that signer must be
/// `keypair`. Returns the signed bytes and the resulting transaction id.
pub fn sign_wire_transaction(tx_bytes: &[u8], keypair: &Keypair) -> EngineResult<(Vec<u8>, Signature)> {
    if tx_bytes.is_empty() {
        return Err(EngineError::invalid("Empty transaction"));
    }

    let (num_sigs, sig_header_len) = decode_compact_u16(tx_bytes)?;
    if num_sigs == 0 {
        return Err(EngineError::invalid("Transaction has 0 signatures required"));
    }
    let sigs_start = sig_header_len;
    let sigs_end = sigs_start + (num_sigs as usize * 64);
    if sigs_end >= tx_bytes.len() {
        return Err(EngineError::invalid(format!(
            "Transaction too short: need more than {} bytes for {} signatures, have {}",
            sigs_end, num_sigs, tx_bytes.len()
        )));
    }

    let message = &tx_bytes[sigs_end..];
    let is_versioned = message[0] & 0x80 != 0;
    let header_start = usize::from(is_versioned);
    if message.len() < header_start + 4 {
        return Err(EngineError::invalid("Transaction message header truncated"));
    }
    let num_required = message[header_start];
    if num_required as u16 != num_sigs {
        return Err(EngineError::invalid(format!(
            "Signature slots ({}) disagree with message header ({})", num_sigs, num_required
        )));
    }
    if num_required != 1 {
        return Err(EngineError::SignerMismatch(format!(
            "payload requires {} signers; only the active account can sign", num_required
        )));
    }

    let keys_offset = header_start + 3;
    let (num_keys, keys_len_len) = decode_compact_u16(&message[keys_offset..])?;
    let first_key_start = keys_offset + keys_len_len;
    if num_keys == 0 || message.len() < first_key_start + 32 {
        return Err(EngineError::invalid("Transaction message has no account keys"));
    }
    let fee_payer = Pubkey::try_from_slice(&message[first_key_start..first_key_start + 32])?;
    if fee_payer != keypair.pubkey() {
        return Err(EngineError::SignerMismatch(format!(
            "payload expects signer {}, active account is {}", fee_payer, keypair.pubkey()
        )));
    }

    let signature = keypair.sign(message);
    let mut signed = tx_bytes.to_vec();
    signed[sigs_start..sigs_start + 64].copy_from_slice(signature.as_bytes());

    info!("[sol_dex] Transaction signed (versioned={}, msg_len={})", is_versioned, message.len());
    Ok((signed, signature))
}

// ── compact-u16 ───────────────────────────────────────────────────────

/// Decode Solana compact-u16 encoding
/// Returns (value, bytes_consumed)
pub fn decode_compact_u16(data: &[u8]) -> EngineResult<(u16, usize)> {
    if data.is_empty() {
        return Err(EngineError::invalid("Empty data for compact-u16"));
    }

    let first = data[0] as u16;
    if first < 0x80 {
        return Ok((first, 1));
    }

    if data.len() < 2 {
        return Err(EngineError::invalid("Truncated compact-u16"));
    }
    let second = data[1] as u16;
    if second < 0x80 {
        return Ok(((first & 0x7F) | (second << 7), 2));
    }

    if data.len() < 3 {
        return Err(EngineError::invalid("Truncated compact-u16"));
    }
    let third = data[2] as u16;
    if third > 0x03 {
        return Err(EngineError::invalid("compact-u16 overflow"));
    }
    Ok(((first & 0x7F) | ((second & 0x7F) << 7) | (third << 14), 3))
}

/// Encode a compact-u16 value (Solana serialization)
pub fn encode_compact_u16(val: u16) -> Vec<u8> {
    if val < 0x80 {
        vec![val as u8]
    } else if val < 0x4000 {
        vec![(val & 0x7F | 0x80) as u8, (val >> 7) as u8]
    } else {
        vec![(val & 0x7F | 0x80) as u8, ((val >> 7) & 0x7F | 0x80) as u8, (val >> 14) as u8]
    }
}

// ── Token account derivation ──────────────────────────────────────────

/// Derive the Associated Token Account (ATA) address for (owner, mint).
/// ATA = PDA of [owner, TOKEN_PROGRAM_ID, mint] under the ATA program.
pub fn derive_ata(owner: &Pubkey, mint: &Pubkey) -> EngineResult<Pubkey> {
    let token_program = program_id(TOKEN_PROGRAM_ID)?;
    let ata_program = program_id(ASSOCIATED_TOKEN_PROGRAM_ID)?;
    find_program_address(
        &[owner.as_bytes(), token_program.as_bytes(), mint.as_bytes()],
        &ata_program,
    )
    .map(|(address, _bump)| address)
}

/// Search bump seeds 255 → 0 for the first hash that is off the ed25519 curve.
pub(crate) fn find_program_address(seeds: &[&[u8]], program: &Pubkey) -> EngineResult<(Pubkey, u8)> {
    for bump in (0u8..=255).rev() {
        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update([bump]);
        hasher.update(program.as_bytes());
        hasher.update(b"ProgramDerivedAddress");
        let hash = hasher.finalize();
        let mut point_bytes = [0u8; 32];
        point_bytes.copy_from_slice(&hash);

        // Valid PDA must NOT decompress to an ed25519 point
        if ed25519_dalek::VerifyingKey::from_bytes(&point_bytes).is_err() {
            return Ok((Pubkey::new(point_bytes), bump));
        }
    }
    Err(EngineError::invalid("Could not derive program address"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> Pubkey {
        Pubkey::new([n; 32])
    }

    #[test]
    fn compact_u16_roundtrip_boundaries() {
        for v in [0u16, 1, 0x7f, 0x80, 0x3fff, 0x4000, u16::MAX] {
            let enc = encode_compact_u16(v);
            let (dec, used) = decode_compact_u16(&enc).unwrap();
            assert_eq!(dec, v);
            assert_eq!(used, enc.len());
        }
        assert_eq!(encode_compact_u16(0x80), vec![0x80, 0x01]);
    }

    #[test]
    fn compact_u16_truncated() {
        assert!(decode_compact_u16(&[]).is_err());
        assert!(decode_compact_u16(&[0x80]).is_err());
        assert!(decode_compact_u16(&[0x80, 0x80]).is_err());
    }

    #[test]
    fn system_transfer_layout() {
        let ix = system_transfer(&key(1), &key(2), 5).unwrap();
        assert_eq!(ix.program_id, Pubkey::default());
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &5u64.to_le_bytes());
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    #[test]
    fn transfer_checked_layout() {
        let ix = token_transfer_checked(&key(1), &key(2), &key(3), &key(4), 1_000, 6).unwrap();
        assert_eq!(ix.data[0], 12);
        assert_eq!(&ix.data[1..9], &1_000u64.to_le_bytes());
        assert_eq!(ix.data[9], 6);
        let signers: Vec<_> = ix.accounts.iter().filter(|m| m.is_signer).map(|m| m.pubkey).collect();
        assert_eq!(signers, vec![key(4)]);
    }

    #[test]
    fn compile_orders_fee_payer_first() {
        let payer = key(9);
        let ix = system_transfer(&payer, &key(2), 1).unwrap();
        let msg = Message::compile(&payer, &[ix], Hash::new([3; 32])).unwrap();
        assert_eq!(msg.account_keys, vec![payer, key(2), Pubkey::default()]);
        assert_eq!(msg.num_required_signatures, 1);
        assert_eq!(msg.num_readonly_signed, 0);
        assert_eq!(msg.num_readonly_unsigned, 1);
        assert_eq!(msg.instructions[0].program_id_index, 2);
        assert_eq!(msg.instructions[0].accounts, vec![0, 1]);
    }

    #[test]
    fn compile_merges_duplicate_metas() {
        let payer = key(9);
        // Authority appears readonly-signer in the token ix but is also fee payer.
        let ix = token_transfer_checked(&key(1), &key(2), &key(3), &payer, 1, 0).unwrap();
        let msg = Message::compile(&payer, &[ix], Hash::new([0; 32])).unwrap();
        assert_eq!(msg.signer_keys(), &[payer]);
        assert_eq!(msg.account_keys.iter().filter(|k| **k == payer).count(), 1);
    }

    #[test]
    fn message_serialization_header() {
        let payer = key(9);
        let ix = system_transfer(&payer, &key(2), 1).unwrap();
        let msg = Message::compile(&payer, &[ix], Hash::new([3; 32])).unwrap();
        let bytes = msg.serialize();
        assert_eq!(&bytes[..4], &[1, 0, 1, 3]);
        assert_eq!(&bytes[4..36], payer.as_bytes());
    }

    #[test]
    fn sign_rejects_unused_and_missing_signers() {
        let payer = Keypair::generate().unwrap();
        let stranger = Keypair::generate().unwrap();
        let ix = system_transfer(&payer.pubkey(), &key(2), 1).unwrap();
        let msg = Message::compile(&payer.pubkey(), &[ix], Hash::new([3; 32])).unwrap();

        let mut tx = Transaction::new_unsigned(msg.clone());
        assert!(matches!(tx.sign(&[&payer, &stranger]), Err(EngineError::SignerMismatch(_))));
        assert!(matches!(tx.sign(&[]), Err(EngineError::SignerMismatch(_))));
        assert!(tx.serialize().is_err());

        tx.sign(&[&payer]).unwrap();
        assert!(tx.is_signed());
        let wire = tx.serialize().unwrap();
        assert_eq!(wire[0], 1);
        assert_eq!(&wire[1..65], tx.signature().unwrap().as_bytes());
    }

    #[test]
    fn wire_signing_fills_first_slot() {
        let payer = Keypair::generate().unwrap();
        let ix = system_transfer(&payer.pubkey(), &key(2), 1).unwrap();
        let msg = Message::compile(&payer.pubkey(), &[ix], Hash::new([3; 32])).unwrap();
        let mut unsigned = encode_compact_u16(1);
        unsigned.extend_from_slice(&[0u8; 64]);
        unsigned.extend_from_slice(&msg.serialize());

        let (signed, sig) = sign_wire_transaction(&unsigned, &payer).unwrap();
        assert_eq!(&signed[1..65], sig.as_bytes());
        assert!(payer.verify(&msg.serialize(), &sig));
    }

    #[test]
    fn wire_signing_handles_versioned_prefix() {
        let payer = Keypair::generate().unwrap();
        let ix = system_transfer(&payer.pubkey(), &key(2), 1).unwrap();
        let msg = Message::compile(&payer.pubkey(), &[ix], Hash::new([3; 32])).unwrap();
        let mut v0 = vec![0x80];
        v0.extend_from_slice(&msg.serialize());
        v0.push(0); // no address table lookups
        let mut unsigned = encode_compact_u16(1);
        unsigned.extend_from_slice(&[0u8; 64]);
        unsigned.extend_from_slice(&v0);

        let (_, sig) = sign_wire_transaction(&unsigned, &payer).unwrap();
        assert!(payer.verify(&v0, &sig));
    }

    #[test]
    fn wire_signing_rejects_foreign_payer() {
        let payer = Keypair::generate().unwrap();
        let other = Keypair::generate().unwrap();
        let ix = system_transfer(&payer.pubkey(), &key(2), 1).unwrap();
        let msg = Message::compile(&payer.pubkey(), &[ix], Hash::new([3; 32])).unwrap();
        let mut unsigned = encode_compact_u16(1);
        unsigned.extend_from_slice(&[0u8; 64]);
        unsigned.extend_from_slice(&msg.serialize());

        assert!(matches!(
            sign_wire_transaction(&unsigned, &other),
            Err(EngineError::SignerMismatch(_))
        ));
    }

    #[test]
    fn ata_is_deterministic_and_off_curve() {
        let a = derive_ata(&key(1), &key(2)).unwrap();
        let b = derive_ata(&key(1), &key(2)).unwrap();
        let c = derive_ata(&key(1), &key(3)).unwrap();
        let d = derive_ata(&key(4), &key(2)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert!(ed25519_dalek::VerifyingKey::from_bytes(a.as_bytes()).is_err());
    }

    #[test]
    fn ata_matches_mainnet_derivation() {
        let usdc: Pubkey = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".parse().unwrap();
        let owner: Pubkey = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".parse().unwrap();
        assert_eq!(
            derive_ata(&owner, &usdc).unwrap().to_string(),
            "FGETo8T8wMcN2wCjav8VK6eh3dLk63evNDPxzLSJra8B"
        );

        let system: Pubkey = SYSTEM_PROGRAM_ID.parse().unwrap();
        let token_program = program_id(TOKEN_PROGRAM_ID).unwrap();
        let ata_program = program_id(ASSOCIATED_TOKEN_PROGRAM_ID).unwrap();
        let (address, bump) = find_program_address(
            &[system.as_bytes(), token_program.as_bytes(), usdc.as_bytes()],
            &ata_program,
        ).unwrap();
        assert_eq!(address.to_string(), "HJt8Tjdsc9ms9i4WCZEzhzr4oyf3ANcdzXrNdLPFqm3M");
        assert_eq!(bump, 255);
        assert_eq!(derive_ata(&system, &usdc).unwrap(), address);

        // seeds are order sensitive
        assert_ne!(derive_ata(&usdc, &owner).unwrap(), derive_ata(&owner, &usdc).unwrap());
    }

    #[test]
    fn create_ata_targets_derived_address() {
        let ix = create_associated_token_account(&key(1), &key(5), &key(6)).unwrap();
        assert_eq!(ix.accounts[1].pubkey, derive_ata(&key(5), &key(6)).unwrap());
        assert!(ix.data.is_empty());
    }
}
