// Transaction building benchmarks: message compilation, signing, payload
// signing and token-account derivation.
//
// Run with: cargo bench --bench tx_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use solwallet::engine::sol_dex::transaction::{
    derive_ata, sign_wire_transaction, system_transfer, token_transfer_checked, Message, Transaction,
};
use solwallet::engine::sol_dex::wallet::Keypair;
use solwallet::{Hash, Pubkey};

fn bench_compile(c: &mut Criterion) {
    let payer = Keypair::from_seed(&[1u8; 32]);
    let from = payer.pubkey();
    let to = Pubkey::new([2u8; 32]);
    let mint = Pubkey::new([3u8; 32]);
    let ixs = vec![
        system_transfer(&from, &to, 1_000).unwrap(),
        token_transfer_checked(&Pubkey::new([4u8; 32]), &mint, &Pubkey::new([5u8; 32]), &from, 10, 6).unwrap(),
    ];

    c.bench_function("message_compile", |b| {
        b.iter(|| Message::compile(black_box(&from), black_box(&ixs), Hash::new([7u8; 32])).unwrap())
    });

    let message = Message::compile(&from, &ixs, Hash::new([7u8; 32])).unwrap();
    c.bench_function("transaction_sign_serialize", |b| {
        b.iter(|| {
            let mut tx = Transaction::new_unsigned(message.clone());
            tx.sign(&[&payer]).unwrap();
            tx.serialize().unwrap()
        })
    });

    let mut wire = vec![1u8];
    wire.extend_from_slice(&[0u8; 64]);
    wire.extend_from_slice(&message.serialize());
    c.bench_function("sign_wire_transaction", |b| {
        b.iter(|| sign_wire_transaction(black_box(&wire), &payer).unwrap())
    });
}

fn bench_derive_ata(c: &mut Criterion) {
    let owner = Pubkey::new([9u8; 32]);
    let mint: Pubkey = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".parse().unwrap();
    c.bench_function("derive_ata", |b| {
        b.iter(|| derive_ata(black_box(&owner), black_box(&mint)).unwrap())
    });
}

criterion_group!(benches, bench_compile, bench_derive_ata);
criterion_main!(benches);
