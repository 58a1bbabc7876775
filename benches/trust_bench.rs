use criterion::{black_box, criterion_group, criterion_main, Criterion};

use trustledger_core::clock::FixedClock;
use trustledger_core::trust::update;
use trustledger_core::{LedgerConfig, MemoryLedger, SecurityLedger, TxContext};

fn bench_trust_update(c: &mut Criterion) {
    c.bench_function("trust_update_1k", |b| {
        b.iter(|| {
            let mut log = update("s1", 0.5, None, 0).unwrap();
            for i in 0..1_000 {
                let score = (i % 10) as f64 / 10.0;
                log = update("s1", black_box(score), Some(&log), i).unwrap();
            }
            log
        })
    });
}

fn bench_record_event(c: &mut Criterion) {
    let contract = SecurityLedger::with_clock(LedgerConfig::default(), FixedClock(0));
    let event = r#"{"event_type":"attack_detected","switch_id":"s1","timestamp":10,"trust_score":0.4,"details":{"src":"10.0.0.2"}}"#;

    c.bench_function("record_event_100", |b| {
        b.iter(|| {
            let mut ledger = MemoryLedger::new();
            for i in 0..100 {
                let tx = TxContext::new(&format!("tx{}", i), "controller-1", 1_000);
                contract
                    .record_event(&mut ledger, &tx, black_box(event))
                    .unwrap();
            }
            ledger.len()
        })
    });
}

criterion_group!(benches, bench_trust_update, bench_record_event);
criterion_main!(benches);
