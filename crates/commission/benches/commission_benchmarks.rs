use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use marketplace_commission::{CommissionTier, FeeKind, TierId, calculate_commission};
use rust_decimal::Decimal;

/// Ascending, gap-free tiers of width 100 with the last one unbounded.
fn ladder(size: usize) -> Vec<CommissionTier> {
    (0..size)
        .map(|i| {
            let min = Decimal::from(i as i64 * 100);
            CommissionTier {
                id: TierId::new(format!("tier-{i}")),
                min,
                max: if i + 1 == size {
                    None
                } else {
                    Some(min + Decimal::ONE_HUNDRED)
                },
                kind: if i % 2 == 0 { FeeKind::Percent } else { FeeKind::Flat },
                value: Decimal::from(5),
            }
        })
        .collect()
}

fn bench_tier_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_commission");

    for size in [1usize, 5, 20, 100] {
        let tiers = ladder(size);
        // Worst case for first-match: the amount lands in the last tier.
        let amount = Decimal::from(size as i64 * 100 - 1);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("last_tier", size), &tiers, |b, tiers| {
            b.iter(|| calculate_commission(black_box(amount), black_box(tiers)))
        });
    }

    let empty: Vec<CommissionTier> = Vec::new();
    group.bench_function("no_match_default", |b| {
        b.iter(|| calculate_commission(black_box(Decimal::from(42)), black_box(&empty)))
    });

    group.finish();
}

criterion_group!(benches, bench_tier_lookup);
criterion_main!(benches);
