//! Benchmarks for domsieve classification performance.
//!
//! Run with: cargo bench
//!
//! This benchmark suite measures:
//! - CIDR lookup, indexed vs. linear scan
//! - Per-entry verdict cost across the rule chain
//! - Parallel classification throughput by worker count

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use domsieve::{CidrTable, Classifier, SuffixSet};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Generate a CIDR table with `count` networks of mixed prefix lengths.
fn generate_cidrs(count: usize) -> CidrTable {
    (0..count as u32)
        .map(|i| {
            let prefix_len = [16u8, 20, 22, 24][(i % 4) as usize];
            (0x0100_0000u32.wrapping_add(i << 10), prefix_len)
        })
        .collect()
}

/// Generate a registrable domain set with `count` entries.
fn generate_domains(count: usize) -> SuffixSet {
    (0..count).map(|i| format!("site{}.com", i)).collect()
}

/// Generate addresses; roughly half fall inside the generated networks.
fn generate_ips(count: usize) -> Vec<Ipv4Addr> {
    (0..count as u32)
        .map(|i| {
            if i % 2 == 0 {
                Ipv4Addr::from(0x0100_0000u32.wrapping_add(i << 10) + 7)
            } else {
                Ipv4Addr::from(0xc000_0000u32 + i)
            }
        })
        .collect()
}

/// Generate resolved entries: `.cn` hits, domain hits, CIDR hits, and misses.
fn generate_entries(count: usize) -> Vec<(String, Vec<String>)> {
    (0..count)
        .map(|i| {
            let domain = match i % 4 {
                0 => format!("www.example{}.cn", i),
                1 => format!("cdn.site{}.com", i % 1000),
                2 => format!("api.example{}.org", i),
                _ => format!("unknown{}.nonexistent.net", i),
            };
            let ip = if i % 4 == 2 {
                Ipv4Addr::from(0x0100_0000u32 + 7)
            } else {
                Ipv4Addr::new(203, 0, 113, (i % 250) as u8)
            };
            (domain, vec![ip.to_string()])
        })
        .collect()
}

/// Benchmark CIDR lookup, indexed vs. linear.
fn bench_cidr_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cidr_lookup");
    let ips = generate_ips(1000);

    for size in [1_000usize, 10_000].iter() {
        let table = generate_cidrs(*size);
        group.throughput(Throughput::Elements(ips.len() as u64));

        group.bench_with_input(BenchmarkId::new("indexed", size), size, |b, _| {
            b.iter(|| {
                for ip in &ips {
                    black_box(table.contains(*ip));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("linear", size), size, |b, _| {
            b.iter(|| {
                for ip in &ips {
                    black_box(table.contains_linear(*ip));
                }
            })
        });
    }

    group.finish();
}

/// Benchmark single verdicts through the whole rule chain.
fn bench_verdict(c: &mut Criterion) {
    let classifier = Classifier::new(
        Arc::new(generate_domains(10_000)),
        Arc::new(generate_cidrs(5_000)),
    );
    let ips = vec!["203.0.113.9".to_string()];
    let cidr_ip = vec![Ipv4Addr::from(0x0100_0000u32 + 7).to_string()];

    let mut group = c.benchmark_group("verdict");

    group.bench_function("country_suffix", |b| {
        b.iter(|| black_box(classifier.verdict("www.example.cn", &ips)))
    });

    group.bench_function("registrable_domain", |b| {
        b.iter(|| black_box(classifier.verdict("a.b.site42.com", &ips)))
    });

    group.bench_function("cidr", |b| {
        b.iter(|| black_box(classifier.verdict("api.example.org", &cidr_ip)))
    });

    group.bench_function("no_match", |b| {
        b.iter(|| black_box(classifier.verdict("unknown.nonexistent.net", &ips)))
    });

    group.finish();
}

/// Benchmark batch classification by worker count.
fn bench_classify_all(c: &mut Criterion) {
    let classifier = Classifier::new(
        Arc::new(generate_domains(1_000)),
        Arc::new(generate_cidrs(1_000)),
    );
    let entries = generate_entries(10_000);
    let items: Vec<(&str, &[String])> = entries
        .iter()
        .map(|(d, ips)| (d.as_str(), ips.as_slice()))
        .collect();

    let mut group = c.benchmark_group("classify_all");
    group.throughput(Throughput::Elements(items.len() as u64));

    for workers in [1usize, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::new("workers", workers), workers, |b, &w| {
            b.iter(|| black_box(classifier.classify_all(&items, w).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cidr_lookup, bench_verdict, bench_classify_all);
criterion_main!(benches);
