//! Throughput checks for token issuance, validation and the ledgers.
//!
//! Thresholds are deliberately loose so debug builds pass; they exist to
//! catch order-of-magnitude regressions.
//!
//! Run with: cargo test --test integration_performance -- --nocapture

#![cfg(feature = "algo-hmac-sha256")]

use action_nonce::digest::hmac_sha256::HmacSha256Digest;
use action_nonce::ledger::{MemoryLedger, TokenLedger};
use action_nonce::{NonceConfig, NonceManager, SingleUseGuard};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Performance benchmark result
#[derive(Debug)]
pub struct BenchmarkResult {
    pub operation: String,
    pub duration: Duration,
    pub operations: usize,
    pub ops_per_sec: f64,
}

impl BenchmarkResult {
    pub fn new(operation: &str, duration: Duration, operations: usize) -> Self {
        let ops_per_sec = operations as f64 / duration.as_secs_f64().max(f64::EPSILON);
        Self {
            operation: operation.to_string(),
            duration,
            operations,
            ops_per_sec,
        }
    }

    pub fn print(&self) {
        println!(
            "  {}: {:?} ({:.0} ops/sec, {} ops)",
            self.operation, self.duration, self.ops_per_sec, self.operations
        );
    }

    pub fn assert_min_ops_per_sec(&self, min_ops: f64) {
        assert!(
            self.ops_per_sec >= min_ops,
            "{} should achieve at least {:.0} ops/sec, got {:.0}",
            self.operation,
            min_ops,
            self.ops_per_sec
        );
    }
}

fn benchmark_sync<F: FnOnce()>(operation: &str, operations: usize, f: F) -> BenchmarkResult {
    let start = Instant::now();
    f();
    BenchmarkResult::new(operation, start.elapsed(), operations)
}

/// Benchmark a closure and return the result
pub async fn benchmark<F, Fut, R>(operation: &str, operations: usize, f: F) -> BenchmarkResult
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let start = Instant::now();
    let _ = f().await;
    BenchmarkResult::new(operation, start.elapsed(), operations)
}

fn manager() -> NonceManager {
    let config = NonceConfig {
        ttl: Duration::from_secs(3600),
        pepper_length: 8,
        time_width: 12,
    };
    NonceManager::new(HmacSha256Digest::new(b"bench_secret"), config).unwrap()
}

#[test]
fn test_create_and_validate_throughput() {
    let manager = manager();
    let operations = 2000;

    let mut tokens = Vec::with_capacity(operations);
    let create = benchmark_sync("HMAC-SHA256 create", operations, || {
        for i in 0..operations {
            tokens.push(manager.create("edit", "user", i, "salt").unwrap());
        }
    });

    let validate = benchmark_sync("HMAC-SHA256 validate", operations, || {
        for (i, token) in tokens.iter().enumerate() {
            assert!(manager.validate(token.as_str(), "edit", "user", i, "salt"));
        }
    });

    create.print();
    validate.print();
    create.assert_min_ops_per_sec(1_000.0);
    validate.assert_min_ops_per_sec(1_000.0);
}

#[tokio::test]
async fn test_ledger_backend_comparison() {
    println!("Ledger Backend Performance Comparison");
    println!("=====================================\n");

    let dataset_size = 1000;

    println!("Memory Ledger:");
    let memory_ledger = MemoryLedger::with_capacity(dataset_size);
    let result = benchmark("Memory sequential marks", dataset_size, || async {
        for i in 0..dataset_size {
            memory_ledger
                .mark_used(&format!("key-{i}"), 4600, 1000)
                .await
                .unwrap();
        }
    })
    .await;
    result.print();
    result.assert_min_ops_per_sec(5_000.0);

    let removed = memory_ledger.cleanup_expired(5000).await.unwrap();
    assert_eq!(removed, dataset_size);

    #[cfg(feature = "sqlite-ledger")]
    {
        println!("\nSQLite Ledger:");
        let sqlite_ledger = action_nonce::ledger::SqliteLedger::new(":memory:").unwrap();
        sqlite_ledger.init().await.unwrap();
        let result = benchmark("SQLite sequential marks", dataset_size, || async {
            for i in 0..dataset_size {
                sqlite_ledger
                    .mark_used(&format!("key-{i}"), 4600, 1000)
                    .await
                    .unwrap();
            }
        })
        .await;
        result.print();
        result.assert_min_ops_per_sec(500.0);
    }
}

#[tokio::test]
async fn test_single_use_guard_throughput() {
    let manager = Arc::new(manager());
    let guard = SingleUseGuard::new(Arc::clone(&manager));
    let operations = 1000;

    let tokens: Vec<_> = (0..operations)
        .map(|i| manager.create("pay", "user", i, "").unwrap())
        .collect();

    let result = benchmark("Guard consume", operations, || async {
        for (i, token) in tokens.iter().enumerate() {
            assert!(guard.consume(token.as_str(), "pay", "user", i, "").await.unwrap());
        }
    })
    .await;
    result.print();
    result.assert_min_ops_per_sec(500.0);

    let stats = guard.ledger().get_stats().await.unwrap();
    assert_eq!(stats.total_records, operations);
}
