//! Example: Scoped locking with the in-memory store
//!
//! Run with: `cargo run --example scoped_lock`
//!
//! Several tasks compete for one lock; `with_lock` guarantees each releases
//! when its work is done.

use std::time::Duration;

use table_lock::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let provider = std::sync::Arc::new(
        TableLockProvider::builder()
            .store(MemoryLockStore::new())
            .namespace("scoped-demo")
            .poll_interval(Duration::from_millis(1))
            .build()?,
    );

    let mut workers = Vec::new();
    for worker in 0..4 {
        let provider = provider.clone();
        workers.push(tokio::spawn(async move {
            provider
                .with_lock("shared-report", Capabilities::EXCLUSIVE, || async move {
                    println!("worker {} writing report", worker);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    worker
                })
                .await
        }));
    }

    for handle in workers {
        let worker = handle.await??;
        println!("worker {} released the lock", worker);
    }

    Ok(())
}
