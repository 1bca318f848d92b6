//! Example demonstrating SQLite-based table locks.
//!
//! Run two copies at once to watch them contend:
//! `cargo run --example sqlite_lock`

use std::time::Duration;

use table_lock::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Every process must open the same database file
    let url = std::env::var("SQLITE_URL")
        .unwrap_or_else(|_| "sqlite:///tmp/table-locks.db".to_string());
    println!("Opening lock database at: {}", url);

    let store = SqliteLockStore::connect(&url).await?;
    store.ensure_schema().await?;

    let provider = TableLockProvider::builder()
        .store(store)
        .namespace("sqlite-demo")
        .ttl(Duration::from_secs(5))
        .build()?;

    let mut lock = provider.create_lock("example-lock")?;
    println!("Created lock: {}", lock.name());

    println!("Attempting to acquire lock (waiting up to the TTL)...");
    match lock.acquire(Capabilities::EXCLUSIVE).await {
        Ok(_) => {
            println!("Lock acquired successfully!");
            println!("Holding lock for 2 seconds...");

            // Hold the lock for a bit
            tokio::time::sleep(Duration::from_secs(2)).await;

            // Release the lock
            lock.release().await?;
            println!("Lock released!");
        }
        Err(LockError::AcquireFailed { waited, .. }) => {
            println!("Lock still held by another process after {:?}", waited);
        }
        Err(e) => {
            eprintln!("Error acquiring lock: {}", e);
        }
    }

    Ok(())
}
