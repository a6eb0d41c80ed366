//! Embedding ipup-core without the binary
//!
//! Wires a cycle out of custom in-process components: a fixed resolver, a
//! publisher that prints instead of calling the network, and the in-memory
//! state store. Run with:
//!
//! ```bash
//! cargo run -p ipup-core --example embedded
//! ```

use std::net::IpAddr;

use async_trait::async_trait;
use ipup_core::config::CycleConfig;
use ipup_core::traits::{IpResolver, PublishReceipt, Publisher};
use ipup_core::{CycleController, MemoryStateStore, Result};

struct FixedResolver(IpAddr);

#[async_trait]
impl IpResolver for FixedResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        Ok(self.0)
    }

    fn source_name(&self) -> &str {
        "fixed"
    }
}

struct PrintingPublisher;

#[async_trait]
impl Publisher for PrintingPublisher {
    async fn publish(&self, ip: IpAddr) -> Result<PublishReceipt> {
        println!("would publish {ip}");
        Ok(PublishReceipt::default())
    }

    fn destination_name(&self) -> &str {
        "stdout"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = MemoryStateStore::new();

    // First cycle publishes, second short-circuits on the stored record
    for run in 1..=2 {
        let (controller, _events) = CycleController::new(
            Box::new(FixedResolver("203.0.113.5".parse()?)),
            Box::new(PrintingPublisher),
            Box::new(store.clone()),
            &CycleConfig::default(),
        )?;

        let outcome = controller.run_once().await?;
        println!("run {run}: {outcome:?}");
    }

    Ok(())
}
