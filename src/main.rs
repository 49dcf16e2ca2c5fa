use nexo_pro::exchanges::nexo::{Balances, Pairs};
use nexo_pro::{NexoClient, NexoConfig, Projection};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Reads NEXO_PUBLIC_KEY and NEXO_SECRET_KEY, from .env when present
    #[cfg(feature = "env-file")]
    let config = NexoConfig::from_env_file()?;
    #[cfg(not(feature = "env-file"))]
    let config = NexoConfig::from_env()?;

    let client = NexoClient::new(config)?;

    println!("Fetching pairs...");
    match client.get_pairs().await {
        Ok(payload) => {
            let pairs = Pairs::project(&payload)?;
            let pairs = pairs.pairs.unwrap_or_default();
            println!("Found {} pairs", pairs.len());
            for pair in pairs.iter().take(5) {
                println!("Pair: {}", pair);
            }
        }
        Err(e) => {
            println!("Error fetching pairs: {}", e);
        }
    }

    println!("Fetching balances...");
    match client.get_account_balances().await {
        Ok(payload) => {
            let balances = Balances::project(&payload)?;
            for balance in balances.balances.unwrap_or_default() {
                println!(
                    "{}: available {}, total {}",
                    balance.asset_name.unwrap_or_default(),
                    balance.available_balance.unwrap_or_default(),
                    balance.total_balance.unwrap_or_default()
                );
            }
        }
        Err(e) => {
            println!("Error fetching balances: {}", e);
        }
    }

    client.close();
    Ok(())
}
