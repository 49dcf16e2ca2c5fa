pub mod blocking;
pub mod builder;
pub mod client;
pub mod endpoints;
pub mod types;

// Re-export main types for easier importing
pub use blocking::BlockingNexoClient;
pub use builder::{build_blocking_client, build_client, NexoClientBuilder};
pub use client::NexoClient;
pub use types::{
    AdvancedOrderResponse, Balances, OrderDetails, OrderResponse, Orders, Pairs, Projection,
    Quote, Trade, TradeForOrder, TradeHistory, Transaction, WalletBalance,
};
