
use integration_test_config::{utils, TestConfig};
use nexo_pro::{NexoClient, Side};
use rust_decimal::Decimal;
use tokio::time::timeout;

/// Live smoke tests against the production endpoint.
///
/// Run with `RUN_LIVE_TESTS=true cargo test --test live_api_tests`.
#[cfg(test)]
mod live_tests {
    use super::*;

    #[tokio::test]
    async fn test_live_invalid_credentials_are_rejected() {
        if !TestConfig::should_run_live_tests() {
            utils::print_warning("live_invalid_credentials", "RUN_LIVE_TESTS not set");
            return;
        }

        let client = NexoClient::new(TestConfig::create_safe_config()).expect("client builds");
        let result = timeout(
            utils::default_timeout(),
            client.get_price_quote(
                "ETH/USDT",
                Decimal::new(1000, 1),
                Side::Buy,
                &[] as &[&str],
            ),
        )
        .await;

        match result {
            Ok(Err(err)) => {
                let code = err.api_error().map(|api| api.code());
                utils::print_test_result(
                    "live_invalid_credentials",
                    code == Some(100),
                    &err.to_string(),
                );
                assert_eq!(code, Some(100), "unexpected error: {err}");
            }
            Ok(Ok(payload)) => panic!("invalid credentials were accepted: {payload}"),
            Err(_) => utils::print_warning("live_invalid_credentials", "timed out"),
        }
    }

    #[tokio::test]
    async fn test_live_pairs_with_env_credentials() {
        if !TestConfig::should_run_live_tests() {
            return;
        }

        let config = TestConfig::create_config_from_env();
        let client = NexoClient::new(config).expect("client builds");

        match timeout(utils::default_timeout(), client.get_pairs()).await {
            Ok(Ok(payload)) => {
                let size = payload.to_string().len();
                utils::print_test_result("live_pairs", true, &format!("{} bytes", size));
            }
            Ok(Err(err)) => utils::print_warning("live_pairs", &err.to_string()),
            Err(_) => utils::print_warning("live_pairs", "timed out"),
        }
    }
}
