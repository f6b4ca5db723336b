//! Crypto Assistant skills backed by the CoinGecko public API.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use skiff_config::CryptoConfig;
use skiff_core::error::SkillError;
use skiff_core::fetch::HttpFetcher;
use skiff_core::skill::{FieldSpec, InputSchema, Skill, SkillInputs};
use std::sync::Arc;

pub const BEHAVIOR: &str = "You are a crypto market assistant. Use your skills to report current coin \
prices, 24h changes and trending coins. Never give financial advice.";

const TRENDING_LIMIT: usize = 7;

fn endpoint(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<String, SkillError> {
    let url = format!("{}/{path}", base_url.trim_end_matches('/'));
    let parsed = if params.is_empty() {
        reqwest::Url::parse(&url)
    } else {
        reqwest::Url::parse_with_params(&url, params)
    };
    parsed
        .map(String::from)
        .map_err(|e| SkillError::InvalidArgument(format!("bad CoinGecko URL {url}: {e}")))
}

pub struct GetCoinPrice {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
    vs_currency: String,
}

impl GetCoinPrice {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, config: &CryptoConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.clone(),
            vs_currency: config.vs_currency.clone(),
        }
    }
}

#[async_trait]
impl Skill for GetCoinPrice {
    fn name(&self) -> &str {
        "get_coin_price"
    }

    fn description(&self) -> &str {
        "Get the current price and 24h change of one or more coins"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
            .field(
                "coin_ids",
                FieldSpec::text("Comma-separated CoinGecko coin ids (e.g. \"bitcoin,ethereum\")"),
            )
            .field(
                "vs_currency",
                FieldSpec::text("Quote currency code (e.g. \"usd\", \"eur\")").optional(),
            )
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        let ids = inputs
            .require_text("coin_ids")?
            .split(',')
            .map(|id| id.trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if ids.is_empty() {
            return Err(SkillError::InvalidArgument("coin_ids must name at least one coin".into()));
        }
        let currency = inputs
            .text("vs_currency")
            .map(str::to_lowercase)
            .unwrap_or_else(|| self.vs_currency.clone());

        let url = endpoint(
            &self.base_url,
            "simple/price",
            &[
                ("ids", ids.as_str()),
                ("vs_currencies", currency.as_str()),
                ("include_24hr_change", "true"),
            ],
        )?;
        let prices = self.fetcher.get_json(&url).await?;

        match prices.as_object() {
            Some(map) if !map.is_empty() => Ok(prices),
            _ => Err(SkillError::ExternalCallFailure(format!("No price data for {ids}"))),
        }
    }
}

#[derive(Debug, Serialize)]
struct TrendingCoin {
    name: String,
    symbol: String,
    market_cap_rank: Option<u64>,
}

pub struct GetTrendingCoins {
    fetcher: Arc<dyn HttpFetcher>,
    base_url: String,
}

impl GetTrendingCoins {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, config: &CryptoConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl Skill for GetTrendingCoins {
    fn name(&self) -> &str {
        "get_trending_coins"
    }

    fn description(&self) -> &str {
        "List the coins trending on CoinGecko right now"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new()
    }

    async fn process(&self, _inputs: SkillInputs) -> Result<Value, SkillError> {
        let url = endpoint(&self.base_url, "search/trending", &[])?;
        let data = self.fetcher.get_json(&url).await?;

        let coins: Vec<TrendingCoin> = data
            .get("coins")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|c| c.get("item"))
            .take(TRENDING_LIMIT)
            .map(|item| TrendingCoin {
                name: item.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
                symbol: item.get("symbol").and_then(Value::as_str).unwrap_or_default().to_string(),
                market_cap_rank: item.get("market_cap_rank").and_then(Value::as_u64),
            })
            .collect();

        if coins.is_empty() {
            return Err(SkillError::ExternalCallFailure("No trending coins returned".into()));
        }
        serde_json::to_value(coins).map_err(|e| SkillError::ExecutionFailed {
            skill: "Trending coins".into(),
            reason: e.to_string(),
        })
    }
}

/// All Crypto Assistant skills in registration order.
pub fn skills(fetcher: Arc<dyn HttpFetcher>, config: &CryptoConfig) -> Vec<Arc<dyn Skill>> {
    vec![
        Arc::new(GetCoinPrice::new(fetcher.clone(), config)),
        Arc::new(GetTrendingCoins::new(fetcher, config)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;
    use serde_json::json;
    use skiff_core::skill::{SkillOutcome, SkillRegistry};

    fn config() -> CryptoConfig {
        CryptoConfig {
            base_url: "https://api.coingecko.com/api/v3/".into(),
            vs_currency: "usd".into(),
        }
    }

    fn registry(fetcher: Arc<MockFetcher>) -> SkillRegistry {
        let mut registry = SkillRegistry::new();
        for skill in skills(fetcher, &config()) {
            registry.register(skill).unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn price_query_builds_url() {
        let fetcher = MockFetcher::fixed(json!({"bitcoin": {"usd": 64000.0, "usd_24h_change": -1.2}}));
        let registry = registry(fetcher.clone());

        let outcome = registry.invoke("get_coin_price", &json!({"coin_ids": " Bitcoin , "})).await;
        assert!(outcome.is_success());
        assert_eq!(
            fetcher.urls()[0],
            "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd&include_24hr_change=true"
        );
    }

    #[tokio::test]
    async fn price_currency_override() {
        let fetcher = MockFetcher::fixed(json!({"ethereum": {"eur": 2900.0}}));
        let registry = registry(fetcher.clone());
        registry
            .invoke("get_coin_price", &json!({"coin_ids": "ethereum", "vs_currency": "EUR"}))
            .await;
        assert!(fetcher.urls()[0].contains("vs_currencies=eur"));
    }

    #[tokio::test]
    async fn unknown_coin_is_failure() {
        let registry = registry(MockFetcher::fixed(json!({})));
        let outcome = registry.invoke("get_coin_price", &json!({"coin_ids": "notacoin"})).await;
        assert!(matches!(outcome, SkillOutcome::Failure(ref m) if m.contains("notacoin")));

        let outcome = registry.invoke("get_coin_price", &json!({"coin_ids": " , "})).await;
        assert!(matches!(outcome, SkillOutcome::Failure(ref m) if m.contains("coin_ids")));
    }

    #[tokio::test]
    async fn trending_takes_top_seven() {
        let coins: Vec<Value> = (1..=10)
            .map(|i| json!({"item": {"name": format!("Coin {i}"), "symbol": format!("C{i}"), "market_cap_rank": i * 10}}))
            .collect();
        let fetcher = MockFetcher::fixed(json!({"coins": coins}));
        let registry = registry(fetcher.clone());

        let outcome = registry.invoke("get_trending_coins", &json!({})).await;
        let SkillOutcome::Success(Value::Array(list)) = outcome else {
            panic!("expected list");
        };
        assert_eq!(list.len(), 7);
        assert_eq!(list[0]["name"], "Coin 1");
        assert_eq!(list[6]["market_cap_rank"], 70);
        assert!(fetcher.urls()[0].ends_with("/search/trending"));
    }

    #[tokio::test]
    async fn trending_empty_is_failure() {
        let registry = registry(MockFetcher::fixed(json!({"coins": []})));
        assert!(!registry.invoke("get_trending_coins", &json!({})).await.is_success());
    }
}
