pub mod chart;
pub mod client;
pub mod dashboard;
pub mod domain;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
    const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_API_RETRIES: u32 = 1;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        pub api_timeout_secs: u64,
        /// Total attempts per request; 1 disables retries.
        pub api_retries: u32,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                api_base_url: DEFAULT_API_BASE_URL.to_string(),
                api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
                api_retries: DEFAULT_API_RETRIES,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let api_base_url = lookup("COSTDASH_API_BASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

            let api_timeout_secs = match lookup("COSTDASH_API_TIMEOUT_SECS") {
                Some(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("COSTDASH_API_TIMEOUT_SECS is not a number: {s}"))?,
                None => DEFAULT_API_TIMEOUT_SECS,
            };

            let api_retries = lookup("COSTDASH_API_RETRIES")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(DEFAULT_API_RETRIES);

            Ok(Self {
                api_base_url,
                api_timeout_secs,
                api_retries,
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
            })
        }

        pub fn with_api_base_url(mut self, base_url: Option<String>) -> Self {
            if let Some(url) = base_url {
                self.api_base_url = url;
            }
            self
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            move |key| map.get(key).cloned()
        }

        #[test]
        fn defaults_when_unset() {
            let settings = Settings::from_lookup(lookup(&[])).unwrap();
            assert_eq!(settings.api_base_url, "http://127.0.0.1:8000");
            assert_eq!(settings.api_timeout_secs, 30);
            assert_eq!(settings.api_retries, 1);
            assert!(settings.sentry_dsn.is_none());
        }

        #[test]
        fn reads_overrides() {
            let settings = Settings::from_lookup(lookup(&[
                ("COSTDASH_API_BASE_URL", "https://costs.internal:8443"),
                ("COSTDASH_API_TIMEOUT_SECS", "5"),
                ("COSTDASH_API_RETRIES", "3"),
                ("SENTRY_DSN", ""),
            ]))
            .unwrap();
            assert_eq!(settings.api_base_url, "https://costs.internal:8443");
            assert_eq!(settings.api_timeout_secs, 5);
            assert_eq!(settings.api_retries, 3);
            assert!(settings.sentry_dsn.is_none());
        }

        #[test]
        fn rejects_non_numeric_timeout() {
            let res = Settings::from_lookup(lookup(&[("COSTDASH_API_TIMEOUT_SECS", "soon")]));
            assert!(res.is_err());
        }

        #[test]
        fn cli_override_wins() {
            let settings = Settings::default()
                .with_api_base_url(Some("http://10.0.0.5:8000".to_string()));
            assert_eq!(settings.api_base_url, "http://10.0.0.5:8000");

            let settings = Settings::default().with_api_base_url(None);
            assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        }
    }
}
