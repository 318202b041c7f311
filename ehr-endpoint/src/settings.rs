//! Application settings

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde_derive::Deserialize;
use url::Url;

use ehr_common::db::StoreSettings;
use ehr_common::mapper::RowKeyStrategy;
use ehr_common::util::deserialize_u32_to_duration;

pub const ENV_PREFIX: &str = "ehr";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    /// Base URL of the HBase REST gateway
    pub store_url: String,
    /// Request timeout for record reads and writes, in seconds
    #[serde(deserialize_with = "deserialize_u32_to_duration")]
    pub store_timeout: Duration,
    /// Timeout for the connectivity check, in seconds
    #[serde(deserialize_with = "deserialize_u32_to_duration")]
    pub health_timeout: Duration,
    /// Append a random suffix to generated sub-record row keys
    pub row_key_suffix: bool,

    pub max_data_bytes: usize,
    pub human_logs: bool,

    pub statsd_host: Option<String>,
    pub statsd_port: u16,
    pub statsd_label: String,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            host: "0.0.0.0".to_string(),
            port: 3000,
            store_url: "http://hbase-rest:8080".to_string(),
            store_timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(5),
            row_key_suffix: false,
            max_data_bytes: 65536,
            human_logs: false,
            statsd_host: None,
            statsd_port: 8125,
            statsd_label: "ehr".to_string(),
        }
    }
}

impl Settings {
    /// Load the settings from the config files in order first then the environment.
    pub fn with_env_and_config_files(filenames: &[String]) -> Result<Self, ConfigError> {
        let mut s = Config::builder();

        // Merge the configs from the files
        for filename in filenames {
            s = s.add_source(File::with_name(filename));
        }

        // Merge the environment overrides
        s = s.add_source(Environment::with_prefix(&ENV_PREFIX.to_uppercase()).separator("__"));

        let built = s.build()?;
        let s = built.try_deserialize::<Settings>().map_err(|error| match error {
            // Configuration errors are not very sysop friendly, Try to make them
            // a bit more 3AM useful.
            ConfigError::Message(error_msg) => {
                println!("Bad configuration: {:?}", &error_msg);
                println!("Please set in config file or use environment variable.");
                println!(
                    "For example to set `store_url` use env var `{}__STORE_URL`\n",
                    ENV_PREFIX.to_uppercase()
                );
                error!("Configuration error: Value undefined {:?}", &error_msg);
                ConfigError::NotFound(error_msg)
            }
            _ => {
                error!("Configuration error: Other: {:?}", &error);
                error
            }
        })?;
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = |val: Duration, name| {
            if val.is_zero() {
                return Err(ConfigError::Message(format!(
                    "Invalid {}_{}: cannot be 0",
                    ENV_PREFIX, name
                )));
            }
            Ok(())
        };
        non_zero(self.store_timeout, "STORE_TIMEOUT")?;
        non_zero(self.health_timeout, "HEALTH_TIMEOUT")?;
        Url::parse(&self.store_url).map_err(|e| {
            ConfigError::Message(format!("Invalid {}_STORE_URL: {}", ENV_PREFIX, e))
        })?;
        Ok(())
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            url: self.store_url.clone(),
            timeout: self.store_timeout,
            health_timeout: self.health_timeout,
        }
    }

    pub fn row_keys(&self) -> RowKeyStrategy {
        if self.row_key_suffix {
            RowKeyStrategy::TimestampSuffix
        } else {
            RowKeyStrategy::Timestamp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        // Test that the Config works the way we expect it to.
        use std::env;
        let port = format!("{}__PORT", ENV_PREFIX).to_uppercase();
        let store_url = format!("{}__STORE_URL", ENV_PREFIX).to_uppercase();
        let timeout = format!("{}__STORE_TIMEOUT", ENV_PREFIX).to_uppercase();

        let v1 = env::var(&port);
        env::set_var(&port, "9123");
        env::set_var(&store_url, "http://localhost:8085");
        env::set_var(&timeout, "3");
        let settings = Settings::with_env_and_config_files(&Vec::new()).unwrap();
        assert_eq!(settings.port, 9123);
        assert_eq!(settings.store_url, "http://localhost:8085");
        assert_eq!(settings.store_timeout, Duration::from_secs(3));
        assert_eq!(settings.health_timeout, Duration::from_secs(5));
        assert_eq!(settings.row_keys(), RowKeyStrategy::Timestamp);

        // reset (just in case)
        if let Ok(p) = v1 {
            trace!("Resetting {}", &port);
            env::set_var(&port, p);
        } else {
            env::remove_var(&port);
        }
        env::remove_var(&store_url);
        env::remove_var(&timeout);
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());

        let settings = Settings {
            health_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            store_url: "not a url".to_owned(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_store_settings() {
        let settings = Settings {
            row_key_suffix: true,
            ..Default::default()
        };
        let store = settings.store_settings();
        assert_eq!(store.url, "http://hbase-rest:8080");
        assert_eq!(store.timeout, Duration::from_secs(10));
        assert_eq!(settings.row_keys(), RowKeyStrategy::TimestampSuffix);
    }
}
