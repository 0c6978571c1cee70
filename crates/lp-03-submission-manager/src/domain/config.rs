//! Submission manager configuration.

use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `LP_SUBMISSION_MAX_FEE=5000`.
pub const ENV_PREFIX: &str = "LP_SUBMISSION_";

/// Per-account submission policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Server may be handed secrets for server-side signing.
    pub trusted: bool,
    /// Sign locally; otherwise the server signs.
    pub local_signing: bool,
    /// Compute fees locally from the server's load figures.
    pub local_fee: bool,
    /// Set the fully-canonical-signature flag on every transaction.
    pub canonical_signing: bool,
    /// Multiplier applied on top of the computed fee.
    pub fee_cushion: f64,
    /// Fees above this many drops are never paid.
    pub max_fee: u64,
    /// Fee units charged for an ordinary transaction.
    pub fee_units: u64,
    /// Dispatches per entry before giving up.
    pub max_attempts: u32,
    /// Wait this long for a reply before treating a dispatch as lost.
    #[serde(with = "duration_secs")]
    pub submission_timeout: Duration,
    /// Resubmit on retryable results.
    pub automatic_resubmission: bool,
    /// LastLedgerSequence = closed ledger + 1 + offset.
    pub last_ledger_offset: u32,
    /// Back-off after a failed sequence fetch.
    #[serde(with = "duration_secs")]
    pub sequence_retry_delay: Duration,
    /// Capacity of the validated-sequence and received-id caches.
    pub cache_capacity: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            trusted: false,
            local_signing: true,
            local_fee: true,
            canonical_signing: true,
            fee_cushion: 1.2,
            max_fee: 1_000_000,
            fee_units: 10,
            max_attempts: 10,
            submission_timeout: Duration::from_secs(20),
            automatic_resubmission: true,
            last_ledger_offset: 3,
            sequence_retry_delay: Duration::from_secs(3),
            cache_capacity: 200,
        }
    }
}

impl SubmissionConfig {
    /// Short timeouts for tests.
    pub fn for_testing() -> Self {
        Self {
            submission_timeout: Duration::from_millis(200),
            sequence_retry_delay: Duration::from_millis(50),
            ..Self::default()
        }
    }

    pub fn with_trusted(mut self, trusted: bool) -> Self {
        self.trusted = trusted;
        self
    }

    pub fn with_local_signing(mut self, local_signing: bool) -> Self {
        self.local_signing = local_signing;
        self
    }

    pub fn with_max_fee(mut self, max_fee: u64) -> Self {
        self.max_fee = max_fee;
        self
    }

    pub fn with_fee_cushion(mut self, fee_cushion: f64) -> Self {
        self.fee_cushion = fee_cushion;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_automatic_resubmission(mut self, enabled: bool) -> Self {
        self.automatic_resubmission = enabled;
        self
    }

    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout = timeout;
        self
    }

    pub fn with_last_ledger_offset(mut self, offset: u32) -> Self {
        self.last_ledger_offset = offset;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fee_cushion >= 1.0) {
            return Err(ConfigError::Invalid {
                field: "fee_cushion",
                reason: format!("{} is below 1.0", self.fee_cushion),
            });
        }
        if self.max_fee == 0 {
            return Err(ConfigError::Invalid {
                field: "max_fee",
                reason: "must be positive".into(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "max_attempts",
                reason: "must be positive".into(),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_capacity",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn cache_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Defaults overridden by `LP_SUBMISSION_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Same as [`Self::from_env`] over an explicit variable list.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "TRUSTED" => config.trusted = parse_bool(&name, &value)?,
                "LOCAL_SIGNING" => config.local_signing = parse_bool(&name, &value)?,
                "LOCAL_FEE" => config.local_fee = parse_bool(&name, &value)?,
                "CANONICAL_SIGNING" => config.canonical_signing = parse_bool(&name, &value)?,
                "FEE_CUSHION" => config.fee_cushion = parse(&name, &value)?,
                "MAX_FEE" => config.max_fee = parse(&name, &value)?,
                "FEE_UNITS" => config.fee_units = parse(&name, &value)?,
                "MAX_ATTEMPTS" => config.max_attempts = parse(&name, &value)?,
                "SUBMISSION_TIMEOUT_SECS" => {
                    config.submission_timeout = Duration::from_secs(parse(&name, &value)?)
                }
                "AUTOMATIC_RESUBMISSION" => {
                    config.automatic_resubmission = parse_bool(&name, &value)?
                }
                "LAST_LEDGER_OFFSET" => config.last_ledger_offset = parse(&name, &value)?,
                "SEQUENCE_RETRY_DELAY_SECS" => {
                    config.sequence_retry_delay = Duration::from_secs(parse(&name, &value)?)
                }
                "CACHE_CAPACITY" => config.cache_capacity = parse(&name, &value)?,
                _ => {}
            }
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Env {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
