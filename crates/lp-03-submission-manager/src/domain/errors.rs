use lp_01_binary_codec::CodecError;
use shared_types::LedgerIndex;
use thiserror::Error;

/// Terminal failure of a pending entry.
///
/// Every variant maps to a result code via [`SubmissionError::code`]; local
/// failures use the `tej` family, network failures carry the server's code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Attempt to give secret to untrusted server")]
    UntrustedServer,

    #[error("Missing secret")]
    UnknownSecret,

    #[error("Invalid secret: {reason}")]
    InvalidSecret { reason: String },

    #[error("Not connected: no fee data available")]
    Unconnected,

    #[error("Fee {fee} exceeds maximum {max}")]
    MaxFeeExceeded { fee: u64, max: u64 },

    #[error("Gave up after {attempts} attempts")]
    AttemptsExceeded { attempts: u32 },

    #[error("Resubmission requires local signing")]
    LocalSigningRequired,

    #[error("Ledger {ledger_index} passed LastLedgerSequence {last_ledger}")]
    LedgerExpired {
        last_ledger: LedgerIndex,
        ledger_index: LedgerIndex,
    },

    #[error("Aborted")]
    Aborted,

    #[error("Transaction could not be serialized: {0}")]
    Malformed(#[from] CodecError),

    #[error("{code}: {}", .message.as_deref().unwrap_or(""))]
    Network {
        code: String,
        message: Option<String>,
    },
}

impl SubmissionError {
    pub fn code(&self) -> &str {
        match self {
            Self::UntrustedServer => "tejServerUntrusted",
            Self::UnknownSecret => "tejSecretUnknown",
            Self::InvalidSecret { .. } => "tejSecretInvalid",
            Self::Unconnected => "tejUnconnected",
            Self::MaxFeeExceeded { .. } => "tejMaxFeeExceeded",
            Self::AttemptsExceeded { .. } => "tejAttemptsExceeded",
            Self::LocalSigningRequired => "tejLocalSigningRequired",
            Self::LedgerExpired { .. } => "tejMaxLedger",
            Self::Aborted => "tejAbort",
            Self::Malformed(_) => "temMALFORMED",
            Self::Network { code, .. } => code.as_str(),
        }
    }

    /// Failed before anything reached the network.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Network { .. } | Self::LedgerExpired { .. })
    }
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Environment variable {name}: cannot parse {value:?}")]
    Env { name: String, value: String },
}
