//! # Object Schemas
//!
//! Which fields an object of a given kind must, may, or by default carries.
//! Kinds are transaction types, ledger-entry types, and transaction metadata.

use super::errors::CodecError;
use serde_json::{Map, Value};
use std::fmt;

/// Presence requirement for a field within a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
    /// May be omitted; the network assumes a default value.
    Default,
}

use Requirement::*;

/// Transaction types and their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Payment,
    EscrowCreate,
    EscrowFinish,
    AccountSet,
    EscrowCancel,
    SetRegularKey,
    OfferCreate,
    OfferCancel,
    TicketCreate,
    TicketCancel,
    SignerListSet,
    TrustSet,
    EnableAmendment,
    SetFee,
}

impl TransactionType {
    pub const ALL: [Self; 14] = [
        Self::Payment,
        Self::EscrowCreate,
        Self::EscrowFinish,
        Self::AccountSet,
        Self::EscrowCancel,
        Self::SetRegularKey,
        Self::OfferCreate,
        Self::OfferCancel,
        Self::TicketCreate,
        Self::TicketCancel,
        Self::SignerListSet,
        Self::TrustSet,
        Self::EnableAmendment,
        Self::SetFee,
    ];

    pub fn code(self) -> u16 {
        match self {
            Self::Payment => 0,
            Self::EscrowCreate => 1,
            Self::EscrowFinish => 2,
            Self::AccountSet => 3,
            Self::EscrowCancel => 4,
            Self::SetRegularKey => 5,
            Self::OfferCreate => 7,
            Self::OfferCancel => 8,
            Self::TicketCreate => 10,
            Self::TicketCancel => 11,
            Self::SignerListSet => 12,
            Self::TrustSet => 20,
            Self::EnableAmendment => 100,
            Self::SetFee => 101,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Payment => "Payment",
            Self::EscrowCreate => "EscrowCreate",
            Self::EscrowFinish => "EscrowFinish",
            Self::AccountSet => "AccountSet",
            Self::EscrowCancel => "EscrowCancel",
            Self::SetRegularKey => "SetRegularKey",
            Self::OfferCreate => "OfferCreate",
            Self::OfferCancel => "OfferCancel",
            Self::TicketCreate => "TicketCreate",
            Self::TicketCancel => "TicketCancel",
            Self::SignerListSet => "SignerListSet",
            Self::TrustSet => "TrustSet",
            Self::EnableAmendment => "EnableAmendment",
            Self::SetFee => "SetFee",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    fn fields(self) -> &'static [(&'static str, Requirement)] {
        match self {
            Self::Payment => &[
                ("Destination", Required),
                ("Amount", Required),
                ("SendMax", Optional),
                ("Paths", Default),
                ("InvoiceID", Optional),
                ("DestinationTag", Optional),
                ("DeliverMin", Optional),
            ],
            Self::EscrowCreate => &[
                ("Amount", Required),
                ("Destination", Required),
                ("FinishAfter", Optional),
                ("CancelAfter", Optional),
                ("DestinationTag", Optional),
            ],
            Self::EscrowFinish | Self::EscrowCancel => {
                &[("Owner", Required), ("OfferSequence", Required)]
            }
            Self::AccountSet => &[
                ("EmailHash", Optional),
                ("WalletLocator", Optional),
                ("WalletSize", Optional),
                ("MessageKey", Optional),
                ("Domain", Optional),
                ("TransferRate", Optional),
                ("SetFlag", Optional),
                ("ClearFlag", Optional),
            ],
            Self::SetRegularKey => &[("RegularKey", Optional)],
            Self::OfferCreate => &[
                ("TakerPays", Required),
                ("TakerGets", Required),
                ("Expiration", Optional),
                ("OfferSequence", Optional),
            ],
            Self::OfferCancel => &[("OfferSequence", Required)],
            Self::TicketCreate => &[("Target", Optional), ("Expiration", Optional)],
            Self::TicketCancel => &[("TicketID", Required)],
            Self::SignerListSet => &[("SignerQuorum", Required), ("SignerEntries", Optional)],
            Self::TrustSet => &[
                ("LimitAmount", Optional),
                ("QualityIn", Optional),
                ("QualityOut", Optional),
            ],
            Self::EnableAmendment => &[("Amendment", Required)],
            Self::SetFee => &[
                ("BaseFee", Required),
                ("ReferenceFeeUnits", Required),
                ("ReserveBase", Required),
                ("ReserveIncrement", Required),
            ],
        }
    }
}

/// Ledger-entry types and their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerEntryType {
    AccountRoot,
    DirectoryNode,
    RippleState,
    Offer,
    LedgerHashes,
    Amendments,
    FeeSettings,
    SignerList,
    Ticket,
    Escrow,
}

impl LedgerEntryType {
    pub const ALL: [Self; 10] = [
        Self::AccountRoot,
        Self::DirectoryNode,
        Self::RippleState,
        Self::Offer,
        Self::LedgerHashes,
        Self::Amendments,
        Self::FeeSettings,
        Self::SignerList,
        Self::Ticket,
        Self::Escrow,
    ];

    pub fn code(self) -> u16 {
        match self {
            Self::AccountRoot => 0x61,
            Self::DirectoryNode => 0x64,
            Self::RippleState => 0x72,
            Self::Offer => 0x6f,
            Self::LedgerHashes => 0x68,
            Self::Amendments => 0x66,
            Self::FeeSettings => 0x73,
            Self::SignerList => 0x53,
            Self::Ticket => 0x54,
            Self::Escrow => 0x75,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AccountRoot => "AccountRoot",
            Self::DirectoryNode => "DirectoryNode",
            Self::RippleState => "RippleState",
            Self::Offer => "Offer",
            Self::LedgerHashes => "LedgerHashes",
            Self::Amendments => "Amendments",
            Self::FeeSettings => "FeeSettings",
            Self::SignerList => "SignerList",
            Self::Ticket => "Ticket",
            Self::Escrow => "Escrow",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    fn fields(self) -> &'static [(&'static str, Requirement)] {
        match self {
            Self::AccountRoot => &[
                ("Account", Required),
                ("Sequence", Required),
                ("Balance", Required),
                ("OwnerCount", Required),
                ("PreviousTxnID", Required),
                ("PreviousTxnLgrSeq", Required),
                ("AccountTxnID", Optional),
                ("RegularKey", Optional),
                ("EmailHash", Optional),
                ("WalletLocator", Optional),
                ("WalletSize", Optional),
                ("MessageKey", Optional),
                ("TransferRate", Optional),
                ("Domain", Optional),
            ],
            Self::DirectoryNode => &[
                ("Owner", Optional),
                ("TakerPaysCurrency", Optional),
                ("TakerPaysIssuer", Optional),
                ("TakerGetsCurrency", Optional),
                ("TakerGetsIssuer", Optional),
                ("ExchangeRate", Optional),
                ("Indexes", Required),
                ("RootIndex", Required),
                ("IndexNext", Optional),
                ("IndexPrevious", Optional),
            ],
            Self::RippleState => &[
                ("Balance", Required),
                ("LowLimit", Required),
                ("HighLimit", Required),
                ("PreviousTxnID", Required),
                ("PreviousTxnLgrSeq", Required),
                ("LowNode", Optional),
                ("LowQualityIn", Optional),
                ("LowQualityOut", Optional),
                ("HighNode", Optional),
                ("HighQualityIn", Optional),
                ("HighQualityOut", Optional),
            ],
            Self::Offer => &[
                ("Account", Required),
                ("Sequence", Required),
                ("TakerPays", Required),
                ("TakerGets", Required),
                ("BookDirectory", Required),
                ("BookNode", Required),
                ("OwnerNode", Required),
                ("PreviousTxnID", Required),
                ("PreviousTxnLgrSeq", Required),
                ("Expiration", Optional),
            ],
            Self::LedgerHashes => &[
                ("FirstLedgerSequence", Optional),
                ("LastLedgerSequence", Optional),
                ("Hashes", Required),
            ],
            Self::Amendments => &[("Amendments", Required)],
            Self::FeeSettings => &[
                ("BaseFee", Required),
                ("ReferenceFeeUnits", Required),
                ("ReserveBase", Required),
                ("ReserveIncrement", Required),
            ],
            Self::SignerList => &[
                ("OwnerNode", Required),
                ("SignerQuorum", Required),
                ("SignerEntries", Required),
                ("SignerListID", Required),
                ("PreviousTxnID", Required),
                ("PreviousTxnLgrSeq", Required),
            ],
            Self::Ticket => &[
                ("Account", Required),
                ("Sequence", Required),
                ("OwnerNode", Required),
                ("Target", Optional),
                ("Expiration", Optional),
            ],
            Self::Escrow => &[
                ("Account", Required),
                ("Destination", Required),
                ("Amount", Required),
                ("OwnerNode", Required),
                ("PreviousTxnID", Required),
                ("PreviousTxnLgrSeq", Required),
                ("FinishAfter", Optional),
                ("CancelAfter", Optional),
                ("DestinationTag", Optional),
            ],
        }
    }
}

static TRANSACTION_COMMON: &[(&str, Requirement)] = &[
    ("TransactionType", Required),
    ("Flags", Optional),
    ("SourceTag", Optional),
    ("Account", Required),
    ("Sequence", Required),
    ("Fee", Required),
    ("OperationLimit", Optional),
    ("PreviousTxnID", Optional),
    ("AccountTxnID", Optional),
    ("LastLedgerSequence", Optional),
    ("SigningPubKey", Required),
    ("TxnSignature", Optional),
    ("Memos", Optional),
    ("Signers", Optional),
];

static LEDGER_ENTRY_COMMON: &[(&str, Requirement)] = &[
    ("LedgerIndex", Optional),
    ("LedgerEntryType", Required),
    ("Flags", Required),
];

static METADATA: &[(&str, Requirement)] = &[
    ("TransactionIndex", Required),
    ("TransactionResult", Required),
    ("AffectedNodes", Required),
    ("DeliveredAmount", Optional),
];

/// The schema an object is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Transaction(TransactionType),
    LedgerEntry(LedgerEntryType),
    Metadata,
}

impl SchemaKind {
    /// All fields permitted for this kind, with their requirement.
    pub fn fields(&self) -> Vec<(&'static str, Requirement)> {
        match self {
            Self::Transaction(t) => TRANSACTION_COMMON
                .iter()
                .chain(t.fields())
                .copied()
                .collect(),
            Self::LedgerEntry(t) => LEDGER_ENTRY_COMMON
                .iter()
                .chain(t.fields())
                .copied()
                .collect(),
            Self::Metadata => METADATA.to_vec(),
        }
    }

    /// Infer the kind of a top-level object.
    ///
    /// `TransactionType` wins over `LedgerEntryType`; an object carrying
    /// `AffectedNodes` is metadata.
    pub fn infer(object: &Map<String, Value>) -> Result<Self, CodecError> {
        if let Some(v) = object.get("TransactionType") {
            return type_from_json(v, TransactionType::from_name, TransactionType::from_code)
                .map(Self::Transaction)
                .ok_or_else(|| CodecError::UnknownKind(format!("TransactionType {v}")));
        }
        if let Some(v) = object.get("LedgerEntryType") {
            return type_from_json(v, LedgerEntryType::from_name, LedgerEntryType::from_code)
                .map(Self::LedgerEntry)
                .ok_or_else(|| CodecError::UnknownKind(format!("LedgerEntryType {v}")));
        }
        if object.contains_key("AffectedNodes") {
            return Ok(Self::Metadata);
        }
        Err(CodecError::UnknownKind(
            "no TransactionType, LedgerEntryType or AffectedNodes".to_string(),
        ))
    }

    /// Check presence rules: every required field set, nothing outside the schema.
    pub fn validate(&self, object: &Map<String, Value>) -> Result<(), CodecError> {
        let fields = self.fields();
        let missing: Vec<String> = fields
            .iter()
            .filter(|(name, req)| *req == Required && !object.contains_key(*name))
            .map(|(name, _)| name.to_string())
            .collect();
        let unknown: Vec<String> = object
            .keys()
            .filter(|key| !fields.iter().any(|(name, _)| name == key))
            .cloned()
            .collect();

        if missing.is_empty() && unknown.is_empty() {
            Ok(())
        } else {
            Err(CodecError::SchemaViolation {
                kind: self.to_string(),
                missing,
                unknown,
            })
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction(t) => write!(f, "transaction {}", t.name()),
            Self::LedgerEntry(t) => write!(f, "ledger entry {}", t.name()),
            Self::Metadata => f.write_str("metadata"),
        }
    }
}

fn type_from_json<T>(
    value: &Value,
    by_name: fn(&str) -> Option<T>,
    by_code: fn(u16) -> Option<T>,
) -> Option<T> {
    match value {
        Value::String(s) => by_name(s),
        Value::Number(n) => n
            .as_u64()
            .and_then(|c| u16::try_from(c).ok())
            .and_then(by_code),
        _ => None,
    }
}
