//! # Field Table
//!
//! Every serializable field has a wire type and a type-specific field code.
//! Together they form the field header and the canonical sort key: fields
//! are always emitted in ascending `(type code, field code)` order.
//!
//! The table is fixed and versioned with the crate.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Wire type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeCode {
    UInt16 = 1,
    UInt32 = 2,
    UInt64 = 3,
    Hash128 = 4,
    Hash256 = 5,
    Amount = 6,
    Blob = 7,
    AccountId = 8,
    Object = 14,
    Array = 15,
    UInt8 = 16,
    Hash160 = 17,
    PathSet = 18,
    Vector256 = 19,
}

impl TypeCode {
    /// Resolve a numeric tag.
    pub fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::UInt16,
            2 => Self::UInt32,
            3 => Self::UInt64,
            4 => Self::Hash128,
            5 => Self::Hash256,
            6 => Self::Amount,
            7 => Self::Blob,
            8 => Self::AccountId,
            14 => Self::Object,
            15 => Self::Array,
            16 => Self::UInt8,
            17 => Self::Hash160,
            18 => Self::PathSet,
            19 => Self::Vector256,
            _ => return None,
        })
    }

    /// Numeric tag.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Field code of the end-of-object and end-of-array markers.
pub const END_MARKER_FIELD: u8 = 1;

/// Encoded end-of-object marker (`Object`, field 1).
pub const OBJECT_END: u8 = 0xE1;

/// Encoded end-of-array marker (`Array`, field 1).
pub const ARRAY_END: u8 = 0xF1;

/// A named field with its wire identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub type_code: TypeCode,
    pub field_code: u8,
}

impl FieldDef {
    const fn new(name: &'static str, type_code: TypeCode, field_code: u8) -> Self {
        Self {
            name,
            type_code,
            field_code,
        }
    }

    /// Canonical sort key.
    pub fn ordinal(&self) -> (u8, u8) {
        (self.type_code.code(), self.field_code)
    }

    /// The 1-3 byte field header.
    pub fn header(&self) -> Vec<u8> {
        encode_header(self.type_code.code(), self.field_code)
    }
}

/// Encode a `(type, field)` pair as a field header.
pub fn encode_header(type_code: u8, field_code: u8) -> Vec<u8> {
    match (type_code < 16, field_code < 16) {
        (true, true) => vec![(type_code << 4) | field_code],
        (false, true) => vec![field_code, type_code],
        (true, false) => vec![type_code << 4, field_code],
        (false, false) => vec![0, type_code, field_code],
    }
}

use TypeCode::*;

static FIELDS: &[FieldDef] = &[
    // UInt16
    FieldDef::new("LedgerEntryType", UInt16, 1),
    FieldDef::new("TransactionType", UInt16, 2),
    FieldDef::new("SignerWeight", UInt16, 3),
    // UInt32
    FieldDef::new("Flags", UInt32, 2),
    FieldDef::new("SourceTag", UInt32, 3),
    FieldDef::new("Sequence", UInt32, 4),
    FieldDef::new("PreviousTxnLgrSeq", UInt32, 5),
    FieldDef::new("LedgerSequence", UInt32, 6),
    FieldDef::new("CloseTime", UInt32, 7),
    FieldDef::new("ParentCloseTime", UInt32, 8),
    FieldDef::new("SigningTime", UInt32, 9),
    FieldDef::new("Expiration", UInt32, 10),
    FieldDef::new("TransferRate", UInt32, 11),
    FieldDef::new("WalletSize", UInt32, 12),
    FieldDef::new("OwnerCount", UInt32, 13),
    FieldDef::new("DestinationTag", UInt32, 14),
    FieldDef::new("HighQualityIn", UInt32, 16),
    FieldDef::new("HighQualityOut", UInt32, 17),
    FieldDef::new("LowQualityIn", UInt32, 18),
    FieldDef::new("LowQualityOut", UInt32, 19),
    FieldDef::new("QualityIn", UInt32, 20),
    FieldDef::new("QualityOut", UInt32, 21),
    FieldDef::new("LoadFee", UInt32, 24),
    FieldDef::new("OfferSequence", UInt32, 25),
    FieldDef::new("FirstLedgerSequence", UInt32, 26),
    FieldDef::new("LastLedgerSequence", UInt32, 27),
    FieldDef::new("TransactionIndex", UInt32, 28),
    FieldDef::new("OperationLimit", UInt32, 29),
    FieldDef::new("ReferenceFeeUnits", UInt32, 30),
    FieldDef::new("ReserveBase", UInt32, 31),
    FieldDef::new("ReserveIncrement", UInt32, 32),
    FieldDef::new("SetFlag", UInt32, 33),
    FieldDef::new("ClearFlag", UInt32, 34),
    FieldDef::new("SignerQuorum", UInt32, 35),
    FieldDef::new("CancelAfter", UInt32, 36),
    FieldDef::new("FinishAfter", UInt32, 37),
    FieldDef::new("SignerListID", UInt32, 38),
    // UInt64
    FieldDef::new("IndexNext", UInt64, 1),
    FieldDef::new("IndexPrevious", UInt64, 2),
    FieldDef::new("BookNode", UInt64, 3),
    FieldDef::new("OwnerNode", UInt64, 4),
    FieldDef::new("BaseFee", UInt64, 5),
    FieldDef::new("ExchangeRate", UInt64, 6),
    FieldDef::new("LowNode", UInt64, 7),
    FieldDef::new("HighNode", UInt64, 8),
    // Hash128
    FieldDef::new("EmailHash", Hash128, 1),
    // Hash256
    FieldDef::new("LedgerHash", Hash256, 1),
    FieldDef::new("ParentHash", Hash256, 2),
    FieldDef::new("TransactionHash", Hash256, 3),
    FieldDef::new("AccountHash", Hash256, 4),
    FieldDef::new("PreviousTxnID", Hash256, 5),
    FieldDef::new("LedgerIndex", Hash256, 6),
    FieldDef::new("WalletLocator", Hash256, 7),
    FieldDef::new("RootIndex", Hash256, 8),
    FieldDef::new("AccountTxnID", Hash256, 9),
    FieldDef::new("BookDirectory", Hash256, 16),
    FieldDef::new("InvoiceID", Hash256, 17),
    FieldDef::new("Nickname", Hash256, 18),
    FieldDef::new("Amendment", Hash256, 19),
    FieldDef::new("TicketID", Hash256, 20),
    FieldDef::new("Digest", Hash256, 21),
    // Amount
    FieldDef::new("Amount", Amount, 1),
    FieldDef::new("Balance", Amount, 2),
    FieldDef::new("LimitAmount", Amount, 3),
    FieldDef::new("TakerPays", Amount, 4),
    FieldDef::new("TakerGets", Amount, 5),
    FieldDef::new("LowLimit", Amount, 6),
    FieldDef::new("HighLimit", Amount, 7),
    FieldDef::new("Fee", Amount, 8),
    FieldDef::new("SendMax", Amount, 9),
    FieldDef::new("DeliverMin", Amount, 10),
    FieldDef::new("MinimumOffer", Amount, 16),
    FieldDef::new("RippleEscrow", Amount, 17),
    FieldDef::new("DeliveredAmount", Amount, 18),
    // Blob
    FieldDef::new("PublicKey", Blob, 1),
    FieldDef::new("MessageKey", Blob, 2),
    FieldDef::new("SigningPubKey", Blob, 3),
    FieldDef::new("TxnSignature", Blob, 4),
    FieldDef::new("Signature", Blob, 6),
    FieldDef::new("Domain", Blob, 7),
    FieldDef::new("FundCode", Blob, 8),
    FieldDef::new("RemoveCode", Blob, 9),
    FieldDef::new("ExpireCode", Blob, 10),
    FieldDef::new("CreateCode", Blob, 11),
    FieldDef::new("MemoType", Blob, 12),
    FieldDef::new("MemoData", Blob, 13),
    FieldDef::new("MemoFormat", Blob, 14),
    // AccountID
    FieldDef::new("Account", AccountId, 1),
    FieldDef::new("Owner", AccountId, 2),
    FieldDef::new("Destination", AccountId, 3),
    FieldDef::new("Issuer", AccountId, 4),
    FieldDef::new("Target", AccountId, 7),
    FieldDef::new("RegularKey", AccountId, 8),
    // Object
    FieldDef::new("TransactionMetaData", Object, 2),
    FieldDef::new("CreatedNode", Object, 3),
    FieldDef::new("DeletedNode", Object, 4),
    FieldDef::new("ModifiedNode", Object, 5),
    FieldDef::new("PreviousFields", Object, 6),
    FieldDef::new("FinalFields", Object, 7),
    FieldDef::new("NewFields", Object, 8),
    FieldDef::new("TemplateEntry", Object, 9),
    FieldDef::new("Memo", Object, 10),
    FieldDef::new("SignerEntry", Object, 11),
    FieldDef::new("Signer", Object, 16),
    // Array
    FieldDef::new("SigningAccounts", Array, 2),
    FieldDef::new("Signers", Array, 3),
    FieldDef::new("SignerEntries", Array, 4),
    FieldDef::new("Template", Array, 5),
    FieldDef::new("Necessary", Array, 6),
    FieldDef::new("Sufficient", Array, 7),
    FieldDef::new("AffectedNodes", Array, 8),
    FieldDef::new("Memos", Array, 9),
    // UInt8
    FieldDef::new("CloseResolution", UInt8, 1),
    FieldDef::new("Method", UInt8, 2),
    FieldDef::new("TransactionResult", UInt8, 3),
    // Hash160
    FieldDef::new("TakerPaysCurrency", Hash160, 1),
    FieldDef::new("TakerPaysIssuer", Hash160, 2),
    FieldDef::new("TakerGetsCurrency", Hash160, 3),
    FieldDef::new("TakerGetsIssuer", Hash160, 4),
    // PathSet
    FieldDef::new("Paths", PathSet, 1),
    // Vector256
    FieldDef::new("Indexes", Vector256, 1),
    FieldDef::new("Hashes", Vector256, 2),
    FieldDef::new("Amendments", Vector256, 3),
];

static BY_NAME: LazyLock<HashMap<&'static str, &'static FieldDef>> =
    LazyLock::new(|| FIELDS.iter().map(|f| (f.name, f)).collect());

static BY_CODE: LazyLock<HashMap<(u8, u8), &'static FieldDef>> =
    LazyLock::new(|| FIELDS.iter().map(|f| (f.ordinal(), f)).collect());

/// Look up a field by its JSON name.
pub fn field_by_name(name: &str) -> Option<&'static FieldDef> {
    BY_NAME.get(name).copied()
}

/// Reverse lookup from a decoded header.
pub fn field_by_code(type_code: u8, field_code: u8) -> Option<&'static FieldDef> {
    BY_CODE.get(&(type_code, field_code)).copied()
}

/// All known fields.
pub fn all_fields() -> &'static [FieldDef] {
    FIELDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encodings() {
        assert_eq!(encode_header(6, 4), vec![0x64]);
        assert_eq!(encode_header(16, 3), vec![0x03, 0x10]);
        assert_eq!(encode_header(2, 20), vec![0x20, 0x14]);
        assert_eq!(encode_header(17, 20), vec![0x00, 0x11, 0x14]);
    }

    #[test]
    fn test_names_and_codes_unique() {
        assert_eq!(BY_NAME.len(), FIELDS.len());
        assert_eq!(BY_CODE.len(), FIELDS.len());
    }

    #[test]
    fn test_lookup_both_directions() {
        let fee = field_by_name("Fee").unwrap();
        assert_eq!(fee.ordinal(), (6, 8));
        assert_eq!(field_by_code(6, 8).unwrap().name, "Fee");
        assert!(field_by_name("NoSuchField").is_none());
        assert!(field_by_code(6, 99).is_none());
    }

    #[test]
    fn test_end_markers() {
        assert_eq!(encode_header(TypeCode::Object.code(), END_MARKER_FIELD), vec![OBJECT_END]);
        assert_eq!(encode_header(TypeCode::Array.code(), END_MARKER_FIELD), vec![ARRAY_END]);
    }
}
