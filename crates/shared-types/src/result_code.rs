//! # Result-Code Taxonomy
//!
//! The network reports the outcome of every submission as a named result
//! code (`tesSUCCESS`, `terPRE_SEQ`, ...). Each name has a fixed numeric
//! value, and the numeric band decides how a submitter must react.
//!
//! | band  | range          | bucket            |
//! |-------|----------------|-------------------|
//! | `tel` | -399 ..= -300  | `LocalMalformed`  |
//! | `tem` | -299 ..= -200  | `Malformed`       |
//! | `tef` | -199 ..= -100  | `SequenceFailure` |
//! | `ter` |  -99 ..= -1    | `Retry`           |
//! | `tes` |    0           | `Success`         |
//! | `tec` |  100 ..= 255   | `ClaimedFee`      |
//!
//! Anything else (`tooBusy`, `noNetwork`, ...) is a server error.
//!
//! The table is a protocol constant. It is not derived from the names.

/// Name of the success code.
pub const TES_SUCCESS: &str = "tesSUCCESS";

/// Server error reported when the server is overloaded.
pub const TOO_BUSY: &str = "tooBusy";

/// Named result codes and their numeric values.
pub static RESULT_CODES: &[(&str, i32)] = &[
    // tel: local error, not forwarded
    ("telLOCAL_ERROR", -399),
    ("telBAD_DOMAIN", -398),
    ("telBAD_PATH_COUNT", -397),
    ("telBAD_PUBLIC_KEY", -396),
    ("telFAILED_PROCESSING", -395),
    ("telINSUF_FEE_P", -394),
    ("telNO_DST_PARTIAL", -393),
    ("telCAN_NOT_QUEUE", -392),
    // tem: malformed
    ("temMALFORMED", -299),
    ("temBAD_AMOUNT", -298),
    ("temBAD_CURRENCY", -297),
    ("temBAD_EXPIRATION", -296),
    ("temBAD_FEE", -295),
    ("temBAD_ISSUER", -294),
    ("temBAD_LIMIT", -293),
    ("temBAD_OFFER", -292),
    ("temBAD_PATH", -291),
    ("temBAD_PATH_LOOP", -290),
    ("temBAD_SEND_XRP_LIMIT", -289),
    ("temBAD_SEND_XRP_MAX", -288),
    ("temBAD_SEND_XRP_NO_DIRECT", -287),
    ("temBAD_SEND_XRP_PARTIAL", -286),
    ("temBAD_SEND_XRP_PATHS", -285),
    ("temBAD_SEQUENCE", -284),
    ("temBAD_SIGNATURE", -283),
    ("temBAD_SRC_ACCOUNT", -282),
    ("temBAD_TRANSFER_RATE", -281),
    ("temDST_IS_SRC", -280),
    ("temDST_NEEDED", -279),
    ("temINVALID", -278),
    ("temINVALID_FLAG", -277),
    ("temREDUNDANT", -276),
    ("temRIPPLE_EMPTY", -275),
    ("temDISABLED", -274),
    ("temBAD_SIGNER", -273),
    ("temBAD_QUORUM", -272),
    ("temBAD_WEIGHT", -271),
    ("temUNCERTAIN", -270),
    ("temUNKNOWN", -269),
    // tef: failure, the transaction cannot succeed in this ledger chain
    ("tefFAILURE", -199),
    ("tefALREADY", -198),
    ("tefBAD_ADD_AUTH", -197),
    ("tefBAD_AUTH", -196),
    ("tefBAD_LEDGER", -195),
    ("tefCREATED", -194),
    ("tefEXCEPTION", -193),
    ("tefINTERNAL", -192),
    ("tefNO_AUTH_REQUIRED", -191),
    ("tefPAST_SEQ", -190),
    ("tefWRONG_PRIOR", -189),
    ("tefMASTER_DISABLED", -188),
    ("tefMAX_LEDGER", -187),
    ("tefBAD_SIGNATURE", -186),
    ("tefBAD_QUORUM", -185),
    ("tefNOT_MULTI_SIGNING", -184),
    ("tefBAD_AUTH_MASTER", -183),
    // ter: retry
    ("terRETRY", -99),
    ("terFUNDS_SPENT", -98),
    ("terINSUF_FEE_B", -97),
    ("terNO_ACCOUNT", -96),
    ("terNO_AUTH", -95),
    ("terNO_LINE", -94),
    ("terOWNERS", -93),
    ("terPRE_SEQ", -92),
    ("terLAST", -91),
    ("terNO_RIPPLE", -90),
    ("terQUEUED", -89),
    // tes
    ("tesSUCCESS", 0),
    // tec: claimed fee only
    ("tecCLAIM", 100),
    ("tecPATH_PARTIAL", 101),
    ("tecUNFUNDED_ADD", 102),
    ("tecUNFUNDED_OFFER", 103),
    ("tecUNFUNDED_PAYMENT", 104),
    ("tecFAILED_PROCESSING", 105),
    ("tecDIR_FULL", 121),
    ("tecINSUF_RESERVE_LINE", 122),
    ("tecINSUF_RESERVE_OFFER", 123),
    ("tecNO_DST", 124),
    ("tecNO_DST_INSUF_XRP", 125),
    ("tecNO_LINE_INSUF_RESERVE", 126),
    ("tecNO_LINE_REDUNDANT", 127),
    ("tecPATH_DRY", 128),
    ("tecUNFUNDED", 129),
    ("tecNO_ALTERNATIVE_KEY", 130),
    ("tecNO_REGULAR_KEY", 131),
    ("tecOWNERS", 132),
    ("tecNO_ISSUER", 133),
    ("tecNO_AUTH", 134),
    ("tecNO_LINE", 135),
    ("tecINSUFF_FEE", 136),
    ("tecFROZEN", 137),
    ("tecNO_TARGET", 138),
    ("tecNO_PERMISSION", 139),
    ("tecNO_ENTRY", 140),
    ("tecINSUFFICIENT_RESERVE", 141),
    ("tecNEED_MASTER_KEY", 142),
    ("tecDST_TAG_NEEDED", 143),
    ("tecINTERNAL", 144),
    ("tecOVERSIZE", 145),
];

/// How a submitter must react to a reported result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultBucket {
    /// `tes`: fully applied.
    Success,
    /// `tec`: applied with a secondary failure; the fee is spent.
    ClaimedFee,
    /// `ter`: could succeed later without changes.
    Retry,
    /// `tef`: past or duplicate sequence.
    SequenceFailure,
    /// `tel`: rejected locally before full processing (often underpriced).
    LocalMalformed,
    /// `tem`: rejected outright.
    Malformed,
    /// Not a transaction result: the server itself failed.
    ServerError,
}

impl ResultBucket {
    /// Bucket for a numeric result value.
    pub fn from_value(value: i32) -> Self {
        match value {
            -399..=-300 => Self::LocalMalformed,
            -299..=-200 => Self::Malformed,
            -199..=-100 => Self::SequenceFailure,
            -99..=-1 => Self::Retry,
            0 => Self::Success,
            100..=255 => Self::ClaimedFee,
            _ => Self::ServerError,
        }
    }

    /// Bucket for a reported code name.
    ///
    /// Known names go through the numeric table; unknown names fall back to
    /// their three-letter band prefix.
    pub fn classify(code: &str) -> Self {
        if let Some(value) = result_value(code) {
            return Self::from_value(value);
        }
        match code.get(..3) {
            Some("tel") => Self::LocalMalformed,
            Some("tem") => Self::Malformed,
            Some("tef") => Self::SequenceFailure,
            Some("ter") => Self::Retry,
            Some("tes") => Self::Success,
            Some("tec") => Self::ClaimedFee,
            _ => Self::ServerError,
        }
    }
}

/// Numeric value of a named result code.
pub fn result_value(name: &str) -> Option<i32> {
    RESULT_CODES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

/// Name for a numeric result value.
pub fn result_name(value: i32) -> Option<&'static str> {
    RESULT_CODES
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(n, _)| *n)
}

/// True if the server reported it is overloaded.
pub fn is_overloaded(code: &str) -> bool {
    code == TOO_BUSY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ResultBucket::from_value(-399), ResultBucket::LocalMalformed);
        assert_eq!(ResultBucket::from_value(-300), ResultBucket::LocalMalformed);
        assert_eq!(ResultBucket::from_value(-299), ResultBucket::Malformed);
        assert_eq!(ResultBucket::from_value(-200), ResultBucket::Malformed);
        assert_eq!(ResultBucket::from_value(-199), ResultBucket::SequenceFailure);
        assert_eq!(ResultBucket::from_value(-100), ResultBucket::SequenceFailure);
        assert_eq!(ResultBucket::from_value(-99), ResultBucket::Retry);
        assert_eq!(ResultBucket::from_value(-1), ResultBucket::Retry);
        assert_eq!(ResultBucket::from_value(0), ResultBucket::Success);
        assert_eq!(ResultBucket::from_value(100), ResultBucket::ClaimedFee);
        assert_eq!(ResultBucket::from_value(-400), ResultBucket::ServerError);
        assert_eq!(ResultBucket::from_value(50), ResultBucket::ServerError);
    }

    #[test]
    fn test_classify_known_codes() {
        assert_eq!(ResultBucket::classify("tesSUCCESS"), ResultBucket::Success);
        assert_eq!(ResultBucket::classify("tecNO_DST"), ResultBucket::ClaimedFee);
        assert_eq!(ResultBucket::classify("terPRE_SEQ"), ResultBucket::Retry);
        assert_eq!(ResultBucket::classify("tefPAST_SEQ"), ResultBucket::SequenceFailure);
        assert_eq!(ResultBucket::classify("telINSUF_FEE_P"), ResultBucket::LocalMalformed);
        assert_eq!(ResultBucket::classify("temBAD_AMOUNT"), ResultBucket::Malformed);
    }

    #[test]
    fn test_classify_server_errors() {
        assert_eq!(ResultBucket::classify("tooBusy"), ResultBucket::ServerError);
        assert_eq!(ResultBucket::classify(""), ResultBucket::ServerError);
        assert!(is_overloaded("tooBusy"));
        assert!(!is_overloaded("noNetwork"));
    }

    #[test]
    fn test_unknown_code_falls_back_to_prefix() {
        assert_eq!(ResultBucket::classify("terFUTURE_CODE"), ResultBucket::Retry);
        assert_eq!(ResultBucket::classify("tecFUTURE_CODE"), ResultBucket::ClaimedFee);
    }

    #[test]
    fn test_names_and_values_agree() {
        for (name, value) in RESULT_CODES {
            assert_eq!(result_value(name), Some(*value));
            assert_eq!(result_name(*value), Some(*name));
            assert_eq!(ResultBucket::from_value(*value), ResultBucket::classify(name));
        }
    }
}
