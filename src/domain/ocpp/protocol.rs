//! OCPP protocol descriptor
//!
//! Charge points are registered with a composite protocol value such as
//! `"ocpp1.5S"` or `"ocpp1.6J"`: the version followed by a one-letter
//! transport suffix. The descriptor is decoded from that stored value on
//! every dispatch; it is never cached on the connection or the call site.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported OCPP protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OcppVersion {
    /// OCPP 1.5
    V15,
    /// OCPP 1.6
    V16,
}

impl OcppVersion {
    /// Version part of the composite value.
    pub fn value(&self) -> &'static str {
        match self {
            Self::V15 => "1.5",
            Self::V16 => "1.6",
        }
    }

    pub fn from_value(s: &str) -> Option<Self> {
        match s {
            "1.5" => Some(Self::V15),
            "1.6" => Some(Self::V16),
            _ => None,
        }
    }
}

impl fmt::Display for OcppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OCPP {}", self.value())
    }
}

/// Message transport a charge point was registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OcppTransport {
    /// SOAP over HTTP; the charge point exposes an endpoint address.
    Soap,
    /// JSON over WebSocket; delivery goes through the open connection.
    Json,
}

impl OcppTransport {
    /// One-letter suffix used in the composite value.
    pub fn suffix(&self) -> char {
        match self {
            Self::Soap => 'S',
            Self::Json => 'J',
        }
    }

    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            'S' => Some(Self::Soap),
            'J' => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for OcppTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Soap => write!(f, "SOAP"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Decoded protocol descriptor: version plus transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OcppProtocol {
    pub version: OcppVersion,
    pub transport: OcppTransport,
}

impl OcppProtocol {
    pub const V15_SOAP: OcppProtocol = OcppProtocol {
        version: OcppVersion::V15,
        transport: OcppTransport::Soap,
    };
    pub const V16_SOAP: OcppProtocol = OcppProtocol {
        version: OcppVersion::V16,
        transport: OcppTransport::Soap,
    };
    pub const V15_JSON: OcppProtocol = OcppProtocol {
        version: OcppVersion::V15,
        transport: OcppTransport::Json,
    };
    pub const V16_JSON: OcppProtocol = OcppProtocol {
        version: OcppVersion::V16,
        transport: OcppTransport::Json,
    };

    /// Parse a composite value such as `"ocpp1.6J"`.
    ///
    /// Returns `None` for anything that is not exactly a known version
    /// followed by a known transport suffix. Callers treat that as an
    /// unsupported-protocol configuration defect.
    pub fn from_composite(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("ocpp")?;
        let suffix = rest.chars().last()?;
        let transport = OcppTransport::from_suffix(suffix)?;
        // The suffix is a single ASCII letter, so the byte split is safe.
        let version = OcppVersion::from_value(&rest[..rest.len() - 1])?;
        Some(Self { version, transport })
    }

    /// Composite form as stored in the charge point registry.
    pub fn composite_value(&self) -> String {
        format!("ocpp{}{}", self.version.value(), self.transport.suffix())
    }
}

impl fmt::Display for OcppProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.composite_value())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_composite_values() {
        assert_eq!(
            OcppProtocol::from_composite("ocpp1.5S"),
            Some(OcppProtocol::V15_SOAP)
        );
        assert_eq!(
            OcppProtocol::from_composite("ocpp1.6J"),
            Some(OcppProtocol::V16_JSON)
        );
        assert_eq!(
            OcppProtocol::from_composite("ocpp1.5J"),
            Some(OcppProtocol::V15_JSON)
        );
        assert_eq!(
            OcppProtocol::from_composite("ocpp1.6S"),
            Some(OcppProtocol::V16_SOAP)
        );
    }

    #[test]
    fn rejects_unknown_values() {
        for bad in ["", "ocpp", "ocpp1.5", "ocpp2.0J", "ocpp1.6X", "1.6J", "OCPP1.6J"] {
            assert_eq!(OcppProtocol::from_composite(bad), None, "accepted {bad:?}");
        }
    }

    #[test]
    fn composite_value_round_trips() {
        for protocol in [
            OcppProtocol::V15_SOAP,
            OcppProtocol::V15_JSON,
            OcppProtocol::V16_SOAP,
            OcppProtocol::V16_JSON,
        ] {
            let composite = protocol.composite_value();
            assert_eq!(OcppProtocol::from_composite(&composite), Some(protocol));
        }
    }

    #[test]
    fn decoding_is_pure() {
        // Same stored value, same descriptor, every time.
        let first = OcppProtocol::from_composite("ocpp1.6J");
        let second = OcppProtocol::from_composite("ocpp1.6J");
        assert_eq!(first, second);
    }

    #[test]
    fn display_matches_composite_form() {
        assert_eq!(OcppProtocol::V15_SOAP.to_string(), "ocpp1.5S");
        assert_eq!(OcppVersion::V16.to_string(), "OCPP 1.6");
        assert_eq!(OcppTransport::Json.to_string(), "JSON");
    }
}
