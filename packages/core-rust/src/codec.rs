//! Envelope encoding for requests and responses.
//!
//! The host may speak JSON or named-map `MsgPack`. Both encodings carry the
//! same snake_case field names, so one set of message types serves either.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors encoding or decoding a message envelope.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("msgpack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),
    #[error("msgpack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),
    #[error("unknown wire format: {0}")]
    UnknownFormat(String),
}

/// Encoding used between the host runtime and the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    /// `MsgPack` with named maps (`rmp_serde::to_vec_named`).
    MsgPack,
}

impl WireFormat {
    /// Encode a message.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if the message cannot be serialized.
    pub fn encode<T: Serialize>(self, message: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Json => Ok(serde_json::to_vec(message)?),
            Self::MsgPack => Ok(rmp_serde::to_vec_named(message)?),
        }
    }

    /// Decode a message.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if `bytes` is not a valid encoding of `T`.
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            Self::Json => Ok(serde_json::from_slice(bytes)?),
            Self::MsgPack => Ok(rmp_serde::from_slice(bytes)?),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::MsgPack => write!(f, "msgpack"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "msgpack" | "messagepack" => Ok(Self::MsgPack),
            other => Err(CodecError::UnknownFormat(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{
        PluginResponse, RemoteConnection, RepositoryDiscoveryRequest, StagedStatusResponse,
        StagedStatusResult,
    };
    use crate::types::Status;

    #[test]
    fn parses_format_names() {
        assert_eq!("json".parse::<WireFormat>().unwrap(), WireFormat::Json);
        assert_eq!(" MsgPack ".parse::<WireFormat>().unwrap(), WireFormat::MsgPack);
        assert!(matches!(
            "protobuf".parse::<WireFormat>(),
            Err(CodecError::UnknownFormat(name)) if name == "protobuf"
        ));
    }

    #[test]
    fn display_matches_parse() {
        for format in [WireFormat::Json, WireFormat::MsgPack] {
            assert_eq!(format.to_string().parse::<WireFormat>().unwrap(), format);
        }
    }

    #[test]
    fn both_formats_carry_the_same_request() {
        let mut request = RepositoryDiscoveryRequest {
            source_connection: RemoteConnection::default(),
        };
        request.source_connection.environment.name = "prod-db".into();

        for format in [WireFormat::Json, WireFormat::MsgPack] {
            let bytes = format.encode(&request).unwrap();
            let decoded: RepositoryDiscoveryRequest = format.decode(&bytes).unwrap();
            assert_eq!(decoded, request, "format {format}");
        }
    }

    #[test]
    fn msgpack_response_keeps_status_string() {
        let response: StagedStatusResponse =
            PluginResponse::ReturnValue(StagedStatusResult { status: Status::Inactive });
        let bytes = WireFormat::MsgPack.encode(&response).unwrap();
        let value: serde_json::Value = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(value["return_value"]["status"], "INACTIVE");
    }

    #[test]
    fn malformed_json_is_a_codec_error() {
        let err = WireFormat::Json
            .decode::<RepositoryDiscoveryRequest>(b"{not json")
            .unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
