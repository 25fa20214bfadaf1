use crate::error::{FactomError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const JSON_RPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// factomd: "Missing Chain Head"
pub const MISSING_CHAIN_HEAD: i64 = -32009;
/// factomd: "Entry Not Found", "Block Not Found" and friends
pub const OBJECT_NOT_FOUND: i64 = -32008;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Json2Request {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Json2Request {
    pub fn new<P: Serialize>(id: u64, method: &str, params: P) -> Result<Json2Request> {
        Ok(Json2Request {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id: Value::from(id),
            method: method.to_string(),
            params: serde_json::to_value(params)?,
        })
    }

    /// Request without a params member
    pub fn bare(id: u64, method: &str) -> Json2Request {
        Json2Request {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id: Value::from(id),
            method: method.to_string(),
            params: Value::Null,
        }
    }

    /// Text that is not JSON is a parse error; JSON that is not a request
    /// object is an invalid request
    pub fn parse(text: &str) -> std::result::Result<Json2Request, JsonError> {
        let value: Value = serde_json::from_str(text).map_err(|_| JsonError::parse_error())?;
        let request: Json2Request =
            serde_json::from_value(value).map_err(|_| JsonError::invalid_request())?;
        if request.jsonrpc != JSON_RPC_VERSION || request.method.is_empty() {
            return Err(JsonError::invalid_request());
        }
        Ok(request)
    }

    /// Decode `params` into the shape a method expects
    pub fn params_as<T: DeserializeOwned>(&self) -> std::result::Result<T, JsonError> {
        serde_json::from_value(self.params.clone()).map_err(|_| JsonError::invalid_params())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonError {
    pub fn new(code: i64, message: &str) -> JsonError {
        JsonError {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn parse_error() -> JsonError {
        JsonError::new(PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request() -> JsonError {
        JsonError::new(INVALID_REQUEST, "Invalid Request")
    }

    pub fn method_not_found() -> JsonError {
        JsonError::new(METHOD_NOT_FOUND, "Method not found")
    }

    pub fn invalid_params() -> JsonError {
        JsonError::new(INVALID_PARAMS, "Invalid params")
    }

    /// An operation ran and failed; the reason becomes the message
    pub fn operation_failed(reason: impl fmt::Display) -> JsonError {
        JsonError::new(INTERNAL_ERROR, &reason.to_string())
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)?;
        if let Some(data) = &self.data {
            write!(f, ": {data}")?;
        }
        Ok(())
    }
}

impl From<JsonError> for FactomError {
    fn from(err: JsonError) -> Self {
        match err.code {
            MISSING_CHAIN_HEAD | OBJECT_NOT_FOUND => FactomError::NotFound(err.to_string()),
            code => FactomError::Rpc {
                code,
                message: match err.data {
                    Some(data) => format!("{}: {data}", err.message),
                    None => err.message,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Json2Response {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

impl Json2Response {
    pub fn success(id: Value, result: Value) -> Json2Response {
        Json2Response {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: JsonError) -> Json2Response {
        Json2Response {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// The typed result, or the server's error
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        let result = self.result.ok_or_else(|| FactomError::Rpc {
            code: INTERNAL_ERROR,
            message: "Response carries neither result nor error".to_string(),
        })?;
        serde_json::from_value(result).map_err(|e| {
            FactomError::Serialization(format!("Unexpected result shape: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = Json2Request::new(7, "chain-head", json!({"chainid": "00"})).unwrap();
        let text = serde_json::to_string(&request).unwrap();
        assert_eq!(
            text,
            r#"{"jsonrpc":"2.0","id":7,"method":"chain-head","params":{"chainid":"00"}}"#
        );

        let bare = serde_json::to_value(Json2Request::bare(1, "heights")).unwrap();
        assert!(bare.get("params").is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            Json2Request::parse("{not json").unwrap_err().code,
            PARSE_ERROR
        );
        assert_eq!(Json2Request::parse("").unwrap_err().code, PARSE_ERROR);
        // well-formed JSON in the wrong shape
        assert_eq!(Json2Request::parse("[1, 2]").unwrap_err().code, INVALID_REQUEST);
        assert_eq!(
            Json2Request::parse(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err().code,
            INVALID_REQUEST
        );
        assert_eq!(
            Json2Request::parse(r#"{"jsonrpc":"1.0","id":1,"method":"x"}"#)
                .unwrap_err()
                .code,
            INVALID_REQUEST
        );
        let ok = Json2Request::parse(r#"{"jsonrpc":"2.0","id":"a","method":"properties"}"#)
            .unwrap();
        assert_eq!(ok.id, json!("a"));
        assert!(ok.params.is_null());
    }

    #[test]
    fn test_error_mapping() {
        let missing: FactomError = JsonError::new(MISSING_CHAIN_HEAD, "Missing Chain Head").into();
        assert!(matches!(missing, FactomError::NotFound(_)));

        let other: FactomError = JsonError {
            code: -32011,
            message: "Repeated Commit".to_string(),
            data: Some(json!("already seen")),
        }
        .into();
        assert!(matches!(
            other,
            FactomError::Rpc { code: -32011, ref message } if message.contains("already seen")
        ));
    }

    #[test]
    fn test_response_into_result() {
        let ok = Json2Response::success(json!(1), json!({"rate": 1000}));
        let value: Value = ok.into_result().unwrap();
        assert_eq!(value["rate"], 1000);

        let failed = Json2Response::failure(json!(1), JsonError::method_not_found());
        assert!(matches!(
            failed.into_result::<Value>(),
            Err(FactomError::Rpc { code: METHOD_NOT_FOUND, .. })
        ));

        let empty = Json2Response {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id: json!(1),
            result: None,
            error: None,
        };
        assert!(empty.into_result::<Value>().is_err());
    }
}
