use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{CollectError, Result};

/// The portal hands out keys already percent-encoded. The HTTP client encodes
/// query parameters again, so the key is decoded once up front.
pub fn decode_service_key(key: &str) -> Result<String> {
    urlencoding::decode(key.trim())
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CollectError::Configuration(format!("service key is not valid UTF-8: {e}")))
}

/// The portal answers authentication and quota errors with an XML envelope
/// even when JSON was requested. Pulls the most specific message out of it.
pub fn xml_error_message(body: &str) -> String {
    lazy_static! {
        static ref AUTH_MSG_REGEX: Regex =
            Regex::new(r"<returnAuthMsg>\s*([^<]*?)\s*</returnAuthMsg>").unwrap();
        static ref REASON_CODE_REGEX: Regex =
            Regex::new(r"<returnReasonCode>\s*([^<]*?)\s*</returnReasonCode>").unwrap();
        static ref RESULT_MSG_REGEX: Regex =
            Regex::new(r"<resultMsg>\s*([^<]*?)\s*</resultMsg>").unwrap();
        static ref RESULT_CODE_REGEX: Regex =
            Regex::new(r"<resultCode>\s*([^<]*?)\s*</resultCode>").unwrap();
    }

    let capture = |regex: &Regex| {
        regex
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    };

    match (capture(&AUTH_MSG_REGEX), capture(&REASON_CODE_REGEX)) {
        (Some(msg), Some(code)) => return format!("{msg} (reason code {code})"),
        (Some(msg), None) => return msg,
        _ => {}
    }

    match (capture(&RESULT_MSG_REGEX), capture(&RESULT_CODE_REGEX)) {
        (Some(msg), Some(code)) => format!("{msg} (result code {code})"),
        (Some(msg), None) => msg,
        _ => "unrecognized XML response".to_string(),
    }
}

pub fn is_success_code(code: &str) -> bool {
    let code = code.trim();
    !code.is_empty() && code.chars().all(|c| c == '0')
}

// Text fields: the portal sometimes sends numbers (zipcodes, phone numbers) as
// JSON numbers and uses empty strings for missing values.
pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Some(Value::Number(num)) => Some(num.to_string()),
        Some(_) => return Err(de::Error::custom("expected a string or a number")),
    })
}

// Count fields arrive as either a number or a numeric string.
pub fn opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().parse().map_err(de::Error::custom)?),
        Some(Value::Number(num)) => Some(
            num.as_u64()
                .ok_or_else(|| de::Error::custom(format!("invalid count {num}")))?,
        ),
        Some(_) => return Err(de::Error::custom("expected a number")),
    })
}

// Area fields, same leniency as the counts.
pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().parse().map_err(de::Error::custom)?),
        Some(Value::Number(num)) => Some(
            num.as_f64()
                .ok_or_else(|| de::Error::custom(format!("invalid area {num}")))?,
        ),
        Some(_) => return Err(de::Error::custom("expected a number")),
    })
}

// Identifiers must be present and non-empty.
pub fn required_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match opt_string(deserializer)? {
        Some(s) => Ok(s),
        None => Err(de::Error::custom("required field is empty")),
    }
}
