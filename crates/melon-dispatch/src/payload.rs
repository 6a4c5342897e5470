//! Transit payload codec
//!
//! A [`DispatchRequest`] travels attached to an action handle as a flat
//! payload:
//!
//! ```text
//! { "procedure": "doThing", "screen": "Screen1",
//!   "arguments": "[1,\"x\"]",          // JSON text, or a native list
//!   "deliveryMode": false }
//! ```
//!
//! The procedure name is stored verbatim; any leading marker is removed on
//! decode.

use crate::error::{DispatchError, DispatchResult};
use crate::request::{canonical_procedure, DeliveryMode, DispatchRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How arguments are carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transit {
    /// JSON-encoded string
    #[default]
    Json,
    /// Native structured list
    Native,
}

/// Encoded argument sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentsPayload {
    /// JSON text of an array
    Encoded(String),
    /// Array carried as structured data
    Native(Vec<Value>),
}

impl ArgumentsPayload {
    /// Decode into an ordered argument list
    ///
    /// # Errors
    /// - `DispatchError::Json` if encoded text is not JSON
    /// - `DispatchError::InvalidArguments` if it is not a list
    pub fn decode(&self) -> DispatchResult<Vec<Value>> {
        match self {
            Self::Native(values) => Ok(values.clone()),
            Self::Encoded(text) => match serde_json::from_str::<Value>(text)? {
                Value::Array(values) => Ok(values),
                other => Err(DispatchError::InvalidArguments(format!(
                    "expected a list, got {other}"
                ))),
            },
        }
    }
}

/// Action-handle payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchPayload {
    /// Procedure name, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    /// Target screen id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    /// Encoded arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<ArgumentsPayload>,
    /// `true` = always-foreground
    #[serde(default)]
    pub delivery_mode: bool,
}

impl DispatchPayload {
    /// Encode request for transit
    ///
    /// # Errors
    /// - `DispatchError::Json` if arguments cannot be serialized
    pub fn encode(request: &DispatchRequest, transit: Transit) -> DispatchResult<Self> {
        let arguments = match transit {
            Transit::Json => ArgumentsPayload::Encoded(serde_json::to_string(&request.arguments)?),
            Transit::Native => ArgumentsPayload::Native(request.arguments.clone()),
        };
        Ok(Self {
            procedure: Some(request.procedure.clone()),
            screen: Some(request.screen.clone()),
            arguments: Some(arguments),
            delivery_mode: request.mode.as_flag(),
        })
    }

    /// Decode payload back into a request
    ///
    /// # Errors
    /// - `DispatchError::MissingField` if procedure, screen or arguments are absent
    /// - Any argument decoding error
    pub fn decode(&self) -> DispatchResult<DispatchRequest> {
        let procedure = self
            .procedure
            .as_deref()
            .ok_or(DispatchError::MissingField("procedure"))?;
        let screen = self
            .screen
            .as_deref()
            .ok_or(DispatchError::MissingField("screen"))?;
        let arguments = self
            .arguments
            .as_ref()
            .ok_or(DispatchError::MissingField("arguments"))?
            .decode()?;

        Ok(DispatchRequest {
            screen: screen.to_string(),
            procedure: canonical_procedure(procedure).to_string(),
            arguments,
            mode: self.mode(),
        })
    }

    /// Delivery mode carried by the payload
    #[inline]
    #[must_use]
    pub fn mode(&self) -> DeliveryMode {
        DeliveryMode::from_flag(self.delivery_mode)
    }

    /// Serialize payload as JSON text
    ///
    /// # Errors
    /// - `DispatchError::Json` on serialization failure
    pub fn to_json(&self) -> DispatchResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse payload from JSON text
    ///
    /// # Errors
    /// - `DispatchError::Json` if the text is not a payload object
    pub fn from_json(text: &str) -> DispatchResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
