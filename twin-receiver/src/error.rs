/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Normalized error vocabulary surfaced to twin consumers.

use crate::transport::TransportError;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TwinErrorCode {
    InvalidArgument,
    Format,
    NotImplemented,
    Unauthorized,
    ServiceUnavailable,
    Internal,
    Transport,
}

impl Display for TwinErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            TwinErrorCode::InvalidArgument => "invalid_argument",
            TwinErrorCode::Format => "format",
            TwinErrorCode::NotImplemented => "not_implemented",
            TwinErrorCode::Unauthorized => "unauthorized",
            TwinErrorCode::ServiceUnavailable => "service_unavailable",
            TwinErrorCode::Internal => "internal",
            TwinErrorCode::Transport => "transport",
        };
        write!(f, "{name}")
    }
}

/// Error carried by `TwinEvent::Error` and returned by fallible constructors.
#[derive(Clone, Eq, PartialEq)]
pub struct TwinError {
    code: TwinErrorCode,
    message: String,
    transport_error: Option<TransportError>,
}

impl TwinError {
    pub fn fail_with_code(code: TwinErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            transport_error: None,
        }
    }

    pub fn from_transport(code: TwinErrorCode, transport_error: TransportError) -> Self {
        Self {
            code,
            message: transport_error.message().to_string(),
            transport_error: Some(transport_error),
        }
    }

    pub fn code(&self) -> TwinErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw transport failure this error was translated from, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.transport_error.as_ref()
    }
}

impl Debug for TwinError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.transport_error {
            Some(transport_error) => write!(
                f,
                "TwinError({:?}, {:?}, {:?})",
                self.code, self.message, transport_error
            ),
            None => write!(f, "TwinError({:?}, {:?})", self.code, self.message),
        }
    }
}

impl Display for TwinError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for TwinError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.transport_error
            .as_ref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

/// Maps transport failures into the normalized [`TwinError`] vocabulary.
pub trait ErrorTranslator: Send + Sync {
    fn translate(&self, err: TransportError) -> TwinError;
}

const MESSAGE_CODES: &[(&str, TwinErrorCode)] = &[
    ("client disconnecting", TwinErrorCode::ServiceUnavailable),
    ("Invalid topic", TwinErrorCode::Format),
    ("No connection to broker", TwinErrorCode::ServiceUnavailable),
    ("Unacceptable protocol version", TwinErrorCode::NotImplemented),
    ("Identifier rejected", TwinErrorCode::Unauthorized),
    ("Server unavailable", TwinErrorCode::ServiceUnavailable),
    ("Bad username or password", TwinErrorCode::Unauthorized),
    ("Not authorized", TwinErrorCode::Unauthorized),
];

/// Default translator classifying MQTT client errors by message text.
#[derive(Clone, Copy, Debug, Default)]
pub struct MqttErrorTranslator;

impl ErrorTranslator for MqttErrorTranslator {
    fn translate(&self, err: TransportError) -> TwinError {
        let code = MESSAGE_CODES
            .iter()
            .find(|(needle, _)| err.message().contains(needle))
            .map(|(_, code)| *code)
            .unwrap_or(TwinErrorCode::Transport);

        TwinError::from_transport(code, err)
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorTranslator, MqttErrorTranslator, TwinError, TwinErrorCode};
    use crate::transport::TransportError;
    use std::error::Error;

    fn translate(message: &str) -> TwinError {
        MqttErrorTranslator.translate(TransportError::new(message))
    }

    #[test]
    fn translator_classifies_connection_refusals() {
        assert_eq!(
            translate("Connection refused: Not authorized").code(),
            TwinErrorCode::Unauthorized
        );
        assert_eq!(
            translate("Connection refused: Bad username or password").code(),
            TwinErrorCode::Unauthorized
        );
        assert_eq!(
            translate("Connection refused: Identifier rejected").code(),
            TwinErrorCode::Unauthorized
        );
        assert_eq!(
            translate("Connection refused: Server unavailable").code(),
            TwinErrorCode::ServiceUnavailable
        );
        assert_eq!(
            translate("Connection refused: Unacceptable protocol version").code(),
            TwinErrorCode::NotImplemented
        );
    }

    #[test]
    fn translator_classifies_client_state_errors() {
        assert_eq!(
            translate("client disconnecting").code(),
            TwinErrorCode::ServiceUnavailable
        );
        assert_eq!(
            translate("No connection to broker").code(),
            TwinErrorCode::ServiceUnavailable
        );
        assert_eq!(translate("Invalid topic $x").code(), TwinErrorCode::Format);
    }

    #[test]
    fn translator_falls_back_to_transport_code_and_keeps_source() {
        let err = translate("socket reset");

        assert_eq!(err.code(), TwinErrorCode::Transport);
        assert_eq!(err.message(), "socket reset");
        assert_eq!(
            err.transport_error(),
            Some(&TransportError::new("socket reset"))
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn fail_with_code_has_no_transport_source() {
        let err = TwinError::fail_with_code(TwinErrorCode::InvalidArgument, "missing");

        assert!(err.transport_error().is_none());
        assert_eq!(err.to_string(), "invalid_argument: missing");
    }
}
