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

//! Transport-facing contract consumed by [`TwinReceiver`][crate::TwinReceiver].

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// MQTT delivery guarantee requested for a subscription.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl QoS {
    pub fn level(&self) -> u8 {
        match self {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SubscribeOptions {
    pub qos: QoS,
}

/// Failure reported by a transport for a subscribe or unsubscribe request.
#[derive(Clone, Eq, PartialEq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Debug for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TransportError({:?})", self.message)
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for TransportError {}

/// Callback slot on the transport's inbound message feed.
#[async_trait]
pub trait MessageListener: Send + Sync {
    async fn on_message(&self, topic: String, payload: Bytes);
}

/// Publish/subscribe client the receiver is bound to.
///
/// `subscribe` and `unsubscribe` resolve when the transport has completed the
/// request. `attach_message_listener` and `detach_message_listener` manage the
/// feed slot; detaching identifies the listener by `Arc` pointer identity.
///
/// Implementations must not hold internal locks while invoking an attached
/// listener, since the listener may re-enter the receiver.
#[async_trait]
pub trait MqttTransport: Send + Sync {
    async fn subscribe(
        &self,
        topic_filter: &str,
        options: SubscribeOptions,
    ) -> Result<(), TransportError>;

    async fn unsubscribe(&self, topic_filter: &str) -> Result<(), TransportError>;

    fn attach_message_listener(&self, listener: Arc<dyn MessageListener>);

    fn detach_message_listener(&self, listener: &Arc<dyn MessageListener>);
}
