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

//! Typed application events and the consumer-side listener contract.

use crate::error::TwinError;
use crate::topic::TwinTopic;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Event kinds a consumer can register for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TwinEventKind {
    Response,
    Post,
    Subscribed,
    Error,
}

impl TwinEventKind {
    /// The subscription-backed topic for this kind, if registering for it
    /// drives transport traffic.
    pub fn topic(&self) -> Option<TwinTopic> {
        match self {
            TwinEventKind::Response => Some(TwinTopic::Response),
            TwinEventKind::Post => Some(TwinTopic::Post),
            TwinEventKind::Subscribed | TwinEventKind::Error => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TwinEventKind::Response => "response",
            TwinEventKind::Post => "post",
            TwinEventKind::Subscribed => "subscribed",
            TwinEventKind::Error => "error",
        }
    }
}

impl From<TwinTopic> for TwinEventKind {
    fn from(topic: TwinTopic) -> Self {
        match topic {
            TwinTopic::Response => TwinEventKind::Response,
            TwinTopic::Post => TwinEventKind::Post,
        }
    }
}

impl Display for TwinEventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Correlated result of a twin request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseEvent {
    pub status: String,
    pub request_id: String,
    pub body: Bytes,
}

/// Desired-property patch pushed by the service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PostEvent {
    pub body: Bytes,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TwinEvent {
    Response(ResponseEvent),
    Post(PostEvent),
    Subscribed(TwinTopic),
    Error(TwinError),
}

impl TwinEvent {
    pub fn kind(&self) -> TwinEventKind {
        match self {
            TwinEvent::Response(_) => TwinEventKind::Response,
            TwinEvent::Post(_) => TwinEventKind::Post,
            TwinEvent::Subscribed(_) => TwinEventKind::Subscribed,
            TwinEvent::Error(_) => TwinEventKind::Error,
        }
    }
}

/// Consumer of twin events registered through
/// [`TwinReceiver::add_listener`][crate::TwinReceiver::add_listener].
#[async_trait]
pub trait TwinListener: Send + Sync {
    async fn on_event(&self, event: TwinEvent);
}

/// Identifies one registration on one receiver; pass it back to
/// [`TwinReceiver::remove_listener`][crate::TwinReceiver::remove_listener]
/// of the receiver that issued it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ListenerHandle {
    pub(crate) owner: u64,
    pub(crate) id: u64,
    pub(crate) kind: TwinEventKind,
}

impl ListenerHandle {
    pub fn kind(&self) -> TwinEventKind {
        self.kind
    }
}
