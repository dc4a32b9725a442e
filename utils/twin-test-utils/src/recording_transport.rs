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

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use twin_receiver::{MessageListener, MqttTransport, SubscribeOptions, TransportError};

#[derive(Default)]
struct TransportState {
    subscribes: HashMap<String, usize>,
    unsubscribes: HashMap<String, usize>,
    requests: Vec<String>,
    last_qos: Option<u8>,
    listeners: Vec<Arc<dyn MessageListener>>,
    attach_calls: usize,
    detach_calls: usize,
}

/// In-memory transport that records every request and lets a test push
/// inbound messages to whatever is attached.
pub struct RecordingTransport {
    name: String,
    fail_with: Option<String>,
    state: Mutex<TransportState>,
}

impl RecordingTransport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail_with: None,
            state: Mutex::new(TransportState::default()),
        }
    }

    /// A transport whose subscribe and unsubscribe requests all fail with
    /// `message`.
    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(name)
        }
    }

    pub fn subscribe_count(&self, topic_filter: &str) -> usize {
        self.state
            .lock()
            .subscribes
            .get(topic_filter)
            .copied()
            .unwrap_or(0)
    }

    pub fn unsubscribe_count(&self, topic_filter: &str) -> usize {
        self.state
            .lock()
            .unsubscribes
            .get(topic_filter)
            .copied()
            .unwrap_or(0)
    }

    /// Requests in issue order, formatted as `sub <filter>` or `unsub <filter>`.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    /// QoS level of the most recent subscribe request.
    pub fn last_subscribe_qos(&self) -> Option<u8> {
        self.state.lock().last_qos
    }

    pub fn attached_listeners(&self) -> usize {
        self.state.lock().listeners.len()
    }

    pub fn attach_calls(&self) -> usize {
        self.state.lock().attach_calls
    }

    pub fn detach_calls(&self) -> usize {
        self.state.lock().detach_calls
    }

    /// Delivers one inbound message to every attached listener.
    pub async fn deliver(&self, topic: &str, payload: impl Into<Bytes>) {
        let payload = payload.into();
        let listeners = self.state.lock().listeners.clone();

        debug!(
            "{}: delivering {topic} to {} listener(s)",
            self.name,
            listeners.len()
        );
        for listener in listeners {
            listener.on_message(topic.to_string(), payload.clone()).await;
        }
    }

    fn outcome(&self) -> Result<(), TransportError> {
        match &self.fail_with {
            Some(message) => Err(TransportError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MqttTransport for RecordingTransport {
    async fn subscribe(
        &self,
        topic_filter: &str,
        options: SubscribeOptions,
    ) -> Result<(), TransportError> {
        {
            let mut state = self.state.lock();
            *state
                .subscribes
                .entry(topic_filter.to_string())
                .or_insert(0) += 1;
            state.requests.push(format!("sub {topic_filter}"));
            state.last_qos = Some(options.qos.level());
        }
        debug!("{}: subscribe {topic_filter}", self.name);
        self.outcome()
    }

    async fn unsubscribe(&self, topic_filter: &str) -> Result<(), TransportError> {
        {
            let mut state = self.state.lock();
            *state
                .unsubscribes
                .entry(topic_filter.to_string())
                .or_insert(0) += 1;
            state.requests.push(format!("unsub {topic_filter}"));
        }
        debug!("{}: unsubscribe {topic_filter}", self.name);
        self.outcome()
    }

    fn attach_message_listener(&self, listener: Arc<dyn MessageListener>) {
        let mut state = self.state.lock();
        state.attach_calls += 1;
        state.listeners.push(listener);
    }

    fn detach_message_listener(&self, listener: &Arc<dyn MessageListener>) {
        let mut state = self.state.lock();
        state.detach_calls += 1;
        state
            .listeners
            .retain(|attached| !Arc::ptr_eq(attached, listener));
    }
}
