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
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use twin_receiver::{TwinEvent, TwinListener};

/// How long [`ChannelListener::next_event`] waits before giving up.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Listener that forwards every event into a channel the test can await on.
pub struct ChannelListener {
    name: String,
    sender: UnboundedSender<TwinEvent>,
}

impl ChannelListener {
    pub fn new(name: &str) -> (Arc<Self>, EventStream) {
        let (sender, receiver) = unbounded_channel();
        let listener = Arc::new(Self {
            name: name.to_string(),
            sender,
        });
        (listener, EventStream { receiver })
    }
}

#[async_trait]
impl TwinListener for ChannelListener {
    async fn on_event(&self, event: TwinEvent) {
        debug!("{}: received {:?}", self.name, event.kind());
        // test may have dropped the stream already
        let _ = self.sender.send(event);
    }
}

pub struct EventStream {
    receiver: UnboundedReceiver<TwinEvent>,
}

impl EventStream {
    /// Waits up to [`EVENT_TIMEOUT`] for the next event.
    pub async fn next_event(&mut self) -> Option<TwinEvent> {
        tokio::time::timeout(EVENT_TIMEOUT, self.receiver.recv())
            .await
            .ok()
            .flatten()
    }

    /// Everything delivered so far, without waiting.
    pub fn drain(&mut self) -> Vec<TwinEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
