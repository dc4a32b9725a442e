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

//! Transport feed listener that turns raw topic traffic into twin events.

use crate::event::{PostEvent, ResponseEvent, TwinEvent};
use crate::observability::{events, fields};
use crate::registry::{emit, SharedRegistry};
use crate::topic::{parse_topic, TopicMatch};
use crate::transport::MessageListener;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, Level};

const COMPONENT: &str = "twin_feed";

pub(crate) struct TwinMessageFeed {
    registry: SharedRegistry,
}

impl TwinMessageFeed {
    pub(crate) fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    fn to_event(matched: TopicMatch, payload: Bytes) -> Option<TwinEvent> {
        match matched {
            TopicMatch::Response { status, request_id } => {
                Some(TwinEvent::Response(ResponseEvent {
                    status,
                    request_id,
                    body: payload,
                }))
            }
            TopicMatch::Post => Some(TwinEvent::Post(PostEvent { body: payload })),
            TopicMatch::Unmatched => None,
        }
    }
}

#[async_trait]
impl MessageListener for TwinMessageFeed {
    async fn on_message(&self, topic: String, payload: Bytes) {
        let logged_topic = tracing::enabled!(Level::DEBUG).then(|| fields::format_topic(&topic));

        if let Some(topic) = logged_topic.as_deref() {
            debug!(
                event = events::MESSAGE_RECEIVE,
                component = COMPONENT,
                topic,
                payload_len = payload.len(),
                "received transport message"
            );
        }

        let Some(event) = Self::to_event(parse_topic(&topic), payload) else {
            if let Some(topic) = logged_topic.as_deref() {
                debug!(
                    event = events::MESSAGE_DISCARDED_UNMATCHED,
                    component = COMPONENT,
                    topic,
                    reason = fields::REASON_UNMATCHED_TOPIC,
                    "discarding message outside twin grammar"
                );
            }
            return;
        };

        let event_name = match &event {
            TwinEvent::Response(_) => events::RESPONSE_EMIT,
            _ => events::POST_EMIT,
        };
        let kind = event.kind();
        let listener_count = emit(&self.registry, event).await;

        debug!(
            event = event_name,
            component = COMPONENT,
            kind = kind.as_str(),
            listener_count,
            "emitted twin event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::TwinMessageFeed;
    use crate::event::{ResponseEvent, TwinEvent, TwinEventKind, TwinListener};
    use crate::registry::ConsumerRegistry;
    use crate::transport::MessageListener;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<TwinEvent>>,
    }

    #[async_trait]
    impl TwinListener for RecordingListener {
        async fn on_event(&self, event: TwinEvent) {
            self.events.lock().push(event);
        }
    }

    #[tokio::test]
    async fn response_topic_is_emitted_to_response_consumers() {
        let registry = ConsumerRegistry::shared();
        let listener = Arc::new(RecordingListener::default());
        registry
            .lock()
            .insert(TwinEventKind::Response, listener.clone());
        let feed = TwinMessageFeed::new(registry);

        feed.on_message(
            "$iothub/twin/res/200/?$rid=abc".to_string(),
            Bytes::from_static(b"P"),
        )
        .await;

        assert_eq!(
            listener.events.lock().as_slice(),
            &[TwinEvent::Response(ResponseEvent {
                status: "200".to_string(),
                request_id: "abc".to_string(),
                body: Bytes::from_static(b"P"),
            })]
        );
    }

    #[tokio::test]
    async fn unmatched_topic_reaches_nobody() {
        let registry = ConsumerRegistry::shared();
        let listener = Arc::new(RecordingListener::default());
        for kind in [
            TwinEventKind::Response,
            TwinEventKind::Post,
            TwinEventKind::Error,
        ] {
            registry.lock().insert(kind, listener.clone());
        }
        let feed = TwinMessageFeed::new(registry);

        feed.on_message("$iothub/other/topic".to_string(), Bytes::new())
            .await;
        feed.on_message("$iothub/twin/res/200/".to_string(), Bytes::new())
            .await;

        assert!(listener.events.lock().is_empty());
    }
}
