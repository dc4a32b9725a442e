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

use crate::builder::TwinReceiverBuilder;
use crate::error::{TwinError, TwinErrorCode};
use crate::event::{ListenerHandle, TwinEventKind, TwinListener};
use crate::observability::events;
use crate::registry::{ConsumerRegistry, SharedRegistry};
use crate::subscription_worker::{SubscriptionCommand, SubscriptionWorker};
use crate::transport::{MessageListener, MqttTransport};
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

const COMPONENT: &str = "twin_receiver";

/// Demand-driven receiver for device-twin traffic on one transport.
///
/// The first `response` or `post` consumer attaches the receiver to the
/// transport feed and subscribes the matching topic filter; the last one to
/// leave unsubscribes it, and the feed is released once neither kind has
/// consumers. Subscribe and unsubscribe run on a background worker, so
/// [`add_listener`](Self::add_listener) and
/// [`remove_listener`](Self::remove_listener) never block on the transport.
/// Their outcomes arrive as [`TwinEvent::Subscribed`][crate::TwinEvent::Subscribed]
/// and [`TwinEvent::Error`][crate::TwinEvent::Error].
pub struct TwinReceiver {
    transport: Arc<dyn MqttTransport>,
    registry: SharedRegistry,
    feed: Arc<dyn MessageListener>,
    worker: SubscriptionWorker,
}

impl TwinReceiver {
    /// Binds a receiver to `transport` with the default configuration.
    pub fn new(transport: Arc<dyn MqttTransport>) -> Result<Self, TwinError> {
        TwinReceiverBuilder::new().client(transport).build()
    }

    pub fn builder() -> TwinReceiverBuilder {
        TwinReceiverBuilder::new()
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn MqttTransport>,
        registry: SharedRegistry,
        feed: Arc<dyn MessageListener>,
        worker: SubscriptionWorker,
    ) -> Self {
        debug!(
            event = events::RECEIVER_CREATE,
            component = COMPONENT,
            worker_id = worker.worker_id(),
            worker_thread = worker.worker_thread(),
            "twin receiver created"
        );

        Self {
            transport,
            registry,
            feed,
            worker,
        }
    }

    pub(crate) fn new_registry() -> SharedRegistry {
        ConsumerRegistry::shared()
    }

    /// Registers `listener` for events of `kind`.
    ///
    /// The subscribe request is queued for the worker. Once the worker has
    /// stopped, for instance because a listener panicked on its thread, the
    /// request is dropped with a `warn` log and [`wait_idle`](Self::wait_idle)
    /// returns an `Internal` error from then on.
    pub fn add_listener(
        &self,
        kind: TwinEventKind,
        listener: Arc<dyn TwinListener>,
    ) -> ListenerHandle {
        let mut registry = self.registry.lock();
        let (handle, listener_count) = registry.insert(kind, listener);

        if let Some(topic) = kind.topic() {
            if listener_count == 1 {
                if !registry.feed_attached() {
                    self.transport.attach_message_listener(self.feed.clone());
                    registry.set_feed_attached(true);
                    debug!(
                        event = events::FEED_ATTACH,
                        component = COMPONENT,
                        kind = kind.as_str(),
                        "attached to transport message feed"
                    );
                }
                self.worker.enqueue(SubscriptionCommand::Subscribe(topic));
            }
        }

        debug!(
            event = events::LISTENER_ADD,
            component = COMPONENT,
            kind = kind.as_str(),
            listener_id = handle.id,
            listener_count,
            "registered twin listener"
        );
        handle
    }

    /// Deregisters the listener behind `handle`. Returns `false` for a
    /// handle that was already removed or was issued by another receiver.
    ///
    /// A queued unsubscribe is lost the same way as in
    /// [`add_listener`](Self::add_listener) when the worker has stopped.
    pub fn remove_listener(&self, handle: ListenerHandle) -> bool {
        let mut registry = self.registry.lock();
        let kind = handle.kind();

        let Some(listener_count) = registry.remove(handle) else {
            debug!(
                event = events::LISTENER_REMOVE_UNKNOWN,
                component = COMPONENT,
                kind = kind.as_str(),
                listener_id = handle.id,
                "ignoring unknown listener handle"
            );
            return false;
        };

        if let Some(topic) = kind.topic() {
            if listener_count == 0 {
                self.worker
                    .enqueue(SubscriptionCommand::Unsubscribe(topic));

                if registry.feed_consumers() == 0 && registry.feed_attached() {
                    self.transport.detach_message_listener(&self.feed);
                    registry.set_feed_attached(false);
                    debug!(
                        event = events::FEED_DETACH,
                        component = COMPONENT,
                        kind = kind.as_str(),
                        "detached from transport message feed"
                    );
                }
            }
        }

        debug!(
            event = events::LISTENER_REMOVE,
            component = COMPONENT,
            kind = kind.as_str(),
            listener_id = handle.id,
            listener_count,
            "removed twin listener"
        );
        true
    }

    pub fn listener_count(&self, kind: TwinEventKind) -> usize {
        self.registry.lock().count(kind)
    }

    pub fn is_feed_attached(&self) -> bool {
        self.registry.lock().feed_attached()
    }

    /// Resolves once every subscribe/unsubscribe queued before this call has
    /// completed and its outcome event has been emitted.
    ///
    /// `Subscribed` and `Error` listeners run on the subscription worker, so
    /// calling this from one of them cannot wait for the worker; it returns an
    /// `Internal` error immediately instead.
    pub async fn wait_idle(&self) -> Result<(), TwinError> {
        if self.worker.is_worker_thread() {
            return Err(TwinError::fail_with_code(
                TwinErrorCode::Internal,
                "wait_idle called from the subscription worker",
            ));
        }
        let (ack, flushed) = oneshot::channel();

        if !self.worker.enqueue(SubscriptionCommand::Flush(ack)) {
            return Err(Self::worker_stopped());
        }
        flushed.await.map_err(|_| Self::worker_stopped())
    }

    fn worker_stopped() -> TwinError {
        TwinError::fail_with_code(TwinErrorCode::Internal, "subscription worker has stopped")
    }
}

impl Debug for TwinReceiver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("TwinReceiver")
            .field("worker_id", &self.worker.worker_id())
            .field("feed_attached", &registry.feed_attached())
            .field("feed_consumers", &registry.feed_consumers())
            .finish_non_exhaustive()
    }
}

impl Drop for TwinReceiver {
    fn drop(&mut self) {
        let mut registry = self.registry.lock();
        if registry.feed_attached() {
            self.transport.detach_message_listener(&self.feed);
            registry.set_feed_attached(false);
        }

        debug!(
            event = events::RECEIVER_DROP,
            component = COMPONENT,
            worker_id = self.worker.worker_id(),
            "twin receiver dropped"
        );
    }
}
