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

//! Refcounted consumer registry and event fan-out.

use crate::event::{ListenerHandle, TwinEvent, TwinEventKind, TwinListener};
use crate::topic::TwinTopic;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) type SharedRegistry = Arc<Mutex<ConsumerRegistry>>;

struct ConsumerRegistration {
    kind: TwinEventKind,
    listener: Arc<dyn TwinListener>,
}

/// Registered consumers keyed by handle id, in registration order.
pub(crate) struct ConsumerRegistry {
    registry_id: u64,
    next_id: u64,
    registrations: BTreeMap<u64, ConsumerRegistration>,
    counts: HashMap<TwinEventKind, usize>,
    feed_attached: bool,
}

impl ConsumerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            registry_id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            next_id: 0,
            registrations: BTreeMap::new(),
            counts: HashMap::new(),
            feed_attached: false,
        }
    }

    pub(crate) fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Registers `listener` for `kind` and returns its handle with the new count.
    pub(crate) fn insert(
        &mut self,
        kind: TwinEventKind,
        listener: Arc<dyn TwinListener>,
    ) -> (ListenerHandle, usize) {
        let id = self.next_id;
        self.next_id += 1;
        self.registrations
            .insert(id, ConsumerRegistration { kind, listener });

        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        let handle = ListenerHandle {
            owner: self.registry_id,
            id,
            kind,
        };
        (handle, *count)
    }

    /// Removes the registration behind `handle` and returns the remaining
    /// count for its kind, or `None` when the handle is stale or was issued
    /// by another registry.
    pub(crate) fn remove(&mut self, handle: ListenerHandle) -> Option<usize> {
        if handle.owner != self.registry_id {
            return None;
        }
        if self.registrations.get(&handle.id)?.kind != handle.kind {
            return None;
        }
        let removed = self.registrations.remove(&handle.id)?;

        let count = self.counts.entry(removed.kind).or_insert(1);
        *count -= 1;
        Some(*count)
    }

    pub(crate) fn count(&self, kind: TwinEventKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Consumers that need the transport feed: response plus post.
    pub(crate) fn feed_consumers(&self) -> usize {
        TwinTopic::ALL
            .iter()
            .map(|topic| self.count(TwinEventKind::from(*topic)))
            .sum()
    }

    pub(crate) fn feed_attached(&self) -> bool {
        self.feed_attached
    }

    pub(crate) fn set_feed_attached(&mut self, attached: bool) {
        self.feed_attached = attached;
    }

    pub(crate) fn listeners(&self, kind: TwinEventKind) -> Vec<Arc<dyn TwinListener>> {
        self.registrations
            .values()
            .filter(|registration| registration.kind == kind)
            .map(|registration| registration.listener.clone())
            .collect()
    }
}

/// Delivers `event` to the consumers registered for its kind right now and
/// returns how many received it.
pub(crate) async fn emit(registry: &Mutex<ConsumerRegistry>, event: TwinEvent) -> usize {
    let listeners = registry.lock().listeners(event.kind());

    for listener in listeners.iter() {
        listener.on_event(event.clone()).await;
    }
    listeners.len()
}

#[cfg(test)]
mod tests {
    use super::{emit, ConsumerRegistry};
    use crate::event::{PostEvent, TwinEvent, TwinEventKind, TwinListener};
    use crate::topic::TwinTopic;
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

    #[test]
    fn insert_and_remove_track_per_kind_counts() {
        let mut registry = ConsumerRegistry::new();
        let listener: Arc<dyn TwinListener> = Arc::new(RecordingListener::default());

        let (first, first_count) = registry.insert(TwinEventKind::Response, listener.clone());
        let (second, second_count) = registry.insert(TwinEventKind::Response, listener.clone());
        let (_post, post_count) = registry.insert(TwinEventKind::Post, listener);

        assert_eq!((first_count, second_count, post_count), (1, 2, 1));
        assert_ne!(first, second);
        assert_eq!(registry.feed_consumers(), 3);

        assert_eq!(registry.remove(first), Some(1));
        assert_eq!(registry.remove(second), Some(0));
        assert_eq!(registry.count(TwinEventKind::Response), 0);
        assert_eq!(registry.feed_consumers(), 1);
    }

    #[test]
    fn stale_handle_remove_is_noop() {
        let mut registry = ConsumerRegistry::new();
        let listener: Arc<dyn TwinListener> = Arc::new(RecordingListener::default());
        let (handle, _) = registry.insert(TwinEventKind::Post, listener);

        assert_eq!(registry.remove(handle), Some(0));
        assert_eq!(registry.remove(handle), None);
        assert_eq!(registry.count(TwinEventKind::Post), 0);
    }

    #[test]
    fn handle_from_another_registry_is_rejected() {
        let mut first = ConsumerRegistry::new();
        let mut second = ConsumerRegistry::new();
        let listener: Arc<dyn TwinListener> = Arc::new(RecordingListener::default());
        let (first_handle, _) = first.insert(TwinEventKind::Response, listener.clone());
        let (second_handle, _) = second.insert(TwinEventKind::Post, listener);

        assert_eq!(first_handle.id, second_handle.id);
        assert_eq!(first.remove(second_handle), None);
        assert_eq!(first.count(TwinEventKind::Response), 1);
        assert_eq!(second.remove(second_handle), Some(0));
    }

    #[test]
    fn handle_with_mismatched_kind_is_rejected() {
        let mut registry = ConsumerRegistry::new();
        let listener: Arc<dyn TwinListener> = Arc::new(RecordingListener::default());
        let (mut handle, _) = registry.insert(TwinEventKind::Response, listener);
        handle.kind = TwinEventKind::Post;

        assert_eq!(registry.remove(handle), None);
        assert_eq!(registry.count(TwinEventKind::Response), 1);
        assert_eq!(registry.count(TwinEventKind::Post), 0);
    }

    #[test]
    fn subscribed_and_error_consumers_do_not_count_toward_feed() {
        let mut registry = ConsumerRegistry::new();
        let listener: Arc<dyn TwinListener> = Arc::new(RecordingListener::default());
        registry.insert(TwinEventKind::Subscribed, listener.clone());
        registry.insert(TwinEventKind::Error, listener);

        assert_eq!(registry.feed_consumers(), 0);
        assert_eq!(registry.count(TwinEventKind::Error), 1);
    }

    #[tokio::test]
    async fn emit_reaches_only_matching_kind() {
        let registry = Mutex::new(ConsumerRegistry::new());
        let post_listener = Arc::new(RecordingListener::default());
        let subscribed_listener = Arc::new(RecordingListener::default());
        registry
            .lock()
            .insert(TwinEventKind::Post, post_listener.clone());
        registry
            .lock()
            .insert(TwinEventKind::Subscribed, subscribed_listener.clone());

        let delivered = emit(
            &registry,
            TwinEvent::Post(PostEvent {
                body: Bytes::from_static(b"{\"a\":1}"),
            }),
        )
        .await;

        assert_eq!(delivered, 1);
        assert_eq!(post_listener.events.lock().len(), 1);
        assert!(subscribed_listener.events.lock().is_empty());
    }

    #[tokio::test]
    async fn emit_without_consumers_delivers_nothing() {
        let registry = Mutex::new(ConsumerRegistry::new());

        let delivered = emit(&registry, TwinEvent::Subscribed(TwinTopic::Post)).await;

        assert_eq!(delivered, 0);
    }
}
