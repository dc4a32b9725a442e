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

//! # twin-receiver
//!
//! `twin-receiver` turns the raw MQTT feed of a device-twin session into typed
//! events. Consumers register for [`TwinEventKind::Response`] or
//! [`TwinEventKind::Post`]; the receiver subscribes the matching topic filter
//! on the first registration and unsubscribes it when the last consumer for
//! that kind leaves. Nothing is subscribed while nobody listens.
//!
//! The API is centered on [`TwinReceiver`] and the [`MqttTransport`] it is
//! bound to. Any client library can back the transport trait.
//!
//! ```
//! use std::sync::Arc;
//! use twin_receiver::{TwinEvent, TwinEventKind, TwinListener, TwinReceiver};
//! use twin_receiver::MqttTransport;
//!
//! # pub mod mock_transport {
//! #     use std::sync::Arc;
//! #     use async_trait::async_trait;
//! #     use twin_receiver::{MessageListener, MqttTransport, SubscribeOptions, TransportError};
//! #
//! #     pub struct MockTransport;
//! #
//! #     #[async_trait]
//! #     impl MqttTransport for MockTransport {
//! #         async fn subscribe(
//! #             &self,
//! #             _topic_filter: &str,
//! #             _options: SubscribeOptions,
//! #         ) -> Result<(), TransportError> {
//! #             Ok(())
//! #         }
//! #         async fn unsubscribe(&self, _topic_filter: &str) -> Result<(), TransportError> {
//! #             Ok(())
//! #         }
//! #         fn attach_message_listener(&self, _listener: Arc<dyn MessageListener>) {}
//! #         fn detach_message_listener(&self, _listener: &Arc<dyn MessageListener>) {}
//! #     }
//! # }
//! struct PrintPatch;
//!
//! #[async_trait::async_trait]
//! impl TwinListener for PrintPatch {
//!     async fn on_event(&self, event: TwinEvent) {
//!         if let TwinEvent::Post(patch) = event {
//!             println!("desired properties changed: {} bytes", patch.body.len());
//!         }
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let transport: Arc<dyn MqttTransport> = Arc::new(mock_transport::MockTransport);
//! let receiver = TwinReceiver::new(transport).unwrap();
//!
//! let handle = receiver.add_listener(TwinEventKind::Post, Arc::new(PrintPatch));
//! assert!(receiver.is_feed_attached());
//!
//! assert!(receiver.remove_listener(handle));
//! assert!(!receiver.remove_listener(handle));
//! assert!(!receiver.is_feed_attached());
//! receiver.wait_idle().await.unwrap();
//! # });
//! ```
//!
//! ## Topics
//!
//! | kind       | topic filter                                 |
//! |------------|----------------------------------------------|
//! | `response` | `$iothub/twin/res/#`                         |
//! | `post`     | `$iothub/twin/PATCH/properties/desired/#`    |
//!
//! A response topic carries its status as the path segment after `res/` and
//! the request correlation id as the `$rid` query parameter. Messages that fit
//! neither grammar are discarded.
//!
//! ## Observability model
//!
//! Logs are emitted through `tracing` with a stable `event` field and a
//! `component` field, so subscribers can filter by lifecycle step without
//! parsing messages. Subscription failures are reported as `warn`; per-message
//! traffic is `debug` only.

mod builder;
mod config;
mod error;
mod event;
mod feed;
mod receiver;
mod registry;
mod runtime;
mod subscription_worker;
mod topic;
mod transport;

#[doc(hidden)]
pub mod observability;

pub use builder::TwinReceiverBuilder;
pub use config::TwinReceiverConfig;
pub use error::{ErrorTranslator, MqttErrorTranslator, TwinError, TwinErrorCode};
pub use event::{ListenerHandle, PostEvent, ResponseEvent, TwinEvent, TwinEventKind, TwinListener};
pub use receiver::TwinReceiver;
pub use topic::{parse_topic, TopicMatch, TwinTopic, POST_TOPIC_FILTER, RESPONSE_TOPIC_FILTER};
pub use transport::{MessageListener, MqttTransport, QoS, SubscribeOptions, TransportError};
