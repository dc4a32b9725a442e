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

//! Canonical structured event names used across `twin-receiver`.

// Receiver construction and teardown.
pub const RECEIVER_CREATE: &str = "receiver_create";
pub const RECEIVER_DROP: &str = "receiver_drop";

// Consumer registration.
pub const LISTENER_ADD: &str = "listener_add";
pub const LISTENER_REMOVE: &str = "listener_remove";
pub const LISTENER_REMOVE_UNKNOWN: &str = "listener_remove_unknown";
pub const FEED_ATTACH: &str = "feed_attach";
pub const FEED_DETACH: &str = "feed_detach";

// Subscription worker.
pub const SUBSCRIPTION_COMMAND_ENQUEUE_FAILED: &str = "subscription_command_enqueue_failed";
pub const SUBSCRIBE_REQUEST_ATTEMPT: &str = "subscribe_request_attempt";
pub const SUBSCRIBE_REQUEST_OK: &str = "subscribe_request_ok";
pub const SUBSCRIBE_REQUEST_FAILED: &str = "subscribe_request_failed";
pub const UNSUBSCRIBE_REQUEST_ATTEMPT: &str = "unsubscribe_request_attempt";
pub const UNSUBSCRIBE_REQUEST_OK: &str = "unsubscribe_request_ok";
pub const UNSUBSCRIBE_REQUEST_FAILED: &str = "unsubscribe_request_failed";
pub const ERROR_EVENT_DROPPED: &str = "error_event_dropped";
pub const WORKER_QUEUE_CLOSED: &str = "worker_queue_closed";

// Inbound dispatch.
pub const MESSAGE_RECEIVE: &str = "message_receive";
pub const MESSAGE_DISCARDED_UNMATCHED: &str = "message_discarded_unmatched";
pub const RESPONSE_EMIT: &str = "response_emit";
pub const POST_EMIT: &str = "post_emit";

// Runtime boundaries.
pub const RUNTIME_SPAWN_START: &str = "runtime_spawn_start";
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const RUNTIME_SPAWN_FAILED: &str = "runtime_spawn_failed";
