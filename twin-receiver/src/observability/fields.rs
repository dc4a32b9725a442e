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

//! Canonical structured field values and value-format helpers.

pub const REASON_NO_ERROR_LISTENER: &str = "no_error_listener";
pub const REASON_QUEUE_CLOSED: &str = "queue_closed";
pub const REASON_UNMATCHED_TOPIC: &str = "unmatched_topic";
pub const REASON_RUNTIME_BUILD_FAILED: &str = "runtime_build_failed";
pub const DEFAULT_WORKER_THREAD: &str = "unknown-thread";

/// Longest topic prefix written into a single log field.
pub const MAX_LOGGED_TOPIC_CHARS: usize = 128;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerContext {
    pub worker_id: String,
    pub worker_thread: String,
}

impl WorkerContext {
    pub fn with_current_thread(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            worker_thread: current_thread_name_or_default(),
        }
    }
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_WORKER_THREAD).to_string()
}

pub fn current_thread_name_or_default() -> String {
    thread_name_or_default(std::thread::current().name())
}

/// Inbound topics are untrusted; cap what ends up in a log line.
pub fn format_topic(topic: &str) -> String {
    match topic.char_indices().nth(MAX_LOGGED_TOPIC_CHARS) {
        Some((cut, _)) => format!("{}...", &topic[..cut]),
        None => topic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_topic, thread_name_or_default, WorkerContext, DEFAULT_WORKER_THREAD,
        MAX_LOGGED_TOPIC_CHARS,
    };
    use std::thread;

    #[test]
    fn format_topic_keeps_short_topics() {
        assert_eq!(
            format_topic("$iothub/twin/res/200/?$rid=1"),
            "$iothub/twin/res/200/?$rid=1"
        );
    }

    #[test]
    fn format_topic_truncates_on_char_boundary() {
        let topic = "é".repeat(MAX_LOGGED_TOPIC_CHARS + 10);
        let formatted = format_topic(&topic);

        assert!(formatted.ends_with("..."));
        assert_eq!(formatted.chars().count(), MAX_LOGGED_TOPIC_CHARS + 3);
    }

    #[test]
    fn thread_name_or_default_falls_back_when_absent() {
        assert_eq!(thread_name_or_default(None), DEFAULT_WORKER_THREAD);
        assert_eq!(thread_name_or_default(Some("named-thread")), "named-thread");
    }

    #[test]
    fn worker_context_captures_current_thread_name() {
        let context = thread::Builder::new()
            .name("ctx-thread".to_string())
            .spawn(|| WorkerContext::with_current_thread("w"))
            .expect("thread should spawn")
            .join()
            .expect("thread should finish");

        assert_eq!(context.worker_id, "w");
        assert_eq!(context.worker_thread, "ctx-thread");
    }
}
