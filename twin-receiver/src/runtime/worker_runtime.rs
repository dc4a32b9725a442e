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

//! Runtime helper for spawning the subscription command loop.

use crate::observability::{events, fields};
use std::future::Future;
use std::io;
use std::thread;
use tokio::runtime::Builder;
use tracing::{debug, warn};

pub(crate) const DEFAULT_SUBSCRIPTION_WORKER_THREAD_NAME: &str = "twin-sub-worker";
const COMPONENT: &str = "worker_runtime";

/// Handle to the OS thread running one subscription command loop.
pub(crate) struct CommandLoopHandle {
    join_handle: thread::JoinHandle<()>,
    worker_thread: String,
}

impl CommandLoopHandle {
    pub(crate) fn worker_thread(&self) -> &str {
        &self.worker_thread
    }

    pub(crate) fn is_current_thread(&self) -> bool {
        self.join_handle.thread().id() == thread::current().id()
    }
}

/// Runs `run_loop` on a dedicated thread driven by a current-thread runtime.
///
/// The runtime is built on the calling thread so setup failures surface to the
/// caller instead of silently ending the worker.
pub(crate) fn spawn_command_loop<F, Fut>(
    thread_name: String,
    run_loop: F,
) -> io::Result<CommandLoopHandle>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    debug!(
        event = events::RUNTIME_SPAWN_START,
        component = COMPONENT,
        worker_thread = thread_name.as_str(),
        "spawning subscription worker runtime"
    );

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            warn!(
                event = events::RUNTIME_SPAWN_FAILED,
                component = COMPONENT,
                worker_thread = thread_name.as_str(),
                reason = fields::REASON_RUNTIME_BUILD_FAILED,
                err = %err,
                "unable to build subscription worker runtime"
            );
            err
        })?;

    let join_handle = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            runtime.block_on(run_loop());
        })
        .map_err(|err| {
            warn!(
                event = events::RUNTIME_SPAWN_FAILED,
                component = COMPONENT,
                worker_thread = thread_name.as_str(),
                err = %err,
                "unable to spawn subscription worker thread"
            );
            err
        })?;

    debug!(
        event = events::RUNTIME_SPAWN_OK,
        component = COMPONENT,
        worker_thread = thread_name.as_str(),
        "subscription worker runtime started"
    );

    Ok(CommandLoopHandle {
        join_handle,
        worker_thread: thread_name,
    })
}
