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

//! Ordered worker issuing subscribe/unsubscribe requests on the transport.

use crate::error::ErrorTranslator;
use crate::event::TwinEvent;
use crate::observability::events;
use crate::observability::fields::{self, WorkerContext};
use crate::registry::{emit, SharedRegistry};
use crate::runtime::worker_runtime::{spawn_command_loop, CommandLoopHandle};
use crate::topic::TwinTopic;
use crate::transport::{MqttTransport, SubscribeOptions, TransportError};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

const COMPONENT: &str = "subscription_worker";

#[derive(Debug)]
pub(crate) enum SubscriptionCommand {
    Subscribe(TwinTopic),
    Unsubscribe(TwinTopic),
    /// Acknowledged once every earlier command has completed.
    Flush(oneshot::Sender<()>),
}

/// Everything the command loop needs to issue requests and report outcomes.
#[derive(Clone)]
pub(crate) struct CommandLoopContext {
    pub(crate) transport: Arc<dyn MqttTransport>,
    pub(crate) translator: Arc<dyn ErrorTranslator>,
    pub(crate) registry: SharedRegistry,
    pub(crate) options: SubscribeOptions,
}

/// Worker state that owns the spawned command-loop thread.
pub(crate) struct SubscriptionWorker {
    worker_id: String,
    loop_handle: CommandLoopHandle,
    commands: UnboundedSender<SubscriptionCommand>,
}

impl SubscriptionWorker {
    pub(crate) fn new(context: CommandLoopContext, thread_name: String) -> io::Result<Self> {
        let worker_id = uuid::Uuid::new_v4().hyphenated().to_string();
        let worker_id_for_loop = worker_id.clone();
        let (commands, command_receiver) = tokio::sync::mpsc::unbounded_channel();

        let loop_handle = spawn_command_loop(thread_name, move || async move {
            Self::command_loop(worker_id_for_loop, context, command_receiver).await;
        })?;

        Ok(Self {
            worker_id,
            loop_handle,
            commands,
        })
    }

    pub(crate) fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub(crate) fn worker_thread(&self) -> &str {
        self.loop_handle.worker_thread()
    }

    pub(crate) fn is_worker_thread(&self) -> bool {
        self.loop_handle.is_current_thread()
    }

    /// Queues `command`; returns `false` when the loop has already stopped.
    pub(crate) fn enqueue(&self, command: SubscriptionCommand) -> bool {
        match self.commands.send(command) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    event = events::SUBSCRIPTION_COMMAND_ENQUEUE_FAILED,
                    component = COMPONENT,
                    worker_id = self.worker_id.as_str(),
                    command = ?err.0,
                    reason = fields::REASON_QUEUE_CLOSED,
                    "unable to queue subscription command"
                );
                false
            }
        }
    }

    /// Processes commands strictly in arrival order until every sender is gone.
    pub(crate) async fn command_loop(
        worker_id: String,
        context: CommandLoopContext,
        mut command_receiver: UnboundedReceiver<SubscriptionCommand>,
    ) {
        let worker_context = WorkerContext::with_current_thread(worker_id);

        while let Some(command) = command_receiver.recv().await {
            match command {
                SubscriptionCommand::Subscribe(topic) => {
                    Self::subscribe(&worker_context, &context, topic).await;
                }
                SubscriptionCommand::Unsubscribe(topic) => {
                    Self::unsubscribe(&worker_context, &context, topic).await;
                }
                SubscriptionCommand::Flush(ack) => {
                    // the waiter may have given up; nothing to report then
                    let _ = ack.send(());
                }
            }
        }

        info!(
            event = events::WORKER_QUEUE_CLOSED,
            component = COMPONENT,
            worker_id = worker_context.worker_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            reason = fields::REASON_QUEUE_CLOSED,
            "command queue closed; stopping subscription worker"
        );
    }

    async fn subscribe(
        worker_context: &WorkerContext,
        context: &CommandLoopContext,
        topic: TwinTopic,
    ) {
        let topic_filter = topic.topic_filter();
        debug!(
            event = events::SUBSCRIBE_REQUEST_ATTEMPT,
            component = COMPONENT,
            worker_id = worker_context.worker_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            kind = topic.as_str(),
            topic_filter,
            qos = context.options.qos.level(),
            "subscribing to twin topic"
        );

        match context
            .transport
            .subscribe(topic_filter, context.options)
            .await
        {
            Ok(()) => {
                debug!(
                    event = events::SUBSCRIBE_REQUEST_OK,
                    component = COMPONENT,
                    worker_id = worker_context.worker_id.as_str(),
                    kind = topic.as_str(),
                    topic_filter,
                    "subscribed to twin topic"
                );
                emit(&context.registry, TwinEvent::Subscribed(topic)).await;
            }
            Err(err) => {
                warn!(
                    event = events::SUBSCRIBE_REQUEST_FAILED,
                    component = COMPONENT,
                    worker_id = worker_context.worker_id.as_str(),
                    kind = topic.as_str(),
                    topic_filter,
                    err = %err,
                    "unable to subscribe to twin topic"
                );
                Self::report_error(worker_context, context, err).await;
            }
        }
    }

    async fn unsubscribe(
        worker_context: &WorkerContext,
        context: &CommandLoopContext,
        topic: TwinTopic,
    ) {
        let topic_filter = topic.topic_filter();
        debug!(
            event = events::UNSUBSCRIBE_REQUEST_ATTEMPT,
            component = COMPONENT,
            worker_id = worker_context.worker_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            kind = topic.as_str(),
            topic_filter,
            "unsubscribing from twin topic"
        );

        match context.transport.unsubscribe(topic_filter).await {
            Ok(()) => {
                debug!(
                    event = events::UNSUBSCRIBE_REQUEST_OK,
                    component = COMPONENT,
                    worker_id = worker_context.worker_id.as_str(),
                    kind = topic.as_str(),
                    topic_filter,
                    "unsubscribed from twin topic"
                );
            }
            Err(err) => {
                warn!(
                    event = events::UNSUBSCRIBE_REQUEST_FAILED,
                    component = COMPONENT,
                    worker_id = worker_context.worker_id.as_str(),
                    kind = topic.as_str(),
                    topic_filter,
                    err = %err,
                    "unable to unsubscribe from twin topic"
                );
                Self::report_error(worker_context, context, err).await;
            }
        }
    }

    async fn report_error(
        worker_context: &WorkerContext,
        context: &CommandLoopContext,
        err: TransportError,
    ) {
        let twin_error = context.translator.translate(err);
        let code = twin_error.code();

        if emit(&context.registry, TwinEvent::Error(twin_error)).await == 0 {
            debug!(
                event = events::ERROR_EVENT_DROPPED,
                component = COMPONENT,
                worker_id = worker_context.worker_id.as_str(),
                code = %code,
                reason = fields::REASON_NO_ERROR_LISTENER,
                "no error consumer registered; dropping error"
            );
        }
    }
}
