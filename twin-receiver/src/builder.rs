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

use crate::config::TwinReceiverConfig;
use crate::error::{ErrorTranslator, MqttErrorTranslator, TwinError, TwinErrorCode};
use crate::feed::TwinMessageFeed;
use crate::receiver::TwinReceiver;
use crate::subscription_worker::{CommandLoopContext, SubscriptionWorker};
use crate::transport::{MessageListener, MqttTransport, SubscribeOptions};
use std::sync::Arc;

/// Assembles a [`TwinReceiver`].
///
/// Only [`client`](Self::client) is required. The configuration defaults to
/// [`TwinReceiverConfig::default`] and transport failures are classified by
/// [`MqttErrorTranslator`] unless another translator is supplied.
///
/// ```
/// use twin_receiver::{TwinErrorCode, TwinReceiver};
///
/// let err = TwinReceiver::builder().build().unwrap_err();
/// assert_eq!(err.code(), TwinErrorCode::InvalidArgument);
/// ```
#[derive(Default)]
pub struct TwinReceiverBuilder {
    client: Option<Arc<dyn MqttTransport>>,
    config: Option<TwinReceiverConfig>,
    translator: Option<Arc<dyn ErrorTranslator>>,
}

impl TwinReceiverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client: Arc<dyn MqttTransport>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(mut self, config: TwinReceiverConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn error_translator(mut self, translator: Arc<dyn ErrorTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Creates the receiver and starts its subscription worker. No transport
    /// call is made until the first consumer registers.
    pub fn build(self) -> Result<TwinReceiver, TwinError> {
        let Some(transport) = self.client else {
            return Err(TwinError::fail_with_code(
                TwinErrorCode::InvalidArgument,
                "required parameter is missing: client",
            ));
        };
        let config = self.config.unwrap_or_default();
        let translator = self
            .translator
            .unwrap_or_else(|| Arc::new(MqttErrorTranslator));

        let registry = TwinReceiver::new_registry();
        let feed: Arc<dyn MessageListener> = Arc::new(TwinMessageFeed::new(registry.clone()));
        let context = CommandLoopContext {
            transport: transport.clone(),
            translator,
            registry: registry.clone(),
            options: SubscribeOptions { qos: config.qos },
        };

        let worker = SubscriptionWorker::new(context, config.worker_thread_name).map_err(|err| {
            TwinError::fail_with_code(
                TwinErrorCode::Internal,
                format!("unable to start subscription worker: {err}"),
            )
        })?;

        Ok(TwinReceiver::from_parts(transport, registry, feed, worker))
    }
}
