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

//! Receiver configuration, loadable from any serde format.

use crate::runtime::worker_runtime::DEFAULT_SUBSCRIPTION_WORKER_THREAD_NAME;
use crate::transport::QoS;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TwinReceiverConfig {
    /// Delivery guarantee requested for both twin subscriptions.
    #[serde(default)]
    pub qos: QoS,
    /// OS thread name of the subscription worker.
    #[serde(default = "default_worker_thread_name")]
    pub worker_thread_name: String,
}

fn default_worker_thread_name() -> String {
    DEFAULT_SUBSCRIPTION_WORKER_THREAD_NAME.to_string()
}

impl Default for TwinReceiverConfig {
    fn default() -> Self {
        Self {
            qos: QoS::default(),
            worker_thread_name: default_worker_thread_name(),
        }
    }
}
