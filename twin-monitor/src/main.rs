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

mod config;
mod mqtt_transport;
mod request_tracker;

use crate::config::Config;
use crate::mqtt_transport::RumqttTransport;
use async_trait::async_trait;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use twin_receiver::{
    MqttTransport, TwinError, TwinErrorCode, TwinEvent, TwinEventKind, TwinListener,
    TwinReceiver,
};

#[derive(Parser)]
#[command()]
struct MonitorArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

/// Logs every twin event it is handed.
struct EventLogger;

impl EventLogger {
    fn render_body(body: &[u8]) -> String {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(json) => json.to_string(),
            Err(_) => String::from_utf8_lossy(body).into_owned(),
        }
    }
}

#[async_trait]
impl TwinListener for EventLogger {
    async fn on_event(&self, event: TwinEvent) {
        match event {
            TwinEvent::Response(response) => info!(
                "twin response: status={} rid={} body={}",
                response.status,
                response.request_id,
                Self::render_body(&response.body)
            ),
            TwinEvent::Post(post) => {
                info!("desired properties: {}", Self::render_body(&post.body))
            }
            TwinEvent::Subscribed(topic) => info!("subscribed to {}", topic.topic_filter()),
            TwinEvent::Error(err) => warn!("twin receiver error: {err}"),
        }
    }
}

fn load_config(path: &str) -> Result<Config, TwinError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        TwinError::fail_with_code(
            TwinErrorCode::InvalidArgument,
            format!("Unable to read config file {path}: {e:?}"),
        )
    })?;

    json5::from_str(&contents).map_err(|e| {
        TwinError::fail_with_code(
            TwinErrorCode::Format,
            format!("Unable to parse config file: {e:?}"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), TwinError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    info!("Started twin-monitor");

    let args = MonitorArgs::parse();
    let config = load_config(&args.config)?;

    let transport = Arc::new(RumqttTransport::connect(&config.broker)?);
    let client: Arc<dyn MqttTransport> = transport.clone();
    let receiver = TwinReceiver::builder()
        .client(client)
        .config(config.receiver)
        .build()?;

    let logger: Arc<dyn TwinListener> = Arc::new(EventLogger);
    receiver.add_listener(TwinEventKind::Subscribed, logger.clone());
    receiver.add_listener(TwinEventKind::Error, logger.clone());
    if config.watch.responses {
        receiver.add_listener(TwinEventKind::Response, logger.clone());
    }
    if config.watch.posts {
        receiver.add_listener(TwinEventKind::Post, logger);
    }

    tokio::signal::ctrl_c().await.map_err(|e| {
        TwinError::fail_with_code(
            TwinErrorCode::Internal,
            format!("Unable to listen for shutdown signal: {e:?}"),
        )
    })?;

    info!("Shutting down twin-monitor");
    drop(receiver);
    transport.disconnect().await;

    Ok(())
}
