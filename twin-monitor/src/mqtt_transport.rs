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

use crate::config::BrokerConfig;
use crate::request_tracker::{Acknowledgement, RequestKind, RequestTracker};
use async_trait::async_trait;
use parking_lot::Mutex;
use rumqttc::{
    AsyncClient, ClientError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS as MqttQoS,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use twin_receiver::{
    MessageListener, MqttTransport, QoS, SubscribeOptions, TransportError, TwinError,
};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

type Listeners = Arc<Mutex<Vec<Arc<dyn MessageListener>>>>;
type SharedTracker = Arc<Mutex<RequestTracker>>;

/// [`MqttTransport`] backed by a `rumqttc` client. Inbound publishes are
/// pumped from the client event loop to every attached listener, and
/// subscribe/unsubscribe complete on the broker acknowledgement.
pub struct RumqttTransport {
    client: AsyncClient,
    listeners: Listeners,
    tracker: SharedTracker,
    event_loop: JoinHandle<()>,
}

impl RumqttTransport {
    /// Creates the client and starts polling its event loop on the current
    /// tokio runtime. The connection is established by that loop.
    pub fn connect(broker: &BrokerConfig) -> Result<Self, TwinError> {
        let mut options = MqttOptions::new(&broker.client_id, &broker.hostname, broker.port);
        options.set_keep_alive(Duration::from_secs(broker.keep_alive_secs));
        if let Some((username, password)) = broker.credentials()? {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, broker.channel_capacity);
        let listeners: Listeners = Arc::new(Mutex::new(Vec::new()));
        let tracker: SharedTracker = Arc::new(Mutex::new(RequestTracker::default()));

        info!(
            "connecting to MQTT broker {}:{} as {}",
            broker.hostname, broker.port, broker.client_id
        );
        let event_loop = tokio::spawn(Self::pump(event_loop, listeners.clone(), tracker.clone()));

        Ok(Self {
            client,
            listeners,
            tracker,
            event_loop,
        })
    }

    pub async fn disconnect(&self) {
        if let Err(err) = self.client.disconnect().await {
            debug!("MQTT disconnect request failed: {err}");
        }
    }

    async fn pump(mut event_loop: EventLoop, listeners: Listeners, tracker: SharedTracker) {
        loop {
            match event_loop.poll().await {
                Ok(Event::Outgoing(Outgoing::Subscribe(pkid))) => {
                    tracker.lock().on_outgoing(RequestKind::Subscribe, pkid);
                }
                Ok(Event::Outgoing(Outgoing::Unsubscribe(pkid))) => {
                    tracker.lock().on_outgoing(RequestKind::Unsubscribe, pkid);
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    tracker.lock().on_suback(ack.pkid, &ack.return_codes);
                }
                Ok(Event::Incoming(Packet::UnsubAck(ack))) => {
                    tracker.lock().on_unsuback(ack.pkid);
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let attached = listeners.lock().clone();
                    debug!(
                        "MQTT received: {} ({} bytes)",
                        publish.topic,
                        publish.payload.len()
                    );
                    for listener in attached {
                        listener
                            .on_message(publish.topic.clone(), publish.payload.clone())
                            .await;
                    }
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("MQTT connected to broker");
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    warn!("MQTT disconnected by broker");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("MQTT connection error: {err}");
                    tracker.lock().fail_all(&err.to_string());
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    /// Hands a request to the client and waits for the broker to acknowledge it.
    async fn acknowledged<F, Fut>(
        &self,
        kind: RequestKind,
        topic_filter: &str,
        request: F,
    ) -> Result<(), TransportError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(), ClientError>>,
    {
        let (token, acknowledgement): (u64, Acknowledgement) =
            self.tracker.lock().register(kind, topic_filter);

        if let Err(err) = request().await {
            self.tracker.lock().cancel(token);
            return Err(TransportError::new(err.to_string()));
        }

        acknowledgement
            .await
            .map_err(|_| TransportError::new("client disconnecting"))?
    }

    fn mqtt_qos(qos: QoS) -> MqttQoS {
        match qos {
            QoS::AtMostOnce => MqttQoS::AtMostOnce,
            QoS::AtLeastOnce => MqttQoS::AtLeastOnce,
            QoS::ExactlyOnce => MqttQoS::ExactlyOnce,
        }
    }
}

#[async_trait]
impl MqttTransport for RumqttTransport {
    async fn subscribe(
        &self,
        topic_filter: &str,
        options: SubscribeOptions,
    ) -> Result<(), TransportError> {
        let qos = Self::mqtt_qos(options.qos);
        self.acknowledged(RequestKind::Subscribe, topic_filter, || {
            self.client.subscribe(topic_filter, qos)
        })
        .await
    }

    async fn unsubscribe(&self, topic_filter: &str) -> Result<(), TransportError> {
        self.acknowledged(RequestKind::Unsubscribe, topic_filter, || {
            self.client.unsubscribe(topic_filter)
        })
        .await
    }

    fn attach_message_listener(&self, listener: Arc<dyn MessageListener>) {
        self.listeners.lock().push(listener);
    }

    fn detach_message_listener(&self, listener: &Arc<dyn MessageListener>) {
        self.listeners
            .lock()
            .retain(|attached| !Arc::ptr_eq(attached, listener));
    }
}

impl Drop for RumqttTransport {
    fn drop(&mut self) {
        self.event_loop.abort();
        self.tracker.lock().fail_all("client disconnecting");
    }
}

#[cfg(test)]
mod tests {
    use super::RumqttTransport;
    use rumqttc::QoS as MqttQoS;
    use twin_receiver::QoS;

    #[test]
    fn qos_levels_map_one_to_one() {
        assert_eq!(RumqttTransport::mqtt_qos(QoS::AtMostOnce), MqttQoS::AtMostOnce);
        assert_eq!(RumqttTransport::mqtt_qos(QoS::AtLeastOnce), MqttQoS::AtLeastOnce);
        assert_eq!(RumqttTransport::mqtt_qos(QoS::ExactlyOnce), MqttQoS::ExactlyOnce);
    }
}
