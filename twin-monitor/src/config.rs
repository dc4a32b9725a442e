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

use serde::{Deserialize, Serialize};
use twin_receiver::{TwinError, TwinErrorCode, TwinReceiverConfig};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) broker: BrokerConfig,
    #[serde(default)]
    pub(crate) receiver: TwinReceiverConfig,
    #[serde(default)]
    pub(crate) watch: WatchConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BrokerConfig {
    pub(crate) hostname: String,
    pub(crate) port: u16,
    pub(crate) client_id: String,
    #[serde(default)]
    pub(crate) username: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
    #[serde(default = "default_keep_alive_secs")]
    pub(crate) keep_alive_secs: u64,
    #[serde(default = "default_channel_capacity")]
    pub(crate) channel_capacity: usize,
}

impl BrokerConfig {
    /// Username and password for the CONNECT packet. A username alone is sent
    /// with an empty password; a password without a username is rejected.
    pub(crate) fn credentials(&self) -> Result<Option<(String, String)>, TwinError> {
        match (&self.username, &self.password) {
            (Some(username), password) => Ok(Some((
                username.clone(),
                password.clone().unwrap_or_default(),
            ))),
            (None, Some(_)) => Err(TwinError::fail_with_code(
                TwinErrorCode::InvalidArgument,
                "broker password is set without a username",
            )),
            (None, None) => Ok(None),
        }
    }
}

fn default_keep_alive_secs() -> u64 {
    60
}

fn default_channel_capacity() -> usize {
    100
}

/// Which twin channels the monitor consumes.
#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    #[serde(default = "enabled")]
    pub(crate) responses: bool,
    #[serde(default = "enabled")]
    pub(crate) posts: bool,
}

fn enabled() -> bool {
    true
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            responses: true,
            posts: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BrokerConfig, Config, WatchConfig};
    use twin_receiver::{QoS, TwinErrorCode, TwinReceiverConfig};

    fn broker(credentials: &str) -> BrokerConfig {
        json5::from_str(&format!(
            r#"{{ hostname: "localhost", port: 1883, client_id: "monitor", {credentials} }}"#
        ))
        .expect("valid broker config")
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config: Config = json5::from_str(
            r#"{
                broker: { hostname: "localhost", port: 1883, client_id: "monitor" },
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.broker.keep_alive_secs, 60);
        assert_eq!(config.broker.channel_capacity, 100);
        assert_eq!(config.broker.username, None);
        assert_eq!(config.receiver, TwinReceiverConfig::default());
        assert_eq!(config.watch, WatchConfig::default());
    }

    #[test]
    fn full_config_is_parsed() {
        let config: Config = json5::from_str(
            r#"{
                broker: {
                    hostname: "hub.example.net",
                    port: 8883,
                    client_id: "device-1",
                    username: "hub.example.net/device-1",
                    password: "secret",
                    keep_alive_secs: 15,
                    channel_capacity: 8,
                },
                receiver: { qos: "at_least_once" },
                watch: { posts: false },
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.broker.port, 8883);
        assert_eq!(
            config.broker.username.as_deref(),
            Some("hub.example.net/device-1")
        );
        assert_eq!(config.receiver.qos, QoS::AtLeastOnce);
        assert!(config.watch.responses);
        assert!(!config.watch.posts);
    }

    #[test]
    fn username_without_password_is_sent_with_empty_password() {
        let credentials = broker(r#"username: "device-1""#)
            .credentials()
            .expect("username alone is accepted");

        assert_eq!(credentials, Some(("device-1".to_string(), String::new())));
    }

    #[test]
    fn password_without_username_is_rejected() {
        let err = broker(r#"password: "secret""#)
            .credentials()
            .expect_err("password alone is rejected");

        assert_eq!(err.code(), TwinErrorCode::InvalidArgument);
    }

    #[test]
    fn credentials_are_optional() {
        assert_eq!(broker("").credentials().expect("no credentials"), None);
        assert_eq!(
            broker(r#"username: "u", password: "p""#)
                .credentials()
                .expect("both set"),
            Some(("u".to_string(), "p".to_string()))
        );
    }

    #[test]
    fn missing_broker_is_rejected() {
        assert!(json5::from_str::<Config>("{ watch: { posts: true } }").is_err());
    }

    #[test]
    fn unknown_broker_field_is_rejected() {
        let parsed = json5::from_str::<Config>(
            r#"{ broker: { hostname: "h", port: 1, client_id: "c", tls: true } }"#,
        );

        assert!(parsed.is_err());
    }

    #[test]
    fn bundled_sample_config_parses() {
        let contents = include_str!("../config/twin-monitor.json5");

        let config: Config = json5::from_str(contents).expect("sample config is valid");

        assert_eq!(config.broker.client_id, "twin-monitor");
    }
}
