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

//! Twin topic filters and the inbound topic grammar.
//!
//! | Kind | Filter subscribed | Accepted topic shape |
//! |---|---|---|
//! | response | `$iothub/twin/res/#` | `$iothub/twin/res/{status}/?$rid={requestId}[&...]` |
//! | post | `$iothub/twin/PATCH/properties/desired/#` | `$iothub/twin/PATCH/properties/desired/...` |

use std::fmt;
use std::fmt::{Display, Formatter};
use url::form_urlencoded;

pub const RESPONSE_TOPIC_FILTER: &str = "$iothub/twin/res/#";
pub const POST_TOPIC_FILTER: &str = "$iothub/twin/PATCH/properties/desired/#";

const RESPONSE_TOPIC_PREFIX: &str = "$iothub/twin/res";
const POST_TOPIC_ROOT: &str = "$iothub/twin/PATCH";
const POST_TOPIC_PREFIX: &str = "$iothub/twin/PATCH/properties/desired/";
const REQUEST_ID_PARAM: &str = "$rid";
const RESPONSE_PATH: [&str; 3] = ["$iothub", "twin", "res"];

/// Twin channel that owns a transport subscription.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TwinTopic {
    Response,
    Post,
}

impl TwinTopic {
    pub const ALL: [TwinTopic; 2] = [TwinTopic::Response, TwinTopic::Post];

    pub fn topic_filter(&self) -> &'static str {
        match self {
            TwinTopic::Response => RESPONSE_TOPIC_FILTER,
            TwinTopic::Post => POST_TOPIC_FILTER,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TwinTopic::Response => "response",
            TwinTopic::Post => "post",
        }
    }
}

impl Display for TwinTopic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of matching an inbound topic against the twin grammar.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TopicMatch {
    Response { status: String, request_id: String },
    Post,
    Unmatched,
}

impl TopicMatch {
    pub fn topic(&self) -> Option<TwinTopic> {
        match self {
            TopicMatch::Response { .. } => Some(TwinTopic::Response),
            TopicMatch::Post => Some(TwinTopic::Post),
            TopicMatch::Unmatched => None,
        }
    }
}

/// Classifies `topic`. Total over arbitrary input: anything outside the
/// grammar is [`TopicMatch::Unmatched`].
pub fn parse_topic(topic: &str) -> TopicMatch {
    if topic.starts_with(RESPONSE_TOPIC_PREFIX) {
        parse_response_topic(topic).unwrap_or(TopicMatch::Unmatched)
    } else if topic.starts_with(POST_TOPIC_ROOT) {
        parse_post_topic(topic)
    } else {
        TopicMatch::Unmatched
    }
}

fn parse_response_topic(topic: &str) -> Option<TopicMatch> {
    let without_fragment = topic.split('#').next().unwrap_or_default();
    let (path, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let mut segments = path.split('/');
    for expected in RESPONSE_PATH {
        if segments.next()? != expected {
            return None;
        }
    }
    let status = segments.next().filter(|status| !status.is_empty())?;

    // first occurrence wins when the parameter repeats
    let request_id = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == REQUEST_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|request_id| !request_id.is_empty())?;

    Some(TopicMatch::Response {
        status: status.to_string(),
        request_id,
    })
}

fn parse_post_topic(topic: &str) -> TopicMatch {
    if topic.starts_with(POST_TOPIC_PREFIX) {
        TopicMatch::Post
    } else {
        TopicMatch::Unmatched
    }
}
