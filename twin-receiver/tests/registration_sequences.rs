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

use std::collections::VecDeque;
use std::sync::Arc;
use twin_receiver::{ListenerHandle, MqttTransport, TwinEventKind, TwinReceiver, TwinTopic};
use twin_test_utils::{init_logging, ChannelListener, RecordingTransport};

const MAX_SEQUENCE_LEN: u32 = 5;

#[derive(Clone, Copy, Debug)]
enum Step {
    Add(TwinTopic),
    Remove(TwinTopic),
}

const STEPS: [Step; 4] = [
    Step::Add(TwinTopic::Response),
    Step::Add(TwinTopic::Post),
    Step::Remove(TwinTopic::Response),
    Step::Remove(TwinTopic::Post),
];

/// Every sequence over [`STEPS`] of exactly `len` steps, in base-4 order.
fn sequences(len: u32) -> impl Iterator<Item = Vec<Step>> {
    (0..STEPS.len().pow(len)).map(move |mut index| {
        (0..len)
            .map(|_| {
                let step = STEPS[index % STEPS.len()];
                index /= STEPS.len();
                step
            })
            .collect()
    })
}

#[derive(Default)]
struct TopicModel {
    live: VecDeque<ListenerHandle>,
    subscribe_edges: usize,
    unsubscribe_edges: usize,
}

fn model_index(topic: TwinTopic) -> usize {
    match topic {
        TwinTopic::Response => 0,
        TwinTopic::Post => 1,
    }
}

async fn run_sequence(steps: &[Step]) {
    let transport = Arc::new(RecordingTransport::new("sequence"));
    let client: Arc<dyn MqttTransport> = transport.clone();
    let receiver = TwinReceiver::new(client).expect("receiver construction should succeed");
    let mut models = [TopicModel::default(), TopicModel::default()];

    for (position, step) in steps.iter().enumerate() {
        match *step {
            Step::Add(topic) => {
                let model = &mut models[model_index(topic)];
                if model.live.is_empty() {
                    model.subscribe_edges += 1;
                }
                let (listener, _events) = ChannelListener::new("sequence");
                model
                    .live
                    .push_back(receiver.add_listener(TwinEventKind::from(topic), listener));
            }
            Step::Remove(topic) => {
                let model = &mut models[model_index(topic)];
                let Some(handle) = model.live.pop_front() else {
                    continue;
                };
                if model.live.is_empty() {
                    model.unsubscribe_edges += 1;
                }
                assert!(receiver.remove_listener(handle), "{steps:?} at {position}");
            }
        }

        let feed_consumers = receiver.listener_count(TwinEventKind::Response)
            + receiver.listener_count(TwinEventKind::Post);
        assert_eq!(
            receiver.is_feed_attached(),
            feed_consumers > 0,
            "{steps:?} at {position}"
        );
        assert_eq!(
            transport.attached_listeners(),
            usize::from(feed_consumers > 0),
            "{steps:?} at {position}"
        );
    }

    receiver.wait_idle().await.expect("worker running");

    for topic in [TwinTopic::Response, TwinTopic::Post] {
        let model = &models[model_index(topic)];
        assert_eq!(
            receiver.listener_count(TwinEventKind::from(topic)),
            model.live.len(),
            "{steps:?}"
        );
        assert_eq!(
            transport.subscribe_count(topic.topic_filter()),
            model.subscribe_edges,
            "{steps:?}"
        );
        assert_eq!(
            transport.unsubscribe_count(topic.topic_filter()),
            model.unsubscribe_edges,
            "{steps:?}"
        );
    }
}

#[tokio::test]
async fn feed_attachment_and_requests_follow_every_registration_sequence() {
    init_logging();

    for len in 0..=MAX_SEQUENCE_LEN {
        for steps in sequences(len) {
            run_sequence(&steps).await;
        }
    }
}
