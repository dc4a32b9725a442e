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

//! Correlates subscribe/unsubscribe calls with the broker acknowledgement.
//!
//! A request is registered before it is handed to the client, bound to its
//! packet id when the event loop reports it outgoing, and completed by the
//! matching SUBACK or UNSUBACK.

use rumqttc::SubscribeReasonCode;
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;
use tracing::debug;
use twin_receiver::TransportError;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum RequestKind {
    Subscribe,
    Unsubscribe,
}

pub(crate) type Acknowledgement = oneshot::Receiver<Result<(), TransportError>>;

struct PendingRequest {
    token: u64,
    kind: RequestKind,
    topic_filter: String,
    ack: oneshot::Sender<Result<(), TransportError>>,
}

#[derive(Default)]
pub(crate) struct RequestTracker {
    next_token: u64,
    queued: VecDeque<PendingRequest>,
    in_flight: HashMap<(RequestKind, u16), PendingRequest>,
}

impl RequestTracker {
    /// Registers a request about to be handed to the client.
    pub(crate) fn register(
        &mut self,
        kind: RequestKind,
        topic_filter: &str,
    ) -> (u64, Acknowledgement) {
        let token = self.next_token;
        self.next_token += 1;
        let (ack, acknowledgement) = oneshot::channel();
        self.queued.push_back(PendingRequest {
            token,
            kind,
            topic_filter: topic_filter.to_string(),
            ack,
        });
        (token, acknowledgement)
    }

    /// Forgets a request the client refused to queue.
    pub(crate) fn cancel(&mut self, token: u64) {
        self.queued.retain(|request| request.token != token);
    }

    /// Binds the oldest queued request of `kind` to `pkid`.
    pub(crate) fn on_outgoing(&mut self, kind: RequestKind, pkid: u16) {
        let Some(position) = self.queued.iter().position(|request| request.kind == kind) else {
            debug!("no pending {kind:?} request for packet {pkid}");
            return;
        };
        if let Some(request) = self.queued.remove(position) {
            self.in_flight.insert((kind, pkid), request);
        }
    }

    pub(crate) fn on_suback(&mut self, pkid: u16, return_codes: &[SubscribeReasonCode]) {
        let Some(request) = self.in_flight.remove(&(RequestKind::Subscribe, pkid)) else {
            return;
        };
        let outcome = if return_codes
            .iter()
            .any(|code| matches!(code, SubscribeReasonCode::Failure))
        {
            Err(TransportError::new(format!(
                "Subscription refused by broker: {}",
                request.topic_filter
            )))
        } else {
            Ok(())
        };
        // the caller may have been dropped
        let _ = request.ack.send(outcome);
    }

    pub(crate) fn on_unsuback(&mut self, pkid: u16) {
        if let Some(request) = self.in_flight.remove(&(RequestKind::Unsubscribe, pkid)) {
            let _ = request.ack.send(Ok(()));
        }
    }

    /// Fails every outstanding request with `message`.
    pub(crate) fn fail_all(&mut self, message: &str) {
        let queued = self.queued.drain(..);
        let in_flight = self.in_flight.drain().map(|(_, request)| request);
        for request in queued.chain(in_flight) {
            let _ = request.ack.send(Err(TransportError::new(message)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestKind, RequestTracker};
    use rumqttc::{QoS, SubscribeReasonCode};

    #[test]
    fn suback_success_completes_the_matching_subscribe() {
        let mut tracker = RequestTracker::default();
        let (_, mut ack) = tracker.register(RequestKind::Subscribe, "$iothub/twin/res/#");

        tracker.on_outgoing(RequestKind::Subscribe, 7);
        assert!(ack.try_recv().is_err());

        tracker.on_suback(7, &[SubscribeReasonCode::Success(QoS::AtLeastOnce)]);
        assert_eq!(ack.try_recv().expect("completed"), Ok(()));
    }

    #[test]
    fn suback_failure_becomes_a_transport_error() {
        let mut tracker = RequestTracker::default();
        let (_, mut ack) = tracker.register(
            RequestKind::Subscribe,
            "$iothub/twin/PATCH/properties/desired/#",
        );

        tracker.on_outgoing(RequestKind::Subscribe, 3);
        tracker.on_suback(3, &[SubscribeReasonCode::Failure]);

        let err = ack
            .try_recv()
            .expect("completed")
            .expect_err("refused subscription");
        assert_eq!(
            err.message(),
            "Subscription refused by broker: $iothub/twin/PATCH/properties/desired/#"
        );
    }

    #[test]
    fn unsuback_completes_only_unsubscribes() {
        let mut tracker = RequestTracker::default();
        let (_, mut subscribe) = tracker.register(RequestKind::Subscribe, "a/#");
        let (_, mut unsubscribe) = tracker.register(RequestKind::Unsubscribe, "b/#");
        tracker.on_outgoing(RequestKind::Unsubscribe, 1);
        tracker.on_outgoing(RequestKind::Subscribe, 1);

        tracker.on_unsuback(1);

        assert_eq!(unsubscribe.try_recv().expect("completed"), Ok(()));
        assert!(subscribe.try_recv().is_err());
    }

    #[test]
    fn cancelled_request_is_never_bound() {
        let mut tracker = RequestTracker::default();
        let (token, _cancelled) = tracker.register(RequestKind::Subscribe, "a/#");
        let (_, mut next) = tracker.register(RequestKind::Subscribe, "b/#");
        tracker.cancel(token);

        tracker.on_outgoing(RequestKind::Subscribe, 9);
        tracker.on_suback(9, &[SubscribeReasonCode::Success(QoS::AtMostOnce)]);

        assert_eq!(next.try_recv().expect("completed"), Ok(()));
    }

    #[test]
    fn connection_loss_fails_outstanding_requests() {
        let mut tracker = RequestTracker::default();
        let (_, mut queued) = tracker.register(RequestKind::Subscribe, "a/#");
        let (_, mut in_flight) = tracker.register(RequestKind::Unsubscribe, "b/#");
        tracker.on_outgoing(RequestKind::Unsubscribe, 2);

        tracker.fail_all("No connection to broker");

        for ack in [&mut queued, &mut in_flight] {
            let err = ack.try_recv().expect("completed").expect_err("failed");
            assert_eq!(err.message(), "No connection to broker");
        }
    }
}
