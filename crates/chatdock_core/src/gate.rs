use serde::{Deserialize, Serialize};

pub type RequestId = u64;

/// Why the last submission did not produce a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    Unreachable,
}

/// Single-flight guard on the submission path.
///
/// Outcomes only move the gate when they belong to the send currently in
/// flight; a late reply to an older send never releases a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitGate {
    #[default]
    Idle,
    /// A send is in flight; new submissions are rejected.
    Sending { request: RequestId },
    /// The last send failed in transport. Accepts new submissions.
    Error(SendFailure),
}

/// Gate transition when `/chat/send` answers `ok:false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RejectedReplyPolicy {
    /// Return to `Idle` so the input is usable again.
    #[default]
    Release,
    /// Stay in `Sending` until a differing poll arrives.
    HoldUntilPoll,
}

impl SubmitGate {
    pub fn accepts_submission(self) -> bool {
        !self.is_held()
    }

    pub fn is_held(self) -> bool {
        matches!(self, SubmitGate::Sending { .. })
    }

    fn is_in_flight(self, request: RequestId) -> bool {
        self == SubmitGate::Sending { request }
    }

    pub fn on_submit(&mut self, request: RequestId) {
        *self = SubmitGate::Sending { request };
    }

    pub fn on_reply(&mut self, request: RequestId) {
        if self.is_in_flight(request) {
            *self = SubmitGate::Idle;
        }
    }

    pub fn on_rejected(&mut self, request: RequestId, policy: RejectedReplyPolicy) {
        if !self.is_in_flight(request) {
            return;
        }
        match policy {
            RejectedReplyPolicy::Release => *self = SubmitGate::Idle,
            RejectedReplyPolicy::HoldUntilPoll => {}
        }
    }

    pub fn on_unreachable(&mut self, request: RequestId) {
        if self.is_in_flight(request) {
            *self = SubmitGate::Error(SendFailure::Unreachable);
        }
    }

    /// A differing snapshot means replies arrived out-of-band.
    pub fn on_snapshot_changed(&mut self) {
        *self = SubmitGate::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::{RejectedReplyPolicy, SendFailure, SubmitGate};

    #[test]
    fn sending_blocks_until_reply() {
        let mut gate = SubmitGate::default();
        assert!(gate.accepts_submission());
        gate.on_submit(1);
        assert!(!gate.accepts_submission());
        gate.on_reply(1);
        assert_eq!(gate, SubmitGate::Idle);
    }

    #[test]
    fn late_reply_does_not_release_newer_send() {
        let mut gate = SubmitGate::default();
        gate.on_submit(1);
        gate.on_snapshot_changed();
        gate.on_submit(2);

        gate.on_reply(1);

        assert_eq!(gate, SubmitGate::Sending { request: 2 });
    }

    #[test]
    fn rejected_reply_follows_policy() {
        let mut released = SubmitGate::Sending { request: 4 };
        released.on_rejected(4, RejectedReplyPolicy::Release);
        assert_eq!(released, SubmitGate::Idle);

        let mut held = SubmitGate::Sending { request: 4 };
        held.on_rejected(4, RejectedReplyPolicy::HoldUntilPoll);
        assert_eq!(held, SubmitGate::Sending { request: 4 });
        held.on_snapshot_changed();
        assert_eq!(held, SubmitGate::Idle);
    }

    #[test]
    fn error_state_accepts_new_submissions() {
        let mut gate = SubmitGate::Sending { request: 9 };
        gate.on_unreachable(9);
        assert_eq!(gate, SubmitGate::Error(SendFailure::Unreachable));
        assert!(gate.accepts_submission());
    }
}
