//! Request tokens for discarding superseded responses.
//!
//! Every load issues a fresh token. A response is applied only if its token
//! is still the most recent one issued; retries, task switches and shutdown
//! all invalidate whatever was in flight.

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct LoadTracker {
    issued: u64,
    pending: Option<RequestToken>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a token for a new request, superseding any pending one.
    pub fn issue(&mut self) -> RequestToken {
        self.issued += 1;
        let token = RequestToken(self.issued);
        self.pending = Some(token);
        token
    }

    /// Returns true if a response carrying `token` should be applied.
    ///
    /// Accepting clears the pending slot, so a duplicate delivery of the same
    /// response is rejected.
    pub fn accept(&mut self, token: RequestToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Abandons the pending request; its response will be discarded.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
