use std::time::Instant;

/// Coalesces layout requests into at most one per frame. A new request
/// replaces the pending one, so a burst of resizes costs a single re-render.
#[derive(Debug, Default)]
pub(super) struct FrameScheduler {
    pending: Option<Instant>,
}

impl FrameScheduler {
    pub(super) fn request(&mut self, now: Instant) {
        if self.pending.replace(now).is_some() {
            tracing::trace!("pending layout request replaced");
        }
    }

    #[cfg(test)]
    pub(super) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// True once per request, on the first frame at or after the request.
    pub(super) fn take_due(&mut self, frame_start: Instant) -> bool {
        match self.pending {
            Some(requested) if requested <= frame_start => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
