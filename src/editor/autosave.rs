use super::SaveRequest;

/// Serialises note writes.
///
/// One write is in flight at a time. Requests arriving meanwhile wait in
/// `pending`, where a newer request for a note replaces the older one, so a
/// burst of keystrokes costs one trailing write instead of many.
#[derive(Debug, Default)]
pub(crate) struct SaveQueue {
    in_flight: bool,
    pending: Vec<SaveRequest>,
}

impl SaveQueue {
    /// Returns the request to send now, or `None` if it was queued.
    pub fn enqueue(&mut self, request: SaveRequest) -> Option<SaveRequest> {
        if !self.in_flight {
            self.in_flight = true;
            return Some(request);
        }
        match self
            .pending
            .iter_mut()
            .find(|p| p.note_id == request.note_id)
        {
            Some(slot) => *slot = request,
            None => self.pending.push(request),
        }
        None
    }

    /// Mark the in-flight write finished; returns the next one to send.
    pub fn complete(&mut self) -> Option<SaveRequest> {
        if self.pending.is_empty() {
            self.in_flight = false;
            return None;
        }
        Some(self.pending.remove(0))
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        !self.in_flight && self.pending.is_empty()
    }
}
