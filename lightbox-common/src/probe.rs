/// Identifies one image probe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProbeToken(u64);

/// Hands out probe tokens and remembers which one is current.
///
/// Only the most recently issued token is current. `invalidate` retires it
/// without issuing a new one, so every outstanding probe becomes stale.
#[derive(Debug, Default)]
pub struct ProbeSequencer {
    next: u64,
    current: Option<ProbeToken>,
}

impl ProbeSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> ProbeToken {
        let token = ProbeToken(self.next);
        self.next += 1;
        self.current = Some(token);
        token
    }

    pub fn is_current(&self, token: ProbeToken) -> bool {
        self.current == Some(token)
    }

    /// Consume the current token. Returns false for stale tokens.
    pub fn complete(&mut self, token: ProbeToken) -> bool {
        if self.is_current(token) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn invalidate(&mut self) {
        self.current = None;
    }
}
