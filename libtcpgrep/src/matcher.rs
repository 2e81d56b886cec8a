use crate::decode::DecodedFrame;

/// Case-insensitive substring predicate over TCP payload bytes.
///
/// A pure function of the payload: no state, no I/O, so it can be
/// exercised without any capture machinery. Frames without payload
/// never match.
#[derive(Clone, Debug)]
pub struct PatternMatcher {
    pattern: Vec<u8>,
}

impl PatternMatcher {
    pub fn new<S: AsRef<str>>(pattern: S) -> Self {
        PatternMatcher {
            pattern: pattern.as_ref().as_bytes().to_vec(),
        }
    }

    /// Test the payload of a decoded frame.
    pub fn matches(&self, frame: &DecodedFrame) -> bool {
        self.matches_payload(frame.payload)
    }

    /// ASCII-case-insensitive containment test over raw bytes.
    ///
    /// The payload is matched as captured, split across TCP segments:
    /// a pattern spanning a segment boundary is missed. Stream
    /// reassembly is deliberately out of scope.
    pub fn matches_payload(&self, payload: &[u8]) -> bool {
        if payload.is_empty() {
            return false;
        }
        if self.pattern.is_empty() {
            return true;
        }
        if payload.len() < self.pattern.len() {
            return false;
        }
        payload
            .windows(self.pattern.len())
            .any(|w| w.eq_ignore_ascii_case(&self.pattern))
    }
}
