use crate::recognition::RecognitionResult;

/// Accumulated transcript for one dictation session
///
/// Final results are committed in delivery order; non-final results replace
/// a single pending interim segment until the engine either finalizes them
/// or the session ends. The committed buffer only ever grows while a
/// session is live.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    committed: String,
    interim: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one engine result event, delivered in order from `index`
    /// onward. Finals append to the committed buffer; the interim segment
    /// is rebuilt from this event's non-final results (and therefore
    /// empties when an event carries only finals).
    pub fn apply(&mut self, _index: usize, results: &[RecognitionResult]) {
        let mut interim = String::new();

        for result in results {
            if result.is_final {
                self.push_final(&result.transcript);
            } else {
                interim.push_str(&result.transcript);
            }
        }

        self.interim = interim;
    }

    /// Append a committed segment, inserting a separating space only when
    /// neither side already provides whitespace. Engines that pre-space
    /// their finals concatenate exactly.
    fn push_final(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let needs_separator = !self.committed.is_empty()
            && !self.committed.ends_with(char::is_whitespace)
            && !text.starts_with(char::is_whitespace);

        if needs_separator {
            self.committed.push(' ');
        }

        self.committed.push_str(text);
    }

    /// Empty both buffers. Valid in any state, including mid-session.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.interim.clear();
    }

    /// Discard the pending interim segment. Called when a session fully
    /// stops: interim text is visual-only and never outlives its session.
    pub fn drop_interim(&mut self) {
        self.interim.clear();
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Committed text plus the pending interim, joined with the same
    /// separator rule used for committed segments.
    pub fn display(&self) -> String {
        if self.interim.is_empty() {
            return self.committed.clone();
        }

        let mut text = self.committed.clone();

        if !text.is_empty()
            && !text.ends_with(char::is_whitespace)
            && !self.interim.starts_with(char::is_whitespace)
        {
            text.push(' ');
        }

        text.push_str(&self.interim);
        text
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.interim.is_empty()
    }
}
