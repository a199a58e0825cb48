/// How an engine error code affects the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    /// Momentary condition (silence, engine-side abort); the session keeps
    /// going and no message is shown
    Transient,
    /// Microphone or recognition access was refused; recoverable by the
    /// user granting access and starting again
    PermissionDenied,
    /// Anything else; the session stops and stays stopped until the user
    /// explicitly starts a new one
    Fatal,
}

impl RecognitionErrorKind {
    pub fn classify(code: &str) -> Self {
        match code {
            "no-speech" | "aborted" => Self::Transient,
            "not-allowed" | "service-not-allowed" | "permission-denied" => Self::PermissionDenied,
            _ => Self::Fatal,
        }
    }

    /// User-visible message for a non-transient error code.
    pub fn user_message(self, code: &str) -> String {
        match self {
            Self::Transient => String::new(),
            Self::PermissionDenied => {
                "Please grant microphone permission to use speech recognition.".to_string()
            }
            Self::Fatal => format!("Speech recognition failed: {}", code),
        }
    }
}
