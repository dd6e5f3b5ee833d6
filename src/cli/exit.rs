/// Command outcome determining exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Document processed with clean extraction and dispatch (exit 0).
    Success,
    /// Extraction or a dispatch failed, or a lookup found nothing (exit 1).
    Partial,
    /// Pipeline refusal, configuration or I/O failure (exit 2).
    Refusal,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Partial => 1,
            Outcome::Refusal => 2,
        }
    }
}
