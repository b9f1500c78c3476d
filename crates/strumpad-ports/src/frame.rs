/// Errors raised while turning raw device reports into decoded frames.
/// Truncated and unknown-code reports are transient: the caller drops the
/// frame and keeps its previous state.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("truncated report: got {got} bytes, expected {expected}")]
    Truncated { got: usize, expected: usize },
    #[error("field '{field}': unknown status code {code}")]
    UnknownCode { field: String, code: u8 },
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}
