#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter state: {0}")]
    UnknownState(String),
    #[error("unknown filter key: {0}")]
    UnknownFilterKey(String),
    #[error("filter {key} expects a {expected} value")]
    ValueMismatch { key: String, expected: &'static str },
    #[error("'{value}' is not an option of filter {key}")]
    UnknownOption { key: String, value: String },
}
