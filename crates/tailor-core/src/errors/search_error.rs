/// Graph search and orientation errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("unknown node '{name}'")]
    UnknownNode { name: String },

    #[error("graph variables do not match the score variables: {details}")]
    VariableMismatch { details: String },

    #[error("cycle detected in {graph} graph: {path}")]
    CycleDetected { graph: String, path: String },

    #[error("no separating-set producer configured")]
    MissingSepsets,

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl super::TailorErrorCode for SearchError {
    fn error_code(&self) -> &'static str {
        super::error_code::SEARCH_ERROR
    }
}
