use crate::error::StegaError;

pub type Result<T> = std::result::Result<T, StegaError>;
