use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocchatError {
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for DocchatError {
    fn from(e: serde_json::Error) -> Self {
        DocchatError::Serialize(e.to_string())
    }
}
