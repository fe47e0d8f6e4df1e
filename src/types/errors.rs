use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Amount '{input}' is not a valid number")]
    InvalidAmount {
        input: String
    },
    #[error("3D secure flag '{input}' must be 0 or 1")]
    InvalidFlag {
        input: String
    }
}
