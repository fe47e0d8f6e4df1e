use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("No command given")]
    MissingCommand,
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    #[error("Missing argument <{0}>")]
    MissingArgument(&'static str),
    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),
    #[error("Option {0} requires a value")]
    MissingValue(String),
    #[error("Option {flag} has an invalid value '{value}'")]
    InvalidValue {
        flag: String,
        value: String
    }
}
