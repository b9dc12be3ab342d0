use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid offset '{0}': expected a number or \"vertical,horizontal\"")]
    InvalidOffset(String),

    #[error("Invalid delay '{0}': expected milliseconds")]
    InvalidDelay(String),

    #[error("No animation classes were given for {0}")]
    MissingAnimationClasses(String),

    #[error("Callback is not a function: {0}")]
    CallbackNotCallable(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Scene error: {0}")]
    Scene(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
