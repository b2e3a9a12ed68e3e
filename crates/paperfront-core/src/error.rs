use thiserror::Error;

/// All errors that can occur in paperfront-core.
#[derive(Debug, Error)]
pub enum PaperfrontError {
    #[error("Paper not found: {0}")]
    PaperNotFound(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid paper record: {0}")]
    InvalidRecord(String),

    #[error("Invalid note path: {0}")]
    InvalidPath(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Process exit codes reported by the CLI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
    NetworkError = 6,
}

impl PaperfrontError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::PaperNotFound(_) => ExitCode::NotFound,
            Self::Catalog(_) => ExitCode::NetworkError,
            Self::InvalidPath(_) | Self::ConfigError(_) | Self::TomlParse(_) => ExitCode::InvalidArgs,
            Self::Io(_) => ExitCode::FileSystemError,
            Self::InvalidRecord(_) | Self::Yaml(_) | Self::TomlSerialize(_) => {
                ExitCode::GeneralError
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PaperfrontError>;
