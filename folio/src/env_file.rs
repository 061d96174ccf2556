use std::path::PathBuf;

/// Result of looking for a `.env` file next to the process.
///
/// Variables from the file land in the process environment without replacing
/// values that are already set, so clap's `env` fallbacks pick them up.
#[derive(Debug)]
pub(crate) enum EnvFile {
    Loaded(PathBuf),
    Missing,
    Invalid(dotenvy::Error),
}

impl EnvFile {
    /// Loads `.env` from the current directory or one of its parents.
    pub(crate) fn load() -> Self {
        Self::from_result(dotenvy::dotenv())
    }

    /// Loads a specific file, replacing values that are already set.
    #[cfg(test)]
    fn load_from(path: &std::path::Path) -> Self {
        Self::from_result(dotenvy::from_path_override(path).map(|()| path.to_path_buf()))
    }

    fn from_result(result: dotenvy::Result<PathBuf>) -> Self {
        match result {
            Ok(path) => Self::Loaded(path),
            Err(e) if e.not_found() => Self::Missing,
            Err(e) => Self::Invalid(e),
        }
    }

    /// Reports the outcome once logging is installed.
    pub(crate) fn log(&self) {
        match self {
            Self::Loaded(path) => log::debug!("Loaded environment from {}", path.display()),
            Self::Missing => log::debug!("No .env file found, using the process environment only"),
            Self::Invalid(e) => log::warn!("Ignoring .env file: {e}"),
        }
    }
}
