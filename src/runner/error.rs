use thiserror::Error;

/// Failures that occur outside the language core itself: these are host
/// concerns (reading a script file), not language-level `Value::Error`s, so
/// they get a proper `std::error::Error` via `thiserror` instead of being
/// smuggled through as a string.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to read script {path}: {source}")]
    ReadScript {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RunnerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_script_error_includes_path_and_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = RunnerError::ReadScript {
            path: "missing.lang".to_string(),
            source: io_err,
        };
        assert_eq!(
            err.to_string(),
            "failed to read script missing.lang: no such file"
        );
    }
}
