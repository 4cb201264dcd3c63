use std::fmt;

#[derive(Debug)]
pub enum GuidepostError {
    InvalidConfiguration(String),
    Fetch { url: String, message: String },
    Audit(String),
    SchemaMismatch { expected: Vec<String>, found: Vec<String> },
    ModelArtifact(String),
    AnalysisFailed { url: String },
    Io(std::io::Error),
}

impl fmt::Display for GuidepostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuidepostError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            GuidepostError::Fetch { url, message } => {
                write!(f, "failed to fetch {}: {}", url, message)
            }
            GuidepostError::Audit(message) => write!(f, "dynamic audit error: {}", message),
            GuidepostError::SchemaMismatch { expected, found } => write!(
                f,
                "model feature schema mismatch: expected [{}], found [{}]",
                expected.join(", "),
                found.join(", ")
            ),
            GuidepostError::ModelArtifact(message) => {
                write!(f, "model artifact error: {}", message)
            }
            GuidepostError::AnalysisFailed { url } => {
                write!(f, "every analysis strategy failed for {}", url)
            }
            GuidepostError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for GuidepostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GuidepostError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GuidepostError {
    fn from(value: std::io::Error) -> Self {
        GuidepostError::Io(value)
    }
}
