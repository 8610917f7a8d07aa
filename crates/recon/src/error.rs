use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageError {
    /// TOML parse / deserialization error in a catalogue document.
    CatalogueParse(String),
    /// A catalogue key is not a canonical control identifier.
    InvalidControlId(String),
    /// A catalogue record violates a construction invariant (bad coverage value, empty field).
    InvalidRecord { control: String, reason: String },
    /// Missing required column in CSV input.
    MissingColumn { column: String },
    /// CSV read/write error.
    Csv(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for CoverageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CatalogueParse(msg) => write!(f, "catalogue parse error: {msg}"),
            Self::InvalidControlId(id) => {
                write!(f, "invalid control identifier '{id}' (expected e.g. AC-6 or AC-6(10))")
            }
            Self::InvalidRecord { control, reason } => {
                write!(f, "control '{control}': invalid record: {reason}")
            }
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for CoverageError {}

impl From<csv::Error> for CoverageError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}
