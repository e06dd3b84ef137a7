use std::fmt::Formatter;

#[derive(Debug)]
pub enum RemapError {
    IoError(std::io::Error),
    PdfError(lopdf::Error),
    /// A font program stream is declared but cannot be decoded.
    FontProgram(String),
    /// An operand kind the content rewriter cannot carry over.
    UnsupportedOperand {
        operator: String,
        kind: &'static str,
    },
    MalformedOperator(String),
}

impl std::fmt::Display for RemapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            RemapError::IoError(e) => write!(f, "IO error: {}", e),
            RemapError::PdfError(e) => write!(f, "PDF error: {}", e),
            RemapError::FontProgram(e) => write!(f, "Font program error: {}", e),
            RemapError::UnsupportedOperand { operator, kind } => {
                write!(f, "Unsupported {} operand for {}", kind, operator)
            }
            RemapError::MalformedOperator(op) => write!(f, "Malformed operator: {}", op),
        }
    }
}

impl std::error::Error for RemapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RemapError::IoError(e) => Some(e),
            RemapError::PdfError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RemapError {
    fn from(e: std::io::Error) -> Self {
        RemapError::IoError(e)
    }
}

impl From<lopdf::Error> for RemapError {
    fn from(e: lopdf::Error) -> Self {
        RemapError::PdfError(e)
    }
}
