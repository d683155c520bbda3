use std::fmt::Formatter;

/// Failure to produce a label sheet. Font problems never end up here; they are
/// recovered with fallback values while extracting metrics and widths.
#[derive(Debug)]
pub enum SheetError {
    IoError(std::io::Error),
    PdfError(lopdf::Error),
    AssemblyError(String),
}

impl std::fmt::Display for SheetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            SheetError::IoError(e) => write!(f, "IO error: {}", e),
            SheetError::PdfError(e) => write!(f, "PDF error: {}", e),
            SheetError::AssemblyError(e) => write!(f, "Label sheet assembly failed: {}", e),
        }
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetError::IoError(e) => Some(e),
            SheetError::PdfError(e) => Some(e),
            SheetError::AssemblyError(_) => None,
        }
    }
}

impl From<std::io::Error> for SheetError {
    fn from(e: std::io::Error) -> Self {
        SheetError::IoError(e)
    }
}

impl From<lopdf::Error> for SheetError {
    fn from(e: lopdf::Error) -> Self {
        SheetError::PdfError(e)
    }
}

/// Why a single font lookup could not be answered.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeFailure {
    Parse(ttf_parser::FaceParsingError),
    MissingTable(&'static str),
    MissingName,
}

impl std::fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            DecodeFailure::Parse(e) => write!(f, "font parse error: {}", e),
            DecodeFailure::MissingTable(tag) => write!(f, "font has no usable '{}' table", tag),
            DecodeFailure::MissingName => write!(f, "font has no PostScript name"),
        }
    }
}

impl std::error::Error for DecodeFailure {}

impl From<ttf_parser::FaceParsingError> for DecodeFailure {
    fn from(e: ttf_parser::FaceParsingError) -> Self {
        DecodeFailure::Parse(e)
    }
}
