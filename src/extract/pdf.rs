use super::FileKind;
use crate::ExtractError;

/// Extracts the text layer of every page of a PDF
pub fn pdf_to_text(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map(|text| text.trim().to_string())
        .map_err(|e| ExtractError::Parse {
            kind: FileKind::Pdf,
            message: e.to_string(),
        })
}
