use crate::error::{DossierError, Result};

const MIME_PDF: &str = "application/pdf";
const MIME_DOC: &str = "application/msword";
const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const MIME_TXT: &str = "text/plain";

/// The accepted document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Doc,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence {
            MIME_PDF => Some(Self::Pdf),
            MIME_DOC => Some(Self::Doc),
            MIME_DOCX => Some(Self::Docx),
            MIME_TXT => Some(Self::Txt),
            _ => None,
        }
    }

    pub fn from_filename(name: &str) -> Option<Self> {
        mime_guess::from_path(name)
            .first_raw()
            .and_then(Self::from_mime)
    }

    /// Magic-byte detection. Plain text has no signature, so `Txt` can only
    /// come from the content type or the filename.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        infer::get(bytes).and_then(|kind| Self::from_mime(kind.mime_type()))
    }

    /// Resolves the format of an upload. The declared content type wins when
    /// it names a supported format; otherwise magic bytes, then the filename
    /// extension.
    pub fn detect(bytes: &[u8], filename: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        if let Some(format) = content_type.and_then(Self::from_mime) {
            return Some(format);
        }
        if let Some(format) = Self::sniff(bytes) {
            return Some(format);
        }
        filename.and_then(Self::from_filename)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => MIME_PDF,
            Self::Doc => MIME_DOC,
            Self::Docx => MIME_DOCX,
            Self::Txt => MIME_TXT,
        }
    }
}

/// Plain-text extraction for the accepted formats. All extraction is
/// CPU-bound; callers run it on the blocking thread pool.
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn extract(format: DocumentFormat, bytes: &[u8]) -> Result<String> {
        let text = match format {
            DocumentFormat::Pdf => Self::extract_pdf(bytes)?,
            // Word documents in the wild frequently carry the legacy
            // `application/msword` type while actually being OOXML; a true
            // binary .doc fails the decode below.
            DocumentFormat::Doc | DocumentFormat::Docx => Self::extract_docx(bytes)?,
            DocumentFormat::Txt => Self::extract_txt(bytes)?,
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(DossierError::Extraction(
                "Document contains no extractable text".to_string(),
            ));
        }

        Ok(text)
    }

    fn extract_pdf(bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DossierError::Extraction(format!("PDF parse error: {e}")))
    }

    fn extract_txt(bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| DossierError::Extraction(format!("Text file is not valid UTF-8: {e}")))
    }

    fn extract_docx(bytes: &[u8]) -> Result<String> {
        let docx = docx_rs::read_docx(bytes)
            .map_err(|e| DossierError::Extraction(format!("DOCX parse error: {e}")))?;

        let mut text = String::new();

        for child in &docx.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(paragraph) => {
                    let para_text = Self::paragraph_text(paragraph);
                    if !para_text.trim().is_empty() {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(para_text.trim());
                    }
                }
                docx_rs::DocumentChild::Table(table) => {
                    let table_text = Self::table_text(table);
                    if !table_text.is_empty() {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(&table_text);
                    }
                }
                _ => {}
            }
        }

        Ok(text)
    }

    fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
        let mut content = String::new();
        for para_child in &paragraph.children {
            if let docx_rs::ParagraphChild::Run(run) = para_child {
                for run_child in &run.children {
                    if let docx_rs::RunChild::Text(text) = run_child {
                        content.push_str(&text.text);
                    }
                }
            }
        }
        content
    }

    /// Renders a table one row per line, cells separated by ` | `.
    fn table_text(table: &docx_rs::Table) -> String {
        let mut lines = Vec::new();

        for table_child in &table.rows {
            let docx_rs::TableChild::TableRow(row) = table_child;
            let mut cells = Vec::new();
            for row_child in &row.cells {
                let docx_rs::TableRowChild::TableCell(cell) = row_child;
                let mut cell_text = String::new();
                for cell_child in &cell.children {
                    if let docx_rs::TableCellContent::Paragraph(para) = cell_child {
                        let para_text = Self::paragraph_text(para);
                        if !cell_text.is_empty() {
                            cell_text.push(' ');
                        }
                        cell_text.push_str(&para_text);
                    }
                }
                cells.push(cell_text.trim().to_string());
            }
            if !cells.is_empty() {
                lines.push(cells.join(" | "));
            }
        }

        lines.join("\n")
    }
}
