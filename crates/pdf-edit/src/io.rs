//! Document byte-level I/O.

use std::path::Path;

use lopdf::Document;

use crate::types::Result;

/// Load a document from raw PDF bytes.
pub fn load_document(bytes: &[u8]) -> Result<Document> {
    Ok(Document::load_mem(bytes)?)
}

/// Serialize a document back to bytes.
pub fn save_document(mut doc: Document) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Read a PDF file into memory without blocking the runtime.
pub async fn load_pdf_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    Ok(bytes)
}

/// Write transformed PDF bytes to disk.
pub async fn save_pdf_bytes(path: impl AsRef<Path>, bytes: impl AsRef<[u8]>) -> Result<()> {
    tokio::fs::write(path.as_ref(), bytes).await?;
    Ok(())
}
