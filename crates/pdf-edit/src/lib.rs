pub mod io;
pub mod ranges;
mod merge;
mod metadata;
mod overlay;
mod pages;
mod security;
mod types;

pub use io::{load_document, load_pdf_bytes, save_document, save_pdf_bytes};
pub use merge::merge_documents;
pub use metadata::{document_info, flatten_document, set_metadata};
pub use overlay::{add_page_numbers, add_watermark};
pub use pages::{extract_pages, remove_pages, reorder_pages, rotate_pages};
pub use ranges::{extraction_order, removal_order, reorder_sequence};
pub use security::{protect_document, unlock_document};
pub use types::*;
