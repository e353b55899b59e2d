//! Info dictionary access, form flattening, and document inspection.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::io::{load_document, save_document};
use crate::types::{DocumentInfo, MetadataUpdate, Result};

/// Overwrite the Info dictionary fields present in `update`; absent
/// fields keep their existing values.
pub fn set_metadata(bytes: &[u8], update: &MetadataUpdate) -> Result<Vec<u8>> {
    let mut doc = load_document(bytes)?;
    if update.is_empty() {
        // Nothing to write; in particular, no empty Info dictionary.
        return save_document(doc);
    }
    let info_id = ensure_info_dictionary(&mut doc);

    if let Object::Dictionary(info) = doc.get_object_mut(info_id)? {
        set_text_field(info, "Title", update.title.as_deref());
        set_text_field(info, "Author", update.author.as_deref());
        set_text_field(info, "Subject", update.subject.as_deref());
    }

    save_document(doc)
}

/// Report page count, Info metadata, and encryption status.
pub fn document_info(bytes: &[u8]) -> Result<DocumentInfo> {
    let doc = load_document(bytes)?;
    let info = info_dictionary(&doc);

    Ok(DocumentInfo {
        page_count: doc.get_pages().len(),
        title: info.as_ref().and_then(|dict| text_field(dict, b"Title")),
        author: info.as_ref().and_then(|dict| text_field(dict, b"Author")),
        encrypted: doc.is_encrypted(),
    })
}

/// Flatten interactive content: drop the AcroForm from the catalog and
/// the annotation arrays from every page.
pub fn flatten_document(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut doc = load_document(bytes)?;

    if let Ok(catalog_id) = doc.trailer.get(b"Root").and_then(|obj| obj.as_reference()) {
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
            catalog.remove(b"AcroForm");
        }
    }

    let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    for page_id in pages {
        if let Ok(Object::Dictionary(page_dict)) = doc.get_object_mut(page_id) {
            page_dict.remove(b"Annots");
        }
    }

    save_document(doc)
}

/// Find the Info dictionary id, creating an empty one when missing.
fn ensure_info_dictionary(doc: &mut Document) -> ObjectId {
    if let Ok(Object::Reference(id)) = doc.trailer.get(b"Info") {
        return *id;
    }
    let id = doc.add_object(Dictionary::new());
    doc.trailer.set("Info", Object::Reference(id));
    id
}

fn info_dictionary(doc: &Document) -> Option<Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Dictionary(dict) => Some(dict.clone()),
            _ => None,
        },
        Object::Dictionary(dict) => Some(dict.clone()),
        _ => None,
    }
}

fn set_text_field(info: &mut Dictionary, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        info.set(
            key,
            Object::String(value.as_bytes().to_vec(), StringFormat::Literal),
        );
    }
}

fn text_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}
