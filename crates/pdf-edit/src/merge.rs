//! Merging multiple documents into one.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};

use crate::io::{load_document, save_document};
use crate::pages::inherited_attributes;
use crate::types::{EditError, Result};

/// Merge two or more PDFs, preserving input order.
///
/// The first document becomes the destination; every other document's
/// objects are imported with their ids offset past the destination's
/// current maximum, and the destination page tree is rebuilt with a flat
/// Kids array covering all pages. Rebuilding reparents every page, so
/// attributes a page inherited from its old Pages chain are materialized
/// onto the page dictionary first.
pub fn merge_documents(inputs: &[Vec<u8>]) -> Result<Vec<u8>> {
    if inputs.len() < 2 {
        return Err(EditError::InsufficientInputs {
            count: inputs.len(),
        });
    }

    let mut sources = Vec::with_capacity(inputs.len());
    for bytes in inputs {
        sources.push(load_document(bytes)?);
    }
    log::debug!("merging {} documents", sources.len());

    let mut dest = sources.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut page_refs: Vec<ObjectId> = dest.get_pages().values().copied().collect();

    let mut inherited: Vec<(ObjectId, Vec<(Vec<u8>, Object)>)> = Vec::new();
    for &page_id in &page_refs {
        let attrs = inherited_attributes(&dest, page_id)?;
        if !attrs.is_empty() {
            inherited.push((page_id, attrs));
        }
    }

    for source in sources {
        let source_pages: Vec<ObjectId> = source.get_pages().values().copied().collect();
        let id_offset = dest_max_id;

        for &page_id in &source_pages {
            let attrs = inherited_attributes(&source, page_id)?;
            if !attrs.is_empty() {
                let attrs: Vec<(Vec<u8>, Object)> = attrs
                    .into_iter()
                    .map(|(key, value)| (key, offset_references(value, id_offset)))
                    .collect();
                inherited.push(((page_id.0 + id_offset, page_id.1), attrs));
            }
        }

        let mut imported = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            imported.insert(new_id, offset_references(object, id_offset));
        }
        dest.objects.extend(imported);

        for page_id in source_pages {
            page_refs.push((page_id.0 + id_offset, page_id.1));
        }
        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    dest.max_id = dest_max_id;

    // Stamp inherited values before reparenting severs the old chains.
    for (page_id, attrs) in inherited {
        if let Ok(Object::Dictionary(page_dict)) = dest.get_object_mut(page_id) {
            for (key, value) in attrs {
                page_dict.set(key, value);
            }
        }
    }

    rebuild_page_tree(&mut dest, page_refs)?;
    dest.compress();
    save_document(dest)
}

/// Shift every object reference by `offset`, recursively.
fn offset_references(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| offset_references(item, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = offset_references(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = offset_references(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's Pages node at the combined page list.
fn rebuild_page_tree(doc: &mut Document, page_refs: Vec<ObjectId>) -> Result<()> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let pages_id = doc
        .get_object(catalog_id)?
        .as_dict()?
        .get(b"Pages")?
        .as_reference()?;

    let page_count = page_refs.len();
    let kids: Vec<Object> = page_refs.iter().map(|&id| Object::Reference(id)).collect();

    if let Object::Dictionary(pages_dict) = doc.get_object_mut(pages_id)? {
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(page_count as i64));
    } else {
        return Err(EditError::Malformed(
            "Pages node is not a dictionary".to_string(),
        ));
    }

    // Reparent every page onto the surviving Pages node.
    for page_id in page_refs {
        if let Ok(Object::Dictionary(page_dict)) = doc.get_object_mut(page_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }
    Ok(())
}
