//! Page-level operations: rotation, removal, extraction, reordering.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::io::{load_document, save_document};
use crate::ranges;
use crate::types::{EditError, Result};

/// Rotate every page by `degrees` (a multiple of 90), on top of any
/// rotation the page already carries.
pub fn rotate_pages(bytes: &[u8], degrees: i32) -> Result<Vec<u8>> {
    if degrees % 90 != 0 {
        return Err(EditError::InvalidInput(format!(
            "rotation must be a multiple of 90 degrees, got {degrees}"
        )));
    }

    let mut doc = load_document(bytes)?;
    let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();

    for page_id in pages {
        let current = doc
            .get_object(page_id)?
            .as_dict()?
            .get(b"Rotate")
            .and_then(|obj| obj.as_i64())
            .unwrap_or(0);
        let total = (current + degrees as i64).rem_euclid(360);

        if let Object::Dictionary(page_dict) = doc.get_object_mut(page_id)? {
            page_dict.set("Rotate", Object::Integer(total));
        }
    }

    save_document(doc)
}

/// Drop the pages named by `spec`, keeping the rest in original order.
pub fn remove_pages(bytes: &[u8], spec: &str) -> Result<Vec<u8>> {
    let doc = load_document(bytes)?;
    let keep = ranges::removal_order(spec, doc.get_pages().len())?;
    save_document(select_pages(&doc, &keep)?)
}

/// Keep only the pages named by `spec`, in original order.
pub fn extract_pages(bytes: &[u8], spec: &str) -> Result<Vec<u8>> {
    let doc = load_document(bytes)?;
    let wanted = ranges::extraction_order(spec, doc.get_pages().len())?;
    save_document(select_pages(&doc, &wanted)?)
}

/// Rearrange pages into the exact sequence given by `spec`.
pub fn reorder_pages(bytes: &[u8], spec: &str) -> Result<Vec<u8>> {
    let doc = load_document(bytes)?;
    let order = ranges::reorder_sequence(spec, doc.get_pages().len())?;
    save_document(select_pages(&doc, &order)?)
}

/// Build a new document containing the source pages at `indices`, in that
/// order. Objects reachable from the selected pages are cloned with fresh
/// ids; the old Parent chain is deliberately not followed so the source
/// page tree stays behind, and any attributes a page inherited from that
/// chain are materialized onto the page itself first. An index appearing
/// twice gets its own copy of the page object so both occurrences can
/// live in the Kids array.
fn select_pages(doc: &Document, indices: &[usize]) -> Result<Document> {
    let source_pages: Vec<ObjectId> = doc.page_iter().collect();

    let mut reachable: HashSet<ObjectId> = HashSet::new();
    let mut inherited: HashMap<ObjectId, Vec<(Vec<u8>, Object)>> = HashMap::new();
    for &idx in indices {
        let page_id = *source_pages.get(idx).ok_or_else(|| {
            EditError::InvalidRange(format!("page index {idx} out of bounds"))
        })?;
        collect_reachable(doc, page_id, &mut reachable)?;
        let attrs = inherited_attributes(doc, page_id)?;
        for (_, value) in &attrs {
            collect_from(doc, value, &mut reachable)?;
        }
        inherited.insert(page_id, attrs);
    }

    let mut output = Document::with_version("1.7");
    let mut id_map: HashMap<ObjectId, ObjectId> = HashMap::new();
    let mut next_id = 1u32;
    for &old_id in &reachable {
        id_map.insert(old_id, (next_id, 0));
        next_id += 1;
    }
    output.max_id = next_id.saturating_sub(1);

    for &old_id in &reachable {
        let mut object = doc.get_object(old_id)?.clone();
        remap_references(&mut object, &id_map);
        output.objects.insert(id_map[&old_id], object);
    }

    let pages_root_id = output.new_object_id();
    let mut kids = Vec::with_capacity(indices.len());
    let mut seen: HashSet<ObjectId> = HashSet::new();

    for &idx in indices {
        let mapped = id_map[&source_pages[idx]];
        let page_ref = if seen.insert(mapped) {
            mapped
        } else {
            let copy = output.get_object(mapped)?.clone();
            output.add_object(copy)
        };
        if let Object::Dictionary(page_dict) = output.get_object_mut(page_ref)? {
            page_dict.set("Parent", Object::Reference(pages_root_id));
            // The new tree has a bare root, so values the page used to
            // inherit must live on the page dictionary itself.
            for (key, value) in &inherited[&source_pages[idx]] {
                let mut value = value.clone();
                remap_references(&mut value, &id_map);
                page_dict.set(key.clone(), value);
            }
        }
        kids.push(Object::Reference(page_ref));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(kids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    output
        .objects
        .insert(pages_root_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_root_id));
    let catalog_id = output.add_object(catalog);

    output.trailer.set("Root", Object::Reference(catalog_id));
    output
        .trailer
        .set("Size", Object::Integer(output.max_id as i64 + 1));

    Ok(output)
}

const INHERITABLE_KEYS: [&[u8]; 3] = [b"MediaBox", b"Resources", b"Rotate"];

/// Attributes the page gets from ancestor Pages nodes rather than
/// carrying itself. PDF lets MediaBox, Resources, and Rotate live
/// anywhere up the tree; rebuilt trees get a bare root, so these values
/// must be stamped onto the page dictionary to survive.
pub(crate) fn inherited_attributes(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<(Vec<u8>, Object)>> {
    let page = doc.get_object(page_id)?.as_dict()?;

    let mut found = Vec::new();
    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }
        let mut ancestor = page.get(b"Parent").ok().cloned();
        for _ in 0..10 {
            let Some(Object::Reference(ancestor_id)) = ancestor else {
                break;
            };
            let Ok(node) = doc.get_object(ancestor_id).and_then(|obj| obj.as_dict()) else {
                break;
            };
            if let Ok(value) = node.get(key) {
                found.push((key.to_vec(), value.clone()));
                break;
            }
            ancestor = node.get(b"Parent").ok().cloned();
        }
    }
    Ok(found)
}

/// Walk the object graph from `id`, recording everything reached. The
/// `Parent` key is skipped so a page does not pull in the whole tree.
fn collect_reachable(
    doc: &Document,
    id: ObjectId,
    visited: &mut HashSet<ObjectId>,
) -> Result<()> {
    if !visited.insert(id) {
        return Ok(());
    }
    collect_from(doc, doc.get_object(id)?, visited)
}

fn collect_from(doc: &Document, obj: &Object, visited: &mut HashSet<ObjectId>) -> Result<()> {
    match obj {
        Object::Reference(id) => collect_reachable(doc, *id, visited)?,
        Object::Array(items) => {
            for item in items {
                collect_from(doc, item, visited)?;
            }
        }
        Object::Dictionary(dict) => {
            for (key, value) in dict.iter() {
                if key.as_slice() != b"Parent" {
                    collect_from(doc, value, visited)?;
                }
            }
        }
        Object::Stream(stream) => {
            for (key, value) in stream.dict.iter() {
                if key.as_slice() != b"Parent" {
                    collect_from(doc, value, visited)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn remap_references(obj: &mut Object, id_map: &HashMap<ObjectId, ObjectId>) {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = id_map.get(id) {
                *id = new_id;
            }
        }
        Object::Array(items) => {
            for item in items {
                remap_references(item, id_map);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                remap_references(value, id_map);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                remap_references(value, id_map);
            }
        }
        _ => {}
    }
}
