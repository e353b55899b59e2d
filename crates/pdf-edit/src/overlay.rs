//! Content overlays: watermark text and page numbers.
//!
//! Both operations append a small content stream to each page and register
//! a Helvetica Type1 font in the page resources. Drawing is wrapped in
//! `q`/`Q` so the stamp cannot inherit or leak graphics state.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::io::{load_document, save_document};
use crate::types::{EditError, Result};

const WATERMARK_FONT: &str = "FwM";
const WATERMARK_SIZE: f32 = 48.0;
const PAGE_NUMBER_FONT: &str = "FpN";
const PAGE_NUMBER_SIZE: f32 = 10.0;

/// Stamp `text` diagonally across the center of every page.
pub fn add_watermark(bytes: &[u8], text: &str) -> Result<Vec<u8>> {
    if text.trim().is_empty() {
        return Err(EditError::InvalidInput(
            "watermark text must not be empty".to_string(),
        ));
    }

    let mut doc = load_document(bytes)?;
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    for page_id in pages {
        let media_box = page_media_box(&doc, page_id);
        let content = watermark_content(text, &media_box);
        append_page_content(&mut doc, page_id, &content)?;
        register_page_font(&mut doc, page_id, WATERMARK_FONT, font_id)?;
    }

    save_document(doc)
}

/// Stamp `Page i of N` at the bottom center of every page.
pub fn add_page_numbers(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut doc = load_document(bytes)?;
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    let total = pages.len();

    for (index, page_id) in pages.into_iter().enumerate() {
        let media_box = page_media_box(&doc, page_id);
        let label = format!("Page {} of {}", index + 1, total);
        let content = page_number_content(&label, &media_box);
        append_page_content(&mut doc, page_id, &content)?;
        register_page_font(&mut doc, page_id, PAGE_NUMBER_FONT, font_id)?;
    }

    save_document(doc)
}

fn watermark_content(text: &str, media_box: &[f32; 4]) -> String {
    let center_x = (media_box[0] + media_box[2]) / 2.0;
    let center_y = (media_box[1] + media_box[3]) / 2.0;

    // Rough Helvetica advance of 0.5em per glyph; good enough to center.
    let half_width = text.chars().count() as f32 * WATERMARK_SIZE * 0.25;
    let (cos, sin) = (0.70711_f32, 0.70711_f32);
    let x = center_x - half_width * cos;
    let y = center_y - half_width * sin;

    format!(
        "q\nBT\n/{WATERMARK_FONT} {WATERMARK_SIZE} Tf\n0.8 g\n\
         {cos:.5} {sin:.5} {neg_sin:.5} {cos:.5} {x:.2} {y:.2} Tm\n({escaped}) Tj\nET\nQ",
        neg_sin = -sin,
        escaped = escape_pdf_text(text),
    )
}

fn page_number_content(label: &str, media_box: &[f32; 4]) -> String {
    let center_x = (media_box[0] + media_box[2]) / 2.0;
    let half_width = label.chars().count() as f32 * PAGE_NUMBER_SIZE * 0.25;
    let x = center_x - half_width;
    let y = media_box[1] + 24.0;

    format!(
        "q\nBT\n/{PAGE_NUMBER_FONT} {PAGE_NUMBER_SIZE} Tf\n0 g\n\
         1 0 0 1 {x:.2} {y:.2} Tm\n({escaped}) Tj\nET\nQ",
        escaped = escape_pdf_text(label),
    )
}

/// Escape characters with meaning inside PDF string literals.
fn escape_pdf_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Append a content stream after the page's existing content.
fn append_page_content(doc: &mut Document, page_id: ObjectId, content: &str) -> Result<()> {
    let stream = Stream::new(Dictionary::new(), content.as_bytes().to_vec());
    let content_id = doc.add_object(Object::Stream(stream));

    if let Object::Dictionary(page_dict) = doc.get_object_mut(page_id)? {
        let existing = page_dict.get(b"Contents").ok().cloned();
        match existing {
            Some(Object::Reference(first)) => {
                page_dict.set(
                    "Contents",
                    Object::Array(vec![
                        Object::Reference(first),
                        Object::Reference(content_id),
                    ]),
                );
            }
            Some(Object::Array(mut items)) => {
                items.push(Object::Reference(content_id));
                page_dict.set("Contents", Object::Array(items));
            }
            _ => {
                page_dict.set("Contents", Object::Reference(content_id));
            }
        }
    }
    Ok(())
}

/// Make `font_id` available to the page under `name`, whatever shape the
/// page's Resources entry takes (missing, inline, or an indirect object).
fn register_page_font(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    font_id: ObjectId,
) -> Result<()> {
    enum Resources {
        Missing,
        Inline,
        Indirect(ObjectId),
    }

    let location = {
        let page_dict = doc.get_object(page_id)?.as_dict()?;
        match page_dict.get(b"Resources") {
            Ok(Object::Reference(id)) => Resources::Indirect(*id),
            Ok(Object::Dictionary(_)) => Resources::Inline,
            _ => Resources::Missing,
        }
    };

    match location {
        Resources::Missing => {
            let mut fonts = Dictionary::new();
            fonts.set(name, Object::Reference(font_id));
            let mut resources = Dictionary::new();
            resources.set("Font", Object::Dictionary(fonts));
            if let Object::Dictionary(page_dict) = doc.get_object_mut(page_id)? {
                page_dict.set("Resources", Object::Dictionary(resources));
            }
        }
        Resources::Inline => {
            // The Font entry inside inline resources may itself be indirect.
            let mut font_dict_ref = None;
            if let Object::Dictionary(page_dict) = doc.get_object_mut(page_id)? {
                if let Ok(Object::Dictionary(resources)) = page_dict.get_mut(b"Resources") {
                    match resources.get_mut(b"Font") {
                        Ok(Object::Dictionary(fonts)) => {
                            fonts.set(name, Object::Reference(font_id));
                        }
                        Ok(Object::Reference(id)) => font_dict_ref = Some(*id),
                        _ => {
                            let mut fonts = Dictionary::new();
                            fonts.set(name, Object::Reference(font_id));
                            resources.set("Font", Object::Dictionary(fonts));
                        }
                    }
                }
            }
            if let Some(id) = font_dict_ref {
                insert_font_entry(doc, id, name, font_id)?;
            }
        }
        Resources::Indirect(resources_id) => {
            let mut font_dict_ref = None;
            if let Object::Dictionary(resources) = doc.get_object_mut(resources_id)? {
                match resources.get_mut(b"Font") {
                    Ok(Object::Dictionary(fonts)) => {
                        fonts.set(name, Object::Reference(font_id));
                    }
                    Ok(Object::Reference(id)) => font_dict_ref = Some(*id),
                    _ => {
                        let mut fonts = Dictionary::new();
                        fonts.set(name, Object::Reference(font_id));
                        resources.set("Font", Object::Dictionary(fonts));
                    }
                }
            }
            if let Some(id) = font_dict_ref {
                insert_font_entry(doc, id, name, font_id)?;
            }
        }
    }
    Ok(())
}

fn insert_font_entry(
    doc: &mut Document,
    font_dict_id: ObjectId,
    name: &str,
    font_id: ObjectId,
) -> Result<()> {
    if let Object::Dictionary(fonts) = doc.get_object_mut(font_dict_id)? {
        fonts.set(name, Object::Reference(font_id));
    }
    Ok(())
}

/// Resolve a page's media box, walking up the tree for inherited values.
/// Falls back to US Letter when nothing is found.
fn page_media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let mut current = page_id;
    for _ in 0..10 {
        let Ok(dict) = doc.get_object(current).and_then(|obj| obj.as_dict()) else {
            break;
        };
        if let Some(values) = media_box_values(doc, dict) {
            return values;
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => break,
        }
    }
    [0.0, 0.0, 612.0, 792.0]
}

fn media_box_values(doc: &Document, dict: &Dictionary) -> Option<[f32; 4]> {
    let entry = dict.get(b"MediaBox").ok()?;
    let items = match entry {
        Object::Array(items) => items,
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    if items.len() != 4 {
        return None;
    }
    let mut values = [0.0_f32; 4];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = match item {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            _ => return None,
        };
    }
    Some(values)
}
