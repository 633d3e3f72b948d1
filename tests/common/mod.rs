//! Shared fixtures: small PDFs built in-process with lopdf.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Regular font resource.
pub const REGULAR: &str = "F1";
/// Bold font resource.
pub const BOLD: &str = "F2";

/// One shown line: font resource, size, baseline and text.
pub type Line<'a> = (&'a str, i64, i64, &'a str);

/// Build a PDF with one content stream per page and optional bookmarks
/// given as `(title, page index)`.
pub fn build_pdf(pages: &[Vec<Line<'_>>], bookmarks: &[(&str, usize)]) -> Document {
    let streams = pages
        .iter()
        .map(|lines| {
            let mut operations = Vec::new();
            for (font, size, y, text) in lines {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![(*font).into(), (*size).into()]));
                operations.push(Operation::new("Td", vec![72.into(), (*y).into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
                operations.push(Operation::new("ET", vec![]));
            }
            operations
        })
        .collect();
    build_pdf_from_operations(streams, bookmarks)
}

/// Build a PDF from raw content stream operations, one list per page.
pub fn build_pdf_from_operations(pages: Vec<Vec<Operation>>, bookmarks: &[(&str, usize)]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    });

    let mut page_ids: Vec<ObjectId> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        page_ids.push(page_id);
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => page_ids.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if !bookmarks.is_empty() {
        catalog.set("Outlines", add_outline(&mut doc, &page_ids, bookmarks));
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
    doc
}

fn add_outline(doc: &mut Document, page_ids: &[ObjectId], bookmarks: &[(&str, usize)]) -> ObjectId {
    let outlines_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = bookmarks.iter().map(|_| doc.new_object_id()).collect();

    for (i, (title, page)) in bookmarks.iter().enumerate() {
        let mut item = dictionary! {
            "Title" => Object::string_literal(*title),
            "Parent" => outlines_id,
            "Dest" => vec![Object::Reference(page_ids[*page]), "Fit".into()],
        };
        if i > 0 {
            item.set("Prev", item_ids[i - 1]);
        }
        if i + 1 < item_ids.len() {
            item.set("Next", item_ids[i + 1]);
        }
        doc.objects.insert(item_ids[i], Object::Dictionary(item));
    }

    let outlines = dictionary! {
        "Type" => "Outlines",
        "First" => item_ids[0],
        "Last" => item_ids[item_ids.len() - 1],
        "Count" => item_ids.len() as i64,
    };
    doc.objects.insert(outlines_id, Object::Dictionary(outlines));
    outlines_id
}

/// Build and save a PDF.
pub fn write_pdf(path: &Path, pages: &[Vec<Line<'_>>], bookmarks: &[(&str, usize)]) {
    let mut doc = build_pdf(pages, bookmarks);
    doc.save(path).unwrap();
}

/// Build and save a PDF from raw content stream operations.
pub fn write_pdf_operations(path: &Path, pages: Vec<Vec<Operation>>) {
    let mut doc = build_pdf_from_operations(pages, &[]);
    doc.save(path).unwrap();
}

/// The three-line example: two bold numbered headings around a body line.
pub fn objeto_plazo() -> Vec<Vec<Line<'static>>> {
    vec![vec![
        (BOLD, 12, 760, "1. Objeto"),
        (REGULAR, 12, 740, "Descripcion del objeto de la contratacion."),
        (BOLD, 12, 720, "2. Plazo"),
    ]]
}
