//! HTML loading and extraction tests.

use pbcsub::render::to_csv_string;
use pbcsub::{extract_from_file, parse_file, Error, ExtractOptions, HtmlParser, SubtitleExtractor};

const PLIEGO: &str = r#"<!DOCTYPE html>
<html>
<head><title>Pliego de Bases y Condiciones</title></head>
<body>
  <h1>Llamado 123/2024</h1>
  <h3>1. Objeto</h3>
  <p>Descripción del objeto del llamado.</p>
  <h3>Etapas y Plazos</h3>
  <p>Las etapas se detallan a continuación.</p>
  <p><strong>2. Garantías</strong></p>
  <p>Texto de <b>las</b> garantías exigidas.</p>
  <h4>a) de mantenimiento de oferta</h4>
  <p style="font-weight: bold">3. Criterios de evaluación</p>
</body>
</html>"#;

#[test]
fn test_html_subtitles_in_order() {
    let doc = HtmlParser::from_html(PLIEGO).parse().unwrap();
    assert_eq!(
        doc.metadata.title.as_deref(),
        Some("Pliego de Bases y Condiciones")
    );

    let subtitles = SubtitleExtractor::default().extract(&doc);
    let texts: Vec<_> = subtitles.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "Llamado 123/2024",
            "1. Objeto",
            "2. Garantías",
            "3. Criterios de evaluación",
        ]
    );
    assert_eq!(subtitles[1].level, Some(3));
    assert_eq!(subtitles[2].level, None);
}

#[test]
fn test_html_headings_inside_list_items() {
    let html = r#"<html><body><ol>
  <li><h3>Objeto del llamado</h3><p>El presente llamado tiene por objeto la compra.</p></li>
  <li><h3>Plazo</h3><p>El plazo de entrega es de treinta días.</p></li>
</ol></body></html>"#;
    let doc = HtmlParser::from_html(html).parse().unwrap();

    let subtitles = SubtitleExtractor::default().extract(&doc);
    assert_eq!(
        to_csv_string(&subtitles).unwrap(),
        "subtitulo\nObjeto del llamado\nPlazo\n"
    );
}

#[test]
fn test_html_lowercase_heading_kept_when_allowed() {
    let doc = HtmlParser::from_html(PLIEGO).parse().unwrap();
    let options = ExtractOptions::new().with_require_capitalized(false);
    let subtitles = SubtitleExtractor::new(options).extract(&doc);
    assert!(subtitles
        .iter()
        .any(|s| s.text == "a) de mantenimiento de oferta"));
}

#[test]
fn test_html_from_file_with_uppercase_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("PLIEGO.HTML");
    std::fs::write(&path, PLIEGO).unwrap();

    let subtitles = extract_from_file(&path).unwrap();
    assert_eq!(subtitles.len(), 4);
    assert!(to_csv_string(&subtitles)
        .unwrap()
        .starts_with("subtitulo\nLlamado 123/2024\n"));
}

#[test]
fn test_html_invalid_utf8_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.html");
    // "Garantía" in Latin-1
    std::fs::write(&path, b"<h2>Garant\xeda</h2><p>Texto</p>").unwrap();

    let doc = parse_file(&path).unwrap();
    assert_eq!(doc.block_count(), 2);
    assert!(doc.blocks[0].text.starts_with("Garant"));
}

#[test]
fn test_html_without_headings() {
    let doc = HtmlParser::from_html("<p>Solo texto.</p><p>Más texto.</p>")
        .parse()
        .unwrap();
    assert!(SubtitleExtractor::default().extract(&doc).is_empty());
}

#[test]
fn test_missing_html_file() {
    let err = parse_file("/nonexistent/dir/pliego.html").unwrap_err();
    assert!(matches!(err, Error::FileRead { .. }));
}
