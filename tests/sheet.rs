use std::collections::HashMap;

use label_sheet::{
    DEFAULT_CHAR_WIDTH, GlyphFallback, LabelSheet, MissingWidthPolicy, default_layout, generate,
    generate_with_layout, layout_by_name,
};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};

fn load_system_font() -> Option<Vec<u8>> {
    let paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    paths.iter().find_map(|path| std::fs::read(path).ok())
}

fn load(bytes: &[u8]) -> Document {
    assert!(bytes.starts_with(b"%PDF-"));
    Document::load_mem(bytes).expect("generated PDF should parse")
}

fn page_operations(doc: &Document) -> Vec<Operation> {
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page_id = *pages.values().next().unwrap();
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content).unwrap().operations
}

fn shown_text(ops: &[Operation]) -> Vec<String> {
    ops.iter()
        .filter(|op| op.operator == "Tj")
        .map(|op| match &op.operands[0] {
            Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
            other => panic!("unexpected Tj operand {:?}", other),
        })
        .collect()
}

/// Baselines of shown lines, in drawing order.
fn baselines(ops: &[Operation]) -> Vec<f32> {
    ops.iter()
        .filter(|op| op.operator == "Td")
        .map(|op| op.operands[1].as_float().unwrap())
        .collect()
}

fn count(ops: &[Operation], operator: &str) -> usize {
    ops.iter().filter(|op| op.operator == operator).count()
}

fn deref<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> &'a Object {
    let id = dict.get(key).unwrap().as_reference().unwrap();
    doc.get_object(id).unwrap()
}

fn font_dict(doc: &Document) -> &Dictionary {
    doc.objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .find(|dict| dict.get(b"Type").and_then(|t| t.as_name()).ok() == Some(b"Font".as_slice()))
        .expect("document has a font")
}

fn to_unicode_map(doc: &Document) -> HashMap<u32, Vec<u8>> {
    let stream = deref(doc, font_dict(doc), b"ToUnicode").as_stream().unwrap();
    adobe_cmap_parser::get_unicode_map(&stream.content).unwrap()
}

#[test_log::test]
fn date_lo_fills_every_l7160_cell() {
    let bytes = generate_with_layout(&[], "Date\nLO", "Avery L7160").unwrap();
    let ops = page_operations(&load(&bytes));

    assert_eq!(count(&ops, "BT"), 42);
    let texts = shown_text(&ops);
    assert_eq!(texts.len(), 42);
    for pair in texts.chunks(2) {
        assert_eq!(pair, ["Date", "LO"]);
    }

    // "LO" sits one line plus half a line (the paragraph gap) below "Date"
    let line_height = 12.0 * 1.2;
    for pair in baselines(&ops).chunks(2) {
        assert!((pair[0] - pair[1] - 1.5 * line_height).abs() < 0.02);
    }

    // default flags draw no borders or checkboxes
    assert_eq!(count(&ops, "re"), 0);
}

#[test]
fn labels_follow_the_grid() {
    let layout = default_layout();
    let bytes = generate(&[], "X").unwrap();
    let ops = page_operations(&load(&bytes));
    let xs: Vec<f32> = ops
        .iter()
        .filter(|op| op.operator == "Td")
        .map(|op| op.operands[0].as_float().unwrap())
        .collect();
    let positions = layout.positions();
    assert_eq!(xs.len(), positions.len());
    for (x, position) in xs.iter().zip(&positions) {
        assert!((x - position.x - 6.0).abs() < 0.02);
    }
    let ys = baselines(&ops);
    assert!(ys[0] > ys[3], "first row is drawn first and at the top");
}

#[test_log::test]
fn unknown_layout_uses_the_default() {
    let bogus = generate_with_layout(&[], "Date\nLO", "Bogus").expect("no error for unknown layouts");
    let default = generate_with_layout(&[], "Date\nLO", "Avery L7160").unwrap();
    let bogus_ops = page_operations(&load(&bogus));
    let default_ops = page_operations(&load(&default));
    assert_eq!(shown_text(&bogus_ops), shown_text(&default_ops));
    assert_eq!(baselines(&bogus_ops), baselines(&default_ops));
}

#[test]
fn other_layouts_change_the_label_count() {
    let bytes = generate_with_layout(&[], "Hello", "Avery L7162").unwrap();
    let ops = page_operations(&load(&bytes));
    let layout = layout_by_name("Avery L7162").unwrap();
    assert_eq!(shown_text(&ops).len(), layout.label_count());
    assert_eq!(layout.label_count(), 16);
}

#[test_log::test]
fn broken_fonts_still_produce_a_document() {
    for font in [&b""[..], &b"definitely not a font"[..], &[0x00, 0x01, 0x00, 0x00][..]] {
        let bytes = generate(font, "Date\nLO").expect("fallbacks keep generation alive");
        let doc = load(&bytes);
        assert_eq!(shown_text(&page_operations(&doc)).len(), 42);

        let font_dict = font_dict(&doc);
        assert_eq!(
            font_dict.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"CUSTOM+CustomFont"
        );
        assert_eq!(font_dict.get(b"FirstChar").unwrap().as_i64().unwrap(), 32);
        assert_eq!(font_dict.get(b"LastChar").unwrap().as_i64().unwrap(), 126);
        let widths = font_dict.get(b"Widths").unwrap().as_array().unwrap();
        assert_eq!(widths.len(), 95);
        assert!(widths.iter().all(|w| w.as_float().unwrap() == DEFAULT_CHAR_WIDTH));

        let descriptor = deref(&doc, font_dict, b"FontDescriptor").as_dict().unwrap();
        let bbox: Vec<f32> = descriptor
            .get(b"FontBBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect();
        assert_eq!(bbox, vec![-200.0, -250.0, 1200.0, 950.0]);
        assert_eq!(descriptor.get(b"Ascent").unwrap().as_float().unwrap(), 800.0);
        assert_eq!(descriptor.get(b"Descent").unwrap().as_float().unwrap(), -200.0);
        assert_eq!(descriptor.get(b"CapHeight").unwrap().as_float().unwrap(), 640.0);

        let file = deref(&doc, descriptor, b"FontFile2").as_stream().unwrap();
        assert_eq!(file.content, font);
        assert_eq!(
            file.dict.get(b"Length1").unwrap().as_i64().unwrap(),
            font.len() as i64
        );

        // the reference glyph offset maps all of printable ASCII
        let cmap = to_unicode_map(&doc);
        assert_eq!(cmap.len(), 95);
        assert_eq!(cmap.get(&0x41), Some(&vec![0x00, 0x41]));
    }
}

#[test]
fn borders_and_checkboxes_are_drawn_per_label() {
    let bytes = LabelSheet::builder()
        .show_borders(true)
        .build()
        .generate(&[], "x")
        .unwrap();
    assert_eq!(count(&page_operations(&load(&bytes)), "re"), 21);

    let bytes = LabelSheet::builder()
        .show_borders(true)
        .include_checkbox(true)
        .build()
        .generate(&[], "x")
        .unwrap();
    let ops = page_operations(&load(&bytes));
    assert_eq!(count(&ops, "re"), 42);
    assert_eq!(count(&ops, "S"), 42);
    assert_eq!(count(&ops, "q"), 21);
}

#[test]
fn page_is_a4_with_the_font_resource() {
    let doc = load(&generate(&[], "x").unwrap());
    let page_id = *doc.get_pages().values().next().unwrap();
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let media_box: Vec<f32> = page
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect();
    assert_eq!(media_box[..2], [0.0, 0.0]);
    assert!((media_box[2] - 595.28).abs() < 0.01);
    assert!((media_box[3] - 841.89).abs() < 0.01);

    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    assert!(fonts.get(b"F1").is_ok());

    let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = doc.get_object(root).unwrap().as_dict().unwrap();
    assert_eq!(catalog.get(b"Type").unwrap().as_name().unwrap(), b"Catalog");
}

#[test]
fn title_is_stored_in_the_info_dictionary() {
    let bytes = LabelSheet::builder()
        .title("Jam jars")
        .build()
        .generate(&[], "x")
        .unwrap();
    let doc = load(&bytes);
    let info = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_object(info).unwrap().as_dict().unwrap();
    assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Jam jars");
}

#[test]
fn special_characters_survive_the_content_stream() {
    let bytes = generate(&[], "Box (A) \\ done").unwrap();
    let texts = shown_text(&page_operations(&load(&bytes)));
    assert_eq!(texts[0], "Box (A) \\ done");
}

#[test]
fn long_text_wraps_inside_the_cell() {
    let text = "Strawberry and rhubarb jam made on the twelfth of June";
    let bytes = generate(&[], text).unwrap();
    let ops = page_operations(&load(&bytes));
    let texts = shown_text(&ops);
    let per_label = texts.len() / 21;
    assert!(per_label > 1);
    assert_eq!(texts[..per_label].join(" "), text);
}

#[test]
fn missing_width_policy_reaches_the_descriptor() {
    let bytes = LabelSheet::builder()
        .missing_width(MissingWidthPolicy::Fixed(500.0))
        .build()
        .generate(&[], "x")
        .unwrap();
    let doc = load(&bytes);
    let descriptor = deref(&doc, font_dict(&doc), b"FontDescriptor").as_dict().unwrap();
    assert_eq!(descriptor.get(b"MissingWidth").unwrap().as_float().unwrap(), 500.0);
}

#[test]
fn save_writes_the_same_bytes() {
    let path = std::env::temp_dir().join(format!("label-sheet-{}.pdf", std::process::id()));
    let sheet = LabelSheet::default();
    sheet.save(&[], "Date\nLO", &path).unwrap();
    let written = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(written, sheet.generate(&[], "Date\nLO").unwrap());
}

#[test_log::test]
fn system_font_is_embedded_verbatim() {
    let Some(font) = load_system_font() else {
        eprintln!("Skipping test: no system font found");
        return;
    };
    let bytes = generate(&font, "Date\nLO").unwrap();
    let doc = load(&bytes);

    let font_dict = font_dict(&doc);
    let base_font = font_dict.get(b"BaseFont").unwrap().as_name().unwrap();
    assert!(base_font.starts_with(b"CUSTOM+"));
    assert_ne!(base_font, b"CUSTOM+CustomFont");

    let widths: Vec<f32> = font_dict
        .get(b"Widths")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w.as_float().unwrap())
        .collect();
    // 'W' (code 87) is wider than 'i' (code 105)
    assert!(widths[87 - 32] > widths[105 - 32]);

    let descriptor = deref(&doc, font_dict, b"FontDescriptor").as_dict().unwrap();
    let file = deref(&doc, descriptor, b"FontFile2").as_stream().unwrap();
    assert_eq!(file.content, font);

    let cmap = to_unicode_map(&doc);
    assert_eq!(cmap.len(), 95);
    for (code, unicode) in cmap {
        assert_eq!(unicode, vec![0x00, code as u8]);
    }
}

#[test]
fn missing_width_agrees_with_unmapped_widths() {
    let bytes = LabelSheet::builder()
        .missing_width(MissingWidthPolicy::Fixed(-5.0))
        .glyph_fallback(GlyphFallback::None)
        .build()
        .generate(&[], "x")
        .unwrap();
    let doc = load(&bytes);
    let font_dict = font_dict(&doc);
    let descriptor = deref(&doc, font_dict, b"FontDescriptor").as_dict().unwrap();
    let missing = descriptor.get(b"MissingWidth").unwrap().as_float().unwrap();
    assert_eq!(missing, 0.0);
    let widths = font_dict.get(b"Widths").unwrap().as_array().unwrap();
    assert!(widths.iter().all(|w| w.as_float().unwrap() == missing));
}
