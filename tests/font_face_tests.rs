//! Tests for `@font-face` src assembly and format normalization.

use icon_font::compiler::CompiledFont;
use icon_font::font_face::{SrcOptions, build_src};
use icon_font::formats::normalize;
use icon_font_config::FontFormat;
use std::collections::HashMap;

fn compile(formats: &[FontFormat]) -> HashMap<FontFormat, CompiledFont> {
    formats
        .iter()
        .map(|format| {
            let bytes = format!("font data for {format}").into_bytes();
            (format.clone(), CompiledFont::new(format.clone(), bytes))
        })
        .collect()
}

fn options(inline_base64: bool) -> SrcOptions {
    SrcOptions {
        url_base: "icon-font".to_string(),
        asset_name: "icon-font".to_string(),
        inline_base64,
    }
}

#[test]
fn test_normalize_is_canonical_and_idempotent() {
    let requested: Vec<FontFormat> = ["svg", "woff", "ttf", "woff", "eot", "woff2", "svg"]
        .into_iter()
        .map(FontFormat::from)
        .collect();

    let normalized = normalize(&requested);
    assert_eq!(
        normalized,
        vec![
            FontFormat::Eot,
            FontFormat::Woff2,
            FontFormat::Woff,
            FontFormat::Ttf,
            FontFormat::Svg,
        ]
    );
    assert_eq!(normalize(&normalized), normalized);
}

#[test]
fn test_inline_mode_emits_only_woff() {
    let formats = normalize(&[FontFormat::Ttf, FontFormat::Woff]);
    let fonts = compile(&formats);

    let src = build_src(&formats, &fonts, &options(true));
    assert!(src.starts_with("src: url(data:application/font-woff;charset=utf-8;base64,"));
    assert!(src.ends_with(") format('woff')"));
    assert_eq!(src.matches("url(").count(), 1);
    assert!(!src.contains("truetype"));
}

#[test]
fn test_inline_payload_is_base64_of_font_bytes() {
    let formats = vec![FontFormat::Woff];
    let fonts = compile(&formats);
    let src = build_src(&formats, &fonts, &options(true));
    // base64("font data for woff")
    assert!(src.contains("base64,Zm9udCBkYXRhIGZvciB3b2Zm)"));
}

#[test]
fn test_url_mode_with_legacy_eot_first() {
    let formats = normalize(&[FontFormat::Ttf, FontFormat::Woff2, FontFormat::Eot]);
    let fonts = compile(&formats);
    let eot = &fonts[&FontFormat::Eot].content_hash;
    let woff2 = &fonts[&FontFormat::Woff2].content_hash;
    let ttf = &fonts[&FontFormat::Ttf].content_hash;

    let src = build_src(&formats, &fonts, &options(false));
    let expected = format!(
        "src: url('/icon-font/icon-font.eot?{eot}');\n  \
         src: url('/icon-font/icon-font.eot?{eot}#iefix') format('embedded-opentype'),\n     \
         url('/icon-font/icon-font.woff2?{woff2}') format('woff2'),\n     \
         url('/icon-font/icon-font.ttf?{ttf}') format('truetype')"
    );
    assert_eq!(src, expected);
}

#[test]
fn test_missing_compiled_format_is_same_as_omitting_it() {
    let requested = normalize(&[FontFormat::Eot, FontFormat::Woff2, FontFormat::Ttf]);
    let without_eot = normalize(&[FontFormat::Woff2, FontFormat::Ttf]);
    let fonts = compile(&without_eot);

    assert_eq!(
        build_src(&requested, &fonts, &options(false)),
        build_src(&without_eot, &fonts, &options(false))
    );
    // The first emitted clause has no leading separator
    assert!(build_src(&requested, &fonts, &options(false)).starts_with("src: url('/icon-font/"));
}

#[test]
fn test_hash_changes_with_font_bytes() {
    let formats = vec![FontFormat::Woff2];
    let before = compile(&formats);
    let mut after = before.clone();
    after.insert(
        FontFormat::Woff2,
        CompiledFont::new(FontFormat::Woff2, b"rebuilt".to_vec()),
    );

    assert_eq!(
        build_src(&formats, &before, &options(false)),
        build_src(&formats, &compile(&formats), &options(false))
    );
    assert_ne!(
        build_src(&formats, &before, &options(false)),
        build_src(&formats, &after, &options(false))
    );
}
