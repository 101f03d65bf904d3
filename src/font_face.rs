//! `@font-face` `src` descriptor assembly.
//!
//! Produces the exact `src: ...` text placed in `font-face.css`, either as a
//! list of versioned URLs (one per compiled format, legacy `eot` first) or as
//! a single inlined base64 `woff` data URI.

use crate::compiler::CompiledFont;
use base64::Engine as _;
use icon_font_config::FontFormat;
use std::collections::HashMap;
use std::path::Path;

/// URL fragment appended to a format's font URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    /// No fragment
    None,
    /// A fixed fragment such as `iefix`
    Static(&'static str),
    /// The font family name (SVG fonts address the `<font id>` element)
    FontName,
}

/// Per-format `@font-face` metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFaceSrcMeta {
    /// MIME type used in base64 data URIs
    pub mime_type: &'static str,
    /// Keyword for `format(...)`; `None` means the raw format name is used
    pub format_keyword: Option<&'static str>,
    /// Fragment appended to the font URL in URL mode
    pub fragment: Fragment,
}

impl FontFaceSrcMeta {
    /// Keyword written inside `format('...')`.
    pub fn keyword<'a>(&self, format: &'a FontFormat) -> &'a str {
        self.format_keyword.unwrap_or(format.as_str())
    }

    /// Fragment text for this format, if any.
    pub fn fragment<'a>(&self, font_name: &'a str) -> Option<&'a str> {
        match self.fragment {
            Fragment::None => None,
            Fragment::Static(value) => Some(value),
            Fragment::FontName => Some(font_name),
        }
    }
}

/// Static metadata lookup keyed by format.
pub fn src_meta(format: &FontFormat) -> FontFaceSrcMeta {
    match format {
        FontFormat::Eot => FontFaceSrcMeta {
            mime_type: "application/vnd.ms-fontobject",
            format_keyword: Some("embedded-opentype"),
            fragment: Fragment::Static("iefix"),
        },
        FontFormat::Woff2 => FontFaceSrcMeta {
            mime_type: "application/font-woff2",
            format_keyword: None,
            fragment: Fragment::None,
        },
        FontFormat::Woff => FontFaceSrcMeta {
            mime_type: "application/font-woff",
            format_keyword: None,
            fragment: Fragment::None,
        },
        FontFormat::Ttf => FontFaceSrcMeta {
            mime_type: "font/truetype",
            format_keyword: Some("truetype"),
            fragment: Fragment::None,
        },
        FontFormat::Svg => FontFaceSrcMeta {
            mime_type: "image/svg+xml",
            format_keyword: None,
            fragment: Fragment::FontName,
        },
        FontFormat::Other(_) => FontFaceSrcMeta {
            mime_type: "application/octet-stream",
            format_keyword: None,
            fragment: Fragment::None,
        },
    }
}

/// Public URL path of `target_dir`: everything up to and including the last
/// `public_dir` segment is stripped.
///
/// If `target_dir` does not live under `public_dir` the whole path is used,
/// minus its leading separator.
pub fn public_url_path(target_dir: &Path, public_dir: &str) -> String {
    let target = target_dir.to_string_lossy().replace('\\', "/");
    let target = target.trim_end_matches('/');
    let public = public_dir.replace('\\', "/");
    let public = public.trim_matches('/');

    if public.is_empty() {
        return target.trim_start_matches('/').to_string();
    }

    let marker = format!("/{public}/");
    if let Some(idx) = target.rfind(&marker) {
        return target[idx + marker.len()..].to_string();
    }
    if target == public || target.ends_with(&format!("/{public}")) {
        return String::new();
    }
    if let Some(rest) = target.strip_prefix(&format!("{public}/")) {
        return rest.to_string();
    }

    log::warn!(
        "Font target {:?} is not inside public directory '{}'; using the full path in font URLs",
        target_dir,
        public
    );
    target.trim_start_matches('/').to_string()
}

/// Inputs for [`build_src`] that stay fixed for a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcOptions {
    /// Public URL path of the font directory (see [`public_url_path`])
    pub url_base: String,
    /// Font file base name, also the SVG fragment
    pub asset_name: String,
    /// Inline `woff` as a data URI instead of referencing files
    pub inline_base64: bool,
}

impl SrcOptions {
    /// `/<url_base>/<asset_name>`, skipping an empty `url_base`.
    fn url_stem(&self) -> String {
        let base = self.url_base.trim_matches('/');
        if base.is_empty() {
            format!("/{}", self.asset_name)
        } else {
            format!("/{}/{}", base, self.asset_name)
        }
    }
}

/// Build the `src:` descriptor for the `@font-face` rule.
///
/// `formats` must already be normalized. Formats without an entry in
/// `compiled` are skipped as if they had never been requested.
pub fn build_src(
    formats: &[FontFormat],
    compiled: &HashMap<FontFormat, CompiledFont>,
    options: &SrcOptions,
) -> String {
    let mut text = String::from("src: ");
    let available = formats
        .iter()
        .filter_map(|format| compiled.get(format).map(|font| (format, font)));

    if options.inline_base64 {
        let mut inlined = false;
        for (format, font) in available {
            // Only woff is inlined; every other format is dropped in this mode.
            if *format != FontFormat::Woff {
                continue;
            }
            let meta = src_meta(format);
            let encoded = base64::engine::general_purpose::STANDARD.encode(&font.bytes);
            text.push_str(&format!(
                "url(data:{};charset=utf-8;base64,{}) format('{}')",
                meta.mime_type,
                encoded,
                meta.keyword(format)
            ));
            inlined = true;
        }
        if !inlined && !formats.is_empty() {
            log::warn!("base64 mode inlines only woff, which was not compiled; src is empty");
        }
        return text;
    }

    let stem = options.url_stem();
    for (index, (format, font)) in available.enumerate() {
        let meta = src_meta(format);
        if index == 0 {
            if *format == FontFormat::Eot {
                // IE9 compat mode reads only the first src, on its own line
                text.push_str(&format!("url('{}.eot?{}');\n", stem, font.content_hash));
                text.push_str("  src: ");
            }
        } else {
            text.push_str(",\n     ");
        }

        let fragment = meta
            .fragment(&options.asset_name)
            .map(|f| format!("#{f}"))
            .unwrap_or_default();
        text.push_str(&format!(
            "url('{}.{}?{}{}') format('{}')",
            stem,
            format.as_str(),
            font.content_hash,
            fragment,
            meta.keyword(format)
        ));
    }

    text
}
