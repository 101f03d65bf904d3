//! CSS asset rendering.
//!
//! Two templates are rendered on every rebuild: the variables sheet
//! (`vars.css`, one custom property per icon) and the font-face sheet
//! (`font-face.css`). Template syntax:
//!
//! - `{{name}}`, `{{unicode}}`, `{{font_face_src}}`
//! - `{{#icons}} ... {{/icons}}`, repeated per icon, with `{{icon.name}}`,
//!   `{{icon.var}}` and `{{icon.codepoint}}` available inside
//!
//! Templates are parsed once at construction; unknown placeholders and
//! unbalanced sections are rejected there.

use crate::catalog::IconEntry;
use crate::error::TemplateError;
use icon_font_config::Case;
use regex::Regex;
use std::sync::LazyLock;

/// File name of the variables sheet.
pub const VARS_FILE: &str = "vars.css";
/// File name of the font-face sheet.
pub const FONT_FACE_FILE: &str = "font-face.css";

/// Built-in template for `vars.css`.
pub const DEFAULT_VARS_TEMPLATE: &str = concat!(
    ":root {\n",
    "{{#icons}}  --{{icon.var}}: \"\\{{icon.codepoint}}\";\n{{/icons}}",
    "}\n",
);

/// Built-in template for `font-face.css`.
pub const DEFAULT_FONT_FACE_TEMPLATE: &str = concat!(
    "@font-face {\n",
    "  font-family: \"{{name}}\";\n",
    "  {{font_face_src}};\n",
    "  font-weight: normal;\n",
    "  font-style: normal;\n",
    "}\n",
);

/// Matches `{{name}}`, `{{#section}}` and `{{/section}}` tags.
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([#/]?)\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}\}")
        .expect("template tag regex is a compile-time constant and must be valid")
});

const GLOBAL_VARS: &[&str] = &["name", "unicode", "font_face_src"];
const ICON_VARS: &[&str] = &["icon.name", "icon.var", "icon.codepoint"];
const ICONS_SECTION: &str = "icons";

/// Values available to the templates.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Font family name
    pub name: &'a str,
    /// Case style for `icon.var`
    pub case: Case,
    /// Unicode base code point
    pub unicode: u32,
    pub icons: &'a [IconEntry],
    /// Output of the font-face source builder
    pub font_face_src: &'a str,
}

/// The two rendered sheets, in their fixed slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedAssets {
    /// Slot 0: custom property sheet
    pub vars: String,
    /// Slot 1: `@font-face` sheet
    pub font_face: String,
}

impl RenderedAssets {
    /// `(file name, contents)` pairs in slot order.
    pub fn files(&self) -> [(&'static str, &str); 2] {
        [
            (VARS_FILE, self.vars.as_str()),
            (FONT_FACE_FILE, self.font_face.as_str()),
        ]
    }
}

/// Renders the two CSS assets from a [`RenderContext`].
pub trait AssetRenderer {
    fn generate(&mut self, context: &RenderContext<'_>) -> Result<(), TemplateError>;

    /// Assets from the last successful `generate`.
    fn assets(&self) -> &RenderedAssets;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Var(String),
    Icons(Vec<Node>),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        // Stack of (open section name, nodes collected so far)
        let mut stack: Vec<(Option<String>, Vec<Node>)> = vec![(None, Vec::new())];
        let mut last_end = 0;

        for caps in TAG_PATTERN.captures_iter(source) {
            let whole = caps.get(0).expect("capture 0 always exists");
            let sigil = &caps[1];
            let name = caps[2].to_string();
            let in_icons = stack.iter().any(|(section, _)| section.is_some());

            let current = &mut stack.last_mut().expect("root frame is never popped").1;
            if whole.start() > last_end {
                current.push(Node::Text(source[last_end..whole.start()].to_string()));
            }
            last_end = whole.end();

            match sigil {
                "#" => {
                    if name != ICONS_SECTION || in_icons {
                        return Err(TemplateError::UnknownPlaceholder(format!("#{name}")));
                    }
                    stack.push((Some(name), Vec::new()));
                }
                "/" => {
                    let is_open = stack
                        .last()
                        .and_then(|(section, _)| section.as_deref())
                        .is_some_and(|open| open == name);
                    if !is_open {
                        return Err(TemplateError::UnexpectedClose(name));
                    }
                    let (_, body) = stack.pop().expect("checked above");
                    stack
                        .last_mut()
                        .expect("root frame is never popped")
                        .1
                        .push(Node::Icons(body));
                }
                _ => {
                    let known = GLOBAL_VARS.contains(&name.as_str())
                        || (in_icons && ICON_VARS.contains(&name.as_str()));
                    if !known {
                        return Err(TemplateError::UnknownPlaceholder(name));
                    }
                    current.push(Node::Var(name));
                }
            }
        }

        if let Some((Some(open), _)) = stack.last() {
            return Err(TemplateError::UnclosedSection(open.clone()));
        }
        let (_, mut nodes) = stack.pop().expect("root frame is never popped");
        if last_end < source.len() {
            nodes.push(Node::Text(source[last_end..].to_string()));
        }
        Ok(Self { nodes })
    }

    pub fn render(&self, context: &RenderContext<'_>) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, context, None, &mut out);
        out
    }
}

fn render_nodes(
    nodes: &[Node],
    context: &RenderContext<'_>,
    icon: Option<&IconEntry>,
    out: &mut String,
) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => out.push_str(&lookup(name, context, icon)),
            Node::Icons(body) => {
                for entry in context.icons {
                    render_nodes(body, context, Some(entry), out);
                }
            }
        }
    }
}

fn lookup(name: &str, context: &RenderContext<'_>, icon: Option<&IconEntry>) -> String {
    match (name, icon) {
        ("name", _) => context.name.to_string(),
        ("unicode", _) => format!("{:x}", context.unicode),
        ("font_face_src", _) => context.font_face_src.to_string(),
        ("icon.name", Some(icon)) => icon.name.clone(),
        ("icon.var", Some(icon)) => context
            .case
            .apply(&format!("{}-{}", context.name, icon.name)),
        ("icon.codepoint", Some(icon)) => format!("{:x}", icon.code_point(context.unicode)),
        // Names are validated against their scope by Template::parse
        _ => String::new(),
    }
}

/// Asset renderer backed by the two parsed templates.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    vars: Template,
    font_face: Template,
    assets: RenderedAssets,
}

impl TemplateRenderer {
    pub fn new(vars_template: &str, font_face_template: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            vars: Template::parse(vars_template)?,
            font_face: Template::parse(font_face_template)?,
            assets: RenderedAssets::default(),
        })
    }

    /// Renderer using the built-in templates.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_VARS_TEMPLATE, DEFAULT_FONT_FACE_TEMPLATE)
            .expect("built-in templates are valid")
    }
}

impl AssetRenderer for TemplateRenderer {
    fn generate(&mut self, context: &RenderContext<'_>) -> Result<(), TemplateError> {
        self.assets = RenderedAssets {
            vars: self.vars.render(context),
            font_face: self.font_face.render(context),
        };
        Ok(())
    }

    fn assets(&self) -> &RenderedAssets {
        &self.assets
    }
}
