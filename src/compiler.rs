//! Font compilation.
//!
//! The [`FontCompiler`] trait is the boundary to whatever turns icon sources
//! into binary fonts. [`CommandFontCompiler`] delegates to an external tool:
//! it writes a JSON manifest of the icons and runs the configured command
//! once per format, collecting the file the command writes to `{output}`.

use crate::catalog::IconEntry;
use crate::error::CompileError;
use icon_font_config::FontFormat;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Lowercase hex SHA-256 of `bytes`, used as the cache-busting query.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// One compiled font file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFont {
    pub format: FontFormat,
    pub bytes: Vec<u8>,
    /// Derived from `bytes`; identical input yields an identical hash
    pub content_hash: String,
}

impl CompiledFont {
    pub fn new(format: FontFormat, bytes: Vec<u8>) -> Self {
        let content_hash = content_hash(&bytes);
        Self {
            format,
            bytes,
            content_hash,
        }
    }
}

/// Identity of the font being compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Font family and file base name
    pub name: String,
    /// Normalized formats to produce
    pub formats: Vec<FontFormat>,
    /// Unicode base code point
    pub unicode: u32,
}

/// Produces binary fonts from the icon mapping.
// Driven from a single task; the futures need not be Send.
#[allow(async_fn_in_trait)]
pub trait FontCompiler {
    /// Compile every configured format from `icons`.
    ///
    /// On failure the previously compiled fonts are kept.
    async fn generate(&mut self, icons: &[IconEntry]) -> Result<(), CompileError>;

    /// Write the compiled fonts to `target_dir` as `<name>.<format>`.
    async fn write(&self, target_dir: &Path) -> Result<(), CompileError>;

    /// Fonts from the last successful `generate`.
    fn fonts(&self) -> &HashMap<FontFormat, CompiledFont>;
}

#[derive(Serialize)]
struct Manifest<'a> {
    name: &'a str,
    unicode: u32,
    formats: Vec<&'a str>,
    icons: Vec<ManifestIcon<'a>>,
}

#[derive(Serialize)]
struct ManifestIcon<'a> {
    name: &'a str,
    codepoint: u32,
    path: &'a Path,
}

/// Font compiler running an external command per format.
#[derive(Debug)]
pub struct CommandFontCompiler {
    options: CompilerOptions,
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
    fonts: HashMap<FontFormat, CompiledFont>,
}

impl CommandFontCompiler {
    /// Create a compiler for `command`, using `work_dir` for the manifest
    /// and intermediate output.
    ///
    /// The command line is split here so a malformed command fails at setup.
    pub fn new(
        options: CompilerOptions,
        command: &str,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self, CompileError> {
        let invalid = |details: String| CompileError::InvalidCommand {
            command: command.to_string(),
            details,
        };
        let mut words = shell_words::split(command).map_err(|e| invalid(e.to_string()))?;
        // An empty command is only usable when there is nothing to compile
        let program = if words.is_empty() {
            if !options.formats.is_empty() {
                return Err(invalid("command is empty".to_string()));
            }
            String::new()
        } else {
            words.remove(0)
        };

        Ok(Self {
            options,
            program,
            args: words,
            work_dir: work_dir.into(),
            fonts: HashMap::new(),
        })
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    fn manifest_path(&self) -> PathBuf {
        self.work_dir.join("manifest.json")
    }

    fn output_path(&self, format: &FontFormat) -> PathBuf {
        self.work_dir
            .join(format!("{}.{}", self.options.name, format.as_str()))
    }

    /// Arguments with `{manifest}`, `{format}`, `{output}` and `{name}` filled in.
    fn expand_args(&self, format: &FontFormat, output: &Path) -> Vec<String> {
        let manifest = self.manifest_path();
        let manifest = manifest.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{manifest}", &manifest)
                    .replace("{format}", format.as_str())
                    .replace("{output}", &output)
                    .replace("{name}", &self.options.name)
            })
            .collect()
    }

    async fn write_manifest(&self, icons: &[IconEntry]) -> Result<(), CompileError> {
        let manifest = Manifest {
            name: &self.options.name,
            unicode: self.options.unicode,
            formats: self.options.formats.iter().map(FontFormat::as_str).collect(),
            icons: icons
                .iter()
                .map(|icon| ManifestIcon {
                    name: &icon.name,
                    codepoint: icon.code_point(self.options.unicode),
                    path: &icon.path,
                })
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&manifest)?;
        let path = self.manifest_path();
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| CompileError::Io { path, source })
    }

    async fn compile_format(&self, format: &FontFormat) -> Result<CompiledFont, CompileError> {
        let output = self.output_path(format);
        if let Err(e) = tokio::fs::remove_file(&output).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            return Err(CompileError::Io {
                path: output,
                source: e,
            });
        }

        let args = self.expand_args(format, &output);
        log::debug!("Compiling {}: {} {:?}", format, self.program, args);
        let result = tokio::process::Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|source| CompileError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(CompileError::Failed {
                format: format.to_string(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let bytes = tokio::fs::read(&output)
            .await
            .map_err(|source| CompileError::Io {
                path: output.clone(),
                source,
            })?;
        Ok(CompiledFont::new(format.clone(), bytes))
    }
}

impl FontCompiler for CommandFontCompiler {
    async fn generate(&mut self, icons: &[IconEntry]) -> Result<(), CompileError> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|source| CompileError::Io {
                path: self.work_dir.clone(),
                source,
            })?;
        self.write_manifest(icons).await?;

        let mut fonts = HashMap::new();
        for format in &self.options.formats {
            let font = self.compile_format(format).await?;
            log::debug!(
                "Compiled {} ({} bytes, {})",
                format,
                font.bytes.len(),
                font.content_hash
            );
            fonts.insert(format.clone(), font);
        }

        self.fonts = fonts;
        log::info!(
            "Compiled {} font format(s) for {} icon(s)",
            self.fonts.len(),
            icons.len()
        );
        Ok(())
    }

    async fn write(&self, target_dir: &Path) -> Result<(), CompileError> {
        tokio::fs::create_dir_all(target_dir)
            .await
            .map_err(|source| CompileError::Io {
                path: target_dir.to_path_buf(),
                source,
            })?;

        for format in &self.options.formats {
            let Some(font) = self.fonts.get(format) else {
                continue;
            };
            let path = target_dir.join(format!("{}.{}", self.options.name, format.as_str()));
            tokio::fs::write(&path, &font.bytes)
                .await
                .map_err(|source| CompileError::Io { path, source })?;
        }
        Ok(())
    }

    fn fonts(&self) -> &HashMap<FontFormat, CompiledFont> {
        &self.fonts
    }
}
