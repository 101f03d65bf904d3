//! End-to-end tests for the regeneration pipeline.

mod common;

use common::{Project, write_icon};
use icon_font::app;
use icon_font::catalog::IconCatalog;
use icon_font::scheduler::{ChangeKind, IconChange};
use icon_font_config::{Case, FontFormat};
use std::fs;

#[tokio::test]
async fn test_vars_sheet_end_to_end() {
    let project = Project::new(&["home.svg", "user.svg"]);
    let mut pipeline = project.pipeline();
    pipeline.initialize().await.unwrap();

    let vars = &pipeline.host().last().vars;
    assert!(vars.contains("--icon-font-home: \"\\e900\";"));
    assert!(vars.contains("--icon-font-user: \"\\e901\";"));
    assert_eq!(pipeline.host().rebuilds_done, 1);
}

#[tokio::test]
async fn test_font_face_sheet_inlines_woff_by_default() {
    let project = Project::new(&["home.svg"]);
    let mut pipeline = project.pipeline();
    pipeline.initialize().await.unwrap();

    let font_face = &pipeline.host().last().font_face;
    assert!(font_face.contains("font-family: \"icon-font\";"));
    assert!(font_face.contains("src: url(data:application/font-woff;charset=utf-8;base64,"));
    assert!(!font_face.contains("woff2"));
}

#[tokio::test]
async fn test_font_face_sheet_references_urls() {
    let mut project = Project::new(&["home.svg"]);
    project.config = project
        .config
        .clone()
        .with_base64(false)
        .with_formats([FontFormat::Ttf, FontFormat::Woff2]);
    let mut pipeline = project.pipeline();
    pipeline.initialize().await.unwrap();

    let src = pipeline.font_face_src();
    assert!(src.starts_with("src: url('/icon-font/icon-font.woff2?"));
    assert!(src.contains(",\n     url('/icon-font/icon-font.ttf?"));
    assert!(pipeline.host().last().font_face.contains(src));
}

#[tokio::test]
async fn test_changes_update_mapping() {
    let project = Project::new(&["a.svg", "b.svg"]);
    let mut pipeline = project.pipeline();
    pipeline.initialize().await.unwrap();

    let added = write_icon(&project.source_dir(), "c.svg");
    pipeline
        .apply_change(&IconChange::new(ChangeKind::Add, &added))
        .await
        .unwrap();
    let removed = project.source_dir().join("a.svg");
    fs::remove_file(&removed).unwrap();
    pipeline
        .apply_change(&IconChange::new(ChangeKind::Unlink, &removed))
        .await
        .unwrap();
    pipeline.rebuild().await.unwrap();

    let names: Vec<(&str, u32)> = pipeline
        .catalog()
        .icons()
        .iter()
        .map(|icon| (icon.name.as_str(), icon.unicode_offset))
        .collect();
    assert_eq!(names, vec![("b", 0), ("c", 1)]);
    assert!(
        pipeline
            .host()
            .last()
            .vars
            .contains("--icon-font-c: \"\\e901\";")
    );
}

#[tokio::test]
async fn test_add_of_missing_file_fails() {
    let project = Project::new(&[]);
    let mut pipeline = project.pipeline();
    pipeline.initialize().await.unwrap();

    let ghost = project.source_dir().join("ghost.svg");
    assert!(
        pipeline
            .apply_change(&IconChange::new(ChangeKind::Add, &ghost))
            .await
            .is_err()
    );
    assert!(pipeline.catalog().icons().is_empty());
}

#[tokio::test]
async fn test_compile_failure_keeps_previous_output() {
    let project = Project::new(&["home.svg"]);
    let mut pipeline = project.pipeline();
    pipeline.initialize().await.unwrap();
    let before = pipeline.host().last().clone();

    pipeline.compiler_mut().fail_next = true;
    let err = pipeline.rebuild().await.unwrap_err();
    assert!(format!("{err:#}").contains("Font compilation failed"));
    assert_eq!(pipeline.host().published.len(), 1);
    assert_eq!(pipeline.host().last(), &before);
}

#[tokio::test]
async fn test_kebab_case_variable_names() {
    let mut project = Project::new(&["arrows/arrow_left.svg"]);
    project.config = project.config.clone().with_case(Case::Kebab);
    let mut pipeline = project.pipeline();
    pipeline.initialize().await.unwrap();

    assert!(
        pipeline
            .host()
            .last()
            .vars
            .contains("--icon-font-arrows-arrow-left: \"\\e900\";")
    );
}

/// Full build through the shipped collaborators, with `sh` standing in for
/// a font compiler (it copies the manifest to the output).
#[cfg(unix)]
#[tokio::test]
async fn test_build_with_command_compiler() {
    let project = Project::new(&["home.svg", "user.svg"]);
    let config = project
        .config
        .clone()
        .with_base64(false)
        .with_compiler_command(r#"sh -c 'cp "$0" "$1"' {manifest} {output}"#);

    app::build(&config, &project.root).await.unwrap();

    let target_dir = config.target_path(&project.root);
    let manifest = fs::read_to_string(target_dir.join("icon-font.woff2")).unwrap();
    assert!(manifest.contains("\"name\": \"home\""));
    assert!(manifest.contains(&format!("\"codepoint\": {}", 0xe901)));
    assert!(target_dir.join("icon-font.woff").exists());

    let build_dir = config.build_path(&project.root);
    let vars = fs::read_to_string(build_dir.join("vars.css")).unwrap();
    assert!(vars.contains("--icon-font-home: \"\\e900\";"));
    let font_face = fs::read_to_string(build_dir.join("font-face.css")).unwrap();
    assert!(font_face.contains("url('/icon-font/icon-font.woff2?"));
}

#[tokio::test]
async fn test_build_rejects_invalid_config() {
    let project = Project::new(&["home.svg"]);
    let config = project.config.clone().with_name("");
    assert!(app::build(&config, &project.root).await.is_err());
}
