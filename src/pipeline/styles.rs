//! Styles: Sass/CSS through the stylesheet chain.
//!
//! Partials (`_name.scss`) are import-only and produce no output. The purge
//! step reads the views category's sources as its reference set.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use super::isolate::isolate;
use super::{OutputFile, PipelineContext, RunReport, read_sources, write_outputs};
use crate::css::{Purger, StyleContext, process_stylesheet};
use crate::paths::CategoryKind;
use crate::utils::path::{is_partial, to_slash, with_min_suffix};

const KIND: CategoryKind = CategoryKind::Styles;

/// Source maps land here, relative to the styles output directory.
const MAPS_DIR: &str = "maps";

pub(super) fn run(ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let category = ctx.category(KIND);
    let files: Vec<_> = read_sources(category)?
        .into_iter()
        .filter(|f| !is_partial(&f.rel))
        .collect();

    let views = read_sources(ctx.category(CategoryKind::Views))?;
    let views: Vec<Cow<'_, str>> = views
        .iter()
        .map(|v| String::from_utf8_lossy(&v.content))
        .collect();
    let config = &ctx.config.styles;
    let purger = Purger::new(
        views.iter().map(AsRef::as_ref),
        config.allow_patterns(),
        config.keep_font_face,
        config.keep_keyframes,
    );
    let style_ctx = StyleContext {
        config,
        purger: &purger,
        styles_root: &category.base,
        mode: ctx.mode,
    };

    let compiled = isolate(KIND, &files, |file| {
        let source = std::str::from_utf8(&file.content).context("stylesheet is not valid utf-8")?;
        let style = process_stylesheet(source, &file.path, &file.name(), &style_ctx)?;

        let rel = output_rel(&file.rel, ctx.mode.build);
        let mut outputs = Vec::with_capacity(2);
        if let Some(map) = style.map {
            outputs.push(OutputFile::new(map_rel(&rel), map));
        }
        outputs.push(OutputFile::new(&rel, style.css));
        Ok((outputs, rel))
    });

    let (outputs, stylesheets): (Vec<_>, Vec<_>) = compiled.ok.into_iter().unzip();
    let outputs: Vec<_> = outputs.into_iter().flatten().collect();
    write_outputs(&category.output, &outputs)?;

    let url_base = category
        .output
        .strip_prefix(ctx.table.build_root())
        .unwrap_or(Path::new(""));
    for rel in &stylesheets {
        ctx.reload.inject_css(&to_slash(&url_base.join(rel)));
    }

    Ok(RunReport::new(KIND, stylesheets.len(), compiled.failed.len()))
}

/// `app.scss` → `app.css`, or `app.min.css` in build mode.
fn output_rel(rel: &Path, build: bool) -> PathBuf {
    let css = rel.with_extension("css");
    if build { with_min_suffix(&css) } else { css }
}

/// `blocks/app.css` → `maps/blocks/app.css.map`.
fn map_rel(css_rel: &Path) -> PathBuf {
    Path::new(MAPS_DIR).join(format!("{}.map", to_slash(css_rel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Mode;
    use crate::pipeline::test_support::Project;
    use crate::reload::ReloadHandle;
    use crate::reload::message::HotReloadMessage;
    use crate::actor::messages::WsMsg;

    const VIEW: &str = r##"<main class="page"><a class="page__link" href="#">x</a></main>"##;

    fn project() -> Project {
        let project = Project::new();
        project.add("views/index.html", VIEW);
        project.add("styles/_vars.scss", "$gap: 24px;");
        project.add(
            "styles/app.scss",
            "@import 'vars';\n.page { padding: $gap; font-size: 20px; }\n.page__link { color: red; }\n.unused { color: blue; }\n",
        );
        project
    }

    #[test]
    fn test_output_names() {
        assert_eq!(output_rel(Path::new("app.scss"), false), PathBuf::from("app.css"));
        assert_eq!(output_rel(Path::new("a/b.css"), true), PathBuf::from("a/b.min.css"));
        assert_eq!(
            map_rel(Path::new("a/b.min.css")),
            PathBuf::from("maps/a/b.min.css.map")
        );
    }

    #[test]
    fn test_dev_mode() {
        let project = project();
        let report = project.run(CategoryKind::Styles, Mode::DEVELOPMENT);
        assert_eq!(report.written, 1);

        assert_eq!(
            project.build_files(),
            ["styles/app.css", "styles/maps/app.css.map"]
        );
        let css = project.read_build("styles/app.css");
        assert!(css.contains(".page__link"));
        assert!(css.contains("1.25rem"));
        assert!(!css.contains(".unused"));
        assert!(!css.contains("sourceMappingURL"));

        let map: serde_json::Value =
            serde_json::from_str(&project.read_build("styles/maps/app.css.map")).unwrap();
        assert_eq!(map["version"], 3);
    }

    #[test]
    fn test_build_mode_min_suffix() {
        let project = project();
        project.add("styles/print.css", ".page { color: black; }");
        project.run(CategoryKind::Styles, Mode::PRODUCTION);

        let files = project.build_files();
        assert_eq!(files, ["styles/app.min.css", "styles/print.min.css"]);
        assert!(files.iter().all(|f| f.ends_with(".min.css")));
        assert!(!project.read_build("styles/app.min.css").contains('\n'));
    }

    #[test]
    fn test_shared_media_query_merged_per_file() {
        let project = Project::new();
        project.add("views/index.html", r#"<div class="a b c d"></div>"#);
        let sheet = "@media (min-width: 600px) { .a { color: red; } }\n.c { margin: 0; }\n@media (min-width: 600px) { .b { color: blue; } }\n";
        project.add("styles/one.scss", sheet);
        project.add("styles/two.scss", sheet.replace(".c", ".d"));
        project.run(CategoryKind::Styles, Mode::PLAIN);

        for name in ["styles/one.css", "styles/two.css"] {
            let css = project.read_build(name);
            assert_eq!(css.matches("@media").count(), 1, "{name}: {css}");
            assert!(css.contains(".a") && css.contains(".b"));
        }
    }

    #[test]
    fn test_broken_sheet_isolated_and_css_injected() {
        let project = project();
        project.add("styles/broken.scss", ".a { color: $missing; }");
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);

        let report = project
            .run_with(CategoryKind::Styles, Mode::PLAIN, &ReloadHandle::new(tx))
            .unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.failed, 1);

        match rx.try_recv() {
            Ok(WsMsg::Broadcast(msg)) => assert_eq!(msg, HotReloadMessage::css("styles/app.css")),
            _ => panic!("expected css injection"),
        }
        assert!(rx.try_recv().is_err());
    }
}
