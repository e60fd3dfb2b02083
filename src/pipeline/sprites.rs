//! Sprites: `images/svg/*.svg` combined into one `<symbol>` sprite.
//!
//! Mode flags are ignored; the sprite is always cleaned.

use anyhow::{Context, Result};

use super::{OutputFile, PipelineContext, RunReport, read_sources, write_outputs};
use crate::image::svg::sprite::{SPRITE_NAME, SpriteIcon, build_sprite};
use crate::paths::CategoryKind;

const KIND: CategoryKind = CategoryKind::Sprites;

pub(super) fn run(ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let category = ctx.category(KIND);
    let files = read_sources(category)?;
    if files.is_empty() {
        return Ok(RunReport::new(KIND, 0, 0));
    }

    let icons = files
        .iter()
        .map(|file| {
            let name = file
                .rel
                .file_stem()
                .and_then(|s| s.to_str())
                .with_context(|| format!("invalid icon name {}", file.name()))?;
            let source = std::str::from_utf8(&file.content)
                .with_context(|| format!("{} is not valid utf-8", file.name()))?;
            Ok(SpriteIcon { name, source })
        })
        .collect::<Result<Vec<_>>>()?;

    let sprite = build_sprite(&icons, &ctx.config.images.svg)?;
    let written = write_outputs(&category.output, &[OutputFile::new(SPRITE_NAME, sprite)])?;
    ctx.reload.reload();
    Ok(RunReport::new(KIND, written, 0))
}

#[cfg(test)]
mod tests {
    use crate::core::Mode;
    use crate::image::svg::dom::Document;
    use crate::paths::CategoryKind;
    use crate::pipeline::test_support::Project;

    #[test]
    fn test_one_sprite_from_icons() {
        let project = Project::new();
        project.add(
            "images/svg/arrow.svg",
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><title>Arrow</title><path d="M0 0h24" stroke="#000"/></svg>"##,
        );
        project.add(
            "images/svg/close.svg",
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><path d="M1 1l14 14" fill="red"/></svg>"#,
        );
        project.add("images/svg/nested/skip.svg", "<svg/>");

        let report = project.run(CategoryKind::Sprites, Mode::PRODUCTION);
        assert_eq!(report.written, 1);
        assert_eq!(project.build_files(), ["images/sprites/sprite.svg"]);

        let sprite = project.read_build("images/sprites/sprite.svg");
        let doc = Document::parse(&sprite).unwrap();
        let symbols: Vec<_> = doc.root().unwrap().child_elements().collect();
        assert_eq!(symbols.len(), 2);
        for symbol in symbols {
            assert_eq!(symbol.name, "symbol");
            assert!(symbol.attr("id").unwrap().starts_with("icon_"));
            assert_eq!(symbol.attr("fill"), Some("currentColor"));
        }
        assert!(!sprite.contains("<title>"));
    }

    #[test]
    fn test_no_icons_no_sprite() {
        let project = Project::new();
        project.run(CategoryKind::Sprites, Mode::PLAIN);
        assert!(project.build_files().is_empty());
    }

    #[test]
    fn test_signals_full_reload() {
        let project = Project::new();
        project.add(
            "images/svg/dot.svg",
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 2 2"><circle r="1"/></svg>"#,
        );

        let (_, sent) = project.run_live(CategoryKind::Sprites, Mode::PLAIN);
        assert_eq!(sent, [crate::reload::message::HotReloadMessage::Reload]);

        let empty = Project::new();
        let (_, sent) = empty.run_live(CategoryKind::Sprites, Mode::PLAIN);
        assert!(sent.is_empty());
    }
}
