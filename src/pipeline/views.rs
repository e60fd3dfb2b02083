//! Views: HTML templates copied to the build root.
//!
//! Build mode points `.css`/`.js` references at the `.min` outputs and
//! minifies the markup.

use anyhow::{Context, Result};

use super::isolate::isolate;
use super::{OutputFile, PipelineContext, RunReport, read_sources, write_outputs};
use crate::asset::html::minify_markup;
use crate::asset::rewrite::rewrite_min_refs;
use crate::paths::CategoryKind;

const KIND: CategoryKind = CategoryKind::Views;

pub(super) fn run(ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let category = ctx.category(KIND);
    let files = read_sources(category)?;
    let build = ctx.mode.build;

    let outputs = isolate(KIND, &files, |file| {
        let source = std::str::from_utf8(&file.content).context("view is not valid utf-8")?;
        let html = if build {
            minify_markup(&rewrite_min_refs(source))
        } else {
            source.to_string()
        };
        Ok(OutputFile::new(&file.rel, html))
    });

    let written = write_outputs(&category.output, &outputs.ok)?;
    ctx.reload.reload();
    Ok(RunReport::new(KIND, written, outputs.failed.len()))
}

#[cfg(test)]
mod tests {
    use crate::core::Mode;
    use crate::paths::CategoryKind;
    use crate::pipeline::test_support::Project;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <!-- styles -->
    <link rel="stylesheet" href="styles/app.css">
  </head>
  <body>
    <p>Hello   world</p>
    <script src="scripts/app.js"></script>
  </body>
</html>
"#;

    #[test]
    fn test_dev_copies_verbatim() {
        let project = Project::new();
        project.add("views/index.html", PAGE);
        project.add("views/blog/post.html", "<p>post</p>");

        let report = project.run(CategoryKind::Views, Mode::DEVELOPMENT);
        assert_eq!(report.written, 2);
        assert_eq!(project.read_build("index.html"), PAGE);
        assert_eq!(project.read_build("blog/post.html"), "<p>post</p>");
    }

    #[test]
    fn test_build_rewrites_and_minifies() {
        let project = Project::new();
        project.add("views/index.html", PAGE);

        project.run(CategoryKind::Views, Mode::PRODUCTION);
        let html = project.read_build("index.html");
        assert!(html.contains("styles/app.min.css"));
        assert!(html.contains("scripts/app.min.js"));
        assert!(!html.contains("<!-- styles -->"));
        assert!(html.contains("Hello world"));
        assert!(!html.contains("\n    <p>"));
    }

    #[test]
    fn test_bad_file_isolated() {
        let project = Project::new();
        project.add("views/a.html", "<p>a</p>");
        project.add("views/b.html", [0xff, 0xfe, 0x00]);

        let report = project.run(CategoryKind::Views, Mode::PLAIN);
        assert_eq!(report.written, 1);
        assert_eq!(report.failed, 1);
        assert!(project.build_path("a.html").exists());
        assert!(!project.build_path("b.html").exists());
    }
}
