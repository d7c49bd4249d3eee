use std::sync::LazyLock;

use tera::{Context, Tera};
use tracing::debug;

use notesum_core::models::summary::StructuredSummary;
use notesum_templates::RendererId;

use crate::error::ExportError;
use crate::markdown::template_for;

static BUILTIN: LazyLock<Result<Tera, String>> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(
        RendererId::ALL
            .iter()
            .map(|id| (template_name(*id), template_for(*id))),
    )
    .map_err(|e| e.to_string())?;
    Ok(tera)
});

fn template_name(renderer: RendererId) -> String {
    format!("{}.md", renderer.as_str())
}

fn context(summary: &StructuredSummary, report_title: &str) -> Result<Context, ExportError> {
    let mut context = Context::from_value(summary.to_value())
        .map_err(|e| ExportError::TemplateRender(e.to_string()))?;
    context.insert("report_title", report_title);
    Ok(context)
}

/// Render a summary with the built-in template for `renderer`.
pub fn render_summary(
    renderer: RendererId,
    report_title: &str,
    summary: &StructuredSummary,
) -> Result<String, ExportError> {
    let tera = BUILTIN
        .as_ref()
        .map_err(|e| ExportError::TemplateParse(e.clone()))?;
    let name = template_name(renderer);
    debug!(template = %name, "rendering summary");
    Ok(tera.render(&name, &context(summary, report_title)?)?)
}
