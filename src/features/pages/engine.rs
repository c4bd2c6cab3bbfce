//! Template engine for the server-rendered pages, using Jinja2 syntax.

use std::path::Path;
use std::sync::OnceLock;

use minijinja::{Environment, Value};
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Template directory relative to the project root
const TEMPLATE_DIR: &str = "templates/pages";

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Initialize the template environment with all templates from the
/// templates directory. Called automatically on first render.
fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    let template_path = Path::new(TEMPLATE_DIR);
    if let Ok(entries) = std::fs::read_dir(template_path) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jinja") {
                let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                    continue;
                };
                if let Ok(content) = std::fs::read_to_string(&path) {
                    // Convert to 'static str by leaking (safe for long-lived templates)
                    let static_name: &'static str = Box::leak(name.clone().into_boxed_str());
                    let static_content: &'static str = Box::leak(content.into_boxed_str());
                    if let Err(e) = env.add_template(static_name, static_content) {
                        tracing::warn!("Failed to load template {}: {}", name, e);
                    } else {
                        tracing::debug!("Loaded template: {}", name);
                    }
                }
            }
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a page template with the given context.
pub fn render_page(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let env = get_environment();

    let template = env
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_missing_template() {
        let result = render_page("definitely_not_a_real_page.jinja", Value::UNDEFINED);
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }
}
