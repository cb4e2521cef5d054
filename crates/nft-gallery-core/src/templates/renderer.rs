//! Evaluation of parsed templates and the project-wide render pass.
//!
//! The renderer runs in **strict mode** by default: a reference to a parameter
//! that is not in the [`Params`] set is an error instead of rendering empty, so
//! a typo in a template surfaces at scaffold time rather than as a broken
//! generated file.

use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use super::syntax::{self, Cond, Expr, Node, TemplateError};
use crate::error::{GalleryError, Result};
use crate::params::Params;
use crate::store;

/// Template renderer for `.ejs` project files.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    strict: bool,
}

impl TemplateRenderer {
    /// Create a new renderer with strict mode enabled.
    pub fn new() -> Self {
        Self { strict: true }
    }

    /// Toggle strict mode. When off, unknown names render empty and are falsy.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Render a template string with the given parameters.
    pub fn render(&self, template: &str, params: &Params) -> std::result::Result<String, TemplateError> {
        let nodes = syntax::parse(template)?;
        let mut out = String::with_capacity(template.len());
        self.render_nodes(&nodes, params, &mut out)?;
        Ok(out)
    }

    /// Render one template file to its de-suffixed sibling and delete the
    /// source. Returns the written path.
    pub fn render_file(&self, path: &Path, params: &Params) -> Result<PathBuf> {
        let target = store::rendered_path(path).ok_or_else(|| GalleryError::Render {
            path: path.to_path_buf(),
            message: "not a template file".into(),
        })?;

        let source = std::fs::read_to_string(path)?;
        let rendered = self.render(&source, params).map_err(|e| GalleryError::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        std::fs::write(&target, rendered)?;
        std::fs::remove_file(path)?;
        tracing::debug!("rendered {} -> {}", path.display(), target.display());
        Ok(target)
    }

    /// Render every template file under `project_dir`.
    ///
    /// Files are independent; the first failure stops the pass and leaves
    /// already rendered files in place.
    pub fn render_all(&self, project_dir: &Path, params: &Params) -> Result<Vec<PathBuf>> {
        let templates = find_templates(project_dir)?;
        let mut rendered = Vec::with_capacity(templates.len());
        for path in &templates {
            rendered.push(self.render_file(path, params)?);
        }
        tracing::info!("rendered {} template files", rendered.len());
        Ok(rendered)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        params: &Params,
        out: &mut String,
    ) -> std::result::Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Output { expr, escape, line } => {
                    let value = self.eval(expr, params, *line)?;
                    let text = display(&value);
                    if *escape {
                        escape_html(&text, out);
                    } else {
                        out.push_str(&text);
                    }
                }
                Node::If {
                    branches,
                    otherwise,
                    line,
                } => {
                    let mut taken = None;
                    for branch in branches {
                        if self.test(&branch.cond, params, *line)? {
                            taken = Some(&branch.body);
                            break;
                        }
                    }
                    self.render_nodes(taken.unwrap_or(otherwise), params, out)?;
                }
            }
        }
        Ok(())
    }

    fn eval(&self, expr: &Expr, params: &Params, line: usize) -> std::result::Result<Value, TemplateError> {
        match expr {
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Var(name) => match params.get(name) {
                Some(value) => Ok(value.clone()),
                None if self.strict => {
                    Err(TemplateError::new(line, format!("`{name}` is not defined")))
                }
                None => Ok(Value::Null),
            },
        }
    }

    /// `&&` and `||` short-circuit: the right side is not looked up when the
    /// left side decides the result.
    fn test(
        &self,
        cond: &Cond,
        params: &Params,
        line: usize,
    ) -> std::result::Result<bool, TemplateError> {
        Ok(match cond {
            Cond::Truthy(expr) => truthy(&self.eval(expr, params, line)?),
            Cond::Not(inner) => !self.test(inner, params, line)?,
            Cond::Eq(a, b) => self.eval(a, params, line)? == self.eval(b, params, line)?,
            Cond::NotEq(a, b) => self.eval(a, params, line)? != self.eval(b, params, line)?,
            Cond::And(a, b) => self.test(a, params, line)? && self.test(b, params, line)?,
            Cond::Or(a, b) => self.test(a, params, line)? || self.test(b, params, line)?,
        })
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// All template files under `dir`, in a stable order.
pub fn find_templates(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && store::is_template(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
