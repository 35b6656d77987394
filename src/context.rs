//! Run context: variables and status history for one catalog run.

use anyhow::{Context as _, Result};
use handlebars::{Handlebars, Template};
use serde_json::Value;
use std::collections::HashMap;

/// Execution context that holds run variables and status messages.
#[derive(Debug)]
pub struct RunContext {
    /// Named variables available to endpoint templates
    variables: HashMap<String, Value>,

    /// Status messages from each successful step, in order
    statuses: Vec<String>,

    /// Handlebars template engine (strict, no HTML escaping)
    handlebars: Handlebars<'static>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        Self {
            variables: HashMap::new(),
            statuses: Vec::new(),
            handlebars,
        }
    }

    /// Create a context bound to a project.
    pub fn for_project(project_id: &str) -> Self {
        let mut ctx = Self::new();
        ctx.set("project_id", Value::String(project_id.to_string()));
        ctx
    }

    /// Set a variable.
    pub fn set(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    /// Get a variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Record the status message of a completed step.
    pub fn push_status(&mut self, message: impl Into<String>) {
        self.statuses.push(message.into());
    }

    /// Most recent status message.
    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }

    /// All status messages.
    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    /// Render an endpoint, expanding `{{ ... }}` placeholders.
    ///
    /// Unknown variables are an error.
    pub fn render(&self, template: &str) -> Result<String> {
        self.handlebars
            .render_template(template, &self.variables)
            .with_context(|| format!("Failed to render endpoint template '{}'", template))
    }
}

/// Check that an endpoint template compiles.
pub fn check_template(template: &str) -> Result<()> {
    Template::compile(template)
        .map(|_| ())
        .with_context(|| format!("Invalid endpoint template '{}'", template))
}
