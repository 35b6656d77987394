//! Step catalogs: ordered lists of remote operations run by the step runner.

use crate::config::UploadConfig;
use crate::context::RunContext;
use crate::step::{StepBuilder, StepDescriptor};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The five project bootstrap steps, in order.
const SETUP_STEPS: &[(&str, &str)] = &[
    ("Initialize Git Repository", "/setup/init_git"),
    ("Create .gitignore", "/setup/create_gitignore"),
    ("Create requirements.txt", "/setup/create_requirements"),
    ("Create Virtual Environment", "/setup/create_virtualenv"),
    ("Install Dependencies", "/setup/install_dependencies"),
];

/// An ordered catalog of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog name
    pub name: String,

    /// Description of what this catalog does
    #[serde(default)]
    pub description: Option<String>,

    /// Steps to execute, in order
    #[serde(default)]
    pub steps: Vec<StepDescriptor>,
}

impl Catalog {
    /// Create a new catalog with a name.
    pub fn new(name: &str) -> CatalogBuilder {
        CatalogBuilder::new(name)
    }

    /// Create an empty catalog.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            steps: Vec::new(),
        }
    }

    /// The project setup catalog.
    pub fn default_setup() -> Self {
        SETUP_STEPS
            .iter()
            .fold(
                Catalog::new("setup").description("Project bootstrap"),
                |builder, (title, endpoint)| builder.step(StepDescriptor::remote(title, endpoint)),
            )
            .build()
    }

    /// Build the upload catalog: one step per pending file, then aggregation.
    ///
    /// The upload endpoint template is rendered once per file with `file` and
    /// `project_id` bound; the resulting steps are dispatched verbatim.
    pub fn upload(project_id: &str, files: &[String], upload: &UploadConfig) -> Result<Self> {
        let mut ctx = RunContext::for_project(project_id);
        let mut builder = Catalog::new("upload").description("Input file upload");

        for file in files {
            ctx.set("file", Value::String(file.clone()));
            let endpoint = ctx.render(&upload.endpoint)?;
            builder = builder.add(
                StepDescriptor::remote(&format!("Upload {}", file), &endpoint).literal(),
            );
        }

        Ok(builder
            .add(StepDescriptor::remote(
                &upload.aggregate_title,
                &upload.aggregate_endpoint,
            ))
            .build())
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the catalog has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Give every step without an explicit id its 1-based position.
    pub(crate) fn assign_ids(&mut self) {
        for (index, step) in self.steps.iter_mut().enumerate() {
            if step.id == 0 {
                step.id = index + 1;
            }
        }
    }
}

/// Builder for creating catalogs.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    /// Create a new catalog builder.
    pub fn new(name: &str) -> Self {
        Self {
            catalog: Catalog::empty(name),
        }
    }

    /// Set the catalog description.
    pub fn description(mut self, desc: &str) -> Self {
        self.catalog.description = Some(desc.to_string());
        self
    }

    /// Add a step to the catalog.
    pub fn add<S: Into<StepDescriptor>>(mut self, step: S) -> Self {
        self.catalog.steps.push(step.into());
        self
    }

    /// Add a step builder (convenience).
    pub fn step(self, step: StepBuilder) -> Self {
        self.add(step.build())
    }

    /// Build the catalog, assigning ordinals to unnumbered steps.
    pub fn build(mut self) -> Catalog {
        self.catalog.assign_ids();
        self.catalog
    }
}

impl From<CatalogBuilder> for Catalog {
    fn from(builder: CatalogBuilder) -> Self {
        builder.build()
    }
}
