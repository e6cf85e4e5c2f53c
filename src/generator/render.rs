//! Boundary to the template renderer and the artifact writer.
//!
//! An [`Emission`] bundles everything needed to produce one artifact: where it comes
//! from, where it goes, the template and its helper functions, and the data context.
//! Data contexts are built from ordered collections only, so rendering the same
//! input twice yields byte-identical output.

use crate::annotation::facts;
use crate::error::{GenerationError, Result};
use crate::serializer::write_to_file;
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use std::path::PathBuf;

/// Registers plugin-specific helper functions on a fresh renderer.
pub type HelperTable = fn(&mut Handlebars<'static>);

/// Everything the renderer needs for one artifact.
#[derive(Debug, Clone)]
pub struct Emission {
    /// Human-readable origin, e.g. `orders.OrderService`
    pub source_description: String,
    pub target_filename: PathBuf,
    pub template_name: &'static str,
    pub template_body: &'static str,
    pub helpers: HelperTable,
    pub data: serde_json::Value,
}

fn no_helpers(_: &mut Handlebars<'static>) {}

impl Emission {
    pub fn new(
        source_description: impl Into<String>,
        target_filename: PathBuf,
        template_name: &'static str,
        template_body: &'static str,
    ) -> Self {
        Self {
            source_description: source_description.into(),
            target_filename,
            template_name,
            template_body,
            helpers: no_helpers,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_helpers(mut self, helpers: HelperTable) -> Self {
        self.helpers = helpers;
        self
    }

    pub fn with_data<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.data = serde_json::to_value(data)?;
        Ok(self)
    }
}

/// Turns an emission into artifact text.
pub trait Renderer {
    fn render(&self, emission: &Emission) -> Result<String>;
}

/// Default renderer backed by Handlebars.
///
/// A new template registry is built for every emission; HTML escaping is off since
/// the output is source code.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsRenderer;

handlebars_helper!(first_upper: |s: str| facts::to_first_upper(s));
handlebars_helper!(first_lower: |s: str| facts::to_first_lower(s));
handlebars_helper!(uncapitalized: |s: str| facts::uncapitalized(s));
handlebars_helper!(snake_case: |s: str| facts::to_snake_case(s));

/// Helpers available to every template.
pub fn register_common_helpers(handlebars: &mut Handlebars<'static>) {
    handlebars.register_helper("first_upper", Box::new(first_upper));
    handlebars.register_helper("first_lower", Box::new(first_lower));
    handlebars.register_helper("uncapitalized", Box::new(uncapitalized));
    handlebars.register_helper("snake_case", Box::new(snake_case));
}

impl Renderer for HandlebarsRenderer {
    fn render(&self, emission: &Emission) -> Result<String> {
        let render_error = |message: String| GenerationError::Render {
            template: emission.template_name.to_string(),
            source_description: emission.source_description.clone(),
            target: emission.target_filename.clone(),
            message,
        };

        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        register_common_helpers(&mut handlebars);
        (emission.helpers)(&mut handlebars);

        handlebars
            .register_template_string(emission.template_name, emission.template_body)
            .map_err(|e| render_error(e.to_string()))?;
        handlebars
            .render(emission.template_name, &emission.data)
            .map_err(|e| render_error(e.to_string()))
    }
}

/// Writes a rendered artifact. Returns `false` when the file already held this content.
pub fn write_artifact(emission: &Emission, content: &str) -> Result<bool> {
    write_to_file(content, &emission.target_filename).map_err(|source| GenerationError::Write {
        target: emission.target_filename.clone(),
        source_description: emission.source_description.clone(),
        source,
    })
}
