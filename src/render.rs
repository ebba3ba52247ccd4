//! HTML page rendering.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::store::Professional;

const INDEX_TEMPLATE: &str = "index.html";

/// Template environment with the embedded pages.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

/// One table row as the template sees it.
#[derive(Debug, Serialize)]
struct Row<'a> {
    name: &'a str,
    profession: &'a str,
    years: String,
    /// Percent-encoded name for the delete action; absent for unnamed rows.
    delete_segment: Option<String>,
}

impl<'a> From<&'a Professional> for Row<'a> {
    fn from(p: &'a Professional) -> Self {
        Self {
            name: p.name.as_deref().unwrap_or_default(),
            profession: p.profession.as_deref().unwrap_or_default(),
            years: p
                .years_of_experience
                .map(|y| y.to_string())
                .unwrap_or_default(),
            delete_segment: p
                .name
                .as_deref()
                .map(|name| urlencoding::encode(name).into_owned()),
        }
    }
}

impl Renderer {
    /// Build the environment. Templates ending in `.html` are auto-escaped.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        Ok(Self { env })
    }

    /// The listing page with the add form.
    pub fn index(&self, professionals: &[Professional]) -> Result<String, minijinja::Error> {
        let rows: Vec<Row<'_>> = professionals.iter().map(Row::from).collect();
        self.env
            .get_template(INDEX_TEMPLATE)?
            .render(context! { professionals => rows })
    }
}
