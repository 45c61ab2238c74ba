use crate::error::{error_chain, Error};
use crate::group::DayBucket;
use crate::library::Book;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

const BOOK_TEMPLATE: &str = "book";
const ANNOTATIONS_TEMPLATE: &str = "annotations";

const DEFAULT_BOOK: &str = include_str!("../templates/book.md.tera");
const DEFAULT_ANNOTATIONS: &str = include_str!("../templates/annotations.md.tera");

/// Renders book headers and imported highlights into markdown.
pub struct Renderer {
    templates: Tera,
}

impl Renderer {
    /// Renderer using the built-in templates.
    pub fn new() -> Result<Self, Error> {
        let mut templates = Tera::default();
        templates
            .add_raw_templates(vec![
                (BOOK_TEMPLATE, DEFAULT_BOOK),
                (ANNOTATIONS_TEMPLATE, DEFAULT_ANNOTATIONS),
            ])
            .map_err(template_error)?;

        Ok(Self::with_templates(templates))
    }

    /// Renderer using `book.md.tera` and `annotations.md.tera` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, Error> {
        debug!("Loading templates from {:?}", dir);

        let mut templates = Tera::default();
        templates
            .add_template_files(vec![
                (dir.join("book.md.tera"), Some(BOOK_TEMPLATE)),
                (dir.join("annotations.md.tera"), Some(ANNOTATIONS_TEMPLATE)),
            ])
            .map_err(template_error)?;

        Ok(Self::with_templates(templates))
    }

    fn with_templates(mut templates: Tera) -> Self {
        templates.register_filter("html_to_markdown", html_to_markdown);
        Self { templates }
    }

    pub fn render_book_header(&self, book: &Book) -> Result<String, Error> {
        let mut context = Context::new();
        context.insert("book", book);

        self.render(BOOK_TEMPLATE, book, &context)
    }

    pub fn render_annotations(
        &self,
        book: &Book,
        annotated_days: &[DayBucket<'_>],
        import_date: NaiveDateTime,
    ) -> Result<String, Error> {
        let mut context = Context::new();
        context.insert("book", book);
        context.insert("annotated_days", annotated_days);
        context.insert(
            "import_date",
            &import_date.format("%Y-%m-%d %H:%M:%S").to_string(),
        );

        self.render(ANNOTATIONS_TEMPLATE, book, &context)
    }

    fn render(&self, template: &str, book: &Book, context: &Context) -> Result<String, Error> {
        self.templates
            .render(template, context)
            .map_err(|e| Error::Render {
                book: book.title.clone(),
                reason: error_chain(&e),
            })
    }
}

fn template_error(e: tera::Error) -> Error {
    Error::Template {
        reason: error_chain(&e),
    }
}

/// Tera filter turning the e-reader's rich text into markdown.
fn html_to_markdown(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::String(html) => Ok(Value::String(html2md::parse_html(html).trim().to_string())),
        Value::Null => Ok(Value::String(String::new())),
        other => Err(tera::Error::msg(format!(
            "html_to_markdown expects a string, got {other}"
        ))),
    }
}
