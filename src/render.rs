//! Themes and page rendering. A theme directory holds a `theme.yaml` that
//! lists, for each view, the template files to concatenate; the result is
//! parsed as one `gtmpl` template, so a layout file can `{{template}}` blocks
//! that a view file `{{define}}`s.

use crate::config::Site;
use crate::util::open;
use gtmpl::{Template, Value};
use serde::Deserialize;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const THEME_FILE: &str = "theme.yaml";

#[derive(Deserialize)]
struct ThemeFile {
    listing_template: Vec<PathBuf>,
    post_template: Vec<PathBuf>,
    page_template: Vec<PathBuf>,
    error_template: Vec<PathBuf>,
}

/// The views a theme can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Listing,
    Post,
    Page,
    Error,
}

/// A loaded theme. Holds the concatenated template source for each view;
/// every render parses a fresh [`Template`] from it.
#[derive(Debug)]
pub struct Theme {
    listing: String,
    post: String,
    page: String,
    error: String,
}

impl Theme {
    /// Loads the theme in `dir`, checking that every view's template parses.
    pub fn from_directory(dir: &Path) -> Result<Theme> {
        let theme_file: ThemeFile = serde_yaml::from_reader(
            open(&dir.join(THEME_FILE), "theme").map_err(Error::OpenThemeFile)?,
        )?;

        let theme = Theme {
            listing: concat_templates(dir, &theme_file.listing_template)?,
            post: concat_templates(dir, &theme_file.post_template)?,
            page: concat_templates(dir, &theme_file.page_template)?,
            error: concat_templates(dir, &theme_file.error_template)?,
        };
        for view in &[View::Listing, View::Post, View::Page, View::Error] {
            theme.template(*view)?;
        }
        Ok(theme)
    }

    fn template(&self, view: View) -> Result<Template> {
        let source = match view {
            View::Listing => &self.listing,
            View::Post => &self.post,
            View::Page => &self.page,
            View::Error => &self.error,
        };
        let mut template = Template::default();
        template
            .parse(source)
            .map_err(|err| Error::ParseTemplate { view, err })?;
        Ok(template)
    }

    /// Renders `view` with `item` as its main value. The template also sees
    /// `site` (the site's identity and navigation) and `title` (the document
    /// title, already escaped).
    pub fn render(&self, view: View, site: &Site, title_html: &str, item: Value) -> Result<String> {
        use std::collections::HashMap;

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), item);
        m.insert("site".to_owned(), Value::from(site));
        m.insert("title".to_owned(), Value::String(title_html.to_owned()));

        let mut out: Vec<u8> = Vec::new();
        self.template(view)?
            .execute(&mut out, &gtmpl::Context::from(Value::Object(m))?)?;
        Ok(String::from_utf8(out)?)
    }
}

// Loads the template files relative to `dir` and concatenates them.
fn concat_templates(dir: &Path, files: &[PathBuf]) -> Result<String> {
    let mut contents = String::new();
    for file in files {
        let path = dir.join(file);
        open(&path, "template")
            .map_err(Error::OpenTemplateFile)?
            .read_to_string(&mut contents)
            .map_err(|err| Error::ReadTemplateFile { path, err })?;
        contents.push(' ');
    }
    Ok(contents)
}

/// The result of a fallible theme operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a theme or rendering a view.
#[derive(Debug)]
pub enum Error {
    /// Returned when `theme.yaml` can't be opened.
    OpenThemeFile(anyhow::Error),

    /// Returned when `theme.yaml` isn't valid.
    ThemeFile(serde_yaml::Error),

    /// Returned when a template file can't be opened.
    OpenTemplateFile(anyhow::Error),

    /// Returned for I/O problems while reading a template file.
    ReadTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned when a view's template doesn't parse.
    ParseTemplate { view: View, err: String },

    /// Returned for errors while executing a template.
    Template(String),

    /// Returned when a template produces invalid UTF-8.
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenThemeFile(err) => err.fmt(f),
            Error::ThemeFile(err) => write!(f, "Parsing theme file: {}", err),
            Error::OpenTemplateFile(err) => err.fmt(f),
            Error::ReadTemplateFile { path, err } => {
                write!(f, "Reading template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { view, err } => {
                write!(f, "Parsing {:?} template: {}", view, err)
            }
            Error::Template(err) => err.fmt(f),
            Error::Utf8(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenThemeFile(err) => Some(err.as_ref()),
            Error::ThemeFile(err) => Some(err),
            Error::OpenTemplateFile(err) => Some(err.as_ref()),
            Error::ReadTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate { view: _, err: _ } => None,
            Error::Template(_) => None,
            Error::Utf8(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator when decoding `theme.yaml`.
    fn from(err: serde_yaml::Error) -> Error {
        Error::ThemeFile(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    /// Converts a [`std::string::FromUtf8Error`] into an [`Error`]. This
    /// allows us to use the `?` operator on rendered output.
    fn from(err: std::string::FromUtf8Error) -> Error {
        Error::Utf8(err)
    }
}
