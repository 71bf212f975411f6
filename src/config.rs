//! Site configuration. Static settings live in a `pressroom.yaml` project
//! file; deployment settings (the backend URL, the image host, the allowed
//! development origins) come from the environment.

use crate::util::open;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const PROJECT_FILE: &str = "pressroom.yaml";

/// Origins allowed to make cross-origin requests when `ALLOWED_DEV_ORIGINS`
/// isn't set.
pub const DEFAULT_DEV_ORIGINS: &[&str] = &[
    "http://127.0.0.1:5173",
    "http://127.0.0.1:3000",
    "https://127.0.0.1:3000",
    "http://localhost:5173",
    "http://localhost:3000",
    "https://localhost:3000",
    "http://127.0.0.1",
    "http://localhost",
];

#[derive(Deserialize)]
struct PageSize(u32);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(9)
    }
}

#[derive(Deserialize)]
struct Seconds(u64);

fn default_revalidate() -> Seconds {
    Seconds(60)
}

fn default_request_timeout() -> Seconds {
    Seconds(30)
}

fn default_theme() -> PathBuf {
    PathBuf::from("theme")
}

/// A navigation link.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

#[derive(Deserialize)]
struct Project {
    site_domain: String,
    site_name: String,

    #[serde(default)]
    site_description: String,

    #[serde(default)]
    wordpress_url: Option<String>,

    #[serde(default = "default_theme")]
    theme_directory: PathBuf,

    #[serde(default)]
    posts_per_page: PageSize,

    #[serde(default = "default_revalidate")]
    revalidate_seconds: Seconds,

    #[serde(default = "default_request_timeout")]
    request_timeout_seconds: Seconds,

    #[serde(default)]
    main_nav: Vec<NavLink>,

    #[serde(default)]
    content_nav: Vec<NavLink>,
}

/// The site's identity and navigation, made available to every template.
#[derive(Clone, Debug)]
pub struct Site {
    /// The public origin of the site without a trailing slash, e.g.
    /// `https://example.org`.
    pub domain: String,
    pub name: String,
    pub description: String,
    pub main_nav: Vec<NavLink>,
    pub content_nav: Vec<NavLink>,
}

impl Site {
    /// The absolute URL for a site-relative `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.domain, path)
    }
}

/// The process environment variables that affect configuration.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    pub wordpress_url: Option<String>,
    pub wordpress_hostname: Option<String>,
    pub allowed_dev_origins: Option<String>,
}

impl Environment {
    pub fn from_process() -> Environment {
        let var = |name: &str| std::env::var(name).ok();
        Environment {
            wordpress_url: var("WORDPRESS_URL"),
            wordpress_hostname: var("WORDPRESS_HOSTNAME"),
            allowed_dev_origins: var("ALLOWED_DEV_ORIGINS"),
        }
    }
}

pub struct Config {
    pub site: Site,

    /// The WordPress install backing the site. `WORDPRESS_URL` wins over the
    /// project file.
    pub wordpress_url: Option<Url>,

    /// The only host featured images may be served from.
    pub image_host: Option<String>,

    pub allowed_dev_origins: Vec<String>,
    pub theme_directory: PathBuf,
    pub posts_per_page: u32,

    /// How long rendered pages may be served from a cache.
    pub revalidate: Duration,
    pub request_timeout: Duration,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its parents.
    pub fn from_directory(dir: &Path, env: &Environment) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, env)
                .map_err(|e| anyhow!("Loading configuration: {:?}", e))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, env),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, env: &Environment) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        Config::from_project(project, project_root, env)
    }

    fn from_project(project: Project, project_root: &Path, env: &Environment) -> Result<Config> {
        let wordpress_url = match env
            .wordpress_url
            .as_deref()
            .or(project.wordpress_url.as_deref())
        {
            Some(raw) => Some(
                Url::parse(unquote(raw))
                    .with_context(|| format!("parsing WordPress URL {:?}", raw))?,
            ),
            None => None,
        };

        Ok(Config {
            site: Site {
                domain: project.site_domain.trim_end_matches('/').to_owned(),
                name: project.site_name,
                description: project.site_description,
                main_nav: project.main_nav,
                content_nav: project.content_nav,
            },
            image_host: extract_hostname(env.wordpress_hostname.as_deref())
                .or_else(|| extract_hostname(wordpress_url.as_ref().map(Url::as_str))),
            wordpress_url,
            allowed_dev_origins: match &env.allowed_dev_origins {
                Some(raw) => parse_origins(raw),
                None => DEFAULT_DEV_ORIGINS.iter().map(|s| s.to_string()).collect(),
            },
            theme_directory: project_root.join(project.theme_directory),
            posts_per_page: project.posts_per_page.0.max(1),
            revalidate: Duration::from_secs(project.revalidate_seconds.0),
            request_timeout: Duration::from_secs(project.request_timeout_seconds.0),
        })
    }

    /// Where `/admin` redirects to, if a backend is configured.
    pub fn admin_url(&self) -> Option<String> {
        self.wordpress_url.as_ref().map(|url| {
            let base = url.as_str().trim_end_matches('/');
            format!("{}/wp-admin", base)
        })
    }

    /// Reports whether a featured image at `src` may be rendered: it must be
    /// an `http` or `https` URL on the configured image host.
    pub fn allows_image(&self, src: &str) -> bool {
        let host = match &self.image_host {
            Some(host) => host,
            None => return false,
        };
        match Url::parse(src) {
            Ok(url) => {
                matches!(url.scheme(), "http" | "https") && url.host_str() == Some(host.as_str())
            }
            Err(_) => false,
        }
    }
}

/// Trims whitespace and one pair of surrounding double quotes, as left
/// behind by some `.env` loaders.
fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    trimmed.strip_suffix('"').unwrap_or(trimmed)
}

/// Extracts a hostname from a URL or a bare hostname. Empty values yield
/// `None`; values that don't parse as URLs are returned as-is.
pub fn extract_hostname(raw: Option<&str>) -> Option<String> {
    let trimmed = unquote(raw?);
    match Url::parse(trimmed) {
        Ok(url) => url.host_str().map(str::to_owned),
        Err(_) => match trimmed.is_empty() {
            true => None,
            false => Some(trimmed.to_owned()),
        },
    }
}

/// Parses a comma-separated origin list.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
