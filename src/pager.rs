//! Pagination controls for list pages: the compressed page-number sequence
//! ([`page_numbers`]), the links for each page ([`Links`]), and the
//! [`Pager`] that bundles them for templating.

use url::form_urlencoded;

/// One slot in the page-number sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Number(u32),

    /// Stands in for one or more skipped pages.
    Ellipsis,
}

/// Returns the page numbers to show for page `current` of `total`: the
/// first page, the last page, and every page within one of `current`, in
/// ascending order. An [`Slot::Ellipsis`] precedes each shown page that
/// isn't adjacent to the one before it.
pub fn page_numbers(current: u32, total: u32) -> Vec<Slot> {
    let mut slots = Vec::new();
    let mut previous: Option<u32> = None;
    for number in 1..=total {
        let shown = number == 1
            || number == total
            || (i64::from(number) - i64::from(current)).abs() <= 1;
        if !shown {
            continue;
        }
        if let Some(previous) = previous {
            if number - previous > 1 {
                slots.push(Slot::Ellipsis);
            }
        }
        slots.push(Slot::Number(number));
        previous = Some(number);
    }
    slots
}

/// Builds the URL for a given page of a list, carrying the list's filters.
#[derive(Clone, Debug)]
pub struct Links {
    /// The list's path, e.g. `/posts` or `/posts/category/sports`.
    path: String,

    /// Query parameters to carry over to every page, in order.
    params: Vec<(&'static str, String)>,
}

impl Links {
    pub fn new(path: &str) -> Links {
        Links {
            path: path.to_owned(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter to carry over to every page. `None` is skipped.
    pub fn with(mut self, key: &'static str, value: Option<String>) -> Links {
        if let Some(value) = value {
            self.params.push((key, value));
        }
        self
    }

    /// The URL for page `page`. The first page has no `page` parameter.
    pub fn href(&self, page: u32) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
        for (key, value) in &self.params {
            query.append_pair(key, value);
        }
        let query = query.finish();
        match query.is_empty() {
            true => self.path.clone(),
            false => format!("{}?{}", self.path, query),
        }
    }
}

/// A link in the pager.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Page {
        number: u32,
        href: String,
        active: bool,
    },
    Ellipsis,
}

/// The pagination control for one list page.
#[derive(Clone, Debug)]
pub struct Pager {
    /// The URL for the previous page, if any.
    pub prev: Option<String>,

    /// The URL for the next page, if any.
    pub next: Option<String>,

    pub items: Vec<Item>,
}

impl Pager {
    /// Builds the pager for page `current` of `total_pages`. Returns `None`
    /// when everything fits on one page.
    pub fn new(current: u32, total_pages: u32, links: &Links) -> Option<Pager> {
        if total_pages <= 1 {
            return None;
        }

        Some(Pager {
            prev: match current > 1 {
                true => Some(links.href(current - 1)),
                false => None,
            },
            next: match current < total_pages {
                true => Some(links.href(current + 1)),
                false => None,
            },
            items: page_numbers(current, total_pages)
                .into_iter()
                .map(|slot| match slot {
                    Slot::Number(number) => Item::Page {
                        number,
                        href: links.href(number),
                        active: number == current,
                    },
                    Slot::Ellipsis => Item::Ellipsis,
                })
                .collect(),
        })
    }
}
