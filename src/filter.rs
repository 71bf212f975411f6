//! List filters. The content API only filters by numeric ID, while links
//! and forms carry either an ID or a human-readable slug. [`Selector`]
//! makes that distinction explicit at the boundary and [`resolve`] turns a
//! selector into the ID the API wants.

use crate::client::{ContentSource, Result};
use crate::model::{Record, Taxonomy};
use std::fmt;
use std::str::FromStr;

/// A filter value as it arrived in a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Id(u64),
    Slug(String),
}

impl Selector {
    /// Parses an optional raw query value. Empty values count as absent.
    pub fn parse(raw: Option<&str>) -> Option<Selector> {
        match raw.map(str::trim) {
            None | Some("") => None,
            Some(raw) => raw.parse().ok(),
        }
    }

    /// The slug to show as selected in the filter UI. IDs are mapped back to
    /// the slug of the matching record in `known`, falling back to the ID
    /// itself.
    pub fn ui_slug<R: Record>(&self, known: &[R]) -> String {
        match self {
            Selector::Slug(slug) => slug.clone(),
            Selector::Id(id) => known
                .iter()
                .find(|r| r.id() == *id)
                .map(|r| r.slug().to_owned())
                .unwrap_or_else(|| id.to_string()),
        }
    }
}

impl FromStr for Selector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Only plain digit strings are IDs; `parse::<u64>` alone would also
        // accept a leading `+`.
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = s.parse::<u64>() {
                return Ok(Selector::Id(id));
            }
        }
        Ok(Selector::Slug(s.to_owned()))
    }
}

impl fmt::Display for Selector {
    /// Displays a [`Selector`] in the form it arrived in, so links built
    /// from it carry the same value.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Selector::Id(id) => id.fmt(f),
            Selector::Slug(slug) => slug.fmt(f),
        }
    }
}

/// The kind of record a [`Selector`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Author,
    Term(Taxonomy),
}

/// Resolves `selector` to a record ID. IDs pass through. Slugs are looked
/// up in `known` first and then with a dedicated by-slug call; an unknown
/// slug resolves to `None`, which means "don't filter on this".
pub async fn resolve<R: Record>(
    source: &dyn ContentSource,
    kind: Kind,
    selector: &Selector,
    known: &[R],
) -> Result<Option<u64>> {
    let slug = match selector {
        Selector::Id(id) => return Ok(Some(*id)),
        Selector::Slug(slug) => slug,
    };

    if let Some(record) = known.iter().find(|r| r.slug() == slug) {
        return Ok(Some(record.id()));
    }

    Ok(match kind {
        Kind::Author => source.author_by_slug(slug).await?.map(|a| a.id),
        Kind::Term(taxonomy) => {
            source.term_by_slug(taxonomy, slug).await?.map(|t| t.id)
        }
    })
}
