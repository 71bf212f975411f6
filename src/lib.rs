//! The library code for the `pressroom` blog front-end. `pressroom` renders a
//! blog whose content lives in a WordPress install, reading everything over
//! the WordPress REST API on each request. The architecture can be broken
//! down into three steps:
//!
//! 1. Fetching records from the content API ([`crate::client`])
//! 2. Assembling views from those records ([`crate::listing`],
//!    [`crate::card`], [`crate::post`], [`crate::sitemap`])
//! 3. Rendering views through the theme's templates ([`crate::render`]) and
//!    serving them ([`crate::server`])
//!
//! The second step is the more involved. A list page resolves its filters
//! (which may arrive as slugs or numeric IDs, see [`crate::filter`]) to IDs
//! before requesting a page of posts, and every post on the page becomes a
//! card that needs three more lookups of its own. Cards tolerate failed
//! lookups; the list itself doesn't.
//!
//! Responses are marked cacheable for a configurable window, so a caching
//! proxy in front of `pressroom` absorbs most of the load on the backend.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod card;
pub mod client;
pub mod config;
pub mod escape;
pub mod filter;
pub mod listing;
pub mod model;
pub mod pager;
pub mod post;
pub mod render;
pub mod server;
pub mod share;
pub mod sitemap;
pub mod value;

mod util;

#[cfg(test)]
mod testing;
