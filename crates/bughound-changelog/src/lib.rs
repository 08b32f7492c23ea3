//! # bughound-changelog
//!
//! Fetches releases from the source-control hosting API and assembles them
//! into a navigable changelog document.
//!
//! The release API is an opaque collaborator: this crate consumes the
//! `{tag_name, name, published_at, body}` shape it returns and nothing else.
//! Release bodies arrive as free-form markdown written by many hands, so
//! assembly normalizes them with a single deterministic rewriting pass.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assemble;
mod client;

pub use assemble::{
    build_changelog, extract_latest_version, format_release, rewrite_body, update_changelog,
};
pub use client::{releases_since, ChangelogError, Release, ReleaseClient};
