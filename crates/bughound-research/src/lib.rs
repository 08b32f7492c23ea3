//! # bughound-research
//!
//! Enriches partner documentation pages with researched content from a
//! large-language-model completion API.
//!
//! The completion API is an opaque collaborator: one free-text prompt in,
//! one free-text completion out. The pipeline scrapes that completion with
//! fixed section-heading markers, so a model that deviates from the
//! requested headings silently yields empty sections rather than an error.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod enrich;
mod frontmatter;

pub use client::{CompletionClient, ResearchError};
pub use enrich::{
    brief_document, build_prompt, clean_citations, enhanced_document, ensure_bullets,
    extract_section, RESEARCH_SECTIONS,
};
pub use frontmatter::{read_partner_info, split_front_matter, Document, DocumentError};
