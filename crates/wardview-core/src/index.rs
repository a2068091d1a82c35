//! Record index with incremental search.
//!
//! The index is an ordered list of sections, each with an ordered list of
//! subsections. Searching keeps a section when its own title or any of its
//! subsection titles contains the term (case-insensitive). A kept section
//! only carries the subsections that matched, whether it was kept for its
//! own title or for a subsection.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: String,
    pub title: String,
    #[serde(rename = "fecha", default)]
    pub date: Option<String>,
    #[serde(rename = "modificado", default)]
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(rename = "fecha", default)]
    pub date: Option<String>,
    #[serde(rename = "modificado", default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// Section with plain `(id, title)` subsections.
    pub fn with_subsections(id: &str, title: &str, subsections: &[(&str, &str)]) -> Self {
        Self {
            subsections: subsections
                .iter()
                .map(|(id, title)| Subsection {
                    id: id.to_string(),
                    title: title.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Self::new(id, title)
        }
    }
}

/// Filter sections by a search term.
///
/// An empty (or all-whitespace) term borrows the input unchanged.
pub fn filter_sections<'a>(sections: &'a [Section], term: &str) -> Cow<'a, [Section]> {
    let query = term.trim().to_lowercase();
    if query.is_empty() {
        return Cow::Borrowed(sections);
    }

    let filtered = sections
        .iter()
        .filter_map(|section| {
            let title_match = contains_ignore_case(&section.title, &query);
            let subsections: Vec<Subsection> = section
                .subsections
                .iter()
                .filter(|sub| contains_ignore_case(&sub.title, &query))
                .cloned()
                .collect();

            if title_match || !subsections.is_empty() {
                Some(Section {
                    subsections,
                    ..section.clone()
                })
            } else {
                None
            }
        })
        .collect::<Vec<_>>();

    Cow::Owned(filtered)
}

/// One selectable row of a rendered index: a section or one of its subsections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEntry<'a> {
    Section(&'a Section),
    Subsection(&'a Section, &'a Subsection),
}

impl<'a> IndexEntry<'a> {
    /// Anchor id to scroll to when the entry is chosen.
    pub fn anchor(&self) -> &'a str {
        match *self {
            IndexEntry::Section(section) => &section.id,
            IndexEntry::Subsection(_, sub) => &sub.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match *self {
            IndexEntry::Section(section) => &section.title,
            IndexEntry::Subsection(_, sub) => &sub.title,
        }
    }
}

/// Flatten sections into selectable rows (section, then its subsections).
pub fn flatten(sections: &[Section]) -> Vec<IndexEntry<'_>> {
    sections
        .iter()
        .flat_map(|section| {
            std::iter::once(IndexEntry::Section(section)).chain(
                section
                    .subsections
                    .iter()
                    .map(move |sub| IndexEntry::Subsection(section, sub)),
            )
        })
        .collect()
}
