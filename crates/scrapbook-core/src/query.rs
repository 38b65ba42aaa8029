//! List query composition: search text, date range, favorites, and sort.
//!
//! The [`QueryController`] holds every filter dimension at once. Each change
//! returns the full composed [`EntryQuery`] so the caller issues exactly one
//! list fetch, and no dimension is lost when another one changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::non_blank;

/// Field the backend sorts the list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Title,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "title" => Ok(Self::Title),
            other => Err(format!("unknown sort field '{other}' (expected date or title)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one list fetch. Unset fields are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryQuery {
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
    pub favorites_only: bool,
}

impl EntryQuery {
    /// Query-string pairs in the backend's parameter names.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(start_date) = &self.start_date {
            pairs.push(("startDate", start_date.clone()));
        }
        if let Some(end_date) = &self.end_date {
            pairs.push(("endDate", end_date.clone()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sort_by", sort_by.as_str().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sort_order", sort_order.as_str().to_string()));
        }
        if self.favorites_only {
            pairs.push(("favoritesOnly", "true".to_string()));
        }
        pairs
    }

    /// True when no parameter would be sent.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.to_query_pairs().is_empty()
    }
}

/// Current filter and sort selection of the entry list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryController {
    search: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    sort_by: Option<SortKey>,
    sort_order: Option<SortOrder>,
    favorites_only: bool,
}

impl QueryController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The composed query for the current selection.
    #[must_use]
    pub fn query(&self) -> EntryQuery {
        EntryQuery {
            search: self.search.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            favorites_only: self.favorites_only,
        }
    }

    /// Set search text and both date bounds together. Blank values unset them.
    pub fn apply_search(
        &mut self,
        search: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> EntryQuery {
        self.search = non_blank(search);
        self.start_date = non_blank(start_date);
        self.end_date = non_blank(end_date);
        self.query()
    }

    /// Change only the search text, keeping the date range.
    pub fn set_search_text(&mut self, search: Option<String>) -> EntryQuery {
        self.search = non_blank(search);
        self.query()
    }

    /// Change only the date range, keeping the search text.
    pub fn set_date_range(
        &mut self,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> EntryQuery {
        self.start_date = non_blank(start_date);
        self.end_date = non_blank(end_date);
        self.query()
    }

    /// Sort-button behavior: the active field flips order, another field
    /// starts ascending.
    pub fn click_sort(&mut self, key: SortKey) -> EntryQuery {
        let order = if self.sort_by == Some(key) {
            self.sort_order.unwrap_or(SortOrder::Asc).flipped()
        } else {
            SortOrder::Asc
        };
        self.set_sort(key, order)
    }

    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) -> EntryQuery {
        self.sort_by = Some(key);
        self.sort_order = Some(order);
        self.query()
    }

    pub fn toggle_favorites_only(&mut self) -> EntryQuery {
        self.favorites_only = !self.favorites_only;
        self.query()
    }

    /// Reset search text and dates. Favorites and sort are kept.
    pub fn clear_search(&mut self) -> EntryQuery {
        self.search = None;
        self.start_date = None;
        self.end_date = None;
        self.query()
    }

    /// Back to the unfiltered, unsorted list.
    pub fn reset(&mut self) -> EntryQuery {
        *self = Self::default();
        self.query()
    }

    /// Whether any text or date filter is set.
    #[must_use]
    pub const fn has_search_filters(&self) -> bool {
        self.search.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub fn date_range(&self) -> (Option<&str>, Option<&str>) {
        (self.start_date.as_deref(), self.end_date.as_deref())
    }

    #[must_use]
    pub const fn sort(&self) -> Option<(SortKey, SortOrder)> {
        match (self.sort_by, self.sort_order) {
            (Some(key), Some(order)) => Some((key, order)),
            (Some(key), None) => Some((key, SortOrder::Asc)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn favorites_only(&self) -> bool {
        self.favorites_only
    }
}
