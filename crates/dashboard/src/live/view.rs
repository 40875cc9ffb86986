//! Snapshots published by a live page.

use std::borrow::Cow;

use producthub_core::{FilterState, Product, ProductId, SortState};

use crate::services::Notice;

/// Descriptions longer than this are truncated in the table.
pub const DESCRIPTION_LIMIT: usize = 100;

/// Characters kept when a description is truncated.
pub const DESCRIPTION_PREVIEW: usize = 80;

/// Everything the views need to render a live page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    /// Show the loading indicator instead of the table body.
    pub loading: bool,
    /// Products in display order.
    pub rows: Vec<Product>,
    /// Row whose action menu is open.
    pub menu_open: Option<ProductId>,
    /// Whether an outside-click subscription is live.
    pub listening: bool,
    pub sort: Option<SortState>,
    /// Values currently shown in the filter inputs.
    pub filters: FilterState,
    /// Recent notices, oldest first.
    pub notices: Vec<Notice>,
}

impl PageView {
    /// Find a displayed product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.rows.iter().find(|p| p.id == Some(id))
    }

    /// Notices newer than `last_seen`.
    pub fn notices_after(&self, last_seen: u64) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |n| n.id > last_seen)
    }

    /// Id of the newest notice, or 0.
    #[must_use]
    pub fn latest_notice_id(&self) -> u64 {
        self.notices.last().map_or(0, |n| n.id)
    }
}

/// Shorten long descriptions for the table.
#[must_use]
pub fn truncate_description(description: &str) -> Cow<'_, str> {
    if description.chars().count() <= DESCRIPTION_LIMIT {
        return Cow::Borrowed(description);
    }
    let preview: String = description.chars().take(DESCRIPTION_PREVIEW).collect();
    Cow::Owned(format!("{preview}..."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NoticeKind;

    #[test]
    fn test_short_description_is_untouched() {
        let text = "a".repeat(100);
        assert!(matches!(truncate_description(&text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_long_description_is_truncated() {
        let text = "b".repeat(101);
        let shown = truncate_description(&text);
        assert_eq!(shown.len(), 83);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_truncation_counts_characters() {
        let text = "é".repeat(120);
        let shown = truncate_description(&text);
        assert_eq!(shown.chars().count(), 83);
    }

    #[test]
    fn test_notices_after() {
        let notice = |id| Notice {
            id,
            kind: NoticeKind::Success,
            message: format!("n{id}"),
        };
        let view = PageView {
            notices: vec![notice(1), notice(2), notice(3)],
            ..PageView::default()
        };

        let ids: Vec<u64> = view.notices_after(1).map(|n| n.id).collect();
        assert_eq!(ids, [2, 3]);
        assert_eq!(view.latest_notice_id(), 3);
        assert_eq!(PageView::default().latest_notice_id(), 0);
    }
}
