//! Minimal updates between two rendered lists.
//!
//! Polling replaces the merged list every few seconds. Rebuilding the whole
//! view each time would flicker and lose selection and scroll state, so after
//! the first population only the rows that actually changed are touched.

use fm_protocol::process_models::MergedProjectView;
use std::collections::HashMap;
use std::collections::HashSet;

/// Row-level changes from one sorted list to the next.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewPatch {
    /// Names that disappeared.
    pub removed: Vec<String>,
    /// Rows present in both lists whose content changed. Updated in place.
    pub updated: Vec<MergedProjectView>,
    /// New rows with their index in the new list, ascending.
    pub inserted: Vec<(usize, MergedProjectView)>,
}

impl ViewPatch {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.updated.is_empty() && self.inserted.is_empty()
    }

    /// Apply this patch to `rows`, the list it was computed from.
    ///
    /// Removals go first, then in-place updates, then insertions in ascending
    /// index order, which leaves `rows` equal to the new list.
    pub fn apply_to(&self, rows: &mut Vec<MergedProjectView>) {
        if !self.removed.is_empty() {
            let removed: HashSet<&str> = self.removed.iter().map(String::as_str).collect();
            rows.retain(|row| !removed.contains(row.name()));
        }

        for update in &self.updated {
            if let Some(row) = rows.iter_mut().find(|row| row.name() == update.name()) {
                *row = update.clone();
            }
        }

        for (index, view) in &self.inserted {
            let at = (*index).min(rows.len());
            rows.insert(at, view.clone());
        }
    }
}

/// Compute the patch that turns `previous` into `next`.
///
/// Both lists must be sorted by name, as produced by
/// [`reconcile`](crate::reconcile::reconcile).
pub fn diff(previous: &[MergedProjectView], next: &[MergedProjectView]) -> ViewPatch {
    let before: HashMap<&str, &MergedProjectView> =
        previous.iter().map(|view| (view.name(), view)).collect();
    let after: HashSet<&str> = next.iter().map(MergedProjectView::name).collect();

    let removed = previous
        .iter()
        .filter(|view| !after.contains(view.name()))
        .map(|view| view.name().to_string())
        .collect();

    let mut updated = Vec::new();
    let mut inserted = Vec::new();
    for (index, view) in next.iter().enumerate() {
        match before.get(view.name()) {
            Some(old) if *old != view => updated.push(view.clone()),
            Some(_) => {}
            None => inserted.push((index, view.clone())),
        }
    }

    ViewPatch {
        removed,
        updated,
        inserted,
    }
}

/// What the presentation layer must do to show a new list.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewDelta {
    /// Build the view from scratch.
    Rebuild(Vec<MergedProjectView>),
    /// Adjust the existing view.
    Patch(ViewPatch),
}

/// The list currently on screen, owned by the control thread.
#[derive(Debug, Clone, Default)]
pub struct RenderedView {
    rows: Vec<MergedProjectView>,
    populated: bool,
}

impl RenderedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[MergedProjectView] {
        &self.rows
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn find(&self, name: &str) -> Option<&MergedProjectView> {
        self.rows.iter().find(|row| row.name() == name)
    }

    /// Replace the rendered list with `next`.
    ///
    /// The first call yields a full rebuild; every later call yields a patch,
    /// possibly empty.
    pub fn apply(&mut self, next: Vec<MergedProjectView>) -> ViewDelta {
        if !self.populated {
            self.populated = true;
            self.rows = next.clone();
            return ViewDelta::Rebuild(next);
        }

        let patch = diff(&self.rows, &next);
        patch.apply_to(&mut self.rows);
        debug_assert_eq!(self.rows, next);
        ViewDelta::Patch(patch)
    }
}
