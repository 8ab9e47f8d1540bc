use std::collections::BTreeMap;
use std::fmt;

use crate::{Domain, RequestId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(pub u64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// List entry; bodies are fetched lazily on selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub id: ArtifactId,
    pub filename: String,
    pub created_at: String,
}

/// A fully loaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: ArtifactId,
    pub domain: Domain,
    pub filename: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Listing,
    Viewing,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    id: ArtifactId,
    ticket: RequestId,
    /// Last content confirmed by the server; `None` while the body is loading.
    persisted: Option<String>,
    /// Uncommitted edits.
    buffer: Option<String>,
}

/// Local read cache for one domain's artifacts.
///
/// Mutations are applied only once the server acknowledged them; the pending
/// maps remember what each outstanding ticket asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCache {
    domain: Domain,
    open: bool,
    entries: Vec<ArtifactSummary>,
    selection: Option<Selection>,
    pending_list: Option<RequestId>,
    pending_saves: BTreeMap<RequestId, (ArtifactId, String)>,
    pending_removals: BTreeMap<RequestId, ArtifactId>,
    pending_downloads: BTreeMap<RequestId, ArtifactId>,
}

impl HistoryCache {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            open: false,
            entries: Vec::new(),
            selection: None,
            pending_list: None,
            pending_saves: BTreeMap::new(),
            pending_removals: BTreeMap::new(),
            pending_downloads: BTreeMap::new(),
        }
    }

    pub fn panel_state(&self) -> PanelState {
        match (&self.selection, self.open) {
            (_, false) => PanelState::Closed,
            (None, true) => PanelState::Listing,
            (Some(selection), true) if selection.buffer.is_some() => PanelState::Editing,
            (Some(_), true) => PanelState::Viewing,
        }
    }

    pub fn entries(&self) -> &[ArtifactSummary] {
        &self.entries
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected_id(&self) -> Option<ArtifactId> {
        self.selection.as_ref().map(|s| s.id)
    }

    /// The selected artifact, once its body has arrived.
    pub fn selected_artifact(&self) -> Option<Artifact> {
        let selection = self.selection.as_ref()?;
        let content = selection.persisted.clone()?;
        let summary = self.entries.iter().find(|entry| entry.id == selection.id);
        Some(Artifact {
            id: selection.id,
            domain: self.domain,
            filename: summary
                .map(|s| s.filename.clone())
                .unwrap_or_default(),
            content,
            created_at: summary
                .map(|s| s.created_at.clone())
                .unwrap_or_default(),
        })
    }

    pub fn editing_buffer(&self) -> Option<&str> {
        self.selection.as_ref()?.buffer.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| s.buffer.is_some() && s.buffer != s.persisted)
    }

    pub(crate) fn open(&mut self, ticket: RequestId) {
        self.open = true;
        self.pending_list = Some(ticket);
    }

    /// Closing drops the selection and forgets outstanding list/detail reads.
    /// Mutations stay tracked: the server applies them regardless.
    pub(crate) fn close(&mut self) {
        self.open = false;
        self.selection = None;
        self.pending_list = None;
    }

    pub(crate) fn refresh(&mut self, ticket: RequestId) {
        self.pending_list = Some(ticket);
    }

    /// Replace the entries with the server's list, in the server's order.
    pub(crate) fn apply_list(&mut self, ticket: RequestId, entries: Vec<ArtifactSummary>) -> bool {
        if self.pending_list != Some(ticket) {
            return false;
        }
        self.pending_list = None;
        self.entries = entries;
        true
    }

    pub(crate) fn fail_list(&mut self, ticket: RequestId) -> bool {
        if self.pending_list != Some(ticket) {
            return false;
        }
        self.pending_list = None;
        true
    }

    pub(crate) fn select(&mut self, id: ArtifactId, ticket: RequestId) {
        self.selection = Some(Selection {
            id,
            ticket,
            persisted: None,
            buffer: None,
        });
    }

    /// Apply a detail response. Only the most recent selection's ticket is
    /// honoured: older responses are stale even if they arrive last.
    pub(crate) fn apply_detail(
        &mut self,
        ticket: RequestId,
        id: ArtifactId,
        content: String,
    ) -> bool {
        match self.selection.as_mut() {
            Some(selection) if selection.ticket == ticket && selection.id == id => {
                selection.persisted = Some(content);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn fail_detail(&mut self, ticket: RequestId, id: ArtifactId) -> bool {
        let current = self
            .selection
            .as_ref()
            .is_some_and(|s| s.ticket == ticket && s.id == id);
        if current {
            self.selection = None;
        }
        current
    }

    pub(crate) fn begin_edit(&mut self) -> bool {
        match self.selection.as_mut() {
            Some(selection) if selection.buffer.is_none() => match &selection.persisted {
                Some(content) => {
                    selection.buffer = Some(content.clone());
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub(crate) fn edit(&mut self, text: String) -> bool {
        match self.selection.as_mut() {
            Some(Selection {
                buffer: Some(buffer),
                ..
            }) => {
                *buffer = text;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn cancel_edit(&mut self) -> bool {
        match self.selection.as_mut() {
            Some(selection) if selection.buffer.is_some() => {
                selection.buffer = None;
                true
            }
            _ => false,
        }
    }

    /// Snapshot the editing buffer for a save request.
    pub(crate) fn stage_save(&mut self, ticket: RequestId) -> Option<(ArtifactId, String)> {
        let selection = self.selection.as_ref()?;
        let content = selection.buffer.clone()?;
        self.pending_saves
            .insert(ticket, (selection.id, content.clone()));
        Some((selection.id, content))
    }

    /// Server acknowledged a save: the saved text becomes the persisted
    /// content. The buffer is released unless the user kept typing meanwhile.
    pub(crate) fn confirm_save(&mut self, ticket: RequestId) -> Option<ArtifactId> {
        let (id, content) = self.pending_saves.remove(&ticket)?;
        if let Some(selection) = self.selection.as_mut().filter(|s| s.id == id) {
            if selection.buffer.as_deref() == Some(content.as_str()) {
                selection.buffer = None;
            }
            selection.persisted = Some(content);
        }
        Some(id)
    }

    pub(crate) fn fail_save(&mut self, ticket: RequestId) -> Option<ArtifactId> {
        self.pending_saves.remove(&ticket).map(|(id, _)| id)
    }

    pub(crate) fn stage_removal(&mut self, ticket: RequestId, id: ArtifactId) {
        self.pending_removals.insert(ticket, id);
    }

    pub(crate) fn confirm_removal(&mut self, ticket: RequestId) -> Option<ArtifactId> {
        let id = self.pending_removals.remove(&ticket)?;
        self.entries.retain(|entry| entry.id != id);
        if self.selected_id() == Some(id) {
            self.selection = None;
        }
        Some(id)
    }

    pub(crate) fn fail_removal(&mut self, ticket: RequestId) -> Option<ArtifactId> {
        self.pending_removals.remove(&ticket)
    }

    pub(crate) fn stage_download(&mut self, ticket: RequestId, id: ArtifactId) {
        self.pending_downloads.insert(ticket, id);
    }

    pub(crate) fn finish_download(&mut self, ticket: RequestId) -> Option<ArtifactId> {
        self.pending_downloads.remove(&ticket)
    }

    /// Forget every outstanding ticket; late responses will be discarded.
    pub(crate) fn detach(&mut self) {
        self.close();
        self.pending_saves.clear();
        self.pending_removals.clear();
        self.pending_downloads.clear();
    }

    pub fn has_pending(&self) -> bool {
        self.pending_list.is_some()
            || !self.pending_saves.is_empty()
            || !self.pending_removals.is_empty()
            || !self.pending_downloads.is_empty()
            || self.selection.as_ref().is_some_and(|s| s.persisted.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: u64) -> ArtifactSummary {
        ArtifactSummary {
            id: ArtifactId(id),
            filename: format!("note_{id}.md"),
            created_at: "2024-05-01T10:00:00".to_string(),
        }
    }

    fn listed(ids: &[u64]) -> HistoryCache {
        let mut cache = HistoryCache::new(Domain::Notes);
        cache.open(1);
        assert!(cache.apply_list(1, ids.iter().copied().map(summary).collect()));
        cache
    }

    #[test]
    fn stale_list_response_is_ignored() {
        let mut cache = listed(&[1]);
        cache.refresh(5);
        assert!(!cache.apply_list(4, vec![summary(9)]));
        assert_eq!(cache.entries().len(), 1);
    }

    #[test]
    fn panel_state_follows_selection_and_buffer() {
        let mut cache = listed(&[1, 2]);
        assert_eq!(cache.panel_state(), PanelState::Listing);

        cache.select(ArtifactId(2), 2);
        assert_eq!(cache.panel_state(), PanelState::Viewing);
        assert!(!cache.begin_edit(), "body not loaded yet");

        assert!(cache.apply_detail(2, ArtifactId(2), "# two".into()));
        assert!(cache.begin_edit());
        assert_eq!(cache.panel_state(), PanelState::Editing);
        assert!(!cache.has_unsaved_changes());

        assert!(cache.edit("# two, revised".into()));
        assert!(cache.has_unsaved_changes());
        assert!(cache.cancel_edit());
        assert_eq!(cache.panel_state(), PanelState::Viewing);

        cache.close();
        assert_eq!(cache.panel_state(), PanelState::Closed);
        assert_eq!(cache.selected_id(), None);
    }

    #[test]
    fn save_confirmation_keeps_newer_edits() {
        let mut cache = listed(&[1]);
        cache.select(ArtifactId(1), 2);
        cache.apply_detail(2, ArtifactId(1), "v1".into());
        cache.begin_edit();
        cache.edit("v2".into());
        assert_eq!(cache.stage_save(3), Some((ArtifactId(1), "v2".to_string())));
        cache.edit("v3".into());

        assert_eq!(cache.confirm_save(3), Some(ArtifactId(1)));
        assert_eq!(
            cache.selected_artifact().map(|a| a.content),
            Some("v2".to_string())
        );
        assert_eq!(cache.editing_buffer(), Some("v3"));
    }

    #[test]
    fn detach_discards_everything_outstanding() {
        let mut cache = listed(&[1, 2]);
        cache.select(ArtifactId(1), 2);
        cache.stage_removal(3, ArtifactId(2));
        cache.detach();

        assert!(!cache.has_pending());
        assert!(!cache.apply_detail(2, ArtifactId(1), "late".into()));
        assert_eq!(cache.confirm_removal(3), None);
        assert_eq!(cache.entries().len(), 2);
    }
}
