use std::collections::BTreeMap;

use crate::history::HistoryCache;
use crate::view_model::{HistoryPanelView, SelectedArtifactView, WorkflowView};
use crate::{
    ClientError, Domain, DomainProfile, GenerationResult, PendingInput, VocabularyItem,
    VocabularyStatus,
};

/// Ticket attached to every effect and echoed back by its completion.
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    InputReady,
    Generating,
    Generated,
}

/// Latest user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(ClientError),
}

/// Per-domain workflow controller state. Each domain owns its own instance;
/// nothing is shared across domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    domain: Domain,
    phase: Phase,
    input: Option<PendingInput>,
    result: Option<GenerationResult>,
    vocabulary: Vec<VocabularyItem>,
    next_request_id: RequestId,
    pending_generation: Option<RequestId>,
    pending_choices: BTreeMap<RequestId, (String, bool)>,
    history: HistoryCache,
    notice: Option<Notice>,
    mounted: bool,
    dirty: bool,
}

impl WorkflowState {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            phase: Phase::Idle,
            input: None,
            result: None,
            vocabulary: Vec::new(),
            next_request_id: 1,
            pending_generation: None,
            pending_choices: BTreeMap::new(),
            history: HistoryCache::new(domain),
            notice: None,
            mounted: true,
            dirty: false,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn profile(&self) -> &'static DomainProfile {
        self.domain.profile()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn input(&self) -> Option<&PendingInput> {
        self.input.as_ref()
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// True while any effect issued by this controller awaits its completion.
    pub fn has_pending_requests(&self) -> bool {
        self.pending_generation.is_some()
            || !self.pending_choices.is_empty()
            || self.history.has_pending()
    }

    pub fn view(&self) -> WorkflowView {
        let selected = self.history.selected_id().map(|id| SelectedArtifactView {
            id,
            artifact: self.history.selected_artifact(),
            editing_buffer: self.history.editing_buffer().map(str::to_string),
            has_unsaved_changes: self.history.has_unsaved_changes(),
        });
        WorkflowView {
            domain: self.domain,
            phase: self.phase,
            can_generate: self.phase == Phase::InputReady,
            input_mode: self.input.as_ref().map(PendingInput::mode),
            input_filename: self
                .input
                .as_ref()
                .and_then(PendingInput::filename)
                .map(str::to_string),
            result: self.result.clone(),
            vocabulary: self.vocabulary.clone(),
            notice: self.notice.clone(),
            history: HistoryPanelView {
                state: self.history.panel_state(),
                entries: self.history.entries().to_vec(),
                selected,
            },
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn history_mut(&mut self) -> &mut HistoryCache {
        &mut self.history
    }

    pub(crate) fn issue_ticket(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, error: ClientError) {
        self.notify(Notice::Error(error));
    }

    pub(crate) fn set_input(&mut self, input: PendingInput) {
        self.input = Some(input);
        self.result = None;
        self.vocabulary.clear();
        self.pending_choices.clear();
        self.phase = Phase::InputReady;
        self.dirty = true;
    }

    pub(crate) fn begin_generation(&mut self, ticket: RequestId) {
        self.pending_generation = Some(ticket);
        self.phase = Phase::Generating;
        self.notice = None;
        self.dirty = true;
    }

    /// Claims the generation ticket; `false` means the completion is stale.
    pub(crate) fn take_generation(&mut self, ticket: RequestId) -> bool {
        if self.pending_generation == Some(ticket) {
            self.pending_generation = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn complete_generation(
        &mut self,
        result: GenerationResult,
        vocabulary: Vec<VocabularyItem>,
    ) {
        self.result = Some(result);
        self.vocabulary = vocabulary;
        self.phase = Phase::Generated;
        self.dirty = true;
    }

    /// Failed generation returns to `InputReady` with the input untouched.
    pub(crate) fn abort_generation(&mut self, error: ClientError) {
        self.phase = Phase::InputReady;
        self.fail(error);
    }

    pub(crate) fn reset(&mut self) {
        self.input = None;
        self.result = None;
        self.vocabulary.clear();
        self.pending_choices.clear();
        self.phase = Phase::Idle;
        self.notice = None;
        self.dirty = true;
    }

    pub(crate) fn has_word(&self, word: &str) -> bool {
        self.vocabulary.iter().any(|item| item.word == word)
    }

    pub(crate) fn stage_choice(&mut self, ticket: RequestId, word: String, known: bool) {
        self.pending_choices.insert(ticket, (word, known));
    }

    pub(crate) fn take_choice(&mut self, ticket: RequestId) -> Option<(String, bool)> {
        self.pending_choices.remove(&ticket)
    }

    pub(crate) fn set_word_status(&mut self, word: &str, known: bool) {
        if let Some(item) = self.vocabulary.iter_mut().find(|item| item.word == word) {
            item.status = VocabularyStatus::from_choice(known);
            self.dirty = true;
        }
    }

    pub(crate) fn unmount(&mut self) {
        self.mounted = false;
        self.pending_generation = None;
        self.pending_choices.clear();
        self.history.detach();
        if self.phase == Phase::Generating {
            self.phase = Phase::InputReady;
        }
    }
}
