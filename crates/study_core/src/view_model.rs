use crate::{
    Artifact, ArtifactId, ArtifactSummary, Domain, GenerationResult, InputMode, Notice,
    PanelState, Phase, VocabularyItem,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowView {
    pub domain: Domain,
    pub phase: Phase,
    /// Generate trigger enabled; false for the whole `Generating` duration.
    pub can_generate: bool,
    pub input_mode: Option<InputMode>,
    pub input_filename: Option<String>,
    pub result: Option<GenerationResult>,
    pub vocabulary: Vec<VocabularyItem>,
    pub notice: Option<Notice>,
    pub history: HistoryPanelView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryPanelView {
    pub state: PanelState,
    pub entries: Vec<ArtifactSummary>,
    pub selected: Option<SelectedArtifactView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedArtifactView {
    pub id: ArtifactId,
    /// `None` while the body is still loading.
    pub artifact: Option<Artifact>,
    pub editing_buffer: Option<String>,
    pub has_unsaved_changes: bool,
}
