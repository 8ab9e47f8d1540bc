use crate::history::HistoryCache;
use crate::vocabulary::{extract_with, LetterRunWords, WordSource};
use crate::{
    classify, ClientError, Effect, Msg, Notice, Phase, RawInput, RequestId, WorkflowState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(state: WorkflowState, msg: Msg) -> (WorkflowState, Vec<Effect>) {
    update_with(state, msg, &LetterRunWords)
}

/// Same as [`update`], with a caller-chosen vocabulary strategy.
pub fn update_with(
    mut state: WorkflowState,
    msg: Msg,
    words: &dyn WordSource,
) -> (WorkflowState, Vec<Effect>) {
    if !state.is_mounted() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::TextEntered(text) => {
            accept_input(&mut state, RawInput::Text(text));
            Vec::new()
        }
        Msg::FileChosen(file) => {
            accept_input(&mut state, RawInput::File(file));
            Vec::new()
        }
        Msg::GenerateClicked => match state.phase() {
            Phase::Generating => {
                state.fail(ClientError::ConcurrentRequest);
                Vec::new()
            }
            Phase::Idle => {
                state.fail(ClientError::Validation);
                Vec::new()
            }
            Phase::Generated => Vec::new(),
            Phase::InputReady => start_generation(&mut state),
        },
        Msg::ClearClicked => {
            if state.phase() == Phase::Generating {
                state.fail(ClientError::Busy);
            } else {
                state.reset();
            }
            Vec::new()
        }
        Msg::GenerationFinished { request_id, result } => {
            if !state.take_generation(request_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(result) => {
                    let vocabulary = if state.profile().extracts_vocabulary {
                        extract_with(words, &result.content)
                    } else {
                        Vec::new()
                    };
                    let persisted = result.artifact_id.is_some();
                    state.complete_generation(result, vocabulary);
                    let text = if persisted {
                        "generated and saved to history"
                    } else {
                        "generated"
                    };
                    state.notify(Notice::Info(text.to_string()));
                    if persisted && state.history().is_open() {
                        refresh_history(&mut state)
                    } else {
                        Vec::new()
                    }
                }
                Err(error) => {
                    state.abort_generation(error);
                    Vec::new()
                }
            }
        }
        Msg::VocabularyChoice { word, known } => {
            let word = word.trim().to_lowercase();
            if state.phase() != Phase::Generated || !state.has_word(&word) {
                state.fail(ClientError::UnknownWord(word));
                return (state, Vec::new());
            }
            let request_id = state.issue_ticket();
            state.stage_choice(request_id, word.clone(), known);
            vec![Effect::RecordVocabulary {
                request_id,
                word,
                known,
            }]
        }
        Msg::VocabularyRecorded { request_id, result } => {
            let Some((word, known)) = state.take_choice(request_id) else {
                return (state, Vec::new());
            };
            match result {
                Ok(()) => state.set_word_status(&word, known),
                Err(error) => state.fail(error),
            }
            Vec::new()
        }
        Msg::HistoryOpened => {
            let request_id = state.issue_ticket();
            state.history_mut().open(request_id);
            state.mark_dirty();
            vec![Effect::ListHistory {
                request_id,
                domain: state.domain(),
            }]
        }
        Msg::HistoryClosed => {
            if state.history().is_open() {
                state.history_mut().close();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::HistoryListed { request_id, result } => {
            match result {
                Ok(entries) => {
                    if state.history_mut().apply_list(request_id, entries) {
                        state.mark_dirty();
                    }
                }
                Err(error) => {
                    if state.history_mut().fail_list(request_id) {
                        state.fail(error);
                    }
                }
            }
            Vec::new()
        }
        Msg::ArtifactSelected(id) => {
            if !state.history().is_open() {
                return (state, Vec::new());
            }
            let request_id = state.issue_ticket();
            state.history_mut().select(id, request_id);
            state.mark_dirty();
            vec![Effect::FetchArtifact { request_id, id }]
        }
        Msg::ArtifactLoaded {
            request_id,
            id,
            result,
        } => {
            let history = state.history_mut();
            match result {
                Ok(content) => {
                    if history.apply_detail(request_id, id, content) {
                        state.mark_dirty();
                    }
                }
                Err(error) => {
                    if history.fail_detail(request_id, id) {
                        state.fail(error);
                    }
                }
            }
            Vec::new()
        }
        Msg::EditStarted => {
            mutate_history(&mut state, HistoryCache::begin_edit);
            Vec::new()
        }
        Msg::EditChanged(text) => {
            mutate_history(&mut state, |history| history.edit(text));
            Vec::new()
        }
        Msg::EditCancelled => {
            mutate_history(&mut state, HistoryCache::cancel_edit);
            Vec::new()
        }
        Msg::SaveClicked => {
            let request_id = state.issue_ticket();
            match state.history_mut().stage_save(request_id) {
                Some((id, content)) => vec![Effect::SaveArtifact {
                    request_id,
                    id,
                    content,
                }],
                None => Vec::new(),
            }
        }
        Msg::ArtifactSaved { request_id, result } => {
            match result {
                Ok(()) => {
                    if let Some(id) = state.history_mut().confirm_save(request_id) {
                        state.notify(Notice::Info(format!("saved artifact {id}")));
                    }
                }
                Err(error) => {
                    if state.history_mut().fail_save(request_id).is_some() {
                        state.fail(error);
                    }
                }
            }
            Vec::new()
        }
        Msg::DeleteClicked(id) => {
            let request_id = state.issue_ticket();
            state.history_mut().stage_removal(request_id, id);
            vec![Effect::DeleteArtifact { request_id, id }]
        }
        Msg::ArtifactRemoved { request_id, result } => {
            match result {
                Ok(()) => {
                    if let Some(id) = state.history_mut().confirm_removal(request_id) {
                        state.notify(Notice::Info(format!("deleted artifact {id}")));
                    }
                }
                Err(error) => {
                    if state.history_mut().fail_removal(request_id).is_some() {
                        state.fail(error);
                    }
                }
            }
            Vec::new()
        }
        Msg::DownloadClicked(id) => {
            let request_id = state.issue_ticket();
            state.history_mut().stage_download(request_id, id);
            vec![Effect::DownloadArtifact { request_id, id }]
        }
        Msg::ArtifactDownloaded { request_id, result } => {
            if state.history_mut().finish_download(request_id).is_some() {
                match result {
                    Ok(receipt) => state.notify(Notice::Info(format!(
                        "downloaded {} ({} bytes)",
                        receipt.filename, receipt.byte_len
                    ))),
                    Err(error) => state.fail(error),
                }
            }
            Vec::new()
        }
        Msg::Unmounted => {
            state.unmount();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn accept_input(state: &mut WorkflowState, raw: RawInput) {
    if state.phase() == Phase::Generating {
        state.fail(ClientError::Busy);
        return;
    }
    match classify(state.profile(), raw) {
        Ok(input) => state.set_input(input),
        Err(error) => state.fail(error),
    }
}

fn start_generation(state: &mut WorkflowState) -> Vec<Effect> {
    let Some(input) = state.input().cloned() else {
        state.fail(ClientError::Validation);
        return Vec::new();
    };
    if input.is_blank() {
        state.fail(ClientError::Validation);
        return Vec::new();
    }
    let request_id: RequestId = state.issue_ticket();
    state.begin_generation(request_id);
    vec![Effect::Generate {
        request_id,
        request: crate::GenerationRequest {
            domain: state.domain(),
            input,
        },
    }]
}

fn refresh_history(state: &mut WorkflowState) -> Vec<Effect> {
    let request_id = state.issue_ticket();
    state.history_mut().refresh(request_id);
    vec![Effect::ListHistory {
        request_id,
        domain: state.domain(),
    }]
}

fn mutate_history(state: &mut WorkflowState, change: impl FnOnce(&mut HistoryCache) -> bool) {
    if change(state.history_mut()) {
        state.mark_dirty();
    }
}
