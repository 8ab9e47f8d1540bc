use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime};
use study_core::{ArtifactId, Domain, Msg, Notice, RawFile, VocabularyStatus};
use study_engine::{
    ApiClient, ApiGenerationClient, EngineHandle, NoteSummary, UnauthorizedHook,
};
use study_logging::study_info;

use crate::cli::Command;
use crate::config::{self, ClientConfig};
use crate::effects::EffectRunner;
use crate::session::Session;

pub fn run(command: Command, config: &ClientConfig, workdir: &Path) -> Result<()> {
    let api = connect(config, workdir)?;
    match command {
        Command::Generate {
            domain,
            text,
            file,
            known,
            unknown,
        } => generate(api, domain, text, file, known, unknown, workdir),
        Command::History { domain } => history(api, domain, workdir),
        Command::Show { domain, id } => show(api, domain, ArtifactId(id), workdir),
        Command::Edit { domain, id, file } => edit(api, domain, ArtifactId(id), &file, workdir),
        Command::Delete { domain, id } => delete(api, domain, ArtifactId(id), workdir),
        Command::Download {
            domain,
            id,
            out_dir,
        } => download(api, domain, ArtifactId(id), out_dir),
        Command::Notes => notes(&api),
        Command::Note { id } => note(&api, id),
        Command::EnhanceNote { id } => enhance_note(api, id),
        Command::Progress => progress(&api),
    }
}

fn connect(config: &ClientConfig, workdir: &Path) -> Result<Arc<ApiClient>> {
    let dir = workdir.to_path_buf();
    let on_unauthorized: UnauthorizedHook = Arc::new(move || config::report_unauthorized(&dir));
    if config.token.is_none() {
        study_info!("no token configured; requests are sent unauthenticated");
    }
    let api = ApiClient::new(config.engine_settings(), config.token.clone(), on_unauthorized)
        .with_context(|| format!("invalid API base url {:?}", config.base_url))?;
    Ok(Arc::new(api))
}

fn open_session(api: Arc<ApiClient>, domain: Domain, download_dir: PathBuf) -> Result<Session> {
    // Uploading a note takes three round trips.
    let timeout = api.settings().request_timeout * 3;
    let engine = EngineHandle::connect(api)?;
    Ok(Session::new(
        domain,
        EffectRunner::new(engine, download_dir),
        timeout,
    ))
}

fn generate(
    api: Arc<ApiClient>,
    domain: Domain,
    text: Option<String>,
    file: Option<PathBuf>,
    known: Vec<String>,
    unknown: Vec<String>,
    workdir: &Path,
) -> Result<()> {
    let input = match (text, file) {
        (Some(text), _) => Msg::TextEntered(text),
        (None, Some(path)) => Msg::FileChosen(read_file(&path)?),
        (None, None) => bail!("either --text or --file is required"),
    };
    let mut session = open_session(api, domain, workdir.to_path_buf())?;
    session.run(input)?;
    session.run(Msg::GenerateClicked)?;

    let choices = known
        .into_iter()
        .map(|word| (word, true))
        .chain(unknown.into_iter().map(|word| (word, false)));
    for (word, known) in choices {
        session.run(Msg::VocabularyChoice { word, known })?;
    }

    let view = session.state().view();
    if let Some(result) = &view.result {
        println!("{}", result.content);
        if let Some(id) = result.artifact_id {
            eprintln!("saved to {domain} history as #{id}");
        }
    }
    if !view.vocabulary.is_empty() {
        eprintln!("vocabulary:");
        for item in &view.vocabulary {
            eprintln!("  {:<20} {}", item.word, status_label(item.status));
        }
    }
    session.unmount();
    Ok(())
}

fn history(api: Arc<ApiClient>, domain: Domain, workdir: &Path) -> Result<()> {
    let mut session = open_session(api, domain, workdir.to_path_buf())?;
    session.run(Msg::HistoryOpened)?;
    let entries = session.state().view().history.entries;
    if entries.is_empty() {
        println!("no saved {domain} outputs");
    }
    for entry in entries {
        println!(
            "{:>6}  {:<16}  {}",
            entry.id.0,
            display_timestamp(&entry.created_at),
            entry.filename
        );
    }
    session.unmount();
    Ok(())
}

fn show(api: Arc<ApiClient>, domain: Domain, id: ArtifactId, workdir: &Path) -> Result<()> {
    let mut session = open_session(api, domain, workdir.to_path_buf())?;
    session.run(Msg::HistoryOpened)?;
    session.run(Msg::ArtifactSelected(id))?;
    let Some(artifact) = session.state().history().selected_artifact() else {
        bail!("artifact {id} could not be loaded");
    };
    if !artifact.filename.is_empty() {
        eprintln!(
            "{} ({})",
            artifact.filename,
            display_timestamp(&artifact.created_at)
        );
    }
    println!("{}", artifact.content);
    session.unmount();
    Ok(())
}

fn edit(
    api: Arc<ApiClient>,
    domain: Domain,
    id: ArtifactId,
    file: &Path,
    workdir: &Path,
) -> Result<()> {
    let content =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let mut session = open_session(api, domain, workdir.to_path_buf())?;
    let saved = replace_content(&mut session, id, content);
    if matches!(saved, Ok(false)) {
        eprintln!("artifact {id} already has this content");
    }
    report_notice(&session);
    session.unmount();
    saved.map(|_| ())
}

/// Select `id`, swap in `content` and save. `Ok(false)` when nothing changed.
fn replace_content(session: &mut Session, id: ArtifactId, content: String) -> Result<bool> {
    session.run(Msg::HistoryOpened)?;
    session.run(Msg::ArtifactSelected(id))?;
    session.dispatch(Msg::EditStarted);
    session.dispatch(Msg::EditChanged(content));
    if !session.state().history().has_unsaved_changes() {
        return Ok(false);
    }
    session.run(Msg::SaveClicked)?;
    Ok(true)
}

fn delete(api: Arc<ApiClient>, domain: Domain, id: ArtifactId, workdir: &Path) -> Result<()> {
    let mut session = open_session(api, domain, workdir.to_path_buf())?;
    session.run(Msg::HistoryOpened)?;
    session.run(Msg::DeleteClicked(id))?;
    report_notice(&session);
    session.unmount();
    Ok(())
}

fn download(api: Arc<ApiClient>, domain: Domain, id: ArtifactId, out_dir: PathBuf) -> Result<()> {
    let mut session = open_session(api, domain, out_dir)?;
    session.run(Msg::DownloadClicked(id))?;
    report_notice(&session);
    session.unmount();
    Ok(())
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    Ok(runtime.block_on(future))
}

fn notes(api: &ApiClient) -> Result<()> {
    let notes = block_on(api.notes())??;
    if notes.is_empty() {
        println!("no uploaded notes");
    }
    for note in notes {
        println!("{}", note_line(&note));
    }
    Ok(())
}

fn note_line(note: &NoteSummary) -> String {
    format!(
        "{:>6}  {:<16}  {:<12}  {}",
        note.id,
        display_timestamp(&note.created_at),
        note.category.as_deref().unwrap_or("-"),
        note.title
    )
}

fn note(api: &ApiClient, id: u64) -> Result<()> {
    let note = block_on(api.note(id))??;
    eprintln!(
        "{} ({})",
        note.title,
        note.file_type.as_deref().unwrap_or("text")
    );
    println!("{}", note.content);
    Ok(())
}

fn enhance_note(api: Arc<ApiClient>, id: u64) -> Result<()> {
    let client = ApiGenerationClient::new(api);
    let result = block_on(client.enhance_note(id))??;
    println!("{}", result.content);
    if let Some(artifact) = result.artifact_id {
        eprintln!("saved to {} history as #{artifact}", Domain::Notes);
    }
    Ok(())
}

fn progress(api: &ApiClient) -> Result<()> {
    let report = block_on(api.progress())??;
    println!("notes:           {}", report.total_notes);
    println!("total accesses:  {}", report.total_access);
    println!("average mastery: {:.1}", report.average_mastery);
    if !report.recent_notes.is_empty() {
        println!("recent:");
        for note in report.recent_notes {
            println!(
                "  {:<16}  {:>4}x  {}",
                display_timestamp(&note.last_accessed),
                note.access_count,
                note.title
            );
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<RawFile> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    Ok(RawFile::new(filename, bytes))
}

fn report_notice(session: &Session) {
    if let Some(Notice::Info(text)) = session.state().view().notice {
        eprintln!("{text}");
    }
}

fn status_label(status: VocabularyStatus) -> &'static str {
    match status {
        VocabularyStatus::Unknown => "-",
        VocabularyStatus::Known => "known",
        VocabularyStatus::NotKnown => "learning",
    }
}

/// Server timestamps are naive ISO-8601; fall back to the raw text.
fn display_timestamp(raw: &str) -> String {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}
