//! Command-line front-end for TagNote.
//!
//! # Responsibility
//! - Run one subcommand against one note session.
//! - Keep output deterministic (tab-separated rows) for scripting.
//!
//! Storage comes from `TAGNOTE_STORAGE` / `TAGNOTE_DATA_PATH` / `TAGNOTE_SLOT`
//! unless `--backend` or `--data` override it. Setting `TAGNOTE_LOG_DIR`
//! (absolute path) enables rolling file logs.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tagnote_core::{
    default_log_level, init_logging, Note, NoteDraft, NoteId, NotesSession, SlotRepository,
    StorageBackend, StoreConfig, TagFilter, ALL_TAGS_LABEL,
};

const LOG_DIR_ENV: &str = "TAGNOTE_LOG_DIR";

/// tagnote - tag-organized notes kept in a single local slot
#[derive(Debug, Parser)]
#[command(name = "tagnote", version)]
struct Cli {
    /// Storage backend; defaults to `TAGNOTE_STORAGE`
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendKind>,

    /// Slot directory (file) or database path (sqlite)
    #[arg(long, value_name = "PATH", global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// List notes, most recently updated first
    List {
        /// Only notes carrying this tag (exact match)
        #[arg(long)]
        tag: Option<String>,
        /// Case-insensitive substring of title or body
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List tags in use
    Tags,
    /// Print one note
    Show { id: String },
    /// Create a note (title or body required)
    Add {
        #[command(flatten)]
        fields: DraftFields,
    },
    /// Update a note; omitted fields are kept
    Edit {
        id: String,
        #[command(flatten)]
        fields: DraftFields,
        /// Drop existing tags before adding `--tag` values
        #[arg(long)]
        clear_tags: bool,
    },
    /// Delete a note
    Delete { id: String },
    /// Print core linkage info
    Ping,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Tags => "tags",
            Self::Show { .. } => "show",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::Ping => "ping",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
struct DraftFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    body: Option<String>,
    /// Tag to attach; repeatable
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
}

fn main() {
    init_optional_logging();
    let cli = Cli::parse();

    let stdout = io::stdout();
    if let Err(err) = run(cli, &mut stdout.lock()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_optional_logging() {
    let Ok(log_dir) = std::env::var(LOG_DIR_ENV) else {
        return;
    };
    if let Err(err) = init_logging(default_log_level(), &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn resolve_config(backend: Option<BackendKind>, data: Option<PathBuf>) -> Result<StoreConfig, String> {
    let mut config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    let Some(kind) = backend else {
        if let Some(path) = data {
            config.backend = match config.backend {
                StorageBackend::Sqlite { .. } => StorageBackend::Sqlite { path },
                _ => StorageBackend::File { dir: path },
            };
        }
        return Ok(config);
    };

    config.backend = match (kind, data, config.backend) {
        (BackendKind::Memory, _, _) => StorageBackend::Memory,
        (BackendKind::File, Some(dir), _) | (BackendKind::File, None, StorageBackend::File { dir }) => {
            StorageBackend::File { dir }
        }
        (BackendKind::Sqlite, Some(path), _)
        | (BackendKind::Sqlite, None, StorageBackend::Sqlite { path }) => {
            StorageBackend::Sqlite { path }
        }
        (_, None, _) => return Err("--backend file|sqlite requires --data".to_string()),
    };
    Ok(config)
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), String> {
    if cli.command == Command::Ping {
        return write_out(
            out,
            &format!(
                "tagnote_core ping={}\ntagnote_core version={}\n",
                tagnote_core::ping(),
                tagnote_core::core_version()
            ),
        );
    }

    let config = resolve_config(cli.backend, cli.data)?;
    log::info!(
        "event=cli_run module=cli status=start command={} backend={}",
        cli.command.name(),
        config.backend.name()
    );
    let store = config.open_store().map_err(|err| err.to_string())?;
    let mut session = NotesSession::new(store);
    execute(&mut session, cli.command, out)
}

fn execute<R: SlotRepository>(
    session: &mut NotesSession<R>,
    command: Command,
    out: &mut impl Write,
) -> Result<(), String> {
    match command {
        Command::List { tag, search } => {
            let filter = tag
                .as_deref()
                .map(TagFilter::from_label)
                .unwrap_or_default();
            session.set_tag_filter(filter);
            session.set_search(search);
            for note in session.visible_notes() {
                write_out(out, &format_row(note))?;
            }
        }
        Command::Tags => {
            for tag in session.tags().iter().filter(|tag| *tag != ALL_TAGS_LABEL) {
                write_out(out, &format!("{tag}\n"))?;
            }
        }
        Command::Show { id } => {
            let id = NoteId::from(id);
            let note = session
                .store()
                .get(&id)
                .ok_or_else(|| format!("note `{id}` not found"))?;
            write_out(out, &format_detail(note))?;
        }
        Command::Add { fields } => {
            let mut draft = NoteDraft::default();
            apply_fields(&mut draft, fields, false);
            let note = session
                .save(draft.clamped(), None)
                .ok_or_else(|| "title or body is required".to_string())?;
            write_out(out, &format!("{}\n", note.id))?;
        }
        Command::Edit {
            id,
            fields,
            clear_tags,
        } => {
            let id = NoteId::from(id);
            let existing = session
                .store()
                .get(&id)
                .ok_or_else(|| format!("note `{id}` not found"))?;
            let mut draft = NoteDraft::from_note(existing);
            apply_fields(&mut draft, fields, clear_tags);
            let note = session
                .save(draft.clamped(), Some(&id))
                .ok_or_else(|| "title or body is required".to_string())?;
            write_out(out, &format!("{}\n", note.id))?;
        }
        Command::Delete { id } => {
            let id = NoteId::from(id);
            if !session.delete(&id) {
                return Err(format!("note `{id}` not found"));
            }
        }
        Command::Ping => {}
    }

    match session.store().last_persist_error() {
        Some(err) => Err(format!("changes kept in memory but not saved: {err}")),
        None => Ok(()),
    }
}

fn apply_fields(draft: &mut NoteDraft, fields: DraftFields, clear_tags: bool) {
    if let Some(title) = fields.title {
        draft.title = title;
    }
    if let Some(body) = fields.body {
        draft.body = body;
    }
    if clear_tags {
        draft.tags.clear();
    }
    for tag in &fields.tags {
        draft.add_tag(tag);
    }
}

fn format_row(note: &Note) -> String {
    format!(
        "{}\t{}\t{}\t{}\n",
        note.id,
        note.updated_at.map(|ms| ms.to_string()).unwrap_or_default(),
        note.display_title(),
        note.tags.join(",")
    )
}

fn format_detail(note: &Note) -> String {
    let body = if note.body.is_empty() {
        "No content."
    } else {
        note.body.as_str()
    };
    format!(
        "id: {}\ntitle: {}\ntags: {}\nupdated_at: {}\n\n{}\n",
        note.id,
        note.display_title(),
        note.tags.join(", "),
        note.updated_at.map(|ms| ms.to_string()).unwrap_or_default(),
        body
    )
}

fn write_out(out: &mut impl Write, text: &str) -> Result<(), String> {
    out.write_all(text.as_bytes())
        .map_err(|err| format!("failed to write output: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{execute, run, BackendKind, Cli, Command, DraftFields};
    use clap::Parser;
    use tagnote_core::{MemorySlotRepository, NoteStore, NotesSession};

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tagnote").chain(argv.iter().copied())).unwrap()
    }

    fn run_text(session: &mut NotesSession<MemorySlotRepository>, argv: &[&str]) -> String {
        let mut out = Vec::new();
        execute(session, parse(argv).command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_global_options_before_command() {
        let cli = parse(&["--data", "/tmp/n", "list", "--tag", "Work"]);
        assert_eq!(cli.data, Some("/tmp/n".into()));
        assert_eq!(cli.backend, None);
        assert_eq!(
            cli.command,
            Command::List {
                tag: Some("Work".to_string()),
                search: String::new(),
            }
        );
    }

    #[test]
    fn parses_repeated_tags_for_add() {
        let cli = parse(&["add", "--title", "T", "--tag", "a", "--tag", "b"]);
        assert_eq!(
            cli.command,
            Command::Add {
                fields: DraftFields {
                    title: Some("T".to_string()),
                    body: None,
                    tags: vec!["a".to_string(), "b".to_string()],
                }
            }
        );
    }

    #[test]
    fn parses_backend_after_subcommand() {
        let cli = parse(&["tags", "--backend", "sqlite"]);
        assert_eq!(cli.backend, Some(BackendKind::Sqlite));
    }

    #[test]
    fn rejects_unknown_command_and_missing_values() {
        let attempt = |argv: &[&str]| {
            Cli::try_parse_from(std::iter::once("tagnote").chain(argv.iter().copied()))
        };
        assert!(attempt(&["frobnicate"]).is_err());
        assert!(attempt(&["list", "--tag"]).is_err());
        assert!(attempt(&["show"]).is_err());
        assert!(attempt(&["edit"]).is_err());
        assert!(attempt(&["--backend", "cloud", "list"]).is_err());
    }

    #[test]
    fn add_edit_list_and_delete_through_session() {
        let mut session = NotesSession::new(NoteStore::load(MemorySlotRepository::new()));

        let id = run_text(
            &mut session,
            &["add", "--title", "Trip Plan", "--body", "Book flights", "--tag", "Travel"],
        );
        let id = id.trim().to_string();

        let listed = run_text(&mut session, &["list", "--search", "FLIGHT"]);
        assert!(listed.starts_with(&id));
        assert!(listed.contains("Trip Plan"));
        assert!(listed.trim_end().ends_with("Travel"));

        run_text(&mut session, &["edit", id.as_str(), "--clear-tags", "--tag", "Work"]);
        assert_eq!(run_text(&mut session, &["tags"]), "Work\n");
        let shown = run_text(&mut session, &["show", id.as_str()]);
        assert!(shown.contains("title: Trip Plan"));
        assert!(shown.contains("Book flights"));

        run_text(&mut session, &["delete", id.as_str()]);
        assert_eq!(run_text(&mut session, &["list"]), "");
    }

    #[test]
    fn add_without_title_or_body_fails() {
        let mut session = NotesSession::new(NoteStore::load(MemorySlotRepository::new()));
        let mut out = Vec::new();
        assert!(execute(&mut session, parse(&["add", "--tag", "x"]).command, &mut out).is_err());
    }

    #[test]
    fn file_backend_persists_between_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().to_str().unwrap().to_string();
        let invoke = |argv: &[&str]| {
            let mut full = vec!["--backend", "file", "--data", data.as_str()];
            full.extend_from_slice(argv);
            let mut out = Vec::new();
            run(parse(&full), &mut out).unwrap();
            String::from_utf8(out).unwrap()
        };

        let id = invoke(&["add", "--title", "Groceries", "--tag", "Personal"]);
        assert!(dir.path().join("notes.json").exists());

        let listed = invoke(&["list", "--tag", "Personal"]);
        assert!(listed.starts_with(id.trim()));
        assert_eq!(invoke(&["tags"]), "Personal\n");
    }

    #[test]
    fn memory_backend_override_starts_empty() {
        let mut out = Vec::new();
        run(parse(&["--backend", "memory", "list"]), &mut out).unwrap();
        assert!(out.is_empty());
    }
}
