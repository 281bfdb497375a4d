use std::{
    fs::OpenOptions,
    io,
    path::PathBuf,
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::{
    app::{self, program_view},
    domain::{SessionId, extract_sessions},
    error::CliError,
    grid::ProgramGrid,
    page::Page,
    settings::{Overrides, Settings},
    storage::{self, ProgramSource},
    table::Row,
};

#[derive(Parser, Debug)]
#[command(name = "eventpage")]
#[command(about = "Event program page for the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, global = true, help = "Program CSV path, or - for stdin")]
    program: Option<PathBuf>,

    #[arg(long, global = true, help = "Page layout JSON path")]
    page: Option<PathBuf>,

    #[arg(long, global = true, help = "Fixed number of sessions per grid row")]
    sessions_per_row: Option<String>,

    #[arg(long, global = true, help = "Layout columns, regardless of terminal width")]
    columns: Option<u16>,

    #[arg(long, short, global = true, help = "Log debug output")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Browse the page interactively (default)")]
    View,

    #[command(about = "Print the program grid as plain text")]
    Render {
        #[arg(long, default_value_t = 100, help = "Surface width in cells")]
        width: u16,

        #[arg(long, help = "Click a session before printing, e.g. 0-1")]
        open: Vec<SessionId>,
    },

    #[command(about = "Export the program sessions")]
    Export {
        #[arg(long, value_enum, help = "Export format")]
        format: ExportFormat,

        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,
    },

    #[command(about = "Show the effective settings")]
    Config {
        #[arg(long, help = "Also save them to the settings file")]
        write: bool,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum, help = "Shell type")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// One non-blank session, flattened with its row headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExport {
    pub id: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub mode: String,
    pub speaker: String,
    pub title: String,
    pub time: String,
    pub info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramExport {
    pub exported_at: DateTime<Utc>,
    pub source: String,
    pub sessions: Vec<SessionExport>,
}

pub fn collect_sessions(rows: &[Row]) -> Vec<SessionExport> {
    let mut sessions = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        for (slot, session) in extract_sessions(row).into_iter().enumerate() {
            if session.is_blank() {
                continue;
            }
            sessions.push(SessionExport {
                id: SessionId::new(row_index, slot).to_string(),
                year: row.get("year").to_string(),
                month: row.get("month").to_string(),
                day: session.day,
                mode: session.mode,
                speaker: session.speaker,
                title: session.title,
                time: session.time,
                info: session.info,
            });
        }
    }
    sessions
}

pub fn sessions_to_csv(sessions: &[SessionExport], delimiter: char) -> Result<String, CliError> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(CliError::Delimiter(delimiter))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for session in sessions {
        writer.serialize(session)?;
    }
    let bytes = writer.into_inner().map_err(|error| error.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn export_data(
    settings: &Settings,
    source: &dyn ProgramSource,
    format: ExportFormat,
    out_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let rows = storage::load_rows(source, settings.delimiter)?;
    let sessions = collect_sessions(&rows);
    tracing::info!(sessions = sessions.len(), "exporting program");

    let content = match format {
        ExportFormat::Json => {
            let export = ProgramExport {
                exported_at: Utc::now(),
                source: source.describe(),
                sessions,
            };
            serde_json::to_string_pretty(&export)?
        }
        ExportFormat::Csv => sessions_to_csv(&sessions, settings.delimiter)?,
    };

    if let Some(path) = out_path {
        storage::write_text_file(&path, &content)?;
        println!("Exported to {}", path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// The program grid for a surface `width` cells wide, after clicking each
/// of `open` in order.
pub fn render_program(
    settings: &Settings,
    source: &dyn ProgramSource,
    width: u16,
    open: &[SessionId],
) -> String {
    let mut program = ProgramGrid::new();
    program.load(
        source,
        settings.delimiter,
        &settings.layout_hints(width),
        &settings.unavailable_message,
    );
    for id in open {
        if !program.view().contains(*id) {
            tracing::warn!(session = %id, "no such session");
        }
        program.click(*id);
    }

    program_view::program_lines(&program, width, settings.column_width, None).to_plain_text()
}

fn show_config(settings: &Settings, write: bool) -> Result<(), CliError> {
    let path = storage::get_settings_path();
    if write {
        settings.save(&path)?;
        println!("Saved to {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

pub fn print_completions(shell: Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "eventpage", &mut io::stdout());
}

/// Interactive sessions log to a file so the alternate screen stays clean.
fn init_logging(verbose: bool, interactive: bool) {
    let default_level = match (verbose, interactive) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if !interactive {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
        return;
    }

    match OpenOptions::new()
        .create(true)
        .append(true)
        .open(storage::get_log_path())
    {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        Err(_) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

fn run_command(cli: Cli) -> Result<(), CliError> {
    let command = cli.command.unwrap_or(Command::View);
    init_logging(cli.verbose, matches!(command, Command::View));

    let mut settings = Settings::load_or_default(&storage::get_settings_path());
    Overrides {
        program: cli.program,
        page: cli.page,
        sessions_per_row: cli.sessions_per_row,
        columns: cli.columns,
    }
    .apply(&mut settings);

    match command {
        Command::View => {
            let page = Page::load_or_default(settings.page_path.as_deref());
            let source = storage::open_source(&settings.program_path)?;
            app::run_ui(settings, page, source.as_ref())?;
        }
        Command::Render { width, open } => {
            let source = storage::open_source(&settings.program_path)?;
            println!("{}", render_program(&settings, source.as_ref(), width, &open));
        }
        Command::Export { format, out } => {
            let source = storage::open_source(&settings.program_path)?;
            export_data(&settings, source.as_ref(), format, out)?;
        }
        Command::Config { write } => show_config(&settings, write)?,
        Command::Completions { shell } => print_completions(shell),
    }
    Ok(())
}

pub fn run_cli() {
    let cli = Cli::parse();
    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::MemorySource, table::parse_table};

    const PROGRAM: &str = "year;month;day1;mode1;speaker1;title1;time1;info1;day2;title2\n\
        2025;Marzo;Lun 3;Online;Rossi;\"Apertura; saluti\";18:00;Aula magna;Mar 4;Laboratorio\n\
        2025;Aprile;;;;;;;;\n";

    fn settings() -> Settings {
        Settings {
            sessions_per_row: Some("2".to_string()),
            column_width: 8,
            ..Settings::default()
        }
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "eventpage",
            "render",
            "--width",
            "80",
            "--open",
            "0-1",
            "--sessions-per-row",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.sessions_per_row.as_deref(), Some("3"));
        assert!(matches!(
            cli.command,
            Some(Command::Render { width: 80, ref open }) if open == &vec![SessionId::new(0, 1)]
        ));
    }

    #[test]
    fn test_cli_defaults_to_view() {
        let cli = Cli::try_parse_from(["eventpage"]).unwrap();
        assert!(cli.command.is_none());
        assert!(Cli::try_parse_from(["eventpage", "render", "--open", "x"]).is_err());
    }

    #[test]
    fn test_collect_sessions_skips_blank_slots() {
        let sessions = collect_sessions(&parse_table(PROGRAM, ';'));

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, "0-0");
        assert_eq!(sessions[0].title, "Apertura; saluti");
        assert_eq!(sessions[1].id, "0-1");
        assert_eq!(sessions[1].month, "Marzo");
    }

    #[test]
    fn test_csv_export_quotes_delimiter() {
        let sessions = collect_sessions(&parse_table(PROGRAM, ';'));
        let csv = sessions_to_csv(&sessions, ';').unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "id;year;month;day;mode;speaker;title;time;info");
        assert_eq!(
            lines[1],
            "0-0;2025;Marzo;Lun 3;Online;Rossi;\"Apertura; saluti\";18:00;Aula magna"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_export_rejects_wide_delimiter() {
        assert!(matches!(
            sessions_to_csv(&[], '§'),
            Err(CliError::Delimiter('§'))
        ));
    }

    #[test]
    fn test_render_program_with_open_session() {
        let source = MemorySource::new(PROGRAM);
        let text = render_program(&settings(), &source, 80, &[SessionId::new(0, 0)]);

        assert!(text.starts_with("2025    Marzo"));
        assert!(text.contains(" 18:00  Aula magna"));
    }

    #[test]
    fn test_render_program_unavailable() {
        let text = render_program(&settings(), &MemorySource::failing(), 80, &[]);
        assert_eq!(text, "Programma non disponibile.");
    }

    #[test]
    fn test_export_fails_on_missing_source() {
        let result = export_data(
            &settings(),
            &MemorySource::failing(),
            ExportFormat::Json,
            None,
        );
        assert!(matches!(result, Err(CliError::Fetch(_))));
    }
}
