mod analyze;
mod config;
mod document;
mod export;
mod metadata;
mod parser;
mod search;
mod stats;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::debug;

use config::{FormattingConfig, Settings};
use export::ExportFormat;
use metadata::{SceneChanges, SceneEntry};
use search::SearchOptions;

#[derive(Parser)]
#[command(name = "roteirista", about = "Screenplay classifier, formatter and converter")]
struct Cli {
    /// Page width in columns (overrides settings)
    #[arg(long, global = true)]
    page_width: Option<usize>,
    /// Upper-case lines shorter than this are character cues (overrides settings)
    #[arg(long, global = true)]
    character_width: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the element kind of every line
    Classify {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Lay the script out in screenplay columns
    Reformat {
        file: PathBuf,
        /// Replace the file instead of printing the result
        #[arg(short, long)]
        write: bool,
    },
    /// Convert scripts to HTML, Fountain or PDF
    Export {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long, value_enum, default_value = "html")]
        format: ExportFormat,
        /// Directory for the exported files (default: next to each script)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Convert a Fountain file into native script text
    Import {
        file: PathBuf,
        /// Write here instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Per-character and per-scene analysis with suggestions
    Analyze {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Word, line and page counts
    Stats {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List scenes with their line ranges and speakers
    Outline { file: PathBuf },
    /// Find occurrences of a term
    Search {
        file: PathBuf,
        term: String,
        #[arg(short, long)]
        case_sensitive: bool,
        #[arg(short, long)]
        whole_word: bool,
    },
    /// Replace every occurrence of a term
    Replace {
        file: PathBuf,
        term: String,
        replacement: String,
        #[arg(short, long)]
        case_sensitive: bool,
        #[arg(short = 'W', long)]
        whole_word: bool,
        /// Replace the file instead of printing the result
        #[arg(short, long)]
        write: bool,
    },
    /// Manage the character registry
    Character {
        #[command(subcommand)]
        action: CharacterCmd,
    },
    /// Manage the scene registry
    Scene {
        #[command(subcommand)]
        action: SceneCmd,
    },
    /// Show or replace the script's notes
    Notes {
        file: PathBuf,
        #[arg(long)]
        set: Option<String>,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsCmd,
    },
}

#[derive(Subcommand)]
enum CharacterCmd {
    List {
        file: PathBuf,
    },
    Add {
        file: PathBuf,
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Update {
        file: PathBuf,
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    Remove {
        file: PathBuf,
        name: String,
    },
}

#[derive(Subcommand)]
enum SceneCmd {
    List {
        file: PathBuf,
    },
    Add {
        file: PathBuf,
        title: String,
        #[arg(short, long, default_value = "")]
        location: String,
        #[arg(short, long, default_value = "")]
        time: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Update {
        file: PathBuf,
        title: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long)]
        time: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    Remove {
        file: PathBuf,
        title: String,
    },
}

#[derive(Subcommand)]
enum SettingsCmd {
    Show,
    Set { key: String, value: String },
    /// Print the settings file location
    Path,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let (page_width, character_width) = (cli.page_width, cli.character_width);
    // Only commands that lay text out read the settings file.
    let layout = || -> anyhow::Result<FormattingConfig> {
        formatting(&Settings::load()?, page_width, character_width)
    };

    let result = match cli.command {
        Commands::Classify { file, json } => {
            let text = document::load_script(&file)?;
            let lines = parser::lines::classify_lines(&text, &layout()?);
            if json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                for l in &lines {
                    println!("{:>4} {:<10} | {}", l.number, l.kind.tag(), l.text);
                }
            }
            Ok(())
        }
        Commands::Reformat { file, write } => {
            let text = document::load_script(&file)?;
            let formatted = parser::format::reformat(&text, &layout()?);
            if write {
                document::save_script(&file, &formatted)?;
                println!("Reformatted {}", file.display());
            } else {
                print!("{}", formatted);
            }
            Ok(())
        }
        Commands::Export {
            files,
            format,
            out_dir,
        } => {
            let stats = export::export_batch(&files, format, out_dir.as_deref(), &layout()?)?;
            println!(
                "Exported {} of {} script(s) to {}.",
                stats.ok,
                stats.total,
                format.extension()
            );
            if !stats.errors.is_empty() {
                bail!("{} export(s) failed", stats.errors.len());
            }
            Ok(())
        }
        Commands::Import { file, output } => {
            let fountain = document::load_script(&file)?;
            let lines = export::fountain::import(&fountain, &layout()?);
            let native = export::fountain::to_native(&fountain);
            match output {
                Some(out) => {
                    document::save_script(&out, &native)?;
                    println!("Imported {} lines into {}", lines.len(), out.display());
                }
                None => print!("{}", native),
            }
            Ok(())
        }
        Commands::Analyze { file, json } => {
            let text = document::load_script(&file)?;
            let lines = parser::lines::classify_lines(&text, &layout()?);
            let analysis = analyze::analyze(&lines);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
            Ok(())
        }
        Commands::Stats { file, json } => {
            let text = document::load_script(&file)?;
            let lines = parser::lines::classify_lines(&text, &layout()?);
            let meta = metadata::load_existing(&file)?;
            let s = stats::compute(&text, &lines, meta.as_ref());
            if json {
                println!("{}", serde_json::to_string_pretty(&s)?);
            } else {
                stats::print(&s);
            }
            Ok(())
        }
        Commands::Outline { file } => {
            let text = document::load_script(&file)?;
            let parsed = parser::parse_script(&text, &layout()?);
            if parsed.scenes.is_empty() {
                println!("No scene headings found.");
                return Ok(());
            }
            println!(
                "{:>3} | {:<36} | {:>9} | {:>5} | {}",
                "#", "Scene", "Span", "Lines", "Characters"
            );
            println!("{}", "-".repeat(88));
            for s in &parsed.scenes {
                println!(
                    "{:>3} | {:<36} | {:>4}-{:<4} | {:>5} | {}",
                    s.index,
                    truncate(&s.heading, 36),
                    s.first_line,
                    s.last_line,
                    s.line_count(),
                    s.characters.join(", ")
                );
            }
            println!(
                "\n{} scenes in {} lines",
                parsed.scenes.len(),
                parsed.lines.len()
            );
            Ok(())
        }
        Commands::Search {
            file,
            term,
            case_sensitive,
            whole_word,
        } => {
            let text = document::load_script(&file)?;
            let opts = SearchOptions {
                case_sensitive,
                whole_word,
            };
            let matches = search::find(&text, &term, opts)?;
            if matches.is_empty() {
                println!("No occurrences of '{}'", term);
                return Ok(());
            }
            let lines: Vec<&str> = text.split('\n').collect();
            for m in &matches {
                println!("{}:{}: {}", m.line, m.column, lines[m.line - 1].trim_end());
            }
            println!("\n{} occurrence(s)", matches.len());
            Ok(())
        }
        Commands::Replace {
            file,
            term,
            replacement,
            case_sensitive,
            whole_word,
            write,
        } => {
            let text = document::load_script(&file)?;
            let opts = SearchOptions {
                case_sensitive,
                whole_word,
            };
            let (replaced, count) = search::replace_all(&text, &term, &replacement, opts)?;
            if count == 0 {
                println!("No occurrences of '{}'", term);
            } else if write {
                document::save_script(&file, &replaced)?;
                println!("Replaced {} occurrence(s) of '{}' with '{}'", count, term, replacement);
            } else {
                print!("{}", replaced);
            }
            Ok(())
        }
        Commands::Character { action } => run_character(action, &layout),
        Commands::Scene { action } => run_scene(action),
        Commands::Notes { file, set } => {
            let mut meta = metadata::load(&file)?;
            match set {
                Some(notes) => {
                    meta.notes = notes.trim().to_string();
                    metadata::save(&file, &meta)?;
                    println!("Notes saved");
                }
                None if meta.notes.is_empty() => println!("No notes."),
                None => println!("{}", meta.notes),
            }
            Ok(())
        }
        Commands::Settings { action } => run_settings(action),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        debug!("Done in {}", format_duration(elapsed));
    }

    result
}

/// Settings layout with command-line overrides applied.
fn formatting(
    settings: &Settings,
    page_width: Option<usize>,
    character_width: Option<usize>,
) -> anyhow::Result<FormattingConfig> {
    let mut layout = settings.formatting();
    if let Some(w) = page_width {
        config::check_width("--page-width", w, 1)?;
        layout.page_width = w;
    }
    if let Some(w) = character_width {
        config::check_width("--character-width", w, 1)?;
        layout.character_width = w;
    }
    Ok(layout)
}

fn run_character<L>(action: CharacterCmd, layout: L) -> anyhow::Result<()>
where
    L: Fn() -> anyhow::Result<FormattingConfig>,
{
    match action {
        CharacterCmd::List { file } => {
            let meta = metadata::load(&file)?;
            if meta.characters.is_empty() {
                println!("No registered characters.");
            }
            for c in &meta.characters {
                println!("{:<24} {}", truncate(&c.name, 24), c.description);
            }
            if file.exists() {
                let text = document::load_script(&file)?;
                let lines = parser::lines::classify_lines(&text, &layout()?);
                let missing = meta.unregistered_cues(&lines);
                if !missing.is_empty() {
                    println!("\nSpeaking but not registered: {}", missing.join(", "));
                }
                let silent = meta.silent_characters(&lines);
                if !silent.is_empty() {
                    println!("Registered but never speaking: {}", silent.join(", "));
                }
            }
            Ok(())
        }
        CharacterCmd::Add {
            file,
            name,
            description,
        } => edit_metadata(&file, |meta| {
            meta.add_character(&name, &description)?;
            Ok(format!("Character added: {}", name.trim()))
        }),
        CharacterCmd::Update {
            file,
            name,
            rename,
            description,
        } => edit_metadata(&file, |meta| {
            meta.update_character(&name, rename.as_deref(), description.as_deref())?;
            Ok(format!("Character updated: {}", rename.as_deref().unwrap_or(&name).trim()))
        }),
        CharacterCmd::Remove { file, name } => edit_metadata(&file, |meta| {
            let removed = meta.remove_character(&name)?;
            Ok(format!("Character removed: {}", removed.name))
        }),
    }
}

fn run_scene(action: SceneCmd) -> anyhow::Result<()> {
    match action {
        SceneCmd::List { file } => {
            let meta = metadata::load(&file)?;
            if meta.scenes.is_empty() {
                println!("No registered scenes.");
            }
            for s in &meta.scenes {
                println!(
                    "{:<24} | {:<16} | {:<10} | {}",
                    truncate(&s.title, 24),
                    truncate(&s.location, 16),
                    truncate(&s.time, 10),
                    s.description
                );
            }
            Ok(())
        }
        SceneCmd::Add {
            file,
            title,
            location,
            time,
            description,
        } => edit_metadata(&file, |meta| {
            meta.add_scene(SceneEntry {
                title: title.clone(),
                location,
                time,
                description,
            })?;
            Ok(format!("Scene added: {}", title.trim()))
        }),
        SceneCmd::Update {
            file,
            title,
            rename,
            location,
            time,
            description,
        } => edit_metadata(&file, |meta| {
            let label = rename.clone().unwrap_or_else(|| title.clone());
            meta.update_scene(
                &title,
                SceneChanges {
                    title: rename,
                    location,
                    time,
                    description,
                },
            )?;
            Ok(format!("Scene updated: {}", label.trim()))
        }),
        SceneCmd::Remove { file, title } => edit_metadata(&file, |meta| {
            let removed = meta.remove_scene(&title)?;
            Ok(format!("Scene removed: {}", removed.title))
        }),
    }
}

/// Load the side-file, apply one change, and save only if it succeeded.
fn edit_metadata<F>(file: &Path, change: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut metadata::ScriptMetadata) -> anyhow::Result<String>,
{
    let mut meta = metadata::load(file)?;
    let message = change(&mut meta)?;
    metadata::save(file, &meta)?;
    println!("{}", message);
    Ok(())
}

fn run_settings(action: SettingsCmd) -> anyhow::Result<()> {
    match action {
        SettingsCmd::Show => {
            println!("{}", serde_json::to_string_pretty(&Settings::load()?)?);
        }
        SettingsCmd::Set { key, value } => {
            let path = config::settings_path()?;
            let mut settings = Settings::load_or_default(&path);
            settings.set(&key, &value)?;
            settings.save_to(&path)?;
            println!("{} = {}", key, value);
        }
        SettingsCmd::Path => {
            println!("{}", config::settings_path()?.display());
        }
    }
    Ok(())
}

fn print_analysis(a: &analyze::Analysis) {
    println!("Scenes:      {}", a.scene_count());
    println!("Characters:  {}", a.characters.len());
    println!("Dialogue:    {}", a.dialogue_count);
    println!("Action:      {}", a.action_count);
    println!("Transitions: {}", a.transition_count);
    println!("Notes:       {}", a.note_count);

    if !a.characters.is_empty() {
        println!("\n{:<24} | {:>8} | {:>10}", "Character", "Dialogue", "First line");
        println!("{}", "-".repeat(48));
        for c in &a.characters {
            println!(
                "{:<24} | {:>8} | {:>10}",
                truncate(&c.name, 24),
                c.dialogue_lines,
                c.first_line
            );
        }
    }

    if !a.scenes.is_empty() {
        println!("\n{:>3} | {:<40} | {:>5}", "#", "Scene", "Lines");
        println!("{}", "-".repeat(56));
        for s in &a.scenes {
            println!("{:>3} | {:<40} | {:>5}", s.index, truncate(&s.heading, 40), s.lines);
        }
    }

    if a.suggestions.is_empty() {
        println!("\nNo suggestions.");
    } else {
        println!("\n--- Suggestions ---");
        for s in &a.suggestions {
            println!("  - {}", s);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
