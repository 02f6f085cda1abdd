//! Command-line front end for texsurgeon.
//!
//! Usage:
//!   texsurgeon outline `<file>`                       - List sections with byte ranges
//!   texsurgeon find `<file>` `<name>`                 - Resolve a section name
//!   texsurgeon classify `<instruction>`               - Show the classified intent
//!   texsurgeon prompt `<file>` `<instruction>`        - Print the prompt that would be sent
//!   texsurgeon edit `<file>` `<instruction>`          - Run a surgical edit

mod http;

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use texsurgeon_config::Config;
use texsurgeon_engine::sections::section_boundaries;
use texsurgeon_engine::{
    EditRequest, EditResult, FixedResponse, PromptRequest, SurgicalEditor, TextGenerator,
    build_prompt, classify, parse_document, resolve_section,
};

use crate::http::OpenAiGenerator;

#[derive(Parser)]
#[command(name = "texsurgeon")]
#[command(version, about = "Surgical, instruction-driven edits to LaTeX documents", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/texsurgeon/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the sections of a document
    Outline {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Resolve a free-text section name
    Find { file: PathBuf, name: String },
    /// Classify an instruction
    Classify { instruction: String },
    /// Print the prompt an edit would send
    Prompt {
        file: PathBuf,
        instruction: String,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Apply an instruction to a document
    Edit(EditArgs),
}

#[derive(Args)]
struct SelectionArgs {
    /// Selected text; located in the document unless --range is given
    #[arg(long, value_name = "TEXT")]
    selection: Option<String>,

    /// Byte range of the selection, e.g. 120..180
    #[arg(long, value_name = "START..END", value_parser = parse_range)]
    range: Option<Range<usize>>,
}

#[derive(Args)]
struct EditArgs {
    file: PathBuf,
    instruction: String,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Use a captured response instead of calling the generation service
    #[arg(long, value_name = "PATH")]
    response_file: Option<PathBuf>,

    /// Write the edited document here instead of stdout
    #[arg(long, short = 'o', value_name = "PATH", conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(long)]
    in_place: bool,

    /// Print the full edit result as JSON
    #[arg(long)]
    json: bool,

    /// Reject edits that fail validation
    #[arg(long)]
    rollback: bool,

    /// Skip post-edit validation
    #[arg(long)]
    no_validate: bool,

    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

fn parse_range(value: &str) -> Result<Range<usize>, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {value:?}"))?;
    let start = start.trim().parse().map_err(|e| format!("bad start: {e}"))?;
    let end = end.trim().parse().map_err(|e| format!("bad end: {e}"))?;
    Ok(start..end)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutlineRow<'a> {
    level: u8,
    command: &'static str,
    title: &'a str,
    start: usize,
    end: usize,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

/// Returns `Ok(false)` when an edit was attempted but not applied.
async fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Outline { file, json } => outline(&file, json).map(|()| true),
        Command::Find { file, name } => {
            let text = read(&file)?;
            match resolve_section(&text, &name) {
                Some(boundary) => {
                    println!("{}", serde_json::to_string_pretty(&boundary)?);
                    Ok(true)
                }
                None => {
                    eprintln!("No section matches {name:?}");
                    Ok(false)
                }
            }
        }
        Command::Classify { instruction } => {
            println!("{}", serde_json::to_string_pretty(&classify(&instruction))?);
            Ok(true)
        }
        Command::Prompt {
            file,
            instruction,
            selection,
        } => {
            let text = read(&file)?;
            let intent = classify(&instruction);
            let selected = match (&selection.range, &selection.selection) {
                (Some(range), _) => Some(
                    text.get(range.clone())
                        .ok_or_else(|| anyhow!("range {range:?} is outside the document"))?,
                ),
                (None, Some(selected)) => Some(selected.as_str()),
                (None, None) => None,
            };
            let prompt = build_prompt(&PromptRequest {
                instruction: &instruction,
                selected_text: selected,
                editor_context: &text,
                target_section: intent.target_section.as_deref(),
                action: intent.action,
                insertion_point: intent.insertion_point,
            });
            println!("{prompt}");
            Ok(true)
        }
        Command::Edit(args) => {
            let config = match &cli.config {
                Some(path) => Config::load_from_path(path)?
                    .ok_or_else(|| anyhow!("config file {} not found", path.display()))?,
                None => Config::load_or_default()?,
            };
            edit(args, config).await
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn outline(file: &Path, json: bool) -> Result<()> {
    let text = read(file)?;
    let tree = parse_document(&text);
    let boundaries = section_boundaries(&text, &tree);

    let rows: Vec<OutlineRow> = tree
        .sections()
        .zip(&boundaries)
        .map(|((_, _, heading), boundary)| OutlineRow {
            level: heading.level,
            command: heading.command.name(),
            title: &heading.title,
            start: boundary.start_pos,
            end: boundary.end_pos,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!(
                "{}{} [{}..{}]",
                "  ".repeat(usize::from(row.level)),
                row.title,
                row.start,
                row.end
            );
        }
    }
    Ok(())
}

async fn edit(args: EditArgs, mut config: Config) -> Result<bool> {
    if let Some(retries) = args.retries {
        config.editor.max_retries = retries;
    }
    if args.rollback {
        config.editor.rollback_on_invalid = true;
    }
    if args.no_validate {
        config.editor.validation_enabled = false;
    }
    if let Some(model) = &args.model {
        config.generator.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.generator.base_url = base_url.clone();
    }

    let document = read(&args.file)?;
    let mut request = EditRequest::new(&document, &args.instruction);
    if let Some(selected) = &args.selection.selection {
        request = request.with_selected_text(selected);
    }
    if let Some(range) = &args.selection.range {
        request = request.with_selection_range(range.clone());
    }

    let result = match &args.response_file {
        Some(path) => {
            log::info!("Replaying response from {}", path.display());
            let generator = FixedResponse(read(path)?);
            perform(generator, config, request).await
        }
        None => {
            let generator = OpenAiGenerator::from_config(&config.generator)?;
            perform(generator, config, request).await
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    match &result {
        EditResult::Applied(applied) => {
            if let Some(validation) = &applied.metadata.validation {
                for issue in &validation.issues {
                    log::warn!("{issue}");
                }
            }
            let target = if args.in_place {
                Some(args.file.as_path())
            } else {
                args.output.as_deref()
            };
            match target {
                Some(path) => std::fs::write(path, &applied.new_document)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None if !args.json => print!("{}", applied.new_document),
                None => {}
            }
            Ok(true)
        }
        EditResult::Failed(failed) => {
            eprintln!("Edit not applied: {}", failed.error);
            Ok(false)
        }
    }
}

async fn perform<G: TextGenerator>(
    generator: G,
    config: Config,
    request: EditRequest<'_>,
) -> EditResult {
    let mut editor = SurgicalEditor::with_options(generator, config.editor);
    editor.perform_surgical_edit(request).await
}
