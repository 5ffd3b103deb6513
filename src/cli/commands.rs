use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::models::Diagnostics;
use crate::output::{OutputConfig, is_inside};
use crate::pipeline::{Conversion, ConvertOptions, convert, find_session_files, read_sources};
use crate::render::{RenderOptions, format_timestamp};
use crate::tui::{Loader, run_preview};
use crate::utils::logging::{self, Verbosity};
use crate::utils::{default_sessions_dir, expand_tilde, format_path_with_tilde};

#[derive(Parser)]
#[command(name = "chatlog-md")]
#[command(version)]
#[command(about = "Convert Claude and Codex JSONL chat logs into Markdown", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert session logs into one timestamped Markdown file
    Convert {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Print the Markdown instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Browse, search and export the converted document interactively
    Preview {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show what a conversion would keep and skip
    Stats {
        #[command(flatten)]
        input: InputArgs,
        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Session file or directory [default: ~/.codex/sessions]
    #[arg(long, env = "CHATLOG_MD_PATH")]
    pub path: Option<PathBuf>,

    /// Glob for files under a directory path, relative to it
    #[arg(long, env = "CHATLOG_MD_PATTERN", default_value = "**/*.jsonl")]
    pub pattern: String,

    /// Keep system and unknown-role messages
    #[arg(long)]
    pub include_system: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Document title
    #[arg(long)]
    pub title: Option<String>,

    /// Maximum characters of tool output per block (0 keeps everything)
    #[arg(long, value_name = "N")]
    pub tool_output_limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Directory for generated Markdown files
    #[arg(long, env = "CHATLOG_MD_OUTDIR", default_value = "generatedMD")]
    pub outdir: PathBuf,

    /// File name prefix for generated Markdown files
    #[arg(long, env = "CHATLOG_MD_PREFIX", default_value = "ChatHistory")]
    pub prefix: String,
}

impl InputArgs {
    fn root(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(expand_tilde(path)),
            None => default_sessions_dir(),
        }
    }
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        let mut options = RenderOptions::default();
        if let Some(title) = &self.title {
            options.title = title.clone();
        }
        match self.tool_output_limit {
            Some(0) => options.tool_output_limit = None,
            Some(limit) => options.tool_output_limit = Some(limit),
            None => {}
        }
        options
    }
}

impl OutputArgs {
    fn config(&self) -> OutputConfig {
        OutputConfig::new(expand_tilde(&self.outdir), self.prefix.clone())
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Convert { input, render, output, stdout }) => {
            logging::init(verbosity);
            convert_command(&input, &render, &output, stdout)?;
        }
        Some(Commands::Preview { input, render, output }) => {
            // The previewer owns the screen; log lines only when RUST_LOG asks for them
            logging::init(Verbosity::Silent);
            preview_command(input, render, output)?;
        }
        Some(Commands::Stats { input, json }) => {
            logging::init(verbosity);
            stats_command(&input, json)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

/// A loaded batch plus how many files discovery found
struct Loaded {
    conversion: Conversion,
    files_found: usize,
}

fn load(root: &Path, pattern: &str, options: &ConvertOptions, outdir: Option<&Path>) -> Result<Loaded> {
    let mut files = find_session_files(root, pattern)?;
    if let Some(outdir) = outdir {
        files.retain(|file| !is_inside(file, outdir));
    }
    debug!("Reading {} files", files.len());

    let sources = read_sources(&files);
    Ok(Loaded { conversion: convert(&sources, options), files_found: files.len() })
}

fn print_no_files_tip(root: &Path) {
    eprintln!("No session files found at {}", format_path_with_tilde(root));
    eprintln!("Tip: use --path to point at a .jsonl file or a directory of session logs");
}

fn convert_command(input: &InputArgs, render: &RenderArgs, output: &OutputArgs, stdout: bool) -> Result<()> {
    let root = input.root()?;
    let options =
        ConvertOptions { render: render.options(), include_system: input.include_system, ..Default::default() };
    let config = output.config();

    let loaded = load(&root, &input.pattern, &options, Some(&config.dir))?;
    if loaded.files_found == 0 {
        print_no_files_tip(&root);
    }

    let conversion = loaded.conversion;
    if stdout {
        print!("{}", conversion.markdown);
        return Ok(());
    }

    let path = config.write(&conversion.markdown)?;
    let diagnostics = &conversion.diagnostics;
    println!("Wrote {}", format_path_with_tilde(&path));
    println!(
        "  {} messages from {} sources ({} records skipped)",
        diagnostics.messages_emitted,
        diagnostics.sources,
        diagnostics.skipped()
    );

    Ok(())
}

fn stats_command(input: &InputArgs, json: bool) -> Result<()> {
    let root = input.root()?;
    let options = ConvertOptions { include_system: input.include_system, ..Default::default() };

    let loaded = load(&root, &input.pattern, &options, None)?;
    if loaded.files_found == 0 && !json {
        print_no_files_tip(&root);
    }

    let conversion = loaded.conversion;
    if json {
        let text =
            serde_json::to_string_pretty(&conversion.diagnostics).context("Failed to serialize diagnostics")?;
        println!("{}", text);
        return Ok(());
    }

    print_stats(&root, &conversion);
    Ok(())
}

fn print_stats(root: &Path, conversion: &Conversion) {
    let Diagnostics {
        sources,
        passthrough_sources,
        records_parsed,
        lines_unparsable,
        records_unrecognized,
        records_filtered,
        records_empty,
        messages_emitted,
        segments_scrubbed_empty,
    } = conversion.diagnostics;

    println!("Chat Log Statistics");
    println!("===================");
    println!("Sources: {} ({} passed through verbatim)", sources, passthrough_sources);
    println!("Records parsed: {}", records_parsed);
    println!("Skipped: {}", lines_unparsable + records_unrecognized);
    println!("  Unparsable lines: {}", lines_unparsable);
    println!("  Unrecognized records: {}", records_unrecognized);
    println!("Filtered (system/unknown roles): {}", records_filtered);
    println!("Records without content: {}", records_empty);
    println!("Segments scrubbed to empty: {}", segments_scrubbed_empty);
    println!("Messages emitted: {}", messages_emitted);
    println!();
    println!("Input: {}", format_path_with_tilde(root));

    let messages = conversion.document.messages();
    if let Some(first) = messages.iter().find_map(|m| m.timestamp()) {
        println!("First message: {}", format_timestamp(Some(first)));
    }
    if let Some(last) = messages.iter().rev().find_map(|m| m.timestamp()) {
        println!("Last message: {}", format_timestamp(Some(last)));
    }
}

fn preview_command(input: InputArgs, render: RenderArgs, output: OutputArgs) -> Result<()> {
    let root = input.root()?;
    let render_options = render.options();
    let options =
        ConvertOptions { render: render_options.clone(), include_system: input.include_system, ..Default::default() };
    let config = output.config();

    let loaded = load(&root, &input.pattern, &options, Some(&config.dir))?;
    if loaded.files_found == 0 {
        print_no_files_tip(&root);
        return Ok(());
    }

    let outdir = config.dir.clone();
    let pattern = input.pattern.clone();
    let loader: Loader = Box::new(move || {
        load(&root, &pattern, &options, Some(&outdir)).map(|loaded| loaded.conversion)
    });

    run_preview(loaded.conversion, render_options, config, Some(loader))
}
