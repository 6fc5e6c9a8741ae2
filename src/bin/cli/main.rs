mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use studyplan_lib::document::Importance;

#[derive(Parser)]
#[command(name = "studyplan", about = "Study planner for vimwiki notes and glossaries", version)]
struct Cli {
    /// Config file (default: <data dir>/studyplan/studyplan.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Notes directory, overriding the config
    #[arg(long, global = true)]
    notes_dir: Option<PathBuf>,

    /// Glossary file, overriding the config
    #[arg(long, global = true)]
    glossary_file: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Show debug information
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Pick note sections to study
    Plan {
        /// Number of sections (default from config)
        #[arg(long)]
        sections: Option<usize>,
        /// Random selection instead of top scores
        #[arg(long)]
        randomize: bool,
        /// Don't favor high importance sections when randomizing
        #[arg(long)]
        no_focus_high: bool,
    },

    /// Pick glossary terms to study
    Terms {
        /// Number of terms (default from config)
        #[arg(long)]
        terms: Option<usize>,
        /// Only terms of this chapter
        #[arg(long)]
        chapter: Option<String>,
        /// Only terms of this exam importance (high, medium, low)
        #[arg(long)]
        importance: Option<String>,
        /// Only terms with a tag containing this text
        #[arg(long)]
        tag: Option<String>,
        /// Score-weighted random selection
        #[arg(long)]
        randomize: bool,
        /// Ignore the next assignment deadline
        #[arg(long)]
        no_deadline: bool,
    },

    /// Mark a note section as reviewed
    Review {
        /// Note file, with or without .wiki
        file: String,
        /// Section title
        section: String,
    },

    /// Mark a glossary term as reviewed
    ReviewTerm {
        /// Term name
        term: String,
        /// Change in mastery level (0-5 scale)
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        mastery_gain: i32,
    },

    /// Show study statistics
    Stats {
        /// Glossary terms instead of note sections
        #[arg(long)]
        glossary: bool,
    },

    /// List note sections that are new or due for review
    Due,

    /// Show upcoming assignments
    Deadlines {
        /// Also list the note sections due for review
        #[arg(long)]
        with_reviews: bool,
    },

    /// Glossary term configuration
    #[command(subcommand)]
    TermConfig(TermConfigCommand),
}

#[derive(Subcommand)]
enum TermConfigCommand {
    /// Generate a config covering every glossary term
    Generate {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a config against the glossary
    Validate {
        /// Config file
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.config.as_deref(), cli.notes_dir, cli.glossary_file)?;

    match cli.command {
        Command::Plan { sections, randomize, no_focus_high } => {
            commands::plan::run(&app, sections, randomize, !no_focus_high, &cli.format, use_color)?;
        }
        Command::Terms { terms, chapter, importance, tag, randomize, no_deadline } => {
            let importance = importance.as_deref().map(str::parse::<Importance>).transpose()?;
            let args = commands::terms::TermsArgs {
                terms,
                chapter,
                importance,
                tag,
                randomize,
                use_deadline: !no_deadline,
            };
            commands::terms::run(&app, args, &cli.format, use_color)?;
        }
        Command::Review { file, section } => {
            commands::review::run_section(&app, &file, &section, &cli.format, use_color)?;
        }
        Command::ReviewTerm { term, mastery_gain } => {
            commands::review::run_term(&app, &term, mastery_gain, &cli.format, use_color)?;
        }
        Command::Stats { glossary } => {
            commands::stats::run(&app, glossary, &cli.format, use_color)?;
        }
        Command::Due => {
            commands::due::run(&app, &cli.format, use_color)?;
        }
        Command::Deadlines { with_reviews } => {
            commands::deadlines::run(&app, with_reviews, &cli.format, use_color)?;
        }
        Command::TermConfig(TermConfigCommand::Generate { output }) => {
            commands::term_config::run_generate(&app, output.as_deref(), &cli.format, use_color)?;
        }
        Command::TermConfig(TermConfigCommand::Validate { path }) => {
            commands::term_config::run_validate(&app, &path, &cli.format, use_color)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
