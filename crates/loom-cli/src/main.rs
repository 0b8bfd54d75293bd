use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use loom_editor_core::{Dictionary, Document, EditorConfig, HeadingLevel};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Loom - rich-text documents from the command line", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "LOOM_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Line, word and character counts
    Stats {
        /// Document file
        file: PathBuf,
    },
    /// Print the heading outline
    Outline {
        /// Document file
        file: PathBuf,
    },
    /// List every match of a pattern as line:column
    Find {
        /// Document file
        file: PathBuf,
        pattern: String,
    },
    /// Replace every occurrence of a pattern
    Replace {
        /// Document file
        file: PathBuf,
        pattern: String,
        replacement: String,

        /// Write the result here instead of overwriting the input
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Report unknown words with suggestions
    Spell {
        /// Document file
        file: PathBuf,

        /// Word list, one word per line
        #[arg(long)]
        dictionary: Option<PathBuf>,
    },
    /// Wrap a plain text file into a document
    Import {
        /// Plain UTF-8 text file
        source: PathBuf,

        /// Document file to create
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    init_miette()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => EditorConfig::load(&path.to_string_lossy())?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Commands::Stats { file } => stats(&file, &config),
        Commands::Outline { file } => outline(&file, &config),
        Commands::Find { file, pattern } => find(&file, &pattern, &config),
        Commands::Replace {
            file,
            pattern,
            replacement,
            output,
        } => replace(&file, &pattern, &replacement, output, &config),
        Commands::Spell { file, dictionary } => spell(&file, dictionary, &config),
        Commands::Import { source, output } => import(&source, &output, &config),
    }
}

fn open(file: &Path, config: &EditorConfig) -> Result<Document> {
    Ok(Document::load(file, config.document.clone())?)
}

fn stats(file: &Path, config: &EditorConfig) -> Result<()> {
    let doc = open(file, config)?;
    let content = doc.content();
    println!("lines: {}", doc.line_count());
    println!("words: {}", content.word_count());
    println!("chars: {}", content.len());
    println!("depth: {} ({} leaves)", content.depth(), content.leaf_count());
    println!("fonts: {}", doc.fonts().len());
    Ok(())
}

fn outline(file: &Path, config: &EditorConfig) -> Result<()> {
    let doc = open(file, config)?;
    let headings = doc.outline();
    if headings.is_empty() {
        println!("(no headings)");
    }
    for (level, line) in headings {
        let indent = "  ".repeat(level as usize - HeadingLevel::H1 as usize);
        println!("{indent}H{} {}: {}", level as u8, line + 1, doc.line_text(line));
    }
    Ok(())
}

fn find(file: &Path, pattern: &str, config: &EditorConfig) -> Result<()> {
    let mut doc = open(file, config)?;
    let count = doc.find(pattern);
    for m in doc.search().matches() {
        println!("{}:{}", m.line + 1, m.column + 1);
    }
    tracing::info!(count, "search finished");
    Ok(())
}

fn replace(
    file: &Path,
    pattern: &str,
    replacement: &str,
    output: Option<PathBuf>,
    config: &EditorConfig,
) -> Result<()> {
    if pattern.is_empty() {
        return Err(miette::miette!("pattern must not be empty"));
    }
    let mut doc = open(file, config)?;
    let count = doc.replace_all(pattern, replacement);
    match output {
        Some(path) => doc.save_as(&path)?,
        None => doc.save()?,
    }
    println!("replaced {count} occurrence(s)");
    Ok(())
}

fn spell(file: &Path, dictionary: Option<PathBuf>, config: &EditorConfig) -> Result<()> {
    let doc = open(file, config)?;
    let path = dictionary.unwrap_or_else(|| PathBuf::from(&config.dictionary.path));
    let mut dict = Dictionary::load_or_empty(&path, config.dictionary.language);
    if dict.is_empty() {
        println!("no dictionary loaded, nothing to check");
        return Ok(());
    }

    let unknown = doc.misspelled_words(&dict);
    for (at, word) in &unknown {
        let suggestions: Vec<String> = dict
            .suggest(word)
            .iter()
            .take(config.dictionary.max_suggestions)
            .map(ToString::to_string)
            .collect();
        println!(
            "{}:{} {} -> {}",
            at.line + 1,
            at.column + 1,
            word,
            suggestions.join(", ")
        );
    }
    tracing::info!(unknown = unknown.len(), "spellcheck finished");
    Ok(())
}

fn import(source: &Path, output: &Path, config: &EditorConfig) -> Result<()> {
    let text = std::fs::read_to_string(source).into_diagnostic()?;
    let mut doc = Document::from_text(&text, config.document.clone());
    doc.save_as(output)?;
    println!(
        "wrote {} ({} lines)",
        output.display(),
        doc.line_count()
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(3)
                .build(),
        )
    }))
    .map_err(|e| miette::miette!("couldn't set the miette hook: {e}"))?;
    miette::set_panic_hook();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_replace() {
        let cli = Cli::try_parse_from([
            "loom", "replace", "doc.loom", "teh", "the", "--output", "out.loom", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Replace {
                pattern,
                replacement,
                output,
                ..
            } => {
                assert_eq!(pattern, "teh");
                assert_eq!(replacement, "the");
                assert_eq!(output, Some(PathBuf::from("out.loom")));
            }
            _ => panic!("expected replace"),
        }
    }

    #[test]
    fn test_import_then_replace() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.txt");
        let doc_path = dir.path().join("doc.loom");
        let out_path = dir.path().join("out.loom");
        std::fs::write(&source, "teh cat\nteh dog\n").unwrap();

        let config = EditorConfig::default();
        import(&source, &doc_path, &config).unwrap();
        replace(&doc_path, "teh", "the", Some(out_path.clone()), &config).unwrap();

        let doc = Document::load(&out_path, config.document).unwrap();
        assert_eq!(doc.text(), "the cat\nthe dog\n");
    }
}
