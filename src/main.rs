use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use cladekit::concordance::ConcordanceAnalysis;
use cladekit::legacy;
use cladekit::model::Tree;
use cladekit::newick::{self, DecorationMode, NewickStyle, ParseOptions};
use csv::WriterBuilder;
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Phylogenetic tree engine: node tables, clade queries and gene
/// concordance factors from Newick trees
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Compare clades as splits (clade or complement)
    #[arg(long, global = true)]
    unrooted: bool,

    /// How text after a closing parenthesis is interpreted
    #[arg(long, value_enum, default_value_t = DecorationMode::Infer, global = true)]
    decoration: DecorationMode,

    /// Output file, stdout if omitted
    #[arg(short, long, value_name = "OUTPUT", global = true)]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Gene concordance factor of every species tree node
    Concordance {
        /// File with the species tree
        #[arg(value_name = "SPECIES")]
        species: PathBuf,

        /// File with one gene tree per line
        #[arg(value_name = "GENES")]
        genes: PathBuf,

        /// Number of worker threads, all cores if omitted
        #[arg(long, value_name = "THREADS")]
        threads: Option<usize>,
    },

    /// Node table of a single tree as TSV
    Nodes {
        /// File with a single tree, `-` for stdin
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Write the ten-field legacy records
        #[arg(long)]
        legacy: bool,
    },

    /// Branch length of a node, `NA` if it has none
    BranchLength {
        /// File with a single tree, `-` for stdin
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Tip label, internal node name or synthetic label
        #[arg(value_name = "LABEL")]
        label: String,

        /// Scan the Newick text instead of building the node table
        #[arg(long)]
        scan: bool,
    },

    /// Rewrite a single tree in the given style
    Newick {
        /// File with a single tree, `-` for stdin
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        #[arg(long, value_enum, default_value_t = NewickStyle::Labeled)]
        style: NewickStyle,
    },
}

#[derive(Debug, Serialize)]
struct BranchLengthRow<'a> {
    node: &'a str,
    branch_length: &'a str,
}

// --------------------------------------------------
fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// --------------------------------------------------
fn run(cli: Cli) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .target(env_logger::Target::Stderr)
        .init();

    let options = ParseOptions::default()
        .with_rooted(!cli.unrooted)
        .with_decoration(cli.decoration);
    let out = open_output(cli.output.as_deref())?;

    match &cli.command {
        Command::Concordance {
            species,
            genes,
            threads,
        } => concordance(species, genes, *threads, &options, out),
        Command::Nodes { tree, legacy } => nodes(tree, *legacy, &options, out),
        Command::BranchLength { tree, label, scan } => {
            branch_length(tree, label, *scan, &options, out)
        }
        Command::Newick { tree, style } => {
            let tree = read_tree(tree, &options)?;
            let mut out = out;
            writeln!(out, "{}", tree.to_newick(*style))?;
            out.flush()?;
            Ok(())
        }
    }
}

// --------------------------------------------------
fn concordance(
    species: &Path,
    genes: &Path,
    threads: Option<usize>,
    options: &ParseOptions,
    out: Box<dyn Write>,
) -> Result<()> {
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let species_tree = read_tree(species, options)?;
    let batch = newick::parse_file(genes, options)
        .with_context(|| format!(r#"Failed to read gene trees "{}""#, genes.display()))?;
    info!(
        "Species tree has {} tips, {} gene trees parsed",
        species_tree.num_tips(),
        batch.num_parsed()
    );

    let mut analysis = ConcordanceAnalysis::new(&species_tree);
    analysis.add_batch(&batch);

    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_writer(out);
    for row in analysis.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    let summary = analysis.summary();
    eprintln!(
        "Gene trees used: {}, skipped malformed: {}, skipped tip count mismatch: {}, \
         lacking species root clade: {}",
        summary.trees_used,
        summary.skipped_malformed,
        summary.skipped_tip_mismatch,
        summary.root_clade_absent
    );
    Ok(())
}

// --------------------------------------------------
fn nodes(path: &Path, legacy: bool, options: &ParseOptions, out: Box<dyn Write>) -> Result<()> {
    let tree = read_tree(path, options)?;
    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_writer(out);

    if legacy {
        for record in tree.legacy_records() {
            wtr.serialize(record)?;
        }
    } else {
        for record in tree.records() {
            wtr.serialize(record)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

// --------------------------------------------------
fn branch_length(
    path: &Path,
    label: &str,
    scan: bool,
    options: &ParseOptions,
    out: Box<dyn Write>,
) -> Result<()> {
    let text = read_input(path)?;
    let found = if scan {
        legacy::branch_length(&text, label).map(str::to_string)
    } else {
        let tree = parse_tree(&text, path, options)?;
        tree.branch_length(label)?.map(|bl| bl.as_str().to_string())
    };

    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_writer(out);
    wtr.serialize(BranchLengthRow {
        node: label,
        branch_length: found.as_deref().unwrap_or(cladekit::model::NA),
    })?;
    wtr.flush()?;
    Ok(())
}

// --------------------------------------------------
fn read_tree(path: &Path, options: &ParseOptions) -> Result<Tree> {
    let text = read_input(path)?;
    parse_tree(&text, path, options)
}

// --------------------------------------------------
fn parse_tree(text: &str, path: &Path, options: &ParseOptions) -> Result<Tree> {
    newick::parse_str_with(text.trim(), options)
        .with_context(|| format!(r#"Failed to parse tree in "{}""#, path.display()))
}

// --------------------------------------------------
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!(r#"Failed to read "{}""#, path.display()))
    }
}

// --------------------------------------------------
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!(r#"Failed to create "{}""#, path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
