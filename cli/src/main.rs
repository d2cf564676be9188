//! autmine CLI - autopsy report field extraction tool

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use autmine::export::{to_json, write_audit_csv, write_records_csv};
use autmine::extract::DEFAULT_CT_KEYWORD;
use autmine::{
    Assembler, CsvEncoding, CsvOptions, ExtractOptions, JsonFormat, KeywordList, LesionLexicon,
    LoaderRegistry, MergePolicy, Pipeline, PipelineOptions, ProgressSink,
};

#[derive(Parser)]
#[command(name = "autmine")]
#[command(author = "autmine contributors")]
#[command(version)]
#[command(about = "Extract fields from forensic autopsy reports into CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one record per report from every document in a folder
    Extract {
        /// Folder with .docx reports
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Records CSV file
        #[arg(short, long, value_name = "FILE", default_value = "output.csv")]
        output: PathBuf,

        /// Duplicates log, written only when duplicates were found
        #[arg(long, value_name = "FILE", default_value = "duplicates.csv")]
        duplicates: PathBuf,

        /// Also write the records as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Encoding of the records CSV
        #[arg(long, value_enum, default_value = "utf16")]
        encoding: Encoding,

        /// Folder with list_les.txt, list_col.txt, list_loc.txt and list_sha.txt
        #[arg(long, value_name = "DIR")]
        lesions: Option<PathBuf>,

        /// Organ weight keywords, one per line
        #[arg(long, value_name = "FILE")]
        weight_keywords: Option<PathBuf>,

        /// Keyword looked for after CT paragraphs
        #[arg(long, default_value = DEFAULT_CT_KEYWORD)]
        ct_keyword: String,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,

        /// Do not descend into subfolders
        #[arg(long)]
        no_recursive: bool,

        /// Group reports without a CPR number as one case when merging
        #[arg(long)]
        group_unidentified: bool,
    },

    /// Show the fields extracted from a single report
    Inspect {
        /// Report file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,

        /// Folder with the lesion term lists
        #[arg(long, value_name = "DIR")]
        lesions: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Encoding {
    /// UTF-8 without BOM
    Utf8,
    /// UTF-16 little endian with BOM
    Utf16,
}

impl From<Encoding> for CsvEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Utf8 => CsvEncoding::Utf8,
            Encoding::Utf16 => CsvEncoding::Utf16Le,
        }
    }
}

/// Progress bar fed by the pipeline.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {percent}% ETA {eta} {msg}")?
                .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }
}

impl ProgressSink for BarProgress {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_document(&self, name: &str, _elapsed: Duration) {
        self.bar.set_message(name.to_string());
        self.bar.inc(1);
    }

    fn on_skipped(&self, path: &Path, error: &autmine::Error) {
        self.bar
            .println(format!("{} {}: {}", "Skipped".yellow(), path.display(), error));
        self.bar.inc(1);
    }

    fn on_finish(&self) {
        self.bar.finish_with_message("Done!");
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            duplicates,
            json,
            encoding,
            lesions,
            weight_keywords,
            ct_keyword,
            sequential,
            no_recursive,
            group_unidentified,
        } => {
            let args = ExtractArgs {
                output,
                duplicates,
                json,
                encoding,
                lesions,
                weight_keywords,
                ct_keyword,
                sequential,
                recursive: !no_recursive,
                group_unidentified,
            };
            cmd_extract(&input, &args)
        }
        Commands::Inspect {
            input,
            json,
            lesions,
        } => cmd_inspect(&input, json, lesions.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct ExtractArgs {
    output: PathBuf,
    duplicates: PathBuf,
    json: Option<PathBuf>,
    encoding: Encoding,
    lesions: Option<PathBuf>,
    weight_keywords: Option<PathBuf>,
    ct_keyword: String,
    sequential: bool,
    recursive: bool,
    group_unidentified: bool,
}

fn extract_options(
    lesions: Option<&Path>,
    weight_keywords: Option<&Path>,
    ct_keyword: &str,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new().with_ct_keyword(ct_keyword);
    if let Some(dir) = lesions {
        options = options.with_lesions(LesionLexicon::from_dir(dir)?);
    }
    if let Some(path) = weight_keywords {
        let list = KeywordList::from_file(path)?;
        options = options.with_weight_keywords(list.terms().iter().cloned());
    }
    Ok(options)
}

fn cmd_extract(input: &Path, args: &ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = extract_options(
        args.lesions.as_deref(),
        args.weight_keywords.as_deref(),
        &args.ct_keyword,
    )?;
    let pipeline_options = PipelineOptions::new()
        .with_parallel(!args.sequential)
        .with_recursive(args.recursive)
        .with_merge_policy(
            MergePolicy::new().with_isolate_unidentified(!args.group_unidentified),
        );
    log::debug!(
        "parallel={} recursive={} isolate_unidentified={}",
        !args.sequential,
        args.recursive,
        !args.group_unidentified
    );
    let pipeline = Pipeline::new(options)?.with_options(pipeline_options);

    println!("{} {}", "Processing".cyan().bold(), input.display());
    let progress = BarProgress::new()?;
    let batch = pipeline.run_folder(input, &progress)?;

    let csv_options = CsvOptions::new().with_encoding(args.encoding.into());
    let file = BufWriter::new(File::create(&args.output)?);
    write_records_csv(&batch.records, &batch.registry, file, &csv_options)?;

    let mut written = vec![args.output.clone()];
    if !batch.audit.is_empty() {
        let file = BufWriter::new(File::create(&args.duplicates)?);
        write_audit_csv(&batch.audit, file, &CsvOptions::audit())?;
        written.push(args.duplicates.clone());
    }
    if let Some(path) = &args.json {
        let json = to_json(&batch.records, &batch.registry, JsonFormat::Pretty)?;
        fs::write(path, json)?;
        written.push(path.clone());
    }

    println!();
    println!("{}", "Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Documents".bold(), batch.processed);
    println!("{}: {}", "Records".bold(), batch.records.len());
    println!("{}: {}", "Columns".bold(), batch.registry.len());
    println!(
        "{}: {}",
        "Duplicates omitted".bold(),
        batch.audit.iter().filter(|a| a.omitted).count()
    );
    if batch.diagnostics > 0 {
        println!(
            "{}: {} (run with RUST_LOG=warn for details)",
            "Diagnostics".bold(),
            batch.diagnostics
        );
    }
    if !batch.skipped.is_empty() {
        println!("{}: {}", "Skipped".yellow().bold(), batch.skipped.len());
        for skip in &batch.skipped {
            println!("  {} {}: {}", "├─".dimmed(), skip.path.display(), skip.error);
        }
    }

    println!("\n{}", "Output files:".green().bold());
    for (i, path) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path.display());
    }

    Ok(())
}

fn cmd_inspect(
    input: &Path,
    json: bool,
    lesions: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = LoaderRegistry::with_defaults().load(input)?;
    let assembler = Assembler::new(extract_options(lesions, None, DEFAULT_CT_KEYWORD)?)?;
    let assembled = assembler.assemble(&doc);

    if json {
        println!("{}", serde_json::to_string_pretty(&assembled.record)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Tables".bold(), doc.tables().len());

    println!();
    println!("{}", "Fields".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (name, value) in assembled.record.iter() {
        let rendered = value.render();
        if value.is_not_found() {
            println!("{}: {}", name.bold(), rendered.yellow());
        } else {
            println!("{}: {}", name.bold(), rendered);
        }
    }

    if !assembled.diagnostics.is_empty() {
        println!();
        println!("{}", "Diagnostics".yellow().bold());
        for diagnostic in assembled.diagnostics.iter() {
            println!("  {} {}", "•".dimmed(), diagnostic);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "autmine".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Autopsy report field extraction tool");
    println!();
    println!("License: MIT");
}
