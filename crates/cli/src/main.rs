//! hanzi-cards CLI: fuse Chinese dictionary sources into study cards.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use hanzi_cards_core::audit::audit_pinyin;
use hanzi_cards_core::cache::{FusionCaches, JsonCache, cache_dir};
use hanzi_cards_core::config::{LlmConfig, SourcePaths};
use hanzi_cards_core::entry::VariantBreakdown;
use hanzi_cards_core::fusion::{FusionContext, PlannedSense, plan};
use hanzi_cards_core::pinyin::{Romanization, numbered_text_to_marked};
use hanzi_cards_core::segment::DictSegmenter;
use hanzi_cards_core::sources::{Cedict, Sources, dictionary};
use hanzi_cards_core::types::FusedRecord;

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "hanzi-cards",
    about = "Fuse Chinese dictionary sources into per-sense study cards",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the card CSV from the dictionary and auxiliary sources
    Build(BuildArgs),
    /// Print the variant breakdown of every dictionary header as JSON lines
    Variants(VariantsArgs),
    /// Convert numbered pinyin to tone marks, or show the base form of marked pinyin
    Pinyin(PinyinArgs),
    /// Report dictionary pinyin that CEDICT does not attest
    Audit(AuditArgs),
}

// ─── Build ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Directory holding the source files under their default names
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Primary dictionary CSV
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// CC-CEDICT file
    #[arg(long)]
    cedict: Option<PathBuf>,

    /// Baxter-Sagart reconstruction CSV
    #[arg(long)]
    baxter: Option<PathBuf>,

    /// Unihan_Readings.txt
    #[arg(long)]
    unihan: Option<PathBuf>,

    /// Character frequency CSV
    #[arg(long)]
    frequency: Option<PathBuf>,

    /// Pinyin correction suggestions
    #[arg(long)]
    corrections: Option<PathBuf>,

    /// CC-Canto style word list for Cantonese segmentation
    #[arg(long)]
    cantonese_words: Option<PathBuf>,

    /// Output CSV
    #[arg(short, long, default_value = "hanzi_cards.csv")]
    output: PathBuf,

    /// Cache directory (default: $HANZI_CARDS_CACHE_DIR or ~/.cache/hanzi-cards)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Ask the LLM for hints on senses without examples
    #[arg(long, default_value_t = false)]
    generate_hints: bool,

    /// Ask the LLM to pick between competing Cantonese readings
    #[arg(long, default_value_t = false)]
    disambiguate_jyutping: bool,

    /// JSON file with LLM settings
    #[arg(long)]
    llm_config: Option<PathBuf>,

    /// Chat model identifier
    #[arg(long)]
    llm_model: Option<String>,

    /// Items per LLM request
    #[arg(long)]
    batch_size: Option<usize>,

    /// Concurrent LLM requests
    #[arg(long)]
    workers: Option<usize>,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl BuildArgs {
    fn source_paths(&self) -> SourcePaths {
        let defaults = SourcePaths::in_dir(&self.data_dir);
        SourcePaths {
            dictionary: self.dictionary.clone().unwrap_or(defaults.dictionary),
            cedict: self.cedict.clone().unwrap_or(defaults.cedict),
            frequency: self.frequency.clone().unwrap_or(defaults.frequency),
            baxter: self.baxter.clone().unwrap_or(defaults.baxter),
            unihan: self.unihan.clone().unwrap_or(defaults.unihan),
            corrections: self.corrections.clone().unwrap_or(defaults.corrections),
            cantonese_words: self.cantonese_words.clone(),
        }
    }

    fn llm_config(&self) -> Result<LlmConfig> {
        let mut config = match &self.llm_config {
            Some(path) => LlmConfig::load(path)?,
            None => LlmConfig::from_env(),
        };
        if let Some(model) = &self.llm_model {
            config.model = model.clone();
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers;
        }
        Ok(config)
    }
}

// ─── Variants / Pinyin ───────────────────────────────────────────

#[derive(Parser, Debug)]
struct VariantsArgs {
    /// Primary dictionary CSV
    #[arg(default_value = "xhzd_corrected.csv")]
    dictionary: PathBuf,

    /// Only print headers that carry variants
    #[arg(long, default_value_t = false)]
    only_variants: bool,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct AuditArgs {
    /// Primary dictionary CSV
    #[arg(long, default_value = "xhzd_corrected.csv")]
    dictionary: PathBuf,

    /// CC-CEDICT file
    #[arg(long, default_value = "cedict_ts.u8")]
    cedict: PathBuf,

    /// Report file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PinyinArgs {
    /// Syllables such as `zhong1 guo2` or `zhōng`
    #[arg(required = true)]
    input: Vec<String>,
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Init logging
    let log_level = match &cli.command {
        Command::Build(a) if a.verbose => "debug",
        Command::Variants(a) if a.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Build(args) => run_build(args),
        Command::Variants(args) => run_variants(args),
        Command::Pinyin(args) => run_pinyin(args),
        Command::Audit(args) => run_audit(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Output rows ─────────────────────────────────────────────────

#[derive(Serialize)]
struct CardRow<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "Character")]
    character: &'a str,
    #[serde(rename = "Hint")]
    hint: &'a str,
    #[serde(rename = "Definition")]
    definition: &'a str,
    #[serde(rename = "Pinyin")]
    pinyin: &'a str,
    #[serde(rename = "Jyutping")]
    jyutping: &'a str,
    py_pronunciation: &'a str,
    jp_pronunciation: &'a str,
    #[serde(rename = "MiddleChinese")]
    middle_chinese: String,
    #[serde(rename = "Hangul")]
    hangul: &'a str,
    #[serde(rename = "English")]
    english: &'a str,
    #[serde(rename = "Frequency")]
    frequency: &'a str,
    #[serde(rename = "Level")]
    level: &'a str,
    #[serde(rename = "Page")]
    page: &'a str,
}

impl<'a> From<&'a FusedRecord> for CardRow<'a> {
    fn from(r: &'a FusedRecord) -> Self {
        CardRow {
            id: &r.id,
            character: &r.display_character,
            hint: &r.hint,
            definition: &r.definition,
            pinyin: &r.pinyin,
            jyutping: &r.jyutping,
            py_pronunciation: &r.pinyin_proxy,
            jp_pronunciation: &r.jyutping_proxy,
            middle_chinese: r.middle_chinese_display(),
            hangul: &r.hangul,
            english: &r.english,
            frequency: &r.frequency_rank,
            level: &r.level,
            page: &r.page,
        }
    }
}

fn write_cards(path: &Path, records: &[FusedRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output: {}", path.display()))?;
    for record in records {
        writer.serialize(CardRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

// ─── Build runner ────────────────────────────────────────────────

fn run_build(args: BuildArgs) -> Result<()> {
    let paths = args.source_paths();
    if !paths.dictionary.exists() {
        bail!("Dictionary not found: {}", paths.dictionary.display());
    }

    let sources = Sources::load(&paths);
    let rows = dictionary::load_rows(&paths.dictionary)?;
    let planned = plan(&rows, &sources.corrections);

    let mut segmenter = DictSegmenter::from_reading_database(&sources.readings);
    if let Some(words) = &paths.cantonese_words {
        segmenter.load_word_list(words)?;
    }

    let cache_root = args.cache_dir.clone().unwrap_or_else(cache_dir);
    let mut caches = FusionCaches::open_in(&cache_root);

    if args.generate_hints || args.disambiguate_jyutping {
        let config = args.llm_config()?;
        fill_caches(&args, &config, &sources, &segmenter, &planned, &mut caches)?;
    }

    let ctx = FusionContext::new(&sources, &caches, &segmenter);
    let records = ctx.fuse_all(&planned);
    write_cards(&args.output, &records)?;

    println!("Cards: {}", records.len());
    println!("Output: {}", args.output.display());
    Ok(())
}

#[cfg(feature = "llm")]
fn fill_caches(
    args: &BuildArgs,
    config: &LlmConfig,
    sources: &Sources,
    segmenter: &DictSegmenter,
    planned: &[PlannedSense],
    caches: &mut FusionCaches,
) -> Result<()> {
    use hanzi_cards_core::llm::{self, BatchConfig, OpenRouterClient};

    let client = OpenRouterClient::new(config).context("Cannot reach the LLM backend")?;
    let batch = BatchConfig::from(config);

    if args.generate_hints {
        let requests = FusionContext::new(sources, caches, segmenter).missing_hint_requests(planned);
        if requests.is_empty() {
            log::info!("No senses are missing hints");
        } else {
            let cache = Mutex::new(std::mem::take(&mut caches.hints));
            let report = llm::hints::generate_hints(&client, &requests, batch, &cache);
            caches.hints = into_cache(cache);
            println!(
                "Hints: {} batches, {} failed, {} merged",
                report.batches, report.failed, report.merged
            );
        }
    }

    if args.disambiguate_jyutping {
        let requests =
            FusionContext::new(sources, caches, segmenter).ambiguous_jyutping_requests(planned);
        if requests.is_empty() {
            log::info!("No ambiguous Cantonese readings");
        } else {
            let cache = Mutex::new(std::mem::take(&mut caches.jyutping));
            let report = llm::jyutping::disambiguate_jyutping(&client, &requests, batch, &cache);
            caches.jyutping = into_cache(cache);
            println!(
                "Jyutping: {} batches, {} failed, {} merged",
                report.batches, report.failed, report.merged
            );
        }
    }
    Ok(())
}

#[cfg(not(feature = "llm"))]
fn fill_caches(
    _args: &BuildArgs,
    _config: &LlmConfig,
    _sources: &Sources,
    _segmenter: &DictSegmenter,
    _planned: &[PlannedSense],
    _caches: &mut FusionCaches,
) -> Result<()> {
    bail!("LLM support not compiled in. Rebuild with --features llm")
}

#[cfg(feature = "llm")]
fn into_cache(cache: Mutex<JsonCache>) -> JsonCache {
    match cache.into_inner() {
        Ok(cache) => cache,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ─── Variants runner ─────────────────────────────────────────────

fn run_variants(args: VariantsArgs) -> Result<()> {
    let rows = dictionary::load_rows(&args.dictionary)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut with_variants = 0usize;
    for row in rows.iter().filter(|r| !r.is_preamble()) {
        let breakdown = VariantBreakdown::from_header(&row.header);
        let has_variants = !(breakdown.traditional.is_empty()
            && breakdown.variant_standard.is_empty()
            && breakdown.variant_external.is_empty());
        if has_variants {
            with_variants += 1;
        } else if args.only_variants {
            continue;
        }
        serde_json::to_writer(&mut out, &breakdown)?;
        writeln!(out)?;
    }

    log::info!("{} of {} rows carry variants", with_variants, rows.len());
    Ok(())
}

// ─── Audit runner ────────────────────────────────────────────────

fn run_audit(args: AuditArgs) -> Result<()> {
    let rows = dictionary::load_rows(&args.dictionary)?;
    let cedict = Cedict::load(&args.cedict)?;
    let mismatches = audit_pinyin(&rows, &cedict);

    let mut report = String::new();
    for m in &mismatches {
        report.push_str(&m.to_string());
        report.push('\n');
    }
    match &args.output {
        Some(path) => {
            std::fs::write(path, report)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            log::info!("Report saved to {}", path.display());
        }
        None => print!("{}", report),
    }
    Ok(())
}

// ─── Pinyin runner ───────────────────────────────────────────────

fn run_pinyin(args: PinyinArgs) -> Result<()> {
    let text = args.input.join(" ");
    let numbered = text
        .split_whitespace()
        .all(|s| s.chars().last().is_some_and(|c| c.is_ascii_digit()));

    if numbered {
        println!("{}", numbered_text_to_marked(&text));
    } else {
        let keys: Vec<String> = text
            .split_whitespace()
            .map(|s| Romanization::parse(s).key())
            .collect();
        println!("{}", keys.join(" "));
    }
    Ok(())
}
