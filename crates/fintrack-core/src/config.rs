//! Ingestion configuration
//!
//! Keyword dictionaries (column header synonyms, PDF section labels,
//! classifier keywords) live in configuration rather than parsing code, so a
//! new statement layout only needs a config change.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/fintrack/config/ingest.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/ingest.toml");

/// Header synonyms used to find CSV columns by role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSynonyms {
    pub date: Vec<String>,
    pub description: Vec<String>,
    pub amount: Vec<String>,
    pub posted_date: Vec<String>,
    pub category: Vec<String>,
    pub kind: Vec<String>,
    pub memo: Vec<String>,
}

impl Default for ColumnSynonyms {
    fn default() -> Self {
        Self {
            date: strings(&[
                "date",
                "transaction date",
                "posted date",
                "transaction_date",
                "posted_date",
                "txn_date",
            ]),
            description: strings(&[
                "description",
                "memo",
                "details",
                "transaction description",
                "merchant",
            ]),
            amount: strings(&[
                "amount",
                "amt",
                "debit",
                "credit",
                "transaction amount",
                "money",
            ]),
            posted_date: strings(&["post date", "posted date", "post_date", "posted_date"]),
            category: strings(&["category"]),
            kind: strings(&["type"]),
            memo: strings(&["memo"]),
        }
    }
}

/// Layout of section-based PDF statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLayout {
    /// Upper-case section headings that carry the category label
    pub known_categories: Vec<String>,
    /// Prefix of the repeated column header row
    pub table_header: String,
    /// Heading after which the document is summary only
    pub summary_heading: String,
    /// Statement amounts are positive spending and get negated
    pub amounts_are_outflows: bool,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            known_categories: strings(&[
                "BILLS_AND_UTILITIES",
                "EDUCATION",
                "ENTERTAINMENT",
                "FOOD_AND_DRINK",
                "GAS",
                "GROCERIES",
                "HOME",
                "PERSONAL",
                "PROFESSIONAL_SERVICES",
                "SHOPPING",
                "TRAVEL",
            ]),
            table_header: "Transaction Date".to_string(),
            summary_heading: "Spending By Category".to_string(),
            amounts_are_outflows: true,
        }
    }
}

/// Ledger field limits and defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerDefaults {
    pub description_max_chars: usize,
    pub default_kind: String,
}

impl Default for LedgerDefaults {
    fn default() -> Self {
        Self {
            description_max_chars: 500,
            default_kind: "expense".to_string(),
        }
    }
}

/// One keyword rule: any keyword contained in a description maps to `category`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeywordRule {
    pub category: String,
    pub keywords: Vec<String>,
}

fn default_classifier_rules() -> Vec<KeywordRule> {
    let rule = |category: &str, keywords: &[&str]| KeywordRule {
        category: category.to_string(),
        keywords: strings(keywords),
    };
    vec![
        rule(
            "utilities",
            &["electric", "water", "coned", "comcast", "verizon", "internet"],
        ),
        rule(
            "groceries",
            &["grocery", "market", "whole foods", "safeway", "trader joe"],
        ),
        rule("savings", &["transfer to savings", "deposit to savings"]),
        rule("social", &["restaurant", "bar", "cafe", "netflix", "spotify"]),
        rule(
            "transportation",
            &["uber", "lyft", "shell", "exxon", "bus", "train"],
        ),
        rule("housing", &["rent", "mortgage", "landlord"]),
    ]
}

/// Complete ingestion configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub columns: ColumnSynonyms,
    pub pdf: PdfLayout,
    pub ledger: LedgerDefaults,
    /// Checked in order; an override's `[[classifier.rules]]` replaces the whole list
    pub classifier_rules: Vec<KeywordRule>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            columns: ColumnSynonyms::default(),
            pdf: PdfLayout::default(),
            ledger: LedgerDefaults::default(),
            classifier_rules: default_classifier_rules(),
        }
    }
}

impl IngestConfig {
    /// Load from the default override location, else the embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit override path (embedded defaults if it doesn't exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// The embedded defaults
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Parse a TOML document layered over the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fintrack").join("config").join("ingest.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<IngestConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    columns: Option<RawColumns>,
    pdf: Option<RawPdf>,
    ledger: Option<RawLedger>,
    classifier: Option<RawClassifier>,
}

#[derive(Debug, Deserialize)]
struct RawColumns {
    date: Option<Vec<String>>,
    description: Option<Vec<String>>,
    amount: Option<Vec<String>>,
    posted_date: Option<Vec<String>>,
    category: Option<Vec<String>>,
    kind: Option<Vec<String>>,
    memo: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawPdf {
    known_categories: Option<Vec<String>>,
    table_header: Option<String>,
    summary_heading: Option<String>,
    amounts_are_outflows: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawLedger {
    description_max_chars: Option<usize>,
    default_kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawClassifier {
    rules: Option<Vec<KeywordRule>>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<IngestConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = IngestConfig::default();

    if let Some(columns) = raw.columns {
        let target = &mut config.columns;
        apply_synonyms(&mut target.date, columns.date);
        apply_synonyms(&mut target.description, columns.description);
        apply_synonyms(&mut target.amount, columns.amount);
        apply_synonyms(&mut target.posted_date, columns.posted_date);
        apply_synonyms(&mut target.category, columns.category);
        apply_synonyms(&mut target.kind, columns.kind);
        apply_synonyms(&mut target.memo, columns.memo);
    }

    if let Some(pdf) = raw.pdf {
        if let Some(labels) = pdf.known_categories {
            config.pdf.known_categories = labels
                .into_iter()
                .map(|l| l.trim().to_uppercase())
                .collect();
        }
        if let Some(header) = pdf.table_header {
            config.pdf.table_header = header;
        }
        if let Some(heading) = pdf.summary_heading {
            config.pdf.summary_heading = heading;
        }
        if let Some(outflows) = pdf.amounts_are_outflows {
            config.pdf.amounts_are_outflows = outflows;
        }
    }

    if let Some(ledger) = raw.ledger {
        if let Some(max) = ledger.description_max_chars {
            if max == 0 {
                return Err(Error::Config(
                    "ledger.description_max_chars must be positive".to_string(),
                ));
            }
            config.ledger.description_max_chars = max;
        }
        if let Some(kind) = ledger.default_kind {
            config.ledger.default_kind = kind;
        }
    }

    if let Some(rules) = raw.classifier.and_then(|c| c.rules) {
        config.classifier_rules = rules;
    }

    Ok(config)
}

/// Synonyms are compared lower-cased and trimmed
fn apply_synonyms(target: &mut Vec<String>, value: Option<Vec<String>>) {
    if let Some(values) = value {
        *target = values
            .into_iter()
            .map(|v| v.trim().to_lowercase())
            .collect();
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
