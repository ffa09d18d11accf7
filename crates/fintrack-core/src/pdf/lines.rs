//! Transaction line parsing within statement sections
//!
//! A transaction line reads `<transaction date> <posted date> <description>
//! <amount>` with month-name dates, e.g.
//! `Feb 14, 2025 Feb 15, 2025 NETFLIX.COM $15.49`.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::sections::Section;
use super::PdfIngestion;
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::models::{IngestionError, SourcePosition, TransactionCandidate};
use crate::normalize::{cap_description, normalize_amount, normalize_date};

const DATE_PATTERN: &str =
    r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}";

/// Optional sign (ASCII or Unicode minus), `$`, thousands separators,
/// 2 decimals, accounting parentheses, trailing minus
const AMOUNT_PATTERN: &str = r"\(?[-\x{2212}\x{2012}-\x{2015}\x{FE63}\x{FF0D}]?\$?[-\x{2212}\x{2012}-\x{2015}\x{FE63}\x{FF0D}]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?\)?-?";

fn transaction_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)^\s*({date})\s+({date})\s+(.+?)\s+({amount})\s*$",
            date = DATE_PATTERN,
            amount = AMOUNT_PATTERN
        ))
        .expect("valid regex")
    })
}

fn total_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*Total\s+\$?-?\d").expect("valid regex"))
}

/// Parse every section into candidates, in document order.
///
/// A transaction line whose amount cannot be normalized becomes an error at
/// its line number; its wrapped description lines are skipped with it.
pub fn parse_sections(sections: &[Section], config: &IngestConfig) -> PdfIngestion {
    let max_chars = config.ledger.description_max_chars;
    let mut parsed = PdfIngestion::default();
    let mut last_failed = false;

    for section in sections {
        for (line_no, line) in &section.lines {
            if total_line_re().is_match(line) {
                continue;
            }

            if transaction_line_re().is_match(line) {
                match parse_transaction_line(line, *line_no, section.category.as_deref(), config) {
                    Ok(candidate) => {
                        parsed.candidates.push(candidate);
                        last_failed = false;
                    }
                    Err(e) => {
                        debug!(line_no, error = %e, "Statement line has an unusable amount");
                        parsed
                            .errors
                            .push(IngestionError::at(SourcePosition::Line(*line_no), e.to_string()));
                        last_failed = true;
                    }
                }
                continue;
            }

            if last_failed {
                debug!(line_no, "Skipping continuation of a failed statement line");
                continue;
            }

            if !attach_continuation(&mut parsed.candidates, line, max_chars) {
                debug!(line_no, "Ignoring non-transaction statement line");
            }
        }
    }

    parsed
}

/// Parse one transaction line. Fails with `Error::Parse` when the line is not
/// a transaction line or its amount is unusable.
pub fn parse_transaction_line(
    line: &str,
    line_no: usize,
    category: Option<&str>,
    config: &IngestConfig,
) -> Result<TransactionCandidate> {
    let caps = transaction_line_re()
        .captures(line)
        .ok_or_else(|| Error::Parse(format!("Not a transaction line: {}", line.trim())))?;

    let amount = normalize_amount(&caps[4])?;
    let amount = if config.pdf.amounts_are_outflows { -amount } else { amount };

    Ok(TransactionCandidate {
        transaction_date: normalize_date(&caps[1]).ok(),
        posted_date: normalize_date(&caps[2]).ok(),
        description: cap_description(&caps[3], config.ledger.description_max_chars),
        category: category.map(str::to_string),
        kind: config.ledger.default_kind.clone(),
        amount,
        memo: None,
        raw_source: line.trim().to_string(),
        position: SourcePosition::Line(line_no),
    })
}

/// Wrapped-description heuristic.
///
/// A line that is not a transaction is treated as the continuation of the
/// previous candidate's description, unless it starts with a digit. This is
/// an approximation: page footers that follow a transaction get attached too.
/// Returns whether the line was attached.
pub fn attach_continuation(
    candidates: &mut [TransactionCandidate],
    line: &str,
    max_chars: usize,
) -> bool {
    let text = line.trim();
    if text.is_empty() || text.starts_with(|c: char| c.is_ascii_digit()) {
        return false;
    }
    let Some(last) = candidates.last_mut() else {
        return false;
    };

    let joined = format!("{} {}", last.description, text);
    last.description = cap_description(&joined, max_chars);
    last.raw_source = format!("{} {}", last.raw_source, text);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn config() -> IngestConfig {
        IngestConfig::default()
    }

    fn section(category: &str, lines: &[&str]) -> Section {
        Section {
            category: Some(category.to_string()),
            lines: lines
                .iter()
                .enumerate()
                .map(|(i, l)| (i + 1, l.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_transaction_line() {
        let candidate = parse_transaction_line(
            "Feb 14, 2025 Feb 15, 2025 NETFLIX.COM $15.49",
            7,
            Some("ENTERTAINMENT"),
            &config(),
        )
        .unwrap();

        assert_eq!(candidate.transaction_date, NaiveDate::from_ymd_opt(2025, 2, 14));
        assert_eq!(candidate.posted_date, NaiveDate::from_ymd_opt(2025, 2, 15));
        assert_eq!(candidate.description, "NETFLIX.COM");
        assert_eq!(candidate.category.as_deref(), Some("ENTERTAINMENT"));
        assert_eq!(candidate.kind, "expense");
        // Statement spending is positive; the ledger stores outflows negative
        assert_eq!(candidate.amount, dec!(-15.49));
        assert_eq!(candidate.position, SourcePosition::Line(7));
        assert_eq!(
            candidate.raw_source,
            "Feb 14, 2025 Feb 15, 2025 NETFLIX.COM $15.49"
        );
    }

    #[test]
    fn test_amount_forms() {
        let cfg = config();
        let parse = |amount: &str| {
            let line = format!("Jan 2, 2025 Jan 3, 2025 STORE 42 {}", amount);
            parse_transaction_line(&line, 1, None, &cfg).ok().map(|c| c.amount)
        };

        assert_eq!(parse("$1,234.56"), Some(dec!(-1234.56)));
        // Refunds print negative and become inflows
        assert_eq!(parse("$-28.00"), Some(dec!(28.00)));
        assert_eq!(parse("-$28.00"), Some(dec!(28.00)));
        assert_eq!(parse("($12.34)"), Some(dec!(12.34)));
        assert_eq!(parse("−5.00"), Some(dec!(5.00)));
        assert_eq!(parse("1234.50"), Some(dec!(-1234.50)));
    }

    #[test]
    fn test_description_keeps_inner_numbers() {
        let candidate = parse_transaction_line(
            "Mar 1, 2025 Mar 2, 2025 SHELL OIL 5744 $40.00",
            1,
            Some("GAS"),
            &config(),
        )
        .unwrap();
        assert_eq!(candidate.description, "SHELL OIL 5744");
        assert_eq!(candidate.amount, dec!(-40.00));
    }

    #[test]
    fn test_inflow_convention_can_be_disabled() {
        let mut cfg = config();
        cfg.pdf.amounts_are_outflows = false;
        let candidate =
            parse_transaction_line("Jan 2, 2025 Jan 3, 2025 PAYROLL $100.00", 1, None, &cfg)
                .unwrap();
        assert_eq!(candidate.amount, dec!(100.00));
    }

    #[test]
    fn test_non_transaction_lines() {
        let cfg = config();
        assert!(parse_transaction_line("Total $52.10", 1, None, &cfg).is_err());
        assert!(parse_transaction_line("Page 2 of 3", 1, None, &cfg).is_err());
        assert!(parse_transaction_line("Feb 14, 2025 NETFLIX.COM $15.49", 1, None, &cfg).is_err());
    }

    #[test]
    fn test_wrapped_description_is_merged() {
        let sections = vec![section(
            "SHOPPING",
            &[
                "Feb 4, 2025 Feb 5, 2025 AMAZON MKTPL*AB12CD $89.99",
                "  MARKETPLACE SEATTLE WA",
                "Total $89.99",
            ],
        )];

        let parsed = parse_sections(&sections, &config());
        assert!(parsed.errors.is_empty());
        let candidates = parsed.candidates;
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].description,
            "AMAZON MKTPL*AB12CD MARKETPLACE SEATTLE WA"
        );
        assert_eq!(candidates[0].amount, dec!(-89.99));
        assert!(candidates[0].raw_source.ends_with("$89.99 MARKETPLACE SEATTLE WA"));
    }

    #[test]
    fn test_unusable_amount_is_reported_at_its_line() {
        let sections = vec![Section {
            category: Some("SHOPPING".to_string()),
            lines: vec![
                (2, "Jan 2, 2025 Jan 3, 2025 STORE A $10.00".to_string()),
                (3, "Jan 4, 2025 Jan 5, 2025 STORE B (5.00".to_string()),
                (4, "  WRAPPED TEXT OF STORE B".to_string()),
                (5, "Jan 6, 2025 Jan 7, 2025 STORE C -5.00-".to_string()),
                (6, "Jan 8, 2025 Jan 9, 2025 STORE D $2.50".to_string()),
                (7, "  WRAPPED TEXT OF STORE D".to_string()),
            ],
        }];

        let parsed = parse_sections(&sections, &config());

        let descriptions: Vec<_> = parsed.candidates.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(descriptions, vec!["STORE A", "STORE D WRAPPED TEXT OF STORE D"]);

        let lines: Vec<_> = parsed.errors.iter().map(|e| e.line_number).collect();
        assert_eq!(lines, vec![Some(3), Some(5)]);
        assert!(parsed.errors.iter().all(|e| e.row_index.is_none()));
        assert!(parsed.errors[0].message.contains("(5.00"));
    }

    #[test]
    fn test_continuation_rules() {
        let mut candidates = Vec::new();
        // Nothing to attach to
        assert!(!attach_continuation(&mut candidates, "ORPHAN TEXT", 500));

        candidates.push(
            parse_transaction_line("Feb 4, 2025 Feb 5, 2025 SHOP $1.00", 1, None, &config())
                .unwrap(),
        );
        // Lines starting with a digit are not continuations
        assert!(!attach_continuation(&mut candidates, "2 of 3", 500));
        assert!(!attach_continuation(&mut candidates, "   ", 500));
        assert!(attach_continuation(&mut candidates, "MORE", 500));
        assert_eq!(candidates[0].description, "SHOP MORE");
    }

    #[test]
    fn test_continuation_respects_cap() {
        let mut candidates = vec![parse_transaction_line(
            "Feb 4, 2025 Feb 5, 2025 ABCDEFGH $1.00",
            1,
            None,
            &config(),
        )
        .unwrap()];

        assert!(attach_continuation(&mut candidates, "IJKLMNOP", 10));
        assert_eq!(candidates[0].description, "ABCDEFGH I");
    }

    #[test]
    fn test_unparseable_dates_become_none() {
        let candidate = parse_transaction_line(
            "Feb 30, 2025 Mar 1, 2025 LEAP SHOP $3.00",
            1,
            None,
            &config(),
        )
        .unwrap();
        assert_eq!(candidate.transaction_date, None);
        assert_eq!(candidate.posted_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    }
}
