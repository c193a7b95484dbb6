use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use norm_lens::data::loader;
use norm_lens::session::{AnalysisSession, DataSummary};
use norm_lens::stats::aggregate::{
    sort_pairs, CorrelationPair, FeatureConsistency, PairOrder, RaterAgreement,
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "norm-lens")]
#[command(about = "Reliability and redundancy reports for semantic feature rating tables")]
#[command(version)]
struct Args {
    /// Rating table to analyse (.csv or .json)
    table: PathBuf,

    /// Exclude a rater by worker id (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "RATER")]
    exclude: Vec<String>,

    /// Keep raters with incomplete item coverage instead of dropping them
    #[arg(long)]
    keep_incomplete: bool,

    /// Order pair listings strongest first instead of weakest first
    #[arg(long)]
    strongest_first: bool,

    /// Limit printed pair rows, 0 = all (text output only)
    #[arg(long, default_value_t = 20, value_name = "N")]
    top: usize,

    /// Emit the full report as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Everything the run produced, in one serialisable bundle.
#[derive(Serialize)]
struct Report {
    summary: DataSummary,
    feature_consistency: Vec<FeatureConsistency>,
    rater_agreement: RaterAgreement,
    feature_redundancy: Vec<CorrelationPair>,
    item_similarity: Vec<CorrelationPair>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = loader::load_file(&args.table)
        .with_context(|| format!("failed to load {}", args.table.display()))?;

    let mut session = if args.keep_incomplete {
        AnalysisSession::keep_all_raters(table)
    } else {
        AnalysisSession::new(table)
    };
    for rater in &args.exclude {
        session.exclude_rater(rater);
    }

    let order = if args.strongest_first {
        PairOrder::AbsCorrelationDescending
    } else {
        PairOrder::RSquaredAscending
    };

    let mut feature_redundancy = session.feature_redundancy()?;
    let mut item_similarity = session.item_similarity()?;
    sort_pairs(&mut feature_redundancy, order);
    sort_pairs(&mut item_similarity, order);

    let report = Report {
        summary: session.summary(),
        feature_consistency: session.feature_consistency()?,
        rater_agreement: session.rater_agreement()?,
        feature_redundancy,
        item_similarity,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, args.top, args.strongest_first);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn fmt_score(score: Option<f64>) -> String {
    match score {
        Some(v) => format!("{v:>7.3}"),
        None => format!("{:>7}", "--"),
    }
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>, header: &str) -> usize {
    labels.map(str::len).fold(header.len(), usize::max)
}

fn print_report(report: &Report, top: usize, strongest_first: bool) {
    print_summary(&report.summary);
    print_consistency(&report.feature_consistency);
    print_agreement(&report.rater_agreement);

    let order_note = if strongest_first {
        "strongest first"
    } else {
        "weakest first"
    };
    print_pairs("Feature redundancy", order_note, &report.feature_redundancy, top);
    print_pairs("Item similarity", order_note, &report.item_similarity, top);
}

fn print_summary(summary: &DataSummary) {
    println!("Data summary");
    println!(
        "  {} items, {} features, {} raters ({} LLM, {} human), {} observations",
        summary.n_items,
        summary.n_features,
        summary.n_raters,
        summary.n_llm_raters,
        summary.n_human_raters,
        summary.n_observations,
    );
    if !summary.category_counts.is_empty() {
        let parts: Vec<String> = summary
            .category_counts
            .iter()
            .map(|(cat, n)| format!("{cat} {n}"))
            .collect();
        println!("  categories: {}", parts.join(", "));
    }
    if !summary.dropped_raters.is_empty() {
        println!(
            "  dropped for incomplete coverage (fewer than {} observations): {}",
            summary.max_count,
            summary.dropped_raters.join(", "),
        );
    }
    if !summary.excluded_raters.is_empty() {
        println!("  excluded by hand: {}", summary.excluded_raters.join(", "));
    }
    println!();
}

fn print_consistency(ranking: &[FeatureConsistency]) {
    println!("Feature reliability (weakest first)");
    let w = label_width(ranking.iter().map(|f| f.feature.as_str()), "feature");
    println!("  {:<w$}  {:>7}  quality", "feature", "mean r");
    for entry in ranking {
        println!(
            "  {:<w$}  {}  {}",
            entry.feature,
            fmt_score(entry.mean_correlation),
            entry.quality,
        );
    }
    println!();
}

fn print_agreement(agreement: &RaterAgreement) {
    println!("Rater agreement (weakest first)");
    let w = label_width(agreement.raters.iter().map(String::as_str), "rater");
    println!("  {:<w$}  {:<5}  {:>7}  quality", "rater", "kind", "mean r");
    for score in &agreement.summary {
        println!(
            "  {:<w$}  {:<5}  {}  {}",
            score.rater,
            score.kind.to_string(),
            fmt_score(score.mean_agreement),
            score.quality,
        );
    }
    if !agreement.zero_variance_features.is_empty() {
        println!(
            "  zero-variance features (no computable agreement): {}",
            agreement.zero_variance_features.join(", "),
        );
    }
    println!();
}

fn print_pairs(title: &str, order_note: &str, pairs: &[CorrelationPair], top: usize) {
    let shown = if top == 0 { pairs.len() } else { top.min(pairs.len()) };
    if shown < pairs.len() {
        println!("{title} ({order_note}, {shown} of {} pairs)", pairs.len());
    } else {
        println!("{title} ({order_note})");
    }
    let w = label_width(pairs.iter().take(shown).map(|p| p.a.as_str()), "a");
    let w2 = label_width(pairs.iter().take(shown).map(|p| p.b.as_str()), "b");
    println!("  {:<w$}  {:<w2$}  {:>7}  {:>7}  sign", "a", "b", "r", "r²");
    for pair in &pairs[..shown] {
        let sign = match pair.sign {
            Some(s) => s.to_string(),
            None => "--".to_string(),
        };
        println!(
            "  {:<w$}  {:<w2$}  {}  {}  {}",
            pair.a,
            pair.b,
            fmt_score(pair.correlation),
            fmt_score(pair.r_squared),
            sign,
        );
    }
    println!();
}
