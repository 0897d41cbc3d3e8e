//! Bank Sentiment Client: binary entrypoint.
//! Submits one analysis request for a bank and prints the articles as a sorted table.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use bank_sentiment_client::model::DEFAULT_RESULT_LIMIT;
use bank_sentiment_client::telemetry::init_tracing;
use bank_sentiment_client::{
    AnalysisRequest, Article, ClientConfig, Language, RequestController, RequestState, SortKey,
    SortState,
};

#[derive(Debug, Parser)]
#[command(name = "bank-sentiment", about = "Sentiment of recent news about a bank")]
struct Cli {
    /// Bank name, e.g. "JPMorgan"
    subject: String,

    /// News language: all, en or pt
    #[arg(long, default_value = "all")]
    language: Language,

    /// Maximum number of articles (1-100)
    #[arg(long, default_value_t = DEFAULT_RESULT_LIMIT)]
    limit: u32,

    /// Analysis variant; defaults to the configured one
    #[arg(long)]
    variant: Option<String>,

    /// Sort column (title, sentiment, score). Repeat to toggle direction.
    #[arg(long = "sort")]
    sort: Vec<SortKey>,

    /// Print the ordered articles as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Config file (TOML or JSON); otherwise $BANK_SENTIMENT_CONFIG or config/client.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(p) => ClientConfig::load_from(p)?,
        None => ClientConfig::load_default()?,
    };
    let controller = RequestController::with_http(config).context("building controller")?;

    let mut request = AnalysisRequest::new(cli.subject)
        .with_language(cli.language)
        .with_limit(cli.limit);
    if let Some(v) = cli.variant {
        request = request.with_variant(v);
    }

    let state = controller.submit(request).await;
    if let RequestState::Failed { reason, .. } = &state {
        eprintln!("{reason}");
        return Ok(ExitCode::FAILURE);
    }

    for key in cli.sort {
        controller.sort_by(key);
    }
    let rows = controller.sorted_results();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No articles found.");
    } else {
        print!("{}", render_table(&rows, &controller.sort_state()));
    }
    Ok(ExitCode::SUCCESS)
}

fn render_table(rows: &[Article], sort: &SortState) -> String {
    let header = |key: SortKey, label: &str| {
        let arrow = sort.indicator(key);
        if arrow.is_empty() {
            label.to_string()
        } else {
            format!("{label} {arrow}")
        }
    };
    let heads = [
        header(SortKey::Title, "Title"),
        header(SortKey::Sentiment, "Sentiment"),
        header(SortKey::Score, "Score"),
    ];
    let cells: Vec<[String; 3]> = rows
        .iter()
        .map(|a| {
            [
                a.title.clone().unwrap_or_default(),
                a.sentiment.clone().unwrap_or_default(),
                a.score_display(),
            ]
        })
        .collect();

    let mut widths = heads.clone().map(|h| h.chars().count());
    for row in &cells {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.chars().count());
        }
    }

    let line = |cols: &[String; 3]| {
        let mut s = String::new();
        for (i, (c, w)) in cols.iter().zip(widths).enumerate() {
            if i > 0 {
                s.push_str(" | ");
            }
            s.push_str(c);
            s.extend(std::iter::repeat(' ').take(w - c.chars().count()));
        }
        s.trim_end().to_string() + "\n"
    };

    let mut out = line(&heads);
    out.push_str(&widths.map(|w| "-".repeat(w)).join("-+-"));
    out.push('\n');
    for (row, article) in cells.iter().zip(rows) {
        out.push_str(&line(row));
        if let Some(url) = article.url.as_deref().filter(|u| !u.is_empty()) {
            out.push_str(&format!("  {url}\n"));
        }
    }
    out
}
