use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use vigil_core::VigilConfig;
use vigil_diff::filter::DiffFilter;
use vigil_review::host::{parse_repo_slug, GitHubHost};
use vigil_review::llm::{OpenAiBackend, ReviewClient};
use vigil_review::pipeline::ReviewPipeline;

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "CI pull-request reviewer",
    long_about = "Vigil reviews a pull request from inside your CI pipeline.\n\n\
                   It fetches the PR's diff, asks a completion model to critique each\n\
                   changed hunk in the context of the PR title and description, and posts\n\
                   the critiques back as one review with inline comments. Runs that find\n\
                   nothing to say post nothing and exit cleanly.\n\n\
                   Examples:\n  \
                     vigil --repo octocat/hello-world --pr 42\n  \
                     vigil --pr 42 --exclude '*.lock,dist/**'\n  \
                     GITHUB_REPOSITORY=octocat/hello-world VIGIL_PR_NUMBER=42 vigil"
)]
struct Cli {
    /// Repository to review, in owner/name form
    #[arg(
        long,
        long_help = "Repository to review.\n\nFormat: owner/name\nDefaults to the GITHUB_REPOSITORY env var set by CI."
    )]
    repo: Option<String>,

    /// Pull request number
    #[arg(
        long,
        long_help = "Pull request number.\n\nDefaults to the VIGIL_PR_NUMBER env var."
    )]
    pr: Option<u64>,

    /// GitHub API token (default: GITHUB_TOKEN env var)
    #[arg(long)]
    github_token: Option<String>,

    /// Path to configuration file (default: .vigil.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Additional exclusion globs, comma separated (e.g. "*.lock,dist/**")
    #[arg(long)]
    exclude: Option<String>,

    /// Model identifier override
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => VigilConfig::from_file(path)
            .into_diagnostic()
            .wrap_err(format!("loading {}", path.display()))?,
        None => {
            let default_path = Path::new(".vigil.toml");
            if default_path.exists() {
                VigilConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("loading .vigil.toml")?
            } else {
                VigilConfig::default()
            }
        }
    };

    // Layering: CLI flags > env vars > config file > defaults.
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if config.llm.api_key.is_none() {
        config.llm.api_key = std::env::var("OPENAI_API_KEY").ok();
    }
    if let Ok(list) = std::env::var("VIGIL_EXCLUDE") {
        config.review.extend_exclusions(&list);
    }
    if let Some(list) = &cli.exclude {
        config.review.extend_exclusions(list);
    }

    if config.llm.api_key.is_none() {
        miette::bail!(miette::miette!(
            help = "Set OPENAI_API_KEY or add api_key in your .vigil.toml under [llm]",
            "No API key configured for the completion service"
        ));
    }

    let slug = match &cli.repo {
        Some(slug) => slug.clone(),
        None => std::env::var("GITHUB_REPOSITORY").map_err(|_| {
            miette::miette!(
                help = "Pass --repo owner/name or set GITHUB_REPOSITORY",
                "No repository given"
            )
        })?,
    };
    let (owner, repo) = parse_repo_slug(&slug).into_diagnostic()?;

    let number = match cli.pr {
        Some(n) => n,
        None => match std::env::var("VIGIL_PR_NUMBER") {
            Ok(raw) => raw
                .parse()
                .into_diagnostic()
                .wrap_err(format!("parsing VIGIL_PR_NUMBER '{raw}'"))?,
            Err(_) => {
                miette::bail!(miette::miette!(
                    help = "Pass --pr <number> or set VIGIL_PR_NUMBER",
                    "No pull request number given"
                ));
            }
        },
    };

    let host = GitHubHost::new(cli.github_token.as_deref(), owner, repo, number)
        .into_diagnostic()?;
    let backend = OpenAiBackend::new(&config.llm).into_diagnostic()?;
    let diff_filter = DiffFilter::new(&config.review.exclude_patterns).into_diagnostic()?;

    let pipeline = ReviewPipeline::new(
        Arc::new(host),
        ReviewClient::new(Arc::new(backend)),
        diff_filter,
        config.review.max_concurrency,
    );

    let outcome = pipeline.run().await.into_diagnostic()?;
    println!("{outcome}");

    Ok(())
}
