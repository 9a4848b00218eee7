//! Intervention Taxonomy Command Line Interface
//!
//! Contribute new interventions and browse the published taxonomy from a
//! terminal.
//!
//! # Usage
//!
//! ```bash
//! # Write the blank contribution template
//! intervention-cli template --output intervention_template.csv
//!
//! # Check a filled-in CSV without sending it
//! intervention-cli validate --file contributions.csv
//!
//! # Validate and send to the append endpoint
//! intervention-cli submit --file contributions.csv --endpoint http://localhost:3000
//!
//! # Add one entry by hand
//! intervention-cli add --intervention-type "Forwarding Limits" \
//!     --description "Limits on how often a message can be forwarded" \
//!     --focus Behavioral --driver Platform-Driven --user-journey Proactive \
//!     --scope Systemic --contact me@example.org --submit
//!
//! # Search the taxonomy
//! intervention-cli browse --search label --platform Reddit
//! ```

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use intervention_taxonomy::config::{DEFAULT_ENDPOINT, ENDPOINT_ENV, TAXONOMY_PATH_ENV};
use intervention_taxonomy::template::{template_csv, TEMPLATE_FILENAME};
use intervention_taxonomy::{
    ContributionForm, ContributionSession, Facet, HttpSubmissionClient, TaxonomyCatalog,
    TaxonomyQuery, ValidationResult,
};

#[derive(Parser)]
#[command(name = "intervention-cli")]
#[command(version)]
#[command(about = "Contribute to and browse the social-media intervention taxonomy")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: json, text, or pretty (default)
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the contribution CSV template
    Template {
        /// Destination file (stdout if not provided)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a contribution CSV without submitting it
    Validate {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Validate a contribution CSV and submit it
    Submit {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Add one intervention entered field by field
    Add {
        #[command(flatten)]
        form: FormArgs,

        /// Existing CSV to append the entry to
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Submit once the combined rows validate
        #[arg(long)]
        submit: bool,

        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Search and filter the published taxonomy
    Browse {
        /// Case-insensitive text search
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(long)]
        focus: Vec<String>,

        #[arg(long)]
        driver: Vec<String>,

        #[arg(long)]
        user_journey: Vec<String>,

        #[arg(long)]
        scope: Vec<String>,

        #[arg(long)]
        platform: Vec<String>,

        /// Show considerations, tradeoffs and references
        #[arg(long)]
        verbose: bool,

        #[command(flatten)]
        taxonomy: TaxonomyArgs,
    },

    /// List the filter options for every facet
    Facets {
        #[command(flatten)]
        taxonomy: TaxonomyArgs,
    },
}

#[derive(Args)]
struct EndpointArgs {
    /// Server root hosting /api/interventions
    #[arg(long, env = ENDPOINT_ENV, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
}

#[derive(Args)]
struct TaxonomyArgs {
    /// Taxonomy YAML (built-in data if not provided)
    #[arg(long, env = TAXONOMY_PATH_ENV)]
    taxonomy: Option<PathBuf>,
}

impl TaxonomyArgs {
    fn load(&self) -> Result<TaxonomyCatalog> {
        match &self.taxonomy {
            Some(path) => TaxonomyCatalog::load(path)
                .with_context(|| format!("Failed to load taxonomy '{}'", path.display())),
            None => TaxonomyCatalog::builtin().context("Built-in taxonomy is invalid"),
        }
    }
}

#[derive(Args)]
struct FormArgs {
    #[arg(long, default_value = "")]
    intervention_type: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Behavioral, Content or Visibility
    #[arg(long, default_value = "")]
    focus: String,
    /// Platform-Driven or User-Driven
    #[arg(long, default_value = "")]
    driver: String,
    /// Proactive or Retroactive
    #[arg(long, default_value = "")]
    user_journey: String,
    /// Systemic or Targeted
    #[arg(long, default_value = "")]
    scope: String,
    #[arg(long, default_value = "")]
    link: String,
    #[arg(long, default_value = "")]
    contact: String,
}

impl From<FormArgs> for ContributionForm {
    fn from(args: FormArgs) -> Self {
        ContributionForm {
            intervention_type: args.intervention_type,
            description: args.description,
            focus: args.focus,
            driver: args.driver,
            user_journey: args.user_journey,
            scope: args.scope,
            link: args.link,
            contact: args.contact,
        }
    }
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    let result = match cli.command {
        Commands::Template { output } => cmd_template(output, format),
        Commands::Validate { file } => cmd_validate(file, format),
        Commands::Submit { file, endpoint } => cmd_submit(file, &endpoint.endpoint, format).await,
        Commands::Add {
            form,
            file,
            submit,
            endpoint,
        } => cmd_add(form.into(), file, submit.then_some(endpoint.endpoint.as_str()), format).await,
        Commands::Browse {
            search,
            focus,
            driver,
            user_journey,
            scope,
            platform,
            verbose,
            taxonomy,
        } => {
            let mut query = TaxonomyQuery::new().with_search(search);
            for (facet, values) in [
                (Facet::Focus, focus),
                (Facet::Driver, driver),
                (Facet::UserJourney, user_journey),
                (Facet::Scope, scope),
                (Facet::Platform, platform),
            ] {
                for value in values {
                    query.toggle(facet, value, true);
                }
            }
            cmd_browse(&query, &taxonomy, verbose, format)
        }
        Commands::Facets { taxonomy } => cmd_facets(&taxonomy, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_template(output: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let Some(path) = output else {
        println!("{}", template_csv());
        return Ok(());
    };

    intervention_taxonomy::template::write_template(&path)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "written": path.display().to_string(),
            "filename": TEMPLATE_FILENAME,
        }))?,
        OutputFormat::Text | OutputFormat::Pretty => {
            println!("{} Template written to {}", "OK".green(), path.display())
        }
    }
    Ok(())
}

fn cmd_validate(file: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let mut session = ContributionSession::new();
    let result = session.load_csv(&read_input(file)?);
    print_validation(&result, format)?;

    if !result.is_valid {
        bail!("Validation failed");
    }
    Ok(())
}

async fn cmd_submit(file: Option<PathBuf>, endpoint: &str, format: OutputFormat) -> Result<()> {
    let mut session = ContributionSession::new();
    let result = session.load_csv(&read_input(file)?);
    print_validation(&result, format)?;
    if !result.is_valid {
        bail!("Validation failed; nothing submitted");
    }

    submit_session(&mut session, endpoint, format).await
}

async fn cmd_add(
    form: ContributionForm,
    file: Option<PathBuf>,
    submit_to: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let mut session = ContributionSession::new();
    if let Some(path) = file {
        let existing = session.load_file(&path);
        if !existing.is_valid {
            print_validation(&existing, format)?;
            bail!("'{}' does not validate; fix it before adding to it", path.display());
        }
    }

    let result = session.add_from_form(&form)?;
    print_validation(&result, format)?;
    if !result.is_valid {
        bail!("Validation failed");
    }

    match submit_to {
        Some(endpoint) => submit_session(&mut session, endpoint, format).await,
        None => Ok(()),
    }
}

async fn submit_session(
    session: &mut ContributionSession,
    endpoint: &str,
    format: OutputFormat,
) -> Result<()> {
    let client = HttpSubmissionClient::new(endpoint)?;
    let rows = session.rows().len();
    session.submit(&client).await?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "submitted": rows,
            "endpoint": client.endpoint().as_str(),
        }))?,
        OutputFormat::Text | OutputFormat::Pretty => println!(
            "{} Submitted {} intervention(s) to {}",
            "OK".green().bold(),
            rows,
            client.endpoint()
        ),
    }
    Ok(())
}

fn cmd_browse(
    query: &TaxonomyQuery,
    taxonomy: &TaxonomyArgs,
    verbose: bool,
    format: OutputFormat,
) -> Result<()> {
    let catalog = taxonomy.load()?;
    let matches = catalog.filter(query);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "total": catalog.len(),
            "matched": matches.len(),
            "activeFilters": query.active_filter_count(),
            "entries": matches,
        }))?,
        OutputFormat::Text | OutputFormat::Pretty => {
            println!(
                "Showing {} of {} interventions ({} filter(s) active)",
                matches.len(),
                catalog.len(),
                query.active_filter_count()
            );
            for entry in matches {
                println!();
                println!("{}", entry.intervention_type.bold());
                println!(
                    "  {} | {} | {} | {}",
                    entry.focus.cyan(),
                    entry.driver,
                    entry.user_journey,
                    entry.scope
                );
                if !entry.platform.is_empty() {
                    println!("  platforms: {}", entry.platform);
                }
                if !entry.description.is_empty() {
                    println!("  {}", entry.description);
                }
                if verbose {
                    println!("  {} {}", "considerations:".dimmed(), entry.considerations);
                    println!("  {} {}", "tradeoffs:".dimmed(), entry.tradeoffs);
                    for reference in entry.reference_list() {
                        println!("  [{}] {}", reference.citation.green(), reference.url);
                    }
                }
            }
        }
    }
    Ok(())
}

fn cmd_facets(taxonomy: &TaxonomyArgs, format: OutputFormat) -> Result<()> {
    let options = taxonomy.load()?.facet_options();

    match format {
        OutputFormat::Json => print_json(&options)?,
        OutputFormat::Text | OutputFormat::Pretty => {
            for (facet, values) in &options {
                println!("{} ({})", facet.label().bold(), facet.key());
                for value in values {
                    println!("  {value}");
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn print_validation(result: &ValidationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(result)?,
        OutputFormat::Text | OutputFormat::Pretty => {
            if result.is_valid {
                println!(
                    "{} {} row(s) valid",
                    "OK".green().bold(),
                    result.row_count
                );
            } else {
                println!(
                    "{} {} error(s) in {} row(s)",
                    "FAIL".red().bold(),
                    result.errors.len(),
                    result.row_count
                );
            }
            for error in &result.errors {
                println!("  {} {}", "error:".red(), error);
            }
            for warning in &result.warnings {
                println!("  {} {}", "warning:".yellow(), warning);
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{text}");
    Ok(())
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            if io::stdin().is_terminal() {
                bail!("No input provided. Use --file or pipe a CSV via stdin.");
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}
