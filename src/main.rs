//! rdfq CLI: query, convert and inspect RDF data.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};

use rdfq::config::RdfqConfig;
use rdfq::engine::Engine;
use rdfq::export::GraphStatistics;
use rdfq::graph::Graph;
use rdfq::loader::Source;
use rdfq::query::results::{self, QueryOutput, ResultFormat};
use rdfq::query::{QuerySource, parse_bindings};

#[derive(Parser)]
#[command(
    name = "rdfq",
    version,
    about = "Process RDF data with SPARQL queries",
    group = clap::ArgGroup::new("source").required(true).args(["input", "inputs"]),
)]
struct Cli {
    /// Input RDF file or URL.
    #[arg(short, long)]
    input: Option<String>,

    /// Multiple input RDF files or URLs, queried as one dataset.
    #[arg(long, num_args = 1..)]
    inputs: Vec<String>,

    /// Input format hint (turtle, rdf_xml, json_ld, n_triples, ...).
    #[arg(long)]
    format: Option<String>,

    /// SPARQL query string.
    #[arg(short, long, conflicts_with = "query_file")]
    query: Option<String>,

    /// File containing a SPARQL query.
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Output file path (stdout if omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format for query results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output_format: OutputFormat,

    /// Convert RDF between formats.
    #[arg(long)]
    convert: bool,

    /// Target format for --convert and --schema. TriX cannot be written;
    /// rdf_thrift is written as RDF/XML.
    #[arg(long, default_value = "turtle")]
    target_format: String,

    /// Validate RDF data and print a summary.
    #[arg(long)]
    validate: bool,

    /// Print graph statistics as JSON.
    #[arg(long)]
    stats: bool,

    /// Extract class and property definitions.
    #[arg(long)]
    schema: bool,

    /// Pre-bind a query variable (NAME=VALUE, repeatable).
    #[arg(long = "bind", value_name = "NAME=VALUE")]
    bindings: Vec<String>,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging and full error chains.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Xml,
    Csv,
    Turtle,
    Table,
}

impl OutputFormat {
    fn result_format(self) -> ResultFormat {
        match self {
            OutputFormat::Json => ResultFormat::Json,
            OutputFormat::Xml => ResultFormat::Xml,
            OutputFormat::Csv => ResultFormat::Csv,
            OutputFormat::Turtle => ResultFormat::Graph,
            OutputFormat::Table => ResultFormat::Table,
        }
    }
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => {
            // --help and --version
            let _ = e.print();
            return Ok(());
        }
    };

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if let Err(report) = run(&cli) {
        if cli.verbose {
            eprintln!("{report:?}");
        } else {
            eprintln!("Error: {report}");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RdfqConfig::load(path)?,
        None => RdfqConfig::default(),
    };
    let engine = Engine::new(config);
    let hint = cli.format.as_deref();

    if cli.convert || cli.validate || cli.stats || cli.schema {
        let input = single_input(cli)?;

        if cli.convert {
            tracing::info!(target_format = %cli.target_format, "converting RDF");
            let graph = engine
                .converter()
                .convert(Source::from(input), hint, &cli.target_format)?;
            let text = engine.converter().serialize(&graph, &cli.target_format, None)?;
            return save_output(&text, cli.output.as_ref());
        }

        let graph = engine.load(input, hint)?;
        if cli.validate {
            let stats: GraphStatistics = engine.converter().validate(&graph);
            return save_output(&stats.summary(), cli.output.as_ref());
        }
        if cli.stats {
            let stats = engine.converter().validate(&graph);
            let text = serde_json::to_string_pretty(&stats).into_diagnostic()?;
            return save_output(&text, cli.output.as_ref());
        }
        let schema = engine.converter().extract_schema(&graph);
        let text = engine.converter().serialize(&schema, &cli.target_format, None)?;
        return save_output(&text, cli.output.as_ref());
    }

    let query = match (&cli.query, &cli.query_file) {
        (Some(query), _) => query.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .into_diagnostic()
            .map_err(|e| e.wrap_err(format!("failed to read query file {}", path.display())))?,
        (None, None) => {
            return Err(miette!(
                help = "Pass the query inline with --query or from a file with --query-file.",
                "no query specified"
            ));
        }
    };
    let bindings = parse_bindings(&cli.bindings)?;

    tracing::info!("executing SPARQL query");
    let dataset;
    let graph: Graph;
    let source: QuerySource<'_> = match &cli.input {
        Some(input) => {
            graph = engine.load(input.as_str(), hint)?;
            QuerySource::Graph(&graph)
        }
        None => {
            dataset = engine.load_dataset(&cli.inputs, hint);
            QuerySource::Dataset(&dataset)
        }
    };

    let output = engine.dispatcher().query(
        source,
        &query,
        cli.output_format.result_format(),
        &bindings,
    )?;
    let text = render_output(&engine, output)?;
    save_output(&text, cli.output.as_ref())
}

fn single_input(cli: &Cli) -> Result<&str> {
    match &cli.input {
        Some(input) => Ok(input.as_str()),
        None => Err(miette!(
            help = "Use --input for --convert, --validate, --stats and --schema.",
            "this operation supports only a single input"
        )),
    }
}

fn render_output(engine: &Engine, output: QueryOutput) -> Result<String> {
    Ok(match output {
        QueryOutput::Text(text) => text,
        QueryOutput::Table(rows) => results::render_table(&rows),
        QueryOutput::Graph(graph) => engine.converter().serialize(&graph, "turtle", None)?,
        QueryOutput::Bool(value) => value.to_string(),
        QueryOutput::Records(records) => serde_json::to_string_pretty(&records).into_diagnostic()?,
        // Non-graph results asked for as turtle.
        QueryOutput::Raw(outcome) => {
            let records = results::RowView::from_outcome(&outcome).records();
            serde_json::to_string_pretty(&records).into_diagnostic()?
        }
    })
}

fn save_output(content: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .into_diagnostic()
                .map_err(|e| e.wrap_err(format!("failed to write {}", path.display())))?;
            println!("Output saved to {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
