//! # jsontask-cli
//!
//! Command-line interface for the JSON task toolkit.
//!
//! Each subcommand wraps one library crate: mapping, querying, validating,
//! converting and rendering JSON documents from the shell.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::Value;

use jsontask_mapping::MapOptions;
use jsontask_template::{RenderOptions, TemplatePartial};
use jsontask_validate::ValidateOptions;

#[derive(Parser)]
#[command(name = "jsontask")]
#[command(about = "JSON mapping, querying, validation and templating")]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Map fields from a source document using a rule list
    Map {
        /// Source JSON file path
        source: PathBuf,

        /// Mapping rule file path
        #[arg(short, long)]
        rules: PathBuf,

        /// Existing destination JSON file to map into
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Unwrap #cdata-section objects from resolved values
        #[arg(long)]
        unpack_cdata: bool,
    },

    /// Evaluate a JSONPath query against a document
    Query {
        /// Input JSON file path
        input: PathBuf,

        /// JSONPath expression
        query: String,

        /// Print every match instead of the first
        #[arg(short, long)]
        all: bool,

        /// Fail when nothing matches
        #[arg(long)]
        required: bool,
    },

    /// Validate a document against a JSON Schema
    Validate {
        /// Input JSON file path
        input: PathBuf,

        /// Schema file path
        #[arg(short, long)]
        schema: PathBuf,

        /// Exit with an error when the document is invalid
        #[arg(long)]
        strict: bool,
    },

    /// Convert an input document to a JSON tree
    Convert {
        /// Input file path
        input: PathBuf,

        /// Input format, guessed from the file extension when omitted
        #[arg(short, long)]
        format: Option<InputFormat>,
    },

    /// Render a template with a JSON document as context
    Render {
        /// Context JSON file path
        data: PathBuf,

        /// Template file path
        template: PathBuf,

        /// Accept [[name]] placeholders instead of {{name}}
        #[arg(long)]
        angle_brackets: bool,

        /// Partial template files, registered under their file stem
        #[arg(short, long)]
        partial: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    Json,
    Xml,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Map {
            source,
            rules,
            destination,
            unpack_cdata,
        } => {
            tracing::debug!("mapping {} with rules from {}", source.display(), rules.display());
            let source = read_json(&source)?;
            let rules = fs::read_to_string(&rules)
                .with_context(|| format!("reading rules from {}", rules.display()))?;
            let destination = destination.map(|path| read_json(&path)).transpose()?;
            let options = MapOptions {
                unpack_cdata_section: unpack_cdata,
                ..MapOptions::default()
            };
            let result = jsontask_mapping::map(&source, destination, &rules, &options)?;
            print_json(&result)?;
        }
        Commands::Query {
            input,
            query,
            all,
            required,
        } => {
            tracing::debug!("querying {} with '{}'", input.display(), query);
            let document = read_json(&input)?;
            if all {
                let matches = jsontask_query::select_all(&document, &query, required)?;
                print_json(&Value::Array(matches.into_iter().cloned().collect()))?;
            } else {
                match jsontask_query::select_one(&document, &query)? {
                    Some(found) => print_json(found)?,
                    None if required => anyhow::bail!("query '{query}' matched nothing"),
                    None => print_json(&Value::Null)?,
                }
            }
        }
        Commands::Validate {
            input,
            schema,
            strict,
        } => {
            let document = read_json(&input)?;
            let schema = read_json(&schema)?;
            let options = ValidateOptions {
                error_on_invalid: strict,
            };
            let report = jsontask_validate::validate(&document, &schema, &options)?;
            print_json(&serde_json::to_value(&report)?)?;
        }
        Commands::Convert { input, format } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let format = format.unwrap_or_else(|| guess_format(&input));
            let tree = match format {
                InputFormat::Json => jsontask_convert::json_to_tree(&text)?,
                InputFormat::Xml => jsontask_convert::xml_to_tree(&text)?,
            };
            print_json(&tree)?;
        }
        Commands::Render {
            data,
            template,
            angle_brackets,
            partial,
        } => {
            let data = read_json(&data)?;
            let template = fs::read_to_string(&template)
                .with_context(|| format!("reading template from {}", template.display()))?;
            let partials = partial
                .iter()
                .map(|path| read_partial(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let options = RenderOptions {
                use_angle_brackets: angle_brackets,
            };
            let output = jsontask_template::render(&data, &template, &partials, &options)?;
            println!("{output}");
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    jsontask_convert::json_to_tree(&text)
        .with_context(|| format!("parsing {}", path.display()))
}

fn read_partial(path: &Path) -> anyhow::Result<TemplatePartial> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .with_context(|| format!("partial path {} has no file name", path.display()))?;
    let template = fs::read_to_string(path)
        .with_context(|| format!("reading partial from {}", path.display()))?;
    Ok(TemplatePartial { name, template })
}

fn guess_format(path: &Path) -> InputFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xml") => InputFormat::Xml,
        _ => InputFormat::Json,
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
