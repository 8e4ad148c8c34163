//! CPER Schema Generator CLI
//!
//! Command-line interface for building master schemas and EDMX documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cper_schemagen::{
    capitalize, load_schema, locate_root_schema, project_document, transform_key,
    validate_xml_file, ProjectOptions, ReferenceIndex, Resolver, XmlTemplate,
    DEFAULT_ROOT_BASETYPE, DEFAULT_START_PROPERTY,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cper-schemagen")]
#[command(about = "Build a master CPER JSON schema and convert it to EDMX XML")]
#[command(version)]
struct Cli {
    /// Log every inlined reference and emitted entity
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine a root schema and the files its $refs name into one schema
    #[command(name = "json_master")]
    JsonMaster {
        /// Root JSON schema (path, or file name inside the schema directory)
        #[arg(long, short)]
        schema: PathBuf,

        /// Root of the directory tree searched for $ref targets
        #[arg(long, short = 'd', env = "CPER_SCHEMA_DIR")]
        schemadir: PathBuf,

        /// Output file
        #[arg(long, short, default_value = "master-schema.json")]
        output: PathBuf,

        /// Capitalize the string value of every occurrence of this key
        #[arg(long)]
        capitalize_key: Option<String>,
    },

    /// Create an EDMX XML schema from a JSON schema
    #[command(name = "json_to_xml")]
    JsonToXml {
        /// Input JSON schema (or XML document with --validate)
        #[arg(long, short)]
        schema: PathBuf,

        /// Namespace every complex property type is qualified with
        #[arg(
            long,
            short = 'p',
            env = "CPER_PARENT_BASETYPE",
            default_value = DEFAULT_ROOT_BASETYPE
        )]
        parent_basetype: String,

        /// Only emit properties listed in "required"
        #[arg(long, short = 'r')]
        required: bool,

        /// Check an existing XML document for duplicate entity names instead
        #[arg(long, short = 'z')]
        validate: bool,

        /// Print the validation report as JSON
        #[arg(long, requires = "validate")]
        json: bool,

        /// File whose contents replace the EDMX header
        #[arg(long, short = 'x')]
        header: Option<PathBuf>,

        /// File whose contents replace the EDMX footer
        #[arg(long, short = 'f')]
        footer: Option<PathBuf>,

        /// Schema property the projection starts from
        #[arg(long, default_value = DEFAULT_START_PROPERTY)]
        start_property: String,

        /// Output file
        #[arg(long, short, default_value = "master-schema.xml")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::JsonMaster {
            schema,
            schemadir,
            output,
            capitalize_key,
        } => run_master(&schema, &schemadir, &output, capitalize_key.as_deref()),

        Commands::JsonToXml {
            schema,
            parent_basetype,
            required,
            validate,
            json,
            header,
            footer,
            start_property,
            output,
        } => {
            if validate {
                run_validate(&schema, json)
            } else {
                run_xml(XmlArgs {
                    schema,
                    parent_basetype,
                    required,
                    header,
                    footer,
                    start_property,
                    output,
                })
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_master(
    schema: &Path,
    schema_dir: &Path,
    output: &Path,
    capitalize_key: Option<&str>,
) -> Result<(), u8> {
    info!(schema_dir = %schema_dir.display(), "creating master schema");

    let index = ReferenceIndex::build(schema_dir).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let root_path = locate_root_schema(schema, schema_dir);
    let root = load_schema(&root_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let mut master = Resolver::new(&index).resolve(&root).map_err(|e| {
        eprintln!("Error resolving references: {}", e);
        e.exit_code() as u8
    })?;

    if let Some(key) = capitalize_key {
        master = transform_key(&master, key, capitalize);
    }

    let json_output = master_json(&master).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    write_output(output, &json_output)?;
    info!(output = %output.display(), "wrote master schema");
    Ok(())
}

/// One-space indented JSON with a trailing newline, the layout the
/// published master schema uses.
fn master_json(master: &serde_json::Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    master.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

struct XmlArgs {
    schema: PathBuf,
    parent_basetype: String,
    required: bool,
    header: Option<PathBuf>,
    footer: Option<PathBuf>,
    start_property: String,
    output: PathBuf,
}

fn run_xml(args: XmlArgs) -> Result<(), u8> {
    let XmlArgs {
        schema,
        parent_basetype,
        required,
        header,
        footer,
        start_property,
        output,
    } = args;
    info!(
        parent_basetype = %parent_basetype,
        required_only = required,
        "creating EDMX schema"
    );

    let mut template = XmlTemplate::default();
    if let Some(path) = header {
        template.header = read_text(&path)?;
    }
    if let Some(path) = footer {
        template.footer = read_text(&path)?;
    }

    let document = load_schema(&schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let options = ProjectOptions::new()
        .parent_basetype(parent_basetype)
        .required_only(required)
        .start_property(start_property)
        .template(template);

    let xml = project_document(&document, options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    write_output(&output, &format!("{}\n", xml))?;
    info!(output = %output.display(), "wrote EDMX schema");
    Ok(())
}

fn run_validate(path: &Path, json_output: bool) -> Result<(), u8> {
    let report = validate_xml_file(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if json_output {
        let output = serde_json::to_string_pretty(&report).map_err(|e| {
            eprintln!("Error serializing report: {}", e);
            2u8
        })?;
        println!("{}", output);
    } else if report.is_ok() {
        println!(
            "No duplicate entity names ({} entities checked)",
            report.entities
        );
    } else {
        for duplicate in &report.duplicates {
            println!(
                "Duplicate: {} ({} declarations)",
                duplicate.name, duplicate.occurrences
            );
        }
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(1)
    }
}

fn read_text(path: &Path) -> Result<String, u8> {
    std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        3u8
    })
}

fn write_output(path: &Path, content: &str) -> Result<(), u8> {
    std::fs::write(path, content).map_err(|e| {
        eprintln!("Error writing to {}: {}", path.display(), e);
        3u8
    })
}
