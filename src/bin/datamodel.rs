//! Data model CLI
//!
//! Imports Avro schemas, shows their structure, and renames or documents
//! types and fields with a preview of the change.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use familiar_datamodel::avro;
use familiar_datamodel::render::{self, Renderer};
use familiar_datamodel::{FieldPath, Fingerprint, ModelConfig, SchemaEditor, Type, TypeCollection};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "datamodel")]
#[command(about = "Inspect and evolve Avro schemas")]
struct Cli {
    /// Additional configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the structure of a schema
    Show { file: PathBuf },

    /// Print the canonical form of a schema
    Export { file: PathBuf },

    /// Verify that every schema under a directory round-trips
    Check { dir: PathBuf },

    /// Rename a field, or with --type the struct or enum it holds
    Rename {
        file: PathBuf,
        /// Dotted field path; empty for the root record
        #[arg(short, long, default_value = "")]
        path: String,
        #[arg(long = "type")]
        rename_type: bool,
        new_name: String,
    },

    /// Set the documentation of a field, or with --type of its type
    Document {
        file: PathBuf,
        #[arg(short, long, default_value = "")]
        path: String,
        #[arg(long = "type")]
        document_type: bool,
        text: String,
    },

    /// Parse a literal with the type of a field
    ParseValue {
        file: PathBuf,
        #[arg(short, long)]
        path: String,
        literal: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ModelConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Show { file } => {
            let (types, root) = load(&file, &config)?;
            println!("{}", render_type(&types, &root, &config));
        }

        Commands::Export { file } => {
            let (types, root) = load(&file, &config)?;
            println!("{}", export(&types, &root, &config)?);
        }

        Commands::Check { dir } => check(&dir, &config)?,

        Commands::Rename { file, path, rename_type, new_name } => {
            edit(&file, &config, |editor| {
                let path = FieldPath::parse(&path);
                if rename_type {
                    editor.rename_type(&path, &new_name)
                } else {
                    editor.rename_field(&path, &new_name)
                }
            })?;
        }

        Commands::Document { file, path, document_type, text } => {
            edit(&file, &config, |editor| {
                let path = FieldPath::parse(&path);
                if document_type {
                    editor.document_type(&path, text.as_str())
                } else {
                    editor.document_field(&path, text.as_str())
                }
            })?;
        }

        Commands::ParseValue { file, path, literal } => {
            let (mut types, root) = load(&file, &config)?;
            let id = root_struct(&root, &file)?;
            let field_type = SchemaEditor::new(&mut types, id).resolve(&FieldPath::parse(&path))?;
            match types.parse_value(&field_type, Some(&literal))? {
                Some(value) => println!("{}", value),
                None => println!("(no value)"),
            }
        }
    }

    Ok(())
}

fn load(file: &Path, config: &ModelConfig) -> anyhow::Result<(TypeCollection, Type)> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let schema: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", file.display()))?;
    if config.import.validate {
        avro::validate(&schema).with_context(|| format!("validating {}", file.display()))?;
    }
    Ok(avro::from_schema(&schema).with_context(|| format!("importing {}", file.display()))?)
}

fn export(types: &TypeCollection, root: &Type, config: &ModelConfig) -> anyhow::Result<String> {
    let schema = avro::to_schema(types, root)?;
    if config.export.validate {
        avro::validate(&schema).context("validating exported schema")?;
    }
    Ok(config.export.output_format.write(&schema)?)
}

fn render_type(types: &TypeCollection, root: &Type, config: &ModelConfig) -> String {
    Renderer::new(types)
        .with_indent(config.render.indent)
        .render(root, "")
}

fn root_struct(root: &Type, file: &Path) -> anyhow::Result<familiar_datamodel::StructId> {
    match root {
        Type::Struct(id) => Ok(*id),
        _ => bail!("{} does not describe a record", file.display()),
    }
}

/// Apply an edit, then print the rendering diff and the new schema
fn edit(
    file: &Path,
    config: &ModelConfig,
    apply: impl FnOnce(&mut SchemaEditor<'_>) -> familiar_datamodel::Result<()>,
) -> anyhow::Result<()> {
    let (mut types, root) = load(file, config)?;
    let id = root_struct(&root, file)?;
    let before = render_type(&types, &root, config);

    apply(&mut SchemaEditor::new(&mut types, id))?;

    let after = render_type(&types, &root, config);
    print!("{}", render::diff(&before, &after));
    println!();
    println!("{}", export(&types, &root, config)?);
    Ok(())
}

fn check(dir: &Path, config: &ModelConfig) -> anyhow::Result<()> {
    let mut checked = 0;
    let mut failures = 0;

    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(config.check.extension.as_str())
        {
            continue;
        }
        checked += 1;
        match check_file(path, config) {
            Ok(fingerprint) => println!("✓ {} {}", path.display(), fingerprint),
            Err(e) => {
                failures += 1;
                println!("✗ {}: {:#}", path.display(), e);
            }
        }
    }

    println!("\n{} schemas checked, {} failed", checked, failures);
    if failures > 0 {
        bail!("{} schemas do not round-trip", failures);
    }
    Ok(())
}

/// Import, export and re-import a schema; the exported form must be stable
fn check_file(path: &Path, config: &ModelConfig) -> anyhow::Result<Fingerprint> {
    let (types, root) = load(path, config)?;
    let exported = avro::to_schema(&types, &root)?;
    let (reimported_types, reimported_root) = avro::from_schema(&exported)?;
    if !types.types_equal(&root, &reimported_types, &reimported_root) {
        bail!("re-imported types differ from the original import");
    }
    if avro::to_schema(&reimported_types, &reimported_root)? != exported {
        bail!("exported schema is not a fixed point");
    }
    Ok(Fingerprint::of(&avro::to_avro(&types, &root)?))
}
