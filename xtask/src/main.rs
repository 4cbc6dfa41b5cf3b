//! Developer tasks (schema generation and drift checks).

use anyhow::{Context, bail};
use orgguard_settings::{FileKind, file_schema};
use orgguard_types::{ClassificationKind, PolicyKind};
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;

/// Project root (parent of the xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("Cannot determine current directory")?,
    };
    if manifest_dir.ends_with("xtask") {
        return manifest_dir
            .parent()
            .map(PathBuf::from)
            .context("xtask has no parent");
    }
    Ok(manifest_dir)
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

/// Every schema with its target file name.
fn schema_specs() -> Vec<(String, schemars::Schema)> {
    let mut specs = vec![(
        "orgguard.audit.v1.json".to_string(),
        schema_for!(orgguard_types::AuditRunResult),
    )];
    for kind in ClassificationKind::ALL {
        specs.push((
            format!("orgguard.classification.{kind}.v1.json"),
            file_schema(FileKind::Classification(kind)),
        ));
    }
    for kind in PolicyKind::ALL {
        specs.push((
            format!("orgguard.policy.{kind}.v1.json"),
            file_schema(FileKind::Policy(kind)),
        ));
    }
    specs
}

/// Pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for (filename, schema) in schema_specs() {
        let path = dir.join(&filename);
        fs::write(&path, serialize_schema(&schema)?)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Check that schemas/ matches what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut stale = Vec::new();

    for (filename, schema) in schema_specs() {
        let path = dir.join(&filename);
        let expected = serialize_schema(&schema)?;
        match fs::read_to_string(&path) {
            Ok(actual) if actual == expected => {}
            _ => stale.push(filename),
        }
    }

    if stale.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    eprintln!("Missing or out of date schemas:");
    for name in &stale {
        eprintln!("  - {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
