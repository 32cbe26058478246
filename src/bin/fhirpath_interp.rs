// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command line interface for evaluating FHIRPath expressions against JSON documents

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;

use octofhir_fhirpath_interp::{Collection, EvaluationContext, FhirPathEngine, TreeAdapter, parse};

#[derive(Parser, Debug)]
#[command(name = "fhirpath-interp")]
#[command(about = "Evaluate FHIRPath expressions against JSON documents")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an expression against a JSON document
    Evaluate {
        /// FHIRPath expression to evaluate
        expression: String,
        /// JSON file containing the document (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
        /// External constant as name=json, visible as %name
        #[arg(long = "var", value_parser = parse_variable)]
        variables: Vec<(String, JsonValue)>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Parse an expression and print its syntax tree
    Parse {
        /// FHIRPath expression to parse
        expression: String,
    },
    /// Check expression syntax; the exit status reports validity
    Validate {
        /// FHIRPath expression to validate
        expression: String,
        /// Suppress informational messages
        #[arg(short, long)]
        quiet: bool,
    },
}

/// `name=value` where value is JSON, or a bare string when it is not
fn parse_variable(raw: &str) -> std::result::Result<(String, JsonValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.is_empty() {
        return Err("variable name is empty".to_string());
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((name.to_string(), value))
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Evaluate {
            expression,
            input,
            variables,
            pretty,
        } => handle_evaluate(&expression, input.as_deref(), variables, pretty),
        Commands::Parse { expression } => handle_parse(&expression),
        Commands::Validate { expression, quiet } => handle_validate(&expression, quiet),
    };

    if let Err(err) = outcome {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn read_document(input: Option<&str>) -> Result<JsonValue> {
    let text = match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading file '{path}'"))?
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&text).context("parsing JSON document")
}

fn handle_evaluate(
    expression: &str,
    input: Option<&str>,
    variables: Vec<(String, JsonValue)>,
    pretty: bool,
) -> Result<()> {
    let document = read_document(input)?;
    let mut context = EvaluationContext::new(document.to_node()?);
    for (name, value) in variables {
        let value: Collection = value
            .to_node()
            .with_context(|| format!("adapting variable %{name}"))?
            .into();
        context.set_variable(name, value);
    }

    let engine = FhirPathEngine::new();
    let result = engine.evaluate_with_context(expression, &context)?;
    log::debug!("{expression} produced {} item(s)", result.len());

    let json = result.to_json();
    let output = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    println!("{output}");
    Ok(())
}

fn handle_parse(expression: &str) -> Result<()> {
    let ast = parse(expression)?;
    println!("{ast:#?}");
    Ok(())
}

fn handle_validate(expression: &str, quiet: bool) -> Result<()> {
    match parse(expression) {
        Ok(_) => {
            if !quiet {
                println!("✓ Expression is valid");
            }
            Ok(())
        }
        Err(err) => {
            if quiet {
                process::exit(1);
            }
            bail!("invalid expression at position {}: {err}", err.position())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_evaluate_arguments() {
        let cli = Cli::try_parse_from([
            "fhirpath-interp",
            "evaluate",
            "Patient.name.given",
            "--input",
            "patient.json",
            "--var",
            "limit=3",
            "--var",
            "label=official",
        ])
        .unwrap();
        match cli.command {
            Commands::Evaluate {
                expression,
                input,
                variables,
                pretty,
            } => {
                assert_eq!(expression, "Patient.name.given");
                assert_eq!(input.as_deref(), Some("patient.json"));
                assert_eq!(
                    variables,
                    vec![
                        ("limit".to_string(), serde_json::json!(3)),
                        ("label".to_string(), serde_json::json!("official")),
                    ]
                );
                assert!(!pretty);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli =
            Cli::try_parse_from(["fhirpath-interp", "validate", "1 + 1", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_variable_requires_name() {
        assert!(parse_variable("=3").is_err());
        assert!(parse_variable("novalue").is_err());
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["fhirpath-interp"]).is_err());
    }
}
