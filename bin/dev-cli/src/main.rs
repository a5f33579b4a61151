mod logger;

use std::env;
use std::error::Error;
use std::process;

use graphql_parser::query::parse_query;
use projection_planner::schema::definition::SchemaDefinition;
use projection_planner::{
    PlannerOptions, ProjectionPlan, ProjectionPlanner, RequestArguments, RequestedFieldTree,
    TypeRef,
};
use projection_planner_config::{load_config, selection::SelectionConfig, ProjectionPlannerConfig};
use tracing::debug;

use crate::logger::configure_logging;

const PLAN_USAGE: &str = "projection-dev-cli plan <schema.json> <operation.graphql> <root-type> [--args <json>] [--operation <name>] [--json] [--config <path>]";
const TREE_USAGE: &str =
    "projection-dev-cli tree <operation.graphql> [--operation <name>] [--json] [--config <path>]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Plan,
    Tree,
}

/// Picks the command, or the usage text to print when its arguments are missing.
fn parse_command(args: &[String]) -> Result<Command, String> {
    match args.get(1).map(String::as_str) {
        Some("plan") if args.len() >= 5 => Ok(Command::Plan),
        Some("plan") => Err(format!("Usage: {PLAN_USAGE}")),
        Some("tree") if args.len() >= 3 => Ok(Command::Tree),
        Some("tree") => Err(format!("Usage: {TREE_USAGE}")),
        Some(other) => Err(format!(
            "Unknown command '{other}'. Available commands: plan, tree"
        )),
        None => Err(format!("Usage:\n  {PLAN_USAGE}\n  {TREE_USAGE}")),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(usage) => {
            eprintln!("{usage}");
            process::exit(1);
        }
    };

    let config = match load_config(flag_value(&args, "--config")) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };
    configure_logging(&config.log);

    let result = match command {
        Command::Plan => process_plan(&args, &config),
        Command::Tree => process_tree(&args, &config),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn process_plan(args: &[String], config: &ProjectionPlannerConfig) -> Result<(), Box<dyn Error>> {
    let registry = SchemaDefinition::from_path(&args[2])?.into_registry()?;
    let requested = read_requested_fields(&args[3], args, config)?;
    let (root_field, selection) = requested
        .root_field()
        .ok_or("the operation must select a single composite root field")?;
    let root_type: TypeRef = args[4].parse()?;
    let arguments = match flag_value(args, "--args") {
        Some(raw) => RequestArguments::from_json(&raw)?,
        None => RequestArguments::new(),
    };

    debug!(root_field, root_type = %root_type, "planning root field");

    let planner = ProjectionPlanner::new(&registry, &registry)
        .with_options(planner_options(&config.selection));
    let plan = planner.plan(selection, &root_type, &arguments)?;

    print_plan(&plan, args.contains(&"--json".into()))
}

fn process_tree(args: &[String], config: &ProjectionPlannerConfig) -> Result<(), Box<dyn Error>> {
    let requested = read_requested_fields(&args[2], args, config)?;

    if args.contains(&"--json".into()) {
        println!("{}", serde_json::to_string_pretty(&requested)?);
    } else {
        println!("{}", requested);
    }

    Ok(())
}

fn read_requested_fields(
    operation_path: &str,
    args: &[String],
    config: &ProjectionPlannerConfig,
) -> Result<RequestedFieldTree, Box<dyn Error>> {
    let document_text = std::fs::read_to_string(operation_path)?;
    let document = parse_query::<String>(&document_text).map_err(|err| err.to_string())?;
    let operation_name = flag_value(args, "--operation");

    Ok(RequestedFieldTree::from_operation(
        &document,
        operation_name.as_deref(),
        config.selection.max_depth,
    )?)
}

fn print_plan(plan: &ProjectionPlan, as_json: bool) -> Result<(), Box<dyn Error>> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(plan)?);
    } else {
        println!("{}", plan);
    }

    Ok(())
}

fn planner_options(selection: &SelectionConfig) -> PlannerOptions {
    PlannerOptions {
        embedded_separator: selection.embedded_separator.clone(),
        pagination_item_fields: selection.pagination_item_fields.clone(),
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn incomplete_plan_prints_plan_usage() {
        let usage = parse_command(&args(&["projection-dev-cli", "plan", "schema.json"])).unwrap_err();

        assert_eq!(usage, format!("Usage: {PLAN_USAGE}"));
    }

    #[test]
    fn recognizes_commands() {
        assert_eq!(
            parse_command(&args(&["cli", "plan", "schema.json", "op.graphql", "[Post!]!"])),
            Ok(Command::Plan)
        );
        assert_eq!(
            parse_command(&args(&["cli", "tree", "op.graphql"])),
            Ok(Command::Tree)
        );
        assert_eq!(
            parse_command(&args(&["cli", "tree"])),
            Err(format!("Usage: {TREE_USAGE}"))
        );
        assert!(parse_command(&args(&["cli", "graph", "x"]))
            .unwrap_err()
            .starts_with("Unknown command 'graph'"));
    }
}
