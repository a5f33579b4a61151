//! Prints the JSON schema of `planner.config.yaml`, or writes it to the path
//! given as the only argument. Editors pick it up through a `$schema` key or a
//! `yaml-language-server` modeline.

use std::error::Error;

use projection_planner_config::ProjectionPlannerConfig;
use schemars::generate::SchemaSettings;

fn main() -> Result<(), Box<dyn Error>> {
    let generator = SchemaSettings::draft2020_12()
        .with(|settings| {
            settings.inline_subschemas = true;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<ProjectionPlannerConfig>();
    let rendered = serde_json::to_string_pretty(&schema)?;

    match std::env::args().nth(1) {
        Some(output_file) => {
            std::fs::write(&output_file, rendered)?;
            eprintln!("Planner config schema written to {output_file}");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
