use std::error::Error;

use crate::{
    tests::testkit::{build_plan, build_plan_with_options, init_logger, BLOG_SCHEMA},
    PlannerOptions, RequestArguments,
};

const META_OPERATION: &str = r#"
    query {
      posts {
        title
        meta {
          views
          seo { description }
        }
      }
    }"#;

#[test]
fn embedded_objects_flatten_into_prefixed_columns() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        META_OPERATION,
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", plan), @r"
    ProjectionPlan {
      Columns(meta.seo.description, meta.views, title),
    }
    ");

    Ok(())
}

#[test]
fn embedded_separator_is_configurable() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan_with_options(
        BLOG_SCHEMA,
        META_OPERATION,
        "[Post!]!",
        &RequestArguments::new(),
        PlannerOptions {
            embedded_separator: "__".to_string(),
            ..Default::default()
        },
    )?;

    assert_eq!(
        plan.root.column_list(),
        ["meta__seo__description", "meta__views", "title"]
    );

    Ok(())
}

#[test]
fn composites_of_model_less_types_compile_in_place() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        "query { search { total posts { id title author { name } } } }",
        "SearchResults!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", plan), @r"
    ProjectionPlan {
      Columns(author_id, id, title, total),
      Relation(author) {
        Columns(id, name),
      },
    }
    ");

    Ok(())
}

#[test]
fn aliases_unknown_keys_and_typename() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        "query { posts { __typename headline legacy_flag published_at } }",
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", plan), @r"
    ProjectionPlan {
      Columns(headline_text, legacy_flag, published_at),
    }
    ");

    Ok(())
}
