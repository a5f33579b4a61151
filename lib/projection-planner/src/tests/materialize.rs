use std::{error::Error, thread};

use serde_json::json;

use crate::{
    storage::EagerQuery,
    tests::testkit::{build_plan, init_logger, RecordingQuery, BLOG_SCHEMA},
    RequestArguments,
};

const COMMENTS_OPERATION: &str = r#"
    query {
      posts {
        title
        comments {
          body
          author { name }
        }
      }
    }"#;

#[test]
fn loaders_apply_modifiers_before_columns() -> Result<(), Box<dyn Error>> {
    init_logger();
    let arguments = RequestArguments::new();
    let plan = build_plan(BLOG_SCHEMA, COMMENTS_OPERATION, "[Post!]!", &arguments)?;

    let instructions = plan.materialize();
    assert_eq!(instructions.columns, ["id", "title"]);
    assert_eq!(instructions.relations.len(), 1);

    let (name, loader) = &instructions.relations[0];
    assert_eq!(name, "comments");

    let mut query = RecordingQuery::default();
    loader.apply(&mut query);

    insta::assert_snapshot!(query.calls.join("\n"), @r"
    where approved = true
    order by created_at desc
    limit 20
    select body, post_id, user_id
    author: select id, name
    ");

    Ok(())
}

#[test]
fn modifiers_read_the_captured_request_arguments() -> Result<(), Box<dyn Error>> {
    init_logger();
    let arguments = RequestArguments::new().with("status", "published");
    let plan = build_plan(
        BLOG_SCHEMA,
        "query { users { posts { data { title } } } }",
        "[User!]!",
        &arguments,
    )?;

    assert_eq!(plan.arguments().get_str("status"), Some("published"));

    let instructions = plan.materialize();
    let mut query = RecordingQuery::default();
    query.with(instructions.relations);

    assert_eq!(
        query.calls,
        [
            r#"posts: where status = "published""#,
            "posts: select author_id, title",
        ]
    );

    Ok(())
}

#[test]
fn loaders_can_run_concurrently() -> Result<(), Box<dyn Error>> {
    init_logger();
    let arguments = RequestArguments::new();
    let plan = build_plan(BLOG_SCHEMA, COMMENTS_OPERATION, "[Post!]!", &arguments)?;
    let instructions = plan.materialize();
    let (_, loader) = &instructions.relations[0];

    let mut expected = RecordingQuery::default();
    loader.apply(&mut expected);

    let recorded = thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| {
                let loader = loader.clone();
                scope.spawn(move || {
                    let mut query = RecordingQuery::default();
                    loader.apply(&mut query);
                    query.calls
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    for calls in recorded {
        assert_eq!(calls, expected.calls);
    }

    Ok(())
}

#[test]
fn plans_serialize_to_json() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        "query { posts { title notes comments { body } } }",
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    assert_eq!(
        serde_json::to_value(&plan)?,
        json!({
            "root": {
                "columns": ["id", "title"],
                "relations": {
                    "comments": {
                        "columns": ["body", "post_id"],
                        "relations": {},
                        "modifier": "Post.comments"
                    }
                }
            },
            "null_resolved": [
                { "type_name": "Post", "field_name": "notes" }
            ]
        })
    );

    Ok(())
}
