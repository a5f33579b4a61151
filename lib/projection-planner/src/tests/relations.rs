use std::error::Error;

use crate::{
    schema::{
        field::FieldDescriptor,
        registry::{ObjectType, SchemaRegistry},
        relation::{KeyColumns, RelationDeclaration, RelationError},
        type_ref::TypeRef,
    },
    tests::testkit::{build_plan, init_logger, requested_fields, BLOG_SCHEMA},
    PlanError, ProjectionPlanner, RequestArguments,
};

#[test]
fn belongs_to_injects_keys_on_both_sides() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        r#"
            query {
              posts {
                title
                author {
                  name
                }
              }
            }"#,
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", plan), @r"
    ProjectionPlan {
      Columns(author_id, title),
      Relation(author) {
        Columns(id, name),
      },
    }
    ");

    let author = plan.root.relation("author").unwrap();
    assert!(author.modifier.is_none());

    Ok(())
}

#[test]
fn has_many_keys_and_nested_relations() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        r#"
            query {
              posts {
                comments {
                  body
                  author { name }
                }
              }
            }"#,
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", plan), @r"
    ProjectionPlan {
      Columns(id),
      Relation(comments, query: Post.comments) {
        Columns(body, post_id, user_id),
        Relation(author) {
          Columns(id, name),
        },
      },
    }
    ");

    Ok(())
}

#[test]
fn morph_relations() -> Result<(), Box<dyn Error>> {
    init_logger();
    let tags = build_plan(
        BLOG_SCHEMA,
        "query { posts { tags { label } } }",
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", tags), @r"
    ProjectionPlan {
      Columns(id),
      Relation(tags) {
        Columns(label, taggable_id, taggable_type),
      },
    }
    ");

    let commentable = build_plan(
        BLOG_SCHEMA,
        "query { comments { body commentable { title } } }",
        "[Comment!]!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", commentable), @r"
    ProjectionPlan {
      Columns(body, commentable_id, commentable_type),
      Relation(commentable) {
        Columns(id, title),
      },
    }
    ");

    Ok(())
}

#[test]
fn composite_keys() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        "query { orders { total items { sku } } }",
        "[Order!]!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", plan), @r"
    ProjectionPlan {
      Columns(id, region, total),
      Relation(items) {
        Columns(order_id, order_region, sku),
      },
    }
    ");

    Ok(())
}

#[test]
fn requesting_keys_explicitly_does_not_duplicate_them() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        "query { posts { id comments { id post_id } } }",
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    assert_eq!(plan.root.column_list(), ["id"]);
    assert_eq!(
        plan.root.relation("comments").unwrap().node.column_list(),
        ["id", "post_id"]
    );

    Ok(())
}

#[test]
fn relations_without_keys_abort_planning() {
    init_logger();
    let registry = SchemaRegistry::builder()
        .object(
            ObjectType::new("Post")
                .with_model("Post")
                .field(FieldDescriptor::new("comments", "[Comment]".parse().unwrap())),
        )
        .object(
            ObjectType::new("Comment")
                .with_model("Comment")
                .field(FieldDescriptor::new("body", TypeRef::named("String"))),
        )
        .relation(
            "Post",
            "comments",
            RelationDeclaration::HasMany {
                foreign_key: KeyColumns::Many(vec![]),
                local_key: KeyColumns::default(),
                target: None,
            },
        )
        .build()
        .unwrap();

    let planner = ProjectionPlanner::new(&registry, &registry);
    let error = planner
        .plan(
            &requested_fields("query { posts { comments { body } } }"),
            &TypeRef::named("Post"),
            &RequestArguments::new(),
        )
        .unwrap_err();

    assert!(matches!(
        &error,
        PlanError::UnresolvableRelation {
            relation,
            source: RelationError::MissingKeys { side: "foreign", .. },
            ..
        } if relation == "comments"
    ));
    insta::assert_snapshot!(error.to_string(), @"field 'Post.comments' traverses relation 'comments' of model 'Post' with unresolvable keys: has_many relation declares no foreign key columns");
}

#[test]
fn unknown_root_types_are_rejected() {
    init_logger();
    let result = build_plan(
        BLOG_SCHEMA,
        "query { things { id } }",
        "[Thing]",
        &RequestArguments::new(),
    );

    let error = result.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<PlanError>(),
        Some(PlanError::UnknownType(name)) if name == "Thing"
    ));
}
