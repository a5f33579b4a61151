use std::{
    error::Error,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use crate::{
    privacy::Policy,
    schema::{field::FieldDescriptor, registry::{ObjectType, SchemaRegistry}, type_ref::TypeRef},
    tests::testkit::{build_plan, init_logger, requested_fields, BLOG_SCHEMA},
    PrivacyRule, ProjectionPlanner, RequestArguments,
};

#[test]
fn denied_fields_keep_their_always_columns() -> Result<(), Box<dyn Error>> {
    init_logger();
    let operation = "query { posts { summary } }";

    let guest = build_plan(
        BLOG_SCHEMA,
        operation,
        "[Post!]!",
        &RequestArguments::new().with("role", "guest"),
    )?;

    insta::assert_snapshot!(format!("{}", guest), @r"
    ProjectionPlan {
      Columns(status),
      NullResolved(Post.summary),
    }
    ");
    assert!(guest.is_null_resolved("Post", "summary"));
    assert!(!guest.is_null_resolved("Post", "title"));
    assert!(!guest.is_null_resolved("User", "summary"));

    let admin = build_plan(
        BLOG_SCHEMA,
        operation,
        "[Post!]!",
        &RequestArguments::new().with("role", "admin"),
    )?;

    insta::assert_snapshot!(format!("{}", admin), @r"
    ProjectionPlan {
      Columns(status, summary),
    }
    ");
    assert!(admin.null_resolved.is_empty());

    Ok(())
}

#[test]
fn named_policies_mask_every_field_referencing_them() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        r#"
            query {
              posts {
                title
                notes
                score
                author { name email }
              }
            }"#,
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    insta::assert_snapshot!(format!("{}", plan), @r"
    ProjectionPlan {
      Columns(author_id, score_version, title),
      Relation(author) {
        Columns(id, name),
      },
      NullResolved(Post.notes, Post.score, User.email),
    }
    ");

    Ok(())
}

#[test]
fn not_selectable_fields_only_contribute_always_columns() -> Result<(), Box<dyn Error>> {
    init_logger();
    let plan = build_plan(
        BLOG_SCHEMA,
        "query { posts { title comment_count } }",
        "[Post!]!",
        &RequestArguments::new(),
    )?;

    assert_eq!(plan.root.column_list(), ["comments_count", "title"]);
    assert!(plan.null_resolved.is_empty());

    Ok(())
}

struct CountingPolicy {
    calls: Arc<AtomicUsize>,
}

impl Policy for CountingPolicy {
    fn name(&self) -> &str {
        "staff"
    }

    fn fire(&self, arguments: &RequestArguments) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        arguments.get_str("role") == Some("staff")
    }
}

#[test]
fn policies_fire_once_per_planning_pass() {
    init_logger();
    let calls = Arc::new(AtomicUsize::new(0));
    let staff = PrivacyRule::policy(CountingPolicy {
        calls: calls.clone(),
    });

    let registry = SchemaRegistry::builder()
        .object(
            ObjectType::new("Account")
                .with_model("Account")
                .field(FieldDescriptor::new("name", TypeRef::named("String")))
                .field(FieldDescriptor::new("iban", TypeRef::named("String")).privacy(staff.clone()))
                .field(FieldDescriptor::new("balance", TypeRef::named("Float")).privacy(staff.clone()))
                .field(
                    FieldDescriptor::new("limit", TypeRef::named("Float"))
                        .privacy(staff)
                        .always(["currency"]),
                ),
        )
        .build()
        .unwrap();

    let planner = ProjectionPlanner::new(&registry, &registry);
    let requested = requested_fields("query { accounts { name iban balance limit } }");
    let root_type = TypeRef::list(TypeRef::named("Account"));

    let staff_plan = planner
        .plan(&requested, &root_type, &RequestArguments::new().with("role", "staff"))
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        staff_plan.root.column_list(),
        ["balance", "currency", "iban", "limit", "name"]
    );

    let guest_plan = planner
        .plan(&requested, &root_type, &RequestArguments::new().with("role", "guest"))
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(guest_plan.root.column_list(), ["currency", "name"]);
    assert_eq!(guest_plan.null_resolved.len(), 3);
}
