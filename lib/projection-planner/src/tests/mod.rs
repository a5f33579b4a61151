mod embedded;
mod materialize;
mod privacy;
mod relations;

use crate::{
    tests::testkit::{init_logger, read_schema, requested_fields, BLOG_SCHEMA},
    ProjectionNode, ProjectionPlanner, RequestArguments, TypeRef,
};

fn modifier_names(node: &ProjectionNode) -> Vec<String> {
    node.relations()
        .flat_map(|(name, relation)| {
            let own = relation
                .modifier
                .as_ref()
                .map(|modifier| format!("{name}: {}", modifier.name()));
            own.into_iter().chain(modifier_names(&relation.node))
        })
        .collect()
}

#[test]
fn compiling_twice_yields_identical_plans() {
    init_logger();
    let registry = read_schema(BLOG_SCHEMA);
    let planner = ProjectionPlanner::new(&registry, &registry);
    let requested = requested_fields(
        r#"
        query {
          posts {
            title
            summary
            meta { views }
            author { name email }
            comments { body author { name } }
          }
        }"#,
    );
    let root_type: TypeRef = "[Post!]!".parse().unwrap();
    let arguments = RequestArguments::new().with("role", "guest");

    let first = planner.plan(&requested, &root_type, &arguments).unwrap();
    let second = planner.plan(&requested, &root_type, &arguments).unwrap();

    assert_eq!(first, second);
    assert_eq!(format!("{}", first), format!("{}", second));
    assert_eq!(modifier_names(&first.root), ["comments: Post.comments"]);
    assert_eq!(modifier_names(&first.root), modifier_names(&second.root));
}
