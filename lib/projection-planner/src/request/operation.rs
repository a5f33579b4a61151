use std::collections::HashMap;

use graphql_parser::query::{
    parse_query, Definition, Document, FragmentDefinition, OperationDefinition, Selection,
    SelectionSet,
};
use tracing::{instrument, trace};

use super::{RequestedField, RequestedFieldTree};

#[derive(Debug, Clone, thiserror::Error)]
pub enum SelectionError {
    #[error("failed to parse operation: {0}")]
    Parse(String),
    #[error("failed to locate operation to execute")]
    MissingOperation,
    #[error("operation '{0}' not found in document")]
    OperationNotFound(String),
    #[error("document contains multiple operations, an operation name is required")]
    AmbiguousOperation,
    #[error("fragment '{0}' is not defined")]
    UnknownFragment(String),
    #[error("fragment '{0}' spreads itself")]
    CyclicFragment(String),
}

type FragmentMap<'d, 'a> = HashMap<&'d str, &'d FragmentDefinition<'a, String>>;

impl RequestedFieldTree {
    /// Parses an operation and builds the tree of its selection set.
    pub fn parse(operation: &str, max_depth: usize) -> Result<Self, SelectionError> {
        let document = parse_query::<String>(operation)
            .map_err(|error| SelectionError::Parse(error.to_string()))?;

        Self::from_operation(&document, None, max_depth)
    }

    /// Builds the requested-field tree of an operation's selection set.
    ///
    /// Fragments are inlined, aliased fields merge under their field name,
    /// and composite fields on level `max_depth` are truncated to leaves.
    #[instrument(level = "trace", skip(document))]
    pub fn from_operation<'a>(
        document: &Document<'a, String>,
        operation_name: Option<&str>,
        max_depth: usize,
    ) -> Result<Self, SelectionError> {
        let selection_set = find_operation(document, operation_name)?;
        let fragments: FragmentMap = document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
                Definition::Operation(_) => None,
            })
            .collect();

        let collector = SelectionCollector {
            fragments,
            max_depth: max_depth.max(1),
        };

        collector.collect(selection_set, 1, &mut Vec::new())
    }
}

fn find_operation<'d, 'a>(
    document: &'d Document<'a, String>,
    operation_name: Option<&str>,
) -> Result<&'d SelectionSet<'a, String>, SelectionError> {
    let mut operations = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Operation(operation) => Some(operation),
            Definition::Fragment(_) => None,
        })
        .map(|operation| match operation {
            OperationDefinition::SelectionSet(selection_set) => (None, selection_set),
            OperationDefinition::Query(query) => (query.name.as_deref(), &query.selection_set),
            OperationDefinition::Mutation(mutation) => {
                (mutation.name.as_deref(), &mutation.selection_set)
            }
            OperationDefinition::Subscription(subscription) => {
                (subscription.name.as_deref(), &subscription.selection_set)
            }
        });

    match operation_name {
        Some(wanted) => operations
            .find(|(name, _)| *name == Some(wanted))
            .map(|(_, selection_set)| selection_set)
            .ok_or_else(|| SelectionError::OperationNotFound(wanted.to_string())),
        None => {
            let (_, selection_set) = operations.next().ok_or(SelectionError::MissingOperation)?;
            if operations.next().is_some() {
                return Err(SelectionError::AmbiguousOperation);
            }

            Ok(selection_set)
        }
    }
}

struct SelectionCollector<'d, 'a> {
    fragments: FragmentMap<'d, 'a>,
    max_depth: usize,
}

impl<'d, 'a> SelectionCollector<'d, 'a> {
    fn collect(
        &self,
        selection_set: &'d SelectionSet<'a, String>,
        depth: usize,
        spread_stack: &mut Vec<&'d str>,
    ) -> Result<RequestedFieldTree, SelectionError> {
        let mut tree = RequestedFieldTree::new();

        for item in &selection_set.items {
            match item {
                Selection::Field(field) => {
                    let requested = if field.selection_set.items.is_empty() {
                        RequestedField::Leaf
                    } else if depth >= self.max_depth {
                        trace!(field = field.name.as_str(), depth, "selection truncated");
                        RequestedField::Leaf
                    } else {
                        RequestedField::Selection(self.collect(
                            &field.selection_set,
                            depth + 1,
                            spread_stack,
                        )?)
                    };

                    tree.insert(field.name.clone(), requested);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.fragment_name.as_str();
                    let fragment = self
                        .fragments
                        .get(name)
                        .ok_or_else(|| SelectionError::UnknownFragment(name.to_string()))?;

                    if spread_stack.contains(&name) {
                        return Err(SelectionError::CyclicFragment(name.to_string()));
                    }

                    spread_stack.push(fragment.name.as_str());
                    let spread_tree = self.collect(&fragment.selection_set, depth, spread_stack)?;
                    spread_stack.pop();

                    tree.merge(spread_tree);
                }
                Selection::InlineFragment(inline) => {
                    tree.merge(self.collect(&inline.selection_set, depth, spread_stack)?);
                }
            }
        }

        Ok(tree)
    }
}
