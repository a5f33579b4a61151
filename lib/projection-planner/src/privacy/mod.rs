use std::{collections::HashMap, fmt::Debug, sync::Arc};

use tracing::trace;

use crate::{request::RequestArguments, schema::field::FieldDescriptor};

pub mod policy;

pub use policy::{ArgumentMatch, NamedPolicy, Policy};

pub type PrivacyPredicate = dyn Fn(&RequestArguments) -> bool + Send + Sync;

/// Access rule attached to a field.
#[derive(Clone)]
pub enum PrivacyRule {
    /// Evaluated every time the field is requested.
    Predicate(Arc<PrivacyPredicate>),
    /// Evaluated once per planning pass, shared by every field referencing
    /// a policy with the same name.
    Policy(Arc<dyn Policy>),
}

impl PrivacyRule {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&RequestArguments) -> bool + Send + Sync + 'static,
    {
        PrivacyRule::Predicate(Arc::new(predicate))
    }

    pub fn policy<P: Policy + 'static>(policy: P) -> Self {
        PrivacyRule::Policy(Arc::new(policy))
    }
}

impl Debug for PrivacyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivacyRule::Predicate(_) => write!(f, "Predicate(..)"),
            PrivacyRule::Policy(policy) => write!(f, "Policy({})", policy.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyOutcome {
    Allowed,
    /// Access is granted, but the field has no column of its own.
    AllowedNotSelectable,
    /// The field must resolve to null.
    Denied,
}

/// Policy results of a single planning pass, keyed by policy name.
///
/// Policies close over the request arguments, so a memo must never outlive
/// the pass it was created for.
#[derive(Debug, Default)]
pub struct PrivacyMemo(HashMap<String, bool>);

impl PrivacyMemo {
    pub fn get(&self, policy: &str) -> Option<bool> {
        self.0.get(policy).copied()
    }

    pub fn record(&mut self, policy: &str, allowed: bool) {
        self.0.insert(policy.to_string(), allowed);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct PrivacyEvaluator<'a> {
    arguments: &'a RequestArguments,
    memo: PrivacyMemo,
}

impl<'a> PrivacyEvaluator<'a> {
    pub fn new(arguments: &'a RequestArguments) -> Self {
        Self {
            arguments,
            memo: PrivacyMemo::default(),
        }
    }

    pub fn evaluate(&mut self, field: &FieldDescriptor) -> PrivacyOutcome {
        let allowed = match &field.privacy {
            None => true,
            Some(PrivacyRule::Predicate(predicate)) => predicate(self.arguments),
            Some(PrivacyRule::Policy(policy)) => self.evaluate_policy(policy.as_ref()),
        };

        if !allowed {
            PrivacyOutcome::Denied
        } else if !field.selectable {
            PrivacyOutcome::AllowedNotSelectable
        } else {
            PrivacyOutcome::Allowed
        }
    }

    fn evaluate_policy(&mut self, policy: &dyn Policy) -> bool {
        if let Some(allowed) = self.memo.get(policy.name()) {
            return allowed;
        }

        let allowed = policy.fire(self.arguments);
        trace!(policy = policy.name(), allowed, "privacy policy evaluated");
        self.memo.record(policy.name(), allowed);

        allowed
    }

    pub fn memo(&self) -> &PrivacyMemo {
        &self.memo
    }
}
