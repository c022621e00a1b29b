//! Diff event triggers: CREATE/DROP/ENABLE-DISABLE toggle, comments

use crate::catalog::event_trigger::EventTrigger;
use crate::diff::comment_utils;
use crate::diff::operations::{EventTriggerIdentifier, EventTriggerOperation, MigrationStep};

pub fn diff(old: Option<&EventTrigger>, new: Option<&EventTrigger>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::EventTrigger(EventTriggerOperation::Create {
                trigger: n.clone(),
            })];
            if let Some(comment_op) = comment_utils::handle_comment_creation(
                &n.comment,
                EventTriggerIdentifier::from_event_trigger(n),
            ) {
                steps.push(MigrationStep::EventTrigger(EventTriggerOperation::Comment(
                    comment_op,
                )));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::EventTrigger(EventTriggerOperation::Drop {
            identifier: EventTriggerIdentifier::from_event_trigger(o),
        })],
        (Some(o), Some(n)) => {
            let mut steps = Vec::new();

            if o.event != n.event
                || o.function_schema != n.function_schema
                || o.function_name != n.function_name
                || o.tags != n.tags
            {
                // The triggered event, handler, or tag filter changed; none of
                // these are ALTER-able, so recreate.
                steps.push(MigrationStep::EventTrigger(EventTriggerOperation::Drop {
                    identifier: EventTriggerIdentifier::from_event_trigger(o),
                }));
                steps.push(MigrationStep::EventTrigger(EventTriggerOperation::Create {
                    trigger: n.clone(),
                }));
                if let Some(comment_op) = comment_utils::handle_comment_creation(
                    &n.comment,
                    EventTriggerIdentifier::from_event_trigger(n),
                ) {
                    steps.push(MigrationStep::EventTrigger(EventTriggerOperation::Comment(
                        comment_op,
                    )));
                }
                return steps;
            }

            if o.enabled != n.enabled {
                steps.push(MigrationStep::EventTrigger(
                    EventTriggerOperation::SetEnabled {
                        identifier: EventTriggerIdentifier::from_event_trigger(n),
                        enabled: n.enabled,
                    },
                ));
            }

            let comment_ops = comment_utils::handle_comment_diff(Some(o), Some(n), || {
                EventTriggerIdentifier::from_event_trigger(n)
            });
            for comment_op in comment_ops {
                steps.push(MigrationStep::EventTrigger(EventTriggerOperation::Comment(
                    comment_op,
                )));
            }

            steps
        }
        (None, None) => Vec::new(),
    }
}
