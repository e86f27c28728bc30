//! Aggregate modifier calculation
//!
//! The character's aggregate modifier is the sum over its active buff
//! instances of `modifiers * stacks`, with the total stacks counted per buff
//! capped at that buff's `max_stacks`. When more stacks are live than the
//! cap allows (for instance after the cap was lowered), the oldest
//! instances win and the newest are ignored, partially if needed.

use std::collections::HashMap;

use crate::aggregates::BuffInstance;
use crate::value_objects::StatModifiers;
use crate::BuffId;

/// Result of summing a character's active buffs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregation {
    pub modifiers: StatModifiers,
    /// Stacks that contributed, per buff, in first-seen order.
    pub counted_stacks: Vec<(BuffId, u32)>,
    /// Buffs with active instances but no definition; they contribute nothing.
    pub missing_buffs: Vec<BuffId>,
}

/// Sum the active instances.
///
/// `max_stacks_of` looks up a buff definition's stack cap; `None` means the
/// definition no longer exists.
pub fn aggregate_modifiers<'a, I, F>(instances: I, max_stacks_of: F) -> Aggregation
where
    I: IntoIterator<Item = &'a BuffInstance>,
    F: Fn(BuffId) -> Option<u32>,
{
    let mut order: Vec<BuffId> = Vec::new();
    let mut groups: HashMap<BuffId, Vec<&BuffInstance>> = HashMap::new();
    for instance in instances.into_iter().filter(|i| i.is_active()) {
        let group = groups.entry(instance.buff_id()).or_default();
        if group.is_empty() {
            order.push(instance.buff_id());
        }
        group.push(instance);
    }

    let mut result = Aggregation::default();
    for buff_id in order {
        let Some(max_stacks) = max_stacks_of(buff_id) else {
            result.missing_buffs.push(buff_id);
            continue;
        };
        let Some(group) = groups.get_mut(&buff_id) else {
            continue;
        };
        group.sort_by_key(|i| (i.start_time(), i.created_at()));

        let mut remaining = max_stacks;
        for instance in group.iter() {
            if remaining == 0 {
                break;
            }
            let counted = instance.stacks().min(remaining);
            result.modifiers += instance.modifiers().scaled(counted);
            remaining -= counted;
        }
        result.counted_stacks.push((buff_id, max_stacks - remaining));
    }
    result
}
