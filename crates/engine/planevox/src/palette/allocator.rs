//! Proportional split of palette slots between materials

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Shares are rounded to this many slots so materials line up with tag groups
pub const SLOT_GRANULARITY: usize = 8;

/// Assign each material a share of `budget` proportional to its unique color
/// count.
///
/// Shares start as multiples of [`SLOT_GRANULARITY`] with a minimum of one
/// group. Any surplus or deficit is then settled round-robin in material
/// name order: whole groups first, then single slots, so the result always
/// sums to `budget` exactly and no material ends up with zero slots.
pub fn allocate_slots(
    unique_counts: &BTreeMap<String, usize>,
    budget: usize,
) -> Result<BTreeMap<String, usize>> {
    let n = unique_counts.len();
    if n == 0 {
        return Ok(BTreeMap::new());
    }
    if n > budget {
        return Err(Error::TooManyMaterials {
            materials: n,
            budget,
        });
    }

    let total: usize = unique_counts.values().sum();
    let mut slots: Vec<usize> = unique_counts
        .values()
        .map(|&count| {
            let proportion = if total > 0 {
                count as f32 / total as f32
            } else {
                0.0
            };
            let share = ((proportion * budget as f32) as usize).max(1);
            share.div_ceil(SLOT_GRANULARITY) * SLOT_GRANULARITY
        })
        .collect();

    let assigned: usize = slots.iter().sum();
    if assigned < budget {
        let mut remain = budget - assigned;
        let mut i = 0;
        while remain > 0 {
            let add = remain.min(SLOT_GRANULARITY);
            slots[i % n] += add;
            remain -= add;
            i += 1;
        }
    } else if assigned > budget {
        let mut over = assigned - budget;
        // whole groups, never dropping a material below one group
        while over > 0 {
            let mut changed = false;
            for share in slots.iter_mut() {
                if over > 0 && *share > SLOT_GRANULARITY {
                    let take = over.min(SLOT_GRANULARITY).min(*share - SLOT_GRANULARITY);
                    *share -= take;
                    over -= take;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        // single slots, never dropping a material below one slot
        while over > 0 {
            let mut changed = false;
            for share in slots.iter_mut() {
                if over > 0 && *share > 1 {
                    *share -= 1;
                    over -= 1;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    Ok(unique_counts.keys().cloned().zip(slots).collect())
}
