//! Collision rules applied once every candidate move of a tick is known.

use std::collections::HashMap;

use crate::game::types::{PlayerId, Position};

/// Outcome of comparing the candidate positions of one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TieResolution {
    /// Groups of players that landed on the same tile, in first-seen order.
    pub ties: Vec<Vec<PlayerId>>,
    /// Players whose candidate tile is theirs alone.
    pub survivors: Vec<PlayerId>,
}

/// Group candidates sharing a tile. Everyone in a group is eliminated together.
pub fn identify_ties(candidates: &[(PlayerId, Position)]) -> TieResolution {
    let mut groups: Vec<Vec<PlayerId>> = Vec::new();
    let mut group_of: HashMap<Position, usize> = HashMap::new();

    for (player_id, position) in candidates {
        match group_of.get(position) {
            Some(&index) => groups[index].push(player_id.clone()),
            None => {
                group_of.insert(*position, groups.len());
                groups.push(vec![player_id.clone()]);
            }
        }
    }

    let mut resolution = TieResolution::default();
    for group in groups {
        if group.len() > 1 {
            resolution.ties.push(group);
        } else {
            resolution.survivors.extend(group);
        }
    }
    resolution
}
