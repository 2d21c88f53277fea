//! Sample forest used by `grove seed` and in tests.

use super::ForestService;
use crate::error::ApiError;
use crate::tree::Parent;
use std::collections::VecDeque;

/// A node of the sample forest and everything under it
pub struct SeedNode {
    pub name: &'static str,
    pub children: &'static [SeedNode],
}

const fn leaf(name: &'static str) -> SeedNode {
    SeedNode {
        name,
        children: &[],
    }
}

pub const SAMPLE_FOREST: &[SeedNode] = &[
    SeedNode {
        name: "Pineapple",
        children: &[
            leaf("Apple"),
            SeedNode {
                name: "Banana",
                children: &[
                    leaf("Peach"),
                    SeedNode {
                        name: "Pear",
                        children: &[leaf("Strawberry"), leaf("Watermelon")],
                    },
                    leaf("Plum"),
                ],
            },
            leaf("Orange"),
            leaf("Cherry"),
        ],
    },
    SeedNode {
        name: "Lime",
        children: &[
            SeedNode {
                name: "Lemon",
                children: &[leaf("Grapefruit"), leaf("Mango")],
            },
            leaf("Avocado"),
            leaf("Kiwi"),
        ],
    },
];

/// Add `forest` through the service, one layer at a time, so ids grow with depth.
pub fn plant(service: &ForestService, forest: &'static [SeedNode]) -> Result<usize, ApiError> {
    let mut queue: VecDeque<(Parent, &'static SeedNode)> =
        forest.iter().map(|seed| (Parent::Root, seed)).collect();
    let mut planted = 0;

    while let Some((parent, seed)) = queue.pop_front() {
        let node = service.add_node(seed.name, parent)?;
        planted += 1;
        queue.extend(
            seed.children
                .iter()
                .map(|child| (Parent::ChildOf(node.id), child)),
        );
    }

    Ok(planted)
}
