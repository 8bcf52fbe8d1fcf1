use std::collections::HashMap;

use crate::models::{DepartmentTreeNode, NavTypeTreeNode};

/// Node
///
/// A value that can be hung into a forest by its parent id. Implementors
/// start with no children; `attach` receives them in input order.
pub trait Node: Sized {
    fn id(&self) -> i64;
    fn parent_id(&self) -> Option<i64>;
    fn attach(&mut self, children: Vec<Self>);
}

/// Forest
///
/// Result of a forest assembly. `detached` holds the ids of input items that
/// were never reached from a root: orphans whose parent is absent and members
/// of parent cycles.
#[derive(Debug)]
pub struct Forest<T> {
    pub roots: Vec<T>,
    pub detached: Vec<i64>,
}

/// build_forest
///
/// Assembles a flat list into a forest in O(n): a parent -> children index is
/// built once, then every root is expanded depth-first. Roots are items whose
/// `parent_id` is `None`. Siblings keep their relative input order, so the
/// caller sorts beforehand.
///
/// Every item has a single parent pointer, so a chain reached from a root
/// always ends at that root; cycles are unreachable and end up in `detached`.
pub fn build_forest<T: Node>(items: Vec<T>) -> Forest<T> {
    let mut children_of: HashMap<i64, Vec<usize>> = HashMap::new();
    let mut root_slots = Vec::new();

    for (slot, item) in items.iter().enumerate() {
        match item.parent_id() {
            Some(parent) => children_of.entry(parent).or_default().push(slot),
            None => root_slots.push(slot),
        }
    }

    let mut arena: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let roots = root_slots
        .into_iter()
        .filter_map(|slot| expand(slot, &mut arena, &children_of))
        .collect();

    let detached = arena.iter().flatten().map(|node| node.id()).collect();

    Forest { roots, detached }
}

fn expand<T: Node>(
    slot: usize,
    arena: &mut [Option<T>],
    children_of: &HashMap<i64, Vec<usize>>,
) -> Option<T> {
    let mut node = arena[slot].take()?;
    let children = children_of
        .get(&node.id())
        .map(|slots| {
            slots
                .iter()
                .filter_map(|&child| expand(child, arena, children_of))
                .collect()
        })
        .unwrap_or_default();
    node.attach(children);
    Some(node)
}

impl Node for DepartmentTreeNode {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn attach(&mut self, children: Vec<Self>) {
        self.children = children;
    }
}

impl Node for NavTypeTreeNode {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn attach(&mut self, children: Vec<Self>) {
        self.children = children;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        id: i64,
        parent: Option<i64>,
        children: Vec<Item>,
    }

    fn item(id: i64, parent: Option<i64>) -> Item {
        Item {
            id,
            parent,
            children: Vec::new(),
        }
    }

    impl Node for Item {
        fn id(&self) -> i64 {
            self.id
        }
        fn parent_id(&self) -> Option<i64> {
            self.parent
        }
        fn attach(&mut self, children: Vec<Self>) {
            self.children = children;
        }
    }

    #[test]
    fn test_nested_levels_keep_input_order() {
        let forest = build_forest(vec![
            item(1, None),
            item(3, Some(1)),
            item(2, Some(1)),
            item(4, Some(3)),
            item(5, None),
        ]);

        assert!(forest.detached.is_empty());
        assert_eq!(forest.roots.len(), 2);
        let first = &forest.roots[0];
        let child_ids: Vec<i64> = first.children.iter().map(|c| c.id).collect();
        assert_eq!(child_ids, vec![3, 2]);
        assert_eq!(first.children[0].children[0].id, 4);
    }

    #[test]
    fn test_orphans_and_cycles_are_detached() {
        let forest = build_forest(vec![
            item(1, None),
            item(2, Some(99)),
            item(3, Some(4)),
            item(4, Some(3)),
        ]);

        assert_eq!(forest.roots.len(), 1);
        assert!(forest.roots[0].children.is_empty());
        let mut detached = forest.detached;
        detached.sort_unstable();
        assert_eq!(detached, vec![2, 3, 4]);
    }

    #[test]
    fn test_empty_input() {
        let forest = build_forest(Vec::<Item>::new());
        assert!(forest.roots.is_empty());
        assert!(forest.detached.is_empty());
    }
}
