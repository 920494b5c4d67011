//! Property tests for the closure index and the engine
//!
//! Random nesting graphs (cycles included) are checked against a naive
//! breadth-first reference closure.

use adrole_core::types::{Catalog, Directory, Group, Membership, NestingEdge};
use adrole_engine::{ClosureIndex, EngineConfig, RoleEngine};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet, VecDeque};

fn group_id(i: usize) -> String {
    format!("G{:02}", i)
}

fn naive_closure(root: &str, edges: &[NestingEdge], known: &BTreeSet<String>) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    if !known.contains(root) {
        return seen;
    }
    let mut queue = VecDeque::from([root.to_string()]);
    while let Some(node) = queue.pop_front() {
        if !seen.insert(node.clone()) {
            continue;
        }
        for edge in edges {
            if edge.parent_group_id == node && known.contains(&edge.child_group_id) {
                queue.push_back(edge.child_group_id.clone());
            }
        }
    }
    seen
}

fn arb_directory() -> impl Strategy<Value = Directory> {
    (1usize..14).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n + 2, 0..n + 2), 0..n * 3);
        let memberships = prop::collection::vec((0usize..6, 0..n + 1), 0..n * 2);
        (Just(n), edges, memberships).prop_map(|(n, edges, memberships)| {
            let groups = (0..n)
                .map(|i| Group::new(group_id(i), format!("name{}", i % (n / 2 + 1)), ""))
                .collect();
            let nesting = edges
                .into_iter()
                .map(|(p, c)| NestingEdge::new(group_id(p), group_id(c)))
                .collect();
            let memberships = memberships
                .into_iter()
                .map(|(u, g)| Membership::new(format!("U{}", u), group_id(g)))
                .collect();
            Directory::new()
                .with_groups(groups)
                .with_nesting(nesting)
                .with_memberships(memberships)
        })
    })
}

fn arb_catalog() -> impl Strategy<Value = Catalog> {
    prop::collection::vec((0usize..3, 0usize..8), 0..12).prop_map(|entries| {
        entries.into_iter().fold(Catalog::new(), |catalog, (category, name)| {
            let category = match category {
                0 => "Original_Role_Groups",
                1 => "BuiltIn_AD_Groups",
                _ => "Exchange_Server_Groups",
            };
            catalog.with_category(category, [format!("name{}", name)])
        })
    })
}

proptest! {
    #[test]
    fn prop_closure_matches_reference(directory in arb_directory()) {
        let index = ClosureIndex::new(&directory.groups, &directory.nesting);
        let known: BTreeSet<String> = directory.groups.iter().map(|g| g.group_id.clone()).collect();

        for group in &directory.groups {
            let expected = naive_closure(&group.group_id, &directory.nesting, &known);
            let closure = index.closure(&group.group_id);
            prop_assert!(closure.contains(&group.group_id));
            prop_assert_eq!(&*closure, &expected);
        }
    }

    #[test]
    fn prop_precompute_agrees_with_lazy(directory in arb_directory()) {
        let lazy = ClosureIndex::new(&directory.groups, &directory.nesting);
        let eager = ClosureIndex::new(&directory.groups, &directory.nesting);
        eager.precompute();

        for group in directory.groups.iter().rev() {
            prop_assert_eq!(lazy.closure(&group.group_id), eager.closure(&group.group_id));
        }
    }

    #[test]
    fn prop_resolution_invariants(directory in arb_directory(), catalog in arb_catalog()) {
        let resolution = RoleEngine::default().resolve(&directory, &catalog);

        let role_ids: HashSet<&str> = resolution.roles.iter().map(|r| r.role_id.as_str()).collect();
        prop_assert_eq!(role_ids.len(), resolution.roles.len());

        let group_pairs: HashSet<_> = resolution.group_roles.iter().collect();
        prop_assert_eq!(group_pairs.len(), resolution.group_roles.len());

        let user_pairs: HashSet<_> = resolution.user_roles.iter().collect();
        prop_assert_eq!(user_pairs.len(), resolution.user_roles.len());

        for role in &resolution.roles {
            prop_assert!(resolution
                .group_roles
                .iter()
                .any(|gr| gr.group_id == role.role_id && gr.role_id == role.role_id));
        }
    }

    #[test]
    fn prop_idempotent_and_parallel_stable(directory in arb_directory(), catalog in arb_catalog()) {
        let sequential = RoleEngine::default();
        let parallel = RoleEngine::new(EngineConfig::default().with_parallel(true)).unwrap();

        let first = sequential.resolve(&directory, &catalog);
        prop_assert_eq!(&first, &sequential.resolve(&directory, &catalog));
        prop_assert_eq!(&first, &parallel.resolve(&directory, &catalog));
    }
}
