//! Role projection
//!
//! Expands every minted role over its anchor's closure into group-role
//! pairs, then joins the closure with direct memberships into user-role
//! pairs.
//!
//! Output order is deterministic: roles in mint order; within a role the
//! anchor's pair first, then the other closure groups by ascending id;
//! users by ascending id. Pairs are deduplicated across the whole relation.

use crate::closure::ClosureIndex;
use adrole_core::types::{GroupRole, Membership, Role, UserRole};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, trace};

/// Direct members of each group, sorted for stable output
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    members: HashMap<String, BTreeSet<String>>,
    dropped: usize,
}

impl MembershipIndex {
    /// Index memberships by group, skipping groups the closure index lacks
    pub fn new(memberships: &[Membership], closure: &ClosureIndex) -> Self {
        let mut members: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut dropped = 0;

        for membership in memberships {
            if !closure.contains(&membership.group_id) {
                dropped += 1;
                continue;
            }
            members
                .entry(membership.group_id.clone())
                .or_default()
                .insert(membership.user_id.clone());
        }

        if dropped > 0 {
            debug!(dropped, "Ignored memberships referencing unknown groups");
        }

        Self { members, dropped }
    }

    /// Direct members of a group
    pub fn members_of(&self, group_id: &str) -> impl Iterator<Item = &String> {
        self.members.get(group_id).into_iter().flatten()
    }

    /// Memberships dropped for referencing unknown groups
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Projection of a single role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleProjection {
    pub group_roles: Vec<GroupRole>,
    pub user_roles: Vec<UserRole>,
}

/// Projects roles into group-role and user-role relations
#[derive(Debug, Clone, Default)]
pub struct RoleProjector {
    parallel: bool,
}

impl RoleProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan the per-role projection out over a thread pool
    ///
    /// The closure index is fully precomputed first, so workers only read
    /// the memo.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Project one role
    pub fn project_role(
        &self,
        role: &Role,
        closure: &ClosureIndex,
        members: &MembershipIndex,
    ) -> RoleProjection {
        let groups = closure.closure(&role.role_id);

        let mut group_roles = Vec::with_capacity(groups.len());
        if groups.contains(&role.role_id) {
            group_roles.push(GroupRole::new(role.role_id.as_str(), role.role_id.as_str()));
        }
        group_roles.extend(
            groups
                .iter()
                .filter(|g| **g != role.role_id)
                .map(|g| GroupRole::new(g.as_str(), role.role_id.as_str())),
        );

        let users: BTreeSet<&String> = groups.iter().flat_map(|g| members.members_of(g)).collect();
        let user_roles = users
            .into_iter()
            .map(|u| UserRole::new(u.as_str(), role.role_id.as_str()))
            .collect();

        trace!(role_id = %role.role_id, groups = group_roles.len(), "Projected role");
        RoleProjection {
            group_roles,
            user_roles,
        }
    }

    /// Project every role
    pub fn project(
        &self,
        roles: &[Role],
        closure: &ClosureIndex,
        memberships: &[Membership],
    ) -> (Vec<GroupRole>, Vec<UserRole>) {
        let members = MembershipIndex::new(memberships, closure);

        let projections: Vec<RoleProjection> = if self.parallel {
            closure.precompute();
            roles
                .par_iter()
                .map(|role| self.project_role(role, closure, &members))
                .collect()
        } else {
            roles
                .iter()
                .map(|role| self.project_role(role, closure, &members))
                .collect()
        };

        let mut seen_groups: HashSet<GroupRole> = HashSet::new();
        let mut seen_users: HashSet<UserRole> = HashSet::new();
        let mut group_roles = Vec::new();
        let mut user_roles = Vec::new();

        for projection in projections {
            for pair in projection.group_roles {
                if seen_groups.insert(pair.clone()) {
                    group_roles.push(pair);
                }
            }
            for pair in projection.user_roles {
                if seen_users.insert(pair.clone()) {
                    user_roles.push(pair);
                }
            }
        }

        debug!(
            roles = roles.len(),
            group_roles = group_roles.len(),
            user_roles = user_roles.len(),
            parallel = self.parallel,
            "Projected roles"
        );

        (group_roles, user_roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrole_core::types::{Group, NestingEdge};

    fn role(id: &str) -> Role {
        Role {
            role_id: id.to_string(),
            role_name: id.to_string(),
            description: String::new(),
            source: "Original_Role_Groups".to_string(),
        }
    }

    fn index(ids: &[&str], pairs: &[(&str, &str)]) -> ClosureIndex {
        let groups: Vec<Group> = ids.iter().map(|id| Group::new(*id, *id, "")).collect();
        let edges: Vec<NestingEdge> = pairs.iter().map(|(p, c)| NestingEdge::new(*p, *c)).collect();
        ClosureIndex::new(&groups, &edges)
    }

    #[test]
    fn test_anchor_first_then_sorted() {
        let closure = index(&["M", "A", "Z"], &[("M", "Z"), ("M", "A")]);
        let (group_roles, _) = RoleProjector::new().project(&[role("M")], &closure, &[]);

        assert_eq!(
            group_roles,
            vec![
                GroupRole::new("M", "M"),
                GroupRole::new("A", "M"),
                GroupRole::new("Z", "M"),
            ]
        );
    }

    #[test]
    fn test_user_dedup_across_paths() {
        // U1 is in the anchor and in a nested group; U2 reaches via two children.
        let closure = index(&["G1", "G2", "G3", "G4"], &[("G1", "G2"), ("G1", "G3"), ("G2", "G4"), ("G3", "G4")]);
        let memberships = vec![
            Membership::new("U1", "G1"),
            Membership::new("U1", "G2"),
            Membership::new("U2", "G4"),
            Membership::new("U2", "G4"),
        ];

        let (_, user_roles) = RoleProjector::new().project(&[role("G1")], &closure, &memberships);
        assert_eq!(user_roles, vec![UserRole::new("U1", "G1"), UserRole::new("U2", "G1")]);
    }

    #[test]
    fn test_group_in_two_closures() {
        let closure = index(&["A", "B", "C"], &[("A", "C"), ("B", "C")]);
        let memberships = vec![Membership::new("U1", "C")];

        let (group_roles, user_roles) =
            RoleProjector::new().project(&[role("A"), role("B")], &closure, &memberships);

        assert_eq!(
            group_roles,
            vec![
                GroupRole::new("A", "A"),
                GroupRole::new("C", "A"),
                GroupRole::new("B", "B"),
                GroupRole::new("C", "B"),
            ]
        );
        assert_eq!(user_roles, vec![UserRole::new("U1", "A"), UserRole::new("U1", "B")]);
    }

    #[test]
    fn test_role_without_members_or_children() {
        let closure = index(&["A"], &[]);
        let (group_roles, user_roles) = RoleProjector::new().project(&[role("A")], &closure, &[]);

        assert_eq!(group_roles, vec![GroupRole::new("A", "A")]);
        assert!(user_roles.is_empty());
    }

    #[test]
    fn test_dangling_memberships_ignored() {
        let closure = index(&["A"], &[]);
        let memberships = vec![Membership::new("U1", "GHOST"), Membership::new("U2", "A")];

        let members = MembershipIndex::new(&memberships, &closure);
        assert_eq!(members.dropped(), 1);

        let (_, user_roles) = RoleProjector::new().project(&[role("A")], &closure, &memberships);
        assert_eq!(user_roles, vec![UserRole::new("U2", "A")]);
    }

    #[test]
    fn test_duplicate_roles_do_not_duplicate_pairs() {
        let closure = index(&["A"], &[]);
        let memberships = vec![Membership::new("U1", "A")];

        let (group_roles, user_roles) =
            RoleProjector::new().project(&[role("A"), role("A")], &closure, &memberships);
        assert_eq!(group_roles.len(), 1);
        assert_eq!(user_roles.len(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let closure = index(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("D", "E")],
        );
        let memberships = vec![
            Membership::new("U3", "C"),
            Membership::new("U1", "E"),
            Membership::new("U2", "A"),
        ];
        let roles = vec![role("D"), role("A"), role("C")];

        let sequential = RoleProjector::new().project(&roles, &closure, &memberships);
        let parallel = RoleProjector::new()
            .with_parallel(true)
            .project(&roles, &closure, &memberships);

        assert_eq!(sequential, parallel);
    }
}
