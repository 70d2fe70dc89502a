//! Per-program-point analysis state.

/// Index of a tracked variable (local, parameter or final field) within one
/// unit's analysis.
pub type VarId = usize;

/// How control reaches a program point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    Reachable,
    /// Excluded by a constant condition. Still analysed, but reads count as
    /// assigned and null findings are not reported.
    Dead,
    /// After a completed jump. Nothing is analysed.
    Unreachable,
}

/// Flow-derived nullness of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullStatus {
    #[default]
    Unknown,
    Null,
    NonNull,
    PotentiallyNull,
}

impl NullStatus {
    pub fn join(self, other: NullStatus) -> NullStatus {
        use NullStatus::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Unknown, NonNull) | (NonNull, Unknown) => Unknown,
            _ => PotentiallyNull,
        }
    }
}

/// Growable bit set over [`VarId`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarSet {
    words: Vec<u64>,
}

impl VarSet {
    pub fn contains(&self, var: VarId) -> bool {
        self.words.get(var / 64).map(|w| w & (1 << (var % 64)) != 0).unwrap_or(false)
    }

    pub fn insert(&mut self, var: VarId) {
        let word = var / 64;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (var % 64);
    }

    pub fn union_with(&mut self, other: &VarSet) {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= theirs;
        }
    }

    pub fn intersect_with(&mut self, other: &VarSet) {
        for (index, mine) in self.words.iter_mut().enumerate() {
            *mine &= other.words.get(index).copied().unwrap_or(0);
        }
    }
}

/// Definite assignment, potential assignment and nullness facts at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowInfo {
    reach: Reach,
    assigned: VarSet,
    potential: VarSet,
    nulls: Vec<NullStatus>,
}

impl FlowInfo {
    pub fn reachable() -> Self {
        Self {
            reach: Reach::Reachable,
            assigned: VarSet::default(),
            potential: VarSet::default(),
            nulls: Vec::new(),
        }
    }

    pub fn unreachable() -> Self {
        Self { reach: Reach::Unreachable, ..Self::reachable() }
    }

    pub fn reach(&self) -> Reach {
        self.reach
    }

    pub fn is_reachable(&self) -> bool {
        self.reach == Reach::Reachable
    }

    pub fn is_unreachable(&self) -> bool {
        self.reach == Reach::Unreachable
    }

    /// The same facts on a path that a constant condition excludes.
    pub fn dead(&self) -> FlowInfo {
        let mut copy = self.clone();
        if copy.reach == Reach::Reachable {
            copy.reach = Reach::Dead;
        }
        copy
    }

    /// Definitely assigned; vacuously true off the reachable path.
    pub fn is_assigned(&self, var: VarId) -> bool {
        self.reach != Reach::Reachable || self.assigned.contains(var)
    }

    /// Assigned on this path regardless of reachability.
    pub fn has_assignment(&self, var: VarId) -> bool {
        self.assigned.contains(var)
    }

    pub fn is_potentially_assigned(&self, var: VarId) -> bool {
        self.potential.contains(var)
    }

    pub fn mark_assigned(&mut self, var: VarId) {
        self.assigned.insert(var);
        self.potential.insert(var);
    }

    pub fn null_status(&self, var: VarId) -> NullStatus {
        self.nulls.get(var).copied().unwrap_or_default()
    }

    pub fn set_null_status(&mut self, var: VarId, status: NullStatus) {
        if self.nulls.len() <= var {
            self.nulls.resize(var + 1, NullStatus::Unknown);
        }
        self.nulls[var] = status;
    }

    pub fn potential(&self) -> &VarSet {
        &self.potential
    }

    pub fn add_potential(&mut self, potential: &VarSet) {
        self.potential.union_with(potential);
    }

    /// Carry the assignments a `finally` block made onto a path leaving
    /// through it.
    pub fn add_assignments_from(&mut self, other: &FlowInfo) {
        self.assigned.union_with(&other.assigned);
        self.potential.union_with(&other.potential);
        for (var, status) in other.nulls.iter().enumerate() {
            if *status != NullStatus::Unknown {
                self.set_null_status(var, *status);
            }
        }
    }

    /// Fold the state arriving over a loop back edge into the loop entry.
    /// Only a reachable back edge contributes; definite assignment at the
    /// head stays that of the entry.
    pub fn merge_back_edge(&mut self, back: &FlowInfo) {
        if !back.is_reachable() || !self.is_reachable() {
            return;
        }
        self.potential.union_with(&back.potential);
        self.join_nulls_from(back);
    }

    pub fn join_nulls_from(&mut self, other: &FlowInfo) {
        if other.is_unreachable() {
            return;
        }
        let len = self.nulls.len().max(other.nulls.len());
        self.nulls = (0..len).map(|v| self.null_status(v).join(other.null_status(v))).collect();
    }

    /// Merge two incoming paths.
    pub fn join(&self, other: &FlowInfo) -> FlowInfo {
        match (self.reach, other.reach) {
            (Reach::Unreachable, _) => other.clone(),
            (_, Reach::Unreachable) => self.clone(),
            (Reach::Reachable, Reach::Dead) => {
                let mut joined = self.clone();
                joined.potential.union_with(&other.potential);
                joined
            }
            (Reach::Dead, Reach::Reachable) => other.join(self),
            _ => {
                let mut joined = self.clone();
                joined.assigned.intersect_with(&other.assigned);
                joined.potential.union_with(&other.potential);
                let len = self.nulls.len().max(other.nulls.len());
                joined.nulls = (0..len).map(|v| self.null_status(v).join(other.null_status(v))).collect();
                joined
            }
        }
    }

    /// Join into an optional accumulator.
    pub fn join_into(slot: &mut Option<FlowInfo>, info: &FlowInfo) {
        *slot = Some(match slot.take() {
            Some(existing) => existing.join(info),
            None => info.clone(),
        });
    }
}

/// Outcome of a boolean expression: the state when it yields `true` and
/// when it yields `false`.
#[derive(Debug, Clone)]
pub struct Branches {
    pub when_true: FlowInfo,
    pub when_false: FlowInfo,
}

impl Branches {
    pub fn both(info: FlowInfo) -> Self {
        Self { when_true: info.clone(), when_false: info }
    }

    pub fn merged(&self) -> FlowInfo {
        self.when_true.join(&self.when_false)
    }

    pub fn swapped(self) -> Self {
        Self { when_true: self.when_false, when_false: self.when_true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_join_table() {
        use NullStatus::*;
        assert_eq!(Null.join(NonNull), PotentiallyNull);
        assert_eq!(Unknown.join(NonNull), Unknown);
        assert_eq!(Unknown.join(Null), PotentiallyNull);
        assert_eq!(Null.join(Null), Null);
        assert_eq!(PotentiallyNull.join(NonNull), PotentiallyNull);
    }

    #[test]
    fn assigned_only_when_assigned_on_every_path() {
        let mut left = FlowInfo::reachable();
        let mut right = FlowInfo::reachable();
        left.mark_assigned(0);
        left.mark_assigned(1);
        right.mark_assigned(1);
        let joined = left.join(&right);
        assert!(!joined.is_assigned(0));
        assert!(joined.is_potentially_assigned(0));
        assert!(joined.is_assigned(1));
    }

    #[test]
    fn unreachable_is_the_identity() {
        let mut live = FlowInfo::reachable();
        live.mark_assigned(3);
        live.set_null_status(3, NullStatus::Null);
        let joined = FlowInfo::unreachable().join(&live);
        assert_eq!(joined, live);
    }

    #[test]
    fn dead_path_contributes_only_potential_assignments() {
        let live = FlowInfo::reachable();
        let mut dead = FlowInfo::reachable().dead();
        dead.mark_assigned(2);
        dead.set_null_status(5, NullStatus::Null);
        let joined = live.join(&dead);
        assert!(joined.is_reachable());
        assert!(!joined.is_assigned(2));
        assert!(joined.is_potentially_assigned(2));
        assert_eq!(joined.null_status(5), NullStatus::Unknown);
    }

    #[test]
    fn reads_in_dead_code_count_as_assigned() {
        let dead = FlowInfo::reachable().dead();
        assert!(dead.is_assigned(7));
        assert!(!dead.has_assignment(7));
    }

    #[test]
    fn dead_back_edges_are_ignored() {
        let mut entry = FlowInfo::reachable();
        let mut back = FlowInfo::reachable().dead();
        back.mark_assigned(1);
        entry.merge_back_edge(&back);
        assert!(!entry.is_potentially_assigned(1));

        let mut back = FlowInfo::reachable();
        back.mark_assigned(1);
        back.set_null_status(0, NullStatus::Null);
        entry.set_null_status(0, NullStatus::NonNull);
        entry.merge_back_edge(&back);
        assert!(entry.is_potentially_assigned(1));
        assert!(!entry.is_assigned(1));
        assert_eq!(entry.null_status(0), NullStatus::PotentiallyNull);
    }

    #[test]
    fn sets_grow_past_one_word() {
        let mut set = VarSet::default();
        set.insert(130);
        assert!(set.contains(130));
        assert!(!set.contains(2));
        let mut other = VarSet::default();
        other.insert(2);
        set.intersect_with(&other);
        assert!(!set.contains(130));
    }
}
