use crate::graph::SymbolGraph;
use crate::ids::ClassId;

impl SymbolGraph {
    /// `sub` is `sup` or inherits from it, directly or transitively.
    pub fn is_subtype(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup || self.class(sub).parents().contains(&sup)
    }

    /// One of the two classes is an ancestor of (or equal to) the other.
    pub fn are_related(&self, a: ClassId, b: ClassId) -> bool {
        self.is_subtype(a, b) || self.is_subtype(b, a)
    }

    /// Most specific class both `a` and `b` are subtypes of.
    ///
    /// The root object type is the common ancestor of any two classes. Two
    /// interfaces without an inheritance relation have none, and neither does a
    /// pair involving a class whose own chain is unknown.
    pub fn common_ancestor(&self, a: ClassId, b: ClassId) -> Option<ClassId> {
        if self.is_subtype(a, b) {
            return Some(b);
        }
        if self.is_subtype(b, a) {
            return Some(a);
        }

        let (class_a, class_b) = (self.class(a), self.class(b));
        if class_a.is_interface() && class_b.is_interface() {
            return None;
        }

        // Walk the superclass chain of the non-interface operand.
        let (walk, other) = if class_a.is_interface() { (b, a) } else { (a, b) };
        let mut current = self.class(walk).super_class();
        while let Some(candidate) = current {
            if self.is_subtype(other, candidate) {
                return Some(candidate);
            }
            current = self.class(candidate).super_class();
        }
        None
    }

    /// [`SymbolGraph::common_ancestor`] by internal name, for writers that work on names.
    pub fn common_ancestor_by_name(&self, a: &str, b: &str) -> Option<&str> {
        let a = self.class_id(a)?;
        let b = self.class_id(b)?;
        self.common_ancestor(a, b)
            .map(|id| self.class(id).name())
    }
}
