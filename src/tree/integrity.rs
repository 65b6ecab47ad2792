use super::ElementTree;

impl ElementTree {
    /// Human-readable list of structural problems; empty for a well-formed tree.
    ///
    /// Checks id uniqueness across the whole tree and that only container-capable elements
    /// hold children. Trees built through the edit operations are always well-formed; this is
    /// for trees that came from outside (loaded documents, hand-built fixtures).
    pub fn integrity_issues(&self) -> Vec<String> {
        let mut issues: Vec<String> = Vec::new();

        let index = self.index();
        for id in index.duplicates() {
            issues.push(format!("integrity: id {id} used more than once"));
        }

        for element in self {
            if element.id().as_str().is_empty() {
                issues.push(format!("integrity: {} element with empty id", element.kind));
            }
            if !element.is_container() && !element.children().is_empty() {
                issues.push(format!(
                    "integrity: {} element {} holds {} children",
                    element.kind,
                    element.id(),
                    element.children().len()
                ));
            }
        }

        let total = self.count_elements();
        if index.len() + index.duplicates().len() != total {
            issues.push(format!(
                "integrity: indexed {} of {total} elements",
                index.len() + index.duplicates().len()
            ));
        }

        issues
    }

    pub fn is_well_formed(&self) -> bool {
        self.integrity_issues().is_empty()
    }
}
