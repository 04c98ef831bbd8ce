//! The fixed document set that makes up an agent constitution.
//!
//! Every valid source root carries exactly these relative paths. The table
//! is shared by validation, installation and wrapper generation, so all
//! resolution strategies agree on what "complete" means.

/// A single manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
    /// Role or document key (`conductor`, `analyst`, ...).
    pub key: &'static str,
    /// Path relative to a source root, always `/`-separated.
    pub rel_path: &'static str,
    /// Whether a wrapper agent is generated for this document.
    pub has_wrapper: bool,
}

pub const CONDUCTOR: Document = Document {
    key: "conductor",
    rel_path: "governance/CONDUCTOR.md",
    has_wrapper: true,
};
pub const ANALYST: Document = Document {
    key: "analyst",
    rel_path: "agents/analyst.md",
    has_wrapper: true,
};
pub const PLANNER: Document = Document {
    key: "planner",
    rel_path: "agents/planner.md",
    has_wrapper: true,
};
pub const IMPLEMENTER: Document = Document {
    key: "implementer",
    rel_path: "agents/implementer.md",
    has_wrapper: true,
};
pub const REVIEWER: Document = Document {
    key: "reviewer",
    rel_path: "agents/reviewer.md",
    has_wrapper: true,
};
pub const TESTER: Document = Document {
    key: "tester",
    rel_path: "agents/tester.md",
    has_wrapper: true,
};
/// Reference text the role documents cite. Validated and installed, never wrapped.
pub const CONSTITUTION: Document = Document {
    key: "constitution",
    rel_path: "CONSTITUTION.md",
    has_wrapper: false,
};

/// Manifest order is significant: it is the order of validation reports,
/// installation and wrapper output.
pub const DOCUMENTS: [Document; 7] = [
    CONDUCTOR,
    ANALYST,
    PLANNER,
    IMPLEMENTER,
    REVIEWER,
    TESTER,
    CONSTITUTION,
];

/// The five subagent roles the conductor may delegate to.
pub const SUBAGENT_ROLES: [&str; 5] = ["analyst", "planner", "implementer", "reviewer", "tester"];

pub fn documents() -> &'static [Document] {
    &DOCUMENTS
}

/// Documents that receive a wrapper agent, in output order.
pub fn wrapped_documents() -> impl Iterator<Item = &'static Document> {
    DOCUMENTS.iter().filter(|d| d.has_wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_has_seven_unique_entries() {
        let docs = documents();
        assert_eq!(docs.len(), 7);
        let mut paths: Vec<_> = docs.iter().map(|d| d.rel_path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), 7);
    }

    #[test]
    fn six_documents_are_wrapped_and_constitution_is_not() {
        let wrapped: Vec<_> = wrapped_documents().map(|d| d.key).collect();
        assert_eq!(
            wrapped,
            vec!["conductor", "analyst", "planner", "implementer", "reviewer", "tester"]
        );
        assert!(!CONSTITUTION.has_wrapper);
    }

    #[test]
    fn subagent_roles_point_into_agents_dir() {
        for role in SUBAGENT_ROLES {
            let doc = DOCUMENTS
                .iter()
                .find(|d| d.key == role)
                .expect("subagent role is in the manifest");
            assert_eq!(doc.rel_path, format!("agents/{}.md", role));
        }
    }

    #[test]
    fn manifest_paths_are_relative_and_posix() {
        for doc in documents() {
            assert!(!doc.rel_path.starts_with('/'));
            assert!(!doc.rel_path.contains('\\'));
        }
    }
}
