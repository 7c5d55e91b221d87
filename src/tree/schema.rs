use serde::{Deserialize, Serialize};

/// Branch-name substrings excluded from training inputs.
///
/// Kinematic and generator-level branches would let the network learn the jet
/// mass or momentum spectrum instead of the event shape, so anything matching
/// one of these substrings is dropped.
const EXCLUDED_SUBSTRINGS: [&str; 5] = ["nJets", "SoftDropMass", "mass", "gen", "pt"];

/// Ordered branch listing of an event tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSchema {
    /// Branch names in the tree's native order.
    pub branches: Vec<String>,
}

impl TreeSchema {
    pub fn new(branches: Vec<String>) -> Self {
        Self { branches }
    }

    /// Branch names usable as training variables, in tree order.
    pub fn training_branches(&self) -> Vec<String> {
        training_branch_names(&self.branches)
    }
}

/// Filter a branch-name list down to the training variables.
///
/// Keeps every name that contains none of the excluded substrings
/// (case-sensitive), preserving the input order. May be empty.
pub fn training_branch_names(branches: &[String]) -> Vec<String> {
    branches
        .iter()
        .filter(|name| {
            !EXCLUDED_SUBSTRINGS
                .iter()
                .any(|excluded| name.contains(excluded))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filter_drops_excluded_substrings() {
        let branches = names(&["pt1", "massSD", "jetAK8_eta", "nJets"]);
        assert_eq!(training_branch_names(&branches), names(&["jetAK8_eta"]));
    }

    #[test]
    fn filter_preserves_order_and_is_case_sensitive() {
        let branches = names(&["jetAK8_phi", "jetAK8_PT", "sumJetE", "genJet_eta"]);
        // "PT" differs from "pt" by case and survives.
        assert_eq!(
            training_branch_names(&branches),
            names(&["jetAK8_phi", "jetAK8_PT", "sumJetE"])
        );
    }

    #[test]
    fn filter_may_empty_the_list() {
        let branches = names(&["nJets", "jet_mass", "genWeight"]);
        assert!(training_branch_names(&branches).is_empty());
    }

    #[test]
    fn schema_filter_matches_free_function() {
        let schema = TreeSchema::new(names(&["tau21", "jet_pt", "FoxWolfH1"]));
        assert_eq!(schema.training_branches(), names(&["tau21", "FoxWolfH1"]));
    }
}
