use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entities::profile::Profile;

/// Active filter constraints. An empty field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub search: String,
    pub specialization: String,
    pub language: String,
    pub education: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.specialization.is_empty()
            && self.language.is_empty()
            && self.education.is_empty()
    }

    /// Combines two criteria field by field: an empty field takes the other side's value.
    ///
    /// Only meaningful when the non-empty fields of both sides do not overlap;
    /// on overlap `self` wins.
    pub fn and(&self, other: &FilterCriteria) -> FilterCriteria {
        fn pick(a: &str, b: &str) -> String {
            if a.is_empty() { b.to_string() } else { a.to_string() }
        }

        FilterCriteria {
            search: pick(&self.search, &other.search),
            specialization: pick(&self.specialization, &other.specialization),
            language: pick(&self.language, &other.language),
            education: pick(&self.education, &other.education),
        }
    }

    /// True when the profile satisfies every non-empty constraint.
    pub fn matches(&self, profile: &Profile) -> bool {
        let doc = &profile.document;

        let search_match = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            doc.name.to_lowercase().contains(&needle) || doc.email.to_lowercase().contains(&needle)
        };

        let specialization_match =
            self.specialization.is_empty() || doc.specialization == self.specialization;

        let language_match =
            self.language.is_empty() || doc.languages.iter().any(|lang| *lang == self.language);

        let education_match = self.education.is_empty() || doc.education == self.education;

        search_match && specialization_match && language_match && education_match
    }
}

/// Returns the profiles matching `criteria`, in their original order.
pub fn filter_profiles(profiles: &[Profile], criteria: &FilterCriteria) -> Vec<Profile> {
    if criteria.is_empty() {
        return profiles.to_vec();
    }

    profiles
        .iter()
        .filter(|profile| criteria.matches(profile))
        .cloned()
        .collect()
}

/// A filterable field whose distinct values populate a filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Languages,
    Education,
    Specialization,
}

/// Distinct non-empty values of `facet` across all profiles.
pub fn distinct_values(profiles: &[Profile], facet: Facet) -> BTreeSet<String> {
    let values: Box<dyn Iterator<Item = &String> + '_> = match facet {
        Facet::Languages => Box::new(profiles.iter().flat_map(|p| p.document.languages.iter())),
        Facet::Education => Box::new(profiles.iter().map(|p| &p.document.education)),
        Facet::Specialization => Box::new(profiles.iter().map(|p| &p.document.specialization)),
    };

    values
        .filter(|value| !value.is_empty())
        .cloned()
        .collect()
}

/// Option lists for the three filter controls, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub languages: Vec<String>,
    pub education: Vec<String>,
    pub specializations: Vec<String>,
}

impl FacetOptions {
    pub fn from_profiles(profiles: &[Profile]) -> Self {
        FacetOptions {
            languages: distinct_values(profiles, Facet::Languages).into_iter().collect(),
            education: distinct_values(profiles, Facet::Education).into_iter().collect(),
            specializations: distinct_values(profiles, Facet::Specialization).into_iter().collect(),
        }
    }
}
