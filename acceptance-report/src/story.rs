// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::naming::humanize_id;

/// A feature of the application under test. Stories may be grouped under a feature.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Feature {
    id: String,
    name: String,
}

impl Feature {
    /// Creates a new feature.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Creates a feature whose name is derived from the last segment of a dotted id:
    /// `myapp.features.SomeFeature` is named `Some feature`.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = humanize_id(&id);
        Self { id, name }
    }

    /// Returns the feature's id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the feature's human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The identity of the scenario a test outcome belongs to.
///
/// Two stories are equal if their ids, names and features all match.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Story {
    id: String,
    name: String,
    feature: Option<Feature>,
}

impl Story {
    /// Creates a story that does not belong to a feature.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            feature: None,
        }
    }

    /// Creates a story that belongs to `feature`.
    pub fn with_feature(id: impl Into<String>, name: impl Into<String>, feature: Feature) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            feature: Some(feature),
        }
    }

    /// Creates a story whose name is derived from the last segment of a dotted id.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = humanize_id(&id);
        Self::with_id(id, name)
    }

    /// Returns the story's id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the story's human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the feature this story belongs to, if any.
    pub fn feature(&self) -> Option<&Feature> {
        self.feature.as_ref()
    }

    /// Sets the feature this story belongs to.
    pub fn set_feature(&mut self, feature: Feature) -> &mut Self {
        self.feature = Some(feature);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stories_compare_by_id_name_and_feature() {
        let plain = Story::with_id("app.PurchaseWidget", "Purchase widget");
        assert_eq!(plain, Story::with_id("app.PurchaseWidget", "Purchase widget"));
        assert_ne!(plain, Story::with_id("app.PurchaseWidget", "Buy a widget"));

        let feature = Feature::new("app.Widgets", "Widgets");
        let with_feature = Story::with_feature("app.PurchaseWidget", "Purchase widget", feature);
        assert_ne!(plain, with_feature);
        assert_eq!(
            with_feature,
            Story::with_feature(
                "app.PurchaseWidget",
                "Purchase widget",
                Feature::new("app.Widgets", "Widgets"),
            )
        );
        assert_ne!(
            with_feature,
            Story::with_feature(
                "app.PurchaseWidget",
                "Purchase widget",
                Feature::new("app.Widgets", "Gadgets"),
            )
        );
    }

    #[test]
    fn names_derived_from_ids() {
        let story = Story::from_id("app.stories.PurchaseAWidget");
        assert_eq!(story.name(), "Purchase a widget");
        assert_eq!(story.feature(), None);

        let feature = Feature::from_id("myapp.myfeatures.SomeFeature");
        assert_eq!(feature.name(), "Some feature");
    }
}
