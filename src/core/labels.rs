use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a label, independent of its position in the list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a label created at runtime
    pub fn generate() -> Self {
        Self(format!("class-{}", uuid::Uuid::new_v4()))
    }

    /// Id used for labels migrated from a plain list of names
    pub fn legacy(index: usize) -> Self {
        Self(format!("class-{}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, colored class an image can be sorted into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    /// Hex color such as `#ef4444`
    pub color: String,
}

impl Label {
    pub fn new(id: LabelId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Ordered list of labels. Order is cycle order and display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    /// Build labels from bare names, assigning legacy ids and palette colors
    pub fn from_names<I, S>(names: I, palette: &[&str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let color = if palette.is_empty() {
                    "#808080"
                } else {
                    palette[index % palette.len()]
                };
                Label::new(LabelId::legacy(index), name.as_ref(), color)
            })
            .collect();
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn as_slice(&self) -> &[Label] {
        &self.labels
    }

    pub fn get(&self, id: &LabelId) -> Option<&Label> {
        self.labels.iter().find(|label| &label.id == id)
    }

    pub fn at(&self, position: usize) -> Option<&Label> {
        self.labels.get(position)
    }

    pub fn position(&self, id: &LabelId) -> Option<usize> {
        self.labels.iter().position(|label| &label.id == id)
    }

    pub fn contains(&self, id: &LabelId) -> bool {
        self.position(id).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.labels.iter().map(|label| label.name.clone()).collect()
    }

    /// Append a label and return its id
    pub fn push(&mut self, name: impl Into<String>, color: impl Into<String>) -> LabelId {
        let id = LabelId::generate();
        self.labels.push(Label::new(id.clone(), name, color));
        id
    }

    pub fn remove(&mut self, id: &LabelId) -> Option<Label> {
        let position = self.position(id)?;
        Some(self.labels.remove(position))
    }

    pub fn rename(&mut self, id: &LabelId, name: impl Into<String>) -> bool {
        match self.labels.iter_mut().find(|label| &label.id == id) {
            Some(label) => {
                label.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Move a label one step towards the front (`offset < 0`) or back (`offset > 0`)
    pub fn shift(&mut self, id: &LabelId, offset: isize) -> bool {
        let Some(position) = self.position(id) else {
            return false;
        };
        let target = position as isize + offset;
        if target < 0 || target as usize >= self.labels.len() {
            return false;
        }
        self.labels.swap(position, target as usize);
        true
    }

    /// Replace any duplicate or empty ids so every label is addressable
    pub fn dedup_ids(&mut self) {
        let mut seen = std::collections::HashSet::new();
        for label in &mut self.labels {
            if label.id.as_str().is_empty() || !seen.insert(label.id.clone()) {
                label.id = LabelId::generate();
                seen.insert(label.id.clone());
            }
        }
    }
}

impl From<Vec<Label>> for LabelSet {
    fn from(labels: Vec<Label>) -> Self {
        Self::new(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LabelSet {
        LabelSet::from_names(&["text", "figure", "photo"], &["#ef4444", "#10b981"])
    }

    #[test]
    fn test_from_names_assigns_legacy_ids_and_cycles_palette() {
        let labels = sample();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.at(0).unwrap().id, LabelId::legacy(0));
        assert_eq!(labels.at(2).unwrap().color, "#ef4444");
        assert_eq!(labels.names(), vec!["text", "figure", "photo"]);
    }

    #[test]
    fn test_shift_reorders_but_keeps_ids() {
        let mut labels = sample();
        let photo = LabelId::legacy(2);

        assert!(labels.shift(&photo, -1));
        assert_eq!(labels.position(&photo), Some(1));
        assert_eq!(labels.get(&photo).unwrap().name, "photo");

        // Out of range moves are refused
        assert!(!labels.shift(&LabelId::legacy(0), -1));
    }

    #[test]
    fn test_push_remove_rename() {
        let mut labels = sample();
        let id = labels.push("chart", "#3b82f6");
        assert_eq!(labels.len(), 4);
        assert!(labels.rename(&id, "diagram"));
        assert_eq!(labels.get(&id).unwrap().name, "diagram");

        let removed = labels.remove(&id).unwrap();
        assert_eq!(removed.name, "diagram");
        assert!(!labels.contains(&id));
    }

    #[test]
    fn test_dedup_ids() {
        let mut labels = LabelSet::new(vec![
            Label::new(LabelId::new("a"), "one", "#000000"),
            Label::new(LabelId::new("a"), "two", "#000000"),
            Label::new(LabelId::new(""), "three", "#000000"),
        ]);
        labels.dedup_ids();

        let ids: std::collections::HashSet<_> = labels.iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(labels.at(0).unwrap().id, LabelId::new("a"));
    }
}
