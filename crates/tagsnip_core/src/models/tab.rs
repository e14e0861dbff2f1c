//! Persisted tab-state models.

use serde::{Deserialize, Serialize};

/// One open editor tab as persisted remotely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabEntry {
    pub snippet_id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_active: bool,
}

/// The full tab list for a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TabsState {
    pub tabs: Vec<TabEntry>,
}

impl TabsState {
    /// Build the wire form from an ordered id list and the active id.
    pub fn from_order(order: &[String], active: Option<&str>) -> Self {
        let tabs = order
            .iter()
            .enumerate()
            .map(|(idx, id)| TabEntry {
                snippet_id: id.clone(),
                order: idx as u32,
                is_active: active == Some(id.as_str()),
            })
            .collect();
        Self { tabs }
    }

    /// Ordered snippet ids and the active id, sorted by `order`.
    ///
    /// Duplicate ids keep their first position. If several entries are
    /// flagged active, the first one wins.
    pub fn into_order(mut self) -> (Vec<String>, Option<String>) {
        self.tabs.sort_by_key(|tab| tab.order);
        let mut order: Vec<String> = Vec::with_capacity(self.tabs.len());
        let mut active = None;
        for tab in self.tabs {
            if order.contains(&tab.snippet_id) {
                continue;
            }
            if tab.is_active && active.is_none() {
                active = Some(tab.snippet_id.clone());
            }
            order.push(tab.snippet_id);
        }
        (order, active)
    }

    /// Number of entries flagged active.
    pub fn active_count(&self) -> usize {
        self.tabs.iter().filter(|tab| tab.is_active).count()
    }
}
