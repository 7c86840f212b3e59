//! Storage record models for the persistence layer.
//!
//! Records are the on-disk form of launcher items. Apps are stored by package name
//! only and re-resolved against the installed-app catalog on load, so labels and
//! icons always come from the platform. Records that no longer resolve (an
//! uninstalled app, a folder whose apps are all gone) are dropped.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::{AppRef, FolderInfo, GestureMode, LauncherItem, WidgetId, WidgetStack, DEFAULT_FOLDER_NAME};

pub const KIND_APP: &str = "app";
pub const KIND_FOLDER: &str = "folder";
pub const KIND_WIDGET: &str = "widget";
pub const KIND_WIDGET_STACK: &str = "widget_stack";

/// One persisted grid item.
///
/// ```json
/// {"type": "folder", "id": "…", "name": "Games", "apps": ["com.a", "com.b"], "gestureMode": "CUSTOM"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package names of a folder's apps. Older files call this `appPackages`.
    #[serde(default, alias = "appPackages", skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<String>>,

    /// Unknown modes read as absent, which resolves to [`GestureMode::Default`].
    #[serde(
        default,
        deserialize_with = "lenient_gesture_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub gesture_mode: Option<GestureMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_id: Option<WidgetId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_ids: Option<Vec<WidgetId>>,
}

fn lenient_gesture_mode<'de, D>(deserializer: D) -> Result<Option<GestureMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(GestureMode::deserialize(value).ok())
}

impl ItemRecord {
    fn empty(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            package_name: None,
            id: None,
            name: None,
            apps: None,
            gesture_mode: None,
            widget_id: None,
            widget_ids: None,
        }
    }

    #[must_use]
    pub fn from_item(item: &LauncherItem) -> Self {
        match item {
            LauncherItem::App(app) => Self {
                package_name: Some(app.package_name.clone()),
                ..Self::empty(KIND_APP)
            },
            LauncherItem::Folder(folder) => Self {
                id: Some(folder.id.clone()),
                name: Some(folder.name.clone()),
                apps: Some(folder.apps.iter().map(|app| app.package_name.clone()).collect()),
                gesture_mode: Some(folder.gesture_mode),
                ..Self::empty(KIND_FOLDER)
            },
            LauncherItem::Widget(id) => Self {
                widget_id: Some(*id),
                ..Self::empty(KIND_WIDGET)
            },
            LauncherItem::WidgetStack(stack) => Self {
                widget_ids: Some(stack.to_vec()),
                ..Self::empty(KIND_WIDGET_STACK)
            },
        }
    }

    /// Resolves this record against the installed apps, keyed by package name.
    #[must_use]
    pub fn into_item(self, installed: &HashMap<&str, &AppRef>) -> Option<LauncherItem> {
        match self.kind.as_str() {
            KIND_APP => {
                let package = self.package_name?;
                installed.get(package.as_str()).map(|app| LauncherItem::App((*app).clone()))
            }
            KIND_FOLDER => {
                let apps: Vec<AppRef> = self
                    .apps
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|package| installed.get(package.as_str()).map(|app| (*app).clone()))
                    .collect();
                if apps.is_empty() {
                    return None;
                }
                Some(LauncherItem::Folder(FolderInfo {
                    id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    name: self.name.unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string()),
                    apps,
                    gesture_mode: self.gesture_mode.unwrap_or_default(),
                }))
            }
            KIND_WIDGET => self.widget_id.map(LauncherItem::Widget),
            KIND_WIDGET_STACK => WidgetStack::from_ids(self.widget_ids?).map(LauncherItem::WidgetStack),
            other => {
                tracing::debug!(kind = other, "skipping record of unknown type");
                None
            }
        }
    }
}

#[must_use]
pub fn records_from_items(items: &[LauncherItem]) -> Vec<ItemRecord> {
    items.iter().map(ItemRecord::from_item).collect()
}

/// Rebuilds the grid from records, dropping whatever no longer resolves.
#[must_use]
pub fn items_from_records(records: Vec<ItemRecord>, installed: &[AppRef]) -> Vec<LauncherItem> {
    let by_package: HashMap<&str, &AppRef> = installed
        .iter()
        .map(|app| (app.package_name.as_str(), app))
        .collect();
    records
        .into_iter()
        .filter_map(|record| record.into_item(&by_package))
        .collect()
}
