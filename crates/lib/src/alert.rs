use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    AlertId, AlertKind, Coordinates, FieldErrors, PortalError, Priority, Result, Role,
    StaticAlert, TargetAudience, User,
};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub priority: Priority,
    pub coordinates: Coordinates,
    pub village: Option<String>,
    pub state: String,
    pub district: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub target_audience: TargetAudience,
    pub attachments: Vec<String>,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(err) => {
            warn!("Ignoring malformed alert timestamp {:?}: {}", raw, err);
            None
        }
    }
}

impl From<&StaticAlert> for Alert {
    fn from(a: &StaticAlert) -> Self {
        Alert {
            id: a.id,
            title: a.title.to_string(),
            message: a.message.to_string(),
            kind: a.kind,
            priority: a.priority,
            coordinates: a.coordinates,
            village: a.village.map(str::to_string),
            state: a.state.to_string(),
            district: a.district.to_string(),
            created_by: a.created_by.to_string(),
            created_at: parse_timestamp(a.created_at).unwrap_or_default(),
            expires_at: a.expires_at.and_then(parse_timestamp),
            is_active: a.is_active,
            target_audience: a.target_audience,
            attachments: a.attachments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Alert {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires < now)
    }

    /// Department users see every alert; citizens, NGOs and visitors only
    /// those addressed to everyone or to local communities.
    pub fn is_visible_to(&self, role: Option<Role>) -> bool {
        match self.target_audience {
            TargetAudience::All | TargetAudience::Local => true,
            TargetAudience::Government => role.is_some_and(|r| r.is_government_side()),
        }
    }
}

/// The alert viewer's search box and selects.
#[derive(Debug, Default, Clone)]
pub struct AlertFilter {
    pub search: Option<String>,
    pub kind: Option<AlertKind>,
    pub priority: Option<Priority>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        let matches_search = match self.search.as_deref().map(str::to_lowercase) {
            None => true,
            Some(term) => {
                alert.title.to_lowercase().contains(&term)
                    || alert.message.to_lowercase().contains(&term)
                    || alert
                        .village
                        .as_deref()
                        .is_some_and(|v| v.to_lowercase().contains(&term))
            }
        };

        matches_search
            && self.kind.is_none_or(|k| alert.kind == k)
            && self.priority.is_none_or(|p| alert.priority == p)
            && alert.is_active
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AlertDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    #[serde(default)]
    pub priority: Priority,
    pub coordinates: Coordinates,
    pub village: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub district: String,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    pub target_audience: TargetAudience,
    #[serde(default)]
    pub attachments: Vec<String>,
}

fn active_by_default() -> bool {
    true
}

impl AlertDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.insert("title", "Title is required".to_string());
        }
        if self.message.trim().is_empty() {
            errors.insert("message", "Message is required".to_string());
        }
        if self.state.trim().is_empty() {
            errors.insert("state", "State is required".to_string());
        }
        if self.district.trim().is_empty() {
            errors.insert("district", "District is required".to_string());
        }
        if !self.coordinates.is_valid() {
            errors.insert("coordinates", "Coordinates are out of range".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(errors))
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AlertPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AlertKind>,
    pub priority: Option<Priority>,
    /// Absent leaves the expiry alone, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
    pub target_audience: Option<TargetAudience>,
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The in-memory alert list, newest first.
pub struct AlertBoard {
    alerts: Vec<Alert>,
}

impl AlertBoard {
    pub fn seeded(alerts: &[&StaticAlert]) -> Self {
        AlertBoard {
            alerts: alerts.iter().map(|a| Alert::from(*a)).collect(),
        }
    }

    pub fn all(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn visible<'a>(
        &'a self,
        role: Option<Role>,
        filter: &'a AlertFilter,
    ) -> impl Iterator<Item = &'a Alert> + 'a {
        self.alerts
            .iter()
            .filter(move |a| a.is_visible_to(role) && filter.matches(a))
    }

    pub fn create(&mut self, draft: AlertDraft, author: &User, now: DateTime<Utc>) -> Result<&Alert> {
        author
            .permissions()
            .require(author.permissions().can_manage_alerts, "manage alerts")?;
        draft.validate()?;

        let mut id = now.timestamp_millis().max(0) as u64;
        while self.alerts.iter().any(|a| a.id.0 == id) {
            id += 1;
        }

        let alert = Alert {
            id: AlertId(id),
            title: draft.title.trim().to_string(),
            message: draft.message.trim().to_string(),
            kind: draft.kind,
            priority: draft.priority,
            coordinates: draft.coordinates,
            village: draft.village.filter(|v| !v.trim().is_empty()),
            state: draft.state,
            district: draft.district,
            created_by: author.display_name.clone(),
            created_at: now,
            expires_at: draft.expires_at,
            is_active: draft.is_active,
            target_audience: draft.target_audience,
            attachments: draft.attachments,
        };
        self.alerts.insert(0, alert);
        Ok(&self.alerts[0])
    }

    pub fn update(&mut self, id: AlertId, patch: AlertPatch, editor: &User) -> Result<&Alert> {
        editor
            .permissions()
            .require(editor.permissions().can_manage_alerts, "manage alerts")?;
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| PortalError::not_found("alert", id.0))?;

        if let Some(title) = patch.title.filter(|t| !t.trim().is_empty()) {
            alert.title = title;
        }
        if let Some(message) = patch.message.filter(|m| !m.trim().is_empty()) {
            alert.message = message;
        }
        if let Some(kind) = patch.kind {
            alert.kind = kind;
        }
        if let Some(priority) = patch.priority {
            alert.priority = priority;
        }
        if let Some(expires_at) = patch.expires_at {
            alert.expires_at = expires_at;
        }
        if let Some(active) = patch.is_active {
            alert.is_active = active;
        }
        if let Some(audience) = patch.target_audience {
            alert.target_audience = audience;
        }
        Ok(alert)
    }

    pub fn delete(&mut self, id: AlertId, editor: &User) -> Result<Alert> {
        editor
            .permissions()
            .require(editor.permissions().can_manage_alerts, "manage alerts")?;
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| PortalError::not_found("alert", id.0))?;
        Ok(self.alerts.remove(index))
    }
}
