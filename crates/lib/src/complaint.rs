use chrono::{DateTime, Utc};
use chrono_tz::Asia::Kolkata;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::tagged_enum;
use crate::{FieldErrors, PortalError, Priority, Result, Role, User};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComplaintId(pub u64);

tagged_enum! {
    pub enum ComplaintStatus {
        Open => "open",
        InProgress => "in-progress",
        Resolved => "resolved",
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: ComplaintId,
    pub village: String,
    /// Display name of whoever reported it.
    pub user: String,
    #[serde(skip)]
    pub reporter_uid: String,
    pub issue: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub date: String,
    pub priority: Priority,
    pub response: String,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct ComplaintForm {
    pub village: String,
    pub issue: String,
    pub description: String,
    pub priority: Priority,
}

impl ComplaintForm {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.village.trim().is_empty() {
            errors.insert("village", "Village is required".to_string());
        }
        if self.issue.trim().is_empty() {
            errors.insert("issue", "Issue is required".to_string());
        }
        if self.description.trim().is_empty() {
            errors.insert("description", "Description is required".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(errors))
        }
    }
}

/// Complaint dates are shown as the calendar day in India.
pub fn local_date(now: DateTime<Utc>) -> String {
    now.with_timezone(&Kolkata).format("%Y-%m-%d").to_string()
}

pub struct ComplaintBook {
    complaints: Vec<Complaint>,
}

impl ComplaintBook {
    /// The three demo complaints. The first two belong to the demo citizen
    /// account so its complaint list is not empty.
    pub fn seeded() -> Self {
        let seed = |id, village: &str, user: &str, uid: &str, issue: &str, status, date: &str, priority, response: &str| Complaint {
            id: ComplaintId(id),
            village: village.to_string(),
            user: user.to_string(),
            reporter_uid: uid.to_string(),
            issue: issue.to_string(),
            description: issue.to_string(),
            status,
            date: date.to_string(),
            priority,
            response: response.to_string(),
        };

        ComplaintBook {
            complaints: vec![
                seed(
                    1,
                    "Kendupali",
                    "Local User 1",
                    "mock-normal-user-id",
                    "Claim status shows as pending but should be approved",
                    ComplaintStatus::Open,
                    "2024-01-15",
                    Priority::High,
                    "",
                ),
                seed(
                    2,
                    "Village ABC",
                    "Local User 2",
                    "mock-normal-user-id",
                    "Incorrect land area calculation",
                    ComplaintStatus::InProgress,
                    "2024-01-14",
                    Priority::Medium,
                    "We are reviewing your complaint and will update you soon.",
                ),
                seed(
                    3,
                    "Village XYZ",
                    "Local User 3",
                    "local-user-3",
                    "Missing documentation in claim",
                    ComplaintStatus::Resolved,
                    "2024-01-10",
                    Priority::Low,
                    "",
                ),
            ],
        }
    }

    pub fn submit(&mut self, form: ComplaintForm, user: &User, now: DateTime<Utc>) -> Result<&Complaint> {
        if !matches!(user.role, Some(Role::Normal | Role::Ngo)) {
            return Err(PortalError::Forbidden("submit complaints"));
        }
        form.validate()?;

        let id = self.complaints.iter().map(|c| c.id.0).max().unwrap_or(0) + 1;
        let complaint = Complaint {
            id: ComplaintId(id),
            village: form.village.trim().to_string(),
            user: user.display_name.clone(),
            reporter_uid: user.uid.clone(),
            issue: form.issue.trim().to_string(),
            description: form.description.trim().to_string(),
            status: ComplaintStatus::Open,
            date: local_date(now),
            priority: form.priority,
            response: String::new(),
        };
        debug!("Complaint {} filed by {}", id, user.email);
        self.complaints.insert(0, complaint);
        Ok(&self.complaints[0])
    }

    pub fn list<'a>(&'a self, user: &'a User) -> impl Iterator<Item = &'a Complaint> + 'a {
        let everything = user.permissions().can_view_all_complaints;
        self.complaints
            .iter()
            .filter(move |c| everything || c.reporter_uid == user.uid)
    }

    pub fn set_status(
        &mut self,
        id: ComplaintId,
        status: ComplaintStatus,
        response: Option<String>,
        user: &User,
    ) -> Result<&Complaint> {
        let perms = user.permissions();
        perms.require(perms.can_edit_complaints, "edit complaints")?;

        let complaint = self
            .complaints
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PortalError::not_found("complaint", id.0))?;
        complaint.status = status;
        if let Some(response) = response.filter(|r| !r.trim().is_empty()) {
            complaint.response = response;
        }
        Ok(complaint)
    }

    /// Complaints in the user's list that are not resolved yet.
    pub fn open_count(&self, user: &User) -> usize {
        self.list(user)
            .filter(|c| c.status != ComplaintStatus::Resolved)
            .count()
    }
}
