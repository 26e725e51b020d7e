use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ApplicationStatus, FraApplication, StaticMonthlyGrowth, StatusSummary, Village};

/// Percentage with one decimal, 0 when there is nothing to divide by.
pub fn approval_rate(approved: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (approved as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Figures derived from the village dataset currently on the map.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VillageBreakdown {
    pub total_villages: usize,
    pub status: StatusSummary,
    pub approval_rate: f64,
    pub total_land_area: f64,
    pub average_forest_cover: f64,
    pub claims_by_state: BTreeMap<String, usize>,
    pub claims_by_type: BTreeMap<String, usize>,
}

impl VillageBreakdown {
    pub fn of(villages: &[Village]) -> Self {
        let status = StatusSummary::of(villages);
        let mut claims_by_state = BTreeMap::new();
        let mut claims_by_type = BTreeMap::new();
        for village in villages {
            *claims_by_state.entry(village.state.clone()).or_insert(0) += 1;
            *claims_by_type
                .entry(village.claim_type.to_string())
                .or_insert(0) += 1;
        }

        let total_forest: f64 = villages.iter().map(|v| v.forest_cover).sum();
        VillageBreakdown {
            total_villages: villages.len(),
            status,
            approval_rate: approval_rate(status.approved, status.total()),
            total_land_area: villages.iter().map(|v| v.land_area).sum(),
            average_forest_cover: if villages.is_empty() {
                0.0
            } else {
                total_forest / villages.len() as f64
            },
            claims_by_state,
            claims_by_type,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecentActivity {
    pub id: String,
    pub applicant: String,
    pub status: ApplicationStatus,
    pub at: Option<DateTime<Utc>>,
}

/// The analytics dashboard payload, in the field naming its consumers
/// already expect.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub total_applications: usize,
    pub pending_applications: usize,
    pub approved_applications: usize,
    pub rejected_applications: usize,
    pub total_documents: usize,
    pub verified_documents: usize,
    pub pending_documents: usize,
    pub total_users: usize,
    pub active_users: usize,
    pub applications_by_state: BTreeMap<String, usize>,
    pub applications_by_type: BTreeMap<String, usize>,
    pub applications_by_status: BTreeMap<String, usize>,
    pub monthly_trends: &'static [StaticMonthlyGrowth],
    pub recent_activities: Vec<RecentActivity>,
}

const RECENT_ACTIVITY_LIMIT: usize = 5;

fn counts(entries: &[(&str, usize)]) -> BTreeMap<String, usize> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

impl DashboardData {
    /// The national figures shown when no live analytics are available.
    pub fn baseline(monthly_trends: &'static [StaticMonthlyGrowth]) -> Self {
        DashboardData {
            total_applications: 1234,
            pending_applications: 109505,
            approved_applications: 856,
            rejected_applications: 236,
            total_documents: 470251,
            verified_documents: 400000,
            pending_documents: 70251,
            total_users: 2500,
            active_users: 1800,
            applications_by_state: counts(&[
                ("Odisha", 500),
                ("Telangana", 300),
                ("Chhattisgarh", 250),
                ("Maharashtra", 184),
            ]),
            applications_by_type: counts(&[
                ("individual", 820),
                ("community", 280),
                ("habitation", 134),
            ]),
            applications_by_status: counts(&[
                ("submitted", 400),
                ("under_review", 300),
                ("approved", 856),
                ("rejected", 236),
            ]),
            monthly_trends,
            recent_activities: Vec::new(),
        }
    }

    /// The baseline figures with this process's applications, sessions and
    /// sign-ups added on top. `applications` is expected newest first.
    pub fn collect(
        applications: &[FraApplication],
        active_sessions: usize,
        known_users: usize,
        monthly_trends: &'static [StaticMonthlyGrowth],
    ) -> Self {
        let mut data = DashboardData::baseline(monthly_trends);
        let count = |status: ApplicationStatus| {
            applications.iter().filter(|a| a.status == status).count()
        };

        for app in applications {
            *data
                .applications_by_state
                .entry(app.form.state.clone())
                .or_insert(0) += 1;
            *data
                .applications_by_type
                .entry(app.form.land_type.to_string())
                .or_insert(0) += 1;
            *data
                .applications_by_status
                .entry(app.status.to_string())
                .or_insert(0) += 1;

            let docs = app.form.supporting_documents.len();
            data.total_documents += docs;
            if app.status == ApplicationStatus::Approved {
                data.verified_documents += docs;
            } else {
                data.pending_documents += docs;
            }
        }

        data.total_applications += applications.len();
        data.pending_applications +=
            count(ApplicationStatus::Submitted) + count(ApplicationStatus::UnderReview);
        data.approved_applications += count(ApplicationStatus::Approved);
        data.rejected_applications += count(ApplicationStatus::Rejected);
        data.total_users += known_users;
        data.active_users += active_sessions;
        data.recent_activities = applications
            .iter()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|app| RecentActivity {
                id: app.id.to_string(),
                applicant: app.form.applicant_name.clone(),
                status: app.status,
                at: app.submitted_at,
            })
            .collect();
        data
    }
}
