use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    ClaimStatus, ClaimType, Coordinates, PortalError, Result, StaticVillage, UnknownTag, User,
    VillageId, parse_choice,
};

/// A village as currently displayed: the static record with any in-memory
/// edits applied on top.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Village {
    pub id: VillageId,
    pub name: String,
    pub state: String,
    pub district: String,
    pub coordinates: Coordinates,
    #[serde(rename = "fraType")]
    pub claim_type: ClaimType,
    pub land_area: f64,
    pub status: ClaimStatus,
    pub population: u32,
    pub forest_cover: f64,
    pub last_updated: String,
    pub edited: bool,
}

impl From<&StaticVillage> for Village {
    fn from(v: &StaticVillage) -> Self {
        Village {
            id: v.id,
            name: v.name.to_string(),
            state: v.state.to_string(),
            district: v.district.to_string(),
            coordinates: v.coordinates,
            claim_type: v.claim_type,
            land_area: v.land_area,
            status: v.status,
            population: v.population,
            forest_cover: v.forest_cover,
            last_updated: v.last_updated.to_string(),
            edited: false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct VillageFilter {
    pub state: Option<String>,
    pub district: Option<String>,
    pub status: Option<ClaimStatus>,
    pub claim_type: Option<ClaimType>,
}

impl VillageFilter {
    /// Builds a filter from the map control panel's raw select values.
    pub fn from_choices(
        state: Option<&str>,
        district: Option<&str>,
        status: Option<&str>,
        claim_type: Option<&str>,
    ) -> std::result::Result<Self, UnknownTag> {
        let text = |value: Option<&str>, sentinel: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty() && *v != "all" && *v != sentinel)
                .map(str::to_string)
        };

        Ok(VillageFilter {
            state: text(state, "all-states"),
            district: text(district, "all-districts"),
            status: parse_choice(status, &["all-status"])?,
            claim_type: parse_choice(claim_type, &[])?,
        })
    }

    pub fn matches(&self, village: &Village) -> bool {
        self.state.as_deref().is_none_or(|s| village.state == s)
            && self
                .district
                .as_deref()
                .is_none_or(|d| village.district == d)
            && self.status.is_none_or(|s| village.status == s)
            && self.claim_type.is_none_or(|t| village.claim_type == t)
    }
}

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusSummary {
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

impl StatusSummary {
    pub fn of<'a>(villages: impl IntoIterator<Item = &'a Village>) -> Self {
        villages
            .into_iter()
            .fold(StatusSummary::default(), |mut acc, v| {
                match v.status {
                    ClaimStatus::Approved => acc.approved += 1,
                    ClaimStatus::Pending => acc.pending += 1,
                    ClaimStatus::Rejected => acc.rejected += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.approved + self.pending + self.rejected
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VillagePatch {
    pub status: Option<ClaimStatus>,
    #[serde(rename = "fraType")]
    pub claim_type: Option<ClaimType>,
    pub land_area: Option<f64>,
    pub population: Option<u32>,
    pub forest_cover: Option<f64>,
}

impl VillagePatch {
    fn check(&self) -> Result<()> {
        if let Some(area) = self.land_area {
            if !area.is_finite() || area < 0.0 {
                return Err(PortalError::Invalid(
                    "Land area must be a non-negative number".to_string(),
                ));
            }
        }
        if let Some(cover) = self.forest_cover {
            if !(0.0..=100.0).contains(&cover) {
                return Err(PortalError::Invalid(
                    "Forest cover must be between 0 and 100".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn merge(&mut self, newer: VillagePatch) {
        self.status = newer.status.or(self.status);
        self.claim_type = newer.claim_type.or(self.claim_type);
        self.land_area = newer.land_area.or(self.land_area);
        self.population = newer.population.or(self.population);
        self.forest_cover = newer.forest_cover.or(self.forest_cover);
    }
}

/// In-memory village edits. Nothing here survives a restart.
#[derive(Default)]
pub struct VillageOverlay {
    edits: HashMap<VillageId, (VillagePatch, String)>,
}

impl VillageOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, base: &StaticVillage) -> Village {
        let mut village = Village::from(base);
        if let Some((patch, updated)) = self.edits.get(&base.id) {
            if let Some(status) = patch.status {
                village.status = status;
            }
            if let Some(claim_type) = patch.claim_type {
                village.claim_type = claim_type;
            }
            if let Some(area) = patch.land_area {
                village.land_area = area;
            }
            if let Some(population) = patch.population {
                village.population = population;
            }
            if let Some(cover) = patch.forest_cover {
                village.forest_cover = cover;
            }
            village.last_updated = updated.clone();
            village.edited = true;
        }
        village
    }

    pub fn all(&self, villages: &[&StaticVillage]) -> Vec<Village> {
        villages.iter().map(|v| self.apply(v)).collect()
    }

    /// Records an edit made by `editor` on `today` (an ISO date).
    pub fn edit(
        &mut self,
        base: &StaticVillage,
        patch: VillagePatch,
        editor: &User,
        today: &str,
    ) -> Result<Village> {
        editor
            .permissions()
            .require(editor.permissions().can_edit_village_data, "edit village data")?;
        patch.check()?;

        let entry = self
            .edits
            .entry(base.id)
            .or_insert_with(|| (VillagePatch::default(), String::new()));
        entry.0.merge(patch);
        entry.1 = today.to_string();
        Ok(self.apply(base))
    }

    pub fn reset(&mut self, id: VillageId) -> bool {
        self.edits.remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, authenticate};

    const KUMHARGAON: StaticVillage = StaticVillage {
        id: VillageId(1),
        name: "Kumhargaon",
        state: "Madhya Pradesh",
        district: "Mandla",
        coordinates: Coordinates {
            lat: 22.5957,
            lng: 80.3689,
        },
        claim_type: ClaimType::Cfr,
        land_area: 1250.0,
        status: ClaimStatus::Approved,
        population: 2847,
        forest_cover: 78.0,
        last_updated: "2024-01-15",
    };

    const JHIRNIA: StaticVillage = StaticVillage {
        id: VillageId(4),
        name: "Jhirnia",
        state: "Odisha",
        district: "Rayagada",
        coordinates: Coordinates {
            lat: 19.1663,
            lng: 83.4156,
        },
        claim_type: ClaimType::Ifr,
        land_area: 1560.0,
        status: ClaimStatus::Rejected,
        population: 2156,
        forest_cover: 45.0,
        last_updated: "2024-01-08",
    };

    #[test]
    fn filter_treats_sentinels_as_wildcards() {
        let filter =
            VillageFilter::from_choices(Some("all-states"), Some("all-districts"), Some("all-status"), Some("all"))
                .unwrap();
        assert_eq!(filter, VillageFilter::default());

        let villages = VillageOverlay::new().all(&[&KUMHARGAON, &JHIRNIA]);
        let odisha = VillageFilter::from_choices(Some("Odisha"), None, None, Some("IFR")).unwrap();
        let matched: Vec<_> = villages.iter().filter(|v| odisha.matches(v)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Jhirnia");

        assert!(VillageFilter::from_choices(None, None, Some("Done"), None).is_err());
    }

    #[test]
    fn summary_counts_statuses() {
        let villages = VillageOverlay::new().all(&[&KUMHARGAON, &JHIRNIA]);
        let summary = StatusSummary::of(&villages);
        assert_eq!(
            summary,
            StatusSummary {
                approved: 1,
                pending: 0,
                rejected: 1
            }
        );
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn edits_need_permission_and_merge() {
        let mut overlay = VillageOverlay::new();
        let citizen = authenticate("user@fraportal.com", "user123").unwrap();
        let officer = authenticate("forest@fraportal.com", "forest123").unwrap();
        assert_eq!(officer.role, Some(Role::ForestRevenue));

        let patch = VillagePatch {
            status: Some(ClaimStatus::Pending),
            ..Default::default()
        };
        assert!(matches!(
            overlay.edit(&KUMHARGAON, patch.clone(), &citizen, "2024-02-01"),
            Err(PortalError::Forbidden(_))
        ));

        overlay.edit(&KUMHARGAON, patch, &officer, "2024-02-01").unwrap();
        let village = overlay
            .edit(
                &KUMHARGAON,
                VillagePatch {
                    population: Some(3000),
                    ..Default::default()
                },
                &officer,
                "2024-02-02",
            )
            .unwrap();
        assert_eq!(village.status, ClaimStatus::Pending);
        assert_eq!(village.population, 3000);
        assert_eq!(village.last_updated, "2024-02-02");
        assert!(village.edited);

        let bad = VillagePatch {
            forest_cover: Some(120.0),
            ..Default::default()
        };
        assert!(overlay.edit(&KUMHARGAON, bad, &officer, "2024-02-03").is_err());

        assert!(overlay.reset(VillageId(1)));
        assert!(!overlay.apply(&KUMHARGAON).edited);
    }
}
