use fra_portal::{ForestAreaId, StaticForestArea, StaticState, StaticVillage, VillageId};

include!(concat!(env!("OUT_DIR"), "/gen.rs"));

pub fn village(id: VillageId) -> Option<&'static StaticVillage> {
    villages::ALL.iter().copied().find(|v| v.id == id)
}

pub fn forest_area(id: ForestAreaId) -> Option<&'static StaticForestArea> {
    forest_areas::ALL.iter().copied().find(|f| f.id == id)
}

pub fn state(name: &str) -> Option<&'static StaticState> {
    STATES.iter().find(|s| s.name == name)
}

/// Districts of `state` for the filter dropdown; empty for unknown states.
pub fn districts_of(state_name: &str) -> &'static [&'static str] {
    state(state_name).map(|s| s.districts).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use fra_portal::{AlertId, ClaimStatus, TargetAudience};

    use super::*;

    #[test]
    fn records_are_reachable_by_id() {
        assert_eq!(village(VillageId(5)).map(|v| v.name), Some("Kendupali"));
        assert!(village(VillageId(3)).is_none());
        assert_eq!(
            forest_area(ForestAreaId(1)).map(|f| f.name),
            Some("Similipal National Park")
        );
        assert_eq!(villages::ALL.len(), 6);
        assert_eq!(forest_areas::ALL.len(), 10);
    }

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = villages::ALL.iter().map(|v| v.id).collect();
        assert_eq!(ids.len(), villages::ALL.len());
        let ids: HashSet<_> = forest_areas::ALL.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), forest_areas::ALL.len());
        let ids: HashSet<_> = alerts::ALL.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), alerts::ALL.len());
    }

    #[test]
    fn villages_sit_in_known_districts() {
        for v in villages::ALL {
            assert!(
                districts_of(v.state).contains(&v.district),
                "{} is not in a listed district",
                v.name
            );
        }
        assert!(districts_of("Atlantis").is_empty());
    }

    #[test]
    fn generated_values_match_model() {
        assert_eq!(villages::KUMHARGAON.status, ClaimStatus::Approved);
        assert_eq!(villages::AGARTALA_FOREST.coordinates.lng, 91.2862);
        assert_eq!(alerts::ALERT_4.target_audience, TargetAudience::All);
        assert_eq!(alerts::ALERT_1.attachments.len(), 2);
        assert_eq!(alerts::ALL[1].id, AlertId(2));
        assert_eq!(STATISTICS.monthly_growth.len(), 6);
        assert_eq!(RECOMMENDATIONS[2].title, "Non-Timber Forest Produce");
        assert_eq!(STATES.len(), 4);
    }
}
