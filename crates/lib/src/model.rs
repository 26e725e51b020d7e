use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declares a closed set of string tags, as used by the portal's JSON and
/// query strings, with lookups in both directions.
macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $tag:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(::serde::Serialize, ::serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(#[serde(rename = $tag)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::UnknownTag;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    _ => Err($crate::UnknownTag {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use tagged_enum;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: String,
}

/// Parses an optional filter value, treating empty strings and the UI's
/// catch-all sentinels (`all`, `all-states`, ...) as "no filter".
pub fn parse_choice<T: FromStr<Err = UnknownTag>>(
    value: Option<&str>,
    catch_all: &[&str],
) -> Result<Option<T>, UnknownTag> {
    match value.map(str::trim) {
        None => Ok(None),
        Some(v) if v.is_empty() || v == "all" || catch_all.contains(&v) => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

/// The unique numeric ID of a village.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VillageId(pub u32);

/// The unique numeric ID of a forest area.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForestAreaId(pub u32);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertId(pub u64);

/// A WGS84 position. Note that GeoJSON output flips this to `[lng, lat]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

tagged_enum! {
    /// Individual or community forest rights.
    pub enum ClaimType {
        Ifr => "IFR",
        Cfr => "CFR",
    }
}

tagged_enum! {
    pub enum ClaimStatus {
        Approved => "Approved",
        Pending => "Pending",
        Rejected => "Rejected",
    }
}

tagged_enum! {
    pub enum ForestKind {
        NationalPark => "National Park",
        WildlifeSanctuary => "Wildlife Sanctuary",
        ReserveForest => "Reserve Forest",
        ProtectedForest => "Protected Forest",
        CommunityForest => "Community Forest",
        ForestRange => "Forest Range",
    }
}

tagged_enum! {
    pub enum Biodiversity {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

tagged_enum! {
    pub enum ProtectionStatus {
        Protected => "Protected",
        SemiProtected => "Semi-Protected",
        CommunityManaged => "Community Managed",
    }
}

tagged_enum! {
    pub enum AlertKind {
        Scheme => "scheme",
        Announcement => "announcement",
        Warning => "warning",
        Update => "update",
    }
}

tagged_enum! {
    pub enum Priority {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

tagged_enum! {
    pub enum TargetAudience {
        All => "all",
        Local => "local",
        Government => "government",
    }
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DataGenModel {
    pub villages: Vec<DataGenVillage>,
    pub forest_areas: Vec<DataGenForestArea>,
    pub alerts: Vec<DataGenAlert>,
    pub states: Vec<DataGenState>,
    pub statistics: DataGenStatistics,
    pub recommendations: Vec<DataGenRecommendation>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DataGenVillage {
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
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DataGenForestArea {
    pub id: ForestAreaId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ForestKind,
    pub state: String,
    pub district: String,
    pub coordinates: Coordinates,
    pub area: f64,
    pub forest_cover: f64,
    pub biodiversity: Biodiversity,
    pub protection_status: ProtectionStatus,
    pub established_year: u16,
    pub description: String,
    pub threats: Vec<String>,
    pub conservation_measures: Vec<String>,
    pub last_survey: String,
    pub is_active: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DataGenAlert {
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
    pub created_at: String,
    pub expires_at: Option<String>,
    pub is_active: bool,
    pub target_audience: TargetAudience,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DataGenState {
    pub name: String,
    pub districts: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DataGenStatistics {
    pub total_villages: u32,
    pub approved_claims: u32,
    pub pending_claims: u32,
    pub rejected_claims: u32,
    pub total_land_area: f64,
    pub forest_cover_percent: f64,
    pub monthly_growth: Vec<DataGenMonthlyGrowth>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DataGenMonthlyGrowth {
    pub month: String,
    pub approved: u32,
    pub pending: u32,
    pub rejected: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DataGenRecommendation {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub villages: u32,
    pub estimated_impact: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaticVillage {
    pub id: VillageId,
    pub name: &'static str,
    pub state: &'static str,
    pub district: &'static str,
    pub coordinates: Coordinates,
    #[serde(rename = "fraType")]
    pub claim_type: ClaimType,
    pub land_area: f64,
    pub status: ClaimStatus,
    pub population: u32,
    pub forest_cover: f64,
    pub last_updated: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaticForestArea {
    pub id: ForestAreaId,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ForestKind,
    pub state: &'static str,
    pub district: &'static str,
    pub coordinates: Coordinates,
    pub area: f64,
    pub forest_cover: f64,
    pub biodiversity: Biodiversity,
    pub protection_status: ProtectionStatus,
    pub established_year: u16,
    pub description: &'static str,
    pub threats: &'static [&'static str],
    pub conservation_measures: &'static [&'static str],
    pub last_survey: &'static str,
    pub is_active: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaticAlert {
    pub id: AlertId,
    pub title: &'static str,
    pub message: &'static str,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub priority: Priority,
    pub coordinates: Coordinates,
    pub village: Option<&'static str>,
    pub state: &'static str,
    pub district: &'static str,
    pub created_by: &'static str,
    pub created_at: &'static str,
    pub expires_at: Option<&'static str>,
    pub is_active: bool,
    pub target_audience: TargetAudience,
    pub attachments: &'static [&'static str],
}

#[derive(Serialize, Debug)]
pub struct StaticState {
    pub name: &'static str,
    pub districts: &'static [&'static str],
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaticStatistics {
    pub total_villages: u32,
    pub approved_claims: u32,
    pub pending_claims: u32,
    pub rejected_claims: u32,
    pub total_land_area: f64,
    pub forest_cover_percent: f64,
    pub monthly_growth: &'static [StaticMonthlyGrowth],
}

#[derive(Serialize, Debug, PartialEq)]
pub struct StaticMonthlyGrowth {
    pub month: &'static str,
    pub approved: u32,
    pub pending: u32,
    pub rejected: u32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaticRecommendation {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub priority: Priority,
    pub villages: u32,
    pub estimated_impact: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_strings() {
        assert_eq!("Semi-Protected".parse(), Ok(ProtectionStatus::SemiProtected));
        assert_eq!(ForestKind::NationalPark.to_string(), "National Park");
        assert_eq!(
            serde_json::to_value(ClaimType::Cfr).unwrap(),
            serde_json::json!("CFR")
        );
        let err = "IFRR".parse::<ClaimType>().unwrap_err();
        assert_eq!(err.kind, "ClaimType");
    }

    #[test]
    fn catch_all_filters_parse_to_none() {
        assert_eq!(parse_choice::<ClaimStatus>(None, &[]), Ok(None));
        assert_eq!(parse_choice::<ClaimStatus>(Some("all"), &[]), Ok(None));
        assert_eq!(
            parse_choice::<ClaimStatus>(Some("all-status"), &["all-status"]),
            Ok(None)
        );
        assert_eq!(
            parse_choice::<ClaimStatus>(Some("Pending"), &["all-status"]),
            Ok(Some(ClaimStatus::Pending))
        );
        assert!(parse_choice::<ClaimStatus>(Some("pending"), &[]).is_err());
    }

    #[test]
    fn coordinates_range_check() {
        assert!(Coordinates { lat: 22.5, lng: 80.3 }.is_valid());
        assert!(!Coordinates { lat: 91.0, lng: 0.0 }.is_valid());
        assert!(!Coordinates { lat: 0.0, lng: -180.5 }.is_valid());
    }
}
