use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{
    Alert, Coordinates, DataGenAlert, DataGenForestArea, DataGenVillage, StaticForestArea, Village,
};

/// Anything the map can pin to a point.
pub trait Located {
    fn location(&self) -> Coordinates;
}

macro_rules! located {
    ($($ty:ty),+) => {
        $(impl Located for $ty {
            fn location(&self) -> Coordinates {
                self.coordinates
            }
        })+
    };
}

located!(
    Village,
    StaticForestArea,
    Alert,
    DataGenVillage,
    DataGenForestArea,
    DataGenAlert
);

/// A GeoJSON `Point` feature whose properties are the record's own fields,
/// minus the coordinates that already make up the geometry.
pub fn point_feature<T: Serialize + Located>(item: &T) -> serde_json::Result<Value> {
    let position = item.location();
    let mut properties = match serde_json::to_value(item)? {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    properties.remove("coordinates");

    Ok(json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [position.lng, position.lat],
        },
        "properties": properties,
    }))
}

pub fn feature_collection<'a, T, I>(items: I) -> serde_json::Result<Value>
where
    T: Serialize + Located + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let features = items
        .into_iter()
        .map(point_feature)
        .collect::<serde_json::Result<Vec<_>>>()?;

    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClaimStatus, ClaimType, VillageId};

    #[test]
    fn points_use_lng_lat_order() {
        let village = DataGenVillage {
            id: VillageId(7),
            name: "Kothagudem".to_string(),
            state: "Telangana".to_string(),
            district: "Khammam".to_string(),
            coordinates: Coordinates {
                lat: 17.5512,
                lng: 80.6177,
            },
            claim_type: ClaimType::Cfr,
            land_area: 1450.0,
            status: ClaimStatus::Approved,
            population: 2156,
            forest_cover: 68.0,
            last_updated: "2024-01-14".to_string(),
        };

        let collection = feature_collection([&village]).unwrap();
        assert_eq!(collection["type"], "FeatureCollection");
        let feature = &collection["features"][0];
        assert_eq!(feature["geometry"]["coordinates"], json!([80.6177, 17.5512]));
        assert_eq!(feature["properties"]["name"], "Kothagudem");
        assert_eq!(feature["properties"]["fraType"], "CFR");
        assert!(feature["properties"].get("coordinates").is_none());
    }

    #[test]
    fn empty_collection_is_valid() {
        let none: Vec<&Village> = Vec::new();
        let collection = feature_collection(none).unwrap();
        assert_eq!(collection["features"], json!([]));
    }
}
