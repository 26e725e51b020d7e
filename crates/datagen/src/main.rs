use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use fra_portal::{Coordinates, DataGenModel, feature_collection};
use log::{LevelFilter, info, warn};
use tokio::{fs, io::AsyncWriteExt};

#[derive(Parser)]
#[command(about = "Checks the portal's static data model and exports its map layers")]
struct Cli {
    /// Path to the data model.
    #[arg(long, default_value = "data/model.json")]
    model: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reports inconsistencies in the model. Fails on errors, not on warnings.
    Check,
    /// Writes villages, forest areas and alerts as GeoJSON files.
    Export {
        #[arg(long, default_value = "geojson")]
        out: PathBuf,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Finding {
    Error(String),
    Warning(String),
}

fn check_coordinates(findings: &mut Vec<Finding>, what: &str, c: Coordinates) {
    if !c.is_valid() {
        findings.push(Finding::Error(format!(
            "{} has out-of-range coordinates ({}, {})",
            what, c.lat, c.lng
        )));
    }
}

fn check_percent(findings: &mut Vec<Finding>, what: &str, value: f64) {
    if !(0.0..=100.0).contains(&value) {
        findings.push(Finding::Error(format!(
            "{} has forest cover {} outside 0-100",
            what, value
        )));
    }
}

fn check_place(findings: &mut Vec<Finding>, model: &DataGenModel, what: &str, state: &str, district: &str) {
    match model.states.iter().find(|s| s.name == state) {
        None => findings.push(Finding::Error(format!("{} is in unknown state {}", what, state))),
        Some(s) if !s.districts.iter().any(|d| d == district) => findings.push(Finding::Warning(
            format!("{} is in district {} which {} does not list", what, district, state),
        )),
        Some(_) => {}
    }
}

fn check_unique<T: std::hash::Hash + Eq + std::fmt::Debug>(
    findings: &mut Vec<Finding>,
    kind: &str,
    ids: impl IntoIterator<Item = T>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if seen.contains(&id) {
            findings.push(Finding::Error(format!("Duplicate {} id {:?}", kind, id)));
        } else {
            seen.insert(id);
        }
    }
}

fn check_model(model: &DataGenModel) -> Vec<Finding> {
    let mut findings = Vec::new();

    check_unique(&mut findings, "village", model.villages.iter().map(|v| v.id));
    check_unique(&mut findings, "forest area", model.forest_areas.iter().map(|f| f.id));
    check_unique(&mut findings, "alert", model.alerts.iter().map(|a| a.id));
    check_unique(&mut findings, "state", model.states.iter().map(|s| s.name.as_str()));

    for v in &model.villages {
        let what = format!("Village {}", v.name);
        check_coordinates(&mut findings, &what, v.coordinates);
        check_percent(&mut findings, &what, v.forest_cover);
        check_place(&mut findings, model, &what, &v.state, &v.district);
    }

    for f in &model.forest_areas {
        let what = format!("Forest area {}", f.name);
        check_coordinates(&mut findings, &what, f.coordinates);
        check_percent(&mut findings, &what, f.forest_cover);
        check_place(&mut findings, model, &what, &f.state, &f.district);
    }

    for a in &model.alerts {
        let what = format!("Alert {}", a.id.0);
        check_coordinates(&mut findings, &what, a.coordinates);
        check_place(&mut findings, model, &what, &a.state, &a.district);

        let created = DateTime::parse_from_rfc3339(&a.created_at);
        if created.is_err() {
            findings.push(Finding::Error(format!(
                "{} has a malformed createdAt {:?}",
                what, a.created_at
            )));
        }
        if let Some(expires_raw) = &a.expires_at {
            match (created, DateTime::parse_from_rfc3339(expires_raw)) {
                (_, Err(_)) => findings.push(Finding::Error(format!(
                    "{} has a malformed expiresAt {:?}",
                    what, expires_raw
                ))),
                (Ok(created), Ok(expires)) if expires <= created => findings.push(
                    Finding::Warning(format!("{} expires before it was created", what)),
                ),
                _ => {}
            }
        }
    }

    let stats = &model.statistics;
    if stats.approved_claims + stats.pending_claims + stats.rejected_claims > stats.total_villages {
        findings.push(Finding::Warning(
            "Statistics count more claims than villages".to_string(),
        ));
    }

    findings
}

async fn load_model(path: &Path) -> anyhow::Result<DataGenModel> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading model file {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Parsing {}", path.display()))
}

async fn write_layer(dir: &Path, name: &str, layer: serde_json::Value) -> anyhow::Result<()> {
    let path = dir.join(format!("{}.geojson", name));
    let contents = serde_json::to_string_pretty(&layer)?;
    fs::File::create(&path)
        .await
        .with_context(|| format!("Creating {}", path.display()))?
        .write_all(contents.as_bytes())
        .await?;
    info!("Wrote {}", path.display());
    Ok(())
}

async fn export(model: &DataGenModel, out: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(out)
        .await
        .with_context(|| format!("Creating output directory {}", out.display()))?;
    write_layer(out, "villages", feature_collection(&model.villages)?).await?;
    write_layer(out, "forest-areas", feature_collection(&model.forest_areas)?).await?;
    write_layer(
        out,
        "alerts",
        feature_collection(model.alerts.iter().filter(|a| a.is_active))?,
    )
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    let cli = Cli::parse();

    info!("Loading model from {}", cli.model.display());
    let model = load_model(&cli.model).await?;

    let findings = check_model(&model);
    let mut errors = 0;
    for finding in &findings {
        match finding {
            Finding::Error(msg) => {
                errors += 1;
                log::error!("{}", msg);
            }
            Finding::Warning(msg) => warn!("{}", msg),
        }
    }
    if errors > 0 {
        bail!("Model has {} error(s)", errors);
    }

    match cli.command {
        Command::Check => {
            info!(
                "Model OK: {} villages, {} forest areas, {} alerts, {} warning(s)",
                model.villages.len(),
                model.forest_areas.len(),
                model.alerts.len(),
                findings.len()
            );
        }
        Command::Export { out } => export(&model, &out).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DataGenModel {
        serde_json::from_value(serde_json::json!({
            "villages": [{
                "id": 1, "name": "Kumhargaon", "state": "Madhya Pradesh", "district": "Mandla",
                "coordinates": {"lat": 22.5957, "lng": 80.3689}, "fraType": "CFR",
                "landArea": 1250.0, "status": "Approved", "population": 2847,
                "forestCover": 78.0, "lastUpdated": "2024-01-15"
            }],
            "forestAreas": [],
            "alerts": [{
                "id": 4, "title": "Rain", "message": "Heavy rain", "type": "warning",
                "priority": "high", "coordinates": {"lat": 19.1663, "lng": 83.4156},
                "village": "Jhirnia", "state": "Odisha", "district": "Rayagada",
                "createdBy": "IMD", "createdAt": "2024-01-22T08:00:00Z",
                "expiresAt": "2024-01-25T20:00:00Z", "isActive": true, "targetAudience": "all"
            }],
            "states": [
                {"name": "Madhya Pradesh", "districts": ["Mandla"]},
                {"name": "Odisha", "districts": ["Rayagada"]}
            ],
            "statistics": {
                "totalVillages": 10, "approvedClaims": 5, "pendingClaims": 3, "rejectedClaims": 2,
                "totalLandArea": 100.0, "forestCoverPercent": 60.0, "monthlyGrowth": []
            },
            "recommendations": []
        }))
        .unwrap()
    }

    #[test]
    fn clean_model_has_no_findings() {
        assert!(check_model(&model()).is_empty());
    }

    #[test]
    fn reports_duplicates_and_bad_values() {
        let mut model = model();
        let mut twin = model.villages[0].clone();
        twin.coordinates.lat = 120.0;
        twin.district = "Dindori".to_string();
        model.villages.push(twin);
        model.alerts[0].expires_at = Some("next week".to_string());

        let findings = check_model(&model);
        assert!(findings.contains(&Finding::Error("Duplicate village id VillageId(1)".to_string())));
        assert!(findings.iter().any(|f| matches!(f, Finding::Error(m) if m.contains("out-of-range"))));
        assert!(findings.iter().any(|f| matches!(f, Finding::Warning(m) if m.contains("Dindori"))));
        assert!(findings.iter().any(|f| matches!(f, Finding::Error(m) if m.contains("expiresAt"))));
    }

    #[tokio::test]
    async fn export_writes_three_layers() {
        let dir = std::env::temp_dir().join(format!("fra-portal-datagen-{}", std::process::id()));
        export(&model(), &dir).await.unwrap();

        let villages: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("villages.geojson")).await.unwrap()).unwrap();
        assert_eq!(villages["features"][0]["properties"]["name"], "Kumhargaon");
        assert!(dir.join("forest-areas.geojson").exists());
        assert!(dir.join("alerts.geojson").exists());
        fs::remove_dir_all(&dir).await.unwrap();
    }
}
