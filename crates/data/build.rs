use std::{
    collections::HashSet,
    fs::File,
    io::{Read, Write},
    path::PathBuf,
};

use anyhow::{Context, bail};
use fra_portal::{
    AlertId, Coordinates, DataGenAlert, DataGenForestArea, DataGenModel, DataGenRecommendation,
    DataGenState, DataGenStatistics, DataGenVillage, ForestAreaId, VillageId,
};
use lazy_static::lazy_static;
use proc_macro2::{Ident, Literal, Span, TokenStream};
use quote::{TokenStreamExt, quote};
use regex::Regex;

lazy_static! {
    static ref RE_DENIED_IDENT_CHARS: Regex = Regex::new("[^0-9A-Za-z_]").unwrap();
}

fn clean_ident_name(source: &str) -> String {
    let mut clean: String = RE_DENIED_IDENT_CHARS.replace_all(source, "_").to_string();
    while clean.contains("__") {
        clean = clean.replace("__", "_")
    }
    clean.trim_matches('_').to_string()
}

fn const_ident(name: &str) -> Ident {
    Ident::new(&clean_ident_name(&name.to_uppercase()), Span::call_site())
}

fn village_const_name(village: &DataGenVillage) -> Ident {
    const_ident(&village.name)
}

fn forest_const_name(forest: &DataGenForestArea) -> Ident {
    const_ident(&forest.name)
}

fn alert_const_name(alert: &DataGenAlert) -> Ident {
    const_ident(&format!("ALERT_{}", alert.id.0))
}

/// `::fra_portal::<Enum>::<Variant>` for any of the model's tag enums.
fn gen_tag<T: std::fmt::Debug>(enum_name: &str, value: T) -> TokenStream {
    let enum_ident = Ident::new(enum_name, Span::call_site());
    let variant = Ident::new(&format!("{:?}", value), Span::call_site());
    quote! { ::fra_portal::#enum_ident::#variant }
}

fn gen_coordinates(c: Coordinates) -> TokenStream {
    let lat = Literal::f64_unsuffixed(c.lat);
    let lng = Literal::f64_unsuffixed(c.lng);
    quote! { ::fra_portal::Coordinates { lat: #lat, lng: #lng } }
}

fn gen_str_slice(items: &[String]) -> TokenStream {
    let lits = items.iter().map(|s| Literal::string(s));
    quote! { &[#(#lits),*] }
}

fn gen_opt_str(value: &Option<String>) -> TokenStream {
    match value {
        Some(s) => {
            let lit = Literal::string(s);
            quote! { Some(#lit) }
        }
        None => quote! { None },
    }
}

fn gen_village(village: &DataGenVillage) -> TokenStream {
    let ident = village_const_name(village);
    let VillageId(id) = village.id;
    let id = Literal::u32_unsuffixed(id);
    let name = Literal::string(&village.name);
    let state = Literal::string(&village.state);
    let district = Literal::string(&village.district);
    let coordinates = gen_coordinates(village.coordinates);
    let claim_type = gen_tag("ClaimType", village.claim_type);
    let land_area = Literal::f64_unsuffixed(village.land_area);
    let status = gen_tag("ClaimStatus", village.status);
    let population = Literal::u32_unsuffixed(village.population);
    let forest_cover = Literal::f64_unsuffixed(village.forest_cover);
    let last_updated = Literal::string(&village.last_updated);

    quote! {
        pub const #ident: ::fra_portal::StaticVillage = ::fra_portal::StaticVillage {
            id: ::fra_portal::VillageId(#id),
            name: #name,
            state: #state,
            district: #district,
            coordinates: #coordinates,
            claim_type: #claim_type,
            land_area: #land_area,
            status: #status,
            population: #population,
            forest_cover: #forest_cover,
            last_updated: #last_updated,
        };
    }
}

fn gen_forest_area(forest: &DataGenForestArea) -> TokenStream {
    let ident = forest_const_name(forest);
    let ForestAreaId(id) = forest.id;
    let id = Literal::u32_unsuffixed(id);
    let name = Literal::string(&forest.name);
    let kind = gen_tag("ForestKind", forest.kind);
    let state = Literal::string(&forest.state);
    let district = Literal::string(&forest.district);
    let coordinates = gen_coordinates(forest.coordinates);
    let area = Literal::f64_unsuffixed(forest.area);
    let forest_cover = Literal::f64_unsuffixed(forest.forest_cover);
    let biodiversity = gen_tag("Biodiversity", forest.biodiversity);
    let protection_status = gen_tag("ProtectionStatus", forest.protection_status);
    let established_year = Literal::u16_unsuffixed(forest.established_year);
    let description = Literal::string(&forest.description);
    let threats = gen_str_slice(&forest.threats);
    let conservation_measures = gen_str_slice(&forest.conservation_measures);
    let last_survey = Literal::string(&forest.last_survey);
    let is_active = forest.is_active;

    quote! {
        pub const #ident: ::fra_portal::StaticForestArea = ::fra_portal::StaticForestArea {
            id: ::fra_portal::ForestAreaId(#id),
            name: #name,
            kind: #kind,
            state: #state,
            district: #district,
            coordinates: #coordinates,
            area: #area,
            forest_cover: #forest_cover,
            biodiversity: #biodiversity,
            protection_status: #protection_status,
            established_year: #established_year,
            description: #description,
            threats: #threats,
            conservation_measures: #conservation_measures,
            last_survey: #last_survey,
            is_active: #is_active,
        };
    }
}

fn gen_alert(alert: &DataGenAlert) -> TokenStream {
    let ident = alert_const_name(alert);
    let AlertId(id) = alert.id;
    let id = Literal::u64_unsuffixed(id);
    let title = Literal::string(&alert.title);
    let message = Literal::string(&alert.message);
    let kind = gen_tag("AlertKind", alert.kind);
    let priority = gen_tag("Priority", alert.priority);
    let coordinates = gen_coordinates(alert.coordinates);
    let village = gen_opt_str(&alert.village);
    let state = Literal::string(&alert.state);
    let district = Literal::string(&alert.district);
    let created_by = Literal::string(&alert.created_by);
    let created_at = Literal::string(&alert.created_at);
    let expires_at = gen_opt_str(&alert.expires_at);
    let is_active = alert.is_active;
    let target_audience = gen_tag("TargetAudience", alert.target_audience);
    let attachments = gen_str_slice(&alert.attachments);

    quote! {
        pub const #ident: ::fra_portal::StaticAlert = ::fra_portal::StaticAlert {
            id: ::fra_portal::AlertId(#id),
            title: #title,
            message: #message,
            kind: #kind,
            priority: #priority,
            coordinates: #coordinates,
            village: #village,
            state: #state,
            district: #district,
            created_by: #created_by,
            created_at: #created_at,
            expires_at: #expires_at,
            is_active: #is_active,
            target_audience: #target_audience,
            attachments: #attachments,
        };
    }
}

/// A module of named constants plus an `ALL` slice referencing them in
/// model order.
fn gen_record_mod<T>(
    mod_name: &str,
    type_name: &str,
    records: &[T],
    const_name: impl Fn(&T) -> Ident,
    gen_record: impl Fn(&T) -> TokenStream,
) -> anyhow::Result<TokenStream> {
    let mut seen = HashSet::new();
    for record in records {
        let ident = const_name(record).to_string();
        if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
            bail!("Cannot derive a constant name for a {} record", mod_name);
        }
        if !seen.insert(ident.clone()) {
            bail!("Two {} records map to the same constant name {}", mod_name, ident);
        }
    }

    let mod_ident = Ident::new(mod_name, Span::call_site());
    let type_ident = Ident::new(type_name, Span::call_site());
    let all_refs = records.iter().map(|record| {
        let ident = const_name(record);
        quote! { &#ident }
    });
    let all_records = records.iter().map(gen_record);

    Ok(quote! {
        pub mod #mod_ident {
            #(#all_records)*
            pub const ALL: &[&::fra_portal::#type_ident] = &[
                #(#all_refs),*
            ];
        }
    })
}

fn gen_states(states: &[DataGenState]) -> TokenStream {
    let states = states.iter().map(|state| {
        let name = Literal::string(&state.name);
        let districts = gen_str_slice(&state.districts);
        quote! {
            ::fra_portal::StaticState { name: #name, districts: #districts }
        }
    });

    quote! {
        pub const STATES: &[::fra_portal::StaticState] = &[#(#states),*];
    }
}

fn gen_statistics(stats: &DataGenStatistics) -> TokenStream {
    let total_villages = Literal::u32_unsuffixed(stats.total_villages);
    let approved = Literal::u32_unsuffixed(stats.approved_claims);
    let pending = Literal::u32_unsuffixed(stats.pending_claims);
    let rejected = Literal::u32_unsuffixed(stats.rejected_claims);
    let land_area = Literal::f64_unsuffixed(stats.total_land_area);
    let forest_cover = Literal::f64_unsuffixed(stats.forest_cover_percent);
    let growth = stats.monthly_growth.iter().map(|month| {
        let name = Literal::string(&month.month);
        let approved = Literal::u32_unsuffixed(month.approved);
        let pending = Literal::u32_unsuffixed(month.pending);
        let rejected = Literal::u32_unsuffixed(month.rejected);
        quote! {
            ::fra_portal::StaticMonthlyGrowth {
                month: #name,
                approved: #approved,
                pending: #pending,
                rejected: #rejected,
            }
        }
    });

    quote! {
        pub const STATISTICS: ::fra_portal::StaticStatistics = ::fra_portal::StaticStatistics {
            total_villages: #total_villages,
            approved_claims: #approved,
            pending_claims: #pending,
            rejected_claims: #rejected,
            total_land_area: #land_area,
            forest_cover_percent: #forest_cover,
            monthly_growth: &[#(#growth),*],
        };
    }
}

fn gen_recommendations(recs: &[DataGenRecommendation]) -> TokenStream {
    let recs = recs.iter().map(|rec| {
        let id = Literal::u32_unsuffixed(rec.id);
        let title = Literal::string(&rec.title);
        let description = Literal::string(&rec.description);
        let priority = gen_tag("Priority", rec.priority);
        let villages = Literal::u32_unsuffixed(rec.villages);
        let impact = Literal::string(&rec.estimated_impact);
        quote! {
            ::fra_portal::StaticRecommendation {
                id: #id,
                title: #title,
                description: #description,
                priority: #priority,
                villages: #villages,
                estimated_impact: #impact,
            }
        }
    });

    quote! {
        pub const RECOMMENDATIONS: &[::fra_portal::StaticRecommendation] = &[#(#recs),*];
    }
}

const MODEL_PATH: &str = "../../data/model.json";

fn main() -> anyhow::Result<()> {
    println!("cargo::rerun-if-changed={}", MODEL_PATH);
    let mut model_contents = String::new();
    File::open(MODEL_PATH)
        .with_context(|| {
            format!(
                "Couldn't open model file at {}. Run `fra-portal-datagen check` against it.",
                MODEL_PATH
            )
        })?
        .read_to_string(&mut model_contents)?;
    let model: DataGenModel =
        serde_json::from_str(&model_contents).context("Parsing data model")?;

    let mut tokens = TokenStream::new();
    tokens.append_all(gen_record_mod(
        "villages",
        "StaticVillage",
        &model.villages,
        village_const_name,
        gen_village,
    )?);
    tokens.append_all(gen_record_mod(
        "forest_areas",
        "StaticForestArea",
        &model.forest_areas,
        forest_const_name,
        gen_forest_area,
    )?);
    tokens.append_all(gen_record_mod(
        "alerts",
        "StaticAlert",
        &model.alerts,
        alert_const_name,
        gen_alert,
    )?);
    tokens.append_all(gen_states(&model.states));
    tokens.append_all(gen_statistics(&model.statistics));
    tokens.append_all(gen_recommendations(&model.recommendations));

    let out_path = PathBuf::from(std::env::var("OUT_DIR")?).join("gen.rs");
    File::create(out_path)?.write_all(tokens.to_string().as_bytes())?;
    Ok(())
}
