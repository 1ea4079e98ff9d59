//! Tests d'intégration sur un jeu de fichiers miniature

use std::path::Path;

use countydata::{
    prepare, write_aggregate, CountyDataError, InputPaths, PrepareOptions, SitePolicy,
};
use serde_json::Value;

const STATES: &str = "STATE,STUSAB,STATE_NAME,STATENS\n\
1,AL,Alabama,01779775\n\
6,CA,California,01779778\n\
25,MA,Massachusetts,00606926\n\
56,WY,Wyoming,01779807\n";

const COUNTY_VARS: &str = "State,County_FIPS,County_Income2012,Energy_expenditure,Total_damages_pct\n\
CA,6001,54321.0,1234.5,2.5\n\
CA,6075,70000,,1.1\n\
AL,1001,38000,900.25,7.75\n\
AL,1001,1,1,1\n";

const SUNLIGHT: &str = "County_FIPS,Avg_Daily_Sunlight_kJ\n\
6001,17150.42\n\
1001,16800.5\n\
oops,1\n";

const CITIES: &str = "city,city_ascii,state_id,state_name,lat,lng,population,density\n\
Oakland,Oakland,CA,California,37.7904,-122.2166,419267,3070.5\n\
Springfield,Springfield,IL,Illinois,39.7710,-89.6537,165523,1010.2\n\
Boston,Boston,MA,Massachusetts,42.3188,-71.0852,4688346,5532.5\n";

fn counties_json() -> Vec<u8> {
    let mut json = br#"{"type":"FeatureCollection","features":[
{"type":"Feature","properties":{"GEO_ID":"0500000US06001","STATE":"06","COUNTY":"001","NAME":"Alameda","LSAD":"County","CENSUSAREA":739.017},"geometry":{"type":"Polygon","coordinates":[[[-122.3,37.9],[-121.5,37.9],[-121.5,37.5],[-122.3,37.9]]]}},
{"type":"Feature","properties":{"GEO_ID":"0500000US06075","STATE":"06","COUNTY":"075","NAME":"San Francisco","LSAD":"County","CENSUSAREA":46.873},"geometry":null},
{"type":"Feature","properties":{"GEO_ID":"0500000US25025","STATE":"25","COUNTY":"025","NAME":"Suffolk","LSAD":"County","CENSUSAREA":58.15},"geometry":null},
{"type":"Feature","properties":{"GEO_ID":"0500000US01001","STATE":"01","COUNTY":"001","NAME":"Autauga","LSAD":"County","CENSUSAREA":594.436},"geometry":null},
{"type":"Feature","properties":{"GEO_ID":"0500000US35013","STATE":"01","COUNTY":"013","NAME":"Do"#
        .to_vec();
    json.push(0xF1); // ñ en Latin-1
    json.extend_from_slice(br#"a Ana","LSAD":"County","CENSUSAREA":3807.0},"geometry":null}
]}"#);
    json
}

fn sites_csv() -> Vec<u8> {
    let mut csv = b"Project,City,State,Size_kW,Utility\n\
Sunny Acres,Oakland,CA,250,PG&E\n\
Pioneer Valley,Springfield,MA,500,Eversource\n\
Harbor Solar,Boston,MA,1200,Eversource\n\
Missing Utility,Boston,MA,300,\n\
Nowhere,Atlantis,ZZ,10,None Co\n\
Caf"
        .to_vec();
    csv.push(0xE9); // é en Latin-1
    csv.extend_from_slice(b" Solaire,Oakland,CA,75,PG&E\n");
    csv
}

fn write_fixtures(dir: &Path) -> InputPaths {
    let inputs = InputPaths::in_dir(dir);
    std::fs::write(&inputs.states, STATES).unwrap();
    std::fs::write(&inputs.county_stats, COUNTY_VARS).unwrap();
    std::fs::write(&inputs.sunlight, SUNLIGHT).unwrap();
    std::fs::write(&inputs.cities, CITIES).unwrap();
    std::fs::write(&inputs.boundaries, counties_json()).unwrap();
    std::fs::write(&inputs.sites, sites_csv()).unwrap();
    inputs
}

fn run(dir: &Path, options: PrepareOptions) -> Value {
    let inputs = write_fixtures(dir);
    let result = prepare(&inputs, &options).unwrap();
    let output = dir.join("details_by_state.json");
    write_aggregate(&result.aggregate, &output).unwrap();
    serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap()
}

fn counties<'a>(json: &'a Value, state: &str) -> &'a Vec<Value> {
    json[state][0].as_array().unwrap()
}

fn sites<'a>(json: &'a Value, state: &str) -> &'a Vec<Value> {
    json[state][1].as_array().unwrap()
}

#[test]
fn test_every_reference_state_has_an_entry() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(dir.path(), PrepareOptions::default());

    let object = json.as_object().unwrap();
    let names: Vec<_> = object.keys().map(String::as_str).collect();
    assert_eq!(names, ["Alabama", "California", "Massachusetts", "Wyoming"]);

    assert!(counties(&json, "Wyoming").is_empty());
    assert!(sites(&json, "Wyoming").is_empty());
    for (_, entry) in object {
        assert_eq!(entry.as_array().unwrap().len(), 2);
    }
}

#[test]
fn test_alameda_is_enriched() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(dir.path(), PrepareOptions::default());

    let alameda = &counties(&json, "California")[0];
    let properties = &alameda["properties"];
    assert_eq!(properties["COUNTY"], "06001");
    assert_eq!(properties["STATE"], "California");
    assert_eq!(properties["NAME"], "Alameda");
    assert_eq!(properties["County_Income2012"], 54321.0);
    assert_eq!(properties["Energy_expenditure"], 1234.5);
    assert_eq!(properties["Total_damages_pct"], 2.5);
    assert_eq!(properties["Avg_Daily_Sunlight_kJ"], 17150.42);
    assert_eq!(alameda["geometry"]["type"], "Polygon");
}

#[test]
fn test_county_keys_are_five_digits() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(dir.path(), PrepareOptions::default());

    for (_, entry) in json.as_object().unwrap() {
        for county in entry[0].as_array().unwrap() {
            let code = county["properties"]["COUNTY"].as_str().unwrap();
            assert_eq!(code.len(), 5);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}

#[test]
fn test_missing_values_use_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(dir.path(), PrepareOptions::default());

    // San Francisco: pas d'ensoleillement, dépense énergétique vide
    let sf = &counties(&json, "California")[1]["properties"];
    assert_eq!(sf["Avg_Daily_Sunlight_kJ"], -1.0);
    assert_eq!(sf["Energy_expenditure"], -1.0);

    for (_, entry) in json.as_object().unwrap() {
        for county in entry[0].as_array().unwrap() {
            let sun = &county["properties"]["Avg_Daily_Sunlight_kJ"];
            assert!(sun.is_null() || sun.is_f64(), "unexpected value {sun}");
        }
    }

    // Suffolk: aucune statistique, pas d'enrichissement
    let suffolk = &counties(&json, "Massachusetts")[0]["properties"];
    assert!(suffolk.get("County_Income2012").is_none());
}

#[test]
fn test_first_statistics_row_wins() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(dir.path(), PrepareOptions::default());

    let autauga = &counties(&json, "Alabama")[0]["properties"];
    assert_eq!(autauga["County_Income2012"], 38000.0);
    assert_eq!(autauga["Avg_Daily_Sunlight_kJ"], 16800.5);
}

#[test]
fn test_latin1_inputs_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(dir.path(), PrepareOptions::default());

    let dona_ana = &counties(&json, "Alabama")[1]["properties"];
    assert_eq!(dona_ana["NAME"], "Doña Ana");

    let projects: Vec<_> = sites(&json, "California")
        .iter()
        .map(|s| s["Project"].as_str().unwrap())
        .collect();
    assert_eq!(projects, ["Sunny Acres", "Café Solaire"]);
}

#[test]
fn test_springfield_ma_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(dir.path(), PrepareOptions::default());

    let ma_sites = sites(&json, "Massachusetts");
    assert!(ma_sites.iter().all(|s| s["City"] != "Springfield"));
    assert_eq!(ma_sites.len(), 1);
    assert_eq!(ma_sites[0]["City"], "Boston");
    assert_eq!(ma_sites[0]["State"], "Massachusetts");
}

#[test]
fn test_sites_carry_city_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(dir.path(), PrepareOptions::default());

    for (_, entry) in json.as_object().unwrap() {
        for site in entry[1].as_array().unwrap() {
            assert!(site["Latitude"].is_number());
            assert!(site["Longitude"].is_number());
        }
    }

    let boston = &sites(&json, "Massachusetts")[0];
    assert_eq!(boston["city_population"], 4688346);
    assert_eq!(boston["city_density"], 5532.5);
    assert_eq!(boston["Size_kW"], 1200);
}

#[test]
fn test_keep_incomplete_sites() {
    let dir = tempfile::tempdir().unwrap();
    let json = run(
        dir.path(),
        PrepareOptions {
            site_policy: SitePolicy::KeepIncomplete,
        },
    );

    let ma_sites = sites(&json, "Massachusetts");
    assert_eq!(ma_sites.len(), 2);
    assert!(ma_sites[1]["Utility"].is_null());
}

#[test]
fn test_diagnostics_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_fixtures(dir.path());
    let result = prepare(&inputs, &PrepareOptions::default()).unwrap();

    // "oops" dans l'ensoleillement, "ZZ" dans les sites
    assert_eq!(result.diagnostics.len(), 2);
    assert!(result.diagnostics.iter().all(|d| d.is_recoverable()));

    assert_eq!(result.stats.counties_enriched, 3);
    assert_eq!(result.stats.counties_without_stats, 2);
    assert_eq!(result.stats.sites_kept, 3);
    assert_eq!(result.stats.sites_unmatched, 1);
    assert_eq!(result.stats.sites_incomplete, 1);
}

#[test]
fn test_output_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_fixtures(dir.path());

    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    let result = prepare(&inputs, &PrepareOptions::default()).unwrap();
    write_aggregate(&result.aggregate, &first).unwrap();
    let result = prepare(&inputs, &PrepareOptions::default()).unwrap();
    write_aggregate(&result.aggregate, &second).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_missing_input_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_fixtures(dir.path());
    std::fs::remove_file(&inputs.cities).unwrap();

    let err = prepare(&inputs, &PrepareOptions::default()).unwrap_err();
    assert!(matches!(err, CountyDataError::MissingInputFile(ref p) if p == &inputs.cities));
}

#[test]
fn test_unknown_county_state_code_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_fixtures(dir.path());
    std::fs::write(
        &inputs.boundaries,
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"STATE":"72","COUNTY":"001"},"geometry":null}]}"#,
    )
    .unwrap();

    let err = prepare(&inputs, &PrepareOptions::default()).unwrap_err();
    assert!(matches!(err, CountyDataError::UnknownStateKey { .. }));
}
