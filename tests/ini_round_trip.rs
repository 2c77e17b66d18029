//! to_ini output must load back into an equivalent, still valid job

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use oq_config::loader::builder_from_str;
use oq_config::{Imt, JobIniLoader, OqParam, Reference};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const GSIM_LOGIC_TREE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<nrml xmlns="http://openquake.org/xmlns/nrml/0.5">
    <logicTree logicTreeID="lt1">
        <logicTreeBranchSet uncertaintyType="gmpeModel" branchSetID="bs1"
                applyToTectonicRegionType="Active Shallow Crust">
            <logicTreeBranch branchID="b1">
                <uncertaintyModel>BooreAtkinson2008</uncertaintyModel>
                <uncertaintyWeight>0.6</uncertaintyWeight>
            </logicTreeBranch>
            <logicTreeBranch branchID="b2">
                <uncertaintyModel>ChiouYoungs2008</uncertaintyModel>
                <uncertaintyWeight>0.4</uncertaintyWeight>
            </logicTreeBranch>
        </logicTreeBranchSet>
        <logicTreeBranchSet uncertaintyType="gmpeModel" branchSetID="bs2"
                applyToTectonicRegionType="Stable Continental Crust">
            <logicTreeBranch branchID="b3">
                <uncertaintyModel>ToroEtAl2002</uncertaintyModel>
                <uncertaintyWeight>1.0</uncertaintyWeight>
            </logicTreeBranch>
        </logicTreeBranchSet>
    </logicTree>
</nrml>
"#;

const EVENT_BASED: &str = "\
[general]
description = Event based PSHA with a two region logic tree
calculation_mode = event_based
random_seed = 23

[geometry]
sites = 0.0 0.0, 0.5 0.5,
  1.0 1.0

[logic_tree]
number_of_logic_tree_samples = 0

[erf]
rupture_mesh_spacing = 2.0
width_of_mfd_bin = 0.1
area_source_discretization = 10.0

[site_params]
reference_vs30_type = measured
reference_vs30_value = 760.0
reference_depth_to_2pt5km_per_sec = 5.0
reference_depth_to_1pt0km_per_sec = 100.0

[calculation]
source_model_logic_tree_file = source_model_logic_tree.xml
gsim_logic_tree_file = gsim_logic_tree.xml
investigation_time = 50.0
intensity_measure_types_and_levels = {
    'PGA': [0.005, 0.007, 0.0098, 0.0137],
    'SA(0.1)': [0.005, 0.007, 0.0098]}
truncation_level = 3
maximum_distance = {'Active Shallow Crust': 200, 'default': 100}
ses_per_logic_tree_path = 5
hazard_curves_from_gmfs = true
ground_motion_correlation_model = JB2009

[output]
export_dir = out
mean = true
quantiles = 0.15 0.85
hazard_maps = true
poes = 0.1, 0.02
";

const DISAGGREGATION: &str = "\
[general]
calculation_mode = disaggregation

[geometry]
sites = 15.0 38.0

[calculation]
gsim = SadighEtAl1997
reference_vs30_value = 600
intensity_measure_types_and_levels = {\"PGA\": [0.1, 0.2, 0.4], \"SA(0.5)\": [0.1, 0.2]}
truncation_level = 2.5
maximum_distance = 150

[disaggregation]
poes_disagg = 0.002
mag_bin_width = 0.5
distance_bin_width = 20
num_epsilon_bins = 3
disagg_outputs = Mag_Dist TRT

[export]
export_dir = out
";

const SCENARIO: &str = "\
[general]
calculation_mode = scenario
description = Scenario with a site model

[files]
site_model_file = site_model.csv
exposure_file = exposure.xml

[calculation]
gsim = [AbrahamsonSilva2008]
intensity_measure_types = PGA, SA(0.3)
number_of_ground_motion_fields = 100
maximum_distance = 200
export_dir = out
";

const RELATIVE: &str = "\
[general]
calculation_mode = scenario
description = Scenario read
  from a relative job path

[calculation]
sites = 0.1 0.2
gsim = ToroEtAl2002
intensity_measure_types = PGA
number_of_ground_motion_fields = 5
maximum_distance = 200
reference_vs30_type = None
reference_depth_to_1pt0km_per_sec = None

[files]
site_model_file = site_model.csv
export_dir = out
";

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn round_trip(job: &str) -> (OqParam, OqParam) {
    let tmp = tempfile::tempdir().unwrap();
    round_trip_in(tmp.path(), job)
}

fn round_trip_in(dir: &Path, job: &str) -> (OqParam, OqParam) {
    write(dir, "gsim_logic_tree.xml", GSIM_LOGIC_TREE);
    write(dir, "job.ini", job);

    let oq = JobIniLoader::new(dir.join("job.ini"))
        .load_validated()
        .unwrap();
    reload(dir, &oq)
}

fn reload(dir: &Path, oq: &OqParam) -> (OqParam, OqParam) {
    write(dir, "tmp.ini", &oq.to_ini());
    let again = JobIniLoader::new(dir.join("tmp.ini"))
        .load_validated()
        .unwrap();
    (oq.clone(), again)
}

/// `dir` as seen from the working directory
fn relative_to_cwd(dir: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    dir.strip_prefix(&cwd).unwrap_or(dir).to_path_buf()
}

#[test]
fn test_event_based_round_trip() {
    let (oq, again) = round_trip(EVENT_BASED);
    assert_eq!(oq.gsim_names(), ["BooreAtkinson2008", "ChiouYoungs2008", "ToroEtAl2002"]);
    assert_eq!(oq.tectonic_region_types().len(), 2);
    assert_eq!(oq.params.sites.len(), 3);
    assert_eq!(oq.imtls().names(), vec!["PGA", "SA(0.1)"]);
    assert_eq!(oq, again);
    assert_eq!(oq.to_ini(), again.to_ini());
}

#[test]
fn test_disaggregation_round_trip() {
    let (oq, again) = round_trip(DISAGGREGATION);
    assert_eq!(oq.params.poes, vec![0.002]);
    assert_eq!(oq.params.disagg_outputs, vec!["Mag_Dist", "TRT"]);
    assert_eq!(oq, again);
}

#[test]
fn test_scenario_round_trip() {
    let (oq, again) = round_trip(SCENARIO);
    assert!(oq.inputs.contains("site_model"));
    assert_eq!(oq.gsim_names(), ["AbrahamsonSilva2008"]);
    assert_eq!(oq, again);
}

#[test]
fn test_to_ini_layout() {
    let (oq, _) = round_trip(DISAGGREGATION);
    let ini = oq.to_ini();
    assert!(ini.starts_with("[general]\ncalculation_mode = disaggregation\n"));
    assert!(ini.contains("\npoes_disagg = 0.002\n"));
    assert!(ini.contains("\nmaximum_distance = 150\n"));
    assert!(!ini.contains("job_ini"));
}

#[test]
fn test_relative_job_path_round_trip() {
    let tmp = tempfile::tempdir_in(".").unwrap();
    let jobs = relative_to_cwd(tmp.path()).join("jobs");
    assert!(jobs.is_relative());
    fs::create_dir(&jobs).unwrap();
    write(&jobs, "site_model.csv", "lon,lat,vs30\n0.1,0.2,760\n");

    let (oq, again) = round_trip_in(&jobs, RELATIVE);

    let cwd = std::env::current_dir().unwrap();
    assert_eq!(oq.params.export_dir, cwd.join(&jobs).join("out"));
    assert_eq!(oq.params.description, "Scenario read\nfrom a relative job path");
    assert!(oq.params.reference_vs30_type.is_null());
    assert_eq!(oq.params.reference_depth_to_1pt0km_per_sec, Reference::Null);
    assert_eq!(oq, again);
    assert_eq!(oq.to_ini(), again.to_ini());
}

#[test]
fn test_description_none_round_trip() {
    let job = SCENARIO.replace(
        "description = Scenario with a site model",
        "description = None",
    );
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "site_model.csv", "lon,lat,vs30\n0.1,0.2,760\n");
    let (oq, again) = round_trip_in(tmp.path(), &job);
    assert_eq!(oq.params.description, "");
    assert_eq!(oq, again);
}

#[test]
fn test_risk_imts_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let (mut oq, _) = round_trip_in(tmp.path(), DISAGGREGATION);
    let risk = BTreeMap::from([(Imt::sa(1.0).unwrap(), vec![0.1, 0.2])]);
    oq.set_risk_imts(&risk).unwrap();

    let (oq, again) = reload(tmp.path(), &oq);
    assert_eq!(again.imtls().names(), vec!["PGA", "SA(0.5)", "SA(1.0)"]);
    assert_eq!(oq, again);
}

fn description() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z]{1,8}( [A-Za-z]{1,8}){0,3}", 1..4)
        .prop_map(|lines| lines.join("\n"))
}

fn sites() -> impl Strategy<Value = String> {
    prop::collection::vec((-180.0f64..180.0, -90.0f64..90.0), 1..4).prop_map(|points| {
        points
            .iter()
            .map(|(lon, lat)| format!("{} {}", lon, lat))
            .collect::<Vec<_>>()
            .join(", ")
    })
}

fn imts() -> impl Strategy<Value = String> {
    prop::sample::subsequence(vec!["PGA", "SA(0.1)", "SA(0.3)", "SA(1.0)"], 1..=4)
        .prop_map(|imts| imts.join(", "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scenario_jobs_survive_to_ini(
        description in description(),
        sites in sites(),
        imts in imts(),
        gmfs in 1u64..1000,
        distance in 1.0f64..500.0,
        truncation in 0.0f64..5.0,
        seed in 0u64..u64::from(u32::MAX),
    ) {
        let tmp = tempfile::tempdir().unwrap();
        let mut oq = OqParam::builder()
            .set("calculation_mode", "scenario")
            .set("description", description)
            .set("sites", sites)
            .set("gsim", "ToroEtAl2002")
            .set("intensity_measure_types", imts)
            .set("number_of_ground_motion_fields", gmfs.to_string())
            .set("maximum_distance", distance.to_string())
            .set("truncation_level", truncation.to_string())
            .set("random_seed", seed.to_string())
            .set("export_dir", tmp.path().display().to_string())
            .build()
            .unwrap();
        oq.validate().unwrap();

        let mut again = builder_from_str(&oq.to_ini(), tmp.path())
            .unwrap()
            .build()
            .unwrap();
        again.validate().unwrap();
        prop_assert_eq!(oq, again);
    }
}
