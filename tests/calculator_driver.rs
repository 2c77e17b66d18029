//! launch() validates before handing the job to a calculator

use anyhow::{bail, Result};
use oq_config::{launch, CalcId, Calculator, ErrorKind, OqError, OqParam};

#[derive(Default)]
struct Recorder {
    runs: Vec<(CalcId, String, usize)>,
}

impl Calculator for Recorder {
    fn run(&mut self, oq: &OqParam, calc_id: CalcId) -> Result<()> {
        assert!(oq.is_validated());
        self.runs.push((
            calc_id,
            oq.calculation_mode().to_string(),
            oq.imtls().len(),
        ));
        Ok(())
    }
}

struct Failing;

impl Calculator for Failing {
    fn run(&mut self, _oq: &OqParam, _calc_id: CalcId) -> Result<()> {
        bail!("out of memory")
    }
}

fn scenario() -> OqParam {
    OqParam::builder()
        .set("calculation_mode", "scenario")
        .set("gsim", "ToroEtAl2002")
        .set("sites", "0.1 0.2")
        .set("maximum_distance", "200")
        .set("intensity_measure_types", "PGA, SA(0.3)")
        .set("number_of_ground_motion_fields", "10")
        .build()
        .unwrap()
}

#[test]
fn test_launch_validates_then_runs() {
    let mut oq = scenario();
    let mut calc = Recorder::default();
    let calc_id = CalcId::new();

    launch(&mut calc, &mut oq, calc_id).unwrap();

    assert!(oq.is_validated());
    assert_eq!(calc.runs, vec![(calc_id, "scenario".to_string(), 2)]);
}

#[test]
fn test_invalid_job_never_runs() {
    let mut oq = scenario();
    oq.params.number_of_ground_motion_fields = None;
    let mut calc = Recorder::default();

    let err = launch(&mut calc, &mut oq, CalcId::new()).unwrap_err();

    assert!(calc.runs.is_empty());
    let cause = err.downcast_ref::<OqError>().unwrap();
    assert_eq!(cause.kind(), ErrorKind::Value);
    assert!(cause
        .to_string()
        .contains("Missing number_of_ground_motion_fields"));
}

#[test]
fn test_calculator_failure_carries_the_id() {
    let mut oq = scenario();
    let calc_id = CalcId::new();

    let err = launch(&mut Failing, &mut oq, calc_id).unwrap_err();

    assert_eq!(err.to_string(), format!("Calculation {} failed", calc_id));
    assert_eq!(err.root_cause().to_string(), "out of memory");
}

#[test]
fn test_trait_objects_can_be_launched() {
    let mut oq = scenario();
    let mut calcs: Vec<Box<dyn Calculator>> = vec![Box::new(Recorder::default())];
    for calc in calcs.iter_mut() {
        launch(calc.as_mut(), &mut oq, CalcId::new()).unwrap();
    }
}
