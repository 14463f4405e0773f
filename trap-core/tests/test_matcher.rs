use trap_core::matcher::match_config;
use trap_core::types::*;

fn row(p_min: f64, p_max: f64, k1: u32) -> ConfigRow {
    ConfigRow {
        trap_type: TrapType::Bimetallic,
        mount_type: MountType::PressureBearingScrew,
        hardware_version: HardwareVersion::Msba10,
        p_min,
        p_max,
        condensate_load: CondensateLoad::Low,
        k1,
        k2: 20,
        k3: 20,
        k4: 30,
        k5: 40,
        k6: 50,
        k7: 60,
        k8: 70,
        k9: None,
        k10: None,
    }
}

fn input(inlet: f64, outlet: f64) -> InputRecord {
    InputRecord {
        server: None,
        group: None,
        dev_eui: Some("0011223344556677".into()),
        trap_type: TrapType::Bimetallic,
        mount_type: MountType::PressureBearingScrew,
        trap_inlet_pressure: inlet,
        trap_outlet_pressure: outlet,
        hardware_version: HardwareVersion::Msba10,
        condensate_load: CondensateLoad::Low,
        sample_period: None,
        warn_cnt_th_def: None,
        err_cnt_th_def: None,
        err_cnt_th_rst_def: None,
        counter_reset: None,
        request_config: None,
        piezo_cal_fac_sensor: None,
        piezo_cal_off_sensor: None,
        piezo_cal_fac_amp: None,
        piezo_cal_off_amp: None,
        piezo_cal_fac_mount: None,
        piezo_cal_off_mount: None,
        pt100_cal_0c: None,
        pt100_cal_250c: None,
        pt100_cal_fac_sensor: None,
        pt100_cal_off_sensor: None,
        pt100_cal_fac_amp: None,
        pt100_cal_off_amp: None,
        pt100_cal_fac_mount: None,
        pt100_cal_off_mount: None,
    }
}

#[test]
fn single_matching_row_is_found() {
    let table = [row(0.0, 10.0, 1)];
    let matched = match_config(&input(10.0, 2.0), &table);
    assert_eq!(matched, Some(&table[0]));
}

#[test]
fn last_matching_row_wins() {
    // both rows cover delta = 8; the later row overrides
    let table = [row(0.0, 10.0, 1), row(5.0, 12.0, 2)];
    let matched = match_config(&input(10.0, 2.0), &table).unwrap();
    assert_eq!(matched.k1, 2);
}

#[test]
fn pressure_range_is_inclusive_on_both_ends() {
    let table = [row(2.0, 8.0, 1)];
    assert!(match_config(&input(10.0, 2.0), &table).is_some()); // delta == p_max
    assert!(match_config(&input(4.0, 2.0), &table).is_some()); // delta == p_min
    assert!(match_config(&input(12.0, 2.0), &table).is_none()); // delta above
    assert!(match_config(&input(3.0, 2.0), &table).is_none()); // delta below
}

#[test]
fn no_row_matches_returns_none() {
    let table = [row(0.0, 10.0, 1)];
    let mut record = input(10.0, 2.0);
    record.trap_type = TrapType::BallFloat;
    assert_eq!(match_config(&record, &table), None);
}

#[test]
fn every_categorical_field_must_match() {
    let table = [row(0.0, 10.0, 1)];

    let mut record = input(10.0, 2.0);
    record.mount_type = MountType::RetroFitClamp;
    assert!(match_config(&record, &table).is_none());

    let mut record = input(10.0, 2.0);
    record.hardware_version = HardwareVersion::Msba12;
    assert!(match_config(&record, &table).is_none());

    let mut record = input(10.0, 2.0);
    record.condensate_load = CondensateLoad::High;
    assert!(match_config(&record, &table).is_none());
}
