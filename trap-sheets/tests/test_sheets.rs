use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::Path;
use trap_core::types::*;
use trap_sheets::{load_config_table, load_input, load_pt_map, SheetError};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../test-fixtures/sheets")
        .join(name)
}

#[test]
fn config_table_rows_and_optional_coefficients() {
    let table = load_config_table(&fixture("ConfigTable.csv")).unwrap();
    assert_eq!(table.len(), 3);

    assert_eq!(table[0].trap_type, TrapType::Bimetallic);
    assert_eq!(table[0].mount_type, MountType::PressureBearingScrew);
    assert_eq!(table[0].hardware_version, HardwareVersion::Msba10);
    assert_eq!(table[0].condensate_load, CondensateLoad::Low);
    assert_eq!(table[0].p_min, 0.0);
    assert_eq!(table[0].p_max, 10.0);
    assert_eq!(table[0].k1, 1);
    assert_eq!(table[0].k9, None);
    assert_eq!(table[0].k10, None);

    assert_eq!(table[2].trap_type, TrapType::Thermodynamic);
    assert_eq!(table[2].mount_type, MountType::RetroFitClamp);
    assert_eq!(table[2].condensate_load, CondensateLoad::Middle);
    assert_eq!(table[2].k9, Some(3));
    assert_eq!(table[2].k10, Some(8));
}

#[test]
fn pt_map_columns() {
    let table = load_pt_map(&fixture("ptMap.csv")).unwrap();
    assert_eq!(table.len(), 5);
    assert_eq!(table[2].p_bar, 10.0);
    assert_eq!(table[2].p_psig, 145.0);
    assert_eq!(table[2].t_k, 453.15);
    assert_eq!(table[2].t_c, 180.0);
    assert_eq!(table[2].t_f, 356.0);
}

#[test]
fn input_rows_with_hidden_columns() {
    let records = load_input(&fixture("input.csv")).unwrap();
    assert_eq!(records.len(), 3);

    let first = &records[0];
    assert_eq!(first.server.as_deref(), Some("lns-eu"));
    assert_eq!(first.group.as_deref(), Some("plant-a"));
    assert_eq!(first.dev_eui.as_deref(), Some("0011223344556677"));
    assert_eq!(first.trap_type, TrapType::Bimetallic);
    assert_eq!(first.trap_inlet_pressure, 10.0);
    assert_eq!(first.sample_period, Some(900.0));
    assert_eq!(first.piezo_cal_off_sensor, Some(4660));
    assert_eq!(first.counter_reset, None);
    // columns that are not in the sheet at all
    assert_eq!(first.pt100_cal_0c, None);

    let second = &records[1];
    assert_eq!(second.server, None);
    assert_eq!(second.group, None);
    assert_eq!(second.counter_reset.as_deref(), Some("TRUE"));
    assert!(second.counter_reset_requested());
    assert_eq!(second.sample_period, None);
}

#[test]
fn unknown_trap_type_reports_the_row() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "trapType,mountType,hardwareVersion,pMin,pMax,condensateLoad,k1,k2,k3,k4,k5,k6,k7,k8,k9,k10"
    )
    .unwrap();
    writeln!(
        file,
        "BK / BI - Bimetallic,PBS - vertical pressure bearing screw,MSBA-1.0,0,10,low (L < 20 kg/h),1,3,3,4,5,6,7,8,,"
    )
    .unwrap();
    writeln!(
        file,
        "Labyrinth,PBS - vertical pressure bearing screw,MSBA-1.0,0,10,low (L < 20 kg/h),1,3,3,4,5,6,7,8,,"
    )
    .unwrap();
    file.flush().unwrap();

    let err = load_config_table(file.path()).unwrap_err();
    match err {
        SheetError::Parse { row, .. } => assert_eq!(row, 2),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_open_error() {
    let err = load_pt_map(Path::new("does-not-exist.csv")).unwrap_err();
    assert!(matches!(err, SheetError::Open { .. }));
}
