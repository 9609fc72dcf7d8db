#![allow(non_snake_case)]
#![allow(clippy::type_complexity)]
use mathprog::{algebra::*, solver::*};

// a collection of tests to ensure that data of
// incompatible dimension won't be accepted

fn api_dim_check_data() -> (
    Matrix<f64>,
    Vec<f64>,
    Matrix<f64>,
    Vec<f64>,
    Matrix<f64>,
    Vec<f64>,
) {
    let Q = Matrix::<f64>::zeros((4, 4));
    let C = vec![0.; 4];
    let AE = Matrix::<f64>::zeros((1, 4));
    let BE = vec![0.; 1];
    let AI = Matrix::<f64>::zeros((5, 4));
    let BI = vec![0.; 5];
    (Q, C, AE, BE, AI, BI)
}

#[test]
fn api_dim_check_working() {
    // This example should work because dimensions are
    // all compatible.  All following checks vary one
    // of these sizes to test dimension checks

    let (Q, C, AE, BE, AI, BI) = api_dim_check_data();
    assert!(ConvexData::new(Q, C, AE, BE, AI, BI).is_ok());
}

#[test]
fn api_dim_check_bad_Q() {
    let (_Q, C, AE, BE, AI, BI) = api_dim_check_data();
    let Q = Matrix::<f64>::zeros((3, 3));

    let err = ConvexData::new(Q, C, AE, BE, AI, BI).unwrap_err();
    assert!(matches!(err, DataError::IncompatibleDimension { .. }));
}

#[test]
fn api_dim_check_bad_AE() {
    let (Q, C, _AE, BE, AI, BI) = api_dim_check_data();
    let AE = Matrix::<f64>::zeros((1, 3));

    let err = ConvexData::new(Q, C, AE, BE, AI, BI).unwrap_err();
    assert_eq!(
        err,
        DataError::IncompatibleDimension {
            what: "AE columns",
            expected: 4,
            found: 3
        }
    );
}

#[test]
fn api_dim_check_bad_BI() {
    let (Q, C, AE, BE, AI, _BI) = api_dim_check_data();
    let BI = vec![0.; 6];

    let err = ConvexData::new(Q, C, AE, BE, AI, BI).unwrap_err();
    assert!(matches!(
        err,
        DataError::IncompatibleDimension { what: "BI", .. }
    ));
}

#[test]
fn api_dim_check_bad_C() {
    let (Q, _C, AE, BE, AI, BI) = api_dim_check_data();
    let C = vec![0.; 5];

    assert!(ConvexData::new(Q, C, AE, BE, AI, BI).is_err());
}

#[test]
fn api_check_non_finite() {
    let (Q, C, AE, BE, AI, mut BI) = api_dim_check_data();
    BI[2] = f64::INFINITY;

    let err = ConvexData::new(Q, C, AE, BE, AI, BI).unwrap_err();
    assert_eq!(err, DataError::NonFinite("BI"));
}

#[test]
fn api_check_bad_row_update() {
    let (Q, C, AE, BE, AI, BI) = api_dim_check_data();
    let mut data = ConvexData::new(Q, C, AE, BE, AI, BI).unwrap();

    assert_eq!(data.update_inequality_rhs(5, 1.), Err(DataError::BadRowIndex(5)));
    assert_eq!(
        data.update_inequality_rhs(0, f64::NAN),
        Err(DataError::NonFinite("BI"))
    );
    assert!(data.update_inequality_rhs(4, 1.).is_ok());
    assert_eq!(data.BI[4], 1.);
}

#[test]
fn api_check_bad_settings() {
    let settings = ConvexSettingsBuilder::<f64>::default().tol_feas(-1.).build();
    assert!(settings.is_err());

    let settings = ConvexSettingsBuilder::<f64>::default().tol_feas(1e-7).build();
    assert!(settings.is_ok());
}
