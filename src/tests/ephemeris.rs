use crate::{
    prelude::{
        Ephemeris, EphemerisStore, GlonassState, Keplerian, OrbitalParameters, Vector3, SV,
    },
    tests::{init_logger, sv, t, WEEK},
};

use rstest::*;

fn glonass(sv: SV, toc_s: f64, iod: u16, position_m: Vector3<f64>) -> Ephemeris {
    Ephemeris {
        sv,
        iod,
        toc_s,
        week: WEEK,
        clock: (1.0E-5, 0.0, 0.0),
        orbit: OrbitalParameters::Glonass(GlonassState {
            position_m,
            velocity_m_s: Vector3::new(1_000.0, -2_000.0, 500.0),
            acceleration_m_s2: Vector3::zeros(),
        }),
    }
}

#[fixture]
fn kepler() -> Keplerian {
    Keplerian {
        toe_s: 0.0,
        semi_major_axis_m: 26_559_700.0,
        eccentricity: 0.01,
        m0_rad: 0.5,
        i0_rad: 0.96,
        idot_rad_s: 0.0,
        dn_rad: 0.0,
        omega0_rad: 1.2,
        omega_rad: 0.3,
        omega_dot_rad_s: -8.0E-9,
        cus_cuc_rad: (0.0, 0.0),
        cis_cic_rad: (0.0, 0.0),
        crs_crc_m: (0.0, 0.0),
    }
}

fn gps(sv: SV, week: u32, toc_s: f64, iod: u16, kepler: Keplerian) -> Ephemeris {
    Ephemeris {
        sv,
        week,
        toc_s,
        iod,
        clock: (0.0, 0.0, 0.0),
        orbit: OrbitalParameters::Keplerian(kepler),
    }
}

#[rstest]
fn ephemeris_pairing(kepler: Keplerian) {
    init_logger();

    let g05 = sv("G05");
    let mut store = EphemerisStore::new(None);

    let first = gps(g05, 100, 5.0, 1, kepler);
    let second = gps(g05, 100, 10.0, 2, kepler);
    let outdated = gps(g05, 100, 3.0, 3, kepler);

    assert!(store.update(first));
    assert_eq!(store.current(g05), Some(&first));
    assert!(store.previous(g05).is_none());

    assert!(store.update(second));
    assert_eq!(store.current(g05), Some(&second));
    assert_eq!(store.previous(g05), Some(&first));

    assert!(!store.update(outdated));
    assert_eq!(store.current(g05), Some(&second));
    assert_eq!(store.previous(g05), Some(&first));

    // duplicates are rejected too
    assert!(!store.update(second));

    // later week, earlier toc
    let next_week = gps(g05, 101, 0.0, 4, kepler);
    assert!(store.update(next_week));
    assert_eq!(store.current(g05), Some(&next_week));
    assert_eq!(store.previous(g05), Some(&second));

    assert_eq!(store.len(), 1);
}

#[rstest]
fn iod_selection(kepler: Keplerian) {
    init_logger();

    let g07 = sv("G07");
    let mut store = EphemerisStore::new(None);

    store.update(gps(g07, WEEK, 0.0, 40, kepler));
    store.update(gps(g07, WEEK, 7_200.0, 41, kepler));

    assert_eq!(store.select(g07, 41).map(|eph| eph.toc_s), Some(7_200.0));
    assert_eq!(store.select(g07, 40).map(|eph| eph.toc_s), Some(0.0));
    assert!(store.select(g07, 39).is_none());
    assert!(store.select(sv("G08"), 41).is_none());
}

#[test]
fn glonass_continuity() {
    init_logger();

    let r03 = sv("R03");
    let mut store = EphemerisStore::new(Some(10.0));

    let p0 = Vector3::new(10_000_000.0, 15_000_000.0, 12_000_000.0);
    store.update(glonass(r03, 0.0, 1, p0));
    assert!(store.continuity_m(r03).is_none());

    // consistent with the first issue, propagated by 1800s
    let p1 = p0 + Vector3::new(1_000.0, -2_000.0, 500.0) * 1_800.0;
    assert!(store.update(glonass(r03, 1_800.0, 2, p1)));

    let jump = store.continuity_m(r03).unwrap();
    assert!(jump < 1.0E-3, "jump={}", jump);

    // 50 m off: still accepted, only reported
    let p2 = p1 + Vector3::new(1_000.0, -2_000.0, 500.0) * 1_800.0 + Vector3::new(50.0, 0.0, 0.0);
    assert!(store.update(glonass(r03, 3_600.0, 3, p2)));

    let jump = store.continuity_m(r03).unwrap();
    assert!((jump - 50.0).abs() < 1.0E-3, "jump={}", jump);
}

#[rstest]
fn kepler_orbit(kepler: Keplerian) {
    init_logger();

    let eph = gps(sv("G01"), WEEK, 0.0, 1, kepler);

    for sow in [0.0, 900.0, 3_600.0, 7_200.0] {
        let position = eph.position_ecef_m(t(sow)).unwrap();
        let radius = position.norm();
        // a(1-e) < r < a(1+e)
        assert!(radius > 26_559_700.0 * 0.99 - 1.0, "r={}", radius);
        assert!(radius < 26_559_700.0 * 1.01 + 1.0, "r={}", radius);
    }

    // the same issue republished: no jump
    let mut store = EphemerisStore::new(Some(10.0));
    store.update(eph);
    let mut next = eph;
    next.toc_s = 7_200.0;
    next.iod = 2;
    store.update(next);
    assert!(store.continuity_m(sv("G01")).unwrap() < 1.0E-6);

    let mut invalid = kepler;
    invalid.eccentricity = 1.5;
    let eph = gps(sv("G01"), WEEK, 0.0, 1, invalid);
    assert!(eph.position_ecef_m(t(0.0)).is_none());
}

#[test]
fn clock_bias() {
    let eph = Ephemeris {
        week: WEEK,
        toc_s: 100.0,
        clock: (1.0E-4, 1.0E-9, 0.0),
        ..Default::default()
    };
    let bias = eph.clock_bias_s(t(200.0));
    assert!((bias - (1.0E-4 + 1.0E-7)).abs() < 1.0E-15);
}
