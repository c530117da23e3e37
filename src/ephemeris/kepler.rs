use log::{debug, error};
use nalgebra::{Rotation3, Vector3};

use crate::{
    constants::{
        EARTH_ANGULAR_VEL_RAD, EARTH_GRAVITATION_MU_M3_S2, KEPLER_MAX_ITER, KEPLER_TOLERANCE_RAD,
    },
    ephemeris::Keplerian,
    prelude::{gpst, Epoch},
};

impl Keplerian {
    /// Resolves Kepler equations at t, for an issue of given week.
    pub(crate) fn position_ecef_m(&self, week: u32, t: Epoch) -> Option<Vector3<f64>> {
        let e = self.eccentricity;
        let a = self.semi_major_axis_m;

        if a <= 0.0 || !(0.0..1.0).contains(&e) {
            error!("kepler: invalid orbit (a={}, e={})", a, e);
            return None;
        }

        let (cus, cuc) = self.cus_cuc_rad;
        let (cis, cic) = self.cis_cic_rad;
        let (crs, crc) = self.crs_crc_m;

        let t_k = (t - gpst(week, self.toe_s)).to_seconds();

        let n0 = (EARTH_GRAVITATION_MU_M3_S2 / a.powi(3)).sqrt();
        let n = n0 + self.dn_rad;
        let m = self.m0_rad + n * t_k;

        let mut e_k = m;
        let mut i = 0;

        loop {
            let e_k_next = m + e * e_k.sin();
            let converged = (e_k_next - e_k).abs() < KEPLER_TOLERANCE_RAD;
            e_k = e_k_next;
            if converged {
                break;
            }

            i += 1;
            if i == KEPLER_MAX_ITER {
                error!("{} - kepler solver in failure", t);
                return None;
            }
        }

        let (sin_e_k, cos_e_k) = e_k.sin_cos();
        let v_k = ((1.0 - e.powi(2)).sqrt() * sin_e_k).atan2(cos_e_k - e);

        let phi = v_k + self.omega_rad;
        let (sin_2phi, cos_2phi) = (2.0 * phi).sin_cos();

        let u_k = phi + cuc * cos_2phi + cus * sin_2phi;
        let r_k = a * (1.0 - e * cos_e_k) + crc * cos_2phi + crs * sin_2phi;
        let i_k = self.i0_rad + self.idot_rad_s * t_k + cic * cos_2phi + cis * sin_2phi;
        let omega_k = self.omega0_rad + (self.omega_dot_rad_s - EARTH_ANGULAR_VEL_RAD) * t_k
            - EARTH_ANGULAR_VEL_RAD * self.toe_s;

        // orbital plane to ECEF
        let rot_x = Rotation3::from_axis_angle(&Vector3::x_axis(), i_k);
        let rot_z = Rotation3::from_axis_angle(&Vector3::z_axis(), omega_k);

        let ecef = rot_z * rot_x * Vector3::new(r_k * u_k.cos(), r_k * u_k.sin(), 0.0);

        debug!(
            "{} - kepler x={:.3} y={:.3} z={:.3} t_k={}",
            t, ecef[0], ecef[1], ecef[2], t_k
        );

        Some(ecef)
    }
}
