/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// Earth gravitational constant (m^3 s-2), GPS ICD value
pub const EARTH_GRAVITATION_MU_M3_S2: f64 = 3.986005E14;

/// Seconds in one GPS week
pub const SECONDS_PER_WEEK: u64 = 7 * 86_400;

/// Default correction wait timeout (s)
pub const DEFAULT_CORRECTION_WAIT_S: f64 = 5.0;

/// Clock corrections younger than this are considered current (s)
pub const DEFAULT_CORRECTION_LATENCY_S: f64 = 1.0;

/// Kepler solver convergence threshold (rad)
pub const KEPLER_TOLERANCE_RAD: f64 = 1.0E-12;

/// Kepler solver iteration budget
pub const KEPLER_MAX_ITER: usize = 10;
