//! Standard seawater equations
//!
//! Practical salinity (PSS-78), pressure-to-depth (UNESCO 1983) and
//! oxygen solubility (Garcia & Gordon 1992, Benson & Krause fit). These
//! are the published reference formulations; coefficient values are
//! reproduced verbatim from the standards documents.

/// Conductivity of standard seawater (S=35, T=15 degC, P=0) in S/m
pub const C_35_15_0: f64 = 4.2914;

/// Practical salinity (PSS-78) from conductivity (S/m), temperature
/// (ITS-68 degC) and pressure (dbar).
///
/// Valid for 2 <= S <= 42; outside the fit region the polynomial is
/// still evaluated and the caller decides what to keep.
pub fn practical_salinity(conductivity: f64, temperature: f64, pressure: f64) -> f64 {
    const A: [f64; 6] = [0.0080, -0.1692, 25.3851, 14.0941, -7.0261, 2.7081];
    const B: [f64; 6] = [0.0005, -0.0056, -0.0066, -0.0375, 0.0636, -0.0144];
    const K: f64 = 0.0162;

    // rt(T): conductivity ratio of standard seawater at temperature T
    const C: [f64; 5] = [
        0.6766097,
        2.00564e-2,
        1.104259e-4,
        -6.9698e-7,
        1.0031e-9,
    ];

    // Rp pressure correction
    const D1: f64 = 3.426e-2;
    const D2: f64 = 4.464e-4;
    const D3: f64 = 4.215e-1;
    const D4: f64 = -3.107e-3;
    const E1: f64 = 2.070e-5;
    const E2: f64 = -6.370e-10;
    const E3: f64 = 3.989e-15;

    let t = temperature;
    let p = pressure;
    let r = conductivity / C_35_15_0;

    let rt_t = C[0] + t * (C[1] + t * (C[2] + t * (C[3] + t * C[4])));
    let rp = 1.0 + p * (E1 + p * (E2 + p * E3)) / (1.0 + D1 * t + D2 * t * t + (D3 + D4 * t) * r);
    let rt = r / (rp * rt_t);

    let sqrt_rt = rt.max(0.0).sqrt();
    let mut salinity = 0.0;
    let mut ds = 0.0;
    let mut rt_pow = 1.0; // Rt^(i/2)
    for i in 0..6 {
        salinity += A[i] * rt_pow;
        ds += B[i] * rt_pow;
        rt_pow *= sqrt_rt;
    }

    let dt = t - 15.0;
    salinity + dt / (1.0 + K * dt) * ds
}

/// Depth (m, positive down) from pressure (dbar) and latitude (deg),
/// UNESCO 1983 formulation.
pub fn depth_from_pressure(pressure: f64, latitude_deg: f64) -> f64 {
    let x = latitude_deg.to_radians().sin().powi(2);
    let gravity = 9.780318 * (1.0 + (5.2788e-3 + 2.36e-5 * x) * x) + 1.092e-6 * pressure;
    let p = pressure;
    ((((-1.82e-15 * p + 2.279e-10) * p - 2.2512e-5) * p + 9.72659) * p) / gravity
}

/// Oxygen solubility (ml/l) at one atmosphere from temperature (degC)
/// and salinity (psu), Garcia & Gordon (1992) with the Benson & Krause
/// coefficients.
pub fn oxygen_solubility(temperature: f64, salinity: f64) -> f64 {
    const A: [f64; 6] = [2.00907, 3.22014, 4.0501, 4.94457, -0.256847, 3.88767];
    const B: [f64; 4] = [-6.24523e-3, -7.37614e-3, -1.0341e-2, -8.17083e-3];
    const C0: f64 = -4.88682e-7;

    let ts = ((298.15 - temperature) / (273.15 + temperature)).ln();

    let mut ln_c = 0.0;
    let mut ts_pow = 1.0;
    for a in A {
        ln_c += a * ts_pow;
        ts_pow *= ts;
    }

    let mut b_sum = 0.0;
    let mut ts_pow = 1.0;
    for b in B {
        b_sum += b * ts_pow;
        ts_pow *= ts;
    }

    (ln_c + salinity * (b_sum + C0 * salinity)).exp()
}
