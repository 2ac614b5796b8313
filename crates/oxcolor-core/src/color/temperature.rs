//! Correlated color temperature
//!
//! Robertson's method over the 31-line isotemperature table (Wyszecki & Stiles).

use crate::color::Xyz;

struct Isotemp {
    mirek: f64,
    ut: f64,
    vt: f64,
    tt: f64,
}

const fn iso(mirek: f64, ut: f64, vt: f64, tt: f64) -> Isotemp {
    Isotemp { mirek, ut, vt, tt }
}

const ISOTEMPERATURE_LINES: [Isotemp; 31] = [
    iso(0.0, 0.18006, 0.26352, -0.24341),
    iso(10.0, 0.18066, 0.26589, -0.25479),
    iso(20.0, 0.18133, 0.26846, -0.26876),
    iso(30.0, 0.18208, 0.27119, -0.28539),
    iso(40.0, 0.18293, 0.27407, -0.30470),
    iso(50.0, 0.18388, 0.27709, -0.32675),
    iso(60.0, 0.18494, 0.28021, -0.35156),
    iso(70.0, 0.18611, 0.28342, -0.37915),
    iso(80.0, 0.18740, 0.28668, -0.40955),
    iso(90.0, 0.18880, 0.28997, -0.44278),
    iso(100.0, 0.19032, 0.29326, -0.47888),
    iso(125.0, 0.19462, 0.30141, -0.58204),
    iso(150.0, 0.19962, 0.30921, -0.70471),
    iso(175.0, 0.20525, 0.31647, -0.84901),
    iso(200.0, 0.21142, 0.32312, -1.0182),
    iso(225.0, 0.21807, 0.32909, -1.2168),
    iso(250.0, 0.22511, 0.33439, -1.4512),
    iso(275.0, 0.23247, 0.33904, -1.7298),
    iso(300.0, 0.24010, 0.34308, -2.0637),
    iso(325.0, 0.24702, 0.34655, -2.4681),
    iso(350.0, 0.25591, 0.34951, -2.9641),
    iso(375.0, 0.26400, 0.35200, -3.5814),
    iso(400.0, 0.27218, 0.35407, -4.3633),
    iso(425.0, 0.28039, 0.35577, -5.3762),
    iso(450.0, 0.28863, 0.35714, -6.7262),
    iso(475.0, 0.29685, 0.35823, -8.5955),
    iso(500.0, 0.30505, 0.35907, -11.324),
    iso(525.0, 0.31320, 0.35968, -15.628),
    iso(550.0, 0.32129, 0.36011, -23.325),
    iso(575.0, 0.32931, 0.36038, -40.770),
    iso(600.0, 0.33724, 0.36051, -116.45),
];

/// Correlated color temperature in kelvin of a white point.
///
/// Returns `None` outside the table's range (roughly 1667 K and up) or for a
/// white with no chromaticity.
pub fn correlated_color_temperature(white: Xyz) -> Option<f64> {
    let (x, y) = white.chromaticity()?;
    let denom = -x + 6.0 * y + 1.5;
    if denom.abs() < 1e-12 {
        return None;
    }
    let us = 2.0 * x / denom;
    let vs = 3.0 * y / denom;

    let mut prev_mirek = 0.0;
    let mut prev_dist = 0.0;
    for (j, line) in ISOTEMPERATURE_LINES.iter().enumerate() {
        let dist = ((vs - line.vt) - line.tt * (us - line.ut)) / (1.0 + line.tt * line.tt).sqrt();
        if j != 0 && prev_dist / dist < 0.0 {
            let mirek = prev_mirek + prev_dist / (prev_dist - dist) * (line.mirek - prev_mirek);
            return Some(1.0e6 / mirek);
        }
        prev_dist = dist;
        prev_mirek = line.mirek;
    }
    None
}
