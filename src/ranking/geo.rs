/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in whole kilometres.
///
/// Inputs are degrees. The result is truncated toward zero, never
/// rounded, so `111.9` km reports as `111`.
pub fn distance_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> i64 {
    let (lon1, lat1) = (lon1.to_radians(), lat1.to_radians());
    let (lon2, lat2) = (lon2.to_radians(), lat2.to_radians());

    let h = ((lat1 - lat2) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon1 - lon2) / 2.0).sin().powi(2);

    // Rounding can push h a hair past 1 for antipodes
    let d = 2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin();

    d.trunc() as i64
}
