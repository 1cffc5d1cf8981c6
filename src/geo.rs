use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius used for great-circle math.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A position on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A sample coordinate along a great-circle path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathSample {
    pub distance_km: f64,
    pub point: GeoPoint,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Initial bearing towards `other`, degrees clockwise from north in [0, 360).
    pub fn bearing_deg(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }
}

/// Point at `fraction` (0..=1) of the way along the great circle from `a` to `b`.
pub fn intermediate_point(a: &GeoPoint, b: &GeoPoint, fraction: f64) -> GeoPoint {
    let delta = a.distance_km(b) / EARTH_RADIUS_KM;
    if delta == 0.0 {
        return *a;
    }

    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    let wa = ((1.0 - fraction) * delta).sin() / delta.sin();
    let wb = (fraction * delta).sin() / delta.sin();

    let x = wa * lat1.cos() * lon1.cos() + wb * lat2.cos() * lon2.cos();
    let y = wa * lat1.cos() * lon1.sin() + wb * lat2.cos() * lon2.sin();
    let z = wa * lat1.sin() + wb * lat2.sin();

    GeoPoint {
        latitude: z.atan2((x * x + y * y).sqrt()).to_degrees(),
        longitude: y.atan2(x).to_degrees(),
    }
}

/// Evenly spaced samples from `a` to `b`, both endpoints included.
///
/// Fewer than two samples yields just the endpoints that fit.
pub fn sample_path(a: &GeoPoint, b: &GeoPoint, samples: usize) -> Vec<PathSample> {
    let total = a.distance_km(b);
    match samples {
        0 => Vec::new(),
        1 => vec![PathSample {
            distance_km: 0.0,
            point: *a,
        }],
        n => (0..n)
            .map(|i| {
                let fraction = i as f64 / (n - 1) as f64;
                PathSample {
                    distance_km: total * fraction,
                    point: intermediate_point(a, b, fraction),
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const LISBON: GeoPoint = GeoPoint::new(38.7223, -9.1393);
    const MADRID: GeoPoint = GeoPoint::new(40.4168, -3.7038);

    #[test]
    fn distance_lisbon_madrid() {
        assert_abs_diff_eq!(LISBON.distance_km(&MADRID), 503.0, epsilon = 5.0);
        assert_abs_diff_eq!(LISBON.distance_km(&LISBON), 0.0);
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert_abs_diff_eq!(origin.bearing_deg(&GeoPoint::new(10.0, 0.0)), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(origin.bearing_deg(&GeoPoint::new(0.0, 10.0)), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(origin.bearing_deg(&GeoPoint::new(-10.0, 0.0)), 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(origin.bearing_deg(&GeoPoint::new(0.0, -10.0)), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn sample_path_spans_endpoints() {
        let samples = sample_path(&LISBON, &MADRID, 11);
        assert_eq!(samples.len(), 11);
        assert_abs_diff_eq!(samples[0].distance_km, 0.0);
        assert_abs_diff_eq!(samples[10].distance_km, LISBON.distance_km(&MADRID), epsilon = 1e-9);
        assert_abs_diff_eq!(samples[10].point.latitude, MADRID.latitude, epsilon = 1e-9);
        assert_abs_diff_eq!(samples[10].point.longitude, MADRID.longitude, epsilon = 1e-9);

        let mid = samples[5].point;
        assert_abs_diff_eq!(
            LISBON.distance_km(&mid),
            mid.distance_km(&MADRID),
            epsilon = 1e-6
        );
    }

    #[test]
    fn validity_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.1).is_valid());
    }
}
