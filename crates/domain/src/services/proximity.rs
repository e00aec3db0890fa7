//! Great-circle distance and proximity tiers.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between two coordinates in kilometers, rounded to one decimal.
///
/// Uses the haversine formula. Symmetric and never negative.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` marginally outside [0, 1]
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round1(EARTH_RADIUS_KM * c)
}

/// Tiered proximity signal in `[0.2, 1.0]`. Tier bounds are inclusive.
pub fn proximity_score(distance_km: f64) -> f64 {
    if distance_km <= 1.0 {
        1.0
    } else if distance_km <= 3.0 {
        0.8
    } else if distance_km <= 5.0 {
        0.6
    } else if distance_km <= 8.0 {
        0.4
    } else {
        0.2
    }
}

/// Human-readable distance, e.g. "1.5 km away".
pub fn distance_phrase(distance_km: f64) -> String {
    format!("{:.1} km away", distance_km)
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_are_zero() {
        assert_eq!(haversine_distance(40.7589, -73.9851, 40.7589, -73.9851), 0.0);
        assert_eq!(haversine_distance(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(haversine_distance(-33.86, 151.2, -33.86, 151.2), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // Times Square to the West Village
        assert_eq!(haversine_distance(40.7589, -73.9851, 40.7406, -74.0014), 2.5);
    }

    #[test]
    fn test_symmetric_and_non_negative() {
        let points = [
            (40.7589, -73.9851),
            (40.7128, -74.0060),
            (51.5074, -0.1278),
            (-33.8688, 151.2093),
        ];
        for &(lat1, lon1) in &points {
            for &(lat2, lon2) in &points {
                let d1 = haversine_distance(lat1, lon1, lat2, lon2);
                let d2 = haversine_distance(lat2, lon2, lat1, lon1);
                assert_eq!(d1, d2);
                assert!(d1 >= 0.0);
            }
        }
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert_eq!(d, round1(std::f64::consts::PI * EARTH_RADIUS_KM));
    }

    #[test]
    fn test_proximity_tiers_inclusive() {
        assert_eq!(proximity_score(0.0), 1.0);
        assert_eq!(proximity_score(1.0), 1.0);
        assert_eq!(proximity_score(1.01), 0.8);
        assert_eq!(proximity_score(3.0), 0.8);
        assert_eq!(proximity_score(3.1), 0.6);
        assert_eq!(proximity_score(5.0), 0.6);
        assert_eq!(proximity_score(8.0), 0.4);
        assert_eq!(proximity_score(8.1), 0.2);
        assert_eq!(proximity_score(500.0), 0.2);
    }

    #[test]
    fn test_distance_phrase() {
        assert_eq!(distance_phrase(1.5), "1.5 km away");
        assert_eq!(distance_phrase(0.0), "0.0 km away");
    }
}
