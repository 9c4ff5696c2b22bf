//! Distance and walking-time estimation.

use crate::places::Coordinate;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average walking speed used for the walk-time estimate.
pub const WALKING_SPEED_KMH: f64 = 4.8;

/// Great-circle distance between two coordinates, in kilometers.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Estimated walking time, rounded to the nearest minute.
pub fn walk_minutes(distance_km: f64) -> u32 {
    (distance_km / (WALKING_SPEED_KMH / 60.0)).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinate {
            lat: 35.6812,
            lng: 139.7671,
        };
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = Coordinate { lat: 0.0, lng: 0.0 };
        let b = Coordinate { lat: 1.0, lng: 0.0 };
        let d = haversine_km(a, b);
        assert!((d - 111.19).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate {
            lat: 35.6812,
            lng: 139.7671,
        };
        let b = Coordinate {
            lat: 35.6896,
            lng: 139.7006,
        };
        let ab = haversine_km(a, b);
        let ba = haversine_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
        // Tokyo station to Shinjuku station is roughly six kilometers
        assert!(ab > 5.0 && ab < 7.0, "got {}", ab);
    }

    #[test]
    fn one_km_walk_is_thirteen_minutes() {
        assert_eq!(walk_minutes(1.0), 13);
    }

    #[test]
    fn walk_minutes_rounds_to_nearest() {
        assert_eq!(walk_minutes(0.0), 0);
        // 0.4 km at 4.8 km/h = 5.0 minutes exactly
        assert_eq!(walk_minutes(0.4), 5);
        // 2.0 km = 25 minutes
        assert_eq!(walk_minutes(2.0), 25);
    }
}
