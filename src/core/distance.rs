use crate::domain::model::Coordinate;

/// Earth's radius in miles
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle (haversine) distance between two points, in miles.
#[inline]
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Output precision for distance cells: one decimal place.
#[inline]
pub fn round_miles(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const JFK: Coordinate = Coordinate {
        lat: 40.6413,
        lon: -73.7781,
    };
    const LAX: Coordinate = Coordinate {
        lat: 33.9416,
        lon: -118.4085,
    };

    #[test]
    fn test_known_distance() {
        // JFK to LAX is roughly 2,470 miles
        let distance = haversine_miles(JFK, LAX);
        assert!(
            (distance - 2470.0).abs() < 10.0,
            "Distance should be ~2470mi, got {}",
            distance
        );
    }

    #[test]
    fn test_symmetry() {
        assert_eq!(haversine_miles(JFK, LAX), haversine_miles(LAX, JFK));
    }

    #[test]
    fn test_zero_self_distance() {
        assert_eq!(haversine_miles(JFK, JFK), 0.0);
    }

    #[test]
    fn test_collinear_additivity() {
        // Three points along the equator lie on one great circle, so the
        // outer distance is the sum of the two inner ones.
        let a = Coordinate { lat: 0.0, lon: 0.0 };
        let b = Coordinate {
            lat: 0.0,
            lon: 10.0,
        };
        let c = Coordinate {
            lat: 0.0,
            lon: 25.0,
        };

        let direct = haversine_miles(a, c);
        let via = haversine_miles(a, b) + haversine_miles(b, c);
        assert!((direct - via).abs() < 1e-6);
    }

    #[test]
    fn test_round_miles() {
        assert_eq!(round_miles(123.4567), 123.5);
        assert_eq!(round_miles(123.44), 123.4);
        assert_eq!(round_miles(0.0), 0.0);
    }
}
