//! Great-circle distance helpers.

use cohort_core::contact::Coordinates;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
  let lat1 = a.latitude.to_radians();
  let lat2 = b.latitude.to_radians();
  let d_lat = (b.latitude - a.latitude).to_radians();
  let d_lng = (b.longitude - a.longitude).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
  let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
  EARTH_RADIUS_KM * c
}

/// Haversine distance in metres.
pub fn haversine_m(a: Coordinates, b: Coordinates) -> f64 {
  haversine_km(a, b) * 1000.0
}

/// Arithmetic mean of latitudes and longitudes. `None` for an empty slice.
pub fn centroid(points: &[Coordinates]) -> Option<Coordinates> {
  if points.is_empty() {
    return None;
  }
  let n = points.len() as f64;
  let (lat, lng) = points
    .iter()
    .fold((0.0, 0.0), |(lat, lng), p| (lat + p.latitude, lng + p.longitude));
  Some(Coordinates::new(lat / n, lng / n))
}
