//! Location filters and the coarse geometry helpers used to pre-filter candidates.
//!
//! Bounding boxes travel as `(south, west, north, east)` throughout the service, while every
//! GeoJSON coordinate produced here is `(longitude, latitude)`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Position = [f64; 2];
pub type Ring = Vec<Position>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
	pub south: f64,
	pub west: f64,
	pub north: f64,
	pub east: f64,
}
impl Bbox {
	pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
		Self { south, west, north, east }
	}

	/// Reads a `[south, west, north, east]` array.
	pub fn from_swne(coords: &[f64]) -> Option<Self> {
		let [south, west, north, east] = coords else {
			return None;
		};
		let bbox = Self::new(*south, *west, *north, *east);

		bbox.is_finite().then_some(bbox)
	}

	/// Reads a STAC/GeoJSON `[west, south, east, north]` array. Three-dimensional boxes
	/// (`[w, s, zmin, e, n, zmax]`) are accepted as well.
	pub fn from_wsen(coords: &[f64]) -> Option<Self> {
		let bbox = match coords {
			[west, south, east, north] => Self::new(*south, *west, *north, *east),
			[west, south, _, east, north, _] => Self::new(*south, *west, *north, *east),
			_ => return None,
		};

		bbox.is_finite().then_some(bbox)
	}

	pub fn from_point(lat: f64, lon: f64) -> Self {
		Self::new(lat, lon, lat, lon)
	}

	/// Closed five-point ring: `(W,S),(E,S),(E,N),(W,N),(W,S)`.
	pub fn ring(&self) -> Ring {
		vec![
			[self.west, self.south],
			[self.east, self.south],
			[self.east, self.north],
			[self.west, self.north],
			[self.west, self.south],
		]
	}

	fn is_finite(&self) -> bool {
		[self.south, self.west, self.north, self.east].iter().all(|value| value.is_finite())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationFilter {
	/// `[south, west, north, east]`.
	Bbox(Bbox),
	/// Vertices as `(lat, lng)` pairs. The ring does not need to repeat its first vertex.
	Polygon(Vec<Position>),
}
impl LocationFilter {
	/// Parses one loosely shaped filter object such as `{"type": "bbox", "coords": [s, w, n, e]}`
	/// or `{"type": "polygon", "coords": [[lat, lng], ...]}`. Anything else yields `None`.
	pub fn from_value(value: &Value) -> Option<Self> {
		let kind = value.get("type").and_then(Value::as_str).unwrap_or("bbox");
		let coords = value.get("coords").or_else(|| value.get("coordinates"))?.as_array()?;

		match kind.to_ascii_lowercase().as_str() {
			"bbox" => {
				let numbers = coords.iter().map(Value::as_f64).collect::<Option<Vec<_>>>()?;

				Bbox::from_swne(&numbers).map(Self::Bbox)
			},
			"polygon" => {
				let mut vertices = Vec::with_capacity(coords.len());

				for vertex in coords {
					let pair = vertex.as_array()?;
					let [lat, lng] = pair.as_slice() else {
						return None;
					};
					let (lat, lng) = (lat.as_f64()?, lng.as_f64()?);

					if !lat.is_finite() || !lng.is_finite() {
						return None;
					}

					vertices.push([lat, lng]);
				}

				// Three distinct vertices are the minimum for an area.
				let distinct = if vertices.first() == vertices.last() && vertices.len() > 1 {
					vertices.len() - 1
				} else {
					vertices.len()
				};

				(distinct >= 3).then_some(Self::Polygon(vertices))
			},
			_ => None,
		}
	}

	/// Parses a list of filters, a single filter object, or `null`. Returns the filters that were
	/// well formed together with the number of rejected entries.
	pub fn parse_list(value: &Value) -> (Vec<Self>, usize) {
		match value {
			Value::Null => (Vec::new(), 0),
			Value::Array(items) => {
				let mut filters = Vec::with_capacity(items.len());
				let mut rejected = 0;

				for item in items {
					match Self::from_value(item) {
						Some(filter) => filters.push(filter),
						None => rejected += 1,
					}
				}

				(filters, rejected)
			},
			other => match Self::from_value(other) {
				Some(filter) => (vec![filter], 0),
				None => (Vec::new(), 1),
			},
		}
	}

	/// Closed ring in `(lon, lat)` order.
	pub fn ring(&self) -> Ring {
		match self {
			Self::Bbox(bbox) => bbox.ring(),
			Self::Polygon(vertices) => {
				let mut ring: Ring = vertices.iter().map(|[lat, lng]| [*lng, *lat]).collect();

				close_ring(&mut ring);

				ring
			},
		}
	}

	/// Axis-aligned envelope of the filter.
	pub fn envelope(&self) -> Bbox {
		match self {
			Self::Bbox(bbox) => *bbox,
			Self::Polygon(vertices) => {
				let mut envelope = Bbox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);

				for [lat, lng] in vertices {
					envelope.south = envelope.south.min(*lat);
					envelope.north = envelope.north.max(*lat);
					envelope.west = envelope.west.min(*lng);
					envelope.east = envelope.east.max(*lng);
				}

				envelope
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
	Polygon(Vec<Ring>),
	MultiPolygon(Vec<Vec<Ring>>),
}

/// Builds the geometry handed to remote catalogs. A single filter becomes a polygon; several
/// filters become a multipolygon with one polygon each, without merging overlapping shapes.
pub fn to_geometry(filters: &[LocationFilter]) -> Option<Geometry> {
	match filters {
		[] => None,
		[single] => Some(Geometry::Polygon(vec![single.ring()])),
		many =>
			Some(Geometry::MultiPolygon(many.iter().map(|filter| vec![filter.ring()]).collect())),
	}
}

/// Two boxes are disjoint only when one lies entirely left of, right of, above, or below the
/// other. Touching edges count as overlap.
pub fn overlaps(a: &Bbox, b: &Bbox) -> bool {
	!(a.east < b.west || a.west > b.east || a.north < b.south || a.south > b.north)
}

/// Coarse test of a candidate box against every filter envelope. An empty filter list accepts
/// everything.
pub fn matches_any(candidate: &Bbox, filters: &[LocationFilter]) -> bool {
	filters.is_empty() || filters.iter().any(|filter| overlaps(candidate, &filter.envelope()))
}

fn close_ring(ring: &mut Ring) {
	if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied())
		&& first != last
	{
		ring.push(first);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn polygon_ring_is_closed_once() {
		let open = LocationFilter::Polygon(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
		let closed = LocationFilter::Polygon(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]);

		assert_eq!(open.ring().len(), 4);
		assert_eq!(open.ring(), closed.ring());
		assert_eq!(open.ring()[1], [1.0, 0.0]);
	}

	#[test]
	fn polygon_envelope_spans_vertices() {
		let filter = LocationFilter::Polygon(vec![[10.0, -5.0], [12.0, 3.0], [8.0, 1.0]]);

		assert_eq!(filter.envelope(), Bbox::new(8.0, -5.0, 12.0, 3.0));
	}

	#[test]
	fn wsen_reads_three_dimensional_boxes() {
		let bbox = Bbox::from_wsen(&[-10.0, 40.0, 0.0, 5.0, 50.0, 100.0])
			.expect("Failed to read 3D bbox.");

		assert_eq!(bbox, Bbox::new(40.0, -10.0, 50.0, 5.0));
	}
}
