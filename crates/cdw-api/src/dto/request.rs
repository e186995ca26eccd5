use serde::{Deserialize, Deserializer};

/// Excavation location: explicit coordinates or a query to geocode
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Coordinates { lat: f64, lng: f64 },
    Query(String),
}

/// Calculate request body; missing dimensions are zero
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub location: LocationInput,
    #[serde(default, deserialize_with = "dimension")]
    pub length: f64,
    #[serde(default, deserialize_with = "dimension")]
    pub width: f64,
    #[serde(default, deserialize_with = "dimension")]
    pub depth: f64,
}

/// Form fields arrive as text, so `"10"` and `10` are the same length
fn dimension<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dimension {
        Number(f64),
        Text(String),
    }

    match Dimension::deserialize(deserializer)? {
        Dimension::Number(value) => Ok(value),
        Dimension::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("dimension is not a number: {:?}", text))),
    }
}

/// Geocode request body
#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_forms() {
        let request: CalculateRequest = serde_json::from_str(
            r#"{"location": {"lat": 40.78, "lng": -73.97}, "length": 10, "width": 5, "depth": 2}"#,
        )
        .unwrap();
        assert_eq!(request.location, LocationInput::Coordinates { lat: 40.78, lng: -73.97 });
        assert_eq!(request.depth, 2.0);

        let request: CalculateRequest =
            serde_json::from_str(r#"{"location": "350 5th Ave, New York"}"#).unwrap();
        assert_eq!(request.location, LocationInput::Query("350 5th Ave, New York".to_string()));
        assert_eq!(request.length, 0.0);
        assert_eq!(request.depth, 0.0);
    }

    #[test]
    fn test_dimensions_accept_numeric_text() {
        let request: CalculateRequest = serde_json::from_str(
            r#"{"location": "Central Park", "length": "10", "width": " 5.5 ", "depth": 2}"#,
        )
        .unwrap();
        assert_eq!(request.length, 10.0);
        assert_eq!(request.width, 5.5);
        assert_eq!(request.depth, 2.0);

        let err = serde_json::from_str::<CalculateRequest>(r#"{"location": "Central Park", "length": "ten"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("dimension"));

        assert!(serde_json::from_str::<CalculateRequest>(r#"{"location": "x", "depth": null}"#).is_err());
    }
}
