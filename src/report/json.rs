//! JSON encodings
//!
//! - **v1**: the aggregate's fields as-is, leaderboards redacted per name
//!   style
//! - **v2**: one object per metric, keyed by metric, carrying its rating;
//!   rows below the threshold are omitted

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::concern::ConcernScale;
use crate::model::{HistorySize, Leaderboards};

use super::metrics::layout;
use super::options::{NameStyle, Threshold};

/// Structural dump of `history`
pub fn json_v1(history: &HistorySize, style: NameStyle) -> serde_json::Result<String> {
    let mut redacted = history.clone();
    match style {
        NameStyle::None => redacted.leaderboards = Leaderboards::new(),
        NameStyle::Hash => redacted.leaderboards = history.leaderboards.without_names(),
        NameStyle::Full => {}
    }
    serde_json::to_string_pretty(&redacted)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RatedItem<'a> {
    description: &'static str,
    value: u64,
    unit: &'static str,
    prefixes: &'static str,
    reasonable_value: f64,
    level_of_concern: f64,
    stars: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    overflow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_description: Option<&'a str>,
}

/// Rows in display order, serialized as a single JSON object
struct RatedItems<'a>(Vec<(&'static str, RatedItem<'a>)>);

impl Serialize for RatedItems<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, item) in &self.0 {
            map.serialize_entry(key, item)?;
        }
        map.end()
    }
}

/// Threshold-filtered rating of every metric in `history`
pub fn json_v2(
    history: &HistorySize,
    threshold: Threshold,
    style: NameStyle,
    scale: &ConcernScale,
) -> serde_json::Result<String> {
    let sections = layout();
    let mut rows = Vec::new();

    for item in sections.iter().flat_map(|s| s.items()) {
        let rating = item.rate(history, scale);
        if !threshold.admits(rating.severity) {
            continue;
        }

        let offender = match style {
            NameStyle::None => None,
            _ => item.offender(history),
        };
        let object_description = match style {
            NameStyle::Full => offender.and_then(|e| e.name.as_deref()),
            _ => None,
        };

        rows.push((
            item.metric.key(),
            RatedItem {
                description: item.description,
                value: rating.value,
                unit: item.unit,
                prefixes: item.prefixes.as_str(),
                reasonable_value: scale.reasonable(item.metric),
                level_of_concern: rating.level,
                stars: rating.severity,
                overflow: rating.overflow,
                object_name: offender.map(|e| e.id.to_string()),
                object_description,
            },
        ));
    }

    serde_json::to_string_pretty(&RatedItems(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlobSize, Count32};
    use gix::ObjectId;
    use serde_json::Value;

    fn sample() -> HistorySize {
        let mut h = HistorySize::new();
        h.record_blob(
            ObjectId::from([3; 20]),
            &BlobSize { size: Count32::new(40_000_000) },
            Some("refs/heads/main:data.bin"),
        );
        h
    }

    #[test]
    fn test_v1_redacts_names() {
        let h = sample();
        let full: Value = serde_json::from_str(&json_v1(&h, NameStyle::Full).unwrap()).unwrap();
        assert_eq!(full["unique_blob_count"], 1);
        assert_eq!(
            full["leaderboards"]["blob_size"][0]["name"],
            "refs/heads/main:data.bin"
        );

        let hash: Value = serde_json::from_str(&json_v1(&h, NameStyle::Hash).unwrap()).unwrap();
        assert_eq!(hash["leaderboards"]["blob_size"][0]["id"], "03".repeat(20));
        assert!(hash["leaderboards"]["blob_size"][0].get("name").is_none());

        let none: Value = serde_json::from_str(&json_v1(&h, NameStyle::None).unwrap()).unwrap();
        assert_eq!(none["leaderboards"], serde_json::json!({}));
    }

    #[test]
    fn test_v2_filters_by_threshold() {
        let h = sample();
        let scale = ConcernScale::default();

        let out = json_v2(&h, Threshold::DEFAULT, NameStyle::Full, &scale).unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        let row = &v["maxBlobSize"];
        assert_eq!(row["value"], 40_000_000);
        assert_eq!(row["stars"], 2);
        assert_eq!(row["unit"], "B");
        assert_eq!(row["prefixes"], "binary");
        assert_eq!(row["objectName"], "03".repeat(20));
        assert_eq!(row["objectDescription"], "refs/heads/main:data.bin");

        let all: Value =
            serde_json::from_str(&json_v2(&h, Threshold::VERBOSE, NameStyle::None, &scale).unwrap())
                .unwrap();
        assert_eq!(all.as_object().unwrap().len(), 22);
        assert!(all["maxBlobSize"].get("objectName").is_none());
    }
}
