use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Accepted aliases per semantic field, in order of preference
// ---------------------------------------------------------------------------

pub const LATITUDE_ALIASES: &[&str] = &["latitude", "lat", "y"];
pub const LONGITUDE_ALIASES: &[&str] = &["longitude", "lon", "lng", "x"];
pub const MAGNITUDE_ALIASES: &[&str] = &["mag", "magnitude", "m"];
pub const TIME_ALIASES: &[&str] = &["time", "datetime", "date", "time_utc"];
pub const PLACE_ALIASES: &[&str] = &["place", "location", "location_name"];

/// Source column index chosen for each semantic field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
    pub magnitude: Option<usize>,
    pub time: Option<usize>,
    pub place: Option<usize>,
}

impl ResolvedColumns {
    pub fn resolve(columns: &[String]) -> Self {
        let lowered = lowercase_index(columns);
        Self {
            latitude: find_first_column(&lowered, LATITUDE_ALIASES),
            longitude: find_first_column(&lowered, LONGITUDE_ALIASES),
            magnitude: find_first_column(&lowered, MAGNITUDE_ALIASES),
            time: find_first_column(&lowered, TIME_ALIASES),
            place: find_first_column(&lowered, PLACE_ALIASES),
        }
    }
}

/// Lowercased name → source index. Later columns win when names differ only by case.
fn lowercase_index(columns: &[String]) -> HashMap<String, usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.to_lowercase(), i))
        .collect()
}

fn find_first_column(lowered: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| lowered.get(*alias).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Name of the column chosen for a field.
    fn resolve_column<'a>(columns: &'a [String], aliases: &[&str]) -> Option<&'a str> {
        find_first_column(&lowercase_index(columns), aliases).map(|i| columns[i].as_str())
    }

    #[test]
    fn matches_any_case() {
        let c = cols(&["LAT", "Lon", "Mag"]);
        assert_eq!(resolve_column(&c, LATITUDE_ALIASES), Some("LAT"));
        assert_eq!(resolve_column(&c, LONGITUDE_ALIASES), Some("Lon"));
        assert_eq!(resolve_column(&c, MAGNITUDE_ALIASES), Some("Mag"));
        assert_eq!(resolve_column(&c, TIME_ALIASES), None);
    }

    #[test]
    fn alias_order_beats_column_order() {
        // "y" appears first in the source but "latitude" is the preferred alias.
        let c = cols(&["y", "x", "latitude", "lng"]);
        let r = ResolvedColumns::resolve(&c);
        assert_eq!(r.latitude, Some(2));
        assert_eq!(r.longitude, Some(3));

        let c = cols(&["magnitude", "mag"]);
        assert_eq!(resolve_column(&c, MAGNITUDE_ALIASES), Some("mag"));
    }

    #[test]
    fn every_alias_is_recognised() {
        for alias in LATITUDE_ALIASES {
            let c = cols(&["id", &alias.to_uppercase()]);
            assert_eq!(ResolvedColumns::resolve(&c).latitude, Some(1), "{alias}");
        }
        for alias in LONGITUDE_ALIASES {
            let c = cols(&[alias]);
            assert_eq!(ResolvedColumns::resolve(&c).longitude, Some(0), "{alias}");
        }
        for alias in TIME_ALIASES.iter().chain(PLACE_ALIASES) {
            let c = cols(&[alias]);
            let r = ResolvedColumns::resolve(&c);
            assert!(r.time.is_some() || r.place.is_some(), "{alias}");
        }
    }

    #[test]
    fn case_duplicates_resolve_to_last() {
        let c = cols(&["Lat", "LAT"]);
        assert_eq!(resolve_column(&c, LATITUDE_ALIASES), Some("LAT"));
    }

    #[test]
    fn no_partial_matches() {
        let c = cols(&["latitude_deg", "long", "magnitude_type", "updated"]);
        assert_eq!(ResolvedColumns::resolve(&c), ResolvedColumns::default());
    }
}
