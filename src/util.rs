use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Query parameter carrying the API key.
pub(crate) const CREDENTIAL_PARAM: &str = "appid";
/// Replaces the credential value in diagnostics.
pub(crate) const REDACTED: &str = "***";

/// Joins `path` onto `base`. Services hosted elsewhere (the bulk city list)
/// declare an absolute URL, which is used as is.
pub(crate) fn urljoin(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Renders a coordinate keeping at least one decimal (`45.0`, not `45`).
///
/// The pollution endpoints derive their search radius from the number of
/// decimals, so a whole number must not lose its fractional part.
pub(crate) fn format_coordinate(value: f64) -> String {
    format!("{value:?}")
}

/// Renders `k=v&k=v` in declared order, masking the credential value.
pub(crate) fn redacted_query(params: &[(String, String)]) -> String {
    let mut out = String::new();
    for (i, (k, v)) in params.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(k);
        out.push('=');
        if k == CREDENTIAL_PARAM {
            out.push_str(REDACTED);
        } else {
            out.push_str(v);
        }
    }
    out
}

/// Converts UNIX seconds (integral or fractional) to a UTC instant.
pub fn datetime_from_timestamp(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).round() as u32;
    // Rounding can carry a full second.
    let (secs, nanos) = if nanos >= 1_000_000_000 {
        (secs as i64 + 1, 0)
    } else {
        (secs as i64, nanos)
    };
    DateTime::from_timestamp(secs, nanos)
}

/// Parses an ISO-8601 date-time. Values without an offset are taken as UTC.
///
/// Accepts RFC 3339 (`2016-12-25T01:04:08Z`, `2017-06-21T12:00:00+02:00`),
/// naive date-times (`2017-06-21T12:00:00`, `2017-06-21 12:00:00`) and plain
/// dates (`2017-06-21`, midnight UTC).
pub fn datetime_from_iso8601(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = value.strip_suffix('Z').unwrap_or(value);
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Canonical text form of instants inside normalized records.
pub(crate) fn format_instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn coordinates_keep_a_decimal() {
        assert_eq!(format_coordinate(45.0), "45.0");
        assert_eq!(format_coordinate(-10.0), "-10.0");
        assert_eq!(format_coordinate(12.52859), "12.52859");
        assert_eq!(format_coordinate(-122.37), "-122.37");
    }

    #[test]
    fn urljoin_relative_and_absolute() {
        assert_eq!(
            urljoin("https://api.openweathermap.org", "/data/2.5/weather"),
            "https://api.openweathermap.org/data/2.5/weather"
        );
        assert_eq!(
            urljoin("http://h/pollution/v1/co/", "0,10/current.json"),
            "http://h/pollution/v1/co/0,10/current.json"
        );
        assert_eq!(
            urljoin("https://h", "http://bulk.openweathermap.org/sample/city.list.json.gz"),
            "http://bulk.openweathermap.org/sample/city.list.json.gz"
        );
    }

    #[test]
    fn redacted_query_masks_only_the_key() {
        let params = vec![
            ("id".to_string(), "6434841".to_string()),
            ("appid".to_string(), "secret-key".to_string()),
            ("units".to_string(), "metric".to_string()),
        ];
        let q = redacted_query(&params);
        assert_eq!(q, "id=6434841&appid=***&units=metric");
        assert!(!q.contains("secret-key"));
        assert_eq!(redacted_query(&[]), "");
    }

    #[test]
    fn timestamp_round_trips_under_utc() {
        for ts in [0_i64, 1_485_799_200, 1_498_049_953, -86_400] {
            let dt = datetime_from_timestamp(ts as f64).expect("valid timestamp");
            assert_eq!(dt.timestamp(), ts);
            assert_eq!(dt.timezone(), Utc);
        }
    }

    #[test]
    fn fractional_timestamp_keeps_sub_seconds() {
        let dt = datetime_from_timestamp(1_485_799_200.5).unwrap();
        assert_eq!(dt.timestamp(), 1_485_799_200);
        assert_eq!(dt.nanosecond(), 500_000_000);
        assert!(datetime_from_timestamp(f64::NAN).is_none());
    }

    #[test]
    fn iso8601_variants() {
        let expected = Utc.with_ymd_and_hms(2016, 12, 25, 1, 4, 8).unwrap();
        assert_eq!(datetime_from_iso8601("2016-12-25T01:04:08Z"), Some(expected));
        assert_eq!(datetime_from_iso8601("2016-12-25T02:04:08+01:00"), Some(expected));
        assert_eq!(datetime_from_iso8601("2016-12-25T01:04:08"), Some(expected));
        assert_eq!(
            datetime_from_iso8601("2017-06-21"),
            Some(Utc.with_ymd_and_hms(2017, 6, 21, 0, 0, 0).unwrap())
        );
        assert_eq!(datetime_from_iso8601("yesterday"), None);
    }

    #[test]
    fn format_instant_is_rfc3339_utc() {
        let dt = Utc.with_ymd_and_hms(2017, 1, 30, 18, 0, 0).unwrap();
        assert_eq!(format_instant(&dt), "2017-01-30T18:00:00Z");
    }
}
