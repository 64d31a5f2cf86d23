//! Column encodings. Ids are hyphenated UUID text; timestamps are
//! fixed-width UTC RFC 3339 text with microseconds, so comparing the
//! strings compares the instants.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{types::Type, Row};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Current time at the precision the database keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Encodes the lower bound of a range. Sub-microsecond input is rounded up
/// so rows stored before `ts` do not match `created >= bound`.
pub fn encode_lower_bound(ts: &DateTime<Utc>) -> String {
    let sub_micro = i64::from(ts.timestamp_subsec_nanos() % 1_000);
    if sub_micro == 0 {
        return encode_ts(ts);
    }
    encode_ts(&(*ts + chrono::Duration::nanoseconds(1_000 - sub_micro)))
}

pub fn encode_id(id: &Uuid) -> String {
    id.hyphenated().to_string()
}

pub fn encode_opt_id(id: Option<&Uuid>) -> Option<String> {
    id.map(encode_id)
}

pub fn id_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub fn opt_id_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        Uuid::parse_str(&s).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
        })
    })
    .transpose()
}

pub fn ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// `?1, ?2, ...` starting at `first`.
pub fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_are_fixed_width() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(encode_ts(&a), "2024-01-02T03:04:05.000000Z");
        let b = a + chrono::Duration::microseconds(7);
        assert_eq!(encode_ts(&b), "2024-01-02T03:04:05.000007Z");
        assert!(encode_ts(&a) < encode_ts(&b));
    }

    #[test]
    fn lower_bounds_round_up_to_the_microsecond() {
        let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(encode_lower_bound(&a), "2024-01-02T03:04:05.000000Z");
        let b = a + chrono::Duration::nanoseconds(400);
        assert_eq!(encode_ts(&b), "2024-01-02T03:04:05.000000Z");
        assert_eq!(encode_lower_bound(&b), "2024-01-02T03:04:05.000001Z");
        let c = a + chrono::Duration::nanoseconds(999_999_500);
        assert_eq!(encode_lower_bound(&c), "2024-01-02T03:04:06.000000Z");
    }

    #[test]
    fn now_roundtrips_through_text() {
        let t = now();
        let parsed = DateTime::parse_from_rfc3339(&encode_ts(&t))
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, t);
    }

    #[test]
    fn placeholders_are_numbered() {
        assert_eq!(placeholders(3, 3), "?3, ?4, ?5");
        assert_eq!(placeholders(1, 0), "");
    }

    #[test]
    fn decodes_ids_and_rejects_garbage() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        let decoded = conn
            .query_row("SELECT ?1", [encode_id(&id)], |row| id_at(row, 0))
            .unwrap();
        assert_eq!(decoded, id);

        let none = conn
            .query_row("SELECT NULL", [], |row| opt_id_at(row, 0))
            .unwrap();
        assert!(none.is_none());

        let err = conn
            .query_row("SELECT 'not-a-uuid'", [], |row| id_at(row, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, _)
        ));
    }
}
