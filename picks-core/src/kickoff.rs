use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use picks_types::Fixture;

/// Kickoff assumed for fixtures that carry no usable time information.
const DEFAULT_KICKOFF: &str = "15:00:00";

/// Feeds that don't know the kickoff time send midnight; treat it as absent.
const ZERO_KICKOFF: &str = "00:00:00";

/// Resolve the instant a fixture kicks off.
///
/// A date string that already embeds a time is used directly. Otherwise a
/// present, non-sentinel kick-off time is appended to the date, and a
/// fixture with neither defaults to 15:00 on the fixture date. Unparseable
/// input yields None so one bad record can't poison deadline derivation.
pub fn effective_kickoff(fixture: &Fixture) -> Option<DateTime<Utc>> {
    let date = fixture.date.trim();
    if date.is_empty() {
        return None;
    }

    let candidate = if date.contains('T') || date.contains(':') {
        date.to_string()
    } else {
        let time = match fixture.kick_off_time.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() && t != ZERO_KICKOFF => t,
            _ => DEFAULT_KICKOFF,
        };
        format!("{}T{}", date, time)
    };

    let parsed = parse_instant(&candidate);
    if parsed.is_none() {
        warn!(
            home = %fixture.home_team,
            away = %fixture.away_team,
            date = %fixture.date,
            "fixture has an unparseable kickoff, excluding from deadline"
        );
    }
    parsed
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Bare forms the feeds actually send
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc())
}
