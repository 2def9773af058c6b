//! Poll intervals in the `"1mins 30secs"` format used in config files.

use chrono::Duration;
use serde::Deserialize;

use crate::error::Error;

pub fn duration_pretty(d: Duration) -> String {
    let mut seconds = d.num_seconds();
    let minutes = d.num_minutes();

    if minutes > 0 {
        seconds -= minutes * 60;
    }
    format!("{minutes}mins {seconds}secs")
}

/// Parses `"{m}mins {s}secs"`. Either part may be left out, `"10secs"` and
/// `"2mins"` are fine too. The result must be longer than zero.
pub fn duration_parse(s: &str) -> Result<Duration, Error> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::DurationParse("empty duration".to_string()));
    }

    let mut result = Duration::zero();
    for part in s.split_whitespace() {
        let (amount, unit) = part
            .find(|c: char| !c.is_ascii_digit())
            .map(|idx| part.split_at(idx))
            .ok_or_else(|| Error::DurationParse(format!("missing unit in {s:?}")))?;
        let amount: i64 = amount
            .parse()
            .map_err(|_| Error::DurationParse(format!("unable to parse amount in {s:?}")))?;
        result = result
            + match unit {
                "mins" | "min" | "m" => Duration::minutes(amount),
                "secs" | "sec" | "s" => Duration::seconds(amount),
                _ => {
                    return Err(Error::DurationParse(format!(
                        "unknown unit {unit:?} in {s:?}"
                    )))
                }
            };
    }

    if result <= Duration::zero() {
        return Err(Error::DurationParse(format!("{s:?} is not a positive duration")));
    }

    Ok(result)
}

pub fn serialize<S>(arg: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&duration_pretty(*arg))
}

pub fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    duration_parse(&String::deserialize(d)?)
        .map_err(|err| serde::de::Error::custom(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_durations() {
        assert_eq!(duration_parse("1mins 30secs").unwrap(), Duration::seconds(90));
        assert_eq!(duration_parse("0mins 10secs").unwrap(), Duration::seconds(10));
        assert_eq!(duration_parse("10secs").unwrap(), Duration::seconds(10));
        assert_eq!(duration_parse(" 2mins ").unwrap(), Duration::minutes(2));
        assert!(duration_parse("").is_err());
        assert!(duration_parse("10").is_err());
        assert!(duration_parse("10hours").is_err());
        assert!(duration_parse("xsecs").is_err());
    }

    #[test]
    fn zero_is_rejected() {
        assert!(matches!(
            duration_parse("0secs"),
            Err(Error::DurationParse(_))
        ));
        assert!(duration_parse("0mins 0secs").is_err());
    }

    #[test]
    fn pretty_print() {
        assert_eq!(duration_pretty(Duration::seconds(90)), "1mins 30secs");
        assert_eq!(duration_pretty(Duration::seconds(10)), "0mins 10secs");
        assert_eq!(
            duration_parse(&duration_pretty(Duration::seconds(754))).unwrap(),
            Duration::seconds(754)
        );
    }
}
