//! Numbers that arrive either as JSON numbers or as decimal strings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(f64),
    Str(String),
}

impl NumOrStr {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Num(n) => Ok(n),
            Self::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid number {s:?}"))),
        }
    }
}

pub(crate) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    NumOrStr::deserialize(d)?.into_f64()
}

pub(crate) fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Option::<NumOrStr>::deserialize(d)?
        .map(NumOrStr::into_f64)
        .transpose()
}

pub(crate) fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = number(d)?;
    if n.fract() != 0.0 || n < 0.0 || n > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!("expected a non-negative integer, got {n}")));
    }
    Ok(n as u32)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "super::number")]
        start: f64,
        #[serde(default, deserialize_with = "super::opt_number")]
        end: Option<f64>,
        #[serde(default, deserialize_with = "super::integer")]
        width: u32,
    }

    #[test]
    fn numbers_and_strings_both_parse() {
        let p: Probe = serde_json::from_str(r#"{"start": "12.30", "end": 14.5, "width": "1920"}"#).unwrap();
        assert_eq!(p.start, 12.3);
        assert_eq!(p.end, Some(14.5));
        assert_eq!(p.width, 1920);

        let p: Probe = serde_json::from_str(r#"{"start": 0}"#).unwrap();
        assert_eq!(p.end, None);
        assert_eq!(p.width, 0);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"start": "soon"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"start": 1, "width": 1.5}"#).is_err());
    }
}
