//! Canonical point-identity encoding.
//!
//! A point's identity is derived from its mile coordinate: the mile is scaled
//! to thousandths, rounded, zero-padded to a fixed width and concatenated with
//! the trail-code/alignment prefix, e.g. mile `2190.3` on the `at`/`main`
//! alignment becomes `at-main-mi2190300`. The codec is deterministic and
//! side-effect-free; detecting id collisions between distinct points is the
//! migration engine's job.

use thiserror::Error;

/// Miles are encoded at thousandth-of-a-mile resolution.
pub const MILE_SCALE: f64 = 1000.0;

/// Token width in digits. Seven digits cover miles up to 9999.999.
pub const TOKEN_WIDTH: usize = 7;

const TOKEN_LIMIT: i64 = 10_000_000;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Cannot encode non-finite mile value {0}")]
    NonFiniteMile(f64),

    #[error("Cannot encode negative mile value {0}")]
    NegativeMile(f64),

    #[error("Mile {mile} encodes to token {token}, which does not fit in {width} digits")]
    TokenOverflow { mile: f64, token: i64, width: usize },
}

/// Encodes mile coordinates into canonical point ids for one trail alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCodec {
    trail_code: String,
    alignment: String,
}

impl IdCodec {
    pub fn new(trail_code: &str, alignment: &str) -> Self {
        Self {
            trail_code: trail_code.to_string(),
            alignment: alignment.to_string(),
        }
    }

    /// The prefix shared by every id this codec produces, e.g. `at-main-mi`.
    pub fn prefix(&self) -> String {
        format!("{}-{}-mi", self.trail_code, self.alignment)
    }

    /// Encodes a mile coordinate into its canonical id.
    ///
    /// # Errors
    ///
    /// Fails for non-finite or negative miles, and for miles whose scaled
    /// token exceeds [`TOKEN_WIDTH`] digits.
    pub fn encode(&self, mile: f64) -> Result<String, IdentityError> {
        if !mile.is_finite() {
            return Err(IdentityError::NonFiniteMile(mile));
        }
        if mile < 0.0 {
            return Err(IdentityError::NegativeMile(mile));
        }
        let token = (mile * MILE_SCALE).round() as i64;
        if token >= TOKEN_LIMIT {
            return Err(IdentityError::TokenOverflow {
                mile,
                token,
                width: TOKEN_WIDTH,
            });
        }
        Ok(format!(
            "{}-{}-mi{:0width$}",
            self.trail_code,
            self.alignment,
            token,
            width = TOKEN_WIDTH
        ))
    }

    /// Whether `id` already follows this codec's canonical format.
    pub fn is_canonical(&self, id: &str) -> bool {
        let prefix = self.prefix();
        match id.strip_prefix(&prefix) {
            Some(token) => {
                token.len() == TOKEN_WIDTH && token.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> IdCodec {
        IdCodec::new("at", "main")
    }

    #[test]
    fn encodes_known_mile() {
        let id = codec().encode(2190.3).unwrap();
        assert_eq!(id, "at-main-mi2190300");
    }

    #[test]
    fn zero_pads_small_miles() {
        assert_eq!(codec().encode(0.0).unwrap(), "at-main-mi0000000");
        assert_eq!(codec().encode(1.5).unwrap(), "at-main-mi0001500");
    }

    #[test]
    fn is_deterministic() {
        let codec = codec();
        assert_eq!(codec.encode(123.456).unwrap(), codec.encode(123.456).unwrap());
    }

    #[test]
    fn distinct_miles_encode_distinctly() {
        let codec = codec();
        let mut seen = std::collections::HashSet::new();
        let mut mile = 0.0;
        while mile < 50.0 {
            assert!(seen.insert(codec.encode(mile).unwrap()), "collision at mile {mile}");
            // Step matches the codec resolution, so every mile is distinct.
            mile += 0.001;
            mile = (mile * 1000.0).round() / 1000.0;
        }
    }

    #[test]
    fn rejects_non_finite_miles() {
        assert!(matches!(
            codec().encode(f64::NAN),
            Err(IdentityError::NonFiniteMile(_))
        ));
        assert!(matches!(
            codec().encode(f64::INFINITY),
            Err(IdentityError::NonFiniteMile(_))
        ));
    }

    #[test]
    fn rejects_negative_miles() {
        assert!(matches!(
            codec().encode(-0.5),
            Err(IdentityError::NegativeMile(_))
        ));
    }

    #[test]
    fn rejects_overflowing_miles() {
        assert!(matches!(
            codec().encode(10_000.0),
            Err(IdentityError::TokenOverflow { .. })
        ));
    }

    #[test]
    fn recognizes_canonical_ids() {
        let codec = codec();
        assert!(codec.is_canonical("at-main-mi2190300"));
        assert!(codec.is_canonical("at-main-mi0000000"));
        assert!(!codec.is_canonical("at-main-mi219030")); // too short
        assert!(!codec.is_canonical("at-main-mi21903000")); // too long
        assert!(!codec.is_canonical("at-blue-mi2190300")); // wrong alignment
        assert!(!codec.is_canonical("SpringerMtn"));
        assert!(!codec.is_canonical("at-main-miXXXXXXX"));
    }
}
