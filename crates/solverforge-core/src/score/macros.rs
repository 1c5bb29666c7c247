//! Generates fixed-level score types.
//!
//! Every score is a list of `i64` levels, highest priority first, compared
//! lexicographically. The text form writes each level followed by its
//! suffix and joins the levels with `/`, e.g. `-1hard/-20soft`.

use super::traits::ScoreParseError;

/// Declares a score struct together with its arithmetic, `Score` impl,
/// text form and parser.
///
/// Fields are listed highest priority first, each with its `ScoreLevel`
/// label and its text suffix. Field order drives the derived `Ord`.
macro_rules! level_score {
    (
        $(#[$meta:meta])*
        $type:ident { $($field:ident : $label:ident => $suffix:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $type {
            $($field: i64),+
        }

        impl $type {
            /// Creates a score from its levels, highest priority first.
            #[inline]
            pub const fn of($($field: i64),+) -> Self {
                $type { $($field),+ }
            }

            $(
                #[inline]
                pub const fn $field(&self) -> i64 {
                    self.$field
                }
            )+
        }

        impl $crate::score::Score for $type {
            #[inline]
            fn zero() -> Self {
                $type { $($field: 0),+ }
            }

            fn is_feasible(&self) -> bool {
                self.to_level_numbers()[0] >= 0
            }

            fn levels_count() -> usize {
                [$(stringify!($field)),+].len()
            }

            fn to_level_numbers(&self) -> Vec<i64> {
                vec![$(self.$field),+]
            }

            fn level_label(index: usize) -> Option<$crate::score::ScoreLevel> {
                [$($crate::score::ScoreLevel::$label),+].get(index).copied()
            }

            #[inline]
            fn scale(&self, factor: i64) -> Self {
                $type { $($field: self.$field * factor),+ }
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            #[inline]
            fn add(self, other: Self) -> Self {
                $type { $($field: self.$field + other.$field),+ }
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            #[inline]
            fn sub(self, other: Self) -> Self {
                $type { $($field: self.$field - other.$field),+ }
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                $type { $($field: -self.$field),+ }
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let levels = [$(format!("{}{}", self.$field, $suffix)),+];
                f.write_str(&levels.join("/"))
            }
        }

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($type), self)
            }
        }

        impl $crate::score::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::ScoreParseError> {
                let mut parts = s.trim().split('/');
                $(
                    let $field = $crate::score::macros::parse_level(
                        stringify!($type),
                        parts.next(),
                        $suffix,
                    )?;
                )+
                match parts.next() {
                    None => Ok($type { $($field),+ }),
                    Some(_) => Err($crate::score::ScoreParseError {
                        message: format!(
                            "{} takes {} level(s), got '{}'",
                            stringify!($type),
                            <$type as $crate::score::Score>::levels_count(),
                            s.trim()
                        ),
                    }),
                }
            }

            fn to_string_repr(&self) -> String {
                self.to_string()
            }
        }
    };
}

/// Reads one `<int><suffix>` level of a score string.
pub(crate) fn parse_level(
    score_type: &str,
    part: Option<&str>,
    suffix: &str,
) -> Result<i64, ScoreParseError> {
    let part = part.map(str::trim).ok_or_else(|| ScoreParseError {
        message: format!("{} is missing its '{}' level", score_type, suffix),
    })?;
    let digits = part.strip_suffix(suffix).ok_or_else(|| ScoreParseError {
        message: format!("{} level '{}' must end with '{}'", score_type, part, suffix),
    })?;
    digits.trim().parse::<i64>().map_err(|e| ScoreParseError {
        message: format!("{} level '{}': {}", score_type, part, e),
    })
}
