//! Macros generating the arithmetic, ordering and text form shared by
//! every score type.

/// Level-wise `Add`, `Sub` and `Neg`, plus lexicographic ordering over
/// the listed fields.
macro_rules! impl_level_arithmetic {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                $type::$ctor($(self.$field + rhs.$field),+)
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                $type::$ctor($(self.$field - rhs.$field),+)
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor($(-self.$field),+)
            }
        }

        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                ($(self.$field,)+).cmp(&($(other.$field,)+))
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }
    };
}

// Parses one level, optionally stripping its label suffix.
pub(crate) fn parse_level<N>(
    text: &str,
    label: Option<&'static str>,
) -> Result<N, crate::score::ScoreParseError>
where
    N: std::str::FromStr,
    N::Err: std::fmt::Display,
{
    let text = text.trim();
    let number = match label {
        Some(label) => text.strip_suffix(label).ok_or_else(|| {
            crate::score::ScoreParseError::MissingLabel {
                text: text.to_string(),
                label,
            }
        })?,
        None => text,
    };
    number
        .parse::<N>()
        .map_err(|err| crate::score::ScoreParseError::InvalidNumber {
            text: text.to_string(),
            reason: err.to_string(),
        })
}

/// `ParseableScore` and `Display` for the `"<n>label/<n>label"` text form.
macro_rules! impl_labeled_text {
    ($type:ident { $($field:ident => $label:literal),+ }: $num:ty => $ctor:ident) => {
        impl $crate::score::ParseableScore for $type {
            fn parse(text: &str) -> Result<Self, $crate::score::ScoreParseError> {
                const LABELS: &[&str] = &[$($label),+];
                let trimmed = text.trim();
                let mut levels = trimmed.split('/');
                let count = trimmed.split('/').count();
                if count != LABELS.len() {
                    return Err($crate::score::ScoreParseError::LevelCount {
                        score_type: stringify!($type),
                        text: trimmed.to_string(),
                        expected: LABELS.len(),
                    });
                }
                $(
                    let $field: $num = $crate::score::macros::parse_level(
                        levels.next().unwrap_or_default(),
                        Some($label),
                    )?;
                )+
                Ok($type::$ctor($($field),+))
            }

            fn to_string_repr(&self) -> String {
                self.to_string()
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let levels = [$(format!("{}{}", self.$field, $label)),+];
                f.write_str(&levels.join("/"))
            }
        }
    };
}

/// Declares a single-level score over the given numeric type.
///
/// The generated type is always feasible, parses from a bare number and
/// multiplies by its own numeric type.
macro_rules! simple_score_type {
    ($(#[$meta:meta])* $type:ident($num:ty), zero: $zero:expr, one: $one:expr, to_f64: $to_f64:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $type {
            score: $num,
        }

        impl $type {
            pub const ZERO: $type = $type { score: $zero };

            /// A score of 1, the usual constraint weight.
            pub const ONE: $type = $type { score: $one };

            #[inline]
            pub const fn of(score: $num) -> Self {
                $type { score }
            }

            #[inline]
            pub const fn score(&self) -> $num {
                self.score
            }
        }

        impl $crate::score::Score for $type {
            type Multiplier = $num;

            fn zero() -> Self {
                $type::ZERO
            }

            fn is_feasible(&self) -> bool {
                true
            }

            fn levels_count() -> usize {
                1
            }

            fn feasible_levels_count() -> usize {
                0
            }

            fn to_level_numbers(&self) -> Vec<f64> {
                let to_f64: fn($num) -> f64 = $to_f64;
                vec![to_f64(self.score)]
            }

            fn multiply_by(&self, multiplier: $num) -> Self {
                $type::of(self.score * multiplier)
            }
        }

        impl_level_arithmetic!($type { score } => of);

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($type), self.score)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.score)
            }
        }

        impl $crate::score::ParseableScore for $type {
            fn parse(text: &str) -> Result<Self, $crate::score::ScoreParseError> {
                $crate::score::macros::parse_level::<$num>(text, None).map($type::of)
            }

            fn to_string_repr(&self) -> String {
                self.score.to_string()
            }
        }

        impl From<$num> for $type {
            fn from(score: $num) -> Self {
                $type::of(score)
            }
        }
    };
}
