#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

static ENVIRONMENTS: phf::Map<&'static str, Env> = phf::phf_map! {
    "matrix" => Env::Matrix,
    "pmatrix" => Env::PMatrix,
    "bmatrix" => Env::BMatrix,
    "Bmatrix" => Env::Bmatrix,
    "vmatrix" => Env::VMatrix,
    "Vmatrix" => Env::Vmatrix,
    "smallmatrix" => Env::SmallMatrix,
    "cases" => Env::Cases,
    "aligned" => Env::Aligned,
    "gathered" => Env::Gathered,
};

/// A table-like environment, as in `\begin{pmatrix} ... \end{pmatrix}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Env {
    Matrix,
    PMatrix,
    BMatrix,
    Bmatrix,
    VMatrix,
    Vmatrix,
    SmallMatrix,
    Cases,
    Aligned,
    Gathered,
}

impl Env {
    pub fn from_str(s: &str) -> Option<Self> {
        ENVIRONMENTS.get(s).copied()
    }

    pub fn as_str(&self) -> &'static str {
        ENVIRONMENTS
            .entries()
            .find_map(|(k, v)| if v == self { Some(*k) } else { None })
            .unwrap_or("unknown")
    }

    /// Whether cells may be separated with `&`.
    #[inline]
    pub fn allows_columns(&self) -> bool {
        !matches!(self, Env::Gathered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for (name, env) in ENVIRONMENTS.entries() {
            assert_eq!(Env::from_str(name), Some(*env));
            assert_eq!(env.as_str(), *name);
        }
        assert_eq!(Env::from_str("array"), None);
    }

    #[test]
    fn columns() {
        assert!(Env::Cases.allows_columns());
        assert!(Env::PMatrix.allows_columns());
        assert!(!Env::Gathered.allows_columns());
    }
}
