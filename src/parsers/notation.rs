//! Lexical fixups for ion charge notation. The source pages render charges
//! with stray spaces (`Ca 2 +`, `SO 4 2 -`); these rules join them back up.
//! Regex rules run first, then the exact-string table, each on the output of
//! the previous step.

use once_cell::sync::Lazy;
use regex::Regex;

static ION_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(Al|Ba|Ca|Co|Cr|Cu|Fe|Hg|Mg|Mn|Ni|Pb|Sn|Zn)\s*(\d)\s*\+")
                .expect("Invalid cation regex"),
            "${1}${2}+",
        ),
        (
            Regex::new(r"\b(O|S)\s*2\s*-(\s|$)").expect("Invalid anion regex"),
            "${1}2-${2}",
        ),
        (
            Regex::new(r"\b(Na|K|Li|Ag)\s+\+(\s+ions?\b)").expect("Invalid monovalent cation regex"),
            "${1}+${2}",
        ),
        (
            Regex::new(r"\b(Cl|Br|F|OH)\s+-(\s+ions?\b)").expect("Invalid monovalent anion regex"),
            "${1}-${2}",
        ),
    ]
});

const ION_FIXUPS: &[(&str, &str)] = &[
    ("NH 4 +", "NH4+"),
    ("NH4 +", "NH4+"),
    ("H 3 O +", "H3O+"),
    ("NO 3 -", "NO3-"),
    ("NO3 -", "NO3-"),
    ("SO 4 2 -", "SO4 2-"),
    ("SO4 2 -", "SO4 2-"),
    ("SO4 2-", "SO42-"),
    ("CO 3 2 -", "CO3 2-"),
    ("CO3 2 -", "CO3 2-"),
    ("CO3 2-", "CO32-"),
    ("PO 4 3 -", "PO4 3-"),
    ("PO4 3 -", "PO4 3-"),
    ("PO4 3-", "PO43-"),
];

pub fn fix_ion_notation(text: &str) -> String {
    let mut fixed = text.to_string();
    for (pattern, replacement) in ION_RULES.iter() {
        fixed = pattern.replace_all(&fixed, *replacement).into_owned();
    }
    for (from, to) in ION_FIXUPS {
        if fixed.contains(from) {
            fixed = fixed.replace(from, to);
        }
    }
    fixed
}
