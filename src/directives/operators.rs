//! Operator alias table.

/// Short mnemonics accepted in filter descriptions and their canonical tokens
pub const OPERATOR_ALIASES: &[(&str, &str)] = &[
    ("eq", "="),
    ("neq", "<>"),
    ("gt", ">"),
    ("gte", ">="),
    ("lt", "<"),
    ("lte", "<="),
    ("nlike", "not like"),
    ("nin", "not in"),
    ("notnull", "not null"),
    ("nn", "not null"),
    ("inq", "in"),
];

/// Resolve an operator token to its canonical form.
///
/// Lookup is case-insensitive and exact; tokens outside the table pass through
/// lower-cased. Resolving a canonical token returns it unchanged.
pub fn resolve(token: &str) -> String {
    OPERATOR_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(token))
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| token.to_lowercase())
}
