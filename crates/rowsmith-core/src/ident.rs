/// Quote an identifier with square brackets, doubling any closing bracket.
pub fn bracket(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Two-part `[schema].[name]` reference.
pub fn qualified_name(schema: &str, name: &str) -> String {
    format!("{}.{}", bracket(schema), bracket(name))
}
