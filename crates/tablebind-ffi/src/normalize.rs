//! Whitespace normalization for raw declaration text.

/// Collapse every run of whitespace to a single space and trim both ends.
///
/// All other characters keep their relative order, so the result is
/// idempotent: normalizing normalized text returns it unchanged.
pub fn normalize_declaration(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_inner_runs() {
        assert_eq!(
            normalize_declaration("int   db_{0}_store(    uint64_t scope,\tuint64_t table)"),
            "int db_{0}_store( uint64_t scope, uint64_t table)"
        );
    }

    #[test]
    fn trims_and_joins_lines() {
        assert_eq!(
            normalize_declaration("\n  void db_{0}_remove(\n    int iterator\n);  \n"),
            "void db_{0}_remove( int iterator );"
        );
    }

    #[test]
    fn idempotent() {
        let once = normalize_declaration("  int  db_{0}_next( int iterator, uint64_t* primary  );");
        assert_eq!(normalize_declaration(&once), once);
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(normalize_declaration(""), "");
        assert_eq!(normalize_declaration(" \t\n "), "");
    }

    #[test]
    fn punctuation_untouched() {
        assert_eq!(normalize_declaration("a*b,c(d)"), "a*b,c(d)");
    }
}
