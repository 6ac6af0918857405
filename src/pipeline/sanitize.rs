use regex::Regex;

/// Strips markdown code-fence markers the generation model tends to emit
/// and trims surrounding whitespace. Lexical cleanup only: the result is
/// not parsed, and nothing here checks that it is valid SQL.
pub fn clean_sql(raw: &str) -> String {
    let fence = Regex::new(r"```(?:sql)?").unwrap();
    fence.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_sql_fences() {
        assert_eq!(
            clean_sql("```sql\nSELECT * FROM employees\n```"),
            "SELECT * FROM employees"
        );
    }

    #[test]
    fn strips_bare_fences() {
        assert_eq!(clean_sql("```\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn plain_text_is_only_trimmed() {
        assert_eq!(clean_sql("  SELECT id FROM orders  \n"), "SELECT id FROM orders");
    }

    #[test]
    fn does_not_validate_the_result() {
        // Non-SQL survives; rejecting it is the decision gate's job.
        assert_eq!(clean_sql("```sql\nDROP TABLE employees\n```"), "DROP TABLE employees");
        assert_eq!(clean_sql("I cannot answer that."), "I cannot answer that.");
    }
}
