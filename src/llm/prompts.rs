//! The three fixed prompt templates. Pure string substitution: nothing here
//! validates the filled prompt, so injection-style user input passes through
//! verbatim and the downstream gate is the only guard.

use serde_json::Value;

/// The demo schema is fixed; the model never sees live catalog metadata.
pub const SCHEMA_TEXT: &str = "\
Schema:
- departments(id, name)
- employees(id, name, department_id, email, salary)
- products(id, name, price)
- orders(id, customer_name, employee_id, order_total, order_date)

Relationships:
- employees.department_id -> departments.id
- orders.employee_id -> employees.id";

pub fn generation_prompt(user_query: &str) -> String {
    format!(
        r#"You are an expert SQL generator. Only generate SELECT queries based on the following schema.

{schema}

DO NOT generate any DELETE, UPDATE, INSERT or DDL queries.
Return only a SELECT query that answers the user's question.

The user may ask in any natural language; understand the question in whatever language it arrives and still produce SQL for the schema above.

User input: {user_query}"#,
        schema = SCHEMA_TEXT,
        user_query = user_query
    )
}

pub fn validation_prompt(sql_query: &str) -> String {
    format!(
        r#"You are a SQL inspector responsible for keeping a database untouched; only reading of data is allowed.
Check the following SQL query and tell if it is a pure SELECT query with no DML or DDL actions.
Respond in JSON like: {{"safe_to_run": "yes"}} or {{"safe_to_run": "no"}}
SQL Query: {sql_query}"#,
        sql_query = sql_query
    )
}

/// Builds the narration prompt. The full result set is embedded with no
/// truncation; very large results are bounded only by the service's own
/// input limits.
pub fn explanation_prompt(
    user_query: &str,
    sql: &str,
    columns: &[String],
    rows: &[Vec<Value>],
) -> String {
    format!(
        r#"You are an expert data analyst summarizing a query result.

A user asked: "{user_query}"

Based on the following schema:
{schema}

The generated SQL was:
{sql}

And the output of the query was:
Columns: {columns}
Data: {rows}

Explain this result in simple and clear language, in the same natural language the user used for the question (English question, English answer; Hindi question, Hindi answer; and so on). Mention what the result represents in relation to the user's original question."#,
        user_query = user_query,
        schema = SCHEMA_TEXT,
        sql = sql,
        columns = serde_json::to_string(columns).unwrap_or_else(|_| "[]".to_string()),
        rows = serde_json::to_string(rows).unwrap_or_else(|_| "[]".to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_prompt_embeds_question_and_schema() {
        let prompt = generation_prompt("list all employees in Engineering");
        assert!(prompt.contains("list all employees in Engineering"));
        assert!(prompt.contains("departments(id, name)"));
        assert!(prompt.contains("Only generate SELECT queries"));
    }

    #[test]
    fn validation_prompt_demands_json_verdict() {
        let prompt = validation_prompt("SELECT 1");
        assert!(prompt.contains(r#"{"safe_to_run": "yes"}"#));
        assert!(prompt.contains("SQL Query: SELECT 1"));
    }

    #[test]
    fn explanation_prompt_carries_full_result_set() {
        let columns = vec!["name".to_string()];
        let rows = vec![
            vec![Value::String("Ada".into())],
            vec![Value::String("Grace".into())],
        ];
        let prompt = explanation_prompt("who works here?", "SELECT name FROM employees", &columns, &rows);
        assert!(prompt.contains("SELECT name FROM employees"));
        assert!(prompt.contains("Ada"));
        assert!(prompt.contains("Grace"));
        assert!(prompt.contains("who works here?"));
    }
}
