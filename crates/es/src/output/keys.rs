//! Key and operator listing output formatting.

use expense_search_rs::{Operator, SearchKey};
use owo_colors::OwoColorize;
use serde::Serialize;

/// JSON output structure for the keys command.
#[derive(Serialize)]
pub struct KeysOutput {
    pub keys: Vec<&'static str>,
    pub operators: Vec<OperatorOutput>,
}

/// JSON output structure for a single operator.
#[derive(Serialize)]
pub struct OperatorOutput {
    pub name: &'static str,
    pub symbols: Vec<&'static str>,
    pub description: &'static str,
}

/// Returns every source spelling the parser accepts for `operator`.
fn operator_symbols(operator: Operator) -> Vec<&'static str> {
    match operator {
        Operator::Eq => vec![":", "="],
        other => vec![other.symbol()],
    }
}

fn operator_description(operator: Operator) -> &'static str {
    match operator {
        Operator::Eq => "equal to",
        Operator::Neq => "not equal to",
        Operator::Gte => "greater than or equal to",
        Operator::Gt => "greater than",
        Operator::Lte => "less than or equal to",
        Operator::Lt => "less than",
    }
}

/// Formats the keys and operators as JSON.
pub fn format_keys_json() -> Result<String, serde_json::Error> {
    let output = KeysOutput {
        keys: SearchKey::ALL.iter().map(|key| key.as_str()).collect(),
        operators: Operator::ALL
            .into_iter()
            .map(|operator| OperatorOutput {
                name: operator.as_str(),
                symbols: operator_symbols(operator),
                description: operator_description(operator),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats the keys and operators as a table.
pub fn format_keys_table(use_colors: bool) -> String {
    let mut output = String::new();

    push_header(&mut output, "Keys", use_colors);
    for key in SearchKey::ALL {
        output.push_str(&format!("  {}\n", key));
    }

    output.push('\n');
    push_header(&mut output, "Operators", use_colors);
    for operator in Operator::ALL {
        output.push_str(&format!(
            "  {:<6} {:<4} {}\n",
            operator_symbols(operator).join(" "),
            operator.as_str(),
            operator_description(operator)
        ));
    }

    output
}

fn push_header(output: &mut String, header: &str, use_colors: bool) {
    if use_colors {
        output.push_str(&format!("{}\n", header.green().bold()));
    } else {
        output.push_str(header);
        output.push('\n');
    }
}
