use nu_ansi_term::Color::{Cyan, Green};
use serde::Serialize;
use sieve_core::{FilterResult, Operator, ValueShape};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::utils::Colored;

#[derive(Serialize)]
struct OperatorInfo {
    name: &'static str,
    alias: &'static str,
    value: ValueShape,
    sql: &'static str,
}

pub fn list_operators(json: bool) -> FilterResult<()> {
    if json {
        let operators: Vec<_> = Operator::ALL
            .into_iter()
            .map(|op| OperatorInfo {
                name: op.name(),
                alias: op.alias(),
                value: op.shape(),
                sql: op.sql_template(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&operators)?);
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record(["Operator", "Alias", "Value", "SQL"]);

    for op in Operator::ALL {
        let alias = if op.alias() == op.name() {
            String::new()
        } else {
            op.alias().to_string()
        };
        builder.push_record([
            Colored(Green, op.name()).to_string(),
            alias,
            op.shape().describe().to_string(),
            Colored(Cyan, op.sql_template()).to_string(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header("Filter Operators"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
    info!(
        "Plus {}: a callback that runs whenever the key is present",
        Colored(Green, "custom")
    );

    Ok(())
}
