//! `warden files` — show include references and how they resolve.

use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

use warden_core::resolver;

use crate::context::Context;

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "layer")]
    layer: String,
    #[tabled(rename = "reference")]
    reference: String,
    #[tabled(rename = "resolves to")]
    resolved: String,
}

pub fn run(ctx: &Context) -> Result<()> {
    let resolutions = resolver::resolve(&ctx.snapshot);
    if resolutions.is_empty() {
        println!("No include files declared. Add a `files:` list to a warden.yaml layer.");
        return Ok(());
    }

    let rows: Vec<FileRow> = resolutions
        .into_iter()
        .map(|r| FileRow {
            layer: r.layer.to_string(),
            reference: r.reference.display().to_string(),
            resolved: r
                .resolved
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(missing)".to_string()),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
