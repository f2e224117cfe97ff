use crate::app::catalog::Catalog;
use crate::domain::model::{EntryInfo, PluginRow};
use crate::utils::error::{RegistryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

pub async fn list(catalog: &Catalog, format: OutputFormat) -> Result<String> {
    let loaded = catalog.host().loaded().await;
    let rows: Vec<PluginRow> = catalog
        .host()
        .registry()
        .entries()
        .iter()
        .map(|info| PluginRow::from_entry(info, loaded.contains(&info.key)))
        .collect();

    match format {
        OutputFormat::Table => Ok(render_table(
            &["NAME", "ALIASES", "LOADED", "DESCRIPTION"],
            rows.iter()
                .map(|row| {
                    vec![
                        row.name.clone(),
                        row.aliases.clone(),
                        row.loaded.to_string(),
                        row.description.clone(),
                    ]
                })
                .collect(),
        )),
        OutputFormat::Csv => render_csv(&rows),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
    }
}

pub fn factories(catalog: &Catalog) -> String {
    render_table(
        &["FACTORY", "ALIASES", "DESCRIPTION"],
        catalog
            .factories()
            .entries()
            .into_iter()
            .map(|info| {
                vec![
                    info.key,
                    info.aliases.join(","),
                    info.description.unwrap_or_default(),
                ]
            })
            .collect(),
    )
}

pub async fn describe(catalog: &Catalog, name: &str) -> Result<String> {
    let info: EntryInfo = catalog.host().registry().describe(name)?;
    let loaded = catalog.host().is_loaded(&info.key).await;

    let mut lines = vec![
        format!("name:          {}", info.key),
        format!("aliases:       {}", info.aliases.join(", ")),
        format!("description:   {}", info.description.unwrap_or_default()),
        format!("loaded:        {}", loaded),
        format!("registered_at: {}", info.registered_at.to_rfc3339()),
    ];
    if info.key != name {
        lines.push(format!("resolved from: {}", name));
    }
    Ok(lines.join("\n"))
}

pub fn encode(catalog: &Catalog, codec: &str, input: &[u8]) -> Result<Vec<u8>> {
    let codec = catalog.codec(codec)?;
    let output = codec.encode(input)?;
    tracing::info!(
        "🔄 Encoded {} byte(s) into {} with '{}'",
        input.len(),
        output.len(),
        codec.name()
    );
    Ok(output)
}

pub fn decode(catalog: &Catalog, codec: &str, input: &[u8]) -> Result<Vec<u8>> {
    let codec = catalog.codec(codec)?;
    let output = codec.decode(input)?;
    tracing::info!(
        "🔄 Decoded {} byte(s) into {} with '{}'",
        input.len(),
        output.len(),
        codec.name()
    );
    Ok(output)
}

pub async fn check(catalog: &Catalog) -> String {
    format!(
        "✅ {} plugin(s) installed, {} loaded, {} factories available",
        catalog.host().registry().len(),
        catalog.host().loaded().await.len(),
        catalog.factories().len()
    )
}

fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(headers.to_vec())];
    for row in &rows {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

fn render_csv(rows: &[PluginRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| RegistryError::IoError(e.into_error()))?;
    String::from_utf8(data).map_err(|e| {
        RegistryError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
