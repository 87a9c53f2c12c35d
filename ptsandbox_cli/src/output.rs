use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// Indented JSON.
    Pretty,
    /// One JSON document per line.
    Compact,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Self {
        match name {
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

pub fn render(data: &Value, format: &OutputFormat) -> String {
    let rendered = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(data),
        OutputFormat::Compact => serde_json::to_string(data),
    };
    match rendered {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialize to JSON: {}", e);
            String::new()
        }
    }
}

pub fn print_json(data: &Value, format: &OutputFormat) {
    println!("{}", render(data, format));
}
