//! Notebook document model.
//!
//! Mirrors the subset of the `.ipynb` JSON format the evaluator consumes: a
//! `cells` array of markdown/code cells, each code cell carrying execution
//! outputs keyed by MIME type. Cells are immutable once read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormatError;

/// A parsed notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
}

/// One notebook cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Cell kind as written in the document ("markdown", "code", ...).
    pub cell_type: String,
    /// Source text; stored as one string or a list of lines.
    #[serde(default)]
    pub source: MultilineText,
    /// Execution outputs (code cells only).
    #[serde(default)]
    pub outputs: Vec<Output>,
}

/// One cell execution output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    /// Output kind ("stream", "display_data", "execute_result", ...).
    pub output_type: String,
    /// Stream text, for `stream` outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<MultilineText>,
    /// MIME type → payload map, for rich outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, Value>>,
}

/// Text stored either as a single string or as an ordered list of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Single(String),
    Lines(Vec<String>),
}

impl Default for MultilineText {
    fn default() -> Self {
        MultilineText::Lines(Vec::new())
    }
}

impl MultilineText {
    /// Concatenate into one block, preserving embedded newlines as written.
    pub fn concat(&self) -> String {
        match self {
            MultilineText::Single(s) => s.clone(),
            MultilineText::Lines(lines) => lines.concat(),
        }
    }

    /// Join line entries with newlines (stream output convention).
    pub fn join_lines(&self) -> String {
        match self {
            MultilineText::Single(s) => s.clone(),
            MultilineText::Lines(lines) => lines.join("\n"),
        }
    }
}

impl Output {
    /// Textual payload for a MIME type, concatenated; `None` if absent or not
    /// representable as text.
    pub fn data_text(&self, mime: &str) -> Option<String> {
        let value = self.data.as_ref()?.get(mime)?;
        value_to_text(value)
    }

    /// The base64 PNG payload, if present.
    ///
    /// Notebook writers wrap base64 payloads with embedded newlines; strip
    /// all whitespace so the payload is decodable as-is.
    pub fn png_base64(&self) -> Option<String> {
        let raw = self.data_text("image/png")?;
        Some(raw.split_whitespace().collect())
    }

    pub fn is_rich(&self) -> bool {
        self.output_type == "display_data" || self.output_type == "execute_result"
    }
}

/// Coerce a JSON payload into text: a string, or an array of string lines.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let mut out = String::new();
            for item in items {
                out.push_str(item.as_str()?);
            }
            Some(out)
        }
        _ => None,
    }
}

/// A reference to one rendered plot inside a notebook.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRef {
    /// Stable identifier: `cell_{cell_index}_output_{output_index}`.
    pub plot_id: String,
    pub cell_index: usize,
    pub output_index: usize,
    /// Whitespace-stripped base64 PNG payload.
    pub png_base64: String,
}

impl Notebook {
    /// Parse a notebook from its JSON source.
    ///
    /// A document without a `cells` array is a format error, not an empty
    /// notebook.
    pub fn from_json_str(source: &str) -> Result<Self, FormatError> {
        #[derive(Deserialize)]
        struct Doc {
            cells: Option<Vec<Cell>>,
        }

        let doc: Doc =
            serde_json::from_str(source).map_err(|e| FormatError::Notebook(e.to_string()))?;
        let cells = doc.cells.ok_or(FormatError::MissingCells)?;
        Ok(Notebook { cells })
    }

    /// All rendered plots, in document order.
    pub fn plots(&self) -> Vec<PlotRef> {
        let mut plots = Vec::new();
        for (cell_index, cell) in self.cells.iter().enumerate() {
            if cell.cell_type != "code" {
                continue;
            }
            for (output_index, output) in cell.outputs.iter().enumerate() {
                if !output.is_rich() {
                    continue;
                }
                if let Some(png_base64) = output.png_base64() {
                    plots.push(PlotRef {
                        plot_id: format!("cell_{cell_index}_output_{output_index}"),
                        cell_index,
                        output_index,
                        png_base64,
                    });
                }
            }
        }
        plots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTEBOOK: &str = r##"{
        "cells": [
            {"cell_type": "markdown", "source": ["# Intro\n", "text"]},
            {
                "cell_type": "code",
                "source": "print('hi')",
                "outputs": [
                    {"output_type": "stream", "text": ["hi", "there"]},
                    {"output_type": "display_data", "data": {"image/png": "aGVs\nbG8="}}
                ]
            }
        ]
    }"##;

    #[test]
    fn parse_notebook() {
        let nb = Notebook::from_json_str(NOTEBOOK).unwrap();
        assert_eq!(nb.cells.len(), 2);
        assert_eq!(nb.cells[0].source.concat(), "# Intro\ntext");
        assert_eq!(nb.cells[1].source.concat(), "print('hi')");
        assert_eq!(
            nb.cells[1].outputs[0].text.as_ref().unwrap().join_lines(),
            "hi\nthere"
        );
    }

    #[test]
    fn missing_cells_is_format_error() {
        let err = Notebook::from_json_str(r#"{"metadata": {}}"#).unwrap_err();
        assert!(matches!(err, FormatError::MissingCells));
    }

    #[test]
    fn malformed_json_is_format_error() {
        let err = Notebook::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, FormatError::Notebook(_)));
    }

    #[test]
    fn png_payload_strips_whitespace() {
        let nb = Notebook::from_json_str(NOTEBOOK).unwrap();
        assert_eq!(
            nb.cells[1].outputs[1].png_base64().unwrap(),
            "aGVsbG8="
        );
    }

    #[test]
    fn plots_are_indexed_by_cell_and_output() {
        let nb = Notebook::from_json_str(NOTEBOOK).unwrap();
        let plots = nb.plots();
        assert_eq!(plots.len(), 1);
        assert_eq!(plots[0].plot_id, "cell_1_output_1");
        assert_eq!(plots[0].cell_index, 1);
        assert_eq!(plots[0].output_index, 1);
    }

    #[test]
    fn non_text_payload_is_ignored() {
        let json = r#"{
            "cells": [{
                "cell_type": "code",
                "source": [],
                "outputs": [{"output_type": "display_data", "data": {"application/json": {"k": 1}}}]
            }]
        }"#;
        let nb = Notebook::from_json_str(json).unwrap();
        assert!(nb.cells[0].outputs[0].data_text("application/json").is_none());
        assert!(nb.plots().is_empty());
    }
}
