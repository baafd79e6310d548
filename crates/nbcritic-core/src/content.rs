//! Content adapter: notebook cells → message parts.
//!
//! Converts one heterogeneous cell (markdown, code, text/image/html outputs)
//! into the normalized message parts the completion backend consumes. Pure
//! function of its input; unrecognized content produces a diagnostic, never
//! a failure.

use crate::chat::MessagePart;
use crate::notebook::Cell;

pub const INPUT_MARKDOWN_LABEL: &str = "INPUT-MARKDOWN: ";
pub const INPUT_CODE_LABEL: &str = "INPUT-CODE: ";
pub const OUTPUT_TEXT_LABEL: &str = "OUTPUT-TEXT: ";
pub const OUTPUT_HTML_LABEL: &str = "OUTPUT-HTML: ";

/// Adapt one cell into an ordered sequence of message parts.
///
/// Source text precedes its outputs. Rich outputs select exactly one
/// renderable payload by MIME priority image/png > text/plain > text/html;
/// an output with none of these is skipped with a warning. Unknown cell
/// types yield a placeholder part so message-index alignment stays stable.
pub fn adapt_cell(cell: &Cell) -> Vec<MessagePart> {
    match cell.cell_type.as_str() {
        "markdown" => {
            vec![MessagePart::text(format!(
                "{INPUT_MARKDOWN_LABEL}{}",
                cell.source.concat()
            ))]
        }
        "code" => {
            let mut parts = vec![MessagePart::text(format!(
                "{INPUT_CODE_LABEL}{}",
                cell.source.concat()
            ))];
            for output in &cell.outputs {
                match output.output_type.as_str() {
                    "stream" => {
                        let text = output
                            .text
                            .as_ref()
                            .map(|t| t.join_lines())
                            .unwrap_or_default();
                        parts.push(MessagePart::text(format!("{OUTPUT_TEXT_LABEL}{text}")));
                    }
                    "display_data" | "execute_result" => {
                        if let Some(png) = output.png_base64() {
                            parts.push(MessagePart::png_data_url(&png));
                        } else if let Some(text) = output.data_text("text/plain") {
                            parts.push(MessagePart::text(format!("{OUTPUT_TEXT_LABEL}{text}")));
                        } else if let Some(html) = output.data_text("text/html") {
                            parts.push(MessagePart::text(format!("{OUTPUT_HTML_LABEL}{html}")));
                        } else {
                            tracing::warn!(
                                output_type = %output.output_type,
                                "output has no image/png, text/plain, or text/html payload"
                            );
                        }
                    }
                    other => {
                        tracing::warn!(output_type = %other, "unsupported output type");
                    }
                }
            }
            parts
        }
        other => {
            tracing::warn!(cell_type = %other, "unsupported cell type");
            vec![MessagePart::text("Unsupported cell type")]
        }
    }
}
