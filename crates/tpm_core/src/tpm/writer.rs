//! TPM block grammar writer.

use super::block::Block;

/// Serialize blocks to TPM text.
///
/// Each block is written as its header line, `{`, one tab-indented
/// `key = value` line per property, `}` and a blank separator line.
/// Identifiers and values are written verbatim, so the output parses back
/// to the same blocks.
pub fn serialize_document(blocks: &[Block]) -> String {
    let mut lines = Vec::with_capacity(blocks.iter().map(|b| b.properties.len() + 4).sum());

    for block in blocks {
        lines.push(block.label());
        lines.push("{".to_string());
        for property in &block.properties {
            lines.push(format!("\t{} = {}", property.key, property.value));
        }
        lines.push("}".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}
