use crate::huffman::{HuffmanTree, Node, NodeId};
use std::io::Write;

#[derive(Debug, Clone)]
pub struct DotOptions {
    /// Text put in front of the input in the graph label.
    pub caption: String,
    pub left_color: String,
    pub right_color: String,
    /// Shown in place of a space symbol.
    pub blank_label: String,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            caption: String::from("Huffman tree: "),
            left_color: String::from("red"),
            right_color: String::from("blue"),
            blank_label: String::from("blank"),
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Writes the tree as a Graphviz digraph.
///
/// Every node is named by its number and weight, leaves additionally by their
/// symbol. Edges come out in pre-order with the left edge of a node, then its
/// left subtree, before its right edge.
pub fn write_dot(
    tree: &HuffmanTree,
    text: &str,
    options: &DotOptions,
    mut writer: impl Write,
) -> std::io::Result<()> {
    writeln!(writer, "digraph g {{")?;
    writeln!(
        writer,
        "label = \"{}{}\"",
        escape(&options.caption),
        escape(text)
    )?;

    let mut stack = Vec::<(NodeId, NodeId, Side)>::new();
    if let Some(root) = tree.root_id() {
        push_children(tree, root, &mut stack);
    }

    while let Some((parent, child, side)) = stack.pop() {
        let (Some(parent_node), Some(child_node)) = (tree.node(parent), tree.node(child)) else {
            continue;
        };

        let color = match side {
            Side::Left => &options.left_color,
            Side::Right => &options.right_color,
        };
        writeln!(
            writer,
            "{} -> {} [color={}]",
            node_name(parent_node, options),
            node_name(child_node, options),
            color
        )?;

        push_children(tree, child, &mut stack);
    }

    writeln!(writer, "}}")?;
    writer.flush()
}

pub fn to_dot_string(
    tree: &HuffmanTree,
    text: &str,
    options: &DotOptions,
) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    write_dot(tree, text, options, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn push_children(tree: &HuffmanTree, idx: NodeId, stack: &mut Vec<(NodeId, NodeId, Side)>) {
    if let Some((left, right)) = tree.node(idx).and_then(Node::children) {
        stack.push((idx, right, Side::Right));
        stack.push((idx, left, Side::Left));
    }
}

fn node_name(node: &Node, options: &DotOptions) -> String {
    match node.symbol() {
        Some(symbol) => format!(
            "\"{}\\n{}\\n{}\"",
            node.number(),
            node.weight(),
            symbol_label(symbol, options)
        ),
        None => format!("\"{}\\n{}\"", node.number(), node.weight()),
    }
}

fn symbol_label(symbol: char, options: &DotOptions) -> String {
    match symbol {
        ' ' => escape(&options.blank_label),
        _ => escape(symbol.encode_utf8(&mut [0; 4])),
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\\\n"),
            '\t' => escaped.push_str("\\\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}
