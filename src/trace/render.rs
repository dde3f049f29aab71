//! Text rendering for ownership trees

use super::models::OwnershipNode;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";

/// Render one line per node in pre-order
///
/// The root line is the bare label. Every deeper node is prefixed with
/// `└── ` when it is the last of its siblings and `├── ` otherwise, below one
/// four-column gutter per ancestor level. Lines are joined with `\n` and
/// carry no trailing newline.
pub fn render_tree(root: &OwnershipNode) -> String {
    let mut lines = Vec::with_capacity(root.node_count());
    // (node, gutter inherited from ancestors, last sibling, root)
    let mut stack: Vec<(&OwnershipNode, String, bool, bool)> =
        vec![(root, String::new(), true, true)];

    while let Some((node, gutter, last, is_root)) = stack.pop() {
        let child_gutter = if is_root {
            lines.push(node.label());
            String::new()
        } else {
            let glyph = if last { LAST_BRANCH } else { BRANCH };
            lines.push(format!("{}{}{}", gutter, glyph, node.label()));
            format!("{}{}", gutter, if last { BLANK } else { PIPE })
        };

        // Reverse push keeps siblings in their original order when popped
        let count = node.parents.len();
        for (i, parent) in node.parents.iter().enumerate().rev() {
            stack.push((parent, child_gutter.clone(), i + 1 == count, false));
        }
    }

    lines.join("\n")
}
