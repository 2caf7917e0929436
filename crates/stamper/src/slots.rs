//! Slot populator

use stamper_dom::{DomTree, NodeId, Selector};

use crate::directives;
use crate::error::Result;
use crate::fragment::select_inclusive;

/// Write each `(slot, text)` pair into the first `[s-slot=slot]` element
/// under `root`. Keys without a slot are ignored. Returns the slots filled.
pub fn populate_slots<I, K, V>(tree: &mut DomTree, root: NodeId, data: I) -> Result<usize>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut filled = 0;
    for (key, value) in data {
        let key = key.as_ref();
        let selector = Selector::attr_eq(directives::SLOT, key);
        match select_inclusive(tree, root, &selector).first() {
            Some(&slot) => {
                tree.set_text_content(slot, value.as_ref())?;
                filled += 1;
            }
            None => tracing::debug!(target: "stamper", "no slot named `{}`", key),
        }
    }
    Ok(filled)
}
