use super::{Graph, GraphEntry, InputValue, Reference};

/// Controls which references [`Graph::redirect_references`] rewrites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedirectOptions {
    /// When set, only references reading this output index are redirected.
    pub selective_output: Option<i64>,
    /// With `selective_output` set, delete references to the other outputs
    /// instead of leaving them in place.
    pub drop_non_selected: bool,
}

impl RedirectOptions {
    /// Redirect every reference regardless of output index.
    pub fn all() -> Self {
        Self::default()
    }

    /// Redirect only references reading output `index`.
    pub fn only_output(index: i64) -> Self {
        Self {
            selective_output: Some(index),
            drop_non_selected: false,
        }
    }

    pub fn dropping_others(mut self) -> Self {
        self.drop_non_selected = true;
        self
    }

    fn decide(&self, reference: &Reference, replacement: &Reference) -> Rewrite {
        match self.selective_output {
            None => Rewrite::Replace(replacement.clone()),
            Some(index) if reference.output == index => Rewrite::Replace(replacement.clone()),
            Some(_) if self.drop_non_selected => Rewrite::Drop,
            Some(_) => Rewrite::Keep,
        }
    }
}

/// What happens to one matching reference.
enum Rewrite {
    Keep,
    Replace(Reference),
    Drop,
}

impl Graph {
    /// Points every reference to `target` at `replacement` instead, subject to
    /// `options`. Direct references that are dropped remove their whole input
    /// entry; inside reference lists only the element is removed.
    ///
    /// Returns the number of references rewritten or dropped.
    pub fn redirect_references(
        &mut self,
        target: &str,
        replacement: &Reference,
        options: RedirectOptions,
    ) -> usize {
        self.rewrite_references(target, |reference| options.decide(reference, replacement))
    }

    /// Removes every reference to `target`, for nodes with nothing to splice in.
    pub fn drop_all_references(&mut self, target: &str) -> usize {
        self.rewrite_references(target, |_| Rewrite::Drop)
    }

    /// Removes the entry for `id`. Inbound references must already have been
    /// redirected or dropped; nothing is checked here.
    pub fn delete_node(&mut self, id: &str) -> Option<GraphEntry> {
        self.entries.shift_remove(id)
    }

    fn rewrite_references<F>(&mut self, target: &str, mut decide: F) -> usize
    where
        F: FnMut(&Reference) -> Rewrite,
    {
        let mut touched = 0;
        for node in self.nodes_mut() {
            let Some(inputs) = node.inputs_mut() else {
                continue;
            };
            inputs.retain(|_, value| match value {
                InputValue::Reference(reference) => {
                    apply(reference, target, &mut decide, &mut touched)
                }
                InputValue::ReferenceList(items) => {
                    items.retain_mut(|item| match item {
                        InputValue::Reference(reference) => {
                            apply(reference, target, &mut decide, &mut touched)
                        }
                        _ => true,
                    });
                    true
                }
                InputValue::Literal(_) => true,
            });
        }
        touched
    }
}

/// Rewrites one reference in place. Returns `false` if it must be removed.
fn apply<F>(reference: &mut Reference, target: &str, decide: &mut F, touched: &mut usize) -> bool
where
    F: FnMut(&Reference) -> Rewrite,
{
    if !reference.points_to(target) {
        return true;
    }
    match decide(reference) {
        Rewrite::Keep => true,
        Rewrite::Replace(replacement) => {
            *reference = replacement;
            *touched += 1;
            true
        }
        Rewrite::Drop => {
            *touched += 1;
            false
        }
    }
}
